//! Parsing d'une grille mensuelle (jours × colonnes de poste) en intervalles typés.
//!
//! - Ligne 0 : mois en `[0][0]`, puis les en-têtes de colonnes.
//! - Colonne 0 : numéro du jour ; la première ligne non numérique clôt les données.
//! - Chaque cellule non vide donne une ou deux gardes selon la table de règles
//!   [`CellRule`] (le marqueur de la cellule l'emporte sur l'en-tête).

use crate::model::{normalize_name, ShiftData, ShiftEntry, ShiftInterval, ShiftKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

const UNKNOWN_MONTH: &str = "Unknown";

/// Plage horaire de jour (« 08-16 », « 8-16 ») isolée de tout autre chiffre.
static DAYTIME_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(^|\D)(0?8\s*[-–]\s*16)(\D|$)").expect("valid daytime regex"));

/// Suffixe horaire en fin de cellule : `ahmet16`, `ahmet 24`.
static HOUR_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?)\s*(16|24)$").expect("valid suffix regex"));

/// Classement d'une colonne d'après son en-tête.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnClass {
    Full,
    Long,
    Day,
    Split,
    Unknown,
}

/// Règles d'en-tête, testées dans cet ordre sur l'en-tête en minuscules.
const HEADER_RULES: &[(ColumnClass, &[&str])] = &[
    (ColumnClass::Full, &["24", "yirmidört", "yirmi dört"]),
    (ColumnClass::Long, &["16", "onaltı", "on altı"]),
    (ColumnClass::Day, &["gündüz", "08-16", "8-16"]),
    (ColumnClass::Split, &["/", "sarı", "müs"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub class: ColumnClass,
    /// En-tête d'origine (casse conservée), `""` si absent.
    pub region: String,
}

impl Column {
    fn unlabeled() -> Self {
        Self {
            class: ColumnClass::Unknown,
            region: String::new(),
        }
    }
}

/// Classe un en-tête de colonne, première règle satisfaite.
///
/// « 16 » passe avant le marqueur de jour : un en-tête « 08-16 » donne une
/// colonne de 16 heures.
pub fn classify_header(header: &str) -> ColumnClass {
    let lower = header.to_lowercase();
    HEADER_RULES
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| lower.contains(m)))
        .map(|(class, _)| *class)
        .unwrap_or(ColumnClass::Unknown)
}

pub fn classify_columns(header: &[String]) -> Vec<Column> {
    header
        .iter()
        .map(|text| Column {
            class: classify_header(text),
            region: text.trim().to_string(),
        })
        .collect()
}

/// Règle appliquée à une cellule, par ordre de priorité décroissante.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRule {
    /// `nom1/nom2` : matin + soir, quel que soit l'en-tête.
    SplitMarker,
    /// Plage « 08-16 » présente dans la cellule.
    DaytimePattern,
    /// Colonne de jour (8 h).
    DayColumn,
    /// Cellule terminée par « 16 ».
    LongSuffix,
    /// Cellule terminée par « 24 ».
    FullSuffix,
    LongColumn,
    FullColumn,
    /// Colonne inconnue ou partagée sans `/` : 24 h.
    Fallback,
}

impl CellRule {
    pub fn decide(cell: &str, class: ColumnClass) -> Self {
        if cell.contains('/') {
            return CellRule::SplitMarker;
        }
        if DAYTIME_RANGE.is_match(cell) {
            return CellRule::DaytimePattern;
        }
        if class == ColumnClass::Day {
            return CellRule::DayColumn;
        }
        match hour_suffix(cell) {
            Some((_, 16)) => return CellRule::LongSuffix,
            Some((_, 24)) => return CellRule::FullSuffix,
            _ => {}
        }
        match class {
            ColumnClass::Long => CellRule::LongColumn,
            ColumnClass::Full => CellRule::FullColumn,
            _ => CellRule::Fallback,
        }
    }
}

/// Sépare `nom` et le suffixe horaire, si la cellule se termine exactement par 16 ou 24.
fn hour_suffix(cell: &str) -> Option<(&str, u32)> {
    let caps = HOUR_SUFFIX.captures(cell.trim())?;
    let name = caps.get(1).map_or("", |m| m.as_str());
    if name.chars().last().is_some_and(|c| c.is_ascii_digit()) {
        // ex. « ahmet216 » : pas un marqueur.
        return None;
    }
    let hours = caps.get(2)?.as_str().parse().ok()?;
    Some((name, hours))
}

fn clean_name(raw: &str) -> String {
    let trimmed = raw.trim_matches(|c: char| c.is_whitespace() || "-+:,.;()[]".contains(c));
    normalize_name(trimmed)
}

/// Retire les mots de la région (en-tête) laissés en fin de nom : « ahmet yeşil 24 ».
fn strip_region_words(name: &str, region: &str) -> String {
    let region = region.to_lowercase();
    let words: Vec<&str> = region
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| w.chars().count() >= 2)
        .collect();
    let mut tokens: Vec<&str> = name.split_whitespace().collect();
    while tokens.len() > 1 {
        let last = tokens[tokens.len() - 1].to_lowercase();
        if words.iter().any(|w| *w == last) {
            tokens.pop();
        } else {
            break;
        }
    }
    tokens.join(" ")
}

/// Lit une cellule : liste des gardes `(type, nom nettoyé)` à émettre.
pub fn read_cell(cell: &str, column: &Column) -> Vec<(ShiftKind, String)> {
    let cell = cell.trim();
    let readings = match CellRule::decide(cell, column.class) {
        CellRule::SplitMarker => {
            let mut halves = cell.split('/');
            let morning = halves.next().unwrap_or("");
            let evening = halves.next().unwrap_or("");
            vec![
                (ShiftKind::Morning, clean_name(morning)),
                (ShiftKind::Evening, clean_name(evening)),
            ]
        }
        CellRule::DaytimePattern | CellRule::DayColumn => {
            let stripped = DAYTIME_RANGE.replace_all(cell, "${1}${3}");
            // « ahmet 16 » en colonne de jour reste « ahmet »
            let name = hour_suffix(&stripped).map_or(&*stripped, |(name, _)| name);
            vec![(ShiftKind::Day, clean_name(name))]
        }
        rule @ (CellRule::LongSuffix | CellRule::FullSuffix) => {
            let kind = if rule == CellRule::LongSuffix {
                ShiftKind::Long
            } else {
                ShiftKind::Full
            };
            let name = hour_suffix(cell).map_or("", |(name, _)| name);
            let name = strip_region_words(&clean_name(name), &column.region);
            vec![(kind, clean_name(&name))]
        }
        CellRule::LongColumn => vec![(ShiftKind::Long, clean_name(cell))],
        CellRule::FullColumn | CellRule::Fallback => vec![(ShiftKind::Full, clean_name(cell))],
    };
    readings
        .into_iter()
        .filter(|(_, name)| !name.is_empty())
        .collect()
}

fn is_numeric(cell: &str) -> bool {
    cell.parse::<f64>().is_ok_and(|v| v.is_finite())
}

/// Partie entière en tête de cellule (« 12 », « 12.0 », « 3. »).
fn parse_day(cell: &str) -> Option<u32> {
    let cell = cell.trim();
    let digits: String = cell.chars().take_while(|c| c.is_ascii_digit()).collect();
    let day: u32 = digits.parse().ok()?;
    (day >= 1).then_some(day)
}

/// Nombre de lignes de données : de la ligne 1 jusqu'à la première ligne dont
/// la première cellule est vide ou non numérique (exclue).
fn data_end(rows: &[Vec<String>]) -> usize {
    rows.iter()
        .enumerate()
        .skip(1)
        .find(|(_, row)| {
            let first = row.first().map(|c| c.trim()).unwrap_or("");
            first.is_empty() || !is_numeric(first)
        })
        .map_or(rows.len(), |(idx, _)| idx)
}

/// Convertit une grille brute en [`ShiftData`]. N'échoue jamais : lignes et
/// cellules malformées sont ignorées.
pub fn parse_rows(rows: &[Vec<String>]) -> ShiftData {
    let header: &[String] = rows.first().map(Vec::as_slice).unwrap_or(&[]);
    let month = header
        .first()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .unwrap_or(UNKNOWN_MONTH)
        .to_string();
    let columns = classify_columns(header);

    let end = data_end(rows);
    let mut entries = Vec::new();
    let mut all_shifts = Vec::new();

    for row in rows.iter().take(end).skip(1) {
        let Some(day) = row.first().and_then(|c| parse_day(c)) else {
            trace!(row = ?row.first(), "skipping row without a valid day");
            continue;
        };

        let mut raw = Vec::new();
        for (col, cell) in row.iter().enumerate().skip(1) {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            raw.push(cell.to_string());

            let column = columns
                .get(col)
                .cloned()
                .unwrap_or_else(Column::unlabeled);
            let readings = read_cell(cell, &column);
            if readings.is_empty() {
                trace!(day, col, cell, "cell yields no doctor name");
            }
            for (kind, name) in readings {
                all_shifts.push(ShiftInterval::new(name, day, kind, col, column.region.clone()));
            }
        }
        entries.push(ShiftEntry { day, shifts: raw });
    }

    debug!(
        month = %month,
        days = entries.len(),
        shifts = all_shifts.len(),
        ignored_rows = rows.len().saturating_sub(end),
        "roster parsed"
    );

    ShiftData {
        month,
        entries,
        all_shifts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RosterTime;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn column(class: ColumnClass, region: &str) -> Column {
        Column {
            class,
            region: region.to_string(),
        }
    }

    #[test]
    fn header_precedence() {
        assert_eq!(classify_header("Yeşil24"), ColumnClass::Full);
        assert_eq!(classify_header("yeşil 24 / 16"), ColumnClass::Full);
        assert_eq!(classify_header("Kırmızı 16"), ColumnClass::Long);
        assert_eq!(classify_header("Gündüz"), ColumnClass::Day);
        assert_eq!(classify_header("Gündüz 08-16"), ColumnClass::Long);
        assert_eq!(classify_header("poliklinik 8-16"), ColumnClass::Long);
        assert_eq!(classify_header("Sarı+Müs"), ColumnClass::Split);
        assert_eq!(classify_header("a/b"), ColumnClass::Split);
        assert_eq!(classify_header("st"), ColumnClass::Unknown);
        assert_eq!(classify_header(""), ColumnClass::Unknown);
    }

    #[test]
    fn cell_rules_in_order() {
        use CellRule::*;
        assert_eq!(CellRule::decide("a/b", ColumnClass::Full), SplitMarker);
        assert_eq!(CellRule::decide("ali 08-16", ColumnClass::Full), DaytimePattern);
        assert_eq!(CellRule::decide("ali16", ColumnClass::Day), DayColumn);
        assert_eq!(CellRule::decide("ali16", ColumnClass::Full), LongSuffix);
        assert_eq!(CellRule::decide("ali 24", ColumnClass::Long), FullSuffix);
        assert_eq!(CellRule::decide("ali", ColumnClass::Long), LongColumn);
        assert_eq!(CellRule::decide("ali", ColumnClass::Full), FullColumn);
        assert_eq!(CellRule::decide("ali", ColumnClass::Split), Fallback);
        assert_eq!(CellRule::decide("ali216", ColumnClass::Unknown), Fallback);
    }

    #[test]
    fn cell_suffix_overrides_column() {
        let readings = read_cell("ahmet16", &column(ColumnClass::Full, "yeşil24"));
        assert_eq!(readings, vec![(ShiftKind::Long, "ahmet".to_string())]);
        let readings = read_cell("Mehmet 24", &column(ColumnClass::Long, "k16"));
        assert_eq!(readings, vec![(ShiftKind::Full, "mehmet".to_string())]);
    }

    #[test]
    fn names_are_cleaned() {
        let readings = read_cell("Ayşe 08-16", &column(ColumnClass::Unknown, ""));
        assert_eq!(readings, vec![(ShiftKind::Day, "ayşe".to_string())]);
        let readings = read_cell("ahmet yeşil 24", &column(ColumnClass::Full, "Yeşil 24"));
        assert_eq!(readings, vec![(ShiftKind::Full, "ahmet".to_string())]);
        let readings = read_cell(" ali / veli ", &column(ColumnClass::Split, "sarı"));
        assert_eq!(
            readings,
            vec![
                (ShiftKind::Morning, "ali".to_string()),
                (ShiftKind::Evening, "veli".to_string())
            ]
        );
    }

    #[test]
    fn day_column_drops_hour_suffix() {
        let day = column(ColumnClass::Day, "Gündüz");
        assert_eq!(read_cell("ahmet 16", &day), vec![(ShiftKind::Day, "ahmet".to_string())]);
        assert_eq!(read_cell("Ahmet24", &day), vec![(ShiftKind::Day, "ahmet".to_string())]);
        assert_eq!(read_cell("ahmet216", &day), vec![(ShiftKind::Day, "ahmet216".to_string())]);
    }

    #[test]
    fn empty_names_are_dropped() {
        assert!(read_cell("16", &column(ColumnClass::Unknown, "")).is_empty());
        let readings = read_cell("/veli", &column(ColumnClass::Unknown, ""));
        assert_eq!(readings, vec![(ShiftKind::Evening, "veli".to_string())]);
    }

    #[test]
    fn embedded_digits_are_plain_names() {
        let readings = read_cell("ahmet216", &column(ColumnClass::Unknown, ""));
        assert_eq!(readings, vec![(ShiftKind::Full, "ahmet216".to_string())]);
    }

    #[test]
    fn parses_scenario_roster() {
        let rows = grid(&[&["March"], &["1", "ahmet/mehmet"], &["2", "ahmet24"]]);
        let data = parse_rows(&rows);
        assert_eq!(data.month, "March");
        assert_eq!(data.entries.len(), 2);
        assert_eq!(data.all_shifts.len(), 3);

        let morning = &data.all_shifts[0];
        assert_eq!(morning.doctor_name, "ahmet");
        assert_eq!(morning.shift_type, ShiftKind::Morning);
        assert_eq!(morning.start_date_time, RosterTime::at(1, 8));
        assert_eq!(morning.end_date_time, RosterTime::at(1, 20));

        let evening = &data.all_shifts[1];
        assert_eq!(evening.doctor_name, "mehmet");
        assert_eq!(evening.shift_type, ShiftKind::Evening);
        assert_eq!(evening.end_date_time, RosterTime::at(2, 8));

        let full = &data.all_shifts[2];
        assert_eq!((full.day, full.shift_type, full.hours), (2, ShiftKind::Full, 24));
        assert_eq!(full.region, "");
    }

    #[test]
    fn trailer_rows_are_ignored() {
        let rows = grid(&[
            &["Nisan", "Yeşil 24", "Sarı+Müs"],
            &["1", "Ali", "Veli/Can"],
            &["2.0", "", "Ece"],
            &["Notlar", "ali izinli"],
            &["3", "Ali", ""],
        ]);
        let data = parse_rows(&rows);
        assert_eq!(data.entries.len(), 2);
        assert_eq!(data.entries[1], ShiftEntry { day: 2, shifts: vec!["Ece".into()] });
        assert!(data.all_shifts.iter().all(|s| s.day <= 2));
        assert_eq!(data.all_shifts[0].region, "Yeşil 24");
        assert_eq!(data.all_shifts[1].region, "Sarı+Müs");
        // colonne partagée sans « / » : 24 h par défaut
        let ece = data.all_shifts.iter().find(|s| s.doctor_name == "ece").unwrap();
        assert_eq!(ece.shift_type, ShiftKind::Full);
        assert_eq!(ece.column, 2);
    }

    #[test]
    fn empty_grid_is_unknown_month() {
        let data = parse_rows(&[]);
        assert_eq!(data.month, "Unknown");
        assert!(data.all_shifts.is_empty());
        let data = parse_rows(&grid(&[&["", "x"], &["0", "ali"]]));
        assert_eq!(data.month, "Unknown");
        assert!(data.entries.is_empty());
    }
}
