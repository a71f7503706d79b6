use crate::config::Settings;
use crate::error::RosterError;
use crate::model::ShiftData;
use crate::parser::parse_rows;
use crate::stats::{aggregate_by_hours, summarize, DoctorStatistics, RosterSummary};
use crate::validation::{validate_with, ValidationError};
use anyhow::Context;
use calamine::{open_workbook_auto, Reader};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Séparateurs essayés en détection automatique.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];
const SNIFF_LINES: usize = 10;

/// Classeurs : seule la première feuille est lue.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xls", "ods"];

/// Lit un fichier (texte délimité ou classeur) en grille de chaînes, sans
/// consommer de ligne d'en-tête : la ligne 0 appartient au parser.
pub fn read_grid<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>, RosterError> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let forced = match ext.as_str() {
        "csv" | "txt" => None,
        "tsv" => Some(b'\t'),
        other if WORKBOOK_EXTENSIONS.contains(&other) => return read_workbook(path),
        other => return Err(RosterError::UnsupportedFormat(format!(".{other}"))),
    };

    let bytes = fs::read(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_grid_bytes(&bytes, forced)
}

/// Décode des octets délimités ; `delimiter = None` active la détection.
pub fn read_grid_bytes(bytes: &[u8], delimiter: Option<u8>) -> Result<Vec<Vec<String>>, RosterError> {
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(bytes));
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        rows.push(rec.iter().map(|c| c.to_string()).collect::<Vec<_>>());
    }
    if rows.is_empty() {
        return Err(RosterError::EmptyGrid("no rows found".into()));
    }
    debug!(rows = rows.len(), delimiter = %(delimiter as char).escape_default(), "grid decoded");
    Ok(rows)
}

/// Première feuille d'un classeur, cellules rendues en texte (vides → `""`).
fn read_workbook(path: &Path) -> Result<Vec<Vec<String>>, RosterError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| RosterError::EmptyGrid("workbook has no sheet".into()))??;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();
    if rows.is_empty() {
        return Err(RosterError::EmptyGrid("first sheet is empty".into()));
    }
    debug!(rows = rows.len(), path = %path.display(), "workbook decoded");
    Ok(rows)
}

/// Séparateur présent sur le plus de lignes parmi les premières (`,` par défaut).
fn detect_delimiter(bytes: &[u8]) -> u8 {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .map_while(Result::ok)
        .filter(|l| !l.trim().is_empty())
        .take(SNIFF_LINES)
        .collect();

    let mut best = (b',', 0usize);
    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_unquoted(line, delim))
            .collect();
        let peak = counts.iter().copied().max().unwrap_or(0);
        if peak == 0 {
            continue;
        }
        // la ligne 0 peut ne porter que le mois : on compte les lignes concernées
        let hits = counts.iter().filter(|&&c| c > 0).count();
        let score = hits * 1000 + peak;
        if score > best.1 {
            best = (delim, score);
        }
    }
    best.0
}

fn count_unquoted(line: &str, delim: u8) -> usize {
    let mut in_quotes = false;
    let mut count = 0;
    for b in line.bytes() {
        if b == b'"' {
            in_quotes = !in_quotes;
        } else if b == delim && !in_quotes {
            count += 1;
        }
    }
    count
}

/// Frontière d'import : tout échec de lecture devient une liste d'une erreur `format`.
pub fn load_shift_data<P: AsRef<Path>>(path: P) -> Result<ShiftData, Vec<ValidationError>> {
    read_grid(path)
        .map(|rows| parse_rows(&rows))
        .map_err(|err| vec![err.to_validation_error()])
}

/// Une passe d'analyse complète sur un même instantané d'intervalles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub month: String,
    pub errors: Vec<ValidationError>,
    pub statistics: Vec<DoctorStatistics>,
    pub summary: RosterSummary,
}

pub fn analyze(data: &ShiftData, settings: &Settings) -> AnalysisReport {
    let statistics = aggregate_by_hours(&data.all_shifts);
    AnalysisReport {
        month: data.month.clone(),
        errors: validate_with(&data.all_shifts, settings.validation),
        summary: summarize(&data.all_shifts, &statistics),
        statistics,
    }
}

/// Écrit du JSON indenté de manière atomique (fichier temporaire + rename).
pub fn export_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> anyhow::Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_vec_pretty(value)?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
    tmp.write_all(&json)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("atomic rename to {}", path.display()))?;
    Ok(())
}

/// Export CSV des erreurs: header `type,severity,day,doctor,message`
pub fn export_errors_csv<P: AsRef<Path>>(path: P, errors: &[ValidationError]) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(false).from_path(path)?;
    w.write_record(["type", "severity", "day", "doctor", "message"])?;
    for e in errors {
        let kind = serde_json::to_value(e.kind)?;
        let severity = serde_json::to_value(e.severity)?;
        let day = e.day.map(|d| d.to_string()).unwrap_or_default();
        w.write_record([
            kind.as_str().unwrap_or_default(),
            severity.as_str().unwrap_or_default(),
            day.as_str(),
            e.doctor.as_deref().unwrap_or(""),
            e.message.as_str(),
        ])?;
    }
    w.flush()?;
    Ok(())
}
