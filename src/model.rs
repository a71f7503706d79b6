use chrono::{Duration, NaiveDate, NaiveDateTime};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 24 * MINUTES_PER_HOUR;

/// Heure de prise de poste commune à tous les types (08:00).
pub const DUTY_START_HOUR: u32 = 8;

/// Instant relatif du tableau : minutes écoulées depuis minuit du « jour 0 ».
///
/// Le jour `d` à `h` heures vaut `(d * 24 + h) * 60`. Aucune date calendaire
/// n'est associée ; voir [`RosterTime::materialize`] pour un export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterTime(i64);

impl RosterTime {
    pub fn at(day: u32, hour: u32) -> Self {
        Self(i64::from(day) * MINUTES_PER_DAY + i64::from(hour) * MINUTES_PER_HOUR)
    }

    pub fn from_minutes(minutes: i64) -> Self {
        Self(minutes)
    }

    pub fn minutes(self) -> i64 {
        self.0
    }

    /// Jour du tableau contenant cet instant.
    pub fn day(self) -> i64 {
        self.0.div_euclid(MINUTES_PER_DAY)
    }

    /// Heure dans la journée (0..24).
    pub fn hour_of_day(self) -> u32 {
        (self.0.rem_euclid(MINUTES_PER_DAY) / MINUTES_PER_HOUR) as u32
    }

    pub fn plus_hours(self, hours: u32) -> Self {
        Self(self.0 + i64::from(hours) * MINUTES_PER_HOUR)
    }

    /// Heures (fractionnaires) de `self` jusqu'à `later` ; négatif si `later` précède.
    pub fn hours_until(self, later: RosterTime) -> f64 {
        (later.0 - self.0) as f64 / MINUTES_PER_HOUR as f64
    }

    /// Date/heure calendaire, `month_start` étant la date du jour 1.
    pub fn materialize(self, month_start: NaiveDate) -> Option<NaiveDateTime> {
        let origin = month_start
            .and_hms_opt(0, 0, 0)?
            .checked_sub_signed(Duration::days(1))?;
        origin.checked_add_signed(Duration::minutes(self.0))
    }
}

impl fmt::Display for RosterTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minute = self.0.rem_euclid(MINUTES_PER_HOUR);
        write!(f, "day {} {:02}:{:02}", self.day(), self.hour_of_day(), minute)
    }
}

/// Type de garde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftKind {
    #[serde(rename = "24h")]
    Full,
    #[serde(rename = "morning")]
    Morning,
    #[serde(rename = "evening")]
    Evening,
    #[serde(rename = "16h")]
    Long,
    #[serde(rename = "8h")]
    Day,
}

impl ShiftKind {
    pub fn hours(self) -> u32 {
        match self {
            ShiftKind::Full => 24,
            ShiftKind::Long => 16,
            ShiftKind::Morning | ShiftKind::Evening => 12,
            ShiftKind::Day => 8,
        }
    }

    pub fn start_hour(self) -> u32 {
        match self {
            ShiftKind::Evening => 20,
            _ => DUTY_START_HOUR,
        }
    }

    /// Moitié d'une garde partagée (matin/soir).
    pub fn is_split_half(self) -> bool {
        matches!(self, ShiftKind::Morning | ShiftKind::Evening)
    }

    pub fn label(self) -> &'static str {
        match self {
            ShiftKind::Full => "24h",
            ShiftKind::Morning => "morning",
            ShiftKind::Evening => "evening",
            ShiftKind::Long => "16h",
            ShiftKind::Day => "8h",
        }
    }
}

impl fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Affectation d'un médecin sur un créneau (immuable après parsing).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftInterval {
    pub doctor_name: String,
    pub day: u32,
    pub shift_type: ShiftKind,
    pub column: usize,
    pub hours: u32,
    pub start_date_time: RosterTime,
    pub end_date_time: RosterTime,
    pub region: String,
}

impl ShiftInterval {
    /// Construit l'intervalle ; bornes et durée découlent du type.
    ///
    /// Le nom est normalisé (trim + minuscules) : c'est la clé d'identité du médecin.
    pub fn new<N: AsRef<str>, R: Into<String>>(
        doctor_name: N,
        day: u32,
        shift_type: ShiftKind,
        column: usize,
        region: R,
    ) -> Self {
        let start = RosterTime::at(day, shift_type.start_hour());
        Self {
            doctor_name: normalize_name(doctor_name.as_ref()),
            day,
            shift_type,
            column,
            hours: shift_type.hours(),
            start_date_time: start,
            end_date_time: start.plus_hours(shift_type.hours()),
            region: region.into(),
        }
    }

    /// Repos (heures) entre la fin de `self` et le début de `next`.
    pub fn rest_before(&self, next: &ShiftInterval) -> f64 {
        self.end_date_time.hours_until(next.start_date_time)
    }

    /// Copie réaffectée à un autre médecin (simulation d'échange).
    pub fn reassigned_to(&self, doctor_name: &str) -> Self {
        Self {
            doctor_name: normalize_name(doctor_name),
            ..self.clone()
        }
    }
}

pub fn normalize_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Cellules brutes d'une ligne du tableau (affichage/debug).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftEntry {
    pub day: u32,
    pub shifts: Vec<String>,
}

/// Résultat complet du parsing d'un tableau de garde.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftData {
    pub month: String,
    pub entries: Vec<ShiftEntry>,
    pub all_shifts: Vec<ShiftInterval>,
}

impl ShiftData {
    pub fn shifts_on_day(&self, day: u32) -> Vec<&ShiftInterval> {
        self.all_shifts.iter().filter(|s| s.day == day).collect()
    }

    /// Médecins dans l'ordre de première apparition.
    pub fn doctors(&self) -> IndexSet<&str> {
        doctors_of(&self.all_shifts)
    }

    pub fn days(&self) -> BTreeSet<u32> {
        days_of(&self.all_shifts)
    }
}

pub fn doctors_of(shifts: &[ShiftInterval]) -> IndexSet<&str> {
    shifts.iter().map(|s| s.doctor_name.as_str()).collect()
}

pub fn days_of(shifts: &[ShiftInterval]) -> BTreeSet<u32> {
    shifts.iter().map(|s| s.day).collect()
}

/// Intervalles d'un médecin un jour donné, dans l'ordre d'origine.
pub fn shifts_for<'a>(shifts: &'a [ShiftInterval], doctor: &str, day: u32) -> Vec<&'a ShiftInterval> {
    shifts
        .iter()
        .filter(|s| s.day == day && s.doctor_name == doctor)
        .collect()
}
