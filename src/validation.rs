//! Contrôles du tableau : doublons, chevauchements le même jour, repos insuffisant.

use crate::model::ShiftInterval;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

pub const DEFAULT_MIN_REST_HOURS: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Duplicate,
    Overlap,
    Format,
}

/// Aucune règle actuelle ne produit `Warning`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<String>,
    pub severity: Severity,
}

impl ValidationError {
    fn error(kind: ErrorKind, doctor: &str, day: u32, message: String) -> Self {
        Self {
            kind,
            message,
            day: Some(day),
            doctor: Some(doctor.to_string()),
            severity: Severity::Error,
        }
    }

    /// Clé de dédoublonnage : (type, jour, médecin, message).
    fn key(&self) -> (ErrorKind, Option<u32>, Option<&str>, &str) {
        (self.kind, self.day, self.doctor.as_deref(), self.message.as_str())
    }
}

/// Options de contrôle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    pub min_rest_hours: f64,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            min_rest_hours: DEFAULT_MIN_REST_HOURS,
        }
    }
}

/// Deux gardes du même médecin le même jour sont incompatibles si l'une est de
/// 24 h, ou si ce sont deux moitiés identiques (matin+matin, soir+soir).
pub fn overlap(a: &ShiftInterval, b: &ShiftInterval) -> bool {
    use crate::model::ShiftKind::Full;
    if a.shift_type == Full || b.shift_type == Full {
        return true;
    }
    a.shift_type == b.shift_type && a.shift_type.is_split_half()
}

/// Repos insuffisant entre deux gardes consécutives d'un même médecin.
#[derive(Debug, Clone, Copy)]
pub struct RestViolation<'a> {
    pub before: &'a ShiftInterval,
    pub after: &'a ShiftInterval,
    pub rest_hours: f64,
}

impl RestViolation<'_> {
    pub fn describe(&self, min_rest_hours: f64) -> String {
        format!(
            "Doctor \"{}\" has only {:.1} hours of rest between the {} shift on day {} and the {} shift on day {} (minimum {}).",
            self.before.doctor_name,
            self.rest_hours,
            self.before.shift_type,
            self.before.day,
            self.after.shift_type,
            self.after.day,
            min_rest_hours
        )
    }
}

/// Trie la chronologie d'un médecin par début et relève chaque paire
/// consécutive dont le repos est sous le seuil (les jours vides sont sautés).
pub fn rest_violations<'a>(
    timeline: &[&'a ShiftInterval],
    min_rest_hours: f64,
) -> Vec<RestViolation<'a>> {
    let mut sorted = timeline.to_vec();
    sorted.sort_by_key(|s| s.start_date_time);
    sorted
        .windows(2)
        .filter_map(|pair| {
            let (before, after) = (pair[0], pair[1]);
            let rest_hours = before.rest_before(after);
            (rest_hours < min_rest_hours).then_some(RestViolation {
                before,
                after,
                rest_hours,
            })
        })
        .collect()
}

pub fn validate(shifts: &[ShiftInterval]) -> Vec<ValidationError> {
    validate_with(shifts, ValidationOptions::default())
}

/// Recalcule l'intégralité des erreurs ; fonction pure et idempotente.
pub fn validate_with(shifts: &[ShiftInterval], opts: ValidationOptions) -> Vec<ValidationError> {
    let by_day = group_by_day_and_doctor(shifts);

    let mut out = duplicate_errors(&by_day);
    out.extend(same_day_overlaps(&by_day));
    out.extend(rest_errors(shifts, opts));

    let errors = dedup(out);
    debug!(shifts = shifts.len(), errors = errors.len(), "roster validated");
    errors
}

/// Comptes (erreurs, avertissements).
pub fn error_counts(errors: &[ValidationError]) -> (usize, usize) {
    let warnings = errors
        .iter()
        .filter(|e| e.severity == Severity::Warning)
        .count();
    (errors.len() - warnings, warnings)
}

type DayGroups<'a> = BTreeMap<(u32, &'a str), Vec<&'a ShiftInterval>>;

fn group_by_day_and_doctor(shifts: &[ShiftInterval]) -> DayGroups<'_> {
    let mut groups: DayGroups<'_> = BTreeMap::new();
    for s in shifts {
        groups
            .entry((s.day, s.doctor_name.as_str()))
            .or_default()
            .push(s);
    }
    groups
}

fn duplicate_errors(groups: &DayGroups<'_>) -> Vec<ValidationError> {
    let mut out = Vec::new();
    for (&(day, doctor), shifts) in groups {
        if shifts.len() < 2 {
            continue;
        }
        let mut kinds = HashSet::new();
        let repeated = shifts.iter().any(|s| !kinds.insert(s.shift_type));
        let has_full = kinds.contains(&crate::model::ShiftKind::Full);
        if repeated || has_full {
            out.push(ValidationError::error(
                ErrorKind::Duplicate,
                doctor,
                day,
                format!(
                    "Doctor \"{doctor}\" appears {} times on day {day}",
                    shifts.len()
                ),
            ));
        }
    }
    out
}

fn same_day_overlaps(groups: &DayGroups<'_>) -> Vec<ValidationError> {
    let mut out = Vec::new();
    for (&(day, doctor), shifts) in groups {
        let first_clash = shifts.iter().enumerate().find_map(|(i, a)| {
            shifts
                .iter()
                .skip(i + 1)
                .find(|b| overlap(a, b))
                .map(|b| (*a, *b))
        });
        if let Some((a, b)) = first_clash {
            out.push(ValidationError::error(
                ErrorKind::Overlap,
                doctor,
                day,
                format!(
                    "Doctor \"{doctor}\" has overlapping shifts on day {day} ({} and {})",
                    a.shift_type, b.shift_type
                ),
            ));
        }
    }
    out
}

fn rest_errors(shifts: &[ShiftInterval], opts: ValidationOptions) -> Vec<ValidationError> {
    let mut by_doctor: IndexMap<&str, Vec<&ShiftInterval>> = IndexMap::new();
    for s in shifts {
        by_doctor.entry(s.doctor_name.as_str()).or_default().push(s);
    }

    by_doctor
        .values()
        .flat_map(|timeline| rest_violations(timeline, opts.min_rest_hours))
        .map(|v| {
            ValidationError::error(
                ErrorKind::Overlap,
                &v.before.doctor_name,
                v.before.day,
                v.describe(opts.min_rest_hours),
            )
        })
        .collect()
}

fn dedup(errors: Vec<ValidationError>) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(errors.len());
    for e in errors {
        let key = {
            let (kind, day, doctor, message) = e.key();
            (kind, day, doctor.map(str::to_owned), message.to_owned())
        };
        if seen.insert(key) {
            out.push(e);
        }
    }
    out
}
