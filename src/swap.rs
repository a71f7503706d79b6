//! Recherche d'échanges : pour un médecin/jour « problème », propose des couples
//! (médecin, jour) de même volume horaire, classés par nombre de conflits.

use crate::model::{days_of, doctors_of, normalize_name, shifts_for, ShiftInterval, ShiftKind};
use crate::validation::{overlap, rest_violations, ValidationError, DEFAULT_MIN_REST_HOURS};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// Options de recherche d'échanges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapOptions {
    pub min_rest_hours: f64,
    /// Au-delà, le candidat est écarté (pas seulement moins bien classé).
    pub max_conflicts: usize,
    pub max_results: usize,
}

impl Default for SwapOptions {
    fn default() -> Self {
        Self {
            min_rest_hours: DEFAULT_MIN_REST_HOURS,
            max_conflicts: 2,
            max_results: 15,
        }
    }
}

impl SwapOptions {
    /// Variante utilisée depuis une erreur de validation (liste plus courte).
    pub fn for_error() -> Self {
        Self {
            max_results: 10,
            ..Self::default()
        }
    }
}

/// Filtres optionnels sur l'espace de recherche.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapQuery {
    pub day_filter: Option<BTreeSet<u32>>,
    pub doctor_filter: Option<BTreeSet<String>>,
}

impl SwapQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_days<I: IntoIterator<Item = u32>>(mut self, days: I) -> Self {
        self.day_filter = Some(days.into_iter().collect());
        self
    }

    pub fn with_doctors<I, S>(mut self, doctors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.doctor_filter = Some(
            doctors
                .into_iter()
                .map(|d| normalize_name(d.as_ref()))
                .collect(),
        );
        self
    }

    fn allows_day(&self, day: u32) -> bool {
        self.day_filter.as_ref().map_or(true, |days| days.contains(&day))
    }

    fn allows_doctor(&self, doctor: &str) -> bool {
        self.doctor_filter
            .as_ref()
            .map_or(true, |doctors| doctors.contains(doctor))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapSuggestion {
    pub problem_doctor: String,
    pub problem_day: u32,
    pub problem_shifts: Vec<ShiftKind>,
    pub candidate_doctor: String,
    pub candidate_day: u32,
    pub candidate_shifts: Vec<ShiftKind>,
    /// Total d'heures échangé de chaque côté.
    pub hours: u32,
    pub reasoning: String,
    pub conflicts: Vec<String>,
}

impl SwapSuggestion {
    pub fn is_recommended(&self) -> bool {
        self.conflicts.is_empty()
    }
}

fn total_hours(shifts: &[&ShiftInterval]) -> u32 {
    shifts.iter().map(|s| s.hours).sum()
}

fn kinds(shifts: &[&ShiftInterval]) -> Vec<ShiftKind> {
    shifts.iter().map(|s| s.shift_type).collect()
}

fn kinds_label(kinds: &[ShiftKind]) -> String {
    kinds
        .iter()
        .map(|k| k.label())
        .collect::<Vec<_>>()
        .join("+")
}

/// Un côté de l'échange : `doctor` quitte `vacated_day` et reçoit `incoming`.
struct Side<'a> {
    doctor: &'a str,
    vacated_day: u32,
    incoming: &'a [&'a ShiftInterval],
}

/// Conflits « même jour » : les gardes reçues contre celles déjà tenues ce jour-là.
fn same_day_conflicts(all: &[ShiftInterval], side: &Side<'_>, target_day: u32) -> Vec<String> {
    let held = shifts_for(all, side.doctor, target_day);
    let mut out = Vec::new();
    for incoming in side.incoming {
        for existing in &held {
            if overlap(incoming, existing) {
                out.push(format!(
                    "{} already has a {} shift on day {} that clashes with the incoming {} shift",
                    side.doctor, existing.shift_type, target_day, incoming.shift_type
                ));
            }
        }
    }
    out
}

/// Rejoue le contrôle de repos sur la chronologie simulée du médecin.
fn rest_conflicts(all: &[ShiftInterval], side: &Side<'_>, min_rest_hours: f64) -> Vec<String> {
    let received: Vec<ShiftInterval> = side
        .incoming
        .iter()
        .map(|s| s.reassigned_to(side.doctor))
        .collect();
    let mut timeline: Vec<&ShiftInterval> = all
        .iter()
        .filter(|s| s.doctor_name == side.doctor && s.day != side.vacated_day)
        .collect();
    timeline.extend(received.iter());

    rest_violations(&timeline, min_rest_hours)
        .iter()
        .map(|v| {
            format!(
                "{}: only {:.1}h rest between day {} ({}) and day {} ({})",
                side.doctor,
                v.rest_hours,
                v.before.day,
                v.before.shift_type,
                v.after.day,
                v.after.shift_type
            )
        })
        .collect()
}

/// Propose des échanges pour `(problem_doctor, problem_day)`.
///
/// Seuls les candidats de volume horaire strictement égal sont évalués ; ceux qui
/// dépassent `max_conflicts` sont écartés. Le tri (stable) se fait par nombre de
/// conflits croissant, puis la liste est tronquée à `max_results`.
pub fn suggest_swaps(
    shifts: &[ShiftInterval],
    problem_doctor: &str,
    problem_day: u32,
    query: &SwapQuery,
    opts: SwapOptions,
) -> Vec<SwapSuggestion> {
    let problem_doctor = normalize_name(problem_doctor);
    let problem_shifts = shifts_for(shifts, &problem_doctor, problem_day);
    if problem_shifts.is_empty() {
        debug!(doctor = %problem_doctor, day = problem_day, "no shifts to swap");
        return Vec::new();
    }
    let problem_hours = total_hours(&problem_shifts);
    let problem_kinds = kinds(&problem_shifts);

    let days: Vec<u32> = days_of(shifts)
        .into_iter()
        .filter(|d| *d != problem_day && query.allows_day(*d))
        .collect();
    let doctors: Vec<&str> = doctors_of(shifts)
        .into_iter()
        .filter(|d| *d != problem_doctor && query.allows_doctor(d))
        .collect();

    let mut evaluated = 0usize;
    let mut out = Vec::new();
    for &candidate_day in &days {
        for &candidate_doctor in &doctors {
            let candidate_shifts = shifts_for(shifts, candidate_doctor, candidate_day);
            if candidate_shifts.is_empty() || total_hours(&candidate_shifts) != problem_hours {
                continue;
            }
            evaluated += 1;

            let gains_candidate = Side {
                doctor: &problem_doctor,
                vacated_day: problem_day,
                incoming: &candidate_shifts,
            };
            let gains_problem = Side {
                doctor: candidate_doctor,
                vacated_day: candidate_day,
                incoming: &problem_shifts,
            };

            let mut conflicts = same_day_conflicts(shifts, &gains_candidate, candidate_day);
            conflicts.extend(same_day_conflicts(shifts, &gains_problem, problem_day));
            conflicts.extend(rest_conflicts(shifts, &gains_candidate, opts.min_rest_hours));
            conflicts.extend(rest_conflicts(shifts, &gains_problem, opts.min_rest_hours));

            if conflicts.len() > opts.max_conflicts {
                continue;
            }

            let candidate_kinds = kinds(&candidate_shifts);
            let reasoning = format!(
                "{problem_doctor} takes {candidate_doctor}'s {} on day {candidate_day} and {candidate_doctor} takes {problem_doctor}'s {} on day {problem_day} ({problem_hours} hours each).",
                kinds_label(&candidate_kinds),
                kinds_label(&problem_kinds),
            );
            out.push(SwapSuggestion {
                problem_doctor: problem_doctor.clone(),
                problem_day,
                problem_shifts: problem_kinds.clone(),
                candidate_doctor: candidate_doctor.to_string(),
                candidate_day,
                candidate_shifts: candidate_kinds,
                hours: problem_hours,
                reasoning,
                conflicts,
            });
        }
    }

    out.sort_by_key(|s| s.conflicts.len());
    out.truncate(opts.max_results);
    debug!(
        doctor = %problem_doctor,
        day = problem_day,
        evaluated,
        suggestions = out.len(),
        "swap search done"
    );
    out
}

/// Échanges pour le médecin/jour porté par une erreur ; vide si l'erreur n'en porte pas.
pub fn suggest_for_error(
    shifts: &[ShiftInterval],
    error: &ValidationError,
    opts: SwapOptions,
) -> Vec<SwapSuggestion> {
    match (error.doctor.as_deref(), error.day) {
        (Some(doctor), Some(day)) => suggest_swaps(shifts, doctor, day, &SwapQuery::new(), opts),
        _ => Vec::new(),
    }
}
