use crate::model::{ShiftInterval, ShiftKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::str::FromStr;

/// Totaux par médecin (dérivés, lecture seule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorStatistics {
    pub name: String,
    pub total_days: usize,
    pub total_hours: u32,
    pub shifts24h: usize,
    /// Matin + soir.
    pub shifts12h: usize,
    pub shifts16h: usize,
    pub shifts8h: usize,
    /// Jours distincts, dans l'ordre de première apparition.
    pub days_list: Vec<u32>,
}

impl DoctorStatistics {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            total_days: 0,
            total_hours: 0,
            shifts24h: 0,
            shifts12h: 0,
            shifts16h: 0,
            shifts8h: 0,
            days_list: Vec::new(),
        }
    }

    fn record(&mut self, shift: &ShiftInterval) {
        if !self.days_list.contains(&shift.day) {
            self.days_list.push(shift.day);
            self.total_days += 1;
        }
        self.total_hours += shift.hours;
        match shift.shift_type {
            ShiftKind::Full => self.shifts24h += 1,
            ShiftKind::Morning | ShiftKind::Evening => self.shifts12h += 1,
            ShiftKind::Long => self.shifts16h += 1,
            ShiftKind::Day => self.shifts8h += 1,
        }
    }

    pub fn sorted_days(&self) -> Vec<u32> {
        let mut days = self.days_list.clone();
        days.sort_unstable();
        days
    }
}

/// Réduction brute : un enregistrement par médecin, dans l'ordre de première apparition.
pub fn aggregate(shifts: &[ShiftInterval]) -> Vec<DoctorStatistics> {
    let mut by_doctor: IndexMap<&str, DoctorStatistics> = IndexMap::new();
    for s in shifts {
        by_doctor
            .entry(s.doctor_name.as_str())
            .or_insert_with(|| DoctorStatistics::empty(&s.doctor_name))
            .record(s);
    }
    by_doctor.into_values().collect()
}

/// Présentation par défaut : heures décroissantes.
pub fn aggregate_by_hours(shifts: &[ShiftInterval]) -> Vec<DoctorStatistics> {
    let mut stats = aggregate(shifts);
    sort_statistics(&mut stats, StatsSort::Hours);
    stats
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatsSort {
    #[default]
    Hours,
    Days,
    Name,
}

impl FromStr for StatsSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hours" => Ok(StatsSort::Hours),
            "days" => Ok(StatsSort::Days),
            "name" => Ok(StatsSort::Name),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

/// Retri stable sans recalcul.
pub fn sort_statistics(stats: &mut [DoctorStatistics], by: StatsSort) {
    match by {
        StatsSort::Hours => stats.sort_by_key(|s| Reverse(s.total_hours)),
        StatsSort::Days => stats.sort_by_key(|s| Reverse(s.total_days)),
        StatsSort::Name => stats.sort_by(|a, b| a.name.cmp(&b.name)),
    }
}

/// Indicateurs globaux du mois.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSummary {
    pub total_doctors: usize,
    pub total_shifts: usize,
    pub total_hours: u32,
    pub average_hours_per_doctor: f64,
}

pub fn summarize(shifts: &[ShiftInterval], stats: &[DoctorStatistics]) -> RosterSummary {
    let total_hours: u32 = stats.iter().map(|s| s.total_hours).sum();
    let average_hours_per_doctor = if stats.is_empty() {
        0.0
    } else {
        f64::from(total_hours) / stats.len() as f64
    };
    RosterSummary {
        total_doctors: stats.len(),
        total_shifts: shifts.len(),
        total_hours,
        average_hours_per_doctor,
    }
}
