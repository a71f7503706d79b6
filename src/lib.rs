#![forbid(unsafe_code)]
//! Garde — analyse de tableaux de garde mensuels (sans BD).
//!
//! - Grille brute (CSV) → intervalles typés (24h, matin/soir, 16h, 8h).
//! - Contrôles : doublons, chevauchements, repos insuffisant.
//! - Statistiques par médecin, propositions d'échanges à heures constantes.
//! - Fonctions pures sur un instantané immuable ; aucun état partagé.

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod parser;
pub mod stats;
pub mod swap;
pub mod validation;

pub use config::{load_settings, Settings};
pub use error::RosterError;
pub use io::{analyze, load_shift_data, read_grid, AnalysisReport};
pub use model::{RosterTime, ShiftData, ShiftEntry, ShiftInterval, ShiftKind};
pub use parser::{classify_header, parse_rows, CellRule, ColumnClass};
pub use stats::{aggregate, aggregate_by_hours, sort_statistics, DoctorStatistics, RosterSummary, StatsSort};
pub use swap::{suggest_for_error, suggest_swaps, SwapOptions, SwapQuery, SwapSuggestion};
pub use validation::{
    overlap, validate, validate_with, ErrorKind, Severity, ValidationError, ValidationOptions,
};
