use crate::error::RosterError;
use crate::swap::SwapOptions;
use crate::validation::ValidationOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Réglages des contrôles et de la recherche d'échanges (fichier JSON, champs facultatifs).
///
/// ```json
/// { "validation": { "min_rest_hours": 8 }, "swaps": { "max_conflicts": 2, "max_results": 15 } }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub validation: ValidationOptions,
    pub swaps: SwapOptions,
}

impl Settings {
    pub fn validate(&self) -> Result<(), RosterError> {
        for (field, value) in [
            ("validation.min_rest_hours", self.validation.min_rest_hours),
            ("swaps.min_rest_hours", self.swaps.min_rest_hours),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(RosterError::Config(format!(
                    "{field} must be a non-negative number"
                )));
            }
        }
        if self.swaps.max_results == 0 {
            return Err(RosterError::Config("swaps.max_results must be > 0".into()));
        }
        Ok(())
    }
}

pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings, RosterError> {
    let path = path.as_ref();
    let data = fs::read(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Settings = serde_json::from_slice(&data)?;
    settings.validate()?;
    Ok(settings)
}
