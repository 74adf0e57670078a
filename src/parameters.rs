//! Model configuration, loadable from JSON.
//!
//! ```json
//! {
//!     "seed": 123,
//!     "population": 400,
//!     "half_width": 20.0,
//!     "half_height": 20.0,
//!     "neighbor_range": 5.0,
//!     "contagions": [
//!         {
//!             "name": "COVID",
//!             "mean_duration": 15.0,
//!             "duration_std_dev": 3.5,
//!             "transmission_probability": 0.01,
//!             "immunity_loss_probability": 0.02
//!         }
//!     ],
//!     "reproduction_accounting": "on_cure",
//!     "movement": { "type": "random_walk", "step_std_dev": 0.5 }
//! }
//! ```
//!
//! Any field may be omitted and falls back to its value in
//! [`ModelParameters::default`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contagion::ContagionType;
use crate::error::ContagionError;
use crate::HashSet;

/// Whether instances report their onward infections to their contagion's reproduction
/// accumulator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReproductionAccounting {
    /// Nothing is recorded, so every contagion reports the neutral reproduction number 1.
    #[default]
    Unpopulated,
    /// A cured instance records its onward infection count in the tick it is cured.
    OnCure,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MovementConfig {
    #[default]
    Stationary,
    RandomWalk { step_std_dev: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    pub seed: u64,
    pub population: usize,
    /// People are placed uniformly in `[-half_width, half_width) x [-half_height, half_height)`.
    pub half_width: f64,
    pub half_height: f64,
    /// Contact radius; also the side of a spatial index cell.
    pub neighbor_range: f64,
    pub contagions: Vec<ContagionType>,
    pub reproduction_accounting: ReproductionAccounting,
    pub movement: MovementConfig,
}

impl Default for ModelParameters {
    fn default() -> Self {
        ModelParameters {
            seed: 0,
            population: 400,
            half_width: 20.0,
            half_height: 20.0,
            neighbor_range: 5.0,
            contagions: vec![ContagionType::covid()],
            reproduction_accounting: ReproductionAccounting::default(),
            movement: MovementConfig::default(),
        }
    }
}

impl ModelParameters {
    /// Reads and validates parameters from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read, isn't valid JSON for this struct, or fails
    /// [`ModelParameters::validate`].
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<ModelParameters, ContagionError> {
        let contents = fs::read_to_string(path)?;
        let parameters: ModelParameters = serde_json::from_str(&contents)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// # Errors
    ///
    /// Returns `ContagionError::InvalidParameter` describing the first problem found.
    pub fn validate(&self) -> Result<(), ContagionError> {
        for (field, value) in [
            ("half_width", self.half_width),
            ("half_height", self.half_height),
            ("neighbor_range", self.neighbor_range),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{field} must be positive, got {value}").into());
            }
        }

        if let MovementConfig::RandomWalk { step_std_dev } = self.movement {
            if !(step_std_dev.is_finite() && step_std_dev >= 0.0) {
                return Err("movement step_std_dev must be non-negative".into());
            }
        }

        let mut names = HashSet::default();
        for contagion in &self.contagions {
            contagion.validate()?;
            if !names.insert(contagion.name.as_str()) {
                return Err(format!("duplicate contagion name {}", contagion.name).into());
            }
        }
        Ok(())
    }
}
