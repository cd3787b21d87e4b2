use std::{fs, num::NonZeroUsize, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{FontError, Result};

const DEFAULT_ITERATIONS: NonZeroUsize = NonZeroUsize::new(10_000_000).unwrap();
const DEFAULT_PROGRESS_EVERY: NonZeroUsize = NonZeroUsize::new(100_000).unwrap();

/// The knobs of a search run.
///
/// Every field has a default, so a JSON file only needs the ones it changes:
///
/// ```json
/// { "iterations": 2000, "seed": 7 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Iteration budget, also the length of the cooling schedule.
    pub iterations: NonZeroUsize,
    pub initial_temperature: f64,
    /// Standard deviation of a perturbation step.
    pub learning_rate: f64,
    pub seed: u64,
    /// Log progress every this many iterations, `null` disables it.
    pub progress_every: Option<NonZeroUsize>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            initial_temperature: 120.,
            learning_rate: 0.01,
            seed: 0,
            progress_every: Some(DEFAULT_PROGRESS_EVERY),
        }
    }
}

impl SearchConfig {
    /// Checks the values that the types alone cannot.
    ///
    /// # Errors
    /// Returns `FontError::InvalidConfig` if the temperature or the learning rate is not
    /// finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_temperature.is_finite() && self.initial_temperature > 0.) {
            return Err(FontError::InvalidConfig(format!(
                "initial_temperature must be finite and > 0, got {}",
                self.initial_temperature
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.) {
            return Err(FontError::InvalidConfig(format!(
                "learning_rate must be finite and > 0, got {}",
                self.learning_rate
            )));
        }

        Ok(())
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads a JSON configuration file, see [`SearchConfig::from_json_str`].
    pub fn from_json_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let cfg = SearchConfig::default();
        assert_eq!(cfg.iterations.get(), 10_000_000);
        assert_eq!(cfg.initial_temperature, 120.);
        assert_eq!(cfg.learning_rate, 0.01);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg = SearchConfig::from_json_str(r#"{ "iterations": 2000, "seed": 7 }"#).unwrap();
        assert_eq!(cfg.iterations.get(), 2000);
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.initial_temperature, 120.);
        assert_eq!(cfg.progress_every, Some(DEFAULT_PROGRESS_EVERY));
    }

    #[test]
    fn progress_can_be_disabled() {
        let cfg = SearchConfig::from_json_str(r#"{ "progress_every": null }"#).unwrap();
        assert_eq!(cfg.progress_every, None);
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let err = SearchConfig::from_json_str(r#"{ "iterations": 0 }"#).unwrap_err();
        assert!(matches!(err, FontError::Json(_)));
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(SearchConfig::from_json_str(r#"{ "epochs": 10 }"#).is_err());
    }

    #[test]
    fn non_positive_values_are_rejected() {
        let err = SearchConfig::from_json_str(r#"{ "learning_rate": 0.0 }"#).unwrap_err();
        assert!(matches!(err, FontError::InvalidConfig(_)));

        let cfg = SearchConfig {
            initial_temperature: -1.,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn component_checks_report_like_the_config() {
        use crate::{annealing::Schedule, params::ParameterSpace};

        let cold = SearchConfig {
            initial_temperature: 0.,
            ..Default::default()
        };
        let schedule_err = Schedule::new(0., cold.iterations).unwrap_err();
        assert_eq!(
            schedule_err.to_string(),
            cold.validate().unwrap_err().to_string()
        );

        let frozen = SearchConfig {
            learning_rate: -0.5,
            ..Default::default()
        };
        let space_err = ParameterSpace::new(-0.5).unwrap_err();
        assert_eq!(
            space_err.to_string(),
            frozen.validate().unwrap_err().to_string()
        );
    }
}
