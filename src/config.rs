//! JSON configuration for a complete analysis run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::conditions::{BoundaryConditions, Support};
use crate::errors::{ConfigError, ParameterError};
use crate::params::BeamParameters;
use crate::solver::ScanSettings;

/// Supports at both ends of the beam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndsConfig {
    /// Support at `x = 0`.
    #[serde(default = "default_fixed")]
    pub fixed: Support,
    /// Support at `x = L`.
    #[serde(default = "default_free")]
    pub free: Support,
}

impl Default for EndsConfig {
    fn default() -> Self {
        Self {
            fixed: default_fixed(),
            free: default_free(),
        }
    }
}

fn default_fixed() -> Support {
    Support::Clamped
}

fn default_free() -> Support {
    Support::TipMass
}

/// Everything the command line tool needs for one run.
///
/// ```json
/// {
///   "beam": { "E": 2.06e11, "D": 0.114, "d": 0.109, "L": 3.3, "M": 15.4, "rho": 7850 },
///   "modes": 3,
///   "ends": { "fixed": "clamped", "free": "tip_mass" },
///   "latex": "out/derivation.tex"
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Beam parameter mapping with keys `E`, `D`, `d`, `L`, `M`, `rho` and
    /// optionally `J`.
    pub beam: HashMap<String, f64>,
    /// Root scan settings.
    #[serde(default)]
    pub scan: ScanSettings,
    /// Number of modes to report.
    #[serde(default = "default_modes")]
    pub modes: usize,
    /// End supports.
    #[serde(default)]
    pub ends: EndsConfig,
    /// Where to write the LaTeX derivation, if anywhere.
    #[serde(default)]
    pub latex: Option<PathBuf>,
}

fn default_modes() -> usize {
    3
}

impl Default for AnalysisConfig {
    /// The reference steel pipe.
    fn default() -> Self {
        let beam = BeamParameters::default();
        Self {
            beam: HashMap::from([
                ("E".to_string(), beam.elastic_modulus()),
                ("D".to_string(), beam.outer_diameter()),
                ("d".to_string(), beam.inner_diameter()),
                ("L".to_string(), beam.length()),
                ("M".to_string(), beam.tip_mass()),
                ("rho".to_string(), beam.density()),
            ]),
            scan: ScanSettings::default(),
            modes: default_modes(),
            ends: EndsConfig::default(),
            latex: None,
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input and
    /// [`ConfigError::Parameter`] when the beam section is invalid.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.parameters()?;
        Ok(config)
    }

    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise
    /// as [`AnalysisConfig::from_json`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Validated beam parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] for a missing key or an invalid value.
    pub fn parameters(&self) -> Result<BeamParameters, ParameterError> {
        BeamParameters::from_map(&self.beam)
    }

    /// Boundary conditions named by [`AnalysisConfig::ends`].
    #[must_use]
    pub fn boundary_conditions(&self) -> BoundaryConditions {
        BoundaryConditions::new(self.ends.fixed, self.ends.free)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = AnalysisConfig::from_json(
            r#"{ "beam": { "E": 2.06e11, "D": 0.114, "d": 0.109, "L": 3.3, "M": 15.4, "rho": 7850 } }"#,
        )
        .expect("valid configuration");
        assert_eq!(config.modes, 3);
        assert_eq!(config.ends, EndsConfig::default());
        assert_eq!(config.latex, None);
        assert_relative_eq!(config.scan.step, 1e-3);
        assert_eq!(config.boundary_conditions().describe(), "clamped / tip mass");
    }

    #[test]
    fn ends_and_output_are_read() {
        let config = AnalysisConfig::from_json(
            r#"{
                "beam": { "E": 2.06e11, "D": 0.114, "d": 0.109, "L": 3.3, "M": 0, "rho": 7850, "J": 0.2 },
                "modes": 5,
                "ends": { "free": "tip_mass_with_inertia" },
                "latex": "out/beam.tex"
            }"#,
        )
        .expect("valid configuration");
        assert_eq!(config.modes, 5);
        assert_eq!(config.ends.fixed, Support::Clamped);
        assert_eq!(config.ends.free, Support::TipMassWithInertia);
        assert_eq!(config.latex, Some(PathBuf::from("out/beam.tex")));
        let params = config.parameters().expect("valid beam");
        assert_relative_eq!(params.tip_inertia(), 0.2);
    }

    #[test]
    fn missing_beam_key_is_a_parameter_error() {
        let error = AnalysisConfig::from_json(r#"{ "beam": { "E": 2.06e11 } }"#)
            .expect_err("incomplete beam");
        assert!(matches!(
            error,
            ConfigError::Parameter(ParameterError::MissingKey("D"))
        ));
    }

    #[test]
    fn malformed_json_is_reported() {
        let error = AnalysisConfig::from_json("{ beam: }").expect_err("not JSON");
        assert!(matches!(error, ConfigError::Json(_)));
    }

    #[test]
    fn default_config_matches_reference_beam() {
        let params = AnalysisConfig::default()
            .parameters()
            .expect("reference beam is valid");
        assert_eq!(params, BeamParameters::default());
    }
}
