use eulerbeam::{AnalysisConfig, AnalysisError, BeamModel, BeamParameters, Derivation, Mode};
use tracing::info;

/// Summary of one eigenfrequency analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    /// End conditions, for example `clamped / tip mass`.
    pub conditions: String,
    /// Normalized characteristic function in plain text.
    pub characteristic: String,
    /// Parameters the roots were computed for.
    pub parameters: BeamParameters,
    /// Modes in ascending order.
    pub modes: Vec<Mode>,
    /// Number of modes requested.
    pub requested: usize,
}

/// Derive the characteristic equation for the configured ends, optionally
/// write it as LaTeX, and solve for the requested number of modes.
///
/// The frequency equation follows the classical treatment at
/// <https://en.wikipedia.org/wiki/Euler%E2%80%93Bernoulli_beam_theory#Dynamic_analysis>.
pub fn run_analysis(config: &AnalysisConfig) -> Result<AnalysisSummary, AnalysisError> {
    let parameters = config.parameters()?;
    let conditions = config.boundary_conditions();
    let derivation = Derivation::new(&conditions)?;

    if let Some(path) = &config.latex {
        let title = format!("Characteristic equation of a {} beam", conditions.describe());
        derivation.to_document(&title).write(path)?;
    }

    let characteristic = derivation.characteristic.normalized.to_string();
    let model = BeamModel::new(derivation, parameters)?.with_settings(config.scan);
    let modes = model.modes(config.modes);
    info!(modes = modes.len(), "analysis complete");

    Ok(AnalysisSummary {
        conditions: conditions.describe(),
        characteristic,
        parameters,
        modes,
        requested: config.modes,
    })
}
