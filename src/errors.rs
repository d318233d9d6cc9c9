//! Error types produced while deriving, instantiating and solving beam models.

use thiserror::Error;

use crate::symbolic::Symbol;

/// Error returned by the symbolic kernel when an operation has no exact result.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SymbolicError {
    /// Returned when a sum of several terms would have to be inverted.
    #[error("`{0}` has no single-term inverse")]
    NonMonomialInverse(String),
    /// Returned when zero would have to be inverted.
    #[error("division by zero")]
    DivisionByZero,
    /// Returned when a shape derivative above the third is requested.
    #[error("shape function derivatives are available up to order 3 (requested {0})")]
    DerivativeOrder(usize),
}

/// Error returned when the characteristic equation cannot be derived.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DerivationError {
    /// Returned when the fixed-end equations do not determine both coefficients.
    ///
    /// This happens when the two equations are degenerate or contradictory in
    /// `first` and `second`, for example a pinned end which leaves the sine
    /// coefficient free.
    #[error(
        "fixed-end conditions cannot be solved for {first} and {second}; check the boundary condition definitions"
    )]
    UnsolvableSystem {
        /// First eliminated coefficient.
        first: Symbol,
        /// Second eliminated coefficient.
        second: Symbol,
    },
    /// Returned when the coefficient determinant vanishes for every wavenumber.
    #[error("characteristic determinant vanishes identically; the end conditions admit no discrete modes")]
    DegenerateDeterminant,
    /// Returned when a symbolic manipulation fails part way through.
    #[error(transparent)]
    Symbolic(#[from] SymbolicError),
}

/// Error returned by the numeric root solvers.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum SolverError {
    /// Returned when bisection is started on an interval that does not bracket a root.
    #[error("interval [{a}, {b}] has no sign change (f(a) = {fa:.3e}, f(b) = {fb:.3e})")]
    NoSignChange {
        /// Lower end of the interval.
        a: f64,
        /// Upper end of the interval.
        b: f64,
        /// Function value at `a`.
        fa: f64,
        /// Function value at `b`.
        fb: f64,
    },
}

/// Error returned when a symbolic expression cannot be turned into a numeric function.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InstantiationError {
    /// Returned when symbols other than the free variable remain unbound.
    #[error("no numeric value bound for {}", join(.symbols))]
    MissingParameter {
        /// Every unbound symbol, in sorted order.
        symbols: Vec<Symbol>,
    },
}

/// Error returned when beam parameters are missing or not physically meaningful.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ParameterError {
    /// Returned when a required key is absent from a parameter mapping.
    #[error("missing required beam parameter `{0}`")]
    MissingKey(&'static str),
    /// Returned when a parameter is NaN or infinite.
    #[error("beam parameter `{name}` must be finite (received {value})")]
    NonFinite {
        /// Name of the offending parameter.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Returned when a parameter that must be strictly positive is not.
    #[error("beam parameter `{name}` must be positive (received {value})")]
    NonPositive {
        /// Name of the offending parameter.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Returned when a parameter that must be non-negative is negative.
    #[error("beam parameter `{name}` must not be negative (received {value})")]
    Negative {
        /// Name of the offending parameter.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// Returned when the inner diameter is not smaller than the outer diameter.
    #[error("inner diameter {inner} must be smaller than outer diameter {outer}")]
    InnerExceedsOuter {
        /// Outer diameter in metres.
        outer: f64,
        /// Inner diameter in metres.
        inner: f64,
    },
}

/// Error returned while loading an analysis configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when the configuration file cannot be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
    /// Returned when the configuration is not valid JSON of the expected shape.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// Returned when the beam section of the configuration is invalid.
    #[error(transparent)]
    Parameter(#[from] ParameterError),
}

/// Error returned by a complete analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Returned when the configuration cannot be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Returned when the beam parameters are invalid.
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    /// Returned when the characteristic equation cannot be derived.
    #[error(transparent)]
    Derivation(#[from] DerivationError),
    /// Returned when the characteristic function cannot be evaluated.
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),
    /// Returned when the LaTeX document cannot be written.
    #[error("cannot write LaTeX document: {0}")]
    Io(#[from] std::io::Error),
}

/// Comma separated list of symbol names.
fn join(symbols: &[Symbol]) -> String {
    symbols
        .iter()
        .map(Symbol::name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_lists_symbols() {
        let error = InstantiationError::MissingParameter {
            symbols: vec![Symbol::new("J"), Symbol::new("k")],
        };
        assert_eq!(error.to_string(), "no numeric value bound for J, k");
    }

    #[test]
    fn symbolic_errors_convert_into_derivation_errors() {
        let error: DerivationError = SymbolicError::DivisionByZero.into();
        assert_eq!(error, DerivationError::Symbolic(SymbolicError::DivisionByZero));
        assert_eq!(error.to_string(), "division by zero");
    }
}
