#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_doc_code_examples)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

pub mod builder;
pub mod conditions;
pub mod config;
pub mod errors;
pub mod latex;
pub mod modes;
pub mod params;
pub mod shape;
pub mod solver;
pub mod symbolic;

pub use builder::{
    build_coefficient_matrix, eliminate_frequency, solve_ab, CharacteristicFunction,
    CoefficientMatrix, Derivation, EliminationSolution,
};
pub use conditions::{
    boundary_conditions, BeamEnd, BoundaryConditions, BoundarySystem, EndCondition, Support,
};
pub use config::{AnalysisConfig, EndsConfig};
pub use errors::{
    AnalysisError, ConfigError, DerivationError, InstantiationError, ParameterError, SolverError,
    SymbolicError,
};
pub use latex::{LatexDocument, LatexSection, ToLatex};
pub use modes::{mode_shape, ModeShape};
pub use params::{pipe_area, pipe_second_moment, BeamParameters};
pub use shape::{derive_shape_function, BeamSymbols, ShapeFunction};
pub use solver::{
    bisection, instantiate, instantiate_with, natural_frequency, scan_and_bisect, scan_with,
    BeamModel, Bisection, Mode, NumericCharacteristic, RootScan, ScanSettings,
};
pub use symbolic::{Equation, Expr, Symbol};
