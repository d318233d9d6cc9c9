//! Numeric roots of the characteristic function.
//!
//! The symbolic characteristic function is bound to concrete beam parameters
//! and scanned on a uniform grid. Every strict sign change between two
//! neighbouring grid points is refined by bisection. Roots where the function
//! touches zero without crossing (double roots) produce no sign change and are
//! therefore not reported.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uom::si::f64::Frequency;
use uom::si::frequency::hertz;

use crate::builder::{CharacteristicFunction, Derivation};
use crate::errors::{InstantiationError, SolverError};
use crate::modes::{mode_shape, ModeShape};
use crate::params::BeamParameters;
use crate::shape::BeamSymbols;
use crate::symbolic::{CompiledExpr, Symbol};

/// Grid and tolerance used by the root scan.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanSettings {
    /// Upper end of the scanned interval (exclusive).
    #[serde(default = "default_x_max")]
    pub x_max: f64,
    /// Grid spacing.
    #[serde(default = "default_step")]
    pub step: f64,
    /// First grid point. Zero is avoided because every characteristic
    /// function with a tip mass vanishes there trivially.
    #[serde(default = "default_start")]
    pub start: f64,
    /// Absolute tolerance on both the residual and the bracket half-width.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Bisection iteration cap.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            x_max: default_x_max(),
            step: default_step(),
            start: default_start(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

fn default_x_max() -> f64 {
    50.0
}

fn default_step() -> f64 {
    1.0e-3
}

fn default_start() -> f64 {
    1.0e-6
}

fn default_tolerance() -> f64 {
    1.0e-12
}

fn default_max_iterations() -> usize {
    200
}

/// The characteristic function with every parameter bound, as a function of
/// the dimensionless wavenumber alone.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericCharacteristic {
    compiled: CompiledExpr,
}

impl NumericCharacteristic {
    /// Value at wavenumber `a`.
    #[must_use]
    pub fn eval(&self, a: f64) -> f64 {
        self.compiled.eval(a)
    }

    /// Values at every wavenumber in `a`.
    #[must_use]
    pub fn eval_array(&self, a: &Array1<f64>) -> Array1<f64> {
        a.mapv(|value| self.eval(value))
    }

    /// Borrow as a plain closure for the scanning functions.
    pub fn as_fn(&self) -> impl Fn(f64) -> f64 + Clone + '_ {
        move |a| self.eval(a)
    }
}

/// Bind `L`, `M`, `J`, `m`, `E` and `I` from `params`.
///
/// # Errors
///
/// Returns [`InstantiationError::MissingParameter`] when the function refers
/// to a symbol the parameter record does not provide.
pub fn instantiate(
    characteristic: &CharacteristicFunction,
    params: &BeamParameters,
) -> Result<NumericCharacteristic, InstantiationError> {
    instantiate_with(characteristic, &params.bindings(&BeamSymbols::default()))
}

/// Bind every symbol other than the wavenumber from `bindings`.
///
/// # Errors
///
/// Returns [`InstantiationError::MissingParameter`] listing each unbound symbol.
pub fn instantiate_with(
    characteristic: &CharacteristicFunction,
    bindings: &BTreeMap<Symbol, f64>,
) -> Result<NumericCharacteristic, InstantiationError> {
    let compiled = characteristic
        .normalized
        .compile(&characteristic.wavenumber, bindings)?;
    Ok(NumericCharacteristic { compiled })
}

/// Result of one bisection run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bisection {
    /// Final midpoint.
    pub root: f64,
    /// Number of midpoints evaluated.
    pub iterations: usize,
    /// Whether a tolerance was met before the iteration cap.
    pub converged: bool,
}

/// Bisection on `[a, b]`.
///
/// Stops when `|f(mid)| < tolerance` or the half-width drops below
/// `tolerance`. When neither happens within `max_iterations` the last
/// midpoint is returned with `converged` unset.
///
/// # Errors
///
/// Returns [`SolverError::NoSignChange`] when `f(a)` and `f(b)` share a
/// strict sign.
///
/// # Examples
/// ```
/// use eulerbeam::bisection;
///
/// let result = bisection(|x| x * x - 2.0, 0.0, 2.0, 1e-12, 200).expect("bracketed");
/// assert!((result.root - 2f64.sqrt()).abs() < 1e-10);
/// assert!(result.converged);
/// ```
pub fn bisection<F>(
    f: F,
    a: f64,
    b: f64,
    tolerance: f64,
    max_iterations: usize,
) -> Result<Bisection, SolverError>
where
    F: Fn(f64) -> f64,
{
    let fa = f(a);
    let fb = f(b);
    if fa * fb > 0.0 {
        return Err(SolverError::NoSignChange { a, b, fa, fb });
    }
    Ok(refine(&f, a, b, fa, tolerance, max_iterations))
}

/// Bisection once the bracket is known to be valid.
fn refine<F>(f: &F, mut a: f64, mut b: f64, mut fa: f64, tolerance: f64, max_iterations: usize) -> Bisection
where
    F: Fn(f64) -> f64,
{
    let mut mid = 0.5 * (a + b);
    for iteration in 1..=max_iterations {
        mid = 0.5 * (a + b);
        let fm = f(mid);
        if fm.abs() < tolerance || 0.5 * (b - a) < tolerance {
            return Bisection {
                root: mid,
                iterations: iteration,
                converged: true,
            };
        }
        if fa * fm <= 0.0 {
            b = mid;
        } else {
            a = mid;
            fa = fm;
        }
    }
    Bisection {
        root: mid,
        iterations: max_iterations,
        converged: false,
    }
}

/// Lazy scan over a uniform grid yielding at most `limit` bisected roots in
/// ascending order.
///
/// Two scans built from the same inputs yield bit-identical sequences, and a
/// cloned or restarted scan replays the sequence from the beginning.
#[derive(Clone, Debug)]
pub struct RootScan<F> {
    function: F,
    settings: ScanSettings,
    points: usize,
    limit: usize,
    index: usize,
    found: usize,
    previous: Option<f64>,
}

impl<F> RootScan<F>
where
    F: Fn(f64) -> f64,
{
    /// Scan `function` with explicit settings.
    pub fn new(function: F, settings: ScanSettings, limit: usize) -> Self {
        Self {
            function,
            points: grid_len(&settings),
            settings,
            limit,
            index: 0,
            found: 0,
            previous: None,
        }
    }

    /// Number of grid points.
    #[must_use]
    pub fn points(&self) -> usize {
        self.points
    }

    /// `i`-th grid point.
    #[allow(clippy::cast_precision_loss)]
    fn point(&self, index: usize) -> f64 {
        self.settings.start + index as f64 * self.settings.step
    }

    /// Rewind to the first grid point.
    pub fn restart(&mut self) {
        self.index = 0;
        self.found = 0;
        self.previous = None;
    }
}

impl<F> Iterator for RootScan<F>
where
    F: Fn(f64) -> f64,
{
    type Item = Bisection;

    fn next(&mut self) -> Option<Self::Item> {
        while self.found < self.limit && self.index + 1 < self.points {
            let left = self.point(self.index);
            let right = self.point(self.index + 1);
            let f_left = self.previous.unwrap_or_else(|| (self.function)(left));
            let f_right = (self.function)(right);
            self.index += 1;
            self.previous = Some(f_right);
            if f_left * f_right < 0.0 {
                self.found += 1;
                return Some(refine(
                    &self.function,
                    left,
                    right,
                    f_left,
                    self.settings.tolerance,
                    self.settings.max_iterations,
                ));
            }
        }
        None
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn grid_len(settings: &ScanSettings) -> usize {
    let span = (settings.x_max - settings.start) / settings.step;
    if span.is_finite() && span > 0.0 {
        span.ceil() as usize
    } else {
        0
    }
}

/// Scan `[1e-6, x_max)` with spacing `step` for the first `n` roots, using the
/// default tolerance and iteration cap.
pub fn scan_and_bisect<F>(f: F, x_max: f64, step: f64, n: usize) -> RootScan<F>
where
    F: Fn(f64) -> f64,
{
    RootScan::new(
        f,
        ScanSettings {
            x_max,
            step,
            ..ScanSettings::default()
        },
        n,
    )
}

/// Scan with every setting supplied.
pub fn scan_with<F>(f: F, settings: &ScanSettings, n: usize) -> RootScan<F>
where
    F: Fn(f64) -> f64,
{
    RootScan::new(f, *settings, n)
}

/// Natural frequency in hertz of the dimensionless root `root`:
/// `root² · sqrt(E·I / (m·L⁴)) / 2π`.
#[must_use]
pub fn natural_frequency(root: f64, params: &BeamParameters) -> f64 {
    let stiffness = params.elastic_modulus() * params.second_moment();
    let inertia = params.mass_per_length() * params.length().powi(4);
    root * root * (stiffness / inertia).sqrt() / (2.0 * PI)
}

/// One vibration mode of a beam.
#[derive(Clone, Debug, PartialEq)]
pub struct Mode {
    /// One-based mode number.
    pub index: usize,
    /// Dimensionless root of the characteristic function.
    pub root: f64,
    /// Natural frequency in hertz.
    pub frequency_hz: f64,
    /// Whether bisection met its tolerance.
    pub converged: bool,
    /// Sampled mode shape, when requested.
    pub shape: Option<ModeShape>,
}

/// A derived characteristic function bound to one set of beam parameters.
#[derive(Clone, Debug)]
pub struct BeamModel {
    derivation: Derivation,
    params: BeamParameters,
    function: NumericCharacteristic,
    settings: ScanSettings,
}

impl BeamModel {
    /// Bind `params` to the characteristic function of `derivation`.
    ///
    /// # Errors
    ///
    /// Returns [`InstantiationError::MissingParameter`] when the derivation
    /// uses symbols the parameters do not bind.
    pub fn new(derivation: Derivation, params: BeamParameters) -> Result<Self, InstantiationError> {
        let function = instantiate(&derivation.characteristic, &params)?;
        Ok(Self {
            derivation,
            params,
            function,
            settings: ScanSettings::default(),
        })
    }

    /// Replace the scan settings.
    #[must_use]
    pub fn with_settings(self, settings: ScanSettings) -> Self {
        Self { settings, ..self }
    }

    /// Beam parameters.
    #[must_use]
    pub fn parameters(&self) -> &BeamParameters {
        &self.params
    }

    /// Symbolic derivation the model was built from.
    #[must_use]
    pub fn derivation(&self) -> &Derivation {
        &self.derivation
    }

    /// Numeric characteristic function.
    #[must_use]
    pub fn function(&self) -> &NumericCharacteristic {
        &self.function
    }

    /// Scan settings.
    #[must_use]
    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// The first `n` positive roots in ascending order.
    pub fn find_roots(&self, n: usize) -> Vec<Bisection> {
        let roots: Vec<Bisection> = scan_with(self.function.as_fn(), &self.settings, n).collect();
        for root in roots.iter().filter(|root| !root.converged) {
            warn!(root = root.root, iterations = root.iterations, "bisection did not converge");
        }
        if roots.len() < n {
            warn!(
                requested = n,
                found = roots.len(),
                x_max = self.settings.x_max,
                "fewer roots than requested in scan interval"
            );
        }
        info!(
            roots = ?roots.iter().map(|root| root.root).collect::<Vec<_>>(),
            "characteristic roots"
        );
        roots
    }

    /// Natural frequency in hertz of `root`.
    #[must_use]
    pub fn natural_frequency(&self, root: f64) -> f64 {
        natural_frequency(root, &self.params)
    }

    /// Natural frequency of `root` as a typed quantity.
    #[must_use]
    pub fn natural_frequency_quantity(&self, root: f64) -> Frequency {
        Frequency::new::<hertz>(self.natural_frequency(root))
    }

    /// The first `n` modes without shapes.
    pub fn modes(&self, n: usize) -> Vec<Mode> {
        self.find_roots(n)
            .into_iter()
            .enumerate()
            .map(|(position, root)| Mode {
                index: position + 1,
                root: root.root,
                frequency_hz: self.natural_frequency(root.root),
                converged: root.converged,
                shape: None,
            })
            .collect()
    }

    /// The first `n` modes with shapes sampled at `samples` points.
    ///
    /// # Errors
    ///
    /// Returns [`InstantiationError::MissingParameter`] when the boundary
    /// equations use a symbol the parameters do not bind.
    pub fn modes_with_shapes(&self, n: usize, samples: usize) -> Result<Vec<Mode>, InstantiationError> {
        self.modes(n)
            .into_iter()
            .map(|mode| {
                let shape = self.mode_shape(mode.root, samples)?;
                debug!(mode = mode.index, peak_at = shape.peak_position(), "mode shape");
                Ok(Mode {
                    shape: Some(shape),
                    ..mode
                })
            })
            .collect()
    }

    /// Mode shape of `root` sampled at `samples` points along the beam.
    ///
    /// # Errors
    ///
    /// See [`mode_shape`].
    pub fn mode_shape(&self, root: f64, samples: usize) -> Result<ModeShape, InstantiationError> {
        mode_shape(&self.derivation, &self.params, root, samples)
    }
}
