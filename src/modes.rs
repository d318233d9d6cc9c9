//! Mode shapes recovered from the numeric boundary equations.

use nalgebra::linalg::SymmetricEigen;
use nalgebra::Matrix4;
use ndarray::Array1;
use tracing::warn;

use crate::builder::Derivation;
use crate::errors::InstantiationError;
use crate::params::BeamParameters;

/// Displacement pattern of one mode, scaled so that its largest deflection
/// is `+1`.
#[derive(Clone, Debug, PartialEq)]
pub struct ModeShape {
    /// Dimensionless root the shape belongs to.
    pub root: f64,
    /// Sample positions from `0` to `L` in metres.
    pub positions: Array1<f64>,
    /// Normalized displacement at each position.
    pub displacements: Array1<f64>,
    /// Normalized coefficients `A`, `B`, `C` and `D`.
    pub coefficients: [f64; 4],
}

impl ModeShape {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the shape has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of the largest deflection.
    #[must_use]
    pub fn peak_position(&self) -> f64 {
        self.positions
            .iter()
            .zip(self.displacements.iter())
            .fold((0.0, 0.0_f64), |(best_x, best), (&x, &value)| {
                if value.abs() > best.abs() {
                    (x, value)
                } else {
                    (best_x, best)
                }
            })
            .0
    }
}

/// Sample the mode shape belonging to `root` at `samples` evenly spaced
/// points.
///
/// The four boundary equations are evaluated at `a = root / L` and
/// `w = a²·sqrt(E·I/m)` in the basis `sin(ax), cos(ax), e^{a(x-L)}, e^{-ax}`,
/// in which every function stays bounded by one along the beam. The hyperbolic
/// coefficients are rewritten as exponentials before evaluation, so the
/// `e^{aL}` parts of `sinh` and `cosh` cancel exactly. The null vector of the
/// resulting 4×4 matrix gives the shape.
///
/// # Errors
///
/// Returns [`InstantiationError::MissingParameter`] when a boundary equation
/// refers to a symbol `params` does not bind.
pub fn mode_shape(
    derivation: &Derivation,
    params: &BeamParameters,
    root: f64,
    samples: usize,
) -> Result<ModeShape, InstantiationError> {
    let symbols = derivation.symbols();
    let length = params.length();
    let wavenumber = root / length;
    let omega = wavenumber.powi(2)
        * (params.elastic_modulus() * params.second_moment() / params.mass_per_length()).sqrt();
    let decay = (-root).exp();

    let mut bindings = params.bindings(symbols);
    bindings.insert(symbols.frequency.clone(), omega);

    let [a_symbol, b_symbol, c_symbol, d_symbol] = &symbols.coefficients;
    let system = &derivation.system;
    let mut rows = [[0.0; 4]; 4];
    for (row, equation) in rows.iter_mut().zip(system.fixed.iter().chain(&system.free)) {
        let balance = &equation.lhs - &equation.rhs;
        let sinh_part = balance.coeff(c_symbol);
        let cosh_part = balance.coeff(d_symbol);
        let entries = [
            balance.coeff(a_symbol),
            balance.coeff(b_symbol),
            (&sinh_part + &cosh_part).rewrite_hyperbolic(),
            (&cosh_part - &sinh_part).rewrite_hyperbolic(),
        ];
        for (value, expr) in row.iter_mut().zip(&entries) {
            *value = expr.compile(&symbols.wavenumber, &bindings)?.eval(wavenumber);
        }
        row[2] *= decay;
        let norm = row.iter().map(|value| value * value).sum::<f64>().sqrt();
        if norm > 0.0 {
            row.iter_mut().for_each(|value| *value /= norm);
        }
    }

    let matrix = Matrix4::from_fn(|i, j| rows[i][j]);
    let eigen = SymmetricEigen::new(matrix.transpose() * matrix);
    let smallest = eigen.eigenvalues.imin();
    let residual = eigen.eigenvalues[smallest].max(0.0).sqrt();
    if residual > 1e-5 {
        warn!(root, residual, "boundary equations are not singular at this root");
    }
    let null = eigen.eigenvectors.column(smallest);
    let (a, b, growing, decaying) = (null[0], null[1], null[2], null[3]);

    let positions = Array1::linspace(0.0, length, samples);
    let mut displacements = positions.mapv(|x| {
        let phase = wavenumber * x;
        a * phase.sin()
            + b * phase.cos()
            + growing * (wavenumber * (x - length)).exp()
            + decaying * (-phase).exp()
    });
    let peak = displacements
        .iter()
        .fold(0.0_f64, |best, &value| if value.abs() > best.abs() { value } else { best });
    let scale = if peak == 0.0 { 1.0 } else { peak };
    displacements.mapv_inplace(|value| value / scale);

    let c = growing * decay - decaying;
    let d = growing * decay + decaying;
    Ok(ModeShape {
        root,
        positions,
        displacements,
        coefficients: [a / scale, b / scale, c / scale, d / scale],
    })
}
