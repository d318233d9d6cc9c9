//! Symbolic derivation of the characteristic equation.
//!
//! The derivation is a fixed chain of pure steps, each consuming the record
//! produced by the previous one:
//!
//! 1. [`derive_shape_function`] builds `Q(x)` and its derivatives.
//! 2. [`boundary_conditions`] evaluates both end conditions.
//! 3. [`solve_ab`] eliminates `A` and `B` with the fixed-end pair.
//! 4. [`build_coefficient_matrix`] collects the `C`, `D` coefficients of the
//!    free-end pair.
//! 5. [`eliminate_frequency`] takes the determinant and replaces `w²` by
//!    `E·I·a⁴/m`.
//!
//! Reordering the steps changes which factors survive in the determinant, so
//! [`Derivation::new`] is the only entry point that runs them together.

use tracing::debug;

use crate::conditions::{boundary_conditions, BoundaryConditions, BoundarySystem};
use crate::errors::DerivationError;
use crate::latex::LatexDocument;
use crate::shape::{derive_shape_function, BeamSymbols, ShapeFunction};
use crate::symbolic::{Equation, Expr, Symbol};

/// `A` and `B` expressed through `C` and `D`.
///
/// The solution reads `A = a / denominator`, `B = b / denominator`. When the
/// fixed-end determinant is a single term it is divided out exactly and the
/// denominator is one.
#[derive(Clone, Debug, PartialEq)]
pub struct EliminationSolution {
    /// Numerator of `A`.
    pub a: Expr,
    /// Numerator of `B`.
    pub b: Expr,
    /// Common denominator.
    pub denominator: Expr,
}

impl EliminationSolution {
    /// Whether the denominator was divided out.
    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.denominator == Expr::one()
    }
}

/// Coefficients of `C` and `D` in the two free-end equations.
#[derive(Clone, Debug, PartialEq)]
pub struct CoefficientMatrix {
    /// Row per free-end equation, columns for `C` and `D`.
    pub entries: [[Expr; 2]; 2],
}

impl CoefficientMatrix {
    /// Symbolic determinant.
    #[must_use]
    pub fn determinant(&self) -> Expr {
        let [[c1, d1], [c2, d2]] = &self.entries;
        c1 * d2 - d1 * c2
    }
}

/// The characteristic function of a beam.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacteristicFunction {
    /// Determinant of the coefficient matrix after eliminating `w`.
    pub determinant: Expr,
    /// Factor common to every term of the determinant.
    pub common_factor: Expr,
    /// Remaining factor rewritten in the dimensionless wavenumber `a·L`,
    /// which is again called `a`.
    pub normalized: Expr,
    /// The free variable of [`CharacteristicFunction::normalized`].
    pub wavenumber: Symbol,
}

/// Every intermediate record of one derivation.
#[derive(Clone, Debug, PartialEq)]
pub struct Derivation {
    /// Shape function and symbols.
    pub shape: ShapeFunction,
    /// Boundary equations at both ends.
    pub system: BoundarySystem,
    /// `A`, `B` in terms of `C`, `D`.
    pub solution: EliminationSolution,
    /// Free-end coefficient matrix.
    pub matrix: CoefficientMatrix,
    /// Final characteristic function.
    pub characteristic: CharacteristicFunction,
    /// Description of the end conditions.
    pub conditions: String,
}

impl Derivation {
    /// Run the complete derivation for `conditions`.
    ///
    /// # Errors
    ///
    /// Returns [`DerivationError::UnsolvableSystem`] when the fixed-end pair
    /// does not determine `A` and `B`, and
    /// [`DerivationError::DegenerateDeterminant`] when the resulting
    /// determinant vanishes identically.
    ///
    /// # Examples
    /// ```
    /// use eulerbeam::{BoundaryConditions, Derivation, Support};
    ///
    /// let derivation =
    ///     Derivation::new(&BoundaryConditions::new(Support::Clamped, Support::Free))
    ///         .expect("cantilever derivation succeeds");
    /// assert_eq!(
    ///     derivation.characteristic.normalized.to_string(),
    ///     "1 + cos(a)*cosh(a)"
    /// );
    /// ```
    pub fn new(conditions: &BoundaryConditions) -> Result<Self, DerivationError> {
        let shape = derive_shape_function();
        let symbols = &shape.symbols;
        debug!(conditions = %conditions.describe(), "deriving characteristic equation");

        let system = boundary_conditions(&shape, conditions)?;
        for equation in system.fixed.iter().chain(&system.free) {
            debug!(%equation, "boundary condition");
        }

        let [bc1, bc2] = &system.fixed;
        let solution = solve_ab(symbols, bc1, bc2)?;
        debug!(a = %solution.a, b = %solution.b, denominator = %solution.denominator, "eliminated A and B");

        let [bc3, bc4] = &system.free;
        let matrix = build_coefficient_matrix(symbols, bc3, bc4, &solution);
        let characteristic = eliminate_frequency(symbols, &matrix)?;
        debug!(normalized = %characteristic.normalized, "characteristic function");

        Ok(Self {
            shape,
            system,
            solution,
            matrix,
            characteristic,
            conditions: conditions.describe(),
        })
    }

    /// Derivation for the default cantilever with a tip mass.
    ///
    /// # Errors
    ///
    /// See [`Derivation::new`].
    pub fn cantilever() -> Result<Self, DerivationError> {
        Self::new(&BoundaryConditions::cantilever())
    }

    /// Symbols the derivation is written in.
    #[must_use]
    pub fn symbols(&self) -> &BeamSymbols {
        &self.shape.symbols
    }

    /// LaTeX document listing the boundary conditions, the coefficient matrix
    /// and both forms of the characteristic function.
    #[must_use]
    pub fn to_document(&self, title: &str) -> LatexDocument {
        let mut document = LatexDocument::new(title);
        let labels = ["bc1", "bc2", "bc3", "bc4"];
        for (label, equation) in labels
            .iter()
            .zip(self.system.fixed.iter().chain(&self.system.free))
        {
            document.push(format!("Boundary condition {label}"), equation, true);
        }
        document.push("Coefficient matrix M_c", &self.matrix, false);
        document.push(
            "Characteristic determinant",
            &self.characteristic.determinant,
            true,
        );
        document.push(
            "Normalized characteristic function",
            &self.characteristic.normalized,
            true,
        );
        document
    }
}

/// Solve the fixed-end pair for `A` and `B` by Cramer's rule.
///
/// # Errors
///
/// Returns [`DerivationError::UnsolvableSystem`] when the determinant of the
/// `A`, `B` coefficients vanishes identically.
pub fn solve_ab(
    symbols: &BeamSymbols,
    bc1: &Equation,
    bc2: &Equation,
) -> Result<EliminationSolution, DerivationError> {
    let [a, b, _, _] = &symbols.coefficients;
    let split = |equation: &Equation| {
        let residual = equation.residual();
        (
            residual.coeff(a),
            residual.coeff(b),
            residual.independent_of(&[a, b]),
        )
    };
    let (a1, b1, rest1) = split(bc1);
    let (a2, b2, rest2) = split(bc2);

    let determinant = (&a1 * &b2 - &b1 * &a2).trigsimp();
    if determinant.is_zero() {
        return Err(DerivationError::UnsolvableSystem {
            first: a.clone(),
            second: b.clone(),
        });
    }
    let numerator_a = (&b1 * &rest2 - &rest1 * &b2).trigsimp();
    let numerator_b = (&rest1 * &a2 - &a1 * &rest2).trigsimp();

    if determinant.len() == 1 {
        let inverse = determinant.inverse()?;
        Ok(EliminationSolution {
            a: numerator_a * &inverse,
            b: numerator_b * &inverse,
            denominator: Expr::one(),
        })
    } else {
        Ok(EliminationSolution {
            a: numerator_a,
            b: numerator_b,
            denominator: determinant,
        })
    }
}

/// Substitute the `A`, `B` solution into the free-end pair and collect the
/// coefficients of `C` and `D`.
///
/// A non-trivial denominator is cleared by multiplying the equation through,
/// which scales each row without moving the roots of the determinant.
#[must_use]
pub fn build_coefficient_matrix(
    symbols: &BeamSymbols,
    bc3: &Equation,
    bc4: &Equation,
    solution: &EliminationSolution,
) -> CoefficientMatrix {
    let [a, b, c, d] = &symbols.coefficients;
    let reduce = |equation: &Equation| {
        let residual = equation.residual();
        let rest = residual.independent_of(&[a, b]);
        (&rest * &solution.denominator
            + &residual.coeff(a) * &solution.a
            + &residual.coeff(b) * &solution.b)
            .trigsimp()
    };
    let f1 = reduce(bc3);
    let f2 = reduce(bc4);
    CoefficientMatrix {
        entries: [[f1.coeff(c), f1.coeff(d)], [f2.coeff(c), f2.coeff(d)]],
    }
}

/// Take the determinant, replace `w²` by `E·I·a⁴/m`, simplify, and factor.
///
/// # Errors
///
/// Returns [`DerivationError::DegenerateDeterminant`] when the determinant is
/// identically zero.
pub fn eliminate_frequency(
    symbols: &BeamSymbols,
    matrix: &CoefficientMatrix,
) -> Result<CharacteristicFunction, DerivationError> {
    let raw = matrix.determinant().trigsimp();
    let determinant = raw
        .subs_power(&symbols.frequency, 2, &symbols.dispersion()?)?
        .trigsimp();
    if determinant.is_zero() {
        return Err(DerivationError::DegenerateDeterminant);
    }

    let factored = determinant.factor_common();
    let dimensionless =
        Expr::symbol(&symbols.wavenumber) * Expr::symbol(&symbols.length).inverse()?;
    let normalized = factored
        .primitive
        .subs(&symbols.wavenumber, &dimensionless)?
        .factor_common()
        .primitive;

    Ok(CharacteristicFunction {
        common_factor: factored.factor(),
        determinant,
        normalized,
        wavenumber: symbols.wavenumber.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditions::Support;
    use crate::symbolic::{cos, cosh, sin, sinh};

    fn derive(fixed: Support, free: Support) -> Result<Derivation, DerivationError> {
        Derivation::new(&BoundaryConditions::new(fixed, free))
    }

    #[test]
    fn clamped_end_eliminates_sine_and_cosine() {
        let derivation = Derivation::cantilever().expect("derivation succeeds");
        let [_, _, c, d] = &derivation.symbols().coefficients;
        assert!(derivation.solution.is_exact());
        assert_eq!(derivation.solution.a, -Expr::symbol(c));
        assert_eq!(derivation.solution.b, -Expr::symbol(d));
    }

    #[test]
    fn tip_mass_characteristic_function() {
        let derivation = Derivation::cantilever().expect("derivation succeeds");
        let symbols = derivation.symbols();
        let a = Expr::symbol(&symbols.wavenumber);
        let ratio = Expr::symbol(&symbols.tip_mass)
            * Expr::symbol(&symbols.mass_per_length).inverse().expect("monomial")
            * Expr::symbol(&symbols.length).inverse().expect("monomial");
        let expected = Expr::one()
            + cos(a.clone()) * cosh(a.clone())
            + &a * &ratio * (cos(a.clone()) * sinh(a.clone()) - sin(a.clone()) * cosh(a));
        assert_eq!(derivation.characteristic.normalized, expected);
    }

    #[test]
    fn zero_tip_mass_recovers_classical_cantilever() {
        let derivation = Derivation::cantilever().expect("derivation succeeds");
        let symbols = derivation.symbols();
        let a = Expr::symbol(&symbols.wavenumber);
        let massless = derivation
            .characteristic
            .normalized
            .subs(&symbols.tip_mass, &Expr::zero())
            .expect("substitution succeeds");
        assert_eq!(massless, Expr::one() + cos(a.clone()) * cosh(a));
    }

    #[test]
    fn common_factor_carries_stiffness_and_wavenumber() {
        let derivation = Derivation::cantilever().expect("derivation succeeds");
        assert_eq!(
            derivation.characteristic.common_factor.to_string(),
            "2*E^2*I^2*a^5"
        );
    }

    #[test]
    fn clamped_clamped_beam() {
        let derivation = derive(Support::Clamped, Support::Clamped).expect("derivation succeeds");
        let a = Expr::symbol(&derivation.symbols().wavenumber);
        assert_eq!(
            derivation.characteristic.normalized,
            Expr::one() - cos(a.clone()) * cosh(a)
        );
    }

    #[test]
    fn pinned_fixed_end_is_unsolvable() {
        let error = derive(Support::Pinned, Support::Pinned).expect_err("A is left undetermined");
        assert_eq!(
            error,
            DerivationError::UnsolvableSystem {
                first: Symbol::new("A"),
                second: Symbol::new("B"),
            }
        );
    }

    #[test]
    fn free_near_end_still_determines_sine_and_cosine() {
        let derivation = derive(Support::Free, Support::Free).expect("derivation succeeds");
        assert!(!derivation.characteristic.normalized.is_zero());
    }

    #[test]
    fn rotary_inertia_is_kept_after_eliminating_frequency() {
        let derivation =
            derive(Support::Clamped, Support::TipMassWithInertia).expect("derivation succeeds");
        let symbols = derivation.symbols();
        assert!(derivation.characteristic.normalized.contains(&symbols.tip_inertia));
        assert!(!derivation.characteristic.normalized.contains(&symbols.frequency));
    }

    #[test]
    fn document_lists_every_step() {
        let derivation = Derivation::cantilever().expect("derivation succeeds");
        let document = derivation.to_document("Cantilever derivation");
        assert_eq!(document.sections().len(), 7);
    }
}
