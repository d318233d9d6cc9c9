//! End conditions of a beam and the boundary-condition set used by the builder.
//!
//! Each end of the beam contributes exactly two equations in `Q` and its
//! derivatives evaluated at the end point. An end is described by anything that
//! implements [`EndCondition`]: the built-in [`Support`] variants, or a closure
//! with the same signature for custom restraints such as springs.
//!
//! Conditions receive a [`BeamEnd`] rather than a bare position, so that
//! terms which depend on the direction of the outward normal (the inertia of
//! an attached body) can be written once for both ends.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::SymbolicError;
use crate::shape::{BeamSymbols, ShapeFunction};
use crate::symbolic::{Equation, Expr, Symbol};

/// One of the two ends of the beam.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BeamEnd {
    /// `x = 0`, outward normal along `-x`.
    Near,
    /// `x = L`, outward normal along `+x`.
    Far,
}

impl BeamEnd {
    /// Position of the end, `0` or `L`.
    #[must_use]
    pub fn position(self, symbols: &BeamSymbols) -> Expr {
        match self {
            BeamEnd::Near => Expr::zero(),
            BeamEnd::Far => Expr::symbol(&symbols.length),
        }
    }

    /// Sign of the outward normal along `x`.
    #[must_use]
    pub const fn outward_normal(self) -> i64 {
        match self {
            BeamEnd::Near => -1,
            BeamEnd::Far => 1,
        }
    }
}

/// Strategy producing the two boundary equations of one beam end.
pub trait EndCondition {
    /// Equations imposed at `end`.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError`] when evaluating the shape function fails.
    fn equations(
        &self,
        shape: &ShapeFunction,
        end: BeamEnd,
    ) -> Result<(Equation, Equation), SymbolicError>;

    /// Short human readable name used in reports.
    fn describe(&self) -> String {
        "custom".to_string()
    }
}

impl<F> EndCondition for F
where
    F: Fn(&ShapeFunction, BeamEnd) -> Result<(Equation, Equation), SymbolicError>,
{
    fn equations(
        &self,
        shape: &ShapeFunction,
        end: BeamEnd,
    ) -> Result<(Equation, Equation), SymbolicError> {
        self(shape, end)
    }
}

/// Built-in end restraints.
///
/// The equations of the mass-carrying variants are written below for the far
/// end. At the near end the outward normal flips, and with it the sign of
/// both inertial terms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Support {
    /// No displacement and no slope: `Q = 0`, `Q' = 0`.
    Clamped,
    /// No displacement and no moment: `Q = 0`, `E·I·Q'' = 0`.
    ///
    /// Only usable at the far end. At `x = 0` both equations vanish on the
    /// sine term, so `A` is left undetermined and the derivation fails with
    /// [`DerivationError::UnsolvableSystem`](crate::DerivationError::UnsolvableSystem).
    /// A pinned-pinned beam therefore cannot be analysed.
    Pinned,
    /// No slope and no shear: `Q' = 0`, `E·I·Q''' = 0`.
    Guided,
    /// No shear and no moment: `E·I·Q''' = 0`, `E·I·Q'' = 0`.
    Free,
    /// Point mass `M`: `E·I·Q''' = −w²·M·Q`, `E·I·Q'' = 0`.
    TipMass,
    /// Point mass `M` with rotary inertia `J`:
    /// `E·I·Q''' = −w²·M·Q`, `E·I·Q'' = w²·J·Q'`.
    TipMassWithInertia,
}

impl EndCondition for Support {
    fn equations(
        &self,
        shape: &ShapeFunction,
        end: BeamEnd,
    ) -> Result<(Equation, Equation), SymbolicError> {
        let symbols = &shape.symbols;
        let point = end.position(symbols);
        let stiffness = symbols.bending_stiffness();
        let q = shape.at(0, &point)?;
        let q1 = shape.at(1, &point)?;
        let q2 = &stiffness * &shape.at(2, &point)?;
        let q3 = &stiffness * &shape.at(3, &point)?;
        // -n·w²·(mass or inertia)·value
        let inertial = |symbol: &Symbol, value: &Expr| -> Expr {
            Expr::integer(-end.outward_normal())
                * symbols.frequency_squared()
                * Expr::symbol(symbol)
                * value
        };

        Ok(match self {
            Support::Clamped => (Equation::new(q, Expr::zero()), Equation::new(q1, Expr::zero())),
            Support::Pinned => (Equation::new(q, Expr::zero()), Equation::new(q2, Expr::zero())),
            Support::Guided => (Equation::new(q1, Expr::zero()), Equation::new(q3, Expr::zero())),
            Support::Free => (Equation::new(q3, Expr::zero()), Equation::new(q2, Expr::zero())),
            Support::TipMass => (
                Equation::new(q3, inertial(&symbols.tip_mass, &q)),
                Equation::new(q2, Expr::zero()),
            ),
            Support::TipMassWithInertia => (
                Equation::new(q3, inertial(&symbols.tip_mass, &q)),
                Equation::new(q2, -inertial(&symbols.tip_inertia, &q1)),
            ),
        })
    }

    fn describe(&self) -> String {
        match self {
            Support::Clamped => "clamped",
            Support::Pinned => "pinned",
            Support::Guided => "guided",
            Support::Free => "free",
            Support::TipMass => "tip mass",
            Support::TipMassWithInertia => "tip mass with rotary inertia",
        }
        .to_string()
    }
}

/// The pair of end conditions applied to a beam.
///
/// The fixed end sits at `x = 0` and must determine the coefficients `A` and
/// `B`; the free end sits at `x = L`.
pub struct BoundaryConditions {
    /// Condition at `x = 0`.
    fixed: Box<dyn EndCondition>,
    /// Condition at `x = L`.
    free: Box<dyn EndCondition>,
}

impl Default for BoundaryConditions {
    fn default() -> Self {
        Self::cantilever()
    }
}

impl fmt::Debug for BoundaryConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundaryConditions")
            .field("fixed", &self.fixed.describe())
            .field("free", &self.free.describe())
            .finish()
    }
}

impl BoundaryConditions {
    /// Combine two end conditions.
    pub fn new(fixed: impl EndCondition + 'static, free: impl EndCondition + 'static) -> Self {
        Self {
            fixed: Box::new(fixed),
            free: Box::new(free),
        }
    }

    /// Clamped at `x = 0`, carrying a tip mass at `x = L`.
    #[must_use]
    pub fn cantilever() -> Self {
        Self::new(Support::Clamped, Support::TipMass)
    }

    /// Replace the condition at `x = 0`.
    #[must_use]
    pub fn with_fixed(self, fixed: impl EndCondition + 'static) -> Self {
        Self {
            fixed: Box::new(fixed),
            ..self
        }
    }

    /// Replace the condition at `x = L`.
    #[must_use]
    pub fn with_free(self, free: impl EndCondition + 'static) -> Self {
        Self {
            free: Box::new(free),
            ..self
        }
    }

    /// Condition at `x = 0`.
    #[must_use]
    pub fn fixed(&self) -> &dyn EndCondition {
        self.fixed.as_ref()
    }

    /// Condition at `x = L`.
    #[must_use]
    pub fn free(&self) -> &dyn EndCondition {
        self.free.as_ref()
    }

    /// Short description such as `clamped / tip mass`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} / {}", self.fixed.describe(), self.free.describe())
    }
}

/// The four boundary equations of a beam.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundarySystem {
    /// Equations at `x = 0`.
    pub fixed: [Equation; 2],
    /// Equations at `x = L`.
    pub free: [Equation; 2],
}

/// Evaluate both end conditions on `shape`.
///
/// # Errors
///
/// Returns [`SymbolicError`] when an end condition fails to evaluate.
pub fn boundary_conditions(
    shape: &ShapeFunction,
    conditions: &BoundaryConditions,
) -> Result<BoundarySystem, SymbolicError> {
    let (bc1, bc2) = conditions.fixed.equations(shape, BeamEnd::Near)?;
    let (bc3, bc4) = conditions.free.equations(shape, BeamEnd::Far)?;
    Ok(BoundarySystem {
        fixed: [bc1, bc2],
        free: [bc3, bc4],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::derive_shape_function;

    #[test]
    fn clamped_end_at_origin() {
        let shape = derive_shape_function();
        let system =
            boundary_conditions(&shape, &BoundaryConditions::cantilever()).expect("evaluates");
        assert_eq!(system.fixed[0].to_string(), "B + D = 0");
        assert_eq!(system.fixed[1].to_string(), "A*a + C*a = 0");
    }

    #[test]
    fn tip_mass_couples_shear_to_displacement() {
        let shape = derive_shape_function();
        let system =
            boundary_conditions(&shape, &BoundaryConditions::cantilever()).expect("evaluates");
        let symbols = &shape.symbols;
        let length = Expr::symbol(&symbols.length);
        let displacement = shape.at(0, &length).expect("evaluates");
        let expected = -(symbols.frequency_squared() * Expr::symbol(&symbols.tip_mass) * &displacement);
        assert_eq!(system.free[0].rhs, expected);
        assert!(system.free[1].rhs.is_zero());
    }

    #[test]
    fn inertia_changes_sign_with_the_outward_normal() {
        let shape = derive_shape_function();
        let conditions =
            BoundaryConditions::new(Support::TipMassWithInertia, Support::TipMassWithInertia);
        let system = boundary_conditions(&shape, &conditions).expect("evaluates");
        let symbols = &shape.symbols;
        let length = Expr::symbol(&symbols.length);
        let w2 = symbols.frequency_squared();
        let mass = Expr::symbol(&symbols.tip_mass);
        let inertia = Expr::symbol(&symbols.tip_inertia);

        let q0 = shape.at(0, &Expr::zero()).expect("evaluates");
        let slope0 = shape.at(1, &Expr::zero()).expect("evaluates");
        assert_eq!(system.fixed[0].rhs, &w2 * &mass * &q0);
        assert_eq!(system.fixed[1].rhs, -(&w2 * &inertia * &slope0));

        let q_end = shape.at(0, &length).expect("evaluates");
        let slope_end = shape.at(1, &length).expect("evaluates");
        assert_eq!(system.free[0].rhs, -(&w2 * &mass * &q_end));
        assert_eq!(system.free[1].rhs, &w2 * &inertia * &slope_end);
    }

    #[test]
    fn ends_know_their_position() {
        let symbols = BeamSymbols::default();
        assert!(BeamEnd::Near.position(&symbols).is_zero());
        assert_eq!(BeamEnd::Far.position(&symbols), Expr::symbol(&symbols.length));
        assert_eq!(BeamEnd::Near.outward_normal(), -1);
        assert_eq!(BeamEnd::Far.outward_normal(), 1);
    }

    #[test]
    fn closures_act_as_end_conditions() {
        let shape = derive_shape_function();
        let clamp = |shape: &ShapeFunction,
                     end: BeamEnd|
         -> Result<(Equation, Equation), SymbolicError> {
            let point = end.position(&shape.symbols);
            Ok((
                Equation::new(shape.at(0, &point)?, Expr::zero()),
                Equation::new(shape.at(1, &point)?, Expr::zero()),
            ))
        };
        let conditions = BoundaryConditions::default().with_fixed(clamp);
        assert_eq!(conditions.describe(), "custom / tip mass");
        let system = boundary_conditions(&shape, &conditions).expect("evaluates");
        assert_eq!(system.fixed[0].to_string(), "B + D = 0");
    }

    #[test]
    fn supports_deserialize_from_snake_case() {
        let support: Support = serde_json::from_str("\"tip_mass_with_inertia\"").expect("valid");
        assert_eq!(support, Support::TipMassWithInertia);
    }
}
