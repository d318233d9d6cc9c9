//! Symbols of the Euler beam model and the general mode shape.

use crate::errors::SymbolicError;
use crate::symbolic::{cos, cosh, sin, sinh, Expr, Symbol};

/// Every symbol used while deriving the characteristic equation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BeamSymbols {
    /// Wavenumber `a`.
    pub wavenumber: Symbol,
    /// Position along the beam `x`.
    pub position: Symbol,
    /// Beam length `L`.
    pub length: Symbol,
    /// Elastic modulus `E`.
    pub modulus: Symbol,
    /// Second moment of area `I`.
    pub second_moment: Symbol,
    /// Angular frequency `w`.
    pub frequency: Symbol,
    /// Tip mass `M`.
    pub tip_mass: Symbol,
    /// Rotary inertia of the tip mass `J`.
    pub tip_inertia: Symbol,
    /// Mass per unit length `m`.
    pub mass_per_length: Symbol,
    /// Mode shape coefficients `A`, `B`, `C` and `D`.
    pub coefficients: [Symbol; 4],
}

impl Default for BeamSymbols {
    fn default() -> Self {
        Self {
            wavenumber: Symbol::new("a"),
            position: Symbol::new("x"),
            length: Symbol::new("L"),
            modulus: Symbol::new("E"),
            second_moment: Symbol::new("I"),
            frequency: Symbol::new("w"),
            tip_mass: Symbol::new("M"),
            tip_inertia: Symbol::new("J"),
            mass_per_length: Symbol::new("m"),
            coefficients: [
                Symbol::new("A"),
                Symbol::new("B"),
                Symbol::new("C"),
                Symbol::new("D"),
            ],
        }
    }
}

impl BeamSymbols {
    /// Bending stiffness `E·I`.
    #[must_use]
    pub fn bending_stiffness(&self) -> Expr {
        Expr::symbol(&self.modulus) * Expr::symbol(&self.second_moment)
    }

    /// Square of the angular frequency `w²`.
    #[must_use]
    pub fn frequency_squared(&self) -> Expr {
        Expr::symbol(&self.frequency).pow(2)
    }

    /// Dispersion relation `E·I·a⁴/m`, the value of `w²`.
    ///
    /// # Errors
    ///
    /// Never fails for the default symbols; the error is kept for symbol sets
    /// whose distributed mass cannot be inverted.
    pub fn dispersion(&self) -> Result<Expr, SymbolicError> {
        Ok(self.bending_stiffness()
            * Expr::symbol(&self.wavenumber).pow(4)
            * Expr::symbol(&self.mass_per_length).inverse()?)
    }
}

/// The general solution `Q(x)` of `E·I·Q'''' = m·w²·Q` and its first three derivatives.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeFunction {
    /// Symbols the shape is written in.
    pub symbols: BeamSymbols,
    /// `Q`, `Q'`, `Q''` and `Q'''` with respect to `x`.
    derivatives: [Expr; 4],
}

impl ShapeFunction {
    /// Derivative of order `order` (0 to 3).
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError::DerivativeOrder`] when `order` is larger than 3.
    pub fn derivative(&self, order: usize) -> Result<&Expr, SymbolicError> {
        self.derivatives
            .get(order)
            .ok_or(SymbolicError::DerivativeOrder(order))
    }

    /// Derivative of order `order` evaluated at `point`.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError::DerivativeOrder`] when `order` is larger than 3,
    /// and other [`SymbolicError`]s when the substitution fails.
    pub fn at(&self, order: usize, point: &Expr) -> Result<Expr, SymbolicError> {
        self.derivative(order)?.subs(&self.symbols.position, point)
    }

    /// `Q` itself.
    #[must_use]
    pub fn displacement(&self) -> &Expr {
        &self.derivatives[0]
    }
}

/// Build `Q(x) = A sin(ax) + B cos(ax) + C sinh(ax) + D cosh(ax)` and its derivatives.
///
/// # Examples
/// ```
/// use eulerbeam::{derive_shape_function, Expr};
///
/// let shape = derive_shape_function();
/// let at_root = shape.at(0, &Expr::zero()).expect("substitution succeeds");
/// assert_eq!(at_root.to_string(), "B + D");
/// ```
#[must_use]
pub fn derive_shape_function() -> ShapeFunction {
    let symbols = BeamSymbols::default();
    let argument = Expr::symbol(&symbols.wavenumber) * Expr::symbol(&symbols.position);
    let [a, b, c, d] = &symbols.coefficients;
    let q = Expr::symbol(a) * sin(argument.clone())
        + Expr::symbol(b) * cos(argument.clone())
        + Expr::symbol(c) * sinh(argument.clone())
        + Expr::symbol(d) * cosh(argument);
    let q1 = q.diff(&symbols.position);
    let q2 = q1.diff(&symbols.position);
    let q3 = q2.diff(&symbols.position);
    ShapeFunction {
        symbols,
        derivatives: [q, q1, q2, q3],
    }
}
