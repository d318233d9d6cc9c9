//! Expanded symbolic expressions over polynomial and trigonometric atoms.
//!
//! An [`Expr`] is always stored fully expanded: a sum of [`Monomial`]s with
//! exact rational coefficients. A monomial is a product of atoms raised to
//! integer powers, where an atom is either a [`Symbol`] or one of the
//! functions in [`Func`] applied to another expression. Keeping everything in
//! this canonical form means that equality of two expressions is structural,
//! and that coefficient extraction is a map lookup.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use num::integer::Integer;
use num::rational::Rational64;
use num::{One, Signed, Zero};

use crate::errors::{InstantiationError, SymbolicError};

/// Named scalar unknown.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol with the supplied name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the symbol.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transcendental functions understood by the expression kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Func {
    /// Circular sine.
    Sin,
    /// Circular cosine.
    Cos,
    /// Hyperbolic sine.
    Sinh,
    /// Hyperbolic cosine.
    Cosh,
    /// Natural exponential.
    Exp,
}

impl Func {
    /// Evaluate the function at `x`.
    #[must_use]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Func::Sin => x.sin(),
            Func::Cos => x.cos(),
            Func::Sinh => x.sinh(),
            Func::Cosh => x.cosh(),
            Func::Exp => x.exp(),
        }
    }

    /// Lower-case name of the function.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Sinh => "sinh",
            Func::Cosh => "cosh",
            Func::Exp => "exp",
        }
    }

    /// Exact value of the function at zero.
    const fn value_at_zero(self) -> i64 {
        match self {
            Func::Sin | Func::Sinh => 0,
            Func::Cos | Func::Cosh | Func::Exp => 1,
        }
    }

    /// Derivative with respect to the argument, as a sign and a function.
    const fn derivative(self) -> (i64, Func) {
        match self {
            Func::Sin => (1, Func::Cos),
            Func::Cos => (-1, Func::Sin),
            Func::Sinh => (1, Func::Cosh),
            Func::Cosh => (1, Func::Sinh),
            Func::Exp => (1, Func::Exp),
        }
    }
}

/// Indivisible factor of a monomial.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Atom {
    /// A bare symbol.
    Symbol(Symbol),
    /// A function applied to an expression.
    Func(Func, Box<Expr>),
}

impl Atom {
    /// Whether `symbol` occurs anywhere inside the atom.
    fn contains(&self, symbol: &Symbol) -> bool {
        match self {
            Atom::Symbol(inner) => inner == symbol,
            Atom::Func(_, argument) => argument.contains(symbol),
        }
    }

    /// Replace `symbol` by `value` inside the atom.
    fn subs(&self, symbol: &Symbol, value: &Expr) -> Result<Expr, SymbolicError> {
        match self {
            Atom::Symbol(inner) if inner == symbol => Ok(value.clone()),
            Atom::Symbol(inner) => Ok(Expr::symbol(inner)),
            Atom::Func(func, argument) => Ok(Expr::func(*func, argument.subs(symbol, value)?)),
        }
    }

    /// Derivative of the atom with respect to `symbol`.
    fn diff(&self, symbol: &Symbol) -> Expr {
        match self {
            Atom::Symbol(inner) if inner == symbol => Expr::one(),
            Atom::Symbol(_) => Expr::zero(),
            Atom::Func(func, argument) => {
                let inner = argument.diff(symbol);
                if inner.is_zero() {
                    return Expr::zero();
                }
                let (sign, derivative) = func.derivative();
                Expr::func(derivative, (**argument).clone()).scale(Rational64::from(sign)) * inner
            }
        }
    }
}

/// Product of atoms raised to non-zero integer powers.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Monomial {
    /// Exponent of every atom present in the product.
    powers: BTreeMap<Atom, i32>,
}

impl Monomial {
    /// The empty product.
    #[must_use]
    pub fn one() -> Self {
        Self::default()
    }

    /// A single atom raised to `exponent`.
    #[must_use]
    pub fn from_atom(atom: Atom, exponent: i32) -> Self {
        let mut powers = BTreeMap::new();
        if exponent != 0 {
            powers.insert(atom, exponent);
        }
        Self { powers }
    }

    /// Whether this is the empty product.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.powers.is_empty()
    }

    /// Exponent of `atom`, zero when absent.
    #[must_use]
    pub fn exponent(&self, atom: &Atom) -> i32 {
        self.powers.get(atom).copied().unwrap_or(0)
    }

    /// Iterate over atoms and their exponents.
    pub fn powers(&self) -> impl Iterator<Item = (&Atom, i32)> {
        self.powers.iter().map(|(atom, exponent)| (atom, *exponent))
    }

    /// Product of two monomials.
    #[must_use]
    pub fn product(&self, other: &Monomial) -> Monomial {
        let mut powers = self.powers.clone();
        for (atom, exponent) in &other.powers {
            let entry = powers.entry(atom.clone()).or_insert(0);
            *entry += exponent;
            if *entry == 0 {
                powers.remove(atom);
            }
        }
        Monomial { powers }
    }

    /// Reciprocal of the monomial.
    #[must_use]
    pub fn inverse(&self) -> Monomial {
        Monomial {
            powers: self
                .powers
                .iter()
                .map(|(atom, exponent)| (atom.clone(), -exponent))
                .collect(),
        }
    }

    /// Multiply by `atom^delta`.
    fn shifted(&self, atom: &Atom, delta: i32) -> Monomial {
        self.product(&Monomial::from_atom(atom.clone(), delta))
    }

    /// The monomial with `atom` removed entirely.
    fn without(&self, atom: &Atom) -> Monomial {
        let mut powers = self.powers.clone();
        powers.remove(atom);
        Monomial { powers }
    }

    /// Whether `symbol` occurs in any atom.
    fn contains(&self, symbol: &Symbol) -> bool {
        self.powers.keys().any(|atom| atom.contains(symbol))
    }

    /// First `sin` or `sinh` raised to at least the second power, with the
    /// Pythagorean replacement of its square.
    fn reducible_square(&self) -> Option<(Atom, Expr)> {
        self.powers.iter().find_map(|(atom, exponent)| match atom {
            Atom::Func(Func::Sin, argument) if *exponent >= 2 => Some((
                atom.clone(),
                Expr::one() - Expr::func(Func::Cos, (**argument).clone()).pow(2),
            )),
            Atom::Func(Func::Sinh, argument) if *exponent >= 2 => Some((
                atom.clone(),
                Expr::func(Func::Cosh, (**argument).clone()).pow(2) - Expr::one(),
            )),
            _ => None,
        })
    }
}

/// Expression stored as an expanded sum of monomials.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Expr {
    /// Non-zero coefficient of every monomial in the sum.
    terms: BTreeMap<Monomial, Rational64>,
}

/// An expression split into `content * monomial * primitive`.
#[derive(Clone, Debug, PartialEq)]
pub struct Factored {
    /// Rational content shared by every coefficient.
    pub content: Rational64,
    /// Monomial dividing every term.
    pub monomial: Monomial,
    /// Remaining factor.
    pub primitive: Expr,
}

impl Factored {
    /// The extracted factor `content * monomial`.
    #[must_use]
    pub fn factor(&self) -> Expr {
        Expr::from_term(self.monomial.clone(), self.content)
    }
}

impl Expr {
    /// The additive identity.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// The multiplicative identity.
    #[must_use]
    pub fn one() -> Self {
        Self::integer(1)
    }

    /// An integer constant.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::rational(Rational64::from(value))
    }

    /// A rational constant.
    #[must_use]
    pub fn rational(value: Rational64) -> Self {
        Self::from_term(Monomial::one(), value)
    }

    /// A bare symbol.
    #[must_use]
    pub fn symbol(symbol: &Symbol) -> Self {
        Self::from_term(
            Monomial::from_atom(Atom::Symbol(symbol.clone()), 1),
            Rational64::one(),
        )
    }

    /// A single term.
    #[must_use]
    pub fn from_term(monomial: Monomial, coefficient: Rational64) -> Self {
        let mut expr = Self::zero();
        expr.add_term(monomial, coefficient);
        expr
    }

    /// Apply `func` to `argument`, folding the value at zero.
    #[must_use]
    pub fn func(func: Func, argument: Expr) -> Self {
        if argument.is_zero() {
            return Self::integer(func.value_at_zero());
        }
        Self::from_term(
            Monomial::from_atom(Atom::Func(func, Box::new(argument)), 1),
            Rational64::one(),
        )
    }

    /// Whether the expression is identically zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// The value of a constant expression.
    #[must_use]
    pub fn as_constant(&self) -> Option<Rational64> {
        match self.terms.len() {
            0 => Some(Rational64::zero()),
            1 => self.terms.get(&Monomial::one()).copied(),
            _ => None,
        }
    }

    /// Number of terms in the expanded sum.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the sum has no terms.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterate over monomials and their coefficients.
    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, Rational64)> {
        self.terms
            .iter()
            .map(|(monomial, coefficient)| (monomial, *coefficient))
    }

    /// Accumulate `coefficient * monomial` into the sum.
    pub fn add_term(&mut self, monomial: Monomial, coefficient: Rational64) {
        if coefficient.is_zero() {
            return;
        }
        match self.terms.entry(monomial) {
            Entry::Occupied(mut entry) => {
                *entry.get_mut() += coefficient;
                if entry.get().is_zero() {
                    entry.remove();
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(coefficient);
            }
        }
    }

    /// Multiply every coefficient by `factor`.
    #[must_use]
    pub fn scale(&self, factor: Rational64) -> Expr {
        let mut result = Expr::zero();
        for (monomial, coefficient) in &self.terms {
            result.add_term(monomial.clone(), coefficient * factor);
        }
        result
    }

    /// Raise to a non-negative integer power.
    #[must_use]
    pub fn pow(&self, exponent: u32) -> Expr {
        (0..exponent).fold(Expr::one(), |acc, _| acc * self)
    }

    /// Raise to an integer power. Negative powers require a single-term base.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError`] when a negative power is requested of zero or
    /// of a sum with more than one term.
    pub fn powi(&self, exponent: i32) -> Result<Expr, SymbolicError> {
        if exponent >= 0 {
            Ok(self.pow(exponent.unsigned_abs()))
        } else {
            Ok(self.inverse()?.pow(exponent.unsigned_abs()))
        }
    }

    /// Exact reciprocal of a single-term expression.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError::DivisionByZero`] for zero and
    /// [`SymbolicError::NonMonomialInverse`] for sums of several terms.
    pub fn inverse(&self) -> Result<Expr, SymbolicError> {
        let mut terms = self.terms.iter();
        match (terms.next(), terms.next()) {
            (None, _) => Err(SymbolicError::DivisionByZero),
            (Some((monomial, coefficient)), None) => Ok(Expr::from_term(
                monomial.inverse(),
                coefficient.recip(),
            )),
            _ => Err(SymbolicError::NonMonomialInverse(self.to_string())),
        }
    }

    /// Whether `symbol` occurs anywhere in the expression.
    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.terms.keys().any(|monomial| monomial.contains(symbol))
    }

    /// Every symbol occurring in the expression, including function arguments.
    #[must_use]
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut symbols = BTreeSet::new();
        for monomial in self.terms.keys() {
            for (atom, _) in monomial.powers() {
                match atom {
                    Atom::Symbol(symbol) => {
                        symbols.insert(symbol.clone());
                    }
                    Atom::Func(_, argument) => symbols.extend(argument.free_symbols()),
                }
            }
        }
        symbols
    }

    /// Partial derivative with respect to `symbol`.
    #[must_use]
    pub fn diff(&self, symbol: &Symbol) -> Expr {
        let mut result = Expr::zero();
        for (monomial, coefficient) in &self.terms {
            for (atom, exponent) in monomial.powers() {
                let inner = atom.diff(symbol);
                if inner.is_zero() {
                    continue;
                }
                let outer = Expr::from_term(
                    monomial.shifted(atom, -1),
                    coefficient * Rational64::from(i64::from(exponent)),
                );
                result += outer * inner;
            }
        }
        result
    }

    /// Replace every occurrence of `symbol` by `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError`] when `symbol` appears with a negative exponent
    /// and `value` has no exact inverse.
    pub fn subs(&self, symbol: &Symbol, value: &Expr) -> Result<Expr, SymbolicError> {
        let mut result = Expr::zero();
        for (monomial, coefficient) in &self.terms {
            if !monomial.contains(symbol) {
                result.add_term(monomial.clone(), *coefficient);
                continue;
            }
            let mut term = Expr::rational(*coefficient);
            for (atom, exponent) in monomial.powers() {
                term = term * atom.subs(symbol, value)?.powi(exponent)?;
            }
            result += term;
        }
        Ok(result)
    }

    /// Replace `symbol^power` by `value` in every term whose exponent of
    /// `symbol` is a non-zero multiple of `power`. Other terms are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolicError`] when a negative multiple is met and `value`
    /// has no exact inverse.
    pub fn subs_power(
        &self,
        symbol: &Symbol,
        power: i32,
        value: &Expr,
    ) -> Result<Expr, SymbolicError> {
        let atom = Atom::Symbol(symbol.clone());
        let mut result = Expr::zero();
        for (monomial, coefficient) in &self.terms {
            let exponent = monomial.exponent(&atom);
            if exponent == 0 || power == 0 || exponent % power != 0 {
                result.add_term(monomial.clone(), *coefficient);
                continue;
            }
            let rest = Expr::from_term(monomial.without(&atom), *coefficient);
            result += rest * value.powi(exponent / power)?;
        }
        Ok(result)
    }

    /// Coefficient of the first power of `symbol`.
    #[must_use]
    pub fn coeff(&self, symbol: &Symbol) -> Expr {
        let atom = Atom::Symbol(symbol.clone());
        let mut result = Expr::zero();
        for (monomial, coefficient) in &self.terms {
            if monomial.exponent(&atom) == 1 {
                result.add_term(monomial.without(&atom), *coefficient);
            }
        }
        result
    }

    /// Terms in which none of `symbols` appear as a factor.
    #[must_use]
    pub fn independent_of(&self, symbols: &[&Symbol]) -> Expr {
        let mut result = Expr::zero();
        for (monomial, coefficient) in &self.terms {
            let dependent = symbols
                .iter()
                .any(|symbol| monomial.exponent(&Atom::Symbol((*symbol).clone())) != 0);
            if !dependent {
                result.add_term(monomial.clone(), *coefficient);
            }
        }
        result
    }

    /// Eliminate every even power of `sin` and `sinh` with the identities
    /// `sin² = 1 − cos²` and `sinh² = cosh² − 1`.
    #[must_use]
    pub fn trigsimp(&self) -> Expr {
        let mut current = self.clone();
        loop {
            let mut next = Expr::zero();
            let mut rewritten = false;
            for (monomial, coefficient) in &current.terms {
                if let Some((atom, replacement)) = monomial.reducible_square() {
                    rewritten = true;
                    next += Expr::from_term(monomial.shifted(&atom, -2), *coefficient) * replacement;
                } else {
                    next.add_term(monomial.clone(), *coefficient);
                }
            }
            if !rewritten {
                return next;
            }
            current = next;
        }
    }

    /// Replace `sinh(z)` by `(exp(z) - exp(-z))/2` and `cosh(z)` by
    /// `(exp(z) + exp(-z))/2`. Growing and decaying exponentials of the same
    /// argument then cancel exactly instead of in floating point.
    #[must_use]
    pub fn rewrite_hyperbolic(&self) -> Expr {
        let half = Rational64::new(1, 2);
        let mut result = Expr::zero();
        for (monomial, coefficient) in &self.terms {
            let mut term = Expr::rational(*coefficient);
            for (atom, exponent) in monomial.powers() {
                term = match atom {
                    Atom::Func(func @ (Func::Sinh | Func::Cosh), argument) if exponent > 0 => {
                        let sign = if *func == Func::Sinh { -1 } else { 1 };
                        let decaying = exp(-&**argument).scale(Rational64::from(sign));
                        let replacement = (exp((**argument).clone()) + decaying).scale(half);
                        term * replacement.pow(exponent.unsigned_abs())
                    }
                    _ => {
                        term * Expr::from_term(
                            Monomial::from_atom(atom.clone(), exponent),
                            Rational64::one(),
                        )
                    }
                };
            }
            result += term;
        }
        result
    }

    /// Split off the rational content and the largest monomial dividing
    /// every term. The sign is chosen so that the constant term of the
    /// primitive part, or its first term when there is none, is positive.
    #[must_use]
    pub fn factor_common(&self) -> Factored {
        let mut monomials = self.terms.keys();
        let Some(first) = monomials.next() else {
            return Factored {
                content: Rational64::zero(),
                monomial: Monomial::one(),
                primitive: Expr::zero(),
            };
        };

        let mut common = first.powers.clone();
        for monomial in monomials {
            common.retain(|atom, exponent| {
                let other = monomial.exponent(atom);
                if other == 0 || other.signum() != exponent.signum() {
                    return false;
                }
                if other.abs() < exponent.abs() {
                    *exponent = other;
                }
                true
            });
        }
        let monomial = Monomial { powers: common };

        let (numerator, denominator) = self
            .terms
            .values()
            .fold((0_i64, 1_i64), |(gcd, lcm), coefficient| {
                (gcd.gcd(coefficient.numer()), lcm.lcm(coefficient.denom()))
            });
        let mut content = Rational64::new(numerator, denominator);

        let divisor = monomial.inverse();
        let mut primitive = Expr::zero();
        for (term, coefficient) in &self.terms {
            primitive.add_term(term.product(&divisor), coefficient / content);
        }
        let leading = primitive
            .terms
            .get(&Monomial::one())
            .or_else(|| primitive.terms.values().next());
        if leading.is_some_and(|value| value.is_negative()) {
            content = -content;
            primitive = -primitive;
        }
        Factored {
            content,
            monomial,
            primitive,
        }
    }

    /// Lower the expression to a numeric function of `variable`, folding every
    /// other symbol to the value in `bindings`.
    ///
    /// # Errors
    ///
    /// Returns [`InstantiationError::MissingParameter`] listing every symbol
    /// that is neither `variable` nor bound.
    pub fn compile(
        &self,
        variable: &Symbol,
        bindings: &BTreeMap<Symbol, f64>,
    ) -> Result<CompiledExpr, InstantiationError> {
        let missing: Vec<Symbol> = self
            .free_symbols()
            .into_iter()
            .filter(|symbol| symbol != variable && !bindings.contains_key(symbol))
            .collect();
        if !missing.is_empty() {
            return Err(InstantiationError::MissingParameter { symbols: missing });
        }
        Ok(self.lower(variable, bindings))
    }

    /// Lowering once every symbol is known to be bound.
    fn lower(&self, variable: &Symbol, bindings: &BTreeMap<Symbol, f64>) -> CompiledExpr {
        let mut terms = Vec::with_capacity(self.terms.len());
        for (monomial, coefficient) in &self.terms {
            let mut term = CompiledTerm {
                coefficient: rational_to_f64(*coefficient),
                variable_power: 0,
                functions: Vec::new(),
            };
            for (atom, exponent) in monomial.powers() {
                match atom {
                    Atom::Symbol(symbol) if symbol == variable => term.variable_power = exponent,
                    Atom::Symbol(symbol) => {
                        term.coefficient *= bindings.get(symbol).map_or(1.0, |v| v.powi(exponent));
                    }
                    Atom::Func(func, argument) => {
                        term.functions
                            .push((*func, argument.lower(variable, bindings), exponent));
                    }
                }
            }
            terms.push(term);
        }
        CompiledExpr { terms }
    }
}

/// Numeric form of an [`Expr`] in a single variable.
#[derive(Clone, Debug, PartialEq)]
pub struct CompiledExpr {
    /// Terms with every bound symbol folded into the coefficient.
    terms: Vec<CompiledTerm>,
}

/// One term of a [`CompiledExpr`].
#[derive(Clone, Debug, PartialEq)]
struct CompiledTerm {
    /// Numeric coefficient.
    coefficient: f64,
    /// Power of the free variable.
    variable_power: i32,
    /// Function factors with their compiled arguments and exponents.
    functions: Vec<(Func, CompiledExpr, i32)>,
}

impl CompiledExpr {
    /// Evaluate at `x`.
    #[must_use]
    pub fn eval(&self, x: f64) -> f64 {
        self.terms
            .iter()
            .map(|term| {
                let mut value = term.coefficient;
                if term.variable_power != 0 {
                    value *= x.powi(term.variable_power);
                }
                for (func, argument, exponent) in &term.functions {
                    value *= func.apply(argument.eval(x)).powi(*exponent);
                }
                value
            })
            .sum()
    }
}

/// Convert an exact rational to the nearest double.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn rational_to_f64(value: Rational64) -> f64 {
    *value.numer() as f64 / *value.denom() as f64
}

/// `sin(argument)`
#[must_use]
pub fn sin(argument: Expr) -> Expr {
    Expr::func(Func::Sin, argument)
}

/// `cos(argument)`
#[must_use]
pub fn cos(argument: Expr) -> Expr {
    Expr::func(Func::Cos, argument)
}

/// `sinh(argument)`
#[must_use]
pub fn sinh(argument: Expr) -> Expr {
    Expr::func(Func::Sinh, argument)
}

/// `cosh(argument)`
#[must_use]
pub fn cosh(argument: Expr) -> Expr {
    Expr::func(Func::Cosh, argument)
}

/// `exp(argument)`
#[must_use]
pub fn exp(argument: Expr) -> Expr {
    Expr::func(Func::Exp, argument)
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::integer(value)
    }
}

impl From<&Symbol> for Expr {
    fn from(value: &Symbol) -> Self {
        Expr::symbol(value)
    }
}

impl AddAssign<Expr> for Expr {
    fn add_assign(&mut self, rhs: Expr) {
        for (monomial, coefficient) in rhs.terms {
            self.add_term(monomial, coefficient);
        }
    }
}

impl Add<&Expr> for &Expr {
    type Output = Expr;

    fn add(self, rhs: &Expr) -> Expr {
        let mut result = self.clone();
        result += rhs.clone();
        result
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(mut self, rhs: Expr) -> Expr {
        self += rhs;
        self
    }
}

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        self.scale(-Rational64::one())
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        -&self
    }
}

impl Sub<&Expr> for &Expr {
    type Output = Expr;

    fn sub(self, rhs: &Expr) -> Expr {
        let mut result = self.clone();
        result += -rhs;
        result
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        &self - &rhs
    }
}

impl Mul<&Expr> for &Expr {
    type Output = Expr;

    fn mul(self, rhs: &Expr) -> Expr {
        let mut result = Expr::zero();
        for (left, a) in &self.terms {
            for (right, b) in &rhs.terms {
                result.add_term(left.product(right), a * b);
            }
        }
        result
    }
}

impl Mul<&Expr> for Expr {
    type Output = Expr;

    fn mul(self, rhs: &Expr) -> Expr {
        &self * rhs
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        &self * &rhs
    }
}

/// Symbolic equality `lhs = rhs`.
#[derive(Clone, Debug, PartialEq)]
pub struct Equation {
    /// Left-hand side.
    pub lhs: Expr,
    /// Right-hand side.
    pub rhs: Expr,
}

impl Equation {
    /// Create an equation.
    #[must_use]
    pub fn new(lhs: Expr, rhs: Expr) -> Self {
        Self { lhs, rhs }
    }

    /// `lhs − rhs`, which vanishes when the equation holds.
    #[must_use]
    pub fn residual(&self) -> Expr {
        &self.lhs - &self.rhs
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.lhs, self.rhs)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Symbol(symbol) => write!(f, "{symbol}"),
            Atom::Func(func, argument) => write!(f, "{}({argument})", func.name()),
        }
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_one() {
            return f.write_str("1");
        }
        for (index, (atom, exponent)) in self.powers().enumerate() {
            if index > 0 {
                f.write_str("*")?;
            }
            if exponent == 1 {
                write!(f, "{atom}")?;
            } else {
                write!(f, "{atom}^{exponent}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        for (index, (monomial, coefficient)) in self.terms().enumerate() {
            let magnitude = coefficient.abs();
            match (index, coefficient.is_negative()) {
                (0, true) => f.write_str("-")?,
                (0, false) => (),
                (_, true) => f.write_str(" - ")?,
                (_, false) => f.write_str(" + ")?,
            }
            if monomial.is_one() {
                write!(f, "{magnitude}")?;
            } else if magnitude.is_one() {
                write!(f, "{monomial}")?;
            } else {
                write!(f, "{magnitude}*{monomial}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn symbols() -> (Symbol, Symbol, Symbol) {
        (Symbol::new("a"), Symbol::new("x"), Symbol::new("L"))
    }

    #[test]
    fn like_terms_cancel() {
        let (a, x, _) = symbols();
        let sum = Expr::symbol(&a) * Expr::symbol(&x) - Expr::symbol(&x) * Expr::symbol(&a);
        assert!(sum.is_zero());
        assert_eq!(sum.as_constant(), Some(Rational64::zero()));
    }

    #[test]
    fn functions_of_zero_fold_to_constants() {
        let (a, x, _) = symbols();
        let argument = Expr::symbol(&a) * Expr::symbol(&x);
        let q = sin(argument.clone()) + cos(argument.clone()) + sinh(argument.clone())
            + cosh(argument);
        let at_origin = q.subs(&x, &Expr::zero()).expect("substitution succeeds");
        assert_eq!(at_origin, Expr::integer(2));
    }

    #[test]
    fn derivative_follows_chain_rule() {
        let (a, x, _) = symbols();
        let argument = Expr::symbol(&a) * Expr::symbol(&x);
        let derivative = sin(argument.clone()).diff(&x);
        assert_eq!(derivative, Expr::symbol(&a) * cos(argument.clone()));

        let second = cosh(argument.clone()).diff(&x).diff(&x);
        assert_eq!(second, Expr::symbol(&a).pow(2) * cosh(argument));
    }

    #[test]
    fn pythagorean_identities_collapse() {
        let (a, _, _) = symbols();
        let argument = Expr::symbol(&a);
        let circular = sin(argument.clone()).pow(2) + cos(argument.clone()).pow(2);
        assert_eq!(circular.trigsimp(), Expr::one());

        let hyperbolic = cosh(argument.clone()).pow(2) - sinh(argument).pow(2);
        assert_eq!(hyperbolic.trigsimp(), Expr::one());
    }

    #[test]
    fn substituting_reciprocal_cancels_inside_arguments() {
        let (a, _, length) = symbols();
        let argument = Expr::symbol(&a) * Expr::symbol(&length);
        let scaled = Expr::symbol(&a) * Expr::symbol(&length).inverse().expect("monomial");
        let expr = cos(argument).subs(&a, &scaled).expect("substitution succeeds");
        assert_eq!(expr, cos(Expr::symbol(&a)));
    }

    #[test]
    fn sums_have_no_symbolic_inverse() {
        let (a, _, _) = symbols();
        let sum = Expr::symbol(&a) + Expr::one();
        assert!(matches!(
            sum.inverse(),
            Err(SymbolicError::NonMonomialInverse(_))
        ));
        assert_eq!(Expr::zero().inverse(), Err(SymbolicError::DivisionByZero));
    }

    #[test]
    fn power_substitution_skips_odd_exponents() {
        let w = Symbol::new("w");
        let (a, _, _) = symbols();
        let expr = Expr::symbol(&w).pow(2) + Expr::symbol(&w).pow(3);
        let replaced = expr
            .subs_power(&w, 2, &Expr::symbol(&a))
            .expect("substitution succeeds");
        assert_eq!(replaced, Expr::symbol(&a) + Expr::symbol(&w).pow(3));
    }

    #[test]
    fn factor_common_extracts_content_and_monomial() {
        let (a, x, _) = symbols();
        let expr = Expr::integer(-4) * Expr::symbol(&a).pow(3) * Expr::symbol(&x)
            - Expr::integer(6) * Expr::symbol(&a).pow(2);
        let factored = expr.factor_common();
        assert_eq!(factored.content, Rational64::from(-2));
        assert_eq!(factored.factor(), Expr::integer(-2) * Expr::symbol(&a).pow(2));
        assert_eq!(
            factored.primitive,
            Expr::integer(2) * Expr::symbol(&a) * Expr::symbol(&x) + Expr::integer(3)
        );
        assert_eq!(factored.factor() * &factored.primitive, expr);
    }

    #[test]
    fn coefficient_extraction_reads_linear_terms() {
        let (a, x, _) = symbols();
        let c = Symbol::new("C");
        let expr = Expr::symbol(&a) * Expr::symbol(&c) + Expr::symbol(&x);
        assert_eq!(expr.coeff(&c), Expr::symbol(&a));
        assert_eq!(expr.independent_of(&[&c]), Expr::symbol(&x));
    }

    #[test]
    fn compiled_expression_matches_closed_form() {
        let (a, _, length) = symbols();
        let expr = Expr::one() + cos(Expr::symbol(&a)) * cosh(Expr::symbol(&a))
            + Expr::symbol(&a) * Expr::symbol(&length).inverse().expect("monomial");
        let bindings = BTreeMap::from([(length.clone(), 2.0)]);
        let compiled = expr.compile(&a, &bindings).expect("all symbols bound");
        let value = 1.3_f64;
        assert_relative_eq!(
            compiled.eval(value),
            1.0 + value.cos() * value.cosh() + value / 2.0,
            epsilon = 1.0e-12
        );
    }

    #[test]
    fn compile_reports_every_unbound_symbol() {
        let (a, x, length) = symbols();
        let expr = Expr::symbol(&a) * Expr::symbol(&x) + Expr::symbol(&length);
        let error = expr
            .compile(&a, &BTreeMap::new())
            .expect_err("unbound symbols rejected");
        assert_eq!(
            error,
            InstantiationError::MissingParameter {
                symbols: vec![length, x]
            }
        );
    }

    #[test]
    fn hyperbolic_difference_becomes_a_decaying_exponential() {
        let (a, _, length) = symbols();
        let argument = Expr::symbol(&a) * Expr::symbol(&length);
        let difference = Expr::symbol(&a) * (cosh(argument.clone()) - sinh(argument.clone()));
        assert_eq!(
            difference.rewrite_hyperbolic(),
            Expr::symbol(&a) * exp(-argument.clone())
        );
        assert_eq!(
            (cosh(argument.clone()) + sinh(argument.clone())).rewrite_hyperbolic(),
            exp(argument)
        );
    }

    #[test]
    fn exponential_is_its_own_derivative() {
        let (a, x, _) = symbols();
        let argument = Expr::symbol(&a) * Expr::symbol(&x);
        let derivative = exp(argument.clone()).diff(&x);
        assert_eq!(derivative, Expr::symbol(&a) * exp(argument));
        assert_eq!(exp(Expr::zero()), Expr::one());
    }

    #[test]
    fn display_is_readable() {
        let (a, _, _) = symbols();
        let expr = Expr::one() - Expr::integer(2) * Expr::symbol(&a).pow(2);
        assert_eq!(expr.to_string(), "1 - 2*a^2");
    }
}
