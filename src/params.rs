//! Physical beam properties and the section quantities derived from them.

use std::collections::{BTreeMap, HashMap};
use std::f64::consts::PI;

use uom::si::f64::{Length, Mass, MassDensity, Pressure};
use uom::si::length::meter;
use uom::si::mass::kilogram;
use uom::si::mass_density::kilogram_per_cubic_meter;
use uom::si::pressure::pascal;

use crate::errors::ParameterError;
use crate::shape::BeamSymbols;
use crate::symbolic::Symbol;

/// Second moment of area of a hollow circular section, `π/64·(D⁴ − d⁴)`.
///
/// # Examples
/// ```
/// use eulerbeam::pipe_second_moment;
///
/// let solid = pipe_second_moment(0.1, 0.0);
/// assert!((solid - std::f64::consts::PI * 0.1_f64.powi(4) / 64.0).abs() < 1.0e-18);
/// ```
#[must_use]
pub fn pipe_second_moment(outer_diameter: f64, inner_diameter: f64) -> f64 {
    PI / 64.0 * (outer_diameter.powi(4) - inner_diameter.powi(4))
}

/// Cross-sectional area of a hollow circular section, `π/4·(D² − d²)`.
#[must_use]
pub fn pipe_area(outer_diameter: f64, inner_diameter: f64) -> f64 {
    PI / 4.0 * (outer_diameter.powi(2) - inner_diameter.powi(2))
}

/// Physical description of a uniform pipe beam carrying a tip mass.
///
/// All values are SI: pascals, metres, kilograms and kilograms per cubic
/// metre. The second moment of area and the mass per unit length are derived
/// once on construction; the record is never mutated afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamParameters {
    /// Elastic modulus `E` in pascals.
    elastic_modulus: f64,
    /// Outer diameter `D` in metres.
    outer_diameter: f64,
    /// Inner diameter `d` in metres.
    inner_diameter: f64,
    /// Length `L` in metres.
    length: f64,
    /// Tip mass `M` in kilograms.
    tip_mass: f64,
    /// Material density `rho` in kilograms per cubic metre.
    density: f64,
    /// Rotary inertia `J` of the tip mass in kilogram square metres.
    tip_inertia: f64,
    /// Derived second moment of area `I` in metres to the fourth.
    second_moment: f64,
    /// Derived distributed mass `m` in kilograms per metre.
    mass_per_length: f64,
}

impl Default for BeamParameters {
    /// Steel pipe of 3.3 m with a 15.4 kg tip mass.
    fn default() -> Self {
        Self::derive(2.06e11, 0.114, 0.109, 3.3, 15.4, 7850.0, 0.0)
    }
}

impl BeamParameters {
    /// Keys that every parameter mapping must provide.
    pub const REQUIRED_KEYS: [&'static str; 6] = ["E", "D", "d", "L", "M", "rho"];

    /// Validate the inputs and derive the section properties.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] when any value is not finite, when `E`, `D`,
    /// `L` or `rho` is not strictly positive, when `d` or `M` is negative, or
    /// when `d` is not smaller than `D`.
    ///
    /// # Examples
    /// ```
    /// use eulerbeam::{BeamParameters, ParameterError};
    ///
    /// let error = BeamParameters::new(2.06e11, 0.1, 0.2, 3.3, 0.0, 7850.0)
    ///     .expect_err("inner diameter larger than outer");
    /// assert!(matches!(error, ParameterError::InnerExceedsOuter { .. }));
    /// ```
    pub fn new(
        elastic_modulus: f64,
        outer_diameter: f64,
        inner_diameter: f64,
        length: f64,
        tip_mass: f64,
        density: f64,
    ) -> Result<Self, ParameterError> {
        positive("E", elastic_modulus)?;
        positive("D", outer_diameter)?;
        non_negative("d", inner_diameter)?;
        positive("L", length)?;
        non_negative("M", tip_mass)?;
        positive("rho", density)?;
        if inner_diameter >= outer_diameter {
            return Err(ParameterError::InnerExceedsOuter {
                outer: outer_diameter,
                inner: inner_diameter,
            });
        }
        Ok(Self::derive(
            elastic_modulus,
            outer_diameter,
            inner_diameter,
            length,
            tip_mass,
            density,
            0.0,
        ))
    }

    /// Build the record from typed quantities.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] under the same conditions as [`BeamParameters::new`].
    pub fn from_quantities(
        elastic_modulus: Pressure,
        outer_diameter: Length,
        inner_diameter: Length,
        length: Length,
        tip_mass: Mass,
        density: MassDensity,
    ) -> Result<Self, ParameterError> {
        Self::new(
            elastic_modulus.get::<pascal>(),
            outer_diameter.get::<meter>(),
            inner_diameter.get::<meter>(),
            length.get::<meter>(),
            tip_mass.get::<kilogram>(),
            density.get::<kilogram_per_cubic_meter>(),
        )
    }

    /// Build the record from a key-to-value mapping.
    ///
    /// The keys in [`BeamParameters::REQUIRED_KEYS`] are mandatory; `J`, the
    /// rotary inertia of the tip mass, is optional and defaults to zero.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::MissingKey`] for the first absent required key,
    /// and otherwise the validation errors of [`BeamParameters::new`].
    pub fn from_map(values: &HashMap<String, f64>) -> Result<Self, ParameterError> {
        let lookup = |key: &'static str| {
            values
                .get(key)
                .copied()
                .ok_or(ParameterError::MissingKey(key))
        };
        let parameters = Self::new(
            lookup("E")?,
            lookup("D")?,
            lookup("d")?,
            lookup("L")?,
            lookup("M")?,
            lookup("rho")?,
        )?;
        match values.get("J") {
            Some(&inertia) => parameters.with_tip_inertia(inertia),
            None => Ok(parameters),
        }
    }

    /// Copy of the record with a different tip mass.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] when `tip_mass` is negative or not finite.
    pub fn with_tip_mass(&self, tip_mass: f64) -> Result<Self, ParameterError> {
        non_negative("M", tip_mass)?;
        Ok(Self { tip_mass, ..*self })
    }

    /// Copy of the record with a rotary inertia attached to the tip mass.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError`] when `tip_inertia` is negative or not finite.
    pub fn with_tip_inertia(&self, tip_inertia: f64) -> Result<Self, ParameterError> {
        non_negative("J", tip_inertia)?;
        Ok(Self {
            tip_inertia,
            ..*self
        })
    }

    /// Elastic modulus `E` in pascals.
    #[must_use]
    pub const fn elastic_modulus(&self) -> f64 {
        self.elastic_modulus
    }

    /// Outer diameter `D` in metres.
    #[must_use]
    pub const fn outer_diameter(&self) -> f64 {
        self.outer_diameter
    }

    /// Inner diameter `d` in metres.
    #[must_use]
    pub const fn inner_diameter(&self) -> f64 {
        self.inner_diameter
    }

    /// Length `L` in metres.
    #[must_use]
    pub const fn length(&self) -> f64 {
        self.length
    }

    /// Tip mass `M` in kilograms.
    #[must_use]
    pub const fn tip_mass(&self) -> f64 {
        self.tip_mass
    }

    /// Material density in kilograms per cubic metre.
    #[must_use]
    pub const fn density(&self) -> f64 {
        self.density
    }

    /// Rotary inertia `J` of the tip mass in kilogram square metres.
    #[must_use]
    pub const fn tip_inertia(&self) -> f64 {
        self.tip_inertia
    }

    /// Second moment of area `I` in metres to the fourth.
    #[must_use]
    pub const fn second_moment(&self) -> f64 {
        self.second_moment
    }

    /// Mass per unit length `m` in kilograms per metre.
    #[must_use]
    pub const fn mass_per_length(&self) -> f64 {
        self.mass_per_length
    }

    /// Numeric values for every physical symbol of the beam model.
    #[must_use]
    pub fn bindings(&self, symbols: &BeamSymbols) -> BTreeMap<Symbol, f64> {
        BTreeMap::from([
            (symbols.length.clone(), self.length),
            (symbols.modulus.clone(), self.elastic_modulus),
            (symbols.second_moment.clone(), self.second_moment),
            (symbols.tip_mass.clone(), self.tip_mass),
            (symbols.tip_inertia.clone(), self.tip_inertia),
            (symbols.mass_per_length.clone(), self.mass_per_length),
        ])
    }

    /// Compute the derived fields without validation.
    fn derive(
        elastic_modulus: f64,
        outer_diameter: f64,
        inner_diameter: f64,
        length: f64,
        tip_mass: f64,
        density: f64,
        tip_inertia: f64,
    ) -> Self {
        Self {
            elastic_modulus,
            outer_diameter,
            inner_diameter,
            length,
            tip_mass,
            density,
            tip_inertia,
            second_moment: pipe_second_moment(outer_diameter, inner_diameter),
            mass_per_length: density * pipe_area(outer_diameter, inner_diameter),
        }
    }
}

/// Reject values that are not finite.
fn finite(name: &'static str, value: f64) -> Result<(), ParameterError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParameterError::NonFinite { name, value })
    }
}

/// Reject values that are not finite and strictly positive.
fn positive(name: &'static str, value: f64) -> Result<(), ParameterError> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::NonPositive { name, value })
    }
}

/// Reject values that are not finite and non-negative.
fn non_negative(name: &'static str, value: f64) -> Result<(), ParameterError> {
    finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ParameterError::Negative { name, value })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn reference_map() -> HashMap<String, f64> {
        [
            ("E", 2.06e11),
            ("D", 0.114),
            ("d", 0.109),
            ("L", 3.3),
            ("M", 15.4),
            ("rho", 7850.0),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
    }

    #[test]
    fn derives_section_properties() {
        let parameters = BeamParameters::default();
        let expected_i = PI / 64.0 * (0.114_f64.powi(4) - 0.109_f64.powi(4));
        let expected_m = 7850.0 * PI / 4.0 * (0.114_f64.powi(2) - 0.109_f64.powi(2));
        assert_relative_eq!(parameters.second_moment(), expected_i, max_relative = 1.0e-12);
        assert_relative_eq!(parameters.mass_per_length(), expected_m, max_relative = 1.0e-12);
    }

    #[test]
    fn mapping_matches_default() {
        let parameters = BeamParameters::from_map(&reference_map()).expect("valid mapping");
        assert_eq!(parameters, BeamParameters::default());
    }

    #[test]
    fn mapping_reports_missing_key() {
        let mut values = reference_map();
        values.remove("rho");
        let error = BeamParameters::from_map(&values).expect_err("missing key rejected");
        assert_eq!(error, ParameterError::MissingKey("rho"));
    }

    #[test]
    fn mapping_reads_optional_inertia() {
        let mut values = reference_map();
        values.insert("J".to_string(), 0.25);
        let parameters = BeamParameters::from_map(&values).expect("valid mapping");
        assert_relative_eq!(parameters.tip_inertia(), 0.25);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert_eq!(
            BeamParameters::new(0.0, 0.1, 0.05, 1.0, 0.0, 7850.0),
            Err(ParameterError::NonPositive {
                name: "E",
                value: 0.0
            })
        );
        assert_eq!(
            BeamParameters::new(2.0e11, 0.1, 0.05, 1.0, -1.0, 7850.0),
            Err(ParameterError::Negative {
                name: "M",
                value: -1.0
            })
        );
        assert!(matches!(
            BeamParameters::new(2.0e11, 0.1, 0.05, f64::NAN, 0.0, 7850.0),
            Err(ParameterError::NonFinite { name: "L", .. })
        ));
    }

    #[test]
    fn quantities_convert_to_si() {
        use uom::si::length::millimeter;
        use uom::si::pressure::gigapascal;

        let parameters = BeamParameters::from_quantities(
            Pressure::new::<gigapascal>(206.0),
            Length::new::<millimeter>(114.0),
            Length::new::<millimeter>(109.0),
            Length::new::<meter>(3.3),
            Mass::new::<kilogram>(15.4),
            MassDensity::new::<kilogram_per_cubic_meter>(7850.0),
        )
        .expect("valid quantities");
        let reference = BeamParameters::default();
        assert_relative_eq!(
            parameters.second_moment(),
            reference.second_moment(),
            max_relative = 1.0e-9
        );
        assert_relative_eq!(
            parameters.elastic_modulus(),
            reference.elastic_modulus(),
            max_relative = 1.0e-12
        );
    }
}
