#![warn(clippy::pedantic)]

use approx::assert_relative_eq;
use eulerbeam::{
    bisection, instantiate, scan_and_bisect, BeamModel, BeamParameters, Bisection, Derivation,
    SolverError,
};
use uom::si::frequency::hertz;

fn cantilever(params: BeamParameters) -> BeamModel {
    let derivation = Derivation::cantilever().expect("cantilever derivation succeeds");
    BeamModel::new(derivation, params).expect("parameters bind every symbol")
}

fn massless() -> BeamParameters {
    BeamParameters::default()
        .with_tip_mass(0.0)
        .expect("zero tip mass is valid")
}

#[test]
fn massless_cantilever_recovers_classical_roots() {
    let roots: Vec<f64> = cantilever(massless())
        .find_roots(3)
        .into_iter()
        .map(|root| root.root)
        .collect();

    assert_eq!(roots.len(), 3);
    assert_relative_eq!(roots[0], 1.8751, epsilon = 1.0e-4);
    assert_relative_eq!(roots[1], 4.6941, epsilon = 1.0e-4);
    assert_relative_eq!(roots[2], 7.8548, epsilon = 1.0e-4);
}

#[test]
fn reference_beam_has_three_increasing_frequencies() {
    let model = cantilever(BeamParameters::default());
    let modes = model.modes(3);

    assert_eq!(modes.len(), 3);
    assert!(modes.iter().all(|mode| mode.converged));
    assert!(modes[0].frequency_hz > 0.0);
    assert!(modes[0].frequency_hz < modes[1].frequency_hz);
    assert!(modes[1].frequency_hz < modes[2].frequency_hz);
    assert_eq!(
        modes.iter().map(|mode| mode.index).collect::<Vec<_>>(),
        vec![1, 2, 3]
    );
}

#[test]
fn tip_mass_lowers_every_frequency() {
    let loaded = cantilever(BeamParameters::default()).modes(3);
    let bare = cantilever(massless()).modes(3);

    for (with_mass, without_mass) in loaded.iter().zip(&bare) {
        assert!(with_mass.root < without_mass.root);
        assert!(with_mass.frequency_hz < without_mass.frequency_hz);
    }
}

#[test]
fn roots_are_bracketed_by_a_sign_change() {
    let model = cantilever(BeamParameters::default());
    let f = model.function();
    for root in model.find_roots(3) {
        let left = f.eval(root.root - 1.0e-6);
        let right = f.eval(root.root + 1.0e-6);
        assert!(left * right < 0.0, "no sign change around {}", root.root);
    }
}

#[test]
fn repeated_scans_are_bit_identical() {
    let derivation = Derivation::cantilever().expect("cantilever derivation succeeds");
    let function = instantiate(&derivation.characteristic, &BeamParameters::default())
        .expect("parameters bind every symbol");

    let first: Vec<Bisection> = scan_and_bisect(function.as_fn(), 50.0, 1.0e-3, 3).collect();
    let second: Vec<Bisection> = scan_and_bisect(function.as_fn(), 50.0, 1.0e-3, 3).collect();
    assert_eq!(first.len(), 3);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.root.to_bits(), b.root.to_bits());
    }

    let mut scan = scan_and_bisect(function.as_fn(), 50.0, 1.0e-3, 3);
    let replay = scan.clone().collect::<Vec<_>>();
    assert_eq!(replay, first);
    assert_eq!(scan.next(), first.first().copied());
}

#[test]
fn scan_returns_fewer_roots_when_interval_is_short() {
    let model = cantilever(massless());
    let function = model.function();
    let roots: Vec<Bisection> = scan_and_bisect(function.as_fn(), 5.0, 1.0e-3, 3).collect();
    assert_eq!(roots.len(), 2);
}

#[test]
fn bisection_requires_a_bracket() {
    let error = bisection(|x| 1.0 + x, 0.0, 1.0, 1.0e-12, 200).expect_err("f(a) = 1, f(b) = 2");
    assert!(matches!(error, SolverError::NoSignChange { .. }));
}

#[test]
fn bisection_stays_inside_the_bracket() {
    let model = cantilever(BeamParameters::default());
    let f = model.function().as_fn();
    for (a, b) in [(0.5, 2.5), (2.5, 6.0), (6.0, 9.0), (1.0, 1.9)] {
        if f(a) * f(b) >= 0.0 {
            continue;
        }
        let result = bisection(&f, a, b, 1.0e-12, 200).expect("bracketed");
        assert!((a..=b).contains(&result.root));
        assert!(result.converged);
        assert!(f(result.root).abs() < 1.0e-9 || result.iterations == 200);
    }
}

#[test]
fn frequency_matches_closed_form() {
    let params = massless();
    let model = cantilever(params);
    let root = model.find_roots(1)[0].root;

    let expected = root.powi(2)
        * (params.elastic_modulus() * params.second_moment()
            / (params.mass_per_length() * params.length().powi(4)))
        .sqrt()
        / (2.0 * std::f64::consts::PI);
    assert_relative_eq!(model.natural_frequency(root), expected, max_relative = 1.0e-12);
    assert_relative_eq!(
        model.natural_frequency_quantity(root).get::<hertz>(),
        expected,
        max_relative = 1.0e-12
    );
}

#[test]
fn vectorized_evaluation_matches_scalar() {
    let model = cantilever(BeamParameters::default());
    let f = model.function();
    let points = ndarray::Array1::linspace(0.5, 10.0, 20);
    let values = f.eval_array(&points);
    for (x, value) in points.iter().zip(values.iter()) {
        assert_eq!(value.to_bits(), f.eval(*x).to_bits());
    }
}
