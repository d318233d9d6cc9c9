use crate::analysis::AnalysisSummary;
use std::fmt::Write;

/// Render a textual summary of the eigenfrequency analysis.
///
/// Roots are the dimensionless wavenumbers `a·L`; the classical massless
/// cantilever values 1.8751, 4.6941 and 7.8548 are a quick sanity check.
#[must_use]
pub fn render_summary(summary: &AnalysisSummary) -> String {
    let mut output = String::new();
    let beam = &summary.parameters;

    // Name the beam and its end conditions first, so every number below has
    // a physical setting.
    writeln!(
        &mut output,
        "Euler beam eigenfrequencies ({}, L = {:.3} m, M = {:.2} kg)",
        summary.conditions,
        beam.length(),
        beam.tip_mass()
    )
    .expect("writing to string cannot fail");

    // Section properties of the hollow circular cross section. See
    // https://en.wikipedia.org/wiki/Second_moment_of_area.
    writeln!(
        &mut output,
        "Section: I = {:.4e} m^4, m = {:.3} kg/m",
        beam.second_moment(),
        beam.mass_per_length()
    )
    .expect("writing to string cannot fail");

    // The characteristic function is printed in the dimensionless wavenumber
    // `a·L`, so it can be compared with tabulated frequency equations.
    writeln!(
        &mut output,
        "Characteristic function: {} = 0",
        summary.characteristic
    )
    .expect("writing to string cannot fail");

    // Roots first, then the frequencies they map to through
    // f = r² · sqrt(E·I/(m·L⁴)) / 2π.
    output.push_str("\nRoots r:\n");
    for mode in &summary.modes {
        writeln!(&mut output, "  r{} = {:.6}", mode.index, mode.root)
            .expect("writing to string cannot fail");
    }

    output.push_str("\nNatural frequencies f (Hz):\n");
    for mode in &summary.modes {
        let note = if mode.converged { "" } else { " (not converged)" };
        writeln!(
            &mut output,
            "  f{} = {:.6}{note}",
            mode.index, mode.frequency_hz
        )
        .expect("writing to string cannot fail");
    }

    // A short list means the scan interval ended before enough sign changes
    // were found; widening `scan.x_max` in the configuration finds more.
    if summary.modes.len() < summary.requested {
        writeln!(
            &mut output,
            "\nOnly {} of {} requested modes lie in the scan interval.",
            summary.modes.len(),
            summary.requested
        )
        .expect("writing to string cannot fail");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use eulerbeam::{BeamParameters, Mode};

    fn mode(index: usize, root: f64, frequency_hz: f64) -> Mode {
        Mode {
            index,
            root,
            frequency_hz,
            converged: true,
            shape: None,
        }
    }

    #[test]
    fn formats_human_readable_report() {
        let summary = AnalysisSummary {
            conditions: "clamped / tip mass".to_string(),
            characteristic: "1 + cos(a)*cosh(a)".to_string(),
            parameters: BeamParameters::default(),
            modes: vec![mode(1, 1.875_104, 8.25), mode(2, 4.694_091, 51.7)],
            requested: 3,
        };
        let report = render_summary(&summary);
        assert!(report.contains("Euler beam eigenfrequencies (clamped / tip mass"));
        assert!(report.contains("r1 = 1.875104"));
        assert!(report.contains("f2 = 51.700000"));
        assert!(report.contains("Only 2 of 3 requested modes"));
    }
}
