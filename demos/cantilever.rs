use eulerbeam::{BeamModel, BeamParameters, Derivation};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let derivation = Derivation::cantilever()?;
    println!("{} = 0", derivation.characteristic.normalized);

    let model = BeamModel::new(derivation, BeamParameters::default())?;
    for mode in model.modes_with_shapes(3, 11)? {
        println!(
            "mode {}: r = {:.6}, f = {:.3} Hz",
            mode.index, mode.root, mode.frequency_hz
        );
        if let Some(shape) = mode.shape {
            let samples: Vec<String> = shape
                .displacements
                .iter()
                .map(|value| format!("{value:+.2}"))
                .collect();
            println!("  shape: {}", samples.join(" "));
        }
    }

    Ok(())
}
