use eulerbeam::{BeamModel, BeamParameters, BoundaryConditions, Derivation, Support};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let params = BeamParameters::default().with_tip_inertia(0.05)?;
    let free_ends = [
        Support::Free,
        Support::Pinned,
        Support::Guided,
        Support::Clamped,
        Support::TipMass,
        Support::TipMassWithInertia,
    ];

    for free in free_ends {
        let conditions = BoundaryConditions::new(Support::Clamped, free);
        let model = BeamModel::new(Derivation::new(&conditions)?, params)?;
        let roots: Vec<String> = model
            .find_roots(3)
            .iter()
            .map(|root| format!("{:.4}", root.root))
            .collect();
        println!("{:<40} {}", conditions.describe(), roots.join("  "));
    }

    // A pinned end at x = 0 leaves A undetermined.
    if let Err(error) = Derivation::new(&BoundaryConditions::new(Support::Pinned, Support::Free)) {
        println!("pinned / free: {error}");
    }

    Ok(())
}
