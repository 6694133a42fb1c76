use rand::{rngs::StdRng, SeedableRng};

use crate::{
    network::{Network, Topology},
    registry::{weights_file_name, ModelRegistry},
    types::ModelError,
    weights::save_weights,
};

#[test]
fn should_load_one_network_per_variant() {
    let directory = tempfile::tempdir().unwrap();
    let topology = Topology::new(3, 1, 1, 6);
    let rows = vec![vec![0.1, 0.2, 0.3], vec![-1.0, 0.0, 4.0]];

    let mut expected = Vec::new();
    for (seed, variant) in ["e5", "e10", "diesel"].iter().enumerate() {
        let network = Network::with_rng(topology, &mut StdRng::seed_from_u64(seed as u64)).unwrap();
        save_weights(&network, directory.path().join(weights_file_name(variant))).unwrap();
        expected.push(network.predict(&rows).unwrap());
    }

    let registry = ModelRegistry::load(directory.path(), &["E5", "e10", "Diesel"], &topology).unwrap();

    assert_eq!(registry.variants(), vec!["diesel", "e10", "e5"]);
    for (variant, outputs) in ["e5", "E10", " diesel"].iter().zip(&expected) {
        let predictions = registry.predict(variant, &rows).unwrap();
        let expected_predictions: Vec<f32> = outputs.iter().map(|row| row[0]).collect();
        assert_eq!(predictions, expected_predictions);
    }

    assert!(matches!(
        registry.predict("e5", &[vec![1.0, 2.0]]),
        Err(ModelError::InputDimension(_))
    ));
}

#[test]
fn should_fail_when_a_variant_has_no_archive() {
    let directory = tempfile::tempdir().unwrap();

    assert!(matches!(
        ModelRegistry::load(directory.path(), &["e5"], &Topology::new(3, 1, 1, 6)),
        Err(ModelError::Io(_))
    ));
}
