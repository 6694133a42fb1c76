use rand::{rngs::StdRng, SeedableRng};

use crate::{
    network::{Network, Topology},
    types::{ModelError, ParameterKind},
    weights::{load_weights, save_weights, NamedArray, WeightArchive},
};

fn seeded(topology: Topology, seed: u64) -> Network {
    Network::with_rng(topology, &mut StdRng::seed_from_u64(seed)).unwrap()
}

#[test]
fn saved_weights_should_reproduce_the_same_predictions() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("best_model_weights_e5.bin");
    let topology = Topology::new(4, 1, 2, 8);
    let inputs = vec![
        vec![0.25, -1.0, 3.5, 0.0],
        vec![1.0, 1.0, 1.0, 1.0],
        vec![-0.3, 0.7, -2.2, 9.1],
    ];

    let trained = seeded(topology, 1);
    save_weights(&trained, &path).unwrap();

    let mut fresh = seeded(topology, 2);
    assert_ne!(fresh.predict(&inputs).unwrap(), trained.predict(&inputs).unwrap());

    load_weights(&mut fresh, &path).unwrap();

    assert_eq!(fresh.parameters(), trained.parameters());
    assert_eq!(
        fresh.feed_forward(&inputs).unwrap(),
        trained.predict(&inputs).unwrap()
    );
    assert!(!directory.path().join("best_model_weights_e5.bin.tmp").exists());
}

#[test]
fn archive_should_list_every_layer_in_order() {
    let network = seeded(Topology::new(3, 1, 1, 5), 3);

    let archive = WeightArchive::from_network(&network);
    let names: Vec<&str> = archive
        .arrays
        .iter()
        .map(|array| array.name.as_str())
        .collect();

    assert_eq!(names, vec!["W0", "b0", "W1", "b1", "W2", "b2"]);
}

#[test]
fn loading_into_another_topology_should_change_nothing() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("weights.bin");
    save_weights(&seeded(Topology::new(2, 1, 1, 3), 4), &path).unwrap();

    let mut wider = seeded(Topology::new(2, 1, 1, 4), 5);
    let before = wider.parameters();

    match load_weights(&mut wider, &path) {
        Err(ModelError::ShapeMismatch(err)) => {
            assert_eq!(err.layer_index, 0);
            assert_eq!(err.parameter, ParameterKind::Weights);
            assert_eq!(err.expected, (2, 4));
            assert_eq!(err.actual, (2, 3));
        }
        other => panic!("expected a shape mismatch, got {:?}", other),
    }
    assert_eq!(wider.parameters(), before);

    let mut deeper = seeded(Topology::new(2, 1, 2, 3), 6);
    let before = deeper.parameters();

    match load_weights(&mut deeper, &path) {
        Err(ModelError::ShapeMismatch(err)) => {
            assert_eq!(err.layer_index, 2);
            assert_eq!(err.expected, (3, 3));
            assert_eq!(err.actual, (3, 1));
        }
        other => panic!("expected a shape mismatch, got {:?}", other),
    }
    assert_eq!(deeper.parameters(), before);
}

#[test]
fn corrupt_or_missing_archives_should_change_nothing() {
    let directory = tempfile::tempdir().unwrap();
    let mut network = seeded(Topology::new(2, 1, 1, 3), 7);
    let before = network.parameters();

    assert!(matches!(
        load_weights(&mut network, directory.path().join("missing.bin")),
        Err(ModelError::Io(_))
    ));

    let corrupt = directory.path().join("corrupt.bin");
    std::fs::write(&corrupt, b"definitely not an archive").unwrap();
    assert!(load_weights(&mut network, &corrupt).is_err());

    assert_eq!(network.parameters(), before);
}

#[test]
fn archives_with_impossible_shapes_should_be_refused() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("huge.bin");
    let archive = WeightArchive {
        arrays: vec![NamedArray {
            name: "W0".to_string(),
            rows: usize::MAX / 2 + 1,
            cols: 2,
            values: Vec::new(),
        }],
    };
    archive
        .write_to(std::fs::File::create(&path).unwrap())
        .unwrap();

    let mut network = seeded(Topology::new(2, 1, 1, 3), 8);
    let before = network.parameters();

    assert!(matches!(
        load_weights(&mut network, &path),
        Err(ModelError::MalformedArray { name }) if name == "W0"
    ));
    assert_eq!(network.parameters(), before);
}
