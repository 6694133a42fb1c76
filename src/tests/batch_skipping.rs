use rand::{rngs::StdRng, SeedableRng};

use crate::{
    network::{Network, Topology},
    trainer::{Dataset, Trainer, TrainingOptions},
};

fn trainer() -> Trainer {
    let network =
        Network::with_rng(Topology::new(2, 1, 1, 4), &mut StdRng::seed_from_u64(31)).unwrap();
    Trainer::new(
        network,
        TrainingOptions {
            learning_rate: 1e-2,
            ..TrainingOptions::default()
        },
    )
}

#[test]
fn a_corrupt_batch_should_not_affect_the_ones_around_it() {
    let first = (vec![vec![1.0, 2.0], vec![0.5, -1.0]], vec![vec![3.0], vec![1.0]]);
    let corrupt = (vec![vec![f32::NAN, 2.0]], vec![vec![3.0]]);
    let infinite_label = (vec![vec![1.0, 1.0]], vec![vec![f32::NEG_INFINITY]]);
    let last = (vec![vec![-2.0, 0.0]], vec![vec![-4.0]]);

    let mut with_corruption = trainer();
    let mut clean = trainer();

    assert!(with_corruption.train_step(&first.0, &first.1).unwrap().is_some());
    let after_first = with_corruption.network().parameters();
    assert!(with_corruption
        .train_step(&corrupt.0, &corrupt.1)
        .unwrap()
        .is_none());
    assert!(with_corruption
        .train_step(&infinite_label.0, &infinite_label.1)
        .unwrap()
        .is_none());
    assert_eq!(with_corruption.network().parameters(), after_first);
    with_corruption.train_step(&last.0, &last.1).unwrap();

    clean.train_step(&first.0, &first.1).unwrap();
    clean.train_step(&last.0, &last.1).unwrap();

    assert_eq!(
        with_corruption.network().parameters(),
        clean.network().parameters()
    );
}

#[test]
fn train_should_count_skipped_batches() {
    let training = Dataset::new(
        vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![f32::INFINITY, 1.0]],
        vec![vec![1.0], vec![2.0], vec![3.0]],
    )
    .unwrap();
    let validation = Dataset::new(vec![vec![1.0, 1.0]], vec![vec![3.0]]).unwrap();

    let mut trainer = trainer();
    trainer.options.epochs = 3;
    trainer.options.batch_size = 2;
    trainer.options.patience = 10;

    let report = trainer.train(&training, &validation).unwrap();

    assert_eq!(report.epochs_run, 3);
    assert_eq!(report.skipped_batches, 3);
    assert!(report.last_train_loss.map_or(false, f32::is_finite));
}
