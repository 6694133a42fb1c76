use fuelnet::{load_weights, Dataset, Network, Topology, Trainer, TrainingOptions};

const WEIGHTS_PATH: &str = "best_model_weights_linear.bin";

fn main() {
    // RUST_LOG=info shows one line per epoch
    env_logger::init();

    let topology = Topology::new(1, 1, 1, 8);
    let network = Network::new(topology).expect("unable to build the network");

    let inputs: Vec<Vec<f32>> = (0..200).map(|x| vec![x as f32 / 50.0]).collect();
    let outputs: Vec<Vec<f32>> = inputs.iter().map(|x| vec![3.0 * x[0]]).collect();
    let (training, validation) = Dataset::new(inputs, outputs)
        .expect("inputs and outputs should be as long")
        .split_validation(0.2);

    let mut trainer = Trainer::new(
        network,
        TrainingOptions {
            learning_rate: 1e-3,
            epochs: 2000,
            batch_size: 16,
            patience: 20,
            weights_path: Some(WEIGHTS_PATH.into()),
            verbose: true,
            ..TrainingOptions::default()
        },
    );

    let report = trainer
        .train(&training, &validation)
        .expect("unable to train the network");
    println!(
        "ran {} epochs, best validation loss {} at epoch {:?}",
        report.epochs_run, report.best_loss, report.best_epoch
    );

    let mut reloaded = Network::new(topology).expect("unable to build the network");
    load_weights(&mut reloaded, WEIGHTS_PATH).expect("unable to load the saved weights");

    let probe = vec![vec![5.0], vec![15.0]];
    let trained_predictions = trainer.network().predict(&probe).expect("unable to predict");
    let reloaded_predictions = reloaded.predict(&probe).expect("unable to predict");

    for ((x, trained), reloaded) in probe.iter().zip(&trained_predictions).zip(&reloaded_predictions) {
        println!(
            "f({}) = {:.3} (reloaded: {:.3}, expected {})",
            x[0],
            trained[0],
            reloaded[0],
            3.0 * x[0]
        );
    }
}
