//! Mini-batch training with early stopping on a validation set.

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    layers::LayerParameters,
    network::Network,
    types::ModelError,
    utils::MatrixOperations,
    weights::save_weights,
};

/// The smallest drop in validation loss that counts as an improvement by default.
pub const DEFAULT_MIN_DELTA: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
/// A struct that defines the options for training a [Network].
pub struct TrainingOptions {
    /// The step size of every gradient update.
    pub learning_rate: f32,
    /// The L2 decay applied after each gradient update.
    pub weight_decay: f32,
    /// The maximum amount of passes over the training set.
    pub epochs: usize,
    /// The amount of contiguous rows per update, the last batch may be shorter.
    pub batch_size: usize,
    /// How many consecutive epochs without improvement end the training.
    pub patience: usize,
    /// The validation loss must drop below `best - min_delta` to count as an improvement.
    pub min_delta: f32,
    /// Where the best parameters are written once training ends, if anywhere.
    pub weights_path: Option<PathBuf>,
    /// Weather or not an epoch progress bar should be drawn.
    pub verbose: bool,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        TrainingOptions {
            learning_rate: 1e-3,
            weight_decay: 1e-4,
            epochs: 10,
            batch_size: 512,
            patience: 3,
            min_delta: DEFAULT_MIN_DELTA,
            weights_path: None,
            verbose: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Feature rows together with the rows they should be mapped to.
pub struct Dataset {
    pub inputs: Vec<Vec<f32>>,
    pub outputs: Vec<Vec<f32>>,
}

fn is_row_finite(row: &[f32]) -> bool {
    row.iter().all(|value| value.is_finite())
}

impl Dataset {
    pub fn new(inputs: Vec<Vec<f32>>, outputs: Vec<Vec<f32>>) -> Result<Self, ModelError> {
        if inputs.len() != outputs.len() {
            return Err(ModelError::SampleCountMismatch {
                inputs: inputs.len(),
                outputs: outputs.len(),
            });
        }

        Ok(Dataset { inputs, outputs })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Contiguous `(inputs, outputs)` slices of at most `batch_size` rows, in order.
    pub fn batches(
        &self,
        batch_size: usize,
    ) -> impl Iterator<Item = (&[Vec<f32>], &[Vec<f32>])> + '_ {
        let batch_size = batch_size.max(1);
        self.inputs
            .chunks(batch_size)
            .zip(self.outputs.chunks(batch_size))
    }

    /// Moves the last `fraction` of the rows into a second dataset, keeping the order of
    /// both halves. The fraction is clamped to `[0, 1]`.
    pub fn split_validation(mut self, fraction: f32) -> (Dataset, Dataset) {
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let validation_amount = ((self.len() as f32) * fraction).round() as usize;
        let split_at = self.len() - validation_amount.min(self.len());

        let validation = Dataset {
            inputs: self.inputs.split_off(split_at),
            outputs: self.outputs.split_off(split_at),
        };

        (self, validation)
    }

    /// Only the rows whose inputs and outputs are all finite.
    pub fn finite_rows(&self) -> Dataset {
        let (inputs, outputs) = self
            .inputs
            .iter()
            .zip(&self.outputs)
            .filter(|(input, output)| is_row_finite(input) && is_row_finite(output))
            .map(|(input, output)| (input.clone(), output.clone()))
            .unzip();

        Dataset { inputs, outputs }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What an [EarlyStopping] made of the last validation loss it saw.
pub enum EarlyStoppingDecision {
    /// The loss improved and the parameters were snapshotted.
    Improved,
    /// The loss did not improve, but patience is not exhausted yet.
    NoImprovement,
    /// Patience is exhausted, training should end.
    Stop,
}

#[derive(Debug, Clone)]
/// Tracks the best validation loss seen so far and the parameters that achieved it.
pub struct EarlyStopping {
    pub patience: usize,
    pub min_delta: f32,
    best_loss: f32,
    best_epoch: Option<usize>,
    no_improve_epochs: usize,
    best_parameters: Option<Vec<LayerParameters>>,
}

impl EarlyStopping {
    pub fn new(patience: usize, min_delta: f32) -> Self {
        EarlyStopping {
            patience,
            min_delta,
            best_loss: f32::INFINITY,
            best_epoch: None,
            no_improve_epochs: 0,
            best_parameters: None,
        }
    }

    pub fn best_loss(&self) -> f32 {
        self.best_loss
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    pub fn no_improve_epochs(&self) -> usize {
        self.no_improve_epochs
    }

    pub fn best_parameters(&self) -> Option<&[LayerParameters]> {
        self.best_parameters.as_deref()
    }

    /// Feeds the validation loss of `epoch` in, snapshotting the network on improvement.
    ///
    /// A non-finite loss is taken as infinity, so it never improves.
    pub fn observe(
        &mut self,
        epoch: usize,
        validation_loss: f32,
        network: &Network,
    ) -> EarlyStoppingDecision {
        let validation_loss = if validation_loss.is_finite() {
            validation_loss
        } else {
            f32::INFINITY
        };

        if validation_loss < self.best_loss - self.min_delta {
            self.best_loss = validation_loss;
            self.best_epoch = Some(epoch);
            self.no_improve_epochs = 0;
            self.best_parameters = Some(network.parameters());
            return EarlyStoppingDecision::Improved;
        }

        self.no_improve_epochs += 1;
        if self.no_improve_epochs >= self.patience {
            EarlyStoppingDecision::Stop
        } else {
            EarlyStoppingDecision::NoImprovement
        }
    }

    /// Writes the best snapshot back into the network. Returns `false` when no epoch ever
    /// improved, in which case the network is left as it is.
    pub fn restore_best(&self, network: &mut Network) -> Result<bool, ModelError> {
        match &self.best_parameters {
            Some(parameters) => {
                network.set_parameters(parameters.clone())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A summary of what happened during [Trainer::train].
pub struct TrainingReport {
    /// The amount of epochs that actually ran.
    pub epochs_run: usize,
    /// The 1-based epoch whose parameters ended up in the network.
    pub best_epoch: Option<usize>,
    pub best_loss: f32,
    pub stopped_early: bool,
    /// Batches left out because of non-finite values, over all epochs.
    pub skipped_batches: usize,
    /// The mean batch loss of the last epoch, `None` if every batch was skipped.
    pub last_train_loss: Option<f32>,
}

/// Owns a [Network] while it is trained with a set of [TrainingOptions].
#[derive(Debug)]
pub struct Trainer {
    network: Network,
    pub options: TrainingOptions,
}

impl Trainer {
    pub fn new(network: Network, options: TrainingOptions) -> Self {
        Trainer { network, options }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn network_mut(&mut self) -> &mut Network {
        &mut self.network
    }

    pub fn into_network(self) -> Network {
        self.network
    }

    /// One gradient step over the batch.
    ///
    /// A batch with any non-finite feature or label is skipped without touching the
    /// network, which is reported as `Ok(None)`.
    pub fn train_step(
        &mut self,
        input_samples: &[Vec<f32>],
        expected_output_samples: &[Vec<f32>],
    ) -> Result<Option<f32>, ModelError> {
        if !input_samples.is_finite() || !expected_output_samples.is_finite() {
            return Ok(None);
        }

        self.network
            .backward(
                input_samples,
                expected_output_samples,
                self.options.learning_rate,
                self.options.weight_decay,
            )
            .map(Some)
    }

    /// The mean squared error over the validation set, infinity if it is not finite.
    pub fn validation_loss(&self, validation: &Dataset) -> Result<f32, ModelError> {
        let loss = self
            .network
            .compute_loss(&validation.inputs, &validation.outputs)?;

        if loss.is_finite() {
            Ok(loss)
        } else {
            log::warn!("validation loss is {}, counting it as infinite", loss);
            Ok(f32::INFINITY)
        }
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.options.verbose {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(self.options.epochs as u64);
        if let Ok(style) =
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} epochs {msg}")
        {
            progress.set_style(style);
        }
        progress
    }

    /// Trains for at most `options.epochs` epochs, stopping once the validation loss has
    /// not improved for `options.patience` epochs in a row.
    ///
    /// Whatever the reason training ends for, the network finishes holding the parameters
    /// of the best validation epoch, and those are what gets written to
    /// `options.weights_path`. Validation rows with non-finite values are dropped up
    /// front; if none are left, or any row of either set does not fit the network, this
    /// fails before training starts.
    pub fn train(
        &mut self,
        training: &Dataset,
        validation: &Dataset,
    ) -> Result<TrainingReport, ModelError> {
        if training.is_empty() {
            return Err(ModelError::NoTrainingData);
        }

        let validation = validation.finite_rows();
        if validation.is_empty() {
            return Err(ModelError::NoValidationData);
        }

        self.network.check_samples(&training.inputs, &training.outputs)?;
        self.network.check_samples(&validation.inputs, &validation.outputs)?;

        let batch_size = self.options.batch_size.max(1);
        let mut early_stopping = EarlyStopping::new(self.options.patience, self.options.min_delta);
        let mut report = TrainingReport {
            epochs_run: 0,
            best_epoch: None,
            best_loss: f32::INFINITY,
            stopped_early: false,
            skipped_batches: 0,
            last_train_loss: None,
        };

        let progress = self.progress_bar();

        for epoch in 1..=self.options.epochs {
            let mut loss_sum = 0.0;
            let mut trained_batches = 0;

            for (batch_index, (inputs, outputs)) in training.batches(batch_size).enumerate() {
                match self.train_step(inputs, outputs)? {
                    Some(loss) => {
                        log::debug!("epoch {} batch {}: loss {}", epoch, batch_index, loss);
                        loss_sum += loss;
                        trained_batches += 1;
                    }
                    None => {
                        log::warn!(
                            "epoch {}: skipped batch {} with non-finite values",
                            epoch,
                            batch_index
                        );
                        report.skipped_batches += 1;
                    }
                }
            }

            let train_loss = if trained_batches > 0 {
                Some(loss_sum / trained_batches as f32)
            } else {
                None
            };
            let validation_loss = self.validation_loss(&validation)?;
            report.epochs_run = epoch;
            report.last_train_loss = train_loss;

            log::info!(
                "epoch {}/{}: train loss {:?}, validation loss {}",
                epoch,
                self.options.epochs,
                train_loss,
                validation_loss
            );
            progress.set_message(format!("val {:.6}", validation_loss));
            progress.inc(1);

            match early_stopping.observe(epoch, validation_loss, &self.network) {
                EarlyStoppingDecision::Improved => {
                    log::info!("epoch {}: validation loss improved to {}", epoch, validation_loss);
                }
                EarlyStoppingDecision::NoImprovement => {}
                EarlyStoppingDecision::Stop => {
                    log::info!(
                        "stopping early after epoch {}, {} epochs without improvement",
                        epoch,
                        early_stopping.no_improve_epochs()
                    );
                    report.stopped_early = true;
                    break;
                }
            }
        }

        progress.finish_and_clear();

        if early_stopping.restore_best(&mut self.network)? {
            log::info!(
                "restored parameters of epoch {:?} with validation loss {}",
                early_stopping.best_epoch(),
                early_stopping.best_loss()
            );
        } else {
            log::warn!("no epoch improved the validation loss, keeping the current parameters");
        }

        report.best_epoch = early_stopping.best_epoch();
        report.best_loss = early_stopping.best_loss();

        if let Some(path) = &self.options.weights_path {
            save_weights(&self.network, path)?;
        }

        Ok(report)
    }
}
