//! A small, layer-driven dense network for regressing a scalar (like a fuel price) from a
//! fixed-width row of features.
//!
//! A [Network] is built from a [Topology], trained by a [Trainer] with mini-batches and
//! early stopping, and its best parameters are kept in a compressed weight archive that
//! a [ModelRegistry] loads back for serving predictions.
//!
//! ```no_run
//! use fuelnet::{Dataset, Network, Topology, Trainer, TrainingOptions};
//!
//! let network = Network::new(Topology::new(1, 1, 1, 8)).unwrap();
//! let data = Dataset::new(
//!     (0..100).map(|x| vec![x as f32 / 100.0]).collect(),
//!     (0..100).map(|x| vec![3.0 * x as f32 / 100.0]).collect(),
//! )
//! .unwrap();
//! let (training, validation) = data.split_validation(0.2);
//!
//! let mut trainer = Trainer::new(network, TrainingOptions::default());
//! let report = trainer.train(&training, &validation).unwrap();
//! println!("best validation loss {}", report.best_loss);
//! ```

pub mod layers;
pub mod loss_functions;
pub mod network;
pub mod registry;
pub mod trainer;
pub mod types;
pub mod utils;
pub mod weights;

pub use network::{Network, Topology};
pub use registry::ModelRegistry;
pub use trainer::{Dataset, Trainer, TrainingOptions, TrainingReport};
pub use types::ModelError;
pub use weights::{load_weights, save_weights};

#[cfg(test)]
mod tests;
