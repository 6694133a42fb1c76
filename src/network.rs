use rand::Rng;

use crate::{
    layers::{Activation, Dense, Initializer, Layer, LayerParameters},
    loss_functions::{LossFunction, MeanSquared},
    types::{InputDimensionError, ModelError},
    utils::MatrixOperations,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The fixed shape of a [Network]: one input layer, `n_hidden` identical hidden layers and
/// one output layer.
pub struct Topology {
    /// The width of every feature row.
    pub n_features: usize,
    /// The amount of values predicted per row.
    pub output_size: usize,
    /// The amount of `hidden_size x hidden_size` layers between input and output layer.
    pub n_hidden: usize,
    /// The width of the hidden layers.
    pub hidden_size: usize,
    /// Whether the output layer uses the identity instead of leaky ReLU.
    pub linear_output: bool,
}

impl Topology {
    /// Creates a topology with a linear output layer.
    pub fn new(n_features: usize, output_size: usize, n_hidden: usize, hidden_size: usize) -> Self {
        Topology {
            n_features,
            output_size,
            n_hidden,
            hidden_size,
            linear_output: true,
        }
    }

    /// Same topology with the output layer's activation flag replaced.
    pub fn with_linear_output(self, linear_output: bool) -> Self {
        Topology {
            linear_output,
            ..self
        }
    }

    /// The amount of layers, `n_hidden + 2`.
    pub fn layers_amount(&self) -> usize {
        self.n_hidden + 2
    }

    /// The `(in_dim, out_dim)` of every layer, in order.
    pub fn layer_shapes(&self) -> Vec<(usize, usize)> {
        let mut shapes = Vec::with_capacity(self.layers_amount());
        shapes.push((self.n_features, self.hidden_size));
        shapes.extend((0..self.n_hidden).map(|_| (self.hidden_size, self.hidden_size)));
        shapes.push((self.hidden_size, self.output_size));
        shapes
    }

    /// Fails if any of the dimensions is zero.
    pub fn validate(&self) -> Result<(), ModelError> {
        let dimensions = [
            ("n_features", self.n_features),
            ("output_size", self.output_size),
            ("hidden_size", self.hidden_size),
        ];

        match dimensions.iter().find(|(_, size)| *size == 0) {
            Some((name, _)) => Err(ModelError::InvalidTopology {
                reason: format!("{} must be at least 1", name),
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
/// A dense feed-forward regression network.
///
/// Every layer caches its last inputs, pre-activations and outputs on `feed_forward`,
/// which `backward` relies on. A network must therefore not be shared between a training
/// loop and concurrent predictions; use [Network::predict] (which takes `&self` and leaves
/// the caches alone) or one network per user.
pub struct Network {
    topology: Topology,
    layers: Vec<Dense>,
}

impl Network {
    /// Builds a network with He normal weights and biases of `0.01`.
    pub fn new(topology: Topology) -> Result<Network, ModelError> {
        Self::with_rng(topology, &mut rand::thread_rng())
    }

    /// Builds a network drawing its weights from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(topology: Topology, rng: &mut R) -> Result<Network, ModelError> {
        Self::with_initializers(
            topology,
            &Initializer::weights(),
            &Initializer::biases(),
            rng,
        )
    }

    /// Builds a network with custom initializers for every layer.
    pub fn with_initializers<R: Rng + ?Sized>(
        topology: Topology,
        weights_initializer: &Initializer,
        biases_initializer: &Initializer,
        rng: &mut R,
    ) -> Result<Network, ModelError> {
        topology.validate()?;

        let shapes = topology.layer_shapes();
        let last_index = shapes.len() - 1;
        let layers = shapes
            .into_iter()
            .enumerate()
            .map(|(index, (inputs_amount, outputs_amount))| {
                let activation = if index == last_index && topology.linear_output {
                    Activation::Identity
                } else {
                    Activation::LeakyReLU
                };
                Dense::with_initializers(
                    inputs_amount,
                    outputs_amount,
                    activation,
                    weights_initializer,
                    biases_initializer,
                    &mut *rng,
                )
            })
            .collect();

        Ok(Network { topology, layers })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    /// Runs the inputs through every layer, caching what `backward` needs, and returns the
    /// output layer's activations.
    pub fn feed_forward(&mut self, input_samples: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, ModelError> {
        self.check_inputs(input_samples)?;

        let mut current_values = input_samples.to_vec();
        for layer in self.layers.iter_mut() {
            current_values = layer.propagate(&current_values);
        }

        Ok(current_values)
    }

    /// Same outputs as `feed_forward` without writing to any layer's cache.
    pub fn predict(&self, input_samples: &[Vec<f32>]) -> Result<Vec<Vec<f32>>, ModelError> {
        self.check_inputs(input_samples)?;

        let mut current_values = input_samples.to_vec();
        for layer in self.layers.iter() {
            current_values = layer.evaluate(&current_values);
        }

        Ok(current_values)
    }

    /// One full gradient step over the batch, updating every layer in place.
    ///
    /// Returns the mean squared error of the predictions made before the update.
    pub fn backward(
        &mut self,
        input_samples: &[Vec<f32>],
        expected_output_samples: &[Vec<f32>],
        learning_rate: f32,
        weight_decay: f32,
    ) -> Result<f32, ModelError> {
        self.check_labels(input_samples, expected_output_samples)?;

        let loss_function = MeanSquared::new();
        let predictions = self.feed_forward(input_samples)?;
        let loss = loss_function.average_loss_for_samples(&predictions, expected_output_samples);
        let errors =
            loss_function.loss_derivatives_for_samples(&predictions, expected_output_samples);

        let last_index = self.layers.len() - 1;
        let mut delta = errors.multiply_by_other(&self.layers[last_index].activation_derivatives());

        for layer_index in (0..self.layers.len()).rev() {
            let input_derivatives = self.layers[layer_index].back_propagate(
                layer_index > 0,
                &delta,
                learning_rate,
                weight_decay,
            );

            if let Some(input_derivatives) = input_derivatives {
                let previous_derivatives = self.layers[layer_index - 1].activation_derivatives();
                delta = input_derivatives.multiply_by_other(&previous_derivatives);
            }
        }

        Ok(loss)
    }

    /// The mean squared error of the network's predictions, without touching the caches.
    pub fn compute_loss(
        &self,
        input_samples: &[Vec<f32>],
        expected_output_samples: &[Vec<f32>],
    ) -> Result<f32, ModelError> {
        self.check_labels(input_samples, expected_output_samples)?;
        let predictions = self.predict(input_samples)?;

        Ok(MeanSquared::new().average_loss_for_samples(&predictions, expected_output_samples))
    }

    /// A deep copy of every layer's weights and biases, in layer order.
    pub fn parameters(&self) -> Vec<LayerParameters> {
        self.layers.iter().map(|layer| layer.parameters()).collect()
    }

    /// Replaces the parameters of every layer. Every shape is checked before the first
    /// layer is touched, so on error the network is left exactly as it was.
    pub fn set_parameters(&mut self, parameters: Vec<LayerParameters>) -> Result<(), ModelError> {
        if parameters.len() != self.layers.len() {
            return Err(ModelError::LayerCountMismatch {
                expected: self.layers.len(),
                actual: parameters.len(),
            });
        }

        for (layer_index, (layer, layer_parameters)) in
            self.layers.iter().zip(&parameters).enumerate()
        {
            layer.check_parameters(layer_index, layer_parameters)?;
        }

        for (layer_index, (layer, layer_parameters)) in
            self.layers.iter_mut().zip(parameters).enumerate()
        {
            layer.set_parameters(layer_index, layer_parameters)?;
        }

        Ok(())
    }

    /// Fails if the rows could not be fed to this network or compared with its outputs,
    /// without running anything.
    pub fn check_samples(
        &self,
        input_samples: &[Vec<f32>],
        expected_output_samples: &[Vec<f32>],
    ) -> Result<(), ModelError> {
        self.check_labels(input_samples, expected_output_samples)?;
        self.check_inputs(input_samples)
    }

    fn check_inputs(&self, input_samples: &[Vec<f32>]) -> Result<(), ModelError> {
        if input_samples.is_empty() {
            return Err(ModelError::EmptyBatch);
        }

        let expected = self.topology.n_features;
        match input_samples
            .iter()
            .position(|sample| sample.len() != expected)
        {
            Some(row) => Err(InputDimensionError {
                expected,
                actual: input_samples[row].len(),
                row,
            }
            .into()),
            None => Ok(()),
        }
    }

    fn check_labels(
        &self,
        input_samples: &[Vec<f32>],
        expected_output_samples: &[Vec<f32>],
    ) -> Result<(), ModelError> {
        if input_samples.len() != expected_output_samples.len() {
            return Err(ModelError::SampleCountMismatch {
                inputs: input_samples.len(),
                outputs: expected_output_samples.len(),
            });
        }

        let expected = self.topology.output_size;
        match expected_output_samples
            .iter()
            .position(|sample| sample.len() != expected)
        {
            Some(row) => Err(ModelError::LabelDimension {
                expected,
                actual: expected_output_samples[row].len(),
                row,
            }),
            None => Ok(()),
        }
    }
}
