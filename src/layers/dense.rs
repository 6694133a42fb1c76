use rand::Rng;

use super::{Activation, Initializer, InitializerTrait, Layer};
use crate::types::{ParameterKind, ShapeMismatchError};
use crate::utils::{MatrixOperations, VectorOperations};

#[derive(Debug, Clone, PartialEq)]
/// A deep copy of one layer's trainable parameters.
pub struct LayerParameters {
    /// The `(inputs_amount x outputs_amount)` weight matrix.
    pub weights: Vec<Vec<f32>>,
    /// The bias row, `outputs_amount` long.
    pub biases: Vec<f32>,
}

impl LayerParameters {
    /// The shape of the weights as `(rows, cols)`, taking the width of the first row.
    pub fn weights_shape(&self) -> (usize, usize) {
        (self.weights.get_height(), self.weights.get_width())
    }

    /// The shape of the biases as a `(1, cols)` row.
    pub fn biases_shape(&self) -> (usize, usize) {
        (1, self.biases.len())
    }
}

#[derive(Debug, Clone)]
/// A densely connected layer, this layer consists of some inputs
/// and the weights that connect each input to all outputs,
/// its propagation results in `Z = X . W + b` followed by the layer's activation.
pub struct Dense {
    /// The amount of inputs this layer expects per sample
    pub inputs_amount: usize,
    /// The amount of outputs this layer produces per sample
    pub outputs_amount: usize,

    /// The `(inputs_amount x outputs_amount)` weight matrix
    pub weights: Vec<Vec<f32>>,
    /// The bias row
    pub biases: Vec<f32>,

    /// The activation applied on top of the affine transform
    pub activation: Activation,

    last_inputs: Vec<Vec<f32>>,
    last_pre_activations: Vec<Vec<f32>>,
    last_outputs: Vec<Vec<f32>>,
}

impl Dense {
    /// Creates a new Dense layer with He normal weights and biases of `0.01`.
    pub fn new(inputs_amount: usize, outputs_amount: usize, activation: Activation) -> Dense {
        Self::with_rng(
            inputs_amount,
            outputs_amount,
            activation,
            &mut rand::thread_rng(),
        )
    }

    /// Same as `new` but drawing the weights from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        inputs_amount: usize,
        outputs_amount: usize,
        activation: Activation,
        rng: &mut R,
    ) -> Dense {
        Self::with_initializers(
            inputs_amount,
            outputs_amount,
            activation,
            &Initializer::weights(),
            &Initializer::biases(),
            rng,
        )
    }

    /// Creates a new Dense layer with custom initializers for both parameters.
    pub fn with_initializers<R: Rng + ?Sized>(
        inputs_amount: usize,
        outputs_amount: usize,
        activation: Activation,
        weights_initializer: &Initializer,
        biases_initializer: &Initializer,
        rng: &mut R,
    ) -> Dense {
        Dense {
            inputs_amount,
            outputs_amount,
            weights: weights_initializer.initialize_2d(
                (inputs_amount, outputs_amount),
                inputs_amount,
                rng,
            ),
            biases: biases_initializer.initialize_1d(outputs_amount, inputs_amount, rng),
            activation,
            last_inputs: Vec::new(),
            last_pre_activations: Vec::new(),
            last_outputs: Vec::new(),
        }
    }

    /// The shape of the weight matrix, `(inputs_amount, outputs_amount)`.
    pub fn weights_shape(&self) -> (usize, usize) {
        (self.inputs_amount, self.outputs_amount)
    }

    /// The shape of the bias row, `(1, outputs_amount)`.
    pub fn biases_shape(&self) -> (usize, usize) {
        (1, self.outputs_amount)
    }

    /// Takes a deep copy of the weights and biases.
    pub fn parameters(&self) -> LayerParameters {
        LayerParameters {
            weights: self.weights.clone(),
            biases: self.biases.clone(),
        }
    }

    /// Verifies that `parameters` could replace this layer's, reporting the first
    /// disagreeing parameter as coming from the layer at `layer_index`.
    pub fn check_parameters(
        &self,
        layer_index: usize,
        parameters: &LayerParameters,
    ) -> Result<(), ShapeMismatchError> {
        let ragged = parameters
            .weights
            .iter()
            .any(|row| row.len() != self.outputs_amount);
        let weights_shape = parameters.weights_shape();

        if weights_shape != self.weights_shape() || ragged {
            return Err(ShapeMismatchError {
                layer_index,
                parameter: ParameterKind::Weights,
                expected: self.weights_shape(),
                actual: weights_shape,
            });
        }

        if parameters.biases_shape() != self.biases_shape() {
            return Err(ShapeMismatchError {
                layer_index,
                parameter: ParameterKind::Biases,
                expected: self.biases_shape(),
                actual: parameters.biases_shape(),
            });
        }

        Ok(())
    }

    /// Replaces the weights and biases, after checking their shapes. Nothing changes if the
    /// shapes disagree.
    pub fn set_parameters(
        &mut self,
        layer_index: usize,
        parameters: LayerParameters,
    ) -> Result<(), ShapeMismatchError> {
        self.check_parameters(layer_index, &parameters)?;
        self.weights = parameters.weights;
        self.biases = parameters.biases;
        Ok(())
    }

    fn pre_activations(&self, inputs: &[Vec<f32>]) -> Vec<Vec<f32>> {
        inputs.dot(&self.weights).add_row(&self.biases)
    }
}

impl Layer for Dense {
    fn get_last_inputs(&self) -> &[Vec<f32>] {
        &self.last_inputs
    }

    fn get_last_pre_activations(&self) -> &[Vec<f32>] {
        &self.last_pre_activations
    }

    fn get_last_outputs(&self) -> &[Vec<f32>] {
        &self.last_outputs
    }

    fn get_inputs_amount(&self) -> usize {
        self.inputs_amount
    }

    fn get_outputs_amount(&self) -> usize {
        self.outputs_amount
    }

    fn propagate(&mut self, inputs: &[Vec<f32>]) -> Vec<Vec<f32>> {
        self.last_inputs = inputs.to_vec();
        self.last_pre_activations = self.pre_activations(inputs);
        self.last_outputs = self.activation.activate(&self.last_pre_activations);
        self.last_outputs.clone()
    }

    fn evaluate(&self, inputs: &[Vec<f32>]) -> Vec<Vec<f32>> {
        self.activation.activate(&self.pre_activations(inputs))
    }

    fn activation_derivatives(&self) -> Vec<Vec<f32>> {
        self.activation.differentials(&self.last_pre_activations)
    }

    fn back_propagate(
        &mut self,
        should_calculate_input_to_error_derivative: bool,
        layer_delta: &[Vec<f32>],
        learning_rate: f32,
        weight_decay: f32,
    ) -> Option<Vec<Vec<f32>>> {
        assert!(!self.last_inputs.is_empty());
        assert_eq!(self.last_inputs.len(), layer_delta.len());
        let samples_amount = layer_delta.len() as f32;

        // averaged over the samples of the batch
        let weight_gradients = self
            .last_inputs
            .transpose()
            .dot(layer_delta)
            .divide(samples_amount);
        let bias_gradients = layer_delta.column_sums().divide_number(samples_amount);

        // has to use the weights from before this update
        let layer_input_to_error_derivatives = if should_calculate_input_to_error_derivative {
            Some(layer_delta.dot(&self.weights.transpose()))
        } else {
            None
        };

        self.weights = self
            .weights
            .subtract(&weight_gradients.multiply(learning_rate));
        self.biases = self
            .biases
            .subtract(&bias_gradients.multiply_number(learning_rate));

        // L2 decay is a second subtraction on the already updated weights
        let decay = learning_rate * weight_decay;
        self.weights = self.weights.subtract(&self.weights.multiply(decay));

        layer_input_to_error_derivatives
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::layers::initializers::ConstantInitializer;
    use crate::utils::approx_eq::{assert_approx_equal_distance, assert_approx_equal_matrix};

    fn fixed_dense(activation: Activation) -> Dense {
        let mut dense = Dense::new(2, 2, activation);
        dense.weights = vec![vec![1.0, -1.0], vec![0.5, 2.0]];
        dense.biases = vec![0.1, -0.2];
        dense
    }

    #[test]
    fn should_compute_affine_transform_and_activation() {
        let mut dense = fixed_dense(Activation::LeakyReLU);
        let inputs = vec![vec![1.0, 2.0], vec![-2.0, 0.0]];

        let outputs = dense.propagate(&inputs);

        // Z = [[2.1, 2.8], [-1.9, 1.8]]
        assert_approx_equal_matrix(
            dense.get_last_pre_activations(),
            &[vec![2.1, 2.8], vec![-1.9, 1.8]],
            1e-6,
        );
        assert_approx_equal_matrix(&outputs, &[vec![2.1, 2.8], vec![-0.019, 1.8]], 1e-6);
        assert_eq!(dense.get_last_inputs(), inputs.as_slice());
        assert_eq!(dense.get_last_outputs(), outputs.as_slice());
    }

    #[test]
    fn single_row_and_batched_inputs_should_agree() {
        let mut dense = fixed_dense(Activation::LeakyReLU);
        let batch = vec![vec![0.3, -0.7], vec![1.5, 2.5], vec![-1.0, -1.0]];

        let batched = dense.propagate(&batch);
        for (row, expected) in batch.iter().zip(&batched) {
            assert_eq!(&dense.evaluate(&[row.clone()])[0], expected);
        }
    }

    #[test]
    fn should_start_with_constant_biases() {
        let dense = Dense::with_rng(3, 4, Activation::LeakyReLU, &mut StdRng::seed_from_u64(3));

        assert_eq!(dense.biases, vec![0.01; 4]);
        assert_eq!(dense.weights.len(), 3);
        assert!(dense.weights.iter().all(|row| row.len() == 4));
    }

    #[test]
    fn back_propagate_should_apply_gradient_then_decay() {
        let mut dense = Dense::with_initializers(
            1,
            1,
            Activation::Identity,
            &ConstantInitializer::new(2.0).into(),
            &ConstantInitializer::new(0.0).into(),
            &mut StdRng::seed_from_u64(0),
        );
        dense.propagate(&[vec![1.0], vec![3.0]]);

        let learning_rate = 0.1;
        let weight_decay = 0.5;
        let delta = vec![vec![1.0], vec![-1.0]];
        let input_derivatives = dense
            .back_propagate(true, &delta, learning_rate, weight_decay)
            .unwrap();

        // dW = (1*1 + 3*-1) / 2 = -1, db = 0
        // W = 2 - 0.1 * -1 = 2.1, then W = 2.1 - 0.1 * 0.5 * 2.1 = 1.995
        assert_approx_equal_distance(&dense.weights[0], &[1.995], 1e-6);
        assert_approx_equal_distance(&dense.biases, &[0.0], 1e-6);
        // computed with the weight from before the update
        assert_eq!(input_derivatives, vec![vec![2.0], vec![-2.0]]);
    }

    #[test]
    fn first_layer_should_not_return_input_derivatives() {
        let mut dense = fixed_dense(Activation::LeakyReLU);
        dense.propagate(&[vec![1.0, 1.0]]);

        assert!(dense
            .back_propagate(false, &[vec![0.5, 0.5]], 0.01, 0.0)
            .is_none());
    }

    #[test]
    fn should_reject_parameters_of_another_shape() {
        let mut dense = fixed_dense(Activation::LeakyReLU);
        let before = dense.parameters();

        let wrong_biases = LayerParameters {
            weights: vec![vec![0.0, 0.0], vec![0.0, 0.0]],
            biases: vec![0.0, 0.0, 0.0],
        };
        let err = dense.set_parameters(4, wrong_biases).unwrap_err();

        assert_eq!(err.layer_index, 4);
        assert_eq!(err.parameter, ParameterKind::Biases);
        assert_eq!(err.expected, (1, 2));
        assert_eq!(err.actual, (1, 3));
        assert_eq!(dense.parameters(), before);
    }
}
