//! A module containing the error types shared across fuelnet

use std::fmt;

use fuelnet_macros::FromForAllUnnamedVariants;
use savefile::SavefileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Which parameter of a layer a shape check was about.
pub enum ParameterKind {
    /// The `(in_dim x out_dim)` weight matrix, stored as `W{i}`.
    Weights,
    /// The `(1 x out_dim)` bias row, stored as `b{i}`.
    Biases,
}

impl ParameterKind {
    /// The prefix used for this parameter inside a weight archive.
    pub fn prefix(&self) -> &'static str {
        match self {
            ParameterKind::Weights => "W",
            ParameterKind::Biases => "b",
        }
    }

    /// The archive name of this parameter for the layer at `layer_index`.
    pub fn array_name(&self, layer_index: usize) -> String {
        format!("{}{}", self.prefix(), layer_index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Some stored parameter does not have the shape the live layer expects.
pub struct ShapeMismatchError {
    /// The index of the offending layer.
    pub layer_index: usize,
    /// Whether the weights or the biases disagree.
    pub parameter: ParameterKind,
    /// The shape of the live layer's parameter as `(rows, cols)`.
    pub expected: (usize, usize),
    /// The shape that was offered as `(rows, cols)`.
    pub actual: (usize, usize),
}

impl fmt::Display for ShapeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "shape mismatch at layer {} for {}: expected {:?}, got {:?}",
            self.layer_index,
            self.parameter.array_name(self.layer_index),
            self.expected,
            self.actual
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A row handed to the network is not as wide as its first layer.
pub struct InputDimensionError {
    /// The amount of features the network was built for.
    pub expected: usize,
    /// The amount of features found in the row.
    pub actual: usize,
    /// The index of the first offending row.
    pub row: usize,
}

impl fmt::Display for InputDimensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} has {} features but the network expects {}",
            self.row, self.actual, self.expected
        )
    }
}

#[derive(Debug, FromForAllUnnamedVariants)]
/// Every error that can come out of building, running, training or persisting a network.
pub enum ModelError {
    /// Stored parameters disagree with the live topology.
    ShapeMismatch(ShapeMismatchError),
    /// An inference or training row has the wrong amount of features.
    InputDimension(InputDimensionError),
    /// A label row does not have `output_size` values.
    LabelDimension {
        /// The output size of the network.
        expected: usize,
        /// The width of the label row.
        actual: usize,
        /// The index of the offending row.
        row: usize,
    },
    /// The amount of input rows and label rows differ.
    SampleCountMismatch {
        /// The amount of input rows.
        inputs: usize,
        /// The amount of label rows.
        outputs: usize,
    },
    /// The amount of layers offered differs from the network's.
    LayerCountMismatch {
        /// The amount of layers in the network.
        expected: usize,
        /// The amount of layers offered.
        actual: usize,
    },
    /// A forward or backward pass was asked for with zero rows.
    EmptyBatch,
    /// The requested topology cannot be built.
    InvalidTopology {
        /// What is wrong with it.
        reason: String,
    },
    /// There are no training rows at all.
    NoTrainingData,
    /// Not a single finite validation row could be assembled.
    NoValidationData,
    /// The weight archive does not contain the named array.
    MissingArray {
        /// The missing array, such as `W2`.
        name: String,
    },
    /// The named array's values do not add up to its recorded shape.
    MalformedArray {
        /// The malformed array.
        name: String,
    },
    /// No model was registered under this name.
    UnknownVariant {
        /// The requested variant.
        name: String,
    },
    /// Opening, writing or renaming a file failed.
    Io(std::io::Error),
    /// The archive could not be (de)serialized.
    Savefile(SavefileError),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::ShapeMismatch(err) => write!(f, "{}", err),
            ModelError::InputDimension(err) => write!(f, "{}", err),
            ModelError::LabelDimension {
                expected,
                actual,
                row,
            } => write!(
                f,
                "label row {} has {} values but the network outputs {}",
                row, actual, expected
            ),
            ModelError::SampleCountMismatch { inputs, outputs } => write!(
                f,
                "got {} input rows but {} label rows",
                inputs, outputs
            ),
            ModelError::LayerCountMismatch { expected, actual } => write!(
                f,
                "expected parameters for {} layers, got {}",
                expected, actual
            ),
            ModelError::EmptyBatch => write!(f, "cannot run a pass over zero rows"),
            ModelError::InvalidTopology { reason } => write!(f, "invalid topology: {}", reason),
            ModelError::NoTrainingData => write!(f, "no training rows were given"),
            ModelError::NoValidationData => {
                write!(f, "no finite validation rows could be assembled")
            }
            ModelError::MissingArray { name } => {
                write!(f, "the weight archive has no array named {}", name)
            }
            ModelError::MalformedArray { name } => write!(
                f,
                "the array {} does not hold as many values as its shape says",
                name
            ),
            ModelError::UnknownVariant { name } => write!(f, "unknown model variant: {}", name),
            ModelError::Io(err) => write!(f, "io error: {}", err),
            ModelError::Savefile(err) => write!(f, "savefile error: {:?}", err),
        }
    }
}

impl std::error::Error for ModelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ModelError::Io(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_mismatch_should_name_layer_and_both_shapes() {
        let err = ShapeMismatchError {
            layer_index: 2,
            parameter: ParameterKind::Biases,
            expected: (1, 16),
            actual: (1, 8),
        };

        let message = ModelError::from(err).to_string();

        assert!(message.contains("layer 2"));
        assert!(message.contains("b2"));
        assert!(message.contains("(1, 16)"));
        assert!(message.contains("(1, 8)"));
    }

    #[test]
    fn io_errors_should_convert_with_question_mark() {
        fn open() -> Result<(), ModelError> {
            Err::<(), _>(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }

        assert!(matches!(open(), Err(ModelError::Io(_))));
    }
}
