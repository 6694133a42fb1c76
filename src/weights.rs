//! Persisting a [Network]'s parameters as a compressed archive of named arrays.
//!
//! An archive holds `W0, b0, W1, b1, ..., W{L-1}, b{L-1}`, every array being a row-major
//! matrix of `f32` together with its shape. The archive is serialized with `savefile` and
//! gzip compressed with `flate2`.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use savefile_derive::Savefile;

use crate::{
    layers::LayerParameters,
    network::Network,
    types::{ModelError, ParameterKind, ShapeMismatchError},
};

/// The savefile schema version every archive is written with.
pub const ARCHIVE_VERSION: u32 = 0;

#[derive(Debug, Clone, PartialEq, Savefile)]
/// A single named 2-D array inside a weight archive.
pub struct NamedArray {
    /// Such as `W0` or `b3`.
    pub name: String,
    pub rows: usize,
    pub cols: usize,
    /// `rows * cols` values, row after row.
    pub values: Vec<f32>,
}

impl NamedArray {
    /// Flattens a matrix into a named array.
    pub fn from_matrix(name: String, matrix: &[Vec<f32>]) -> Self {
        NamedArray {
            name,
            rows: matrix.len(),
            cols: matrix.first().map_or(0, |row| row.len()),
            values: matrix.iter().flatten().copied().collect(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Splits the values back into rows, failing if they do not add up to the shape.
    pub fn to_matrix(&self) -> Result<Vec<Vec<f32>>, ModelError> {
        if self.rows.checked_mul(self.cols) != Some(self.values.len()) {
            return Err(ModelError::MalformedArray {
                name: self.name.clone(),
            });
        }

        if self.cols == 0 {
            return Ok(vec![Vec::new(); self.rows]);
        }

        Ok(self
            .values
            .chunks(self.cols)
            .map(|row| row.to_vec())
            .collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Savefile)]
/// All of the arrays of one trained network.
pub struct WeightArchive {
    pub arrays: Vec<NamedArray>,
}

impl WeightArchive {
    /// Captures `W{i}` and `b{i}` for every layer of the network, in layer order.
    pub fn from_network(network: &Network) -> Self {
        let arrays = network
            .parameters()
            .iter()
            .enumerate()
            .flat_map(|(layer_index, parameters)| {
                [
                    NamedArray::from_matrix(
                        ParameterKind::Weights.array_name(layer_index),
                        &parameters.weights,
                    ),
                    NamedArray::from_matrix(
                        ParameterKind::Biases.array_name(layer_index),
                        &[parameters.biases.clone()],
                    ),
                ]
            })
            .collect();

        WeightArchive { arrays }
    }

    pub fn get(&self, name: &str) -> Option<&NamedArray> {
        self.arrays.iter().find(|array| array.name == name)
    }

    fn matrix(&self, kind: ParameterKind, layer_index: usize) -> Result<Vec<Vec<f32>>, ModelError> {
        let name = kind.array_name(layer_index);
        self.get(&name)
            .ok_or(ModelError::MissingArray { name })?
            .to_matrix()
    }

    /// Rebuilds the parameters for every layer of `network`, checking each against its
    /// layer in order so the first layer that disagrees is the one reported. Arrays beyond
    /// the network's layers are ignored.
    pub fn to_parameters(&self, network: &Network) -> Result<Vec<LayerParameters>, ModelError> {
        network
            .layers()
            .iter()
            .enumerate()
            .map(|(layer_index, layer)| {
                let weights = self.matrix(ParameterKind::Weights, layer_index)?;
                let mut biases = self.matrix(ParameterKind::Biases, layer_index)?;

                if biases.len() != 1 {
                    let actual = self
                        .get(&ParameterKind::Biases.array_name(layer_index))
                        .map_or((biases.len(), 0), |array| array.shape());
                    return Err(ShapeMismatchError {
                        layer_index,
                        parameter: ParameterKind::Biases,
                        expected: layer.biases_shape(),
                        actual,
                    }
                    .into());
                }

                let parameters = LayerParameters {
                    weights,
                    biases: biases.remove(0),
                };
                layer.check_parameters(layer_index, &parameters)?;

                Ok(parameters)
            })
            .collect()
    }

    /// Serializes and compresses the archive into `writer`.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<W, ModelError> {
        let mut encoder = GzEncoder::new(writer, Compression::default());
        savefile::save(&mut encoder, ARCHIVE_VERSION, self)?;
        Ok(encoder.finish()?)
    }

    /// Decompresses and deserializes an archive from `reader`.
    pub fn read_from<R: Read>(reader: R) -> Result<Self, ModelError> {
        let mut decoder = GzDecoder::new(reader);
        Ok(savefile::load(&mut decoder, ARCHIVE_VERSION)?)
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let mut file_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    file_name.push(".tmp");
    path.with_file_name(file_name)
}

/// Writes every layer's weights and biases to `path`.
///
/// The archive is written next to `path` first and renamed over it once complete, so a
/// failed write never clobbers a previous archive. The file handle is closed on every path.
pub fn save_weights<P: AsRef<Path>>(network: &Network, path: P) -> Result<(), ModelError> {
    let path = path.as_ref();
    let temporary = temporary_path(path);
    let archive = WeightArchive::from_network(network);

    let written = File::create(&temporary)
        .map_err(ModelError::from)
        .and_then(|file| archive.write_to(BufWriter::new(file)))
        .and_then(|mut writer| writer.flush().map_err(ModelError::from));

    if let Err(err) = written {
        let _ = fs::remove_file(&temporary);
        return Err(err);
    }

    fs::rename(&temporary, path)?;
    log::info!(
        "saved {} arrays to {}",
        archive.arrays.len(),
        path.display()
    );

    Ok(())
}

/// Reads the archive at `path` into the network.
///
/// Every `W{i}`/`b{i}` must match the live layer's shape exactly; on any mismatch the
/// network is left untouched and a [ModelError::ShapeMismatch] names the layer and both
/// shapes.
pub fn load_weights<P: AsRef<Path>>(network: &mut Network, path: P) -> Result<(), ModelError> {
    let path = path.as_ref();
    let archive = {
        let file = File::open(path)?;
        WeightArchive::read_from(BufReader::new(file))?
    };

    let parameters = archive.to_parameters(network)?;
    network.set_parameters(parameters)?;
    log::info!("loaded {} layers from {}", network.layers().len(), path.display());

    Ok(())
}
