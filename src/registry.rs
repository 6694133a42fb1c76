//! Trained networks kept by variant name, loaded once and handed to whoever serves
//! predictions.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    network::{Network, Topology},
    types::ModelError,
    weights::load_weights,
};

/// The archive file a variant's best parameters are stored in.
pub fn weights_file_name(variant: &str) -> String {
    format!("best_model_weights_{}.bin", normalize_variant(variant))
}

fn normalize_variant(variant: &str) -> String {
    variant.trim().to_lowercase()
}

#[derive(Debug, Clone, Default)]
/// One [Network] per model variant, e.g. one per fuel grade.
///
/// Lookups ignore surrounding whitespace and case. Predictions go through
/// [Network::predict], so a registry can be shared between threads behind an `Arc`.
pub struct ModelRegistry {
    networks: HashMap<String, Network>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a network of `topology` for every variant and loads
    /// `dir/best_model_weights_{variant}.bin` into it.
    ///
    /// Fails on the first variant whose archive is missing or does not fit the topology.
    pub fn load<P, S>(dir: P, variants: &[S], topology: &Topology) -> Result<Self, ModelError>
    where
        P: AsRef<Path>,
        S: AsRef<str>,
    {
        let dir = dir.as_ref();
        let mut registry = ModelRegistry::new();

        for variant in variants {
            let variant = variant.as_ref();
            let path: PathBuf = dir.join(weights_file_name(variant));

            let mut network = Network::new(*topology)?;
            load_weights(&mut network, &path)?;
            log::info!("registered variant {} from {}", variant, path.display());

            registry.insert(variant, network);
        }

        Ok(registry)
    }

    /// Adds or replaces the network of a variant, returning the one it replaced.
    pub fn insert(&mut self, variant: &str, network: Network) -> Option<Network> {
        self.networks.insert(normalize_variant(variant), network)
    }

    pub fn get(&self, variant: &str) -> Result<&Network, ModelError> {
        let key = normalize_variant(variant);
        self.networks
            .get(&key)
            .ok_or(ModelError::UnknownVariant { name: key })
    }

    /// Every registered variant, sorted.
    pub fn variants(&self) -> Vec<&str> {
        let mut variants: Vec<&str> = self.networks.keys().map(|key| key.as_str()).collect();
        variants.sort_unstable();
        variants
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// One scalar per feature row, the first output of the variant's network. No rounding
    /// happens here.
    pub fn predict(&self, variant: &str, rows: &[Vec<f32>]) -> Result<Vec<f32>, ModelError> {
        let outputs = self.get(variant)?.predict(rows)?;

        Ok(outputs
            .into_iter()
            .map(|row| row.first().copied().unwrap_or(f32::NAN))
            .collect())
    }
}
