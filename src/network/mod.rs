//! Fixed-topology feedforward networks who drive a vehicle. Evolution only ever
//! changes weight and bias values, never the shape of a network.

pub mod perceptron;

pub use perceptron::{Layer, Perceptron};

use crate::error::{Error, Result};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

pub mod activate {
    /// Hard threshold: 1 when the weighted sum strictly exceeds the bias, else 0
    #[inline]
    pub fn threshold(sum: f64, bias: f64) -> f64 {
        if sum > bias {
            1.
        } else {
            0.
        }
    }
}

/// The trait for all brains. Values are f64 and activations are binary.
pub trait Network: Serialize + for<'de> Deserialize<'de> + Clone {
    /// Run `input` through every layer, recording each layer's activations, and
    /// return the final layer's outputs. `input` must match [Network::topology]'s
    /// first width exactly.
    fn feed_forward(&mut self, input: &[f64]) -> Result<&[f64]>;

    /// Blend every weight and bias toward a fresh uniform sample in [-1, 1] by `rate`
    fn mutate(&mut self, rate: f64, rng: &mut impl RngCore);

    /// Layer widths, inputs first
    fn topology(&self) -> Vec<usize>;

    /// Reject this network when its shape differs from `topology`
    fn ensure_topology(&self, topology: &[usize]) -> Result<()> {
        let have = self.topology();
        if have == topology {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "topology {have:?} does not match configured {topology:?}"
            )))
        }
    }

    fn to_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    #[allow(clippy::should_implement_trait)]
    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str(s).map_err(|err| {
            if err.is_data() {
                Error::validation(err.to_string())
            } else {
                err.into()
            }
        })
    }

    fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.to_string()?)?;
        Ok(())
    }

    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_str(&fs::read_to_string(path)?)
    }
}
