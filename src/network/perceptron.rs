use super::{activate::threshold, Network};
use crate::{
    error::{Error, Result},
    geometry::lerp,
    random::unit,
    serialize::{
        deserialize_activations, deserialize_flat, deserialize_rows, serialize_flat,
        serialize_rows,
    },
};
use rand::RngCore;
use rulinalg::matrix::{BaseMatrix, Matrix};
use serde::{Deserialize, Serialize};

/// One fully connected step of a [Perceptron]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Most recent input, kept for inspection
    #[serde(default, deserialize_with = "deserialize_activations")]
    inputs: Vec<f64>,
    /// Most recent output, kept for inspection
    #[serde(default, deserialize_with = "deserialize_activations")]
    outputs: Vec<f64>,
    /// 1 x outputs, the threshold each output neuron must exceed
    #[serde(serialize_with = "serialize_flat", deserialize_with = "deserialize_flat")]
    biases: Matrix<f64>,
    /// inputs x outputs, indexed as [from, to]
    #[serde(serialize_with = "serialize_rows", deserialize_with = "deserialize_rows")]
    weights: Matrix<f64>,
}

impl Layer {
    fn random(inputs: usize, outputs: usize, rng: &mut impl RngCore) -> Self {
        Self {
            inputs: vec![0.; inputs],
            outputs: vec![0.; outputs],
            biases: Matrix::new(1, outputs, (0..outputs).map(|_| unit(rng)).collect::<Vec<_>>()),
            weights: Matrix::new(
                inputs,
                outputs,
                (0..inputs * outputs).map(|_| unit(rng)).collect::<Vec<_>>(),
            ),
        }
    }

    #[inline]
    pub fn input_width(&self) -> usize {
        self.weights.rows()
    }

    #[inline]
    pub fn output_width(&self) -> usize {
        self.weights.cols()
    }

    #[inline]
    pub fn weights(&self) -> &Matrix<f64> {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f64] {
        self.biases.data()
    }

    #[inline]
    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    #[inline]
    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    fn activate(&self, input: &[f64]) -> Result<Vec<f64>> {
        if input.len() != self.input_width() {
            return Err(Error::InputWidth {
                want: self.input_width(),
                got: input.len(),
            });
        }

        let sums = Matrix::new(1, input.len(), input.to_vec()) * &self.weights;
        Ok(sums
            .data()
            .iter()
            .zip(self.biases.data())
            .map(|(&sum, &bias)| threshold(sum, bias))
            .collect())
    }

    fn mutate(&mut self, rate: f64, rng: &mut impl RngCore) {
        for bias in self.biases.mut_data() {
            *bias = lerp(*bias, unit(rng), rate);
        }
        for weight in self.weights.mut_data() {
            *weight = lerp(*weight, unit(rng), rate);
        }
    }

    /// Check the shape of a layer that came from outside, and size its buffers
    fn admit(&mut self, idx: usize) -> core::result::Result<(), String> {
        if self.input_width() == 0 || self.output_width() == 0 {
            return Err(format!("layer {idx} has an empty weight matrix"));
        }
        if self.biases.cols() != self.output_width() {
            return Err(format!(
                "layer {idx} has {} biases for {} outputs",
                self.biases.cols(),
                self.output_width()
            ));
        }
        if self
            .weights
            .data()
            .iter()
            .chain(self.biases.data())
            .any(|v| !v.is_finite())
        {
            return Err(format!("layer {idx} holds a non-finite value"));
        }

        for (buffer, width, name) in [
            (&mut self.inputs, self.weights.rows(), "inputs"),
            (&mut self.outputs, self.weights.cols(), "outputs"),
        ] {
            match buffer.len() {
                0 => *buffer = vec![0.; width],
                n if n == width => {}
                n => return Err(format!("layer {idx} has {n} {name}, expected {width}")),
            }
        }

        Ok(())
    }
}

/// A feedforward network of binary threshold neurons.
///
/// Deserialization validates the layer chain, so a `Perceptron` that exists is
/// always internally consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Layers")]
pub struct Perceptron {
    layers: Vec<Layer>,
}

#[derive(Deserialize)]
struct Layers {
    layers: Vec<Layer>,
}

impl TryFrom<Layers> for Perceptron {
    type Error = String;

    fn try_from(Layers { mut layers }: Layers) -> core::result::Result<Self, String> {
        if layers.is_empty() {
            return Err("no layers".to_string());
        }
        for (idx, layer) in layers.iter_mut().enumerate() {
            layer.admit(idx)?;
        }
        if let Some(idx) = layers
            .windows(2)
            .position(|pair| pair[0].output_width() != pair[1].input_width())
        {
            return Err(format!(
                "layer {idx} outputs {} values but layer {} takes {}",
                layers[idx].output_width(),
                idx + 1,
                layers[idx + 1].input_width()
            ));
        }

        Ok(Self { layers })
    }
}

impl Perceptron {
    /// A network of `topology.len() - 1` layers, every weight and bias uniform in [-1, 1]
    pub fn random(topology: &[usize], rng: &mut impl RngCore) -> Result<Self> {
        if topology.len() < 2 {
            return Err(Error::Topology {
                topology: topology.to_vec(),
                reason: "need an input and an output width",
            });
        }
        if topology.contains(&0) {
            return Err(Error::Topology {
                topology: topology.to_vec(),
                reason: "widths must be nonzero",
            });
        }

        Ok(Self {
            layers: topology
                .windows(2)
                .map(|pair| Layer::random(pair[0], pair[1], rng))
                .collect(),
        })
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    #[inline]
    pub fn input_width(&self) -> usize {
        self.layers[0].input_width()
    }

    /// Forward pass without touching the activation buffers
    pub fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>> {
        let mut signal = self.layers[0].activate(input)?;
        for layer in &self.layers[1..] {
            signal = layer.activate(&signal)?;
        }
        Ok(signal)
    }
}

impl Network for Perceptron {
    fn feed_forward(&mut self, input: &[f64]) -> Result<&[f64]> {
        let mut signal = input.to_vec();
        for layer in self.layers.iter_mut() {
            let out = layer.activate(&signal)?;
            layer.inputs = signal;
            layer.outputs = out.clone();
            signal = out;
        }

        Ok(self
            .layers
            .last()
            .map(|layer| layer.outputs.as_slice())
            .unwrap_or_default())
    }

    fn mutate(&mut self, rate: f64, rng: &mut impl RngCore) {
        if rate == 0. {
            return;
        }
        for layer in self.layers.iter_mut() {
            layer.mutate(rate, rng);
        }
    }

    fn topology(&self) -> Vec<usize> {
        let mut topology = Vec::with_capacity(self.layers.len() + 1);
        topology.push(self.input_width());
        topology.extend(self.layers.iter().map(Layer::output_width));
        topology
    }
}
