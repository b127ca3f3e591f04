use burn::nn::{LeakyRelu, LeakyReluConfig, Linear, LinearConfig};
use burn::prelude::*;

use crate::IrlError;

#[derive(Config, Debug)]
pub struct MultiLayerPerceptronConfig {
    /// Layer widths: input size, hidden sizes..., output size.
    sizes: Vec<usize>,
}

#[derive(Module, Debug)]
pub struct MultiLayerPerceptron<B: Backend> {
    linear_layers: Vec<Linear<B>>,
    activation: LeakyRelu,
}

impl MultiLayerPerceptronConfig {
    pub fn from_layers(input_size: usize, hidden_sizes: &[usize], output_size: usize) -> Self {
        let mut sizes = Vec::with_capacity(hidden_sizes.len() + 2);
        sizes.push(input_size);
        sizes.extend_from_slice(hidden_sizes);
        sizes.push(output_size);
        Self::new(sizes)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> crate::Result<MultiLayerPerceptron<B>> {
        if self.sizes.len() < 2 || self.sizes.contains(&0) {
            return Err(IrlError::Config(format!(
                "expected non-zero MLP sizes (input size, hidden size, ..., output size), got {:?}",
                self.sizes
            )));
        }

        let linear_layers = self
            .sizes
            .windows(2)
            .map(|pair| LinearConfig::new(pair[0], pair[1]).init(device))
            .collect();

        Ok(MultiLayerPerceptron {
            linear_layers,
            activation: LeakyReluConfig::new().init(),
        })
    }
}

impl<B: Backend> MultiLayerPerceptron<B> {
    pub fn forward<const D: usize>(&self, input: Tensor<B, D>) -> Tensor<B, D> {
        let mut x = input;

        match self.linear_layers.last() {
            Some(f) => {
                for layer in self.linear_layers[..self.linear_layers.len() - 1].iter() {
                    x = layer.forward(x);
                    x = self.activation.forward(x);
                }
                f.forward(x)
            }
            None => x,
        }
    }
}

#[cfg(test)]
mod tests {

    use burn::{
        backend::NdArray,
        tensor::{Shape, Tensor},
    };

    use super::MultiLayerPerceptronConfig;

    #[test]
    fn test_multi_layer_perceptron() {
        let device = &Default::default();
        for n_hidden_layers in 0..2 {
            let output_size = 3;
            let hidden: Vec<usize> = (0..n_hidden_layers).map(|i| 32 * (i + 1)).collect();
            let model = MultiLayerPerceptronConfig::from_layers(4, &hidden, output_size)
                .init::<NdArray>(device)
                .unwrap();
            let x = Tensor::<NdArray, 1>::from_floats([1.0, 2.0, 3.0, 4.0], device);
            assert_eq!(model.forward(x.clone()).shape(), Shape::new([output_size]));
            let x = Tensor::<NdArray, 2>::from_floats([[1.0, 2.0, 3.0, 4.0]; 5], device);
            assert_eq!(model.forward(x).shape(), Shape::new([5, output_size]));
        }
    }

    #[test]
    fn test_invalid_sizes() {
        let device = &Default::default();
        assert!(MultiLayerPerceptronConfig::new(vec![4])
            .init::<NdArray>(device)
            .is_err());
        assert!(MultiLayerPerceptronConfig::from_layers(4, &[0], 2)
            .init::<NdArray>(device)
            .is_err());
    }
}
