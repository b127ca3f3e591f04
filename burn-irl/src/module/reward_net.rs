//! Reward network for adversarial IRL.
//!
//! The network has two heads: a reward head `g` scoring the state (or the
//! state/action pair) and a potential head `h` used for reward shaping. The
//! discriminator is trained on the shaped reward
//! `f(s, a, s') = g(s, a) + γ·h(s') - h(s)`, while `g` alone is the reward
//! handed to new policies once training is over.

use burn::prelude::*;

use super::{
    component::RewardModel,
    nn::multi_layer_perceptron::{MultiLayerPerceptron, MultiLayerPerceptronConfig},
};
use crate::IrlError;

#[derive(Config, Debug)]
pub struct RewardNetConfig {
    #[config(default = "vec![32, 32]")]
    pub hidden_sizes: Vec<usize>,
    #[config(default = 0.99)]
    pub discount_factor: f64,
    /// Score states only, ignoring the action in the reward head.
    #[config(default = true)]
    pub state_only: bool,
}

impl RewardNetConfig {
    pub fn init<B: Backend>(
        &self,
        observation_dim: usize,
        action_dim: usize,
        device: &B::Device,
    ) -> crate::Result<RewardNet<B>> {
        self.assertions()?;
        let reward_input = match self.state_only {
            true => observation_dim,
            false => observation_dim + action_dim,
        };
        Ok(RewardNet {
            theta: MultiLayerPerceptronConfig::from_layers(reward_input, &self.hidden_sizes, 1)
                .init(device)?,
            phi: MultiLayerPerceptronConfig::from_layers(observation_dim, &self.hidden_sizes, 1)
                .init(device)?,
            discount_factor: self.discount_factor,
            state_only: self.state_only,
        })
    }

    fn assertions(&self) -> crate::Result<()> {
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(IrlError::Config(format!(
                "The discount factor should be in the interval [0,1]. got {}",
                self.discount_factor
            )));
        }
        Ok(())
    }
}

#[derive(Module, Debug)]
pub struct RewardNet<B: Backend> {
    theta: MultiLayerPerceptron<B>,
    phi: MultiLayerPerceptron<B>,
    discount_factor: f64,
    state_only: bool,
}

impl<B: Backend> RewardNet<B> {
    fn reward(&self, before: Tensor<B, 2>, action: Tensor<B, 2>) -> Tensor<B, 1> {
        let input = match self.state_only {
            true => before,
            false => Tensor::cat(vec![before, action], 1),
        };
        self.theta.forward(input).squeeze(1)
    }

    fn potential(&self, observation: Tensor<B, 2>) -> Tensor<B, 1> {
        self.phi.forward(observation).squeeze(1)
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }
}

impl<B: Backend> RewardModel<B> for RewardNet<B> {
    fn reward_train(
        &self,
        before: Tensor<B, 2>,
        action: Tensor<B, 2>,
        after: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        let shaping =
            self.potential(after).mul_scalar(self.discount_factor) - self.potential(before.clone());
        self.reward(before, action) + shaping
    }

    fn reward_test(&self, before: Tensor<B, 2>, action: Tensor<B, 2>) -> Tensor<B, 1> {
        self.reward(before, action)
    }
}
