use burn::{
    prelude::Backend,
    tensor::{Int, Tensor},
};

use crate::Result;

pub trait Actor {
    type A; // Action
    type O; // Observation

    fn a(&mut self, observation: &Self::O) -> Result<Self::A>;
}

/// A learned reward over batches of encoded transitions.
pub trait RewardModel<B: Backend> {
    /// Shaped reward `f(s, a, s')`, the score the discriminator is built on.
    fn reward_train(
        &self,
        before: Tensor<B, 2>,
        action: Tensor<B, 2>,
        after: Tensor<B, 2>,
    ) -> Tensor<B, 1>;

    /// Reward without the shaping term, for training fresh policies.
    fn reward_test(&self, before: Tensor<B, 2>, action: Tensor<B, 2>) -> Tensor<B, 1>;
}

pub trait StochasticActor<B: Backend> {
    fn log_prob_batch(&self, observations: Tensor<B, 2>, actions: Tensor<B, 2, Int>) -> Tensor<B, 1>;

    fn entropy_batch(&self, observations: Tensor<B, 2>) -> Tensor<B, 1>;
}
