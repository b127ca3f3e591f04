//! AIRL discriminator objective.
//!
//! The discriminator is `D(s, a, s') = exp(f) / (exp(f) + π(a|s))`, so its
//! logit is `f(s, a, s') - log π(a|s)`. Expert transitions are labelled 1 and
//! generated ones 0; the loss is the binary cross-entropy averaged over both
//! batches together.

use burn::{prelude::*, tensor::activation::log_sigmoid};

use crate::module::component::RewardModel;

/// Encoded transitions plus the (detached) policy log-probability of each action.
#[derive(Clone, Debug)]
pub struct DiscriminatorBatch<B: Backend> {
    pub before: Tensor<B, 2>,
    pub action: Tensor<B, 2>,
    pub after: Tensor<B, 2>,
    pub log_policy: Tensor<B, 1>,
}

impl<B: Backend> DiscriminatorBatch<B> {
    pub fn len(&self) -> usize {
        self.before.dims()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn logits<R: RewardModel<B>>(&self, reward: &R) -> Tensor<B, 1> {
        reward.reward_train(self.before.clone(), self.action.clone(), self.after.clone())
            - self.log_policy.clone()
    }
}

pub fn discriminator_loss<B: Backend>(
    expert_logits: Tensor<B, 1>,
    generated_logits: Tensor<B, 1>,
) -> Tensor<B, 1> {
    let n = expert_logits.dims()[0] + generated_logits.dims()[0];
    let expert_term = log_sigmoid(expert_logits).sum();
    let generated_term = log_sigmoid(generated_logits.neg()).sum();
    (expert_term + generated_term).neg().div_scalar(n as f64)
}

/// Fraction of transitions the discriminator labels correctly.
pub fn discriminator_accuracy<B: Backend>(
    expert_logits: Tensor<B, 1>,
    generated_logits: Tensor<B, 1>,
) -> f64 {
    let n = expert_logits.dims()[0] + generated_logits.dims()[0];
    let correct = expert_logits.greater_elem(0.0).int().sum()
        + generated_logits.lower_equal_elem(0.0).int().sum();
    correct.into_scalar().elem::<i64>() as f64 / n as f64
}

#[derive(Clone, Debug)]
pub struct DiscriminatorLoss;

impl DiscriminatorLoss {
    pub fn forward<B: Backend, R: RewardModel<B>>(
        &self,
        reward: &R,
        expert: &DiscriminatorBatch<B>,
        generated: &DiscriminatorBatch<B>,
    ) -> Tensor<B, 1> {
        discriminator_loss(expert.logits(reward), generated.logits(reward))
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    use super::*;

    fn scalar(tensor: Tensor<NdArray, 1>) -> f32 {
        tensor.into_scalar()
    }

    #[test]
    fn test_uninformed_discriminator_loss_is_ln_2() {
        let device = &Default::default();
        let zeros = Tensor::<NdArray, 1>::zeros([4], device);
        let loss = scalar(discriminator_loss(zeros.clone(), zeros));
        assert!((loss - 2f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn test_separating_logits_lower_the_loss() {
        let device = &Default::default();
        let expert = Tensor::<NdArray, 1>::from_floats([3.0, 4.0], device);
        let generated = Tensor::<NdArray, 1>::from_floats([-3.0, -4.0, -5.0], device);
        let good = scalar(discriminator_loss(expert.clone(), generated.clone()));
        let bad = scalar(discriminator_loss(generated.clone(), expert.clone()));
        assert!(good < 0.1);
        assert!(bad > 2.0);
        assert_eq!(discriminator_accuracy(expert.clone(), generated.clone()), 1.0);
        assert_eq!(discriminator_accuracy(generated, expert), 0.0);
    }
}
