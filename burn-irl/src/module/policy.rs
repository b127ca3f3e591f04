use burn::{
    prelude::*,
    tensor::activation::{log_softmax, softmax},
};
use rand::{distributions::WeightedIndex, prelude::Distribution, Rng};

use super::{
    component::StochasticActor,
    nn::multi_layer_perceptron::{MultiLayerPerceptron, MultiLayerPerceptronConfig},
};
use crate::{
    environment::{Discrete, Space},
    IrlError,
};

#[derive(Config, Debug)]
pub struct CategoricalPolicyConfig {
    #[config(default = "vec![32, 32]")]
    pub hidden_sizes: Vec<usize>,
}

impl CategoricalPolicyConfig {
    pub fn init<B: Backend>(
        &self,
        observation_dim: usize,
        n_actions: usize,
        device: &B::Device,
    ) -> crate::Result<CategoricalPolicy<B>> {
        Ok(CategoricalPolicy {
            model: MultiLayerPerceptronConfig::from_layers(
                observation_dim,
                &self.hidden_sizes,
                n_actions,
            )
            .init(device)?,
        })
    }
}

/// Softmax policy over a discrete action space.
#[derive(Module, Debug)]
pub struct CategoricalPolicy<B: Backend> {
    model: MultiLayerPerceptron<B>,
}

impl<B: Backend> CategoricalPolicy<B> {
    pub fn logits(&self, observations: Tensor<B, 2>) -> Tensor<B, 2> {
        self.model.forward(observations)
    }

    pub fn probabilities<O: Space>(&self, observation: &O) -> crate::Result<Vec<f32>> {
        let input: Tensor<B, 1> =
            Tensor::from_floats(observation.encode().as_slice(), &self.devices()[0]);
        softmax(self.model.forward(input.unsqueeze::<2>()), 1)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|err| IrlError::Tensor(format!("{err:?}")))
    }

    pub fn sample<O: Space, A: Discrete, R: Rng>(
        &self,
        observation: &O,
        rng: &mut R,
    ) -> crate::Result<A> {
        let probabilities = self.probabilities(observation)?;
        match WeightedIndex::new(&probabilities) {
            Ok(distribution) => Ok(A::from_index(distribution.sample(rng))),
            Err(err) => {
                tracing::warn!("degenerate action distribution {probabilities:?}: {err}");
                Ok(A::sample(rng))
            }
        }
    }

    pub fn greedy<O: Space, A: Discrete>(&self, observation: &O) -> crate::Result<A> {
        let best = self
            .probabilities(observation)?
            .into_iter()
            .enumerate()
            .max_by(|(_, p1), (_, p2)| p1.total_cmp(p2))
            .map(|(i, _)| i)
            .unwrap_or_default();
        Ok(A::from_index(best))
    }
}

impl<B: Backend> StochasticActor<B> for CategoricalPolicy<B> {
    fn log_prob_batch(&self, observations: Tensor<B, 2>, actions: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        log_softmax(self.logits(observations), 1)
            .gather(1, actions)
            .squeeze(1)
    }

    fn entropy_batch(&self, observations: Tensor<B, 2>) -> Tensor<B, 1> {
        let logits = self.logits(observations);
        let log_probs = log_softmax(logits.clone(), 1);
        (softmax(logits, 1) * log_probs).sum_dim(1).squeeze::<1>(1).neg()
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::{
        data::batch::{action_indices, encode},
        environment::cartpole::{CartPoleAction, CartPoleObservation},
    };

    #[test]
    fn test_probabilities_sum_to_one() {
        let device = &Default::default();
        let policy = CategoricalPolicyConfig::new()
            .init::<NdArray>(4, 2, device)
            .unwrap();
        let probabilities = policy.probabilities(&CartPoleObservation::default()).unwrap();
        assert_eq!(probabilities.len(), 2);
        assert!((probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_log_prob_matches_probabilities() {
        let device = &Default::default();
        let policy = CategoricalPolicyConfig::new()
            .init::<NdArray>(4, 2, device)
            .unwrap();
        let observation = CartPoleObservation {
            pole_angle: 0.1,
            ..Default::default()
        };
        let probabilities = policy.probabilities(&observation).unwrap();
        let observations = encode::<NdArray, _>(&[observation; 2], device);
        let actions = action_indices::<NdArray, _>(&[CartPoleAction::Left, CartPoleAction::Right], device);
        let log_prob = policy
            .log_prob_batch(observations.clone(), actions)
            .into_data()
            .to_vec::<f32>()
            .unwrap();
        assert!((log_prob[0].exp() - probabilities[0]).abs() < 1e-5);
        assert!((log_prob[1].exp() - probabilities[1]).abs() < 1e-5);

        let entropy = policy.entropy_batch(observations).into_data().to_vec::<f32>().unwrap();
        assert!(entropy[0] > 0.0 && entropy[0] <= 2f32.ln() + 1e-5);
    }

    #[test]
    fn test_sample_and_greedy_are_valid_actions() {
        let device = &Default::default();
        let policy = CategoricalPolicyConfig::new()
            .init::<NdArray>(4, 2, device)
            .unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        let observation = CartPoleObservation::default();
        for _ in 0..10 {
            let action: CartPoleAction = policy.sample(&observation, &mut rng).unwrap();
            assert!(action.index() < 2);
        }
        let greedy: CartPoleAction = policy.greedy(&observation).unwrap();
        let probabilities = policy.probabilities(&observation).unwrap();
        assert!(probabilities[greedy.index()] >= probabilities[1 - greedy.index()]);
    }

    #[test]
    fn test_greedy_follows_largest_probability() {
        let device = &Default::default();
        let policy = CategoricalPolicyConfig::new()
            .with_hidden_sizes(vec![8])
            .init::<NdArray>(4, 2, device)
            .unwrap();
        for pole_angle in [-0.2, -0.05, 0.0, 0.05, 0.2] {
            let observation = CartPoleObservation {
                pole_angle,
                ..Default::default()
            };
            let probabilities = policy.probabilities(&observation).unwrap();
            assert_eq!(probabilities.len(), 2);
            let expected = match probabilities[1] >= probabilities[0] {
                true => CartPoleAction::Right,
                false => CartPoleAction::Left,
            };
            let greedy: CartPoleAction = policy.greedy(&observation).unwrap();
            assert_eq!(greedy, expected);
        }
    }
}
