use burn::prelude::*;
use rand::{seq::index, Rng};

use super::util::Transition;
use crate::{
    environment::{Discrete, Space},
    IrlError, Result,
};

/// Index-aligned transitions, stored field by field.
#[derive(Clone, Debug)]
pub struct TransitionBatch<O, A> {
    before: Vec<O>,
    action: Vec<A>,
    after: Vec<O>,
    reward: Vec<f64>,
    done: Vec<bool>,
}

impl<O, A> Default for TransitionBatch<O, A> {
    fn default() -> Self {
        Self {
            before: Vec::new(),
            action: Vec::new(),
            after: Vec::new(),
            reward: Vec::new(),
            done: Vec::new(),
        }
    }
}

fn check_length(field: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(IrlError::LengthMismatch {
            field,
            expected,
            actual,
        });
    }
    Ok(())
}

impl<O: Clone, A: Clone> TransitionBatch<O, A> {
    pub fn new(
        before: Vec<O>,
        action: Vec<A>,
        after: Vec<O>,
        reward: Vec<f64>,
        done: Vec<bool>,
    ) -> Result<Self> {
        let expected = before.len();
        check_length("action", expected, action.len())?;
        check_length("after", expected, after.len())?;
        check_length("reward", expected, reward.len())?;
        check_length("done", expected, done.len())?;
        Ok(Self {
            before,
            action,
            after,
            reward,
            done,
        })
    }

    pub fn from_transitions(transitions: Vec<Transition<O, A>>) -> Self {
        let (before, (action, (after, (reward, done)))): (
            Vec<O>,
            (Vec<A>, (Vec<O>, (Vec<f64>, Vec<bool>))),
        ) = transitions
            .into_iter()
            .map(Transition::to_nested_tuple)
            .unzip();
        Self {
            before,
            action,
            after,
            reward,
            done,
        }
    }

    pub fn len(&self) -> usize {
        self.before.len()
    }

    pub fn is_empty(&self) -> bool {
        self.before.is_empty()
    }

    pub fn before(&self) -> &[O] {
        &self.before
    }

    pub fn action(&self) -> &[A] {
        &self.action
    }

    pub fn after(&self) -> &[O] {
        &self.after
    }

    pub fn reward(&self) -> &[f64] {
        &self.reward
    }

    pub fn done(&self) -> &[bool] {
        &self.done
    }

    pub fn transition(&self, i: usize) -> Transition<O, A> {
        Transition {
            before: self.before[i].clone(),
            action: self.action[i].clone(),
            after: self.after[i].clone(),
            reward: self.reward[i],
            done: self.done[i],
        }
    }

    pub fn transitions(&self) -> impl Iterator<Item = Transition<O, A>> + '_ {
        (0..self.len()).map(|i| self.transition(i))
    }

    /// Replaces the reward channel, e.g. with a learned reward.
    pub fn with_rewards(mut self, reward: Vec<f64>) -> Result<Self> {
        check_length("reward", self.len(), reward.len())?;
        self.reward = reward;
        Ok(self)
    }

    /// Uniform sample of at most `n` transitions, without replacement.
    pub fn sample<R: Rng>(&self, rng: &mut R, n: usize) -> Self {
        let amount = n.min(self.len());
        Self::from_transitions(
            index::sample(rng, self.len(), amount)
                .into_iter()
                .map(|i| self.transition(i))
                .collect(),
        )
    }

    /// The `(before, action, after, done)` sequences.
    pub fn into_parts(self) -> (Vec<O>, Vec<A>, Vec<O>, Vec<bool>) {
        (self.before, self.action, self.after, self.done)
    }
}

impl<O: Space, A: Space> TransitionBatch<O, A> {
    pub fn before_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        encode(&self.before, device)
    }

    pub fn action_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        encode(&self.action, device)
    }

    pub fn after_tensor<B: Backend>(&self, device: &B::Device) -> Tensor<B, 2> {
        encode(&self.after, device)
    }
}

/// Stacks the flat encodings of `items` into a `[items.len(), S::dim()]` tensor.
pub fn encode<B: Backend, S: Space>(items: &[S], device: &B::Device) -> Tensor<B, 2> {
    let data: Vec<f32> = items.iter().flat_map(|item| item.encode()).collect();
    Tensor::from_data(TensorData::new(data, [items.len(), S::dim()]), device)
}

/// Action indices shaped `[actions.len(), 1]`, ready for `gather` along dim 1.
pub fn action_indices<B: Backend, D: Discrete>(actions: &[D], device: &B::Device) -> Tensor<B, 2, Int> {
    let indices: Vec<i64> = actions.iter().map(|a| a.index() as i64).collect();
    Tensor::from_data(TensorData::new(indices, [actions.len(), 1]), device)
}
