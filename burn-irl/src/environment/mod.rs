use std::fmt::Debug;

use rand::Rng;

pub type Reward = f64;
pub type Done = bool;

pub trait Environment {
    type A: Space;
    type O: Space;

    /// Name used when reporting errors and storing artifacts, e.g. `CartPole-v1`.
    fn id(&self) -> &str;

    fn reset(&mut self, seed: Option<u64>) -> Self::O;

    fn step(&mut self, action: Self::A) -> (Self::O, Reward, Done);
}

/// A value space with a flat `f32` encoding used as network input.
pub trait Space: Clone + Debug {
    fn dim() -> usize;

    fn encode(&self) -> Vec<f32>;

    fn sample<R: Rng>(rng: &mut R) -> Self;
}

pub trait Discrete: Space {
    fn n() -> usize;

    fn index(&self) -> usize;

    fn from_index(index: usize) -> Self;
}

pub fn one_hot<D: Discrete>(value: &D) -> Vec<f32> {
    let mut encoding = vec![0.0; D::n()];
    encoding[value.index()] = 1.0;
    encoding
}

pub mod cartpole;
