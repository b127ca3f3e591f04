//! Classic cart-pole balancing task with the `CartPole-v1` limits.

use burn::config::Config;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{one_hot, Discrete, Done, Environment, Reward, Space};

const GRAVITY: f32 = 9.8;
const CART_MASS: f32 = 1.0;
const POLE_MASS: f32 = 0.1;
const TOTAL_MASS: f32 = CART_MASS + POLE_MASS;
const POLE_HALF_LENGTH: f32 = 0.5;
const POLE_MASS_LENGTH: f32 = POLE_MASS * POLE_HALF_LENGTH;
const FORCE_MAGNITUDE: f32 = 10.0;
const TAU: f32 = 0.02;
const THETA_THRESHOLD: f32 = 12.0 * 2.0 * std::f32::consts::PI / 360.0;
const X_THRESHOLD: f32 = 2.4;
const RESET_BOUND: f32 = 0.05;

#[derive(Config, Debug)]
pub struct CartPoleConfig {
    #[config(default = 500)]
    pub max_episode_steps: usize,
    #[config(default = 0)]
    pub seed: u64,
}

impl CartPoleConfig {
    pub fn init(&self) -> CartPole {
        CartPole {
            state: CartPoleObservation::default(),
            steps: 0,
            finished: true,
            max_episode_steps: self.max_episode_steps,
            rng: StdRng::seed_from_u64(self.seed),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CartPoleObservation {
    pub cart_position: f32,
    pub cart_velocity: f32,
    pub pole_angle: f32,
    pub pole_angular_velocity: f32,
}

impl Space for CartPoleObservation {
    fn dim() -> usize {
        4
    }

    fn encode(&self) -> Vec<f32> {
        vec![
            self.cart_position,
            self.cart_velocity,
            self.pole_angle,
            self.pole_angular_velocity,
        ]
    }

    fn sample<R: Rng>(rng: &mut R) -> Self {
        CartPoleObservation {
            cart_position: rng.gen_range(-RESET_BOUND..RESET_BOUND),
            cart_velocity: rng.gen_range(-RESET_BOUND..RESET_BOUND),
            pole_angle: rng.gen_range(-RESET_BOUND..RESET_BOUND),
            pole_angular_velocity: rng.gen_range(-RESET_BOUND..RESET_BOUND),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CartPoleAction {
    Left,
    Right,
}

impl Space for CartPoleAction {
    fn dim() -> usize {
        Self::n()
    }

    fn encode(&self) -> Vec<f32> {
        one_hot(self)
    }

    fn sample<R: Rng>(rng: &mut R) -> Self {
        Self::from_index(rng.gen_range(0..Self::n()))
    }
}

impl Discrete for CartPoleAction {
    fn n() -> usize {
        2
    }

    fn index(&self) -> usize {
        match self {
            CartPoleAction::Left => 0,
            CartPoleAction::Right => 1,
        }
    }

    fn from_index(index: usize) -> Self {
        match index {
            0 => CartPoleAction::Left,
            _ => CartPoleAction::Right,
        }
    }
}

pub struct CartPole {
    state: CartPoleObservation,
    steps: usize,
    finished: bool,
    max_episode_steps: usize,
    rng: StdRng,
}

impl CartPole {
    pub fn new() -> Self {
        CartPoleConfig::new().init()
    }

    fn terminated(&self) -> bool {
        self.state.cart_position.abs() > X_THRESHOLD || self.state.pole_angle.abs() > THETA_THRESHOLD
    }
}

impl Default for CartPole {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for CartPole {
    type A = CartPoleAction;

    type O = CartPoleObservation;

    fn id(&self) -> &str {
        "CartPole-v1"
    }

    fn reset(&mut self, seed: Option<u64>) -> Self::O {
        if let Some(seed) = seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.state = CartPoleObservation::sample(&mut self.rng);
        self.steps = 0;
        self.finished = false;
        self.state
    }

    fn step(&mut self, action: Self::A) -> (Self::O, Reward, Done) {
        if self.finished {
            tracing::warn!("CartPole stepped after the episode finished; call reset first");
            return (self.state, 0.0, true);
        }

        let force = match action {
            CartPoleAction::Left => -FORCE_MAGNITUDE,
            CartPoleAction::Right => FORCE_MAGNITUDE,
        };
        let CartPoleObservation {
            cart_position: x,
            cart_velocity: x_dot,
            pole_angle: theta,
            pole_angular_velocity: theta_dot,
        } = self.state;
        let (sin_theta, cos_theta) = theta.sin_cos();

        let temp = (force + POLE_MASS_LENGTH * theta_dot * theta_dot * sin_theta) / TOTAL_MASS;
        let theta_acc = (GRAVITY * sin_theta - cos_theta * temp)
            / (POLE_HALF_LENGTH * (4.0 / 3.0 - POLE_MASS * cos_theta * cos_theta / TOTAL_MASS));
        let x_acc = temp - POLE_MASS_LENGTH * theta_acc * cos_theta / TOTAL_MASS;

        // Explicit Euler integration
        self.state = CartPoleObservation {
            cart_position: x + TAU * x_dot,
            cart_velocity: x_dot + TAU * x_acc,
            pole_angle: theta + TAU * theta_dot,
            pole_angular_velocity: theta_dot + TAU * theta_acc,
        };
        self.steps += 1;

        let done = self.terminated() || self.steps >= self.max_episode_steps;
        self.finished = done;
        (self.state, 1.0, done)
    }
}
