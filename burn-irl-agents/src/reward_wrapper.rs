use burn::prelude::*;
use burn_irl::{
    data::batch::encode,
    environment::{Done, Environment, Reward},
    module::{component::RewardModel, reward_net::RewardNet},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewardKind {
    /// Shaped reward `f(s, a, s')` the discriminator was trained on.
    Train,
    /// Unshaped reward `g(s, a)`, for retraining a policy from scratch.
    Test,
}

/// Environment whose rewards come from a learned reward network instead of
/// the wrapped environment. Episode boundaries are left untouched.
pub struct LearnedRewardEnv<B: Backend, E: Environment> {
    env: E,
    reward_net: RewardNet<B>,
    kind: RewardKind,
    last_observation: Option<E::O>,
    device: B::Device,
}

impl<B: Backend, E: Environment> LearnedRewardEnv<B, E> {
    pub fn new(env: E, reward_net: RewardNet<B>, kind: RewardKind) -> Self {
        let device = reward_net.devices()[0].clone();
        Self {
            env,
            reward_net,
            kind,
            last_observation: None,
            device,
        }
    }

    pub fn kind(&self) -> RewardKind {
        self.kind
    }

    pub fn inner(&self) -> &E {
        &self.env
    }

    pub fn into_inner(self) -> E {
        self.env
    }

    fn score(&self, before: &E::O, action: &E::A, after: &E::O) -> Reward {
        let before = encode::<B, _>(std::slice::from_ref(before), &self.device);
        let action = encode::<B, _>(std::slice::from_ref(action), &self.device);
        let reward = match self.kind {
            RewardKind::Train => {
                let after = encode::<B, _>(std::slice::from_ref(after), &self.device);
                self.reward_net.reward_train(before, action, after)
            }
            RewardKind::Test => self.reward_net.reward_test(before, action),
        };
        reward.into_scalar().elem::<f64>()
    }
}

impl<B: Backend, E: Environment> Environment for LearnedRewardEnv<B, E> {
    type A = E::A;

    type O = E::O;

    fn id(&self) -> &str {
        self.env.id()
    }

    fn reset(&mut self, seed: Option<u64>) -> Self::O {
        let observation = self.env.reset(seed);
        self.last_observation = Some(observation.clone());
        observation
    }

    fn step(&mut self, action: Self::A) -> (Self::O, Reward, Done) {
        let (after, _, done) = self.env.step(action.clone());
        let reward = match self.last_observation.take() {
            Some(before) => self.score(&before, &action, &after),
            None => {
                tracing::warn!("{} stepped before reset, learned reward is 0", self.env.id());
                0.0
            }
        };
        self.last_observation = Some(after.clone());
        (after, reward, done)
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use burn_irl::{
        environment::cartpole::{CartPole, CartPoleAction},
        module::reward_net::RewardNetConfig,
    };

    use super::*;

    #[test]
    fn test_wrapped_env_reports_learned_reward() {
        let device = &Default::default();
        let reward_net = RewardNetConfig::new().init::<NdArray>(4, 2, device).unwrap();
        let mut reference = CartPole::new();
        let mut env = LearnedRewardEnv::new(CartPole::new(), reward_net.clone(), RewardKind::Test);

        let before = env.reset(Some(3));
        assert_eq!(before, reference.reset(Some(3)));
        let (after, reward, done) = env.step(CartPoleAction::Right);
        let (expected_after, _, expected_done) = reference.step(CartPoleAction::Right);
        assert_eq!(after, expected_after);
        assert_eq!(done, expected_done);

        let expected = reward_net
            .reward_test(
                encode::<NdArray, _>(&[before], device),
                encode::<NdArray, _>(&[CartPoleAction::Right], device),
            )
            .into_scalar()
            .elem::<f64>();
        assert_eq!(reward, expected);
        assert_eq!(env.id(), "CartPole-v1");
    }

    #[test]
    fn test_train_reward_includes_shaping() {
        let device = &Default::default();
        let reward_net = RewardNetConfig::new().init::<NdArray>(4, 2, device).unwrap();
        let mut env = LearnedRewardEnv::new(CartPole::new(), reward_net.clone(), RewardKind::Train);
        let before = env.reset(Some(0));
        let (after, reward, _) = env.step(CartPoleAction::Left);

        let expected = reward_net
            .reward_train(
                encode::<NdArray, _>(&[before], device),
                encode::<NdArray, _>(&[CartPoleAction::Left], device),
                encode::<NdArray, _>(&[after], device),
            )
            .into_scalar()
            .elem::<f64>();
        assert_eq!(reward, expected);
    }

    #[test]
    fn test_step_before_reset_scores_zero() {
        let device = &Default::default();
        let reward_net = RewardNetConfig::new().init::<NdArray>(4, 2, device).unwrap();
        let mut env = LearnedRewardEnv::new(CartPole::new(), reward_net, RewardKind::Test);
        let (_, reward, _) = env.step(CartPoleAction::Left);
        assert_eq!(reward, 0.0);
    }
}
