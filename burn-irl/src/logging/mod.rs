use crate::environment::Environment;

pub fn evaluate_episode<E: Environment, P: FnMut(&E::O) -> E::A>(
    env: &mut E,
    policy: &mut P,
    seed: Option<u64>,
) -> f64 {
    let mut episode_reward = 0.0;
    let mut before = env.reset(seed);
    let mut not_done = true;
    while not_done {
        let action = policy(&before);
        let (after, reward, done) = env.step(action.clone());
        episode_reward += reward;
        before = after;
        not_done = !done;
    }
    episode_reward
}

/// Total environment reward collected by `policy` over `n_episodes` full episodes.
pub fn rollout_total_reward<E: Environment, P: FnMut(&E::O) -> E::A>(
    env: &mut E,
    policy: &mut P,
    n_episodes: usize,
) -> f64 {
    let total: f64 = (0..n_episodes)
        .map(|_| evaluate_episode(env, policy, None))
        .sum();
    tracing::debug!(env = env.id(), n_episodes, total, "evaluated policy");
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::cartpole::{CartPoleAction, CartPoleConfig};

    #[test]
    fn test_rollout_total_reward_counts_every_episode() {
        let mut env = CartPoleConfig::new().with_max_episode_steps(10).init();
        // Alternating pushes keep the pole up for the whole truncated episode
        let mut push_right = false;
        let mut policy = |_: &_| {
            push_right = !push_right;
            match push_right {
                true => CartPoleAction::Right,
                false => CartPoleAction::Left,
            }
        };
        assert_eq!(rollout_total_reward(&mut env, &mut policy, 3), 30.0);
        assert_eq!(evaluate_episode(&mut env, &mut policy, Some(1)), 10.0);
    }
}
