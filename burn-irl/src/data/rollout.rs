use super::{batch::TransitionBatch, util::collect_multiple};
use crate::environment::Environment;

/// Runs `policy` in `env` for exactly `n_timesteps` steps from a fresh reset.
///
/// Episodes that end early are reset and collection continues, so episode
/// boundaries need not line up with `n_timesteps`.
pub fn rollout_generate<E: Environment, P: FnMut(&E::O) -> E::A>(
    env: &mut E,
    policy: &mut P,
    n_timesteps: usize,
) -> TransitionBatch<E::O, E::A> {
    if n_timesteps == 0 {
        return TransitionBatch::default();
    }
    let observation = env.reset(None);
    TransitionBatch::from_transitions(collect_multiple(env, Some(observation), policy, n_timesteps))
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::environment::{
        cartpole::{CartPole, CartPoleAction},
        Space,
    };

    #[test]
    fn test_rollout_generate_length_spans_resets() {
        let mut env = CartPole::new();
        let mut rng = StdRng::seed_from_u64(0);
        let batch = rollout_generate(&mut env, &mut |_| CartPoleAction::sample(&mut rng), 1000);
        assert_eq!(batch.len(), 1000);
        // A random policy cannot balance for 1000 steps
        let episodes = batch.done().iter().filter(|done| **done).count();
        assert!(episodes > 1);
        for (i, done) in batch.done().iter().enumerate().take(999) {
            if !done {
                assert_eq!(batch.after()[i], batch.before()[i + 1]);
            }
        }
    }

    #[test]
    fn test_rollout_generate_zero_steps() {
        let mut env = CartPole::new();
        let batch = rollout_generate(&mut env, &mut |_| CartPoleAction::Left, 0);
        assert!(batch.is_empty());
    }
}
