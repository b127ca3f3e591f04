use crate::environment::Environment;

#[derive(Clone, Debug)]
pub struct Transition<O, A> {
    pub before: O,
    pub action: A,
    pub after: O,
    pub reward: f64,
    pub done: bool,
}

impl<O, A> Transition<O, A> {
    pub fn to_nested_tuple(self) -> (O, (A, (O, (f64, bool)))) {
        (
            self.before,
            (self.action, (self.after, (self.reward, self.done))),
        )
    }
}

/// Steps `env` once, starting from `observation` or from a fresh reset.
pub fn collect_single<E: Environment, P: FnMut(&E::O) -> E::A>(
    env: &mut E,
    observation: Option<E::O>,
    policy: &mut P,
) -> Transition<E::O, E::A> {
    let before = match observation {
        Some(observation) => observation,
        None => env.reset(None),
    };
    let action = policy(&before);
    let (after, reward, done) = env.step(action.clone());
    Transition {
        before,
        action,
        after,
        reward,
        done,
    }
}

/// Collects `n_steps` transitions, resetting `env` whenever an episode ends.
pub fn collect_multiple<E: Environment, P: FnMut(&E::O) -> E::A>(
    env: &mut E,
    observation: Option<E::O>,
    policy: &mut P,
    n_steps: usize,
) -> Vec<Transition<E::O, E::A>> {
    let mut before = observation;
    let mut result = Vec::with_capacity(n_steps);
    for _ in 0..n_steps {
        let transition = collect_single(env, before, policy);
        before = match transition.done {
            true => None,
            false => Some(transition.after.clone()),
        };
        result.push(transition);
    }
    result
}
