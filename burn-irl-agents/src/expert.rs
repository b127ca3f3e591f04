use std::path::{Path, PathBuf};

use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
};
use burn_irl::{
    environment::{Discrete, Environment, Space},
    module::policy::{CategoricalPolicy, CategoricalPolicyConfig},
    IrlError, Result,
};

/// Where the expert for `env` lives inside `dir`, keyed by the environment id.
pub fn expert_policy_path<E: Environment>(env: &E, dir: &Path) -> PathBuf {
    let mut path = dir.join(env.id());
    path.set_extension("mpk");
    path
}

pub fn save_expert_policy<B: Backend, E: Environment>(
    policy: CategoricalPolicy<B>,
    env: &E,
    dir: &Path,
) -> Result<PathBuf> {
    let path = expert_policy_path(env, dir);
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    policy.save_file(path.clone(), &recorder)?;
    tracing::info!(env = env.id(), path = %path.display(), "saved expert policy");
    Ok(path)
}

/// Loads the expert for `env`. `config` must describe the saved architecture.
pub fn load_expert_policy<B, E>(
    env: &E,
    dir: &Path,
    config: &CategoricalPolicyConfig,
    device: &B::Device,
) -> Result<CategoricalPolicy<B>>
where
    B: Backend,
    E: Environment,
    E::A: Discrete,
{
    let path = expert_policy_path(env, dir);
    if !path.is_file() {
        return Err(IrlError::ExpertNotFound {
            env: env.id().to_string(),
            path,
        });
    }
    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let policy = config
        .init::<B>(<E::O>::dim(), <E::A>::n(), device)?
        .load_file(path.clone(), &recorder, device)?;
    tracing::info!(env = env.id(), path = %path.display(), "loaded expert policy");
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;
    use burn_irl::environment::cartpole::{CartPole, CartPoleObservation};
    use expect_test::expect;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("burn-irl-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_expert() {
        let dir = Path::new("/nonexistent/experts");
        let err = load_expert_policy::<NdArray, _>(
            &CartPole::new(),
            dir,
            &CategoricalPolicyConfig::new(),
            &Default::default(),
        )
        .unwrap_err();
        expect![[r#"no expert policy for environment CartPole-v1 at /nonexistent/experts/CartPole-v1.mpk"#]]
            .assert_eq(&err.to_string());
    }

    #[test]
    fn test_save_then_load_expert() {
        let device = &Default::default();
        let env = CartPole::new();
        let dir = scratch_dir("expert");
        let config = CategoricalPolicyConfig::new().with_hidden_sizes(vec![8]);
        let policy = config.init::<NdArray>(4, 2, device).unwrap();
        let observation = CartPoleObservation {
            cart_velocity: 0.3,
            pole_angle: -0.1,
            ..Default::default()
        };
        let expected = policy.probabilities(&observation).unwrap();

        let path = save_expert_policy(policy, &env, &dir).unwrap();
        assert_eq!(path, expert_policy_path(&env, &dir));
        let loaded = load_expert_policy::<NdArray, _>(&env, &dir, &config, device).unwrap();
        assert_eq!(loaded.probabilities(&observation).unwrap(), expected);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
