use std::path::PathBuf;

use burn::{
    backend::{Autodiff, NdArray},
    prelude::*,
};
use burn_irl::{
    environment::{
        cartpole::{CartPole, CartPoleAction, CartPoleObservation},
        Environment, Space,
    },
    logging::rollout_total_reward,
    module::{policy::CategoricalPolicyConfig, reward_net::RewardNetConfig},
    IrlError,
};
use burn_irl_agents::{
    airl::{AirlConfig, AirlTrainer},
    expert::{load_expert_policy, save_expert_policy},
    policy_gradient::PolicyGradientConfig,
};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Train an AIRL generator and reward on CartPole from an expert's rollouts.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON experiment config; defaults are used when absent.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write the effective experiment config to this path.
    #[arg(long)]
    save_config: Option<PathBuf>,
    #[arg(long, default_value = "experts")]
    expert_dir: PathBuf,
    /// Timesteps used to train the expert when none is saved.
    #[arg(long, default_value_t = 100_000)]
    expert_timesteps: usize,
    #[arg(long, default_value_t = 10_000)]
    expert_rollout_timesteps: usize,
    #[arg(long, default_value_t = 100)]
    epochs: usize,
    #[arg(long, default_value_t = 10)]
    eval_episodes: usize,
}

#[derive(Config, Debug)]
struct ExperimentConfig {
    #[config(default = "AirlConfig::new()")]
    airl: AirlConfig,
    #[config(default = "PolicyGradientConfig::new()")]
    generator: PolicyGradientConfig,
    #[config(default = "PolicyGradientConfig::new().with_seed(1)")]
    expert: PolicyGradientConfig,
    #[config(default = "RewardNetConfig::new()")]
    reward_net: RewardNetConfig,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::new(),
    };
    if let Some(path) = &args.save_config {
        config.save(path)?;
    }

    type B = Autodiff<NdArray>;
    let device: &Device<B> = &Default::default();
    B::seed(config.airl.seed);

    // Expert
    let env = CartPole::new();
    let expert_architecture =
        CategoricalPolicyConfig::new().with_hidden_sizes(config.expert.hidden_sizes.clone());
    let expert_policy =
        match load_expert_policy::<B, _>(&env, &args.expert_dir, &expert_architecture, device) {
            Ok(policy) => policy,
            Err(IrlError::ExpertNotFound { env: id, .. }) => {
                info!(env = %id, timesteps = args.expert_timesteps, "training expert");
                let mut expert = config.expert.init::<B, _>(CartPole::new(), device)?;
                expert.learn(args.expert_timesteps)?;
                save_expert_policy(expert.policy().clone(), &env, &args.expert_dir)?;
                expert.policy().clone()
            }
            Err(err) => return Err(err.into()),
        };
    let mut expert = config
        .expert
        .init_with_policy(CartPole::new(), expert_policy)?;
    let expert_batch = expert.collect(args.expert_rollout_timesteps)?;

    // AIRL
    let generator = config.generator.init::<B, _>(CartPole::new(), device)?;
    let reward_net = config.reward_net.init::<B>(
        CartPoleObservation::dim(),
        CartPoleAction::dim(),
        device,
    )?;
    let mut trainer = AirlTrainer::new(config.airl.clone(), generator, reward_net, expert_batch)?;
    let stats = trainer.train(args.epochs)?;
    if let Some(last) = stats.last() {
        info!(
            disc_loss = last.disc_loss,
            disc_accuracy = last.disc_accuracy,
            "final discriminator"
        );
    }

    // Evaluation
    let mut eval_env = CartPole::new();
    let expert_reward = expert.evaluate(&mut eval_env, args.eval_episodes)?;
    let generator_reward = trainer
        .agent_mut()
        .evaluate(&mut eval_env, args.eval_episodes)?;
    let mut rng = StdRng::seed_from_u64(config.airl.seed);
    let random_reward = rollout_total_reward(
        &mut eval_env,
        &mut |_| CartPoleAction::sample(&mut rng),
        args.eval_episodes,
    );
    info!(
        env = eval_env.id(),
        episodes = args.eval_episodes,
        expert_reward,
        generator_reward,
        random_reward,
        "evaluation"
    );
    Ok(())
}
