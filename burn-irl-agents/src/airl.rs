//! Adversarial inverse reinforcement learning.
//!
//! [`AirlTrainer`] alternates two phases. The discriminator phase fits the
//! reward network so that `f(s, a, s') - log π(a|s)` separates expert
//! transitions from generated ones. The generator phase runs the policy in
//! its environment, replaces the environment reward with
//! `f(s, a, s') - w·log π(a|s)` and takes policy-gradient steps on it.

use burn::{
    module::AutodiffModule,
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use burn_irl::{
    data::{
        batch::TransitionBatch,
        memory::{Memory, RingbufferMemory},
        util::Transition,
    },
    environment::{Discrete, Environment},
    module::{component::RewardModel, reward_net::RewardNet},
    objective::discriminator::{discriminator_accuracy, DiscriminatorBatch, DiscriminatorLoss},
    IrlError,
};
use rand::{rngs::StdRng, SeedableRng};
use tqdm::tqdm;

use crate::{
    policy_gradient::PolicyGradientAgent,
    reward_wrapper::{LearnedRewardEnv, RewardKind},
};

#[derive(Config, Debug)]
pub struct AirlConfig {
    #[config(default = 1e-3)]
    pub disc_learning_rate: f64,
    #[config(default = 50)]
    pub disc_steps_per_epoch: usize,
    /// Transitions drawn from each of the expert batch and the generator memory.
    #[config(default = 256)]
    pub disc_batch_size: usize,
    #[config(default = 1024)]
    pub gen_timesteps_per_epoch: usize,
    #[config(default = 1.0)]
    pub entropy_weight: f64,
    #[config(default = 10_000)]
    pub memory_capacity: usize,
    #[config(default = 0)]
    pub seed: u64,
}

impl AirlConfig {
    fn assertions(&self) -> burn_irl::Result<()> {
        if self.disc_batch_size == 0 {
            return Err(IrlError::Config("disc_batch_size must be positive".to_string()));
        }
        if self.memory_capacity == 0 {
            return Err(IrlError::Config("memory_capacity must be positive".to_string()));
        }
        if self.entropy_weight < 0.0 {
            return Err(IrlError::Config(format!(
                "entropy_weight must be non-negative. got {}",
                self.entropy_weight
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct EpochStats {
    pub epoch: usize,
    pub disc_loss: f64,
    pub disc_accuracy: f64,
    pub gen_loss: f64,
}

pub struct AirlTrainer<B: AutodiffBackend, E: Environment> {
    cfg: AirlConfig,
    agent: PolicyGradientAgent<B, E>,
    reward_net: RewardNet<B>,
    disc_optim: OptimizerAdaptor<Adam, RewardNet<B>, B>,
    loss: DiscriminatorLoss,
    expert: TransitionBatch<E::O, E::A>,
    memory: RingbufferMemory<Transition<E::O, E::A>, StdRng>,
    rng: StdRng,
    disc_steps: usize,
    gen_timesteps: usize,
    epochs: usize,
}

impl<B, E> AirlTrainer<B, E>
where
    B: AutodiffBackend,
    E: Environment,
    E::A: Discrete,
{
    /// The generator is trained in whatever environment `agent` is bound to.
    pub fn new(
        cfg: AirlConfig,
        agent: PolicyGradientAgent<B, E>,
        reward_net: RewardNet<B>,
        expert: TransitionBatch<E::O, E::A>,
    ) -> burn_irl::Result<Self> {
        cfg.assertions()?;
        if expert.is_empty() {
            return Err(IrlError::EmptyBatch("expert"));
        }
        tracing::info!(
            env = agent.env().id(),
            expert_transitions = expert.len(),
            "initialised AIRL trainer"
        );
        Ok(Self {
            memory: RingbufferMemory::new(cfg.memory_capacity, StdRng::seed_from_u64(cfg.seed)),
            rng: StdRng::seed_from_u64(cfg.seed.wrapping_add(1)),
            disc_optim: AdamConfig::new().init(),
            loss: DiscriminatorLoss,
            cfg,
            agent,
            reward_net,
            expert,
            disc_steps: 0,
            gen_timesteps: 0,
            epochs: 0,
        })
    }

    pub fn config(&self) -> &AirlConfig {
        &self.cfg
    }

    pub fn expert(&self) -> &TransitionBatch<E::O, E::A> {
        &self.expert
    }

    pub fn agent(&self) -> &PolicyGradientAgent<B, E> {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut PolicyGradientAgent<B, E> {
        &mut self.agent
    }

    pub fn into_agent(self) -> PolicyGradientAgent<B, E> {
        self.agent
    }

    pub fn reward_net(&self) -> &RewardNet<B> {
        &self.reward_net
    }

    pub fn disc_steps(&self) -> usize {
        self.disc_steps
    }

    pub fn gen_timesteps(&self) -> usize {
        self.gen_timesteps
    }

    pub fn epochs(&self) -> usize {
        self.epochs
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    fn discriminator_batch(&self, batch: &TransitionBatch<E::O, E::A>) -> DiscriminatorBatch<B> {
        let device = self.agent.device();
        DiscriminatorBatch {
            before: batch.before_tensor(device),
            action: batch.action_tensor(device),
            after: batch.after_tensor(device),
            log_policy: self.agent.log_prob(batch).detach(),
        }
    }

    fn disc_batches(
        &self,
        expert: &TransitionBatch<E::O, E::A>,
        generated: &TransitionBatch<E::O, E::A>,
    ) -> burn_irl::Result<(DiscriminatorBatch<B>, DiscriminatorBatch<B>)> {
        if expert.is_empty() {
            return Err(IrlError::EmptyBatch("expert"));
        }
        if generated.is_empty() {
            return Err(IrlError::EmptyBatch("generated"));
        }
        Ok((
            self.discriminator_batch(expert),
            self.discriminator_batch(generated),
        ))
    }

    /// Takes `n_steps` Adam steps (default `disc_steps_per_epoch`) on the
    /// discriminator loss of the batch pair and returns the loss afterwards.
    pub fn train_disc(
        &mut self,
        expert: &TransitionBatch<E::O, E::A>,
        generated: &TransitionBatch<E::O, E::A>,
        n_steps: Option<usize>,
    ) -> burn_irl::Result<f64> {
        let (expert, generated) = self.disc_batches(expert, generated)?;
        let n_steps = n_steps.unwrap_or(self.cfg.disc_steps_per_epoch);
        for _ in 0..n_steps {
            let loss = self.loss.forward(&self.reward_net, &expert, &generated);
            let grads = GradientsParams::from_grads(loss.backward(), &self.reward_net);
            self.reward_net =
                self.disc_optim
                    .step(self.cfg.disc_learning_rate, self.reward_net.clone(), grads);
            self.disc_steps += 1;
        }
        let loss = self
            .loss
            .forward(&self.reward_net, &expert, &generated)
            .into_scalar()
            .elem::<f64>();
        tracing::debug!(n_steps, loss, total_steps = self.disc_steps, "discriminator steps");
        Ok(loss)
    }

    /// Discriminator loss on the batch pair under the current reward net and policy.
    pub fn eval_disc_loss(
        &self,
        expert: &TransitionBatch<E::O, E::A>,
        generated: &TransitionBatch<E::O, E::A>,
    ) -> burn_irl::Result<f64> {
        let (expert, generated) = self.disc_batches(expert, generated)?;
        Ok(self
            .loss
            .forward(&self.reward_net, &expert, &generated)
            .into_scalar()
            .elem::<f64>())
    }

    pub fn eval_disc_accuracy(
        &self,
        expert: &TransitionBatch<E::O, E::A>,
        generated: &TransitionBatch<E::O, E::A>,
    ) -> burn_irl::Result<f64> {
        let (expert, generated) = self.disc_batches(expert, generated)?;
        Ok(discriminator_accuracy(
            expert.logits(&self.reward_net),
            generated.logits(&self.reward_net),
        ))
    }

    fn generator_rewards(&self, batch: &TransitionBatch<E::O, E::A>) -> burn_irl::Result<Vec<f64>> {
        let disc = self.discriminator_batch(batch);
        let reward = self
            .reward_net
            .reward_train(disc.before, disc.action, disc.after)
            .detach()
            - disc.log_policy.mul_scalar(self.cfg.entropy_weight);
        reward
            .into_data()
            .convert::<f64>()
            .to_vec::<f64>()
            .map_err(|err| IrlError::Tensor(format!("{err:?}")))
    }

    /// Runs the generator for `n_steps` timesteps (default
    /// `gen_timesteps_per_epoch`) against the learned reward. Returns the mean
    /// policy loss over the updates.
    pub fn train_gen(&mut self, n_steps: Option<usize>) -> burn_irl::Result<f64> {
        let n_steps = n_steps.unwrap_or(self.cfg.gen_timesteps_per_epoch);
        let batch_size = self.agent.config().batch_size;
        let mut losses = Vec::new();
        let mut remaining = n_steps;
        while remaining > 0 {
            let chunk = remaining.min(batch_size);
            let batch = self.agent.collect(chunk)?;
            let rewards = self.generator_rewards(&batch)?;
            let batch = batch.with_rewards(rewards)?;
            self.memory.append(batch.transitions().collect());
            losses.push(self.agent.update(&batch)?);
            self.gen_timesteps += chunk;
            remaining -= chunk;
        }
        let loss = losses.iter().sum::<f64>() / losses.len().max(1) as f64;
        tracing::debug!(n_steps, loss, total_timesteps = self.gen_timesteps, "generator steps");
        Ok(loss)
    }

    /// Alternates a discriminator phase and a generator phase `n_epochs` times.
    pub fn train(&mut self, n_epochs: usize) -> burn_irl::Result<Vec<EpochStats>> {
        let mut stats = Vec::with_capacity(n_epochs);
        for _ in tqdm(0..n_epochs) {
            if self.memory.is_empty() {
                let warmup = self.agent.collect(self.cfg.gen_timesteps_per_epoch)?;
                self.memory.append(warmup.transitions().collect());
            }
            let expert = self.expert.sample(&mut self.rng, self.cfg.disc_batch_size);
            let generated = TransitionBatch::from_transitions(
                self.memory.sample_random_batch(self.cfg.disc_batch_size),
            );

            let disc_loss = self.train_disc(&expert, &generated, None)?;
            let disc_accuracy = self.eval_disc_accuracy(&expert, &generated)?;
            let gen_loss = self.train_gen(None)?;

            let epoch = EpochStats {
                epoch: self.epochs,
                disc_loss,
                disc_accuracy,
                gen_loss,
            };
            tracing::info!(
                epoch = epoch.epoch,
                disc_loss,
                disc_accuracy,
                gen_loss,
                "finished AIRL epoch"
            );
            self.epochs += 1;
            stats.push(epoch);
        }
        Ok(stats)
    }

    /// Wraps `env` so that it reports the learned, unshaped reward `g`.
    pub fn wrap_env_test_reward<E2: Environment>(
        &self,
        env: E2,
    ) -> LearnedRewardEnv<B::InnerBackend, E2> {
        LearnedRewardEnv::new(env, self.reward_net.valid(), RewardKind::Test)
    }

    /// Wraps `env` so that it reports the shaped reward `f` the discriminator uses.
    pub fn wrap_env_train_reward<E2: Environment>(
        &self,
        env: E2,
    ) -> LearnedRewardEnv<B::InnerBackend, E2> {
        LearnedRewardEnv::new(env, self.reward_net.valid(), RewardKind::Train)
    }
}
