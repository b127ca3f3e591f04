use burn::{
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use burn_irl::{
    data::{
        batch::{action_indices, TransitionBatch},
        util::collect_single,
    },
    environment::{Discrete, Environment, Space},
    module::{
        component::{Actor, StochasticActor},
        policy::{CategoricalPolicy, CategoricalPolicyConfig},
    },
    objective::policy_gradient::{normalize, policy_gradient_loss, reward_to_go},
    IrlError,
};
use rand::{rngs::StdRng, SeedableRng};

#[derive(Config, Debug)]
pub struct PolicyGradientConfig {
    #[config(default = "vec![32, 32]")]
    pub hidden_sizes: Vec<usize>,
    #[config(default = 1e-2)]
    pub learning_rate: f64,
    #[config(default = 0.99)]
    pub discount_factor: f64,
    #[config(default = 0.01)]
    pub entropy_coefficient: f64,
    /// Environment steps collected per gradient update.
    #[config(default = 256)]
    pub batch_size: usize,
    #[config(default = 0)]
    pub seed: u64,
}

impl PolicyGradientConfig {
    pub fn init<B, E>(&self, env: E, device: &B::Device) -> burn_irl::Result<PolicyGradientAgent<B, E>>
    where
        B: AutodiffBackend,
        E: Environment,
        E::A: Discrete,
    {
        let policy = CategoricalPolicyConfig::new()
            .with_hidden_sizes(self.hidden_sizes.clone())
            .init(<E::O>::dim(), <E::A>::n(), device)?;
        self.init_with_policy(env, policy)
    }

    /// Builds an agent around an existing policy, e.g. a loaded expert.
    pub fn init_with_policy<B, E>(
        &self,
        env: E,
        policy: CategoricalPolicy<B>,
    ) -> burn_irl::Result<PolicyGradientAgent<B, E>>
    where
        B: AutodiffBackend,
        E: Environment,
        E::A: Discrete,
    {
        self.assertions()?;
        let device = policy.devices()[0].clone();
        Ok(PolicyGradientAgent {
            cfg: self.clone(),
            policy,
            optim: AdamConfig::new().init(),
            env,
            observation: None,
            rng: StdRng::seed_from_u64(self.seed),
            device,
            timesteps: 0,
        })
    }

    fn assertions(&self) -> burn_irl::Result<()> {
        if self.batch_size == 0 {
            return Err(IrlError::Config("batch_size must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(IrlError::Config(format!(
                "The discount factor should be in the interval [0,1]. got {}",
                self.discount_factor
            )));
        }
        Ok(())
    }
}

/// On-policy REINFORCE learner bound to one environment.
pub struct PolicyGradientAgent<B: AutodiffBackend, E: Environment> {
    cfg: PolicyGradientConfig,
    policy: CategoricalPolicy<B>,
    optim: OptimizerAdaptor<Adam, CategoricalPolicy<B>, B>,
    env: E,
    observation: Option<E::O>,
    rng: StdRng,
    device: B::Device,
    timesteps: usize,
}

impl<B, E> PolicyGradientAgent<B, E>
where
    B: AutodiffBackend,
    E: Environment,
    E::A: Discrete,
{
    pub fn config(&self) -> &PolicyGradientConfig {
        &self.cfg
    }

    pub fn policy(&self) -> &CategoricalPolicy<B> {
        &self.policy
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// Environment steps taken so far, across every bound environment.
    pub fn timesteps(&self) -> usize {
        self.timesteps
    }

    /// Rebinds the agent to `env`, keeping the policy and optimizer state.
    pub fn set_env<E2>(self, env: E2) -> PolicyGradientAgent<B, E2>
    where
        E2: Environment<O = E::O, A = E::A>,
    {
        PolicyGradientAgent {
            cfg: self.cfg,
            policy: self.policy,
            optim: self.optim,
            env,
            observation: None,
            rng: self.rng,
            device: self.device,
            timesteps: self.timesteps,
        }
    }

    /// Samples an action from the current policy.
    pub fn act(&mut self, observation: &E::O) -> burn_irl::Result<E::A> {
        self.policy.sample(observation, &mut self.rng)
    }

    pub fn greedy(&self, observation: &E::O) -> burn_irl::Result<E::A> {
        self.policy.greedy(observation)
    }

    /// Steps the bound environment with the current policy, continuing the
    /// episode left open by the previous call.
    pub fn collect(&mut self, n_steps: usize) -> burn_irl::Result<TransitionBatch<E::O, E::A>> {
        let mut transitions = Vec::with_capacity(n_steps);
        for _ in 0..n_steps {
            let before = match self.observation.take() {
                Some(observation) => observation,
                None => self.env.reset(None),
            };
            let action = self.act(&before)?;
            let transition = collect_single(&mut self.env, Some(before), &mut |_| action.clone());
            self.observation = (!transition.done).then(|| transition.after.clone());
            self.timesteps += 1;
            transitions.push(transition);
        }
        Ok(TransitionBatch::from_transitions(transitions))
    }

    /// Total environment reward of `n_episodes` complete episodes in `env`,
    /// sampling actions from the current policy.
    pub fn evaluate<E2>(&mut self, env: &mut E2, n_episodes: usize) -> burn_irl::Result<f64>
    where
        E2: Environment<O = E::O, A = E::A>,
    {
        let mut total = 0.0;
        for _ in 0..n_episodes {
            let mut observation = env.reset(None);
            loop {
                let (after, reward, done) = env.step(self.act(&observation)?);
                total += reward;
                if done {
                    break;
                }
                observation = after;
            }
        }
        tracing::debug!(env = env.id(), n_episodes, total, "evaluated agent");
        Ok(total)
    }

    /// Log-probability of each action in `batch` under the current policy.
    pub fn log_prob(&self, batch: &TransitionBatch<E::O, E::A>) -> Tensor<B, 1> {
        self.policy.log_prob_batch(
            batch.before_tensor(&self.device),
            action_indices(batch.action(), &self.device),
        )
    }

    /// One policy-gradient step on `batch`, using its reward channel.
    pub fn update(&mut self, batch: &TransitionBatch<E::O, E::A>) -> burn_irl::Result<f64> {
        if batch.is_empty() {
            return Err(IrlError::EmptyBatch("policy"));
        }

        let returns = reward_to_go(batch.reward(), batch.done(), self.cfg.discount_factor);
        let advantages: Vec<f32> = normalize(&returns).into_iter().map(|x| x as f32).collect();
        let advantages =
            Tensor::<B, 1>::from_data(TensorData::new(advantages, [batch.len()]), &self.device);

        let observations = batch.before_tensor::<B>(&self.device);
        let log_prob = self
            .policy
            .log_prob_batch(observations.clone(), action_indices(batch.action(), &self.device));
        let entropy = self.policy.entropy_batch(observations);
        let loss = policy_gradient_loss(log_prob, advantages, entropy, self.cfg.entropy_coefficient);
        let loss_value = loss.clone().into_scalar().elem::<f64>();

        let grads = GradientsParams::from_grads(loss.backward(), &self.policy);
        self.policy = self
            .optim
            .step(self.cfg.learning_rate, self.policy.clone(), grads);
        Ok(loss_value)
    }

    /// Trains on the bound environment's own reward for `n_steps` timesteps.
    pub fn learn(&mut self, n_steps: usize) -> burn_irl::Result<()> {
        let mut remaining = n_steps;
        while remaining > 0 {
            let chunk = remaining.min(self.cfg.batch_size);
            let batch = self.collect(chunk)?;
            let loss = self.update(&batch)?;
            tracing::debug!(
                env = self.env.id(),
                timesteps = self.timesteps,
                loss,
                mean_reward = batch.reward().iter().sum::<f64>() / chunk as f64,
                "policy update"
            );
            remaining -= chunk;
        }
        Ok(())
    }
}

impl<B, E> Actor for PolicyGradientAgent<B, E>
where
    B: AutodiffBackend,
    E: Environment,
    E::A: Discrete,
{
    type A = E::A;

    type O = E::O;

    fn a(&mut self, observation: &Self::O) -> burn_irl::Result<Self::A> {
        self.act(observation)
    }
}
