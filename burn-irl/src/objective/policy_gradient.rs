use burn::prelude::*;

/// Discounted return from each step to the end of its episode.
///
/// Episodes are cut after every `done` flag and at the end of the slice.
pub fn reward_to_go(rewards: &[f64], dones: &[bool], discount_factor: f64) -> Vec<f64> {
    let mut returns = vec![0.0; rewards.len()];
    let mut running = 0.0;
    for i in (0..rewards.len()).rev() {
        if dones[i] {
            running = 0.0;
        }
        running = rewards[i] + discount_factor * running;
        returns[i] = running;
    }
    returns
}

/// Shifts to zero mean and, when the spread allows it, scales to unit variance.
pub fn normalize(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    let scale = if std > 1e-8 { std } else { 1.0 };
    values.iter().map(|v| (v - mean) / scale).collect()
}

/// REINFORCE surrogate with an entropy bonus; `advantages` are treated as constants.
pub fn policy_gradient_loss<B: Backend>(
    log_prob: Tensor<B, 1>,
    advantages: Tensor<B, 1>,
    entropy: Tensor<B, 1>,
    entropy_coefficient: f64,
) -> Tensor<B, 1> {
    (log_prob * advantages.detach()).mean().neg() - entropy.mean().mul_scalar(entropy_coefficient)
}
