use burn::backend::{Autodiff, NdArray};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::Device;
use burn::tensor::Distribution;
use burn::{prelude::Backend, tensor::Tensor};
use burn_irl::{
    module::reward_net::{RewardNet, RewardNetConfig},
    objective::discriminator::{DiscriminatorBatch, DiscriminatorLoss},
};
use criterion::{criterion_group, criterion_main, Criterion};

fn prepare_discriminator_data<B: Backend>(
    device: &Device<B>,
    batch_size: usize,
) -> DiscriminatorBatch<B> {
    DiscriminatorBatch {
        before: Tensor::random([batch_size, 4], Distribution::Default, device),
        action: Tensor::random([batch_size, 2], Distribution::Default, device),
        after: Tensor::random([batch_size, 4], Distribution::Default, device),
        log_policy: Tensor::random([batch_size], Distribution::Uniform(-1.0, 0.0), device),
    }
}

fn discriminator_fn<B: AutodiffBackend>(
    loss: &DiscriminatorLoss,
    model: &RewardNet<B>,
    expert: &DiscriminatorBatch<B>,
    generated: &DiscriminatorBatch<B>,
) {
    let _ = loss.forward(model, expert, generated).backward();
}

pub fn discriminator_benchmark(c: &mut Criterion) {
    type B = Autodiff<NdArray>;
    let device: &Device<B> = &Default::default();
    let loss = DiscriminatorLoss;
    let model = RewardNetConfig::new()
        .init::<B>(4, 2, device)
        .expect("valid reward net config");

    for batch_size in [32, 256] {
        let expert = prepare_discriminator_data(device, batch_size);
        let generated = prepare_discriminator_data(device, batch_size);
        c.bench_function(&format!("airl discriminator ndarray {batch_size}"), |b| {
            b.iter(|| discriminator_fn(&loss, &model, &expert, &generated))
        });
    }
}

criterion_group!(benches, discriminator_benchmark);
criterion_main!(benches);
