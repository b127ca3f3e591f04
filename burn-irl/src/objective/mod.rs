pub mod discriminator;
pub mod policy_gradient;
