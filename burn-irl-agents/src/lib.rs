pub mod airl;
pub mod expert;
pub mod policy_gradient;
pub mod reward_wrapper;
