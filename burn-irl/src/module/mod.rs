pub mod component;
pub mod nn;
pub mod policy;
pub mod reward_net;
