pub mod data;
pub mod environment;
pub mod error;
pub mod logging;
pub mod module;
pub mod objective;

pub use error::{IrlError, Result};
