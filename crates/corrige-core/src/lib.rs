pub mod config;
pub mod correction;
pub mod criteria;
pub mod error;
pub mod export;
pub mod io;
pub mod paths;
pub mod progress;
pub mod prompt;
pub mod submission;
pub mod tracking;
pub mod types;

pub use error::{CorrigeError, Result};
