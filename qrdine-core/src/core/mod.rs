//! Engine configuration, errors and shared state

mod config;
mod error;
mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::CoreState;
