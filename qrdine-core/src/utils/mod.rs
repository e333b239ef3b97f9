//! Utilities

pub mod logger;
pub mod validation;
