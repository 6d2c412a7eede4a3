//! Command handlers.

pub mod analyze;
pub mod config;
