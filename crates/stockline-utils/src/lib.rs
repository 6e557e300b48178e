//! Shared utilities for stockline
//!
//! This crate provides common functionality used across the stockline workspace:
//! tracing setup for the webhook server and helpers for reading configuration
//! from the process environment (optionally seeded from a `.env` file).

pub mod config;
pub mod logging;

pub use config::{EnvError, EnvSource, ProcessEnv, load_dotenv};
pub use logging::{LogFormat, init_tracing};
