//! Library side of the `arbor` binary: configuration and command implementations.

pub mod commands;
pub mod config;

pub use config::{ArborConfig, RunConfig};
