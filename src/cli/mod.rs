//! CLI module for the openapi-migrate binary

pub mod commands;
pub mod error;

pub use error::CliError;
