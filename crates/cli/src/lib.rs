//! Configurator CLI
//!
//! Loads a catalog snapshot, evaluates configuration requests against it and
//! checks catalogs for structural problems.

pub mod commands;
pub mod config;
pub mod error;
pub mod observability;

pub use config::Cli;
pub use error::CliError;
