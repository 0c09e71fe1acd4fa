//! Subcommands

use std::io;

use crate::{
    config::{Cli, Command},
    error::CliError,
};

pub mod check;
pub mod evaluate;

impl Cli {
    /// Run the selected command.
    ///
    /// `input` is read when a command takes `-` as a path.
    ///
    /// # Errors
    ///
    /// Returns a [`CliError`] if the command fails.
    pub fn run(&self, input: impl io::Read, out: impl io::Write) -> Result<(), CliError> {
        match &self.command {
            Command::Evaluate(args) => evaluate::run(args, input, out),
            Command::Check(args) => check::run(args, out),
        }
    }
}
