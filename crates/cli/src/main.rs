//! Configurator CLI

use std::{io, process::ExitCode};

use configurator_cli::{Cli, observability};
use tracing::error;

fn main() -> ExitCode {
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version output also arrive here, with a zero exit code
            _ = err.print();

            return ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(2));
        }
    };

    if let Err(err) = observability::init(&cli.logging) {
        report(&err);

        return ExitCode::FAILURE;
    }

    match cli.run(io::stdin().lock(), io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "command failed");
            report(&err);

            ExitCode::FAILURE
        }
    }
}

#[expect(clippy::print_stderr, reason = "last-resort error output for the CLI")]
fn report(err: &dyn std::error::Error) {
    eprintln!("error: {err}");
}
