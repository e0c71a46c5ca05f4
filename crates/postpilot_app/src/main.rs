mod platform;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = platform::Cli::parse();
    match platform::run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("postpilot: {err:#}");
            ExitCode::FAILURE
        }
    }
}
