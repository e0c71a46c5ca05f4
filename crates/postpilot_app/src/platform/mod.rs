mod app;
mod cli;
mod effects;
#[cfg(test)]
mod fakes;
mod input;
mod logging;
mod render;
mod run_once;
mod schedule;
mod settings;

use std::process::ExitCode;

use anyhow::Context;
use pilot_logging::{pilot_info, pilot_warn};
use postpilot_engine::{Backends, EngineConfig};

pub use cli::{Cli, Command};
use logging::LogDestination;
use schedule::{Cadence, PeriodicTrigger, PromptRotation};
use settings::AppSettings;

pub fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let command = cli.command.clone().unwrap_or(Command::Compose);
    let default_log = match command {
        Command::Compose | Command::Headlines { .. } => LogDestination::File,
        Command::RunOnce { .. } | Command::Schedule { .. } => LogDestination::Both,
    };
    logging::initialize(cli.log.map(Into::into).unwrap_or(default_log), cli.verbose);

    if let Err(err) = dotenvy::dotenv() {
        if !err.not_found() {
            pilot_warn!("Could not load .env: {}", err);
        }
    }

    let settings = AppSettings::load(cli.config.as_deref())?;
    let config = settings.engine_config(EngineConfig::from_env());
    let missing = config.credentials.missing();
    if !missing.is_empty() {
        pilot_warn!("Missing credentials: {}", missing.join(", "));
    }
    let backends = Backends::from_config(&config).context("building HTTP clients")?;

    match command {
        Command::Compose => {
            app::run_compose(&settings, backends)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::RunOnce { prompt } => {
            let prompt = match prompt {
                Some(prompt) => prompt,
                None => settings
                    .first_prompt()
                    .context("no --prompt given and no prompts configured")?
                    .to_string(),
            };
            let report = runtime()?.block_on(run_once::run_once(
                &backends,
                &prompt,
                &settings.subreddit,
            ));
            print!("{}", report.summary());
            Ok(report.exit_code())
        }
        Command::Schedule {
            every,
            cron,
            max_runs,
        } => {
            let cadence = match (every, cron) {
                (_, Some(expr)) => Cadence::cron(&expr)?,
                (Some(minutes), None) => Cadence::every_minutes(minutes)?,
                (None, None) => Cadence::every_minutes(settings.interval_minutes)?,
            };
            let rotation = PromptRotation::new(settings.prompts.clone())?;
            let trigger = PeriodicTrigger::new(cadence, max_runs);
            pilot_info!("Scheduler started: {:?}", trigger);

            let board = settings.subreddit.as_str();
            let backends = &backends;
            runtime()?.block_on(trigger.run(rotation, move |prompt| async move {
                let report = run_once::run_once(backends, &prompt, board).await;
                print!("{}", report.summary());
                report.succeeded()
            }));
            Ok(ExitCode::SUCCESS)
        }
        Command::Headlines { limit } => {
            let limit = limit.unwrap_or(settings.headline_limit).max(1);
            let articles = runtime()?
                .block_on(backends.headlines.fetch(limit))
                .context("fetching headlines")?;
            let headlines: Vec<_> = articles.into_iter().map(effects::headline).collect();
            print!("{}", render::headline_list(&headlines));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("starting async runtime")
}
