use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use pilot_logging::{excerpt, pilot_info, pilot_warn};

#[derive(Debug, Clone)]
pub enum Cadence {
    Every(Duration),
    Cron(cron::Schedule),
}

impl Cadence {
    pub fn every_minutes(minutes: u64) -> anyhow::Result<Self> {
        if minutes == 0 {
            bail!("--every must be at least 1 minute");
        }
        let Some(secs) = minutes.checked_mul(60) else {
            bail!("interval of {minutes} minutes is too large");
        };
        Ok(Cadence::Every(Duration::from_secs(secs)))
    }

    /// Accepts 5-field crontab syntax as well as the 6/7-field form with
    /// seconds.
    pub fn cron(expr: &str) -> anyhow::Result<Self> {
        let normalized = normalize_cron_expr(expr);
        let schedule = cron::Schedule::from_str(&normalized)
            .with_context(|| format!("invalid cron expression '{expr}'"))?;
        Ok(Cadence::Cron(schedule))
    }
}

fn normalize_cron_expr(expr: &str) -> String {
    let expr = expr.trim();
    if expr.split_whitespace().count() == 5 {
        format!("0 {expr}")
    } else {
        expr.to_string()
    }
}

/// Fires a job on a cadence until `max_runs` is reached or the process is
/// interrupted.
#[derive(Debug, Clone)]
pub struct PeriodicTrigger {
    cadence: Cadence,
    max_runs: Option<u32>,
}

impl PeriodicTrigger {
    pub fn new(cadence: Cadence, max_runs: Option<u32>) -> Self {
        Self { cadence, max_runs }
    }

    /// Time to wait from `now` until the next run. `None` when the cron
    /// schedule has no future occurrence.
    pub fn next_delay(&self, now: DateTime<Utc>) -> Option<Duration> {
        match &self.cadence {
            Cadence::Every(interval) => Some(*interval),
            Cadence::Cron(schedule) => {
                let next = schedule.after(&now).next()?;
                (next - now).to_std().ok()
            }
        }
    }

    fn exhausted(&self, runs: u32) -> bool {
        self.max_runs.is_some_and(|max| runs >= max)
    }

    /// Waits for each occurrence and runs `job` with the next prompt.
    /// Returns the number of runs performed.
    pub async fn run<F, Fut>(&self, mut rotation: PromptRotation, mut job: F) -> u32
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = bool>,
    {
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let mut runs = 0;
        let mut failures = 0;
        while !self.exhausted(runs) {
            let Some(delay) = self.next_delay(Utc::now()) else {
                pilot_warn!("Schedule has no further occurrences; stopping");
                break;
            };
            pilot_info!("Next run in {}s", delay.as_secs());

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = &mut shutdown => {
                    pilot_info!("Interrupted; stopping scheduler");
                    break;
                }
            }

            let prompt = rotation.next_prompt().to_string();
            pilot_info!("Scheduled run {} with prompt {}", runs + 1, excerpt(&prompt));
            if !job(prompt).await {
                failures += 1;
            }
            runs += 1;
        }
        pilot_info!("Scheduler finished: {} run(s), {} with failures", runs, failures);
        runs
    }
}

/// Round-robin over a fixed, non-empty list of prompts.
#[derive(Debug, Clone)]
pub struct PromptRotation {
    prompts: Vec<String>,
    next: usize,
}

impl PromptRotation {
    pub fn new(prompts: Vec<String>) -> anyhow::Result<Self> {
        if prompts.is_empty() {
            bail!("no prompts configured to schedule");
        }
        Ok(Self { prompts, next: 0 })
    }

    pub fn next_prompt(&mut self) -> &str {
        let index = self.next;
        self.next = (self.next + 1) % self.prompts.len();
        &self.prompts[index]
    }
}
