//! Non-interactive generate -> post to every platform, used by the
//! `run-once` command and by each scheduled run.

use std::fmt::Write as _;
use std::process::ExitCode;

use pilot_logging::{excerpt, pilot_error, pilot_info, pilot_warn};
use postpilot_core::{validate_post, Operation, Platform, PostReceipt, WorkflowError};
use postpilot_engine::Backends;

use super::effects::{post_receipt, workflow_error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub generated: Result<String, WorkflowError>,
    /// One entry per platform, in `Platform::ALL` order. Empty when
    /// generation failed.
    pub posts: Vec<(Platform, Result<PostReceipt, WorkflowError>)>,
}

impl RunReport {
    pub fn succeeded(&self) -> bool {
        self.generated.is_ok()
            && !self.posts.is_empty()
            && self.posts.iter().all(|(_, result)| result.is_ok())
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        match &self.generated {
            Ok(text) => {
                let _ = writeln!(out, "Generated ({} chars):\n{}", text.chars().count(), text);
            }
            Err(err) => {
                let _ = writeln!(out, "{}: {}", err.operation.failure_title(), err.message);
            }
        }
        for (platform, result) in &self.posts {
            let _ = match result {
                Ok(receipt) => writeln!(
                    out,
                    "{platform}: posted {}",
                    receipt.permalink.as_deref().unwrap_or("(no link)")
                ),
                Err(err) => writeln!(out, "{platform}: failed ({}) {}", err.kind, err.message),
            };
        }
        out
    }

    fn log(&self) {
        let failed: Vec<String> = self
            .posts
            .iter()
            .filter(|(_, result)| result.is_err())
            .map(|(platform, _)| platform.to_string())
            .collect();
        match (&self.generated, failed.is_empty()) {
            (Err(err), _) => pilot_error!("Run aborted, nothing posted: {}", err),
            (Ok(_), true) => pilot_info!("Run succeeded on all platforms"),
            (Ok(_), false) => pilot_warn!("Run finished with failures on {}", failed.join(", ")),
        }
    }
}

/// Generates a post from `prompt` and publishes it everywhere. The forum
/// gets the text as both title and body. Each platform is checked against
/// its ceiling before its backend is called; one platform failing does not
/// stop the other.
pub async fn run_once(backends: &Backends, prompt: &str, board: &str) -> RunReport {
    pilot_info!("Run started with prompt {}", excerpt(prompt));

    let generated = if prompt.trim().is_empty() {
        Err(WorkflowError::validation(
            Operation::Generate,
            "Prompt cannot be empty.",
        ))
    } else {
        backends
            .generator
            .generate(prompt)
            .await
            .map_err(|err| workflow_error(Operation::Generate, err))
    };

    let text = match generated {
        Ok(text) => text,
        Err(err) => {
            let report = RunReport {
                generated: Err(err),
                posts: Vec::new(),
            };
            report.log();
            return report;
        }
    };
    pilot_info!("Generated content: {}", excerpt(&text));

    let microblog = async {
        validate_post(&text, Platform::Microblog)?;
        backends
            .microblog
            .post(&text)
            .await
            .map(post_receipt)
            .map_err(|err| workflow_error(Operation::Post, err))
    };
    let forum = async {
        validate_post(&text, Platform::Forum)?;
        backends
            .forum
            .post(&text, &text, board)
            .await
            .map(post_receipt)
            .map_err(|err| workflow_error(Operation::Post, err))
    };
    let (microblog, forum) = tokio::join!(microblog, forum);

    let report = RunReport {
        generated: Ok(text.clone()),
        posts: vec![(Platform::Microblog, microblog), (Platform::Forum, forum)],
    };
    report.log();
    report
}
