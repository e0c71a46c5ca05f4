use std::sync::mpsc;
use std::thread;

use pilot_logging::{excerpt, pilot_info, pilot_warn};
use postpilot_core::{Effect, ErrorKind, Headline, Msg, Operation, Platform, PostReceipt, WorkflowError};
use postpilot_engine::{
    Article, Backends, EngineCommand, EngineEvent, EngineHandle, ErrorClass, Receipt, ServiceError,
    Target,
};

/// Executes core effects on the engine and feeds completions back as `Msg`s.
pub struct EffectRunner {
    engine: EngineHandle,
    board: String,
}

impl EffectRunner {
    pub fn new(backends: Backends, board: impl Into<String>, msg_tx: mpsc::Sender<Msg>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        let engine = EngineHandle::with_sink(backends, event_tx);
        spawn_event_loop(event_rx, msg_tx);
        Self {
            engine,
            board: board.into(),
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            let command = command_for(effect, &self.board);
            match &command {
                EngineCommand::Generate { prompt } => {
                    pilot_info!("Generate prompt_chars={} prompt={}", prompt.chars().count(), excerpt(prompt));
                }
                EngineCommand::Refine { target, text } => {
                    pilot_info!("Refine target={} draft_chars={}", target, text.chars().count());
                }
                EngineCommand::PostMicroblog { text } => {
                    pilot_info!("Post target=X chars={}", text.chars().count());
                }
                EngineCommand::PostForum { title, board, .. } => {
                    pilot_info!("Post target=Reddit board={} title_chars={}", board, title.chars().count());
                }
                EngineCommand::FetchHeadlines { limit } => {
                    pilot_info!("FetchHeadlines limit={}", limit);
                }
            }
            self.engine.submit(command);
        }
    }
}

fn spawn_event_loop(event_rx: mpsc::Receiver<EngineEvent>, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Ok(event) = event_rx.recv() {
            if msg_tx.send(msg_for(event)).is_err() {
                break;
            }
        }
    });
}

pub fn target_for(platform: Platform) -> Target {
    match platform {
        Platform::Microblog => Target::Microblog,
        Platform::Forum => Target::Forum,
    }
}

pub fn platform_for(target: Target) -> Platform {
    match target {
        Target::Microblog => Platform::Microblog,
        Target::Forum => Platform::Forum,
    }
}

/// Engine command for one effect. The forum takes the refined text as its
/// title and the source draft as its body.
pub fn command_for(effect: Effect, board: &str) -> EngineCommand {
    match effect {
        Effect::Generate { prompt } => EngineCommand::Generate { prompt },
        Effect::Refine { platform, draft } => EngineCommand::Refine {
            target: target_for(platform),
            text: draft,
        },
        Effect::Post {
            platform: Platform::Microblog,
            text,
            ..
        } => EngineCommand::PostMicroblog { text },
        Effect::Post {
            platform: Platform::Forum,
            text,
            body,
        } => EngineCommand::PostForum {
            title: text,
            body,
            board: board.to_string(),
        },
        Effect::FetchHeadlines { limit } => EngineCommand::FetchHeadlines { limit },
    }
}

pub fn msg_for(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Generated(result) => {
            Msg::DraftGenerated(result.map_err(|err| workflow_error(Operation::Generate, err)))
        }
        EngineEvent::Refined { target, result } => Msg::RefineDone {
            platform: platform_for(target),
            result: result.map_err(|err| workflow_error(Operation::Refine, err)),
        },
        EngineEvent::Posted { target, result } => Msg::PostDone {
            platform: platform_for(target),
            result: result
                .map(post_receipt)
                .map_err(|err| workflow_error(Operation::Post, err)),
        },
        EngineEvent::HeadlinesFetched(result) => Msg::HeadlinesLoaded(
            result
                .map(|articles| articles.into_iter().map(headline).collect())
                .map_err(|err| workflow_error(Operation::FetchHeadlines, err)),
        ),
    }
}

pub fn workflow_error(operation: Operation, err: ServiceError) -> WorkflowError {
    let kind = match err.class() {
        ErrorClass::Config => ErrorKind::Config,
        ErrorClass::Auth => ErrorKind::Auth,
        ErrorClass::Backend => ErrorKind::Backend,
    };
    pilot_warn!("{} failed ({}): {}", operation, kind, err);
    WorkflowError::new(operation, kind, err.to_string())
}

pub fn post_receipt(receipt: Receipt) -> PostReceipt {
    PostReceipt {
        id: receipt.id,
        permalink: receipt.permalink,
    }
}

pub fn headline(article: Article) -> Headline {
    Headline {
        title: article.title,
        summary: article.summary,
        url: article.url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn forum_post_uses_board_and_source_draft() {
        let command = command_for(
            Effect::Post {
                platform: Platform::Forum,
                text: "Refined title #rust".to_string(),
                body: "Original draft".to_string(),
            },
            "rust",
        );
        assert_eq!(
            command,
            EngineCommand::PostForum {
                title: "Refined title #rust".to_string(),
                body: "Original draft".to_string(),
                board: "rust".to_string(),
            }
        );
    }

    #[test]
    fn microblog_post_ignores_body() {
        let command = command_for(
            Effect::Post {
                platform: Platform::Microblog,
                text: "Short".to_string(),
                body: "Long draft".to_string(),
            },
            "test",
        );
        assert_eq!(
            command,
            EngineCommand::PostMicroblog {
                text: "Short".to_string()
            }
        );
    }

    #[test]
    fn refine_limits_match_posting_ceilings() {
        for platform in Platform::ALL {
            let target = target_for(platform);
            assert_eq!(target.char_limit(), platform.ceiling(), "{platform}");
            assert_eq!(platform_for(target), platform);
        }
    }

    #[test]
    fn service_errors_keep_their_class() {
        let cases = [
            (
                ServiceError::MissingCredential {
                    name: "X_ACCESS_TOKEN",
                },
                ErrorKind::Config,
            ),
            (
                ServiceError::Unauthorized {
                    service: "X",
                    message: "expired".to_string(),
                },
                ErrorKind::Auth,
            ),
            (ServiceError::Timeout { service: "X" }, ErrorKind::Backend),
        ];
        for (err, kind) in cases {
            let msg = msg_for(EngineEvent::Posted {
                target: Target::Microblog,
                result: Err(err.clone()),
            });
            assert_eq!(
                msg,
                Msg::PostDone {
                    platform: Platform::Microblog,
                    result: Err(WorkflowError::new(Operation::Post, kind, err.to_string())),
                }
            );
        }
    }

    #[test]
    fn articles_become_headlines() {
        let msg = msg_for(EngineEvent::HeadlinesFetched(Ok(vec![Article {
            title: "Title".to_string(),
            summary: Some("Summary".to_string()),
            url: "https://example.com".to_string(),
        }])));
        assert_eq!(
            msg,
            Msg::HeadlinesLoaded(Ok(vec![Headline {
                title: "Title".to_string(),
                summary: Some("Summary".to_string()),
                url: "https://example.com".to_string(),
            }]))
        );
    }
}
