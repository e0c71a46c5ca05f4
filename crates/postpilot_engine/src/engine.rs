use std::panic::AssertUnwindSafe;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use futures_util::FutureExt;
use pilot_logging::{excerpt, pilot_debug, pilot_error, pilot_warn};

use crate::forum::{ForumClient, RedditClient};
use crate::generate::{GeminiClient, TextGenerator};
use crate::headlines::{HeadlineSource, RssHeadlineSource};
use crate::microblog::{MicroblogClient, XClient};
use crate::{EngineCommand, EngineConfig, EngineEvent, ServiceError, Target};

/// The four external services the engine talks to.
#[derive(Clone)]
pub struct Backends {
    pub generator: Arc<dyn TextGenerator>,
    pub microblog: Arc<dyn MicroblogClient>,
    pub forum: Arc<dyn ForumClient>,
    pub headlines: Arc<dyn HeadlineSource>,
}

impl Backends {
    /// Production backends. Fails only if an HTTP client cannot be built;
    /// missing credentials are reported per call.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            generator: Arc::new(GeminiClient::new(config)?),
            microblog: Arc::new(XClient::new(config)?),
            forum: Arc::new(RedditClient::new(config)?),
            headlines: Arc::new(RssHeadlineSource::new(config)?),
        })
    }
}

/// Runs backend calls on a background tokio runtime. Commands go in through
/// [`EngineHandle::submit`]; each produces exactly one [`EngineEvent`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Option<mpsc::Receiver<EngineEvent>>,
}

impl EngineHandle {
    pub fn new(backends: Backends) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        let mut handle = Self::with_sink(backends, event_tx);
        handle.event_rx = Some(event_rx);
        handle
    }

    /// Delivers events to `event_tx` instead of the handle's own queue, so a
    /// caller can merge them with other message sources.
    pub fn with_sink(backends: Backends, event_tx: mpsc::Sender<EngineEvent>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    pilot_error!("Engine runtime failed to start: {}", err);
                    // Every command still gets its one event.
                    while let Ok(command) = cmd_rx.recv() {
                        let error = ServiceError::Network {
                            service: command.service(),
                            message: format!("engine runtime unavailable: {err}"),
                        };
                        send_event(&event_tx, command.failed(error));
                    }
                    return;
                }
            };
            while let Ok(command) = cmd_rx.recv() {
                let backends = backends.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event = run_command(&backends, command).await;
                    send_event(&event_tx, event);
                });
            }
            // Let in-flight calls finish before the runtime is dropped.
            runtime.shutdown_timeout(Duration::from_secs(5));
        });

        Self {
            cmd_tx,
            event_rx: None,
        }
    }

    pub fn submit(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            pilot_warn!("Engine is not running; command dropped");
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.as_ref()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.as_ref()?.recv_timeout(timeout).ok()
    }
}

fn send_event(event_tx: &mpsc::Sender<EngineEvent>, event: EngineEvent) {
    if event_tx.send(event).is_err() {
        pilot_debug!("Engine event dropped; receiver is gone");
    }
}

/// Runs one command; a panicking backend is reported as a failed call.
async fn run_command(backends: &Backends, command: EngineCommand) -> EngineEvent {
    let service = command.service();
    let on_panic = command.failed(ServiceError::Rejected {
        service,
        message: "backend call aborted unexpectedly".to_string(),
    });
    match AssertUnwindSafe(handle_command(backends, command))
        .catch_unwind()
        .await
    {
        Ok(event) => event,
        Err(_) => {
            pilot_error!("{} call panicked", service);
            on_panic
        }
    }
}

async fn handle_command(backends: &Backends, command: EngineCommand) -> EngineEvent {
    match command {
        EngineCommand::Generate { prompt } => {
            pilot_debug!("Generating from prompt {}", excerpt(&prompt));
            EngineEvent::Generated(backends.generator.generate(&prompt).await)
        }
        EngineCommand::Refine { target, text } => {
            pilot_debug!("Refining for {}: {}", target, excerpt(&text));
            let result = backends.generator.refine(&text, target).await;
            EngineEvent::Refined { target, result }
        }
        EngineCommand::PostMicroblog { text } => EngineEvent::Posted {
            target: Target::Microblog,
            result: backends.microblog.post(&text).await,
        },
        EngineCommand::PostForum { title, body, board } => EngineEvent::Posted {
            target: Target::Forum,
            result: backends.forum.post(&title, &body, &board).await,
        },
        EngineCommand::FetchHeadlines { limit } => {
            EngineEvent::HeadlinesFetched(backends.headlines.fetch(limit).await)
        }
    }
}
