use std::fmt;

use crate::ServiceError;

/// Platform a piece of text is written for or posted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Microblog,
    Forum,
}

impl Target {
    /// Character ceiling the refinement prompt asks the model to respect.
    pub const fn char_limit(self) -> usize {
        match self {
            Target::Microblog => 280,
            Target::Forum => 300,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Microblog => write!(f, "X"),
            Target::Forum => write!(f, "Reddit"),
        }
    }
}

/// Confirmation data returned by a posting backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Receipt {
    pub id: Option<String>,
    pub permalink: Option<String>,
    /// Text as stored by the platform, when it echoes it back.
    pub text: Option<String>,
}

/// One feed entry usable as a draft seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub summary: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Generate { prompt: String },
    Refine { target: Target, text: String },
    PostMicroblog { text: String },
    PostForum {
        title: String,
        body: String,
        board: String,
    },
    FetchHeadlines { limit: usize },
}

impl EngineCommand {
    /// Name of the service the command calls, as used in error messages.
    pub fn service(&self) -> &'static str {
        match self {
            EngineCommand::Generate { .. } | EngineCommand::Refine { .. } => crate::generate::SERVICE,
            EngineCommand::PostMicroblog { .. } => crate::microblog::SERVICE,
            EngineCommand::PostForum { .. } => crate::forum::SERVICE,
            EngineCommand::FetchHeadlines { .. } => crate::headlines::SERVICE,
        }
    }

    /// The completion event reporting `error` for this command.
    pub fn failed(&self, error: ServiceError) -> EngineEvent {
        match self {
            EngineCommand::Generate { .. } => EngineEvent::Generated(Err(error)),
            EngineCommand::Refine { target, .. } => EngineEvent::Refined {
                target: *target,
                result: Err(error),
            },
            EngineCommand::PostMicroblog { .. } => EngineEvent::Posted {
                target: Target::Microblog,
                result: Err(error),
            },
            EngineCommand::PostForum { .. } => EngineEvent::Posted {
                target: Target::Forum,
                result: Err(error),
            },
            EngineCommand::FetchHeadlines { .. } => EngineEvent::HeadlinesFetched(Err(error)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Generated(Result<String, ServiceError>),
    Refined {
        target: Target,
        result: Result<String, ServiceError>,
    },
    Posted {
        target: Target,
        result: Result<Receipt, ServiceError>,
    },
    HeadlinesFetched(Result<Vec<Article>, ServiceError>),
}
