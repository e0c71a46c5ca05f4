use std::fmt;

/// Recoverability class of a workflow failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required credential was not configured.
    Config,
    /// Empty input or content over a platform ceiling; no backend was called.
    Validation,
    /// Network or API failure from a backend.
    Backend,
    /// A backend rejected the configured credential.
    Auth,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Config => write!(f, "configuration error"),
            ErrorKind::Validation => write!(f, "validation error"),
            ErrorKind::Backend => write!(f, "backend error"),
            ErrorKind::Auth => write!(f, "authentication error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Generate,
    Refine,
    Post,
    FetchHeadlines,
}

impl Operation {
    /// Title used for the error notification of a failed operation.
    pub const fn failure_title(self) -> &'static str {
        match self {
            Operation::Generate => "AI Draft Failed",
            Operation::Refine => "AI Refinement Failed",
            Operation::Post => "Posting Failed",
            Operation::FetchHeadlines => "Headline Fetch Failed",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Generate => write!(f, "generate"),
            Operation::Refine => write!(f, "refine"),
            Operation::Post => write!(f, "post"),
            Operation::FetchHeadlines => write!(f, "fetch headlines"),
        }
    }
}

/// Failure of a workflow operation. A generation, refinement, or posting
/// error is a `WorkflowError` whose `operation` says which one it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowError {
    pub operation: Operation,
    pub kind: ErrorKind,
    pub message: String,
}

impl WorkflowError {
    pub fn new(operation: Operation, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
        }
    }

    pub fn validation(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, ErrorKind::Validation, message)
    }

    /// True when the failure happened before any backend was contacted.
    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }

    /// Retrying with the same inputs and credentials may succeed.
    pub fn is_transient(&self) -> bool {
        self.kind == ErrorKind::Backend
    }
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed ({}): {}", self.operation, self.kind, self.message)
    }
}

impl std::error::Error for WorkflowError {}
