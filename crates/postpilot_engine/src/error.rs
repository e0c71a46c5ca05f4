use thiserror::Error;

/// Failure of a backend call. Every variant belongs to exactly one of the
/// config / auth / backend classes; see [`ServiceError::class`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("{name} is not set")]
    MissingCredential { name: &'static str },
    #[error("{service} rejected the credentials: {message}")]
    Unauthorized {
        service: &'static str,
        message: String,
    },
    #[error("{service} returned http status {status}: {message}")]
    HttpStatus {
        service: &'static str,
        status: u16,
        message: String,
    },
    #[error("{service} request timed out")]
    Timeout { service: &'static str },
    #[error("{service} network error: {message}")]
    Network {
        service: &'static str,
        message: String,
    },
    #[error("{service} response too large (max {max_bytes} bytes)")]
    TooLarge {
        service: &'static str,
        max_bytes: u64,
    },
    #[error("{service} sent an unreadable response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
    #[error("{service} refused the request: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Config,
    Auth,
    Backend,
}

impl ServiceError {
    pub fn class(&self) -> ErrorClass {
        match self {
            ServiceError::MissingCredential { .. } => ErrorClass::Config,
            ServiceError::Unauthorized { .. } => ErrorClass::Auth,
            ServiceError::HttpStatus { .. }
            | ServiceError::Timeout { .. }
            | ServiceError::Network { .. }
            | ServiceError::TooLarge { .. }
            | ServiceError::Decode { .. }
            | ServiceError::Rejected { .. } => ErrorClass::Backend,
        }
    }
}
