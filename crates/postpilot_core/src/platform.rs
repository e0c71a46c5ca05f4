use std::fmt;
use std::str::FromStr;

use crate::{ErrorKind, Operation, WorkflowError};

/// Maximum characters accepted by the microblog for a single post.
pub const MICROBLOG_CEILING: usize = 280;
/// Maximum characters accepted by the forum for a post title.
pub const FORUM_TITLE_CEILING: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Platform {
    Microblog,
    Forum,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Microblog, Platform::Forum];

    pub const fn ceiling(self) -> usize {
        match self {
            Platform::Microblog => MICROBLOG_CEILING,
            Platform::Forum => FORUM_TITLE_CEILING,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Platform::Microblog => "X",
            Platform::Forum => "Reddit",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown platform '{}' (expected x or reddit)", self.0)
    }
}

impl std::error::Error for UnknownPlatform {}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "x" | "twitter" | "microblog" => Ok(Platform::Microblog),
            "reddit" | "forum" => Ok(Platform::Forum),
            _ => Err(UnknownPlatform(raw.trim().to_string())),
        }
    }
}

/// Character count as the platforms see it: Unicode scalar values, not bytes.
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Checks that `text` may be posted to `platform`: non-blank and within the
/// platform ceiling.
pub fn validate_post(text: &str, platform: Platform) -> Result<(), WorkflowError> {
    if text.trim().is_empty() {
        return Err(WorkflowError::new(
            Operation::Post,
            ErrorKind::Validation,
            format!("The {platform} post is empty."),
        ));
    }
    let count = char_count(text);
    if count > platform.ceiling() {
        return Err(WorkflowError::new(
            Operation::Post,
            ErrorKind::Validation,
            format!(
                "The {platform} post exceeds limit ({count} / {}).",
                platform.ceiling()
            ),
        ));
    }
    Ok(())
}
