//! Postpilot core: pure authoring-workflow state machine and view-model helpers.
mod effect;
mod error;
mod msg;
mod platform;
mod state;
mod status;
mod update;
mod view_model;

pub use effect::Effect;
pub use error::{ErrorKind, Operation, WorkflowError};
pub use msg::Msg;
pub use platform::{
    char_count, validate_post, Platform, UnknownPlatform, FORUM_TITLE_CEILING, MICROBLOG_CEILING,
};
pub use state::{AppState, Headline, Notice, PostReceipt, RefinedPost, WorkflowState};
pub use status::{Clock, StatusEntry, StatusLevel, StatusLog};
pub use update::update;
pub use view_model::{AppViewModel, PostOutcomeView, RefinedView};
