use crate::{Headline, Platform, PostReceipt, WorkflowError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the prompt box.
    PromptChanged(String),
    /// User edited the draft box.
    DraftChanged(String),
    /// User asked for an AI draft from the current prompt.
    GenerateClicked,
    /// User asked for the draft to be refined for one platform.
    RefineClicked { platform: Platform },
    /// User asked for the refined text to be posted to `targets`.
    PostClicked { targets: Vec<Platform> },
    /// User asked for fresh headlines to seed a draft from.
    FetchHeadlinesClicked { limit: usize },
    /// User picked a fetched headline (0-based) as the new draft.
    HeadlineChosen { index: usize },
    /// User closed the error notification.
    NoticeDismissed,
    /// Backend completion for `Effect::Generate`.
    DraftGenerated(Result<String, WorkflowError>),
    /// Backend completion for `Effect::Refine`.
    RefineDone {
        platform: Platform,
        result: Result<String, WorkflowError>,
    },
    /// Backend completion for one `Effect::Post`.
    PostDone {
        platform: Platform,
        result: Result<PostReceipt, WorkflowError>,
    },
    /// Backend completion for `Effect::FetchHeadlines`.
    HeadlinesLoaded(Result<Vec<Headline>, WorkflowError>),
}
