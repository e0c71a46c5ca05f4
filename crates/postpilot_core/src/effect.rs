use crate::Platform;

/// Backend work requested by [`crate::update`]. Each effect is pending until
/// its completion message comes back through `update`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Completes with `Msg::DraftGenerated`.
    Generate { prompt: String },
    /// Completes with `Msg::RefineDone`.
    Refine { platform: Platform, draft: String },
    /// Completes with `Msg::PostDone`. `body` is the draft the refined text
    /// was derived from; only the forum uses it.
    Post {
        platform: Platform,
        text: String,
        body: String,
    },
    /// Completes with `Msg::HeadlinesLoaded`.
    FetchHeadlines { limit: usize },
}
