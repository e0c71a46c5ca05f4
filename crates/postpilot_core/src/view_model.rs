use crate::{Headline, Notice, Platform, PostReceipt, StatusEntry, WorkflowError, WorkflowState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub workflow: WorkflowState,
    pub prompt: String,
    pub draft: String,
    pub draft_chars: usize,
    /// One row per platform, in `Platform::ALL` order.
    pub refined: Vec<RefinedView>,
    pub can_generate: bool,
    pub can_refine: bool,
    /// Platforms whose refined text passes the posting gate right now.
    pub postable: Vec<Platform>,
    pub headlines: Vec<Headline>,
    pub status: Vec<StatusEntry>,
    pub notice: Option<Notice>,
    /// Per-platform outcomes of the most recent post action.
    pub post_report: Vec<PostOutcomeView>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn refined_for(&self, platform: Platform) -> Option<&RefinedView> {
        self.refined.iter().find(|row| row.platform == platform)
    }

    /// True only if every target is postable; an empty target list is not.
    pub fn can_post(&self, targets: &[Platform]) -> bool {
        !targets.is_empty() && targets.iter().all(|t| self.postable.contains(t))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinedView {
    pub platform: Platform,
    pub text: Option<String>,
    pub chars: usize,
    pub ceiling: usize,
    pub within_limit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostOutcomeView {
    pub platform: Platform,
    pub result: Result<PostReceipt, WorkflowError>,
}
