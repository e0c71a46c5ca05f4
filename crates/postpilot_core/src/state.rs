use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::status::{Clock, StatusLevel, StatusLog};
use crate::view_model::{AppViewModel, PostOutcomeView, RefinedView};
use crate::{char_count, validate_post, ErrorKind, Operation, Platform, WorkflowError};

/// The single in-flight operation marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    Generating,
    Refining,
    Posting,
    FetchingHeadlines,
}

impl WorkflowState {
    pub fn is_idle(self) -> bool {
        self == WorkflowState::Idle
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Generating => "generation",
            WorkflowState::Refining => "refinement",
            WorkflowState::Posting => "posting",
            WorkflowState::FetchingHeadlines => "headline fetch",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
    pub title: String,
    pub summary: Option<String>,
    pub url: String,
}

impl Headline {
    /// Draft text seeded from this headline: title, then the summary if any.
    pub fn as_draft(&self) -> String {
        match self.summary.as_deref().map(str::trim) {
            Some(summary) if !summary.is_empty() => format!("{}\n\n{}", self.title.trim(), summary),
            _ => self.title.trim().to_string(),
        }
    }
}

/// Platform-specific text produced by a successful refine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinedPost {
    pub text: String,
    /// Draft the text was refined from; becomes the forum post body.
    pub source_draft: String,
}

impl RefinedPost {
    pub fn char_count(&self) -> usize {
        char_count(&self.text)
    }
}

/// Confirmation returned by a posting backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostReceipt {
    pub id: Option<String>,
    pub permalink: Option<String>,
}

/// Error notification waiting for the user's attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub kind: ErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    workflow: WorkflowState,
    prompt: String,
    draft: String,
    refined: BTreeMap<Platform, RefinedPost>,
    refine_request: Option<(Platform, String)>,
    pending_posts: BTreeSet<Platform>,
    post_report: BTreeMap<Platform, Result<PostReceipt, WorkflowError>>,
    headlines: Vec<Headline>,
    status: StatusLog,
    notice: Option<Notice>,
    clock: Clock,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            ..Self::default()
        }
    }

    pub fn workflow(&self) -> WorkflowState {
        self.workflow
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn refined(&self, platform: Platform) -> Option<&RefinedPost> {
        self.refined.get(&platform)
    }

    pub fn status(&self) -> &StatusLog {
        &self.status
    }

    pub fn headlines(&self) -> &[Headline] {
        &self.headlines
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Whether the refined text for `platform` may be posted right now.
    pub fn can_post(&self, platform: Platform) -> bool {
        self.workflow.is_idle() && self.check_postable(platform).is_ok()
    }

    pub fn view(&self) -> AppViewModel {
        let refined = Platform::ALL
            .iter()
            .map(|&platform| {
                let post = self.refined.get(&platform);
                let chars = post.map_or(0, RefinedPost::char_count);
                RefinedView {
                    platform,
                    text: post.map(|p| p.text.clone()),
                    chars,
                    ceiling: platform.ceiling(),
                    within_limit: post.is_some() && chars <= platform.ceiling(),
                }
            })
            .collect();

        let postable = Platform::ALL
            .iter()
            .copied()
            .filter(|&platform| self.can_post(platform))
            .collect();

        let post_report = self
            .post_report
            .iter()
            .map(|(&platform, result)| PostOutcomeView {
                platform,
                result: result.clone(),
            })
            .collect();

        AppViewModel {
            workflow: self.workflow,
            prompt: self.prompt.clone(),
            draft: self.draft.clone(),
            draft_chars: char_count(&self.draft),
            refined,
            can_generate: self.workflow.is_idle(),
            can_refine: self.workflow.is_idle(),
            postable,
            headlines: self.headlines.clone(),
            status: self.status.entries().to_vec(),
            notice: self.notice.clone(),
            post_report,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_prompt(&mut self, prompt: String) {
        if self.prompt != prompt {
            self.prompt = prompt;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_draft(&mut self, draft: String) {
        if self.draft != draft {
            self.draft = draft;
            self.mark_dirty();
        }
    }

    pub(crate) fn log(&mut self, level: StatusLevel, text: impl Into<String>) {
        let at = self.clock.now();
        self.status.push(at, level, text);
        self.mark_dirty();
    }

    /// Records a failure: notification plus status entry.
    pub(crate) fn report_error(&mut self, error: &WorkflowError) {
        let title = error.operation.failure_title();
        self.log(
            StatusLevel::Error,
            format!("ERROR: {title} - {}", error.message),
        );
        self.notice = Some(Notice {
            title: title.to_string(),
            message: error.message.clone(),
            kind: error.kind,
        });
    }

    pub(crate) fn dismiss_notice(&mut self) {
        if self.notice.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn enter(&mut self, workflow: WorkflowState) {
        self.workflow = workflow;
        self.mark_dirty();
    }

    pub(crate) fn begin_refine(&mut self, platform: Platform) -> String {
        let draft = self.draft.clone();
        self.refine_request = Some((platform, draft.clone()));
        self.enter(WorkflowState::Refining);
        draft
    }

    /// Drops the refined buffer for `platform`; a new refine was requested.
    pub(crate) fn clear_refined(&mut self, platform: Platform) {
        if self.refined.remove(&platform).is_some() {
            self.mark_dirty();
        }
    }

    /// Takes the outstanding refine request if it matches `platform`.
    pub(crate) fn take_refine_request(&mut self, platform: Platform) -> Option<String> {
        let matches = self
            .refine_request
            .as_ref()
            .is_some_and(|(requested, _)| *requested == platform);
        if matches {
            self.refine_request.take().map(|(_, draft)| draft)
        } else {
            None
        }
    }

    pub(crate) fn store_refined(&mut self, platform: Platform, post: RefinedPost) {
        self.refined.insert(platform, post);
        self.mark_dirty();
    }

    /// The refined post for `platform` if it passes the posting gate.
    pub(crate) fn check_postable(&self, platform: Platform) -> Result<&RefinedPost, WorkflowError> {
        let post = self.refined.get(&platform).ok_or_else(|| {
            WorkflowError::validation(
                Operation::Post,
                format!("There is no refined {platform} post. Refine the draft first."),
            )
        })?;
        validate_post(&post.text, platform)?;
        Ok(post)
    }

    pub(crate) fn begin_posting(&mut self, targets: &BTreeSet<Platform>) {
        self.pending_posts = targets.clone();
        self.post_report.clear();
        self.enter(WorkflowState::Posting);
    }

    /// Platforms whose post result has not arrived yet.
    pub fn pending_posts(&self) -> &BTreeSet<Platform> {
        &self.pending_posts
    }

    pub(crate) fn is_post_pending(&self, platform: Platform) -> bool {
        self.pending_posts.contains(&platform)
    }

    pub(crate) fn record_post(
        &mut self,
        platform: Platform,
        result: Result<PostReceipt, WorkflowError>,
    ) {
        self.pending_posts.remove(&platform);
        self.post_report.insert(platform, result);
        self.mark_dirty();
    }

    pub(crate) fn posts_outstanding(&self) -> bool {
        !self.pending_posts.is_empty()
    }

    pub(crate) fn post_tally(&self) -> (usize, usize) {
        let ok = self.post_report.values().filter(|r| r.is_ok()).count();
        (ok, self.post_report.len() - ok)
    }

    pub(crate) fn set_headlines(&mut self, headlines: Vec<Headline>) {
        self.headlines = headlines;
        self.mark_dirty();
    }
}
