use std::collections::BTreeSet;

use crate::status::StatusLevel;
use crate::{
    AppState, Effect, Msg, Operation, Platform, RefinedPost, WorkflowError, WorkflowState,
};

/// Pure update function: applies a message to state and returns any effects.
///
/// Trigger messages only start work from `WorkflowState::Idle`; completion
/// messages always bring the workflow back to Idle.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::PromptChanged(prompt) => {
            state.set_prompt(prompt);
            Vec::new()
        }
        Msg::DraftChanged(draft) => {
            state.set_draft(draft);
            Vec::new()
        }
        Msg::GenerateClicked => {
            if !accept_trigger(&mut state, "generate") {
                return (state, Vec::new());
            }
            if state.prompt().trim().is_empty() {
                state.report_error(&WorkflowError::validation(
                    Operation::Generate,
                    "The prompt is empty. Please enter an idea first.",
                ));
                return (state, Vec::new());
            }
            let prompt = state.prompt().to_string();
            state.enter(WorkflowState::Generating);
            state.log(StatusLevel::Info, "Sending prompt to the AI...");
            vec![Effect::Generate { prompt }]
        }
        Msg::RefineClicked { platform } => {
            if !accept_trigger(&mut state, "refine") {
                return (state, Vec::new());
            }
            // A refine request invalidates the previous result even if it
            // fails validation below.
            state.clear_refined(platform);
            if state.draft().trim().is_empty() {
                state.report_error(&WorkflowError::validation(
                    Operation::Refine,
                    "The draft is empty. Please generate or write content first.",
                ));
                return (state, Vec::new());
            }
            let draft = state.begin_refine(platform);
            state.log(
                StatusLevel::Info,
                format!("Refining draft for {platform}..."),
            );
            vec![Effect::Refine { platform, draft }]
        }
        Msg::PostClicked { targets } => {
            if !accept_trigger(&mut state, "post") {
                return (state, Vec::new());
            }
            let targets: BTreeSet<Platform> = targets.into_iter().collect();
            match plan_posts(&state, &targets) {
                Ok(effects) => {
                    state.begin_posting(&targets);
                    for platform in &targets {
                        state.log(
                            StatusLevel::Info,
                            format!("Sending final post to {platform}..."),
                        );
                    }
                    effects
                }
                Err(error) => {
                    state.report_error(&error);
                    Vec::new()
                }
            }
        }
        Msg::FetchHeadlinesClicked { limit } => {
            if !accept_trigger(&mut state, "headline fetch") {
                return (state, Vec::new());
            }
            let limit = limit.max(1);
            state.enter(WorkflowState::FetchingHeadlines);
            state.log(StatusLevel::Info, format!("Fetching up to {limit} headlines..."));
            vec![Effect::FetchHeadlines { limit }]
        }
        Msg::HeadlineChosen { index } => {
            let draft = state.headlines().get(index).map(|h| h.as_draft());
            match draft {
                Some(draft) => {
                    state.set_draft(draft);
                    state.log(
                        StatusLevel::Info,
                        format!("Draft seeded from headline #{}.", index + 1),
                    );
                }
                None => state.log(
                    StatusLevel::Warning,
                    format!("There is no headline #{}.", index + 1),
                ),
            }
            Vec::new()
        }
        Msg::NoticeDismissed => {
            state.dismiss_notice();
            Vec::new()
        }
        Msg::DraftGenerated(result) => {
            if state.workflow() != WorkflowState::Generating {
                return (state, Vec::new());
            }
            match result {
                Ok(text) => {
                    state.set_draft(text);
                    state.log(StatusLevel::Success, "AI draft generated.");
                }
                Err(error) => state.report_error(&error),
            }
            state.enter(WorkflowState::Idle);
            Vec::new()
        }
        Msg::RefineDone { platform, result } => {
            if state.workflow() != WorkflowState::Refining {
                return (state, Vec::new());
            }
            let Some(source_draft) = state.take_refine_request(platform) else {
                return (state, Vec::new());
            };
            match result {
                Ok(text) => {
                    let post = RefinedPost { text, source_draft };
                    let chars = post.char_count();
                    let ceiling = platform.ceiling();
                    state.store_refined(platform, post);
                    if chars <= ceiling {
                        state.log(
                            StatusLevel::Success,
                            format!("AI refinement complete for {platform} ({chars} / {ceiling})."),
                        );
                    } else {
                        state.log(
                            StatusLevel::Warning,
                            format!(
                                "Refined {platform} text exceeds limit ({chars} / {ceiling}); posting is disabled."
                            ),
                        );
                    }
                }
                Err(error) => state.report_error(&error),
            }
            state.enter(WorkflowState::Idle);
            Vec::new()
        }
        Msg::PostDone { platform, result } => {
            if state.workflow() != WorkflowState::Posting || !state.is_post_pending(platform) {
                return (state, Vec::new());
            }
            match &result {
                Ok(receipt) => {
                    let location = receipt
                        .permalink
                        .as_deref()
                        .or(receipt.id.as_deref())
                        .unwrap_or("no receipt");
                    state.log(
                        StatusLevel::Success,
                        format!("Posted to {platform}: {location}"),
                    );
                }
                Err(error) => state.report_error(error),
            }
            state.record_post(platform, result);
            if !state.posts_outstanding() {
                let (ok, failed) = state.post_tally();
                let level = if failed == 0 {
                    StatusLevel::Success
                } else {
                    StatusLevel::Warning
                };
                state.log(
                    level,
                    format!("Posting finished: {ok} succeeded, {failed} failed."),
                );
                state.enter(WorkflowState::Idle);
            }
            Vec::new()
        }
        Msg::HeadlinesLoaded(result) => {
            if state.workflow() != WorkflowState::FetchingHeadlines {
                return (state, Vec::new());
            }
            match result {
                Ok(headlines) => {
                    let count = headlines.len();
                    state.set_headlines(headlines);
                    state.log(StatusLevel::Success, format!("Fetched {count} headlines."));
                }
                Err(error) => state.report_error(&error),
            }
            state.enter(WorkflowState::Idle);
            Vec::new()
        }
    };

    (state, effects)
}

/// Lets a trigger through only from Idle; otherwise notes the ignored action.
fn accept_trigger(state: &mut AppState, action: &str) -> bool {
    let current = state.workflow();
    if current.is_idle() {
        return true;
    }
    state.log(
        StatusLevel::Warning,
        format!("Ignored {action}: {current} in progress."),
    );
    false
}

/// Builds one post effect per target, or the first validation failure.
fn plan_posts(state: &AppState, targets: &BTreeSet<Platform>) -> Result<Vec<Effect>, WorkflowError> {
    if targets.is_empty() {
        return Err(WorkflowError::validation(
            Operation::Post,
            "Select at least one platform to post to.",
        ));
    }
    targets
        .iter()
        .map(|&platform| {
            let post = state.check_postable(platform)?;
            Ok(Effect::Post {
                platform,
                text: post.text.clone(),
                body: post.source_draft.clone(),
            })
        })
        .collect()
}
