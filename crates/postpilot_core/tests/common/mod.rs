#![allow(dead_code)]

use std::sync::Once;

use chrono::{TimeZone, Utc};
use postpilot_core::{update, AppState, Clock, Effect, Msg, Platform};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(pilot_logging::initialize_for_tests);
}

pub fn fresh_state() -> AppState {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
    AppState::with_clock(Clock::fixed(at))
}

pub fn with_draft(state: AppState, draft: &str) -> AppState {
    update(state, Msg::DraftChanged(draft.to_string())).0
}

/// Runs a refine for `platform` to completion with `refined` as the result.
pub fn refined(state: AppState, platform: Platform, refined: &str) -> AppState {
    let (state, effects) = update(state, Msg::RefineClicked { platform });
    assert_eq!(effects.len(), 1, "refine should be issued");
    update(
        state,
        Msg::RefineDone {
            platform,
            result: Ok(refined.to_string()),
        },
    )
    .0
}

pub fn post_platforms(effects: &[Effect]) -> Vec<Platform> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Post { platform, .. } => Some(*platform),
            _ => None,
        })
        .collect()
}
