use std::fmt::Write as _;

use chrono::Local;
use postpilot_core::{AppViewModel, Headline, Notice, StatusEntry, StatusLevel};

pub fn status_line(entry: &StatusEntry) -> String {
    let level = match entry.level {
        StatusLevel::Info => "info",
        StatusLevel::Success => "ok",
        StatusLevel::Warning => "warn",
        StatusLevel::Error => "error",
    };
    format!(
        "[{}] {:<5} {}",
        entry.at.with_timezone(&Local).format("%H:%M:%S"),
        level,
        entry.text
    )
}

pub fn notice_block(notice: &Notice) -> String {
    format!(
        "!! {} ({})\n   {}\n   (type 'dismiss' to clear)",
        notice.title, notice.kind, notice.message
    )
}

/// Full workspace as text. Same view, same output.
pub fn render_view(view: &AppViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "State: {}", view.workflow);
    let _ = writeln!(out, "Prompt: {}", or_placeholder(&view.prompt));
    let _ = writeln!(out, "Draft ({} chars):", view.draft_chars);
    let _ = writeln!(out, "{}", indent(or_placeholder(&view.draft)));

    for row in &view.refined {
        let marker = match (&row.text, row.within_limit) {
            (None, _) => "",
            (Some(_), true) => " ready",
            (Some(_), false) => " OVER LIMIT",
        };
        let _ = writeln!(
            out,
            "{} ({} / {}){}:",
            row.platform, row.chars, row.ceiling, marker
        );
        let _ = writeln!(out, "{}", indent(row.text.as_deref().unwrap_or("(not refined)")));
    }

    let postable = if view.postable.is_empty() {
        "none".to_string()
    } else {
        view.postable
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    let _ = writeln!(out, "Can post to: {postable}");

    for outcome in &view.post_report {
        let line = match &outcome.result {
            Ok(receipt) => format!(
                "posted {}",
                receipt
                    .permalink
                    .as_deref()
                    .or(receipt.id.as_deref())
                    .unwrap_or("(no link)")
            ),
            Err(err) => format!("failed: {}", err.message),
        };
        let _ = writeln!(out, "Last post to {}: {}", outcome.platform, line);
    }

    if !view.headlines.is_empty() {
        let _ = writeln!(out, "Headlines:");
        for (number, headline) in view.headlines.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}. {}", number + 1, headline.title);
        }
    }

    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "{}", notice_block(notice));
    }
    out
}

/// Numbered headline list with links, as printed after a fetch.
pub fn headline_list(headlines: &[Headline]) -> String {
    let mut out = String::new();
    for (number, headline) in headlines.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}", number + 1, headline.title);
        let _ = writeln!(out, "    {}", headline.url);
    }
    out
}

fn or_placeholder(text: &str) -> &str {
    if text.trim().is_empty() {
        "(empty)"
    } else {
        text
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
