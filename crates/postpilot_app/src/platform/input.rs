use postpilot_core::{Msg, Platform};

/// One parsed line of the interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Prompt(String),
    Generate(Option<String>),
    Draft(String),
    Headlines(Option<usize>),
    /// 1-based headline number as shown by `headlines`.
    Use(usize),
    Refine(Platform),
    Post(Vec<Platform>),
    Show,
    Dismiss,
    Help,
    Quit,
    Empty,
}

pub const HELP: &str = "\
Commands:
  prompt <text>          set the prompt used by generate
  generate [text]        ask the AI for a draft (optionally setting the prompt)
  draft <text>           replace the draft (use \\n for line breaks)
  headlines [n]          fetch the latest n headlines
  use <n>                seed the draft from headline n
  refine <x|reddit>      rewrite the draft for one platform
  post <x|reddit|all>    publish the refined text
  show                   print the whole workspace
  dismiss                close the current error notice
  help                   this text
  quit                   leave";

pub fn parse_command(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ReplCommand::Empty);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "prompt" => Ok(ReplCommand::Prompt(unescape(rest))),
        "generate" | "gen" => Ok(ReplCommand::Generate(
            (!rest.is_empty()).then(|| unescape(rest)),
        )),
        "draft" => Ok(ReplCommand::Draft(unescape(rest))),
        "headlines" => {
            if rest.is_empty() {
                Ok(ReplCommand::Headlines(None))
            } else {
                parse_number(rest).map(|n| ReplCommand::Headlines(Some(n)))
            }
        }
        "use" => parse_number(rest).map(ReplCommand::Use),
        "refine" => rest
            .parse::<Platform>()
            .map(ReplCommand::Refine)
            .map_err(|err| err.to_string()),
        "post" => parse_targets(rest).map(ReplCommand::Post),
        "show" => Ok(ReplCommand::Show),
        "dismiss" => Ok(ReplCommand::Dismiss),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" => Ok(ReplCommand::Quit),
        other => Err(format!("unknown command '{other}'; type help")),
    }
}

fn parse_number(raw: &str) -> Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("expected a positive number, got '{raw}'")),
    }
}

fn parse_targets(raw: &str) -> Result<Vec<Platform>, String> {
    if raw.is_empty() {
        return Err("post needs a target: x, reddit or all".to_string());
    }
    let mut targets = Vec::new();
    for word in raw.split(|c: char| c == ',' || c.is_whitespace()) {
        if word.is_empty() {
            continue;
        }
        if word.eq_ignore_ascii_case("all") || word.eq_ignore_ascii_case("both") {
            targets.extend(Platform::ALL);
        } else {
            targets.push(word.parse::<Platform>().map_err(|err| err.to_string())?);
        }
    }
    Ok(targets)
}

fn unescape(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

/// Workflow messages for a command. Commands that only affect the terminal
/// (show, help, quit) produce none.
pub fn to_msgs(command: ReplCommand, headline_limit: usize) -> Vec<Msg> {
    match command {
        ReplCommand::Prompt(text) => vec![Msg::PromptChanged(text)],
        ReplCommand::Generate(Some(text)) => vec![Msg::PromptChanged(text), Msg::GenerateClicked],
        ReplCommand::Generate(None) => vec![Msg::GenerateClicked],
        ReplCommand::Draft(text) => vec![Msg::DraftChanged(text)],
        ReplCommand::Headlines(limit) => vec![Msg::FetchHeadlinesClicked {
            limit: limit.unwrap_or(headline_limit),
        }],
        ReplCommand::Use(number) => vec![Msg::HeadlineChosen { index: number - 1 }],
        ReplCommand::Refine(platform) => vec![Msg::RefineClicked { platform }],
        ReplCommand::Post(targets) => vec![Msg::PostClicked { targets }],
        ReplCommand::Dismiss => vec![Msg::NoticeDismissed],
        ReplCommand::Show | ReplCommand::Help | ReplCommand::Quit | ReplCommand::Empty => {
            Vec::new()
        }
    }
}
