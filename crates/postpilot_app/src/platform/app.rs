use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use pilot_logging::{pilot_debug, pilot_info};
use postpilot_core::{update, AppState, Msg, Notice, Platform};
use postpilot_engine::Backends;

use super::effects::EffectRunner;
use super::input::{parse_command, to_msgs, ReplCommand, HELP};
use super::render;
use super::settings::AppSettings;

/// How long the loop waits for input before draining engine messages.
const TICK: Duration = Duration::from_millis(75);

pub fn run_compose(settings: &AppSettings, backends: Backends) -> anyhow::Result<()> {
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(backends, settings.subreddit.clone(), msg_tx);
    let lines = spawn_stdin_reader();
    // Unlocked handle: engine threads may log to the terminal meanwhile.
    let mut session = Session::new(AppState::new(), runner, settings.headline_limit, io::stdout());

    session.greet()?;
    loop {
        let mut printed = false;
        while let Ok(msg) = msg_rx.try_recv() {
            printed |= session.dispatch(msg)?;
        }
        if printed {
            session.prompt()?;
        }

        match lines.recv_timeout(TICK) {
            Ok(line) => {
                if session.handle_line(&line)? == Flow::Quit {
                    break;
                }
                session.prompt()?;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    pilot_info!("Compose session ended");
    Ok(())
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Interactive front end: owns the state, prints what changed.
pub struct Session<W: Write> {
    state: AppState,
    runner: EffectRunner,
    headline_limit: usize,
    out: W,
    /// Highest status entry already printed.
    printed_seq: u64,
    printed_notice: Option<Notice>,
}

impl<W: Write> Session<W> {
    pub fn new(state: AppState, runner: EffectRunner, headline_limit: usize, out: W) -> Self {
        Self {
            state,
            runner,
            headline_limit,
            out,
            printed_seq: 0,
            printed_notice: None,
        }
    }

    fn greet(&mut self) -> io::Result<()> {
        writeln!(self.out, "postpilot compose - type 'help' for commands")?;
        self.prompt()
    }

    fn prompt(&mut self) -> io::Result<()> {
        write!(self.out, "> ")?;
        self.out.flush()
    }

    pub fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let command = match parse_command(line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(self.out, "{message}")?;
                return Ok(Flow::Continue);
            }
        };
        pilot_debug!("REPL command {:?}", command);

        match &command {
            ReplCommand::Quit => return Ok(Flow::Quit),
            ReplCommand::Help => writeln!(self.out, "{HELP}")?,
            ReplCommand::Show => write!(self.out, "{}", render::render_view(&self.state.view()))?,
            _ => {}
        }
        for msg in to_msgs(command, self.headline_limit) {
            self.dispatch(msg)?;
        }
        Ok(Flow::Continue)
    }

    /// Runs one message through `update`, hands effects to the engine and
    /// prints whatever changed. Returns whether anything was printed.
    pub fn dispatch(&mut self, msg: Msg) -> io::Result<bool> {
        let echo = Echo::for_msg(&msg);
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects);

        if !self.state.consume_dirty() {
            return Ok(false);
        }
        self.print_changes(echo)?;
        Ok(true)
    }

    fn print_changes(&mut self, echo: Echo) -> io::Result<()> {
        let view = self.state.view();

        for entry in self.state.status().since(self.printed_seq) {
            writeln!(self.out, "{}", render::status_line(entry))?;
            self.printed_seq = entry.seq;
        }

        match echo {
            Echo::Draft if !view.draft.is_empty() => {
                writeln!(self.out, "Draft ({} chars):\n{}", view.draft_chars, view.draft)?;
            }
            Echo::Refined(platform) => {
                if let Some(row) = view.refined_for(platform).filter(|row| row.text.is_some()) {
                    writeln!(
                        self.out,
                        "{} ({} / {}):\n{}",
                        row.platform,
                        row.chars,
                        row.ceiling,
                        row.text.as_deref().unwrap_or_default()
                    )?;
                }
            }
            Echo::Headlines => {
                write!(self.out, "{}", render::headline_list(&view.headlines))?;
            }
            _ => {}
        }

        if view.notice != self.printed_notice {
            if let Some(notice) = &view.notice {
                writeln!(self.out, "{}", render::notice_block(notice))?;
            }
            self.printed_notice = view.notice;
        }
        self.out.flush()
    }

    #[cfg(test)]
    fn state(&self) -> &AppState {
        &self.state
    }
}

/// Extra output for completions whose result the user wants to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Echo {
    None,
    Draft,
    Refined(Platform),
    Headlines,
}

impl Echo {
    fn for_msg(msg: &Msg) -> Self {
        match msg {
            Msg::DraftGenerated(Ok(_)) | Msg::HeadlineChosen { .. } => Echo::Draft,
            Msg::RefineDone {
                platform,
                result: Ok(_),
            } => Echo::Refined(*platform),
            Msg::HeadlinesLoaded(Ok(_)) => Echo::Headlines,
            _ => Echo::None,
        }
    }
}
