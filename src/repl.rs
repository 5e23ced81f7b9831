//! Line-oriented chat front end

use crate::reports::Resolution;
use crate::runtime::{AskDbClient, Sleeper, TurnOrchestrator, TurnOutcome};
use crate::store::{Session, Turn};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One parsed line of input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit the text as a turn
    Prompt(String),
    NewConversation,
    ClearView,
    Recheck { turn: usize, report: usize },
    ShowThread,
    ShowHistory,
    Quit,
    /// Blank line
    Nothing,
    /// Unknown or malformed command, with a usage hint
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();
        if line.is_empty() {
            return Command::Nothing;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Prompt(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        match (parts.next().unwrap_or_default(), parts.next(), parts.next(), parts.next()) {
            ("new", None, None, None) => Command::NewConversation,
            ("clear", None, None, None) => Command::ClearView,
            ("thread", None, None, None) => Command::ShowThread,
            ("history", None, None, None) => Command::ShowHistory,
            ("quit" | "exit", None, None, None) => Command::Quit,
            ("recheck", Some(turn), Some(report), None) => {
                match (turn.parse(), report.parse()) {
                    (Ok(turn), Ok(report)) => Command::Recheck { turn, report },
                    _ => Command::Invalid("usage: /recheck <turn> <report>".to_string()),
                }
            }
            ("recheck", ..) => Command::Invalid("usage: /recheck <turn> <report>".to_string()),
            (name, ..) => Command::Invalid(format!(
                "unknown command /{name}; try /new, /clear, /recheck, /thread, /history or /quit"
            )),
        }
    }
}

pub fn render_turn(index: usize, turn: &Turn) -> String {
    let who = if turn.is_assistant() { "assistant" } else { "you" };
    format!("[{index}] {who}: {}", turn.content)
}

pub fn render_outcome(outcome: &TurnOutcome, show_metadata: bool) -> String {
    let mut out = String::new();
    for warning in &outcome.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }
    out.push_str(&render_turn(outcome.index, &outcome.turn));
    if show_metadata {
        if let Some(metadata) = &outcome.turn.metadata {
            out.push('\n');
            out.push_str(&metadata.summary().to_string());
        }
    }
    out
}

pub fn render_resolution(resolution: &Resolution) -> String {
    let mut out = String::new();
    for warning in &resolution.warnings {
        out.push_str(&format!("warning: {warning}\n"));
    }
    out.push_str(&resolution.text);
    out
}

/// Read lines until EOF or `/quit`, writing replies to stdout
pub async fn run<R, C, S>(
    input: R,
    orchestrator: &TurnOrchestrator<C, S>,
    show_metadata: bool,
) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    C: AskDbClient,
    S: Sleeper,
{
    let mut session = Session::new();
    tracing::info!(thread_id = %session.thread_id(), "Session started");
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Nothing => {}
            Command::Quit => break,
            Command::Prompt(text) => match orchestrator.submit_turn(&session, &text).await {
                Some(outcome) => println!("{}", render_outcome(&outcome, show_metadata)),
                None => println!("(busy, prompt ignored)"),
            },
            Command::NewConversation => {
                session.reset();
                tracing::info!(thread_id = %session.thread_id(), "New conversation");
                println!("new conversation {}", session.thread_id());
            }
            Command::ClearView => {
                session.clear_view();
                println!("history cleared");
            }
            Command::Recheck { turn, report } => {
                match orchestrator.recheck_report(&session, turn, report).await {
                    Ok(resolution) => println!("{}", render_resolution(&resolution)),
                    Err(e) => println!("recheck failed: {e}"),
                }
            }
            Command::ShowThread => println!("{}", session.thread_id()),
            Command::ShowHistory => {
                for (index, turn) in session.store().turns().iter().enumerate() {
                    println!("{}", render_turn(index, turn));
                }
            }
            Command::Invalid(hint) => println!("{hint}"),
        }
    }

    tracing::info!(thread_id = %session.thread_id(), "Session ended");
    Ok(())
}
