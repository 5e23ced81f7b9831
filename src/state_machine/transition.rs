//! Pure state transition function
//!
//! One turn runs `idle → sending → resolving(0..N) → committed`. Every path
//! out of `sending` ends with exactly one `CommitAssistantTurn` effect.

use super::{Effect, Event, TurnContext, TurnState};
use crate::api::{AnsweredQuery, QueryRequest, Report};
use crate::reports::dedupe_reports;
use crate::store::Metadata;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Prompt is empty")]
    EmptyPrompt,
    #[error("A turn is already in progress")]
    TurnInProgress,
    #[error("Turn already committed")]
    AlreadyCommitted,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function.
///
/// Given the same inputs it always produces the same outputs, with no I/O.
pub fn transition(
    state: &TurnState,
    context: &TurnContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // User prompt
        // ============================================================
        (TurnState::Idle, Event::UserPrompt { text }) => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyPrompt);
            }
            let request = build_request(context, &text);
            Ok(TransitionResult::new(TurnState::Sending)
                .with_effect(Effect::AppendUserTurn { text })
                .with_effect(Effect::SendQuery { request }))
        }

        (TurnState::Sending | TurnState::Resolving { .. }, Event::UserPrompt { .. }) => {
            Err(TransitionError::TurnInProgress)
        }

        // ============================================================
        // Query outcome
        // ============================================================
        (TurnState::Sending, Event::QueryAnswered(answer)) => Ok(start_resolving(answer)),

        (TurnState::Sending, Event::QueryRejected { message }) => {
            let content = format!("Error: {}", message.as_deref().unwrap_or("unknown error"));
            Ok(commit(Effect::commit_error(content)))
        }

        (TurnState::Sending, Event::TransportFailed { message }) => Ok(commit(
            Effect::commit_error(format!("Connection error: {message}")),
        )),

        // ============================================================
        // Report resolution
        // ============================================================
        (
            TurnState::Resolving {
                message,
                queries_executed,
                tools_executed,
                remaining,
                resolved,
                links,
                ..
            },
            Event::ReportResolved { text, snapshot },
        ) => {
            let mut resolved = resolved.clone();
            resolved.push(snapshot);
            let mut links = links.clone();
            if !text.is_empty() {
                links.push(text);
            }

            match remaining.split_first() {
                Some((next, rest)) => Ok(TransitionResult::new(TurnState::Resolving {
                    message: message.clone(),
                    queries_executed: queries_executed.clone(),
                    tools_executed: tools_executed.clone(),
                    current: next.clone(),
                    remaining: rest.to_vec(),
                    resolved,
                    links,
                })
                .with_effect(Effect::ResolveReport {
                    report: next.clone(),
                })),
                None => {
                    let content = format!("{message}{}", report_suffix(&links));
                    let metadata = Metadata {
                        success: true,
                        queries_executed: queries_executed.clone(),
                        tools_executed: tools_executed.clone(),
                        reports_executed: resolved,
                    };
                    Ok(commit(Effect::commit_answer(content, metadata)))
                }
            }
        }

        // ============================================================
        // Unexpected failure
        // ============================================================
        (TurnState::Sending | TurnState::Resolving { .. }, Event::Unexpected { message }) => Ok(
            commit(Effect::commit_error(format!("Unexpected error: {message}"))),
        ),

        // ============================================================
        // Invalid transitions
        // ============================================================
        (TurnState::Committed, _) => Err(TransitionError::AlreadyCommitted),

        (state, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {} with event {event:?}",
            state.name()
        ))),
    }
}

fn commit(effect: Effect) -> TransitionResult {
    TransitionResult::new(TurnState::Committed).with_effect(effect)
}

fn build_request(context: &TurnContext, text: &str) -> QueryRequest {
    QueryRequest {
        thread_id: context.thread_id.clone(),
        message: text.to_string(),
        school_id: context.school.school_id.clone(),
        school_name: context.school.school_name.clone(),
    }
}

fn start_resolving(answer: AnsweredQuery) -> TransitionResult {
    let AnsweredQuery {
        message,
        queries_executed,
        tools_executed,
        reports_executed,
    } = answer;

    let mut reports = dedupe_reports(reports_executed).into_iter();
    let Some(current) = reports.next() else {
        let metadata = Metadata {
            success: true,
            queries_executed,
            tools_executed,
            reports_executed: Vec::new(),
        };
        return commit(Effect::commit_answer(message, metadata));
    };

    TransitionResult::new(TurnState::Resolving {
        message,
        queries_executed,
        tools_executed,
        current: current.clone(),
        remaining: reports.collect::<Vec<Report>>(),
        resolved: Vec::new(),
        links: Vec::new(),
    })
    .with_effect(Effect::ResolveReport { report: current })
}

/// Suffix appended to the assistant text; empty when there is nothing to show
pub fn report_suffix(links: &[String]) -> String {
    if links.is_empty() {
        String::new()
    } else {
        format!("\n\n**Report:** {}", links.join(" | "))
    }
}
