//! Turn orchestrator

use super::traits::{AskDbClient, Sleeper};

use crate::api::{ApiError, QueryOutcome, QueryResponse, ReportStatus};
use crate::config::SchoolContext;
use crate::reports::{ReportResolver, Resolution};
use crate::state_machine::{transition, Effect, Event, TransitionError, TurnContext, TurnState};
use crate::store::{ConversationStore, Session, StoreError, StoreResult, Turn};

/// What a committed turn produced
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Index of the assistant turn in the history
    pub index: usize,
    pub turn: Turn,
    /// Non-fatal problems hit while resolving reports
    pub warnings: Vec<String>,
}

/// Drives one turn at a time through the state machine against a session
pub struct TurnOrchestrator<C, S>
where
    C: AskDbClient,
    S: Sleeper,
{
    client: C,
    sleeper: S,
    school: SchoolContext,
}

/// Mutable bookkeeping for one in-flight turn
struct TurnRun<'s> {
    store: &'s ConversationStore,
    state: TurnState,
    warnings: Vec<String>,
    committed: Option<TurnOutcome>,
}

impl<C, S> TurnOrchestrator<C, S>
where
    C: AskDbClient,
    S: Sleeper,
{
    pub fn new(client: C, sleeper: S, school: SchoolContext) -> Self {
        Self {
            client,
            sleeper,
            school,
        }
    }

    /// Run one user prompt to a committed assistant turn.
    ///
    /// Returns `None` without touching the history when the prompt is blank
    /// or another turn on this session is still in flight.
    pub async fn submit_turn(&self, session: &Session, prompt: &str) -> Option<TurnOutcome> {
        let store = session.store();
        let Some(_guard) = store.try_begin_turn() else {
            tracing::warn!(thread_id = %session.thread_id(), "Turn already in progress, ignoring prompt");
            return None;
        };

        let context = TurnContext::new(session.thread_id(), self.school.clone());
        let mut run = TurnRun {
            store,
            state: TurnState::Idle,
            warnings: Vec::new(),
            committed: None,
        };

        let mut events_to_process = vec![Event::UserPrompt {
            text: prompt.to_string(),
        }];

        while let Some(current_event) = events_to_process.pop() {
            let result = match transition(&run.state, &context, current_event) {
                Ok(r) => r,
                Err(TransitionError::EmptyPrompt) => {
                    tracing::debug!("Ignoring blank prompt");
                    return None;
                }
                Err(e) => {
                    tracing::error!(error = %e, state = run.state.name(), "Turn transition failed");
                    if matches!(run.state, TurnState::Sending | TurnState::Resolving { .. }) {
                        events_to_process.push(Event::Unexpected {
                            message: e.to_string(),
                        });
                        continue;
                    }
                    break;
                }
            };

            tracing::debug!(
                thread_id = %context.thread_id,
                from = run.state.name(),
                to = result.new_state.name(),
                "Turn transition"
            );
            run.state = result.new_state;

            for effect in result.effects {
                if let Some(generated_event) = self.execute_effect(&mut run, effect).await {
                    events_to_process.push(generated_event);
                }
            }
        }

        run.committed
    }

    async fn execute_effect(&self, run: &mut TurnRun<'_>, effect: Effect) -> Option<Event> {
        match effect {
            Effect::AppendUserTurn { text } => {
                run.store.append(Turn::user(text));
                None
            }

            Effect::SendQuery { request } => {
                tracing::info!(thread_id = %request.thread_id, "Submitting turn");
                Some(query_event(self.client.send_turn(&request).await))
            }

            Effect::ResolveReport { report } => {
                let resolution = ReportResolver::new(&self.client, &self.sleeper)
                    .resolve(&report)
                    .await;
                tracing::info!(
                    report_id = report.id().unwrap_or_default(),
                    kind = ?resolution.kind,
                    checks = resolution.checks,
                    "Report resolved"
                );
                run.warnings.extend(resolution.warnings);
                Some(Event::ReportResolved {
                    text: resolution.text,
                    snapshot: resolution.snapshot,
                })
            }

            Effect::CommitAssistantTurn { content, metadata } => {
                let turn = Turn::assistant(content, metadata);
                let index = run.store.append(turn.clone());
                tracing::info!(index, has_metadata = turn.metadata.is_some(), "Turn committed");
                run.committed = Some(TurnOutcome {
                    index,
                    turn,
                    warnings: std::mem::take(&mut run.warnings),
                });
                None
            }
        }
    }

    /// Poll a report already stored in a committed turn.
    ///
    /// Holds the same guard as [`Self::submit_turn`]. The stored snapshot is
    /// replaced only when a processing report comes back completed; the turn
    /// text is left as it was committed.
    pub async fn recheck_report(
        &self,
        session: &Session,
        turn_index: usize,
        report_index: usize,
    ) -> StoreResult<Resolution> {
        let store = session.store();
        let _guard = store.try_begin_turn().ok_or(StoreError::Busy)?;

        let report = store.report(turn_index, report_index)?;
        let resolution = ReportResolver::new(&self.client, &self.sleeper)
            .resolve(&report)
            .await;

        if report.status == ReportStatus::Processing
            && resolution.snapshot.status == ReportStatus::Completed
        {
            store.replace_report(turn_index, report_index, resolution.snapshot.clone())?;
            tracing::info!(
                turn_index,
                report_index,
                "Upgraded stored report snapshot"
            );
        }

        Ok(resolution)
    }
}

/// Map the outcome of a turn submission onto a state machine event
fn query_event(response: Result<QueryResponse, ApiError>) -> Event {
    match response.and_then(QueryResponse::into_outcome) {
        Ok(QueryOutcome::Answered(answer)) => Event::QueryAnswered(answer),
        Ok(QueryOutcome::Rejected { message }) => {
            tracing::warn!(reason = message.as_deref().unwrap_or_default(), "Turn rejected");
            Event::QueryRejected { message }
        }
        Err(e) if e.is_transport() => {
            tracing::warn!(error = %e, kind = ?e.kind, "Turn submission failed");
            Event::TransportFailed {
                message: e.to_string(),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Unusable turn response");
            Event::Unexpected {
                message: e.to_string(),
            }
        }
    }
}
