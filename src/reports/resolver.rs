//! Report resolution with bounded status polling

use crate::api::{ApiError, Report, ReportStatus};
use crate::runtime::{ReportStatusClient, Sleeper};
use std::time::Duration;

/// Status checks allowed for a report that is still processing
pub const MAX_POLL_ATTEMPTS: u32 = 3;

/// Wait between consecutive status checks
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// How a report resolution ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionKind {
    /// Download link available
    Ready,
    /// Report failed, or completed without a download URL
    Failed,
    /// Still processing after the attempt budget
    Pending,
}

/// Presentable outcome of resolving one report
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub kind: ResolutionKind,
    /// Text merged into the turn content
    pub text: String,
    /// Latest snapshot: the completed one if polling upgraded it, else the input
    pub snapshot: Report,
    /// Number of status checks made
    pub checks: u32,
    /// User-visible warnings raised while polling
    pub warnings: Vec<String>,
}

impl Resolution {
    fn new(kind: ResolutionKind, text: String, snapshot: Report) -> Self {
        Self {
            kind,
            text,
            snapshot,
            checks: 0,
            warnings: Vec::new(),
        }
    }
}

#[must_use]
pub fn download_link(url: &str) -> String {
    format!("[Download Excel report]({url})")
}

#[must_use]
pub fn failure_message(error: Option<&str>) -> String {
    format!("Report failed: {}", error.unwrap_or("unknown error"))
}

pub const PENDING_MESSAGE: &str = "Report still processing...";

pub const MISSING_URL_MESSAGE: &str = "No download URL found for the report.";

fn render_completed(snapshot: Report) -> Resolution {
    match snapshot.download_url.as_deref() {
        Some(url) if !url.is_empty() => {
            let text = download_link(url);
            Resolution::new(ResolutionKind::Ready, text, snapshot)
        }
        _ => Resolution::new(
            ResolutionKind::Failed,
            MISSING_URL_MESSAGE.to_string(),
            snapshot,
        ),
    }
}

fn render_failed(snapshot: Report) -> Resolution {
    let text = failure_message(snapshot.error.as_deref());
    Resolution::new(ResolutionKind::Failed, text, snapshot)
}

// ============================================================================
// Poll state machine
// ============================================================================

/// Bounded-retry polling state
#[derive(Debug, Clone, PartialEq)]
pub enum PollState {
    /// About to make status check number `attempt` (1-based)
    Checking { attempt: u32 },
    /// Check `attempt` consumed without a terminal status
    Waiting { attempt: u32 },
    /// A terminal snapshot was observed
    Resolved(Report),
    /// Attempt budget spent
    Exhausted,
}

/// Inputs to the poll state machine
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    Checked(Report),
    CheckFailed,
    WaitElapsed,
}

impl PollState {
    #[must_use]
    pub fn start() -> Self {
        PollState::Checking { attempt: 1 }
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        matches!(self, PollState::Resolved(_) | PollState::Exhausted)
    }

    /// Pure transition. Events that do not apply leave the state unchanged.
    #[must_use]
    pub fn step(self, event: PollEvent) -> PollState {
        match (self, event) {
            (PollState::Checking { .. }, PollEvent::Checked(snapshot))
                if snapshot.status.is_terminal() =>
            {
                PollState::Resolved(snapshot)
            }
            (PollState::Checking { attempt }, PollEvent::Checked(_) | PollEvent::CheckFailed) => {
                if attempt >= MAX_POLL_ATTEMPTS {
                    PollState::Exhausted
                } else {
                    PollState::Waiting { attempt }
                }
            }
            (PollState::Waiting { attempt }, PollEvent::WaitElapsed) => PollState::Checking {
                attempt: attempt + 1,
            },
            (state, _) => state,
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Tie a polled snapshot to the handle it was fetched for.
///
/// A snapshot without an id inherits the polled one; a snapshot for some
/// other report is unusable.
fn claim_snapshot(report_id: &str, mut snapshot: Report) -> Result<Report, ApiError> {
    match snapshot.id() {
        None => {
            snapshot.report_id = Some(report_id.to_string());
            Ok(snapshot)
        }
        Some(id) if id == report_id => Ok(snapshot),
        Some(other) => Err(ApiError::invalid_response(format!(
            "status returned for report {other}"
        ))),
    }
}

/// Resolves report handles against a status-check client
pub struct ReportResolver<'a, C: ?Sized, S: ?Sized> {
    client: &'a C,
    sleeper: &'a S,
}

impl<'a, C, S> ReportResolver<'a, C, S>
where
    C: ReportStatusClient + ?Sized,
    S: Sleeper + ?Sized,
{
    pub fn new(client: &'a C, sleeper: &'a S) -> Self {
        Self { client, sleeper }
    }

    /// Resolve one report to a link, failure, or pending message.
    ///
    /// Completed and failed reports resolve without any network call.
    /// Processing reports are polled up to [`MAX_POLL_ATTEMPTS`] times,
    /// [`POLL_INTERVAL`] apart. A failed status check uses up an attempt
    /// and adds a warning; it never aborts the resolution.
    pub async fn resolve(&self, report: &Report) -> Resolution {
        match report.status {
            ReportStatus::Completed => render_completed(report.clone()),
            ReportStatus::Failed => render_failed(report.clone()),
            ReportStatus::Processing => self.poll(report).await,
        }
    }

    async fn poll(&self, report: &Report) -> Resolution {
        let Some(report_id) = report.id() else {
            return Resolution::new(
                ResolutionKind::Failed,
                failure_message(Some("report has no identifier")),
                report.clone(),
            );
        };

        let mut state = PollState::start();
        let mut checks = 0;
        let mut warnings = Vec::new();

        loop {
            let event = match &state {
                PollState::Checking { attempt } => {
                    checks += 1;
                    match self
                        .client
                        .check_report(report_id)
                        .await
                        .and_then(|snapshot| claim_snapshot(report_id, snapshot))
                    {
                        Ok(snapshot) => {
                            tracing::debug!(
                                report_id,
                                attempt,
                                status = snapshot.status.as_str(),
                                "Polled report"
                            );
                            PollEvent::Checked(snapshot)
                        }
                        Err(e) => {
                            tracing::warn!(report_id, attempt, error = %e, "Report check failed");
                            warnings.push(format!("Error checking report {report_id}: {e}"));
                            PollEvent::CheckFailed
                        }
                    }
                }
                PollState::Waiting { .. } => {
                    self.sleeper.sleep(POLL_INTERVAL).await;
                    PollEvent::WaitElapsed
                }
                PollState::Resolved(_) | PollState::Exhausted => break,
            };
            state = state.step(event);
        }

        let mut resolution = match state {
            PollState::Resolved(snapshot) if snapshot.status == ReportStatus::Completed => {
                render_completed(snapshot)
            }
            // Only a completed snapshot replaces the one the turn started with
            PollState::Resolved(snapshot) => Resolution::new(
                ResolutionKind::Failed,
                failure_message(snapshot.error.as_deref()),
                report.clone(),
            ),
            _ => {
                tracing::info!(report_id, checks, "Report still processing after polling");
                Resolution::new(
                    ResolutionKind::Pending,
                    PENDING_MESSAGE.to_string(),
                    report.clone(),
                )
            }
        };
        resolution.checks = checks;
        resolution.warnings = warnings;
        resolution
    }
}
