//! Property-based tests for report tracking and polling

use super::registry::dedupe_reports;
use super::resolver::{PollEvent, PollState, MAX_POLL_ATTEMPTS};
use crate::api::{Report, ReportStatus};
use proptest::prelude::*;
use std::collections::HashSet;

fn arb_status() -> impl Strategy<Value = ReportStatus> {
    prop_oneof![
        Just(ReportStatus::Processing),
        Just(ReportStatus::Completed),
        Just(ReportStatus::Failed),
    ]
}

/// Small id alphabet so duplicates are common; `None` and "" model missing ids
fn arb_report_id() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        8 => "r[0-4]".prop_map(Some),
        1 => Just(Some(String::new())),
        1 => Just(None),
    ]
}

fn arb_report() -> impl Strategy<Value = Report> {
    (arb_report_id(), arb_status(), "[a-z]{0,6}").prop_map(|(id, status, tag)| {
        let mut report = Report::with_status("placeholder", status);
        report.report_id = id;
        report.download_url = Some(format!("http://x/{tag}.xlsx"));
        report
    })
}

fn arb_poll_event() -> impl Strategy<Value = PollEvent> {
    prop_oneof![
        arb_status().prop_map(|s| PollEvent::Checked(Report::with_status("r1", s))),
        Just(PollEvent::CheckFailed),
        Just(PollEvent::WaitElapsed),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_dedupe_ids_are_unique(reports in proptest::collection::vec(arb_report(), 0..20)) {
        let deduped = dedupe_reports(reports);
        let mut seen = HashSet::new();
        for report in &deduped {
            let id = report.id();
            prop_assert!(id.is_some(), "report without id survived: {:?}", report);
            prop_assert!(seen.insert(id.map(str::to_string)), "duplicate id: {:?}", id);
        }
    }

    #[test]
    fn prop_dedupe_keeps_first_seen_order(reports in proptest::collection::vec(arb_report(), 0..20)) {
        let mut expected: Vec<Report> = Vec::new();
        for report in &reports {
            if let Some(id) = report.id() {
                if !expected.iter().any(|r| r.id() == Some(id)) {
                    expected.push(report.clone());
                }
            }
        }
        prop_assert_eq!(dedupe_reports(reports), expected);
    }

    #[test]
    fn prop_poll_never_exceeds_budget(events in proptest::collection::vec(arb_poll_event(), 0..40)) {
        let mut state = PollState::start();
        for event in events {
            state = state.step(event);
            if let PollState::Checking { attempt } | PollState::Waiting { attempt } = &state {
                prop_assert!(*attempt >= 1 && *attempt <= MAX_POLL_ATTEMPTS);
            }
        }
    }

    #[test]
    fn prop_finished_poll_state_is_absorbing(
        events in proptest::collection::vec(arb_poll_event(), 0..40),
        tail in proptest::collection::vec(arb_poll_event(), 1..10),
    ) {
        let mut state = PollState::start();
        for event in events {
            state = state.step(event);
        }
        if state.is_finished() {
            let finished = state.clone();
            for event in tail {
                state = state.step(event);
            }
            prop_assert_eq!(state, finished);
        }
    }
}
