//! Property-based tests for the turn state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::transition::report_suffix;
use super::*;
use crate::api::{AnsweredQuery, Report, ReportStatus};
use crate::config::SchoolContext;
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> TurnContext {
    TurnContext {
        thread_id: "test-thread".to_string(),
        school: SchoolContext::default(),
    }
}

fn count_commits(effects: &[Effect]) -> usize {
    effects.iter().filter(|e| e.is_commit()).count()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_report() -> impl Strategy<Value = Report> {
    (
        "r[0-3]",
        prop_oneof![
            Just(ReportStatus::Processing),
            Just(ReportStatus::Completed),
            Just(ReportStatus::Failed),
        ],
    )
        .prop_map(|(id, status)| Report::with_status(&id, status))
}

fn arb_answer() -> impl Strategy<Value = AnsweredQuery> {
    (
        "[a-zA-Z ]{1,30}",
        proptest::collection::vec("[A-Z ]{1,20}", 0..3),
        proptest::collection::vec("[a-z_]{1,10}", 0..3),
        proptest::collection::vec(arb_report(), 0..6),
    )
        .prop_map(
            |(message, queries_executed, tools_executed, reports_executed)| AnsweredQuery {
                message,
                queries_executed,
                tools_executed,
                reports_executed,
            },
        )
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        "[a-z ]{0,10}".prop_map(|text| Event::UserPrompt { text }),
        arb_answer().prop_map(Event::QueryAnswered),
        proptest::option::of("[a-z ]{1,10}").prop_map(|message| Event::QueryRejected { message }),
        "[a-z ]{1,10}".prop_map(|message| Event::TransportFailed { message }),
        ("[a-z ]{0,10}", arb_report())
            .prop_map(|(text, snapshot)| Event::ReportResolved { text, snapshot }),
        "[a-z ]{1,10}".prop_map(|message| Event::Unexpected { message }),
    ]
}

// ============================================================================
// Invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: A turn commits at most once, and only when it reaches Committed
    #[test]
    fn prop_at_most_one_commit(events in proptest::collection::vec(arb_event(), 0..20)) {
        let mut state = TurnState::Idle;
        let ctx = test_context();
        let mut commits = 0;

        for event in events {
            if let Ok(result) = transition(&state, &ctx, event) {
                let n = count_commits(&result.effects);
                if n > 0 {
                    prop_assert_eq!(&result.new_state, &TurnState::Committed);
                }
                commits += n;
                state = result.new_state;
            }
        }

        prop_assert!(commits <= 1);
        prop_assert_eq!(commits == 1, state.is_terminal());
    }

    // Invariant 2: Committed is terminal
    #[test]
    fn prop_committed_rejects_everything(event in arb_event()) {
        let result = transition(&TurnState::Committed, &test_context(), event);
        prop_assert_eq!(result.unwrap_err(), TransitionError::AlreadyCommitted);
    }

    // Invariant 3: Every failure path out of Sending commits without metadata
    #[test]
    fn prop_failures_commit_without_metadata(
        event in prop_oneof![
            proptest::option::of("[a-z ]{1,10}").prop_map(|message| Event::QueryRejected { message }),
            "[a-z ]{1,10}".prop_map(|message| Event::TransportFailed { message }),
            "[a-z ]{1,10}".prop_map(|message| Event::Unexpected { message }),
        ]
    ) {
        let result = transition(&TurnState::Sending, &test_context(), event).unwrap();
        prop_assert_eq!(result.new_state, TurnState::Committed);
        match result.effects.as_slice() {
            [Effect::CommitAssistantTurn { metadata, .. }] => prop_assert!(metadata.is_none()),
            other => prop_assert!(false, "unexpected effects: {:?}", other),
        }
    }

    // Invariant 4: Driving an answer to completion resolves each unique report
    // once, in order, and the committed text carries every non-empty link
    #[test]
    fn prop_answer_resolves_unique_reports_in_order(
        answer in arb_answer(),
        texts in proptest::collection::vec("[a-z]{0,4}", 6),
    ) {
        let ctx = test_context();
        let base = answer.message.clone();
        let mut expected_ids: Vec<String> = Vec::new();
        for report in &answer.reports_executed {
            let id = report.id().unwrap_or_default().to_string();
            if !expected_ids.contains(&id) {
                expected_ids.push(id);
            }
        }

        let mut result = transition(&TurnState::Sending, &ctx, Event::QueryAnswered(answer)).unwrap();
        let mut resolved_ids = Vec::new();
        let mut links = Vec::new();
        let mut texts = texts.into_iter();

        while let [Effect::ResolveReport { report }] = result.effects.as_slice() {
            let report = report.clone();
            resolved_ids.push(report.id().unwrap_or_default().to_string());
            let text = texts.next().unwrap_or_default();
            if !text.is_empty() {
                links.push(text.clone());
            }
            result = transition(
                &result.new_state,
                &ctx,
                Event::ReportResolved { text, snapshot: report },
            )
            .unwrap();
        }

        prop_assert_eq!(&resolved_ids, &expected_ids);
        match result.effects.as_slice() {
            [Effect::CommitAssistantTurn { content, metadata: Some(metadata) }] => {
                prop_assert_eq!(content, &format!("{base}{}", report_suffix(&links)));
                prop_assert_eq!(metadata.reports_executed.len(), expected_ids.len());
            }
            other => prop_assert!(false, "unexpected effects: {:?}", other),
        }
    }
}
