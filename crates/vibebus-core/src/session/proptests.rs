//! Property-based tests for session state
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_candidate() -> impl Strategy<Value = StopCandidate> {
    ("HSL:[0-9]{7}", "[A-Za-z ]{1,20}", proptest::option::of("[A-Z][0-9]{4}")).prop_map(
        |(id, name, code)| StopCandidate {
            id,
            name,
            code,
            lat: None,
            lon: None,
        },
    )
}

fn arb_message() -> impl Strategy<Value = Message> {
    prop_oneof![
        "[a-z ]{0,20}".prop_map(Message::user),
        "[a-z ]{0,20}".prop_map(Message::assistant),
        ("[a-z]{4}", "[a-z ]{0,20}").prop_map(|(id, text)| Message::tool_result(id, text)),
    ]
}

// ============================================================================
// Selection routing
// ============================================================================

proptest! {
    #[test]
    fn numeric_input_selects_iff_in_range(
        candidates in proptest::collection::vec(arb_candidate(), 1..8),
        n in 0usize..12,
        pad_left in " {0,3}",
        pad_right in " {0,3}",
    ) {
        let mut pending = PendingSelection::new();
        pending.publish(candidates.clone());
        let input = format!("{}{}{}", pad_left, n, pad_right);

        match pending.route(&input) {
            TurnRoute::Selection { index, candidate } => {
                prop_assert!(n >= 1 && n <= candidates.len());
                prop_assert_eq!(index, n - 1);
                prop_assert_eq!(&candidate, &candidates[n - 1]);
            }
            TurnRoute::Model => {
                prop_assert!(n == 0 || n > candidates.len());
            }
        }
    }

    #[test]
    fn non_numeric_input_goes_to_model(
        candidates in proptest::collection::vec(arb_candidate(), 1..8),
        input in "[a-zA-Z .,!?-]{0,20}",
    ) {
        let mut pending = PendingSelection::new();
        pending.publish(candidates);
        prop_assert_eq!(pending.route(&input), TurnRoute::Model);
    }

    #[test]
    fn routing_never_mutates(
        candidates in proptest::collection::vec(arb_candidate(), 0..5),
        input in "[0-9a-z ]{0,5}",
    ) {
        let mut pending = PendingSelection::new();
        pending.publish(candidates);
        let before = pending.clone();
        let _ = pending.route(&input);
        prop_assert_eq!(pending, before);
    }
}

// ============================================================================
// Retention trimming
// ============================================================================

proptest! {
    #[test]
    fn trim_keeps_system_and_most_recent(
        messages in proptest::collection::vec(arb_message(), 0..40),
        max in 1usize..20,
    ) {
        let mut conv = Conversation::new("system prompt", max);
        for m in &messages {
            conv.push(m.clone());
        }
        let total = messages.len() + 1;
        conv.trim();

        prop_assert_eq!(conv.len(), total.min(max));
        prop_assert_eq!(conv.messages()[0].role, Role::System);
        prop_assert_eq!(conv.messages()[0].text(), "system prompt");

        let kept_tail = &conv.messages()[1..];
        let expected_tail = &messages[messages.len() - kept_tail.len()..];
        prop_assert_eq!(kept_tail, expected_tail);
    }

    #[test]
    fn trim_without_system_keeps_most_recent(
        messages in proptest::collection::vec(arb_message(), 0..40),
        max in 1usize..20,
    ) {
        let mut conv = Conversation::empty(max);
        for m in &messages {
            conv.push(m.clone());
        }
        conv.trim();

        prop_assert_eq!(conv.len(), messages.len().min(max));
        let expected = &messages[messages.len() - conv.len()..];
        prop_assert_eq!(conv.messages(), expected);
    }

    #[test]
    fn appends_preserve_history(
        messages in proptest::collection::vec(arb_message(), 0..30),
    ) {
        let mut conv = Conversation::new("sys", 1000);
        let mut previous_len = conv.len();
        for m in &messages {
            let before: Vec<Message> = conv.messages().to_vec();
            conv.push(m.clone());
            prop_assert_eq!(conv.len(), previous_len + 1);
            prop_assert_eq!(&conv.messages()[..before.len()], &before[..]);
            previous_len = conv.len();
        }
    }
}
