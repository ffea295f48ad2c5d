//! Property-based tests for pattern matching and stack discipline
//!
//! Paths and patterns are drawn from a three-letter alphabet so that
//! exact, suffix and universal patterns collide often.

use proptest::prelude::*;
use rustydigester::digester::{PathStack, Pattern, PatternKind, Stack};
use rustydigester::error::{DigesterError, StackKind};
use rustydigester::{ErrorKind, Rule, RuleId, Rules};

struct Noop;

impl Rule for Noop {}

fn segment_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("a".to_string()), Just("b".to_string()), Just("c".to_string())]
}

fn path_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(segment_strategy(), 1..5)
}

/// Exact, suffix (`*/...`) or universal (`*`) patterns
fn pattern_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => prop::collection::vec(segment_strategy(), 1..4).prop_map(|s| s.join("/")),
        3 => prop::collection::vec(segment_strategy(), 1..3).prop_map(|s| format!("*/{}", s.join("/"))),
        1 => Just("*".to_string()),
    ]
}

fn path_of(segments: &[String]) -> PathStack {
    let mut path = PathStack::new();
    for segment in segments {
        path.push(segment);
    }
    path
}

fn registered(patterns: &[String]) -> (Rules, Vec<RuleId>) {
    let mut rules = Rules::new();
    let ids = patterns
        .iter()
        .map(|p| rules.add(p, Noop).unwrap())
        .collect();
    (rules, ids)
}

/// Expected dispatch order computed pattern by pattern
fn expected_order(rules: &Rules, ids: &[RuleId], path: &PathStack) -> Vec<RuleId> {
    let mut matched: Vec<(usize, usize, RuleId)> = ids
        .iter()
        .filter_map(|&id| {
            let pattern = rules.pattern(id).unwrap();
            if !pattern.matches(path) {
                return None;
            }
            let rank = match pattern.kind() {
                PatternKind::Exact => (0, 0),
                PatternKind::Suffix => (1, usize::MAX - pattern.segments()),
                PatternKind::Universal => (2, 0),
            };
            Some((rank.0, rank.1, id))
        })
        .collect();
    matched.sort();
    matched.into_iter().map(|(_, _, id)| id).collect()
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_matching_order_agrees_with_per_pattern_check(
            patterns in prop::collection::vec(pattern_strategy(), 0..12),
            segments in path_strategy(),
        ) {
            let (rules, ids) = registered(&patterns);
            let path = path_of(&segments);

            prop_assert_eq!(
                rules.matching_rules(&path),
                expected_order(&rules, &ids, &path),
                "patterns {:?} on path {}", patterns, path.as_match()
            );
        }

        #[test]
        fn test_same_pattern_keeps_registration_order(
            segments in path_strategy(),
            count in 1usize..8,
        ) {
            let pattern = segments.join("/");
            let (rules, ids) = registered(&vec![pattern; count]);

            prop_assert_eq!(rules.matching_rules(&path_of(&segments)), ids);
        }

        #[test]
        fn test_parsed_patterns_round_trip_their_source(source in pattern_strategy()) {
            let pattern = Pattern::parse(&source).unwrap();
            prop_assert_eq!(pattern.as_str(), source.as_str());
            prop_assert_eq!(pattern.to_string(), source);
        }

        #[test]
        fn test_balanced_push_pop_empties_stack(items in prop::collection::vec(any::<i64>(), 0..32)) {
            let mut stack = Stack::new(StackKind::Objects);
            for item in &items {
                stack.push(*item);
            }
            prop_assert_eq!(stack.len(), items.len());

            for item in items.iter().rev() {
                prop_assert_eq!(stack.pop().unwrap(), *item);
            }
            prop_assert!(stack.is_empty());

            let err = stack.pop().unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::Underflow);
            let is_objects_underflow = matches!(
                err,
                DigesterError::Underflow { stack: StackKind::Objects, .. }
            );
            prop_assert!(is_objects_underflow);
        }

        #[test]
        fn test_truncate_to_mark_restores_depth(
            below in 0usize..8,
            above in 0usize..8,
        ) {
            let mut stack = Stack::new(StackKind::Params);
            for i in 0..below {
                stack.push(i);
            }
            let mark = stack.mark();
            for i in 0..above {
                stack.push(i);
            }

            stack.truncate_to(mark).unwrap();
            prop_assert_eq!(stack.len(), below);
            prop_assert_eq!(mark.depth(), below);
        }

        #[test]
        fn test_path_depth_tracks_pushes(segments in path_strategy()) {
            let mut path = path_of(&segments);
            prop_assert_eq!(path.depth(), segments.len());
            prop_assert_eq!(path.as_match(), segments.join("/"));

            for _ in 0..segments.len() {
                path.pop().unwrap();
            }
            prop_assert!(path.is_empty());
            prop_assert_eq!(path.pop().unwrap_err().kind(), ErrorKind::Underflow);
        }
    }
}
