use std::cmp::Ordering;

use tracing::debug;

use crate::config::RankingMode;
use crate::distance::{field_distance, missing_field_penalty};
use crate::model::{pairing_score, Expectation, ObservedMessage};

/// A candidate (message, expectation) pairing, by index into the run's inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proposal {
    pub message: Option<usize>,
    pub expectation: usize,
    pub score: f64,
}

/// Same name and time inside the expectation's closed tolerance window.
pub fn in_window(expectation: &Expectation, message: &ObservedMessage) -> bool {
    expectation.name() == message.name() && expectation.accepts_time(message.time())
}

/// Signed distance of each checked field, in declaration order.
/// A field the message lacks costs the missing-field penalty.
pub fn distance_vector(expectation: &Expectation, message: &ObservedMessage) -> Vec<f64> {
    expectation
        .checked_fields()
        .iter()
        .map(|(key, expected)| match message.fields().get(key) {
            Some(observed) => field_distance(expected, observed),
            None => missing_field_penalty(expected),
        })
        .collect()
}

/// Positional weighted sum: field `i` is scaled by `10^(3 - i)`.
pub fn weighted_distance(distances: &[f64]) -> f64 {
    distances
        .iter()
        .enumerate()
        .map(|(i, d)| d * 10f64.powi(3 - i as i32))
        .sum()
}

#[derive(Debug)]
struct Candidate {
    message: usize,
    distances: Vec<f64>,
    weighted: f64,
}

impl Candidate {
    fn is_exact(&self, ranking: RankingMode) -> bool {
        match ranking {
            RankingMode::Weighted => self.weighted == 0.0,
            RankingMode::Lexicographic => self.distances.iter().all(|d| *d == 0.0),
        }
    }
}

fn candidate_order(a: &Candidate, b: &Candidate, ranking: RankingMode) -> Ordering {
    match ranking {
        RankingMode::Weighted => a.weighted.abs().total_cmp(&b.weighted.abs()),
        RankingMode::Lexicographic => a
            .distances
            .iter()
            .zip(&b.distances)
            .map(|(x, y)| x.abs().total_cmp(&y.abs()))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal),
    }
}

/// Proposals for one expectation, best first.
///
/// Always returns at least one proposal: when no message qualifies, a single
/// message-less proposal stands for the expectation.
pub fn search_candidates(
    index: usize,
    expectation: &Expectation,
    messages: &[ObservedMessage],
    ranking: RankingMode,
) -> Vec<Proposal> {
    let rejection = expectation.check_mode().is_rejection();

    let mut candidates: Vec<Candidate> = messages
        .iter()
        .enumerate()
        .filter(|(_, m)| in_window(expectation, m))
        .map(|(mi, m)| {
            let distances = distance_vector(expectation, m);
            let weighted = weighted_distance(&distances);
            Candidate { message: mi, distances, weighted }
        })
        // `not` expectations only care about exact matches
        .filter(|c| !rejection || c.is_exact(ranking))
        .collect();

    candidates.sort_by(|a, b| candidate_order(a, b, ranking));

    debug!(
        expectation = index,
        name = expectation.name(),
        time = expectation.time(),
        candidates = candidates.len(),
        "candidate search"
    );

    if candidates.is_empty() {
        return vec![Proposal {
            message: None,
            expectation: index,
            score: pairing_score(None, Some(expectation)),
        }];
    }

    candidates
        .into_iter()
        .map(|c| Proposal {
            message: Some(c.message),
            expectation: index,
            score: pairing_score(Some(&messages[c.message]), Some(expectation)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CheckMode, Fields};
    use serde_json::{json, Value};

    fn fields(v: Value) -> Fields {
        match v {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn exp(mode: CheckMode, message: Value, check: &[&str]) -> Expectation {
        Expectation::new("msg_1", 1000.0, 100.0, mode, &fields(message), check).unwrap()
    }

    fn msg(name: &str, time: f64, message: Value) -> ObservedMessage {
        ObservedMessage::new(name, time, fields(message))
    }

    #[test]
    fn window_is_closed_and_name_bound() {
        let e = exp(CheckMode::One, json!({"Field_1": 1}), &["Field_1"]);
        assert!(in_window(&e, &msg("msg_1", 900.0, json!({}))));
        assert!(in_window(&e, &msg("msg_1", 1100.0, json!({}))));
        assert!(!in_window(&e, &msg("msg_1", 1100.5, json!({}))));
        assert!(!in_window(&e, &msg("msg_2", 1000.0, json!({}))));
    }

    #[test]
    fn weights_favor_leading_fields() {
        assert_eq!(weighted_distance(&[1.0]), 1000.0);
        assert_eq!(weighted_distance(&[0.0, 1.0, 1.0, 1.0]), 111.0);
        assert!((weighted_distance(&[0.0, 0.0, 0.0, 0.0, 1.0]) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn closest_candidate_first() {
        let e = exp(CheckMode::One, json!({"Field_1": 1}), &["Field_1"]);
        let messages = vec![
            msg("msg_1", 1000.0, json!({"Field_1": 10})),
            msg("msg_1", 1050.0, json!({"Field_1": 7})),
            msg("msg_1", 5000.0, json!({"Field_1": 1})),
        ];
        let proposals = search_candidates(0, &e, &messages, RankingMode::Weighted);
        let order: Vec<Option<usize>> = proposals.iter().map(|p| p.message).collect();
        assert_eq!(order, vec![Some(1), Some(0)]);
        assert_eq!(proposals[0].score, 6.0);
        assert_eq!(proposals[1].score, 9.0);
    }

    #[test]
    fn rejection_keeps_only_exact_matches() {
        let e = exp(CheckMode::Not, json!({"Field_1": 1}), &["Field_1"]);
        let messages = vec![
            msg("msg_1", 1000.0, json!({"Field_1": 21})),
            msg("msg_1", 1010.0, json!({"Field_1": 1})),
        ];
        let proposals = search_candidates(4, &e, &messages, RankingMode::Weighted);
        assert_eq!(proposals, vec![Proposal { message: Some(1), expectation: 4, score: 0.0 }]);
    }

    #[test]
    fn no_candidate_yields_messageless_proposal() {
        let e = exp(CheckMode::One, json!({"Field_1": 1}), &["Field_1"]);
        let proposals = search_candidates(2, &e, &[], RankingMode::Weighted);
        assert_eq!(proposals, vec![Proposal { message: None, expectation: 2, score: -2.0 }]);
    }

    #[test]
    fn missing_candidate_field_is_penalized() {
        let e = exp(CheckMode::One, json!({"Field_1": 4, "Field_2": 2}), &["Field_1", "Field_2"]);
        let m = msg("msg_1", 1000.0, json!({"Field_2": 2}));
        assert_eq!(distance_vector(&e, &m), vec![4.0, 0.0]);
    }

    #[test]
    fn lexicographic_mode_compares_first_field_first() {
        // Five checked fields: the weighted sum lets a large fifth-field gap
        // outweigh a small fourth-field gap; lexicographic does not.
        let e = exp(
            CheckMode::One,
            json!({"a": 0, "b": 0, "c": 0, "d": 0, "e": 0}),
            &["a", "b", "c", "d", "e"],
        );
        let messages = vec![
            msg("msg_1", 1000.0, json!({"a": 0, "b": 0, "c": 0, "d": 0, "e": 50})),
            msg("msg_1", 1000.0, json!({"a": 0, "b": 0, "c": 0, "d": 1, "e": 0})),
        ];
        let weighted = search_candidates(0, &e, &messages, RankingMode::Weighted);
        let lexicographic = search_candidates(0, &e, &messages, RankingMode::Lexicographic);
        assert_eq!(weighted[0].message, Some(1));
        assert_eq!(lexicographic[0].message, Some(0));
    }
}
