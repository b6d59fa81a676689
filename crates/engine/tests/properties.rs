use proptest::prelude::*;
use serde_json::{json, Map, Value};

use msgcheck_engine::config::RankingMode;
use msgcheck_engine::engine::assign;
use msgcheck_engine::model::{CheckMode, Expectation, ObservedMessage};

fn obj(v: Value) -> Map<String, Value> {
    match v {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

fn expectation(name: u8, time: u32, tolerance: u32, value: i64, mode: CheckMode) -> Expectation {
    Expectation::new(
        format!("msg_{name}"),
        f64::from(time),
        f64::from(tolerance),
        mode,
        &obj(json!({"Field_1": value, "Field_2": "ab"})),
        &["Field_1"],
    )
    .unwrap()
}

fn arb_mode() -> impl Strategy<Value = CheckMode> {
    prop_oneof![Just(CheckMode::One), Just(CheckMode::Not)]
}

fn arb_expectation() -> impl Strategy<Value = Expectation> {
    (0u8..2, 0u32..2_000, 0u32..300, 0i64..4, arb_mode())
        .prop_map(|(name, time, tolerance, value, mode)| expectation(name, time, tolerance, value, mode))
}

/// Expectations with pairwise distinct times, in time order.
fn arb_distinct_time_expectations() -> impl Strategy<Value = Vec<Expectation>> {
    prop::collection::btree_set(0u32..2_000, 0..10).prop_flat_map(|times| {
        times
            .into_iter()
            .map(|time| {
                (0u8..2, 0u32..300, 0i64..4, arb_mode())
                    .prop_map(move |(name, tolerance, value, mode)| expectation(name, time, tolerance, value, mode))
            })
            .collect::<Vec<_>>()
    })
}

fn arb_message(id: usize) -> impl Strategy<Value = ObservedMessage> {
    (0u8..2, 0u32..2_000, 0i64..4).prop_map(move |(name, time, value)| {
        ObservedMessage::new(
            format!("msg_{name}"),
            f64::from(time),
            obj(json!({"Field_1": value, "id": id})),
        )
    })
}

fn arb_messages() -> impl Strategy<Value = Vec<ObservedMessage>> {
    (0usize..12).prop_flat_map(|n| (0..n).map(arb_message).collect::<Vec<_>>())
}

fn expectation_key(e: &Expectation) -> (String, u64, u64, String) {
    (
        e.name().to_string(),
        e.time().to_bits(),
        e.tolerance().to_bits(),
        e.checked_fields()["Field_1"].to_string(),
    )
}

proptest! {
    #[test]
    fn every_entity_in_exactly_one_pairing(
        expectations in prop::collection::vec(arb_expectation(), 0..10),
        messages in arb_messages(),
    ) {
        let pairings = assign(expectations.clone(), messages.clone(), RankingMode::Weighted);

        let mut seen_ids: Vec<u64> = pairings
            .iter()
            .filter_map(|p| p.message())
            .map(|m| m.fields()["id"].as_u64().unwrap())
            .collect();
        seen_ids.sort_unstable();
        let expected_ids: Vec<u64> = (0..messages.len() as u64).collect();
        prop_assert_eq!(seen_ids, expected_ids);

        let mut seen: Vec<_> = pairings.iter().filter_map(|p| p.expectation()).map(expectation_key).collect();
        let mut input: Vec<_> = expectations.iter().map(expectation_key).collect();
        seen.sort();
        input.sort();
        prop_assert_eq!(seen, input);
    }

    #[test]
    fn committed_pairs_respect_window(
        expectations in prop::collection::vec(arb_expectation(), 0..10),
        messages in arb_messages(),
    ) {
        for p in assign(expectations, messages, RankingMode::Weighted) {
            if let (Some(m), Some(e)) = (p.message(), p.expectation()) {
                prop_assert_eq!(m.name(), e.name());
                prop_assert!(e.accepts_time(m.time()));
            }
        }
    }

    #[test]
    fn output_sorted_by_time(
        expectations in prop::collection::vec(arb_expectation(), 0..10),
        messages in arb_messages(),
    ) {
        let pairings = assign(expectations, messages, RankingMode::Weighted);
        prop_assert!(pairings.windows(2).all(|w| w[0].time() <= w[1].time()));
    }

    #[test]
    fn identical_inputs_identical_output(
        expectations in prop::collection::vec(arb_expectation(), 0..10),
        messages in arb_messages(),
    ) {
        let first = assign(expectations.clone(), messages.clone(), RankingMode::Weighted);
        let second = assign(expectations, messages, RankingMode::Weighted);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn expectation_input_order_does_not_change_output(
        (expectations, shuffled) in arb_distinct_time_expectations()
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
        messages in arb_messages(),
    ) {
        let ordered = assign(expectations, messages.clone(), RankingMode::Weighted);
        let reordered = assign(shuffled, messages, RankingMode::Weighted);
        prop_assert_eq!(ordered, reordered);
    }
}
