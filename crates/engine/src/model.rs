use std::cmp::Ordering;

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::config::RankingMode;
use crate::distance::{field_distance, missing_field_penalty, values_equal};
use crate::error::CheckError;

/// Field name → value, in declaration order.
pub type Fields = Map<String, Value>;

/// Score of an expectation that found no message.
pub const SCORE_MATCH_NOT_FOUND: f64 = -2.0;
/// Score of a message no expectation claimed.
pub const SCORE_NO_EXPECTED: f64 = -1.0;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A recorded output message. All fields are kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservedMessage {
    name: String,
    time: f64,
    fields: Fields,
}

impl ObservedMessage {
    pub fn new(name: impl Into<String>, time: f64, fields: Fields) -> Self {
        Self { name: name.into(), time, fields }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    /// A message with equal checked fields must exist in the window.
    One,
    /// Accepted token with no behavior of its own; treated like every non-`Not` mode.
    More,
    /// No message with equal checked fields may exist in the window.
    Not,
}

impl CheckMode {
    /// Case-insensitive token parse.
    pub fn parse(token: &str) -> Result<Self, CheckError> {
        match token.to_ascii_lowercase().as_str() {
            "one" => Ok(Self::One),
            "more" => Ok(Self::More),
            "not" => Ok(Self::Not),
            _ => Err(CheckError::UnknownCheckMode(token.to_string())),
        }
    }

    pub fn is_rejection(self) -> bool {
        self == Self::Not
    }
}

impl std::fmt::Display for CheckMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::One => write!(f, "one"),
            Self::More => write!(f, "more"),
            Self::Not => write!(f, "not"),
        }
    }
}

/// A declared message that should (or should not) appear near `time`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expectation {
    name: String,
    time: f64,
    tolerance: f64,
    check_mode: CheckMode,
    checked_fields: Fields,
}

impl Expectation {
    /// Builds an expectation from the full declared message.
    ///
    /// Only the fields named in `fields_to_check` are retained, in the order
    /// `message` declares them. Every name in `fields_to_check` must be a key
    /// of `message`: an unknown name fails with
    /// [`CheckError::UnknownCheckedField`] instead of being skipped, so
    /// documents listing check fields their message lacks no longer load.
    pub fn new<S: AsRef<str>>(
        name: impl Into<String>,
        time: f64,
        tolerance: f64,
        check_mode: CheckMode,
        message: &Fields,
        fields_to_check: &[S],
    ) -> Result<Self, CheckError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(CheckError::InvalidTolerance(tolerance));
        }
        if let Some(unknown) = fields_to_check.iter().find(|f| !message.contains_key(f.as_ref())) {
            return Err(CheckError::UnknownCheckedField(unknown.as_ref().to_string()));
        }

        let checked_fields = message
            .iter()
            .filter(|(k, _)| fields_to_check.iter().any(|f| f.as_ref() == k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self { name: name.into(), time, tolerance, check_mode, checked_fields })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn check_mode(&self) -> CheckMode {
        self.check_mode
    }

    pub fn checked_fields(&self) -> &Fields {
        &self.checked_fields
    }

    /// Closed acceptance window `[time - tolerance, time + tolerance]`.
    pub fn window(&self) -> (f64, f64) {
        (self.time - self.tolerance, self.time + self.tolerance)
    }

    pub fn accepts_time(&self, time: f64) -> bool {
        let (start, end) = self.window();
        start <= time && time <= end
    }
}

// ---------------------------------------------------------------------------
// Pairing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Sides {
    Matched(ObservedMessage, Expectation),
    MessageOnly(ObservedMessage),
    ExpectationOnly(Expectation),
}

/// Zero-or-one message associated with zero-or-one expectation, never neither.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    sides: Sides,
    score: f64,
}

impl Pairing {
    /// # Panics
    ///
    /// Panics when both sides are absent: such a pairing is a logic fault.
    pub fn new(message: Option<ObservedMessage>, expectation: Option<Expectation>) -> Self {
        match (message, expectation) {
            (Some(m), Some(e)) => Self::matched(m, e),
            (Some(m), None) => Self::unexplained(m),
            (None, Some(e)) => Self::unmet(e),
            (None, None) => panic!("a pairing needs a message or an expectation"),
        }
    }

    pub fn matched(message: ObservedMessage, expectation: Expectation) -> Self {
        let score = pairing_score(Some(&message), Some(&expectation));
        Self { sides: Sides::Matched(message, expectation), score }
    }

    /// A message with no expectation.
    pub fn unexplained(message: ObservedMessage) -> Self {
        Self { sides: Sides::MessageOnly(message), score: SCORE_NO_EXPECTED }
    }

    /// An expectation with no message.
    pub fn unmet(expectation: Expectation) -> Self {
        let score = pairing_score(None, Some(&expectation));
        Self { sides: Sides::ExpectationOnly(expectation), score }
    }

    pub fn message(&self) -> Option<&ObservedMessage> {
        match &self.sides {
            Sides::Matched(m, _) | Sides::MessageOnly(m) => Some(m),
            Sides::ExpectationOnly(_) => None,
        }
    }

    pub fn expectation(&self) -> Option<&Expectation> {
        match &self.sides {
            Sides::Matched(_, e) | Sides::ExpectationOnly(e) => Some(e),
            Sides::MessageOnly(_) => None,
        }
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    /// Message time if present, else expectation time.
    pub fn time(&self) -> f64 {
        match &self.sides {
            Sides::Matched(m, _) | Sides::MessageOnly(m) => m.time(),
            Sides::ExpectationOnly(e) => e.time(),
        }
    }

    pub fn name(&self) -> &str {
        match &self.sides {
            Sides::Matched(_, e) | Sides::ExpectationOnly(e) => e.name(),
            Sides::MessageOnly(m) => m.name(),
        }
    }

    pub(crate) fn rank_key(&self) -> RankKey {
        RankKey {
            score: self.score,
            message_time: self.message().map(ObservedMessage::time),
            anchor_time: self.expectation().map_or_else(|| self.time(), Expectation::time),
            position: 0,
        }
    }

    /// Proposal ranking: pairings holding a message come first, by score,
    /// message time, then expectation time. The rest follow by expectation time.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        rank_order(&self.rank_key(), &other.rank_key())
    }
}

impl Serialize for Pairing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Pairing", 4)?;
        state.serialize_field("outcome", &self.outcome())?;
        state.serialize_field("score", &self.score)?;
        state.serialize_field("message", &self.message())?;
        state.serialize_field("expectation", &self.expectation())?;
        state.end()
    }
}

/// Score of a (message, expectation) combination.
///
/// With both sides present the score is the summed distance of every checked
/// field that differs; zero means all checked fields are equal.
pub fn pairing_score(message: Option<&ObservedMessage>, expectation: Option<&Expectation>) -> f64 {
    match (message, expectation) {
        (Some(m), Some(e)) => e
            .checked_fields()
            .iter()
            .map(|(key, expected)| match m.fields().get(key) {
                None => missing_field_penalty(expected),
                Some(observed) if values_equal(observed, expected) => 0.0,
                Some(observed) => field_distance(observed, expected),
            })
            .sum(),
        (None, Some(e)) if e.check_mode().is_rejection() => 0.0,
        (None, Some(_)) => SCORE_MATCH_NOT_FOUND,
        (Some(_), None) => SCORE_NO_EXPECTED,
        (None, None) => 0.0,
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RankKey {
    pub score: f64,
    pub message_time: Option<f64>,
    /// Expectation time.
    pub anchor_time: f64,
    /// Expectation input position, the last tie-breaker.
    pub position: usize,
}

/// Total order over proposals: (score, message time, expectation time,
/// expectation position) for proposals holding a message.
///
/// Proposals without a message always sort after those with one, instead of
/// comparing expectation times against them. They claim no message, so their
/// place relative to message-bearing proposals never changes a commit.
pub(crate) fn rank_order(a: &RankKey, b: &RankKey) -> Ordering {
    let anchor = |a: &RankKey, b: &RankKey| {
        a.anchor_time.total_cmp(&b.anchor_time).then(a.position.cmp(&b.position))
    };
    match (a.message_time, b.message_time) {
        (Some(ta), Some(tb)) => a
            .score
            .total_cmp(&b.score)
            .then_with(|| ta.total_cmp(&tb))
            .then_with(|| anchor(a, b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => anchor(a, b),
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Matched and every checked field is equal.
    Ok,
    /// Required expectation with no satisfying message.
    MatchNotFound,
    /// Matched, but at least one checked field differs.
    MatchError,
    /// Message no expectation accounts for.
    NoExpected,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::MatchNotFound => write!(f, "match_not_found"),
            Self::MatchError => write!(f, "match_error"),
            Self::NoExpected => write!(f, "no_expected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// Integer form of the verdict: 0 on pass, -1 on fail.
    pub fn exit_status(self) -> i32 {
        match self {
            Self::Pass => 0,
            Self::Fail => -1,
        }
    }

    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub total_pairings: usize,
    pub ok: usize,
    pub match_not_found: usize,
    pub match_error: usize,
    pub no_expected: usize,
    /// `not` expectations paired with an exactly-equal message.
    pub rejections_triggered: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckMeta {
    pub engine_version: String,
    pub run_at: String,
    pub ranking: RankingMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub meta: CheckMeta,
    pub verdict: Verdict,
    pub summary: CheckSummary,
    pub pairings: Vec<Pairing>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(v: Value) -> Fields {
        match v {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn expectation(mode: CheckMode, check: &[&str]) -> Expectation {
        Expectation::new(
            "msg_1",
            1000.0,
            100.0,
            mode,
            &fields(json!({"Field_1": 1, "Field_2": "ab", "Field_3": 3.4})),
            check,
        )
        .unwrap()
    }

    #[test]
    fn unchecked_fields_are_dropped() {
        let e = expectation(CheckMode::One, &["Field_3", "Field_1"]);
        let keys: Vec<&str> = e.checked_fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Field_1", "Field_3"]);
    }

    #[test]
    fn negative_tolerance_rejected() {
        let err = Expectation::new("m", 0.0, -1.0, CheckMode::One, &Fields::new(), &[] as &[&str])
            .unwrap_err();
        assert!(matches!(err, CheckError::InvalidTolerance(t) if t == -1.0));
    }

    #[test]
    fn checked_field_must_be_declared() {
        let err = Expectation::new("m", 0.0, 1.0, CheckMode::One, &Fields::new(), &["Nope"])
            .unwrap_err();
        assert!(matches!(err, CheckError::UnknownCheckedField(f) if f == "Nope"));
    }

    #[test]
    fn check_mode_tokens_case_insensitive() {
        assert_eq!(CheckMode::parse("ONE").unwrap(), CheckMode::One);
        assert_eq!(CheckMode::parse("Not").unwrap(), CheckMode::Not);
        assert_eq!(CheckMode::parse("more").unwrap(), CheckMode::More);
        assert!(CheckMode::parse("maybe").is_err());
    }

    #[test]
    fn score_of_exact_match_is_zero() {
        let e = expectation(CheckMode::One, &["Field_1", "Field_2"]);
        let m = ObservedMessage::new("msg_1", 1000.0, fields(json!({"Field_1": 1.0, "Field_2": "ab"})));
        assert_eq!(Pairing::matched(m, e).score(), 0.0);
    }

    #[test]
    fn score_sums_distance_and_missing_penalty() {
        let e = expectation(CheckMode::One, &["Field_1", "Field_2"]);
        // Field_1: 10 - 1 = 9; Field_2 missing: len("ab") + 1 = 3
        let m = ObservedMessage::new("msg_1", 1000.0, fields(json!({"Field_1": 10})));
        assert_eq!(Pairing::matched(m, e).score(), 12.0);
    }

    #[test]
    fn structural_scores() {
        let required = expectation(CheckMode::One, &["Field_1"]);
        let rejected = expectation(CheckMode::Not, &["Field_1"]);
        let m = ObservedMessage::new("msg_1", 1000.0, Fields::new());
        assert_eq!(Pairing::unmet(required).score(), SCORE_MATCH_NOT_FOUND);
        assert_eq!(Pairing::unmet(rejected).score(), 0.0);
        assert_eq!(Pairing::unexplained(m).score(), SCORE_NO_EXPECTED);
    }

    #[test]
    #[should_panic(expected = "a pairing needs a message or an expectation")]
    fn empty_pairing_is_a_logic_fault() {
        let _ = Pairing::new(None, None);
    }

    #[test]
    fn rank_prefers_lower_score_then_earlier_message() {
        let e = expectation(CheckMode::One, &["Field_1"]);
        let close = Pairing::matched(
            ObservedMessage::new("msg_1", 1050.0, fields(json!({"Field_1": 2}))),
            e.clone(),
        );
        let far = Pairing::matched(
            ObservedMessage::new("msg_1", 1010.0, fields(json!({"Field_1": 5}))),
            e.clone(),
        );
        let early_tie = Pairing::matched(
            ObservedMessage::new("msg_1", 1000.0, fields(json!({"Field_1": 2}))),
            e.clone(),
        );
        assert_eq!(close.rank_cmp(&far), Ordering::Less);
        assert_eq!(early_tie.rank_cmp(&close), Ordering::Less);
        assert_eq!(far.rank_cmp(&Pairing::unmet(e)), Ordering::Less);
    }

    #[test]
    fn rank_ties_go_to_earlier_expectation() {
        let key = |anchor_time, position| RankKey { score: 0.0, message_time: Some(11_200.0), anchor_time, position };
        assert_eq!(rank_order(&key(11_000.0, 1), &key(11_100.0, 0)), Ordering::Less);
        assert_eq!(rank_order(&key(11_000.0, 0), &key(11_000.0, 1)), Ordering::Less);
        assert_eq!(rank_order(&key(11_000.0, 1), &key(11_000.0, 1)), Ordering::Equal);
    }
}
