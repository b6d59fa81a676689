use crate::model::{Outcome, Pairing, Verdict, SCORE_MATCH_NOT_FOUND, SCORE_NO_EXPECTED};

impl Outcome {
    /// Score-only mapping: `0` ok, `-1` no expected, `-2` match not found,
    /// anything else a mismatch.
    pub fn from_score(score: f64) -> Self {
        if score == 0.0 {
            Self::Ok
        } else if score == SCORE_NO_EXPECTED {
            Self::NoExpected
        } else if score == SCORE_MATCH_NOT_FOUND {
            Self::MatchNotFound
        } else {
            Self::MatchError
        }
    }

    /// Outcomes that do not fail a run.
    pub fn is_acceptable(self) -> bool {
        matches!(self, Self::Ok | Self::NoExpected)
    }
}

/// Classifies a pairing by its score alone.
///
/// A two-sided pairing whose field distance happens to equal `-1` therefore
/// reads as `NoExpected` and does not fail the run.
pub fn classify(pairing: &Pairing) -> Outcome {
    Outcome::from_score(pairing.score())
}

impl Pairing {
    pub fn outcome(&self) -> Outcome {
        classify(self)
    }

    /// A `not` expectation paired with a message whose checked fields are equal.
    pub fn is_triggered_rejection(&self) -> bool {
        self.message().is_some()
            && self.expectation().is_some_and(|e| e.check_mode().is_rejection())
            && self.score() == 0.0
    }
}

/// Run verdict: fail when any pairing is neither `Ok` nor `NoExpected`.
pub fn verdict(pairings: &[Pairing]) -> Verdict {
    if pairings.iter().all(|p| p.outcome().is_acceptable()) {
        Verdict::Pass
    } else {
        Verdict::Fail
    }
}
