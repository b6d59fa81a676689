use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::distance::values_equal;
use crate::model::{CheckSummary, Outcome, Pairing};

/// Compute per-outcome counts from retained pairings.
pub fn compute_summary(pairings: &[Pairing]) -> CheckSummary {
    let mut summary = CheckSummary { total_pairings: pairings.len(), ..CheckSummary::default() };

    for p in pairings {
        match p.outcome() {
            Outcome::Ok => summary.ok += 1,
            Outcome::MatchNotFound => summary.match_not_found += 1,
            Outcome::MatchError => summary.match_error += 1,
            Outcome::NoExpected => summary.no_expected += 1,
        }
        if p.is_triggered_rejection() {
            summary.rejections_triggered += 1;
        }
    }

    summary
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Matched,
    Mismatched,
    /// Checked, but the message does not carry the field.
    Absent,
    /// Present on the message only.
    Unchecked,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldComparison {
    pub field: String,
    pub expected: Option<Value>,
    pub observed: Option<Value>,
    pub status: FieldStatus,
}

impl Pairing {
    /// One entry per field either side knows about, sorted by field name.
    pub fn field_comparisons(&self) -> Vec<FieldComparison> {
        let expected = self.expectation().map(|e| e.checked_fields());
        let observed = self.message().map(|m| m.fields());

        let names: BTreeSet<&String> = expected
            .into_iter()
            .flat_map(|f| f.keys())
            .chain(observed.into_iter().flat_map(|f| f.keys()))
            .collect();

        names
            .into_iter()
            .map(|name| {
                let exp = expected.and_then(|f| f.get(name));
                let obs = observed.and_then(|f| f.get(name));
                let status = match (exp, obs) {
                    (None, _) => FieldStatus::Unchecked,
                    (Some(_), None) => FieldStatus::Absent,
                    (Some(e), Some(o)) if values_equal(e, o) => FieldStatus::Matched,
                    (Some(_), Some(_)) => FieldStatus::Mismatched,
                };
                FieldComparison {
                    field: name.clone(),
                    expected: exp.cloned(),
                    observed: obs.cloned(),
                    status,
                }
            })
            .collect()
    }

    /// `expectation.time ± tolerance`, when an expectation is present.
    pub fn window(&self) -> Option<(f64, f64)> {
        self.expectation().map(|e| e.window())
    }
}
