use tracing::{debug, info, warn};

use crate::classify::verdict;
use crate::config::{CheckOptions, RankingMode};
use crate::matcher::{search_candidates, Proposal};
use crate::model::{rank_order, CheckMeta, CheckResult, Expectation, ObservedMessage, Pairing, RankKey};
use crate::summary::compute_summary;

/// Run one verification. Returns classified pairings + summary + verdict.
pub fn run(
    expectations: Vec<Expectation>,
    messages: Vec<ObservedMessage>,
    options: &CheckOptions,
) -> CheckResult {
    let pairings = assign(expectations, messages, options.ranking);
    let summary = compute_summary(&pairings);
    let verdict = verdict(&pairings);

    info!(
        pairings = summary.total_pairings,
        ok = summary.ok,
        match_error = summary.match_error,
        match_not_found = summary.match_not_found,
        no_expected = summary.no_expected,
        %verdict,
        "check complete"
    );

    CheckResult {
        meta: CheckMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            ranking: options.ranking,
        },
        verdict,
        summary,
        pairings,
    }
}

/// Greedy one-to-one assignment of messages to expectations.
///
/// Every expectation and every message ends up in exactly one returned
/// pairing. The result is ordered by message time, else expectation time.
pub fn assign(
    expectations: Vec<Expectation>,
    messages: Vec<ObservedMessage>,
    ranking: RankingMode,
) -> Vec<Pairing> {
    let mut proposals: Vec<Proposal> = expectations
        .iter()
        .enumerate()
        .flat_map(|(ei, e)| search_candidates(ei, e, &messages, ranking))
        .collect();

    // Stable: proposals of one expectation with equal keys keep candidate rank
    proposals.sort_by(|a, b| {
        rank_order(
            &proposal_key(a, &expectations, &messages),
            &proposal_key(b, &expectations, &messages),
        )
    });

    // Available pools. Committing a pairing takes its entities out.
    let mut available_messages: Vec<Option<ObservedMessage>> = messages.into_iter().map(Some).collect();
    let mut available_expectations: Vec<Option<Expectation>> =
        expectations.into_iter().map(Some).collect();

    let mut retained: Vec<Pairing> = Vec::with_capacity(available_messages.len() + available_expectations.len());

    for proposal in &proposals {
        if available_expectations[proposal.expectation].is_none() {
            continue;
        }
        if let Some(mi) = proposal.message {
            if available_messages[mi].is_none() {
                continue;
            }
        }

        let message = proposal.message.and_then(|mi| available_messages[mi].take());
        let expectation = available_expectations[proposal.expectation].take();
        let pairing = Pairing::new(message, expectation);

        debug!(
            expectation = proposal.expectation,
            message = ?proposal.message,
            score = pairing.score(),
            "committed pairing"
        );
        retained.push(pairing);
    }

    retained.extend(available_messages.into_iter().flatten().map(Pairing::unexplained));

    for expectation in available_expectations.into_iter().flatten() {
        warn!(name = expectation.name(), time = expectation.time(), "expectation left without proposal");
        retained.push(Pairing::unmet(expectation));
    }

    retained.sort_by(|a, b| a.time().total_cmp(&b.time()));
    retained
}

fn proposal_key(p: &Proposal, expectations: &[Expectation], messages: &[ObservedMessage]) -> RankKey {
    RankKey {
        score: p.score,
        message_time: p.message.map(|mi| messages[mi].time()),
        anchor_time: expectations[p.expectation].time(),
        position: p.expectation,
    }
}
