// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consensus strategy (SPEC_FULL §4.2): several models, one node, one
//! label. The node executes every model sequentially against the same
//! inputs; a single model's failure only drops that model's vote rather
//! than failing the job.

use std::collections::HashMap;
use std::time::Instant;

use smol_str::SmolStr;

use orc_core::error::FusionErrorKind;
use orc_core::work_item::PartialOutcome;
use orc_core::{Clock, ConsensusKind, ConsensusSpec, ErrorKind, JobId, WorkItem};

use super::ExecCtx;

pub(crate) async fn run<C: Clock>(
    ctx: &ExecCtx<C>,
    job_id: JobId,
    spec: &ConsensusSpec,
    global_deadline: Instant,
) -> Result<SmolStr, ErrorKind> {
    let endpoint = {
        let state = ctx.gateway.read();
        state
            .nodes
            .get(spec.node.as_str())
            .filter(|node| node.status.is_selectable())
            .map(|node| node.endpoint.to_string())
            .ok_or(super::node_unavailable())?
    };

    let per_item_timeout = super::remaining(&ctx.clock, global_deadline).min(spec.timeout);

    // Votes, in `spec.models` order; `None` marks an absent (failed) vote.
    let mut votes: Vec<Option<SmolStr>> = Vec::with_capacity(spec.models.len());
    for model in &spec.models {
        let work = WorkItem::new(
            job_id,
            spec.node.clone(),
            model.clone(),
            spec.data.clone(),
            per_item_timeout,
            ctx.clock.now(),
        );
        let dispatched = tokio::time::timeout(per_item_timeout, ctx.transport.dispatch(&endpoint, work)).await;
        let vote = match dispatched {
            Ok(Ok(result)) => match result.outcome {
                PartialOutcome::Ok(handle) => Some(handle),
                PartialOutcome::Err(_) => None,
            },
            _ => None,
        };
        votes.push(vote);
    }

    match spec.consensus {
        ConsensusKind::Majority => majority(&votes),
        ConsensusKind::Weighted => weighted(&votes, spec),
        ConsensusKind::Review => review(&votes, spec.minimum_agreement),
    }
}

fn majority(votes: &[Option<SmolStr>]) -> Result<SmolStr, ErrorKind> {
    let mut counts: HashMap<&SmolStr, usize> = HashMap::new();
    for vote in votes.iter().flatten() {
        *counts.entry(vote).or_insert(0) += 1;
    }
    top_label(&counts).ok_or(ErrorKind::Fusion(FusionErrorKind::NoConsensus))
}

fn weighted(votes: &[Option<SmolStr>], spec: &ConsensusSpec) -> Result<SmolStr, ErrorKind> {
    let mut weights: HashMap<&SmolStr, f64> = HashMap::new();
    let mut total = 0.0;
    for (i, vote) in votes.iter().enumerate() {
        let Some(label) = vote else { continue };
        let weight = spec
            .model_weights
            .as_ref()
            .and_then(|w| w.get(i).copied())
            .unwrap_or(1.0);
        *weights.entry(label).or_insert(0.0) += weight;
        total += weight;
    }
    if total <= 0.0 {
        return Err(ErrorKind::Fusion(FusionErrorKind::NoConsensus));
    }
    let (label, share) = weights
        .into_iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .ok_or(ErrorKind::Fusion(FusionErrorKind::NoConsensus))?;
    if share / total < spec.minimum_agreement {
        return Err(ErrorKind::Fusion(FusionErrorKind::NoConsensus));
    }
    Ok(label.clone())
}

fn review(votes: &[Option<SmolStr>], minimum_agreement: f64) -> Result<SmolStr, ErrorKind> {
    let mut counts: HashMap<&SmolStr, usize> = HashMap::new();
    let present = votes.iter().flatten().count();
    for vote in votes.iter().flatten() {
        *counts.entry(vote).or_insert(0) += 1;
    }
    let Some((label, count)) = counts
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(label, count)| ((*label).clone(), *count))
    else {
        return Err(ErrorKind::Fusion(FusionErrorKind::ReviewRequired));
    };
    if present == 0 || (count as f64) / (present as f64) < minimum_agreement {
        tracing::warn!(?votes, "consensus below agreement threshold, flagging for review");
        return Err(ErrorKind::Fusion(FusionErrorKind::ReviewRequired));
    }
    Ok(label)
}

fn top_label<'a>(counts: &HashMap<&'a SmolStr, usize>) -> Option<SmolStr> {
    let mut best: Option<(&SmolStr, usize)> = None;
    let mut tied = false;
    for (label, count) in counts {
        match best {
            None => best = Some((label, *count)),
            Some((_, best_count)) if *count > best_count => {
                best = Some((label, *count));
                tied = false;
            }
            Some((_, best_count)) if *count == best_count => tied = true,
            _ => {}
        }
    }
    if tied {
        return None;
    }
    best.map(|(label, _)| label.clone())
}

#[cfg(test)]
#[path = "consensus_tests.rs"]
mod tests;
