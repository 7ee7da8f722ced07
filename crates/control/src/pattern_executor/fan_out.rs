// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! FanOut strategy (SPEC_FULL §4.2): same model, `spec.nodes`, fused.

use std::time::Instant;

use smol_str::SmolStr;
use tokio::task::JoinSet;

use orc_core::error::FusionErrorKind;
use orc_core::node::NodeRecord;
use orc_core::{Clock, ErrorKind, FanOutSpec, JobId, WorkItem};
use orc_storage::BlobHandle;

use crate::node_selector::SelectFilters;

use super::fusion;
use super::ExecCtx;

pub(crate) async fn run<C: Clock>(
    ctx: &ExecCtx<C>,
    job_id: JobId,
    spec: &FanOutSpec,
    global_deadline: Instant,
) -> Result<SmolStr, ErrorKind> {
    let selected: Vec<NodeRecord> = {
        let state = ctx.gateway.read();
        let filters = SelectFilters {
            minimum_reputation: spec.minimum_reputation,
            allowlist: Some(spec.nodes.clone()),
            ..Default::default()
        };
        ctx.selector
            .select(state.nodes.values(), &filters, spec.nodes.len())
            .map_err(ErrorKind::Spec)?
            .into_iter()
            .cloned()
            .collect()
    };

    let per_item_timeout = super::remaining(&ctx.clock, global_deadline).min(spec.timeout);

    let mut joins: JoinSet<(NodeRecord, Result<orc_core::PartialResult, ()>)> = JoinSet::new();
    for node in selected {
        let work = WorkItem::new(
            job_id,
            node.id.clone(),
            spec.model.clone(),
            spec.data.clone(),
            per_item_timeout,
            ctx.clock.now(),
        );
        let transport = ctx.transport.clone();
        let endpoint = node.endpoint.to_string();
        joins.spawn(async move {
            let dispatched = tokio::time::timeout(per_item_timeout, transport.dispatch(&endpoint, work)).await;
            match dispatched {
                Ok(Ok(result)) => (node, Ok(result)),
                _ => (node, Err(())),
            }
        });
    }

    let mut successes: Vec<(NodeRecord, BlobHandle)> = Vec::new();
    let total = joins.len();
    while let Some(joined) = joins.join_next().await {
        let Ok((node, outcome)) = joined else { continue };
        if let Ok(result) = outcome {
            if let orc_core::work_item::PartialOutcome::Ok(handle) = result.outcome {
                successes.push((node, BlobHandle(handle.to_string())));
            }
        }
    }

    let quorum = total.div_ceil(2);
    if successes.len() < quorum {
        return Err(ErrorKind::Fusion(FusionErrorKind::QuorumLost));
    }

    let mut vectors = Vec::with_capacity(successes.len());
    let mut weights = Vec::with_capacity(successes.len());
    for (node, handle) in &successes {
        let bytes = ctx
            .gateway
            .get_blob(handle)
            .await
            .map_err(|_| ErrorKind::Fusion(FusionErrorKind::QuorumLost))?;
        let vector: Vec<f64> =
            serde_json::from_slice(&bytes).map_err(|_| ErrorKind::Fusion(FusionErrorKind::QuorumLost))?;
        vectors.push(vector);
        weights.push(node.reputation);
    }

    let mut fused = match spec.aggregation {
        orc_core::AggregationKind::Mean => fusion::fuse_mean(&vectors),
        orc_core::AggregationKind::WeightedMean => fusion::fuse_weighted_mean(&vectors, &weights),
        orc_core::AggregationKind::Median => fusion::fuse_median(&vectors),
    };

    if let Some(privacy) = spec.privacy {
        let mut rng = rand::thread_rng();
        fusion::apply_laplace_noise(&mut fused, privacy.laplace_scale(), &mut rng);
    }

    let bytes = serde_json::to_vec(&fused).map_err(|_| ErrorKind::Fusion(FusionErrorKind::QuorumLost))?;
    let handle = ctx
        .gateway
        .put_blob(&bytes)
        .await
        .map_err(|_| ErrorKind::Fusion(FusionErrorKind::QuorumLost))?;
    Ok(SmolStr::new(handle.to_string()))
}

#[cfg(test)]
#[path = "fan_out_tests.rs"]
mod tests;
