// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job event handlers.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use orc_core::Job;

use super::MaterializedState;
use crate::events::Event;

/// Translate a persisted epoch-millis submission time into an `Instant`
/// relative to the *current* monotonic clock, so a job's age reflects real
/// elapsed wall-clock time regardless of when the log is replayed.
fn submitted_at_from_epoch_ms(epoch_ms: u64) -> Instant {
    let submitted = UNIX_EPOCH + Duration::from_millis(epoch_ms);
    let elapsed = SystemTime::now().duration_since(submitted).unwrap_or_default();
    Instant::now().checked_sub(elapsed).unwrap_or_else(Instant::now)
}

pub(crate) fn apply(state: &mut MaterializedState, event: &Event) {
    match event {
        Event::JobSubmitted {
            job_id,
            spec,
            owner,
            priority,
            cost_ceiling,
            owner_replica,
            submitted_at_epoch_ms,
        } => {
            // Idempotent: replaying the same submission twice must not
            // reset a job that has already advanced past Pending.
            if state.jobs.contains_key(job_id.as_str()) {
                return;
            }
            let job = Job::new(
                *job_id,
                spec.clone(),
                owner.clone(),
                *priority,
                *cost_ceiling,
                owner_replica.clone(),
                submitted_at_from_epoch_ms(*submitted_at_epoch_ms),
            );
            state
                .job_owners
                .insert(job_id.as_str().to_string(), owner_replica.to_string());
            state.jobs.insert(job_id.as_str().to_string(), job);
        }

        Event::JobStateChanged { job_id, state: next } => {
            if let Some(job) = state.jobs.get_mut(job_id.as_str()) {
                // `transition` itself rejects illegal edges; a replayed
                // no-op transition (same state twice) is simply ignored.
                let _ = job.transition(next.clone());
            }
        }

        Event::JobOwnerChanged { job_id, new_owner } => {
            state
                .job_owners
                .insert(job_id.as_str().to_string(), new_owner.to_string());
            if let Some(job) = state.jobs.get_mut(job_id.as_str()) {
                job.owner_replica = new_owner.clone();
            }
        }

        Event::JobIndexSwept { job_id } => {
            state.jobs.remove(job_id.as_str());
            state.job_owners.remove(job_id.as_str());
        }

        _ => {}
    }
}
