// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tags for the fusion/consensus strategies a job spec can select.
//!
//! The arithmetic that interprets these tags belongs to the control tier's
//! `PatternExecutor` (`orc-control`); this crate only owns the vocabulary so
//! that `JobSpec` can name a strategy without depending on how it runs.

use serde::{Deserialize, Serialize};

/// How FanOut partial results are combined into one result (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    Mean,
    WeightedMean,
    Median,
}

crate::simple_display! {
    AggregationKind {
        Mean => "mean",
        WeightedMean => "weighted_mean",
        Median => "median",
    }
}

/// How Consensus votes are combined into one label (spec §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusKind {
    Majority,
    Weighted,
    Review,
}

crate::simple_display! {
    ConsensusKind {
        Majority => "majority",
        Weighted => "weighted",
        Review => "review",
    }
}
