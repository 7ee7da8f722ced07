// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Well-known bus topic names (spec §6.1). Defaults are stable; a deployment
//! may remap them through configuration, so this type carries both the
//! canonical tag and its default string name rather than hard-coding the
//! string at every call site.

use std::fmt;

/// A bus topic. Canonical names are the spec's defaults; `as_str` is what
/// gets published to/subscribed from the underlying bus adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    JobsUpdates,
    JobsCancel,
    NodesHeartbeat,
    OrchestratorHeartbeat,
    OrchestratorHandoff,
    ResultsReady,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::JobsUpdates,
        Topic::JobsCancel,
        Topic::NodesHeartbeat,
        Topic::OrchestratorHeartbeat,
        Topic::OrchestratorHandoff,
        Topic::ResultsReady,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::JobsUpdates => "jobs.updates",
            Topic::JobsCancel => "jobs.cancel",
            Topic::NodesHeartbeat => "nodes.heartbeat",
            Topic::OrchestratorHeartbeat => "orchestrator.heartbeat",
            Topic::OrchestratorHandoff => "orchestrator.handoff",
            Topic::ResultsReady => "results.ready",
        }
    }

    pub fn from_str(s: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[path = "topics_tests.rs"]
mod tests;
