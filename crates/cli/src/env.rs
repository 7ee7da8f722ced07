// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI binary (mirrors
//! `orc-control`/`orc-node`'s own `env` modules).

/// Base URL of the orchestrator's HTTP client API. Matches
/// `orc_control::env::http_bind_addr`'s default port.
pub fn server_url() -> String {
    std::env::var("ORC_SERVER_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

/// Per-request timeout for calls to the orchestrator.
pub fn request_timeout() -> std::time::Duration {
    std::env::var("ORC_CLI_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(std::time::Duration::from_millis)
        .unwrap_or(std::time::Duration::from_secs(30))
}
