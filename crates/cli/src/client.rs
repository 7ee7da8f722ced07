// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin `reqwest` wrapper over the orchestrator's HTTP client job API
//! (`orc-orchestratord`'s `/jobs` routes, SPEC_FULL §6). Every method maps
//! one DTO from `orc_wire` to one request.

use thiserror::Error;

use orc_core::JobId;
use orc_wire::{CancelOutcome, GetResultResponse, GetStatusResponse, SubmitJobRequest, SubmitJobResponse};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("could not reach the orchestrator at {url}: {source}")]
    Connect { url: String, source: reqwest::Error },
    #[error("job {0} was not found")]
    NotFound(JobId),
    #[error("the orchestrator rejected the request: {0}")]
    Rejected(String),
    #[error("malformed response from the orchestrator: {0}")]
    Decode(reqwest::Error),
}

pub struct OrchestratorClient {
    http: reqwest::Client,
    base_url: String,
}

impl OrchestratorClient {
    pub fn new(base_url: impl Into<String>, timeout: std::time::Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        if response.status().is_success() {
            return Ok(response);
        }
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::Rejected("not_found".to_string()));
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Rejected(body))
    }

    pub async fn submit(&self, request: &SubmitJobRequest) -> Result<SubmitJobResponse, ClientError> {
        let url = self.url("/jobs");
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|source| ClientError::Connect { url, source })?;
        let response = self.check(response).await?;
        response.json().await.map_err(ClientError::Decode)
    }

    pub async fn status(&self, job_id: &JobId) -> Result<GetStatusResponse, ClientError> {
        let url = self.url(&format!("/jobs/{job_id}"));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Connect { url, source })?;
        let response = self.check(response).await?;
        response.json().await.map_err(ClientError::Decode)
    }

    pub async fn result(&self, job_id: &JobId) -> Result<GetResultResponse, ClientError> {
        let url = self.url(&format!("/jobs/{job_id}/result"));
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| ClientError::Connect { url, source })?;
        let response = self.check(response).await?;
        response.json().await.map_err(ClientError::Decode)
    }

    pub async fn cancel(&self, job_id: &JobId) -> Result<CancelOutcome, ClientError> {
        let url = self.url(&format!("/jobs/{job_id}"));
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|source| ClientError::Connect { url, source })?;
        match response.status() {
            reqwest::StatusCode::OK => Ok(CancelOutcome::Ack),
            reqwest::StatusCode::NOT_FOUND => Ok(CancelOutcome::NotFound),
            reqwest::StatusCode::CONFLICT => Ok(CancelOutcome::AlreadyTerminal),
            _ => Err(ClientError::Rejected(response.text().await.unwrap_or_default())),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
