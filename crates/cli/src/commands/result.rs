// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc result <job-id>`: fetch a completed job's output handle.

use anyhow::Result;
use orc_core::JobId;
use orc_wire::GetResultResponse;

use crate::client::OrchestratorClient;
use crate::exit_error::ExitError;
use crate::output::{field, print_json, OutputFormat};

pub async fn handle(client: &OrchestratorClient, job_id: &str, format: OutputFormat) -> Result<()> {
    let job_id = JobId::from_string(job_id);
    let response = client.result(&job_id).await?;

    if format == OutputFormat::Json {
        print_json(&response)?;
        return Ok(());
    }

    match response {
        GetResultResponse::Ready { handle, metadata } => {
            println!("{}", crate::color::header("ready"));
            field("handle", handle);
            field("nodes_used", metadata.nodes_used.len());
            field("elapsed_ms", metadata.total_elapsed_ms);
            field("total_cost", metadata.total_cost);
            Ok(())
        }
        GetResultResponse::NotReady => {
            println!("not ready yet");
            Ok(())
        }
        GetResultResponse::Failed { error } => Err(ExitError::new(1, error.to_string()).into()),
    }
}
