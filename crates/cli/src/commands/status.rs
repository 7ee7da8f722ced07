// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc status <job-id>`: poll a job's current state and progress.

use anyhow::Result;
use orc_core::JobId;

use crate::client::OrchestratorClient;
use crate::output::{field, print_json, OutputFormat};

pub async fn handle(client: &OrchestratorClient, job_id: &str, format: OutputFormat) -> Result<()> {
    let job_id = JobId::from_string(job_id);
    let response = client.status(&job_id).await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Text => {
            println!("{}", crate::color::header(&response.pattern));
            field("state", &response.state);
            field(
                "progress",
                format!("{}/{} ({:.0}%)", response.progress.completed, response.progress.total, response.progress.percent),
            );
            if let Some(cost) = response.cost_so_far {
                field("cost_so_far", cost);
            }
            if let Some(error) = &response.error {
                field("error", error);
            }
            if let Some(nodes) = &response.per_node_status {
                for node in nodes {
                    println!("  {} {}", crate::color::literal(node.node_id.as_str()), node.status);
                }
            }
        }
    }
    Ok(())
}
