// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc cancel <job-id>`: request cancellation of a pending or running job.

use anyhow::Result;
use orc_core::JobId;
use orc_wire::CancelOutcome;

use crate::client::OrchestratorClient;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

pub async fn handle(client: &OrchestratorClient, job_id: &str, format: OutputFormat) -> Result<()> {
    let job_id = JobId::from_string(job_id);
    let outcome = client.cancel(&job_id).await?;

    if format == OutputFormat::Json {
        crate::output::print_json(&serde_json::json!({ "outcome": outcome_label(outcome) }))?;
        return match outcome {
            CancelOutcome::Ack => Ok(()),
            CancelOutcome::NotFound => Err(ExitError::new(1, format!("job {job_id} not found")).into()),
            CancelOutcome::AlreadyTerminal => Err(ExitError::new(1, format!("job {job_id} already terminal")).into()),
        };
    }

    match outcome {
        CancelOutcome::Ack => {
            println!("{}", crate::color::header("cancelled"));
            Ok(())
        }
        CancelOutcome::NotFound => Err(ExitError::new(1, format!("job {job_id} not found")).into()),
        CancelOutcome::AlreadyTerminal => Err(ExitError::new(1, format!("job {job_id} already terminal")).into()),
    }
}

fn outcome_label(outcome: CancelOutcome) -> &'static str {
    match outcome {
        CancelOutcome::Ack => "ack",
        CancelOutcome::NotFound => "not_found",
        CancelOutcome::AlreadyTerminal => "already_terminal",
    }
}
