// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc submit`: parse a job spec file and hand it to the orchestrator.

use std::path::PathBuf;

use anyhow::Result;

use crate::client::OrchestratorClient;
use crate::output::{field, print_json, OutputFormat};

pub async fn handle(client: &OrchestratorClient, spec_path: PathBuf, format: OutputFormat) -> Result<()> {
    let document = orc_specfmt::parse_file(&spec_path)?;
    let request = document.into_request()?;
    let response = client.submit(&request).await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Text => {
            println!("{}", crate::color::header("submitted"));
            field("job_id", response.job_id);
            field("state", &response.state);
        }
    }
    Ok(())
}
