// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! `orc`: the client CLI for the inference orchestrator's HTTP job API.

mod client;
mod color;
mod commands;
mod env;
mod exit_error;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use client::OrchestratorClient;
use exit_error::ExitError;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "orc", version, about = "Submit and track jobs on the inference orchestrator", styles = color::styles())]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format for every subcommand.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Orchestrator base URL; defaults to `ORC_SERVER_URL` or localhost.
    #[arg(long, global = true)]
    server: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Submit a job spec file (HCL) to the orchestrator.
    Submit {
        /// Path to the job spec file.
        spec: PathBuf,
    },
    /// Poll a job's current state and progress.
    Status {
        /// Job id, as printed by `orc submit`.
        job_id: String,
    },
    /// Fetch a completed job's result handle.
    Result {
        job_id: String,
    },
    /// Request cancellation of a pending or running job.
    Cancel {
        job_id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let server = cli.server.unwrap_or_else(env::server_url);
    let client = OrchestratorClient::new(server, env::request_timeout());

    let outcome = match cli.command {
        Command::Submit { spec } => commands::submit::handle(&client, spec, cli.format).await,
        Command::Status { job_id } => commands::status::handle(&client, &job_id, cli.format).await,
        Command::Result { job_id } => commands::result::handle(&client, &job_id, cli.format).await,
        Command::Cancel { job_id } => commands::cancel::handle(&client, &job_id, cli.format).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(exit_err) = err.downcast_ref::<ExitError>() {
                eprintln!("error: {}", exit_err.message);
                ExitCode::from(exit_err.code as u8)
            } else {
                eprintln!("error: {err:#}");
                ExitCode::FAILURE
            }
        }
    }
}
