// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `orc-worker`: the isolated inference worker process (spec §4.9). Reads
//! one `WorkerRequest` from stdin, invokes the opaque model capability, and
//! writes one `WorkerResponse` to stdout. Exits non-zero only on malformed
//! input — the supervisor treats that exit code as `WorkerCrashed`.

use std::io::{self, Read, Write};

use orc_worker_exec::{invoke, WorkerOutcome, WorkerRequest, WorkerResponse};

fn main() {
    if let Err(err) = run() {
        eprintln!("orc-worker: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut raw = String::new();
    io::stdin()
        .read_to_string(&mut raw)
        .map_err(|err| format!("reading request: {err}"))?;
    let request: WorkerRequest =
        serde_json::from_str(&raw).map_err(|err| format!("decoding request: {err}"))?;

    let response = match std::fs::read(&request.model_path) {
        Ok(model_bytes) => WorkerResponse {
            outcome: WorkerOutcome::Ok(invoke(&model_bytes, &request.input_bytes)),
        },
        Err(err) => WorkerResponse {
            outcome: WorkerOutcome::Err(format!("reading model artifact: {err}")),
        },
    };

    let encoded = serde_json::to_vec(&response).map_err(|err| format!("encoding response: {err}"))?;
    io::stdout()
        .write_all(&encoded)
        .map_err(|err| format!("writing response: {err}"))?;
    Ok(())
}
