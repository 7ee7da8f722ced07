// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! orc-wire: the wire format shared by the topic bus and the client job API.
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload (spec §6.1).

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod codec;
mod envelope;
mod topics;

pub use client::{
    CancelOutcome, GetResultResponse, GetStatusResponse, NodeStatusEntry, Progress,
    ResultMetadata, SubmitJobRequest, SubmitJobResponse,
};
pub use codec::{decode, encode, read_frame, read_message, write_frame, write_message, ProtocolError};
pub use envelope::{Envelope, EnvelopeBody};
pub use topics::Topic;
