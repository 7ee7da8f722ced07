// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! orc-adapters: concrete implementations of the seams the core design
//! treats as external collaborators (spec §1 "out of scope") — the topic
//! broadcast bus and the orchestrator↔node transport. `orc-storage` already
//! owns the blob store and mutable-name registry adapters.

pub mod bus;
pub mod transport;

pub use bus::{BusAdapter, BusError, InMemoryBus};
pub use transport::{NodeTransport, TcpNodeTransport, TransportError};

#[cfg(any(test, feature = "test-support"))]
pub mod fake;
