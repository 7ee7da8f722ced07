// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! orc-storage: the only layer that talks to the content-addressed blob
//! store and the mutable-name registry (spec §6.1). Everything else reaches
//! persisted state through `StateGateway`; in-memory views are a
//! `MaterializedState` rebuilt by replaying a write-ahead log of `Event`s —
//! events are facts, state is derived (SPEC_FULL §2.2).

pub mod blob;
pub mod events;
pub mod gateway;
pub mod migration;
pub mod registry;
pub mod state;
pub mod wal;

pub use blob::{BlobHandle, BlobStore, FsBlobStore, StorageError};
pub use events::Event;
pub use gateway::StateGateway;
pub use migration::{Migration, MigrationError, MigrationRegistry};
pub use registry::{FsNameRegistry, MutableNameRegistry};
pub use state::MaterializedState;
pub use wal::{Wal, WalEntry};
