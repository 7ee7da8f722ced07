// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! orc-specfmt: parses the HCL job spec files `orc submit` accepts into
//! `orc_wire::client::SubmitJobRequest`s.

pub mod document;
pub mod duration;
pub mod error;

pub use document::{parse_file, parse_str, SpecDocument};
pub use error::SpecFmtError;
