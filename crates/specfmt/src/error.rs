// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecFmtError {
    #[error("could not read spec file {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("malformed spec document: {0}")]
    Hcl(#[from] hcl::Error),
    #[error("invalid duration {0:?}: expected a number followed by s/ms/m/h")]
    BadDuration(String),
}
