// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human-friendly duration literals for spec documents (`"30s"`, `"5m"`,
//! `"1h"`), parsed eagerly at load time since `JobSpec`'s own `Duration`
//! fields carry no unit of their own.

use std::time::Duration;

use crate::error::SpecFmtError;

pub fn parse(text: &str) -> Result<Duration, SpecFmtError> {
    let text = text.trim();
    let split_at = text
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(text.len());
    let (value, unit) = text.split_at(split_at);
    let value: f64 = value
        .parse()
        .map_err(|_| SpecFmtError::BadDuration(text.to_string()))?;
    let seconds = match unit.trim() {
        "s" | "" => value,
        "ms" => value / 1_000.0,
        "m" => value * 60.0,
        "h" => value * 3_600.0,
        _ => return Err(SpecFmtError::BadDuration(text.to_string())),
    };
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(SpecFmtError::BadDuration(text.to_string()));
    }
    Ok(Duration::from_secs_f64(seconds))
}

#[cfg(test)]
#[path = "duration_tests.rs"]
mod tests;
