// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::HashMap;

/// Look up by exact key, then by unique prefix (git-commit-hash style),
/// so CLI callers can address entities with a short, typed suffix.
pub(crate) fn find_by_prefix<'a, V>(map: &'a HashMap<String, V>, id: &str) -> Option<&'a V> {
    if let Some(value) = map.get(id) {
        return Some(value);
    }
    let mut matches = map.iter().filter(|(key, _)| key.starts_with(id));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first.1)
}
