// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fusion arithmetic for the FanOut pattern (spec §4.2). Pure functions over
//! already-decoded numeric vectors; `fan_out.rs` owns fetching partials from
//! the blob store and calling into here.

use rand::Rng;

/// Elementwise mean across partials. Assumes all vectors share a length;
/// callers validate this before calling (mismatched shapes are a
/// `FusionErrorKind::QuorumLost`-adjacent caller concern, not arithmetic).
pub fn fuse_mean(vectors: &[Vec<f64>]) -> Vec<f64> {
    let len = vectors[0].len();
    let mut out = vec![0.0; len];
    for vector in vectors {
        for (slot, value) in out.iter_mut().zip(vector) {
            *slot += value;
        }
    }
    let n = vectors.len() as f64;
    out.iter_mut().for_each(|v| *v /= n);
    out
}

/// Elementwise weighted mean, weights normalized to sum to 1.
pub fn fuse_weighted_mean(vectors: &[Vec<f64>], weights: &[f64]) -> Vec<f64> {
    let total: f64 = weights.iter().sum();
    let normalized: Vec<f64> = if total > 0.0 {
        weights.iter().map(|w| w / total).collect()
    } else {
        vec![1.0 / weights.len() as f64; weights.len()]
    };

    let len = vectors[0].len();
    let mut out = vec![0.0; len];
    for (vector, weight) in vectors.iter().zip(&normalized) {
        for (slot, value) in out.iter_mut().zip(vector) {
            *slot += value * weight;
        }
    }
    out
}

/// Elementwise median. For an even count, ties are broken by picking the
/// lower-middle element after a stable sort rather than averaging the two
/// middle values (spec §4.2 "ties broken by element index (stable)").
pub fn fuse_median(vectors: &[Vec<f64>]) -> Vec<f64> {
    let len = vectors[0].len();
    let mut out = vec![0.0; len];
    for i in 0..len {
        let mut column: Vec<f64> = vectors.iter().map(|v| v[i]).collect();
        column.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = (column.len() - 1) / 2;
        out[i] = column[mid];
    }
    out
}

/// Zero-mean Laplace noise with the given scale (`sensitivity/epsilon`,
/// spec §4.2), applied elementwise post-fusion. Sampled via inverse CDF
/// from a uniform draw rather than a library distribution, since the scale
/// is already resolved to a single `f64` by `PrivacyParams::laplace_scale`.
pub fn apply_laplace_noise(values: &mut [f64], scale: f64, rng: &mut impl Rng) {
    for value in values.iter_mut() {
        let u: f64 = rng.gen_range(-0.5..0.5);
        let noise = -scale * u.signum() * (1.0 - 2.0 * u.abs()).ln();
        *value += noise;
    }
}

#[cfg(test)]
#[path = "fusion_tests.rs"]
mod tests;
