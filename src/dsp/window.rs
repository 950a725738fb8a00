//! Window functions for sinusoidal analysis and synthesis.
//!
//! Cosine-sum windows come in two flavours: *symmetric* (denominator `M - 1`,
//! used for filter design and the synthesis side) and *periodic* (denominator
//! `M`, the "FFT bins" form). [`get_window`] picks between them from the
//! window length the same way the analysis presets expect: even lengths get the
//! periodic form, odd lengths the symmetric one.

use serde::Deserialize;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Blackman-Harris window coefficients (4-term).
pub const BH_COEFFS: [f64; 4] = [0.35875, 0.48829, 0.14128, 0.01168];

const HANN_COEFFS: [f64; 2] = [0.5, 0.5];
const HAMMING_COEFFS: [f64; 2] = [0.54, 0.46];
const BLACKMAN_COEFFS: [f64; 3] = [0.42, 0.5, 0.08];

/// Window function types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    #[serde(alias = "boxcar")]
    Rectangular,
    #[serde(alias = "hanning")]
    Hann,
    Hamming,
    Blackman,
    #[serde(alias = "blackman-harris")]
    BlackmanHarris,
    #[serde(alias = "triang")]
    Triangular,
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowKind::Rectangular => "rectangular",
            WindowKind::Hann => "hann",
            WindowKind::Hamming => "hamming",
            WindowKind::Blackman => "blackman",
            WindowKind::BlackmanHarris => "blackmanharris",
            WindowKind::Triangular => "triangular",
        };
        f.write_str(name)
    }
}

impl FromStr for WindowKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangular" | "boxcar" => Ok(WindowKind::Rectangular),
            "hann" | "hanning" => Ok(WindowKind::Hann),
            "hamming" => Ok(WindowKind::Hamming),
            "blackman" => Ok(WindowKind::Blackman),
            "blackmanharris" | "blackman-harris" => Ok(WindowKind::BlackmanHarris),
            "triangular" | "triang" => Ok(WindowKind::Triangular),
            other => Err(format!("unknown window type '{}'", other)),
        }
    }
}

/// Generates an analysis window, periodic for even `size` and symmetric for odd.
pub fn get_window(kind: WindowKind, size: usize) -> Vec<f64> {
    generate_window(kind, size, size % 2 == 1)
}

/// Generates a window of the given type and length.
pub fn generate_window(kind: WindowKind, size: usize, symmetric: bool) -> Vec<f64> {
    match kind {
        WindowKind::Rectangular => vec![1.0; size],
        WindowKind::Hann => cosine_sum(&HANN_COEFFS, size, symmetric),
        WindowKind::Hamming => cosine_sum(&HAMMING_COEFFS, size, symmetric),
        WindowKind::Blackman => cosine_sum(&BLACKMAN_COEFFS, size, symmetric),
        WindowKind::BlackmanHarris => cosine_sum(&BH_COEFFS, size, symmetric),
        WindowKind::Triangular => {
            if symmetric {
                triangular(size)
            } else {
                let mut w = triangular(size + 1);
                w.truncate(size);
                w
            }
        }
    }
}

/// Symmetric Blackman-Harris window of `size` points.
pub fn blackman_harris(size: usize) -> Vec<f64> {
    cosine_sum(&BH_COEFFS, size, true)
}

/// Causal and anticausal half lengths of a window: `((len + 1) / 2, len / 2)`.
#[inline]
pub fn half_lengths(len: usize) -> (usize, usize) {
    ((len + 1) / 2, len / 2)
}

/// Returns `Some(trivial_window)` for degenerate sizes (0 or 1).
#[inline]
fn trivial_window(size: usize) -> Option<Vec<f64>> {
    match size {
        0 => Some(vec![]),
        1 => Some(vec![1.0]),
        _ => None,
    }
}

/// Generalized cosine window `sum_k (-1)^k a_k cos(2 pi k n / D)`.
fn cosine_sum(coeffs: &[f64], size: usize, symmetric: bool) -> Vec<f64> {
    if let Some(w) = trivial_window(size) {
        return w;
    }
    let denom = (if symmetric { size - 1 } else { size }) as f64;
    (0..size)
        .map(|n| {
            let x = 2.0 * PI * n as f64 / denom;
            coeffs
                .iter()
                .enumerate()
                .map(|(k, &a)| {
                    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                    sign * a * (k as f64 * x).cos()
                })
                .sum()
        })
        .collect()
}

/// Symmetric triangular window whose end points are non-zero.
fn triangular(size: usize) -> Vec<f64> {
    if let Some(w) = trivial_window(size) {
        return w;
    }
    let half = (size + 1) / 2;
    let rising: Vec<f64> = if size % 2 == 0 {
        (1..=half)
            .map(|n| (2 * n - 1) as f64 / size as f64)
            .collect()
    } else {
        (1..=half)
            .map(|n| 2.0 * n as f64 / (size + 1) as f64)
            .collect()
    };
    let mirrored = if size % 2 == 0 { half } else { half - 1 };
    let mut w = rising.clone();
    w.extend(rising[..mirrored].iter().rev());
    w
}
