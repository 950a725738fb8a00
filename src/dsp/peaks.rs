//! Spectral peak picking and parabolic refinement.

use crate::error::{Result, SynthesisError};

/// Peaks refined to sub-bin precision. All three vectors have equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpolatedPeaks {
    /// Fractional bin locations.
    pub bins: Vec<f64>,
    /// Interpolated magnitudes in dB.
    pub magnitudes: Vec<f64>,
    /// Interpolated phases in radians.
    pub phases: Vec<f64>,
}

impl InterpolatedPeaks {
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Indices of interior local maxima whose magnitude exceeds `threshold_db`.
///
/// The first and last bins are never reported. Plateaus are not peaks.
pub fn detect_peaks(magnitude_db: &[f64], threshold_db: f64) -> Vec<usize> {
    if magnitude_db.len() < 3 {
        return Vec::new();
    }
    (1..magnitude_db.len() - 1)
        .filter(|&k| {
            let v = magnitude_db[k];
            v > threshold_db && v > magnitude_db[k - 1] && v > magnitude_db[k + 1]
        })
        .collect()
}

/// Refines each peak by fitting a parabola through it and its two neighbours.
///
/// The phase is linearly interpolated at the refined location.
pub fn interpolate_peaks(
    magnitude_db: &[f64],
    phase: &[f64],
    locations: &[usize],
) -> Result<InterpolatedPeaks> {
    if magnitude_db.len() != phase.len() {
        return Err(SynthesisError::InternalInvariant(format!(
            "magnitude spectrum has {} bins but phase spectrum has {}",
            magnitude_db.len(),
            phase.len()
        )));
    }

    let mut peaks = InterpolatedPeaks {
        bins: Vec::with_capacity(locations.len()),
        magnitudes: Vec::with_capacity(locations.len()),
        phases: Vec::with_capacity(locations.len()),
    };

    for &p in locations {
        if p == 0 || p + 1 >= magnitude_db.len() {
            return Err(SynthesisError::InternalInvariant(format!(
                "peak bin {} has no neighbours in a {}-bin spectrum",
                p,
                magnitude_db.len()
            )));
        }
        let val = magnitude_db[p];
        let lval = magnitude_db[p - 1];
        let rval = magnitude_db[p + 1];
        let offset = 0.5 * (lval - rval) / (lval - 2.0 * val + rval);
        let bin = p as f64 + offset;
        peaks.bins.push(bin);
        peaks.magnitudes.push(val - 0.25 * (lval - rval) * offset);
        peaks.phases.push(linear_interp(phase, bin));
    }

    Ok(peaks)
}

/// Samples `values` (indexed by integer position) at fractional `position`,
/// clamping outside the table.
fn linear_interp(values: &[f64], position: f64) -> f64 {
    if position <= 0.0 {
        return values[0];
    }
    let last = values.len() - 1;
    if position >= last as f64 {
        return values[last];
    }
    let i = position.floor() as usize;
    let frac = position - i as f64;
    values[i] + frac * (values[i + 1] - values[i])
}
