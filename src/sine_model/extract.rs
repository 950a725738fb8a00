//! Band-limited peak extraction and per-frame peak merging.

use super::band::PreparedBand;
use crate::dsp::peaks::{detect_peaks, interpolate_peaks};
use crate::error::{Result, SynthesisError};

/// Sinusoidal peaks as three parallel sequences of equal length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SinePeaks {
    /// Frequencies in Hz.
    pub frequencies: Vec<f64>,
    /// Magnitudes in dB.
    pub magnitudes: Vec<f64>,
    /// Phases in radians.
    pub phases: Vec<f64>,
}

impl SinePeaks {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frequencies: Vec::with_capacity(capacity),
            magnitudes: Vec::with_capacity(capacity),
            phases: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn push(&mut self, frequency: f64, magnitude: f64, phase: f64) {
        self.frequencies.push(frequency);
        self.magnitudes.push(magnitude);
        self.phases.push(phase);
    }

    /// Appends all peaks of `other` after the existing ones.
    pub fn append(&mut self, other: &SinePeaks) {
        self.frequencies.extend_from_slice(&other.frequencies);
        self.magnitudes.extend_from_slice(&other.magnitudes);
        self.phases.extend_from_slice(&other.phases);
    }
}

/// Finds the peaks band `band` sees around sample `pin` and keeps only those
/// inside the band's `[lower, upper)` frequency range.
///
/// Pure function of its inputs: no state survives between calls.
pub fn extract_band_peaks(
    x: &[f64],
    pin: usize,
    band: &PreparedBand,
    threshold_db: f64,
    sample_rate: f64,
) -> Result<SinePeaks> {
    let start = pin.checked_sub(band.half_ceil);
    let end = pin + band.half_floor;
    let excerpt = match start {
        Some(start) if end <= x.len() => &x[start..end],
        _ => {
            return Err(SynthesisError::InternalInvariant(format!(
                "band {} excerpt around sample {} falls outside {} input samples",
                band.index,
                pin,
                x.len()
            )))
        }
    };

    let spectrum = band.dft.analyze(excerpt, &band.window)?;
    let expected_bins = band.fft_size() / 2 + 1;
    if spectrum.len() != expected_bins || spectrum.phase.len() != expected_bins {
        return Err(SynthesisError::InternalInvariant(format!(
            "band {} spectrum has {} bins, expected {}",
            band.index,
            spectrum.len(),
            expected_bins
        )));
    }

    let locations = detect_peaks(&spectrum.magnitude_db, threshold_db);
    let refined = interpolate_peaks(&spectrum.magnitude_db, &spectrum.phase, &locations)?;
    if refined.len() != locations.len()
        || refined.magnitudes.len() != locations.len()
        || refined.phases.len() != locations.len()
    {
        return Err(SynthesisError::InternalInvariant(format!(
            "band {} interpolated {} peaks from {} locations",
            band.index,
            refined.len(),
            locations.len()
        )));
    }

    let hz_per_bin = sample_rate / band.fft_size() as f64;
    let mut peaks = SinePeaks::with_capacity(refined.len());
    for ((&bin, &mag), &phase) in refined
        .bins
        .iter()
        .zip(&refined.magnitudes)
        .zip(&refined.phases)
    {
        let freq = bin * hz_per_bin;
        if band.contains(freq) {
            peaks.push(freq, mag, phase);
        }
    }
    Ok(peaks)
}

/// Runs [`extract_band_peaks`] for every band at the same analysis instant.
pub fn analyze_frame(
    x: &[f64],
    pin: usize,
    bands: &[PreparedBand],
    threshold_db: f64,
    sample_rate: f64,
) -> Result<Vec<SinePeaks>> {
    bands
        .iter()
        .map(|band| extract_band_peaks(x, pin, band, threshold_db, sample_rate))
        .collect()
}

/// Concatenates band contributions in band order. No sorting, no dedup.
pub fn merge_peaks(per_band: &[SinePeaks]) -> SinePeaks {
    let total = per_band.iter().map(SinePeaks::len).sum();
    let mut merged = SinePeaks::with_capacity(total);
    for peaks in per_band {
        merged.append(peaks);
    }
    merged
}
