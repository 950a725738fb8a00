//! Frame synthesis and overlap-add reconstruction.
//!
//! Frames come out of the inverse FFT shaped by a normalized Blackman-Harris
//! envelope (the spectral lobes used to draw each sinusoid). The synthesis
//! window divides that envelope back out over its central half and replaces it
//! with a triangle, whose copies at a hop of `size / 4` sum to one.

use super::extract::SinePeaks;
use crate::dsp::dft::Dft;
use crate::dsp::sines::gen_spec_sines;
use crate::dsp::window::{blackman_harris, generate_window, WindowKind};
use crate::error::{Result, SynthesisError};

/// Synthesis FFT size used when none is configured.
pub const DEFAULT_SYNTHESIS_SIZE: usize = 512;

/// Fixed synthesis window, built once per run and read-only afterwards.
#[derive(Debug, Clone)]
pub struct SynthesisWindow {
    size: usize,
    hop: usize,
    coeffs: Vec<f64>,
}

impl SynthesisWindow {
    /// Builds the window for synthesis FFT size `size` (even, at least 4).
    pub fn new(size: usize) -> Result<Self> {
        if size % 2 != 0 {
            return Err(SynthesisError::InvalidSize(format!(
                "synthesis size {} must be even",
                size
            )));
        }
        if size < 4 {
            return Err(SynthesisError::InvalidSize(format!(
                "synthesis size {} leaves no room for a hop",
                size
            )));
        }

        let hop = size / 4;
        let half = size / 2;
        let mut coeffs = vec![0.0; size];
        let triangle = generate_window(WindowKind::Triangular, 2 * hop, true);
        coeffs[half - hop..half + hop].copy_from_slice(&triangle);

        let mut bh = blackman_harris(size);
        let bh_sum: f64 = bh.iter().sum();
        bh.iter_mut().for_each(|v| *v /= bh_sum);
        for (c, &b) in coeffs[half - hop..half + hop]
            .iter_mut()
            .zip(&bh[half - hop..half + hop])
        {
            *c /= b;
        }

        Ok(Self { size, hop, coeffs })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    pub fn half_size(&self) -> usize {
        self.size / 2
    }

    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }
}

/// Synthesizes one unwindowed time-domain frame of `dft.size()` samples from
/// the frame's merged peaks.
pub fn synthesize_frame(peaks: &SinePeaks, dft: &Dft, sample_rate: f64) -> Result<Vec<f64>> {
    let size = dft.size();
    let spectrum = gen_spec_sines(
        &peaks.frequencies,
        &peaks.magnitudes,
        &peaks.phases,
        size,
        sample_rate,
    );
    let buffer = dft.inverse_real(spectrum)?;
    Ok(undo_zero_phase(&buffer))
}

/// Rotates a zero-phase buffer back into a causal frame: the first
/// `size/2 - 1` samples come from the tail, the rest from the head.
pub fn undo_zero_phase(buffer: &[f64]) -> Vec<f64> {
    let half = buffer.len() / 2;
    let mut frame = Vec::with_capacity(buffer.len());
    frame.extend_from_slice(&buffer[half + 1..]);
    frame.extend_from_slice(&buffer[..half + 1]);
    frame
}

/// Applies the synthesis window to `frame` in place.
#[inline]
pub fn apply_synthesis_window(frame: &mut [f64], window: &SynthesisWindow) {
    for (sample, &w) in frame.iter_mut().zip(window.coeffs()) {
        *sample *= w;
    }
}

/// Adds an already windowed frame into `output`, centred on sample `pin`.
pub fn overlap_add(output: &mut [f64], windowed: &[f64], pin: usize) -> Result<()> {
    let half = windowed.len() / 2;
    let start = pin.checked_sub(half);
    match start {
        Some(start) if start + windowed.len() <= output.len() => {
            for (out, &s) in output[start..start + windowed.len()].iter_mut().zip(windowed) {
                *out += s;
            }
            Ok(())
        }
        _ => Err(SynthesisError::InternalInvariant(format!(
            "frame centred on {} does not fit in {} output samples",
            pin,
            output.len()
        ))),
    }
}
