//! The analysis/synthesis frame loop.
//!
//! Every analysis instant runs one short-time analysis per resolution band,
//! merges the band-gated peaks and resynthesizes a single frame from them.
//! Frames are independent until overlap-add, so each batch of frames is
//! rendered in parallel and then accumulated sequentially in frame order,
//! which keeps the output bit-identical to a purely sequential run.

use rayon::prelude::*;

use super::band::{prepare_bands, PreparedBand, ResolutionBand};
use super::extract::{analyze_frame, merge_peaks, SinePeaks};
use super::summary::SynthesisSummary;
use super::synth::{
    apply_synthesis_window, overlap_add, synthesize_frame, SynthesisWindow,
    DEFAULT_SYNTHESIS_SIZE,
};
use crate::dsp::dft::Dft;
use crate::error::{Result, SynthesisError};

/// Peak detection threshold used when none is configured.
pub const DEFAULT_THRESHOLD_DB: f64 = -90.0;

/// Frames rendered in parallel before being overlap-added.
const FRAMES_PER_BATCH: usize = 64;

/// Run-wide parameters shared by all bands.
#[derive(Debug, Clone, PartialEq)]
pub struct SineModelParams {
    pub sample_rate: u32,
    /// Peak detection threshold in dB (negative).
    pub threshold_db: f64,
    /// Synthesis FFT size; the hop is a quarter of it.
    pub synthesis_size: usize,
}

impl SineModelParams {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            threshold_db: DEFAULT_THRESHOLD_DB,
            synthesis_size: DEFAULT_SYNTHESIS_SIZE,
        }
    }

    pub fn with_threshold_db(mut self, threshold_db: f64) -> Self {
        self.threshold_db = threshold_db;
        self
    }

    pub fn with_synthesis_size(mut self, synthesis_size: usize) -> Self {
        self.synthesis_size = synthesis_size;
        self
    }
}

/// Output of a run together with its statistics.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub output: Vec<f64>,
    pub summary: SynthesisSummary,
}

/// One rendered, windowed frame waiting to be overlap-added.
struct RenderedFrame {
    pin: usize,
    samples: Vec<f64>,
    peaks_per_band: Vec<usize>,
}

/// Multi-resolution sinusoidal analysis/synthesis model.
///
/// All configuration is validated in [`MultiResSineModel::new`]; a model that
/// exists can process any finite input.
#[derive(Debug, Clone)]
pub struct MultiResSineModel {
    params: SineModelParams,
    bands: Vec<PreparedBand>,
    window: SynthesisWindow,
    synthesis_dft: Dft,
}

impl MultiResSineModel {
    pub fn new(bands: &[ResolutionBand], params: SineModelParams) -> Result<Self> {
        if params.sample_rate == 0 {
            return Err(SynthesisError::InvalidSampleRate);
        }
        let bands = prepare_bands(bands, params.sample_rate)?;
        let window = SynthesisWindow::new(params.synthesis_size)?;
        let synthesis_dft = Dft::new(params.synthesis_size);

        log::debug!(
            "Sine model: {} bands, synthesis size {}, hop {}, threshold {:.1} dB",
            bands.len(),
            window.size(),
            window.hop(),
            params.threshold_db
        );

        Ok(Self {
            params,
            bands,
            window,
            synthesis_dft,
        })
    }

    pub fn params(&self) -> &SineModelParams {
        &self.params
    }

    pub fn bands(&self) -> &[PreparedBand] {
        &self.bands
    }

    pub fn synthesis_window(&self) -> &SynthesisWindow {
        &self.window
    }

    pub fn hop(&self) -> usize {
        self.window.hop()
    }

    /// First analysis instant: far enough in that every band's window and the
    /// synthesis frame fit.
    pub fn first_frame(&self) -> usize {
        let widest = self.bands.iter().map(|b| b.half_ceil).max().unwrap_or(0);
        widest.max(self.window.half_size())
    }

    /// Analysis instants for an input of `len` samples.
    pub fn frame_positions(&self, len: usize) -> Vec<usize> {
        let start = self.first_frame();
        let end = len.saturating_sub(start);
        (start..end).step_by(self.hop()).collect()
    }

    /// Band-gated peaks of every band at analysis instant `pin`, in band order.
    pub fn analyze_frame(&self, x: &[f64], pin: usize) -> Result<Vec<SinePeaks>> {
        analyze_frame(
            x,
            pin,
            &self.bands,
            self.params.threshold_db,
            self.params.sample_rate as f64,
        )
    }

    /// Analyses and resynthesizes `x`. The output has the same length as the
    /// input; samples no frame reaches stay exactly zero.
    pub fn synthesize(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.synthesize_with_progress(x, |_, _| {}).map(|s| s.output)
    }

    /// Like [`MultiResSineModel::synthesize`], calling `on_progress(done,
    /// total)` with frame counts after each batch and returning run
    /// statistics alongside the output.
    pub fn synthesize_with_progress<F>(&self, x: &[f64], mut on_progress: F) -> Result<Synthesis>
    where
        F: FnMut(usize, usize),
    {
        if x.iter().any(|s| !s.is_finite()) {
            return Err(SynthesisError::NonFiniteInput);
        }

        let positions = self.frame_positions(x.len());
        let total = positions.len();
        let mut output = vec![0.0; x.len()];
        let mut summary = SynthesisSummary::new(
            &self.bands,
            self.params.sample_rate,
            x.len(),
            self.window.size(),
            self.hop(),
            self.first_frame(),
        );

        if total == 0 {
            log::warn!(
                "Input of {} samples is too short for a single frame (need more than {})",
                x.len(),
                2 * self.first_frame()
            );
        }

        let mut done = 0;
        for batch in positions.chunks(FRAMES_PER_BATCH) {
            let frames = batch
                .par_iter()
                .map(|&pin| self.render_frame(x, pin))
                .collect::<Result<Vec<_>>>()?;
            for frame in frames {
                overlap_add(&mut output, &frame.samples, frame.pin)?;
                summary.record_frame(&frame.peaks_per_band);
            }
            done += batch.len();
            on_progress(done, total);
        }

        log::info!(
            "Synthesized {} frames from {} samples ({:.1} peaks/frame)",
            summary.frames,
            x.len(),
            summary.mean_peaks_per_frame()
        );

        Ok(Synthesis { output, summary })
    }

    fn render_frame(&self, x: &[f64], pin: usize) -> Result<RenderedFrame> {
        let per_band = self.analyze_frame(x, pin)?;
        let peaks_per_band = per_band.iter().map(SinePeaks::len).collect();
        let merged = merge_peaks(&per_band);
        let mut samples =
            synthesize_frame(&merged, &self.synthesis_dft, self.params.sample_rate as f64)?;
        apply_synthesis_window(&mut samples, &self.window);
        Ok(RenderedFrame {
            pin,
            samples,
            peaks_per_band,
        })
    }
}

/// Analyses and resynthesizes `samples` with the given bands.
///
/// Convenience wrapper over [`MultiResSineModel`] with the default synthesis
/// size.
pub fn synthesize(
    samples: &[f64],
    sample_rate: u32,
    bands: &[ResolutionBand],
    threshold_db: f64,
) -> Result<Vec<f64>> {
    let params = SineModelParams::new(sample_rate).with_threshold_db(threshold_db);
    MultiResSineModel::new(bands, params)?.synthesize(samples)
}
