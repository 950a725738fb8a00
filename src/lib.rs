#![forbid(unsafe_code)]
//! Multi-resolution sinusoidal analysis and resynthesis of mono audio.
//!
//! `mrsine` models a signal as a sum of sinusoids without tracking them across
//! frames. Unlike a single-resolution sine model it analyses every instant with
//! several windows at once: long windows resolve the low end, short windows keep
//! the high end time-accurate, and each window only contributes the peaks that
//! fall inside its own frequency band. The merged peaks are drawn straight into
//! a spectrum, inverse transformed and overlap-added.
//!
//! # Quick Start
//!
//! ```
//! use mrsine::{synthesize, ResolutionBand, WindowKind};
//!
//! let fs = 44100;
//! let input: Vec<f64> = (0..fs as usize)
//!     .map(|i| 0.5 * (2.0 * std::f64::consts::PI * 440.0 * i as f64 / fs as f64).sin())
//!     .collect();
//!
//! let bands = vec![
//!     ResolutionBand::with_window(WindowKind::Blackman, 2047, 2048, 1000.0),
//!     ResolutionBand::with_window(WindowKind::Blackman, 1023, 1024, 5000.0),
//!     ResolutionBand::with_window(WindowKind::Blackman, 511, 512, 22050.0),
//! ];
//!
//! let output = synthesize(&input, fs, &bands, -90.0).unwrap();
//! assert_eq!(output.len(), input.len());
//! ```
//!
//! Use [`MultiResSineModel`] directly to reuse one validated configuration,
//! change the synthesis size, inspect per-frame peaks or collect run statistics.

pub mod dsp;
pub mod error;
pub mod sine_model;

pub use dsp::window::WindowKind;
pub use error::{Result, SynthesisError};
pub use sine_model::band::{PreparedBand, ResolutionBand};
pub use sine_model::driver::{
    synthesize, MultiResSineModel, SineModelParams, Synthesis, DEFAULT_THRESHOLD_DB,
};
pub use sine_model::extract::SinePeaks;
pub use sine_model::summary::{BandSummary, SynthesisSummary};
pub use sine_model::synth::{SynthesisWindow, DEFAULT_SYNTHESIS_SIZE};
