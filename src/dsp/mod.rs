//! DSP building blocks for sinusoidal analysis and synthesis.

pub mod dft;
pub mod peaks;
pub mod sines;
pub mod window;
