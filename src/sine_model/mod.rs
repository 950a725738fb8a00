//! Multi-resolution sinusoidal model: several analysis resolutions, each
//! owning one frequency band, feeding a single sinusoidal resynthesis.

pub mod band;
pub mod driver;
pub mod extract;
pub mod summary;
pub mod synth;
