//! Zero-phase windowed DFT analysis and real inverse transform.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

use super::window::half_lengths;
use crate::error::{Result, SynthesisError};

/// Real and imaginary parts smaller than this are zeroed before taking the phase.
const PHASE_TOLERANCE: f64 = 1e-14;

/// Zero-valued complex number, used for FFT buffer initialization.
pub const COMPLEX_ZERO: Complex<f64> = Complex::new(0.0, 0.0);

/// Half spectrum produced by [`Dft::analyze`]: `fft_size / 2 + 1` bins.
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Magnitude in dB.
    pub magnitude_db: Vec<f64>,
    /// Unwrapped phase in radians.
    pub phase: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.magnitude_db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitude_db.is_empty()
    }
}

/// Forward/inverse FFT pair planned once for a fixed size.
///
/// Plans are shared behind `Arc`, so one `Dft` can be used from many rayon
/// workers at once.
#[derive(Clone)]
pub struct Dft {
    size: usize,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl std::fmt::Debug for Dft {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dft").field("size", &self.size).finish()
    }
}

impl Dft {
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            size,
            forward: planner.plan_fft_forward(size),
            inverse: planner.plan_fft_inverse(size),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Magnitude (dB) and phase spectra of `excerpt` weighted by `window`.
    ///
    /// The windowed excerpt is rotated so the window centre lands on sample 0
    /// (zero-phase windowing) before the transform.
    pub fn analyze(&self, excerpt: &[f64], window: &[f64]) -> Result<Spectrum> {
        if excerpt.len() != window.len() {
            return Err(SynthesisError::SizeMismatch {
                expected: window.len(),
                actual: excerpt.len(),
            });
        }
        if window.len() > self.size {
            return Err(SynthesisError::SizeMismatch {
                expected: self.size,
                actual: window.len(),
            });
        }

        let (_, h_floor) = half_lengths(window.len());
        let mut buffer = vec![COMPLEX_ZERO; self.size];
        for (i, (&x, &w)) in excerpt.iter().zip(window.iter()).enumerate() {
            let slot = if i < h_floor {
                self.size - h_floor + i
            } else {
                i - h_floor
            };
            buffer[slot] = Complex::new(x * w, 0.0);
        }

        self.forward.process(&mut buffer);

        let half = self.size / 2 + 1;
        let magnitude_db = buffer[..half]
            .iter()
            .map(|c| 20.0 * c.norm().max(f64::EPSILON).log10())
            .collect();
        let wrapped: Vec<f64> = buffer[..half]
            .iter()
            .map(|c| {
                let re = if c.re.abs() < PHASE_TOLERANCE { 0.0 } else { c.re };
                let im = if c.im.abs() < PHASE_TOLERANCE { 0.0 } else { c.im };
                im.atan2(re)
            })
            .collect();

        Ok(Spectrum {
            magnitude_db,
            phase: unwrap_phase(&wrapped),
        })
    }

    /// Real part of the inverse transform of a full `size`-point spectrum,
    /// scaled by `1 / size`.
    pub fn inverse_real(&self, mut spectrum: Vec<Complex<f64>>) -> Result<Vec<f64>> {
        if spectrum.len() != self.size {
            return Err(SynthesisError::SizeMismatch {
                expected: self.size,
                actual: spectrum.len(),
            });
        }
        self.inverse.process(&mut spectrum);
        let scale = 1.0 / self.size as f64;
        Ok(spectrum.iter().map(|c| c.re * scale).collect())
    }
}

/// Removes 2*pi jumps between consecutive phase values.
pub fn unwrap_phase(phase: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(phase.len());
    let mut offset = 0.0;
    let mut prev: Option<f64> = None;
    for &p in phase {
        if let Some(last) = prev {
            let delta = p - last;
            let mut wrapped = (delta + PI).rem_euclid(2.0 * PI) - PI;
            if wrapped == -PI && delta > 0.0 {
                wrapped = PI;
            }
            if delta.abs() >= PI {
                offset += wrapped - delta;
            }
        }
        out.push(p + offset);
        prev = Some(p);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(mut w: Vec<f64>) -> Vec<f64> {
        let sum: f64 = w.iter().sum();
        w.iter_mut().for_each(|v| *v /= sum);
        w
    }

    #[test]
    fn test_unwrap_removes_jumps() {
        let wrapped = [3.0, -3.0, -2.5];
        let out = unwrap_phase(&wrapped);
        assert!((out[0] - 3.0).abs() < 1e-12);
        assert!((out[1] - (-3.0 + 2.0 * PI)).abs() < 1e-12);
        assert!((out[2] - (-2.5 + 2.0 * PI)).abs() < 1e-12);
    }

    #[test]
    fn test_unwrap_leaves_small_steps() {
        let smooth = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(unwrap_phase(&smooth), smooth.to_vec());
    }

    #[test]
    fn test_sine_peak_magnitude_is_half_amplitude() {
        let fft_size = 1024;
        let dft = Dft::new(fft_size);
        let window = normalized(crate::dsp::window::get_window(
            crate::dsp::window::WindowKind::Hann,
            1001,
        ));
        // 32 bins exactly, amplitude 0.8
        let freq_bin = 32.0;
        let excerpt: Vec<f64> = (0..1001)
            .map(|n| 0.8 * (2.0 * PI * freq_bin * n as f64 / fft_size as f64).cos())
            .collect();
        let spec = dft.analyze(&excerpt, &window).unwrap();
        assert_eq!(spec.len(), fft_size / 2 + 1);
        let peak = spec.magnitude_db[32];
        let expected = 20.0 * (0.4f64).log10();
        assert!((peak - expected).abs() < 0.1, "peak {} vs {}", peak, expected);
    }

    #[test]
    fn test_zero_phase_cosine_has_zero_phase() {
        let fft_size = 512;
        let dft = Dft::new(fft_size);
        let window = normalized(vec![1.0; 257]);
        // Cosine centred on the middle sample of the excerpt.
        let excerpt: Vec<f64> = (0..257)
            .map(|n| (2.0 * PI * 16.0 * (n as f64 - 128.0) / fft_size as f64).cos())
            .collect();
        let spec = dft.analyze(&excerpt, &window).unwrap();
        let p = spec.phase[16];
        let wrapped = p.sin().atan2(p.cos());
        assert!(wrapped.abs() < 1e-6, "phase {}", p);
    }

    #[test]
    fn test_silence_clamps_to_epsilon() {
        let dft = Dft::new(64);
        let window = normalized(vec![1.0; 31]);
        let spec = dft.analyze(&[0.0; 31], &window).unwrap();
        let floor = 20.0 * f64::EPSILON.log10();
        assert!(spec.magnitude_db.iter().all(|&m| (m - floor).abs() < 1e-9));
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let dft = Dft::new(64);
        let err = dft.analyze(&[0.0; 10], &[0.1; 11]).unwrap_err();
        assert_eq!(
            err,
            SynthesisError::SizeMismatch {
                expected: 11,
                actual: 10
            }
        );
    }

    #[test]
    fn test_window_longer_than_fft_is_rejected() {
        let dft = Dft::new(16);
        assert!(dft.analyze(&[0.0; 17], &[0.1; 17]).is_err());
    }

    #[test]
    fn test_inverse_real_of_dc() {
        let dft = Dft::new(8);
        let mut spectrum = vec![COMPLEX_ZERO; 8];
        spectrum[0] = Complex::new(8.0, 0.0);
        let out = dft.inverse_real(spectrum).unwrap();
        assert!(out.iter().all(|&v| (v - 1.0).abs() < 1e-12));
    }
}
