//! Spectral-domain sinusoid generation.
//!
//! Each sinusoid is drawn directly into the spectrum as the main lobe of a
//! Blackman-Harris window transform, so synthesizing a frame costs one inverse
//! FFT no matter how many peaks it carries.

use rustfft::num_complex::Complex;
use std::f64::consts::PI;

use super::dft::COMPLEX_ZERO;
use super::window::BH_COEFFS;

/// Number of bins on each side of the lobe centre.
const LOBE_HALF_WIDTH: i64 = 4;

/// Main lobe of an `n`-point Blackman-Harris window transform, sampled at the
/// (possibly fractional) bin offsets in `bins` and normalized to unit gain at
/// offset zero.
pub fn bh_lobe(bins: &[f64], n: usize) -> Vec<f64> {
    let size = n as f64;
    let df = 2.0 * PI / size;
    bins.iter()
        .map(|&b| {
            let f = b * df;
            let sum: f64 = BH_COEFFS
                .iter()
                .enumerate()
                .map(|(m, &a)| {
                    let shift = df * m as f64;
                    a / 2.0 * (periodic_sinc(f - shift, size) + periodic_sinc(f + shift, size))
                })
                .sum();
            sum / size / BH_COEFFS[0]
        })
        .collect()
}

/// `sin(n x / 2) / sin(x / 2)`, continuous at `x = 0` where it equals `n`.
#[inline]
fn periodic_sinc(x: f64, n: f64) -> f64 {
    let den = (x / 2.0).sin();
    if den.abs() < 1e-12 {
        return n;
    }
    (n * x / 2.0).sin() / den
}

/// Builds an `fft_size`-point spectrum holding one Blackman-Harris lobe per
/// sinusoid.
///
/// `magnitudes_db` are peak magnitudes in dB, `phases` in radians. Sinusoids
/// at DC or within one bin of Nyquist are skipped. The result is
/// conjugate-symmetric, so its inverse transform is real.
pub fn gen_spec_sines(
    frequencies: &[f64],
    magnitudes_db: &[f64],
    phases: &[f64],
    fft_size: usize,
    sample_rate: f64,
) -> Vec<Complex<f64>> {
    let mut spectrum = vec![COMPLEX_ZERO; fft_size];
    let half = (fft_size / 2) as i64;

    for ((&freq, &mag), &phase) in frequencies.iter().zip(magnitudes_db).zip(phases) {
        let loc = fft_size as f64 * freq / sample_rate;
        if loc == 0.0 || loc > (half - 1) as f64 {
            continue;
        }
        let centre = loc.round_ties_even();
        let remainder = centre - loc;
        let offsets: Vec<f64> = (-LOBE_HALF_WIDTH..=LOBE_HALF_WIDTH)
            .map(|k| remainder + k as f64)
            .collect();
        let amplitude = 10f64.powf(mag / 20.0);
        let lobe = bh_lobe(&offsets, fft_size);
        let positive = Complex::from_polar(1.0, phase);
        let negative = positive.conj();

        for (k, &lmag) in (-LOBE_HALF_WIDTH..=LOBE_HALF_WIDTH).zip(lobe.iter()) {
            let bin = centre as i64 + k;
            let value = lmag * amplitude;
            if bin < 0 {
                // folded bins past Nyquist only occur for tiny FFT sizes
                if -bin <= half {
                    spectrum[(-bin) as usize] += negative * value;
                }
            } else if bin == 0 || bin == half {
                spectrum[bin as usize] += (positive + negative) * value;
            } else if bin < half {
                spectrum[bin as usize] += positive * value;
            }
        }
    }

    for k in 1..half as usize {
        spectrum[fft_size - k] = spectrum[k].conj();
    }
    spectrum
}
