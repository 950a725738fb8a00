#![allow(dead_code)]

use std::f64::consts::PI;

use mrsine::{ResolutionBand, WindowKind};
use rustfft::{num_complex::Complex, FftPlanner};

pub const FS: u32 = 44100;

/// Sum of sines given as `(freq_hz, amplitude)` pairs.
pub fn gen_sines(components: &[(f64, f64)], sr: u32, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64 / sr as f64;
            components
                .iter()
                .map(|&(f, a)| a * (2.0 * PI * f * t).sin())
                .sum()
        })
        .collect()
}

/// Three Blackman bands split at 1 kHz and 5 kHz.
pub fn three_bands() -> Vec<ResolutionBand> {
    vec![
        ResolutionBand::with_window(WindowKind::Blackman, 2047, 2048, 1000.0),
        ResolutionBand::with_window(WindowKind::Blackman, 1023, 1024, 5000.0),
        ResolutionBand::with_window(WindowKind::Blackman, 511, 512, 22050.0),
    ]
}

pub fn rms(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    (signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64).sqrt()
}

/// Amplitude of the sinusoid at `freq` found by correlating against it.
pub fn amplitude_at(signal: &[f64], sr: u32, freq: f64) -> f64 {
    let (mut re, mut im) = (0.0, 0.0);
    for (i, &s) in signal.iter().enumerate() {
        let angle = 2.0 * PI * freq * i as f64 / sr as f64;
        re += s * angle.cos();
        im += s * angle.sin();
    }
    2.0 * (re * re + im * im).sqrt() / signal.len() as f64
}

/// Hann-windowed power spectrum of the first `fft_size` samples.
pub fn power_spectrum(signal: &[f64], fft_size: usize) -> Vec<f64> {
    let mut buffer: Vec<Complex<f64>> = signal[..fft_size]
        .iter()
        .enumerate()
        .map(|(i, &s)| {
            let w = 0.5 * (1.0 - (2.0 * PI * i as f64 / fft_size as f64).cos());
            Complex::new(s * w, 0.0)
        })
        .collect();
    FftPlanner::<f64>::new()
        .plan_fft_forward(fft_size)
        .process(&mut buffer);
    buffer[..fft_size / 2 + 1].iter().map(|c| c.norm_sqr()).collect()
}

/// Frequency of the strongest bin in the first `fft_size` samples.
pub fn dominant_frequency(signal: &[f64], sr: u32, fft_size: usize) -> f64 {
    let power = power_spectrum(signal, fft_size);
    let peak = power
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(i, _)| i)
        .unwrap();
    peak as f64 * sr as f64 / fft_size as f64
}

/// Fraction of spectral power within `width_hz` of any of `freqs`.
pub fn power_fraction_near(signal: &[f64], sr: u32, fft_size: usize, freqs: &[f64], width_hz: f64) -> f64 {
    let power = power_spectrum(signal, fft_size);
    let hz_per_bin = sr as f64 / fft_size as f64;
    let total: f64 = power.iter().sum();
    let near: f64 = power
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let f = *i as f64 * hz_per_bin;
            freqs.iter().any(|&target| (f - target).abs() <= width_hz)
        })
        .map(|(_, p)| p)
        .sum();
    near / total
}
