//! Resolution bands: caller-facing configuration and its validated,
//! analysis-ready form.

use crate::dsp::dft::Dft;
use crate::dsp::window::{get_window, half_lengths, WindowKind};
use crate::error::{Result, SynthesisError};

/// One analysis resolution: a window, its FFT size, and the upper edge of the
/// frequency band whose peaks it is responsible for.
///
/// The lower edge is implied by the previous band in the list (0 Hz for the
/// first band).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionBand {
    pub window: Vec<f64>,
    pub fft_size: usize,
    pub edge_hz: f64,
}

impl ResolutionBand {
    pub fn new(window: Vec<f64>, fft_size: usize, edge_hz: f64) -> Self {
        Self {
            window,
            fft_size,
            edge_hz,
        }
    }

    /// Band using a generated window of `window_len` samples.
    pub fn with_window(kind: WindowKind, window_len: usize, fft_size: usize, edge_hz: f64) -> Self {
        Self::new(get_window(kind, window_len), fft_size, edge_hz)
    }

    /// Zips parallel lists of windows, FFT sizes and band edges into bands.
    pub fn zip(windows: Vec<Vec<f64>>, fft_sizes: &[usize], edges_hz: &[f64]) -> Result<Vec<Self>> {
        if windows.len() != fft_sizes.len() || windows.len() != edges_hz.len() {
            return Err(SynthesisError::ConfigMismatch {
                windows: windows.len(),
                fft_sizes: fft_sizes.len(),
                edges: edges_hz.len(),
            });
        }
        Ok(windows
            .into_iter()
            .zip(fft_sizes)
            .zip(edges_hz)
            .map(|((window, &fft_size), &edge_hz)| Self::new(window, fft_size, edge_hz))
            .collect())
    }
}

/// A validated band with a unit-sum window, explicit band edges and a
/// planned FFT.
#[derive(Debug, Clone)]
pub struct PreparedBand {
    pub index: usize,
    /// Analysis window scaled to sum to 1.
    pub window: Vec<f64>,
    /// Samples taken before the analysis instant.
    pub half_ceil: usize,
    /// Samples taken from the analysis instant onwards.
    pub half_floor: usize,
    pub lower_edge_hz: f64,
    pub upper_edge_hz: f64,
    pub dft: Dft,
}

impl PreparedBand {
    pub fn fft_size(&self) -> usize {
        self.dft.size()
    }

    /// Whether `freq_hz` falls in this band's half-open range `[lower, upper)`.
    ///
    /// A peak sitting exactly on an edge belongs to the band above it.
    #[inline]
    pub fn contains(&self, freq_hz: f64) -> bool {
        freq_hz >= self.lower_edge_hz && freq_hz < self.upper_edge_hz
    }
}

/// Scales `window` in place so it sums to 1 and returns its
/// `(half_ceil, half_floor)` lengths.
pub fn normalize_window(band: usize, window: &mut [f64]) -> Result<(usize, usize)> {
    if window.is_empty() {
        return Err(SynthesisError::DegenerateWindow {
            band,
            reason: "window is empty".into(),
        });
    }
    let sum: f64 = window.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        return Err(SynthesisError::DegenerateWindow {
            band,
            reason: format!("window sums to {}", sum),
        });
    }
    let halves = half_lengths(window.len());
    for w in window.iter_mut() {
        *w /= sum;
    }
    Ok(halves)
}

/// Validates the band list and turns it into analysis-ready bands.
///
/// The caller's bands are left untouched; normalization happens on copies.
pub fn prepare_bands(bands: &[ResolutionBand], sample_rate: u32) -> Result<Vec<PreparedBand>> {
    if bands.is_empty() {
        return Err(SynthesisError::EmptyBands);
    }
    let nyquist = sample_rate as f64 / 2.0;
    let mut lower_edge_hz = 0.0;
    let mut prepared = Vec::with_capacity(bands.len());

    for (index, band) in bands.iter().enumerate() {
        let edge = band.edge_hz;
        if !edge.is_finite() || edge <= lower_edge_hz {
            return Err(SynthesisError::InvalidBandEdges(format!(
                "band {} edge {} Hz must be finite and above {} Hz",
                index, edge, lower_edge_hz
            )));
        }
        if edge > nyquist {
            log::warn!(
                "Band {} edge {:.1} Hz exceeds Nyquist ({:.1} Hz); peaks are capped at Nyquist",
                index,
                edge,
                nyquist
            );
        }

        let window_len = band.window.len();
        if !band.fft_size.is_power_of_two() || band.fft_size < window_len {
            return Err(SynthesisError::InvalidFftSize {
                band: index,
                fft_size: band.fft_size,
                window_len,
            });
        }

        let mut window = band.window.clone();
        let (half_ceil, half_floor) = normalize_window(index, &mut window)?;

        log::debug!(
            "Band {}: window={} fft={} range=[{:.1}, {:.1}) Hz",
            index,
            window_len,
            band.fft_size,
            lower_edge_hz,
            edge
        );

        prepared.push(PreparedBand {
            index,
            window,
            half_ceil,
            half_floor,
            lower_edge_hz,
            upper_edge_hz: edge,
            dft: Dft::new(band.fft_size),
        });
        lower_edge_hz = edge;
    }

    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_bands() -> Vec<ResolutionBand> {
        vec![
            ResolutionBand::with_window(WindowKind::Blackman, 2047, 2048, 1000.0),
            ResolutionBand::with_window(WindowKind::Blackman, 1023, 1024, 5000.0),
            ResolutionBand::with_window(WindowKind::Blackman, 511, 512, 22050.0),
        ]
    }

    #[test]
    fn test_normalized_window_sums_to_one() {
        let mut w = get_window(WindowKind::Hamming, 779);
        let halves = normalize_window(0, &mut w).unwrap();
        assert_eq!(halves, (390, 389));
        let sum: f64 = w.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_sum_window_is_degenerate() {
        let mut w = vec![1.0, -1.0];
        let err = normalize_window(2, &mut w).unwrap_err();
        assert!(matches!(err, SynthesisError::DegenerateWindow { band: 2, .. }));
        assert!(matches!(
            normalize_window(0, &mut []),
            Err(SynthesisError::DegenerateWindow { .. })
        ));
    }

    #[test]
    fn test_prepare_assigns_explicit_lower_edges() {
        let bands = three_bands();
        let prepared = prepare_bands(&bands, 44100).unwrap();
        let lowers: Vec<f64> = prepared.iter().map(|b| b.lower_edge_hz).collect();
        assert_eq!(lowers, vec![0.0, 1000.0, 5000.0]);
        assert_eq!(prepared[0].half_ceil, 1024);
        assert_eq!(prepared[0].half_floor, 1023);
        assert_eq!(prepared[2].fft_size(), 512);
        // caller configuration is not rescaled
        assert!(bands[0].window.iter().sum::<f64>() > 2.0);
    }

    #[test]
    fn test_edge_frequency_belongs_to_upper_band() {
        let prepared = prepare_bands(&three_bands(), 44100).unwrap();
        assert!(!prepared[0].contains(1000.0));
        assert!(prepared[1].contains(1000.0));
        assert!(prepared[0].contains(0.0));
        assert!(prepared[1].contains(4999.999));
        assert!(!prepared[1].contains(5000.0));
    }

    #[test]
    fn test_zip_rejects_mismatched_lengths() {
        let err = ResolutionBand::zip(vec![vec![1.0; 4]; 3], &[8, 8], &[100.0, 200.0, 300.0])
            .unwrap_err();
        assert_eq!(
            err,
            SynthesisError::ConfigMismatch {
                windows: 3,
                fft_sizes: 2,
                edges: 3
            }
        );
    }

    #[test]
    fn test_zip_builds_bands_in_order() {
        let bands = ResolutionBand::zip(vec![vec![1.0; 4], vec![1.0; 2]], &[8, 4], &[100.0, 200.0])
            .unwrap();
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[1].fft_size, 4);
        assert_eq!(bands[1].edge_hz, 200.0);
    }

    #[test]
    fn test_rejects_non_increasing_edges() {
        let bands = vec![
            ResolutionBand::new(vec![1.0; 8], 8, 500.0),
            ResolutionBand::new(vec![1.0; 8], 8, 500.0),
        ];
        assert!(matches!(
            prepare_bands(&bands, 44100),
            Err(SynthesisError::InvalidBandEdges(_))
        ));
    }

    #[test]
    fn test_rejects_bad_fft_sizes() {
        let short = vec![ResolutionBand::new(vec![1.0; 9], 8, 500.0)];
        assert!(matches!(
            prepare_bands(&short, 44100),
            Err(SynthesisError::InvalidFftSize { band: 0, fft_size: 8, window_len: 9 })
        ));
        let odd = vec![ResolutionBand::new(vec![1.0; 9], 12, 500.0)];
        assert!(prepare_bands(&odd, 44100).is_err());
    }

    #[test]
    fn test_rejects_empty_band_list() {
        assert_eq!(prepare_bands(&[], 44100).unwrap_err(), SynthesisError::EmptyBands);
    }
}
