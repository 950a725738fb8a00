//! Per-run analysis statistics.

use serde::Serialize;

use super::band::PreparedBand;

/// Peak statistics for one resolution band over a whole run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BandSummary {
    pub index: usize,
    pub lower_edge_hz: f64,
    pub upper_edge_hz: f64,
    pub window_len: usize,
    pub fft_size: usize,
    /// Peaks kept after band gating, summed over all frames.
    pub total_peaks: usize,
    pub max_peaks_per_frame: usize,
}

/// What a run did: geometry plus per-band peak counts.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SynthesisSummary {
    pub sample_rate: u32,
    pub input_samples: usize,
    pub synthesis_size: usize,
    pub hop: usize,
    /// Sample index of the first analysis instant.
    pub first_frame: usize,
    pub frames: usize,
    pub bands: Vec<BandSummary>,
}

impl SynthesisSummary {
    pub(crate) fn new(
        bands: &[PreparedBand],
        sample_rate: u32,
        input_samples: usize,
        synthesis_size: usize,
        hop: usize,
        first_frame: usize,
    ) -> Self {
        Self {
            sample_rate,
            input_samples,
            synthesis_size,
            hop,
            first_frame,
            frames: 0,
            bands: bands
                .iter()
                .map(|b| BandSummary {
                    index: b.index,
                    lower_edge_hz: b.lower_edge_hz,
                    upper_edge_hz: b.upper_edge_hz,
                    window_len: b.window.len(),
                    fft_size: b.fft_size(),
                    total_peaks: 0,
                    max_peaks_per_frame: 0,
                })
                .collect(),
        }
    }

    /// Accounts for one frame given its per-band peak counts.
    pub(crate) fn record_frame(&mut self, peaks_per_band: &[usize]) {
        self.frames += 1;
        for (band, &count) in self.bands.iter_mut().zip(peaks_per_band) {
            band.total_peaks += count;
            band.max_peaks_per_frame = band.max_peaks_per_frame.max(count);
        }
    }

    pub fn total_peaks(&self) -> usize {
        self.bands.iter().map(|b| b.total_peaks).sum()
    }

    pub fn mean_peaks_per_frame(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.total_peaks() as f64 / self.frames as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sine_model::band::{prepare_bands, ResolutionBand};

    #[test]
    fn test_record_frame_tracks_totals_and_maxima() {
        let bands = prepare_bands(
            &[
                ResolutionBand::new(vec![1.0; 64], 64, 1000.0),
                ResolutionBand::new(vec![1.0; 32], 32, 8000.0),
            ],
            44100,
        )
        .unwrap();
        let mut summary = SynthesisSummary::new(&bands, 44100, 10_000, 512, 128, 256);
        summary.record_frame(&[3, 1]);
        summary.record_frame(&[5, 0]);

        assert_eq!(summary.frames, 2);
        assert_eq!(summary.bands[0].total_peaks, 8);
        assert_eq!(summary.bands[0].max_peaks_per_frame, 5);
        assert_eq!(summary.bands[1].total_peaks, 1);
        assert_eq!(summary.total_peaks(), 9);
        assert!((summary.mean_peaks_per_frame() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_summary_has_zero_mean() {
        let bands = prepare_bands(&[ResolutionBand::new(vec![1.0; 8], 8, 100.0)], 8000).unwrap();
        let summary = SynthesisSummary::new(&bands, 8000, 0, 512, 128, 256);
        assert_eq!(summary.mean_peaks_per_frame(), 0.0);
    }

    #[test]
    fn test_serializes_to_json() {
        let bands = prepare_bands(&[ResolutionBand::new(vec![1.0; 8], 8, 100.0)], 8000).unwrap();
        let summary = SynthesisSummary::new(&bands, 8000, 100, 512, 128, 256);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["frames"], 0);
        assert_eq!(json["bands"][0]["fft_size"], 8);
        assert_eq!(json["bands"][0]["upper_edge_hz"], 100.0);
    }
}
