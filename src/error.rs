//! Error types for the multi-resolution sine model.

/// Errors raised while configuring or running an analysis/synthesis pass.
///
/// Everything except [`SynthesisError::InternalInvariant`] is a configuration
/// or input problem detected before the first frame is processed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynthesisError {
    /// Windows, FFT sizes and band edges were supplied with different counts.
    #[error("band configuration mismatch: {windows} windows, {fft_sizes} FFT sizes, {edges} band edges")]
    ConfigMismatch {
        windows: usize,
        fft_sizes: usize,
        edges: usize,
    },

    /// No resolution bands were supplied.
    #[error("at least one resolution band is required")]
    EmptyBands,

    /// An analysis window is empty or sums to zero.
    #[error("degenerate analysis window in band {band}: {reason}")]
    DegenerateWindow { band: usize, reason: String },

    /// The synthesis FFT size cannot be used for overlap-add.
    #[error("invalid synthesis size: {0}")]
    InvalidSize(String),

    /// A band's FFT size is not a power of two or is shorter than its window.
    #[error("invalid FFT size {fft_size} for band {band} (window length {window_len})")]
    InvalidFftSize {
        band: usize,
        fft_size: usize,
        window_len: usize,
    },

    /// Band edges are not finite, positive and strictly increasing.
    #[error("invalid band edges: {0}")]
    InvalidBandEdges(String),

    /// The sample rate is zero.
    #[error("sample rate must be non-zero")]
    InvalidSampleRate,

    /// Input contains NaN or infinite samples.
    #[error("input contains non-finite samples")]
    NonFiniteInput,

    /// An excerpt and its window differ in length.
    #[error("size mismatch: expected {expected} samples, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A DSP building block broke its output contract.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

/// Convenience result type for the sine model.
pub type Result<T> = std::result::Result<T, SynthesisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_config_mismatch() {
        let err = SynthesisError::ConfigMismatch {
            windows: 3,
            fft_sizes: 2,
            edges: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("3 windows"));
        assert!(msg.contains("2 FFT sizes"));
    }

    #[test]
    fn test_display_degenerate_window() {
        let err = SynthesisError::DegenerateWindow {
            band: 1,
            reason: "window sums to zero".into(),
        };
        assert_eq!(
            err.to_string(),
            "degenerate analysis window in band 1: window sums to zero"
        );
    }
}
