use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

/// Writes mono `samples` to a WAV file.
///
/// `bits_per_sample` of 32 writes IEEE float; 16 and 24 write clipped PCM.
pub fn write_wav(path: &Path, samples: &[f64], sample_rate: u32, bits_per_sample: u16) -> Result<()> {
    let sample_format = match bits_per_sample {
        32 => SampleFormat::Float,
        16 | 24 => SampleFormat::Int,
        other => anyhow::bail!("Unsupported WAV bit depth: {} (use 16, 24 or 32)", other),
    };
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample,
        sample_format,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    let clipped = samples.iter().filter(|s| s.abs() > 1.0).count();
    if clipped > 0 {
        log::warn!("{} samples exceed full scale and will clip", clipped);
    }

    if sample_format == SampleFormat::Float {
        for &s in samples {
            writer.write_sample(s as f32)?;
        }
    } else {
        let max_val = (1i64 << (bits_per_sample - 1)) as f64;
        for &s in samples {
            let int_sample = (s * max_val).round().clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }

    writer
        .finalize()
        .with_context(|| format!("Failed to finalize WAV file: {}", path.display()))?;
    log::info!(
        "Wrote {} samples ({}-bit) to {}",
        samples.len(),
        bits_per_sample,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::decode::decode_audio;

    #[test]
    fn test_float_roundtrip_through_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let samples: Vec<f64> = (0..4410).map(|i| 0.5 * (i as f64 * 0.05).sin()).collect();
        write_wav(&path, &samples, 44100, 32).unwrap();

        let audio = decode_audio(&path).unwrap();
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.samples.len(), samples.len());
        for (a, b) in audio.samples.iter().zip(&samples) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_pcm16_is_clipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loud.wav");
        write_wav(&path, &[2.0, -2.0, 0.0], 8000, 16).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        let values: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(values, vec![i16::MAX, i16::MIN, 0]);
    }

    #[test]
    fn test_rejects_unsupported_depth() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_wav(&dir.path().join("x.wav"), &[0.0], 8000, 12).is_err());
    }
}
