use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use mrsine::{ResolutionBand, WindowKind, DEFAULT_SYNTHESIS_SIZE, DEFAULT_THRESHOLD_DB};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub bands: Vec<BandConfig>,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_threshold_db")]
    pub threshold_db: f64,
    #[serde(default = "default_synthesis_size")]
    pub synthesis_size: usize,
    #[serde(default)]
    pub preset: Option<Preset>,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_bits")]
    pub bits: u16,
}

/// One resolution band as written in config files and on the command line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BandConfig {
    pub window: WindowKind,
    /// Window length in samples.
    pub size: usize,
    pub fft_size: usize,
    pub edge_hz: f64,
}

impl BandConfig {
    pub fn to_band(&self) -> ResolutionBand {
        ResolutionBand::with_window(self.window, self.size, self.fft_size, self.edge_hz)
    }
}

impl FromStr for BandConfig {
    type Err = String;

    /// Parses `WINDOW:SIZE:FFT:EDGE`, e.g. `blackman:3031:4096:340`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 4 {
            return Err(format!(
                "expected WINDOW:SIZE:FFT:EDGE, got '{}'",
                s
            ));
        }
        let window = parts[0].parse::<WindowKind>()?;
        let size = parts[1]
            .parse::<usize>()
            .map_err(|e| format!("bad window size '{}': {}", parts[1], e))?;
        let fft_size = parts[2]
            .parse::<usize>()
            .map_err(|e| format!("bad FFT size '{}': {}", parts[2], e))?;
        let edge_hz = parts[3]
            .parse::<f64>()
            .map_err(|e| format!("bad band edge '{}': {}", parts[3], e))?;
        Ok(Self {
            window,
            size,
            fft_size,
            edge_hz,
        })
    }
}

/// Built-in band layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Three Blackman bands split at 340 Hz and 900 Hz.
    Speech,
    /// Three long Blackman bands split at 100 Hz and 250 Hz for bass-heavy material.
    Bass,
}

impl Preset {
    pub fn bands(self) -> Vec<BandConfig> {
        let (sizes, ffts, edges) = match self {
            Preset::Speech => ([3031, 779, 295], [4096, 1024, 512], [340.0, 900.0, 22050.0]),
            Preset::Bass => ([5089, 2647, 1059], [8192, 4096, 2048], [100.0, 250.0, 22050.0]),
        };
        (0..3)
            .map(|i| BandConfig {
                window: WindowKind::Blackman,
                size: sizes[i],
                fft_size: ffts[i],
                edge_hz: edges[i],
            })
            .collect()
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::Speech => "blackman 3031/779/295, FFT 4096/1024/512, edges 340/900/22050 Hz",
            Preset::Bass => "blackman 5089/2647/1059, FFT 8192/4096/2048, edges 100/250/22050 Hz",
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold_db: default_threshold_db(),
            synthesis_size: default_synthesis_size(),
            preset: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            bits: default_bits(),
        }
    }
}

fn default_threshold_db() -> f64 { DEFAULT_THRESHOLD_DB }
fn default_synthesis_size() -> usize { DEFAULT_SYNTHESIS_SIZE }
fn default_bits() -> u16 { 16 }

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}
