use clap::Parser;
use std::path::PathBuf;

use crate::config::{BandConfig, Preset};

#[derive(Parser, Debug)]
#[command(
    name = "mrsine",
    about = "Multi-resolution sinusoidal analysis/resynthesis of audio files"
)]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG); multichannel input is downmixed to mono
    pub input: Option<PathBuf>,

    /// Output WAV file
    #[arg(short, long, default_value = "output.wav")]
    pub output: PathBuf,

    /// Config file (defaults to ./mrsine.toml or the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Peak detection threshold in dB
    #[arg(short, long, default_value_t = -90.0, allow_hyphen_values = true)]
    pub threshold: f64,

    /// Synthesis FFT size (even); the hop is a quarter of it
    #[arg(long, default_value_t = 512)]
    pub synthesis_size: usize,

    /// Resolution band as WINDOW:SIZE:FFT:EDGE_HZ, lowest band first (repeatable)
    #[arg(short, long = "band")]
    pub bands: Vec<BandConfig>,

    /// Built-in band layout, used when no --band is given
    #[arg(short, long, value_enum)]
    pub preset: Option<Preset>,

    /// Output WAV bit depth (16, 24 or 32 for float)
    #[arg(long, default_value_t = 16)]
    pub bits: u16,

    /// Write a JSON analysis summary to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,

    /// List built-in presets and exit
    #[arg(long)]
    pub list_presets: bool,
}
