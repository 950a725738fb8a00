mod audio;
mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use audio::{decode, encode};
use cli::Cli;
use config::{BandConfig, Preset};
use mrsine::{
    MultiResSineModel, ResolutionBand, SineModelParams, DEFAULT_SYNTHESIS_SIZE, DEFAULT_THRESHOLD_DB,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    if cli.list_presets {
        println!("Available presets:");
        for preset in [Preset::Speech, Preset::Bass] {
            println!("  {:<10} {}", format!("{:?}", preset).to_lowercase(), preset.description());
        }
        return Ok(());
    }

    // Load config: explicit --config path, or auto-detect mrsine.toml / user config
    let config_path = cli.config.clone().or_else(|| {
        let local = PathBuf::from("mrsine.toml");
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("mrsine").join("config.toml"))
            .filter(|p| p.exists())
    });
    let mut config_bands: Vec<BandConfig> = Vec::new();
    if let Some(ref path) = config_path {
        match config::load_config(path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                // Merge: config values apply only when CLI is at its default
                if cli.threshold == DEFAULT_THRESHOLD_DB { cli.threshold = cfg.analysis.threshold_db; }
                if cli.synthesis_size == DEFAULT_SYNTHESIS_SIZE { cli.synthesis_size = cfg.analysis.synthesis_size; }
                if cli.bits == 16 { cli.bits = cfg.output.bits; }
                if cli.preset.is_none() { cli.preset = cfg.analysis.preset; }
                config_bands = cfg.bands;
            }
            Err(err) => log::warn!("Ignoring config {}: {:#}", path.display(), err),
        }
    }

    let input = cli.input.as_ref().context("Input audio file is required")?;
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let band_configs = resolve_bands(&cli, config_bands);
    let bands: Vec<ResolutionBand> = band_configs.iter().map(BandConfig::to_band).collect();

    log::info!("mrsine - multi-resolution sinusoidal resynthesis");
    log::info!("Input: {}", input.display());
    log::info!("Output: {}", cli.output.display());
    for (i, b) in band_configs.iter().enumerate() {
        log::info!(
            "Band {}: {} window {} samples, FFT {}, up to {:.0} Hz",
            i, b.window, b.size, b.fft_size, b.edge_hz
        );
    }

    // 1. Decode audio
    log::info!("Decoding audio...");
    let audio = decode::decode_audio(input)?;

    // 2. Build the model (all configuration is validated here)
    let params = SineModelParams::new(audio.sample_rate)
        .with_threshold_db(cli.threshold)
        .with_synthesis_size(cli.synthesis_size);
    let model = MultiResSineModel::new(&bands, params).context("Invalid analysis configuration")?;

    // 3. Analysis/synthesis
    let total_frames = model.frame_positions(audio.samples.len()).len();
    let pb = if cli.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(total_frames as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress bar template")?
            .progress_chars("=>-"),
    );

    log::info!("Synthesizing {} frames...", total_frames);
    let result = model
        .synthesize_with_progress(&audio.samples, |done, _| pb.set_position(done as u64))
        .context("Analysis/synthesis failed")?;
    pb.finish_with_message("Synthesis complete");

    // 4. Write output
    encode::write_wav(&cli.output, &result.output, audio.sample_rate, cli.bits)?;

    if let Some(ref report_path) = cli.report {
        let json = serde_json::to_string_pretty(&result.summary)
            .context("Failed to serialize analysis summary")?;
        std::fs::write(report_path, json)
            .with_context(|| format!("Failed to write report: {}", report_path.display()))?;
        log::info!("Report: {}", report_path.display());
    }

    for band in &result.summary.bands {
        log::info!(
            "Band {} [{:.0}, {:.0}) Hz: {} peaks, at most {} per frame",
            band.index, band.lower_edge_hz, band.upper_edge_hz, band.total_peaks, band.max_peaks_per_frame
        );
    }
    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}

/// Band precedence: `--band` flags, then `--preset`, then config bands, then
/// the speech preset.
fn resolve_bands(cli: &Cli, config_bands: Vec<BandConfig>) -> Vec<BandConfig> {
    if !cli.bands.is_empty() {
        return cli.bands.clone();
    }
    if let Some(preset) = cli.preset {
        return preset.bands();
    }
    if !config_bands.is_empty() {
        return config_bands;
    }
    Preset::Speech.bands()
}
