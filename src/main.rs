mod audio;
mod cli;
mod config;
mod effects;
mod encode;
mod error;
mod playback;
mod render;
mod usage;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use audio::analyzer::SpectrumAnalyzer;
use cli::Cli;
use effects::{EffectRegistry, FrameContext};
use encode::ffmpeg::FfmpegEncoder;
use playback::{Scheduler, TICK_PERIOD_MS};
use render::stage::StageCompositor;
use render::surface::Surface;
use render::text::{load_font_from_url, GlyphPainter};
use usage::{JsonlSink, NullSink, UsageSink};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect luxa.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = std::path::PathBuf::from("luxa.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("luxa").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("luxa").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });
    let mut effect_overrides = std::collections::BTreeMap::new();
    if let Some(ref path) = config_path {
        if let Some(cfg) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            // Merge: config values apply only when CLI is at its default
            if cli.width == 1280 { cli.width = cfg.output.width; }
            if cli.height == 720 { cli.height = cfg.output.height; }
            if cli.fps == 60 { cli.fps = cfg.output.fps; }
            if cli.crf == 18 { cli.crf = cfg.output.crf; }
            if cli.codec == "libx264" { cli.codec = cfg.output.codec; }
            if cli.font.is_none() { cli.font = cfg.output.font; }
            if cli.font_url.is_none() { cli.font_url = cfg.output.font_url; }
            if cli.user.is_none() { cli.user = cfg.usage.user; }
            if cli.usage_log.is_none() { cli.usage_log = cfg.usage.log; }
            if !cli.stage { cli.stage = cfg.stage.enabled; }
            effect_overrides = cfg.effects;
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    // List effects mode
    if cli.list_effects {
        let registry = EffectRegistry::builtin(None);
        println!("Available effects:");
        for i in 0..registry.count() {
            let effect = registry.get(i);
            let accent = effect.accent();
            let params: Vec<&str> = effect.configuration.keys().map(String::as_str).collect();
            println!(
                "  {:<16} #{:02X}{:02X}{:02X}  [{}]",
                effect.name(),
                accent.r,
                accent.g,
                accent.b,
                params.join(", ")
            );
        }
        return Ok(());
    }

    log::info!("luxa - lighting effects renderer");
    log::info!("Output: {}", cli.output.display());
    log::info!("Resolution: {}x{} @ {}fps", cli.width, cli.height, cli.fps);

    // 1. Font for text-drawing effects (optional; effects degrade without one)
    let glyphs = load_glyphs(&cli);

    // 2. Effect catalog, with config-file parameter overrides merged in
    let mut registry = EffectRegistry::builtin(glyphs);
    for (name, overrides) in effect_overrides {
        match registry.by_name_mut(&name) {
            Some(effect) => effect.configuration.extend(overrides),
            None => log::warn!("Config overrides unknown effect '{name}'"),
        }
    }

    // 3. Audio source, when given
    let mut analyzer = SpectrumAnalyzer::new();
    if let Some(ref input) = cli.input {
        log::info!("Loading audio: {input}");
        analyzer
            .load(input)
            .with_context(|| format!("Failed to load audio from {input}"))?;
    }
    let duration = analyzer.duration().unwrap_or(cli.duration);
    let total_frames = (duration * cli.fps as f64).ceil() as u64;
    log::info!("Total frames: {}, Duration: {:.1}s", total_frames, duration);

    // 4. Usage sink and scheduler
    let sink: Box<dyn UsageSink> = match cli.usage_log {
        Some(ref path) => Box::new(
            JsonlSink::open(path)
                .with_context(|| format!("Failed to open usage log {}", path.display()))?,
        ),
        None => Box::new(NullSink),
    };
    let mut scheduler = Scheduler::new(registry, sink);
    scheduler.set_user(cli.user.clone());

    let pinned = if let Some(ref name) = cli.effect {
        if !scheduler.pin(name) {
            let names: Vec<&str> = scheduler.registry().names().collect();
            anyhow::bail!("Unknown effect '{}'. Available: {}", name, names.join(", "));
        }
        log::info!("Effect pinned: {name}");
        true
    } else {
        false
    };

    // 5. Start FFmpeg encoder. Only a local audio file gets muxed in.
    let mux_audio = cli
        .input
        .as_deref()
        .map(Path::new)
        .filter(|p| p.exists());
    let mut encoder = FfmpegEncoder::new(
        &cli.output,
        mux_audio,
        cli.width,
        cli.height,
        cli.fps,
        &cli.codec,
        &cli.pix_fmt,
        cli.crf,
        cli.bitrate.as_deref(),
    )?;

    // 6. Render loop: media time drives both the rotation ticks and the
    //    analyzer position, so the output is deterministic for a given input.
    let stage = cli.stage.then(StageCompositor::new);
    let mut surface = Surface::new(cli.width, cli.height);
    surface.clear();

    let pb = ProgressBar::new(total_frames);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .unwrap()
            .progress_chars("=>-"),
    );

    scheduler.start();
    let mut ticks_fired = 0u64;

    for frame_idx in 0..total_frames {
        let time = frame_idx as f64 / cli.fps as f64;

        if !pinned {
            let ticks_due = (time * 1000.0 / TICK_PERIOD_MS as f64) as u64;
            while ticks_fired < ticks_due {
                scheduler.tick();
                ticks_fired += 1;
            }
        }

        analyzer.seek(time);
        let ctx = FrameContext { time };
        scheduler.render_frame(&mut surface, Some(&analyzer), &ctx);
        if let Some(ref stage) = stage {
            stage.compose(&mut surface, time);
        }

        encoder.write_frame(surface.data())?;
        pb.set_position(frame_idx + 1);
    }

    pb.finish_with_message("Rendering complete");
    scheduler.stop();

    // 7. Finish encoding
    log::info!("Finishing encoding...");
    encoder.finish()?;

    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}

fn load_glyphs(cli: &Cli) -> Option<Arc<GlyphPainter>> {
    let bytes = if let Some(ref path) = cli.font {
        match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::warn!("Failed to read font {}: {}", path.display(), err);
                None
            }
        }
    } else if let Some(ref url) = cli.font_url {
        match load_font_from_url(url) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                log::warn!("Failed to load font from URL: {err}");
                None
            }
        }
    } else {
        None
    };

    match bytes {
        Some(bytes) => match GlyphPainter::from_bytes(&bytes) {
            Ok(painter) => Some(Arc::new(painter)),
            Err(err) => {
                log::warn!("Failed to parse font: {err}");
                None
            }
        },
        None => None,
    }
}
