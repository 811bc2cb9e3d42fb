use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "luxa", about = "Audio-reactive lighting effects video renderer")]
pub struct Cli {
    /// Input audio file or URL (WAV, MP3, FLAC, OGG, AAC)
    pub input: Option<String>,

    /// Output video file
    #[arg(short, long, default_value = "output.mp4")]
    pub output: PathBuf,

    /// Pin a single effect instead of rotating through the catalog
    #[arg(short, long)]
    pub effect: Option<String>,

    /// Render length in seconds when no audio drives the duration
    #[arg(short, long, default_value_t = 12.0)]
    pub duration: f64,

    /// Video width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Video height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// H.264 CRF quality (0-51, lower = better). Ignored when --bitrate is set.
    #[arg(long, default_value_t = 18)]
    pub crf: u32,

    /// Video bitrate (e.g. 2400k, 5M). When set, uses -b:v instead of -crf.
    #[arg(short, long)]
    pub bitrate: Option<String>,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,

    /// Composite the decorative stage backdrop over each frame
    #[arg(long)]
    pub stage: bool,

    /// List available effects and exit
    #[arg(long)]
    pub list_effects: bool,

    /// Config file path (defaults to ./luxa.toml or the platform config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Font file for text-drawing effects
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Font URL for text-drawing effects
    #[arg(long)]
    pub font_url: Option<String>,

    /// User identity for usage events; without one, no events are emitted
    #[arg(long)]
    pub user: Option<String>,

    /// Append usage events to this JSONL file
    #[arg(long)]
    pub usage_log: Option<PathBuf>,
}
