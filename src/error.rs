use std::path::PathBuf;

/// Failure to acquire or decode an audio source. Reported to the caller of
/// [`crate::audio::analyzer::SpectrumAnalyzer::load`]; the render loop keeps
/// running on zero-filled spectrum data regardless.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unrecognized audio format: {0}")]
    Probe(#[source] symphonia::core::errors::Error),
    #[error("audio decode failed: {0}")]
    Decode(#[source] symphonia::core::errors::Error),
    #[error("no audio track in source")]
    NoAudioTrack,
    #[error("source does not declare a sample rate")]
    UnknownSampleRate,
}

/// Failure in the usage-logging sink. Always recovered locally by the
/// scheduler; never surfaced to the playback loop.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Serialize(#[from] serde_json::Error),
}
