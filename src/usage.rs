use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::effects::Configuration;
use crate::error::SinkError;

/// One usage record: which effect was active, with what configuration, when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageEvent {
    pub effect_name: String,
    pub configuration: Configuration,
    /// Seconds since the Unix epoch at emission time.
    pub timestamp: u64,
}

impl UsageEvent {
    pub fn now(effect_name: impl Into<String>, configuration: Configuration) -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            effect_name: effect_name.into(),
            configuration,
            timestamp,
        }
    }
}

/// Fire-and-forget sink for usage events. Failures are the sink's problem:
/// the scheduler logs and drops them, never the playback loop.
pub trait UsageSink {
    fn record(&mut self, event: &UsageEvent) -> Result<(), SinkError>;
}

/// Discards every event. Used when no usage log is configured.
pub struct NullSink;

impl UsageSink for NullSink {
    fn record(&mut self, _event: &UsageEvent) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Appends one JSON object per line to a log file.
pub struct JsonlSink {
    file: File,
}

impl JsonlSink {
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl UsageSink for JsonlSink {
    fn record(&mut self, event: &UsageEvent) -> Result<(), SinkError> {
        let line = serde_json::to_string(event)?;
        writeln!(self.file, "{line}")?;
        Ok(())
    }
}
