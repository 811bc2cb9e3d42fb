use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

use super::decode::{self, AudioClip};
use crate::error::LoadError;

/// Number of frequency bins every spectrum query returns, loaded or not.
pub const SPECTRUM_BINS: usize = 2048;

/// Bins used for the bass-energy beat proxy.
const BASS_BINS: usize = 10;

const FFT_SIZE: usize = SPECTRUM_BINS * 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBands {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

enum Transport {
    Paused { position: f64 },
    Playing { origin: f64, since: Instant },
}

/// Bridges one audio source into per-frame frequency-domain features.
///
/// The spectrum is recomputed on demand for the current transport position;
/// nothing is cached between queries. Before any source is loaded, every
/// query returns silence (zero-filled bins), so render procedures never
/// branch on availability.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    clip: Option<AudioClip>,
    transport: Transport,
}

impl Default for SpectrumAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectrumAnalyzer {
    pub fn new() -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);
        Self {
            fft,
            window: hann_window(FFT_SIZE),
            clip: None,
            transport: Transport::Paused { position: 0.0 },
        }
    }

    /// Acquire and decode an audio source, replacing any current one.
    /// `source` is a filesystem path or an http(s) URL. On failure the
    /// previous source stays released and queries keep returning silence.
    pub fn load(&mut self, source: &str) -> Result<(), LoadError> {
        // Release the prior source before acquiring the replacement
        self.clip = None;
        self.transport = Transport::Paused { position: 0.0 };

        let clip = if source.starts_with("http://") || source.starts_with("https://") {
            let bytes = fetch(source)?;
            let ext = source.rsplit('/').next().and_then(|name| {
                name.rsplit_once('.').map(|(_, ext)| ext.to_owned())
            });
            decode::decode_bytes(bytes, ext.as_deref())?
        } else {
            decode::decode_file(Path::new(source))?
        };

        self.load_clip(clip);
        Ok(())
    }

    /// Install an already-decoded clip. Used by `load` and by callers that
    /// decode out of band.
    pub fn load_clip(&mut self, clip: AudioClip) {
        self.clip = Some(clip);
        self.transport = Transport::Paused { position: 0.0 };
    }

    pub fn is_loaded(&self) -> bool {
        self.clip.is_some()
    }

    pub fn duration(&self) -> Option<f64> {
        self.clip.as_ref().map(AudioClip::duration)
    }

    /// Start the transport. No-op without a source or when already playing.
    pub fn play(&mut self) {
        if self.clip.is_none() {
            return;
        }
        if let Transport::Paused { position } = self.transport {
            self.transport = Transport::Playing {
                origin: position,
                since: Instant::now(),
            };
        }
    }

    /// Stop the transport, keeping the current position. Redundant calls are
    /// no-ops.
    pub fn pause(&mut self) {
        if let Transport::Playing { .. } = self.transport {
            let position = self.position();
            self.transport = Transport::Paused { position };
        }
    }

    /// Move the transport to an absolute time. Used by the offline renderer
    /// to step media time deterministically.
    pub fn seek(&mut self, seconds: f64) {
        let seconds = seconds.max(0.0);
        self.transport = match self.transport {
            Transport::Playing { .. } => Transport::Playing {
                origin: seconds,
                since: Instant::now(),
            },
            Transport::Paused { .. } => Transport::Paused { position: seconds },
        };
    }

    pub fn position(&self) -> f64 {
        match &self.transport {
            Transport::Paused { position } => *position,
            Transport::Playing { origin, since } => origin + since.elapsed().as_secs_f64(),
        }
    }

    /// Magnitude spectrum at the current position: always exactly
    /// [`SPECTRUM_BINS`] values, zero-filled when no source has produced
    /// data. Linear scale, 0.0 is silence; values are not clamped.
    pub fn get_spectrum(&self) -> Vec<f32> {
        let mut bins = vec![0.0f32; SPECTRUM_BINS];
        let Some(clip) = &self.clip else {
            return bins;
        };
        if clip.samples.is_empty() || clip.sample_rate == 0 {
            return bins;
        }

        let center = (self.position() * clip.sample_rate as f64) as usize;
        let start = center.saturating_sub(FFT_SIZE / 2);
        if start >= clip.samples.len() {
            return bins;
        }
        let end = (start + FFT_SIZE).min(clip.samples.len());

        let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); FFT_SIZE];
        for (i, &sample) in clip.samples[start..end].iter().enumerate() {
            buffer[i] = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut buffer);

        let norm = 1.0 / (FFT_SIZE as f32 / 2.0);
        for (bin, value) in bins.iter_mut().zip(buffer[..SPECTRUM_BINS].iter()) {
            *bin = value.norm() * norm;
        }
        bins
    }

    /// Bass energy: mean absolute magnitude of the lowest bins. Unclamped;
    /// callers normalize to taste.
    pub fn get_beat_detection(&self) -> f32 {
        let spectrum = self.get_spectrum();
        spectrum[..BASS_BINS].iter().map(|v| v.abs()).sum::<f32>() / BASS_BINS as f32
    }

    /// Mean absolute magnitude over three equal thirds of the spectrum, each
    /// normalized by a third of the bin count so the values are comparable
    /// regardless of FFT size.
    pub fn get_frequency_bands(&self) -> FrequencyBands {
        let spectrum = self.get_spectrum();
        let third = spectrum.len() / 3;
        let sum = |range: &[f32]| range.iter().map(|v| v.abs()).sum::<f32>();
        let normalize = |v: f32| v / third as f32;
        FrequencyBands {
            low: normalize(sum(&spectrum[..third])),
            mid: normalize(sum(&spectrum[third..2 * third])),
            high: normalize(sum(&spectrum[2 * third..])),
        }
    }
}

fn fetch(url: &str) -> Result<Vec<u8>, LoadError> {
    let map = |source: reqwest::Error| LoadError::Fetch {
        url: url.to_owned(),
        source,
    };
    let response = reqwest::blocking::get(url).map_err(map)?.error_for_status().map_err(map)?;
    Ok(response.bytes().map_err(map)?.to_vec())
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_clip(freq: f32, seconds: f32) -> AudioClip {
        let sample_rate = 44100u32;
        let samples: Vec<f32> = (0..(sample_rate as f32 * seconds) as usize)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect();
        AudioClip { samples, sample_rate }
    }

    fn silent_clip(seconds: f32) -> AudioClip {
        AudioClip {
            samples: vec![0.0; (44100.0 * seconds) as usize],
            sample_rate: 44100,
        }
    }

    #[test]
    fn spectrum_is_zero_filled_before_load() {
        let analyzer = SpectrumAnalyzer::new();
        let spectrum = analyzer.get_spectrum();
        assert_eq!(spectrum.len(), SPECTRUM_BINS);
        assert!(spectrum.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn spectrum_stays_zero_after_failed_load() {
        let mut analyzer = SpectrumAnalyzer::new();
        assert!(analyzer.load("/nonexistent/clip.wav").is_err());
        assert!(!analyzer.is_loaded());
        assert!(analyzer.get_spectrum().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn silent_spectrum_yields_zero_bands_and_beat() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.load_clip(silent_clip(1.0));
        analyzer.seek(0.5);
        let bands = analyzer.get_frequency_bands();
        assert_eq!(bands, FrequencyBands { low: 0.0, mid: 0.0, high: 0.0 });
        assert_eq!(analyzer.get_beat_detection(), 0.0);
    }

    #[test]
    fn low_frequency_energy_lands_in_the_low_band() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.load_clip(sine_clip(100.0, 1.0));
        analyzer.seek(0.5);
        let bands = analyzer.get_frequency_bands();
        assert!(bands.low > bands.mid, "low={} mid={}", bands.low, bands.mid);
        assert!(bands.low > bands.high, "low={} high={}", bands.low, bands.high);
    }

    #[test]
    fn bass_sine_registers_beat_energy() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.load_clip(sine_clip(60.0, 1.0));
        analyzer.seek(0.5);
        assert!(analyzer.get_beat_detection() > 0.0);
    }

    #[test]
    fn play_and_pause_are_idempotent() {
        let mut analyzer = SpectrumAnalyzer::new();
        // No source loaded: both are no-ops
        analyzer.play();
        analyzer.pause();
        assert_eq!(analyzer.position(), 0.0);

        analyzer.load_clip(sine_clip(440.0, 0.5));
        analyzer.play();
        analyzer.play();
        analyzer.pause();
        analyzer.pause();
        assert!(analyzer.position() >= 0.0);
    }

    #[test]
    fn reload_supersedes_the_previous_source() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.load_clip(sine_clip(440.0, 2.0));
        analyzer.seek(1.5);
        analyzer.load_clip(sine_clip(440.0, 1.0));
        assert_eq!(analyzer.position(), 0.0);
        assert!((analyzer.duration().unwrap() - 1.0).abs() < 0.01);
    }

    #[test]
    fn queries_past_the_end_return_silence() {
        let mut analyzer = SpectrumAnalyzer::new();
        analyzer.load_clip(sine_clip(440.0, 0.5));
        analyzer.seek(10.0);
        assert!(analyzer.get_spectrum().iter().all(|&v| v == 0.0));
    }
}
