use super::{number, Configuration, EffectDefinition, EffectRender, FrameContext, ParamValue};
use crate::audio::analyzer::SpectrumAnalyzer;
use crate::render::color::Color;
use crate::render::surface::Surface;

/// Full-spectrum visualization: one hue-swept bar per bin, a bass-energy
/// circle in the center and three band-energy blocks. Clears every frame (no
/// trail). Returns untouched when no analyzer is supplied.
struct AudioReactive;

impl EffectRender for AudioReactive {
    fn render(
        &mut self,
        surface: &mut Surface,
        cfg: &Configuration,
        analyzer: Option<&SpectrumAnalyzer>,
        _ctx: &FrameContext,
    ) {
        let Some(analyzer) = analyzer else {
            return;
        };

        let spectrum = analyzer.get_spectrum();
        let bands = analyzer.get_frequency_bands();
        let beat = analyzer.get_beat_detection();
        let sensitivity = number(cfg, "sensitivity", 0.8) as f32;

        surface.clear();

        let w = surface.width() as f32;
        let h = surface.height() as f32;
        if w == 0.0 || h == 0.0 {
            return;
        }

        // Spectrum bars, hue swept across the bin index
        let bar_width = w / spectrum.len() as f32;
        for (i, &value) in spectrum.iter().enumerate() {
            let bar_height = (value * h * sensitivity).min(h);
            if bar_height < 0.5 {
                continue;
            }
            let hue = i as f32 / spectrum.len() as f32 * 360.0;
            surface.fill_rect(
                i as f32 * bar_width,
                h - bar_height,
                bar_width.max(1.0),
                bar_height,
                Color::from_hsla(hue, 1.0, 0.5, 0.5),
            );
        }

        // Beat intensity circle
        let radius = beat.min(1.0) * h * 0.5;
        surface.fill_circle(
            w / 2.0,
            h / 2.0,
            radius,
            Color::rgb(255, 69, 0).with_alpha((beat.clamp(0.0, 1.0) * 255.0) as u8),
        );

        // Low / mid / high band blocks
        let band_width = w / 3.0;
        for (i, value) in [bands.low, bands.mid, bands.high].iter().enumerate() {
            let band_height = (value * h).min(h);
            surface.fill_rect(
                i as f32 * band_width,
                h - band_height,
                band_width,
                band_height,
                Color::rgba(255, (i as u32 * 100).min(255) as u8, 0, 128),
            );
        }
    }
}

pub fn definition() -> EffectDefinition {
    let configuration = Configuration::from([
        ("sensitivity".into(), ParamValue::Number(0.8)),
        ("colorIntensity".into(), ParamValue::Number(1.0)),
        ("smoothing".into(), ParamValue::Number(0.5)),
    ]);
    EffectDefinition::new(
        "Audio Reactive",
        Color::rgb(0xFF, 0x45, 0x00),
        configuration,
        Box::new(AudioReactive),
    )
}
