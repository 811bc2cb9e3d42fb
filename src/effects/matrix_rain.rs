use std::sync::Arc;

use rand::Rng;

use super::{number, toggle, Configuration, EffectDefinition, EffectRender, FrameContext, ParamValue};
use crate::audio::analyzer::SpectrumAnalyzer;
use crate::render::color::Color;
use crate::render::surface::Surface;
use crate::render::text::GlyphPainter;

const RAIN_GREEN: Color = Color::rgb(0, 255, 0);
const TRAIL_FADE: Color = Color::rgba(0, 0, 0, 26);

/// Falling glyph columns with a motion-trail fade. Drop positions persist
/// across frames; `reseedEachFrame` rebuilds them every render call for an
/// independent-frame flicker look.
pub struct MatrixRain {
    drops: Vec<f32>,
    glyphs: Option<Arc<GlyphPainter>>,
}

impl MatrixRain {
    fn new(glyphs: Option<Arc<GlyphPainter>>) -> Self {
        Self {
            drops: Vec::new(),
            glyphs,
        }
    }
}

impl EffectRender for MatrixRain {
    fn render(
        &mut self,
        surface: &mut Surface,
        cfg: &Configuration,
        _analyzer: Option<&SpectrumAnalyzer>,
        _ctx: &FrameContext,
    ) {
        let density = number(cfg, "density", 0.1) as f32;
        let speed = number(cfg, "speed", 1.0) as f32;
        let font_size = number(cfg, "fontSize", 14.0).max(1.0) as f32;

        surface.fill_blend(TRAIL_FADE);

        let w = surface.width() as f32;
        let h = surface.height() as f32;
        let columns = (w / font_size) as usize;
        if toggle(cfg, "reseedEachFrame", false) || self.drops.len() != columns {
            self.drops = vec![0.0; columns];
        }

        let mut rng = rand::rng();
        for i in 0..columns {
            let ch = char::from_u32(0x30A0 + rng.random_range(0..96u32)).unwrap_or('*');
            let x = i as f32 * font_size;
            let y = self.drops[i] * font_size;

            if rng.random::<f32>() < density {
                match &self.glyphs {
                    Some(painter) if painter.has_glyph(ch) => {
                        painter.draw_char(surface, ch, x, y, font_size, RAIN_GREEN)
                    }
                    // No usable font: a glyph-cell block keeps the rain visible
                    _ => surface.fill_rect(x, y, font_size * 0.6, font_size * 0.6, RAIN_GREEN),
                }
            }

            self.drops[i] = if y > h { 0.0 } else { self.drops[i] + speed };
        }
    }
}

pub fn definition(glyphs: Option<Arc<GlyphPainter>>) -> EffectDefinition {
    let configuration = Configuration::from([
        ("density".into(), ParamValue::Number(0.1)),
        ("speed".into(), ParamValue::Number(1.0)),
        ("fontSize".into(), ParamValue::Number(14.0)),
        ("reseedEachFrame".into(), ParamValue::Toggle(false)),
    ]);
    EffectDefinition::new(
        "Matrix Rain",
        Color::rgb(0x00, 0xFF, 0x00),
        configuration,
        Box::new(MatrixRain::new(glyphs)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_state_persists_across_frames() {
        let mut rain = MatrixRain::new(None);
        let cfg = definition(None).configuration;
        let mut surface = Surface::new(28, 28);
        let ctx = FrameContext { time: 0.0 };

        rain.render(&mut surface, &cfg, None, &ctx);
        let after_first = rain.drops.clone();
        rain.render(&mut surface, &cfg, None, &ctx);

        assert_eq!(rain.drops.len(), after_first.len());
        assert!(
            rain.drops.iter().zip(&after_first).all(|(b, a)| b > a),
            "drops should advance every frame"
        );
    }

    #[test]
    fn reseed_each_frame_resets_drop_state() {
        let mut rain = MatrixRain::new(None);
        let mut cfg = definition(None).configuration;
        cfg.insert("reseedEachFrame".into(), ParamValue::Toggle(true));
        let mut surface = Surface::new(28, 28);
        let ctx = FrameContext { time: 0.0 };

        rain.render(&mut surface, &cfg, None, &ctx);
        rain.render(&mut surface, &cfg, None, &ctx);
        // Each frame starts from zero, so one frame of advance remains
        assert!(rain.drops.iter().all(|&d| d <= 1.0 + f32::EPSILON));
    }

    #[test]
    fn drops_wrap_past_the_surface_height() {
        let mut rain = MatrixRain::new(None);
        let mut cfg = definition(None).configuration;
        cfg.insert("speed".into(), ParamValue::Number(100.0));
        let mut surface = Surface::new(28, 28);
        let ctx = FrameContext { time: 0.0 };

        for _ in 0..10 {
            rain.render(&mut surface, &cfg, None, &ctx);
        }
        // Wrap keeps positions bounded even at high speed
        assert!(rain.drops.iter().all(|&d| d * 14.0 <= 28.0 + 14.0 * 100.0));
    }

    #[test]
    fn renders_on_degenerate_surfaces() {
        let mut effect = definition(None);
        let ctx = FrameContext { time: 0.0 };
        for (w, h) in [(0, 0), (1, 1)] {
            let mut surface = Surface::new(w, h);
            effect.render(&mut surface, None, &ctx);
        }
    }
}
