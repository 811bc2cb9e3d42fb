use super::{number, palette, Configuration, EffectDefinition, EffectRender, FrameContext, ParamValue};
use crate::audio::analyzer::SpectrumAnalyzer;
use crate::render::color::Color;
use crate::render::surface::Surface;

/// Static palette gradient with triangular light beams sweeping across it.
/// Deterministic given the frame time; no randomness, no state.
struct ColorChase;

const BEAM_HALF_WIDTH: f32 = 50.0;

impl EffectRender for ColorChase {
    fn render(
        &mut self,
        surface: &mut Surface,
        cfg: &Configuration,
        _analyzer: Option<&SpectrumAnalyzer>,
        ctx: &FrameContext,
    ) {
        let colors = palette(cfg, "colors");
        if colors.is_empty() {
            return;
        }
        let speed = number(cfg, "speed", 1.0);
        let w = surface.width() as f32;
        let h = surface.height() as f32;

        surface.fill_linear_gradient(&colors);

        let time = ctx.time * speed;
        for (i, color) in colors.iter().enumerate() {
            let x = ((time + i as f64).sin() * 0.5 + 0.5) as f32 * w;
            surface.fill_triangle(
                (x, 0.0),
                (x - BEAM_HALF_WIDTH, h),
                (x + BEAM_HALF_WIDTH, h),
                color.with_alpha(0x40),
            );
        }
    }
}

pub fn definition() -> EffectDefinition {
    let configuration = Configuration::from([
        ("speed".into(), ParamValue::Number(1.0)),
        (
            "colors".into(),
            ParamValue::Colors(vec!["#FFD700".into(), "#FFA500".into(), "#FF4500".into()]),
        ),
        ("mode".into(), ParamValue::Text("linear".into())),
    ]);
    EffectDefinition::new(
        "Color Chase",
        Color::rgb(0xFF, 0xD7, 0x00),
        configuration,
        Box::new(ColorChase),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_on_any_surface_size() {
        let mut effect = definition();
        let ctx = FrameContext { time: 1.25 };
        for (w, h) in [(0, 0), (1, 1), (64, 36)] {
            let mut surface = Surface::new(w, h);
            effect.render(&mut surface, None, &ctx);
        }
    }

    #[test]
    fn fills_the_surface_with_the_palette() {
        let mut effect = definition();
        let mut surface = Surface::new(32, 16);
        effect.render(&mut surface, None, &FrameContext { time: 0.0 });
        // Leftmost column is the first palette color under the gradient
        let p = surface.pixel(0, 8);
        assert!(p.r > 200, "expected warm gradient, got {:?}", p);
    }

    #[test]
    fn empty_palette_draws_nothing() {
        let mut effect = definition();
        effect
            .configuration
            .insert("colors".into(), ParamValue::Colors(Vec::new()));
        let mut surface = Surface::new(8, 8);
        surface.clear();
        effect.render(&mut surface, None, &FrameContext { time: 0.0 });
        assert_eq!(surface.pixel(4, 4), Color::BLACK);
    }
}
