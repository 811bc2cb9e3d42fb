use super::{number, Configuration, EffectDefinition, EffectRender, FrameContext, ParamValue};
use crate::audio::analyzer::SpectrumAnalyzer;
use crate::render::color::Color;
use crate::render::surface::Surface;

const LASER_PINK: Color = Color::rgb(255, 20, 147);
const TRAIL_FADE: Color = Color::rgba(0, 0, 0, 26);

/// Rotating gradient beams from the surface center. Each beam is stroked
/// twice: a wide low-alpha pass for glow, then the core stroke. Angle
/// advances linearly with time; deterministic, no state.
struct LaserShow;

impl EffectRender for LaserShow {
    fn render(
        &mut self,
        surface: &mut Surface,
        cfg: &Configuration,
        _analyzer: Option<&SpectrumAnalyzer>,
        ctx: &FrameContext,
    ) {
        let beam_count = number(cfg, "beamCount", 5.0).max(0.0) as usize;
        let rotation_speed = number(cfg, "rotationSpeed", 1.0);
        let thickness = number(cfg, "thickness", 2.0).max(1.0) as f32;

        surface.fill_blend(TRAIL_FADE);

        let w = surface.width() as f32;
        let h = surface.height() as f32;
        let center_x = w / 2.0;
        let center_y = h / 2.0;
        let length = w.min(h) * 0.8;
        let time = ctx.time * rotation_speed;

        for i in 0..beam_count {
            let angle =
                (i as f64 / beam_count as f64 * std::f64::consts::TAU + time) as f32;
            let end_x = center_x + angle.cos() * length;
            let end_y = center_y + angle.sin() * length;

            // Glow pass under the core beam
            surface.stroke_line_gradient(
                center_x,
                center_y,
                end_x,
                end_y,
                thickness * 4.0,
                LASER_PINK.with_alpha(0x40),
                LASER_PINK.with_alpha(0),
            );
            surface.stroke_line_gradient(
                center_x,
                center_y,
                end_x,
                end_y,
                thickness,
                LASER_PINK,
                LASER_PINK.with_alpha(0),
            );
        }
    }
}

pub fn definition() -> EffectDefinition {
    let configuration = Configuration::from([
        ("beamCount".into(), ParamValue::Number(5.0)),
        ("rotationSpeed".into(), ParamValue::Number(1.0)),
        ("thickness".into(), ParamValue::Number(2.0)),
    ]);
    EffectDefinition::new("Laser Show", LASER_PINK, configuration, Box::new(LaserShow))
}
