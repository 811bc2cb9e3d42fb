use super::color::Color;
use super::surface::Surface;

const BEAM_COLORS: [&str; 5] = ["#FFD700", "#FF4500", "#FF1493", "#00FF7F", "#4169E1"];

/// Decorative backdrop for preview mode: a dark stage floor with five light
/// beams swaying on wall-clock time. Independent of the effect registry;
/// composited over the rendered frame as a translucent overlay.
pub struct StageCompositor {
    colors: Vec<Color>,
}

impl Default for StageCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl StageCompositor {
    pub fn new() -> Self {
        Self {
            colors: BEAM_COLORS
                .iter()
                .filter_map(|hex| Color::from_hex(hex))
                .collect(),
        }
    }

    pub fn compose(&self, surface: &mut Surface, time: f64) {
        let w = surface.width() as f32;
        let h = surface.height() as f32;
        if w == 0.0 || h == 0.0 {
            return;
        }

        // Stage floor along the bottom edge
        let floor_h = h * 0.14;
        surface.fill_rect(0.0, h - floor_h, w, floor_h, Color::rgb(0x1a, 0x1a, 0x1a));

        let center_x = w / 2.0;
        let origin_y = h * 0.14;
        let spacing = w * 0.078;
        let beam_len = h * 0.55;
        let half_count = self.colors.len() as f32 / 2.0;

        for (i, &color) in self.colors.iter().enumerate() {
            let angle = ((time + i as f64).sin() as f32) * std::f32::consts::FRAC_PI_4;
            let (sin_a, cos_a) = (angle.sin(), angle.cos());
            let ox = center_x + (i as f32 - half_count.floor()) * spacing;

            // Trapezoid in beam-local space, rotated about its apex
            let local = [
                (-w * 0.015, 0.0),
                (w * 0.015, 0.0),
                (w * 0.03, beam_len),
                (-w * 0.03, beam_len),
            ];
            let rotate = |(x, y): (f32, f32)| {
                (ox + x * cos_a - y * sin_a, origin_y + x * sin_a + y * cos_a)
            };
            let points: Vec<(f32, f32)> = local.iter().map(|&p| rotate(p)).collect();

            let stops = [
                (0.0, color.with_alpha(0x33)),
                (0.5, color.with_alpha(0x66)),
                (1.0, color.with_alpha(0x11)),
            ];
            surface.fill_convex_polygon_gradient(
                &points,
                rotate((0.0, 0.0)),
                rotate((0.0, beam_len)),
                &stops,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_draws_the_floor() {
        let mut s = Surface::new(64, 64);
        s.clear();
        StageCompositor::new().compose(&mut s, 0.5);
        assert_eq!(s.pixel(0, 63), Color::rgb(0x1a, 0x1a, 0x1a));
    }

    #[test]
    fn compose_survives_tiny_surfaces() {
        let mut s = Surface::new(1, 1);
        StageCompositor::new().compose(&mut s, 0.0);
        let mut empty = Surface::new(0, 0);
        StageCompositor::new().compose(&mut empty, 0.0);
    }
}
