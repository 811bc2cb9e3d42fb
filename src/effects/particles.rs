use rand::Rng;

use super::{number, toggle, Configuration, EffectDefinition, EffectRender, FrameContext, ParamValue};
use crate::audio::analyzer::SpectrumAnalyzer;
use crate::render::color::Color;
use crate::render::surface::Surface;

const ROYAL_BLUE: Color = Color::rgb(65, 105, 225);
const TRAIL_FADE: Color = Color::rgba(0, 0, 0, 26);
const PARTICLE_RADIUS: f32 = 2.0;

#[derive(Clone, Copy)]
struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
}

/// Bouncing particles with proximity connections: every pair closer than the
/// connection radius gets a line whose alpha falls off linearly with
/// distance. O(n^2) per frame; the default count keeps that bounded.
/// Particle state persists across frames unless `reseedEachFrame` is set.
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    fn new() -> Self {
        Self {
            particles: Vec::new(),
        }
    }

    fn seed(&mut self, count: usize, max_speed: f32, w: f32, h: f32) {
        let mut rng = rand::rng();
        self.particles = (0..count)
            .map(|_| Particle {
                x: rng.random::<f32>() * w,
                y: rng.random::<f32>() * h,
                vx: (rng.random::<f32>() - 0.5) * max_speed,
                vy: (rng.random::<f32>() - 0.5) * max_speed,
            })
            .collect();
    }
}

/// Connection stroke alpha for a pair at `distance`: linear falloff to zero
/// at the radius, none at or beyond it. A zero radius yields no connections
/// (distance < 0 is never true).
fn connection_alpha(distance: f32, radius: f32) -> Option<f32> {
    if distance < radius {
        Some(1.0 - distance / radius)
    } else {
        None
    }
}

impl EffectRender for ParticleSystem {
    fn render(
        &mut self,
        surface: &mut Surface,
        cfg: &Configuration,
        _analyzer: Option<&SpectrumAnalyzer>,
        _ctx: &FrameContext,
    ) {
        let count = number(cfg, "particleCount", 100.0).max(0.0) as usize;
        let max_speed = number(cfg, "maxSpeed", 2.0) as f32;
        let radius = number(cfg, "connectionRadius", 100.0).max(0.0) as f32;

        let w = surface.width() as f32;
        let h = surface.height() as f32;

        surface.fill_blend(TRAIL_FADE);

        if toggle(cfg, "reseedEachFrame", false) || self.particles.len() != count {
            self.seed(count, max_speed, w, h);
        }

        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            if p.x < 0.0 || p.x > w {
                p.vx = -p.vx;
            }
            if p.y < 0.0 || p.y > h {
                p.vy = -p.vy;
            }
        }

        for p in &self.particles {
            surface.fill_circle(p.x, p.y, PARTICLE_RADIUS, ROYAL_BLUE);
        }

        // One stroke per unordered pair within the radius
        for i in 0..self.particles.len() {
            for j in (i + 1)..self.particles.len() {
                let a = self.particles[i];
                let b = self.particles[j];
                let distance = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
                if let Some(alpha) = connection_alpha(distance, radius) {
                    surface.stroke_line(
                        a.x,
                        a.y,
                        b.x,
                        b.y,
                        1.0,
                        ROYAL_BLUE.with_alpha((alpha * 255.0) as u8),
                    );
                }
            }
        }
    }
}

pub fn definition() -> EffectDefinition {
    let configuration = Configuration::from([
        ("particleCount".into(), ParamValue::Number(100.0)),
        ("maxSpeed".into(), ParamValue::Number(2.0)),
        ("connectionRadius".into(), ParamValue::Number(100.0)),
        ("reseedEachFrame".into(), ParamValue::Toggle(false)),
    ]);
    EffectDefinition::new(
        "Particle System",
        ROYAL_BLUE,
        configuration,
        Box::new(ParticleSystem::new()),
    )
}
