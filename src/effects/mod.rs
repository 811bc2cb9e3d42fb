pub mod audio_reactive;
pub mod color_chase;
pub mod laser_show;
pub mod matrix_rain;
pub mod particles;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audio::analyzer::SpectrumAnalyzer;
use crate::render::color::Color;
use crate::render::surface::Surface;
use crate::render::text::GlyphPainter;

/// One tunable effect parameter. The mapping is opaque to everything outside
/// the owning effect: external collaborators persist and restore it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Toggle(bool),
    Number(f64),
    Text(String),
    /// Ordered palette of `#rrggbb` strings
    Colors(Vec<String>),
}

pub type Configuration = BTreeMap<String, ParamValue>;

/// Numeric parameter lookup; malformed or missing values degrade to the
/// default rather than failing the frame.
pub(crate) fn number(cfg: &Configuration, key: &str, default: f64) -> f64 {
    match cfg.get(key) {
        Some(ParamValue::Number(v)) if v.is_finite() => *v,
        _ => default,
    }
}

pub(crate) fn toggle(cfg: &Configuration, key: &str, default: bool) -> bool {
    match cfg.get(key) {
        Some(ParamValue::Toggle(v)) => *v,
        _ => default,
    }
}

/// Palette lookup: parse what parses, skip what doesn't.
pub(crate) fn palette(cfg: &Configuration, key: &str) -> Vec<Color> {
    match cfg.get(key) {
        Some(ParamValue::Colors(entries)) => entries
            .iter()
            .filter_map(|hex| Color::from_hex(hex))
            .collect(),
        _ => Vec::new(),
    }
}

/// Per-frame inputs shared by every render procedure.
pub struct FrameContext {
    /// Seconds: wall clock in live use, media time in offline renders.
    pub time: f64,
}

/// The one operation shape every effect implements. Stateless effects ignore
/// `&mut self`; the stateful ones (Matrix Rain, Particle System) keep their
/// animation state here so it persists across frames.
pub trait EffectRender {
    fn render(
        &mut self,
        surface: &mut Surface,
        cfg: &Configuration,
        analyzer: Option<&SpectrumAnalyzer>,
        ctx: &FrameContext,
    );
}

pub struct EffectDefinition {
    name: String,
    accent: Color,
    /// Mutable at runtime, handed outward verbatim for persistence.
    pub configuration: Configuration,
    renderer: Box<dyn EffectRender>,
}

impl EffectDefinition {
    pub fn new(
        name: impl Into<String>,
        accent: Color,
        configuration: Configuration,
        renderer: Box<dyn EffectRender>,
    ) -> Self {
        Self {
            name: name.into(),
            accent,
            configuration,
            renderer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accent color for surrounding UI (progress bar, badges); not used by
    /// the rendering math.
    pub fn accent(&self) -> Color {
        self.accent
    }

    pub fn render(
        &mut self,
        surface: &mut Surface,
        analyzer: Option<&SpectrumAnalyzer>,
        ctx: &FrameContext,
    ) {
        self.renderer.render(surface, &self.configuration, analyzer, ctx);
    }
}

/// Ordered catalog of effects. Insertion order defines rotation order; index
/// lookups are taken modulo the count so rotation never goes out of bounds.
pub struct EffectRegistry {
    effects: Vec<EffectDefinition>,
}

impl EffectRegistry {
    /// The built-in catalog, in rotation order.
    ///
    /// `glyphs` backs Matrix Rain's text drawing; without it the effect
    /// degrades to glyph-cell rectangles.
    pub fn builtin(glyphs: Option<Arc<GlyphPainter>>) -> Self {
        Self::from_effects(vec![
            color_chase::definition(),
            audio_reactive::definition(),
            matrix_rain::definition(glyphs),
            particles::definition(),
            laser_show::definition(),
        ])
    }

    pub fn from_effects(effects: Vec<EffectDefinition>) -> Self {
        assert!(!effects.is_empty(), "registry requires at least one effect");
        Self { effects }
    }

    pub fn count(&self) -> usize {
        self.effects.len()
    }

    pub fn get(&self, index: usize) -> &EffectDefinition {
        &self.effects[index % self.effects.len()]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut EffectDefinition {
        let len = self.effects.len();
        &mut self.effects[index % len]
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut EffectDefinition> {
        self.effects.iter_mut().find(|e| e.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.effects.iter().position(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.effects.iter().map(|e| e.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn builtin_catalog_order_and_uniqueness() {
        let registry = EffectRegistry::builtin(None);
        assert_eq!(registry.count(), 5);
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            [
                "Color Chase",
                "Audio Reactive",
                "Matrix Rain",
                "Particle System",
                "Laser Show"
            ]
        );
        let unique: BTreeSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn index_lookup_wraps_modulo_count() {
        let registry = EffectRegistry::builtin(None);
        for i in 0..23 {
            assert_eq!(registry.get(i).name(), registry.get(i % 5).name());
        }
        assert_eq!(registry.get(5).name(), "Color Chase");
        assert_eq!(registry.get(1002).name(), "Matrix Rain");
    }

    #[test]
    fn default_configurations_round_trip_through_json() {
        let registry = EffectRegistry::builtin(None);
        for i in 0..registry.count() {
            let original = &registry.get(i).configuration;
            let json = serde_json::to_string(original).unwrap();
            let restored: Configuration = serde_json::from_str(&json).unwrap();
            assert_eq!(&restored, original, "effect {}", registry.get(i).name());
        }
    }

    #[test]
    fn malformed_parameters_degrade_to_defaults() {
        let mut cfg = Configuration::new();
        cfg.insert("speed".into(), ParamValue::Text("fast".into()));
        cfg.insert("nan".into(), ParamValue::Number(f64::NAN));
        cfg.insert(
            "colors".into(),
            ParamValue::Colors(vec!["#FFD700".into(), "not-a-color".into()]),
        );
        assert_eq!(number(&cfg, "speed", 1.5), 1.5);
        assert_eq!(number(&cfg, "nan", 2.0), 2.0);
        assert_eq!(number(&cfg, "missing", 3.0), 3.0);
        assert_eq!(palette(&cfg, "colors"), vec![Color::rgb(255, 215, 0)]);
        assert!(toggle(&cfg, "missing", true));
    }

    #[test]
    fn param_values_deserialize_untagged() {
        let cfg: Configuration =
            serde_json::from_str(r##"{"speed":2,"mode":"linear","on":true,"colors":["#00FF00"]}"##)
                .unwrap();
        assert_eq!(cfg["speed"], ParamValue::Number(2.0));
        assert_eq!(cfg["mode"], ParamValue::Text("linear".into()));
        assert_eq!(cfg["on"], ParamValue::Toggle(true));
        assert_eq!(cfg["colors"], ParamValue::Colors(vec!["#00FF00".into()]));
    }
}
