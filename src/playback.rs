use std::panic::{self, AssertUnwindSafe};

use crate::audio::analyzer::SpectrumAnalyzer;
use crate::effects::{EffectDefinition, EffectRegistry, FrameContext};
use crate::render::surface::Surface;
use crate::usage::{UsageEvent, UsageSink};

/// Rotation tick cadence. Rendering is paced separately, per display frame.
pub const TICK_PERIOD_MS: u64 = 100;

/// The elapsed-tick counter wraps at this bound.
const TICK_WRAP: u32 = 100;

/// The active effect advances whenever the counter hits a multiple of this.
const ROTATION_INTERVAL: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy)]
pub struct PlaybackState {
    pub active_effect: usize,
    pub elapsed_tick: u32,
    pub phase: Phase,
}

/// Drives playback: advances the tick counter, rotates the active effect,
/// invokes rendering and emits usage events. Single-threaded; the owner
/// calls `tick()` on the rotation cadence and `render_frame()` per display
/// frame. After `stop()`, ticks are no-ops until the next `start()`, so
/// cancellation is deterministic by construction.
pub struct Scheduler {
    registry: EffectRegistry,
    state: PlaybackState,
    sink: Box<dyn UsageSink>,
    user: Option<String>,
}

impl Scheduler {
    pub fn new(registry: EffectRegistry, sink: Box<dyn UsageSink>) -> Self {
        Self {
            registry,
            state: PlaybackState {
                active_effect: 0,
                elapsed_tick: 0,
                phase: Phase::Stopped,
            },
            sink,
            user: None,
        }
    }

    /// Identity under which usage events are emitted. Without one, events
    /// are suppressed, not queued.
    pub fn set_user(&mut self, user: Option<String>) {
        self.user = user;
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.phase == Phase::Running
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EffectRegistry {
        &mut self.registry
    }

    pub fn active_effect(&self) -> &EffectDefinition {
        self.registry.get(self.state.active_effect)
    }

    /// Pin a named effect as active. Returns false if the name is unknown.
    pub fn pin(&mut self, name: &str) -> bool {
        match self.registry.index_of(name) {
            Some(index) => {
                self.state.active_effect = index;
                true
            }
            None => false,
        }
    }

    /// Stopped -> Running. Idempotent; emits one usage event for the
    /// currently active effect on the actual transition.
    pub fn start(&mut self) {
        if self.state.phase == Phase::Running {
            return;
        }
        self.state.phase = Phase::Running;
        self.emit_usage();
    }

    /// Running -> Stopped. Idempotent.
    pub fn stop(&mut self) {
        self.state.phase = Phase::Stopped;
    }

    /// One rotation tick. No-op unless running.
    pub fn tick(&mut self) {
        if self.state.phase != Phase::Running {
            return;
        }
        self.state.elapsed_tick = (self.state.elapsed_tick + 1) % TICK_WRAP;
        if self.state.elapsed_tick % ROTATION_INTERVAL == 0 {
            self.state.active_effect = (self.state.active_effect + 1) % self.registry.count();
            self.emit_usage();
        }
    }

    /// Render the active effect for this display frame. A panicking effect
    /// is isolated: the frame is blanked and playback continues.
    pub fn render_frame(
        &mut self,
        surface: &mut Surface,
        analyzer: Option<&SpectrumAnalyzer>,
        ctx: &FrameContext,
    ) {
        let effect = self.registry.get_mut(self.state.active_effect);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            effect.render(surface, analyzer, ctx);
        }));
        if outcome.is_err() {
            log::error!(
                "Effect '{}' panicked during render; skipping frame",
                self.registry.get(self.state.active_effect).name()
            );
            surface.clear();
        }
    }

    fn emit_usage(&mut self) {
        if self.user.is_none() {
            return;
        }
        let effect = self.registry.get(self.state.active_effect);
        let event = UsageEvent::now(effect.name(), effect.configuration.clone());
        if let Err(e) = self.sink.record(&event) {
            log::warn!("Usage sink failed, dropping event: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Configuration, EffectRender};
    use crate::error::SinkError;
    use crate::render::color::Color;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingSink(Rc<RefCell<Vec<UsageEvent>>>);

    impl UsageSink for RecordingSink {
        fn record(&mut self, event: &UsageEvent) -> Result<(), SinkError> {
            self.0.borrow_mut().push(event.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl UsageSink for FailingSink {
        fn record(&mut self, _event: &UsageEvent) -> Result<(), SinkError> {
            Err(SinkError::Io(std::io::Error::other("sink down")))
        }
    }

    fn scheduler_with_recorder() -> (Scheduler, Rc<RefCell<Vec<UsageEvent>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = Scheduler::new(
            EffectRegistry::builtin(None),
            Box::new(RecordingSink(events.clone())),
        );
        scheduler.set_user(Some("tester".into()));
        (scheduler, events)
    }

    #[test]
    fn elapsed_tick_cycles_through_0_to_99() {
        let (mut scheduler, _) = scheduler_with_recorder();
        scheduler.start();
        for expected in 1..=250u32 {
            scheduler.tick();
            assert_eq!(scheduler.state().elapsed_tick, expected % 100);
        }
    }

    #[test]
    fn rotation_happens_exactly_every_20_ticks() {
        let (mut scheduler, _) = scheduler_with_recorder();
        scheduler.start();
        for _ in 0..39 {
            scheduler.tick();
        }
        assert_eq!(scheduler.state().active_effect, 1);
        assert_eq!(scheduler.active_effect().name(), "Audio Reactive");

        for _ in 39..59 {
            scheduler.tick();
        }
        assert_eq!(scheduler.state().active_effect, 2);
        assert_eq!(scheduler.active_effect().name(), "Matrix Rain");
    }

    #[test]
    fn rotation_wraps_modulo_registry_count() {
        let (mut scheduler, _) = scheduler_with_recorder();
        scheduler.start();
        // 100 ticks cross five rotation boundaries: back to the start
        for _ in 0..100 {
            scheduler.tick();
        }
        assert_eq!(scheduler.state().active_effect, 0);
    }

    #[test]
    fn ticks_after_stop_are_inert() {
        let (mut scheduler, _) = scheduler_with_recorder();
        scheduler.start();
        for _ in 0..5 {
            scheduler.tick();
        }
        scheduler.stop();
        let frozen = scheduler.state();
        for _ in 0..50 {
            scheduler.tick();
        }
        assert_eq!(scheduler.state().elapsed_tick, frozen.elapsed_tick);
        assert_eq!(scheduler.state().active_effect, frozen.active_effect);
    }

    #[test]
    fn each_start_emits_exactly_one_immediate_event() {
        let (mut scheduler, events) = scheduler_with_recorder();
        for _ in 0..3 {
            scheduler.start();
            scheduler.stop();
        }
        assert_eq!(events.borrow().len(), 3);
        // Idempotent start adds nothing
        scheduler.start();
        scheduler.start();
        assert_eq!(events.borrow().len(), 4);
    }

    #[test]
    fn tick_rotation_emits_with_effect_name_and_configuration() {
        let (mut scheduler, events) = scheduler_with_recorder();
        scheduler.start();
        for _ in 0..20 {
            scheduler.tick();
        }
        let events = events.borrow();
        assert_eq!(events.len(), 2); // start + one rotation
        assert_eq!(events[0].effect_name, "Color Chase");
        assert_eq!(events[1].effect_name, "Audio Reactive");
        assert!(!events[1].configuration.is_empty());
    }

    #[test]
    fn events_are_suppressed_without_a_user() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = Scheduler::new(
            EffectRegistry::builtin(None),
            Box::new(RecordingSink(events.clone())),
        );
        scheduler.start();
        for _ in 0..40 {
            scheduler.tick();
        }
        assert!(events.borrow().is_empty());
        assert_eq!(scheduler.state().active_effect, 2);
    }

    #[test]
    fn sink_failures_never_disturb_playback() {
        let mut scheduler = Scheduler::new(EffectRegistry::builtin(None), Box::new(FailingSink));
        scheduler.set_user(Some("tester".into()));
        scheduler.start();
        for _ in 0..60 {
            scheduler.tick();
        }
        assert_eq!(scheduler.state().active_effect, 3);
        assert!(scheduler.is_running());
    }

    struct PanickingEffect;

    impl EffectRender for PanickingEffect {
        fn render(
            &mut self,
            _surface: &mut Surface,
            _cfg: &Configuration,
            _analyzer: Option<&SpectrumAnalyzer>,
            _ctx: &FrameContext,
        ) {
            panic!("bad frame");
        }
    }

    #[test]
    fn a_panicking_effect_is_isolated_to_a_blank_frame() {
        let registry = EffectRegistry::from_effects(vec![EffectDefinition::new(
            "Broken",
            Color::BLACK,
            Configuration::new(),
            Box::new(PanickingEffect),
        )]);
        let mut scheduler = Scheduler::new(registry, Box::new(crate::usage::NullSink));
        let mut surface = Surface::new(4, 4);
        surface.fill(Color::rgb(7, 7, 7));

        let prev_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));
        scheduler.render_frame(&mut surface, None, &FrameContext { time: 0.0 });
        std::panic::set_hook(prev_hook);

        assert_eq!(surface.pixel(2, 2), Color::BLACK);
    }

    #[test]
    fn pinning_selects_the_named_effect() {
        let (mut scheduler, _) = scheduler_with_recorder();
        assert!(scheduler.pin("Laser Show"));
        assert_eq!(scheduler.active_effect().name(), "Laser Show");
        assert!(!scheduler.pin("No Such Effect"));
        assert_eq!(scheduler.active_effect().name(), "Laser Show");
    }
}
