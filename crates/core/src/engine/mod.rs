//! The render loop: picks the active event, drives the start/stop
//! lifecycle and pushes one composited frame per tick.

mod idle;
mod lifecycle;
mod runner;

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::canvas::SharedCanvas;
use crate::clock::{Clock, SystemClock};
use crate::color::Color;
use crate::compositor::{DeviceColorMap, DeviceDispatcher, Frame, FrameCompositor};
use crate::config::EngineConfig;
use crate::events::{EventId, LightEvent};
use crate::handlers::RenderContext;
use crate::layer::EffectLayer;
use crate::{KeylightError, Result};

pub use idle::{is_idle, render_idle};
pub use lifecycle::{EventLifecycle, LifecycleState};
pub use runner::{next_delay, CancellationToken, RenderLoop};

/// Profile picked by the resolver for this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveProfile {
    pub id: EventId,
    /// Profile shown from an editor; rendered even when disabled.
    pub preview: bool,
}

impl ActiveProfile {
    pub fn new(id: impl Into<EventId>) -> Self {
        Self {
            id: id.into(),
            preview: false,
        }
    }

    pub fn preview(id: impl Into<EventId>) -> Self {
        Self {
            id: id.into(),
            preview: true,
        }
    }
}

/// Decides which profile is active, typically from the foreground process.
pub trait ProfileResolver: Send {
    fn current_profile(&mut self) -> Option<ActiveProfile>;

    /// Profiles whose overlays render while they run in the background.
    fn overlay_active_profiles(&mut self) -> Vec<EventId> {
        Vec::new()
    }
}

/// Reports when the user last touched an input device.
pub trait IdleProbe: Send {
    fn last_input_ms(&self) -> Option<u64>;
}

/// What a tick ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered { layers: usize },
    Dimmed,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Base,
    Overlay,
}

/// Single-threaded owner of events, compositor and device dispatcher.
pub struct LightingStateManager {
    config: Arc<RwLock<EngineConfig>>,
    canvas: SharedCanvas,
    clock: Arc<dyn Clock>,
    events: BTreeMap<EventId, Box<dyn LightEvent>>,
    resolver: Box<dyn ProfileResolver>,
    idle_probe: Option<Box<dyn IdleProbe>>,
    dispatcher: Box<dyn DeviceDispatcher>,
    compositor: FrameCompositor,
    lifecycle: EventLifecycle,
    current: Option<ActiveProfile>,
    overlays: Vec<EventId>,
    last_detection_ms: Option<u64>,
    devices_suspended: bool,
    last_tick: Duration,
}

impl LightingStateManager {
    pub fn new(
        canvas: SharedCanvas,
        dispatcher: impl DeviceDispatcher + 'static,
        resolver: impl ProfileResolver + 'static,
    ) -> Result<Self> {
        let compositor = FrameCompositor::new(canvas.snapshot()?);
        Ok(Self {
            config: Arc::new(RwLock::new(EngineConfig::default())),
            canvas,
            clock: Arc::new(SystemClock),
            events: BTreeMap::new(),
            resolver: Box::new(resolver),
            idle_probe: None,
            dispatcher: Box::new(dispatcher),
            compositor,
            lifecycle: EventLifecycle::new(),
            current: None,
            overlays: Vec::new(),
            last_detection_ms: None,
            devices_suspended: false,
            last_tick: Duration::ZERO,
        })
    }

    pub fn with_config(mut self, config: Arc<RwLock<EngineConfig>>) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_idle_probe(mut self, probe: impl IdleProbe + 'static) -> Self {
        self.idle_probe = Some(Box::new(probe));
        self
    }

    /// Shared configuration; edits apply from the next tick on.
    pub fn config(&self) -> Arc<RwLock<EngineConfig>> {
        Arc::clone(&self.config)
    }

    pub fn canvas(&self) -> &SharedCanvas {
        &self.canvas
    }

    pub fn compositor_mut(&mut self) -> &mut FrameCompositor {
        &mut self.compositor
    }

    pub fn device_colors(&self) -> &DeviceColorMap {
        self.compositor.device_colors()
    }

    pub fn register_event(&mut self, id: impl Into<EventId>, event: Box<dyn LightEvent>) {
        let id = id.into();
        tracing::debug!(event = %id, "event registered");
        self.events.insert(id, event);
    }

    /// Removes an event, sending its stop notification if it was running.
    pub fn remove_event(&mut self, id: &EventId) -> Option<Box<dyn LightEvent>> {
        let mut event = self.events.remove(id)?;
        if self.lifecycle.state(id) == LifecycleState::Started {
            event.on_stop();
        }
        self.lifecycle.forget(id);
        Some(event)
    }

    pub fn lifecycle_state(&self, id: &EventId) -> LifecycleState {
        self.lifecycle.state(id)
    }

    /// How long the last tick took.
    pub fn last_tick_duration(&self) -> Duration {
        self.last_tick
    }

    /// Configured delay between ticks.
    pub fn update_delay(&self) -> Duration {
        let delay_ms = self
            .config
            .read()
            .map(|config| config.update_delay_ms)
            .unwrap_or(EngineConfig::default().update_delay_ms);
        Duration::from_millis(delay_ms)
    }

    /// Runs one tick, logging failures and panics instead of propagating
    /// them. Event panics are contained per event; a tick that still fails
    /// settles the lifecycle so events left out of it are stopped.
    pub fn run_tick(&mut self) -> Option<TickOutcome> {
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.tick()));
        self.last_tick = started.elapsed();

        match outcome {
            Ok(Ok(outcome)) => {
                tracing::trace!(?outcome, elapsed = ?self.last_tick, "tick finished");
                Some(outcome)
            }
            Ok(Err(err)) => {
                tracing::error!(error = %err, "tick failed");
                self.finish_lifecycle();
                None
            }
            Err(payload) => {
                tracing::error!(panic = %panic_message(payload.as_ref()), "tick panicked");
                self.finish_lifecycle();
                None
            }
        }
    }

    /// One pass of the state machine.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let config = self
            .config
            .read()
            .map(|config| config.clone())
            .map_err(|_| KeylightError::Poisoned("engine configuration"))?;
        let canvas = self.canvas.snapshot()?;
        let now = self.clock.now_ms();
        let brightness = config.brightness_snapshot();

        let dimmed = config
            .dimming
            .contains(self.clock.minute_of_day());
        if dimmed {
            self.compositor
                .push_frame(&canvas, Frame::new(), brightness, self.dispatcher.as_mut());
            self.finish_lifecycle();
            return Ok(TickOutcome::Dimmed);
        }

        let detect = self
            .last_detection_ms
            .map_or(true, |last| now.saturating_sub(last) >= config.detection_interval_ms);
        if detect {
            self.current = self.resolver.current_profile();
            self.overlays = self.resolver.overlay_active_profiles();
            self.last_detection_ms = Some(now);
        }

        let current = self
            .current
            .clone()
            .filter(|profile| self.events.contains_key(&profile.id));
        let disabled = current.as_ref().is_some_and(|profile| {
            !profile.preview
                && self
                    .events
                    .get(&profile.id)
                    .is_some_and(|event| !event.is_enabled())
        });

        if disabled {
            if !self.devices_suspended {
                let mut frame = Frame::new();
                let mut solid = EffectLayer::new("disabled", Arc::clone(&canvas));
                solid.fill(Color::BLACK);
                frame.add_layer(solid);
                self.compositor
                    .push_frame(&canvas, frame, brightness, self.dispatcher.as_mut());
                if let Err(err) = self.dispatcher.shutdown_devices() {
                    tracing::warn!(error = %err, "device shutdown failed");
                }
                self.devices_suspended = true;
                tracing::info!("active profile disabled, devices released");
            }
            self.finish_lifecycle();
            return Ok(TickOutcome::Suspended);
        }

        if self.devices_suspended {
            if let Err(err) = self.dispatcher.initialize_devices() {
                tracing::warn!(error = %err, "device initialisation failed");
            }
            self.devices_suspended = false;
            tracing::info!("devices re-initialised");
        }

        let ctx = RenderContext::new(
            Arc::clone(&canvas),
            self.compositor.raster_demand().clone(),
            now,
        );
        let mut frame = Frame::new();

        if let Some(profile) = &current {
            self.render_event(&profile.id, Pass::Base, &ctx, &mut frame);
            self.render_event(&profile.id, Pass::Overlay, &ctx, &mut frame);
        }

        let overlays = std::mem::take(&mut self.overlays);
        for id in &overlays {
            if current.as_ref().is_some_and(|profile| &profile.id == id) {
                continue;
            }
            self.render_event(id, Pass::Overlay, &ctx, &mut frame);
        }
        self.overlays = overlays;

        let idle = self
            .idle_probe
            .as_ref()
            .and_then(|probe| probe.last_input_ms())
            .is_some_and(|last_input| is_idle(&config.idle, now, last_input));
        if idle {
            render_idle(&config.idle, &ctx, &mut frame);
        }

        let layers = frame.layers().count();
        self.compositor
            .push_frame(&canvas, frame, brightness, self.dispatcher.as_mut());
        self.finish_lifecycle();
        Ok(TickOutcome::Rendered { layers })
    }

    /// Stops every running event and releases the devices.
    pub fn shutdown(&mut self) {
        for id in self.lifecycle.stop_all() {
            if let Some(event) = self.events.get_mut(&id) {
                guarded(&id, "stop", || event.on_stop());
            }
        }
        if let Err(err) = self.dispatcher.shutdown_devices() {
            tracing::warn!(error = %err, "device shutdown failed");
        }
    }

    fn render_event(&mut self, id: &EventId, pass: Pass, ctx: &RenderContext, frame: &mut Frame) {
        let Some(event) = self.events.get_mut(id) else {
            tracing::trace!(event = %id, "skipping unknown event");
            return;
        };

        if self.lifecycle.touch(id) {
            tracing::debug!(event = %id, "starting event");
            guarded(id, "start", || event.on_start());
        }

        let mut contribution = Frame::new();
        let result = guarded(id, "update", || match pass {
            Pass::Base => event.update_lights(&mut contribution, ctx),
            Pass::Overlay => event.update_overlay_lights(&mut contribution, ctx),
        });
        match result {
            Some(Ok(())) => frame.append(contribution),
            Some(Err(err)) => tracing::error!(event = %id, ?pass, error = %err, "event render failed"),
            None => {}
        }
    }

    fn finish_lifecycle(&mut self) {
        for id in self.lifecycle.finish_tick() {
            if let Some(event) = self.events.get_mut(&id) {
                tracing::debug!(event = %id, "stopping event");
                guarded(&id, "stop", || event.on_stop());
            }
        }
    }
}

/// Runs one event callback, turning a panic into a logged `None`.
fn guarded<T>(id: &EventId, stage: &'static str, f: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            tracing::error!(event = %id, stage, panic = %panic_message(payload.as_ref()), "event panicked");
            None
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl std::fmt::Debug for LightingStateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightingStateManager")
            .field("events", &self.events.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .field("devices_suspended", &self.devices_suspended)
            .field("last_tick", &self.last_tick)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::canvas::{Canvas, DeviceKey};
    use crate::clock::ManualClock;
    use crate::compositor::tests::RecordingDispatcher;
    use crate::config::{DimmingConfig, IdleConfig, IdleEffectKind};
    use crate::geometry::Rect;

    const NOON_MS: u64 = 12 * 3_600_000;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Event that fills the canvas and records every call.
    struct RecordingEvent {
        name: &'static str,
        color: Color,
        enabled: Arc<Mutex<bool>>,
        log: Log,
    }

    impl RecordingEvent {
        fn new(name: &'static str, color: Color, log: &Log) -> Self {
            Self {
                name,
                color,
                enabled: Arc::new(Mutex::new(true)),
                log: Arc::clone(log),
            }
        }

        fn record(&self, what: &str) {
            self.log.lock().unwrap().push(format!("{}:{what}", self.name));
        }
    }

    impl LightEvent for RecordingEvent {
        fn is_enabled(&self) -> bool {
            *self.enabled.lock().unwrap()
        }

        fn on_start(&mut self) {
            self.record("start");
        }

        fn on_stop(&mut self) {
            self.record("stop");
        }

        fn update_lights(&mut self, frame: &mut Frame, ctx: &RenderContext) -> Result<()> {
            self.record("update");
            let mut layer = ctx.new_layer(self.name);
            layer.fill(self.color);
            frame.add_layer(layer);
            Ok(())
        }

        fn update_overlay_lights(&mut self, frame: &mut Frame, ctx: &RenderContext) -> Result<()> {
            self.record("overlay");
            let mut layer = ctx.new_layer(self.name);
            layer.set_key(DeviceKey::ESC, self.color);
            frame.add_overlay_layer(layer);
            Ok(())
        }
    }

    struct FailingEvent {
        panic: bool,
    }

    impl LightEvent for FailingEvent {
        fn update_lights(&mut self, frame: &mut Frame, ctx: &RenderContext) -> Result<()> {
            let mut layer = ctx.new_layer("half done");
            layer.fill(Color::WHITE);
            frame.add_layer(layer);
            if self.panic {
                panic!("layer blew up");
            }
            Err(KeylightError::render("failing", "no data"))
        }
    }

    #[derive(Clone, Default)]
    struct ScriptedResolver {
        current: Arc<Mutex<Option<ActiveProfile>>>,
        overlays: Arc<Mutex<Vec<EventId>>>,
        calls: Arc<Mutex<usize>>,
    }

    impl ScriptedResolver {
        fn select(&self, profile: Option<ActiveProfile>) {
            *self.current.lock().unwrap() = profile;
        }
    }

    impl ProfileResolver for ScriptedResolver {
        fn current_profile(&mut self) -> Option<ActiveProfile> {
            *self.calls.lock().unwrap() += 1;
            self.current.lock().unwrap().clone()
        }

        fn overlay_active_profiles(&mut self) -> Vec<EventId> {
            self.overlays.lock().unwrap().clone()
        }
    }

    struct FixedIdle(u64);

    impl IdleProbe for FixedIdle {
        fn last_input_ms(&self) -> Option<u64> {
            Some(self.0)
        }
    }

    fn shared_canvas() -> SharedCanvas {
        SharedCanvas::new(
            Canvas::builder(20, 10)
                .key(DeviceKey::ESC, Rect::new(0.0, 0.0, 10.0, 10.0))
                .key(DeviceKey::F1, Rect::new(10.0, 0.0, 10.0, 10.0))
                .build(),
        )
    }

    fn manager(
        dispatcher: &RecordingDispatcher,
        resolver: &ScriptedResolver,
        clock: &ManualClock,
    ) -> LightingStateManager {
        let manager = LightingStateManager::new(shared_canvas(), dispatcher.clone(), resolver.clone())
            .unwrap()
            .with_clock(Arc::new(clock.clone()));
        // Detect on every tick.
        manager.config().write().unwrap().detection_interval_ms = 0;
        manager
    }

    fn entries(log: &Log, prefix: &str) -> Vec<String> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|entry| entry.starts_with(prefix))
            .cloned()
            .collect()
    }

    #[test]
    fn events_start_once_and_stop_once() {
        let log = Log::default();
        let dispatcher = RecordingDispatcher::default();
        let resolver = ScriptedResolver::default();
        let clock = ManualClock::new(NOON_MS);
        let mut manager = manager(&dispatcher, &resolver, &clock);
        manager.register_event("game", Box::new(RecordingEvent::new("game", Color::RED, &log)));
        manager.register_event("desktop", Box::new(RecordingEvent::new("desktop", Color::BLUE, &log)));

        resolver.select(Some(ActiveProfile::new("game")));
        for _ in 0..3 {
            assert!(matches!(manager.tick().unwrap(), TickOutcome::Rendered { .. }));
        }
        assert_eq!(
            entries(&log, "game"),
            vec!["game:start", "game:update", "game:overlay", "game:update", "game:overlay", "game:update", "game:overlay"]
        );
        assert_eq!(manager.device_colors().get(DeviceKey::F1), Some(Color::RED));

        resolver.select(Some(ActiveProfile::new("desktop")));
        for _ in 0..4 {
            manager.tick().unwrap();
        }
        let game = entries(&log, "game");
        assert_eq!(game.iter().filter(|e| *e == "game:stop").count(), 1);
        assert_eq!(game.last().map(String::as_str), Some("game:stop"));
        assert_eq!(entries(&log, "desktop").first().map(String::as_str), Some("desktop:start"));
        assert_eq!(entries(&log, "desktop").iter().filter(|e| *e == "desktop:start").count(), 1);
        assert_eq!(manager.lifecycle_state(&EventId::from("game")), LifecycleState::Stopped);
        assert_eq!(manager.device_colors().get(DeviceKey::F1), Some(Color::BLUE));
    }

    #[test]
    fn dimming_window_pushes_black() {
        let log = Log::default();
        let dispatcher = RecordingDispatcher::default();
        let resolver = ScriptedResolver::default();
        let clock = ManualClock::new(NOON_MS);
        let mut manager = manager(&dispatcher, &resolver, &clock);
        manager.register_event("game", Box::new(RecordingEvent::new("game", Color::RED, &log)));
        resolver.select(Some(ActiveProfile::new("game")));
        manager.tick().unwrap();

        manager.config().write().unwrap().dimming = DimmingConfig {
            enabled: true,
            start_minute: 11 * 60,
            end_minute: 13 * 60,
        };
        assert_eq!(manager.tick().unwrap(), TickOutcome::Dimmed);

        let colors = dispatcher.last().unwrap();
        assert_eq!(colors.len(), 2);
        assert!(colors.iter().all(|(_, color)| color == Color::BLACK));
        assert_eq!(entries(&log, "game").last().map(String::as_str), Some("game:stop"));
    }

    #[test]
    fn disabled_profile_releases_devices_until_enabled() {
        let log = Log::default();
        let dispatcher = RecordingDispatcher::default();
        let resolver = ScriptedResolver::default();
        let clock = ManualClock::new(NOON_MS);
        let mut manager = manager(&dispatcher, &resolver, &clock);
        let event = RecordingEvent::new("game", Color::RED, &log);
        let enabled = Arc::clone(&event.enabled);
        manager.register_event("game", Box::new(event));
        resolver.select(Some(ActiveProfile::new("game")));

        *enabled.lock().unwrap() = false;
        for _ in 0..3 {
            assert_eq!(manager.tick().unwrap(), TickOutcome::Suspended);
        }
        assert_eq!(dispatcher.count(), 1);
        assert_eq!(*dispatcher.shutdowns.lock().unwrap(), 1);
        assert!(entries(&log, "game").is_empty());

        resolver.select(Some(ActiveProfile::preview("game")));
        assert!(matches!(manager.tick().unwrap(), TickOutcome::Rendered { .. }));
        assert_eq!(*dispatcher.initialized.lock().unwrap(), 1);

        resolver.select(Some(ActiveProfile::new("game")));
        *enabled.lock().unwrap() = true;
        manager.tick().unwrap();
        assert_eq!(*dispatcher.initialized.lock().unwrap(), 1);
        assert_eq!(dispatcher.count(), 3);
    }

    #[test]
    fn failing_events_contribute_nothing() {
        let dispatcher = RecordingDispatcher::default();
        let resolver = ScriptedResolver::default();
        let clock = ManualClock::new(NOON_MS);
        let mut manager = manager(&dispatcher, &resolver, &clock);
        manager.register_event("failing", Box::new(FailingEvent { panic: false }));
        manager.register_event("panicking", Box::new(FailingEvent { panic: true }));

        resolver.select(Some(ActiveProfile::new("failing")));
        assert_eq!(manager.run_tick(), Some(TickOutcome::Rendered { layers: 0 }));
        assert_eq!(dispatcher.last().unwrap().get(DeviceKey::ESC), Some(Color::BLACK));

        resolver.select(Some(ActiveProfile::new("panicking")));
        assert_eq!(manager.run_tick(), Some(TickOutcome::Rendered { layers: 0 }));
        assert_eq!(dispatcher.last().unwrap().get(DeviceKey::ESC), Some(Color::BLACK));

        resolver.select(Some(ActiveProfile::new("failing")));
        assert!(manager.run_tick().is_some());
    }

    #[test]
    fn panicking_event_still_stops_the_previous_one() {
        let log = Log::default();
        let dispatcher = RecordingDispatcher::default();
        let resolver = ScriptedResolver::default();
        let clock = ManualClock::new(NOON_MS);
        let mut manager = manager(&dispatcher, &resolver, &clock);
        manager.register_event("game", Box::new(RecordingEvent::new("game", Color::RED, &log)));
        manager.register_event("panicking", Box::new(FailingEvent { panic: true }));

        resolver.select(Some(ActiveProfile::new("game")));
        assert!(matches!(manager.run_tick(), Some(TickOutcome::Rendered { .. })));

        resolver.select(Some(ActiveProfile::new("panicking")));
        for _ in 0..5 {
            assert_eq!(manager.run_tick(), Some(TickOutcome::Rendered { layers: 0 }));
        }

        let game = entries(&log, "game");
        assert_eq!(game.iter().filter(|e| *e == "game:stop").count(), 1);
        assert_eq!(game.last().map(String::as_str), Some("game:stop"));
        assert_eq!(manager.lifecycle_state(&EventId::from("game")), LifecycleState::Stopped);
        assert_eq!(manager.lifecycle_state(&EventId::from("panicking")), LifecycleState::Started);
        assert_eq!(dispatcher.count(), 6);
        assert_eq!(manager.device_colors().get(DeviceKey::F1), Some(Color::BLACK));
    }

    #[test]
    fn profile_detection_is_throttled() {
        let dispatcher = RecordingDispatcher::default();
        let resolver = ScriptedResolver::default();
        let clock = ManualClock::new(NOON_MS);
        let mut manager = manager(&dispatcher, &resolver, &clock);
        manager.config().write().unwrap().detection_interval_ms = 1_000;

        for _ in 0..5 {
            manager.tick().unwrap();
            clock.advance(100);
        }
        assert_eq!(*resolver.calls.lock().unwrap(), 1);
        clock.advance(600);
        manager.tick().unwrap();
        assert_eq!(*resolver.calls.lock().unwrap(), 2);
    }

    #[test]
    fn background_overlays_and_idle_effects_render_on_top() {
        let log = Log::default();
        let dispatcher = RecordingDispatcher::default();
        let resolver = ScriptedResolver::default();
        let clock = ManualClock::new(NOON_MS);
        let mut manager = manager(&dispatcher, &resolver, &clock);
        manager.register_event("game", Box::new(RecordingEvent::new("game", Color::RED, &log)));
        manager.register_event("chat", Box::new(RecordingEvent::new("chat", Color::GREEN, &log)));
        resolver.select(Some(ActiveProfile::new("game")));
        *resolver.overlays.lock().unwrap() = vec![EventId::from("chat"), EventId::from("game")];

        manager.tick().unwrap();
        assert_eq!(entries(&log, "chat"), vec!["chat:start", "chat:overlay"]);
        assert_eq!(entries(&log, "game").iter().filter(|e| *e == "game:overlay").count(), 1);
        assert_eq!(manager.device_colors().get(DeviceKey::ESC), Some(Color::GREEN));
        assert_eq!(manager.device_colors().get(DeviceKey::F1), Some(Color::RED));

        let mut manager = manager.with_idle_probe(FixedIdle(NOON_MS - 10 * 60_000));
        manager.config().write().unwrap().idle = IdleConfig {
            kind: IdleEffectKind::Dim,
            delay_minutes: 5,
            amount: 1.0,
            ..IdleConfig::default()
        };
        manager.tick().unwrap();
        assert_eq!(manager.device_colors().get(DeviceKey::F1), Some(Color::BLACK));
    }

    #[test]
    fn render_loop_runs_until_stopped() {
        let log = Log::default();
        let dispatcher = RecordingDispatcher::default();
        let resolver = ScriptedResolver::default();
        resolver.select(Some(ActiveProfile::new("game")));
        let mut manager = LightingStateManager::new(shared_canvas(), dispatcher.clone(), resolver.clone()).unwrap();
        manager.config().write().unwrap().update_delay_ms = 2;
        manager.register_event("game", Box::new(RecordingEvent::new("game", Color::RED, &log)));

        let render_loop = RenderLoop::spawn(manager).unwrap();
        while dispatcher.count() < 3 {
            std::thread::sleep(Duration::from_millis(1));
        }
        let manager = render_loop.stop().unwrap();

        assert!(dispatcher.count() >= 3);
        assert_eq!(entries(&log, "game").first().map(String::as_str), Some("game:start"));
        assert_eq!(entries(&log, "game").last().map(String::as_str), Some("game:stop"));
        assert_eq!(manager.lifecycle_state(&EventId::from("game")), LifecycleState::Stopped);
    }
}
