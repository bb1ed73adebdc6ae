//! Lighting events: the profiles that own layers and take part in the
//! start/stop lifecycle driven by the render loop.

use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::compositor::Frame;
use crate::handlers::{GameState, Layer, RenderContext, SharedGameState};
use crate::layer::EffectLayer;
use crate::{KeylightError, Result};

/// Stable name of a registered event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub String);

impl EventId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EventId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

pub trait LightEvent: Send {
    /// A disabled event asks for the devices to be released while active.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Called once when the event becomes active, before its first update.
    fn on_start(&mut self) {}

    /// Called once when the event stops being rendered.
    fn on_stop(&mut self) {}

    fn update_lights(&mut self, frame: &mut Frame, ctx: &RenderContext) -> Result<()>;

    /// Overlay contribution, rendered for the active event and for events
    /// running in the background.
    fn update_overlay_lights(&mut self, _frame: &mut Frame, _ctx: &RenderContext) -> Result<()> {
        Ok(())
    }
}

/// Event made of ordered base and overlay layers over a shared game state.
#[derive(Debug)]
pub struct ProfileEvent {
    name: String,
    enabled: bool,
    state: SharedGameState,
    layers: Vec<Layer>,
    overlay_layers: Vec<Layer>,
    starts: usize,
    stops: usize,
}

impl ProfileEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            state: Arc::new(RwLock::new(GameState::default())),
            layers: Vec::new(),
            overlay_layers: Vec::new(),
            starts: 0,
            stops: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn with_overlay_layer(mut self, layer: Layer) -> Self {
        self.overlay_layers.push(layer);
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Handle through which game integrations update the state.
    pub fn game_state(&self) -> SharedGameState {
        Arc::clone(&self.state)
    }

    pub fn starts(&self) -> usize {
        self.starts
    }

    pub fn stops(&self) -> usize {
        self.stops
    }

    fn state_snapshot(&self) -> Result<GameState> {
        self.state
            .read()
            .map(|state| state.clone())
            .map_err(|_| KeylightError::Poisoned("game state"))
    }

    fn render_layers(
        name: &str,
        layers: &mut [Layer],
        state: &GameState,
        ctx: &RenderContext,
    ) -> Result<Vec<EffectLayer>> {
        layers
            .iter_mut()
            .map(|layer| {
                layer
                    .render(state, ctx)
                    .map_err(|err| KeylightError::render(name, format!("{}: {err}", layer.name())))
            })
            .collect()
    }
}

impl LightEvent for ProfileEvent {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn on_start(&mut self) {
        self.starts += 1;
        tracing::debug!(event = %self.name, "profile started");
    }

    fn on_stop(&mut self) {
        self.stops += 1;
        tracing::debug!(event = %self.name, "profile stopped");
    }

    fn update_lights(&mut self, frame: &mut Frame, ctx: &RenderContext) -> Result<()> {
        let state = self.state_snapshot()?;
        frame.add_layers(Self::render_layers(&self.name, &mut self.layers, &state, ctx)?);
        Ok(())
    }

    fn update_overlay_lights(&mut self, frame: &mut Frame, ctx: &RenderContext) -> Result<()> {
        if self.overlay_layers.is_empty() {
            return Ok(());
        }
        let state = self.state_snapshot()?;
        frame.add_overlay_layers(Self::render_layers(
            &self.name,
            &mut self.overlay_layers,
            &state,
            ctx,
        )?);
        Ok(())
    }
}
