//! Layer handlers turn configuration plus the current game state into an
//! [`EffectLayer`] once per tick.

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canvas::Canvas;
use crate::color::{Brush, LinearGradient};
use crate::layer::{EffectLayer, RasterDemand};
use crate::percent::{PercentEffect, PercentRenderer};
use crate::sequence::KeySequence;
use crate::zone::{KeyMask, ZoneCache};
use crate::{KeylightError, Result};

/// JSON document describing whatever the lit application exposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameState {
    document: Value,
}

impl GameState {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Number at a JSON pointer such as `/player/health`.
    pub fn number(&self, pointer: &str) -> Option<f64> {
        self.document.pointer(pointer).and_then(Value::as_f64)
    }

    pub fn flag(&self, pointer: &str) -> Option<bool> {
        self.document.pointer(pointer).and_then(Value::as_bool)
    }

    /// Replaces the value at `pointer`, creating intermediate objects.
    pub fn set(&mut self, pointer: &str, value: Value) -> Result<()> {
        if pointer.is_empty() {
            self.document = value;
            return Ok(());
        }
        if !pointer.starts_with('/') {
            return Err(KeylightError::InvalidInput("json pointers start with `/`"));
        }

        let mut node = &mut self.document;
        for segment in pointer[1..].split('/') {
            if !node.is_object() {
                *node = Value::Object(Default::default());
            }
            let Value::Object(map) = node else {
                return Err(KeylightError::InvalidInput("json pointer crosses a non-object"));
            };
            node = map.entry(segment.replace("~1", "/").replace("~0", "~")).or_insert(Value::Null);
        }
        *node = value;
        Ok(())
    }
}

/// Game state shared with whatever feeds it; renders read a snapshot.
pub type SharedGameState = Arc<RwLock<GameState>>;

/// Everything a handler needs besides its own configuration.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub canvas: Arc<Canvas>,
    pub raster_demand: RasterDemand,
    pub time_ms: u64,
}

impl RenderContext {
    pub fn new(canvas: Arc<Canvas>, raster_demand: RasterDemand, time_ms: u64) -> Self {
        Self {
            canvas,
            raster_demand,
            time_ms,
        }
    }

    /// Empty layer with the backing the current raster demand calls for.
    pub fn new_layer(&self, name: &str) -> EffectLayer {
        EffectLayer::for_demand(name, Arc::clone(&self.canvas), &self.raster_demand)
    }
}

pub trait LayerHandler: Send {
    fn render(&mut self, state: &GameState, ctx: &RenderContext) -> Result<EffectLayer>;
}

/// A configured layer: a handler plus the generic per-layer settings.
pub struct Layer {
    name: String,
    enabled: bool,
    opacity: f32,
    exclusion: Option<KeyMask>,
    handler: Box<dyn LayerHandler>,
}

impl Layer {
    pub fn new(name: impl Into<String>, handler: impl LayerHandler + 'static) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            opacity: 1.0,
            exclusion: None,
            handler: Box::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_exclusion(mut self, exclusion: KeySequence) -> Self {
        self.exclusion = Some(KeyMask::unresolved(exclusion));
        self
    }

    pub fn exclusion(&self) -> Option<&KeyMask> {
        self.exclusion.as_ref()
    }

    /// Disabled layers render the null layer.
    pub fn render(&mut self, state: &GameState, ctx: &RenderContext) -> Result<EffectLayer> {
        if !self.enabled {
            return Ok(EffectLayer::null());
        }

        let mut layer = self.handler.render(state, ctx)?;
        let opacity = layer.opacity() * self.opacity;
        layer.set_opacity(opacity);
        if let Some(exclusion) = &mut self.exclusion {
            layer.exclude_cached(exclusion);
        }
        Ok(layer)
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .field("opacity", &self.opacity)
            .finish()
    }
}

/// Paints a region with a solid color or gradient.
#[derive(Debug)]
pub struct SolidFillLayerHandler {
    sequence: KeySequence,
    brush: Brush,
    cache: ZoneCache,
}

impl SolidFillLayerHandler {
    pub fn new(sequence: KeySequence, brush: impl Into<Brush>) -> Self {
        Self {
            sequence,
            brush: brush.into(),
            cache: ZoneCache::new(),
        }
    }

    pub fn gradient(sequence: KeySequence, gradient: LinearGradient) -> Self {
        Self::new(sequence, Brush::Linear(gradient))
    }
}

impl LayerHandler for SolidFillLayerHandler {
    fn render(&mut self, _state: &GameState, ctx: &RenderContext) -> Result<EffectLayer> {
        let mut layer = ctx.new_layer("solid fill");
        layer.set_sequence_cached(&mut self.cache, &self.sequence, self.brush.clone());
        Ok(layer)
    }
}

/// Percent bar driven by numbers in the game state.
#[derive(Debug)]
pub struct PercentLayerHandler {
    sequence: KeySequence,
    effect: PercentEffect,
    value_pointer: String,
    total_pointer: Option<String>,
    renderer: PercentRenderer,
}

impl PercentLayerHandler {
    pub fn new(sequence: KeySequence, effect: PercentEffect, value_pointer: impl Into<String>) -> Self {
        Self {
            sequence,
            effect,
            value_pointer: value_pointer.into(),
            total_pointer: None,
            renderer: PercentRenderer::new(),
        }
    }

    pub fn with_total_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.total_pointer = Some(pointer.into());
        self
    }
}

impl LayerHandler for PercentLayerHandler {
    fn render(&mut self, state: &GameState, ctx: &RenderContext) -> Result<EffectLayer> {
        let mut effect = self.effect.clone();
        match state.number(&self.value_pointer) {
            Some(value) => effect.value = value,
            None => tracing::trace!(pointer = %self.value_pointer, "percent value missing"),
        }
        if let Some(total) = self.total_pointer.as_deref().and_then(|p| state.number(p)) {
            effect.total = total;
        }

        let mut layer = ctx.new_layer("percent");
        self.renderer
            .render(&mut layer, &self.sequence, &effect, ctx.time_ms);
        Ok(layer)
    }
}
