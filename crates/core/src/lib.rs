//! Core library for the Keylight lighting engine.
//!
//! Effects paint into per-frame layers laid out on a shared canvas, the
//! compositor flattens those layers into one color per device key, and the
//! render loop drives the whole pipeline at a fixed cadence. Each module owns
//! one piece of that pipeline and can be used on its own.

pub mod canvas;
pub mod clock;
pub mod color;
pub mod compositor;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod handlers;
pub mod layer;
pub mod percent;
pub mod sequence;
pub mod zone;

pub use canvas::{Canvas, CanvasBuilder, DeviceKey, SharedCanvas};
pub use clock::{Clock, ManualClock, SystemClock};
pub use color::{Brush, Color, ColorStop, LinearGradient};
pub use compositor::{DeviceColorMap, DeviceDispatcher, Frame, FrameCompositor, PreviewSink};
pub use config::{EngineConfig, IdleEffectKind};
pub use engine::{
    ActiveProfile, CancellationToken, IdleProbe, LightingStateManager, ProfileResolver,
    RenderLoop, TickOutcome,
};
pub use error::{KeylightError, Result};
pub use events::{EventId, LightEvent, ProfileEvent};
pub use geometry::{Point, Polygon, Rect};
pub use handlers::{GameState, Layer, LayerHandler, PercentLayerHandler, RenderContext, SolidFillLayerHandler};
pub use layer::{Backing, Bitmap, EffectLayer, RasterDemand};
pub use percent::{PercentEffect, PercentEffectType, PercentRenderer};
pub use sequence::{FreeForm, KeySequence};
pub use zone::{KeyMask, ZoneCache};
