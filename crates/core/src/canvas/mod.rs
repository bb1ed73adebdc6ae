//! The addressable surface: a virtual pixel grid plus the rectangle every
//! [`DeviceKey`] occupies on it.

mod keys;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::geometry::{Point, Rect};
use crate::{KeylightError, Result};

pub use keys::{DeviceKey, PERIPHERAL_KEYS};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Immutable canvas description. Swap a new instance in through
/// [`SharedCanvas::replace`] instead of mutating one.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    regions: Vec<Rect>,
    editor_width: f32,
    editor_height: f32,
    editor_origin: Point,
    revision: u64,
}

impl Canvas {
    pub fn builder(width: u32, height: u32) -> CanvasBuilder {
        CanvasBuilder::new(width, height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    /// Unique per built instance; caches compare it to notice a swap.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Region of `key`, or [`Rect::EMPTY`] when the key is not on this canvas.
    pub fn rectangle(&self, key: DeviceKey) -> Rect {
        self.regions[key.index()]
    }

    pub fn contains_key(&self, key: DeviceKey) -> bool {
        !self.regions[key.index()].is_empty()
    }

    /// Keys present on this canvas, in index order.
    pub fn keys(&self) -> impl Iterator<Item = DeviceKey> + '_ {
        DeviceKey::ALL
            .iter()
            .copied()
            .filter(move |key| self.contains_key(*key))
    }

    /// Canvas pixels per horizontal editor unit.
    pub fn editor_to_canvas_width(&self) -> f32 {
        self.width as f32 / self.editor_width
    }

    /// Canvas pixels per vertical editor unit.
    pub fn editor_to_canvas_height(&self) -> f32 {
        self.height as f32 / self.editor_height
    }

    /// Maps an editor-space point onto the canvas.
    pub fn editor_to_canvas(&self, point: Point) -> Point {
        Point::new(
            (point.x + self.editor_origin.x) * self.editor_to_canvas_width(),
            (point.y + self.editor_origin.y) * self.editor_to_canvas_height(),
        )
    }
}

/// Canvases compare by size only, so consumers re-resolve on resizes and
/// not on per-key remapping.
impl PartialEq for Canvas {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl Eq for Canvas {}

#[derive(Debug, Clone)]
pub struct CanvasBuilder {
    width: u32,
    height: u32,
    regions: Vec<Rect>,
    editor_width: f32,
    editor_height: f32,
    editor_origin: Point,
}

impl CanvasBuilder {
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            regions: vec![Rect::EMPTY; DeviceKey::COUNT],
            editor_width: width as f32,
            editor_height: height as f32,
            editor_origin: Point::default(),
        }
    }

    /// Size of the editor coordinate space the canvas maps from.
    pub fn editor_size(mut self, width: f32, height: f32) -> Self {
        if width > 0.0 && height > 0.0 {
            self.editor_width = width;
            self.editor_height = height;
        } else {
            tracing::warn!(width, height, "ignoring non-positive editor size");
        }
        self
    }

    /// Offset added to editor coordinates before scaling.
    pub fn editor_origin(mut self, origin: Point) -> Self {
        self.editor_origin = origin;
        self
    }

    /// Places `key` at `rect`. Parts outside the canvas are clipped and
    /// regions without area are dropped.
    pub fn key(mut self, key: DeviceKey, rect: Rect) -> Self {
        let x = rect.x.max(0.0);
        let y = rect.y.max(0.0);
        let clipped = Rect::new(
            x,
            y,
            rect.right().min(self.width as f32) - x,
            rect.bottom().min(self.height as f32) - y,
        );

        if clipped.is_empty() {
            tracing::warn!(key = key.name(), ?rect, "dropping key region without area");
            self.regions[key.index()] = Rect::EMPTY;
        } else {
            if clipped != rect {
                tracing::warn!(key = key.name(), ?rect, "clipping key region to the canvas");
            }
            self.regions[key.index()] = clipped;
        }
        self
    }

    pub fn build(self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
            regions: self.regions,
            editor_width: self.editor_width,
            editor_height: self.editor_height,
            editor_origin: self.editor_origin,
            revision: NEXT_REVISION.fetch_add(1, Ordering::Relaxed),
        }
    }
}

/// Shared, swappable canvas reference. Replacing the canvas is the
/// canvas-changed broadcast: caches notice the new revision on next use.
#[derive(Debug, Clone)]
pub struct SharedCanvas {
    current: Arc<RwLock<Arc<Canvas>>>,
}

impl SharedCanvas {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(canvas))),
        }
    }

    /// The canvas every component should use for the whole of one tick.
    pub fn snapshot(&self) -> Result<Arc<Canvas>> {
        self.current
            .read()
            .map(|canvas| Arc::clone(&*canvas))
            .map_err(|_| KeylightError::Poisoned("canvas"))
    }

    /// Swaps in `canvas` and returns its revision.
    pub fn replace(&self, canvas: Canvas) -> Result<u64> {
        let revision = canvas.revision();
        let mut slot = self
            .current
            .write()
            .map_err(|_| KeylightError::Poisoned("canvas"))?;
        *slot = Arc::new(canvas);
        tracing::debug!(revision, "canvas replaced");
        Ok(revision)
    }

    pub fn revision(&self) -> Result<u64> {
        Ok(self.snapshot()?.revision())
    }
}
