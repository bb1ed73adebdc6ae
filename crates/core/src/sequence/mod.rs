use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, DeviceKey};
use crate::geometry::{Point, Polygon, Rect};

/// Rotated rectangle in editor coordinates. `x`/`y` locate its centre and
/// `angle` is in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FreeForm {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub angle: f32,
}

impl FreeForm {
    /// Smallest width/height (editor units) a freeform is drawn with.
    pub const MIN_SIZE: f32 = 3.0;

    pub fn new(x: f32, y: f32, width: f32, height: f32, angle: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            angle,
        }
    }

    /// Unrotated bounds on `canvas`, after the minimum-size floor.
    pub fn canvas_rect(&self, canvas: &Canvas) -> Rect {
        let width = self.width.max(Self::MIN_SIZE) * canvas.editor_to_canvas_width();
        let height = self.height.max(Self::MIN_SIZE) * canvas.editor_to_canvas_height();
        let center = canvas.editor_to_canvas(Point::new(self.x, self.y));
        Rect::new(
            center.x - width * 0.5,
            center.y - height * 0.5,
            width,
            height,
        )
    }

    /// The rotated region on `canvas`.
    pub fn canvas_polygon(&self, canvas: &Canvas) -> Polygon {
        Polygon::rotated_rect(self.canvas_rect(canvas), self.angle)
    }

    /// Leading `progress` share of the region (width scaled before the
    /// rotation, which still pivots on the full region's centre).
    pub fn progress_polygon(&self, canvas: &Canvas, progress: f32) -> Polygon {
        let full = self.canvas_rect(canvas);
        let part = Rect::new(full.x, full.y, full.width * progress.clamp(0.0, 1.0), full.height);
        Polygon::rotated_rect_about(part, full.center(), self.angle)
    }

    /// Position of `point` along the freeform's (rotated) horizontal axis.
    pub fn axis_position(&self, canvas: &Canvas, point: Point) -> f32 {
        let full = self.canvas_rect(canvas);
        let unrotated = point.rotated_about(full.center(), -self.angle);
        unrotated.x - full.x
    }
}

/// A region of effect: an explicit ordered key list or a freeform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KeySequence {
    Keys(Vec<DeviceKey>),
    FreeForm(FreeForm),
}

impl KeySequence {
    pub fn keys(keys: impl IntoIterator<Item = DeviceKey>) -> Self {
        KeySequence::Keys(keys.into_iter().collect())
    }

    pub fn freeform(freeform: FreeForm) -> Self {
        KeySequence::FreeForm(freeform)
    }

    pub fn is_freeform(&self) -> bool {
        matches!(self, KeySequence::FreeForm(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            KeySequence::Keys(keys) => keys.is_empty(),
            KeySequence::FreeForm(_) => false,
        }
    }
}

impl Default for KeySequence {
    fn default() -> Self {
        KeySequence::Keys(Vec::new())
    }
}

impl From<Vec<DeviceKey>> for KeySequence {
    fn from(keys: Vec<DeviceKey>) -> Self {
        KeySequence::Keys(keys)
    }
}

impl From<FreeForm> for KeySequence {
    fn from(freeform: FreeForm) -> Self {
        KeySequence::FreeForm(freeform)
    }
}
