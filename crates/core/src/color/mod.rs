use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Unpremultiplied 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    /// Multiplies the alpha channel by `factor` (clamped to `[0, 1]`).
    pub fn scale_alpha(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        self.with_alpha(to_channel(self.a as f32 * factor))
    }

    /// Linear interpolation of all four channels; `t = 0` is `from`, `t = 1`
    /// is `to`.
    pub fn blend(from: Color, to: Color, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) } as f32;
        let lerp = |a: u8, b: u8| to_channel(a as f32 + (b as f32 - a as f32) * t);
        Color::rgba(
            lerp(from.r, to.r),
            lerp(from.g, to.g),
            lerp(from.b, to.b),
            lerp(from.a, to.a),
        )
    }

    /// Source-over compositing of `self` on top of `dst`.
    pub fn over(self, dst: Color) -> Color {
        if self.a == 0 {
            return dst;
        }
        if self.a == 255 || dst.a == 0 {
            return self;
        }

        let sa = self.a as f32 / 255.0;
        let da = dst.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        let channel =
            |s: u8, d: u8| to_channel((s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a);

        Color::rgba(
            channel(self.r, dst.r),
            channel(self.g, dst.g),
            channel(self.b, dst.b),
            to_channel(out_a * 255.0),
        )
    }
}

fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// A color stop of a gradient; `offset` lies in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

/// Gradient along the line from `start` to `end`, both relative to the
/// painted region's bounds (`0,0` top-left, `1,1` bottom-right).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearGradient {
    pub start: Point,
    pub end: Point,
    pub stops: Vec<ColorStop>,
}

impl LinearGradient {
    /// Left-to-right gradient through evenly spaced `colors`.
    pub fn horizontal(colors: &[Color]) -> Self {
        let last = colors.len().saturating_sub(1).max(1) as f32;
        Self {
            start: Point::new(0.0, 0.5),
            end: Point::new(1.0, 0.5),
            stops: colors
                .iter()
                .enumerate()
                .map(|(i, color)| ColorStop {
                    offset: i as f32 / last,
                    color: *color,
                })
                .collect(),
        }
    }

    /// Color at gradient position `t` (clamped to the first/last stop).
    pub fn color_at_offset(&self, t: f32) -> Color {
        let Some(first) = self.stops.first() else {
            return Color::TRANSPARENT;
        };
        if t <= first.offset {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                let local = if span <= f32::EPSILON {
                    1.0
                } else {
                    (t - a.offset) / span
                };
                return Color::blend(a.color, b.color, local as f64);
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}

/// What a region gets painted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Brush {
    Solid(Color),
    Linear(LinearGradient),
}

impl Brush {
    /// Color of the brush at `point`, where `bounds` is the painted region.
    pub fn color_at(&self, point: Point, bounds: &Rect) -> Color {
        match self {
            Brush::Solid(color) => *color,
            Brush::Linear(gradient) => {
                let start = Point::new(
                    bounds.x + gradient.start.x * bounds.width,
                    bounds.y + gradient.start.y * bounds.height,
                );
                let end = Point::new(
                    bounds.x + gradient.end.x * bounds.width,
                    bounds.y + gradient.end.y * bounds.height,
                );
                let (dx, dy) = (end.x - start.x, end.y - start.y);
                let length_sq = dx * dx + dy * dy;
                let t = if length_sq <= f32::EPSILON {
                    0.0
                } else {
                    ((point.x - start.x) * dx + (point.y - start.y) * dy) / length_sq
                };
                gradient.color_at_offset(t)
            }
        }
    }

    pub fn is_solid(&self) -> bool {
        matches!(self, Brush::Solid(_))
    }
}

impl From<Color> for Brush {
    fn from(color: Color) -> Self {
        Brush::Solid(color)
    }
}
