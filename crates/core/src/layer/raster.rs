use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::canvas::{Canvas, DeviceKey};
use crate::color::{Brush, Color};
use crate::geometry::{Point, Polygon, Rect};

/// Software RGBA raster the size of the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        if x >= self.width || y >= self.height {
            return Color::TRANSPARENT;
        }
        self.pixels[self.offset(x, y)]
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.iter_mut().for_each(|pixel| *pixel = color);
    }

    pub fn fill_over(&mut self, color: Color) {
        if color.is_transparent() {
            return;
        }
        self.pixels
            .iter_mut()
            .for_each(|pixel| *pixel = color.over(*pixel));
    }

    /// Replaces the pixels whose centres fall inside `rect`. Gradient brushes
    /// are laid out over `bounds`.
    pub fn fill_rect(&mut self, rect: &Rect, brush: &Brush, bounds: &Rect) {
        self.paint_rect(rect, brush, bounds, false);
    }

    /// Like [`Bitmap::fill_rect`] but composites over the existing pixels.
    pub fn fill_rect_over(&mut self, rect: &Rect, color: Color) {
        self.paint_rect(rect, &Brush::Solid(color), rect, true);
    }

    /// Replaces the pixels whose centres fall inside `polygon`.
    pub fn fill_polygon(&mut self, polygon: &Polygon, brush: &Brush) {
        let bounds = polygon.bounds();
        if bounds.is_empty() {
            return;
        }
        let (x0, x1) = self.span(bounds.x, bounds.right(), self.width);
        let (y0, y1) = self.span(bounds.y, bounds.bottom(), self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
                if polygon.contains(center) {
                    let offset = self.offset(x, y);
                    self.pixels[offset] = brush.color_at(center, &bounds);
                }
            }
        }
    }

    /// Composites `src` over this bitmap, scaling its alpha by `opacity`.
    pub fn composite(&mut self, src: &Bitmap, opacity: f32) {
        if src.width != self.width || src.height != self.height {
            tracing::warn!(
                src = ?(src.width, src.height),
                dst = ?(self.width, self.height),
                "skipping composite of mismatched bitmaps"
            );
            return;
        }

        for (dst, src) in self.pixels.iter_mut().zip(&src.pixels) {
            let src = if opacity < 1.0 {
                src.scale_alpha(opacity)
            } else {
                *src
            };
            match src.a {
                0 => {}
                255 => *dst = src,
                _ => *dst = src.over(*dst),
            }
        }
    }

    /// Replaces the pixels whose centres fall inside both `clip` and
    /// `polygon`.
    pub fn fill_polygon_clipped(&mut self, polygon: &Polygon, clip: &Rect, color: Color) {
        let (x0, x1) = self.span(clip.x, clip.right(), self.width);
        let (y0, y1) = self.span(clip.y, clip.bottom(), self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                if polygon.contains(Point::new(x as f32 + 0.5, y as f32 + 0.5)) {
                    let offset = self.offset(x, y);
                    self.pixels[offset] = color;
                }
            }
        }
    }

    /// Mean color of the pixels whose centres fall inside `rect`, weighted
    /// by alpha so transparent pixels thin the result without darkening it.
    /// Regions smaller than a pixel sample the pixel under their centre.
    pub fn average(&self, rect: &Rect) -> Color {
        let (x0, x1) = self.span(rect.x, rect.right(), self.width);
        let (y0, y1) = self.span(rect.y, rect.bottom(), self.height);

        let mut sums = [0u64; 3];
        let mut alpha = 0u64;
        let mut count = 0u64;
        for y in y0..y1 {
            for x in x0..x1 {
                let pixel = self.pixels[self.offset(x, y)];
                let a = pixel.a as u64;
                sums[0] += pixel.r as u64 * a;
                sums[1] += pixel.g as u64 * a;
                sums[2] += pixel.b as u64 * a;
                alpha += a;
                count += 1;
            }
        }

        if count == 0 {
            let center = rect.center();
            return self.pixel(center.x.max(0.0) as u32, center.y.max(0.0) as u32);
        }
        if alpha == 0 {
            return Color::TRANSPARENT;
        }

        let channel = |sum: u64| ((sum + alpha / 2) / alpha) as u8;
        Color::rgba(
            channel(sums[0]),
            channel(sums[1]),
            channel(sums[2]),
            ((alpha + count / 2) / count) as u8,
        )
    }

    fn paint_rect(&mut self, rect: &Rect, brush: &Brush, bounds: &Rect, over: bool) {
        let (x0, x1) = self.span(rect.x, rect.right(), self.width);
        let (y0, y1) = self.span(rect.y, rect.bottom(), self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let color = match brush {
                    Brush::Solid(color) => *color,
                    _ => brush.color_at(Point::new(x as f32 + 0.5, y as f32 + 0.5), bounds),
                };
                let offset = self.offset(x, y);
                self.pixels[offset] = if over {
                    color.over(self.pixels[offset])
                } else {
                    color
                };
            }
        }
    }

    /// Pixel index range whose centres lie in `[start, end)`.
    fn span(&self, start: f32, end: f32, limit: u32) -> (u32, u32) {
        let first = (start - 0.5).ceil().clamp(0.0, limit as f32) as u32;
        let last = (end - 0.5).ceil().clamp(0.0, limit as f32) as u32;
        (first, last.max(first))
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Per-key colors sampled from a bitmap. Built on first read and thrown
/// away whenever the bitmap changes.
#[derive(Debug, Clone)]
pub(crate) struct KeyColorReader {
    colors: Vec<Color>,
}

impl KeyColorReader {
    pub(crate) fn new(bitmap: &Bitmap, canvas: &Canvas) -> Self {
        let mut colors = vec![Color::TRANSPARENT; DeviceKey::COUNT];
        for key in canvas.keys() {
            colors[key.index()] = bitmap.average(&canvas.rectangle(key));
        }
        Self { colors }
    }

    pub(crate) fn get(&self, key: DeviceKey) -> Color {
        self.colors[key.index()]
    }
}

/// Reference count of consumers that need layers rendered as rasters
/// (live previews, image export). Layers use the cheap per-key backing
/// while the count is zero.
#[derive(Debug, Clone, Default)]
pub struct RasterDemand {
    count: Arc<AtomicUsize>,
}

impl RasterDemand {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a consumer until the returned guard is dropped.
    pub fn acquire(&self) -> RasterGuard {
        self.count.fetch_add(1, Ordering::AcqRel);
        RasterGuard {
            count: Arc::clone(&self.count),
        }
    }

    pub fn is_needed(&self) -> bool {
        self.count.load(Ordering::Acquire) > 0
    }

    pub fn consumers(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct RasterGuard {
    count: Arc<AtomicUsize>,
}

impl Drop for RasterGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::AcqRel);
    }
}
