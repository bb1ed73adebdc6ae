//! Drawable, composable color surfaces over the canvas.
//!
//! A layer is backed either by a dense per-key color array or by a raster
//! [`Bitmap`]; which one is chosen from the shared [`RasterDemand`] count.
//! The null layer ignores every operation and reads as transparent.

mod raster;

use std::cell::OnceCell;
use std::sync::Arc;

use crate::canvas::{Canvas, DeviceKey};
use crate::color::{Brush, Color};
use crate::geometry::{Polygon, Rect};
use crate::sequence::KeySequence;
use crate::zone::{KeyMask, ZoneCache};

pub use raster::{Bitmap, RasterDemand, RasterGuard};
use raster::KeyColorReader;

/// Storage strategy of a non-null layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backing {
    Keys,
    Raster,
}

impl Backing {
    /// Backing appropriate for the current raster demand.
    pub fn for_demand(demand: &RasterDemand) -> Self {
        if demand.is_needed() {
            Backing::Raster
        } else {
            Backing::Keys
        }
    }
}

#[derive(Debug)]
enum Surface {
    Null,
    Keys {
        canvas: Arc<Canvas>,
        colors: Vec<Color>,
    },
    Raster {
        canvas: Arc<Canvas>,
        bitmap: Bitmap,
        reader: OnceCell<KeyColorReader>,
    },
}

#[derive(Debug)]
pub struct EffectLayer {
    name: String,
    surface: Surface,
    opacity: f32,
    exclusion: Option<KeyMask>,
    inclusion: Option<KeyMask>,
    region_cache: ZoneCache,
}

impl EffectLayer {
    /// Transparent layer with the per-key backing.
    pub fn new(name: impl Into<String>, canvas: Arc<Canvas>) -> Self {
        Self::with_backing(name, canvas, Backing::Keys)
    }

    pub fn with_backing(name: impl Into<String>, canvas: Arc<Canvas>, backing: Backing) -> Self {
        let surface = match backing {
            Backing::Keys => Surface::Keys {
                canvas,
                colors: vec![Color::TRANSPARENT; DeviceKey::COUNT],
            },
            Backing::Raster => Surface::Raster {
                bitmap: Bitmap::new(canvas.width(), canvas.height()),
                canvas,
                reader: OnceCell::new(),
            },
        };
        Self::from_surface(name.into(), surface)
    }

    /// Transparent layer whose backing follows `demand`.
    pub fn for_demand(name: impl Into<String>, canvas: Arc<Canvas>, demand: &RasterDemand) -> Self {
        Self::with_backing(name, canvas, Backing::for_demand(demand))
    }

    /// Layer that ignores every operation; used for disabled layers.
    pub fn null() -> Self {
        Self::from_surface(String::new(), Surface::Null)
    }

    fn from_surface(name: String, surface: Surface) -> Self {
        Self {
            name,
            surface,
            opacity: 1.0,
            exclusion: None,
            inclusion: None,
            region_cache: ZoneCache::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_null(&self) -> bool {
        matches!(self.surface, Surface::Null)
    }

    pub fn backing(&self) -> Option<Backing> {
        match self.surface {
            Surface::Null => None,
            Surface::Keys { .. } => Some(Backing::Keys),
            Surface::Raster { .. } => Some(Backing::Raster),
        }
    }

    pub fn canvas(&self) -> Option<&Arc<Canvas>> {
        match &self.surface {
            Surface::Null => None,
            Surface::Keys { canvas, .. } | Surface::Raster { canvas, .. } => Some(canvas),
        }
    }

    /// The raster, when this layer is raster backed.
    pub fn bitmap(&self) -> Option<&Bitmap> {
        match &self.surface {
            Surface::Raster { bitmap, .. } => Some(bitmap),
            _ => None,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Alpha multiplier applied when the layer is read.
    pub fn set_opacity(&mut self, opacity: f32) -> &mut Self {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
        self
    }

    /// Replaces the whole surface with `color`.
    pub fn fill(&mut self, color: Color) -> &mut Self {
        match &mut self.surface {
            Surface::Null => {}
            Surface::Keys { colors, .. } => colors.iter_mut().for_each(|c| *c = color),
            Surface::Raster { bitmap, reader, .. } => {
                bitmap.fill(color);
                reader.take();
            }
        }
        self
    }

    /// Composites `color` over the whole surface.
    pub fn fill_over(&mut self, color: Color) -> &mut Self {
        match &mut self.surface {
            Surface::Null => {}
            Surface::Keys { colors, .. } => colors.iter_mut().for_each(|c| *c = color.over(*c)),
            Surface::Raster { bitmap, reader, .. } => {
                bitmap.fill_over(color);
                reader.take();
            }
        }
        self
    }

    /// Paints one key. Keys not on the canvas are ignored.
    pub fn set_key(&mut self, key: DeviceKey, brush: impl Into<Brush>) -> &mut Self {
        let brush = brush.into();
        let Some(rect) = self.present_rect(key) else {
            return self;
        };
        self.paint_key(key, &rect, &brush, &rect);
        self
    }

    /// Paints `keys`; gradients span the union of their rectangles.
    pub fn set_keys(&mut self, keys: &[DeviceKey], brush: impl Into<Brush>) -> &mut Self {
        let brush = brush.into();
        let Some(canvas) = self.canvas().cloned() else {
            return self;
        };
        let bounds = keys
            .iter()
            .fold(Rect::EMPTY, |acc, key| acc.union(&canvas.rectangle(*key)));
        for key in keys {
            let rect = canvas.rectangle(*key);
            if !rect.is_empty() {
                self.paint_key(*key, &rect, &brush, &bounds);
            }
        }
        self
    }

    /// Paints the region described by `sequence`.
    pub fn set_sequence(&mut self, sequence: &KeySequence, brush: impl Into<Brush>) -> &mut Self {
        let mut cache = std::mem::take(&mut self.region_cache);
        self.set_sequence_cached(&mut cache, sequence, brush);
        self.region_cache = cache;
        self
    }

    /// Paints `sequence` resolving it through a cache owned by the caller,
    /// so the resolution survives across ticks.
    pub fn set_sequence_cached(
        &mut self,
        cache: &mut ZoneCache,
        sequence: &KeySequence,
        brush: impl Into<Brush>,
    ) -> &mut Self {
        let brush = brush.into();
        let Some(canvas) = self.canvas().cloned() else {
            return self;
        };

        match sequence {
            KeySequence::Keys(keys) => {
                self.set_keys(keys, brush);
            }
            KeySequence::FreeForm(freeform) => {
                let polygon = freeform.canvas_polygon(&canvas);
                if let Surface::Raster { bitmap, reader, .. } = &mut self.surface {
                    bitmap.fill_polygon(&polygon, &brush);
                    reader.take();
                } else {
                    let bounds = polygon.bounds();
                    let keys = cache.get_keys(sequence, &canvas);
                    for key in keys.iter() {
                        let rect = canvas.rectangle(*key);
                        self.paint_key(*key, &rect, &brush, &bounds);
                    }
                }
            }
        }
        self
    }

    /// Fills an arbitrary canvas-space polygon. On the per-key backing the
    /// keys whose rectangles lie fully inside are painted.
    pub fn fill_polygon(&mut self, polygon: &Polygon, brush: impl Into<Brush>) -> &mut Self {
        let brush = brush.into();
        let Some(canvas) = self.canvas().cloned() else {
            return self;
        };
        if let Surface::Raster { bitmap, reader, .. } = &mut self.surface {
            bitmap.fill_polygon(polygon, &brush);
            reader.take();
            return self;
        }
        let bounds = polygon.bounds();
        for key in canvas.keys() {
            let rect = canvas.rectangle(key);
            if polygon.contained_corners(&rect) == 4 {
                self.paint_key(key, &rect, &brush, &bounds);
            }
        }
        self
    }

    /// Paints the part of `key` that lies inside `polygon`. The per-key
    /// backing stores `color` faded by the share of covered corners.
    pub fn fill_key_within(&mut self, key: DeviceKey, polygon: &Polygon, color: Color) -> &mut Self {
        let Some(rect) = self.present_rect(key) else {
            return self;
        };
        if let Surface::Raster { bitmap, reader, .. } = &mut self.surface {
            bitmap.fill_polygon_clipped(polygon, &rect, color);
            reader.take();
            return self;
        }
        let corners = polygon.contained_corners(&rect);
        if corners > 0 {
            self.set_key(key, color.scale_alpha(corners as f32 / 4.0));
        }
        self
    }

    /// Hides every key covered by `sequence`.
    pub fn exclude(&mut self, sequence: KeySequence) -> &mut Self {
        if let Some(canvas) = self.canvas() {
            self.exclusion = Some(KeyMask::new(sequence, canvas));
        }
        self
    }

    /// Hides the keys of a mask owned by the caller, re-resolving it only
    /// when this layer's canvas differs from the one it was resolved on.
    pub fn exclude_cached(&mut self, mask: &mut KeyMask) -> &mut Self {
        if let Some(canvas) = self.canvas() {
            mask.refresh(canvas);
            self.exclusion = Some(mask.clone());
        }
        self
    }

    /// Hides every key not covered by `sequence`.
    pub fn only_include(&mut self, sequence: KeySequence) -> &mut Self {
        if let Some(canvas) = self.canvas() {
            self.inclusion = Some(KeyMask::new(sequence, canvas));
        }
        self
    }

    pub fn clear_masks(&mut self) -> &mut Self {
        self.exclusion = None;
        self.inclusion = None;
        self
    }

    /// Whether `key` survives the exclusion and inclusion masks.
    pub fn is_visible(&self, key: DeviceKey) -> bool {
        let excluded = self.exclusion.as_ref().is_some_and(|mask| mask.contains(key));
        let included = self.inclusion.as_ref().map_or(true, |mask| mask.contains(key));
        !excluded && included
    }

    /// Color of `key` after masks and opacity. Transparent for keys that are
    /// masked out or not on the canvas.
    pub fn get(&self, key: DeviceKey) -> Color {
        if !self.is_visible(key) {
            return Color::TRANSPARENT;
        }
        let color = self.raw(key);
        if self.opacity == 1.0 {
            color
        } else {
            color.scale_alpha(self.opacity)
        }
    }

    /// Composites `other` over this layer key by key (or pixel by pixel when
    /// both are unmasked rasters). Adding the null layer changes nothing.
    pub fn add(&mut self, other: &EffectLayer) -> &mut Self {
        if other.is_null() || self.is_null() {
            return self;
        }

        let unmasked = other.exclusion.is_none() && other.inclusion.is_none();
        let composited = match (&mut self.surface, other.bitmap()) {
            (Surface::Raster { bitmap, reader, .. }, Some(src))
                if unmasked && src.width() == bitmap.width() && src.height() == bitmap.height() =>
            {
                bitmap.composite(src, other.opacity);
                reader.take();
                true
            }
            _ => false,
        };
        if composited {
            return self;
        }

        let Some(canvas) = self.canvas().cloned() else {
            return self;
        };
        for key in canvas.keys() {
            let src = other.get(key);
            if src.is_transparent() {
                continue;
            }
            match &mut self.surface {
                Surface::Null => {}
                Surface::Keys { colors, .. } => {
                    let dst = &mut colors[key.index()];
                    *dst = if src.is_opaque() { src } else { src.over(*dst) };
                }
                Surface::Raster { bitmap, reader, .. } => {
                    bitmap.fill_rect_over(&canvas.rectangle(key), src);
                    reader.take();
                }
            }
        }
        self
    }

    /// Moves the content to `backing`, keeping name, opacity and masks.
    pub fn switch_backing(&mut self, backing: Backing) -> &mut Self {
        if self.backing() == Some(backing) {
            return self;
        }

        let surface = std::mem::replace(&mut self.surface, Surface::Null);
        self.surface = match surface {
            Surface::Keys { canvas, colors } => {
                let mut bitmap = Bitmap::new(canvas.width(), canvas.height());
                for key in canvas.keys() {
                    let rect = canvas.rectangle(key);
                    bitmap.fill_rect(&rect, &Brush::Solid(colors[key.index()]), &rect);
                }
                Surface::Raster {
                    canvas,
                    bitmap,
                    reader: OnceCell::new(),
                }
            }
            Surface::Raster { canvas, bitmap, .. } => {
                let reader = KeyColorReader::new(&bitmap, &canvas);
                let colors = DeviceKey::ALL.iter().map(|key| reader.get(*key)).collect();
                Surface::Keys { canvas, colors }
            }
            Surface::Null => Surface::Null,
        };
        tracing::trace!(layer = %self.name, ?backing, "switched layer backing");
        self
    }

    /// Switches backing to what `demand` currently asks for.
    pub fn sync_backing(&mut self, demand: &RasterDemand) -> &mut Self {
        self.switch_backing(Backing::for_demand(demand))
    }

    /// Points a persistent layer at a new canvas. Content survives when the
    /// size is unchanged; otherwise the surface is cleared.
    pub fn set_canvas(&mut self, canvas: Arc<Canvas>) -> &mut Self {
        let Some(backing) = self.backing() else {
            return self;
        };
        let same_size = self.canvas().is_some_and(|current| **current == *canvas);

        if same_size {
            match &mut self.surface {
                Surface::Keys { canvas: slot, .. } => *slot = Arc::clone(&canvas),
                Surface::Raster {
                    canvas: slot,
                    reader,
                    ..
                } => {
                    *slot = Arc::clone(&canvas);
                    reader.take();
                }
                Surface::Null => {}
            }
        } else {
            let name = std::mem::take(&mut self.name);
            let fresh = Self::with_backing(name, Arc::clone(&canvas), backing);
            self.name = fresh.name;
            self.surface = fresh.surface;
        }

        for mask in [&mut self.exclusion, &mut self.inclusion].into_iter().flatten() {
            mask.refresh(&canvas);
        }
        self.region_cache.invalidate();
        self
    }

    /// Renders the layer (masks and opacity applied) as a bitmap.
    pub fn to_bitmap(&self) -> Option<Bitmap> {
        let canvas = self.canvas()?;
        let unmasked = self.exclusion.is_none() && self.inclusion.is_none();
        if let (Some(bitmap), true, true) = (self.bitmap(), unmasked, self.opacity == 1.0) {
            return Some(bitmap.clone());
        }

        let mut bitmap = Bitmap::new(canvas.width(), canvas.height());
        for key in canvas.keys() {
            let rect = canvas.rectangle(key);
            bitmap.fill_rect(&rect, &Brush::Solid(self.get(key)), &rect);
        }
        Some(bitmap)
    }

    fn present_rect(&self, key: DeviceKey) -> Option<Rect> {
        let rect = self.canvas()?.rectangle(key);
        (!rect.is_empty()).then_some(rect)
    }

    fn raw(&self, key: DeviceKey) -> Color {
        match &self.surface {
            Surface::Null => Color::TRANSPARENT,
            Surface::Keys { canvas, colors } => {
                if canvas.contains_key(key) {
                    colors[key.index()]
                } else {
                    Color::TRANSPARENT
                }
            }
            Surface::Raster {
                canvas,
                bitmap,
                reader,
            } => {
                if canvas.contains_key(key) {
                    reader
                        .get_or_init(|| KeyColorReader::new(bitmap, canvas))
                        .get(key)
                } else {
                    Color::TRANSPARENT
                }
            }
        }
    }

    fn paint_key(&mut self, key: DeviceKey, rect: &Rect, brush: &Brush, bounds: &Rect) {
        match &mut self.surface {
            Surface::Null => {}
            Surface::Keys { colors, .. } => {
                colors[key.index()] = brush.color_at(rect.center(), bounds);
            }
            Surface::Raster { bitmap, reader, .. } => {
                bitmap.fill_rect(rect, brush, bounds);
                reader.take();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::LinearGradient;
    use crate::sequence::FreeForm;

    fn space_canvas() -> Arc<Canvas> {
        Arc::new(
            Canvas::builder(8, 8)
                .key(DeviceKey::SPACE, Rect::new(0.0, 0.0, 8.0, 8.0))
                .build(),
        )
    }

    fn row_canvas() -> Arc<Canvas> {
        Arc::new(
            Canvas::builder(40, 10)
                .key(DeviceKey::A, Rect::new(0.0, 0.0, 10.0, 10.0))
                .key(DeviceKey::S, Rect::new(10.0, 0.0, 10.0, 10.0))
                .key(DeviceKey::D, Rect::new(20.0, 0.0, 10.0, 10.0))
                .key(DeviceKey::F, Rect::new(30.0, 0.0, 10.0, 10.0))
                .build(),
        )
    }

    #[test]
    fn fill_then_exclude_hides_the_key() {
        for backing in [Backing::Keys, Backing::Raster] {
            let mut layer = EffectLayer::with_backing("test", space_canvas(), backing);
            layer.fill(Color::RED);
            assert_eq!(layer.get(DeviceKey::SPACE), Color::RED);

            layer.exclude(KeySequence::keys([DeviceKey::SPACE]));
            assert_eq!(layer.get(DeviceKey::SPACE), Color::TRANSPARENT);
        }
    }

    #[test]
    fn keys_off_the_canvas_read_transparent() {
        for backing in [Backing::Keys, Backing::Raster] {
            let mut layer = EffectLayer::with_backing("test", space_canvas(), backing);
            layer.fill(Color::RED).set_key(DeviceKey::ESC, Color::BLUE);
            for key in DeviceKey::ALL.iter().filter(|k| **k != DeviceKey::SPACE) {
                assert_eq!(layer.get(*key), Color::TRANSPARENT);
            }
        }
        assert_eq!(EffectLayer::null().get(DeviceKey::SPACE), Color::TRANSPARENT);
    }

    #[test]
    fn inclusion_mask_keeps_only_listed_keys() {
        let mut layer = EffectLayer::new("test", row_canvas());
        layer
            .fill(Color::GREEN)
            .only_include(KeySequence::keys([DeviceKey::A, DeviceKey::S]))
            .exclude(KeySequence::keys([DeviceKey::S]));
        assert_eq!(layer.get(DeviceKey::A), Color::GREEN);
        assert_eq!(layer.get(DeviceKey::S), Color::TRANSPARENT);
        assert_eq!(layer.get(DeviceKey::D), Color::TRANSPARENT);
    }

    #[test]
    fn fill_over_composites_instead_of_replacing() {
        let mut layer = EffectLayer::new("test", space_canvas());
        layer.fill(Color::WHITE).fill_over(Color::BLACK.with_alpha(128));
        let color = layer.get(DeviceKey::SPACE);
        assert_eq!(color.a, 255);
        assert!((color.r as i32 - 127).abs() <= 1);
    }

    #[test]
    fn opacity_scales_alpha_on_read() {
        let mut layer = EffectLayer::new("test", space_canvas());
        layer.fill(Color::RED).set_opacity(0.5);
        assert_eq!(layer.get(DeviceKey::SPACE), Color::RED.with_alpha(128));
        layer.set_opacity(1.0);
        assert_eq!(layer.get(DeviceKey::SPACE), Color::RED);
    }

    #[test]
    fn freeform_set_paints_fully_covered_keys() {
        // Spans x in [0, 30].
        let sequence = KeySequence::freeform(FreeForm::new(15.0, 5.0, 30.0, 10.0, 0.0));
        let mut layer = EffectLayer::new("test", row_canvas());
        layer.set_sequence(&sequence, Color::BLUE);
        assert_eq!(layer.get(DeviceKey::A), Color::BLUE);
        assert_eq!(layer.get(DeviceKey::D), Color::BLUE);
        assert_eq!(layer.get(DeviceKey::F), Color::TRANSPARENT);

        let mut raster = EffectLayer::with_backing("test", row_canvas(), Backing::Raster);
        raster.set_sequence(&sequence, Color::BLUE);
        assert_eq!(raster.get(DeviceKey::A), Color::BLUE);
        assert_eq!(raster.get(DeviceKey::F), Color::TRANSPARENT);
    }

    #[test]
    fn key_share_inside_a_polygon_reads_alike_on_both_backings() {
        // Covers A, S and the left half of D.
        let polygon = Polygon::rotated_rect(Rect::new(0.0, 0.0, 25.0, 10.0), 0.0);
        for backing in [Backing::Keys, Backing::Raster] {
            let mut layer = EffectLayer::with_backing("test", row_canvas(), backing);
            for key in [DeviceKey::A, DeviceKey::D, DeviceKey::F] {
                layer.fill_key_within(key, &polygon, Color::GREEN);
            }
            assert_eq!(layer.get(DeviceKey::A), Color::GREEN, "{backing:?}");
            assert_eq!(layer.get(DeviceKey::D), Color::GREEN.with_alpha(128), "{backing:?}");
            assert_eq!(layer.get(DeviceKey::F), Color::TRANSPARENT, "{backing:?}");
        }
    }

    #[test]
    fn gradient_brush_spans_the_key_set() {
        let gradient = Brush::Linear(LinearGradient::horizontal(&[Color::BLACK, Color::WHITE]));
        let mut layer = EffectLayer::new("test", row_canvas());
        layer.set_keys(&[DeviceKey::A, DeviceKey::S, DeviceKey::D, DeviceKey::F], gradient);
        assert!(layer.get(DeviceKey::A).r < layer.get(DeviceKey::S).r);
        assert!(layer.get(DeviceKey::D).r < layer.get(DeviceKey::F).r);
    }

    #[test]
    fn adding_layers_is_associative_for_hard_alpha() {
        let palette = [Color::TRANSPARENT, Color::RED, Color::GREEN, Color::BLUE];
        let canvas = row_canvas();
        let keys = [DeviceKey::A, DeviceKey::S, DeviceKey::D, DeviceKey::F];
        let layer_with = |offset: usize| {
            let mut layer = EffectLayer::new("test", Arc::clone(&canvas));
            for (i, key) in keys.iter().enumerate() {
                layer.set_key(*key, palette[(i + offset) % palette.len()]);
            }
            layer
        };

        let mut left = layer_with(0);
        left.add(&layer_with(1)).add(&layer_with(2));

        let mut tail = layer_with(1);
        tail.add(&layer_with(2));
        let mut right = layer_with(0);
        right.add(&tail);

        for key in keys {
            assert_eq!(left.get(key), right.get(key));
        }
    }

    #[test]
    fn adding_null_or_transparent_changes_nothing() {
        let mut layer = EffectLayer::new("test", row_canvas());
        layer.fill(Color::RED);
        layer.add(&EffectLayer::null());
        layer.add(&EffectLayer::new("empty", row_canvas()));
        assert_eq!(layer.get(DeviceKey::A), Color::RED);

        let mut null = EffectLayer::null();
        null.fill(Color::RED).add(&layer);
        assert!(null.is_null());
    }

    #[test]
    fn add_respects_source_masks_and_opacity() {
        let mut top = EffectLayer::with_backing("top", row_canvas(), Backing::Raster);
        top.fill(Color::BLUE).exclude(KeySequence::keys([DeviceKey::A]));
        let mut bottom = EffectLayer::with_backing("bottom", row_canvas(), Backing::Raster);
        bottom.fill(Color::RED).add(&top);
        assert_eq!(bottom.get(DeviceKey::A), Color::RED);
        assert_eq!(bottom.get(DeviceKey::S), Color::BLUE);
    }

    #[test]
    fn switching_backing_keeps_content() {
        let mut layer = EffectLayer::new("test", row_canvas());
        layer.set_key(DeviceKey::S, Color::GREEN);
        layer.switch_backing(Backing::Raster);
        assert_eq!(layer.backing(), Some(Backing::Raster));
        assert_eq!(layer.get(DeviceKey::S), Color::GREEN);
        layer.switch_backing(Backing::Keys);
        assert_eq!(layer.get(DeviceKey::S), Color::GREEN);
        assert_eq!(layer.name(), "test");
    }

    #[test]
    fn backing_follows_raster_demand() {
        let demand = RasterDemand::new();
        let mut layer = EffectLayer::for_demand("test", row_canvas(), &demand);
        assert_eq!(layer.backing(), Some(Backing::Keys));

        let guard = demand.acquire();
        layer.sync_backing(&demand);
        assert_eq!(layer.backing(), Some(Backing::Raster));

        drop(guard);
        layer.sync_backing(&demand);
        assert_eq!(layer.backing(), Some(Backing::Keys));
    }

    #[test]
    fn resized_canvas_clears_the_surface() {
        let mut layer = EffectLayer::new("test", row_canvas());
        layer.fill(Color::RED);
        layer.set_canvas(row_canvas());
        assert_eq!(layer.get(DeviceKey::A), Color::RED);
        layer.set_canvas(space_canvas());
        assert_eq!(layer.get(DeviceKey::SPACE), Color::TRANSPARENT);
    }
}
