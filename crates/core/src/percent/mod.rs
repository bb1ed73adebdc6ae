//! Progress-bar style rendering of a `(value, total)` pair over a key
//! sequence.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, DeviceKey};
use crate::color::Color;
use crate::geometry::Rect;
use crate::layer::{Backing, EffectLayer};
use crate::sequence::{FreeForm, KeySequence};
use crate::zone::{Coverage, ZoneCache};

/// Absorbs float noise in `progress * key_count` before flooring.
const INDEX_EPSILON: f64 = 1e-9;

/// How far inside a key its corners are tested against the progress
/// polygon, in pixels. Larger than the polygon's edge tolerance.
const CORNER_INSET: f32 = 1e-2;

/// How progress is distributed over the keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PercentEffectType {
    /// Every key shows the background blended towards the foreground.
    AllAtOnce,
    /// Keys fill up one by one with a hard cutoff.
    #[default]
    Progressive,
    /// Like `Progressive`, the boundary key blends by its fractional share.
    ProgressiveGradual,
    /// Only the key at the progress position is lit.
    HighestKey,
    /// The key at the progress position blends by the overall progress.
    HighestKeyBlend,
}

/// Pulsing once progress passes `threshold` (below it by default, above it
/// when `reversed`). A zero threshold disables flashing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashSettings {
    pub threshold: f64,
    pub reversed: bool,
    pub blink_background: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentEffect {
    pub foreground: Color,
    pub background: Color,
    pub value: f64,
    pub total: f64,
    pub kind: PercentEffectType,
    pub flash: FlashSettings,
}

impl Default for PercentEffect {
    fn default() -> Self {
        Self {
            foreground: Color::RED,
            background: Color::TRANSPARENT,
            value: 0.0,
            total: 1.0,
            kind: PercentEffectType::default(),
            flash: FlashSettings::default(),
        }
    }
}

impl PercentEffect {
    pub fn new(foreground: Color, background: Color, value: f64, total: f64) -> Self {
        Self {
            foreground,
            background,
            value,
            total,
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: PercentEffectType) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_flash(mut self, flash: FlashSettings) -> Self {
        self.flash = flash;
        self
    }

    /// `value / total` clamped to `[0, 1]`; a zero total counts as full for
    /// any positive value.
    pub fn progress(&self) -> f64 {
        let ratio = self.value / self.total;
        if ratio.is_nan() {
            0.0
        } else {
            ratio.clamp(0.0, 1.0)
        }
    }

    /// Foreground and background after applying the flash pulse at `time_ms`.
    pub fn flashed_colors(&self, time_ms: u64) -> (Color, Color) {
        let (mut foreground, mut background) = (self.foreground, self.background);
        let progress = self.progress();
        let flash = &self.flash;
        let crossed = if flash.reversed {
            progress >= flash.threshold
        } else {
            progress <= flash.threshold
        };

        if flash.threshold > 0.0 && crossed {
            let pulse = ((time_ms as f64 / 1000.0) * PI).sin().clamp(0.0, 1.0);
            if flash.blink_background {
                background = Color::blend(background, Color::TRANSPARENT, pulse);
            } else {
                foreground = Color::blend(background, foreground, pulse);
            }
        }
        (foreground, background)
    }
}

/// Colors for an ordered key list, one per key.
pub fn key_colors(
    count: usize,
    foreground: Color,
    background: Color,
    progress: f64,
    kind: PercentEffectType,
) -> Vec<Color> {
    if count == 0 {
        return Vec::new();
    }

    let filled = progress * count as f64;
    let full_keys = (filled + INDEX_EPSILON).floor() as usize;

    match kind {
        PercentEffectType::AllAtOnce => {
            vec![Color::blend(background, foreground, progress); count]
        }
        PercentEffectType::Progressive => (0..count)
            .map(|i| if i < full_keys { foreground } else { background })
            .collect(),
        PercentEffectType::ProgressiveGradual => (0..count)
            .map(|i| match i.cmp(&full_keys) {
                std::cmp::Ordering::Less => foreground,
                std::cmp::Ordering::Equal => {
                    Color::blend(background, foreground, (filled - i as f64).max(0.0))
                }
                std::cmp::Ordering::Greater => background,
            })
            .collect(),
        PercentEffectType::HighestKey | PercentEffectType::HighestKeyBlend => {
            let active = full_keys.min(count - 1);
            let lit = if kind == PercentEffectType::HighestKey {
                foreground
            } else {
                Color::blend(background, foreground, progress)
            };
            (0..count)
                .map(|i| if i == active { lit } else { background })
                .collect()
        }
    }
}

/// Renders percent effects into layers, keeping the sequence resolution
/// cached between ticks.
#[derive(Debug, Default)]
pub struct PercentRenderer {
    cache: ZoneCache,
}

impl PercentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    pub fn render(
        &mut self,
        layer: &mut EffectLayer,
        sequence: &KeySequence,
        effect: &PercentEffect,
        time_ms: u64,
    ) {
        let Some(canvas) = layer.canvas().cloned() else {
            return;
        };
        let (foreground, background) = effect.flashed_colors(time_ms);
        let progress = effect.progress();

        match sequence {
            KeySequence::Keys(keys) => {
                let colors = key_colors(keys.len(), foreground, background, progress, effect.kind);
                for (key, color) in keys.iter().zip(colors) {
                    layer.set_key(*key, color);
                }
            }
            KeySequence::FreeForm(freeform) => {
                let coverage = self.cache.coverage(sequence, &canvas);
                let keys = freeform_fill(&canvas, freeform, &coverage, progress);
                let colors = freeform_colors(&keys, foreground, background, progress, effect.kind);
                let raster = layer.backing() == Some(Backing::Raster);
                let polygon = freeform.canvas_polygon(&canvas);
                for (key, color) in keys.iter().zip(colors) {
                    if raster {
                        layer.fill_key_within(key.key, &polygon, color);
                    } else {
                        layer.set_key(key.key, color.scale_alpha(key.coverage));
                    }
                }
            }
        }
    }
}

/// A key touched by a freeform percent region.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FilledKey {
    key: DeviceKey,
    /// Share of the key's corners inside the region.
    coverage: f32,
    /// Share of the covered corners inside the progress polygon.
    fraction: f64,
    /// Position of the key centre along the region's axis.
    axis: f32,
}

/// Covered keys ordered along the freeform axis with their filled share.
///
/// Filled corners are tested slightly inside the key so a corner lying on
/// the fill line only counts for the key behind it: a key whose far edge
/// touches the line is full and its neighbour is still empty.
fn freeform_fill(
    canvas: &Canvas,
    freeform: &FreeForm,
    coverage: &[Coverage],
    progress: f64,
) -> Vec<FilledKey> {
    let filled_polygon = freeform.progress_polygon(canvas, progress as f32);

    let mut keys: Vec<FilledKey> = coverage
        .iter()
        .map(|c| {
            let rect = canvas.rectangle(c.key);
            let fraction = if progress <= 0.0 {
                0.0
            } else if progress >= 1.0 {
                1.0
            } else {
                let inner = Rect::new(
                    rect.x + CORNER_INSET,
                    rect.y + CORNER_INSET,
                    rect.width - 2.0 * CORNER_INSET,
                    rect.height - 2.0 * CORNER_INSET,
                );
                let filled = filled_polygon.contained_corners(&inner).min(c.corners as usize);
                filled as f64 / c.corners as f64
            };
            FilledKey {
                key: c.key,
                coverage: c.ratio(),
                fraction,
                axis: freeform.axis_position(canvas, rect.center()),
            }
        })
        .collect();
    keys.sort_by(|a, b| a.axis.total_cmp(&b.axis));
    keys
}

/// Policy colors for freeform keys, before coverage fading. The leading key
/// is the first one not yet full, which matches `floor(progress * n)` on an
/// explicit list.
fn freeform_colors(
    keys: &[FilledKey],
    foreground: Color,
    background: Color,
    progress: f64,
    kind: PercentEffectType,
) -> Vec<Color> {
    let leading = keys
        .iter()
        .position(|key| key.fraction < 1.0)
        .unwrap_or(keys.len().saturating_sub(1));

    keys.iter()
        .enumerate()
        .map(|(index, key)| match kind {
            PercentEffectType::AllAtOnce => Color::blend(background, foreground, progress),
            PercentEffectType::Progressive if key.fraction >= 1.0 => foreground,
            PercentEffectType::Progressive => background,
            PercentEffectType::ProgressiveGradual => {
                Color::blend(background, foreground, key.fraction)
            }
            PercentEffectType::HighestKey if index == leading => foreground,
            PercentEffectType::HighestKeyBlend if index == leading => {
                Color::blend(background, foreground, progress)
            }
            PercentEffectType::HighestKey | PercentEffectType::HighestKeyBlend => background,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    const FG: Color = Color::GREEN;
    const BG: Color = Color::RED;

    fn row_keys() -> Vec<DeviceKey> {
        vec![DeviceKey::A, DeviceKey::S, DeviceKey::D, DeviceKey::F]
    }

    fn row_canvas() -> Arc<Canvas> {
        let mut builder = Canvas::builder(40, 10);
        for (i, key) in row_keys().into_iter().enumerate() {
            builder = builder.key(key, Rect::new(i as f32 * 10.0, 0.0, 10.0, 10.0));
        }
        Arc::new(builder.build())
    }

    fn render(sequence: &KeySequence, effect: &PercentEffect) -> Vec<Color> {
        let mut layer = EffectLayer::new("percent", row_canvas());
        PercentRenderer::new().render(&mut layer, sequence, effect, 0);
        row_keys().into_iter().map(|key| layer.get(key)).collect()
    }

    #[test]
    fn half_progress_lights_first_half() {
        let effect = PercentEffect::new(FG, BG, 2.0, 4.0);
        let colors = render(&KeySequence::keys(row_keys()), &effect);
        assert_eq!(colors, vec![FG, FG, BG, BG]);
    }

    #[test]
    fn empty_and_full_progress_are_uniform() {
        for kind in [PercentEffectType::Progressive, PercentEffectType::ProgressiveGradual] {
            assert_eq!(key_colors(4, FG, BG, 0.0, kind), vec![BG; 4]);
            assert_eq!(key_colors(4, FG, BG, 1.0, kind), vec![FG; 4]);
        }
    }

    #[test]
    fn progressive_count_is_floor_of_progress() {
        for step in 0..=20 {
            let progress = step as f64 / 20.0;
            for count in [1usize, 3, 7, 10] {
                let colors = key_colors(count, FG, BG, progress, PercentEffectType::Progressive);
                let lit = colors.iter().filter(|c| **c == FG).count();
                assert_eq!(lit, (progress * count as f64 + INDEX_EPSILON).floor() as usize);
            }
        }
    }

    #[test]
    fn gradual_blends_the_boundary_key() {
        let colors = key_colors(4, Color::WHITE, Color::BLACK, 0.375, PercentEffectType::ProgressiveGradual);
        assert_eq!(colors[0], Color::WHITE);
        assert_eq!(colors[1], Color::rgb(128, 128, 128));
        assert_eq!(colors[2], Color::BLACK);
    }

    #[test]
    fn highest_key_lights_a_single_key() {
        let colors = key_colors(4, FG, BG, 0.6, PercentEffectType::HighestKey);
        assert_eq!(colors, vec![BG, BG, FG, BG]);
        let full = key_colors(4, FG, BG, 1.0, PercentEffectType::HighestKey);
        assert_eq!(full, vec![BG, BG, BG, FG]);

        let blended = key_colors(2, Color::WHITE, Color::BLACK, 0.5, PercentEffectType::HighestKeyBlend);
        assert_eq!(blended[1], Color::rgb(128, 128, 128));
        assert_eq!(blended[0], Color::BLACK);
    }

    #[test]
    fn all_at_once_blends_every_key() {
        let colors = key_colors(3, Color::WHITE, Color::BLACK, 0.5, PercentEffectType::AllAtOnce);
        assert!(colors.iter().all(|c| *c == Color::rgb(128, 128, 128)));
    }

    #[test]
    fn progress_is_clamped_and_safe_for_zero_totals() {
        assert_eq!(PercentEffect::new(FG, BG, 8.0, 4.0).progress(), 1.0);
        assert_eq!(PercentEffect::new(FG, BG, -1.0, 4.0).progress(), 0.0);
        assert_eq!(PercentEffect::new(FG, BG, 1.0, 0.0).progress(), 1.0);
        assert_eq!(PercentEffect::new(FG, BG, 0.0, 0.0).progress(), 0.0);
    }

    #[test]
    fn flash_pulses_with_wall_time() {
        let flash = FlashSettings {
            threshold: 0.25,
            ..FlashSettings::default()
        };
        let effect = PercentEffect::new(Color::WHITE, Color::BLACK, 0.1, 1.0).with_flash(flash);
        assert_eq!(effect.flashed_colors(0).0, Color::BLACK);
        assert_eq!(effect.flashed_colors(500).0, Color::WHITE);
        assert_eq!(effect.flashed_colors(1500).0, Color::BLACK);

        let above = PercentEffect::new(Color::WHITE, Color::BLACK, 0.5, 1.0).with_flash(flash);
        assert_eq!(above.flashed_colors(0).0, Color::WHITE);

        let blink = PercentEffect::new(Color::WHITE, Color::BLACK, 0.5, 1.0).with_flash(FlashSettings {
            threshold: 0.25,
            reversed: true,
            blink_background: true,
        });
        let (foreground, background) = blink.flashed_colors(500);
        assert_eq!(foreground, Color::WHITE);
        assert_eq!(background, Color::TRANSPARENT);
    }

    #[test]
    fn freeform_progressive_fills_along_the_axis() {
        let sequence = KeySequence::freeform(FreeForm::new(20.0, 5.0, 40.0, 10.0, 0.0));
        let effect = PercentEffect::new(FG, BG, 0.5, 1.0);
        assert_eq!(render(&sequence, &effect), vec![FG, FG, BG, BG]);

        let empty = PercentEffect::new(FG, BG, 0.0, 1.0);
        assert_eq!(render(&sequence, &empty), vec![BG; 4]);
        let full = PercentEffect::new(FG, BG, 1.0, 1.0);
        assert_eq!(render(&sequence, &full), vec![FG; 4]);
    }

    #[test]
    fn freeform_highest_key_follows_the_leading_edge() {
        let sequence = KeySequence::freeform(FreeForm::new(20.0, 5.0, 40.0, 10.0, 0.0));
        let effect = PercentEffect::new(FG, BG, 0.6, 1.0).with_kind(PercentEffectType::HighestKey);
        assert_eq!(render(&sequence, &effect), vec![BG, BG, FG, BG]);
    }

    #[test]
    fn freeform_partial_keys_are_faded_by_coverage() {
        // Covers A and S fully and half of D.
        let sequence = KeySequence::freeform(FreeForm::new(12.5, 5.0, 25.0, 10.0, 0.0));
        let effect = PercentEffect::new(FG, BG, 1.0, 1.0).with_kind(PercentEffectType::AllAtOnce);
        let colors = render(&sequence, &effect);
        assert_eq!(colors[0], FG);
        assert_eq!(colors[2], FG.with_alpha(128));
        assert_eq!(colors[3], Color::TRANSPARENT);
    }

    const KINDS: [PercentEffectType; 5] = [
        PercentEffectType::AllAtOnce,
        PercentEffectType::Progressive,
        PercentEffectType::ProgressiveGradual,
        PercentEffectType::HighestKey,
        PercentEffectType::HighestKeyBlend,
    ];

    fn render_on(
        canvas: Arc<Canvas>,
        backing: Backing,
        sequence: &KeySequence,
        effect: &PercentEffect,
    ) -> Vec<Color> {
        let mut layer = EffectLayer::with_backing("percent", canvas, backing);
        PercentRenderer::new().render(&mut layer, sequence, effect, 0);
        row_keys().into_iter().map(|key| layer.get(key)).collect()
    }

    #[test]
    fn freeform_boundary_key_stays_empty_on_the_fill_line() {
        let sequence = KeySequence::freeform(FreeForm::new(20.0, 5.0, 40.0, 10.0, 0.0));
        let effect = PercentEffect::new(FG, BG, 0.5, 1.0).with_kind(PercentEffectType::ProgressiveGradual);
        assert_eq!(render(&sequence, &effect), vec![FG, FG, BG, BG]);
        assert_eq!(render(&KeySequence::keys(row_keys()), &effect), vec![FG, FG, BG, BG]);
    }

    #[test]
    fn freeform_matches_explicit_keys_for_every_policy() {
        let freeform = KeySequence::freeform(FreeForm::new(20.0, 5.0, 40.0, 10.0, 0.0));
        let explicit = KeySequence::keys(row_keys());
        for kind in KINDS {
            for progress in [0.0, 0.25, 0.375, 0.5, 0.75, 1.0] {
                let effect = PercentEffect::new(FG, BG, progress, 1.0).with_kind(kind);
                assert_eq!(
                    render(&freeform, &effect),
                    render(&explicit, &effect),
                    "{kind:?} at {progress}"
                );
            }
        }
    }

    #[test]
    fn raster_backing_reads_like_the_key_backing() {
        let sequences = [
            KeySequence::freeform(FreeForm::new(20.0, 5.0, 40.0, 10.0, 0.0)),
            // A and S fully, half of D.
            KeySequence::freeform(FreeForm::new(12.5, 5.0, 25.0, 10.0, 0.0)),
        ];
        for sequence in &sequences {
            for kind in KINDS {
                for progress in [0.0, 0.375, 0.5, 0.6, 1.0] {
                    let effect = PercentEffect::new(FG, BG, progress, 1.0).with_kind(kind);
                    assert_eq!(
                        render_on(row_canvas(), Backing::Raster, sequence, &effect),
                        render_on(row_canvas(), Backing::Keys, sequence, &effect),
                        "{kind:?} at {progress} over {sequence:?}"
                    );
                }
            }
        }

        let highest = PercentEffect::new(FG, BG, 0.6, 1.0).with_kind(PercentEffectType::HighestKey);
        let sequence = &sequences[0];
        assert_eq!(render_on(row_canvas(), Backing::Raster, sequence, &highest), vec![BG, BG, FG, BG]);
    }

    /// The row's keys stacked top to bottom.
    fn column_canvas() -> Arc<Canvas> {
        let mut builder = Canvas::builder(10, 40);
        for (i, key) in row_keys().into_iter().enumerate() {
            builder = builder.key(key, Rect::new(0.0, i as f32 * 10.0, 10.0, 10.0));
        }
        Arc::new(builder.build())
    }

    #[test]
    fn rotated_freeform_fills_along_its_own_axis() {
        // 40 wide along its axis, turned a quarter clockwise over the column.
        let sequence = KeySequence::freeform(FreeForm::new(5.0, 20.0, 40.0, 10.0, 90.0));
        for backing in [Backing::Keys, Backing::Raster] {
            let half = PercentEffect::new(FG, BG, 0.5, 1.0);
            assert_eq!(
                render_on(column_canvas(), backing, &sequence, &half),
                vec![FG, FG, BG, BG],
                "{backing:?}"
            );

            let quarter = PercentEffect::new(FG, BG, 0.25, 1.0).with_kind(PercentEffectType::HighestKey);
            assert_eq!(
                render_on(column_canvas(), backing, &sequence, &quarter),
                vec![BG, FG, BG, BG],
                "{backing:?}"
            );

            let gradual = PercentEffect::new(Color::WHITE, Color::BLACK, 0.375, 1.0)
                .with_kind(PercentEffectType::ProgressiveGradual);
            let colors = render_on(column_canvas(), backing, &sequence, &gradual);
            assert_eq!(colors[0], Color::WHITE, "{backing:?}");
            assert_eq!(colors[1], Color::blend(Color::BLACK, Color::WHITE, 0.5), "{backing:?}");
            assert_eq!(colors[3], Color::BLACK, "{backing:?}");
        }
    }
}
