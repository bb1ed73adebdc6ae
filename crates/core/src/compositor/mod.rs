//! Per-tick compositing of every contributed layer into the device color
//! map.

use std::sync::Arc;

use crate::canvas::{Canvas, DeviceKey, PERIPHERAL_KEYS};
use crate::color::Color;
use crate::config::BrightnessSnapshot;
use crate::layer::{Bitmap, EffectLayer, RasterDemand, RasterGuard};
use crate::Result;

/// Receives the composited colors; implemented by the device layer.
pub trait DeviceDispatcher: Send {
    fn initialize_devices(&mut self) -> Result<()>;
    fn shutdown_devices(&mut self) -> Result<()>;
    fn update_devices(&mut self, colors: &DeviceColorMap) -> Result<()>;
}

/// Consumer of the composited raster (live preview, image export).
pub trait PreviewSink: Send {
    fn on_frame(&mut self, bitmap: &Bitmap);
}

/// Layers contributed by the active events for one tick, in paint order.
#[derive(Debug, Default)]
pub struct Frame {
    base: Vec<EffectLayer>,
    overlay: Vec<EffectLayer>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_layer(&mut self, layer: EffectLayer) {
        self.base.push(layer);
    }

    pub fn add_layers(&mut self, layers: impl IntoIterator<Item = EffectLayer>) {
        self.base.extend(layers);
    }

    pub fn add_overlay_layer(&mut self, layer: EffectLayer) {
        self.overlay.push(layer);
    }

    pub fn add_overlay_layers(&mut self, layers: impl IntoIterator<Item = EffectLayer>) {
        self.overlay.extend(layers);
    }

    /// Appends everything from `other`, keeping base and overlay apart.
    pub fn append(&mut self, other: Frame) {
        self.base.extend(other.base);
        self.overlay.extend(other.overlay);
    }

    pub fn base_layers(&self) -> &[EffectLayer] {
        &self.base
    }

    pub fn overlay_layers(&self) -> &[EffectLayer] {
        &self.overlay
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.overlay.is_empty()
    }

    /// Base layers first, then overlays.
    pub fn layers(&self) -> impl Iterator<Item = &EffectLayer> {
        self.base.iter().chain(self.overlay.iter())
    }
}

/// Final key colors for one tick; only keys present on the canvas carry a
/// color.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceColorMap {
    colors: Vec<Option<Color>>,
}

impl Default for DeviceColorMap {
    fn default() -> Self {
        Self {
            colors: vec![None; DeviceKey::COUNT],
        }
    }
}

impl DeviceColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: DeviceKey) -> Option<Color> {
        self.colors[key.index()]
    }

    pub fn set(&mut self, key: DeviceKey, color: Color) {
        self.colors[key.index()] = Some(color);
    }

    pub fn clear(&mut self) {
        self.colors.iter_mut().for_each(|color| *color = None);
    }

    pub fn len(&self) -> usize {
        self.colors.iter().filter(|color| color.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeviceKey, Color)> + '_ {
        DeviceKey::ALL
            .iter()
            .zip(&self.colors)
            .filter_map(|(key, color)| color.map(|color| (*key, color)))
    }
}

/// Handle returned by [`FrameCompositor::subscribe_preview`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewId(u64);

struct PreviewSubscription {
    id: PreviewId,
    sink: Box<dyn PreviewSink>,
    _guard: RasterGuard,
}

pub struct FrameCompositor {
    background: EffectLayer,
    device_colors: DeviceColorMap,
    raster_demand: RasterDemand,
    previews: Vec<PreviewSubscription>,
    next_preview: u64,
}

impl FrameCompositor {
    pub fn new(canvas: Arc<Canvas>) -> Self {
        let raster_demand = RasterDemand::new();
        Self {
            background: EffectLayer::for_demand("background", canvas, &raster_demand),
            device_colors: DeviceColorMap::new(),
            raster_demand,
            previews: Vec::new(),
            next_preview: 0,
        }
    }

    /// Demand counter layers should consult when choosing their backing.
    pub fn raster_demand(&self) -> &RasterDemand {
        &self.raster_demand
    }

    /// Colors produced by the most recent push.
    pub fn device_colors(&self) -> &DeviceColorMap {
        &self.device_colors
    }

    pub fn subscribe_preview(&mut self, sink: Box<dyn PreviewSink>) -> PreviewId {
        let id = PreviewId(self.next_preview);
        self.next_preview += 1;
        self.previews.push(PreviewSubscription {
            id,
            sink,
            _guard: self.raster_demand.acquire(),
        });
        tracing::debug!(previews = self.previews.len(), "preview subscribed");
        id
    }

    pub fn unsubscribe_preview(&mut self, id: PreviewId) -> bool {
        let before = self.previews.len();
        self.previews.retain(|subscription| subscription.id != id);
        before != self.previews.len()
    }

    /// Composites `frame` onto an opaque black background, applies the
    /// brightness passes and hands the result to `dispatcher`.
    pub fn push_frame(
        &mut self,
        canvas: &Arc<Canvas>,
        frame: Frame,
        brightness: BrightnessSnapshot,
        dispatcher: &mut dyn DeviceDispatcher,
    ) -> &DeviceColorMap {
        self.background
            .set_canvas(Arc::clone(canvas))
            .sync_backing(&self.raster_demand)
            .fill(Color::BLACK);

        for layer in frame.layers() {
            self.background.add(layer);
        }
        drop(frame);

        let keyboard = (brightness.keyboard * brightness.global).clamp(0.0, 1.0);
        if keyboard < 1.0 {
            self.background
                .fill_over(Color::BLACK.with_alpha(darkening_alpha(keyboard)));
        }

        self.device_colors.clear();
        for key in canvas.keys() {
            self.device_colors.set(key, self.background.get(key));
        }

        let peripheral = brightness.peripheral.clamp(0.0, 1.0);
        if peripheral < 1.0 {
            let shade = Color::BLACK.with_alpha(darkening_alpha(peripheral));
            for key in PERIPHERAL_KEYS {
                if let Some(color) = self.device_colors.get(*key) {
                    self.device_colors.set(*key, shade.over(color));
                }
            }
        }

        if let Err(err) = dispatcher.update_devices(&self.device_colors) {
            tracing::warn!(error = %err, "device update failed");
        }

        if !self.previews.is_empty() {
            if let Some(bitmap) = self.background.to_bitmap() {
                for subscription in &mut self.previews {
                    subscription.sink.on_frame(&bitmap);
                }
            }
        }

        &self.device_colors
    }
}

impl std::fmt::Debug for FrameCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameCompositor")
            .field("background", &self.background.backing())
            .field("previews", &self.previews.len())
            .finish()
    }
}

fn darkening_alpha(brightness: f32) -> u8 {
    (255.0 * (1.0 - brightness)).round().clamp(0.0, 255.0) as u8
}
