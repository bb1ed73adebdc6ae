use std::f64::consts::TAU;

use crate::color::Color;
use crate::compositor::Frame;
use crate::config::{IdleConfig, IdleEffectKind};
use crate::handlers::RenderContext;

/// Whether the user has been idle long enough for the idle effect.
pub fn is_idle(config: &IdleConfig, now_ms: u64, last_input_ms: u64) -> bool {
    if config.kind == IdleEffectKind::None {
        return false;
    }
    let threshold_ms = config.delay_minutes as u64 * 60_000;
    now_ms.saturating_sub(last_input_ms) >= threshold_ms
}

/// Adds the idle overlay for `config` to `frame`.
pub fn render_idle(config: &IdleConfig, ctx: &RenderContext, frame: &mut Frame) {
    let amount = config.amount.clamp(0.0, 1.0);
    let color = match config.kind {
        IdleEffectKind::None => return,
        IdleEffectKind::Dim => Color::BLACK.scale_alpha(amount),
        IdleEffectKind::ColorBreathing => {
            let phase = ctx.time_ms as f64 / 1000.0 * config.speed as f64 * TAU;
            let pulse = (phase.sin() + 1.0) * 0.5;
            config.color.scale_alpha(pulse as f32 * amount)
        }
    };

    let mut layer = ctx.new_layer("idle");
    layer.fill(color);
    frame.add_overlay_layer(layer);
}
