use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::Result;

/// Top-level configuration of the lighting engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Target period between two ticks.
    pub update_delay_ms: u64,
    /// How often the active profile is re-resolved.
    pub detection_interval_ms: u64,
    pub brightness: BrightnessConfig,
    pub dimming: DimmingConfig,
    pub idle: IdleConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_delay_ms: 30,
            detection_interval_ms: 1_000,
            brightness: BrightnessConfig::default(),
            dimming: DimmingConfig::default(),
            idle: IdleConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        config.sanitize();
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Brightness values for one tick.
    pub fn brightness_snapshot(&self) -> BrightnessSnapshot {
        BrightnessSnapshot {
            global: self.brightness.global,
            keyboard: self.brightness.keyboard,
            peripheral: self.brightness.peripheral,
        }
    }

    /// Clamps out-of-range values, logging each correction.
    pub fn sanitize(&mut self) {
        let brightness = &mut self.brightness;
        for (name, value) in [
            ("global", &mut brightness.global),
            ("keyboard", &mut brightness.keyboard),
            ("peripheral", &mut brightness.peripheral),
        ] {
            let clamped = if value.is_nan() { 1.0 } else { value.clamp(0.0, 1.0) };
            if clamped != *value {
                tracing::warn!(name, value = *value, clamped, "brightness out of range");
                *value = clamped;
            }
        }

        if self.update_delay_ms == 0 {
            tracing::warn!("update delay of 0 ms raised to 1 ms");
            self.update_delay_ms = 1;
        }

        for minute in [&mut self.dimming.start_minute, &mut self.dimming.end_minute] {
            if *minute >= 24 * 60 {
                tracing::warn!(minute = *minute, "dimming minute wrapped into the day");
                *minute %= 24 * 60;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrightnessConfig {
    pub global: f32,
    pub keyboard: f32,
    pub peripheral: f32,
}

impl Default for BrightnessConfig {
    fn default() -> Self {
        Self {
            global: 1.0,
            keyboard: 1.0,
            peripheral: 1.0,
        }
    }
}

/// Brightness factors handed to the compositor for a single tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessSnapshot {
    pub global: f32,
    pub keyboard: f32,
    pub peripheral: f32,
}

impl Default for BrightnessSnapshot {
    fn default() -> Self {
        Self {
            global: 1.0,
            keyboard: 1.0,
            peripheral: 1.0,
        }
    }
}

/// Daily window, in local minutes of the day, during which the surface is
/// blacked out. The window may wrap past midnight (`start_minute > end_minute`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimmingConfig {
    pub enabled: bool,
    pub start_minute: u16,
    pub end_minute: u16,
}

impl Default for DimmingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            start_minute: 22 * 60,
            end_minute: 7 * 60,
        }
    }
}

impl DimmingConfig {
    pub fn contains(&self, minute_of_day: u16) -> bool {
        if !self.enabled || self.start_minute == self.end_minute {
            return false;
        }
        if self.start_minute < self.end_minute {
            (self.start_minute..self.end_minute).contains(&minute_of_day)
        } else {
            minute_of_day >= self.start_minute || minute_of_day < self.end_minute
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IdleEffectKind {
    #[default]
    None,
    /// Translucent black over the whole frame.
    Dim,
    /// The configured color fading in and out.
    ColorBreathing,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    pub kind: IdleEffectKind,
    pub delay_minutes: u32,
    pub color: Color,
    /// Breathing cycles per second.
    pub speed: f32,
    /// Strength of the effect in `[0, 1]`.
    pub amount: f32,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            kind: IdleEffectKind::None,
            delay_minutes: 5,
            color: Color::rgb(0, 0, 255),
            speed: 0.25,
            amount: 0.5,
        }
    }
}
