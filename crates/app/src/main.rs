use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use clap::{Parser, Subcommand};
use keylight_core::{
    ActiveProfile, Canvas, Clock, Color, DeviceColorMap, DeviceDispatcher, DeviceKey, EngineConfig,
    FreeForm, KeySequence, Layer, LightingStateManager, LinearGradient, PercentEffect,
    PercentEffectType, PercentLayerHandler, Point, ProfileEvent, ProfileResolver, Rect, RenderLoop,
    SharedCanvas, SolidFillLayerHandler, SystemClock,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

const KEY_SIZE: f32 = 20.0;
const DEMO_PROFILE: &str = "demo";

fn main() -> keylight_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            delay_ms,
            dim,
        } => run(config.as_ref(), ticks, delay_ms, dim),
        Commands::Layout => print_layout(),
    }
}

fn run(config: Option<&PathBuf>, ticks: u64, delay_ms: Option<u64>, dim: bool) -> keylight_core::Result<()> {
    let mut config = match config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(delay_ms) = delay_ms {
        config.update_delay_ms = delay_ms.max(1);
    }
    if dim {
        let now = SystemClock.minute_of_day();
        config.dimming.enabled = true;
        config.dimming.start_minute = now;
        config.dimming.end_minute = (now + 60) % (24 * 60);
    }
    tracing::info!(?config, ticks, "starting render loop");

    let canvas = SharedCanvas::new(demo_canvas());
    let event = demo_event();
    let game_state = event.game_state();
    let delay = Duration::from_millis(config.update_delay_ms);

    let mut manager = LightingStateManager::new(canvas, LoggingDispatcher::default(), StaticResolver)?
        .with_config(Arc::new(RwLock::new(config)));
    manager.register_event(DEMO_PROFILE, Box::new(event));

    let render_loop = RenderLoop::spawn(manager)?;
    for tick in 0..ticks {
        let health = 100 - (tick % 101);
        match game_state.write() {
            Ok(mut state) => state.set("/player/health", json!(health))?,
            Err(_) => return Err(keylight_core::KeylightError::Poisoned("game state")),
        }
        std::thread::sleep(delay);
    }
    let manager = render_loop.stop()?;

    let lit = manager.device_colors().iter().filter(|(_, color)| *color != Color::BLACK).count();
    tracing::info!(lit, last_tick = ?manager.last_tick_duration(), "render loop stopped");
    Ok(())
}

fn print_layout() -> keylight_core::Result<()> {
    let canvas = demo_canvas();
    let keys: serde_json::Map<String, serde_json::Value> = canvas
        .keys()
        .map(|key| Ok((key.name().to_string(), serde_json::to_value(canvas.rectangle(key))?)))
        .collect::<keylight_core::Result<_>>()?;
    let layout = json!({
        "width": canvas.width(),
        "height": canvas.height(),
        "keys": keys,
    });
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}

/// Function row, number row and a mouse, on a 20 px grid.
fn demo_canvas() -> Canvas {
    const ROWS: [&[DeviceKey]; 2] = [
        &[
            DeviceKey::ESC,
            DeviceKey::F1,
            DeviceKey::F2,
            DeviceKey::F3,
            DeviceKey::F4,
            DeviceKey::F5,
            DeviceKey::F6,
            DeviceKey::F7,
            DeviceKey::F8,
            DeviceKey::F9,
            DeviceKey::F10,
        ],
        &[
            DeviceKey::TILDE,
            DeviceKey::ONE,
            DeviceKey::TWO,
            DeviceKey::THREE,
            DeviceKey::FOUR,
            DeviceKey::FIVE,
            DeviceKey::SIX,
            DeviceKey::SEVEN,
            DeviceKey::EIGHT,
            DeviceKey::NINE,
            DeviceKey::ZERO,
        ],
    ];

    let mut builder = Canvas::builder(12 * KEY_SIZE as u32, 2 * KEY_SIZE as u32)
        .editor_size(12.0 * KEY_SIZE, 2.0 * KEY_SIZE)
        .editor_origin(Point::new(0.0, 0.0));
    for (row, keys) in ROWS.iter().enumerate() {
        for (column, key) in keys.iter().enumerate() {
            let rect = Rect::new(column as f32 * KEY_SIZE, row as f32 * KEY_SIZE, KEY_SIZE, KEY_SIZE);
            builder = builder.key(*key, rect);
        }
    }
    builder
        .key(DeviceKey::PERIPHERAL_LOGO, Rect::new(11.0 * KEY_SIZE, 0.0, KEY_SIZE, 2.0 * KEY_SIZE))
        .build()
}

/// Gradient function row, a health bar on the number row and a freeform
/// overlay over the mouse.
fn demo_event() -> ProfileEvent {
    let function_row = KeySequence::Keys(vec![
        DeviceKey::ESC,
        DeviceKey::F1,
        DeviceKey::F2,
        DeviceKey::F3,
        DeviceKey::F4,
        DeviceKey::F5,
        DeviceKey::F6,
        DeviceKey::F7,
        DeviceKey::F8,
        DeviceKey::F9,
        DeviceKey::F10,
    ]);
    let number_row = KeySequence::Keys(vec![
        DeviceKey::ONE,
        DeviceKey::TWO,
        DeviceKey::THREE,
        DeviceKey::FOUR,
        DeviceKey::FIVE,
        DeviceKey::SIX,
        DeviceKey::SEVEN,
        DeviceKey::EIGHT,
        DeviceKey::NINE,
        DeviceKey::ZERO,
    ]);
    let mouse = KeySequence::from(FreeForm::new(11.5 * KEY_SIZE, KEY_SIZE, KEY_SIZE, 2.0 * KEY_SIZE, 0.0));

    let health = PercentEffect::new(Color::GREEN, Color::RED, 100.0, 100.0)
        .with_kind(PercentEffectType::ProgressiveGradual);

    ProfileEvent::new(DEMO_PROFILE)
        .with_layer(Layer::new(
            "function row",
            SolidFillLayerHandler::gradient(
                function_row,
                LinearGradient::horizontal(&[Color::BLUE, Color::rgb(128, 0, 255), Color::RED]),
            ),
        ))
        .with_layer(Layer::new(
            "health",
            PercentLayerHandler::new(number_row, health, "/player/health"),
        ))
        .with_overlay_layer(
            Layer::new("mouse", SolidFillLayerHandler::new(mouse, Color::WHITE)).with_opacity(0.5),
        )
}

/// Logs what would be sent to the hardware.
#[derive(Debug, Default)]
struct LoggingDispatcher {
    frames: u64,
}

impl DeviceDispatcher for LoggingDispatcher {
    fn initialize_devices(&mut self) -> keylight_core::Result<()> {
        tracing::info!("devices initialised");
        Ok(())
    }

    fn shutdown_devices(&mut self) -> keylight_core::Result<()> {
        tracing::info!(frames = self.frames, "devices released");
        Ok(())
    }

    fn update_devices(&mut self, colors: &DeviceColorMap) -> keylight_core::Result<()> {
        self.frames += 1;
        if tracing::enabled!(tracing::Level::DEBUG) {
            let summary: Vec<String> = colors
                .iter()
                .map(|(key, c)| format!("{}=#{:02x}{:02x}{:02x}", key.name(), c.r, c.g, c.b))
                .collect();
            tracing::debug!(frame = self.frames, colors = %summary.join(" "), "frame");
        }
        Ok(())
    }
}

/// Always reports the demo profile as active.
struct StaticResolver;

impl ProfileResolver for StaticResolver {
    fn current_profile(&mut self) -> Option<ActiveProfile> {
        Some(ActiveProfile::new(DEMO_PROFILE))
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Per-key lighting effect engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive the demo profile through the render loop.
    Run {
        /// JSON engine configuration to load.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of update periods to run before stopping.
        #[arg(short, long, default_value_t = 200)]
        ticks: u64,
        /// Override the configured update delay.
        #[arg(long)]
        delay_ms: Option<u64>,
        /// Force the dimming window on for the next hour.
        #[arg(long)]
        dim: bool,
    },
    /// Print the demo canvas as JSON.
    Layout,
}
