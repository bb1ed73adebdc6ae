use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, Timelike, Utc};

const MS_PER_MINUTE: u64 = 60_000;
const MINUTES_PER_DAY: u64 = 24 * 60;

/// Source of wall-clock time for the render loop and time-based effects.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// Minute of the local day, in `0..1440`.
    fn minute_of_day(&self) -> u16;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
    }

    fn minute_of_day(&self) -> u16 {
        let now = Local::now();
        (now.hour() * 60 + now.minute()) as u16
    }
}

/// Clock that only moves when told to. Clones share the same time.
///
/// Its time is taken as already local, so the minute of the day is read
/// straight from the stored milliseconds.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn set(&self, ms: u64) {
        self.now_ms.store(ms, Ordering::Release);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::Acquire)
    }

    fn minute_of_day(&self) -> u16 {
        ((self.now_ms() / MS_PER_MINUTE) % MINUTES_PER_DAY) as u16
    }
}
