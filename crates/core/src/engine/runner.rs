use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::LightingStateManager;
use crate::{KeylightError, Result};

const MIN_DELAY: Duration = Duration::from_millis(1);

/// Shared stop signal for the render loop and anything it spawns.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Time to wait before the next tick: the configured period minus the time
/// the last tick took, but never less than a millisecond.
pub fn next_delay(target: Duration, elapsed: Duration) -> Duration {
    target.saturating_sub(elapsed).max(MIN_DELAY)
}

/// The render loop running on its own thread.
#[derive(Debug)]
pub struct RenderLoop {
    token: CancellationToken,
    handle: Option<JoinHandle<LightingStateManager>>,
}

impl RenderLoop {
    pub fn spawn(manager: LightingStateManager) -> Result<Self> {
        Self::spawn_with_token(manager, CancellationToken::new())
    }

    pub fn spawn_with_token(manager: LightingStateManager, token: CancellationToken) -> Result<Self> {
        let loop_token = token.clone();
        let handle = thread::Builder::new()
            .name("keylight-render".to_string())
            .spawn(move || {
                let mut manager = manager;
                Self::run(&mut manager, &loop_token, None);
                manager.shutdown();
                manager
            })?;

        Ok(Self {
            token,
            handle: Some(handle),
        })
    }

    /// Drives `manager` on the calling thread until `token` is cancelled or
    /// `max_ticks` ticks have run. Returns the number of ticks.
    pub fn run(
        manager: &mut LightingStateManager,
        token: &CancellationToken,
        max_ticks: Option<u64>,
    ) -> u64 {
        let mut ticks = 0;
        while !token.is_cancelled() && max_ticks.map_or(true, |max| ticks < max) {
            let started = Instant::now();
            manager.run_tick();
            ticks += 1;

            let delay = next_delay(manager.update_delay(), started.elapsed());
            thread::park_timeout(delay);
        }
        tracing::debug!(ticks, "render loop finished");
        ticks
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Signals the loop, waits for the in-flight tick and hands the manager
    /// back.
    pub fn stop(mut self) -> Result<LightingStateManager> {
        self.token.cancel();
        let handle = self
            .handle
            .take()
            .ok_or_else(|| KeylightError::msg("render loop already stopped"))?;
        join_loop(handle)
    }
}

fn join_loop(handle: JoinHandle<LightingStateManager>) -> Result<LightingStateManager> {
    handle.thread().unpark();
    handle
        .join()
        .map_err(|_| KeylightError::msg("render loop thread panicked"))
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.token.cancel();
            if let Err(err) = join_loop(handle) {
                tracing::warn!(error = %err, "render loop ended abnormally");
            }
        }
    }
}
