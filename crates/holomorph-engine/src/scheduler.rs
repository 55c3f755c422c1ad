//! Fixed-cadence tick driver for the update/render task.
//!
//! The scheduler owns nothing but timing. Each tick it measures the real
//! elapsed time and passes it to the callback, so morphing speed stays
//! correct even when a tick is late.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Drives a callback at a fixed rate until stopped.
pub struct TickScheduler {
    period: Duration,
    is_running: Arc<RwLock<bool>>,
}

impl TickScheduler {
    /// Creates a scheduler ticking at the given rate.
    ///
    /// # Panics
    ///
    /// Panics when `tick_hz` is not positive.
    pub fn new(tick_hz: f64) -> Self {
        assert!(tick_hz > 0.0, "tick rate must be positive");
        Self {
            period: Duration::from_secs_f64(1.0 / tick_hz),
            is_running: Arc::new(RwLock::new(false)),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        *self.is_running.read()
    }

    /// Spawns the tick loop. The callback receives the measured elapsed
    /// seconds since the previous tick.
    pub fn spawn<F>(&self, mut on_tick: F) -> JoinHandle<()>
    where
        F: FnMut(f64) + Send + 'static,
    {
        *self.is_running.write() = true;
        let flag = self.is_running.clone();
        let period = self.period;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // A late tick should not cause a burst of catch-up ticks.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut last = Instant::now();

            while *flag.read() {
                interval.tick().await;
                let now = Instant::now();
                let dt = now.duration_since(last).as_secs_f64();
                last = now;
                on_tick(dt);
            }
            tracing::info!("tick scheduler stopped");
        })
    }

    /// Signals the loop to exit. The tick in flight still completes.
    pub fn stop(&self) {
        *self.is_running.write() = false;
    }
}
