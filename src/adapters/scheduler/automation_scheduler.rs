//! CycleAutomationScheduler - Background driver for the automation pass.
//!
//! Fires `CycleAutomationPass::run_once` on a fixed interval with the
//! clock's current time. The pass itself holds no timing logic, so tests
//! call it directly and only this loop touches real time.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `poll_interval` | 60s | How often to run a pass |
//!
//! ## Graceful Shutdown
//!
//! The loop listens on a watch channel. A pass already in progress runs to
//! completion before the loop returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::application::{AutomationReport, CycleAutomationPass};
use crate::ports::Clock;

/// Configuration for the scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between passes.
    pub poll_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
        }
    }
}

impl SchedulerConfig {
    /// Create config with custom poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Interval loop around the automation pass.
pub struct CycleAutomationScheduler {
    pass: Arc<CycleAutomationPass>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
}

impl CycleAutomationScheduler {
    /// Create a scheduler with default configuration.
    pub fn new(pass: Arc<CycleAutomationPass>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(pass, clock, SchedulerConfig::default())
    }

    /// Create a scheduler with custom configuration.
    pub fn with_config(
        pass: Arc<CycleAutomationPass>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            pass,
            clock,
            config,
        }
    }

    /// Run passes until the shutdown signal is received.
    ///
    /// Returns the number of passes run. The first pass starts immediately.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut interval = time::interval(self.config.poll_interval);
        // A slow pass delays the next tick instead of triggering a burst.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut passes = 0;

        info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Cycle automation scheduler started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // A dropped sender also means stop.
                    if changed.is_err() || *shutdown.borrow() {
                        info!(passes, "Cycle automation scheduler stopped");
                        return passes;
                    }
                }

                _ = interval.tick() => {
                    self.tick_once().await;
                    passes += 1;
                }
            }
        }
    }

    /// Run exactly one pass at the clock's current time.
    pub async fn tick_once(&self) -> AutomationReport {
        let now = self.clock.now();
        debug!(now = %now, "Scheduled automation tick");
        self.pass.run_once(now).await
    }
}
