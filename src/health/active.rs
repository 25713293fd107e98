//! Active connection probing.
//!
//! # Responsibilities
//! - Wait out the startup delay, then probe on a fixed cadence
//! - Stop promptly when the monitor's stop signal fires

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::health::monitor::ConnectionMonitor;
use crate::health::prober::Prober;

/// Repeating probe timer bound to one monitoring session.
pub struct ProbeScheduler<P: Prober> {
    monitor: ConnectionMonitor<P>,
    initial_delay: Duration,
    interval: Duration,
}

impl<P: Prober> ProbeScheduler<P> {
    pub fn new(monitor: ConnectionMonitor<P>, initial_delay: Duration, interval: Duration) -> Self {
        Self {
            monitor,
            initial_delay,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub async fn run(self, mut stop: broadcast::Receiver<()>) {
        tokio::select! {
            _ = time::sleep(self.initial_delay) => {}
            _ = stop.recv() => {
                tracing::debug!("Probe scheduler stopped before first probe");
                return;
            }
        }

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                deadline = ticker.tick() => {
                    let outcome = self.monitor.check_connection_at(deadline).await;
                    tracing::trace!(?outcome, "Scheduled probe finished");
                }
                _ = stop.recv() => {
                    tracing::debug!("Probe scheduler received stop signal, exiting loop");
                    break;
                }
            }
        }
    }
}
