//! Periodic ping schedule for an open connection

use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

/// Fires every `period` once started; never fires while stopped
///
/// The first tick comes one full period after [`start`](Self::start), since
/// the initial ping is written on open.
#[derive(Debug, Default)]
pub struct Keepalive {
    interval: Option<Interval>,
}

impl Keepalive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the schedule
    pub fn start(&mut self, period: Duration) {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    /// Wait for the next tick; pends forever while stopped
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }

    /// Stop the schedule; returns `false` if it was already stopped
    pub fn cancel(&mut self) -> bool {
        self.interval.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.interval.is_some()
    }
}
