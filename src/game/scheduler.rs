//! Cancellable periodic tick source.
//!
//! The scheduler owns at most one [`tokio::time::Interval`]. Starting it again
//! replaces the old interval rather than adding a second one, and a stopped
//! scheduler simply never fires, which keeps it usable as a `tokio::select!`
//! branch at all times.

use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

pub struct TickScheduler {
    period: Duration,
    timer: Option<Interval>,
}

impl TickScheduler {
    /// Create a stopped scheduler
    pub fn new(period: Duration) -> Self {
        // tokio panics on a zero period
        let period = period.max(Duration::from_millis(1));
        Self {
            period,
            timer: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_active(&self) -> bool {
        self.timer.is_some()
    }

    /// Begin ticking. The first tick fires one full period from now.
    pub fn start(&mut self) {
        let mut timer = interval_at(Instant::now() + self.period, self.period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.timer = Some(timer);
    }

    pub fn stop(&mut self) {
        self.timer = None;
    }

    /// Wait for the next tick. Never completes while stopped.
    pub async fn tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, timeout};

    const PERIOD: Duration = Duration::from_millis(200);

    #[tokio::test(start_paused = true)]
    async fn test_stopped_never_fires() {
        let mut scheduler = TickScheduler::new(PERIOD);
        assert!(!scheduler.is_active());

        let result = timeout(Duration::from_secs(10), scheduler.tick()).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let mut scheduler = TickScheduler::new(PERIOD);
        let started = Instant::now();
        scheduler.start();

        scheduler.tick().await;
        assert!(started.elapsed() >= PERIOD);

        scheduler.tick().await;
        assert!(started.elapsed() >= PERIOD * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_timer() {
        let mut scheduler = TickScheduler::new(PERIOD);
        scheduler.start();
        advance(Duration::from_millis(150)).await;

        let restarted = Instant::now();
        scheduler.start();
        scheduler.tick().await;

        assert!(restarted.elapsed() >= PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels() {
        let mut scheduler = TickScheduler::new(PERIOD);
        scheduler.start();
        scheduler.stop();
        assert!(!scheduler.is_active());

        let result = timeout(Duration::from_secs(10), scheduler.tick()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let scheduler = TickScheduler::new(Duration::ZERO);
        assert_eq!(scheduler.period(), Duration::from_millis(1));
    }
}
