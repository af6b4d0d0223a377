use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::models::settings::ConfigurationError;

/// Display refresh period. The label resolves whole seconds only.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Recompute the display string; never fetches.
    Tick,
    /// Issue a new fetch cycle.
    Fetch,
}

/// Two independent periodic triggers: a fixed display tick and the
/// configured fetch cadence.
///
/// The tick fires immediately and then every [`TICK_PERIOD`]. The first fetch
/// trigger fires one full period after construction because the startup fetch
/// is issued eagerly by the engine. A running scheduler is never re-armed
/// when the configured interval changes; that takes effect on the next start.
/// Must be constructed inside a Tokio runtime.
pub struct RefreshScheduler {
    tick: Interval,
    fetch: Interval,
    fetch_period: Duration,
}

impl RefreshScheduler {
    pub fn new(fetch_period: Duration) -> Result<Self, ConfigurationError> {
        Self::with_periods(TICK_PERIOD, fetch_period)
    }

    pub fn with_periods(
        tick_period: Duration,
        fetch_period: Duration,
    ) -> Result<Self, ConfigurationError> {
        validate_period(tick_period)?;
        validate_period(fetch_period)?;

        let mut tick = time::interval(tick_period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut fetch = time::interval_at(Instant::now() + fetch_period, fetch_period);
        fetch.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Ok(Self {
            tick,
            fetch,
            fetch_period,
        })
    }

    pub fn fetch_period(&self) -> Duration {
        self.fetch_period
    }

    /// Waits for whichever trigger is due next. Ticks win ties.
    pub async fn next(&mut self) -> Trigger {
        tokio::select! {
            biased;
            _ = self.tick.tick() => Trigger::Tick,
            _ = self.fetch.tick() => Trigger::Fetch,
        }
    }
}

fn validate_period(period: Duration) -> Result<(), ConfigurationError> {
    if period.is_zero() {
        return Err(ConfigurationError::NonPositiveInterval(format!(
            "{}",
            period.as_secs_f64()
        )));
    }
    Ok(())
}
