//! Browser clock: `Date.now()` for wall time, `performance.now()` for time
//! since navigation start

use std::time::Duration;

use beacon_core::Clock;
use chrono::{DateTime, Utc};
use web_sys::Performance;

pub struct PerformanceClock {
    performance: Option<Performance>,
}

impl PerformanceClock {
    pub fn new(performance: Option<Performance>) -> Self {
        Self { performance }
    }
}

impl Clock for PerformanceClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(js_sys::Date::now() as i64).unwrap_or_default()
    }

    fn elapsed(&self) -> Duration {
        let millis = self.performance.as_ref().map(|p| p.now()).unwrap_or(0.0);
        if millis.is_finite() && millis > 0.0 {
            Duration::from_secs_f64(millis / 1000.0)
        } else {
            Duration::ZERO
        }
    }
}
