//! Wall-clock abstraction
//!
//! The generator only ever asks "what time is it now"; everything else is
//! derived. Keeping that one question behind a trait lets tests drive the
//! generator with a deterministic clock.

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Nanoseconds since the Unix epoch for `t`.
///
/// Falls back to microsecond precision for instants outside the
/// nanosecond-representable range (years beyond ~2262).
pub(crate) fn unix_nanos(t: DateTime<Utc>) -> i64 {
    t.timestamp_nanos_opt()
        .unwrap_or_else(|| t.timestamp_micros().saturating_mul(1000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_unix_nanos() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(unix_nanos(t), 1_735_689_600_000_000_000);
        assert_eq!(unix_nanos(DateTime::UNIX_EPOCH), 0);
    }
}
