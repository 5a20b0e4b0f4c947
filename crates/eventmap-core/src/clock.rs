//! Wall-clock source for date-relative filters.
//!
//! Filters compare event start instants against the local calendar, so the
//! coordinator asks a [`Clock`] for "now" on every re-filter. The instant
//! carries a full time zone rather than a fixed offset: an event on the far
//! side of a daylight-saving change is dated with the offset in force at its
//! own start. Production uses [`SystemClock`]; tests pin the instant with
//! [`FixedClock`].

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Source of the current instant in the map's time zone.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Tz>;
}

/// The host clock, read in a configured zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    /// A clock reporting in `tz`.
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// The zone instants are reported in.
    pub const fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(chrono_tz::Europe::Helsinki)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Tz>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use chrono_tz::Europe::Helsinki;

    use super::*;

    #[test]
    fn system_clock_reports_in_its_zone() {
        let clock = SystemClock::new(chrono_tz::America::New_York);
        assert_eq!(clock.now().timezone(), chrono_tz::America::New_York);
        assert_eq!(SystemClock::default().timezone(), Helsinki);
    }
}
