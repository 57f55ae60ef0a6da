//! Interruption clock.
//!
//! A wall-clock-based measurement device, not a scheduler. It does not use
//! internal threads - the caller passes `now` into every query. Starting a
//! clock has no effect on the compiled timeline; only [`InterruptionClock::stop`]
//! produces a span worth handing to the shrinker, and dropping the clock
//! (or calling [`InterruptionClock::cancel`]) discards the measurement.

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::shrink::{InterruptionCause, UnplannedSpan};

/// A running chronometer or countdown timer measuring an interruption.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterruptionClock {
    started: NaiveDateTime,
    /// `None` for an open-ended chronometer.
    limit: Option<Duration>,
}

impl InterruptionClock {
    /// Open-ended stopwatch; runs until stopped.
    pub fn chronometer(now: NaiveDateTime) -> Self {
        Self {
            started: now,
            limit: None,
        }
    }

    /// Countdown timer; [`expired`](Self::expired) once `limit` has elapsed.
    pub fn timer(now: NaiveDateTime, limit: Duration) -> Self {
        Self {
            started: now,
            limit: Some(limit),
        }
    }

    pub fn started_at(&self) -> NaiveDateTime {
        self.started
    }

    pub fn elapsed(&self, now: NaiveDateTime) -> Duration {
        now - self.started
    }

    /// Whether a countdown timer has run out. A chronometer never expires.
    pub fn expired(&self, now: NaiveDateTime) -> bool {
        self.limit.is_some_and(|limit| now - self.started >= limit)
    }

    /// Stop the clock and produce the measured span, truncated to whole
    /// minutes (timelines never track seconds). A countdown timer's span
    /// is capped at its limit even when stopped late.
    pub fn stop(self, now: NaiveDateTime) -> UnplannedSpan {
        match self.limit {
            Some(limit) => UnplannedSpan {
                start: to_minute(self.started),
                end: to_minute(now.min(self.started + limit)),
                cause: InterruptionCause::Timer,
            },
            None => UnplannedSpan {
                start: to_minute(self.started),
                end: to_minute(now),
                cause: InterruptionCause::Chronometer,
            },
        }
    }

    /// Discard the measurement without side effects.
    pub fn cancel(self) {}
}

fn to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn chronometer_measures_until_stopped() {
        let clock = InterruptionClock::chronometer(at(10, 0));
        assert!(!clock.expired(at(23, 59)));
        assert_eq!(clock.elapsed(at(10, 25)), Duration::minutes(25));

        let span = clock.stop(at(10, 25));
        assert_eq!(span.cause, InterruptionCause::Chronometer);
        assert_eq!((span.start, span.end), (at(10, 0), at(10, 25)));
    }

    #[test]
    fn timer_expires_at_its_limit() {
        let clock = InterruptionClock::timer(at(10, 0), Duration::minutes(15));
        assert!(!clock.expired(at(10, 14)));
        assert!(clock.expired(at(10, 15)));
    }

    #[test]
    fn measured_span_is_truncated_to_whole_minutes() {
        let clock = InterruptionClock::chronometer(at(10, 0).with_second(30).unwrap());
        let span = clock.stop(at(10, 25).with_second(45).unwrap());
        assert_eq!((span.start, span.end), (at(10, 0), at(10, 25)));
        assert_eq!(span.duration(), Duration::minutes(25));
    }

    #[test]
    fn late_stopped_timer_is_capped_at_its_limit() {
        let clock = InterruptionClock::timer(at(10, 0), Duration::minutes(15));
        let span = clock.stop(at(10, 40));
        assert_eq!(span.cause, InterruptionCause::Timer);
        assert_eq!(span.end, at(10, 15));
        assert_eq!(span.duration(), Duration::minutes(15));
    }
}
