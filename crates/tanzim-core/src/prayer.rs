//! Prayer timetable types and the provider seam.
//!
//! The core consumes already-computed prayer times as plain values. How they
//! are computed (calculation method, geolocation, caching) belongs to the
//! provider collaborator behind [`PrayerProvider`]; the core never performs
//! network calls and never retries.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// The five canonical daily prayers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// Case-insensitive keyword match. Accepts the `duhr` spelling variant.
    pub fn from_keyword(token: &str) -> Option<Prayer> {
        match token.trim().to_ascii_lowercase().as_str() {
            "fajr" => Some(Prayer::Fajr),
            "dhuhr" | "duhr" => Some(Prayer::Dhuhr),
            "asr" => Some(Prayer::Asr),
            "maghrib" => Some(Prayer::Maghrib),
            "isha" => Some(Prayer::Isha),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }
}

impl std::fmt::Display for Prayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configured length of each salah.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerDurations {
    #[serde(default = "default_fajr_minutes")]
    pub fajr_minutes: i64,
    #[serde(default = "default_dhuhr_minutes")]
    pub dhuhr_minutes: i64,
    #[serde(default = "default_asr_minutes")]
    pub asr_minutes: i64,
    #[serde(default = "default_maghrib_minutes")]
    pub maghrib_minutes: i64,
    #[serde(default = "default_isha_minutes")]
    pub isha_minutes: i64,
}

fn default_fajr_minutes() -> i64 {
    20
}
fn default_dhuhr_minutes() -> i64 {
    15
}
fn default_asr_minutes() -> i64 {
    15
}
fn default_maghrib_minutes() -> i64 {
    20
}
fn default_isha_minutes() -> i64 {
    20
}

impl Default for PrayerDurations {
    fn default() -> Self {
        Self {
            fajr_minutes: default_fajr_minutes(),
            dhuhr_minutes: default_dhuhr_minutes(),
            asr_minutes: default_asr_minutes(),
            maghrib_minutes: default_maghrib_minutes(),
            isha_minutes: default_isha_minutes(),
        }
    }
}

impl PrayerDurations {
    pub fn duration_of(&self, prayer: Prayer) -> Duration {
        let minutes = match prayer {
            Prayer::Fajr => self.fajr_minutes,
            Prayer::Dhuhr => self.dhuhr_minutes,
            Prayer::Asr => self.asr_minutes,
            Prayer::Maghrib => self.maghrib_minutes,
            Prayer::Isha => self.isha_minutes,
        };
        Duration::minutes(minutes)
    }

    pub fn total(&self) -> Duration {
        Prayer::ALL
            .iter()
            .fold(Duration::zero(), |acc, p| acc + self.duration_of(*p))
    }
}

/// One prayer's window for a given day: `end = start + configured duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerWindow {
    pub prayer: Prayer,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// All five windows for one day, in canonical order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTimetable {
    pub date: NaiveDate,
    pub windows: [PrayerWindow; 5],
}

impl PrayerTimetable {
    /// Build a timetable from the five provider start times and the
    /// configured durations.
    pub fn from_starts(
        date: NaiveDate,
        starts: [(Prayer, NaiveTime); 5],
        durations: &PrayerDurations,
    ) -> Self {
        let windows = starts.map(|(prayer, start)| PrayerWindow {
            prayer,
            start,
            end: start + durations.duration_of(prayer),
        });
        Self { date, windows }
    }

    pub fn window(&self, prayer: Prayer) -> &PrayerWindow {
        self.windows
            .iter()
            .find(|w| w.prayer == prayer)
            .unwrap_or(&self.windows[0])
    }
}

/// A window during which no prayer may be scheduled (around sunrise, solar
/// noon and sunset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KerahatWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl KerahatWindow {
    pub fn contains(&self, moment: NaiveTime) -> bool {
        self.start <= moment && moment < self.end
    }
}

/// External prayer-time collaborator.
///
/// Implementations resolve the timetable for a date (network, cache, file)
/// and surface failure as [`ProviderError::Unavailable`]; the core
/// propagates it without fallback.
pub trait PrayerProvider {
    fn timetable(&self, date: NaiveDate) -> Result<PrayerTimetable, ProviderError>;

    fn kerahat(&self, date: NaiveDate) -> Result<Vec<KerahatWindow>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_matching_is_case_insensitive_and_aliased() {
        assert_eq!(Prayer::from_keyword("FAJR"), Some(Prayer::Fajr));
        assert_eq!(Prayer::from_keyword("duhr"), Some(Prayer::Dhuhr));
        assert_eq!(Prayer::from_keyword("Dhuhr"), Some(Prayer::Dhuhr));
        assert_eq!(Prayer::from_keyword("lunch"), None);
    }

    #[test]
    fn timetable_windows_add_configured_durations() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        let table = PrayerTimetable::from_starts(
            date,
            [
                (Prayer::Fajr, t(5, 10)),
                (Prayer::Dhuhr, t(12, 30)),
                (Prayer::Asr, t(15, 45)),
                (Prayer::Maghrib, t(18, 20)),
                (Prayer::Isha, t(19, 50)),
            ],
            &PrayerDurations::default(),
        );
        assert_eq!(table.window(Prayer::Fajr).end, t(5, 30));
        assert_eq!(table.window(Prayer::Dhuhr).end, t(12, 45));
        assert_eq!(table.window(Prayer::Isha).end, t(20, 10));
    }

    #[test]
    fn total_prayer_time_sums_all_five() {
        let durations = PrayerDurations::default();
        assert_eq!(durations.total(), Duration::minutes(90));
    }
}
