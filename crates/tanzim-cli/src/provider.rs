//! File-backed prayer-time provider.
//!
//! The core never computes prayer times itself; this provider reads them
//! from a JSON file produced by whatever calculation or download the user
//! prefers:
//!
//! ```json
//! {
//!   "fajr": "05:10",
//!   "dhuhr": "13:00",
//!   "asr": "16:30",
//!   "maghrib": "19:45",
//!   "isha": "21:30",
//!   "kerahat": [{ "start": "06:45", "end": "07:05" }]
//! }
//! ```

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::path::PathBuf;

use tanzim_core::prayer::{
    KerahatWindow, Prayer, PrayerDurations, PrayerProvider, PrayerTimetable,
};
use tanzim_core::ProviderError;

#[derive(Debug, Deserialize)]
struct TimetableFile {
    fajr: String,
    dhuhr: String,
    asr: String,
    maghrib: String,
    isha: String,
    #[serde(default)]
    kerahat: Vec<KerahatEntry>,
}

#[derive(Debug, Deserialize)]
struct KerahatEntry {
    start: String,
    end: String,
}

pub struct FileProvider {
    path: PathBuf,
    durations: PrayerDurations,
}

impl FileProvider {
    pub fn new(path: PathBuf, durations: PrayerDurations) -> Self {
        Self { path, durations }
    }

    fn read(&self) -> Result<TimetableFile, ProviderError> {
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| ProviderError::Unavailable(format!("{}: {e}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| ProviderError::Unavailable(format!("{}: {e}", self.path.display())))
    }
}

fn parse_time(raw: &str) -> Result<NaiveTime, ProviderError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| ProviderError::Unavailable(format!("bad time '{raw}' in timetable file")))
}

impl PrayerProvider for FileProvider {
    fn timetable(&self, date: NaiveDate) -> Result<PrayerTimetable, ProviderError> {
        let file = self.read()?;
        let starts = [
            (Prayer::Fajr, parse_time(&file.fajr)?),
            (Prayer::Dhuhr, parse_time(&file.dhuhr)?),
            (Prayer::Asr, parse_time(&file.asr)?),
            (Prayer::Maghrib, parse_time(&file.maghrib)?),
            (Prayer::Isha, parse_time(&file.isha)?),
        ];
        Ok(PrayerTimetable::from_starts(date, starts, &self.durations))
    }

    fn kerahat(&self, _date: NaiveDate) -> Result<Vec<KerahatWindow>, ProviderError> {
        let file = self.read()?;
        file.kerahat
            .iter()
            .map(|entry| {
                Ok(KerahatWindow {
                    start: parse_time(&entry.start)?,
                    end: parse_time(&entry.end)?,
                })
            })
            .collect()
    }
}
