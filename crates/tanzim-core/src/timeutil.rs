//! Wall-clock parsing helpers.

use chrono::{Duration, NaiveTime};

/// Parse an `HH:MM` token.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let cleaned = value.trim();
    let (h, m) = cleaned.split_once(':')?;
    if h.is_empty() || h.len() > 2 || m.len() != 2 {
        return None;
    }
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

pub fn format_hhmm(value: NaiveTime) -> String {
    value.format("%H:%M").to_string()
}

/// Parse a duration token: `H` (hours), `H.MM` (hours + minutes) or `.MM`
/// (bare minutes). `MM` must stay below 60 -- `1.30` is ninety minutes,
/// never 1.3 hours.
pub fn parse_duration_token(token: &str) -> Option<Duration> {
    let cleaned = token.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Some(minutes) = cleaned.strip_prefix('.') {
        if minutes.is_empty() || minutes.len() > 2 || !minutes.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let m: i64 = minutes.parse().ok()?;
        if m >= 60 {
            return None;
        }
        return Some(Duration::minutes(m));
    }
    if let Some((hours, minutes)) = cleaned.split_once('.') {
        if hours.is_empty() || !hours.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if minutes.is_empty() || minutes.len() > 2 || !minutes.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let h: i64 = hours.parse().ok()?;
        let m: i64 = minutes.parse().ok()?;
        if m >= 60 {
            return None;
        }
        return Some(Duration::hours(h) + Duration::minutes(m));
    }
    if cleaned.bytes().all(|b| b.is_ascii_digit()) {
        let h: i64 = cleaned.parse().ok()?;
        return Some(Duration::hours(h));
    }
    None
}

/// Render a duration back to its canonical qalib token.
pub fn format_duration_token(value: Duration) -> String {
    let total_minutes = value.num_minutes();
    let (hours, minutes) = (total_minutes / 60, total_minutes % 60);
    if hours > 0 && minutes > 0 {
        format!("{hours}.{minutes:02}")
    } else if hours > 0 {
        hours.to_string()
    } else {
        format!(".{minutes:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hhmm() {
        assert_eq!(parse_hhmm("05:00"), NaiveTime::from_hms_opt(5, 0, 0));
        assert_eq!(parse_hhmm(" 23:59 "), NaiveTime::from_hms_opt(23, 59, 0));
        assert_eq!(parse_hhmm("24:00"), None);
        assert_eq!(parse_hhmm("5:7"), None);
        assert_eq!(parse_hhmm("0500"), None);
    }

    #[test]
    fn duration_tokens() {
        assert_eq!(parse_duration_token("2"), Some(Duration::hours(2)));
        assert_eq!(
            parse_duration_token("1.30"),
            Some(Duration::minutes(90)),
            "H.MM is hours plus minutes, not a decimal"
        );
        assert_eq!(parse_duration_token(".15"), Some(Duration::minutes(15)));
        assert_eq!(parse_duration_token(".75"), None);
        assert_eq!(parse_duration_token("1.75"), None);
        assert_eq!(parse_duration_token(""), None);
        assert_eq!(parse_duration_token("x"), None);
    }

    #[test]
    fn duration_round_trips_to_canonical_token() {
        for raw in ["2", "1.30", ".15", ".05"] {
            let parsed = parse_duration_token(raw).unwrap();
            assert_eq!(format_duration_token(parsed), raw);
        }
    }
}
