//! Display formatting for sizes, durations and timestamps

use chrono::{DateTime, Local, TimeZone, Utc};

const BASE10_PREFIXES: [&str; 5] = ["", "K", "M", "G", "T"];
const BASE2_PREFIXES: [&str; 5] = ["", "Ki", "Mi", "Gi", "Ti"];

/// Round to one decimal place and drop the decimal when it is zero
fn nice_number(f: f64) -> String {
    let rounded = (f * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as u64)
    } else {
        format!("{:.1}", rounded)
    }
}

fn to_unit_string(value: u64, divisor: f64, prefixes: &[&str]) -> String {
    let mut f = value as f64;
    let last = prefixes.len() - 1;
    let mut index = 0;

    // Move up a prefix once the value reaches 90% of the divisor, so 900 B
    // reads as 0.9 KB. The largest prefix absorbs everything above it.
    while index < last && f >= 0.9 * divisor {
        f /= divisor;
        index += 1;
    }

    format!("{} {}B", nice_number(f), prefixes[index])
}

/// Human-readable byte count, e.g. `0.9 KB` or `1 KiB`
///
/// `base2` selects binary prefixes (divisor 1024) instead of decimal ones
/// (divisor 1000). A missing size renders as an empty string.
pub fn size_display_name(size: Option<u64>, base2: bool) -> String {
    match size {
        None => String::new(),
        Some(bytes) if base2 => to_unit_string(bytes, 1024.0, &BASE2_PREFIXES),
        Some(bytes) => to_unit_string(bytes, 1000.0, &BASE10_PREFIXES),
    }
}

/// A millisecond span split into calendar-free units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Magnitudes {
    days: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
}

impl Magnitudes {
    fn from_millis(ms: i64) -> Self {
        let total_seconds = ms / 1000;
        Self {
            days: total_seconds / 86_400,
            hours: (total_seconds / 3_600) % 24,
            minutes: (total_seconds / 60) % 60,
            seconds: total_seconds % 60,
        }
    }
}

fn pluralize(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

fn format_multiple_units(ms: i64) -> String {
    // Short spans keep sub-second precision.
    if ms < 10_000 {
        return format!("{:.1} seconds", ms as f64 / 1000.0);
    }

    let m = Magnitudes::from_millis(ms);
    [
        (m.days, "day"),
        (m.hours, "hour"),
        (m.minutes, "minute"),
        (m.seconds, "second"),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .take(2)
    .map(|(count, unit)| pluralize(count, unit))
    .collect::<Vec<_>>()
    .join(" ")
}

/// Format a span in milliseconds
///
/// Without `multi_units` the result is seconds with one decimal (`12.3s`).
/// With it, the two largest non-zero units are shown (`1 day 3 hours`,
/// `5 minutes 1 second`); spans under ten seconds show fractional seconds.
/// Negative spans render as an empty string.
pub fn format_milliseconds(ms: i64, multi_units: bool) -> String {
    if ms < 0 {
        return String::new();
    }

    if multi_units {
        format_multiple_units(ms)
    } else {
        format!("{:.1}s", ms as f64 / 1000.0)
    }
}

/// Format the time elapsed between two instants; empty when `to < from`
pub fn format_duration(from: DateTime<Utc>, to: DateTime<Utc>, multi_units: bool) -> String {
    format_milliseconds((to - from).num_milliseconds(), multi_units)
}

/// Time elapsed since `from`, for tasks and snapshots still in progress
pub fn format_elapsed_since(from: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_duration(from, now, true)
}

/// Duration of a task or snapshot with optional end; running ones measure to `now`
pub fn format_optional_duration(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format_duration(start, end, true),
        (Some(start), None) => format_elapsed_since(start, now),
        _ => String::new(),
    }
}

/// Render a timestamp in the given zone as `YYYY-MM-DD HH:MM:SS`
pub fn timestamp_in_zone<Tz: TimeZone>(ts: &DateTime<Utc>, zone: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(zone).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Render an optional backend timestamp in the viewer's local zone
pub fn rfc3339_timestamp_for_display(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| timestamp_in_zone(&t, &Local)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_size_display_name_examples() {
        assert_eq!(size_display_name(Some(900), false), "0.9 KB");
        assert_eq!(size_display_name(Some(900), true), "900 B");
        assert_eq!(size_display_name(Some(1024), true), "1 KiB");
        assert_eq!(size_display_name(Some(0), false), "0 B");
        assert_eq!(size_display_name(Some(1_500_000), false), "1.5 MB");
        assert_eq!(size_display_name(None, false), "");
        assert_eq!(size_display_name(None, true), "");
    }

    #[test]
    fn test_size_display_name_largest_prefix() {
        assert_eq!(size_display_name(Some(1_500_000_000_000_000), false), "1500 TB");
    }

    /// Parse a rendered size back into bytes for ordering checks
    fn displayed_magnitude(s: &str, base2: bool) -> f64 {
        let (number, unit) = s.split_once(' ').unwrap();
        let number: f64 = number.parse().unwrap();
        let prefixes: &[&str] = if base2 { &BASE2_PREFIXES } else { &BASE10_PREFIXES };
        let divisor: f64 = if base2 { 1024.0 } else { 1000.0 };
        let prefix = unit.trim_end_matches('B');
        let power = prefixes.iter().position(|p| *p == prefix).unwrap();
        number * divisor.powi(power as i32)
    }

    #[test]
    fn test_size_display_name_is_monotonic() {
        let mut samples: Vec<u64> = (0..20_000).step_by(7).collect();
        let mut v: u64 = 1;
        while v < u64::MAX / 3 {
            samples.extend([v, v + 1, v / 10 * 9, v / 100 * 95]);
            v *= 3;
        }
        samples.sort_unstable();

        for base2 in [false, true] {
            let mut previous = 0.0;
            for &bytes in &samples {
                let shown = displayed_magnitude(&size_display_name(Some(bytes), base2), base2);
                assert!(
                    shown + 1e-6 * shown.max(1.0) >= previous,
                    "{} (base2={}) displayed smaller than its predecessor",
                    bytes,
                    base2
                );
                previous = shown;
            }
        }
    }

    #[test]
    fn test_format_duration_zero() {
        let t = Utc::now();
        assert_eq!(format_duration(t, t, false), "0.0s");
    }

    #[test]
    fn test_format_duration_negative() {
        let t = Utc::now();
        assert_eq!(format_duration(t, t - Duration::seconds(5), false), "");
        assert_eq!(format_duration(t, t - Duration::seconds(5), true), "");
    }

    #[test]
    fn test_format_milliseconds_fixed() {
        assert_eq!(format_milliseconds(1234, false), "1.2s");
        assert_eq!(format_milliseconds(61_000, false), "61.0s");
    }

    #[test]
    fn test_format_milliseconds_multi_units() {
        assert_eq!(format_milliseconds(1_500, true), "1.5 seconds");
        assert_eq!(format_milliseconds(42_000, true), "42 seconds");
        assert_eq!(format_milliseconds(61_000, true), "1 minute 1 second");
        assert_eq!(format_milliseconds(2 * 3_600_000, true), "2 hours");
        assert_eq!(
            format_milliseconds(86_400_000 + 3 * 3_600_000 + 59_000, true),
            "1 day 3 hours"
        );
        // Zero hours are skipped in favour of the next non-zero unit.
        assert_eq!(format_milliseconds(2 * 86_400_000 + 5 * 60_000, true), "2 days 5 minutes");
    }

    #[test]
    fn test_format_optional_duration() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let now = start + Duration::seconds(90);
        assert_eq!(format_optional_duration(Some(start), None, now), "1 minute 30 seconds");
        assert_eq!(format_optional_duration(None, None, now), "");
    }

    #[test]
    fn test_timestamp_in_zone() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(timestamp_in_zone(&ts, &Utc), "2024-03-05 07:08:09");
        assert_eq!(rfc3339_timestamp_for_display(None), "");
    }
}
