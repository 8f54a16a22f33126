//! Calendar date formatting without timezone dependencies.
//!
//! Sitemaps want a plain `YYYY-MM-DD` lastmod derived from file
//! modification time. UTC is good enough for that; no chrono needed.

use std::time::{SystemTime, UNIX_EPOCH};

/// Format a filesystem timestamp as a `YYYY-MM-DD` calendar date (UTC).
///
/// Timestamps before the epoch clamp to 1970-01-01.
pub fn format_ymd(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0);
    let (year, month, day) = civil_from_days(secs.div_euclid(86_400));
    format!("{year:04}-{month:02}-{day:02}")
}

/// Convert days since 1970-01-01 to (year, month, day).
///
/// Howard Hinnant's civil-from-days algorithm.
const fn civil_from_days(z: i64) -> (i64, u8, u8) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ymd_of(secs: u64) -> String {
        format_ymd(UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn test_epoch() {
        assert_eq!(ymd_of(0), "1970-01-01");
    }

    #[test]
    fn test_known_dates() {
        // 2024-06-15T00:00:00Z
        assert_eq!(ymd_of(1_718_409_600), "2024-06-15");
        // 2000-02-29 (leap day)
        assert_eq!(ymd_of(951_782_400), "2000-02-29");
        // End of 2023
        assert_eq!(ymd_of(1_703_980_800), "2023-12-31");
    }

    #[test]
    fn test_time_of_day_ignored() {
        // Same day regardless of hour
        assert_eq!(ymd_of(1_718_409_600 + 23 * 3600), "2024-06-15");
    }

    #[test]
    fn test_civil_from_days_round_numbers() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(365), (1971, 1, 1));
        // 1972 is a leap year
        assert_eq!(civil_from_days(365 * 2 + 59), (1972, 2, 29));
    }
}
