//! Date formatting for Indonesian (`id-ID`) display.
//!
//! Timestamps arrive from the backend in UTC. The shop operates on Western
//! Indonesian Time (WIB, UTC+7), so every displayed date is shifted there
//! first.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Timelike, Utc};

const WIB_OFFSET_SECONDS: i32 = 7 * 60 * 60;

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// The WIB (UTC+7) offset.
#[must_use]
pub fn wib() -> FixedOffset {
    FixedOffset::east_opt(WIB_OFFSET_SECONDS).unwrap_or_else(|| Utc.fix())
}

/// The calendar date of a timestamp in WIB.
#[must_use]
pub fn wib_date(at: &DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&wib()).date_naive()
}

/// Long form: `14 Oktober 2026 pukul 09.30`.
#[must_use]
pub fn format_long(at: &DateTime<Utc>) -> String {
    let local = at.with_timezone(&wib());
    format!(
        "{} {} {} pukul {:02}.{:02}",
        local.day(),
        month_name(local.month()),
        local.year(),
        local.hour(),
        local.minute()
    )
}

/// Long form for an optional timestamp; `N/A` when absent.
#[must_use]
pub fn format_long_opt(at: Option<&DateTime<Utc>>) -> String {
    at.map_or_else(|| "N/A".to_string(), format_long)
}

/// Short form: `14/10/2026`.
#[must_use]
pub fn format_short(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{}", date.day(), date.month(), date.year())
}

fn month_name(month: u32) -> &'static str {
    usize::try_from(month.saturating_sub(1))
        .ok()
        .and_then(|i| MONTHS.get(i))
        .copied()
        .unwrap_or("")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_long_shifts_to_wib() {
        let at = Utc.with_ymd_and_hms(2026, 10, 14, 2, 30, 0).unwrap();
        assert_eq!(format_long(&at), "14 Oktober 2026 pukul 09.30");
    }

    #[test]
    fn test_wib_date_crosses_midnight() {
        let at = Utc.with_ymd_and_hms(2026, 1, 31, 18, 0, 0).unwrap();
        assert_eq!(wib_date(&at), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
    }

    #[test]
    fn test_format_short() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 5).unwrap();
        assert_eq!(format_short(date), "05/03/2026");
    }

    #[test]
    fn test_format_long_opt_missing() {
        assert_eq!(format_long_opt(None), "N/A");
    }
}
