//! Date parsing and day-count arithmetic.
//!
//! Four date forms are accepted, selected purely by byte length:
//!
//! ```text
//! 10  2018-11-30
//! 13  2018-11-30 16
//! 16  2018-11-30 16:27
//! 19  2018-11-30 16:27:43
//! ```
//!
//! Omitted components are zero. Dates are wall-clock times in the local time
//! zone of whoever is asking.

use crate::error::ErrorCode;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Day count reported for a date that cannot be parsed.
///
/// No real day count ever equals this value: real counts saturate one below it.
pub const UNPARSEABLE_DAYS: i32 = i32::MAX;

/// Seconds in one day.
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

const FULL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors produced while parsing a stored date.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// The date is not 10, 13, 16 or 19 bytes long; no parse was attempted.
    #[error("date '{date}' is {len} bytes; expected 10, 13, 16 or 19")]
    UnsupportedLength { date: String, len: usize },

    /// The length selected a form but the content did not match it.
    #[error("date '{date}' does not match {}", .form.pattern())]
    Malformed { date: String, form: DateForm },
}

impl DateError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedLength { .. } => ErrorCode::UnsupportedDateLength,
            Self::Malformed { .. } => ErrorCode::MalformedDate,
        }
    }

    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

/// The four accepted date granularities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateForm {
    Day,
    Hour,
    Minute,
    Second,
}

impl DateForm {
    /// Pick the form for a date string of `len` bytes.
    #[must_use]
    pub const fn for_len(len: usize) -> Option<Self> {
        match len {
            10 => Some(Self::Day),
            13 => Some(Self::Hour),
            16 => Some(Self::Minute),
            19 => Some(Self::Second),
            _ => None,
        }
    }

    /// Human-readable pattern, for error messages.
    #[must_use]
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::Day => "YYYY-MM-DD",
            Self::Hour => "YYYY-MM-DD HH",
            Self::Minute => "YYYY-MM-DD HH:MM",
            Self::Second => "YYYY-MM-DD HH:MM:SS",
        }
    }

    /// Suffix that completes this form to the full seconds form.
    const fn completion(self) -> &'static str {
        match self {
            Self::Day => " 00:00:00",
            Self::Hour => ":00:00",
            Self::Minute => ":00",
            Self::Second => "",
        }
    }
}

/// Parse a stored date into a naive calendar time.
///
/// # Errors
///
/// Returns [`DateError::UnsupportedLength`] without parsing when the length is
/// not one of the four accepted forms, and [`DateError::Malformed`] when the
/// content does not match the form its length selects.
pub fn parse(date: &str) -> Result<NaiveDateTime, DateError> {
    let Some(form) = DateForm::for_len(date.len()) else {
        return Err(DateError::UnsupportedLength {
            date: date.to_string(),
            len: date.len(),
        });
    };

    let full = format!("{date}{}", form.completion());
    NaiveDateTime::parse_from_str(&full, FULL_FORMAT).map_err(|_| DateError::Malformed {
        date: date.to_string(),
        form,
    })
}

/// Days elapsed since `date`, measured against the local clock.
///
/// Returns [`UNPARSEABLE_DAYS`] if the date cannot be parsed.
#[must_use]
pub fn days_since(date: &str) -> i32 {
    days_since_at(date, &Local::now())
}

/// Days elapsed between `date` and `now`, rounded toward positive infinity.
///
/// `date` is read as a wall-clock time in `now`'s time zone. Dates in the
/// future give negative counts. Returns [`UNPARSEABLE_DAYS`] on parse failure.
#[must_use]
pub fn days_since_at<Tz: TimeZone>(date: &str, now: &DateTime<Tz>) -> i32 {
    try_days_since_at(date, now).unwrap_or(UNPARSEABLE_DAYS)
}

/// Like [`days_since_at`], but reports why a date could not be used.
///
/// # Errors
///
/// Propagates the [`DateError`] from [`parse`].
pub fn try_days_since_at<Tz: TimeZone>(date: &str, now: &DateTime<Tz>) -> Result<i32, DateError> {
    let naive = parse(date)?;
    let tz = now.timezone();
    // Wall-clock times skipped by a DST jump have no local instant; read them as UTC.
    let target = tz
        .from_local_datetime(&naive)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive));

    let seconds = now.timestamp() - target.timestamp();
    let days = ceil_days(seconds).clamp(i64::from(i32::MIN), i64::from(UNPARSEABLE_DAYS - 1));
    Ok(i32::try_from(days).unwrap_or(UNPARSEABLE_DAYS - 1))
}

/// Whether a day count is the parse-failure sentinel.
#[must_use]
pub const fn is_unparseable(days: i32) -> bool {
    days == UNPARSEABLE_DAYS
}

const fn ceil_days(seconds: i64) -> i64 {
    let days = seconds.div_euclid(SECONDS_PER_DAY);
    if seconds.rem_euclid(SECONDS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, Utc};

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn parses_all_four_forms() {
        let day = NaiveDate::from_ymd_opt(2018, 11, 30).unwrap();
        assert_eq!(parse("2018-11-30").unwrap(), day.and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(parse("2018-11-30 16").unwrap(), day.and_hms_opt(16, 0, 0).unwrap());
        assert_eq!(parse("2018-11-30 16:27").unwrap(), day.and_hms_opt(16, 27, 0).unwrap());
        assert_eq!(
            parse("2018-11-30 16:27:43").unwrap(),
            day.and_hms_opt(16, 27, 43).unwrap()
        );
    }

    #[test]
    fn other_lengths_fail_without_parsing() {
        for date in ["", "abc", "2018-11-3", "2018-11-30 1", "2018-11-30 16:27:43.5"] {
            let err = parse(date).unwrap_err();
            assert_eq!(
                err,
                DateError::UnsupportedLength {
                    date: date.to_string(),
                    len: date.len()
                }
            );
            assert_eq!(err.code(), ErrorCode::UnsupportedDateLength);
        }
    }

    #[test]
    fn right_length_wrong_content_is_malformed() {
        let err = parse("abcdefghij").unwrap_err();
        assert!(matches!(err, DateError::Malformed { form: DateForm::Day, .. }));
        assert!(err.to_string().contains("YYYY-MM-DD"));

        let err = parse("2018-13-30 16").unwrap_err();
        assert!(matches!(err, DateError::Malformed { form: DateForm::Hour, .. }));
        assert!(err.hint().is_some());
    }

    #[test]
    fn whole_days_count_exactly() {
        let now = utc(2020, 1, 11, 0, 0, 0);
        assert_eq!(days_since_at("2020-01-01", &now), 10);
        assert_eq!(days_since_at("2020-01-11", &now), 0);
    }

    #[test]
    fn partial_days_round_up() {
        // 9 days and 20 hours
        let now = utc(2020, 1, 10, 20, 0, 0);
        assert_eq!(days_since_at("2020-01-01", &now), 10);

        // one second in
        let now = utc(2020, 1, 1, 0, 0, 1);
        assert_eq!(days_since_at("2020-01-01", &now), 1);
    }

    #[test]
    fn future_dates_are_negative_and_round_toward_zero() {
        let now = utc(2020, 1, 1, 0, 0, 0);
        assert_eq!(days_since_at("2020-01-11", &now), -10);
        // 1.5 days ahead
        assert_eq!(days_since_at("2020-01-02 12", &now), -1);
    }

    #[test]
    fn time_components_are_honored() {
        let now = utc(2020, 1, 2, 16, 27, 43);
        assert_eq!(days_since_at("2020-01-01 16:27:43", &now), 1);
        assert_eq!(days_since_at("2020-01-01 16:27:44", &now), 1);
        assert_eq!(days_since_at("2020-01-01 16:27:42", &now), 2);
    }

    #[test]
    fn dates_are_read_in_the_clock_time_zone() {
        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2020, 1, 11, 0, 0, 0).unwrap();
        assert_eq!(days_since_at("2020-01-01", &now), 10);
    }

    #[test]
    fn unparseable_dates_give_the_sentinel() {
        let now = utc(2020, 1, 11, 0, 0, 0);
        assert_eq!(days_since_at("abc", &now), UNPARSEABLE_DAYS);
        assert_eq!(days_since_at("abcdefghij", &now), UNPARSEABLE_DAYS);
        assert!(is_unparseable(days_since("abc")));
        assert!(try_days_since_at("abc", &now).is_err());
    }

    #[test]
    fn real_counts_never_collide_with_the_sentinel() {
        let now = utc(2020, 1, 1, 0, 0, 0);
        let days = days_since_at("0001-01-01", &now);
        assert!(days > 700_000);
        assert!(!is_unparseable(days));
    }

    #[test]
    fn ceil_days_handles_signs() {
        assert_eq!(ceil_days(0), 0);
        assert_eq!(ceil_days(1), 1);
        assert_eq!(ceil_days(SECONDS_PER_DAY), 1);
        assert_eq!(ceil_days(-1), 0);
        assert_eq!(ceil_days(-SECONDS_PER_DAY - 1), -1);
    }
}
