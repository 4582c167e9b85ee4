use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone};

use super::error::CertLogicError;

/// Units accepted by `plusTime`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimeUnit {
    Year,
    Month,
    Day,
    Hour,
}

impl FromStr for TimeUnit {
    type Err = CertLogicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "year" => Ok(TimeUnit::Year),
            "month" => Ok(TimeUnit::Month),
            "day" => Ok(TimeUnit::Day),
            "hour" => Ok(TimeUnit::Hour),
            _ => Err(CertLogicError::PlusTimeUnit),
        }
    }
}

/// Add `amount` units to `date_time`, keeping its offset.
///
/// Year and month arithmetic keeps the day of month and lets it roll over
/// into the following month when the target month is shorter
/// (2021-01-31 plus one month is 2021-03-03).
pub(crate) fn plus_time(
    date_time: DateTime<FixedOffset>,
    amount: i64,
    unit: TimeUnit,
) -> Result<DateTime<FixedOffset>, CertLogicError> {
    match unit {
        TimeUnit::Hour => Duration::try_hours(amount)
            .and_then(|d| date_time.checked_add_signed(d))
            .ok_or(CertLogicError::DateTimeOutOfRange),
        TimeUnit::Day => Duration::try_days(amount)
            .and_then(|d| date_time.checked_add_signed(d))
            .ok_or(CertLogicError::DateTimeOutOfRange),
        TimeUnit::Month => plus_months(date_time, amount),
        TimeUnit::Year => amount
            .checked_mul(12)
            .ok_or(CertLogicError::DateTimeOutOfRange)
            .and_then(|months| plus_months(date_time, months)),
    }
}

fn plus_months(
    date_time: DateTime<FixedOffset>,
    months: i64,
) -> Result<DateTime<FixedOffset>, CertLogicError> {
    let local = date_time.naive_local();
    let month_index = i64::from(local.year()) * 12 + i64::from(local.month0());
    let target = month_index
        .checked_add(months)
        .ok_or(CertLogicError::DateTimeOutOfRange)?;
    let year = i32::try_from(target.div_euclid(12)).map_err(|_| CertLogicError::DateTimeOutOfRange)?;
    let month0 = u32::try_from(target.rem_euclid(12)).map_err(|_| CertLogicError::DateTimeOutOfRange)?;

    let day = NaiveDate::from_ymd_opt(year, month0 + 1, 1)
        .and_then(|first| first.checked_add_signed(Duration::days(i64::from(local.day0()))))
        .ok_or(CertLogicError::DateTimeOutOfRange)?;

    date_time
        .offset()
        .from_local_datetime(&day.and_time(local.time()))
        .single()
        .ok_or(CertLogicError::DateTimeOutOfRange)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certlogic::grammar::parse_date_time;

    fn add(text: &str, amount: i64, unit: TimeUnit) -> String {
        plus_time(parse_date_time(text).unwrap(), amount, unit)
            .unwrap()
            .to_rfc3339()
    }

    #[test]
    fn unit_from_str() {
        assert_eq!("year".parse::<TimeUnit>(), Ok(TimeUnit::Year));
        assert_eq!("hour".parse::<TimeUnit>(), Ok(TimeUnit::Hour));
        assert_eq!(
            "minute".parse::<TimeUnit>(),
            Err(CertLogicError::PlusTimeUnit)
        );
    }

    #[test]
    fn hours_and_days() {
        assert_eq!(
            add("2021-06-01T22:00:00Z", 3, TimeUnit::Hour),
            "2021-06-02T01:00:00+00:00"
        );
        assert_eq!(
            add("2021-02-18", 270, TimeUnit::Day),
            "2021-11-15T00:00:00+00:00"
        );
        assert_eq!(
            add("2021-03-01", -1, TimeUnit::Day),
            "2021-02-28T00:00:00+00:00"
        );
    }

    #[test]
    fn months_roll_over_short_months() {
        assert_eq!(
            add("2021-01-31", 1, TimeUnit::Month),
            "2021-03-03T00:00:00+00:00"
        );
        assert_eq!(
            add("2021-11-15", 3, TimeUnit::Month),
            "2022-02-15T00:00:00+00:00"
        );
        assert_eq!(
            add("2021-03-15", -4, TimeUnit::Month),
            "2020-11-15T00:00:00+00:00"
        );
    }

    #[test]
    fn years_keep_offset_and_time() {
        assert_eq!(
            add("2020-02-29T10:00:00+02:00", 1, TimeUnit::Year),
            "2021-03-01T10:00:00+02:00"
        );
        assert_eq!(
            add("1998-02-26", 18, TimeUnit::Year),
            "2016-02-26T00:00:00+00:00"
        );
    }

    #[test]
    fn zero_amount_is_identity() {
        assert_eq!(
            add("2021-06-01T12:00:00.000Z", 0, TimeUnit::Day),
            "2021-06-01T12:00:00+00:00"
        );
    }

    #[test]
    fn out_of_range() {
        let dt = parse_date_time("2021-06-01").unwrap();
        assert_eq!(
            plus_time(dt, i64::MAX, TimeUnit::Year),
            Err(CertLogicError::DateTimeOutOfRange)
        );
        assert_eq!(
            plus_time(dt, i64::MAX, TimeUnit::Hour),
            Err(CertLogicError::DateTimeOutOfRange)
        );
    }
}
