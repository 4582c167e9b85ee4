use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use winnow::combinator::{alt, opt, preceded};
use winnow::error::{ErrMode, ModalResult};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use super::error::CertLogicError;

// -- Digits -----------------------------------------------------------------

fn two_digits(input: &mut &str) -> ModalResult<u32> {
    take_while(2, |c: char| c.is_ascii_digit())
        .try_map(|s: &str| s.parse::<u32>())
        .parse_next(input)
}

fn four_digits(input: &mut &str) -> ModalResult<i32> {
    take_while(4, |c: char| c.is_ascii_digit())
        .try_map(|s: &str| s.parse::<i32>())
        .parse_next(input)
}

// -- Dates ------------------------------------------------------------------

fn date(input: &mut &str) -> ModalResult<NaiveDate> {
    let (year, _, month, _, day) =
        (four_digits, '-', two_digits, '-', two_digits).parse_next(input)?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| ErrMode::from_input(input).cut())
}

/// Fractional seconds as nanoseconds; digits past the ninth are dropped.
fn fraction(input: &mut &str) -> ModalResult<u32> {
    let digits = preceded('.', take_while(1.., |c: char| c.is_ascii_digit())).parse_next(input)?;
    let nanos = digits
        .chars()
        .chain(std::iter::repeat('0'))
        .take(9)
        .fold(0_u32, |acc, c| acc * 10 + c.to_digit(10).unwrap_or(0));
    Ok(nanos)
}

/// `Z`, `±hh:mm`, `±hhmm` or `±hh`, as seconds east of UTC.
fn offset(input: &mut &str) -> ModalResult<FixedOffset> {
    let seconds = alt((
        'Z'.value(0_i32),
        (one_of(['+', '-']), two_digits, opt(':'), opt(two_digits)).map(
            |(sign, hours, _, minutes): (char, u32, Option<char>, Option<u32>)| {
                let magnitude = (hours * 3600 + minutes.unwrap_or(0) * 60) as i32;
                if sign == '-' {
                    -magnitude
                } else {
                    magnitude
                }
            },
        ),
    ))
    .parse_next(input)?;
    FixedOffset::east_opt(seconds).ok_or_else(|| ErrMode::from_input(input).cut())
}

fn time(input: &mut &str) -> ModalResult<(NaiveTime, Option<FixedOffset>)> {
    let (hour, _, minute, _, second, nanos, offset) = (
        two_digits,
        ':',
        two_digits,
        ':',
        two_digits,
        opt(fraction),
        opt(offset),
    )
        .parse_next(input)?;
    let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos.unwrap_or(0))
        .ok_or_else(|| ErrMode::from_input(input).cut())?;
    Ok((time, offset))
}

fn date_time(input: &mut &str) -> ModalResult<DateTime<FixedOffset>> {
    let day = date.parse_next(input)?;
    let (time, offset) = opt(preceded('T', time))
        .parse_next(input)?
        .unwrap_or((NaiveTime::MIN, None));
    let offset = offset.unwrap_or_else(|| Utc.fix());
    offset
        .from_local_datetime(&NaiveDateTime::new(day, time))
        .single()
        .ok_or_else(|| ErrMode::from_input(input).cut())
}

fn date_of_birth(input: &mut &str) -> ModalResult<NaiveDate> {
    let year = four_digits.parse_next(input)?;
    let month = opt(preceded('-', two_digits)).parse_next(input)?;
    let day = match month {
        Some(_) => opt(preceded('-', two_digits)).parse_next(input)?,
        None => None,
    };
    let date = match (month, day) {
        (Some(month), Some(day)) => NaiveDate::from_ymd_opt(year, month, day),
        (Some(month), None) => last_day_of_month(year, month),
        _ => NaiveDate::from_ymd_opt(year, 12, 31),
    };
    date.ok_or_else(|| ErrMode::from_input(input).cut())
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

// -- Entry points -----------------------------------------------------------

/// Parse `YYYY-MM-DD` or `YYYY-MM-DDThh:mm:ss[.fraction][offset]`.
/// Dates and date-times without an offset are taken to be UTC.
pub(crate) fn parse_date_time(text: &str) -> Result<DateTime<FixedOffset>, CertLogicError> {
    date_time
        .parse(text)
        .map_err(|_| CertLogicError::InvalidDateTime(text.to_owned()))
}

/// Parse a DCC date of birth (`YYYY`, `YYYY-MM` or `YYYY-MM-DD`) into the
/// latest date it can denote, at midnight UTC.
pub(crate) fn parse_date_of_birth(text: &str) -> Result<DateTime<FixedOffset>, CertLogicError> {
    let day = date_of_birth
        .parse(text)
        .map_err(|_| CertLogicError::InvalidDateOfBirth(text.to_owned()))?;
    Utc.fix()
        .from_local_datetime(&NaiveDateTime::new(day, NaiveTime::MIN))
        .single()
        .ok_or_else(|| CertLogicError::InvalidDateOfBirth(text.to_owned()))
}
