use chrono::offset::FixedOffset;
use chrono::{DateTime, Datelike, Month, NaiveDate, TimeZone, Weekday};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::combinator::map;
use nom::combinator::opt;
use nom::combinator::value;
use nom::multi::fold_many_m_n;
use nom::sequence::preceded;
use nom::sequence::terminated;
use nom::sequence::tuple;
use nom::IResult;
use thiserror::Error;

use super::cfws;
use super::fws;
use super::satisfy_byte;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateTimeError {
    #[error("no such date: {y}-{m:?}-{d}")]
    BadDate { y: u32, m: Month, d: u8 },
    #[error("time zone offset out of range: {hh:02}{mm:02} (east: {is_east})")]
    BadTZOffset { is_east: bool, hh: u8, mm: u8 },
    #[error("no such time on {date}: {h:02}:{m:02} (seconds: {s:?})")]
    BadDateTime {
        date: NaiveDate,
        h: u8,
        m: u8,
        s: Option<u8>,
    },
    #[error("year {0} has more than four digits")]
    YearOutOfRange(u32),
    #[error("{date_time} is not a {weekday:?}")]
    BadWeekday {
        date_time: DateTime<FixedOffset>,
        weekday: Weekday,
    },
}

// RFC 5322 writes the year with four digits; later years cannot be sent.
const MAX_YEAR: u32 = 9999;

/// The raw pieces of a date-time, before calendar validation.
#[derive(Debug, Clone, Copy)]
pub struct RawDateTime {
    weekday: Option<Weekday>,
    day: u8,
    month: Month,
    year: u32,
    h: u8,
    m: u8,
    s: Option<u8>,
    is_east: bool,
    hh: u8,
    mm: u8,
}

fn day_of_week(input: &[u8]) -> IResult<&[u8], Weekday> {
    preceded(
        opt(cfws),
        alt((
            value(Weekday::Mon, tag(b"Mon")),
            value(Weekday::Tue, tag(b"Tue")),
            value(Weekday::Wed, tag(b"Wed")),
            value(Weekday::Thu, tag(b"Thu")),
            value(Weekday::Fri, tag(b"Fri")),
            value(Weekday::Sat, tag(b"Sat")),
            value(Weekday::Sun, tag(b"Sun")),
        )),
    )(input)
}

fn month(input: &[u8]) -> IResult<&[u8], Month> {
    alt((
        value(Month::January, tag(b"Jan")),
        value(Month::February, tag(b"Feb")),
        value(Month::March, tag(b"Mar")),
        value(Month::April, tag(b"Apr")),
        value(Month::May, tag(b"May")),
        value(Month::June, tag(b"Jun")),
        value(Month::July, tag(b"Jul")),
        value(Month::August, tag(b"Aug")),
        value(Month::September, tag(b"Sep")),
        value(Month::October, tag(b"Oct")),
        value(Month::November, tag(b"Nov")),
        value(Month::December, tag(b"Dec")),
    ))(input)
}

fn day(input: &[u8]) -> IResult<&[u8], u8> {
    map(
        tuple((
            opt(cfws),
            fold_many_m_n(1, 2, satisfy_byte(|ch| ch.is_ascii_digit()), 0, |acc, n| {
                acc * 10 + (n - b'0')
            }),
            fws,
        )),
        |(_, day, _)| day,
    )(input)
}

fn year(input: &[u8]) -> IResult<&[u8], u32> {
    map(
        tuple((
            fws,
            // 9-digit years should be enough for anyone
            fold_many_m_n(4, 9, satisfy_byte(|ch| ch.is_ascii_digit()), 0, |acc, n| {
                acc * 10 + (n - b'0') as u32
            }),
            fws,
        )),
        |(_, year, _)| year,
    )(input)
}

fn two_digit(input: &[u8]) -> IResult<&[u8], u8> {
    fold_many_m_n(2, 2, satisfy_byte(|ch| ch.is_ascii_digit()), 0, |acc, n| {
        acc * 10 + (n - b'0')
    })(input)
}

fn time_of_day(input: &[u8]) -> IResult<&[u8], (u8, u8, Option<u8>)> {
    map(
        tuple((
            two_digit,
            tag(b":"),
            two_digit,
            opt(preceded(tag(b":"), two_digit)),
        )),
        |(h, _, m, s)| (h, m, s),
    )(input)
}

fn zone(input: &[u8]) -> IResult<&[u8], (bool, u8, u8)> {
    map(
        tuple((
            fws,
            alt((value(true, tag(b"+")), value(false, tag(b"-")))),
            two_digit,
            two_digit,
        )),
        |(_, is_east, hh, mm)| (is_east, hh, mm),
    )(input)
}

/// `[day-of-week ","] date time [CFWS]`, syntax only.
pub fn date_time(input: &[u8]) -> IResult<&[u8], RawDateTime> {
    map(
        tuple((
            opt(terminated(day_of_week, tag(b","))),
            day,
            month,
            year,
            time_of_day,
            zone,
            opt(cfws),
        )),
        |(weekday, day, month, year, (h, m, s), (is_east, hh, mm), _)| RawDateTime {
            weekday,
            day,
            month,
            year,
            h,
            m,
            s,
            is_east,
            hh,
            mm,
        },
    )(input)
}

impl RawDateTime {
    /// Checks the calendar: the date exists, the offset is in range and the
    /// weekday, if given, agrees with the date.
    pub fn resolve(self) -> Result<DateTime<FixedOffset>, DateTimeError> {
        let RawDateTime {
            weekday,
            day,
            month,
            year,
            h,
            m,
            s,
            is_east,
            hh,
            mm,
        } = self;
        if year > MAX_YEAR {
            return Err(DateTimeError::YearOutOfRange(year));
        }
        let date = i32::try_from(year)
            .ok()
            .and_then(|y| NaiveDate::from_ymd_opt(y, month.number_from_month(), day as u32))
            .ok_or(DateTimeError::BadDate {
                y: year,
                m: month,
                d: day,
            })?;
        let offset_seconds = hh as i32 * 3600 + mm as i32 * 60;
        let tz = if is_east {
            FixedOffset::east_opt(offset_seconds)
        } else {
            FixedOffset::west_opt(offset_seconds)
        }
        .ok_or(DateTimeError::BadTZOffset { is_east, hh, mm })?;
        let date_time = date
            .and_hms_opt(h as u32, m as u32, s.unwrap_or(0) as u32)
            .and_then(|naive| tz.from_local_datetime(&naive).single())
            .ok_or(DateTimeError::BadDateTime { date, h, m, s })?;
        if let Some(weekday) = weekday {
            if date_time.weekday() != weekday {
                return Err(DateTimeError::BadWeekday { date_time, weekday });
            }
        }
        Ok(date_time)
    }
}
