// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar arithmetic on plain civil fields.
//!
//! The calendar is proleptic with a Julian leap-year rule up to and including
//! 1752 and the Gregorian rule afterwards. Absolute day numbers are always
//! computed on the proleptic Gregorian calendar.

use std::collections::HashMap;

use crate::value::rrule::WeekDay;

/// Cumulative days before each month, indexed by `[leap][month - 1]`.
pub const DAYS_IN_YEAR_PASSED_MONTH: [[u16; 13]; 2] = [
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365],
    [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366],
];

const DAYS_IN_MONTH: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

const SECONDS_PER_DAY: i64 = 86_400;
const DAYS_PER_400_YEARS: i64 = 146_097;
const LAST_JULIAN_YEAR: i64 = 1752;

/// Whether `year` is a leap year.
#[must_use]
pub fn is_leap_year(year: i32) -> bool {
    is_leap_year_i64(i64::from(year))
}

fn is_leap_year_i64(year: i64) -> bool {
    if year <= LAST_JULIAN_YEAR {
        year % 4 == 0
    } else {
        (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
    }
}

/// Number of days in the given month. Returns 30 for a month outside `1..=12`.
#[must_use]
pub fn days_in_month(month: u8, year: i32) -> u8 {
    days_in_month_i64(i64::from(month), i64::from(year))
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn days_in_month_i64(month: i64, year: i64) -> u8 {
    match month {
        2 if is_leap_year_i64(year) => 29,
        1..=12 => DAYS_IN_MONTH.get(month as usize).copied().unwrap_or(30),
        _ => 30,
    }
}

fn passed_days(leap: bool) -> &'static [u16; 13] {
    let [common, leap_table] = &DAYS_IN_YEAR_PASSED_MONTH;
    if leap { leap_table } else { common }
}

/// Number of days in the given year.
#[must_use]
pub fn days_in_year(year: i32) -> u16 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Day of the year, starting at 1 for January 1st.
#[must_use]
pub fn day_of_year(year: i32, month: u8, day: u8) -> u16 {
    let passed = passed_days(is_leap_year(year))
        .get(usize::from(month.clamp(1, 12) - 1))
        .copied()
        .unwrap_or(0);
    passed + u16::from(day)
}

/// Day of the week numbered `1..=7`, where 1 is `week_start`.
///
/// Uses Zeller's congruence on the Gregorian calendar.
#[must_use]
pub fn day_of_week(year: i32, month: u8, day: u8, week_start: WeekDay) -> u8 {
    let (mut y, mut m) = (i64::from(year), i64::from(month));
    if m < 3 {
        m += 12;
        y -= 1;
    }
    let h = i64::from(day)
        + y
        + (26 * (m + 1)).div_euclid(10)
        + y.div_euclid(4)
        + 6 * y.div_euclid(100)
        + y.div_euclid(400);
    let dow = (h + 7 - i64::from(week_start.number())).rem_euclid(7) + 1;
    u8::try_from(dow).unwrap_or(1)
}

/// Day number since 1970-01-01 on the proleptic Gregorian calendar.
#[must_use]
pub fn epoch_day(year: i32, month: u8, day: u8) -> i64 {
    let (m, d) = (i64::from(month), i64::from(day));
    let y = i64::from(year) - i64::from(m <= 2);
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let mp = if m > 2 { m - 3 } else { m + 9 };
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * DAYS_PER_400_YEARS + doe - 719_468
}

/// Inverse of [`epoch_day`].
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn civil_from_epoch_day(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(DAYS_PER_400_YEARS);
    let doe = z - era * DAYS_PER_400_YEARS;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Resolve a day of year into `(year, month, day)`.
///
/// Values outside the year roll into the neighbouring years, so day 0 is the
/// last day of the previous year.
#[must_use]
pub fn from_day_of_year(day_of_year: i32, year: i32) -> (i32, u8, u8) {
    let mut year = year;
    let mut doy = day_of_year;
    loop {
        if doy < 1 {
            year = year.saturating_sub(1);
            doy += i32::from(days_in_year(year));
        } else if doy > i32::from(days_in_year(year)) {
            doy -= i32::from(days_in_year(year));
            year = year.saturating_add(1);
        } else {
            break;
        }
    }

    let table = passed_days(is_leap_year(year));
    for (month, passed) in (1..=12u8).zip(table.iter()).rev() {
        let passed = i32::from(*passed);
        if doy > passed {
            return (year, month, u8::try_from(doy - passed).unwrap_or(1));
        }
    }
    (year, 1, 1)
}

/// Day of year on which the week containing the date begins. May be zero or
/// negative when that week started in the previous year.
#[must_use]
pub fn start_doy_week(year: i32, month: u8, day: u8, week_start: WeekDay) -> i32 {
    let delta = i32::from(day_of_week(year, month, day, WeekDay::Sunday))
        - i32::from(week_start.number());
    let delta = if delta < 0 { delta + 7 } else { delta };
    i32::from(day_of_year(year, month, day)) - delta
}

/// Epoch day on which week 1 of `year` begins.
pub(crate) fn week_one_start(year: i32, week_start: WeekDay) -> i64 {
    let dow = i64::from(day_of_week(year, 1, 1, WeekDay::Sunday));
    let wkst = i64::from(week_start.number());
    let thursday = i64::from(WeekDay::Thursday.number());
    let mut offset = 0;
    if dow > thursday {
        offset += 7;
    }
    if wkst > thursday {
        offset -= 7;
    }
    offset -= dow - wkst;
    epoch_day(year, 1, 1) + offset
}

/// ISO 8601 week number, counting weeks from `week_start`.
///
/// Dates at the start of January may belong to the last week of the previous
/// year, and dates after December 25th to the first week of the next one.
#[must_use]
pub fn week_number(year: i32, month: u8, day: u8, week_start: WeekDay) -> u8 {
    let today = epoch_day(year, month, day);
    let week1 = if month == 12 && day > 25 {
        let next = week_one_start(year.saturating_add(1), week_start);
        if today < next {
            week_one_start(year, week_start)
        } else {
            next
        }
    } else {
        let current = week_one_start(year, week_start);
        if today < current {
            week_one_start(year.saturating_sub(1), week_start)
        } else {
            current
        }
    };
    u8::try_from((today - week1) / 7 + 1).unwrap_or(1)
}

/// Number of ISO weeks in the year: 53 when January 1st is a Thursday, or a
/// Wednesday in a leap year.
#[must_use]
pub fn weeks_in_year(year: i32) -> u8 {
    let jan1 = day_of_week(year, 1, 1, WeekDay::Sunday);
    let thursday = WeekDay::Thursday.number();
    let wednesday = WeekDay::Wednesday.number();
    if jan1 == thursday || (is_leap_year(year) && jan1 == wednesday) {
        53
    } else {
        52
    }
}

/// Day of month of the `pos`-th `weekday` in the month. Negative positions
/// count from the end of the month and zero means the first one.
///
/// The result is not clamped, it may fall outside the month.
#[must_use]
pub fn nth_week_day(year: i32, month: u8, weekday: WeekDay, pos: i32) -> i32 {
    let dim = i32::from(days_in_month(month, year));
    let dow = i32::from(weekday.number());
    if pos >= 0 {
        let start_dow = i32::from(day_of_week(year, month, 1, WeekDay::Sunday));
        let first = 1 + (dow - start_dow + 7) % 7;
        first + (pos - 1).max(0) * 7
    } else {
        let end_dow = i32::from(day_of_week(year, month, days_in_month(month, year), WeekDay::Sunday));
        let last = dim - (end_dow - dow + 7) % 7;
        last + (pos + 1) * 7
    }
}

/// Dominical letter(s) of a year, two letters for leap years.
#[must_use]
pub fn dominical_letter(year: i32) -> &'static str {
    const LETTERS: [&str; 7] = ["G", "F", "E", "D", "C", "B", "A"];
    const LEAP_LETTERS: [&str; 7] = ["AG", "GF", "FE", "ED", "DC", "CB", "BA"];

    let y = i64::from(year);
    let dom = (y + y.div_euclid(4) + y.div_euclid(400) - y.div_euclid(100) - 1).rem_euclid(7);
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let dom = dom as usize;
    let letters = if is_leap_year(year) {
        &LEAP_LETTERS
    } else {
        &LETTERS
    };
    letters.get(dom).copied().unwrap_or_default()
}

/// Civil date and time fields, always kept in canonical range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CivilDateTime {
    /// Year
    pub year: i32,
    /// Month, `1..=12`
    pub month: u8,
    /// Day of month
    pub day: u8,
    /// Hour, `0..=23`
    pub hour: u8,
    /// Minute, `0..=59`
    pub minute: u8,
    /// Second, `0..=59`
    pub second: u8,
}

impl CivilDateTime {
    /// Build canonical fields from arbitrary, possibly out-of-range parts.
    ///
    /// Time parts carry into days unless `date_only` is set, in which case
    /// they are discarded. Month overflow is folded into the year before the
    /// day is carried month by month.
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn normalized(
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
        second: i64,
        date_only: bool,
    ) -> Self {
        let (mut hour_out, mut minute_out, mut second_out) = (0, 0, 0);
        let mut days_overflow = 0;
        if !date_only {
            let minutes = minute.saturating_add(second.div_euclid(60));
            second_out = second.rem_euclid(60);
            let hours = hour.saturating_add(minutes.div_euclid(60));
            minute_out = minutes.rem_euclid(60);
            days_overflow = hours.div_euclid(24);
            hour_out = hours.rem_euclid(24);
        }

        let years_overflow = if month > 12 {
            (month - 1) / 12
        } else if month < 1 {
            month / 12 - 1
        } else {
            0
        };
        let mut year = year.saturating_add(years_overflow);
        let mut month = month - 12 * years_overflow;
        let mut day = day.saturating_add(days_overflow);

        if day > 0 {
            skip_years_forward(&mut year, month, &mut day);
            loop {
                let dim = i64::from(days_in_month_i64(month, year));
                if day <= dim {
                    break;
                }
                day -= dim;
                month += 1;
                if month > 12 {
                    year += 1;
                    month = 1;
                }
            }
        } else {
            skip_years_backward(&mut year, month, &mut day);
            while day <= 0 {
                if month == 1 {
                    year -= 1;
                    month = 12;
                } else {
                    month -= 1;
                }
                day += i64::from(days_in_month_i64(month, year));
            }
        }

        Self {
            year: clamp_year(year),
            month: month as u8,
            day: day as u8,
            hour: hour_out as u8,
            minute: minute_out as u8,
            second: second_out as u8,
        }
    }

    /// Shift by the given amounts and re-normalize.
    #[must_use]
    pub fn adjust(self, days: i64, hours: i64, minutes: i64, seconds: i64, date_only: bool) -> Self {
        Self::normalized(
            i64::from(self.year),
            i64::from(self.month),
            i64::from(self.day).saturating_add(days),
            i64::from(self.hour).saturating_add(hours),
            i64::from(self.minute).saturating_add(minutes),
            i64::from(self.second).saturating_add(seconds),
            date_only,
        )
    }

    /// Seconds since the epoch, reading the fields as UTC wall-clock time.
    #[must_use]
    pub fn local_seconds(&self) -> i64 {
        epoch_day(self.year, self.month, self.day) * SECONDS_PER_DAY
            + i64::from(self.hour) * 3600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }

    /// Inverse of [`CivilDateTime::local_seconds`].
    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_local_seconds(seconds: i64) -> Self {
        let (year, month, day) = civil_from_epoch_day(seconds.div_euclid(SECONDS_PER_DAY));
        let secs = seconds.rem_euclid(SECONDS_PER_DAY);
        Self {
            year: clamp_year(year),
            month,
            day,
            hour: (secs / 3600) as u8,
            minute: (secs % 3600 / 60) as u8,
            second: (secs % 60) as u8,
        }
    }
}

#[expect(clippy::cast_possible_truncation)]
fn clamp_year(year: i64) -> i32 {
    year.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Days from `(year, month, 1)` to `(year + 1, month, 1)`.
fn days_in_span_forward(year: i64, month: i64) -> i64 {
    let leap_year = if month <= 2 { year } else { year + 1 };
    if is_leap_year_i64(leap_year) { 366 } else { 365 }
}

/// Days from `(year - 1, month, 1)` to `(year, month, 1)`.
fn days_in_span_backward(year: i64, month: i64) -> i64 {
    let leap_year = if month <= 2 { year - 1 } else { year };
    if is_leap_year_i64(leap_year) { 366 } else { 365 }
}

fn skip_years_forward(year: &mut i64, month: i64, day: &mut i64) {
    if *year > LAST_JULIAN_YEAR && *day > DAYS_PER_400_YEARS {
        let cycles = (*day - 1) / DAYS_PER_400_YEARS;
        *day -= cycles * DAYS_PER_400_YEARS;
        *year = year.saturating_add(cycles * 400);
    }
    loop {
        let span = days_in_span_forward(*year, month);
        if *day <= span {
            break;
        }
        *day -= span;
        *year += 1;
    }
}

fn skip_years_backward(year: &mut i64, month: i64, day: &mut i64) {
    if *year - 400 > LAST_JULIAN_YEAR && *day < -DAYS_PER_400_YEARS {
        let max_cycles = (*year - LAST_JULIAN_YEAR - 1) / 400;
        let cycles = ((-*day) / DAYS_PER_400_YEARS).min(max_cycles);
        *day += cycles * DAYS_PER_400_YEARS;
        *year -= cycles * 400;
    }
    loop {
        let span = days_in_span_backward(*year, month);
        if *day > -span {
            break;
        }
        *day += span;
        *year -= 1;
    }
}

/// Bounded memo for weekday and week-number lookups, keyed by packed date
/// fields. Owned by whoever iterates, never shared.
#[derive(Debug, Clone, Default)]
pub struct DateCache {
    day_of_week: HashMap<i64, u8>,
    week_number: HashMap<i64, u8>,
}

impl DateCache {
    const CAPACITY: usize = 4096;

    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(year: i32, month: u8, day: u8, week_start: WeekDay) -> i64 {
        (i64::from(year) << 12)
            + (i64::from(month) << 8)
            + (i64::from(day) << 3)
            + i64::from(week_start.number())
    }

    /// Cached [`day_of_week`].
    pub fn day_of_week(&mut self, year: i32, month: u8, day: u8, week_start: WeekDay) -> u8 {
        let key = Self::key(year, month, day, week_start);
        if let Some(dow) = self.day_of_week.get(&key) {
            return *dow;
        }
        if self.day_of_week.len() >= Self::CAPACITY {
            self.day_of_week.clear();
        }
        let dow = day_of_week(year, month, day, week_start);
        self.day_of_week.insert(key, dow);
        dow
    }

    /// Cached [`week_number`].
    pub fn week_number(&mut self, year: i32, month: u8, day: u8, week_start: WeekDay) -> u8 {
        let key = Self::key(year, month, day, week_start);
        if let Some(week) = self.week_number.get(&key) {
            return *week;
        }
        if self.week_number.len() >= Self::CAPACITY {
            self.week_number.clear();
        }
        let week = week_number(year, month, day, week_start);
        self.week_number.insert(key, week);
        week
    }

    /// Number of memoized entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.day_of_week.len() + self.week_number.len()
    }

    /// Whether nothing is memoized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
