// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Date and date-time values as defined in RFC 5545 Sections 3.3.4 and 3.3.5.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::sync::OnceLock;

use crate::timezone::Zone;
use crate::value::calendar::{self, CivilDateTime};
use crate::value::duration::ValueDuration;
use crate::value::rrule::WeekDay;

/// Date or date-time value bound to a zone.
///
/// The value is immutable and its fields are always canonical: every
/// constructor carries out-of-range parts into the larger units. Values are
/// ordered by the instant they denote, so two values in different zones can
/// compare equal.
#[derive(Debug, Clone)]
pub struct ValueDateTime {
    civil: CivilDateTime,
    is_date: bool,
    zone: Zone,
    instant: OnceLock<i64>,
}

impl ValueDateTime {
    /// Floating date-only value.
    #[must_use]
    pub fn date(year: i32, month: u8, day: u8) -> Self {
        Self::from_parts(
            i64::from(year),
            i64::from(month),
            i64::from(day),
            0,
            0,
            0,
            true,
            Zone::Floating,
        )
    }

    /// Floating date-time value.
    #[must_use]
    pub fn date_time(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self::from_parts(
            i64::from(year),
            i64::from(month),
            i64::from(day),
            i64::from(hour),
            i64::from(minute),
            i64::from(second),
            false,
            Zone::Floating,
        )
    }

    /// Build from arbitrary field values, carrying overflow into larger units.
    #[must_use]
    #[expect(clippy::too_many_arguments)]
    pub fn from_parts(
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
        second: i64,
        is_date: bool,
        zone: Zone,
    ) -> Self {
        let civil = CivilDateTime::normalized(year, month, day, hour, minute, second, is_date);
        Self::from_civil(civil, is_date, zone)
    }

    pub(crate) fn from_civil(civil: CivilDateTime, is_date: bool, zone: Zone) -> Self {
        let civil = if is_date {
            CivilDateTime {
                hour: 0,
                minute: 0,
                second: 0,
                ..civil
            }
        } else {
            civil
        };
        Self {
            civil,
            is_date,
            zone,
            instant: OnceLock::new(),
        }
    }

    /// UTC date-time at the given number of seconds since the epoch.
    #[must_use]
    pub fn from_unix_time(seconds: i64) -> Self {
        Self::from_civil(CivilDateTime::from_local_seconds(seconds), false, Zone::Utc)
    }

    /// Floating date for the given day of the year. Days outside the year
    /// roll into the neighbouring years.
    #[must_use]
    pub fn from_day_of_year(day_of_year: i32, year: i32) -> Self {
        let (year, month, day) = calendar::from_day_of_year(day_of_year, year);
        Self::date(year, month, day)
    }

    /// The same wall-clock fields, with fields carried again.
    #[must_use]
    pub fn normalize(&self) -> Self {
        let c = self.civil;
        Self::from_parts(
            i64::from(c.year),
            i64::from(c.month),
            i64::from(c.day),
            i64::from(c.hour),
            i64::from(c.minute),
            i64::from(c.second),
            self.is_date,
            self.zone.clone(),
        )
    }

    /// Year
    #[must_use]
    pub fn year(&self) -> i32 {
        self.civil.year
    }

    /// Month, `1..=12`
    #[must_use]
    pub fn month(&self) -> u8 {
        self.civil.month
    }

    /// Day of month
    #[must_use]
    pub fn day(&self) -> u8 {
        self.civil.day
    }

    /// Hour, zero for dates
    #[must_use]
    pub fn hour(&self) -> u8 {
        self.civil.hour
    }

    /// Minute, zero for dates
    #[must_use]
    pub fn minute(&self) -> u8 {
        self.civil.minute
    }

    /// Second, zero for dates
    #[must_use]
    pub fn second(&self) -> u8 {
        self.civil.second
    }

    /// Whether this is a date without time.
    #[must_use]
    pub fn is_date(&self) -> bool {
        self.is_date
    }

    /// The zone the wall-clock fields are expressed in.
    #[must_use]
    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Canonical civil fields.
    #[must_use]
    pub fn civil(&self) -> CivilDateTime {
        self.civil
    }

    /// Same wall-clock fields in another zone.
    #[must_use]
    pub fn with_zone(&self, zone: Zone) -> Self {
        Self::from_civil(self.civil, self.is_date, zone)
    }

    /// Toggle the date-only flag. Time fields are dropped for dates.
    #[must_use]
    pub fn with_date_only(&self, is_date: bool) -> Self {
        Self::from_civil(self.civil, is_date, self.zone.clone())
    }

    /// Replace the year, keeping month and day when valid.
    #[must_use]
    pub fn with_year(&self, year: i32) -> Self {
        self.with_fields(
            i64::from(year),
            i64::from(self.month()),
            i64::from(self.day()),
        )
    }

    /// Replace the month, carrying an invalid day into the next month.
    #[must_use]
    pub fn with_month(&self, month: i64) -> Self {
        self.with_fields(i64::from(self.year()), month, i64::from(self.day()))
    }

    /// Replace the day, carrying overflow into the neighbouring months.
    #[must_use]
    pub fn with_day(&self, day: i64) -> Self {
        self.with_fields(i64::from(self.year()), i64::from(self.month()), day)
    }

    /// Replace the time of day. Setting a time on a date turns it into a
    /// date-time.
    #[must_use]
    pub fn with_time(&self, hour: i64, minute: i64, second: i64) -> Self {
        Self::from_parts(
            i64::from(self.year()),
            i64::from(self.month()),
            i64::from(self.day()),
            hour,
            minute,
            second,
            false,
            self.zone.clone(),
        )
    }

    fn with_fields(&self, year: i64, month: i64, day: i64) -> Self {
        Self::from_parts(
            year,
            month,
            day,
            i64::from(self.hour()),
            i64::from(self.minute()),
            i64::from(self.second()),
            self.is_date,
            self.zone.clone(),
        )
    }

    /// Day of the week numbered `1..=7`, where 1 is `week_start`.
    #[must_use]
    pub fn day_of_week(&self, week_start: WeekDay) -> u8 {
        calendar::day_of_week(self.year(), self.month(), self.day(), week_start)
    }

    /// Day of the week.
    #[must_use]
    pub fn weekday(&self) -> WeekDay {
        WeekDay::from_number(i32::from(self.day_of_week(WeekDay::Sunday)))
    }

    /// Day of the year, starting at 1.
    #[must_use]
    pub fn day_of_year(&self) -> u16 {
        calendar::day_of_year(self.year(), self.month(), self.day())
    }

    /// ISO week number, counting weeks from `week_start`.
    #[must_use]
    pub fn week_number(&self, week_start: WeekDay) -> u8 {
        calendar::week_number(self.year(), self.month(), self.day(), week_start)
    }

    /// Day of year on which the week containing this date begins.
    #[must_use]
    pub fn start_doy_week(&self, week_start: WeekDay) -> i32 {
        calendar::start_doy_week(self.year(), self.month(), self.day(), week_start)
    }

    /// Day of month of the `pos`-th `weekday` in this month, unclamped.
    #[must_use]
    pub fn nth_week_day(&self, weekday: WeekDay, pos: i32) -> i32 {
        calendar::nth_week_day(self.year(), self.month(), weekday, pos)
    }

    /// Whether this date is the `pos`-th `weekday` of its month. A zero
    /// position matches any `weekday`.
    #[must_use]
    pub fn is_nth_week_day(&self, weekday: WeekDay, pos: i32) -> bool {
        if pos == 0 && self.weekday() == weekday {
            return true;
        }
        self.nth_week_day(weekday, pos) == i32::from(self.day())
    }

    /// First day of the week containing this date, as a date.
    #[must_use]
    pub fn start_of_week(&self, week_start: WeekDay) -> Self {
        let back = (i64::from(self.day_of_week(WeekDay::Sunday)) + 7
            - i64::from(week_start.number()))
            % 7;
        self.with_day(i64::from(self.day()) - back)
            .with_date_only(true)
    }

    /// Last day of the week containing this date, as a date.
    #[must_use]
    pub fn end_of_week(&self, week_start: WeekDay) -> Self {
        let forward = (7 - i64::from(self.day_of_week(WeekDay::Sunday))
            + i64::from(week_start.number())
            - 1)
            % 7;
        self.with_day(i64::from(self.day()) + forward)
            .with_date_only(true)
    }

    /// First day of the month, as a date.
    #[must_use]
    pub fn start_of_month(&self) -> Self {
        self.with_day(1).with_date_only(true)
    }

    /// Last day of the month, as a date.
    #[must_use]
    pub fn end_of_month(&self) -> Self {
        let dim = calendar::days_in_month(self.month(), self.year());
        self.with_day(i64::from(dim)).with_date_only(true)
    }

    /// First day of the year, as a date.
    #[must_use]
    pub fn start_of_year(&self) -> Self {
        self.with_fields(i64::from(self.year()), 1, 1)
            .with_date_only(true)
    }

    /// Last day of the year, as a date.
    #[must_use]
    pub fn end_of_year(&self) -> Self {
        self.with_fields(i64::from(self.year()), 12, 31)
            .with_date_only(true)
    }

    /// Offset from UTC in seconds, zero for floating and UTC values.
    #[must_use]
    pub fn utc_offset(&self) -> i32 {
        self.zone.utc_offset(&self.civil)
    }

    /// Seconds since the epoch of the instant this value denotes.
    ///
    /// Floating values are read as UTC.
    #[must_use]
    pub fn to_unix_time(&self) -> i64 {
        *self
            .instant
            .get_or_init(|| self.civil.local_seconds() - i64::from(self.utc_offset()))
    }

    /// Add a duration, carrying through every field.
    ///
    /// Dates keep only the whole-day part of the result.
    #[must_use]
    pub fn add_duration(&self, duration: &ValueDuration) -> Self {
        let sign = duration.sign();
        let part = |v: u64| i64::try_from(v).unwrap_or(i64::MAX).saturating_mul(sign);
        let days = part(duration.days).saturating_add(part(duration.weeks).saturating_mul(7));
        let civil = self.civil.adjust(
            days,
            part(duration.hours),
            part(duration.minutes),
            part(duration.seconds),
            false,
        );
        Self::from_civil(civil, self.is_date, self.zone.clone())
    }

    /// Wall-clock difference `self - other`, ignoring both zones.
    #[must_use]
    pub fn subtract_date(&self, other: &ValueDateTime) -> ValueDuration {
        ValueDuration::from_seconds(self.civil.local_seconds() - other.civil.local_seconds())
    }

    /// Elapsed time `self - other` between the two instants.
    #[must_use]
    pub fn subtract_date_tz(&self, other: &ValueDateTime) -> ValueDuration {
        ValueDuration::from_seconds(self.to_unix_time() - other.to_unix_time())
    }

    /// The same instant expressed in another zone.
    ///
    /// Dates and floating values are only relabelled.
    #[must_use]
    pub fn convert_to_zone(&self, zone: &Zone) -> Self {
        if self.is_date
            || self.zone.tzid() == zone.tzid()
            || self.zone.is_floating()
            || zone.is_floating()
        {
            return self.with_zone(zone.clone());
        }

        let utc = self
            .civil
            .adjust(0, 0, 0, -i64::from(self.utc_offset()), false);
        let offset = zone.utc_offset(&utc);
        let local = utc.adjust(0, 0, 0, i64::from(offset), false);
        Self::from_civil(local, false, zone.clone())
    }

    /// Compare calendar dates after converting both values into `zone`.
    #[must_use]
    pub fn compare_date_only_tz(&self, other: &ValueDateTime, zone: &Zone) -> Ordering {
        let a = self.convert_to_zone(zone);
        let b = other.convert_to_zone(zone);
        (a.year(), a.month(), a.day()).cmp(&(b.year(), b.month(), b.day()))
    }

    /// Convert to `jiff::civil::DateTime`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is outside jiff's supported range.
    #[cfg(feature = "jiff")]
    pub fn civil_date_time(&self) -> Result<jiff::civil::DateTime, jiff::Error> {
        self.try_into()
    }
}

impl PartialEq for ValueDateTime {
    fn eq(&self, other: &Self) -> bool {
        self.to_unix_time() == other.to_unix_time()
    }
}

impl Eq for ValueDateTime {}

impl PartialOrd for ValueDateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ValueDateTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_unix_time().cmp(&other.to_unix_time())
    }
}

impl Display for ValueDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::formatter::write_date_time(f, self)
    }
}

#[cfg(feature = "jiff")]
fn jiff_year(year: i32) -> i16 {
    // jiff rejects anything past 9999, so out-of-range years fail there.
    i16::try_from(year).unwrap_or(i16::MAX)
}

#[cfg(feature = "jiff")]
impl TryFrom<&ValueDateTime> for jiff::civil::DateTime {
    type Error = jiff::Error;

    #[expect(clippy::cast_possible_wrap)]
    fn try_from(value: &ValueDateTime) -> Result<Self, Self::Error> {
        jiff::civil::DateTime::new(
            jiff_year(value.year()),
            value.month() as i8,
            value.day() as i8,
            value.hour() as i8,
            value.minute() as i8,
            value.second() as i8,
            0,
        )
    }
}

#[cfg(feature = "jiff")]
impl TryFrom<&ValueDateTime> for jiff::civil::Date {
    type Error = jiff::Error;

    #[expect(clippy::cast_possible_wrap)]
    fn try_from(value: &ValueDateTime) -> Result<Self, Self::Error> {
        jiff::civil::Date::new(
            jiff_year(value.year()),
            value.month() as i8,
            value.day() as i8,
        )
    }
}
