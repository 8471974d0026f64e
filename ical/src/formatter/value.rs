// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Formatters for temporal property values.

use std::fmt::{self, Display, Write};

use crate::keyword::{
    KW_RRULE_BYDAY, KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY,
    KW_RRULE_BYSECOND, KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT,
    KW_RRULE_FREQ, KW_RRULE_INTERVAL, KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::value::{ValueDateTime, ValueDuration, ValueRecurrenceRule, ValueUtcOffset};

/// Format a date as `YYYYMMDD` or a date-time as `YYYYMMDDTHHMMSS[Z]`.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_date_time<W: Write>(f: &mut W, datetime: &ValueDateTime) -> fmt::Result {
    write!(
        f,
        "{:04}{:02}{:02}",
        datetime.year(),
        datetime.month(),
        datetime.day()
    )?;
    if datetime.is_date() {
        return Ok(());
    }

    let utc = if datetime.zone().is_utc() { "Z" } else { "" };
    write!(
        f,
        "T{:02}{:02}{:02}{utc}",
        datetime.hour(),
        datetime.minute(),
        datetime.second()
    )
}

/// Format a duration value as `P[n]W` or `P[n]DT[n]H[n]M[n]S` (RFC 5545 Section 3.3.6).
///
/// Weeks are only written on their own, mixed durations fold them into days.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_duration<W: Write>(f: &mut W, duration: &ValueDuration) -> fmt::Result {
    if duration.is_zero() {
        return write!(f, "PT0S");
    }

    if !duration.positive {
        write!(f, "-")?;
    }
    write!(f, "P")?;

    let has_time = duration.hours > 0 || duration.minutes > 0 || duration.seconds > 0;
    if duration.days == 0 && !has_time {
        return write!(f, "{}W", duration.weeks);
    }

    let days = duration
        .days
        .saturating_add(duration.weeks.saturating_mul(7));
    if days > 0 {
        write!(f, "{days}D")?;
    }
    if has_time {
        write!(f, "T")?;
        if duration.hours > 0 {
            write!(f, "{}H", duration.hours)?;
        }
        if duration.minutes > 0 {
            write!(f, "{}M", duration.minutes)?;
        }
        if duration.seconds > 0 {
            write!(f, "{}S", duration.seconds)?;
        }
    }
    Ok(())
}

/// Format a UTC offset value as `+HHMM` or `-HHMM`.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_utc_offset<W: Write>(f: &mut W, offset: ValueUtcOffset) -> fmt::Result {
    let sign = if offset.positive() { "+" } else { "-" };
    write!(f, "{sign}{:02}{:02}", offset.hour(), offset.minute())
}

/// Format a UTC offset value in the vCard style, `+HH:MM`.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_utc_offset_vcard<W: Write>(f: &mut W, offset: ValueUtcOffset) -> fmt::Result {
    let sign = if offset.positive() { "+" } else { "-" };
    write!(f, "{sign}{:02}:{:02}", offset.hour(), offset.minute())
}

/// Format a recurrence rule value (RFC 5545 Section 3.3.10).
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write_recurrence_rule<W: Write>(f: &mut W, rule: &ValueRecurrenceRule) -> fmt::Result {
    // FREQ is required
    write!(f, "{KW_RRULE_FREQ}={}", rule.freq)?;

    // UNTIL or COUNT, mutually exclusive
    if let Some(until) = &rule.until {
        write!(f, ";{KW_RRULE_UNTIL}=")?;
        write_date_time(f, until)?;
    } else if let Some(count) = rule.count {
        write!(f, ";{KW_RRULE_COUNT}={count}")?;
    }

    if let Some(interval) = rule.interval {
        write!(f, ";{KW_RRULE_INTERVAL}={interval}")?;
    }

    write_list(f, KW_RRULE_BYSECOND, &rule.by_second)?;
    write_list(f, KW_RRULE_BYMINUTE, &rule.by_minute)?;
    write_list(f, KW_RRULE_BYHOUR, &rule.by_hour)?;
    write_list(f, KW_RRULE_BYMONTHDAY, &rule.by_month_day)?;
    write_list(f, KW_RRULE_BYYEARDAY, &rule.by_year_day)?;
    write_list(f, KW_RRULE_BYWEEKNO, &rule.by_week_no)?;
    write_list(f, KW_RRULE_BYMONTH, &rule.by_month)?;
    write_list(f, KW_RRULE_BYDAY, &rule.by_day)?;
    write_list(f, KW_RRULE_BYSETPOS, &rule.by_set_pos)?;

    if let Some(wkst) = rule.wkst {
        write!(f, ";{KW_RRULE_WKST}={wkst}")?;
    }
    Ok(())
}

fn write_list<W: Write, T: Display>(f: &mut W, name: &str, values: &[T]) -> fmt::Result {
    if values.is_empty() {
        return Ok(());
    }

    write!(f, ";{name}=")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}
