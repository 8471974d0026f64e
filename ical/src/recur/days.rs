// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Day sets selected by the date parts of a rule, within one month or one
//! year.

use crate::value::calendar::{self, CivilDateTime};
use crate::value::{ByRule, ValueRecurrenceRule, WeekDay, WeekDayNum};

/// BYMONTHDAY values resolved against a month: zero and out-of-range values
/// are dropped, negative values count from the month end. Sorted, unique.
pub(super) fn month_days(by_month_day: &[i8], year: i32, month: u8) -> Vec<u8> {
    let dim = i32::from(calendar::days_in_month(month, year));
    let mut days: Vec<u8> = by_month_day
        .iter()
        .filter_map(|&value| {
            let value = i32::from(value);
            let day = if value < 0 { dim + value + 1 } else { value };
            if (1..=dim).contains(&day) {
                u8::try_from(day).ok()
            } else {
                None
            }
        })
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}

/// Whether the date matches one of the BYDAY entries. An entry without a
/// position matches every such weekday of the month.
pub(super) fn is_day_in_by_day(by_day: &[WeekDayNum], year: i32, month: u8, day: u8) -> bool {
    let dow = calendar::day_of_week(year, month, day, WeekDay::Sunday);
    by_day.iter().any(|wd| match wd.position() {
        0 => wd.day.number() == dow,
        pos => calendar::nth_week_day(year, month, wd.day, pos) == i32::from(day),
    })
}

/// Keep the items at the given 1-based positions, negative positions count
/// from the end. An empty position list keeps everything.
pub(super) fn select_set_positions<T: Copy>(items: &[T], set_pos: &[i16]) -> Vec<T> {
    if set_pos.is_empty() {
        return items.to_vec();
    }

    let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
    items
        .iter()
        .zip(0i64..)
        .filter(|(_, i)| {
            set_pos.iter().any(|&pos| {
                let pos = i64::from(pos);
                pos == i + 1 || pos == i - len
            })
        })
        .map(|(item, _)| *item)
        .collect()
}

/// Candidate days of one month for a MONTHLY rule.
pub(super) fn month_candidates(
    rule: &ValueRecurrenceRule,
    by_day: &[WeekDayNum],
    seed_day: u8,
    year: i32,
    month: u8,
) -> Vec<u8> {
    let dim = calendar::days_in_month(month, year);
    let days: Vec<u8> = if !by_day.is_empty() {
        let pool = if rule.has(ByRule::MonthDay) {
            month_days(&rule.by_month_day, year, month)
        } else {
            (1..=dim).collect()
        };
        pool.into_iter()
            .filter(|&day| is_day_in_by_day(by_day, year, month, day))
            .collect()
    } else if rule.has(ByRule::MonthDay) {
        month_days(&rule.by_month_day, year, month)
    } else if seed_day <= dim {
        vec![seed_day]
    } else {
        Vec::new()
    };
    select_set_positions(&days, &rule.by_set_pos)
}

/// Candidate days of year for a YEARLY rule, sorted and unique.
///
/// Dates the parts describe that do not exist in `year`, such as February
/// 30th or a 53rd week, are skipped.
pub(super) fn year_days(
    rule: &ValueRecurrenceRule,
    by_day: &[WeekDayNum],
    seed: CivilDateTime,
    year: i32,
) -> Vec<i32> {
    let wkst = rule.week_start();
    let diy = i32::from(calendar::days_in_year(year));
    let doy = |month: u8, day: u8| i32::from(calendar::day_of_year(year, month, day));
    let valid = |month: u8, day: u8| day >= 1 && day <= calendar::days_in_month(month, year);

    let has_month = rule.has(ByRule::Month);
    let has_month_day = rule.has(ByRule::MonthDay);
    let has_week_no = rule.has(ByRule::WeekNo);

    let mut apply_set_pos = true;
    let mut days: Vec<i32> = if rule.has(ByRule::YearDay) {
        rule.by_year_day
            .iter()
            .map(|&d| {
                let d = i32::from(d);
                if d < 0 { diy + d + 1 } else { d }
            })
            .collect()
    } else if !by_day.is_empty() && has_month && !has_month_day && !has_week_no {
        // Positions count within each month, so BYSETPOS also applies per month.
        apply_set_pos = false;
        let mut days = Vec::new();
        for &month in &rule.by_month {
            let matching: Vec<u8> = (1..=calendar::days_in_month(month, year))
                .filter(|&day| is_day_in_by_day(by_day, year, month, day))
                .collect();
            days.extend(
                select_set_positions(&matching, &rule.by_set_pos)
                    .into_iter()
                    .map(|day| doy(month, day)),
            );
        }
        days
    } else if !by_day.is_empty() {
        expand_by_day(by_day, year)
            .into_iter()
            .filter(|&d| {
                if d < 1 || d > diy {
                    return false;
                }
                let (_, month, day) = calendar::from_day_of_year(d, year);
                (!has_month || rule.by_month.contains(&month))
                    && (!has_month_day
                        || month_days(&rule.by_month_day, year, month).contains(&day))
                    && (!has_week_no
                        || is_in_week_numbers(&rule.by_week_no, year, month, day, wkst))
            })
            .collect()
    } else if has_week_no {
        let offset = i64::from(calendar::day_of_week(seed.year, seed.month, seed.day, wkst)) - 1;
        let jan1 = calendar::epoch_day(year, 1, 1);
        // Weeks of the neighbouring week-numbering years reach into this one
        (year.saturating_sub(1)..=year.saturating_add(1))
            .flat_map(|week_year| {
                let week1 = calendar::week_one_start(week_year, wkst);
                week_numbers(&rule.by_week_no, week_year, wkst)
                    .into_iter()
                    .map(move |week| week1 + (week - 1) * 7 + offset)
            })
            .filter_map(|epoch| i32::try_from(epoch - jan1 + 1).ok())
            .filter(|&d| {
                if d < 1 || d > diy {
                    return false;
                }
                let (_, month, _) = calendar::from_day_of_year(d, year);
                !has_month || rule.by_month.contains(&month)
            })
            .collect()
    } else if has_month && has_month_day {
        let mut days = Vec::new();
        for &month in &rule.by_month {
            for day in month_days(&rule.by_month_day, year, month) {
                days.push(doy(month, day));
            }
        }
        days
    } else if has_month {
        rule.by_month
            .iter()
            .filter(|&&month| valid(month, seed.day))
            .map(|&month| doy(month, seed.day))
            .collect()
    } else if has_month_day {
        month_days(&rule.by_month_day, year, seed.month)
            .into_iter()
            .map(|day| doy(seed.month, day))
            .collect()
    } else if valid(seed.month, seed.day) {
        vec![doy(seed.month, seed.day)]
    } else {
        Vec::new()
    };

    days.retain(|&d| d >= 1 && d <= diy);
    days.sort_unstable();
    days.dedup();
    if apply_set_pos {
        days = select_set_positions(&days, &rule.by_set_pos);
    }
    days
}

/// BYWEEKNO values resolved against a week-numbering year, negative values
/// counting from the last week.
fn week_numbers(by_week_no: &[i8], week_year: i32, wkst: WeekDay) -> Vec<i64> {
    let weeks = week_count(week_year, wkst);
    by_week_no
        .iter()
        .filter_map(|&w| {
            let w = i64::from(w);
            let w = if w < 0 { weeks + w + 1 } else { w };
            (1..=weeks).contains(&w).then_some(w)
        })
        .collect()
}

/// Whether the date falls into one of the BYWEEKNO weeks. Weeks count within
/// the week-numbering year of the date, which differs from its calendar year
/// for some days around New Year.
pub(super) fn is_in_week_numbers(
    by_week_no: &[i8],
    year: i32,
    month: u8,
    day: u8,
    wkst: WeekDay,
) -> bool {
    let today = calendar::epoch_day(year, month, day);
    let week_year = (year.saturating_sub(1)..=year.saturating_add(1))
        .rev()
        .find(|&y| calendar::week_one_start(y, wkst) <= today)
        .unwrap_or(year);
    let week = (today - calendar::week_one_start(week_year, wkst)) / 7 + 1;
    week_numbers(by_week_no, week_year, wkst).contains(&week)
}

/// Number of weeks in a week-numbering year.
fn week_count(week_year: i32, wkst: WeekDay) -> i64 {
    let start = calendar::week_one_start(week_year, wkst);
    let next = calendar::week_one_start(week_year.saturating_add(1), wkst);
    (next - start) / 7
}

/// Days of year matched by BYDAY entries across the whole year. Positions
/// count within the year. Out-of-range results are returned as is.
fn expand_by_day(by_day: &[WeekDayNum], year: i32) -> Vec<i32> {
    let diy = i32::from(calendar::days_in_year(year));
    let start_dow = i32::from(calendar::day_of_week(year, 1, 1, WeekDay::Sunday));
    let end_dow = i32::from(calendar::day_of_week(year, 12, 31, WeekDay::Sunday));

    let mut days = Vec::new();
    for wd in by_day {
        let dow = i32::from(wd.day.number());
        match wd.position() {
            0 => {
                let mut doy = (dow + 7 - start_dow) % 7 + 1;
                while doy <= diy {
                    days.push(doy);
                    doy += 7;
                }
            }
            pos if pos > 0 => {
                let first = (dow - start_dow + 7) % 7 + 1;
                days.push(first + (pos - 1) * 7);
            }
            pos => {
                let last = diy - (end_dow - dow + 7) % 7;
                days.push(last + (pos + 1) * 7);
            }
        }
    }
    days
}
