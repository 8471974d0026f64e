// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Pull-based iterator over the occurrences of one recurrence rule.

use serde::{Deserialize, Serialize};

use crate::config::ExpansionConfig;
use crate::recur::days;
use crate::recur::{RecurError, RecurResult};
use crate::value::calendar::{self, CivilDateTime, DateCache};
use crate::value::{
    ByRule, ByRuleClass, RecurrenceFrequency, ValueDateTime, ValueRecurrenceRule, WeekDay,
    WeekDayNum,
};

/// Length of the Gregorian cycle in years. Any pattern a rule can express
/// repeats within this many years times the interval.
const CYCLE_YEARS: i64 = 400;

/// Value lists the iterator cycles through, with defaults filled in from the
/// start value for parts that expand under the rule's frequency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByData {
    /// Seconds, sorted
    pub second: Vec<u8>,
    /// Minutes, sorted
    pub minute: Vec<u8>,
    /// Hours, sorted
    pub hour: Vec<u8>,
    /// Weekdays, ordered from the week start
    pub day: Vec<WeekDayNum>,
}

/// Cursor into each list of [`ByData`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[expect(missing_docs)]
pub struct ByIndices {
    pub second: usize,
    pub minute: usize,
    pub hour: usize,
    pub day: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeField {
    Second,
    Minute,
    Hour,
}

impl TimeField {
    fn frequency(self) -> RecurrenceFrequency {
        match self {
            TimeField::Second => RecurrenceFrequency::Secondly,
            TimeField::Minute => RecurrenceFrequency::Minutely,
            TimeField::Hour => RecurrenceFrequency::Hourly,
        }
    }
}

/// Iterator over the occurrences of a recurrence rule.
///
/// The iterator works on wall-clock fields in the zone of the start value,
/// so a daily rule keeps its local time across offset changes. Occurrences
/// are strictly increasing. Once the iterator is completed, either by COUNT,
/// UNTIL or an error, it yields nothing more.
#[derive(Debug, Clone)]
pub struct RecurIterator {
    pub(super) rule: ValueRecurrenceRule,
    pub(super) dtstart: ValueDateTime,
    pub(super) last: CivilDateTime,
    pub(super) occurrence_number: u32,
    pub(super) by_data: ByData,
    pub(super) by_indices: ByIndices,
    pub(super) days: Vec<i32>,
    pub(super) days_index: usize,
    pub(super) completed: bool,
    pub(super) config: ExpansionConfig,
    cache: DateCache,
}

impl RecurIterator {
    /// Create an iterator with the default [`ExpansionConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::InvalidByRuleCombination`] for rules RFC 5545
    /// forbids and [`RecurError::MalformedRule`] for rules that can never
    /// select a date.
    pub fn new(rule: ValueRecurrenceRule, dtstart: ValueDateTime) -> RecurResult<Self> {
        Self::with_config(rule, dtstart, ExpansionConfig::default())
    }

    /// Create an iterator with explicit limits.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::InvalidConfig`] when `config` does not validate,
    /// otherwise see [`RecurIterator::new`].
    pub fn with_config(
        rule: ValueRecurrenceRule,
        dtstart: ValueDateTime,
        config: ExpansionConfig,
    ) -> RecurResult<Self> {
        config.validate()?;
        rule.validate()?;

        let wkst = rule.week_start();
        let mut by_day = rule.by_day.clone();
        by_day.sort_by_key(|d| d.day.number_from(wkst));

        let by_data = ByData {
            second: sorted_unique(&rule.by_second),
            minute: sorted_unique(&rule.by_minute),
            hour: sorted_unique(&rule.by_hour),
            day: by_day,
        };

        let mut iter = Self {
            last: dtstart.civil(),
            rule,
            dtstart,
            occurrence_number: 0,
            by_data,
            by_indices: ByIndices::default(),
            days: Vec::new(),
            days_index: 0,
            completed: false,
            config,
            cache: DateCache::new(),
        };
        iter.init()?;
        Ok(iter)
    }

    #[expect(clippy::too_many_arguments)]
    pub(super) fn from_parts(
        rule: ValueRecurrenceRule,
        dtstart: ValueDateTime,
        last: CivilDateTime,
        by_data: ByData,
        by_indices: ByIndices,
        days: Vec<i32>,
        days_index: usize,
        occurrence_number: u32,
        completed: bool,
    ) -> Self {
        Self {
            rule,
            dtstart,
            last,
            occurrence_number,
            by_data,
            by_indices,
            days,
            days_index,
            completed,
            config: ExpansionConfig::default(),
            cache: DateCache::new(),
        }
    }

    /// The rule being expanded.
    #[must_use]
    pub fn rule(&self) -> &ValueRecurrenceRule {
        &self.rule
    }

    /// The start value.
    #[must_use]
    pub fn dtstart(&self) -> &ValueDateTime {
        &self.dtstart
    }

    /// The most recent occurrence, or the initial candidate before the first
    /// call to [`RecurIterator::next_occurrence`].
    #[must_use]
    pub fn last_occurrence(&self) -> ValueDateTime {
        self.current()
    }

    /// Number of occurrences produced so far.
    #[must_use]
    pub fn occurrence_number(&self) -> u32 {
        self.occurrence_number
    }

    /// Whether the iterator has finished.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Produce the next occurrence, or `None` once the rule is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::NonAdvancing`] when the rule stops producing
    /// later values and [`RecurError::MalformedRule`] when a month or year
    /// search exceeds its bound. The iterator is completed afterwards.
    pub fn next_occurrence(&mut self) -> RecurResult<Option<ValueDateTime>> {
        let result = self.step();
        if result.is_err() {
            self.completed = true;
        }
        result
    }

    fn step(&mut self) -> RecurResult<Option<ValueDateTime>> {
        if self.completed {
            return Ok(None);
        }

        let count_reached = self
            .rule
            .count
            .is_some_and(|count| self.occurrence_number >= count);
        if count_reached || self.is_past_until() {
            self.completed = true;
            return Ok(None);
        }

        let start = self.dtstart.civil();
        if self.occurrence_number == 0 && self.last >= start {
            self.occurrence_number += 1;
            return Ok(Some(self.current()));
        }

        let before = self.last;
        let horizon = i64::from(before.year) + CYCLE_YEARS * self.interval();
        loop {
            match self.rule.freq {
                RecurrenceFrequency::Secondly => {
                    self.next_time_field(TimeField::Second);
                }
                RecurrenceFrequency::Minutely => {
                    self.next_time_field(TimeField::Minute);
                }
                RecurrenceFrequency::Hourly => {
                    self.next_time_field(TimeField::Hour);
                }
                RecurrenceFrequency::Daily => self.next_day(),
                RecurrenceFrequency::Weekly => self.next_week(),
                RecurrenceFrequency::Monthly => self.next_month()?,
                RecurrenceFrequency::Yearly => self.next_year()?,
            }

            if self.is_past_until() {
                self.completed = true;
                return Ok(None);
            }
            if i64::from(self.last.year) > horizon {
                return Err(RecurError::NonAdvancing {
                    last: self.current(),
                });
            }
            if self.last >= start && self.passes_contract_filters() {
                break;
            }
        }

        if self.last <= before {
            return Err(RecurError::NonAdvancing {
                last: self.current(),
            });
        }

        self.occurrence_number += 1;
        Ok(Some(self.current()))
    }

    fn init(&mut self) -> RecurResult<()> {
        let freq = self.rule.freq;
        let seed = self.last;
        self.last.second = setup_default(freq, ByRule::Second, &mut self.by_data.second, seed.second);
        self.last.minute = setup_default(freq, ByRule::Minute, &mut self.by_data.minute, seed.minute);
        self.last.hour = setup_default(freq, ByRule::Hour, &mut self.by_data.hour, seed.hour);

        match freq {
            RecurrenceFrequency::Weekly => self.init_weekly(),
            RecurrenceFrequency::Monthly => self.init_monthly()?,
            RecurrenceFrequency::Yearly => self.init_yearly()?,
            _ => {}
        }

        tracing::trace!(
            %freq,
            dtstart = %self.dtstart,
            first = %self.current(),
            "recurrence iterator initialized"
        );
        Ok(())
    }

    fn init_weekly(&mut self) {
        let wkst = self.rule.week_start();
        let CivilDateTime {
            year, month, day, ..
        } = self.last;
        match self.by_data.day.first() {
            Some(first) => {
                let target = i64::from(first.day.number_from(wkst));
                let current = i64::from(self.cache.day_of_week(year, month, day, wkst));
                self.last = self.last.adjust(target - current, 0, 0, 0, false);
            }
            None => {
                let dow = self.cache.day_of_week(year, month, day, WeekDay::Sunday);
                let weekday = WeekDay::from_number(i32::from(dow));
                self.by_data.day.push(WeekDayNum::every(weekday));
            }
        }
    }

    fn init_monthly(&mut self) -> RecurResult<()> {
        if let Some(wd) = self.by_data.day.iter().find(|wd| wd.position().abs() >= 6) {
            return Err(RecurError::MalformedRule {
                message: format!("BYDAY value {wd} is out of range for a monthly rule"),
            });
        }

        if !self.by_data.day.is_empty() || self.rule.has(ByRule::MonthDay) {
            self.advance_month_day(0)?;
        }
        Ok(())
    }

    fn init_yearly(&mut self) -> RecurResult<()> {
        self.fill_year_days(0)?;
        self.days_index = 0;
        self.apply_year_day();
        Ok(())
    }

    fn interval(&self) -> i64 {
        i64::from(self.rule.effective_interval())
    }

    fn current(&self) -> ValueDateTime {
        ValueDateTime::from_civil(self.last, self.dtstart.is_date(), self.dtstart.zone().clone())
    }

    fn is_past_until(&self) -> bool {
        let Some(until) = &self.rule.until else {
            return false;
        };
        if until.is_date() {
            let last = (self.last.year, self.last.month, self.last.day);
            last > (until.year(), until.month(), until.day())
        } else {
            self.current() > *until
        }
    }

    fn passes_contract_filters(&mut self) -> bool {
        let freq = self.rule.freq;
        let rule = &self.rule;
        let contract = |part| rule.has(part) && freq.classify(part) == ByRuleClass::Contract;
        let [second, minute, hour, day, month_day, week_no, month] = [
            ByRule::Second,
            ByRule::Minute,
            ByRule::Hour,
            ByRule::Day,
            ByRule::MonthDay,
            ByRule::WeekNo,
            ByRule::Month,
        ]
        .map(contract);
        let last = self.last;

        if (second && !rule.by_second.contains(&last.second))
            || (minute && !rule.by_minute.contains(&last.minute))
            || (hour && !rule.by_hour.contains(&last.hour))
            || (month && !rule.by_month.contains(&last.month))
        {
            return false;
        }

        if month_day && !days::month_days(&rule.by_month_day, last.year, last.month).contains(&last.day) {
            return false;
        }

        if day {
            let dow = self
                .cache
                .day_of_week(last.year, last.month, last.day, WeekDay::Sunday);
            let matched = self
                .rule
                .by_day
                .iter()
                .any(|wd| wd.position() == 0 && wd.day.number() == dow);
            if !matched {
                return false;
            }
        }

        !week_no
            || days::is_in_week_numbers(
                &self.rule.by_week_no,
                last.year,
                last.month,
                last.day,
                self.rule.week_start(),
            )
    }

    /// Step one of the time fields, carrying into the next coarser unit.
    /// Returns whether the field's value list wrapped around.
    fn next_time_field(&mut self, field: TimeField) -> bool {
        match field {
            TimeField::Second => {}
            TimeField::Minute => {
                if !self.next_time_field(TimeField::Second) {
                    return false;
                }
            }
            TimeField::Hour => {
                if !self.next_time_field(TimeField::Minute) {
                    return false;
                }
            }
        }

        let own = self.rule.freq == field.frequency();
        let (list, index) = match field {
            TimeField::Second => (&self.by_data.second, &mut self.by_indices.second),
            TimeField::Minute => (&self.by_data.minute, &mut self.by_indices.minute),
            TimeField::Hour => (&self.by_data.hour, &mut self.by_indices.hour),
        };

        if list.is_empty() {
            if own {
                let interval = self.interval();
                self.increment_time(field, interval);
            }
            return false;
        }

        let mut next = *index + 1;
        let wrapped = next >= list.len();
        if wrapped {
            next = 0;
        }
        *index = next;
        let value = list.get(next).copied().unwrap_or_default();
        match field {
            TimeField::Second => self.last.second = value,
            TimeField::Minute => self.last.minute = value,
            TimeField::Hour => self.last.hour = value,
        }

        if wrapped && own {
            match field {
                TimeField::Second => self.increment_time(TimeField::Minute, 1),
                TimeField::Minute => self.increment_time(TimeField::Hour, 1),
                TimeField::Hour => self.increment_month_day(1),
            }
        }
        wrapped
    }

    fn increment_time(&mut self, field: TimeField, inc: i64) {
        let (value, factor) = match field {
            TimeField::Second => (self.last.second, 60),
            TimeField::Minute => (self.last.minute, 60),
            TimeField::Hour => (self.last.hour, 24),
        };
        let total = i64::from(value) + inc;
        let carry = total.div_euclid(factor);
        let value = u8::try_from(total.rem_euclid(factor)).unwrap_or_default();
        match field {
            TimeField::Second => {
                self.last.second = value;
                if carry != 0 {
                    self.increment_time(TimeField::Minute, carry);
                }
            }
            TimeField::Minute => {
                self.last.minute = value;
                if carry != 0 {
                    self.increment_time(TimeField::Hour, carry);
                }
            }
            TimeField::Hour => {
                self.last.hour = value;
                if carry != 0 {
                    self.increment_month_day(carry);
                }
            }
        }
    }

    fn increment_month_day(&mut self, inc: i64) {
        for _ in 0..inc {
            let dim = calendar::days_in_month(self.last.month, self.last.year);
            if self.last.day >= dim {
                self.increment_month();
            } else {
                self.last.day += 1;
            }
        }
    }

    /// Move to the first day of the next month, or INTERVAL months on for
    /// monthly rules. BYMONTH is left to the contract filters.
    fn increment_month(&mut self) {
        self.last.day = 1;
        let inc = if self.rule.freq == RecurrenceFrequency::Monthly {
            self.interval()
        } else {
            1
        };
        let months = i64::from(self.last.month) - 1 + inc;
        self.last.month = u8::try_from(months.rem_euclid(12) + 1).unwrap_or(1);
        let years = months.div_euclid(12);
        if years != 0 {
            self.increment_year(years);
        }
    }

    fn increment_year(&mut self, inc: i64) {
        self.last.day = 1;
        let year = i64::from(self.last.year).saturating_add(inc);
        self.last.year = i32::try_from(year).unwrap_or(if year < 0 { i32::MIN } else { i32::MAX });
    }

    fn next_day(&mut self) {
        if !self.next_time_field(TimeField::Hour) {
            return;
        }
        let inc = if self.rule.freq == RecurrenceFrequency::Daily {
            self.interval()
        } else {
            1
        };
        self.increment_month_day(inc);
    }

    fn next_week(&mut self) {
        if !self.next_weekday_by_week() {
            return;
        }
        let inc = 7 * self.interval();
        self.increment_month_day(inc);
    }

    /// Move to the next BYDAY weekday within the current week. Returns whether
    /// the weekday list wrapped around.
    fn next_weekday_by_week(&mut self) -> bool {
        if !self.next_time_field(TimeField::Hour) {
            return false;
        }
        if self.by_data.day.is_empty() {
            return true;
        }

        let wkst = self.rule.week_start();
        let len = self.by_data.day.len();
        let mut wrapped = false;
        loop {
            let mut index = self.by_indices.day + 1;
            if index >= len {
                index = 0;
                wrapped = true;
            }
            self.by_indices.day = index;

            let Some(wd) = self.by_data.day.get(index) else {
                return wrapped;
            };
            let offset = i32::from(wd.day.number_from(wkst)) - 1;
            let CivilDateTime {
                year, month, day, ..
            } = self.last;
            let week_start = calendar::start_doy_week(year, month, day, wkst);

            // Skip weekdays that fall into the previous year until the list wraps
            if offset + week_start < 1 && !wrapped {
                continue;
            }

            let (year, month, day) = calendar::from_day_of_year(week_start + offset, year);
            self.last.year = year;
            self.last.month = month;
            self.last.day = day;
            return wrapped;
        }
    }

    fn next_month(&mut self) -> RecurResult<()> {
        if !self.next_time_field(TimeField::Hour) {
            return Ok(());
        }
        let after = self.last.day;
        self.advance_month_day(after)
    }

    /// Move to the first candidate day after `after` in the current month,
    /// moving on to the following months when there is none.
    fn advance_month_day(&mut self, after: u8) -> RecurResult<()> {
        let seed_day = self.dtstart.day();
        let mut after = after;
        for _ in 0..=self.config.month_search_limit {
            let candidates = days::month_candidates(
                &self.rule,
                &self.by_data.day,
                seed_day,
                self.last.year,
                self.last.month,
            );
            if let Some(day) = candidates.into_iter().find(|&d| d > after) {
                self.last.day = day;
                return Ok(());
            }
            self.increment_month();
            after = 0;
        }

        Err(RecurError::MalformedRule {
            message: format!(
                "no day matches the rule within {} months",
                self.config.month_search_limit
            ),
        })
    }

    fn next_year(&mut self) -> RecurResult<()> {
        if !self.next_time_field(TimeField::Hour) {
            return Ok(());
        }

        self.days_index += 1;
        if self.days_index >= self.days.len() {
            self.days_index = 0;
            let interval = self.interval();
            self.fill_year_days(interval)?;
        }
        self.apply_year_day();
        Ok(())
    }

    /// Step `first_step` years, then by the interval, until a year has
    /// candidate days. Stops early once the year passes UNTIL.
    fn fill_year_days(&mut self, first_step: i64) -> RecurResult<()> {
        let interval = self.interval();
        let start_year = i64::from(self.last.year);
        let until_year = self.rule.until.as_ref().map(ValueDateTime::year);
        let seed = self.dtstart.civil();

        let mut step = first_step;
        loop {
            if step != 0 {
                self.increment_year(step);
            }
            if until_year.is_some_and(|y| self.last.year > y) {
                self.days.clear();
                return Ok(());
            }

            self.days = days::year_days(&self.rule, &self.by_data.day, seed, self.last.year);
            if !self.days.is_empty() {
                return Ok(());
            }
            if i64::from(self.last.year) - start_year > CYCLE_YEARS * interval {
                return Err(RecurError::MalformedRule {
                    message: format!(
                        "no day of the year matches the rule between {start_year} and {}",
                        self.last.year
                    ),
                });
            }
            step = interval;
        }
    }

    fn apply_year_day(&mut self) {
        if let Some(&doy) = self.days.get(self.days_index) {
            let (year, month, day) = calendar::from_day_of_year(doy, self.last.year);
            self.last.year = year;
            self.last.month = month;
            self.last.day = day;
        }
    }
}

impl Iterator for RecurIterator {
    type Item = RecurResult<ValueDateTime>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_occurrence().transpose()
    }
}

/// Initial value of a time field: the first listed value when the iterator
/// cycles through the list, the start value otherwise. Expanding parts
/// without values get the start value as their only value.
fn setup_default(freq: RecurrenceFrequency, part: ByRule, list: &mut Vec<u8>, seed: u8) -> u8 {
    let own = match part {
        ByRule::Second => RecurrenceFrequency::Secondly,
        ByRule::Minute => RecurrenceFrequency::Minutely,
        _ => RecurrenceFrequency::Hourly,
    };
    if freq.classify(part) == ByRuleClass::Contract {
        // Only the field of the rule's own frequency is stepped through its list
        return if freq == own {
            list.first().copied().unwrap_or(seed)
        } else {
            seed
        };
    }

    if list.is_empty() {
        list.push(seed);
    }
    list.first().copied().unwrap_or(seed)
}

fn sorted_unique(values: &[u8]) -> Vec<u8> {
    let mut values = values.to_vec();
    values.sort_unstable();
    values.dedup();
    values
}
