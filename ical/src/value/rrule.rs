// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule type definitions for iCalendar.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::keyword::{
    KW_DAY_FR, KW_DAY_MO, KW_DAY_SA, KW_DAY_SU, KW_DAY_TH, KW_DAY_TU, KW_DAY_WE,
    KW_RRULE_FREQ_DAILY, KW_RRULE_FREQ_HOURLY, KW_RRULE_FREQ_MINUTELY, KW_RRULE_FREQ_MONTHLY,
    KW_RRULE_FREQ_SECONDLY, KW_RRULE_FREQ_WEEKLY, KW_RRULE_FREQ_YEARLY,
};
use crate::recur::{RecurError, RecurIterator, RecurResult};
use crate::value::ValueDateTime;

/// Recurrence rule
///
/// Values are expected to be range checked already, only the combination of
/// rule parts is validated here, see [`ValueRecurrenceRule::validate`].
#[derive(Debug, Clone)]
pub struct ValueRecurrenceRule {
    /// Frequency of recurrence
    pub freq: RecurrenceFrequency,
    /// Until date for recurrence
    pub until: Option<ValueDateTime>,
    /// Number of occurrences
    pub count: Option<u32>,
    /// Interval between recurrences
    pub interval: Option<u32>,
    /// Second specifier
    pub by_second: Vec<u8>,
    /// Minute specifier
    pub by_minute: Vec<u8>,
    /// Hour specifier
    pub by_hour: Vec<u8>,
    /// Day of month specifier
    pub by_month_day: Vec<i8>,
    /// Day of year specifier
    pub by_year_day: Vec<i16>,
    /// Week number specifier
    pub by_week_no: Vec<i8>,
    /// Month specifier
    pub by_month: Vec<u8>,
    /// Day of week specifier
    pub by_day: Vec<WeekDayNum>,
    /// Position in month
    pub by_set_pos: Vec<i16>,
    /// Start day of week
    pub wkst: Option<WeekDay>,
}

impl ValueRecurrenceRule {
    /// Create a rule with the given frequency and no other parts.
    #[must_use]
    pub fn new(freq: RecurrenceFrequency) -> Self {
        Self {
            freq,
            until: None,
            count: None,
            interval: None,
            by_second: Vec::new(),
            by_minute: Vec::new(),
            by_hour: Vec::new(),
            by_month_day: Vec::new(),
            by_year_day: Vec::new(),
            by_week_no: Vec::new(),
            by_month: Vec::new(),
            by_day: Vec::new(),
            by_set_pos: Vec::new(),
            wkst: None,
        }
    }

    /// Interval, defaulting to 1. A zero interval is read as 1.
    #[must_use]
    pub fn effective_interval(&self) -> u32 {
        self.interval.unwrap_or(1).max(1)
    }

    /// Week start, defaulting to Monday.
    #[must_use]
    pub fn week_start(&self) -> WeekDay {
        self.wkst.unwrap_or(WeekDay::Monday)
    }

    /// Whether the rule produces a bounded number of occurrences.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.count.is_some() || self.until.is_some()
    }

    /// Whether the rule is bounded by COUNT.
    #[must_use]
    pub fn is_by_count(&self) -> bool {
        self.count.is_some()
    }

    /// Whether a BY rule part is present.
    #[must_use]
    pub fn has(&self, rule: ByRule) -> bool {
        match rule {
            ByRule::Second => !self.by_second.is_empty(),
            ByRule::Minute => !self.by_minute.is_empty(),
            ByRule::Hour => !self.by_hour.is_empty(),
            ByRule::Day => !self.by_day.is_empty(),
            ByRule::MonthDay => !self.by_month_day.is_empty(),
            ByRule::YearDay => !self.by_year_day.is_empty(),
            ByRule::WeekNo => !self.by_week_no.is_empty(),
            ByRule::Month => !self.by_month.is_empty(),
        }
    }

    /// Numeric values of a BY rule part. `BYDAY` yields weekday numbers
    /// (Sunday is 1) and ignores positions.
    #[must_use]
    pub fn by_rule_values(&self, rule: ByRule) -> Vec<i32> {
        match rule {
            ByRule::Second => self.by_second.iter().copied().map(i32::from).collect(),
            ByRule::Minute => self.by_minute.iter().copied().map(i32::from).collect(),
            ByRule::Hour => self.by_hour.iter().copied().map(i32::from).collect(),
            ByRule::Day => self
                .by_day
                .iter()
                .map(|d| i32::from(d.day.number()))
                .collect(),
            ByRule::MonthDay => self.by_month_day.iter().copied().map(i32::from).collect(),
            ByRule::YearDay => self.by_year_day.iter().copied().map(i32::from).collect(),
            ByRule::WeekNo => self.by_week_no.iter().copied().map(i32::from).collect(),
            ByRule::Month => self.by_month.iter().copied().map(i32::from).collect(),
        }
    }

    /// Check the combination of BY rule parts against the frequency.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::InvalidByRuleCombination`] for combinations that
    /// RFC 5545 forbids.
    pub fn validate(&self) -> RecurResult<()> {
        let conflict = |rule, conflict| RecurError::InvalidByRuleCombination {
            rule,
            conflict: Some(conflict),
            freq: self.freq,
        };

        if self.has(ByRule::YearDay) {
            for other in [ByRule::Month, ByRule::WeekNo, ByRule::MonthDay, ByRule::Day] {
                if self.has(other) {
                    return Err(conflict(ByRule::YearDay, other));
                }
            }
        }

        if self.has(ByRule::WeekNo) && self.has(ByRule::MonthDay) {
            return Err(conflict(ByRule::WeekNo, ByRule::MonthDay));
        }

        for rule in ByRule::ALL {
            if self.has(rule) && self.freq.classify(rule) == ByRuleClass::Illegal {
                return Err(RecurError::InvalidByRuleCombination {
                    rule,
                    conflict: None,
                    freq: self.freq,
                });
            }
        }

        if self.has(ByRule::YearDay) && self.freq != RecurrenceFrequency::Yearly {
            return Err(RecurError::InvalidByRuleCombination {
                rule: ByRule::YearDay,
                conflict: None,
                freq: self.freq,
            });
        }
        Ok(())
    }

    /// Create an iterator over the occurrences starting at `dtstart`.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule is invalid or cannot produce a first
    /// occurrence.
    pub fn iterator(&self, dtstart: &ValueDateTime) -> RecurResult<RecurIterator> {
        RecurIterator::new(self.clone(), dtstart.clone())
    }

    /// First occurrence strictly after `recurrence_id`, placed in the zone of
    /// `recurrence_id`.
    ///
    /// # Errors
    ///
    /// Propagates iterator errors.
    pub fn next_occurrence(
        &self,
        dtstart: &ValueDateTime,
        recurrence_id: &ValueDateTime,
    ) -> RecurResult<Option<ValueDateTime>> {
        let mut iter = self.iterator(dtstart)?;
        while let Some(next) = iter.next_occurrence()? {
            if next > *recurrence_id {
                return Ok(Some(next.with_zone(recurrence_id.zone().clone())));
            }
        }
        Ok(None)
    }
}

/// Recurrence frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[expect(missing_docs)]
pub enum RecurrenceFrequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceFrequency {
    /// How a BY rule part acts under this frequency.
    #[must_use]
    pub fn classify(self, rule: ByRule) -> ByRuleClass {
        use ByRuleClass::{Contract as C, Expand as E, Illegal as I};

        // BYSECOND, BYMINUTE, BYHOUR, BYDAY, BYMONTHDAY, BYYEARDAY, BYWEEKNO, BYMONTH
        #[rustfmt::skip]
        let row: [ByRuleClass; 8] = match self {
            Self::Secondly => [C, C, C, C, C, C, C, C],
            Self::Minutely => [E, C, C, C, C, C, C, C],
            Self::Hourly   => [E, E, C, C, C, C, C, C],
            Self::Daily    => [E, E, E, C, C, C, C, C],
            Self::Weekly   => [E, E, E, E, I, I, C, C],
            Self::Monthly  => [E, E, E, E, E, I, I, C],
            Self::Yearly   => [E, E, E, E, E, E, E, E],
        };
        let [second, minute, hour, day, month_day, year_day, week_no, month] = row;
        match rule {
            ByRule::Second => second,
            ByRule::Minute => minute,
            ByRule::Hour => hour,
            ByRule::Day => day,
            ByRule::MonthDay => month_day,
            ByRule::YearDay => year_day,
            ByRule::WeekNo => week_no,
            ByRule::Month => month,
        }
    }
}

impl Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecurrenceFrequency::Secondly => write!(f, "{KW_RRULE_FREQ_SECONDLY}"),
            RecurrenceFrequency::Minutely => write!(f, "{KW_RRULE_FREQ_MINUTELY}"),
            RecurrenceFrequency::Hourly => write!(f, "{KW_RRULE_FREQ_HOURLY}"),
            RecurrenceFrequency::Daily => write!(f, "{KW_RRULE_FREQ_DAILY}"),
            RecurrenceFrequency::Weekly => write!(f, "{KW_RRULE_FREQ_WEEKLY}"),
            RecurrenceFrequency::Monthly => write!(f, "{KW_RRULE_FREQ_MONTHLY}"),
            RecurrenceFrequency::Yearly => write!(f, "{KW_RRULE_FREQ_YEARLY}"),
        }
    }
}

/// BY rule parts that take part in expansion or filtering.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[expect(missing_docs)]
pub enum ByRule {
    #[strum(serialize = "BYSECOND")]
    Second,
    #[strum(serialize = "BYMINUTE")]
    Minute,
    #[strum(serialize = "BYHOUR")]
    Hour,
    #[strum(serialize = "BYDAY")]
    Day,
    #[strum(serialize = "BYMONTHDAY")]
    MonthDay,
    #[strum(serialize = "BYYEARDAY")]
    YearDay,
    #[strum(serialize = "BYWEEKNO")]
    WeekNo,
    #[strum(serialize = "BYMONTH")]
    Month,
}

impl ByRule {
    /// All kinds, from the finest granularity to the coarsest.
    pub const ALL: [ByRule; 8] = [
        ByRule::Second,
        ByRule::Minute,
        ByRule::Hour,
        ByRule::Day,
        ByRule::MonthDay,
        ByRule::YearDay,
        ByRule::WeekNo,
        ByRule::Month,
    ];
}

/// Role of a BY rule part for a given frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ByRuleClass {
    /// Values filter generated candidates.
    Contract,
    /// Values enumerate candidates at that granularity.
    Expand,
    /// Not allowed with the frequency.
    Illegal,
}

/// Day of week with optional occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekDayNum {
    /// Day of the week
    pub day: WeekDay,
    /// Occurrence in month (optional)
    pub occurrence: Option<i8>,
}

impl WeekDayNum {
    /// Weekday without a position.
    #[must_use]
    pub fn every(day: WeekDay) -> Self {
        Self {
            day,
            occurrence: None,
        }
    }

    /// The `occurrence`-th weekday, negative values count from the end.
    #[must_use]
    pub fn nth(occurrence: i8, day: WeekDay) -> Self {
        Self {
            day,
            occurrence: Some(occurrence),
        }
    }

    /// Position, zero when absent.
    #[must_use]
    pub fn position(&self) -> i32 {
        self.occurrence.map_or(0, i32::from)
    }
}

impl Display for WeekDayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.occurrence {
            Some(occ) => write!(f, "{occ}{}", self.day),
            None => write!(f, "{}", self.day),
        }
    }
}

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[expect(missing_docs)]
pub enum WeekDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekDay {
    /// Weekday number, Sunday is 1 and Saturday is 7.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            WeekDay::Sunday => 1,
            WeekDay::Monday => 2,
            WeekDay::Tuesday => 3,
            WeekDay::Wednesday => 4,
            WeekDay::Thursday => 5,
            WeekDay::Friday => 6,
            WeekDay::Saturday => 7,
        }
    }

    /// Inverse of [`WeekDay::number`], wrapping modulo 7.
    #[must_use]
    pub fn from_number(number: i32) -> Self {
        match (number - 1).rem_euclid(7) {
            0 => WeekDay::Sunday,
            1 => WeekDay::Monday,
            2 => WeekDay::Tuesday,
            3 => WeekDay::Wednesday,
            4 => WeekDay::Thursday,
            5 => WeekDay::Friday,
            _ => WeekDay::Saturday,
        }
    }

    /// Weekday number `1..=7` counted from `week_start`.
    #[must_use]
    pub fn number_from(self, week_start: WeekDay) -> u8 {
        (self.number() + 7 - week_start.number()) % 7 + 1
    }
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekDay::Sunday => write!(f, "{KW_DAY_SU}"),
            WeekDay::Monday => write!(f, "{KW_DAY_MO}"),
            WeekDay::Tuesday => write!(f, "{KW_DAY_TU}"),
            WeekDay::Wednesday => write!(f, "{KW_DAY_WE}"),
            WeekDay::Thursday => write!(f, "{KW_DAY_TH}"),
            WeekDay::Friday => write!(f, "{KW_DAY_FR}"),
            WeekDay::Saturday => write!(f, "{KW_DAY_SA}"),
        }
    }
}

impl Display for ValueRecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::formatter::write_recurrence_rule(f, self)
    }
}
