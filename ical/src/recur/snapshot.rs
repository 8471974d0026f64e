// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Serializable state of iterators and expansions.
//!
//! A snapshot captures everything needed to resume iteration later, so a
//! restored iterator continues where the original stopped without replaying
//! the occurrences already produced. Time zones are stored by TZID and
//! resolved through a [`TimeZoneRegistry`] on restore.

use serde::{Deserialize, Serialize};

use crate::config::ExpansionConfig;
use crate::recur::{
    ByData, ByIndices, RecurError, RecurExpansion, RecurIterator, RecurResult,
};
use crate::timezone::{TimeZoneRegistry, Zone};
use crate::value::calendar::{self, CivilDateTime};
use crate::value::{RecurrenceFrequency, ValueDateTime, ValueRecurrenceRule, WeekDay, WeekDayNum};

/// Date-time value with its zone referenced by TZID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[expect(missing_docs)]
pub struct DateTimeSnapshot {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    #[serde(default)]
    pub hour: u8,
    #[serde(default)]
    pub minute: u8,
    #[serde(default)]
    pub second: u8,
    #[serde(default)]
    pub is_date: bool,
    /// `None` for floating values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tzid: Option<String>,
}

impl From<&ValueDateTime> for DateTimeSnapshot {
    fn from(value: &ValueDateTime) -> Self {
        let zone = value.zone();
        Self {
            year: value.year(),
            month: value.month(),
            day: value.day(),
            hour: value.hour(),
            minute: value.minute(),
            second: value.second(),
            is_date: value.is_date(),
            tzid: (!zone.is_floating()).then(|| zone.tzid().to_owned()),
        }
    }
}

impl DateTimeSnapshot {
    /// Rebuild the value, resolving its zone in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::UnknownTimezone`] for an unregistered TZID and
    /// [`RecurError::InvalidSnapshot`] for out-of-range fields.
    pub fn restore(&self, registry: &TimeZoneRegistry) -> RecurResult<ValueDateTime> {
        let zone = match &self.tzid {
            None => Zone::Floating,
            Some(tzid) => registry
                .get(tzid)
                .ok_or_else(|| RecurError::UnknownTimezone {
                    tzid: tzid.clone(),
                })?,
        };
        Ok(ValueDateTime::from_civil(self.civil()?, self.is_date, zone))
    }

    fn civil(&self) -> RecurResult<CivilDateTime> {
        let in_range = (1..=12).contains(&self.month)
            && (1..=calendar::days_in_month(self.month, self.year)).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60;
        if !in_range {
            return Err(invalid(format!(
                "date-time {:04}-{:02}-{:02}T{:02}:{:02}:{:02} is out of range",
                self.year, self.month, self.day, self.hour, self.minute, self.second
            )));
        }
        Ok(CivilDateTime {
            year: self.year,
            month: self.month,
            day: self.day,
            hour: self.hour,
            minute: self.minute,
            second: self.second,
        })
    }
}

/// Recurrence rule with UNTIL stored as a [`DateTimeSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[expect(missing_docs)]
pub struct RuleSnapshot {
    pub freq: RecurrenceFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTimeSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_second: Vec<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_minute: Vec<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_hour: Vec<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_month_day: Vec<i8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_year_day: Vec<i16>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_week_no: Vec<i8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_month: Vec<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_day: Vec<WeekDayNum>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub by_set_pos: Vec<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wkst: Option<WeekDay>,
}

impl From<&ValueRecurrenceRule> for RuleSnapshot {
    fn from(rule: &ValueRecurrenceRule) -> Self {
        Self {
            freq: rule.freq,
            until: rule.until.as_ref().map(DateTimeSnapshot::from),
            count: rule.count,
            interval: rule.interval,
            by_second: rule.by_second.clone(),
            by_minute: rule.by_minute.clone(),
            by_hour: rule.by_hour.clone(),
            by_month_day: rule.by_month_day.clone(),
            by_year_day: rule.by_year_day.clone(),
            by_week_no: rule.by_week_no.clone(),
            by_month: rule.by_month.clone(),
            by_day: rule.by_day.clone(),
            by_set_pos: rule.by_set_pos.clone(),
            wkst: rule.wkst,
        }
    }
}

impl RuleSnapshot {
    /// Rebuild the rule.
    ///
    /// # Errors
    ///
    /// Fails when UNTIL cannot be restored.
    pub fn restore(&self, registry: &TimeZoneRegistry) -> RecurResult<ValueRecurrenceRule> {
        let until = self
            .until
            .as_ref()
            .map(|until| until.restore(registry))
            .transpose()?;
        Ok(ValueRecurrenceRule {
            freq: self.freq,
            until,
            count: self.count,
            interval: self.interval,
            by_second: self.by_second.clone(),
            by_minute: self.by_minute.clone(),
            by_hour: self.by_hour.clone(),
            by_month_day: self.by_month_day.clone(),
            by_year_day: self.by_year_day.clone(),
            by_week_no: self.by_week_no.clone(),
            by_month: self.by_month.clone(),
            by_day: self.by_day.clone(),
            by_set_pos: self.by_set_pos.clone(),
            wkst: self.wkst,
        })
    }
}

/// State of a [`RecurIterator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IteratorSnapshot {
    /// The rule being expanded
    pub rule: RuleSnapshot,
    /// Start value
    pub dtstart: DateTimeSnapshot,
    /// Last candidate, in the zone of the start value
    pub last: DateTimeSnapshot,
    /// Value lists being cycled
    pub by_data: ByData,
    /// Cursors into `by_data`
    pub by_indices: ByIndices,
    /// Candidate days of year for yearly rules
    #[serde(default)]
    pub days: Vec<i32>,
    /// Cursor into `days`
    #[serde(default)]
    pub days_index: usize,
    /// Occurrences produced so far
    pub occurrence_number: u32,
    /// Whether the iterator has finished
    #[serde(default)]
    pub completed: bool,
}

impl RecurIterator {
    /// Capture the current state.
    #[must_use]
    pub fn snapshot(&self) -> IteratorSnapshot {
        IteratorSnapshot {
            rule: RuleSnapshot::from(&self.rule),
            dtstart: DateTimeSnapshot::from(&self.dtstart),
            last: DateTimeSnapshot::from(&self.last_occurrence()),
            by_data: self.by_data.clone(),
            by_indices: self.by_indices,
            days: self.days.clone(),
            days_index: self.days_index,
            occurrence_number: self.occurrence_number,
            completed: self.completed,
        }
    }
}

impl IteratorSnapshot {
    /// Rebuild a live iterator with the default limits.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::UnknownTimezone`] when a zone is not in
    /// `registry`, [`RecurError::InvalidSnapshot`] for inconsistent state and
    /// the rule validation errors of [`RecurIterator::new`].
    pub fn restore(&self, registry: &TimeZoneRegistry) -> RecurResult<RecurIterator> {
        self.restore_with_config(registry, ExpansionConfig::default())
    }

    /// Rebuild a live iterator with explicit limits.
    ///
    /// # Errors
    ///
    /// See [`IteratorSnapshot::restore`].
    pub fn restore_with_config(
        &self,
        registry: &TimeZoneRegistry,
        config: ExpansionConfig,
    ) -> RecurResult<RecurIterator> {
        config.validate()?;
        let rule = self.rule.restore(registry)?;
        rule.validate()?;
        let dtstart = self.dtstart.restore(registry)?;
        let last = self.last.civil()?;

        let indices = [
            ("second", self.by_indices.second, self.by_data.second.len()),
            ("minute", self.by_indices.minute, self.by_data.minute.len()),
            ("hour", self.by_indices.hour, self.by_data.hour.len()),
            ("day", self.by_indices.day, self.by_data.day.len()),
        ];
        for (name, index, len) in indices {
            if index > 0 && index >= len {
                return Err(invalid(format!(
                    "{name} index {index} is out of range for {len} values"
                )));
            }
        }
        if self.days_index > self.days.len() {
            return Err(invalid(format!(
                "day index {} is out of range for {} days",
                self.days_index,
                self.days.len()
            )));
        }

        let mut iter = RecurIterator::from_parts(
            rule,
            dtstart,
            last,
            self.by_data.clone(),
            self.by_indices,
            self.days.clone(),
            self.days_index,
            self.occurrence_number,
            self.completed,
        );
        iter.config = config;
        Ok(iter)
    }
}

/// State of a [`RecurExpansion`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpansionSnapshot {
    /// Start value of the set
    pub dtstart: DateTimeSnapshot,
    /// Live rule iterators
    pub iterators: Vec<IteratorSnapshot>,
    /// Sorted explicit dates
    pub rdates: Vec<DateTimeSnapshot>,
    /// Cursor into `rdates`
    pub rdate_index: usize,
    /// Sorted excluded dates
    pub exdates: Vec<DateTimeSnapshot>,
    /// Cursor into `exdates`
    pub exdate_index: usize,
    /// Last candidate taken from any source
    #[serde(default)]
    pub cursor: Option<DateTimeSnapshot>,
    /// Last value returned
    #[serde(default)]
    pub last: Option<DateTimeSnapshot>,
    /// Whether every source is exhausted
    #[serde(default)]
    pub completed: bool,
}

impl RecurExpansion {
    /// Capture the current state.
    #[must_use]
    pub fn snapshot(&self) -> ExpansionSnapshot {
        ExpansionSnapshot {
            dtstart: DateTimeSnapshot::from(&self.dtstart),
            iterators: self.iterators.iter().map(RecurIterator::snapshot).collect(),
            rdates: self.rdates.iter().map(DateTimeSnapshot::from).collect(),
            rdate_index: self.rdate_index,
            exdates: self.exdates.iter().map(DateTimeSnapshot::from).collect(),
            exdate_index: self.exdate_index,
            cursor: self.cursor.as_ref().map(DateTimeSnapshot::from),
            last: self.last.as_ref().map(DateTimeSnapshot::from),
            completed: self.completed,
        }
    }
}

impl ExpansionSnapshot {
    /// Rebuild a live expansion with the default limits.
    ///
    /// # Errors
    ///
    /// See [`IteratorSnapshot::restore`].
    pub fn restore(&self, registry: &TimeZoneRegistry) -> RecurResult<RecurExpansion> {
        self.restore_with_config(registry, ExpansionConfig::default())
    }

    /// Rebuild a live expansion with explicit limits.
    ///
    /// # Errors
    ///
    /// See [`IteratorSnapshot::restore`].
    pub fn restore_with_config(
        &self,
        registry: &TimeZoneRegistry,
        config: ExpansionConfig,
    ) -> RecurResult<RecurExpansion> {
        config.validate()?;
        let restore_all = |values: &[DateTimeSnapshot]| {
            values
                .iter()
                .map(|v| v.restore(registry))
                .collect::<RecurResult<Vec<_>>>()
        };
        let rdates = restore_all(&self.rdates)?;
        let exdates = restore_all(&self.exdates)?;
        if self.rdate_index > rdates.len() || self.exdate_index > exdates.len() {
            return Err(invalid("date cursor is out of range".to_owned()));
        }

        let iterators = self
            .iterators
            .iter()
            .map(|s| s.restore_with_config(registry, config))
            .collect::<RecurResult<Vec<_>>>()?;

        Ok(RecurExpansion {
            dtstart: self.dtstart.restore(registry)?,
            iterators,
            rdates,
            rdate_index: self.rdate_index,
            exdates,
            exdate_index: self.exdate_index,
            cursor: self.cursor.as_ref().map(|c| c.restore(registry)).transpose()?,
            last: self.last.as_ref().map(|l| l.restore(registry)).transpose()?,
            completed: self.completed,
            config,
        })
    }
}

fn invalid(message: String) -> RecurError {
    RecurError::InvalidSnapshot { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::recur::RecurrenceSet;

    #[test]
    fn test_date_time_snapshot_zone() {
        let registry = TimeZoneRegistry::new();
        let dt = ValueDateTime::date_time(2024, 3, 1, 9, 30, 0).with_zone(Zone::Utc);
        let snapshot = DateTimeSnapshot::from(&dt);
        assert_eq!(snapshot.tzid.as_deref(), Some("UTC"));
        assert_eq!(snapshot.restore(&registry).unwrap(), dt);

        let floating = DateTimeSnapshot::from(&ValueDateTime::date(2024, 3, 1));
        assert_eq!(floating.tzid, None);
        assert!(floating.restore(&registry).unwrap().is_date());
    }

    #[test]
    fn test_unknown_zone() {
        let mut snapshot = DateTimeSnapshot::from(&ValueDateTime::date(2024, 3, 1));
        snapshot.tzid = Some("Mars/Olympus".to_owned());
        let err = snapshot.restore(&TimeZoneRegistry::new()).unwrap_err();
        assert!(matches!(err, RecurError::UnknownTimezone { tzid } if tzid == "Mars/Olympus"));
    }

    #[test]
    fn test_out_of_range_fields() {
        let mut snapshot = DateTimeSnapshot::from(&ValueDateTime::date(2023, 2, 1));
        snapshot.day = 29;
        assert!(matches!(
            snapshot.restore(&TimeZoneRegistry::new()),
            Err(RecurError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn test_iterator_resumes() {
        let registry = TimeZoneRegistry::new();
        let rule = ValueRecurrenceRule::new(RecurrenceFrequency::Monthly);
        let mut iter = RecurIterator::new(rule, ValueDateTime::date(2024, 1, 31)).unwrap();
        iter.next_occurrence().unwrap();
        iter.next_occurrence().unwrap();

        let snapshot = iter.snapshot();
        assert_eq!(snapshot.occurrence_number, 2);
        let mut restored = snapshot.restore(&registry).unwrap();
        for _ in 0..3 {
            assert_eq!(
                restored.next_occurrence().unwrap(),
                iter.next_occurrence().unwrap()
            );
        }
    }

    #[test]
    fn test_bad_index_rejected() {
        let rule = ValueRecurrenceRule::new(RecurrenceFrequency::Daily);
        let iter = RecurIterator::new(rule, ValueDateTime::date(2024, 1, 1)).unwrap();
        let mut snapshot = iter.snapshot();
        snapshot.by_indices.hour = 5;
        assert!(matches!(
            snapshot.restore(&TimeZoneRegistry::new()),
            Err(RecurError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn test_unordered_days_do_not_go_back() {
        let mut rule = ValueRecurrenceRule::new(RecurrenceFrequency::Yearly);
        rule.by_year_day = vec![50, 100];
        let mut iter = RecurIterator::new(rule, ValueDateTime::date(2024, 1, 1)).unwrap();
        iter.next_occurrence().unwrap();
        assert_eq!(
            iter.next_occurrence().unwrap(),
            Some(ValueDateTime::date(2024, 4, 9))
        );

        let mut snapshot = iter.snapshot();
        snapshot.days.push(60);
        let mut restored = snapshot.restore(&TimeZoneRegistry::new()).unwrap();
        assert!(matches!(
            restored.next_occurrence(),
            Err(RecurError::NonAdvancing { .. })
        ));
        assert!(restored.is_completed());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let registry = TimeZoneRegistry::new();
        let config = ExpansionConfig {
            month_search_limit: 0,
            ..ExpansionConfig::default()
        };

        let rule = ValueRecurrenceRule::new(RecurrenceFrequency::Daily);
        let iter = RecurIterator::new(rule.clone(), ValueDateTime::date(2024, 1, 1)).unwrap();
        assert!(matches!(
            iter.snapshot().restore_with_config(&registry, config),
            Err(RecurError::InvalidConfig(ConfigError::ZeroLimit { .. }))
        ));

        let set = RecurrenceSet::new(ValueDateTime::date(2024, 1, 1)).with_rrule(rule);
        let expansion = RecurExpansion::new(set).unwrap();
        assert!(matches!(
            expansion.snapshot().restore_with_config(&registry, config),
            Err(RecurError::InvalidConfig(ConfigError::ZeroLimit { .. }))
        ));
    }
}
