// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::config::ExpansionConfig;
use crate::recur::{RecurError, RecurIterator, RecurResult};
use crate::value::{ValueDateTime, ValueRecurrenceRule};

/// Recurrence data of one component: DTSTART with its RRULE, RDATE and
/// EXDATE values.
#[derive(Debug, Clone)]
pub struct RecurrenceSet {
    /// Start of the first instance
    pub dtstart: ValueDateTime,
    /// Recurrence rules
    pub rrules: Vec<ValueRecurrenceRule>,
    /// Explicit recurrence dates
    pub rdates: Vec<ValueDateTime>,
    /// Excluded dates
    pub exdates: Vec<ValueDateTime>,
}

impl RecurrenceSet {
    /// Set with only a start value.
    #[must_use]
    pub fn new(dtstart: ValueDateTime) -> Self {
        Self {
            dtstart,
            rrules: Vec::new(),
            rdates: Vec::new(),
            exdates: Vec::new(),
        }
    }

    /// Add a recurrence rule.
    #[must_use]
    pub fn with_rrule(mut self, rrule: ValueRecurrenceRule) -> Self {
        self.rrules.push(rrule);
        self
    }

    /// Add an explicit recurrence date.
    #[must_use]
    pub fn with_rdate(mut self, rdate: ValueDateTime) -> Self {
        self.rdates.push(rdate);
        self
    }

    /// Add an excluded date.
    #[must_use]
    pub fn with_exdate(mut self, exdate: ValueDateTime) -> Self {
        self.exdates.push(exdate);
        self
    }
}

/// Merged, strictly increasing occurrences of a [`RecurrenceSet`].
///
/// RDATE values and the occurrences of every rule are merged in time order,
/// values equal to an EXDATE are dropped, and a value produced by more than
/// one source is returned once. A set without rules and dates yields its
/// start value only.
#[derive(Debug, Clone)]
pub struct RecurExpansion {
    pub(super) dtstart: ValueDateTime,
    pub(super) iterators: Vec<RecurIterator>,
    pub(super) rdates: Vec<ValueDateTime>,
    pub(super) rdate_index: usize,
    pub(super) exdates: Vec<ValueDateTime>,
    pub(super) exdate_index: usize,
    pub(super) cursor: Option<ValueDateTime>,
    pub(super) last: Option<ValueDateTime>,
    pub(super) completed: bool,
    pub(super) config: ExpansionConfig,
}

impl RecurExpansion {
    /// Start expanding a recurrence set with the default limits.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while creating the rule iterators.
    pub fn new(set: RecurrenceSet) -> RecurResult<Self> {
        Self::with_config(set, ExpansionConfig::default())
    }

    /// Start expanding a recurrence set with explicit limits.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::InvalidConfig`] when `config` does not validate,
    /// otherwise the first error raised while creating the rule iterators.
    pub fn with_config(set: RecurrenceSet, config: ExpansionConfig) -> RecurResult<Self> {
        config.validate()?;
        let RecurrenceSet {
            dtstart,
            rrules,
            mut rdates,
            mut exdates,
        } = set;
        rdates.sort();
        exdates.sort();
        if rrules.is_empty() && rdates.is_empty() {
            rdates.push(dtstart.clone());
        }

        let mut iterators = Vec::with_capacity(rrules.len());
        for rule in rrules {
            let mut iter = RecurIterator::with_config(rule, dtstart.clone(), config)?;
            if iter.next_occurrence()?.is_some() {
                iterators.push(iter);
            }
        }

        tracing::trace!(
            rules = iterators.len(),
            rdates = rdates.len(),
            exdates = exdates.len(),
            "recurrence expansion initialized"
        );
        Ok(Self {
            dtstart,
            iterators,
            rdates,
            rdate_index: 0,
            exdates,
            exdate_index: 0,
            cursor: None,
            last: None,
            completed: false,
            config,
        })
    }

    /// Start value of the set.
    #[must_use]
    pub fn dtstart(&self) -> &ValueDateTime {
        &self.dtstart
    }

    /// Last value returned.
    #[must_use]
    pub fn last_occurrence(&self) -> Option<&ValueDateTime> {
        self.last.as_ref()
    }

    /// Whether every source is exhausted.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Produce the next occurrence of the set.
    ///
    /// # Errors
    ///
    /// Propagates the first rule iterator error, and returns
    /// [`RecurError::NonAdvancing`] when more than the configured number of
    /// candidates in a row are excluded or repeated. The expansion is
    /// completed afterwards.
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

        let mut tries = 0;
        loop {
            self.catch_up()?;

            let rdate = self.rdates.get(self.rdate_index).cloned();
            let pending = self
                .iterators
                .iter()
                .map(RecurIterator::last_occurrence)
                .min();
            let candidate = match (rdate, pending) {
                (None, None) => {
                    self.completed = true;
                    return Ok(None);
                }
                (Some(rdate), Some(pending)) if pending < rdate => pending,
                (Some(rdate), _) => {
                    self.rdate_index += 1;
                    rdate
                }
                (None, Some(pending)) => pending,
            };
            self.cursor = Some(candidate.clone());

            while self
                .exdates
                .get(self.exdate_index)
                .is_some_and(|ex| *ex < candidate)
            {
                self.exdate_index += 1;
            }
            let excluded = self
                .exdates
                .get(self.exdate_index)
                .is_some_and(|ex| *ex == candidate);
            let repeated = self.last.as_ref().is_some_and(|last| candidate <= *last);

            if !excluded && !repeated {
                self.last = Some(candidate.clone());
                return Ok(Some(candidate));
            }

            tracing::trace!(%candidate, excluded, "skipped recurrence candidate");
            tries += 1;
            if tries >= self.config.max_expansion_tries {
                return Err(RecurError::NonAdvancing { last: candidate });
            }
        }
    }

    /// Advance the rule iterators whose pending value was already consumed,
    /// dropping the exhausted ones.
    fn catch_up(&mut self) -> RecurResult<()> {
        let Some(cursor) = &self.cursor else {
            return Ok(());
        };

        let mut index = 0;
        while let Some(iter) = self.iterators.get_mut(index) {
            if iter.is_completed() {
                self.iterators.remove(index);
                continue;
            }
            if iter.last_occurrence() > *cursor {
                index += 1;
                continue;
            }
            if iter.next_occurrence()?.is_none() {
                self.iterators.remove(index);
            }
        }
        Ok(())
    }
}

impl Iterator for RecurExpansion {
    type Item = RecurResult<ValueDateTime>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_occurrence().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{RecurrenceFrequency, WeekDay, WeekDayNum};

    fn daily(count: u32) -> ValueRecurrenceRule {
        let mut rule = ValueRecurrenceRule::new(RecurrenceFrequency::Daily);
        rule.count = Some(count);
        rule
    }

    fn collect(expansion: RecurExpansion) -> Vec<String> {
        expansion.map(|r| r.unwrap().to_string()).collect()
    }

    #[test]
    fn test_dtstart_only() {
        let set = RecurrenceSet::new(ValueDateTime::date(2024, 5, 1));
        let mut expansion = RecurExpansion::new(set).unwrap();
        assert_eq!(
            expansion.next_occurrence().unwrap(),
            Some(ValueDateTime::date(2024, 5, 1))
        );
        assert_eq!(expansion.next_occurrence().unwrap(), None);
        assert!(expansion.is_completed());
    }

    #[test]
    fn test_rdate_before_dtstart_comes_first() {
        let set = RecurrenceSet::new(ValueDateTime::date(2024, 5, 1))
            .with_rrule(daily(2))
            .with_rdate(ValueDateTime::date(1990, 5, 1));
        let expansion = RecurExpansion::new(set).unwrap();
        assert_eq!(collect(expansion), ["19900501", "20240501", "20240502"]);
    }

    #[test]
    fn test_coinciding_sources_yield_once() {
        let set = RecurrenceSet::new(ValueDateTime::date(2024, 5, 1))
            .with_rrule(daily(3))
            .with_rrule(daily(2))
            .with_rdate(ValueDateTime::date(2024, 5, 2))
            .with_rdate(ValueDateTime::date(2024, 5, 2));
        let expansion = RecurExpansion::new(set).unwrap();
        assert_eq!(collect(expansion), ["20240501", "20240502", "20240503"]);
    }

    #[test]
    fn test_exdates_removed() {
        let mut weekly = ValueRecurrenceRule::new(RecurrenceFrequency::Weekly);
        weekly.by_day = vec![WeekDayNum::every(WeekDay::Monday)];
        weekly.count = Some(4);
        let mut monthly = ValueRecurrenceRule::new(RecurrenceFrequency::Monthly);
        monthly.by_month_day = vec![10];
        monthly.count = Some(2);

        let set = RecurrenceSet::new(ValueDateTime::date(2024, 1, 1))
            .with_rrule(weekly)
            .with_rrule(monthly)
            .with_rdate(ValueDateTime::date(2024, 1, 5))
            .with_exdate(ValueDateTime::date(2024, 1, 15));
        let expansion = RecurExpansion::new(set).unwrap();
        assert_eq!(
            collect(expansion),
            ["20240101", "20240105", "20240108", "20240110", "20240122", "20240210"]
        );
    }

    #[test]
    fn test_iterator_error_fails_fast() {
        let mut rule = ValueRecurrenceRule::new(RecurrenceFrequency::Daily);
        rule.interval = Some(7);
        rule.by_day = vec![WeekDayNum::every(WeekDay::Tuesday)];
        let set = RecurrenceSet::new(ValueDateTime::date(2024, 1, 1))
            .with_rrule(rule)
            .with_rrule(daily(10));
        let mut expansion = RecurExpansion::new(set).unwrap();

        assert_eq!(
            expansion.next_occurrence().unwrap(),
            Some(ValueDateTime::date(2024, 1, 1))
        );
        assert!(matches!(
            expansion.next_occurrence(),
            Err(RecurError::NonAdvancing { .. })
        ));
        assert!(expansion.is_completed());
        assert!(expansion.next().is_none());
    }

    #[test]
    fn test_too_many_exclusions() {
        let config = ExpansionConfig {
            max_expansion_tries: 3,
            ..ExpansionConfig::default()
        };
        let mut set = RecurrenceSet::new(ValueDateTime::date(2024, 1, 1)).with_rrule(daily(10));
        for day in 1..=5 {
            set = set.with_exdate(ValueDateTime::date(2024, 1, day));
        }
        let mut expansion = RecurExpansion::with_config(set, config).unwrap();
        assert!(expansion.next_occurrence().is_err());
    }
}
