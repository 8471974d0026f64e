// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::keyword::{KW_DAYLIGHT, KW_STANDARD};
use crate::recur::RecurIterator;
use crate::timezone::{Transition, Zone};
use crate::value::{CivilDateTime, ValueDateTime, ValueRecurrenceRule, ValueUtcOffset};

/// STANDARD or DAYLIGHT sub-component of a VTIMEZONE.
///
/// Fields are optional as they come from data; observances missing DTSTART,
/// TZOFFSETFROM or TZOFFSETTO are skipped during expansion.
#[derive(Debug, Clone)]
pub struct TimeZoneObservance {
    /// Start of the observance, as local wall-clock time before the change
    pub dtstart: Option<ValueDateTime>,

    /// Offset in use before the observance starts
    pub offset_from: Option<ValueUtcOffset>,

    /// Offset in use while the observance is in effect
    pub offset_to: Option<ValueUtcOffset>,

    /// Whether this is a DAYLIGHT observance
    pub is_daylight: bool,

    /// Rule for the recurring onsets
    pub rrule: Option<ValueRecurrenceRule>,

    /// Explicit onsets
    pub rdates: Vec<ValueDateTime>,

    /// Time zone names (TZNAME)
    pub tznames: Vec<String>,
}

impl TimeZoneObservance {
    /// STANDARD observance with a single onset.
    #[must_use]
    pub fn standard(
        dtstart: ValueDateTime,
        offset_from: ValueUtcOffset,
        offset_to: ValueUtcOffset,
    ) -> Self {
        Self::new(dtstart, offset_from, offset_to, false)
    }

    /// DAYLIGHT observance with a single onset.
    #[must_use]
    pub fn daylight(
        dtstart: ValueDateTime,
        offset_from: ValueUtcOffset,
        offset_to: ValueUtcOffset,
    ) -> Self {
        Self::new(dtstart, offset_from, offset_to, true)
    }

    fn new(
        dtstart: ValueDateTime,
        offset_from: ValueUtcOffset,
        offset_to: ValueUtcOffset,
        is_daylight: bool,
    ) -> Self {
        Self {
            dtstart: Some(dtstart),
            offset_from: Some(offset_from),
            offset_to: Some(offset_to),
            is_daylight,
            rrule: None,
            rdates: Vec::new(),
            tznames: Vec::new(),
        }
    }

    /// Set the recurrence rule of the onsets.
    #[must_use]
    pub fn with_rrule(mut self, rrule: ValueRecurrenceRule) -> Self {
        self.rrule = Some(rrule);
        self
    }

    /// Set the explicit onsets.
    #[must_use]
    pub fn with_rdates(mut self, rdates: Vec<ValueDateTime>) -> Self {
        self.rdates = rdates;
        self
    }

    /// Add a time zone name.
    #[must_use]
    pub fn with_tzname(mut self, name: impl Into<String>) -> Self {
        self.tznames.push(name.into());
        self
    }

    /// Component name of the observance, `STANDARD` or `DAYLIGHT`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        if self.is_daylight {
            KW_DAYLIGHT
        } else {
            KW_STANDARD
        }
    }

    /// Append the transitions of this observance up to the end of
    /// `until_year`.
    pub(super) fn expand_into(&self, tzid: &str, until_year: i32, out: &mut Vec<Transition>) {
        let (Some(dtstart), Some(from), Some(to)) = (&self.dtstart, self.offset_from, self.offset_to)
        else {
            tracing::warn!(
                tzid,
                kind = self.kind(),
                "skipping observance without DTSTART, TZOFFSETFROM or TZOFFSETTO"
            );
            return;
        };

        let prev = from.to_seconds();
        let transition = |wall| Transition {
            wall,
            utc_offset: to.to_seconds(),
            prev_utc_offset: prev,
            is_daylight: self.is_daylight,
        };
        let start = dtstart.civil();

        if self.rrule.is_none() && self.rdates.is_empty() {
            out.push(transition(start));
            return;
        }

        for rdate in &self.rdates {
            let wall = if rdate.is_date() {
                CivilDateTime {
                    hour: start.hour,
                    minute: start.minute,
                    second: start.second,
                    ..rdate.civil()
                }
            } else if rdate.zone().is_utc() {
                rdate.civil().adjust(0, 0, 0, i64::from(prev), false)
            } else {
                rdate.civil()
            };
            out.push(transition(wall));
        }

        let Some(rrule) = &self.rrule else {
            return;
        };
        let mut rule = rrule.clone();
        if let Some(until) = &rule.until
            && until.zone().is_utc()
        {
            let local = until.civil().adjust(0, 0, 0, i64::from(prev), false);
            rule.until = Some(ValueDateTime::from_civil(local, until.is_date(), Zone::Floating));
        }

        let iter = match RecurIterator::new(rule, dtstart.with_zone(Zone::Floating)) {
            Ok(iter) => iter,
            Err(err) => {
                tracing::warn!(
                    tzid,
                    kind = self.kind(),
                    %err,
                    "skipping observance with an invalid rule"
                );
                return;
            }
        };
        for occurrence in iter {
            match occurrence {
                Ok(occurrence) if occurrence.year() > until_year => break,
                Ok(occurrence) => out.push(transition(occurrence.civil())),
                Err(err) => {
                    tracing::warn!(
                        tzid,
                        kind = self.kind(),
                        %err,
                        "stopped expanding observance"
                    );
                    break;
                }
            }
        }
    }
}
