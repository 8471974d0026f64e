// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Temporal core of iCalendar: date-time values, time zone offsets and
//! recurrence expansion.
//!
//! ```
//! use icaltime::{RecurExpansion, RecurrenceFrequency, RecurrenceSet, ValueDateTime,
//!     ValueRecurrenceRule};
//!
//! let mut rule = ValueRecurrenceRule::new(RecurrenceFrequency::Daily);
//! rule.count = Some(3);
//! let set = RecurrenceSet::new(ValueDateTime::date(2025, 1, 1))
//!     .with_rrule(rule)
//!     .with_exdate(ValueDateTime::date(2025, 1, 2));
//!
//! let dates: Vec<String> = RecurExpansion::new(set)?
//!     .map(|r| r.map(|dt| dt.to_string()))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(dates, ["20250101", "20250103"]);
//! # Ok::<(), icaltime::RecurError>(())
//! ```

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

pub mod config;
pub mod formatter;
pub mod keyword;
pub mod recur;
pub mod timezone;
pub mod value;

pub use crate::config::{ConfigError, ExpansionConfig};
pub use crate::recur::{
    DateTimeSnapshot, ExpansionSnapshot, IteratorSnapshot, RecurError, RecurExpansion,
    RecurIterator, RecurResult, RecurrenceSet, RuleSnapshot,
};
pub use crate::timezone::{TimeZone, TimeZoneObservance, TimeZoneRegistry, Transition, Zone};
pub use crate::value::{
    ByRule, ByRuleClass, RecurrenceFrequency, ValueDateTime, ValueDuration, ValueRecurrenceRule,
    ValueUtcOffset, WeekDay, WeekDayNum,
};
