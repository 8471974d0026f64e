// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Temporal value types of iCalendar, as defined in RFC 5545 Section 3.3.
//!
//! Values arrive here already parsed and range checked; this module keeps them
//! canonical and implements the calendar arithmetic on top of them.

pub mod calendar;
mod datetime;
mod duration;
mod rrule;
mod utc_offset;

pub use calendar::{CivilDateTime, DateCache};
pub use datetime::ValueDateTime;
pub use duration::ValueDuration;
pub use rrule::{
    ByRule, ByRuleClass, RecurrenceFrequency, ValueRecurrenceRule, WeekDay, WeekDayNum,
};
pub use utc_offset::{MAX_OFFSET_SECONDS, MIN_OFFSET_SECONDS, ValueUtcOffset};
