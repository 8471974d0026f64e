// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar (RFC 5545) text forms of temporal values.
//!
//! Every formatter writes into any [`std::fmt::Write`] implementer, so the
//! same code backs the `Display` impls and writing into a `String`.
//!
//! # Example
//!
//! ```
//! use icaltime::ValueDuration;
//! use icaltime::formatter::write_duration;
//!
//! let mut out = String::new();
//! write_duration(&mut out, &ValueDuration::from_seconds(-90)).unwrap();
//! assert_eq!(out, "-PT1M30S");
//! ```

mod value;

pub use value::{
    write_date_time, write_duration, write_recurrence_rule, write_utc_offset,
    write_utc_offset_vcard,
};
