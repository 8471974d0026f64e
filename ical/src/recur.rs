// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence expansion: turning RRULE, RDATE and EXDATE data into concrete
//! occurrences.

mod days;
mod expansion;
mod iterator;
mod snapshot;

pub use expansion::{RecurExpansion, RecurrenceSet};
pub use iterator::{ByData, ByIndices, RecurIterator};
pub use snapshot::{DateTimeSnapshot, ExpansionSnapshot, IteratorSnapshot, RuleSnapshot};

use crate::config::ConfigError;
use crate::value::{ByRule, RecurrenceFrequency, ValueDateTime};

/// Result of recurrence operations.
pub type RecurResult<T> = Result<T, RecurError>;

/// Error raised while validating or expanding a recurrence.
#[non_exhaustive]
#[derive(Debug, Clone, thiserror::Error)]
pub enum RecurError {
    /// BY rule parts that RFC 5545 does not allow together
    #[error("{rule} {}", conflict_message(.conflict, .freq))]
    InvalidByRuleCombination {
        /// The offending rule part
        rule: ByRule,
        /// The rule part it conflicts with, if the conflict is not with the frequency
        conflict: Option<ByRule>,
        /// Frequency of the rule
        freq: RecurrenceFrequency,
    },

    /// Rule whose parts can never select a date
    #[error("Malformed recurrence rule: {message}")]
    MalformedRule {
        /// What went wrong
        message: String,
    },

    /// Rule that stopped producing later occurrences
    #[error("Recurrence rule does not advance past {last}")]
    NonAdvancing {
        /// Last candidate computed before giving up
        last: ValueDateTime,
    },

    /// Snapshot refers to a time zone the registry does not know
    #[error("Unknown time zone '{tzid}'")]
    UnknownTimezone {
        /// The unknown identifier
        tzid: String,
    },

    /// Snapshot that cannot be turned back into a live iterator
    #[error("Invalid snapshot: {message}")]
    InvalidSnapshot {
        /// What went wrong
        message: String,
    },

    /// Expansion limits that cannot be honoured
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

fn conflict_message(conflict: &Option<ByRule>, freq: &RecurrenceFrequency) -> String {
    match conflict {
        Some(other) => format!("cannot be combined with {other}"),
        None => format!("is not allowed in {freq} rules"),
    }
}
