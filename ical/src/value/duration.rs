// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Duration value type as defined in RFC 5545 Section 3.3.6.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::ops::Neg;

use serde::{Deserialize, Serialize};

/// Duration Value defined in RFC 5545 Section 3.3.6
///
/// Magnitudes are unsigned, the sign is kept separately. Two durations are
/// equal when they span the same number of seconds, so `P1W` equals `P7D`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ValueDuration {
    /// Whether the duration is positive
    pub positive: bool,
    /// Week Duration
    pub weeks: u64,
    /// Day Duration
    pub days: u64,
    /// Hour Duration
    pub hours: u64,
    /// Minute Duration
    pub minutes: u64,
    /// Second Duration
    pub seconds: u64,
}

impl ValueDuration {
    /// The empty duration.
    pub const ZERO: Self = Self {
        positive: true,
        weeks: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Duration of whole weeks.
    #[must_use]
    pub fn weeks(positive: bool, weeks: u64) -> Self {
        Self {
            positive,
            weeks,
            ..Self::ZERO
        }
    }

    /// Duration of days and time parts.
    #[must_use]
    pub fn date_time(positive: bool, days: u64, hours: u64, minutes: u64, seconds: u64) -> Self {
        Self {
            positive,
            weeks: 0,
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Decompose a number of seconds.
    ///
    /// Weeks are only used when the day count is a multiple of seven, in
    /// which case days is zero. Otherwise weeks is zero and days holds the
    /// full day count.
    #[must_use]
    pub fn from_seconds(seconds: i64) -> Self {
        let mut secs = seconds.unsigned_abs();
        let mut days = secs / 86_400;
        let mut weeks = 0;
        if days % 7 == 0 {
            weeks = days / 7;
            days = 0;
        }
        secs -= (days + 7 * weeks) * 86_400;
        let hours = secs / 3600;
        secs -= hours * 3600;
        let minutes = secs / 60;
        secs -= minutes * 60;
        Self {
            positive: seconds >= 0,
            weeks,
            days,
            hours,
            minutes,
            seconds: secs,
        }
    }

    /// Total length in seconds, saturating at the bounds of `i64`.
    #[must_use]
    pub fn to_seconds(&self) -> i64 {
        let total = i128::from(self.seconds)
            + 60 * i128::from(self.minutes)
            + 3600 * i128::from(self.hours)
            + 86_400 * i128::from(self.days)
            + 604_800 * i128::from(self.weeks);
        let signed = if self.positive { total } else { -total };
        i64::try_from(signed).unwrap_or(if signed < 0 { i64::MIN } else { i64::MAX })
    }

    /// Re-decompose into the canonical form of [`ValueDuration::from_seconds`].
    #[must_use]
    pub fn normalize(&self) -> Self {
        Self::from_seconds(self.to_seconds())
    }

    /// Whether the duration spans no time at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.to_seconds() == 0
    }

    /// Sign as a factor, `1` or `-1`.
    #[must_use]
    pub fn sign(&self) -> i64 {
        if self.positive { 1 } else { -1 }
    }
}

impl Default for ValueDuration {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for ValueDuration {
    fn eq(&self, other: &Self) -> bool {
        self.to_seconds() == other.to_seconds()
    }
}

impl Eq for ValueDuration {}

impl PartialOrd for ValueDuration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ValueDuration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_seconds().cmp(&other.to_seconds())
    }
}

impl Neg for ValueDuration {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            positive: !self.positive,
            ..self
        }
    }
}

impl Display for ValueDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::formatter::write_duration(f, self)
    }
}

#[cfg(feature = "jiff")]
impl From<ValueDuration> for jiff::SignedDuration {
    fn from(duration: ValueDuration) -> Self {
        jiff::SignedDuration::from_secs(duration.to_seconds())
    }
}
