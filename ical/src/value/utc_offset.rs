// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! UTC offset value type as defined in RFC 5545 Section 3.3.14.

use std::cmp::Ordering;
use std::fmt::{self, Display};

/// Lower bound of a normalized offset, in seconds.
pub const MIN_OFFSET_SECONDS: i32 = -43_200;

/// Upper bound of a normalized offset, in seconds.
pub const MAX_OFFSET_SECONDS: i32 = 50_400;

const WRAP_SECONDS: i32 = 97_200;

fn normalize_seconds(seconds: i64) -> i64 {
    let (min, max, wrap) = (
        i64::from(MIN_OFFSET_SECONDS),
        i64::from(MAX_OFFSET_SECONDS),
        i64::from(WRAP_SECONDS),
    );
    let mut secs = seconds;
    if secs < min {
        secs += (min - secs + wrap - 1) / wrap * wrap;
    }
    if secs > max {
        secs -= (secs - max + wrap - 1) / wrap * wrap;
    }
    if secs < min { max } else { secs }
}

/// UTC Offset Value defined in RFC 5545 Section 3.3.14
///
/// Always normalized into `[-12:00, +14:00]`. Seconds are not kept.
#[derive(Debug, Clone, Copy)]
pub struct ValueUtcOffset {
    positive: bool,
    hour: u8,
    minute: u8,
}

impl ValueUtcOffset {
    /// UTC itself.
    pub const UTC: Self = Self {
        positive: true,
        hour: 0,
        minute: 0,
    };

    /// Build from a sign and magnitudes, then normalize.
    #[must_use]
    pub fn new(positive: bool, hour: u8, minute: u8) -> Self {
        let magnitude = i32::from(hour) * 3600 + i32::from(minute) * 60;
        let secs = if positive { magnitude } else { -magnitude };
        let mut offset = Self::from_seconds(secs);
        if offset.to_seconds() == 0 {
            offset.positive = positive;
        }
        offset
    }

    /// Build from a number of seconds, then normalize.
    ///
    /// Values outside the window are shifted by 27 hours until they fit,
    /// keeping the sign of a zero offset. The one-hour gap that no shift can
    /// reach is clamped to the upper bound.
    #[must_use]
    pub fn from_seconds(seconds: i32) -> Self {
        let secs = normalize_seconds(i64::from(seconds));
        let abs = secs.unsigned_abs();
        #[expect(clippy::cast_possible_truncation)]
        let (hour, minute) = ((abs / 3600) as u8, (abs % 3600 / 60) as u8);
        Self {
            positive: if secs == 0 { seconds >= 0 } else { secs > 0 },
            hour,
            minute,
        }
    }

    /// Offset in seconds.
    #[must_use]
    pub fn to_seconds(&self) -> i32 {
        let magnitude = i32::from(self.hour) * 3600 + i32::from(self.minute) * 60;
        if self.positive { magnitude } else { -magnitude }
    }

    /// Whether the sign is positive.
    #[must_use]
    pub fn positive(&self) -> bool {
        self.positive
    }

    /// Hour magnitude.
    #[must_use]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute magnitude.
    #[must_use]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// vCard text form, `+HH:MM`.
    #[must_use]
    pub fn to_vcard_string(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = crate::formatter::write_utc_offset_vcard(&mut out, *self);
        out
    }
}

impl Default for ValueUtcOffset {
    fn default() -> Self {
        Self::UTC
    }
}

impl PartialEq for ValueUtcOffset {
    fn eq(&self, other: &Self) -> bool {
        self.to_seconds() == other.to_seconds()
    }
}

impl Eq for ValueUtcOffset {}

impl PartialOrd for ValueUtcOffset {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ValueUtcOffset {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_seconds().cmp(&other.to_seconds())
    }
}

impl Display for ValueUtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        crate::formatter::write_utc_offset(f, *self)
    }
}

#[cfg(feature = "jiff")]
impl TryFrom<ValueUtcOffset> for jiff::tz::Offset {
    type Error = jiff::Error;

    fn try_from(offset: ValueUtcOffset) -> Result<Self, Self::Error> {
        jiff::tz::Offset::from_seconds(offset.to_seconds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_into_window() {
        let cases = [
            (0, 0),
            (3600, 3600),
            (-43_200, -43_200),
            (50_400, 50_400),
            (-46_800, 50_400), // -13:00 + 27h = +14:00
            (54_000, -43_200), // +15:00 - 27h = -12:00
            (97_200 + 3600, 3600),
            (-97_200 * 3 - 3600, -3600),
        ];
        for (input, expected) in cases {
            assert_eq!(ValueUtcOffset::from_seconds(input).to_seconds(), expected, "{input}");
        }
    }

    #[test]
    fn always_within_bounds() {
        for secs in (-200_000..200_000).step_by(599) {
            let normalized = ValueUtcOffset::from_seconds(secs).to_seconds();
            assert!(
                (MIN_OFFSET_SECONDS..=MAX_OFFSET_SECONDS).contains(&normalized),
                "{secs} normalized to {normalized}"
            );
        }
    }

    #[test]
    fn zero_keeps_sign() {
        let offset = ValueUtcOffset::new(false, 0, 0);
        assert!(!offset.positive());
        assert_eq!(offset.to_string(), "-0000");
        assert_eq!(offset, ValueUtcOffset::UTC);
    }

    #[test]
    fn drops_seconds() {
        let offset = ValueUtcOffset::from_seconds(-(5 * 3600 + 30 * 60 + 15));
        assert_eq!((offset.positive(), offset.hour(), offset.minute()), (false, 5, 30));
    }

    #[test]
    fn text_forms() {
        let offset = ValueUtcOffset::new(false, 5, 0);
        assert_eq!(offset.to_string(), "-0500");
        assert_eq!(offset.to_vcard_string(), "-05:00");
        let offset = ValueUtcOffset::new(true, 5, 45);
        assert_eq!(offset.to_string(), "+0545");
        assert_eq!(offset.to_vcard_string(), "+05:45");
    }

    #[test]
    fn ordering() {
        assert!(ValueUtcOffset::new(false, 1, 0) < ValueUtcOffset::UTC);
        assert!(ValueUtcOffset::new(true, 1, 0) > ValueUtcOffset::new(true, 0, 30));
    }
}
