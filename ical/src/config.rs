// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Limits that bound timezone and recurrence expansion.

/// Limits used while expanding time zones and recurrence sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Years past the requested one that a time zone expands at once.
    pub extra_coverage_years: u32,

    /// Last year a time zone ever expands transitions for.
    pub max_year: i32,

    /// Candidates a recurrence expansion may skip before giving up on one
    /// call to `next`.
    pub max_expansion_tries: u32,

    /// Months searched for a day matching both BYDAY and BYMONTHDAY.
    pub month_search_limit: u32,
}

impl ExpansionConfig {
    const MAX_COVERAGE_YEARS: u32 = 1000;

    /// Check that every limit can make progress.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extra_coverage_years > Self::MAX_COVERAGE_YEARS {
            return Err(ConfigError::CoverageTooLarge {
                years: self.extra_coverage_years,
                max: Self::MAX_COVERAGE_YEARS,
            });
        }
        if self.max_expansion_tries == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "max_expansion_tries",
            });
        }
        if self.month_search_limit == 0 {
            return Err(ConfigError::ZeroLimit {
                field: "month_search_limit",
            });
        }
        Ok(())
    }
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            extra_coverage_years: 5,
            max_year: 2035,
            max_expansion_tries: 500,
            month_search_limit: 48,
        }
    }
}

/// Invalid [`ExpansionConfig`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A limit that must allow at least one step is zero.
    #[error("{field} must be greater than zero")]
    ZeroLimit {
        /// Name of the field
        field: &'static str,
    },

    /// The timezone lookahead window is unreasonably large.
    #[error("extra_coverage_years is {years}, at most {max} is allowed")]
    CoverageTooLarge {
        /// Configured lookahead
        years: u32,
        /// Largest accepted lookahead
        max: u32,
    },
}
