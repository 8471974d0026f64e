// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Time zones and UTC offset resolution.
//!
//! A [`TimeZone`] is built from its STANDARD and DAYLIGHT observances. The
//! observances are expanded lazily into a sorted table of [`Transition`]s,
//! which is then binary searched to find the offset in effect at a given
//! wall-clock time.

mod observance;
mod registry;

pub use observance::TimeZoneObservance;
pub use registry::TimeZoneRegistry;

use std::fmt::{self, Display};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{ConfigError, ExpansionConfig};
use crate::keyword::{KW_TZID_FLOATING, KW_TZID_UTC};
use crate::value::CivilDateTime;

/// Zone a date-time value is expressed in.
#[derive(Debug, Clone, Default)]
pub enum Zone {
    /// Local time without a zone
    #[default]
    Floating,

    /// Coordinated Universal Time
    Utc,

    /// Zone defined by a VTIMEZONE, shared between values
    Defined(Arc<TimeZone>),
}

impl Zone {
    /// Wrap a time zone definition for sharing.
    #[must_use]
    pub fn defined(timezone: TimeZone) -> Self {
        Zone::Defined(Arc::new(timezone))
    }

    /// Identifier of the zone, `floating` and `UTC` for the built-in ones.
    #[must_use]
    pub fn tzid(&self) -> &str {
        match self {
            Zone::Floating => KW_TZID_FLOATING,
            Zone::Utc => KW_TZID_UTC,
            Zone::Defined(tz) => tz.tzid(),
        }
    }

    /// Whether this is the floating zone.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        matches!(self, Zone::Floating)
    }

    /// Whether this is UTC.
    #[must_use]
    pub fn is_utc(&self) -> bool {
        matches!(self, Zone::Utc)
    }

    /// Offset from UTC in seconds in effect at the wall-clock time `civil`.
    #[must_use]
    pub fn utc_offset(&self, civil: &CivilDateTime) -> i32 {
        match self {
            Zone::Floating | Zone::Utc => 0,
            Zone::Defined(tz) => tz.utc_offset(civil),
        }
    }
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.tzid() == other.tzid()
    }
}

impl Eq for Zone {}

impl Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tzid())
    }
}

/// Change of UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Wall-clock time of the change, in the offset before it
    pub wall: CivilDateTime,
    /// Offset in seconds after the change
    pub utc_offset: i32,
    /// Offset in seconds before the change
    pub prev_utc_offset: i32,
    /// Whether the change enters daylight saving time
    pub is_daylight: bool,
}

impl Transition {
    /// Earliest wall-clock time read with the new offset. For a backward
    /// change this is where the repeated hour begins.
    fn start(&self) -> CivilDateTime {
        let shift = self.utc_offset.min(self.prev_utc_offset) - self.prev_utc_offset;
        self.wall.adjust(0, 0, 0, i64::from(shift), false)
    }
}

#[derive(Debug, Default)]
struct TransitionTable {
    transitions: Vec<Transition>,
    expanded_until: Option<i32>,
    minimum_year: Option<i32>,
}

/// Time zone defined by STANDARD and DAYLIGHT observances.
#[derive(Debug)]
pub struct TimeZone {
    tzid: String,
    location: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    standard: Vec<TimeZoneObservance>,
    daylight: Vec<TimeZoneObservance>,
    config: ExpansionConfig,
    table: Mutex<TransitionTable>,
}

impl TimeZone {
    /// Create a time zone from its observances.
    pub fn new(
        tzid: impl Into<String>,
        standard: Vec<TimeZoneObservance>,
        daylight: Vec<TimeZoneObservance>,
    ) -> Self {
        Self {
            tzid: tzid.into(),
            location: None,
            latitude: None,
            longitude: None,
            standard,
            daylight,
            config: ExpansionConfig::default(),
            table: Mutex::new(TransitionTable::default()),
        }
    }

    /// Set the display location and its coordinates.
    #[must_use]
    pub fn with_location(
        mut self,
        location: impl Into<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Self {
        self.location = Some(location.into());
        self.latitude = latitude;
        self.longitude = longitude;
        self
    }

    /// Use explicit expansion limits.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `config` does not validate.
    pub fn with_config(mut self, config: ExpansionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Time zone identifier
    #[must_use]
    pub fn tzid(&self) -> &str {
        &self.tzid
    }

    /// Display location
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Latitude of the location
    #[must_use]
    pub fn latitude(&self) -> Option<f64> {
        self.latitude
    }

    /// Longitude of the location
    #[must_use]
    pub fn longitude(&self) -> Option<f64> {
        self.longitude
    }

    /// Standard time observances
    #[must_use]
    pub fn standard(&self) -> &[TimeZoneObservance] {
        &self.standard
    }

    /// Daylight saving time observances
    #[must_use]
    pub fn daylight(&self) -> &[TimeZoneObservance] {
        &self.daylight
    }

    /// TZNAME values of all observances, without duplicates.
    #[must_use]
    pub fn tznames(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.observances().flat_map(|o| o.tznames.iter()) {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }

    /// Last year the transition table currently covers.
    #[must_use]
    pub fn expanded_until_year(&self) -> Option<i32> {
        self.table().expanded_until
    }

    /// Copy of the transitions expanded so far, sorted by wall-clock time.
    #[must_use]
    pub fn transitions(&self) -> Vec<Transition> {
        self.table().transitions.clone()
    }

    /// Offset from UTC in seconds at the wall-clock time `civil`, zero when
    /// the zone has no usable observance.
    #[must_use]
    pub fn utc_offset(&self, civil: &CivilDateTime) -> i32 {
        let mut table = self.table();
        self.ensure_coverage(&mut table, civil.year);
        match select(&table.transitions, *civil) {
            Some(t) => t.utc_offset,
            None => table
                .transitions
                .first()
                .map_or(0, |first| first.prev_utc_offset),
        }
    }

    /// Transition in effect at the wall-clock time `civil`, if any.
    ///
    /// Times before the first transition have none.
    #[must_use]
    pub fn lookup(&self, civil: &CivilDateTime) -> Option<Transition> {
        let mut table = self.table();
        self.ensure_coverage(&mut table, civil.year);
        select(&table.transitions, *civil)
    }

    fn table(&self) -> MutexGuard<'_, TransitionTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn observances(&self) -> impl Iterator<Item = &TimeZoneObservance> {
        self.standard.iter().chain(self.daylight.iter())
    }

    fn ensure_coverage(&self, table: &mut TransitionTable, year: i32) {
        let minimum = *table.minimum_year.get_or_insert(year);
        let max_year = self.config.max_year;
        if table
            .expanded_until
            .is_some_and(|until| until >= year.min(max_year))
        {
            return;
        }

        let extra = i32::try_from(self.config.extra_coverage_years).unwrap_or(i32::MAX);
        let until = year.max(minimum).saturating_add(extra).min(max_year);

        let mut transitions = Vec::new();
        for observance in self.observances() {
            observance.expand_into(&self.tzid, until, &mut transitions);
        }
        transitions.sort_by_key(|t| t.wall);

        tracing::debug!(
            tzid = %self.tzid,
            year = until,
            count = transitions.len(),
            "expanded time zone transitions"
        );
        table.transitions = transitions;
        table.expanded_until = Some(until);
    }
}

/// Pick the transition whose window contains `key`.
///
/// Inside the repeated hour of a backward change, the earlier transition
/// wins when the change enters daylight time from standard time.
fn select(transitions: &[Transition], key: CivilDateTime) -> Option<Transition> {
    let mut index = transitions.partition_point(|t| t.wall <= key);
    while transitions.get(index).is_some_and(|t| t.start() <= key) {
        index += 1;
    }
    while index > 0 && transitions.get(index - 1).is_some_and(|t| t.start() > key) {
        index -= 1;
    }

    let found = index.checked_sub(1)?;
    let current = *transitions.get(found)?;
    if current.utc_offset < current.prev_utc_offset
        && key < current.wall
        && current.is_daylight
        && let Some(prev) = found.checked_sub(1).and_then(|i| transitions.get(i))
        && !prev.is_daylight
    {
        return Some(*prev);
    }
    Some(current)
}
