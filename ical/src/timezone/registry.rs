// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use crate::keyword::{KW_TZID_FLOATING, KW_TZID_GMT, KW_TZID_UTC, KW_TZID_Z};
use crate::timezone::{TimeZone, Zone};

/// Lookup table from TZID to zone.
///
/// A registry is owned by whoever resolves identifiers, there is no global
/// instance. `UTC`, `Z`, `GMT` and `floating` are always known after
/// [`TimeZoneRegistry::new`] or [`TimeZoneRegistry::reset`].
#[derive(Debug, Clone)]
pub struct TimeZoneRegistry {
    zones: HashMap<String, Zone>,
}

impl TimeZoneRegistry {
    /// Registry holding only the built-in zones.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            zones: HashMap::new(),
        };
        registry.reset();
        registry
    }

    /// Register a time zone under its TZID, replacing any previous entry.
    /// Returns the shared zone.
    pub fn register(&mut self, timezone: TimeZone) -> Zone {
        let tzid = timezone.tzid().to_owned();
        let zone = Zone::defined(timezone);
        tracing::debug!(%tzid, "registered time zone");
        self.zones.insert(tzid, zone.clone());
        zone
    }

    /// Zone registered under `tzid`.
    #[must_use]
    pub fn get(&self, tzid: &str) -> Option<Zone> {
        self.zones.get(tzid).cloned()
    }

    /// Whether `tzid` is known.
    #[must_use]
    pub fn has(&self, tzid: &str) -> bool {
        self.zones.contains_key(tzid)
    }

    /// Remove and return the zone registered under `tzid`.
    pub fn remove(&mut self, tzid: &str) -> Option<Zone> {
        self.zones.remove(tzid)
    }

    /// Drop every registered zone and restore the built-in ones.
    pub fn reset(&mut self) {
        self.zones.clear();
        for tzid in [KW_TZID_UTC, KW_TZID_Z, KW_TZID_GMT] {
            self.zones.insert(tzid.to_owned(), Zone::Utc);
        }
        self.zones
            .insert(KW_TZID_FLOATING.to_owned(), Zone::Floating);
    }

    /// Number of known identifiers, built-in ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Whether no identifier is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl Default for TimeZoneRegistry {
    fn default() -> Self {
        Self::new()
    }
}
