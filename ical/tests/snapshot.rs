// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for persisting and resuming iteration state.

use icaltime::{
    ExpansionSnapshot, IteratorSnapshot, RecurError, RecurExpansion, RecurIterator,
    RecurrenceFrequency, RecurrenceSet, TimeZone, TimeZoneObservance, TimeZoneRegistry,
    ValueDateTime, ValueRecurrenceRule, ValueUtcOffset, WeekDayNum, Zone,
};

fn remaining<I>(iter: I, n: usize) -> Vec<String>
where
    I: Iterator<Item = Result<ValueDateTime, RecurError>>,
{
    iter.take(n).map(|r| r.unwrap().to_string()).collect()
}

#[test]
fn snapshot_yearly_iterator_resumes_through_json() {
    let mut rule = ValueRecurrenceRule::new(RecurrenceFrequency::Yearly);
    rule.by_month = vec![3, 9];
    rule.by_day = vec![WeekDayNum::nth(-1, icaltime::WeekDay::Sunday)];
    rule.count = Some(8);
    let mut iter = RecurIterator::new(rule, ValueDateTime::date(2024, 1, 1)).unwrap();
    for _ in 0..3 {
        iter.next_occurrence().unwrap();
    }

    let json = serde_json::to_string(&iter.snapshot()).unwrap();
    let snapshot: IteratorSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot.occurrence_number, 3);
    assert_eq!(snapshot.days.len(), 2);

    let restored = snapshot.restore(&TimeZoneRegistry::new()).unwrap();
    let expected = remaining(iter, 10);
    assert_eq!(expected.len(), 5);
    assert_eq!(remaining(restored, 10), expected);
}

#[test]
fn snapshot_expansion_resumes_through_json() {
    let mut weekly = ValueRecurrenceRule::new(RecurrenceFrequency::Weekly);
    weekly.count = Some(6);
    let set = RecurrenceSet::new(ValueDateTime::date_time(2024, 1, 1, 9, 0, 0).with_zone(Zone::Utc))
        .with_rrule(weekly)
        .with_rdate(ValueDateTime::date_time(2024, 1, 3, 9, 0, 0).with_zone(Zone::Utc))
        .with_exdate(ValueDateTime::date_time(2024, 1, 22, 9, 0, 0).with_zone(Zone::Utc));
    let mut expansion = RecurExpansion::new(set).unwrap();
    for _ in 0..2 {
        expansion.next_occurrence().unwrap();
    }

    let json = serde_json::to_string(&expansion.snapshot()).unwrap();
    let snapshot: ExpansionSnapshot = serde_json::from_str(&json).unwrap();
    let restored = snapshot.restore(&TimeZoneRegistry::new()).unwrap();

    let expected = remaining(expansion, 10);
    assert_eq!(
        expected,
        ["20240108T090000Z", "20240115T090000Z", "20240129T090000Z", "20240205T090000Z"]
    );
    assert_eq!(remaining(restored, 10), expected);
}

#[test]
fn snapshot_zone_resolved_through_registry() {
    let tokyo = || {
        let jst = ValueUtcOffset::from_seconds(9 * 3600);
        let standard =
            TimeZoneObservance::standard(ValueDateTime::date_time(1951, 9, 8, 0, 0, 0), jst, jst);
        TimeZone::new("Asia/Tokyo", vec![standard], Vec::new())
    };

    let mut registry = TimeZoneRegistry::new();
    let zone = registry.register(tokyo());
    let rule = ValueRecurrenceRule::new(RecurrenceFrequency::Daily);
    let start = ValueDateTime::date_time(2024, 4, 1, 8, 0, 0).with_zone(zone);
    let mut iter = RecurIterator::new(rule, start).unwrap();
    iter.next_occurrence().unwrap();

    let snapshot = iter.snapshot();
    assert_eq!(snapshot.dtstart.tzid.as_deref(), Some("Asia/Tokyo"));

    let err = snapshot.restore(&TimeZoneRegistry::new()).unwrap_err();
    assert!(matches!(err, RecurError::UnknownTimezone { ref tzid } if tzid == "Asia/Tokyo"));

    let mut restored = snapshot.restore(&registry).unwrap();
    let next = restored.next_occurrence().unwrap().unwrap();
    assert_eq!(next.to_unix_time(), 1_712_012_400);
    assert_eq!(next.zone().tzid(), "Asia/Tokyo");
}

#[test]
fn snapshot_schema_is_stable() {
    let rule = ValueRecurrenceRule::new(RecurrenceFrequency::Daily);
    let iter = RecurIterator::new(rule, ValueDateTime::date(2024, 1, 1)).unwrap();
    let value = serde_json::to_value(iter.snapshot()).unwrap();

    assert_eq!(value["rule"]["freq"], "DAILY");
    assert_eq!(value["dtstart"]["year"], 2024);
    assert_eq!(value["dtstart"]["is_date"], true);
    assert!(value["dtstart"].get("tzid").is_none());
    assert_eq!(value["by_data"]["hour"], serde_json::json!([0]));
    assert_eq!(value["occurrence_number"], 0);
    assert_eq!(value["completed"], false);
}
