// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for time zone offsets and zone-aware arithmetic.

use icaltime::{
    RecurIterator, RecurrenceFrequency, TimeZone, TimeZoneObservance, TimeZoneRegistry,
    ValueDateTime, ValueRecurrenceRule, ValueUtcOffset, WeekDay, WeekDayNum, Zone,
};

fn yearly(month: u8, day: WeekDayNum) -> ValueRecurrenceRule {
    let mut rule = ValueRecurrenceRule::new(RecurrenceFrequency::Yearly);
    rule.by_month = vec![month];
    rule.by_day = vec![day];
    rule
}

/// Europe/Berlin since 1996: last Sunday of March 02:00 and October 03:00.
fn berlin() -> TimeZone {
    let cet = ValueUtcOffset::from_seconds(3600);
    let cest = ValueUtcOffset::from_seconds(7200);
    let standard = TimeZoneObservance::standard(
        ValueDateTime::date_time(1996, 10, 27, 3, 0, 0),
        cest,
        cet,
    )
    .with_rrule(yearly(10, WeekDayNum::nth(-1, WeekDay::Sunday)))
    .with_tzname("CET");
    let daylight = TimeZoneObservance::daylight(
        ValueDateTime::date_time(1981, 3, 29, 2, 0, 0),
        cet,
        cest,
    )
    .with_rrule(yearly(3, WeekDayNum::nth(-1, WeekDay::Sunday)))
    .with_tzname("CEST");
    TimeZone::new("Europe/Berlin", vec![standard], vec![daylight])
}

fn new_york() -> TimeZone {
    let est = ValueUtcOffset::from_seconds(-5 * 3600);
    let edt = ValueUtcOffset::from_seconds(-4 * 3600);
    let standard =
        TimeZoneObservance::standard(ValueDateTime::date_time(2007, 11, 4, 2, 0, 0), edt, est)
            .with_rrule(yearly(11, WeekDayNum::nth(1, WeekDay::Sunday)));
    let daylight =
        TimeZoneObservance::daylight(ValueDateTime::date_time(2007, 3, 11, 2, 0, 0), est, edt)
            .with_rrule(yearly(3, WeekDayNum::nth(2, WeekDay::Sunday)));
    TimeZone::new("America/New_York", vec![standard], vec![daylight])
}

#[test]
fn timezone_berlin_offsets() {
    let zone = Zone::defined(berlin());
    #[rustfmt::skip]
    let cases = [
        ((2025, 1, 10, 12, 0), 3600),
        ((2025, 3, 30, 1, 59), 3600),
        ((2025, 3, 30, 3, 0), 7200),
        ((2025, 8, 1, 12, 0), 7200),
        ((2025, 10, 26, 1, 59), 7200),
        ((2025, 10, 26, 3, 0), 3600),
    ];
    for ((y, mo, d, h, mi), expected) in cases {
        let dt = ValueDateTime::date_time(y, mo, d, h, mi, 0).with_zone(zone.clone());
        assert_eq!(dt.utc_offset(), expected, "offset of {dt}");
    }
}

#[test]
fn timezone_convert_between_zones() {
    let berlin = Zone::defined(berlin());
    let new_york = Zone::defined(new_york());

    let meeting = ValueDateTime::date_time(2025, 7, 1, 15, 0, 0).with_zone(berlin.clone());
    let there = meeting.convert_to_zone(&new_york);
    assert_eq!((there.hour(), there.minute()), (9, 0));
    assert_eq!(there.zone().tzid(), "America/New_York");
    assert_eq!(there, meeting);

    let utc = meeting.convert_to_zone(&Zone::Utc);
    assert_eq!(utc.to_string(), "20250701T130000Z");
}

#[test]
fn timezone_daily_rule_keeps_wall_clock_across_dst() {
    let zone = Zone::defined(new_york());
    let rule = ValueRecurrenceRule::new(RecurrenceFrequency::Daily);
    let start = ValueDateTime::date_time(2024, 3, 9, 9, 0, 0).with_zone(zone);
    let occurrences: Vec<_> = RecurIterator::new(rule, start)
        .unwrap()
        .take(2)
        .map(Result::unwrap)
        .collect();

    let [first, second] = occurrences.as_slice() else {
        panic!("expected two occurrences");
    };
    assert_eq!((first.hour(), second.hour()), (9, 9));
    assert_eq!(second.subtract_date_tz(first).to_seconds(), 23 * 3600);
    assert_eq!(second.subtract_date(first).to_seconds(), 24 * 3600);
}

#[test]
fn timezone_registry_shares_zone() {
    let mut registry = TimeZoneRegistry::new();
    let zone = registry.register(berlin());
    let looked_up = registry.get("Europe/Berlin").unwrap();
    assert_eq!(zone, looked_up);

    // Both handles see the same lazily built table
    let dt = ValueDateTime::date_time(2030, 6, 1, 0, 0, 0).with_zone(zone);
    assert_eq!(dt.utc_offset(), 7200);
    let Zone::Defined(tz) = looked_up else {
        panic!("expected a defined zone");
    };
    assert_eq!(tz.expanded_until_year(), Some(2035));
    assert_eq!(tz.tznames(), ["CET", "CEST"]);
}

#[test]
fn timezone_compare_date_only_in_zone() {
    let new_york = Zone::defined(new_york());
    let late_utc = ValueDateTime::date_time(2025, 1, 2, 2, 0, 0).with_zone(Zone::Utc);
    let evening = ValueDateTime::date_time(2025, 1, 1, 20, 0, 0).with_zone(new_york.clone());
    assert_eq!(
        late_utc.compare_date_only_tz(&evening, &new_york),
        std::cmp::Ordering::Equal
    );
}
