// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for recurrence rule iteration, mostly the examples of
//! RFC 5545 Section 3.8.5.3.

use icaltime::{
    RecurError, RecurIterator, RecurrenceFrequency, ValueDateTime, ValueRecurrenceRule, WeekDay,
    WeekDayNum, Zone,
};

use RecurrenceFrequency::{Daily, Hourly, Minutely, Monthly, Weekly, Yearly};
use WeekDay::{Friday, Monday, Sunday, Thursday, Tuesday, Wednesday};

fn rule(freq: RecurrenceFrequency) -> ValueRecurrenceRule {
    ValueRecurrenceRule::new(freq)
}

fn days(days: &[WeekDay]) -> Vec<WeekDayNum> {
    days.iter().copied().map(WeekDayNum::every).collect()
}

fn expand(rule: ValueRecurrenceRule, dtstart: ValueDateTime, limit: usize) -> Vec<String> {
    RecurIterator::new(rule, dtstart)
        .unwrap()
        .take(limit)
        .map(|r| r.unwrap().to_string())
        .collect()
}

fn at_nine(year: i32, month: u8, day: u8) -> ValueDateTime {
    ValueDateTime::date_time(year, month, day, 9, 0, 0)
}

/// Start value, then every `step` days after it that falls in `months`.
fn every_days_in_months(start: &ValueDateTime, step: i64, months: &[u8], n: usize) -> Vec<String> {
    let day = i64::from(start.day());
    let later = (1..)
        .map(|k| start.with_day(day + step * k))
        .filter(|dt| months.contains(&dt.month()));
    std::iter::once(start.clone())
        .chain(later)
        .take(n)
        .map(|dt| dt.to_string())
        .collect()
}

#[test]
fn recur_daily_dates() {
    let got = expand(rule(Daily), ValueDateTime::date(2025, 1, 1), 3);
    assert_eq!(got, ["20250101", "20250102", "20250103"]);
}

#[test]
fn recur_daily_count_and_interval() {
    let mut r = rule(Daily);
    r.count = Some(10);
    let got = expand(r, at_nine(1997, 9, 2), 20);
    assert_eq!(got.len(), 10);
    assert_eq!(got.last().map(String::as_str), Some("19970911T090000"));

    let mut r = rule(Daily);
    r.interval = Some(10);
    r.count = Some(5);
    let got = expand(r, at_nine(1997, 9, 2), 20);
    assert_eq!(
        got,
        [
            "19970902T090000",
            "19970912T090000",
            "19970922T090000",
            "19971002T090000",
            "19971012T090000"
        ]
    );
}

#[test]
fn recur_every_other_week_with_week_start() {
    let mut r = rule(Weekly);
    r.interval = Some(2);
    r.until = Some(ValueDateTime::date_time(1997, 12, 24, 0, 0, 0).with_zone(Zone::Utc));
    r.wkst = Some(Sunday);
    r.by_day = days(&[Monday, Wednesday, Friday]);
    let got = expand(r, at_nine(1997, 9, 1), 100);
    assert_eq!(
        got.get(..7).unwrap(),
        [
            "19970901T090000",
            "19970903T090000",
            "19970905T090000",
            "19970915T090000",
            "19970917T090000",
            "19970919T090000",
            "19970929T090000"
        ]
    );
    assert_eq!(got.len(), 25);
    assert_eq!(got.last().map(String::as_str), Some("19971222T090000"));
}

#[test]
fn recur_week_start_changes_result() {
    let base = |wkst| {
        let mut r = rule(Weekly);
        r.interval = Some(2);
        r.count = Some(4);
        r.by_day = days(&[Tuesday, Sunday]);
        r.wkst = Some(wkst);
        expand(r, at_nine(1997, 8, 5), 10)
    };
    assert_eq!(
        base(Monday),
        ["19970805T090000", "19970810T090000", "19970819T090000", "19970824T090000"]
    );
    assert_eq!(
        base(Sunday),
        ["19970805T090000", "19970817T090000", "19970819T090000", "19970831T090000"]
    );
}

#[test]
fn recur_monthly_first_friday() {
    let mut r = rule(Monthly);
    r.by_day = vec![WeekDayNum::nth(1, Friday)];
    let got = expand(r, ValueDateTime::date(2024, 1, 1), 3);
    assert_eq!(got, ["20240105", "20240202", "20240301"]);

    let mut r = rule(Monthly);
    r.count = Some(10);
    r.by_day = vec![WeekDayNum::nth(1, Friday)];
    let got = expand(r, at_nine(1997, 9, 5), 20);
    assert_eq!(got.len(), 10);
    assert_eq!(got.get(4).map(String::as_str), Some("19980102T090000"));
    assert_eq!(got.last().map(String::as_str), Some("19980605T090000"));
}

#[test]
fn recur_monthly_second_to_last_monday() {
    let mut r = rule(Monthly);
    r.count = Some(6);
    r.by_day = vec![WeekDayNum::nth(-2, Monday)];
    let got = expand(r, at_nine(1997, 9, 22), 10);
    assert_eq!(
        got,
        [
            "19970922T090000",
            "19971020T090000",
            "19971117T090000",
            "19971222T090000",
            "19980119T090000",
            "19980216T090000"
        ]
    );
}

#[test]
fn recur_friday_the_thirteenth() {
    let mut r = rule(Monthly);
    r.by_day = days(&[Friday]);
    r.by_month_day = vec![13];
    let got = expand(r, at_nine(1997, 9, 2), 5);
    assert_eq!(
        got,
        [
            "19980213T090000",
            "19980313T090000",
            "19981113T090000",
            "19990813T090000",
            "20001013T090000"
        ]
    );
}

#[test]
fn recur_monthly_set_positions() {
    let mut r = rule(Monthly);
    r.count = Some(3);
    r.by_day = days(&[Tuesday, Wednesday, Thursday]);
    r.by_set_pos = vec![3];
    let got = expand(r, at_nine(1997, 9, 4), 10);
    assert_eq!(got, ["19970904T090000", "19971007T090000", "19971106T090000"]);

    let mut r = rule(Monthly);
    r.by_day = days(&[Monday, Tuesday, Wednesday, Thursday, Friday]);
    r.by_set_pos = vec![-2];
    let got = expand(r, at_nine(1997, 9, 29), 5);
    assert_eq!(
        got,
        [
            "19970929T090000",
            "19971030T090000",
            "19971127T090000",
            "19971230T090000",
            "19980129T090000"
        ]
    );
}

#[test]
fn recur_yearly_count_completes() {
    let mut r = rule(Yearly);
    r.count = Some(3);
    let mut iter = RecurIterator::new(r, ValueDateTime::date(2024, 5, 5)).unwrap();
    let mut produced = Vec::new();
    while let Some(dt) = iter.next_occurrence().unwrap() {
        produced.push(dt.to_string());
    }
    assert_eq!(produced, ["20240505", "20250505", "20260505"]);
    assert!(iter.is_completed());
    assert_eq!(iter.next_occurrence().unwrap(), None);
    assert!(iter.next().is_none());
}

#[test]
fn recur_yearly_by_month() {
    let mut r = rule(Yearly);
    r.count = Some(10);
    r.by_month = vec![6, 7];
    let got = expand(r, at_nine(1997, 6, 10), 20);
    assert_eq!(got.len(), 10);
    assert_eq!(
        got.get(..4).unwrap(),
        ["19970610T090000", "19970710T090000", "19980610T090000", "19980710T090000"]
    );
}

#[test]
fn recur_yearly_by_day_forms() {
    let mut r = rule(Yearly);
    r.by_day = vec![WeekDayNum::nth(20, Monday)];
    let got = expand(r, at_nine(1997, 5, 19), 3);
    assert_eq!(got, ["19970519T090000", "19980518T090000", "19990517T090000"]);

    let mut r = rule(Yearly);
    r.by_week_no = vec![20];
    r.by_day = days(&[Monday]);
    let got = expand(r, at_nine(1997, 5, 12), 3);
    assert_eq!(got, ["19970512T090000", "19980511T090000", "19990517T090000"]);

    let mut r = rule(Yearly);
    r.by_month = vec![3];
    r.by_day = days(&[Thursday]);
    let got = expand(r, at_nine(1997, 3, 13), 7);
    assert_eq!(
        got,
        [
            "19970313T090000",
            "19970320T090000",
            "19970327T090000",
            "19980305T090000",
            "19980312T090000",
            "19980319T090000",
            "19980326T090000"
        ]
    );
}

#[test]
fn recur_election_day() {
    let mut r = rule(Yearly);
    r.interval = Some(4);
    r.by_month = vec![11];
    r.by_day = days(&[Tuesday]);
    r.by_month_day = (2..=8).collect();
    let got = expand(r, at_nine(1996, 11, 5), 3);
    assert_eq!(got, ["19961105T090000", "20001107T090000", "20041102T090000"]);
}

#[test]
fn recur_sub_daily_frequencies() {
    let mut r = rule(Hourly);
    r.interval = Some(3);
    r.until = Some(ValueDateTime::date_time(1997, 9, 2, 17, 0, 0).with_zone(Zone::Utc));
    let got = expand(r, at_nine(1997, 9, 2), 10);
    assert_eq!(got, ["19970902T090000", "19970902T120000", "19970902T150000"]);

    let mut r = rule(Minutely);
    r.interval = Some(15);
    r.count = Some(6);
    let got = expand(r, at_nine(1997, 9, 2), 10);
    assert_eq!(got.last().map(String::as_str), Some("19970902T101500"));

    let mut r = rule(Daily);
    r.by_hour = (9..=16).collect();
    r.by_minute = vec![0, 20, 40];
    let got = expand(r, at_nine(1997, 9, 2), 25);
    assert_eq!(
        got.get(..4).unwrap(),
        ["19970902T090000", "19970902T092000", "19970902T094000", "19970902T100000"]
    );
    assert_eq!(got.get(24).map(String::as_str), Some("19970903T090000"));
}

#[test]
fn recur_strictly_increasing() {
    let mut r = rule(Monthly);
    r.by_month_day = vec![-1, 1, 15];
    r.by_hour = vec![8, 20];
    let got: Vec<_> = RecurIterator::new(r, at_nine(2024, 1, 1))
        .unwrap()
        .take(200)
        .map(Result::unwrap)
        .collect();
    assert!(got.windows(2).all(|w| matches!(w, [a, b] if a < b)));
}

#[test]
fn recur_contradictory_rule_is_non_advancing() {
    let mut r = rule(Daily);
    r.interval = Some(7);
    r.by_day = days(&[Tuesday]);
    let mut iter = RecurIterator::new(r, ValueDateTime::date(2024, 1, 1)).unwrap();
    assert_eq!(
        iter.next_occurrence().unwrap(),
        Some(ValueDateTime::date(2024, 1, 1))
    );
    let err = iter.next_occurrence().unwrap_err();
    assert!(matches!(err, RecurError::NonAdvancing { .. }));
    assert!(iter.is_completed());
}

#[test]
fn recur_invalid_combinations() {
    #[rustfmt::skip]
    let cases: [(RecurrenceFrequency, fn(&mut ValueRecurrenceRule)); 5] = [
        (Yearly,  |r| { r.by_year_day = vec![1]; r.by_month = vec![1]; }),
        (Yearly,  |r| { r.by_week_no = vec![1]; r.by_month_day = vec![1]; }),
        (Monthly, |r| r.by_week_no = vec![1]),
        (Weekly,  |r| r.by_month_day = vec![1]),
        (Daily,   |r| r.by_year_day = vec![1]),
    ];
    for (freq, setup) in cases {
        let mut r = rule(freq);
        setup(&mut r);
        let err = RecurIterator::new(r.clone(), ValueDateTime::date(2024, 1, 1)).unwrap_err();
        assert!(
            matches!(err, RecurError::InvalidByRuleCombination { .. }),
            "{r} should be rejected, got {err}"
        );
    }
}

#[test]
fn recur_next_occurrence_after_recurrence_id() {
    let mut r = rule(Weekly);
    r.by_day = days(&[Monday]);
    let dtstart = at_nine(2024, 1, 1);
    let recurrence_id = ValueDateTime::date_time(2024, 1, 8, 9, 0, 0).with_zone(Zone::Utc);
    let next = r.next_occurrence(&dtstart, &recurrence_id).unwrap().unwrap();
    assert_eq!(next.to_string(), "20240115T090000Z");
}

#[test]
fn recur_weekly_by_month_keeps_weekday() {
    for interval in [1, 2] {
        let mut r = rule(Weekly);
        r.interval = Some(interval);
        r.by_day = days(&[Monday]);
        r.by_month = vec![1, 3];
        let start = ValueDateTime::date(2024, 1, 1);
        let step = 7 * i64::from(interval);
        assert_eq!(
            expand(r, start.clone(), 40),
            every_days_in_months(&start, step, &[1, 3], 40),
            "INTERVAL={interval}"
        );
    }

    let mut r = rule(Weekly);
    r.interval = Some(2);
    r.by_day = days(&[Monday]);
    r.by_month = vec![1, 3];
    let got = expand(r, ValueDateTime::date(2024, 1, 1), 12);
    for date in ["20240311", "20250113", "20250127", "20250310"] {
        assert!(got.iter().any(|d| d == date), "{date} missing from {got:?}");
    }
}

#[test]
fn recur_daily_interval_by_month_keeps_phase() {
    let mut r = rule(Daily);
    r.interval = Some(3);
    r.by_month = vec![1, 7];
    let start = ValueDateTime::date(2023, 11, 1);
    let got = expand(r, start.clone(), 60);
    assert_eq!(got, every_days_in_months(&start, 3, &[1, 7], 60));
    assert_eq!(got.get(1).map(String::as_str), Some("20240103"));
    assert_eq!(got.get(2).map(String::as_str), Some("20240106"));
}

#[test]
fn recur_week_numbers_cross_year_boundaries() {
    let mut r = rule(Yearly);
    r.by_week_no = vec![1, 52, 53];
    r.by_day = days(&[Monday, Sunday]);
    let got = expand(r, ValueDateTime::date(2019, 12, 1), 12);
    assert_eq!(
        got,
        [
            "20191223", "20191229", "20191230", "20200105", "20201221", "20201227",
            "20201228", "20210103", "20210104", "20210110", "20211227", "20220102",
        ]
    );
}
