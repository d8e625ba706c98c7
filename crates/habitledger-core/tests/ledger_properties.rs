//! Property tests for the ledger invariants.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use habitledger_core::date_key::date_key;
use habitledger_core::habit::{
    creation_day, day_completion_fraction, is_applicable, Frequency, Habit, HistoryValue,
    StreakCalculator,
};
use proptest::prelude::*;

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn frequency() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Daily),
        Just(Frequency::SpecificDays),
        Just(Frequency::TimesPerWeek),
        Just(Frequency::TimesPerDay),
    ]
}

fn boolean_frequency() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Daily),
        Just(Frequency::SpecificDays),
        Just(Frequency::TimesPerWeek),
    ]
}

fn history_value() -> impl Strategy<Value = HistoryValue> {
    prop_oneof![
        Just(HistoryValue::Done),
        Just(HistoryValue::NotDone),
        (0u32..10).prop_map(HistoryValue::Count),
    ]
}

prop_compose! {
    fn arb_habit(freq: BoxedStrategy<Frequency>, value: BoxedStrategy<HistoryValue>)(
        frequency in freq,
        created_offset in 0i64..30,
        created_minute in 0i64..(24 * 60),
        target_days in proptest::collection::vec(0u8..7, 0..7),
        target_count in proptest::option::of(1u32..5),
        entries in proptest::collection::vec((0i64..90, value), 0..60),
        best_streak in 0u32..20,
    ) -> Habit {
        let created = Utc.from_utc_datetime(
            &(base() + Duration::days(created_offset)).and_hms_opt(0, 0, 0).unwrap(),
        ) + Duration::minutes(created_minute);
        let mut habit = Habit::new("prop", frequency, created.timestamp_millis())
            .with_target_days(target_days);
        habit.target_count = target_count;
        habit.best_streak = best_streak;
        for (offset, value) in entries {
            habit.history.insert(date_key(base() + Duration::days(offset)), value);
        }
        habit
    }
}

fn any_habit() -> impl Strategy<Value = Habit> {
    arb_habit(frequency().boxed(), history_value().boxed())
}

fn boolean_habit() -> impl Strategy<Value = Habit> {
    arb_habit(boolean_frequency().boxed(), Just(HistoryValue::Done).boxed())
}

fn calc() -> StreakCalculator<Utc> {
    StreakCalculator::with_timezone(Utc)
}

proptest! {
    #[test]
    fn toggling_twice_restores_boolean_history(habit in boolean_habit(), offset in 0i64..90) {
        let today = base() + Duration::days(offset);
        let key = date_key(today);
        let before = habit.history.get(&key).copied();

        let mut toggled = habit.clone();
        calc().toggle(&mut toggled, today);
        calc().toggle(&mut toggled, today);

        prop_assert_eq!(toggled.history.get(&key).copied(), before);
        prop_assert_eq!(toggled.history.len(), habit.history.len());
    }

    #[test]
    fn best_streak_never_decreases(habit in any_habit(), offset in 0i64..90) {
        let today = base() + Duration::days(offset);
        let mut next = habit.clone();
        calc().toggle(&mut next, today);

        prop_assert!(next.best_streak >= habit.best_streak);
        prop_assert!(next.best_streak >= next.streak);
    }

    #[test]
    fn nothing_applies_before_creation(habit in any_habit(), back in 1i64..400) {
        let day = creation_day(&habit, &Utc) - Duration::days(back);
        prop_assert!(!is_applicable(&habit, day, &Utc));
    }

    #[test]
    fn fraction_stays_in_unit_interval(habit in any_habit(), value in proptest::option::of(history_value())) {
        let fraction = day_completion_fraction(&habit, value.as_ref());
        prop_assert!((0.0..=1.0).contains(&fraction));
    }

    #[test]
    fn toggle_never_stores_falsy_values(habit in any_habit(), offset in 0i64..90) {
        let today = base() + Duration::days(offset);
        let mut next = habit.clone();
        let outcome = calc().toggle(&mut next, today);
        if let Some(value) = outcome.current {
            prop_assert!(value.is_truthy());
            prop_assert_eq!(next.history.get(&date_key(today)).copied(), Some(value));
        } else {
            prop_assert!(!next.history.contains_key(&date_key(today)));
        }
    }
}
