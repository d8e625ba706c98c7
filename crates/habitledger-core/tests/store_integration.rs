//! On-disk store workflows: reopen, lookups, and the feeds for sphere balance.

use chrono::{NaiveDate, TimeZone, Utc};
use habitledger_core::storage::migrations::{get_schema_version, SCHEMA_VERSION};
use habitledger_core::{
    CoreError, Frequency, Habit, JournalEntry, LedgerDb, SphereBalanceAnalyzer, StreakCalculator,
    TaskRecord,
};
use tempfile::TempDir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn ms(date: NaiveDate, hour: u32) -> i64 {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
        .timestamp_millis()
}

#[test]
fn test_history_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.db");
    let calc = StreakCalculator::with_timezone(Utc);

    let id = {
        let db = LedgerDb::open_at(&path).unwrap();
        let mut habit =
            Habit::new("Water", Frequency::TimesPerDay, ms(d(2024, 3, 1), 8)).with_target_count(2);
        calc.toggle(&mut habit, d(2024, 3, 1));
        calc.toggle(&mut habit, d(2024, 3, 1));
        calc.toggle(&mut habit, d(2024, 3, 2));
        db.add_habit(&habit).unwrap();
        habit.id
    };

    let db = LedgerDb::open_at(&path).unwrap();
    assert_eq!(get_schema_version(db.conn()), SCHEMA_VERSION);
    let habit = db.get_habit(&id).unwrap().unwrap();
    assert_eq!(habit.value_on(d(2024, 3, 1)).map(|v| v.count()), Some(2));
    assert_eq!(habit.value_on(d(2024, 3, 2)).map(|v| v.count()), Some(1));
    assert_eq!(habit.streak, 1);
    assert_eq!(habit.best_streak, 1);
}

#[test]
fn test_find_habit_by_prefix() {
    let db = LedgerDb::open_memory().unwrap();
    let created = ms(d(2024, 1, 1), 9);
    db.add_habit(&Habit::new("Read fiction", Frequency::Daily, created)).unwrap();
    db.add_habit(&Habit::new("Read papers", Frequency::Daily, created)).unwrap();
    db.add_habit(&Habit::new("Run", Frequency::Daily, created)).unwrap();

    assert_eq!(db.find_habit("run").unwrap().title, "Run");
    assert_eq!(db.find_habit("read p").unwrap().title, "Read papers");
    assert!(matches!(db.find_habit("read"), Err(CoreError::HabitNotFound(_))));
    assert!(matches!(db.find_habit("swim"), Err(CoreError::HabitNotFound(_))));
}

#[test]
fn test_archived_habits_hidden_by_default() {
    let db = LedgerDb::open_memory().unwrap();
    let mut habit = Habit::new("Old", Frequency::Daily, ms(d(2024, 1, 1), 9));
    habit.archived = true;
    db.add_habit(&habit).unwrap();
    db.add_habit(&Habit::new("New", Frequency::Daily, ms(d(2024, 1, 1), 9))).unwrap();

    assert_eq!(db.list_habits(false).unwrap().len(), 1);
    assert_eq!(db.list_habits(true).unwrap().len(), 2);
}

#[test]
fn test_sphere_balance_from_stored_activity() {
    let db = LedgerDb::open_memory().unwrap();
    let day = d(2024, 5, 6);

    let mut habit = Habit::new("Walk", Frequency::Daily, ms(day, 6)).with_spheres(["health"]);
    StreakCalculator::with_timezone(Utc).toggle(&mut habit, day);
    db.add_habit(&habit).unwrap();

    let mut task = TaskRecord::new("Book dentist", ms(day, 9));
    task.spheres = vec!["health".to_string()];
    db.add_task(&task).unwrap();
    let mut done = TaskRecord::new("Call sister", ms(day, 10));
    done.spheres = vec!["relationships".to_string()];
    db.add_task(&done).unwrap();
    db.complete_task(&done.id, ms(day, 11)).unwrap();

    let mut entry = JournalEntry::new("Read two chapters", ms(day, 21));
    entry.spheres = vec!["growth".to_string()];
    db.add_journal_entry(&entry).unwrap();

    let balance = SphereBalanceAnalyzer::new()
        .with_window(1)
        .with_known_spheres(vec!["productivity".to_string()])
        .analyze(
            &db.list_habits(false).unwrap(),
            &db.list_tasks().unwrap(),
            &db.list_journal_entries(None).unwrap(),
            day,
            &Utc,
        );

    assert_eq!(balance.get("health").unwrap().score, 50.0);
    assert_eq!(balance.get("relationships").unwrap().score, 100.0);
    assert_eq!(balance.get("growth").unwrap().score, 100.0);
    assert_eq!(balance.get("productivity").unwrap().active_days, 0);
    assert_eq!(balance.weakest().unwrap().sphere, "health");
}

#[test]
fn test_unknown_task_completion_fails() {
    let db = LedgerDb::open_memory().unwrap();
    assert!(matches!(
        db.complete_task("missing", 0),
        Err(CoreError::TaskNotFound(_))
    ));
}
