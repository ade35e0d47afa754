use std::fs;

use tempfile::TempDir;

use calchist::{
    calculator::{CalcError, Calculator},
    config::CalculatorConfig,
    core::memento::HistoryError,
    persist::PersistError,
};

fn config(tmp: &TempDir) -> CalculatorConfig {
    CalculatorConfig {
        auto_save: false,
        ..CalculatorConfig::with_base_dir(tmp.path())
    }
}

#[test]
fn save_then_load_into_fresh_calculator() {
    let tmp = TempDir::new().expect("tmp");
    let mut calc = Calculator::new(config(&tmp)).expect("calculator");
    calc.compute("add", "0.1", "0.2").unwrap();
    calc.compute("power", "2", "-2").unwrap();
    calc.compute("root", "-27", "3").unwrap();
    calc.compute("percent", "1", "3").unwrap();
    calc.save().expect("save");

    let mut fresh = Calculator::new(config(&tmp)).expect("calculator");
    assert_eq!(fresh.load().expect("load"), 4);
    assert_eq!(fresh.list_history(), calc.list_history());
    assert!(!fresh.can_undo());
}

#[test]
fn load_discards_snapshots_taken_before_it() {
    let tmp = TempDir::new().expect("tmp");
    let mut calc = Calculator::new(config(&tmp)).expect("calculator");
    calc.compute("add", "1", "2").unwrap();
    calc.compute("add", "2", "2").unwrap();
    calc.save().expect("save");
    calc.undo().expect("undo");
    assert!(calc.can_undo() && calc.can_redo());

    assert_eq!(calc.load().expect("load"), 2);
    assert!(!calc.can_undo());
    assert!(!calc.can_redo());
    assert!(matches!(
        calc.undo(),
        Err(CalcError::History(HistoryError::NothingToUndo))
    ));
    assert_eq!(calc.show_history(), vec!["add(1, 2) = 3", "add(2, 2) = 4"]);
}

#[test]
fn load_missing_file_is_a_persist_error() {
    let tmp = TempDir::new().expect("tmp");
    let mut calc = Calculator::new(config(&tmp)).expect("calculator");
    calc.compute("add", "1", "1").unwrap();

    let err = calc.load().unwrap_err();
    assert!(matches!(err, CalcError::Persist(PersistError::NotFound(_))));
    assert_eq!(calc.history().len(), 1);
}

#[test]
fn malformed_row_aborts_whole_load() {
    let tmp = TempDir::new().expect("tmp");
    let cfg = config(&tmp);
    let path = cfg.history_file();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "operation,operand_a,operand_b,result,timestamp\n\
         add,1,2,3,2025-10-06T12:00:00Z\n\
         add,x,2,3,2025-10-06T12:00:01Z\n",
    )
    .unwrap();

    let mut calc = Calculator::new(cfg).expect("calculator");
    calc.compute("multiply", "2", "3").unwrap();
    let before = calc.list_history();

    let err = calc.load().unwrap_err();
    match err {
        CalcError::Persist(PersistError::MalformedRecord { line, .. }) => assert_eq!(line, 3),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(calc.list_history(), before);
    assert!(calc.can_undo());
}

#[test]
fn short_row_is_malformed() {
    let tmp = TempDir::new().expect("tmp");
    let cfg = config(&tmp);
    let path = cfg.history_file();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(
        &path,
        "operation,operand_a,operand_b,result,timestamp\nadd,1,2\n",
    )
    .unwrap();

    let mut calc = Calculator::new(cfg).expect("calculator");
    assert!(matches!(
        calc.load(),
        Err(CalcError::Persist(PersistError::MalformedRecord { .. }))
    ));
    assert!(calc.history().is_empty());
}

#[test]
fn loading_more_rows_than_capacity_keeps_newest() {
    let tmp = TempDir::new().expect("tmp");
    let mut big = Calculator::new(config(&tmp)).expect("calculator");
    for i in 0..5 {
        big.compute_values("add", f64::from(i), 0.0).unwrap();
    }
    big.save().unwrap();

    let mut small = Calculator::new(CalculatorConfig {
        max_history_size: 2,
        ..config(&tmp)
    })
    .expect("calculator");
    assert_eq!(small.load().unwrap(), 2);
    assert_eq!(small.show_history(), vec!["add(3, 0) = 3", "add(4, 0) = 4"]);
}

#[test]
fn open_loads_existing_history_and_survives_a_bad_file() {
    let tmp = TempDir::new().expect("tmp");
    let mut first = Calculator::new(config(&tmp)).expect("calculator");
    first.compute("subtract", "9", "4").unwrap();
    first.save().unwrap();

    let reopened = Calculator::open(config(&tmp)).expect("open");
    assert_eq!(reopened.show_history(), vec!["subtract(9, 4) = 5"]);

    fs::write(config(&tmp).history_file(), "garbage\n").unwrap();
    let recovered = Calculator::open(config(&tmp)).expect("open");
    assert!(recovered.history().is_empty());
}

#[test]
fn auto_save_writes_after_every_calculation() {
    let tmp = TempDir::new().expect("tmp");
    let cfg = CalculatorConfig::with_base_dir(tmp.path());
    assert!(cfg.auto_save);
    let path = cfg.history_file();

    let mut calc = Calculator::new(cfg.clone()).expect("calculator");
    calc.compute("modulus", "10", "4").unwrap();
    assert!(path.is_file());
    calc.compute("abs_diff", "3", "10").unwrap();

    let mut reader = Calculator::new(CalculatorConfig {
        auto_save: false,
        ..cfg
    })
    .expect("calculator");
    reader.load().unwrap();
    assert_eq!(reader.show_history(), vec!["modulus(10, 4) = 2", "abs_diff(3, 10) = 7"]);
}
