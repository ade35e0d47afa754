use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use calchist::{
    calculation::Calculation,
    calculator::Calculator,
    config::CalculatorConfig,
    observer::{HistoryObserver, ObserverError},
};

struct Recorder {
    name: &'static str,
    seen: Arc<Mutex<Vec<String>>>,
}

impl HistoryObserver for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn update(&mut self, calculation: &Calculation, history: &[Calculation]) -> Result<(), ObserverError> {
        assert_eq!(history.last(), Some(calculation));
        self.seen
            .lock()
            .expect("lock")
            .push(format!("{}:{}", self.name, calculation));
        Ok(())
    }
}

struct Failing;

impl HistoryObserver for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn update(&mut self, _: &Calculation, _: &[Calculation]) -> Result<(), ObserverError> {
        Err(ObserverError::Message("disk full".to_string()))
    }
}

struct Panicking;

impl HistoryObserver for Panicking {
    fn name(&self) -> &str {
        "panicking"
    }

    fn update(&mut self, _: &Calculation, _: &[Calculation]) -> Result<(), ObserverError> {
        panic!("listener bug");
    }
}

fn calculator(tmp: &TempDir) -> Calculator {
    Calculator::new(CalculatorConfig {
        auto_save: false,
        ..CalculatorConfig::with_base_dir(tmp.path())
    })
    .expect("calculator")
}

#[test]
fn observers_run_in_subscription_order_despite_failures() {
    let tmp = TempDir::new().expect("tmp");
    let mut calc = calculator(&tmp);
    let seen = Arc::new(Mutex::new(Vec::new()));

    calc.add_observer(Box::new(Recorder {
        name: "first",
        seen: Arc::clone(&seen),
    }));
    calc.add_observer(Box::new(Failing));
    calc.add_observer(Box::new(Panicking));
    calc.add_observer(Box::new(Recorder {
        name: "last",
        seen: Arc::clone(&seen),
    }));

    assert_eq!(calc.compute("add", "2", "3").expect("compute"), 5.0);
    assert_eq!(calc.compute("subtract", "2", "3").expect("compute"), -1.0);

    assert_eq!(
        *seen.lock().expect("lock"),
        vec![
            "first:add(2, 3) = 5",
            "last:add(2, 3) = 5",
            "first:subtract(2, 3) = -1",
            "last:subtract(2, 3) = -1",
        ]
    );
    assert_eq!(calc.history().len(), 2);
}

#[test]
fn failed_calculation_notifies_nobody() {
    let tmp = TempDir::new().expect("tmp");
    let mut calc = calculator(&tmp);
    let seen = Arc::new(Mutex::new(Vec::new()));
    calc.add_observer(Box::new(Recorder {
        name: "only",
        seen: Arc::clone(&seen),
    }));

    assert!(calc.compute("percent", "5", "0").is_err());
    assert!(seen.lock().expect("lock").is_empty());
}

#[test]
fn builtin_observers_follow_auto_save_flag() {
    let tmp = TempDir::new().expect("tmp");
    let mut calc = calculator(&tmp);
    assert_eq!(calc.observer_names(), vec!["logging"]);
    assert_eq!(calc.remove_observer("logging"), 1);
    assert!(calc.observer_names().is_empty());

    let with_save = Calculator::new(CalculatorConfig::with_base_dir(tmp.path())).expect("calculator");
    assert_eq!(with_save.observer_names(), vec!["logging", "auto_save"]);
}

#[test]
fn auto_save_failure_does_not_fail_compute() {
    let tmp = TempDir::new().expect("tmp");
    // A directory where the history file should be makes every save fail.
    let blocked = tmp.path().join("blocked.csv");
    std::fs::create_dir_all(&blocked).expect("mkdir");
    let mut calc = Calculator::new(CalculatorConfig {
        history_file: Some(blocked),
        ..CalculatorConfig::with_base_dir(tmp.path())
    })
    .expect("calculator");

    assert_eq!(calc.compute("add", "1", "1").expect("compute"), 2.0);
    assert_eq!(calc.history().len(), 1);
}
