//! Listeners notified after every successful calculation.
//!
//! Each listener runs in isolation: an error or a panic in one is logged and
//! the remaining listeners still run. Nothing a listener does can fail the
//! calculation that triggered it.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::{info, warn};

use crate::{calculation::Calculation, persist::{HistorySink, PersistError}};

/// Failure reported by a listener; logged by the bus, never returned to callers.
#[derive(Debug, Error)]
pub enum ObserverError {
    /// Auto-save could not write the history.
    #[error("auto-save failed: {0}")]
    Persist(#[from] PersistError),
    /// Free-form listener failure.
    #[error("{0}")]
    Message(String),
}

/// Receives each new calculation together with the resulting history.
pub trait HistoryObserver: Send {
    /// Stable name used in logs and for unsubscribing.
    fn name(&self) -> &str;

    /// Called once per successful calculation, after it joined the history.
    fn update(&mut self, calculation: &Calculation, history: &[Calculation]) -> Result<(), ObserverError>;
}

/// Ordered list of listeners.
#[derive(Default)]
pub struct ObserverBus {
    observers: Vec<Box<dyn HistoryObserver>>,
}

impl std::fmt::Debug for ObserverBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverBus")
            .field("observers", &self.names())
            .finish()
    }
}

impl ObserverBus {
    /// Bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `observer`; it runs after every earlier subscriber.
    pub fn subscribe(&mut self, observer: Box<dyn HistoryObserver>) {
        info!(observer = observer.name(), "observer added");
        self.observers.push(observer);
    }

    /// Removes every observer named `name`, returning how many were removed.
    pub fn unsubscribe(&mut self, name: &str) -> usize {
        let before = self.observers.len();
        self.observers.retain(|o| o.name() != name);
        let removed = before - self.observers.len();
        if removed > 0 {
            info!(observer = name, "observer removed");
        }
        removed
    }

    /// Listener names in notification order.
    pub fn names(&self) -> Vec<&str> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// True when nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Runs every observer in subscription order and returns the failure count.
    pub fn notify(&mut self, calculation: &Calculation, history: &[Calculation]) -> usize {
        let mut failures = 0;
        for observer in &mut self.observers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| observer.update(calculation, history)));
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    failures += 1;
                    warn!(observer = observer.name(), error = %err, "observer failed");
                }
                Err(_) => {
                    failures += 1;
                    warn!(observer = observer.name(), "observer panicked");
                }
            }
        }
        failures
    }
}

/// Writes one structured log event per calculation.
#[derive(Debug, Default)]
pub struct LoggingObserver;

impl HistoryObserver for LoggingObserver {
    fn name(&self) -> &str {
        "logging"
    }

    fn update(&mut self, calculation: &Calculation, history: &[Calculation]) -> Result<(), ObserverError> {
        info!(
            operation = calculation.operation(),
            operand_a = calculation.operand_a(),
            operand_b = calculation.operand_b(),
            result = calculation.result(),
            history_len = history.len(),
            "calculation performed"
        );
        Ok(())
    }
}

/// Saves the full history through its sink after every calculation.
pub struct AutoSaveObserver {
    sink: Box<dyn HistorySink>,
}

impl AutoSaveObserver {
    /// Saves through `sink` after every calculation.
    pub fn new(sink: Box<dyn HistorySink>) -> Self {
        Self { sink }
    }
}

impl HistoryObserver for AutoSaveObserver {
    fn name(&self) -> &str {
        "auto_save"
    }

    fn update(&mut self, _calculation: &Calculation, history: &[Calculation]) -> Result<(), ObserverError> {
        self.sink.save(history)?;
        Ok(())
    }
}
