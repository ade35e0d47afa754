//! Two-operand calculator with a bounded, undoable, persisted history.
//!
//! # Examples
//!
//! Synchronous usage with [`calculator::Calculator`]:
//! ```
//! use calchist::{calculator::Calculator, config::CalculatorConfig};
//!
//! let dir = std::env::temp_dir().join("calchist-doc");
//! let config = CalculatorConfig {
//!     auto_save: false,
//!     max_history_size: 2,
//!     ..CalculatorConfig::with_base_dir(&dir)
//! };
//! let mut calc = Calculator::new(config).expect("config");
//! assert_eq!(calc.compute("add", "1", "2").expect("add"), 3.0);
//! calc.compute("add", "2", "2").expect("add");
//! calc.compute("add", "3", "2").expect("add");
//! assert_eq!(calc.show_history(), vec!["add(2, 2) = 4", "add(3, 2) = 5"]);
//!
//! calc.undo().expect("undo");
//! assert_eq!(calc.history().len(), 2);
//! calc.redo().expect("redo");
//! ```
//!
//! Serialized access from many tasks:
//! ```no_run
//! use calchist::{
//!     calculator::Calculator,
//!     config::CalculatorConfig,
//!     runtime::handle::spawn_calculator,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let calc = Calculator::open(CalculatorConfig::default()).expect("config");
//! let handle = spawn_calculator(calc);
//! let result = handle.compute("divide", "10", "2").await.expect("divide");
//! assert_eq!(result, 5.0);
//! handle.save().await.expect("save");
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```

#![deny(missing_docs)]

/// Immutable calculation records and their row form.
pub mod calculation;
/// Calculator facade and aggregate error type.
pub mod calculator;
/// Startup configuration.
pub mod config;
/// History store and undo/redo snapshots.
pub mod core;
/// File logging bootstrap.
pub mod logging;
/// Post-calculation listeners.
pub mod observer;
/// Operation registry and built-in arithmetic.
pub mod ops;
/// History persistence.
pub mod persist;
/// Single-writer runtime handle and events.
pub mod runtime;
/// Shared primitive aliases.
pub mod types;
