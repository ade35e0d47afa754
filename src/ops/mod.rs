//! Name-to-function operation registry and operand checks.

/// Built-in arithmetic operations.
pub mod builtin;

use std::{fmt, sync::Arc};

use hashbrown::HashMap;
use thiserror::Error;

use crate::{config::CalculatorConfig, types::Number};

/// Failures raised before or during an arithmetic operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperationError {
    /// Operand is not a number or exceeds the configured magnitude.
    #[error("validation error: {0}")]
    Validation(String),
    /// No operation is registered under this name.
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),
    /// Divisor-based operation called with a zero divisor.
    #[error("division by zero in `{0}`")]
    DivisionByZero(String),
    /// Operand outside the operation's mathematical domain.
    #[error("domain error: {0}")]
    Domain(String),
}

/// Shared signature of every operation.
pub type OperationFn = Arc<dyn Fn(Number, Number) -> Result<Number, OperationError> + Send + Sync>;

/// Maps operation names to stateless two-argument functions.
#[derive(Clone, Default)]
pub struct OperationRegistry {
    ops: HashMap<String, OperationFn>,
}

impl fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl OperationRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the ten built-in operations.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    /// Adds or overwrites `name`; the last registration wins.
    pub fn register<F>(&mut self, name: impl Into<String>, op: F)
    where
        F: Fn(Number, Number) -> Result<Number, OperationError> + Send + Sync + 'static,
    {
        self.ops.insert(name.into(), Arc::new(op));
    }

    /// Looks up `name`.
    pub fn resolve(&self, name: &str) -> Result<OperationFn, OperationError> {
        self.ops
            .get(name)
            .cloned()
            .ok_or_else(|| OperationError::UnknownOperation(name.to_string()))
    }

    /// True when `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.ops.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Parses user text into a validated operand.
pub fn parse_operand(text: &str, config: &CalculatorConfig) -> Result<Number, OperationError> {
    let trimmed = text.trim();
    let value: Number = trimmed
        .parse()
        .map_err(|_| OperationError::Validation(format!("invalid number format: `{trimmed}`")))?;
    validate_operand(value, config)
}

/// Rejects non-finite values and magnitudes above `max_input_value`.
pub fn validate_operand(value: Number, config: &CalculatorConfig) -> Result<Number, OperationError> {
    if !value.is_finite() {
        return Err(OperationError::Validation(format!("operand is not finite: {value}")));
    }
    if value.abs() > config.max_input_value {
        return Err(OperationError::Validation(format!(
            "value exceeds maximum allowed: {}",
            config.max_input_value
        )));
    }
    Ok(value)
}

/// Largest magnitude below which every integer is exactly representable.
const EXACT_INTEGER_LIMIT: Number = 9_007_199_254_740_992.0;

/// Rounds half away from zero to `precision` decimal places.
///
/// Values whose scaled form leaves the exact-integer range are returned
/// unchanged, since they already carry fewer fractional digits than requested.
pub fn round_to_precision(value: Number, precision: u32) -> Number {
    let Ok(exp) = i32::try_from(precision) else {
        return value;
    };
    let factor = 10f64.powi(exp);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= EXACT_INTEGER_LIMIT {
        return value;
    }
    let rounded = scaled.round() / factor;
    // -0.0 reads badly in history rows
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_overwrites_silently() {
        let mut registry = OperationRegistry::new();
        registry.register("twice", |a, _| Ok(a * 2.0));
        registry.register("twice", |a, _| Ok(a + a + 1.0));
        let op = registry.resolve("twice").expect("registered");
        assert_eq!(op(2.0, 0.0), Ok(5.0));
    }

    #[test]
    fn resolve_unknown_fails() {
        let registry = OperationRegistry::with_builtins();
        assert_eq!(
            registry.resolve("sqrt").err(),
            Some(OperationError::UnknownOperation("sqrt".to_string()))
        );
    }

    #[test]
    fn parse_operand_trims_and_bounds() {
        let config = CalculatorConfig::default();
        assert_eq!(parse_operand("  42.5 ", &config), Ok(42.5));
        assert!(matches!(parse_operand("abc", &config), Err(OperationError::Validation(_))));
        assert!(matches!(parse_operand("1000001", &config), Err(OperationError::Validation(_))));
        assert!(matches!(parse_operand("NaN", &config), Err(OperationError::Validation(_))));
        assert_eq!(parse_operand("-1000000", &config), Ok(-1_000_000.0));
    }

    #[test]
    fn rounding_respects_precision() {
        assert_eq!(round_to_precision(0.1 + 0.2, 10), 0.3);
        assert_eq!(round_to_precision(2.0 / 3.0, 2), 0.67);
        assert_eq!(round_to_precision(-2.5, 0), -3.0);
        assert_eq!(round_to_precision(-0.0000001, 3), 0.0);
        assert_eq!(round_to_precision(1e300, 20), 1e300);
        assert_eq!(round_to_precision(1e15, 10), 1e15);
    }
}
