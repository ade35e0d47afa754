//! Immutable calculation record and its flat row form.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::CalculatorConfig,
    ops::{round_to_precision, validate_operand, OperationError, OperationRegistry},
    types::{Number, Timestamp},
};

const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// One executed operation with its operands, result and creation instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    operation: String,
    operand_a: Number,
    operand_b: Number,
    result: Number,
    timestamp: Timestamp,
}

/// Flat, text-only form of a [`Calculation`], one field per history column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationRow {
    /// Operation name.
    pub operation: String,
    /// First operand as decimal text.
    #[serde(alias = "operand1")]
    pub operand_a: String,
    /// Second operand as decimal text.
    #[serde(alias = "operand2")]
    pub operand_b: String,
    /// Result as decimal text.
    pub result: String,
    /// ISO-8601 creation instant.
    pub timestamp: String,
}

/// A row field that cannot be turned back into a [`Calculation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{field}` has unparsable value `{value}`")]
pub struct MalformedRecord {
    /// Column name.
    pub field: &'static str,
    /// Raw text found in the row.
    pub value: String,
}

impl Calculation {
    /// Validates the operands, runs `operation` and stamps the current time.
    ///
    /// Operation failures are returned unchanged; nothing is recorded.
    pub fn create(
        registry: &OperationRegistry,
        config: &CalculatorConfig,
        operation: &str,
        a: Number,
        b: Number,
    ) -> Result<Self, OperationError> {
        let op = registry.resolve(operation)?;
        let a = validate_operand(a, config)?;
        let b = validate_operand(b, config)?;
        let raw = op(a, b)?;
        if !raw.is_finite() {
            return Err(OperationError::Domain(format!(
                "{operation}({a}, {b}) has no finite result"
            )));
        }
        Ok(Self {
            operation: operation.to_string(),
            operand_a: a,
            operand_b: b,
            result: round_to_precision(raw, config.precision),
            timestamp: Utc::now(),
        })
    }

    /// Reassembles a record from already-known parts.
    pub fn from_parts(
        operation: impl Into<String>,
        operand_a: Number,
        operand_b: Number,
        result: Number,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            operation: operation.into(),
            operand_a,
            operand_b,
            result,
            timestamp,
        }
    }

    /// Registered name of the operation.
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// First operand.
    pub fn operand_a(&self) -> Number {
        self.operand_a
    }

    /// Second operand.
    pub fn operand_b(&self) -> Number {
        self.operand_b
    }

    /// Result rounded to the configured precision.
    pub fn result(&self) -> Number {
        self.result
    }

    /// Creation instant, UTC.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Converts to the flat row written to the history file.
    pub fn to_row(&self) -> CalculationRow {
        CalculationRow {
            operation: self.operation.clone(),
            operand_a: self.operand_a.to_string(),
            operand_b: self.operand_b.to_string(),
            result: self.result.to_string(),
            timestamp: self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        }
    }

    /// Parses a row back into a record.
    pub fn from_row(row: &CalculationRow) -> Result<Self, MalformedRecord> {
        let operation = row.operation.trim();
        if operation.is_empty() {
            return Err(MalformedRecord {
                field: "operation",
                value: row.operation.clone(),
            });
        }
        Ok(Self {
            operation: operation.to_string(),
            operand_a: parse_number("operand_a", &row.operand_a)?,
            operand_b: parse_number("operand_b", &row.operand_b)?,
            result: parse_number("result", &row.result)?,
            timestamp: parse_timestamp(&row.timestamp)?,
        })
    }
}

impl fmt::Display for Calculation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}, {}) = {}",
            self.operation, self.operand_a, self.operand_b, self.result
        )
    }
}

fn parse_number(field: &'static str, text: &str) -> Result<Number, MalformedRecord> {
    text.trim()
        .parse::<Number>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MalformedRecord {
            field,
            value: text.to_string(),
        })
}

fn parse_timestamp(text: &str) -> Result<Timestamp, MalformedRecord> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Ok(ts.with_timezone(&Utc));
    }
    // Rows written without an offset are taken as UTC.
    NaiveDateTime::parse_from_str(text, NAIVE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| MalformedRecord {
            field: "timestamp",
            value: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn fixed_ts() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 10, 6, 12, 30, 0).unwrap()
    }

    #[test]
    fn create_rounds_and_records_operands() {
        let registry = OperationRegistry::with_builtins();
        let config = CalculatorConfig {
            precision: 3,
            ..CalculatorConfig::default()
        };
        let calc = Calculation::create(&registry, &config, "divide", 2.0, 3.0).unwrap();
        assert_eq!(calc.operation(), "divide");
        assert_eq!(calc.operand_a(), 2.0);
        assert_eq!(calc.operand_b(), 3.0);
        assert_eq!(calc.result(), 0.667);
    }

    #[test]
    fn create_rejects_non_finite_results() {
        let registry = OperationRegistry::with_builtins();
        let config = CalculatorConfig::default();
        let err = Calculation::create(&registry, &config, "power", -8.0, 0.5).unwrap_err();
        assert!(matches!(err, OperationError::Domain(_)));
    }

    #[test]
    fn row_round_trip_keeps_every_field() {
        let calc = Calculation::from_parts("multiply", 0.1, -3.5, -0.35, fixed_ts());
        let row = calc.to_row();
        assert_eq!(row.operand_a, "0.1");
        assert_eq!(row.timestamp, "2025-10-06T12:30:00Z");
        assert_eq!(Calculation::from_row(&row).unwrap(), calc);
    }

    #[test]
    fn from_row_accepts_naive_timestamps() {
        let row = CalculationRow {
            operation: "add".to_string(),
            operand_a: "1".to_string(),
            operand_b: "2".to_string(),
            result: "3".to_string(),
            timestamp: "2025-10-06T12:30:00.000000".to_string(),
        };
        assert_eq!(Calculation::from_row(&row).unwrap().timestamp(), fixed_ts());
    }

    #[test]
    fn from_row_names_the_bad_field() {
        let mut row = Calculation::from_parts("add", 1.0, 2.0, 3.0, fixed_ts()).to_row();
        row.result = "three".to_string();
        let err = Calculation::from_row(&row).unwrap_err();
        assert_eq!(err.field, "result");

        row.result = "3".to_string();
        row.timestamp = String::new();
        assert_eq!(Calculation::from_row(&row).unwrap_err().field, "timestamp");
    }

    #[test]
    fn display_is_compact() {
        let calc = Calculation::from_parts("add", 2.0, 2.0, 4.0, fixed_ts());
        assert_eq!(calc.to_string(), "add(2, 2) = 4");
    }
}
