use crate::types::Number;

use super::{OperationError, OperationRegistry};

/// Names of the built-in operations, in registration order.
pub const BUILTIN_NAMES: [&str; 10] = [
    "add",
    "subtract",
    "multiply",
    "divide",
    "power",
    "root",
    "modulus",
    "int_divide",
    "percent",
    "abs_diff",
];

pub(crate) fn register_all(registry: &mut OperationRegistry) {
    registry.register("add", |a, b| Ok(a + b));
    registry.register("subtract", |a, b| Ok(a - b));
    registry.register("multiply", |a, b| Ok(a * b));
    registry.register("divide", divide);
    registry.register("power", |a: Number, b| Ok(a.powf(b)));
    registry.register("root", root);
    registry.register("modulus", modulus);
    registry.register("int_divide", int_divide);
    registry.register("percent", percent);
    registry.register("abs_diff", |a: Number, b| Ok((a - b).abs()));
}

fn nonzero_divisor(name: &str, b: Number) -> Result<(), OperationError> {
    if b == 0.0 {
        return Err(OperationError::DivisionByZero(name.to_string()));
    }
    Ok(())
}

fn divide(a: Number, b: Number) -> Result<Number, OperationError> {
    nonzero_divisor("divide", b)?;
    Ok(a / b)
}

fn modulus(a: Number, b: Number) -> Result<Number, OperationError> {
    nonzero_divisor("modulus", b)?;
    Ok(a % b)
}

fn int_divide(a: Number, b: Number) -> Result<Number, OperationError> {
    nonzero_divisor("int_divide", b)?;
    Ok((a / b).floor())
}

fn percent(a: Number, b: Number) -> Result<Number, OperationError> {
    nonzero_divisor("percent", b)?;
    Ok(a / b * 100.0)
}

fn root(a: Number, b: Number) -> Result<Number, OperationError> {
    if b == 0.0 {
        return Err(OperationError::Domain("zero root index".to_string()));
    }
    if a >= 0.0 {
        return Ok(a.powf(b.recip()));
    }
    if b.fract() != 0.0 {
        return Err(OperationError::Domain(format!(
            "non-integer root {b} of negative number {a}"
        )));
    }
    if b % 2.0 == 0.0 {
        return Err(OperationError::Domain(format!(
            "even root {b} of negative number {a}"
        )));
    }
    Ok(-(-a).powf(b.recip()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisor_operations_reject_zero() {
        let registry = OperationRegistry::with_builtins();
        for name in ["divide", "modulus", "int_divide", "percent"] {
            let op = registry.resolve(name).expect("builtin");
            assert_eq!(op(1.0, 0.0), Err(OperationError::DivisionByZero(name.to_string())));
        }
    }

    #[test]
    fn root_domains() {
        assert_eq!(root(27.0, 3.0).map(|r| r.round()), Ok(3.0));
        assert_eq!(root(-27.0, 3.0).map(|r| r.round()), Ok(-3.0));
        assert!(matches!(root(-16.0, 2.0), Err(OperationError::Domain(_))));
        assert!(matches!(root(-16.0, 2.5), Err(OperationError::Domain(_))));
        assert!(matches!(root(16.0, 0.0), Err(OperationError::Domain(_))));
    }

    #[test]
    fn modulus_follows_dividend_sign() {
        assert_eq!(modulus(-7.0, 3.0), Ok(-1.0));
        assert_eq!(modulus(7.0, -3.0), Ok(1.0));
    }

    #[test]
    fn int_divide_floors() {
        assert_eq!(int_divide(7.0, 2.0), Ok(3.0));
        assert_eq!(int_divide(-7.0, 2.0), Ok(-4.0));
    }

    #[test]
    fn every_builtin_is_registered() {
        let registry = OperationRegistry::with_builtins();
        for name in BUILTIN_NAMES {
            assert!(registry.contains(name), "{name} missing");
        }
        assert_eq!(registry.names().len(), BUILTIN_NAMES.len());
    }
}
