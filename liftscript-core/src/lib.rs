//! LiftScript Core - Fundamental types
//!
//! This crate provides the core types used throughout LiftScript:
//! - `Value`: Runtime values (numbers, weights, booleans, text, undefined)
//! - `Weight` / `Unit`: Unit-tagged weights with normalization
//! - `ScriptError`: Structured errors with source positions

mod unit;
mod value;
mod error;

pub use unit::{Unit, UnitError, Weight, LB_PER_KG, WEIGHT_EPSILON, format_magnitude};
pub use value::{Value, ArithOp, CmpOp};
pub use error::{ScriptError, ErrorKind, Position, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Value, Weight, Unit, ScriptError, ErrorKind, Position};
    pub use crate::error::codes;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod arith_tests {
        use super::*;

        #[test]
        fn test_number_arith() {
            let r = Value::Number(6.0).arith(ArithOp::Mul, &Value::Number(7.0)).unwrap();
            assert_eq!(r, Value::Number(42.0));
        }

        #[test]
        fn test_weight_plus_number_keeps_unit() {
            let r = Value::Weight(Weight::kg(5.0)).arith(ArithOp::Add, &Value::Number(10.0)).unwrap();
            assert_eq!(r, Value::Weight(Weight::kg(15.0)));
        }

        #[test]
        fn test_number_times_weight() {
            let r = Value::Number(2.0).arith(ArithOp::Mul, &Value::Weight(Weight::lb(45.0))).unwrap();
            assert_eq!(r, Value::Weight(Weight::lb(90.0)));
        }

        #[test]
        fn test_weight_plus_weight_converts_right() {
            let r = Value::Weight(Weight::kg(5.0))
                .arith(ArithOp::Add, &Value::Weight(Weight::lb(LB_PER_KG)))
                .unwrap();
            let w = r.as_weight().unwrap();
            assert_eq!(w.unit, Unit::Kg);
            assert!((w.value - 6.0).abs() < 1e-9);
        }

        #[test]
        fn test_weight_times_weight_fails() {
            let err = Value::Weight(Weight::kg(5.0))
                .arith(ArithOp::Mul, &Value::Weight(Weight::kg(2.0)))
                .unwrap_err();
            assert_eq!(err.message, "Invalid operation between weights");
            assert!(err.is_eval());
        }

        #[test]
        fn test_number_divided_by_weight_fails() {
            let err = Value::Number(2.0)
                .arith(ArithOp::Div, &Value::Weight(Weight::kg(2.0)))
                .unwrap_err();
            assert_eq!(err.code, codes::TYPE_ERROR);
        }

        #[test]
        fn test_division_by_zero() {
            let err = Value::Number(10.0).arith(ArithOp::Div, &Value::Number(0.0)).unwrap_err();
            assert_eq!(err.code, codes::DIV_ZERO);
            assert_eq!(err.message, "Division by zero");

            let err = Value::Weight(Weight::lb(10.0)).arith(ArithOp::Rem, &Value::Number(0.0)).unwrap_err();
            assert_eq!(err.code, codes::DIV_ZERO);
        }

        #[test]
        fn test_bool_arith_fails() {
            assert!(Value::Bool(true).arith(ArithOp::Add, &Value::Number(1.0)).is_err());
            assert!(Value::Undefined.arith(ArithOp::Add, &Value::Number(1.0)).is_err());
        }
    }

    mod compare_tests {
        use super::*;

        #[test]
        fn test_weight_vs_number_fails() {
            let err = Value::Weight(Weight::kg(5.0))
                .compare(CmpOp::Gt, &Value::Number(10.0))
                .unwrap_err();
            assert!(err.is_eval());
        }

        #[test]
        fn test_weight_equality_normalized() {
            let eq = Value::Weight(Weight::kg(1.0))
                .compare(CmpOp::Eq, &Value::Weight(Weight::lb(LB_PER_KG)))
                .unwrap();
            assert!(eq);
        }

        #[test]
        fn test_bool_ordering_fails() {
            assert!(Value::Bool(true).compare(CmpOp::Eq, &Value::Bool(true)).unwrap());
            assert!(Value::Bool(true).compare(CmpOp::Lt, &Value::Bool(false)).is_err());
            assert!(Value::Bool(true).compare(CmpOp::Eq, &Value::Number(1.0)).is_err());
        }

        #[test]
        fn test_undefined_equality() {
            assert!(Value::Undefined.compare(CmpOp::Eq, &Value::Undefined).unwrap());
            assert!(Value::Number(1.0).compare(CmpOp::Ne, &Value::Undefined).unwrap());
            assert!(Value::Undefined.compare(CmpOp::Lt, &Value::Number(1.0)).is_err());
        }
    }

    mod value_tests {
        use super::*;

        #[test]
        fn test_truthiness() {
            assert!(Value::Number(2.0).truthy());
            assert!(!Value::Number(0.0).truthy());
            assert!(!Value::Weight(Weight::lb(0.0)).truthy());
            assert!(!Value::Undefined.truthy());
        }

        #[test]
        fn test_into_weight() {
            assert_eq!(
                Value::Number(100.0).into_weight(Unit::Lb).unwrap(),
                Value::Weight(Weight::lb(100.0))
            );
            assert!(Value::Bool(true).into_weight(Unit::Lb).is_err());
        }

        #[test]
        fn test_serialization() {
            let v = Value::Weight(Weight::kg(60.0));
            let json = serde_json::to_string(&v).unwrap();
            assert_eq!(json, r#"{"type":"Weight","value":{"value":60.0,"unit":"kg"}}"#);
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_display_with_position() {
            let err = ScriptError::syntax("Expected expression").at(Position::new(4, 1, 5));
            assert_eq!(err.to_string(), "[SYNTAX_ERROR] Expected expression (line 1, column 5)");
        }

        #[test]
        fn test_or_at_keeps_existing() {
            let err = ScriptError::div_zero()
                .at(Position::new(1, 1, 2))
                .or_at(Position::new(9, 1, 10));
            assert_eq!(err.position.unwrap().offset, 1);
        }

        #[test]
        fn test_invalid_request_is_not_syntax() {
            let err = ScriptError::invalid_request("Missing 'script'");
            assert!(err.is_request());
            assert!(!err.is_syntax());
            assert_eq!(err.code, codes::INVALID_REQUEST);
        }

        #[test]
        fn test_from_unit_error() {
            let err: ScriptError = UnitError::Unknown("stone".into()).into();
            assert_eq!(err.code, codes::UNKNOWN_UNIT);
        }
    }
}
