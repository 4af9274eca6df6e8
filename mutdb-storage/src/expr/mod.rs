pub mod tuple;

use crate::error::{Error, Result};
use mutdb_datatype::error::Error as DataTypeError;
use mutdb_datatype::{AttrType, Value};
use semistr::SemiStr;

pub use tuple::{ProjectTuple, RowTuple, Tuple};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Negative,
}

/// Column reference, optionally qualified by table name.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldExpr {
    pub table_name: Option<SemiStr>,
    pub field_name: SemiStr,
}

/// Expression tree evaluated against a tuple.
///
/// Evaluation only reads the tuple.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Field(FieldExpr),
    Value(Value),
    Arithmetic {
        op: ArithOp,
        left: Box<Expression>,
        // None for unary negation.
        right: Option<Box<Expression>>,
    },
    Cast {
        child: Box<Expression>,
        target: AttrType,
    },
}

impl Expression {
    #[inline]
    pub fn field(field_name: &str) -> Self {
        Expression::Field(FieldExpr {
            table_name: None,
            field_name: SemiStr::new(field_name),
        })
    }

    #[inline]
    pub fn qualified_field(table_name: &str, field_name: &str) -> Self {
        Expression::Field(FieldExpr {
            table_name: Some(SemiStr::new(table_name)),
            field_name: SemiStr::new(field_name),
        })
    }

    #[inline]
    pub fn value(val: impl Into<Value>) -> Self {
        Expression::Value(val.into())
    }

    #[inline]
    pub fn arithmetic(op: ArithOp, left: Expression, right: Expression) -> Self {
        Expression::Arithmetic {
            op,
            left: Box::new(left),
            right: Some(Box::new(right)),
        }
    }

    #[inline]
    pub fn negative(child: Expression) -> Self {
        Expression::Arithmetic {
            op: ArithOp::Negative,
            left: Box::new(child),
            right: None,
        }
    }

    #[inline]
    pub fn cast(child: Expression, target: AttrType) -> Self {
        Expression::Cast {
            child: Box::new(child),
            target,
        }
    }

    #[inline]
    pub fn get_value(&self, tuple: &Tuple<'_>) -> Result<Value> {
        match self {
            Expression::Field(f) => {
                tuple.find_cell(f.table_name.as_ref().map(|t| t.as_str()), f.field_name.as_str())
            }
            Expression::Value(v) => Ok(v.clone()),
            Expression::Arithmetic { op, left, right } => {
                let l = left.get_value(tuple)?;
                match (op, right) {
                    (ArithOp::Negative, _) => negative(&l),
                    (op, Some(right)) => {
                        let r = right.get_value(tuple)?;
                        calc(*op, &l, &r)
                    }
                    (_, None) => Err(Error::Internal("binary arithmetic without right operand")),
                }
            }
            Expression::Cast { child, target } => {
                let v = child.get_value(tuple)?;
                Ok(v.convert_to(*target)?)
            }
        }
    }
}

#[inline]
fn negative(v: &Value) -> Result<Value> {
    match v {
        Value::Int(v) => Ok(Value::Int(v.wrapping_neg())),
        Value::Float(v) => Ok(Value::Float(-v)),
        Value::Chars(_) => Err(not_numeric(v)),
    }
}

/// INT op INT stays INT except division, any FLOAT operand
/// turns the result into FLOAT.
#[inline]
fn calc(op: ArithOp, l: &Value, r: &Value) -> Result<Value> {
    match (l, r) {
        (Value::Chars(_), _) => Err(not_numeric(l)),
        (_, Value::Chars(_)) => Err(not_numeric(r)),
        (Value::Int(a), Value::Int(b)) if op != ArithOp::Div => {
            let res = match op {
                ArithOp::Add => a.wrapping_add(*b),
                ArithOp::Sub => a.wrapping_sub(*b),
                ArithOp::Mul => a.wrapping_mul(*b),
                ArithOp::Div | ArithOp::Negative => {
                    return Err(Error::Internal("unexpected arithmetic operator"));
                }
            };
            Ok(Value::Int(res))
        }
        _ => {
            let a = to_f32(l)?;
            let b = to_f32(r)?;
            let res = match op {
                ArithOp::Add => a + b,
                ArithOp::Sub => a - b,
                ArithOp::Mul => a * b,
                ArithOp::Div => {
                    if b == 0.0 {
                        return Err(Error::DivisionByZero);
                    }
                    a / b
                }
                ArithOp::Negative => {
                    return Err(Error::Internal("unexpected arithmetic operator"));
                }
            };
            Ok(Value::Float(res))
        }
    }
}

#[inline]
fn to_f32(v: &Value) -> Result<f32> {
    match v.cast_to(AttrType::Float)? {
        Value::Float(f) => Ok(f),
        _ => Err(not_numeric(v)),
    }
}

#[inline]
fn not_numeric(v: &Value) -> Error {
    Error::DataType(DataTypeError::TypeMismatch {
        expected: AttrType::Float,
        actual: v.attr_type(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::record::{RID, Record};
    use mutdb_catalog::{ColumnSpec, TableMeta, TableSpec};
    use std::sync::Arc;

    fn test_tuple() -> Tuple<'static> {
        let meta = Arc::new(
            TableMeta::new(
                1,
                &TableSpec::new(
                    "t1",
                    vec![
                        ColumnSpec::int("a"),
                        ColumnSpec::float("f"),
                        ColumnSpec::chars("s", 8),
                    ],
                ),
            )
            .unwrap(),
        );
        let mut rec = Record::new(RID::new(0, 0), vec![0u8; meta.record_size()].into());
        rec.set_field_value(meta.field("a").unwrap(), &Value::from(7))
            .unwrap();
        rec.set_field_value(meta.field("f").unwrap(), &Value::from(2.5f32))
            .unwrap();
        rec.set_field_value(meta.field("s").unwrap(), &Value::from("12"))
            .unwrap();
        Tuple::Row(RowTuple::new(meta, rec))
    }

    #[test]
    fn test_expr_arithmetic() {
        use ArithOp::*;
        let t = test_tuple();
        let eval = |e: Expression| e.get_value(&t);
        let a = || Expression::field("a");
        let f = || Expression::field("f");
        assert_eq!(eval(Expression::arithmetic(Add, a(), Expression::value(1))), Ok(Value::Int(8)));
        assert_eq!(eval(Expression::arithmetic(Sub, a(), Expression::value(10))), Ok(Value::Int(-3)));
        assert_eq!(eval(Expression::arithmetic(Mul, a(), a())), Ok(Value::Int(49)));
        assert_eq!(eval(Expression::arithmetic(Add, a(), f())), Ok(Value::Float(9.5)));
        assert_eq!(eval(Expression::arithmetic(Div, a(), Expression::value(2))), Ok(Value::Float(3.5)));
        assert_eq!(eval(Expression::negative(a())), Ok(Value::Int(-7)));
        assert_eq!(eval(Expression::negative(f())), Ok(Value::Float(-2.5)));
        assert_eq!(
            eval(Expression::arithmetic(Add, Expression::value(i32::MAX), Expression::value(1))),
            Ok(Value::Int(i32::MIN))
        );
        assert_eq!(
            eval(Expression::arithmetic(Div, a(), Expression::value(0))),
            Err(Error::DivisionByZero)
        );
        let err = eval(Expression::arithmetic(Add, a(), Expression::field("s"))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldTypeMismatch);
        let err = eval(Expression::field("nope")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FieldNotFound);
    }

    #[test]
    fn test_expr_cast() {
        let t = test_tuple();
        let eval = |e: Expression| e.get_value(&t);
        assert_eq!(
            eval(Expression::cast(Expression::field("s"), AttrType::Int)),
            Ok(Value::Int(12))
        );
        assert_eq!(
            eval(Expression::cast(Expression::field("f"), AttrType::Int)),
            Ok(Value::Int(2))
        );
        assert_eq!(
            eval(Expression::cast(Expression::field("a"), AttrType::Chars)),
            Ok(Value::from("7"))
        );
        assert_eq!(
            eval(Expression::qualified_field("t1", "a")),
            Ok(Value::Int(7))
        );
    }
}
