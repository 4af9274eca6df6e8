//! Condition filter evaluated on raw row bytes.
//!
//! Attribute operands are resolved to field metadata once when the filter
//! is initialized. Filtering only reads the record, so a filter can be
//! applied any number of times during a scan.
use crate::error::{Error, Result};
use crate::record::Record;
use mutdb_catalog::{FieldMeta, TableMeta};
use mutdb_datatype::{AttrType, Value};
use semistr::SemiStr;
use smallvec::SmallVec;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
}

impl CompOp {
    #[inline]
    pub fn is_like(self) -> bool {
        matches!(self, CompOp::Like | CompOp::NotLike)
    }

    #[inline]
    pub fn evaluate(self, left: &Value, right: &Value) -> Result<bool> {
        let res = match self {
            CompOp::Like => left.like(right)?,
            CompOp::NotLike => !left.like(right)?,
            _ => {
                let ord = left.compare(right)?;
                match self {
                    CompOp::Eq => ord == Ordering::Equal,
                    CompOp::Ne => ord != Ordering::Equal,
                    CompOp::Lt => ord == Ordering::Less,
                    CompOp::Le => ord != Ordering::Greater,
                    CompOp::Gt => ord == Ordering::Greater,
                    CompOp::Ge => ord != Ordering::Less,
                    CompOp::Like | CompOp::NotLike => unreachable!(),
                }
            }
        };
        Ok(res)
    }
}

/// One side of a condition before binding.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterObj {
    Attr {
        table_name: Option<SemiStr>,
        field_name: SemiStr,
    },
    Value(Value),
}

impl FilterObj {
    #[inline]
    pub fn attr(field_name: &str) -> Self {
        FilterObj::Attr {
            table_name: None,
            field_name: SemiStr::new(field_name),
        }
    }

    #[inline]
    pub fn qualified_attr(table_name: &str, field_name: &str) -> Self {
        FilterObj::Attr {
            table_name: Some(SemiStr::new(table_name)),
            field_name: SemiStr::new(field_name),
        }
    }

    #[inline]
    pub fn value(val: impl Into<Value>) -> Self {
        FilterObj::Value(val.into())
    }
}

/// Comparison of two operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub left: FilterObj,
    pub comp: CompOp,
    pub right: FilterObj,
}

impl Condition {
    #[inline]
    pub fn new(left: FilterObj, comp: CompOp, right: FilterObj) -> Self {
        Condition { left, comp, right }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FilterOperand {
    Field(FieldMeta),
    Value(Value),
}

impl FilterOperand {
    #[inline]
    fn bind(meta: &TableMeta, obj: &FilterObj) -> Result<Self> {
        match obj {
            FilterObj::Value(v) => Ok(FilterOperand::Value(v.clone())),
            FilterObj::Attr {
                table_name,
                field_name,
            } => {
                let table_name = table_name
                    .as_ref()
                    .map(|t| t.as_str())
                    .unwrap_or(meta.name());
                if table_name != meta.name() {
                    return Err(Error::field_not_found(table_name, field_name.as_str()));
                }
                meta.field(field_name.as_str())
                    .cloned()
                    .map(FilterOperand::Field)
                    .ok_or_else(|| Error::field_not_found(meta.name(), field_name.as_str()))
            }
        }
    }

    #[inline]
    fn attr_type(&self) -> AttrType {
        match self {
            FilterOperand::Field(f) => f.attr_type(),
            FilterOperand::Value(v) => v.attr_type(),
        }
    }

    #[inline]
    fn field_name(&self) -> Option<&str> {
        match self {
            FilterOperand::Field(f) => Some(f.name()),
            FilterOperand::Value(_) => None,
        }
    }

    #[inline]
    fn value(&self, record: &Record) -> Result<Value> {
        match self {
            FilterOperand::Field(f) => record.field_value(f),
            FilterOperand::Value(v) => Ok(v.clone()),
        }
    }
}

/// Filter of a single condition.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultConditionFilter {
    left: FilterOperand,
    comp: CompOp,
    right: FilterOperand,
}

impl DefaultConditionFilter {
    /// Bind condition to table. Operand types must be comparable:
    /// both numeric or both CHARS, and LIKE only applies to CHARS.
    #[inline]
    pub fn init(meta: &TableMeta, cond: &Condition) -> Result<Self> {
        let left = FilterOperand::bind(meta, &cond.left)?;
        let right = FilterOperand::bind(meta, &cond.right)?;
        let (lt, rt) = (left.attr_type(), right.attr_type());
        let comparable = if cond.comp.is_like() {
            lt == AttrType::Chars && rt == AttrType::Chars
        } else {
            lt == rt || (lt.is_numeric() && rt.is_numeric())
        };
        if !comparable {
            let field = left.field_name().or(right.field_name()).unwrap_or("");
            let expected = if cond.comp.is_like() {
                AttrType::Chars
            } else {
                lt
            };
            let actual = if lt == expected { rt } else { lt };
            return Err(Error::FieldTypeMismatch {
                field: SemiStr::new(field),
                expected,
                actual,
            });
        }
        Ok(DefaultConditionFilter {
            left,
            comp: cond.comp,
            right,
        })
    }

    #[inline]
    pub fn filter(&self, record: &Record) -> Result<bool> {
        let left = self.left.value(record)?;
        let right = self.right.value(record)?;
        self.comp.evaluate(&left, &right)
    }
}

/// Conjunction of condition filters. Empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompositeConditionFilter {
    filters: SmallVec<[DefaultConditionFilter; 4]>,
}

impl CompositeConditionFilter {
    #[inline]
    pub fn init(meta: &TableMeta, conds: &[Condition]) -> Result<Self> {
        let filters = conds
            .iter()
            .map(|c| DefaultConditionFilter::init(meta, c))
            .collect::<Result<SmallVec<_>>>()?;
        Ok(CompositeConditionFilter { filters })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[inline]
    pub fn filter(&self, record: &Record) -> Result<bool> {
        for f in &self.filters {
            if !f.filter(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
