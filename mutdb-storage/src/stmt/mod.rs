//! Bound mutation statements.
//!
//! A statement is created against an engine, which resolves the target
//! table, checks every target column and filter attribute, and checks
//! literal types. Expression targets are type-checked at execution.
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::expr::Expression;
use crate::filter::{CompositeConditionFilter, Condition};
use crate::table::Table;
use mutdb_datatype::Value;
use semistr::SemiStr;
use std::sync::Arc;

/// New content of one target column.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateValue {
    Literal(Value),
    Expr(Expression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTarget {
    pub field_name: SemiStr,
    pub value: UpdateValue,
}

impl UpdateTarget {
    #[inline]
    pub fn literal(field_name: &str, val: impl Into<Value>) -> Self {
        UpdateTarget {
            field_name: SemiStr::new(field_name),
            value: UpdateValue::Literal(val.into()),
        }
    }

    #[inline]
    pub fn expr(field_name: &str, expr: Expression) -> Self {
        UpdateTarget {
            field_name: SemiStr::new(field_name),
            value: UpdateValue::Expr(expr),
        }
    }
}

pub enum Stmt {
    Update(UpdateStmt),
    Delete(DeleteStmt),
    DropTable(DropTableStmt),
}

impl Stmt {
    #[inline]
    pub fn kind(&self) -> &'static str {
        match self {
            Stmt::Update(_) => "update",
            Stmt::Delete(_) => "delete",
            Stmt::DropTable(_) => "drop table",
        }
    }
}

pub struct UpdateStmt {
    table: Arc<Table>,
    targets: Vec<UpdateTarget>,
    filter: CompositeConditionFilter,
}

impl UpdateStmt {
    #[inline]
    pub fn create(
        engine: &Engine,
        table_name: &str,
        targets: Vec<UpdateTarget>,
        conds: &[Condition],
    ) -> Result<Self> {
        let table = resolve_table(engine, table_name)?;
        let meta = table.meta();
        for target in &targets {
            let field = meta.field(target.field_name.as_str()).ok_or_else(|| {
                log::warn!(
                    "update field {}.{} not found",
                    table_name,
                    target.field_name.as_str()
                );
                Error::field_not_found(table_name, target.field_name.as_str())
            })?;
            if let UpdateValue::Literal(val) = &target.value {
                let (expected, actual) = (field.attr_type(), val.attr_type());
                if expected != actual && !(expected.is_numeric() && actual.is_numeric()) {
                    log::warn!(
                        "update field {}.{} of {} with {}",
                        table_name,
                        field.name(),
                        expected,
                        actual
                    );
                    return Err(Error::FieldTypeMismatch {
                        field: target.field_name.clone(),
                        expected,
                        actual,
                    });
                }
            }
        }
        if targets.is_empty() {
            return Err(Error::InvalidArgument("no column to update"));
        }
        let filter = CompositeConditionFilter::init(meta, conds)?;
        Ok(UpdateStmt {
            table,
            targets,
            filter,
        })
    }

    #[inline]
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    #[inline]
    pub fn targets(&self) -> &[UpdateTarget] {
        &self.targets
    }

    #[inline]
    pub fn into_parts(self) -> (Arc<Table>, Vec<UpdateTarget>, CompositeConditionFilter) {
        (self.table, self.targets, self.filter)
    }
}

pub struct DeleteStmt {
    table: Arc<Table>,
    filter: CompositeConditionFilter,
}

impl DeleteStmt {
    #[inline]
    pub fn create(engine: &Engine, table_name: &str, conds: &[Condition]) -> Result<Self> {
        let table = resolve_table(engine, table_name)?;
        let filter = CompositeConditionFilter::init(table.meta(), conds)?;
        Ok(DeleteStmt { table, filter })
    }

    #[inline]
    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    #[inline]
    pub fn into_parts(self) -> (Arc<Table>, CompositeConditionFilter) {
        (self.table, self.filter)
    }
}

pub struct DropTableStmt {
    table_name: SemiStr,
}

impl DropTableStmt {
    #[inline]
    pub fn create(engine: &Engine, table_name: &str) -> Result<Self> {
        let table = resolve_table(engine, table_name)?;
        Ok(DropTableStmt {
            table_name: SemiStr::new(table.name()),
        })
    }

    #[inline]
    pub fn table_name(&self) -> &str {
        self.table_name.as_str()
    }
}

#[inline]
fn resolve_table(engine: &Engine, table_name: &str) -> Result<Arc<Table>> {
    if table_name.is_empty() {
        return Err(Error::InvalidArgument("table name is empty"));
    }
    engine.find_table(table_name)
}
