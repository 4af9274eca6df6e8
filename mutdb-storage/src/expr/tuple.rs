use crate::error::{Error, Result};
use crate::expr::Expression;
use crate::record::Record;
use mutdb_catalog::TableMeta;
use mutdb_datatype::Value;
use std::sync::Arc;

/// Tuple is the row shape flowing between operators.
pub enum Tuple<'e> {
    Row(RowTuple),
    Project(ProjectTuple<'e>),
}

impl Tuple<'_> {
    #[inline]
    pub fn cell_num(&self) -> usize {
        match self {
            Tuple::Row(t) => t.cell_num(),
            Tuple::Project(t) => t.cell_num(),
        }
    }

    #[inline]
    pub fn cell_at(&self, idx: usize) -> Result<Value> {
        match self {
            Tuple::Row(t) => t.cell_at(idx),
            Tuple::Project(t) => t.cell_at(idx),
        }
    }

    #[inline]
    pub fn find_cell(&self, table_name: Option<&str>, field_name: &str) -> Result<Value> {
        match self {
            Tuple::Row(t) => t.find_cell(table_name, field_name),
            Tuple::Project(t) => t.find_cell(table_name, field_name),
        }
    }

    /// Returns the underlying record if this is a row tuple.
    #[inline]
    pub fn record(&self) -> Option<&Record> {
        match self {
            Tuple::Row(t) => Some(t.record()),
            Tuple::Project(_) => None,
        }
    }
}

/// A record bound to the layout of its table.
pub struct RowTuple {
    meta: Arc<TableMeta>,
    record: Record,
}

impl RowTuple {
    #[inline]
    pub fn new(meta: Arc<TableMeta>, record: Record) -> Self {
        RowTuple { meta, record }
    }

    #[inline]
    pub fn meta(&self) -> &Arc<TableMeta> {
        &self.meta
    }

    #[inline]
    pub fn record(&self) -> &Record {
        &self.record
    }

    #[inline]
    pub fn into_record(self) -> Record {
        self.record
    }

    #[inline]
    pub fn cell_num(&self) -> usize {
        self.meta.field_count()
    }

    #[inline]
    pub fn cell_at(&self, idx: usize) -> Result<Value> {
        let field = self
            .meta
            .field_at(idx)
            .ok_or(Error::InvalidArgument("cell index out of range"))?;
        self.record.field_value(field)
    }

    #[inline]
    pub fn find_cell(&self, table_name: Option<&str>, field_name: &str) -> Result<Value> {
        match table_name {
            Some(t) if t != self.meta.name() => {
                return Err(Error::field_not_found(t, field_name));
            }
            _ => (),
        }
        let field = self
            .meta
            .field(field_name)
            .ok_or_else(|| Error::field_not_found(self.meta.name(), field_name))?;
        self.record.field_value(field)
    }
}

/// Expressions evaluated lazily over a child tuple.
pub struct ProjectTuple<'e> {
    exprs: &'e [Expression],
    child: Box<Tuple<'e>>,
}

impl<'e> ProjectTuple<'e> {
    #[inline]
    pub fn new(exprs: &'e [Expression], child: Tuple<'e>) -> Self {
        ProjectTuple {
            exprs,
            child: Box::new(child),
        }
    }

    #[inline]
    pub fn cell_num(&self) -> usize {
        self.exprs.len()
    }

    #[inline]
    pub fn cell_at(&self, idx: usize) -> Result<Value> {
        let expr = self
            .exprs
            .get(idx)
            .ok_or(Error::InvalidArgument("cell index out of range"))?;
        expr.get_value(&self.child)
    }

    /// Names resolve against the child tuple.
    #[inline]
    pub fn find_cell(&self, table_name: Option<&str>, field_name: &str) -> Result<Value> {
        self.child.find_cell(table_name, field_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::ArithOp;
    use crate::record::RID;
    use mutdb_catalog::{ColumnSpec, TableSpec};

    #[test]
    fn test_row_and_project_tuple() {
        let meta = Arc::new(
            TableMeta::new(
                1,
                &TableSpec::new("t1", vec![ColumnSpec::int("a"), ColumnSpec::int("b")]),
            )
            .unwrap(),
        );
        let mut rec = Record::new(RID::new(0, 0), vec![0u8; 8].into());
        rec.set_field_value(meta.field("a").unwrap(), &Value::from(1))
            .unwrap();
        rec.set_field_value(meta.field("b").unwrap(), &Value::from(2))
            .unwrap();
        let row = Tuple::Row(RowTuple::new(Arc::clone(&meta), rec));
        assert_eq!(row.cell_num(), 2);
        assert_eq!(row.cell_at(1).unwrap(), Value::from(2));
        assert_eq!(row.find_cell(Some("t1"), "a").unwrap(), Value::from(1));
        assert!(row.find_cell(Some("t2"), "a").is_err());
        assert!(row.find_cell(None, "c").is_err());
        assert!(row.cell_at(2).is_err());

        let exprs = vec![
            Expression::field("b"),
            Expression::arithmetic(ArithOp::Add, Expression::field("a"), Expression::field("b")),
        ];
        let proj = Tuple::Project(ProjectTuple::new(&exprs, row));
        assert!(proj.record().is_none());
        assert_eq!(proj.cell_num(), 2);
        assert_eq!(proj.cell_at(0).unwrap(), Value::from(2));
        assert_eq!(proj.cell_at(1).unwrap(), Value::from(3));
        assert_eq!(proj.find_cell(None, "a").unwrap(), Value::from(1));
    }
}
