use crate::error::{Error, Result};
use crate::expr::{ProjectTuple, RowTuple, Tuple};
use crate::operator::{Operator, PhysicalOperator};
use crate::record::Record;
use crate::stmt::{UpdateTarget, UpdateValue};
use crate::table::Table;
use crate::trx::Trx;
use mutdb_catalog::{FieldMeta, TableMeta};
use semistr::SemiStr;
use std::slice;
use std::sync::Arc;

/// UpdateOperator replaces every row produced by its child.
///
/// For each row, a copy of the original bytes is taken as the new row,
/// then each target field is overwritten. Expressions are evaluated on
/// another independent copy of the original row, so all targets observe
/// pre-update values. The new row is submitted as one atomic replace.
pub struct UpdateOperator<'a> {
    table: Arc<Table>,
    targets: Vec<UpdateTarget>,
    // resolved in open, one per target.
    fields: Vec<FieldMeta>,
    children: Vec<PhysicalOperator<'a>>,
    trx: Option<&'a Trx>,
    affected_rows: usize,
}

impl<'a> UpdateOperator<'a> {
    #[inline]
    pub fn new(table: Arc<Table>, targets: Vec<UpdateTarget>) -> Self {
        UpdateOperator {
            table,
            targets,
            fields: vec![],
            children: vec![],
            trx: None,
            affected_rows: 0,
        }
    }

    #[inline]
    pub fn add_child(&mut self, child: PhysicalOperator<'a>) {
        self.children.push(child);
    }

    #[inline]
    pub fn affected_rows(&self) -> usize {
        self.affected_rows
    }
}

impl<'a> Operator<'a> for UpdateOperator<'a> {
    #[inline]
    fn open(&mut self, trx: &'a Trx) -> Result<()> {
        if self.children.len() != 1 {
            log::warn!(
                "update operator must have one child, but got {}",
                self.children.len()
            );
            return Err(Error::Internal("update operator must have one child"));
        }
        let meta = self.table.meta();
        self.fields = self
            .targets
            .iter()
            .map(|t| {
                meta.field(t.field_name.as_str()).cloned().ok_or_else(|| {
                    log::warn!(
                        "field {}.{} not found",
                        meta.name(),
                        t.field_name.as_str()
                    );
                    Error::field_not_found(meta.name(), t.field_name.as_str())
                })
            })
            .collect::<Result<Vec<_>>>()?;
        self.affected_rows = 0;
        self.children[0].open(trx)?;
        self.trx = Some(trx);
        Ok(())
    }

    #[inline]
    fn next(&mut self) -> Result<bool> {
        let trx = self
            .trx
            .ok_or(Error::Internal("update operator is not opened"))?;
        let child = &mut self.children[0];
        while child.next()? {
            let old = child
                .current_tuple()
                .and_then(Tuple::record)
                .ok_or(Error::Internal("update expects row tuple"))?;
            let new = new_record(self.table.meta(), &self.targets, &self.fields, old)
                .inspect_err(|e| log::warn!("failed to build new row of {}: {}", old.rid(), e))?;
            trx.update_record(&self.table, old, new)
                .inspect_err(|e| log::warn!("failed to update row {}: {}", old.rid(), e))?;
            self.affected_rows += 1;
        }
        Ok(false)
    }

    #[inline]
    fn close(&mut self) -> Result<()> {
        self.trx = None;
        match self.children.first_mut() {
            Some(child) => child.close(),
            None => Ok(()),
        }
    }

    #[inline]
    fn current_tuple(&self) -> Option<&Tuple<'_>> {
        None
    }
}

/// Build replacement of `old`.
#[inline]
fn new_record(
    meta: &Arc<TableMeta>,
    targets: &[UpdateTarget],
    fields: &[FieldMeta],
    old: &Record,
) -> Result<Record> {
    let mut new = old.try_copy()?;
    for (target, field) in targets.iter().zip(fields) {
        let val = match &target.value {
            UpdateValue::Literal(v) => v.clone(),
            UpdateValue::Expr(expr) => {
                // scratch copy lives only for this evaluation.
                let scratch = RowTuple::new(Arc::clone(meta), old.try_copy()?);
                let proj = ProjectTuple::new(slice::from_ref(expr), Tuple::Row(scratch));
                proj.cell_at(0)?
            }
        };
        let val = val
            .cast_to(field.attr_type())
            .map_err(|_| Error::FieldTypeMismatch {
                field: SemiStr::new(field.name()),
                expected: field.attr_type(),
                actual: val.attr_type(),
            })?;
        new.set_field_value(field, &val)?;
    }
    Ok(new)
}
