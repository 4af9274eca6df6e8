pub mod error;
pub mod mem_impl;
pub mod spec;

use crate::error::{Error, Result};
use indexmap::IndexMap;
use mutdb_datatype::AttrType;
use semistr::SemiStr;
use std::sync::Arc;

pub use spec::*;

pub type ObjID = u64;
pub type TableID = ObjID;

/// Catalog maintains metadata of all tables.
/// It could be shared between threads.
pub trait Catalog: Send + Sync {
    fn create_table(&self, table_spec: TableSpec) -> Result<Arc<TableMeta>>;

    fn all_tables(&self) -> Vec<Arc<TableMeta>>;

    fn exists_table(&self, table_name: &str) -> bool;

    fn find_table_by_name(&self, table_name: &str) -> Option<Arc<TableMeta>>;

    fn find_table(&self, table_id: TableID) -> Option<Arc<TableMeta>>;
}

/// Placement of one column inside a fixed-width row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
    name: SemiStr,
    attr_type: AttrType,
    offset: usize,
    len: usize,
}

impl FieldMeta {
    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[inline]
    pub fn attr_type(&self) -> AttrType {
        self.attr_type
    }

    /// Byte offset of the slot within the row.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte width of the slot.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slot range within the row.
    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// TableMeta is the ordered column layout of a table.
///
/// Slots are laid out back to back in declaration order, so they never
/// overlap and the record size is the sum of all slot widths.
/// Fields are addressable both by name and by position.
#[derive(Debug, Clone)]
pub struct TableMeta {
    table_id: TableID,
    name: SemiStr,
    fields: IndexMap<SemiStr, FieldMeta>,
    record_size: usize,
}

impl TableMeta {
    #[inline]
    pub fn new(table_id: TableID, spec: &TableSpec) -> Result<Self> {
        if spec.table_name.as_str().is_empty() {
            return Err(Error::EmptyTableName);
        }
        if spec.columns.is_empty() {
            return Err(Error::EmptyColumns(spec.table_name.clone()));
        }
        let mut fields = IndexMap::with_capacity(spec.columns.len());
        let mut offset = 0;
        for c in &spec.columns {
            let len_valid = match c.column_type.fixed_len() {
                Some(len) => c.column_len == len,
                // at least one content byte besides the terminator.
                None => c.column_len >= 2,
            };
            if !len_valid {
                return Err(Error::InvalidColumnLength {
                    column: c.column_name.clone(),
                    len: c.column_len,
                });
            }
            if fields.contains_key(c.column_name.as_str()) {
                return Err(Error::DuplicateColumn(c.column_name.clone()));
            }
            let field = FieldMeta {
                name: c.column_name.clone(),
                attr_type: c.column_type,
                offset,
                len: c.column_len,
            };
            offset = offset
                .checked_add(c.column_len)
                .ok_or_else(|| Error::InvalidColumnLength {
                    column: c.column_name.clone(),
                    len: c.column_len,
                })?;
            fields.insert(c.column_name.clone(), field);
        }
        Ok(TableMeta {
            table_id,
            name: spec.table_name.clone(),
            fields,
            record_size: offset,
        })
    }

    #[inline]
    pub fn table_id(&self) -> TableID {
        self.table_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Total fixed width of a row.
    #[inline]
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    #[inline]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.get(name)
    }

    #[inline]
    pub fn field_at(&self, idx: usize) -> Option<&FieldMeta> {
        self.fields.get_index(idx).map(|(_, f)| f)
    }

    #[inline]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.get_index_of(name)
    }

    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = &FieldMeta> {
        self.fields.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_meta_layout() {
        let spec = TableSpec::new(
            "t1",
            vec![
                ColumnSpec::int("id"),
                ColumnSpec::chars("name", 8),
                ColumnSpec::float("score"),
            ],
        );
        let meta = TableMeta::new(1, &spec).unwrap();
        assert_eq!(meta.record_size(), 16);
        assert_eq!(meta.field_count(), 3);
        let name = meta.field("name").unwrap();
        assert_eq!(name.offset(), 4);
        assert_eq!(name.len(), 8);
        assert_eq!(name.attr_type(), AttrType::Chars);
        assert_eq!(meta.field_at(2).unwrap().name(), "score");
        assert_eq!(meta.field_at(2).unwrap().range(), 12..16);
        assert_eq!(meta.field_index("name"), Some(1));
        assert!(meta.field("age").is_none());
        assert!(meta.field_at(3).is_none());
        let names: Vec<_> = meta.fields().map(|f| f.name()).collect();
        assert_eq!(names, vec!["id", "name", "score"]);
    }

    #[test]
    fn test_table_meta_invalid() {
        let spec = TableSpec::new("", vec![ColumnSpec::int("id")]);
        assert_eq!(TableMeta::new(1, &spec).unwrap_err(), Error::EmptyTableName);
        let spec = TableSpec::new("t1", vec![]);
        assert!(matches!(
            TableMeta::new(1, &spec),
            Err(Error::EmptyColumns(_))
        ));
        let spec = TableSpec::new("t1", vec![ColumnSpec::int("id"), ColumnSpec::int("id")]);
        assert!(matches!(
            TableMeta::new(1, &spec),
            Err(Error::DuplicateColumn(_))
        ));
        let spec = TableSpec::new("t1", vec![ColumnSpec::new("id", AttrType::Int, 8)]);
        assert!(matches!(
            TableMeta::new(1, &spec),
            Err(Error::InvalidColumnLength { len: 8, .. })
        ));
        let spec = TableSpec::new("t1", vec![ColumnSpec::chars("c", 1)]);
        assert!(TableMeta::new(1, &spec).is_err());
        // row width overflows usize.
        let spec = TableSpec::new(
            "t1",
            vec![ColumnSpec::int("id"), ColumnSpec::chars("c", usize::MAX)],
        );
        assert!(matches!(
            TableMeta::new(1, &spec),
            Err(Error::InvalidColumnLength { len: usize::MAX, .. })
        ));
    }
}
