use crate::error::{Error, Result};
use crate::{Catalog, ObjID, TableID, TableMeta, TableSpec};
use indexmap::IndexMap;
use parking_lot::RwLock;
use semistr::SemiStr;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct MemCatalog {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: IndexMap<SemiStr, Arc<TableMeta>>,
    obj_id_gen: ObjID,
}

impl Inner {
    #[inline]
    fn create_table(&mut self, table_spec: TableSpec) -> Result<Arc<TableMeta>> {
        if self.tables.contains_key(table_spec.table_name.as_str()) {
            return Err(Error::TableAlreadyExists(table_spec.table_name));
        }
        let table_id = self.obj_id_gen + 1;
        let meta = Arc::new(TableMeta::new(table_id, &table_spec)?);
        self.obj_id_gen = table_id;
        self.tables.insert(table_spec.table_name, Arc::clone(&meta));
        Ok(meta)
    }

    #[inline]
    fn find_table(&self, table_id: TableID) -> Option<Arc<TableMeta>> {
        self.tables
            .values()
            .find(|t| t.table_id() == table_id)
            .cloned()
    }
}

impl Catalog for MemCatalog {
    #[inline]
    fn create_table(&self, table_spec: TableSpec) -> Result<Arc<TableMeta>> {
        let mut inner = self.inner.write();
        inner.create_table(table_spec)
    }

    #[inline]
    fn all_tables(&self) -> Vec<Arc<TableMeta>> {
        let inner = self.inner.read();
        inner.tables.values().cloned().collect()
    }

    #[inline]
    fn exists_table(&self, table_name: &str) -> bool {
        let inner = self.inner.read();
        inner.tables.contains_key(table_name)
    }

    #[inline]
    fn find_table_by_name(&self, table_name: &str) -> Option<Arc<TableMeta>> {
        let inner = self.inner.read();
        inner.tables.get(table_name).cloned()
    }

    #[inline]
    fn find_table(&self, table_id: TableID) -> Option<Arc<TableMeta>> {
        let inner = self.inner.read();
        inner.find_table(table_id)
    }
}
