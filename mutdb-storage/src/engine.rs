//! Storage engine of MutDB.
//!
//! This module provides the main entry point of the engine: configuration,
//! table registry and sessions.
use crate::error::{Error, Result};
use crate::session::Session;
use crate::table::Table;
use crate::trx::Trx;
use crate::trx::sys::{TransactionSystem, TrxKit};
use byte_unit::Byte;
use mutdb_catalog::mem_impl::MemCatalog;
use mutdb_catalog::{Catalog, TableID, TableSpec};
use parking_lot::RwLock;
use semistr::SemiStr;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_ROWS_PER_PAGE: usize = 64;
pub const DEFAULT_MAX_RECORD_SIZE: Byte = Byte::from_u64(64 * 1024);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // Number of row slots in one page. Page number is the key of
    // intra-transaction locks.
    pub rows_per_page: usize,
    // Upper bound of the fixed row width of any table.
    pub max_record_size: Byte,
}

impl Default for EngineConfig {
    #[inline]
    fn default() -> Self {
        EngineConfig {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
        }
    }
}

impl EngineConfig {
    #[inline]
    pub fn rows_per_page(mut self, rows_per_page: usize) -> Self {
        self.rows_per_page = rows_per_page;
        self
    }

    #[inline]
    pub fn max_record_size(mut self, max_record_size: impl Into<Byte>) -> Self {
        self.max_record_size = max_record_size.into();
        self
    }

    /// Parse configuration from TOML text. Missing keys are not allowed.
    #[inline]
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| {
            log::warn!("invalid engine config: {}", e);
            Error::InvalidArgument("invalid engine config")
        })
    }

    #[inline]
    pub fn build(self) -> Result<Arc<Engine>> {
        if self.rows_per_page == 0 {
            return Err(Error::InvalidArgument("rows_per_page must be positive"));
        }
        log::debug!("build engine with {:?}", self);
        Ok(Arc::new(Engine {
            config: self,
            catalog: MemCatalog::default(),
            tables: RwLock::new(HashMap::new()),
            trx_sys: Arc::new(TransactionSystem::new()),
        }))
    }
}

/// Engine owns the catalog, all tables and the transaction system.
pub struct Engine {
    config: EngineConfig,
    catalog: MemCatalog,
    tables: RwLock<HashMap<TableID, Arc<Table>>>,
    trx_sys: Arc<TransactionSystem>,
}

impl Engine {
    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn catalog(&self) -> &MemCatalog {
        &self.catalog
    }

    #[inline]
    pub fn trx_sys(&self) -> &Arc<TransactionSystem> {
        &self.trx_sys
    }

    #[inline]
    pub fn create_table(&self, spec: TableSpec) -> Result<Arc<Table>> {
        let record_size = spec
            .columns
            .iter()
            .try_fold(0usize, |acc, c| acc.checked_add(c.column_len));
        match record_size {
            Some(n) if n as u64 <= self.config.max_record_size.as_u64() => (),
            _ => {
                let n = record_size.unwrap_or(usize::MAX);
                log::warn!(
                    "record size {} of table {} exceeds limit {}",
                    n,
                    spec.table_name.as_str(),
                    self.config.max_record_size
                );
                return Err(Error::AllocationFailure(n));
            }
        }
        let meta = self.catalog.create_table(spec)?;
        let table = Arc::new(Table::new(Arc::clone(&meta), self.config.rows_per_page));
        self.tables
            .write()
            .insert(meta.table_id(), Arc::clone(&table));
        log::debug!(
            "created table {} with id {}, record size {}",
            meta.name(),
            meta.table_id(),
            meta.record_size()
        );
        Ok(table)
    }

    #[inline]
    pub fn find_table(&self, table_name: &str) -> Result<Arc<Table>> {
        self.catalog
            .find_table_by_name(table_name)
            .and_then(|meta| self.tables.read().get(&meta.table_id()).cloned())
            .ok_or_else(|| Error::TableNotFound(SemiStr::new(table_name)))
    }

    #[inline]
    pub fn new_trx(&self) -> Trx {
        self.trx_sys.create_trx()
    }

    #[inline]
    pub fn new_session(self: &Arc<Self>) -> Session {
        Session::new(Arc::clone(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutdb_catalog::ColumnSpec;

    #[test]
    fn test_engine_config() {
        let config = EngineConfig::default();
        let config_str = toml::to_string(&config).unwrap();
        println!("{}", config_str);
        let parsed = EngineConfig::from_toml(&config_str).unwrap();
        assert_eq!(parsed, config);
        let parsed =
            EngineConfig::from_toml("rows_per_page = 16\nmax_record_size = \"4 KiB\"\n").unwrap();
        assert_eq!(parsed.rows_per_page, 16);
        assert_eq!(parsed.max_record_size.as_u64(), 4096);
        let parsed =
            EngineConfig::from_toml("rows_per_page = 16\nmax_record_size = \"4096\"\n").unwrap();
        assert_eq!(parsed.max_record_size.as_u64(), 4096);
        assert!(EngineConfig::from_toml("rows_per_page = 16").is_err());

        let config = EngineConfig::default()
            .rows_per_page(4)
            .max_record_size(1024u64);
        assert_eq!(config.rows_per_page, 4);
        assert_eq!(config.max_record_size.as_u64(), 1024);
        assert!(EngineConfig::default().rows_per_page(0).build().is_err());
    }

    #[test]
    fn test_engine_tables() {
        let engine = EngineConfig::default()
            .max_record_size(16u64)
            .build()
            .unwrap();
        let t1 = engine
            .create_table(TableSpec::new(
                "t1",
                vec![ColumnSpec::int("id"), ColumnSpec::chars("name", 8)],
            ))
            .unwrap();
        assert_eq!(t1.record_size(), 12);
        assert_eq!(engine.find_table("t1").unwrap().table_id(), t1.table_id());
        assert_eq!(
            engine.find_table("t2").unwrap_err(),
            Error::TableNotFound(SemiStr::new("t2"))
        );
        let res = engine.create_table(TableSpec::new("t3", vec![ColumnSpec::chars("c", 17)]));
        assert_eq!(res.unwrap_err(), Error::AllocationFailure(17));
        let res = engine.create_table(TableSpec::new("t1", vec![ColumnSpec::int("id")]));
        assert!(matches!(res, Err(Error::Catalog(_))));
        // declared width overflows instead of panicking.
        let res = engine.create_table(TableSpec::new(
            "t4",
            vec![ColumnSpec::int("id"), ColumnSpec::chars("c", usize::MAX)],
        ));
        assert_eq!(res.unwrap_err(), Error::AllocationFailure(usize::MAX));
        assert!(engine.find_table("t4").is_err());
    }
}
