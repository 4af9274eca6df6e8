use crate::engine::Engine;
use crate::error::Result;
use crate::executor;
use crate::stmt::Stmt;
use crate::trx::Trx;
use std::sync::Arc;

/// Session holds the current transaction of one connection.
/// The transaction is rolled back if the session ends without commit.
pub struct Session {
    engine: Arc<Engine>,
    trx: Trx,
}

impl Session {
    #[inline]
    pub(crate) fn new(engine: Arc<Engine>) -> Self {
        let trx = engine.new_trx();
        Session { engine, trx }
    }

    #[inline]
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    #[inline]
    pub fn trx(&self) -> &Trx {
        &self.trx
    }

    #[inline]
    pub fn execute(&self, stmt: Stmt) -> Result<usize> {
        executor::execute(stmt, &self.trx)
    }

    #[inline]
    pub fn commit(&self) -> Result<()> {
        self.trx.commit()
    }

    #[inline]
    pub fn rollback(&self) -> Result<()> {
        self.trx.rollback()
    }
}
