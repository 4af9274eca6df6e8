pub mod engine;
pub mod error;
pub mod executor;
pub mod expr;
pub mod filter;
pub mod operator;
pub mod record;
pub mod session;
pub mod stmt;
pub mod table;
pub mod trx;

pub mod prelude {
    pub use crate::engine::*;
    pub use crate::error::*;
    pub use crate::expr::*;
    pub use crate::filter::*;
    pub use crate::record::*;
    pub use crate::session::*;
    pub use crate::stmt::*;
    pub use crate::table::*;
    pub use crate::trx::lock::*;
    pub use crate::trx::sys::*;
    pub use crate::trx::*;
}
