use semistr::SemiStr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("table name is empty")]
    EmptyTableName,
    #[error("table {} has no column", .0.as_str())]
    EmptyColumns(SemiStr),
    #[error("table {} already exists", .0.as_str())]
    TableAlreadyExists(SemiStr),
    #[error("table {} not exists", .0.as_str())]
    TableNotExists(SemiStr),
    #[error("duplicate column {}", .0.as_str())]
    DuplicateColumn(SemiStr),
    #[error("invalid length {len} of column {}", .column.as_str())]
    InvalidColumnLength { column: SemiStr, len: usize },
}
