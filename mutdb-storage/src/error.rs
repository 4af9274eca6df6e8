use crate::record::{PageNum, RID};
use mutdb_catalog::error::Error as CatalogError;
use mutdb_datatype::AttrType;
use mutdb_datatype::error::Error as DataTypeError;
use semistr::SemiStr;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of errors reported to the statement caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    TableNotFound,
    FieldNotFound,
    FieldTypeMismatch,
    AllocationFailure,
    LockConflict,
    Internal,
    Unimplemented,
    RecordNotFound,
    WriteConflict,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("table {} not found", .0.as_str())]
    TableNotFound(SemiStr),
    #[error("field {}.{} not found", .table.as_str(), .field.as_str())]
    FieldNotFound { table: SemiStr, field: SemiStr },
    #[error(
        "type mismatch on field {}: expected {expected}, actual {actual}",
        .field.as_str()
    )]
    FieldTypeMismatch {
        field: SemiStr,
        expected: AttrType,
        actual: AttrType,
    },
    #[error("failed to allocate {0} bytes")]
    AllocationFailure(usize),
    #[error("lock conflict on page {0}")]
    LockConflict(PageNum),
    #[error("internal error: {0}")]
    Internal(&'static str),
    #[error("{0} not implemented")]
    Unimplemented(&'static str),
    #[error("record {0} not found")]
    RecordNotFound(RID),
    #[error("write conflict on record {0}")]
    WriteConflict(RID),
    #[error("division by zero")]
    DivisionByZero,
    #[error("invalid record length: expected {expected}, actual {actual}")]
    InvalidRecordLength { expected: usize, actual: usize },
    #[error("{0}")]
    DataType(#[from] DataTypeError),
    #[error("{0}")]
    Catalog(#[from] CatalogError),
}

impl Error {
    #[inline]
    pub fn field_not_found(table: &str, field: &str) -> Self {
        Error::FieldNotFound {
            table: SemiStr::new(table),
            field: SemiStr::new(field),
        }
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) | Error::DivisionByZero => ErrorKind::InvalidArgument,
            Error::TableNotFound(_) => ErrorKind::TableNotFound,
            Error::FieldNotFound { .. } => ErrorKind::FieldNotFound,
            Error::FieldTypeMismatch { .. } => ErrorKind::FieldTypeMismatch,
            Error::AllocationFailure(_) => ErrorKind::AllocationFailure,
            Error::LockConflict(_) => ErrorKind::LockConflict,
            Error::Internal(_) | Error::InvalidRecordLength { .. } => ErrorKind::Internal,
            Error::Unimplemented(_) => ErrorKind::Unimplemented,
            Error::RecordNotFound(_) => ErrorKind::RecordNotFound,
            Error::WriteConflict(_) => ErrorKind::WriteConflict,
            Error::DataType(e) => match e {
                DataTypeError::TypeMismatch { .. }
                | DataTypeError::InvalidCast { .. }
                | DataTypeError::Incomparable { .. } => ErrorKind::FieldTypeMismatch,
                DataTypeError::InvalidFormat | DataTypeError::InvalidSlotLength { .. } => {
                    ErrorKind::Internal
                }
            },
            Error::Catalog(e) => match e {
                CatalogError::TableNotExists(_) => ErrorKind::TableNotFound,
                _ => ErrorKind::InvalidArgument,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_and_message() {
        let err = Error::field_not_found("t1", "age");
        assert_eq!(err.kind(), ErrorKind::FieldNotFound);
        assert_eq!(err.to_string(), "field t1.age not found");

        let err = Error::FieldTypeMismatch {
            field: SemiStr::new("name"),
            expected: AttrType::Chars,
            actual: AttrType::Int,
        };
        assert_eq!(err.kind(), ErrorKind::FieldTypeMismatch);
        assert_eq!(
            err.to_string(),
            "type mismatch on field name: expected CHARS, actual INT"
        );

        let err = Error::from(DataTypeError::Incomparable {
            left: AttrType::Chars,
            right: AttrType::Int,
        });
        assert_eq!(err.kind(), ErrorKind::FieldTypeMismatch);
        let err = Error::from(CatalogError::TableAlreadyExists(SemiStr::new("t1")));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(Error::Unimplemented("drop table").kind(), ErrorKind::Unimplemented);
        assert_eq!(Error::DivisionByZero.kind(), ErrorKind::InvalidArgument);
    }
}
