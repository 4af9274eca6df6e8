use crate::value::AttrType;
use std::array::TryFromSliceError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid format")]
    InvalidFormat,
    #[error("invalid slot length: expected {expected}, actual {actual}")]
    InvalidSlotLength { expected: usize, actual: usize },
    #[error("type mismatch: expected {expected}, actual {actual}")]
    TypeMismatch { expected: AttrType, actual: AttrType },
    #[error("cannot cast {from} to {to}")]
    InvalidCast { from: AttrType, to: AttrType },
    #[error("cannot compare {left} with {right}")]
    Incomparable { left: AttrType, right: AttrType },
}

impl From<TryFromSliceError> for Error {
    #[inline]
    fn from(_src: TryFromSliceError) -> Error {
        Error::InvalidFormat
    }
}
