pub mod codec;
pub mod error;
pub mod value;

pub use value::{AttrType, Value};
