use mutdb_datatype::AttrType;
use semistr::SemiStr;

#[derive(Debug, Clone)]
pub struct TableSpec {
    pub table_name: SemiStr,
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    #[inline]
    pub fn new(table_name: &str, columns: Vec<ColumnSpec>) -> Self {
        TableSpec {
            table_name: SemiStr::new(table_name),
            columns,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub column_name: SemiStr,
    pub column_type: AttrType,
    // declared slot width in bytes.
    pub column_len: usize,
}

impl ColumnSpec {
    #[inline]
    pub fn new(column_name: &str, column_type: AttrType, column_len: usize) -> Self {
        ColumnSpec {
            column_name: SemiStr::new(column_name),
            column_type,
            column_len,
        }
    }

    #[inline]
    pub fn int(column_name: &str) -> Self {
        Self::new(column_name, AttrType::Int, mutdb_datatype::value::INT_LEN)
    }

    #[inline]
    pub fn float(column_name: &str) -> Self {
        Self::new(column_name, AttrType::Float, mutdb_datatype::value::FLOAT_LEN)
    }

    /// CHAR(n) column. The slot keeps one byte for the terminator.
    #[inline]
    pub fn chars(column_name: &str, column_len: usize) -> Self {
        Self::new(column_name, AttrType::Chars, column_len)
    }
}
