use crate::error::{Error, Result};
use mutdb_catalog::FieldMeta;
use mutdb_datatype::Value;
use mutdb_datatype::codec::{decode_field, encode_field};
use std::fmt;

pub type PageNum = u32;
pub type SlotNum = u32;

/// Row id, locating a row by page and slot inside a table.
///
/// Row ids are assigned once at insert and never change, updates
/// replace the bytes behind the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RID {
    pub page_num: PageNum,
    pub slot_num: SlotNum,
}

impl RID {
    #[inline]
    pub fn new(page_num: PageNum, slot_num: SlotNum) -> Self {
        RID { page_num, slot_num }
    }

    /// Derive row id from an insert sequence number.
    /// Returns None if page or slot does not fit, or page size is zero.
    #[inline]
    pub fn from_seq(seq: u64, rows_per_page: usize) -> Option<Self> {
        let rows_per_page = u64::try_from(rows_per_page).ok()?;
        let page_num = PageNum::try_from(seq.checked_div(rows_per_page)?).ok()?;
        let slot_num = SlotNum::try_from(seq.checked_rem(rows_per_page)?).ok()?;
        Some(RID { page_num, slot_num })
    }
}

impl fmt::Display for RID {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page_num, self.slot_num)
    }
}

/// Record is one row: its id and an owned fixed-width buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    rid: RID,
    data: Box<[u8]>,
}

impl Record {
    #[inline]
    pub fn new(rid: RID, data: Box<[u8]>) -> Self {
        Record { rid, data }
    }

    /// Make a fully independent copy of this record.
    /// Allocation failure is reported instead of aborting.
    #[inline]
    pub fn try_copy(&self) -> Result<Record> {
        let len = self.data.len();
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|_| Error::AllocationFailure(len))?;
        buf.extend_from_slice(&self.data);
        Ok(Record {
            rid: self.rid,
            data: buf.into_boxed_slice(),
        })
    }

    #[inline]
    pub fn rid(&self) -> RID {
        self.rid
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn into_data(self) -> Box<[u8]> {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Decode the slot of given field.
    #[inline]
    pub fn field_value(&self, field: &FieldMeta) -> Result<Value> {
        let len = self.data.len();
        let slot = self.data.get(field.range()).ok_or(Error::InvalidRecordLength {
            expected: field.offset() + field.len(),
            actual: len,
        })?;
        Ok(decode_field(field.attr_type(), slot)?)
    }

    /// Encode value into the slot of given field.
    /// Value must already have the declared type of the field.
    #[inline]
    pub fn set_field_value(&mut self, field: &FieldMeta, val: &Value) -> Result<()> {
        let len = self.data.len();
        let slot = self
            .data
            .get_mut(field.range())
            .ok_or(Error::InvalidRecordLength {
                expected: field.offset() + field.len(),
                actual: len,
            })?;
        encode_field(field.attr_type(), val, slot)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mutdb_catalog::{ColumnSpec, TableMeta, TableSpec};

    #[test]
    fn test_rid_from_seq() {
        assert_eq!(RID::from_seq(0, 64), Some(RID::new(0, 0)));
        assert_eq!(RID::from_seq(63, 64), Some(RID::new(0, 63)));
        assert_eq!(RID::from_seq(64, 64), Some(RID::new(1, 0)));
        assert_eq!(RID::from_seq(130, 64).unwrap().to_string(), "2:2");
        assert_eq!(RID::from_seq(5, 0), None);
        // page number beyond u32.
        assert_eq!(RID::from_seq(u64::MAX, 1), None);
        assert_eq!(RID::from_seq(u64::MAX, 1 << 40), None);
        assert_eq!(
            RID::from_seq((PageNum::MAX as u64) * 2 + 1, 2),
            Some(RID::new(PageNum::MAX, 1))
        );
        assert!(RID::new(0, 5) < RID::new(1, 0));
    }

    #[test]
    fn test_record_fields() {
        let meta = TableMeta::new(
            1,
            &TableSpec::new("t1", vec![ColumnSpec::int("id"), ColumnSpec::chars("name", 8)]),
        )
        .unwrap();
        let id = meta.field("id").unwrap();
        let name = meta.field("name").unwrap();
        let mut rec = Record::new(RID::new(0, 0), vec![0u8; meta.record_size()].into());
        rec.set_field_value(id, &Value::from(7)).unwrap();
        rec.set_field_value(name, &Value::from("alexandria")).unwrap();
        assert_eq!(&rec.data()[4..], b"alexand\0");

        let copy = rec.try_copy().unwrap();
        rec.set_field_value(id, &Value::from(8)).unwrap();
        assert_eq!(copy.field_value(id).unwrap(), Value::from(7));
        assert_eq!(rec.field_value(id).unwrap(), Value::from(8));
        assert_eq!(copy.rid(), rec.rid());

        assert!(rec.set_field_value(id, &Value::from("x")).is_err());
        let short = Record::new(RID::new(0, 1), vec![0u8; 6].into());
        assert!(matches!(
            short.field_value(name),
            Err(Error::InvalidRecordLength { expected: 12, actual: 6 })
        ));
    }
}
