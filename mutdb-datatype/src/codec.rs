//! Fixed-width field codec.
//!
//! A row is a fixed-width byte buffer and every column owns a slot
//! `[offset, offset + width)` in it. INT and FLOAT slots hold the
//! little-endian bytes of the number. A CHARS slot holds at most
//! `width - 1` content bytes and is always terminated by a zero byte
//! inside the slot; unused trailing bytes are zero.
use crate::error::{Error, Result};
use crate::value::{AttrType, FLOAT_LEN, INT_LEN, Value, until_nul};

/// Decode a slot as the declared type.
#[inline]
pub fn decode_field(ty: AttrType, slot: &[u8]) -> Result<Value> {
    match ty {
        AttrType::Int => {
            check_slot_len(INT_LEN, slot.len())?;
            Ok(Value::Int(i32::from_le_bytes(slot.try_into()?)))
        }
        AttrType::Float => {
            check_slot_len(FLOAT_LEN, slot.len())?;
            Ok(Value::Float(f32::from_le_bytes(slot.try_into()?)))
        }
        AttrType::Chars => Ok(Value::Chars(until_nul(slot).to_vec())),
    }
}

/// Encode a value into a slot of the declared type.
///
/// The value must already have the declared type, coercion is
/// the caller's responsibility.
#[inline]
pub fn encode_field(ty: AttrType, val: &Value, slot: &mut [u8]) -> Result<()> {
    match (ty, val) {
        (AttrType::Int, Value::Int(v)) => {
            check_slot_len(INT_LEN, slot.len())?;
            slot.copy_from_slice(&v.to_le_bytes());
            Ok(())
        }
        (AttrType::Float, Value::Float(v)) => {
            check_slot_len(FLOAT_LEN, slot.len())?;
            slot.copy_from_slice(&v.to_le_bytes());
            Ok(())
        }
        (AttrType::Chars, Value::Chars(bs)) => {
            encode_chars(bs, slot);
            Ok(())
        }
        (ty, val) => Err(Error::TypeMismatch {
            expected: ty,
            actual: val.attr_type(),
        }),
    }
}

/// Shorter input is zero-padded, longer input keeps its first
/// `width - 1` bytes followed by the terminator.
#[inline]
fn encode_chars(bs: &[u8], slot: &mut [u8]) {
    let width = slot.len();
    if width == 0 {
        return;
    }
    if bs.len() < width {
        slot[..bs.len()].copy_from_slice(bs);
        slot[bs.len()..].fill(0);
    } else {
        slot[..width - 1].copy_from_slice(&bs[..width - 1]);
        slot[width - 1] = 0;
    }
}

#[inline]
fn check_slot_len(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::InvalidSlotLength { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_codec_numbers() {
        let mut slot = [0u8; 4];
        encode_field(AttrType::Int, &Value::Int(-17), &mut slot).unwrap();
        assert_eq!(slot, (-17i32).to_le_bytes());
        assert_eq!(decode_field(AttrType::Int, &slot).unwrap(), Value::Int(-17));

        encode_field(AttrType::Float, &Value::Float(3.25), &mut slot).unwrap();
        assert_eq!(decode_field(AttrType::Float, &slot).unwrap(), Value::Float(3.25));

        let mut wide = [0u8; 8];
        assert_eq!(
            encode_field(AttrType::Int, &Value::Int(1), &mut wide),
            Err(Error::InvalidSlotLength {
                expected: 4,
                actual: 8
            })
        );
        assert!(decode_field(AttrType::Float, &wide).is_err());
    }

    #[test]
    fn test_codec_type_mismatch() {
        let mut slot = [0u8; 4];
        assert_eq!(
            encode_field(AttrType::Chars, &Value::Int(1), &mut slot),
            Err(Error::TypeMismatch {
                expected: AttrType::Chars,
                actual: AttrType::Int
            })
        );
        assert!(encode_field(AttrType::Int, &Value::Float(1.0), &mut slot).is_err());
    }

    #[test]
    fn test_codec_chars_pad_and_truncate() {
        let mut slot = [0xffu8; 8];
        encode_field(AttrType::Chars, &Value::from("bob"), &mut slot).unwrap();
        assert_eq!(&slot, b"bob\0\0\0\0\0");
        assert_eq!(decode_field(AttrType::Chars, &slot).unwrap(), Value::from("bob"));

        let mut slot = [0xffu8; 8];
        encode_field(AttrType::Chars, &Value::from("alexandria"), &mut slot).unwrap();
        assert_eq!(&slot, b"alexand\0");
        assert_eq!(
            decode_field(AttrType::Chars, &slot).unwrap(),
            Value::from("alexand")
        );

        // exactly the slot width still reserves the terminator.
        let mut slot = [0xffu8; 4];
        encode_field(AttrType::Chars, &Value::from("abcd"), &mut slot).unwrap();
        assert_eq!(&slot, b"abc\0");
    }

    #[test]
    fn test_codec_chars_random() {
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let width = rng.random_range(1..32usize);
            let len = rng.random_range(0..48usize);
            // non-zero content so decoding stops only at the terminator.
            let content: Vec<u8> = (0..len).map(|_| rng.random_range(1..=255u8)).collect();
            let mut slot = vec![0xaau8; width];
            encode_field(AttrType::Chars, &Value::Chars(content.clone()), &mut slot).unwrap();
            if len < width {
                assert_eq!(&slot[..len], &content[..]);
                assert!(slot[len..].iter().all(|b| *b == 0));
            } else {
                assert_eq!(&slot[..width - 1], &content[..width - 1]);
                assert_eq!(slot[width - 1], 0);
            }
            let expected = &content[..len.min(width - 1)];
            assert_eq!(
                decode_field(AttrType::Chars, &slot).unwrap(),
                Value::Chars(expected.to_vec())
            );
        }
    }
}
