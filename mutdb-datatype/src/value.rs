use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;

pub const INT_LEN: usize = 4;
pub const FLOAT_LEN: usize = 4;

/// Declared type of a column or a scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttrType {
    Chars = 1,
    Int = 2,
    Float = 3,
}

impl AttrType {
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, AttrType::Int | AttrType::Float)
    }

    /// Returns the slot width required by the type, or None if
    /// the width is declared by the column.
    #[inline]
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            AttrType::Int => Some(INT_LEN),
            AttrType::Float => Some(FLOAT_LEN),
            AttrType::Chars => None,
        }
    }

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            AttrType::Chars => "CHARS",
            AttrType::Int => "INT",
            AttrType::Float => "FLOAT",
        }
    }
}

impl fmt::Display for AttrType {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value is the scalar representation used by filters, expressions
/// and the update path.
///
/// The length of a value is always its logical content length.
/// For CHARS it is the number of bytes held, regardless of the width
/// of any field it may be written into.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Float(f32),
    Chars(Vec<u8>),
}

impl Value {
    #[inline]
    pub fn attr_type(&self) -> AttrType {
        match self {
            Value::Int(_) => AttrType::Int,
            Value::Float(_) => AttrType::Float,
            Value::Chars(_) => AttrType::Chars,
        }
    }

    #[inline]
    pub fn length(&self) -> usize {
        match self {
            Value::Int(_) => INT_LEN,
            Value::Float(_) => FLOAT_LEN,
            Value::Chars(bs) => bs.len(),
        }
    }

    #[inline]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Chars(bs) => Some(bs),
            _ => None,
        }
    }

    #[inline]
    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v as f64),
            Value::Chars(_) => None,
        }
    }

    /// Implicit coercion applied when a value is stored into a field
    /// of another type. Only INT and FLOAT convert into each other.
    ///
    /// FLOAT to INT truncates toward zero and saturates at the bounds
    /// of i32, NaN becomes zero.
    #[inline]
    pub fn cast_to(&self, target: AttrType) -> Result<Value> {
        match (self, target) {
            (v, t) if v.attr_type() == t => Ok(v.clone()),
            (Value::Int(v), AttrType::Float) => Ok(Value::Float(*v as f32)),
            (Value::Float(v), AttrType::Int) => Ok(Value::Int(*v as i32)),
            (v, t) => Err(Error::InvalidCast {
                from: v.attr_type(),
                to: t,
            }),
        }
    }

    /// Explicit conversion requested by a CAST expression.
    /// In addition to the numeric coercions, numbers render into CHARS
    /// and CHARS parse into numbers.
    #[inline]
    pub fn convert_to(&self, target: AttrType) -> Result<Value> {
        match (self, target) {
            (Value::Int(_) | Value::Float(_), AttrType::Chars) => {
                Ok(Value::Chars(self.to_string().into_bytes()))
            }
            (Value::Chars(bs), AttrType::Int) => parse_chars::<i32>(bs)
                .map(Value::Int)
                .ok_or(Error::InvalidCast {
                    from: AttrType::Chars,
                    to: AttrType::Int,
                }),
            (Value::Chars(bs), AttrType::Float) => parse_chars::<f32>(bs)
                .map(Value::Float)
                .ok_or(Error::InvalidCast {
                    from: AttrType::Chars,
                    to: AttrType::Float,
                }),
            _ => self.cast_to(target),
        }
    }

    /// Type-aware comparison.
    ///
    /// INT and FLOAT compare numerically after widening, so -0.0 equals
    /// 0.0 and NaN is not comparable with anything. CHARS compare
    /// byte-wise up to the first NUL. Comparing CHARS with a number is
    /// an error.
    #[inline]
    pub fn compare(&self, rhs: &Value) -> Result<Ordering> {
        let incomparable = || Error::Incomparable {
            left: self.attr_type(),
            right: rhs.attr_type(),
        };
        match (self, rhs) {
            (Value::Int(l), Value::Int(r)) => Ok(l.cmp(r)),
            (Value::Chars(l), Value::Chars(r)) => Ok(until_nul(l).cmp(until_nul(r))),
            (l, r) => match (l.as_f64(), r.as_f64()) {
                (Some(l), Some(r)) => l.partial_cmp(&r).ok_or_else(incomparable),
                _ => Err(incomparable()),
            },
        }
    }

    /// SQL LIKE between two CHARS values.
    /// `%` matches any run of bytes, `_` matches exactly one byte.
    /// Both sides end at their first NUL.
    #[inline]
    pub fn like(&self, pattern: &Value) -> Result<bool> {
        match (self, pattern) {
            (Value::Chars(s), Value::Chars(p)) => Ok(like_match(until_nul(s), until_nul(p))),
            _ => Err(Error::Incomparable {
                left: self.attr_type(),
                right: pattern.attr_type(),
            }),
        }
    }
}

/// Logical content of a CHARS value: bytes before the first NUL.
#[inline]
pub fn until_nul(bs: &[u8]) -> &[u8] {
    match bs.iter().position(|b| *b == 0) {
        Some(n) => &bs[..n],
        None => bs,
    }
}

#[inline]
fn parse_chars<T: std::str::FromStr>(bs: &[u8]) -> Option<T> {
    std::str::from_utf8(bs).ok()?.trim().parse().ok()
}

fn like_match(s: &[u8], p: &[u8]) -> bool {
    let (mut si, mut pi) = (0, 0);
    // position of last '%' in pattern and the input position it matched up to.
    let mut star: Option<(usize, usize)> = None;
    while si < s.len() {
        if pi < p.len() && (p[pi] == b'_' || p[pi] == s[si]) && p[pi] != b'%' {
            si += 1;
            pi += 1;
        } else if pi < p.len() && p[pi] == b'%' {
            star = Some((pi, si));
            pi += 1;
        } else if let Some((sp, ss)) = star {
            pi = sp + 1;
            si = ss + 1;
            star = Some((sp, ss + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|b| *b == b'%')
}

impl fmt::Display for Value {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Chars(bs) => f.write_str(&String::from_utf8_lossy(bs)),
        }
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::Chars(value.as_bytes().to_vec())
    }
}

impl From<&[u8]> for Value {
    #[inline]
    fn from(value: &[u8]) -> Self {
        Value::Chars(value.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_length() {
        assert_eq!(Value::from(7).length(), 4);
        assert_eq!(Value::from(1.5f32).length(), 4);
        assert_eq!(Value::from("alexandria").length(), 10);
        assert_eq!(Value::from("").length(), 0);
    }

    #[test]
    fn test_value_cast() {
        assert_eq!(Value::from(3).cast_to(AttrType::Float), Ok(Value::Float(3.0)));
        assert_eq!(Value::from(3.9f32).cast_to(AttrType::Int), Ok(Value::Int(3)));
        assert_eq!(Value::from(-3.9f32).cast_to(AttrType::Int), Ok(Value::Int(-3)));
        assert_eq!(
            Value::from(1e20f32).cast_to(AttrType::Int),
            Ok(Value::Int(i32::MAX))
        );
        assert_eq!(
            Value::from("1").cast_to(AttrType::Int),
            Err(Error::InvalidCast {
                from: AttrType::Chars,
                to: AttrType::Int
            })
        );
        assert!(Value::from(1).cast_to(AttrType::Chars).is_err());
        assert_eq!(Value::from("x").cast_to(AttrType::Chars), Ok(Value::from("x")));
    }

    #[test]
    fn test_value_convert() {
        assert_eq!(Value::from(12).convert_to(AttrType::Chars), Ok(Value::from("12")));
        assert_eq!(Value::from(2.5f32).convert_to(AttrType::Chars), Ok(Value::from("2.5")));
        assert_eq!(Value::from(" 42 ").convert_to(AttrType::Int), Ok(Value::Int(42)));
        assert_eq!(Value::from("0.5").convert_to(AttrType::Float), Ok(Value::Float(0.5)));
        assert!(Value::from("abc").convert_to(AttrType::Int).is_err());
    }

    #[test]
    fn test_value_compare() {
        use Ordering::*;
        let cases: Vec<(Value, Value, Ordering)> = vec![
            (Value::from(1), Value::from(2), Less),
            (Value::from(2), Value::from(2), Equal),
            (Value::from(3), Value::from(2), Greater),
            (Value::from(1), Value::from(1.5f32), Less),
            (Value::from(2.0f32), Value::from(2), Equal),
            (Value::from(2.5f32), Value::from(2), Greater),
            (Value::from(0.5f32), Value::from(0.25f32), Greater),
            (Value::from("abc"), Value::from("abd"), Less),
            (Value::from("ab"), Value::from("abc"), Less),
            (Value::from("b"), Value::from("abc"), Greater),
            (Value::from("bob"), Value::from("bob"), Equal),
        ];
        for (l, r, ord) in cases {
            assert_eq!(l.compare(&r), Ok(ord), "{} vs {}", l, r);
            assert_eq!(r.compare(&l), Ok(ord.reverse()), "{} vs {}", r, l);
        }
        assert!(Value::from("1").compare(&Value::from(1)).is_err());
        assert!(Value::from(1.0f32).compare(&Value::from("1")).is_err());
    }

    #[test]
    fn test_value_compare_signed_zero_and_nan() {
        use Ordering::*;
        let neg_zero = Value::from(-0.0f32);
        assert_eq!(neg_zero.compare(&Value::from(0.0f32)), Ok(Equal));
        assert_eq!(neg_zero.compare(&Value::from(0)), Ok(Equal));
        assert_eq!(Value::from(0).compare(&neg_zero), Ok(Equal));
        assert_eq!(neg_zero.compare(&Value::from(-1)), Ok(Greater));

        let nan = Value::from(f32::NAN);
        assert_eq!(
            nan.compare(&nan),
            Err(Error::Incomparable {
                left: AttrType::Float,
                right: AttrType::Float
            })
        );
        assert!(nan.compare(&Value::from(1)).is_err());
        assert!(Value::from(1).compare(&nan).is_err());
    }

    #[test]
    fn test_value_chars_until_nul() {
        use Ordering::*;
        let bob = Value::from("bob");
        assert_eq!(Value::from(&b"bob\0"[..]).compare(&bob), Ok(Equal));
        assert_eq!(Value::from(&b"bob\0\0\0\0\0"[..]).compare(&bob), Ok(Equal));
        assert_eq!(Value::from(&b"bob\0zz"[..]).compare(&Value::from("bobz")), Ok(Less));
        assert_eq!(Value::from(&b"\0abc"[..]).compare(&Value::from("")), Ok(Equal));

        assert!(Value::from(&b"bob\0\0"[..]).like(&bob).unwrap());
        assert!(bob.like(&Value::from(&b"b_b\0x"[..])).unwrap());
        assert!(!Value::from(&b"bo\0b"[..]).like(&bob).unwrap());
        assert_eq!(until_nul(b"ab\0c"), b"ab");
        assert_eq!(until_nul(b"abc"), b"abc");
    }

    #[test]
    fn test_value_like() {
        let like = |s: &str, p: &str| Value::from(s).like(&Value::from(p)).unwrap();
        assert!(like("alice", "alice"));
        assert!(like("alice", "a%"));
        assert!(like("alice", "%ce"));
        assert!(like("alice", "%li%"));
        assert!(like("alice", "a_i_e"));
        assert!(like("alice", "%"));
        assert!(like("", "%"));
        assert!(!like("", "_"));
        assert!(!like("alice", "bob%"));
        assert!(!like("alice", "a_c%"));
        assert!(like("aXbXc", "a%b%c"));
        assert!(!like("abc", "ab"));
        assert!(Value::from(1).like(&Value::from("1")).is_err());
    }
}
