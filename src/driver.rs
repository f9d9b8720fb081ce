//! Narrowing Rust values into driver values.
//!
//! This is the outbound direction: a query parameter must be reduced to one
//! of the [`Value`] kinds before a driver can send it. [`Valuer`] performs
//! the reduction for a single type; a [`ValueConverter`] applies a column
//! rule on top of it.

use chrono::{DateTime, FixedOffset, Utc};

use crate::coerce;
use crate::config::ConvertOptions;
use crate::destination::RawBytes;
use crate::error::{ConvertError, ConvertResult};
use crate::value::Value;

/// Reduces `self` to a driver value.
pub trait Valuer {
    /// # Errors
    ///
    /// Fails when `self` has no representation among the driver value kinds.
    fn value(&self) -> ConvertResult<Value>;
}

macro_rules! lossless_int_valuers {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Valuer for $ty {
                fn value(&self) -> ConvertResult<Value> {
                    Ok(Value::Int64(i64::from(*self)))
                }
            }
        )*
    };
}

lossless_int_valuers!(i8, i16, i32, i64, u8, u16, u32);

impl Valuer for isize {
    // isize is at most 64 bits on every supported target.
    #[allow(clippy::cast_possible_truncation)]
    fn value(&self) -> ConvertResult<Value> {
        Ok(Value::Int64(*self as i64))
    }
}

impl Valuer for u64 {
    fn value(&self) -> ConvertResult<Value> {
        i64::try_from(*self)
            .map(Value::Int64)
            .map_err(|_| ConvertError::UintHighBit { value: *self })
    }
}

impl Valuer for usize {
    fn value(&self) -> ConvertResult<Value> {
        (*self as u64).value()
    }
}

impl Valuer for f32 {
    fn value(&self) -> ConvertResult<Value> {
        Ok(Value::Float64(f64::from(*self)))
    }
}

impl Valuer for f64 {
    fn value(&self) -> ConvertResult<Value> {
        Ok(Value::Float64(*self))
    }
}

impl Valuer for bool {
    fn value(&self) -> ConvertResult<Value> {
        Ok(Value::Bool(*self))
    }
}

impl Valuer for str {
    fn value(&self) -> ConvertResult<Value> {
        Ok(Value::Text(self.to_string()))
    }
}

impl Valuer for String {
    fn value(&self) -> ConvertResult<Value> {
        Ok(Value::Text(self.clone()))
    }
}

impl Valuer for [u8] {
    fn value(&self) -> ConvertResult<Value> {
        Ok(Value::Bytes(self.to_vec()))
    }
}

impl Valuer for Vec<u8> {
    fn value(&self) -> ConvertResult<Value> {
        Ok(Value::Bytes(self.clone()))
    }
}

impl Valuer for RawBytes {
    fn value(&self) -> ConvertResult<Value> {
        Ok(self
            .as_bytes()
            .map_or(Value::Null, |b| Value::Bytes(b.to_vec())))
    }
}

impl Valuer for DateTime<FixedOffset> {
    fn value(&self) -> ConvertResult<Value> {
        Ok(Value::Time(*self))
    }
}

impl Valuer for DateTime<Utc> {
    fn value(&self) -> ConvertResult<Value> {
        Ok(Value::from(*self))
    }
}

impl Valuer for Value {
    fn value(&self) -> ConvertResult<Value> {
        Ok(self.clone())
    }
}

impl<T: Valuer> Valuer for Option<T> {
    fn value(&self) -> ConvertResult<Value> {
        self.as_ref().map_or(Ok(Value::Null), Valuer::value)
    }
}

impl<T: Valuer + ?Sized> Valuer for &T {
    fn value(&self) -> ConvertResult<Value> {
        (**self).value()
    }
}

impl<T: Valuer + ?Sized> Valuer for Box<T> {
    fn value(&self) -> ConvertResult<Value> {
        (**self).value()
    }
}

/// A column-level parameter conversion rule.
pub trait ValueConverter {
    /// # Errors
    ///
    /// Fails when `src` cannot be narrowed or violates the column rule.
    fn convert_value(&self, src: &dyn Valuer) -> ConvertResult<Value>;
}

/// Narrows through [`Valuer`] and nothing else.
///
/// # Examples
///
/// ```
/// use kyroscan::{DefaultParameterConverter, NullString, Value, ValueConverter};
///
/// let hi = NullString::new("hi".to_string());
/// assert_eq!(DefaultParameterConverter.convert_value(&hi).unwrap(), Value::from("hi"));
/// assert_eq!(DefaultParameterConverter.convert_value(&NullString::default()).unwrap(), Value::Null);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultParameterConverter;

impl ValueConverter for DefaultParameterConverter {
    fn convert_value(&self, src: &dyn Valuer) -> ConvertResult<Value> {
        src.value()
    }
}

/// Converts to a `Bool` value using the truthy/falsy tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolConverter;

impl ValueConverter for BoolConverter {
    fn convert_value(&self, src: &dyn Valuer) -> ConvertResult<Value> {
        let value = src.value()?;
        coerce::to_bool(&value, &ConvertOptions::strict()).map(Value::Bool)
    }
}

/// Converts to an `Int64` value that fits in 32 signed bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Int32Converter;

impl Int32Converter {
    fn check(value: i64) -> ConvertResult<Value> {
        if i32::try_from(value).is_ok() {
            Ok(Value::Int64(value))
        } else {
            Err(ConvertError::Int32Overflow { value })
        }
    }
}

impl ValueConverter for Int32Converter {
    fn convert_value(&self, src: &dyn Valuer) -> ConvertResult<Value> {
        match src.value()? {
            Value::Int64(v) => Self::check(v),
            Value::Text(s) => match s.parse::<i64>() {
                Ok(v) => Self::check(v),
                Err(_) => Err(ConvertError::Int32Syntax { text: s }),
            },
            other => Err(ConvertError::Int32Unsupported {
                value: other.to_string(),
                src_type: other.type_name(),
            }),
        }
    }
}

/// Converts to `Text`, rendering non-text kinds canonically.
///
/// `Bytes` and `Null` pass through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StringConverter;

impl ValueConverter for StringConverter {
    fn convert_value(&self, src: &dyn Valuer) -> ConvertResult<Value> {
        let value = src.value()?;
        Ok(match value {
            Value::Text(_) | Value::Bytes(_) | Value::Null => value,
            other => Value::Text(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nullable::NullString;
    use chrono::TimeZone;

    #[test]
    fn test_int_valuers() {
        assert_eq!(7i8.value(), Ok(Value::Int64(7)));
        assert_eq!(65_535u16.value(), Ok(Value::Int64(65_535)));
        assert_eq!((-3isize).value(), Ok(Value::Int64(-3)));
        assert_eq!(5usize.value(), Ok(Value::Int64(5)));
    }

    #[test]
    fn test_u64_high_bit() {
        assert_eq!(
            (i64::MAX as u64).value(),
            Ok(Value::Int64(i64::MAX))
        );
        let err = (1u64 << 63).value().unwrap_err();
        assert_eq!(err.to_string(), "uint64 values with high bit set are not supported");
    }

    #[test]
    fn test_misc_valuers() {
        assert_eq!(1.5f32.value(), Ok(Value::Float64(1.5)));
        assert_eq!(true.value(), Ok(Value::Bool(true)));
        assert_eq!("s".value(), Ok(Value::from("s")));
        assert_eq!(b"ab"[..].value(), Ok(Value::Bytes(b"ab".to_vec())));
        assert_eq!(None::<i32>.value(), Ok(Value::Null));
        assert_eq!(Some(2i32).value(), Ok(Value::Int64(2)));
        assert_eq!(RawBytes::new().value(), Ok(Value::Null));

        let t = Utc.timestamp_opt(5, 0).unwrap();
        assert_eq!(t.value(), Ok(Value::Time(t.fixed_offset())));
    }

    #[test]
    fn test_default_converter_null_string() {
        let conv = DefaultParameterConverter;
        let valid = NullString::new("hi".to_string());
        assert_eq!(conv.convert_value(&valid), Ok(Value::from("hi")));
        let invalid = NullString {
            value: String::new(),
            valid: false,
        };
        assert_eq!(conv.convert_value(&invalid), Ok(Value::Null));
    }

    #[test]
    fn test_bool_converter() {
        assert_eq!(BoolConverter.convert_value(&"True"), Ok(Value::Bool(true)));
        assert_eq!(BoolConverter.convert_value(&0i64), Ok(Value::Bool(false)));
        let err = BoolConverter.convert_value(&"maybe").unwrap_err();
        assert!(err.is_unconvertible());
    }

    #[test]
    fn test_int32_converter() {
        assert_eq!(Int32Converter.convert_value(&42u8), Ok(Value::Int64(42)));
        assert_eq!(Int32Converter.convert_value(&"-7"), Ok(Value::Int64(-7)));

        let err = Int32Converter.convert_value(&(1i64 << 40)).unwrap_err();
        assert_eq!(err.to_string(), "sql/driver: value 1099511627776 overflows int32");

        let err = Int32Converter.convert_value(&"abc").unwrap_err();
        assert_eq!(err.to_string(), r#"sql/driver: value "abc" can't be converted to int32"#);

        let err = Int32Converter.convert_value(&1.5f64).unwrap_err();
        assert_eq!(
            err.to_string(),
            "sql/driver: unsupported value 1.5 (type f64) converting to int32"
        );
    }

    #[test]
    fn test_string_converter() {
        assert_eq!(StringConverter.convert_value(&12i32), Ok(Value::from("12")));
        assert_eq!(StringConverter.convert_value(&false), Ok(Value::from("false")));
        assert_eq!(
            StringConverter.convert_value(&b"raw".to_vec()),
            Ok(Value::Bytes(b"raw".to_vec()))
        );
        assert_eq!(StringConverter.convert_value(&None::<String>), Ok(Value::Null));
    }
}
