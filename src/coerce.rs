//! Coercion rules between driver values and primitive destinations.
//!
//! Every rule is total: it either produces the destination's new contents or
//! a [`ConvertError`], and it writes the destination only once the new
//! contents are known. Narrowing never truncates silently.

use std::fmt::{self, Write as _};
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;

use crate::config::ConvertOptions;
use crate::destination::{Primitive, RawBytes};
use crate::error::{ConvertError, ConvertResult};
use crate::value::Value;

/// `fmt::Write` adapter appending to a byte vector.
pub(crate) struct ByteSink<'a>(pub &'a mut Vec<u8>);

impl fmt::Write for ByteSink<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// Fixed-size scratch buffer for formatting without the heap.
struct StackBuf {
    buf: [u8; 48],
    len: usize,
}

impl StackBuf {
    const fn new() -> Self {
        Self {
            buf: [0; 48],
            len: 0,
        }
    }

    fn as_str(&self) -> &str {
        // Only whole `&str` slices are ever copied in.
        std::str::from_utf8(&self.buf[..self.len]).unwrap_or_default()
    }
}

impl fmt::Write for StackBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let end = self.len + s.len();
        if end > self.buf.len() {
            return Err(fmt::Error);
        }
        self.buf[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }
}

/// Writes the shortest decimal form of `v` that round-trips.
///
/// Magnitudes outside `[1e-4, 1e21)` use exponent form with a signed,
/// two-digit minimum exponent (`1e+21`, `1.5e-07`).
pub(crate) fn write_float<W: fmt::Write + ?Sized>(w: &mut W, v: f64) -> fmt::Result {
    if v.is_nan() {
        return w.write_str("NaN");
    }
    if v.is_infinite() {
        return w.write_str(if v > 0.0 { "+Inf" } else { "-Inf" });
    }

    let abs = v.abs();
    if abs == 0.0 || (1e-4..1e21).contains(&abs) {
        return write!(w, "{v}");
    }

    let mut scratch = StackBuf::new();
    write!(scratch, "{v:e}")?;
    let rendered = scratch.as_str();
    let (mantissa, exp) = rendered.split_once('e').unwrap_or((rendered, "0"));
    let (sign, digits) = match exp.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exp),
    };
    write!(w, "{mantissa}e{sign}")?;
    if digits.len() < 2 {
        w.write_char('0')?;
    }
    w.write_str(digits)
}

fn numeric_text<'s>(s: &'s str, options: &ConvertOptions) -> &'s str {
    if options.trim_numeric_text {
        s.trim_matches(|c: char| c.is_ascii_whitespace())
    } else {
        s
    }
}

fn parse_int<T>(
    s: &str,
    src: &Value,
    dest_kind: &'static str,
    options: &ConvertOptions,
) -> ConvertResult<T>
where
    T: FromStr<Err = ParseIntError>,
{
    numeric_text(s, options).parse::<T>().map_err(|e| {
        let src_type = src.type_name();
        let text = s.to_string();
        match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ConvertError::OutOfRange {
                src_type,
                text,
                dest_kind,
            },
            _ => ConvertError::InvalidSyntax {
                src_type,
                text,
                dest_kind,
            },
        }
    })
}

/// Converts `src` into an integer of the destination's width.
pub(crate) fn to_int<T>(
    src: &Value,
    dest_kind: &'static str,
    options: &ConvertOptions,
) -> ConvertResult<T>
where
    T: TryFrom<i64> + FromStr<Err = ParseIntError>,
{
    match src {
        Value::Null => Err(ConvertError::NullUnsupported { dest_kind }),
        Value::Int64(v) => T::try_from(*v).map_err(|_| ConvertError::OutOfRange {
            src_type: src.type_name(),
            text: v.to_string(),
            dest_kind,
        }),
        Value::Text(s) => parse_int(s, src, dest_kind, options),
        Value::Bytes(b) => match std::str::from_utf8(b) {
            Ok(s) => parse_int(s, src, dest_kind, options),
            Err(_) => Err(ConvertError::InvalidSyntax {
                src_type: src.type_name(),
                text: String::from_utf8_lossy(b).into_owned(),
                dest_kind,
            }),
        },
        Value::Float64(_) | Value::Bool(_) | Value::Time(_) => {
            parse_int(&src.to_string(), src, dest_kind, options)
        }
    }
}

/// Float widths the engine can narrow into.
pub(crate) trait FloatTarget: FromStr + Sized {
    fn from_f64(v: f64) -> Self;
    fn from_i64(v: i64) -> Self;
}

impl FloatTarget for f32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_i64(v: i64) -> Self {
        v as f32
    }
}

impl FloatTarget for f64 {
    fn from_f64(v: f64) -> Self {
        v
    }

    #[allow(clippy::cast_precision_loss)]
    fn from_i64(v: i64) -> Self {
        v as f64
    }
}

fn parse_float<T: FloatTarget>(
    s: &str,
    src: &Value,
    dest_kind: &'static str,
    options: &ConvertOptions,
) -> ConvertResult<T> {
    numeric_text(s, options)
        .parse::<T>()
        .map_err(|_| ConvertError::InvalidSyntax {
            src_type: src.type_name(),
            text: s.to_string(),
            dest_kind,
        })
}

/// Converts `src` into a float of the destination's width.
pub(crate) fn to_float<T: FloatTarget>(
    src: &Value,
    dest_kind: &'static str,
    options: &ConvertOptions,
) -> ConvertResult<T> {
    match src {
        Value::Null => Err(ConvertError::NullUnsupported { dest_kind }),
        Value::Float64(v) => Ok(T::from_f64(*v)),
        Value::Int64(v) => Ok(T::from_i64(*v)),
        Value::Text(s) => parse_float(s, src, dest_kind, options),
        Value::Bytes(b) => match std::str::from_utf8(b) {
            Ok(s) => parse_float(s, src, dest_kind, options),
            Err(_) => Err(ConvertError::InvalidSyntax {
                src_type: src.type_name(),
                text: String::from_utf8_lossy(b).into_owned(),
                dest_kind,
            }),
        },
        Value::Bool(_) | Value::Time(_) => Err(ConvertError::InvalidSyntax {
            src_type: src.type_name(),
            text: src.to_string(),
            dest_kind,
        }),
    }
}

fn parse_bool(s: &str, options: &ConvertOptions) -> Option<bool> {
    match s {
        "1" | "true" | "TRUE" | "True" => Some(true),
        "0" | "false" | "FALSE" | "False" => Some(false),
        "t" | "T" if options.lenient_bool => Some(true),
        "f" | "F" if options.lenient_bool => Some(false),
        _ => None,
    }
}

fn not_bool(src: &Value) -> ConvertError {
    let value = match src {
        Value::Text(s) => format!("{s:?}"),
        Value::Bytes(b) => format!("{:?}", String::from_utf8_lossy(b)),
        Value::Int64(v) => v.to_string(),
        other => format!("{other} ({})", other.type_name()),
    };
    ConvertError::NotBool { value }
}

/// Converts `src` into a bool using the truthy/falsy tables.
pub(crate) fn to_bool(src: &Value, options: &ConvertOptions) -> ConvertResult<bool> {
    let parsed = match src {
        Value::Bool(b) => Some(*b),
        Value::Int64(1) => Some(true),
        Value::Int64(0) => Some(false),
        Value::Text(s) => parse_bool(s, options),
        Value::Bytes(b) => std::str::from_utf8(b)
            .ok()
            .and_then(|s| parse_bool(s, options)),
        _ => None,
    };
    parsed.ok_or_else(|| not_bool(src))
}

/// Stores the canonical text of `src` into `dest`, reusing its capacity.
pub(crate) fn assign_text(dest: &mut String, src: &Value) -> ConvertResult<()> {
    match src {
        Value::Null => return Err(ConvertError::NullUnsupported { dest_kind: "String" }),
        Value::Text(s) => {
            dest.clear();
            dest.push_str(s);
        }
        other => {
            dest.clear();
            // Writing into a String cannot fail.
            let _ = write!(dest, "{other}");
        }
    }
    Ok(())
}

fn write_bytes(buf: &mut Vec<u8>, src: &Value) {
    buf.clear();
    match src {
        Value::Null => {}
        Value::Bytes(b) => buf.extend_from_slice(b),
        Value::Text(s) => buf.extend_from_slice(s.as_bytes()),
        other => {
            let _ = write!(ByteSink(buf), "{other}");
        }
    }
}

/// Stores the raw bytes (or canonical text) of `src` into `dest`.
///
/// `Null` leaves an empty vector.
pub(crate) fn assign_bytes(dest: &mut Vec<u8>, src: &Value) {
    write_bytes(dest, src);
}

/// Stores `src` into a raw-bytes destination without reallocating when the
/// existing capacity suffices.
pub(crate) fn assign_raw(dest: &mut RawBytes, src: &Value) {
    if src.is_null() {
        dest.set_null();
        return;
    }
    write_bytes(dest.reset(), src);
}

/// Applies the coercion rule for one primitive destination.
pub(crate) fn assign(dest: Primitive<'_>, src: &Value, options: &ConvertOptions) -> ConvertResult<()> {
    match dest {
        Primitive::Bool(d) => *d = to_bool(src, options)?,
        Primitive::I8(d) => *d = to_int(src, "i8", options)?,
        Primitive::I16(d) => *d = to_int(src, "i16", options)?,
        Primitive::I32(d) => *d = to_int(src, "i32", options)?,
        Primitive::I64(d) => *d = to_int(src, "i64", options)?,
        Primitive::Isize(d) => *d = to_int(src, "isize", options)?,
        Primitive::U8(d) => *d = to_int(src, "u8", options)?,
        Primitive::U16(d) => *d = to_int(src, "u16", options)?,
        Primitive::U32(d) => *d = to_int(src, "u32", options)?,
        Primitive::U64(d) => *d = to_int(src, "u64", options)?,
        Primitive::Usize(d) => *d = to_int(src, "usize", options)?,
        Primitive::F32(d) => *d = to_float(src, "f32", options)?,
        Primitive::F64(d) => *d = to_float(src, "f64", options)?,
        Primitive::Text(d) => assign_text(d, src)?,
        Primitive::Bytes(d) => assign_bytes(d, src),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strict() -> ConvertOptions {
        ConvertOptions::default()
    }

    fn float_text(v: f64) -> String {
        let mut s = String::new();
        write_float(&mut s, v).unwrap();
        s
    }

    #[test]
    fn test_write_float_plain() {
        assert_eq!(float_text(1.5), "1.5");
        assert_eq!(float_text(64.0), "64");
        assert_eq!(float_text(0.0), "0");
        assert_eq!(float_text(-2.25), "-2.25");
        assert_eq!(float_text(0.0001), "0.0001");
        assert_eq!(float_text(123_456_789.0), "123456789");
    }

    #[test]
    fn test_write_float_exponent() {
        assert_eq!(float_text(1e21), "1e+21");
        assert_eq!(float_text(1.5e-7), "1.5e-07");
        assert_eq!(float_text(-2.5e100), "-2.5e+100");
    }

    #[test]
    fn test_write_float_special() {
        assert_eq!(float_text(f64::NAN), "NaN");
        assert_eq!(float_text(f64::INFINITY), "+Inf");
        assert_eq!(float_text(f64::NEG_INFINITY), "-Inf");
    }

    #[test]
    fn test_to_int_range() {
        assert_eq!(to_int::<u8>(&Value::Int64(255), "u8", &strict()), Ok(255));
        let err = to_int::<u8>(&Value::Int64(256), "u8", &strict()).unwrap_err();
        assert!(err.is_range());
        let err = to_int::<u8>(&Value::Int64(-1), "u8", &strict()).unwrap_err();
        assert!(err.is_range());
    }

    #[test]
    fn test_to_int_text() {
        assert_eq!(to_int::<i8>(&Value::from("-128"), "i8", &strict()), Ok(-128));
        let err = to_int::<i8>(&Value::from("-129"), "i8", &strict()).unwrap_err();
        assert!(err.is_range());
        let err = to_int::<i8>(&Value::from(""), "i8", &strict()).unwrap_err();
        assert!(err.is_syntax());
        let err = to_int::<u16>(&Value::from("-1"), "u16", &strict()).unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_to_int_bytes() {
        let v = Value::Bytes(b"42".to_vec());
        assert_eq!(to_int::<i32>(&v, "i32", &strict()), Ok(42));
        let v = Value::Bytes(vec![0xff, 0x31]);
        assert!(to_int::<i32>(&v, "i32", &strict()).unwrap_err().is_syntax());
    }

    #[test]
    fn test_to_int_from_other_kinds() {
        assert_eq!(to_int::<i64>(&Value::Float64(2.0), "i64", &strict()), Ok(2));
        let err = to_int::<i64>(&Value::Float64(1.5), "i64", &strict()).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"converting driver.Value type f64 ("1.5") to a i64: invalid syntax"#
        );
        assert!(to_int::<i64>(&Value::Bool(true), "i64", &strict())
            .unwrap_err()
            .is_syntax());
        assert_eq!(
            to_int::<i64>(&Value::Null, "i64", &strict()),
            Err(ConvertError::NullUnsupported { dest_kind: "i64" })
        );
    }

    #[test]
    fn test_trim_numeric_text() {
        let padded = Value::from("  17 ");
        assert!(to_int::<i32>(&padded, "i32", &strict()).is_err());
        let opts = ConvertOptions {
            trim_numeric_text: true,
            ..ConvertOptions::default()
        };
        assert_eq!(to_int::<i32>(&padded, "i32", &opts), Ok(17));
        assert_eq!(to_float::<f64>(&Value::from(" 2.5\t"), "f64", &opts), Ok(2.5));
    }

    #[test]
    fn test_to_float() {
        assert_eq!(to_float::<f32>(&Value::Float64(1.5), "f32", &strict()), Ok(1.5));
        assert_eq!(to_float::<f64>(&Value::Int64(1), "f64", &strict()), Ok(1.0));
        assert_eq!(to_float::<f32>(&Value::from("1.5"), "f32", &strict()), Ok(1.5));
        let err = to_float::<f64>(&Value::from("abc"), "f64", &strict()).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"converting driver.Value type String ("abc") to a f64: invalid syntax"#
        );
        assert!(to_float::<f64>(&Value::Bool(true), "f64", &strict())
            .unwrap_err()
            .is_syntax());
    }

    #[test]
    fn test_to_bool_tables() {
        for s in ["1", "true", "TRUE", "True"] {
            assert_eq!(to_bool(&Value::from(s), &strict()), Ok(true), "{s}");
        }
        for s in ["0", "false", "FALSE", "False"] {
            assert_eq!(to_bool(&Value::from(s), &strict()), Ok(false), "{s}");
        }
        assert_eq!(to_bool(&Value::Int64(1), &strict()), Ok(true));
        assert_eq!(to_bool(&Value::Int64(0), &strict()), Ok(false));
        assert_eq!(to_bool(&Value::Bytes(b"true".to_vec()), &strict()), Ok(true));
    }

    #[test]
    fn test_to_bool_failures() {
        let err = to_bool(&Value::from("yup"), &strict()).unwrap_err();
        assert_eq!(err.to_string(), r#"sql/driver: couldn't convert "yup" into type bool"#);
        let err = to_bool(&Value::Int64(2), &strict()).unwrap_err();
        assert_eq!(err.to_string(), "sql/driver: couldn't convert 2 into type bool");
        let err = to_bool(&Value::Float64(1.5), &strict()).unwrap_err();
        assert_eq!(err.to_string(), "sql/driver: couldn't convert 1.5 (f64) into type bool");
        assert!(to_bool(&Value::from("t"), &strict()).is_err());
    }

    #[test]
    fn test_to_bool_lenient() {
        let opts = ConvertOptions {
            lenient_bool: true,
            ..ConvertOptions::default()
        };
        assert_eq!(to_bool(&Value::from("t"), &opts), Ok(true));
        assert_eq!(to_bool(&Value::from("F"), &opts), Ok(false));
        assert!(to_bool(&Value::from("yes"), &opts).is_err());
    }

    #[test]
    fn test_assign_text_reuses_buffer() {
        let mut dest = String::with_capacity(32);
        let ptr = dest.as_ptr();
        assign_text(&mut dest, &Value::Int64(123)).unwrap();
        assert_eq!(dest, "123");
        assign_text(&mut dest, &Value::from("abc")).unwrap();
        assert_eq!(dest, "abc");
        assert_eq!(dest.as_ptr(), ptr);
    }

    #[test]
    fn test_assign_text_null_keeps_old() {
        let mut dest = String::from("old");
        assert!(assign_text(&mut dest, &Value::Null).is_err());
        assert_eq!(dest, "old");
    }

    #[test]
    fn test_assign_bytes() {
        let mut dest = b"stale".to_vec();
        assign_bytes(&mut dest, &Value::Float64(1.5));
        assert_eq!(dest, b"1.5");
        assign_bytes(&mut dest, &Value::Null);
        assert!(dest.is_empty());
    }

    #[test]
    fn test_assign_raw() {
        let mut dest = RawBytes::with_capacity(16);
        assign_raw(&mut dest, &Value::Bool(false));
        assert_eq!(dest.as_bytes(), Some(&b"false"[..]));
        assign_raw(&mut dest, &Value::Null);
        assert!(dest.is_null());
        assert!(dest.capacity() >= 16);
    }
}
