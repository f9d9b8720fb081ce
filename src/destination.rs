//! Scan destinations.
//!
//! A [`Destination`] is a short-lived, borrowed view of caller-owned storage,
//! tagged with the family of coercions it accepts. Types become scannable by
//! implementing [`AsDestination`]; the crate does so for the primitives,
//! `String`, `Vec<u8>`, [`RawBytes`], [`Value`], timestamps, `Option<T>`,
//! `Box<T>` and [`Null<T>`](crate::Null).

use chrono::{DateTime, FixedOffset};

use crate::nullable::{NullableSlot, Scanner};
use crate::value::Value;

/// Mutable reference to a primitive destination.
///
/// Each variant borrows storage of the type it is named after.
#[allow(missing_docs)]
#[derive(Debug)]
pub enum Primitive<'a> {
    Bool(&'a mut bool),
    I8(&'a mut i8),
    I16(&'a mut i16),
    I32(&'a mut i32),
    I64(&'a mut i64),
    Isize(&'a mut isize),
    U8(&'a mut u8),
    U16(&'a mut u16),
    U32(&'a mut u32),
    U64(&'a mut u64),
    Usize(&'a mut usize),
    F32(&'a mut f32),
    F64(&'a mut f64),
    Text(&'a mut String),
    Bytes(&'a mut Vec<u8>),
}

impl Primitive<'_> {
    /// Kind name used in conversion error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::Isize(_) => "isize",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::Usize(_) => "usize",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Text(_) => "String",
            Self::Bytes(_) => "Vec<u8>",
        }
    }
}

/// A borrowed destination for one scan assignment.
///
/// The variant decides which coercions apply; see
/// [`Converter::assign`](crate::Converter::assign) for the dispatch order.
pub enum Destination<'a> {
    /// No storage was supplied.
    Nil,
    /// A generic acceptor doing its own null bookkeeping.
    Scanner(&'a mut dyn Scanner),
    /// Reusable byte buffer.
    RawBytes(&'a mut RawBytes),
    /// Untyped box holding a copy of any driver value.
    Any(&'a mut Value),
    /// Timestamp; only accepts timestamp values.
    Time(&'a mut DateTime<FixedOffset>),
    /// Optional value: absent on NULL, present otherwise.
    Nullable(&'a mut dyn NullableSlot),
    /// One of the primitive families.
    Primitive(Primitive<'a>),
    /// A caller-defined type stored through its underlying representation.
    ///
    /// `repr` is `None` when the type has no supported primitive
    /// representation; every assignment into it is unsupported.
    Named {
        /// Name reported in error messages.
        type_name: &'static str,
        /// Underlying storage.
        repr: Option<Primitive<'a>>,
    },
}

impl<'a> Destination<'a> {
    /// A named type backed by a primitive.
    ///
    /// The full coercion table of the primitive applies, so a type backed by
    /// a `String` also accepts numbers and renders them as text.
    ///
    /// # Examples
    ///
    /// ```
    /// use kyroscan::{convert_assign, AsDestination, Destination, Value};
    ///
    /// struct Celsius(f64);
    ///
    /// impl AsDestination for Celsius {
    ///     fn destination(&mut self) -> Destination<'_> {
    ///         Destination::named("Celsius", &mut self.0)
    ///     }
    /// }
    ///
    /// let mut t = Celsius(0.0);
    /// convert_assign(&mut t, &Value::Int64(21)).unwrap();
    /// assert_eq!(t.0, 21.0);
    /// ```
    pub fn named(type_name: &'static str, repr: impl Into<Primitive<'a>>) -> Self {
        Self::Named {
            type_name,
            repr: Some(repr.into()),
        }
    }

    /// A named type with no scannable representation.
    #[must_use]
    pub const fn opaque(type_name: &'static str) -> Self {
        Self::Named {
            type_name,
            repr: None,
        }
    }

    /// Type name used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Scanner(_) => "Scanner",
            Self::RawBytes(_) => "RawBytes",
            Self::Any(_) => "Value",
            Self::Time(_) => "DateTime<FixedOffset>",
            Self::Nullable(_) => "Option",
            Self::Primitive(p) => p.kind_name(),
            Self::Named { type_name, .. } => *type_name,
        }
    }

    /// True when no storage was supplied.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

impl std::fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Destination({})", self.type_name())
    }
}

impl<'a> From<Option<&'a mut dyn AsDestination>> for Destination<'a> {
    fn from(dest: Option<&'a mut dyn AsDestination>) -> Self {
        match dest {
            Some(d) => d.destination(),
            None => Self::Nil,
        }
    }
}

/// Capability of being the target of a scan assignment.
pub trait AsDestination {
    /// Borrows `self` as a destination for one assignment.
    fn destination(&mut self) -> Destination<'_>;
}

macro_rules! primitive_destinations {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl AsDestination for $ty {
                fn destination(&mut self) -> Destination<'_> {
                    Destination::Primitive(Primitive::$variant(self))
                }
            }

            impl<'a> From<&'a mut $ty> for Primitive<'a> {
                fn from(d: &'a mut $ty) -> Self {
                    Self::$variant(d)
                }
            }
        )*
    };
}

primitive_destinations!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    String => Text,
    Vec<u8> => Bytes,
);

impl AsDestination for Value {
    fn destination(&mut self) -> Destination<'_> {
        Destination::Any(self)
    }
}

impl AsDestination for DateTime<FixedOffset> {
    fn destination(&mut self) -> Destination<'_> {
        Destination::Time(self)
    }
}

impl AsDestination for RawBytes {
    fn destination(&mut self) -> Destination<'_> {
        Destination::RawBytes(self)
    }
}

impl<T: AsDestination + ?Sized> AsDestination for Box<T> {
    fn destination(&mut self) -> Destination<'_> {
        (**self).destination()
    }
}

/// Reusable byte buffer destination.
///
/// Unlike `Vec<u8>`, a `RawBytes` distinguishes NULL from empty and keeps its
/// allocation across assignments, so scanning row after row into the same
/// buffer does not allocate once it is large enough.
///
/// # Examples
///
/// ```
/// use kyroscan::{convert_assign, RawBytes, Value};
///
/// let mut raw = RawBytes::with_capacity(16);
/// convert_assign(&mut raw, &Value::Int64(12345)).unwrap();
/// assert_eq!(raw.as_bytes(), Some(&b"12345"[..]));
///
/// convert_assign(&mut raw, &Value::Null).unwrap();
/// assert!(raw.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawBytes {
    buf: Vec<u8>,
    null: bool,
}

impl RawBytes {
    /// Creates a NULL buffer without allocating.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            null: true,
        }
    }

    /// Creates a NULL buffer with room for `capacity` bytes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            null: true,
        }
    }

    /// Returns the contents, or `None` for NULL.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        if self.null {
            None
        } else {
            Some(&self.buf)
        }
    }

    /// True when the buffer holds NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.null
    }

    /// Length of the contents in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True when the contents are empty or NULL.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Allocated capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Takes the contents, or `None` for NULL.
    #[must_use]
    pub fn into_vec(self) -> Option<Vec<u8>> {
        if self.null {
            None
        } else {
            Some(self.buf)
        }
    }

    pub(crate) fn set_null(&mut self) {
        self.buf.clear();
        self.null = true;
    }

    /// Marks the buffer non-NULL and hands out its cleared storage.
    pub(crate) fn reset(&mut self) -> &mut Vec<u8> {
        self.buf.clear();
        self.null = false;
        &mut self.buf
    }
}

impl Default for RawBytes {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for RawBytes {
    fn from(buf: Vec<u8>) -> Self {
        Self { buf, null: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Opaque;

    impl AsDestination for Opaque {
        fn destination(&mut self) -> Destination<'_> {
            Destination::opaque("Opaque")
        }
    }

    #[test]
    fn test_primitive_destinations() {
        let mut a = 0i8;
        assert_eq!(a.destination().type_name(), "i8");
        let mut s = String::new();
        assert_eq!(s.destination().type_name(), "String");
        let mut b = Vec::<u8>::new();
        assert_eq!(b.destination().type_name(), "Vec<u8>");
        let mut v = Value::Null;
        assert!(matches!(v.destination(), Destination::Any(_)));
    }

    #[test]
    fn test_boxed_destination_delegates() {
        let mut b: Box<u32> = Box::new(0);
        assert_eq!(b.destination().type_name(), "u32");
    }

    #[test]
    fn test_named_and_opaque() {
        let mut x = 0.0f64;
        let d = Destination::named("Meters", &mut x);
        assert_eq!(d.type_name(), "Meters");
        assert!(matches!(
            d,
            Destination::Named {
                repr: Some(Primitive::F64(_)),
                ..
            }
        ));
        assert_eq!(Opaque.destination().type_name(), "Opaque");
    }

    #[test]
    fn test_nil_from_none() {
        let d = Destination::from(None::<&mut dyn AsDestination>);
        assert!(d.is_nil());
        assert_eq!(format!("{d:?}"), "Destination(nil)");

        let mut n = 0i64;
        let d = Destination::from(Some(&mut n as &mut dyn AsDestination));
        assert!(!d.is_nil());
    }

    #[test]
    fn test_raw_bytes_states() {
        let raw = RawBytes::new();
        assert!(raw.is_null());
        assert_eq!(raw.as_bytes(), None);
        assert_eq!(RawBytes::default(), raw);

        let raw = RawBytes::from(b"abc".to_vec());
        assert!(!raw.is_null());
        assert_eq!(raw.len(), 3);
        assert_eq!(raw.into_vec(), Some(b"abc".to_vec()));
    }

    #[test]
    fn test_raw_bytes_reset_keeps_capacity() {
        let mut raw = RawBytes::with_capacity(8);
        let cap = raw.capacity();
        raw.reset().extend_from_slice(b"1234");
        assert_eq!(raw.as_bytes(), Some(&b"1234"[..]));
        raw.set_null();
        assert!(raw.is_null());
        assert!(raw.is_empty());
        assert_eq!(raw.capacity(), cap);
    }
}
