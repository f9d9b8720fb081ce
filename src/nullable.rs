//! Destinations that track NULL themselves.
//!
//! Two shapes are supported:
//! - `Option<T>`: the absent value is `None`. A fresh `T` is filled and
//!   stored only once the inner assignment succeeds.
//! - [`Scanner`] implementors, the generic acceptors. [`Null<T>`] is the
//!   stock one: a value plus a validity flag.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::convert::Converter;
use crate::destination::{AsDestination, Destination};
use crate::driver::Valuer;
use crate::error::ConvertResult;
use crate::value::Value;

/// A destination that accepts driver values directly.
///
/// The dispatcher hands the value over untouched, NULL included, and the
/// implementor's result is final.
///
/// # Examples
///
/// ```
/// use kyroscan::{convert_assign, AsDestination, ConvertError, ConvertResult, Converter,
///     Destination, Scanner, Value};
///
/// #[derive(Default)]
/// struct Tags(Vec<String>);
///
/// impl Scanner for Tags {
///     fn scan(&mut self, src: &Value, _converter: &Converter) -> ConvertResult<()> {
///         match src {
///             Value::Null => self.0.clear(),
///             Value::Text(s) => self.0 = s.split(',').map(str::to_string).collect(),
///             other => return Err(ConvertError::custom(format!("tags from {}", other.type_name()))),
///         }
///         Ok(())
///     }
/// }
///
/// impl AsDestination for Tags {
///     fn destination(&mut self) -> Destination<'_> {
///         Destination::Scanner(self)
///     }
/// }
///
/// let mut tags = Tags::default();
/// convert_assign(&mut tags, &Value::from("a,b")).unwrap();
/// assert_eq!(tags.0, ["a", "b"]);
/// ```
pub trait Scanner {
    /// Stores `src` into `self`. `converter` carries the active options for
    /// implementors that recurse into the dispatcher.
    ///
    /// # Errors
    ///
    /// Returns a [`ConvertError`](crate::ConvertError) when `src` cannot be
    /// represented.
    fn scan(&mut self, src: &Value, converter: &Converter) -> ConvertResult<()>;
}

/// An optional destination: absent on NULL, present otherwise.
pub trait NullableSlot {
    /// Makes the slot absent.
    fn set_absent(&mut self);

    /// Fills the slot from a non-NULL value. On failure the slot is left as
    /// it was.
    ///
    /// # Errors
    ///
    /// Propagates the inner conversion failure.
    fn assign_present(&mut self, src: &Value, converter: &Converter) -> ConvertResult<()>;
}

impl<T: AsDestination + Default> NullableSlot for Option<T> {
    fn set_absent(&mut self) {
        *self = None;
    }

    fn assign_present(&mut self, src: &Value, converter: &Converter) -> ConvertResult<()> {
        let mut value = T::default();
        converter.scan(&mut value, src)?;
        *self = Some(value);
        Ok(())
    }
}

impl<T: AsDestination + Default> AsDestination for Option<T> {
    fn destination(&mut self) -> Destination<'_> {
        Destination::Nullable(self)
    }
}

/// A value together with a validity flag.
///
/// Scanning NULL clears `valid` and resets `value` to its default; scanning
/// anything else converts into `value` and sets `valid`.
///
/// # Examples
///
/// ```
/// use kyroscan::{convert_assign, NullString, Value};
///
/// let mut ns = NullString::default();
/// convert_assign(&mut ns, &Value::Bytes(b"foo".to_vec())).unwrap();
/// assert!(ns.valid);
/// assert_eq!(ns.value, "foo");
///
/// convert_assign(&mut ns, &Value::Null).unwrap();
/// assert!(!ns.valid);
/// assert_eq!(ns.value, "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Null<T> {
    /// The value; `T::default()` while NULL.
    pub value: T,
    /// False when the value is NULL.
    pub valid: bool,
}

/// Nullable `String`.
pub type NullString = Null<String>;
/// Nullable `i64`.
pub type NullInt64 = Null<i64>;
/// Nullable `i32`.
pub type NullInt32 = Null<i32>;
/// Nullable `i16`.
pub type NullInt16 = Null<i16>;
/// Nullable `u8`.
pub type NullByte = Null<u8>;
/// Nullable `f64`.
pub type NullFloat64 = Null<f64>;
/// Nullable `bool`.
pub type NullBool = Null<bool>;
/// Nullable timestamp.
pub type NullTime = Null<DateTime<FixedOffset>>;

impl<T> Null<T> {
    /// A valid (non-NULL) value.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self { value, valid: true }
    }

    /// Borrows the value, or `None` when NULL.
    #[must_use]
    pub const fn as_option(&self) -> Option<&T> {
        if self.valid {
            Some(&self.value)
        } else {
            None
        }
    }

    /// Converts into an `Option`, dropping the value when NULL.
    pub fn into_option(self) -> Option<T> {
        if self.valid {
            Some(self.value)
        } else {
            None
        }
    }
}

impl<T: Default> From<Option<T>> for Null<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(value) => Self::new(value),
            None => Self::default(),
        }
    }
}

impl<T: AsDestination + Default> Scanner for Null<T> {
    fn scan(&mut self, src: &Value, converter: &Converter) -> ConvertResult<()> {
        if src.is_null() {
            self.value = T::default();
            self.valid = false;
            return Ok(());
        }
        converter.scan(&mut self.value, src)?;
        self.valid = true;
        Ok(())
    }
}

impl<T: AsDestination + Default> AsDestination for Null<T> {
    fn destination(&mut self) -> Destination<'_> {
        Destination::Scanner(self)
    }
}

impl<T: Valuer> Valuer for Null<T> {
    fn value(&self) -> ConvertResult<Value> {
        if self.valid {
            self.value.value()
        } else {
            Ok(Value::Null)
        }
    }
}
