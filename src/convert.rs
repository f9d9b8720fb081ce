//! The destination dispatcher.
//!
//! [`Converter::assign`] inspects a destination, picks the coercion path and
//! applies it. It holds no state besides its options, so one converter can
//! serve any number of threads.

use tracing::trace;

use crate::coerce;
use crate::config::ConvertOptions;
use crate::destination::{AsDestination, Destination};
use crate::driver::Valuer;
use crate::error::{ConvertError, ConvertResult};
use crate::value::Value;

/// Stores driver values into destinations.
///
/// # Examples
///
/// ```
/// use kyroscan::{ConvertOptions, Converter, Value};
///
/// let lenient = Converter::new(ConvertOptions { lenient_bool: true, ..Default::default() });
/// let mut flag = false;
/// lenient.scan(&mut flag, &Value::from("t")).unwrap();
/// assert!(flag);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Creates a converter applying `options`.
    #[must_use]
    pub const fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Active options.
    #[must_use]
    pub const fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Stores `src` into `dest`.
    ///
    /// Dispatch order:
    /// 1. `Nil` fails with [`ConvertError::InvalidTarget`].
    /// 2. A [`Scanner`](crate::Scanner) receives the value as is.
    /// 3. `String`, `Vec<u8>` and [`RawBytes`](crate::RawBytes) take text
    ///    and bytes by copy, reusing their storage.
    /// 4. A [`Value`] box takes a copy of the source.
    /// 5. `Option<T>` becomes `None` on NULL, otherwise a converted `Some`.
    /// 6. Primitives follow the coercion tables.
    /// 7. Named types convert through their underlying primitive; without
    ///    one the assignment is unsupported.
    ///
    /// On failure `dest` keeps its previous contents.
    ///
    /// # Errors
    ///
    /// Returns the [`ConvertError`] describing why `src` does not fit `dest`.
    pub fn assign(&self, dest: Destination<'_>, src: &Value) -> ConvertResult<()> {
        match dest {
            Destination::Nil => Err(ConvertError::InvalidTarget),
            Destination::Scanner(scanner) => scanner.scan(src, self),
            Destination::RawBytes(raw) => {
                coerce::assign_raw(raw, src);
                Ok(())
            }
            Destination::Any(any) => {
                any.clone_from(src);
                Ok(())
            }
            Destination::Nullable(slot) => {
                if src.is_null() {
                    slot.set_absent();
                    Ok(())
                } else {
                    slot.assign_present(src, self)
                }
            }
            Destination::Time(time) => match src {
                Value::Time(t) => {
                    *time = *t;
                    Ok(())
                }
                _ => Err(unsupported(src, "DateTime<FixedOffset>")),
            },
            Destination::Primitive(primitive) => coerce::assign(primitive, src, &self.options),
            Destination::Named {
                repr: Some(primitive),
                ..
            } => coerce::assign(primitive, src, &self.options),
            Destination::Named {
                type_name,
                repr: None,
            } => Err(unsupported(src, type_name)),
        }
    }

    /// Stores `src` into any [`AsDestination`] implementor.
    ///
    /// # Errors
    ///
    /// See [`Converter::assign`].
    pub fn scan<D: AsDestination + ?Sized>(&self, dest: &mut D, src: &Value) -> ConvertResult<()> {
        self.assign(dest.destination(), src)
    }

    /// Narrows `src` to a driver value first, then stores it.
    ///
    /// # Errors
    ///
    /// Fails if `src` cannot be narrowed or the narrowed value does not fit.
    pub fn scan_from<D, V>(&self, dest: &mut D, src: &V) -> ConvertResult<()>
    where
        D: AsDestination + ?Sized,
        V: Valuer + ?Sized,
    {
        let value = src.value()?;
        self.scan(dest, &value)
    }
}

fn unsupported(src: &Value, dest_type: &'static str) -> ConvertError {
    trace!(src = src.type_name(), dest = dest_type, "no scan path");
    ConvertError::Unsupported {
        src_type: src.type_name(),
        dest_type,
    }
}

/// Stores `src` into `dest` with default options.
///
/// # Errors
///
/// See [`Converter::assign`].
///
/// # Examples
///
/// ```
/// use kyroscan::{convert_assign, Value};
///
/// let mut small = 0i8;
/// let err = convert_assign(&mut small, &Value::from("128")).unwrap_err();
/// assert!(err.to_string().ends_with("value out of range"));
/// ```
pub fn convert_assign<D: AsDestination + ?Sized>(dest: &mut D, src: &Value) -> ConvertResult<()> {
    Converter::default().scan(dest, src)
}
