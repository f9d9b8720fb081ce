//! # kyroscan - Driver value conversion and scan assignment
//!
//! kyroscan stores the values a SQL driver produces into typed Rust
//! destinations, and narrows Rust values into driver values for query
//! parameters. Conversions are checked: narrowing never truncates silently,
//! NULL is only accepted by destinations that can represent it, and every
//! failure is a typed [`ConvertError`].
//!
//! ## Core Concepts
//!
//! - **Value**: The closed set of kinds a driver may hand over
//! - **Destination**: A borrowed, tagged view of caller-owned storage
//! - **Converter**: The dispatcher choosing a coercion path per destination
//! - **Scanner / Valuer**: Extension points for caller-defined types
//! - **Row**: A result row scanned column by column
//!
//! ## Usage
//!
//! ```rust
//! use kyroscan::{convert_assign, NullInt64, RawBytes, Row, Value};
//!
//! let mut port = 0u16;
//! convert_assign(&mut port, &Value::from("5432"))?;
//! assert_eq!(port, 5432);
//!
//! let row = Row::new()
//!     .with("id", 42i64)
//!     .with("payload", Value::Bytes(b"{}".to_vec()))
//!     .with("parent", Value::Null);
//! let mut id = 0i32;
//! let mut payload = RawBytes::with_capacity(64);
//! let mut parent = NullInt64::default();
//! row.scan(&mut [&mut id, &mut payload, &mut parent])?;
//! assert_eq!(id, 42);
//! assert_eq!(payload.as_bytes(), Some(&b"{}"[..]));
//! assert!(!parent.valid);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod coerce;

pub mod config;
pub mod convert;
pub mod destination;
pub mod driver;
pub mod error;
pub mod nullable;
pub mod row;
pub mod time;
pub mod value;

// Re-export primary types at crate root for convenience
pub use config::ConvertOptions;
pub use convert::{convert_assign, Converter};
pub use destination::{AsDestination, Destination, Primitive, RawBytes};
pub use driver::{
    BoolConverter, DefaultParameterConverter, Int32Converter, StringConverter, ValueConverter,
    Valuer,
};
pub use error::{ConvertError, ConvertResult, ErrorKind, ScanError, ScanResult};
pub use nullable::{
    Null, NullBool, NullByte, NullFloat64, NullInt16, NullInt32, NullInt64, NullString, NullTime,
    NullableSlot, Scanner,
};
pub use row::Row;
pub use value::{Value, ValueKind};
