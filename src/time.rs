//! RFC 3339 rendering of driver timestamps.
//!
//! Timestamps are rendered in their own recorded offset. The fractional
//! second is printed only when non-zero, with trailing zeros trimmed, so a
//! whole-second value renders exactly like plain RFC 3339. Rendering writes
//! straight into the target and never allocates.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, Timelike};

const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Display adapter rendering a timestamp as RFC 3339.
///
/// # Examples
///
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use kyroscan::time::Rfc3339;
///
/// let tz = FixedOffset::west_opt(8 * 3600).unwrap();
/// let t = tz.timestamp_opt(1_453_874_597, 0).unwrap();
/// assert_eq!(Rfc3339(&t).to_string(), "2016-01-26T22:03:17-08:00");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Rfc3339<'a>(pub &'a DateTime<FixedOffset>);

impl fmt::Display for Rfc3339<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_rfc3339(f, self.0)
    }
}

/// Writes `t` as RFC 3339 with trimmed nanoseconds.
///
/// # Errors
///
/// Propagates errors from the underlying writer.
pub fn write_rfc3339<W: fmt::Write + ?Sized>(w: &mut W, t: &DateTime<FixedOffset>) -> fmt::Result {
    let mut second = t.second();
    let mut nanos = t.nanosecond();
    // chrono encodes a leap second as nanos past one second.
    if nanos >= NANOS_PER_SEC {
        second += 1;
        nanos -= NANOS_PER_SEC;
    }

    write!(
        w,
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        t.year(),
        t.month(),
        t.day(),
        t.hour(),
        t.minute(),
        second
    )?;

    if nanos != 0 {
        let mut width: usize = 9;
        while nanos % 10 == 0 {
            nanos /= 10;
            width -= 1;
        }
        write!(w, ".{nanos:0width$}")?;
    }

    let offset = t.offset().local_minus_utc();
    if offset == 0 {
        return w.write_char('Z');
    }
    let sign = if offset < 0 { '-' } else { '+' };
    let minutes = offset.unsigned_abs() / 60;
    write!(w, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
}
