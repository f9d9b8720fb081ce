//! Scanning a whole result row.
//!
//! A [`Row`] is the values of one result row with their column names, as a
//! driver adapter hands them over. Scanning assigns column `i` into
//! destination `i` and stops at the first failure.

use tracing::trace;

use crate::convert::Converter;
use crate::destination::AsDestination;
use crate::error::{ScanError, ScanResult};
use crate::value::Value;

/// One result row.
///
/// # Examples
///
/// ```
/// use kyroscan::Row;
///
/// let row = Row::new().with("id", 7i64).with("name", "ada");
/// let mut id = 0u32;
/// let mut name = String::new();
/// row.scan(&mut [&mut id, &mut name]).unwrap();
/// assert_eq!((id, name.as_str()), (7, "ada"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Appends a column.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.columns.push(name.into());
        self.values.push(value.into());
    }

    /// Appends a column, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Column values in order.
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Looks a value up by column name; the first match wins.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| self.values.get(i))
    }

    /// Scans every column into the matching destination with default options.
    ///
    /// # Errors
    ///
    /// See [`Row::scan_with`].
    pub fn scan(&self, dests: &mut [&mut dyn AsDestination]) -> ScanResult<()> {
        self.scan_with(&Converter::default(), dests)
    }

    /// Scans every column into the matching destination.
    ///
    /// Columns before a failing one have already been assigned.
    ///
    /// # Errors
    ///
    /// - [`ScanError::ColumnCount`] if `dests` and the row differ in length.
    /// - [`ScanError::Column`] wrapping the first conversion failure.
    pub fn scan_with(
        &self,
        converter: &Converter,
        dests: &mut [&mut dyn AsDestination],
    ) -> ScanResult<()> {
        if dests.len() != self.values.len() {
            return Err(ScanError::ColumnCount {
                expected: self.values.len(),
                got: dests.len(),
            });
        }

        for (index, (dest, value)) in dests.iter_mut().zip(&self.values).enumerate() {
            if let Err(source) = converter.scan(&mut **dest, value) {
                let name = self.columns[index].clone();
                trace!(index, column = %name, error = %source, "column scan failed");
                return Err(ScanError::Column {
                    index,
                    name,
                    source,
                });
            }
        }
        Ok(())
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (name, value) in iter {
            row.push(name, value);
        }
        row
    }
}
