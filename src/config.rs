//! Conversion options.
//!
//! Options are plain data: they are deserialized from whatever configuration
//! source the embedding application uses and handed to a
//! [`Converter`](crate::Converter). Missing fields take their defaults.

use serde::{Deserialize, Serialize};

/// Knobs for the coercion rules.
///
/// # Examples
///
/// ```
/// use kyroscan::ConvertOptions;
///
/// let opts: ConvertOptions = serde_json::from_str(r#"{"lenient_bool": true}"#).unwrap();
/// assert!(opts.lenient_bool);
/// assert!(!opts.trim_numeric_text);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
    /// Also accept `"t"`, `"T"`, `"f"` and `"F"` when coercing text to bool.
    pub lenient_bool: bool,

    /// Trim ASCII whitespace around text before numeric parsing.
    ///
    /// Fixed-width `CHAR(n)` columns come back space padded.
    pub trim_numeric_text: bool,
}

impl ConvertOptions {
    /// Strict options: exactly the documented coercion tables.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            lenient_bool: false,
            trim_numeric_text: false,
        }
    }

    /// Parses options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the document is malformed or a field
    /// has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_strict() {
        assert_eq!(ConvertOptions::default(), ConvertOptions::strict());
    }

    #[test]
    fn test_from_json_partial() {
        let opts = ConvertOptions::from_json(r#"{"trim_numeric_text": true}"#).unwrap();
        assert!(opts.trim_numeric_text);
        assert!(!opts.lenient_bool);
    }

    #[test]
    fn test_from_json_empty() {
        let opts = ConvertOptions::from_json("{}").unwrap();
        assert_eq!(opts, ConvertOptions::default());
    }

    #[test]
    fn test_from_json_wrong_type() {
        assert!(ConvertOptions::from_json(r#"{"lenient_bool": "yes"}"#).is_err());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let opts = ConvertOptions {
            lenient_bool: true,
            trim_numeric_text: true,
        };
        let json = serde_json::to_string(&opts).unwrap();
        assert_eq!(ConvertOptions::from_json(&json).unwrap(), opts);
    }
}
