use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Format ClickHouse accepts for `DateTime` values in text and JSON input.
pub(crate) const CLICKHOUSE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Values that can be bound to a compiled statement or read back from a result row.
///
/// The same enum is used for parameters, literal insert rows and result cells:
/// ```rust
/// use clickhouse_middleware::prelude::*;
///
/// let params = vec![
///     RowValues::Int(1),
///     RowValues::Text("2025-04-15".into()),
///     RowValues::Float(99.5),
/// ];
/// # let _ = params;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Short, stable name of the value's kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            RowValues::Int(_) => "int",
            RowValues::Float(_) => "float",
            RowValues::Text(_) => "text",
            RowValues::Bool(_) => "bool",
            RowValues::Timestamp(_) => "timestamp",
            RowValues::Null => "null",
            RowValues::JSON(_) => "json",
            RowValues::Blob(_) => "blob",
        }
    }

    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Extract the integer value, if any
    ///
    /// # Returns
    ///
    /// `Some(&i64)` for `Int`, `None` for every other kind
    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Extract the text value, if any
    ///
    /// # Returns
    ///
    /// The string slice for `Text`, `None` otherwise
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }

    /// Extract a boolean value
    ///
    /// # Returns
    ///
    /// The value of a `Bool`, or `Int` 0/1 read as false/true; `None` otherwise
    #[must_use]
    pub fn as_bool(&self) -> Option<&bool> {
        if let RowValues::Bool(value) = self {
            return Some(value);
        } else if let Some(i) = self.as_int() {
            // ClickHouse Bool columns come back as 0/1 in some formats
            if *i == 1 {
                return Some(&true);
            } else if *i == 0 {
                return Some(&false);
            }
        }
        None
    }

    /// Extract a timestamp value
    ///
    /// Text in ClickHouse `DateTime` or `DateTime64` form is parsed as well.
    ///
    /// # Returns
    ///
    /// The timestamp, or `None` if the value is neither a timestamp nor parsable text
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        if let RowValues::Timestamp(value) = self {
            return Some(*value);
        } else if let Some(s) = self.as_text() {
            // DateTime columns are serialized as "YYYY-MM-DD HH:MM:SS" in JSONEachRow
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, CLICKHOUSE_DATETIME_FORMAT) {
                return Some(dt);
            }
            // DateTime64 adds fractional seconds
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                return Some(dt);
            }
        }
        None
    }

    /// Extract the float value; integers are not widened
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        if let RowValues::Float(value) = self {
            Some(*value)
        } else {
            None
        }
    }

    /// Extract the binary value, if any
    #[must_use]
    pub fn as_blob(&self) -> Option<&[u8]> {
        if let RowValues::Blob(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// Convert a JSON cell, as produced by `JSONEachRow`, into a row value.
    #[must_use]
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => RowValues::Null,
            JsonValue::Bool(b) => RowValues::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    RowValues::Int(i)
                } else if let Some(f) = n.as_f64() {
                    RowValues::Float(f)
                } else {
                    RowValues::JSON(JsonValue::Number(n))
                }
            }
            JsonValue::String(s) => RowValues::Text(s),
            other => RowValues::JSON(other),
        }
    }

    /// Convert into a JSON cell for the bulk insert body.
    ///
    /// Timestamps are written as `YYYY-MM-DD HH:MM:SS[.fff]` text, blobs as a `UInt8` array.
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            RowValues::Int(i) => JsonValue::from(*i),
            RowValues::Float(f) => JsonValue::from(*f),
            RowValues::Text(s) => JsonValue::String(s.clone()),
            RowValues::Bool(b) => JsonValue::Bool(*b),
            RowValues::Timestamp(dt) => {
                JsonValue::String(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string())
            }
            RowValues::Null => JsonValue::Null,
            RowValues::JSON(value) => value.clone(),
            RowValues::Blob(bytes) => {
                JsonValue::Array(bytes.iter().map(|b| JsonValue::from(*b)).collect())
            }
        }
    }
}

impl From<i64> for RowValues {
    fn from(value: i64) -> Self {
        RowValues::Int(value)
    }
}

impl From<f64> for RowValues {
    fn from(value: f64) -> Self {
        RowValues::Float(value)
    }
}

impl From<&str> for RowValues {
    fn from(value: &str) -> Self {
        RowValues::Text(value.to_string())
    }
}

impl From<String> for RowValues {
    fn from(value: String) -> Self {
        RowValues::Text(value)
    }
}

impl From<bool> for RowValues {
    fn from(value: bool) -> Self {
        RowValues::Bool(value)
    }
}

impl From<NaiveDateTime> for RowValues {
    fn from(value: NaiveDateTime) -> Self {
        RowValues::Timestamp(value)
    }
}
