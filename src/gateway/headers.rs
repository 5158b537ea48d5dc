use std::collections::HashMap;

use serde_json::Value;

/// A response header that arrived once or several times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// The first value, whichever form the header arrived in.
    #[must_use]
    pub fn first(&self) -> Option<&str> {
        match self {
            HeaderValue::Single(value) => Some(value),
            HeaderValue::Multiple(values) => values.first().map(String::as_str),
        }
    }
}

/// Response metadata, keyed by lower-cased header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: HashMap<String, HeaderValue>,
}

impl ResponseHeaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value; a repeated name turns the entry into a collection.
    pub fn append(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let key = name.to_ascii_lowercase();
        let merged = match self.entries.remove(&key) {
            None => HeaderValue::Single(value),
            Some(HeaderValue::Single(existing)) => HeaderValue::Multiple(vec![existing, value]),
            Some(HeaderValue::Multiple(mut values)) => {
                values.push(value);
                HeaderValue::Multiple(values)
            }
        };
        self.entries.insert(key, merged);
    }

    /// Set an entry as given, replacing any previous value.
    pub fn set(&mut self, name: &str, value: HeaderValue) {
        self.entries.insert(name.to_ascii_lowercase(), value);
    }

    /// Look up a header, case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries.get(&name.to_ascii_lowercase())
    }

    /// First value of a header, if present
    ///
    /// # Arguments
    ///
    /// * `name` - The header name, in any case
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(HeaderValue::first)
    }

    /// Server-assigned id of the query that produced this response.
    #[must_use]
    pub fn query_id(&self) -> Option<&str> {
        self.first(QUERY_ID_HEADER)
    }
}

pub const SUMMARY_HEADER: &str = "x-clickhouse-summary";
pub const QUERY_ID_HEADER: &str = "x-clickhouse-query-id";

/// Write statistics reported for a statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub query_id: Option<String>,
    /// `None` when the server did not report a count.
    pub written_rows: Option<u64>,
}

impl WriteSummary {
    /// Read the `X-ClickHouse-Summary` JSON header, if present and well formed.
    #[must_use]
    pub fn from_headers(headers: &ResponseHeaders) -> Self {
        let written_rows = headers
            .first(SUMMARY_HEADER)
            .and_then(|raw| serde_json::from_str::<Value>(raw).ok())
            .and_then(|summary| summary.get("written_rows").and_then(count));
        Self {
            query_id: headers.query_id().map(str::to_string),
            written_rows,
        }
    }
}

// ClickHouse quotes 64-bit counters in the summary
fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUMMARY: &str = r#"{"read_rows":"0","read_bytes":"0","written_rows":"2","written_bytes":"48","total_rows_to_read":"0"}"#;

    #[test]
    fn summary_from_single_header() {
        let mut headers = ResponseHeaders::new();
        headers.append("X-ClickHouse-Summary", SUMMARY);
        headers.append("X-ClickHouse-Query-Id", "q-1");
        let summary = WriteSummary::from_headers(&headers);
        assert_eq!(summary.written_rows, Some(2));
        assert_eq!(summary.query_id.as_deref(), Some("q-1"));
    }

    #[test]
    fn summary_from_one_element_collection() {
        let mut headers = ResponseHeaders::new();
        headers.set(
            SUMMARY_HEADER,
            HeaderValue::Multiple(vec![r#"{"written_rows":5}"#.to_string()]),
        );
        assert_eq!(WriteSummary::from_headers(&headers).written_rows, Some(5));
    }

    #[test]
    fn missing_or_malformed_summary_has_no_count() {
        assert_eq!(WriteSummary::from_headers(&ResponseHeaders::new()).written_rows, None);
        let mut headers = ResponseHeaders::new();
        headers.append(SUMMARY_HEADER, "not json");
        assert_eq!(WriteSummary::from_headers(&headers).written_rows, None);
    }

    #[test]
    fn repeated_header_becomes_a_collection() {
        let mut headers = ResponseHeaders::new();
        headers.append("a", "1");
        headers.append("A", "2");
        assert_eq!(
            headers.get("a"),
            Some(&HeaderValue::Multiple(vec!["1".into(), "2".into()]))
        );
        assert_eq!(headers.first("a"), Some("1"));
    }
}
