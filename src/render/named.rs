use crate::types::{CLICKHOUSE_DATETIME_FORMAT, RowValues};

/// Ordered name → value bindings for `{name:Type}` placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParams {
    entries: Vec<(String, RowValues)>,
}

impl NamedParams {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` to `name`, after any earlier bindings.
    pub fn insert(&mut self, name: impl Into<String>, value: RowValues) {
        self.entries.push((name.into(), value));
    }

    /// Look up the value bound to `name`
    ///
    /// # Returns
    ///
    /// The bound value, or None if the name was never bound
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RowValues> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Values in the text form ClickHouse expects for `param_<name>` arguments.
    pub fn wire_values(&self) -> impl Iterator<Item = (String, String)> + '_ {
        self.entries
            .iter()
            .map(|(name, value)| (format!("param_{name}"), wire_text(value)))
    }
}

/// Name given to the placeholder at `index`.
#[must_use]
pub fn param_name(index: usize) -> String {
    format!("p{index}")
}

/// ClickHouse scalar type inferred from a bound value's runtime kind.
#[must_use]
pub fn infer_type(value: &RowValues) -> &'static str {
    match value {
        RowValues::Text(_) => "String",
        RowValues::Int(i) if *i >= 0 => "UInt64",
        RowValues::Int(_) => "Int64",
        RowValues::Float(_) => "Float64",
        RowValues::Timestamp(_) => "DateTime",
        _ => "String",
    }
}

/// Typed placeholder token, e.g. `{p0:UInt64}`.
#[must_use]
pub fn typed_token(name: &str, value: &RowValues) -> String {
    format!("{{{name}:{}}}", infer_type(value))
}

// Parameter values are parsed with the escaped text rules, so backslash and
// control characters need escaping even though no quoting is involved.
fn escape_param_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            _ => out.push(c),
        }
    }
    out
}

fn wire_text(value: &RowValues) -> String {
    match value {
        RowValues::Int(i) => i.to_string(),
        RowValues::Float(f) => f.to_string(),
        RowValues::Text(s) => escape_param_text(s),
        RowValues::Bool(b) => b.to_string(),
        RowValues::Timestamp(dt) => dt.format(CLICKHOUSE_DATETIME_FORMAT).to_string(),
        RowValues::Null => "\\N".to_string(),
        RowValues::JSON(value) => escape_param_text(&value.to_string()),
        RowValues::Blob(bytes) => escape_param_text(&String::from_utf8_lossy(bytes)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    #[test]
    fn types_follow_runtime_kind() {
        assert_eq!(infer_type(&RowValues::Text("a".into())), "String");
        assert_eq!(infer_type(&RowValues::Int(3)), "UInt64");
        assert_eq!(infer_type(&RowValues::Int(-3)), "Int64");
        assert_eq!(infer_type(&RowValues::Float(0.5)), "Float64");
        let dt = NaiveDateTime::parse_from_str("2025-04-15 00:00:00", CLICKHOUSE_DATETIME_FORMAT)
            .unwrap();
        assert_eq!(infer_type(&RowValues::Timestamp(dt)), "DateTime");
        assert_eq!(infer_type(&RowValues::Bool(true)), "String");
        assert_eq!(infer_type(&RowValues::Null), "String");
    }

    #[test]
    fn wire_values_are_prefixed_and_escaped() {
        let mut params = NamedParams::new();
        params.insert("p0", RowValues::Int(3));
        params.insert("p1", RowValues::Text("a\tb\\c".into()));
        let wire: Vec<_> = params.wire_values().collect();
        assert_eq!(
            wire,
            vec![
                ("param_p0".to_string(), "3".to_string()),
                ("param_p1".to_string(), "a\\tb\\\\c".to_string()),
            ]
        );
    }
}
