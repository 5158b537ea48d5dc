use crate::error::SqlMiddlewareDbError;
use crate::types::RowValues;

/// Escape a string for use inside a single-quoted ClickHouse literal.
///
/// Every `'` becomes `\'`, then every `\"` sequence becomes `\\"`.
#[must_use]
pub fn escape_string(value: &str) -> String {
    value.replace('\'', "\\'").replace("\\\"", "\\\\\"")
}

/// Render one bound value as inline SQL.
///
/// # Errors
/// Returns `SqlMiddlewareDbError::RenderingError` naming the value kind when the value is not
/// numeric or text, and `SqlMiddlewareDbError::ParameterError` for NaN or infinite floats.
pub fn render_literal(value: &RowValues) -> Result<String, SqlMiddlewareDbError> {
    match value {
        RowValues::Int(i) => Ok(i.to_string()),
        RowValues::Float(f) if f.is_finite() => Ok(f.to_string()),
        RowValues::Float(f) => Err(SqlMiddlewareDbError::ParameterError(format!(
            "non-finite float {f} has no SQL literal form"
        ))),
        RowValues::Text(s) => Ok(format!("'{}'", escape_string(s))),
        other => Err(SqlMiddlewareDbError::RenderingError { kind: other.kind() }),
    }
}
