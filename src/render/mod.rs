//! Placeholder rendering: positional `?` → inline literals or typed named parameters.

mod literal;
mod named;
mod parsers;
mod scanner;

use crate::error::SqlMiddlewareDbError;
use crate::types::RowValues;

pub use literal::{escape_string, render_literal};
pub use named::{NamedParams, infer_type, param_name, typed_token};

use scanner::placeholder_offsets;

/// SQL whose placeholders have all been resolved in one style.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedQuery {
    /// Every placeholder replaced by a literal.
    Inline(String),
    /// Every placeholder replaced by a `{name:Type}` token bound in `params`.
    Named { sql: String, params: NamedParams },
}

impl RenderedQuery {
    #[must_use]
    pub fn sql(&self) -> &str {
        match self {
            RenderedQuery::Inline(sql) | RenderedQuery::Named { sql, .. } => sql,
        }
    }

    #[must_use]
    pub fn params(&self) -> Option<&NamedParams> {
        match self {
            RenderedQuery::Inline(_) => None,
            RenderedQuery::Named { params, .. } => Some(params),
        }
    }
}

fn substitute<F>(
    sql: &str,
    params: &[RowValues],
    mut replace: F,
) -> Result<String, SqlMiddlewareDbError>
where
    F: FnMut(usize, &RowValues) -> Result<String, SqlMiddlewareDbError>,
{
    let offsets = placeholder_offsets(sql);
    if offsets.len() != params.len() {
        return Err(SqlMiddlewareDbError::ParameterError(format!(
            "statement has {} placeholders but {} parameters were bound",
            offsets.len(),
            params.len()
        )));
    }

    let mut out = String::with_capacity(sql.len() + params.len() * 8);
    let mut last = 0;
    for (index, (offset, value)) in offsets.into_iter().zip(params).enumerate() {
        out.push_str(&sql[last..offset]);
        out.push_str(&replace(index, value)?);
        last = offset + 1;
    }
    out.push_str(&sql[last..]);
    Ok(out)
}

/// Replace each `?` with the literal form of the parameter at the same position.
///
/// ```rust
/// use clickhouse_middleware::prelude::*;
///
/// let sql = render_inline(
///     "select * from t where id = ? and name = ?",
///     &[RowValues::Int(1), RowValues::Text("O'Brien".into())],
/// )?;
/// assert_eq!(sql, r"select * from t where id = 1 and name = 'O\'Brien'");
/// # Ok::<(), SqlMiddlewareDbError>(())
/// ```
///
/// # Errors
/// Returns `SqlMiddlewareDbError::ParameterError` when the placeholder and parameter counts
/// differ, and `SqlMiddlewareDbError::RenderingError` for a value with no literal form.
pub fn render_inline(sql: &str, params: &[RowValues]) -> Result<String, SqlMiddlewareDbError> {
    substitute(sql, params, |_, value| render_literal(value))
}

/// Replace each `?` with a typed named token and collect the bindings.
///
/// # Errors
/// Returns `SqlMiddlewareDbError::ParameterError` when the placeholder and parameter counts
/// differ.
pub fn render_named(
    sql: &str,
    params: &[RowValues],
) -> Result<(String, NamedParams), SqlMiddlewareDbError> {
    let mut named = NamedParams::new();
    let rendered = substitute(sql, params, |index, value| {
        let name = param_name(index);
        let token = typed_token(&name, value);
        named.insert(name, value.clone());
        Ok(token)
    })?;
    Ok((rendered, named))
}

/// Render for inline execution.
///
/// # Errors
/// See [`render_inline`].
pub fn inline(sql: &str, params: &[RowValues]) -> Result<RenderedQuery, SqlMiddlewareDbError> {
    render_inline(sql, params).map(RenderedQuery::Inline)
}

/// Render for bound execution with named parameters.
///
/// # Errors
/// See [`render_named`].
pub fn named(sql: &str, params: &[RowValues]) -> Result<RenderedQuery, SqlMiddlewareDbError> {
    render_named(sql, params).map(|(sql, params)| RenderedQuery::Named { sql, params })
}
