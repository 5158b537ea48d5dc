//! `UPDATE t SET …` → `ALTER TABLE t UPDATE …`.
//!
//! ClickHouse has no row-level UPDATE; mutations are asynchronous `ALTER TABLE … UPDATE`
//! statements with the same SET/WHERE syntax, so only the statement prefix changes.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::statement::TableRef;

/// Which anchor produced the rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteAnchor {
    /// Prefix matched against the statement's own target table.
    Structural,
    /// Prefix matched by the anchored `UPDATE <ident>[.<ident>] SET` pattern.
    Textual,
    /// Nothing matched; the SQL is returned as given.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten<'a> {
    pub sql: Cow<'a, str>,
    pub anchor: RewriteAnchor,
}

const IDENT: &str = r#"(?:[A-Za-z_][A-Za-z0-9_]*|`(?:[^`]|``)+`|"(?:[^"]|"")+")"#;

static UPDATE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<lead>\s*)update\s+(?P<target>{IDENT}(?:\.{IDENT})?)\s+set\b"
    ))
    .expect("update prefix pattern is valid")
});

/// Rewrite an UPDATE against `table` into ClickHouse mutation syntax.
///
/// The prefix is located through the target table first; the textual pattern is the
/// fallback, and anything else passes through untouched.
///
/// ```rust
/// use clickhouse_middleware::prelude::*;
///
/// let out = rewrite_update(
///     "update `company_metrics` set `mrr` = ? where `company_id` = ?",
///     &TableRef::new("company_metrics"),
/// );
/// assert_eq!(out.sql, "ALTER TABLE `company_metrics` UPDATE `mrr` = ? where `company_id` = ?");
/// assert_eq!(out.anchor, RewriteAnchor::Structural);
/// ```
#[must_use]
pub fn rewrite_update<'a>(sql: &'a str, table: &TableRef) -> Rewritten<'a> {
    if let Some(prefix) = structural_prefix(sql, table) {
        return Rewritten {
            sql: Cow::Owned(prefix.apply(sql)),
            anchor: RewriteAnchor::Structural,
        };
    }

    if let Some(rewritten) = rewrite_update_text(sql) {
        tracing::warn!(
            table = %table.qualified(),
            "update target did not match the statement table, used textual prefix"
        );
        return Rewritten {
            sql: Cow::Owned(rewritten),
            anchor: RewriteAnchor::Textual,
        };
    }

    tracing::warn!(
        table = %table.qualified(),
        "update statement has an unexpected shape, sending it unmodified"
    );
    Rewritten {
        sql: Cow::Borrowed(sql),
        anchor: RewriteAnchor::Unchanged,
    }
}

/// Textual fallback: rewrite a case-insensitive `UPDATE <ident>[.<ident>] SET` prefix.
///
/// Returns `None` when the statement does not start with that prefix.
#[must_use]
pub fn rewrite_update_text(sql: &str) -> Option<String> {
    let caps = UPDATE_PREFIX.captures(sql)?;
    let whole = caps.get(0)?;
    let lead = caps.name("lead").map_or("", |m| m.as_str());
    let target = caps.name("target")?.as_str();
    Some(format!(
        "{lead}ALTER TABLE {target} UPDATE{}",
        &sql[whole.end()..]
    ))
}

struct Prefix {
    lead_end: usize,
    target_start: usize,
    target_end: usize,
    end: usize,
}

impl Prefix {
    fn apply(&self, sql: &str) -> String {
        format!(
            "{}ALTER TABLE {} UPDATE{}",
            &sql[..self.lead_end],
            &sql[self.target_start..self.target_end],
            &sql[self.end..]
        )
    }
}

fn structural_prefix(sql: &str, table: &TableRef) -> Option<Prefix> {
    let bytes = sql.as_bytes();
    let lead_end = skip_whitespace(bytes, 0);
    let mut idx = keyword(bytes, lead_end, "update")?;
    let after_keyword = skip_whitespace(bytes, idx);
    if after_keyword == idx {
        return None;
    }
    idx = after_keyword;

    let target_start = idx;
    let (first, end) = identifier(sql, idx)?;
    idx = end;
    let mut parts = vec![first];
    if bytes.get(idx) == Some(&b'.') {
        let (second, end) = identifier(sql, idx + 1)?;
        parts.push(second);
        idx = end;
    }
    let target_end = idx;

    let expected: Vec<&str> = match &table.schema {
        Some(schema) => vec![schema.as_str(), table.table.as_str()],
        None => vec![table.table.as_str()],
    };
    if parts.len() != expected.len() || parts.iter().zip(&expected).any(|(a, b)| a != b) {
        return None;
    }

    let before_set = skip_whitespace(bytes, idx);
    if before_set == idx {
        return None;
    }
    let end = keyword(bytes, before_set, "set")?;

    Some(Prefix {
        lead_end,
        target_start,
        target_end,
        end,
    })
}

fn skip_whitespace(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx += 1;
    }
    idx
}

// Case-insensitive keyword at `idx` that is not the start of a longer word.
fn keyword(bytes: &[u8], idx: usize, word: &str) -> Option<usize> {
    let end = idx + word.len();
    let candidate = bytes.get(idx..end)?;
    if !candidate.eq_ignore_ascii_case(word.as_bytes()) {
        return None;
    }
    match bytes.get(end) {
        Some(b) if b.is_ascii_alphanumeric() || *b == b'_' => None,
        _ => Some(end),
    }
}

// One identifier, bare or quoted; returns the unquoted name and the end offset.
fn identifier(sql: &str, start: usize) -> Option<(String, usize)> {
    let bytes = sql.as_bytes();
    match bytes.get(start)? {
        quote @ (b'`' | b'"') => {
            let mut name = String::new();
            let mut idx = start + 1;
            loop {
                let rest = sql.get(idx..)?;
                let pos = rest.find(char::from(*quote))?;
                name.push_str(&rest[..pos]);
                idx += pos + 1;
                if bytes.get(idx) == Some(quote) {
                    name.push(char::from(*quote));
                    idx += 1;
                } else {
                    break;
                }
            }
            if name.is_empty() {
                None
            } else {
                Some((name, idx))
            }
        }
        b if b.is_ascii_alphabetic() || *b == b'_' => {
            let mut idx = start;
            while idx < bytes.len() && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_') {
                idx += 1;
            }
            Some((sql[start..idx].to_string(), idx))
        }
        _ => None,
    }
}
