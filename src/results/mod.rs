mod row;

use std::collections::HashMap;
use std::sync::Arc;

pub use row::CustomDbRow;

use crate::types::RowValues;

/// One `JSONEachRow` object, keys in the order ClickHouse sent them.
pub type JsonRow = serde_json::Map<String, serde_json::Value>;

/// Uniform result of executing one statement.
///
/// `affected_rows` / `changed_rows` are `None` when the count is not observable on the
/// path that ran the statement; `None` never means zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    /// Rows returned by the engine, possibly empty
    pub rows: Vec<CustomDbRow>,
    pub affected_rows: Option<u64>,
    pub changed_rows: Option<u64>,
}

impl ExecutionResult {
    /// No rows and no counts.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Rows with no write counts.
    #[must_use]
    pub fn from_rows(rows: Vec<CustomDbRow>) -> Self {
        Self {
            rows,
            affected_rows: None,
            changed_rows: None,
        }
    }

    /// Result of a write: an insert cannot change existing rows, so both counts are `written`.
    #[must_use]
    pub fn written(written: u64) -> Self {
        Self {
            rows: Vec::new(),
            affected_rows: Some(written),
            changed_rows: Some(written),
        }
    }
}

/// Maps JSON rows to `CustomDbRow`s, sharing column metadata between rows of the same shape.
#[derive(Debug, Default)]
pub struct RowMapper {
    columns: Option<(Arc<Vec<String>>, Arc<HashMap<String, usize>>)>,
}

impl RowMapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Map one row
    ///
    /// # Arguments
    ///
    /// * `row` - A decoded `JSONEachRow` object
    ///
    /// # Returns
    ///
    /// A `CustomDbRow` whose column names are shared with the previous row when the keys match
    pub fn map(&mut self, row: JsonRow) -> CustomDbRow {
        let same_shape = self
            .columns
            .as_ref()
            .is_some_and(|(names, _)| names.len() == row.len() && names.iter().eq(row.keys()));
        if !same_shape {
            let names: Vec<String> = row.keys().cloned().collect();
            let cache = Arc::new(row::index_columns(&names));
            self.columns = Some((Arc::new(names), cache));
        }

        let values = row.into_iter().map(|(_, v)| RowValues::from_json(v)).collect();
        match &self.columns {
            Some((names, cache)) => CustomDbRow::with_cache(names.clone(), cache.clone(), values),
            None => CustomDbRow::new(Arc::new(Vec::new()), values),
        }
    }
}

/// Map a fully materialized response.
#[must_use]
pub fn map_rows(rows: Vec<JsonRow>) -> Vec<CustomDbRow> {
    let mut mapper = RowMapper::new();
    rows.into_iter().map(|row| mapper.map(row)).collect()
}
