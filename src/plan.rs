//! Route a compiled statement to the protocol verb ClickHouse supports for its shape.

use crate::error::SqlMiddlewareDbError;
use crate::render::{self, RenderedQuery};
use crate::rewrite::rewrite_update;
use crate::statement::{CompiledStatement, InsertNode, InsertSource, StatementNode, TableRef};
use crate::types::RowValues;

/// How an INSERT reaches the server, decided by what the AST makes available.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertPlan {
    /// Literal tuples are known client-side: bulk columnar insert.
    LiteralRows {
        table: TableRef,
        columns: Vec<String>,
        rows: Vec<Vec<RowValues>>,
    },
    /// Rows come from a sub-select on the server: command with named parameters.
    FromSubquery {
        table: TableRef,
        query: RenderedQuery,
    },
    /// No recognizable source node: inline-rendered row-returning query.
    Opaque { query: RenderedQuery },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionPlan {
    Insert(InsertPlan),
    /// Row-returning query; the rows become the result.
    Query(RenderedQuery),
    /// Side effects only; waits for completion, returns no rows.
    Command(RenderedQuery),
}

/// Classify `statement` and render it for the chosen verb.
///
/// # Errors
/// Returns rendering errors from [`render`] and `SqlMiddlewareDbError::ParameterError` when a
/// literal row does not match the column list.
pub fn plan(statement: &CompiledStatement) -> Result<ExecutionPlan, SqlMiddlewareDbError> {
    let sql = statement.sql();
    let params = statement.parameters();
    match statement.node() {
        StatementNode::Insert(node) => plan_insert(statement, node).map(ExecutionPlan::Insert),
        StatementNode::Update(node) => {
            let rewritten = rewrite_update(sql, &node.table);
            render::inline(&rewritten.sql, params).map(ExecutionPlan::Query)
        }
        StatementNode::Select => render::inline(sql, params).map(ExecutionPlan::Query),
        StatementNode::Other => render::inline(sql, params).map(ExecutionPlan::Command),
    }
}

fn plan_insert(
    statement: &CompiledStatement,
    node: &InsertNode,
) -> Result<InsertPlan, SqlMiddlewareDbError> {
    match &node.source {
        Some(InsertSource::Values(rows)) => {
            if let Some((idx, row)) = rows
                .iter()
                .enumerate()
                .find(|(_, row)| row.len() != node.columns.len())
            {
                return Err(SqlMiddlewareDbError::ParameterError(format!(
                    "insert row {idx} has {} values for {} columns",
                    row.len(),
                    node.columns.len()
                )));
            }
            Ok(InsertPlan::LiteralRows {
                table: node.into.clone(),
                columns: node.columns.clone(),
                rows: rows.clone(),
            })
        }
        Some(InsertSource::Select) => Ok(InsertPlan::FromSubquery {
            table: node.into.clone(),
            query: render::named(statement.sql(), statement.parameters())?,
        }),
        None => Ok(InsertPlan::Opaque {
            query: render::inline(statement.sql(), statement.parameters())?,
        }),
    }
}
