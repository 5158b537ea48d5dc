use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::BoxStream;

use crate::error::SqlMiddlewareDbError;
use crate::gateway::{ClickhouseTransport, Gateway, WriteSummary};
use crate::plan::{ExecutionPlan, InsertPlan, plan};
use crate::render;
use crate::results::{ExecutionResult, RowMapper, map_rows};
use crate::rewrite::rewrite_update;
use crate::session::ConnectionSession;
use crate::statement::{CompiledStatement, StatementNode};

/// Lazy sequence of single-row results produced by [`ClickhouseConnection::stream_query`].
pub type ResultStream = BoxStream<'static, Result<ExecutionResult, SqlMiddlewareDbError>>;

const TRANSACTIONS_UNSUPPORTED: &str = "Transactions are not supported.";

/// One logical ClickHouse connection: a transport handle plus its session token.
///
/// Every statement runs autocommit; there is no transaction state to track.
#[derive(Debug, Clone)]
pub struct ClickhouseConnection {
    gateway: Gateway,
}

impl ClickhouseConnection {
    /// Wrap `transport` in a connection with a fresh session token.
    pub fn new(transport: Arc<dyn ClickhouseTransport>) -> Self {
        Self::with_session(transport, ConnectionSession::new())
    }

    pub fn with_session(
        transport: Arc<dyn ClickhouseTransport>,
        session: ConnectionSession,
    ) -> Self {
        Self {
            gateway: Gateway::new(transport, session),
        }
    }

    #[must_use]
    pub fn session(&self) -> &ConnectionSession {
        self.gateway.session()
    }

    /// Execute `statement` and return its rows and write counts.
    ///
    /// # Errors
    /// Returns rendering errors before anything is sent, and transport or server errors
    /// unchanged.
    pub async fn execute_query(
        &self,
        statement: &CompiledStatement,
    ) -> Result<ExecutionResult, SqlMiddlewareDbError> {
        match plan(statement)? {
            ExecutionPlan::Insert(InsertPlan::LiteralRows {
                table,
                columns,
                rows,
            }) => {
                let submitted = rows.len() as u64;
                let summary = self.gateway.insert(table, columns, rows).await?;
                Ok(ExecutionResult::written(
                    summary.written_rows.unwrap_or(submitted),
                ))
            }
            // the server does not report how many rows the sub-select produced
            ExecutionPlan::Insert(InsertPlan::FromSubquery { query, .. })
            | ExecutionPlan::Command(query) => {
                self.gateway.command(query).await?;
                Ok(ExecutionResult::empty())
            }
            ExecutionPlan::Insert(InsertPlan::Opaque { query }) => {
                let handle = self.gateway.query(query).await?;
                let written = WriteSummary::from_headers(handle.headers())
                    .written_rows
                    .unwrap_or(0);
                let rows = map_rows(handle.rows().await?);
                Ok(ExecutionResult {
                    rows,
                    affected_rows: Some(written),
                    changed_rows: Some(written),
                })
            }
            ExecutionPlan::Query(query) => {
                let handle = self.gateway.query(query).await?;
                Ok(ExecutionResult::from_rows(map_rows(handle.rows().await?)))
            }
        }
    }

    /// Run `statement` as a row-returning query and yield one result per row.
    ///
    /// Rows are read from the response only as the stream is polled; dropping the stream
    /// drops the response.
    ///
    /// # Errors
    /// Returns rendering errors and the error of the initial request. Errors hit while
    /// reading the body are yielded by the stream.
    pub async fn stream_query(
        &self,
        statement: &CompiledStatement,
    ) -> Result<ResultStream, SqlMiddlewareDbError> {
        let sql = match statement.node() {
            StatementNode::Update(node) => rewrite_update(statement.sql(), &node.table).sql,
            _ => statement.sql().into(),
        };
        let query = render::inline(&sql, statement.parameters())?;
        let handle = self.gateway.query(query).await?;

        let mut mapper = RowMapper::new();
        Ok(handle
            .into_stream()
            .map(move |row| row.map(|row| ExecutionResult::from_rows(vec![mapper.map(row)])))
            .boxed())
    }

    /// # Errors
    /// Always returns `SqlMiddlewareDbError::Unsupported`.
    #[allow(clippy::unused_async)]
    pub async fn begin_transaction(&self) -> Result<(), SqlMiddlewareDbError> {
        Err(SqlMiddlewareDbError::Unsupported(
            TRANSACTIONS_UNSUPPORTED.to_string(),
        ))
    }

    /// # Errors
    /// Always returns `SqlMiddlewareDbError::Unsupported`.
    #[allow(clippy::unused_async)]
    pub async fn commit_transaction(&self) -> Result<(), SqlMiddlewareDbError> {
        Err(SqlMiddlewareDbError::Unsupported(
            TRANSACTIONS_UNSUPPORTED.to_string(),
        ))
    }

    /// # Errors
    /// Always returns `SqlMiddlewareDbError::Unsupported`.
    #[allow(clippy::unused_async)]
    pub async fn rollback_transaction(&self) -> Result<(), SqlMiddlewareDbError> {
        Err(SqlMiddlewareDbError::Unsupported(
            TRANSACTIONS_UNSUPPORTED.to_string(),
        ))
    }
}
