//! The three protocol verbs the translation layer needs, bound to one connection session.

mod headers;
#[cfg(feature = "http")]
pub mod http;
mod rows;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;

use crate::error::SqlMiddlewareDbError;
use crate::render::{NamedParams, RenderedQuery};
use crate::results::JsonRow;
use crate::session::ConnectionSession;
use crate::statement::TableRef;
use crate::types::RowValues;

pub use headers::{
    HeaderValue, QUERY_ID_HEADER, ResponseHeaders, SUMMARY_HEADER, WriteSummary,
};
pub use rows::{RowStream, json_each_row, rows_from_vec};

/// Server settings sent with a request.
pub type Settings = BTreeMap<String, String>;

/// Accept date-only and timestamp literals in any common shape.
pub const DATE_TIME_INPUT_FORMAT: (&str, &str) = ("date_time_input_format", "best_effort");
/// Hold the response until the statement has fully completed on the server.
pub const WAIT_END_OF_QUERY: (&str, &str) = ("wait_end_of_query", "1");

/// Rendered SQL sent as a query or a command.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRequest {
    pub sql: String,
    pub params: Option<NamedParams>,
    pub session_id: String,
    pub settings: Settings,
}

/// Bulk columnar write: a header of column names followed by row tuples.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertRequest {
    pub table: TableRef,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RowValues>>,
    pub session_id: String,
    pub settings: Settings,
}

/// Row-returning response: metadata up front, rows on demand.
pub struct QueryHandle {
    headers: ResponseHeaders,
    rows: RowStream,
}

impl QueryHandle {
    pub fn new(headers: ResponseHeaders, rows: RowStream) -> Self {
        Self { headers, rows }
    }

    #[must_use]
    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    /// Read every remaining row.
    ///
    /// # Errors
    /// Returns the first transport or decoding error hit while reading the body.
    pub async fn rows(self) -> Result<Vec<JsonRow>, SqlMiddlewareDbError> {
        self.rows.try_collect().await
    }

    /// Hand the rows over as a lazy stream.
    #[must_use]
    pub fn into_stream(self) -> RowStream {
        self.rows
    }
}

impl std::fmt::Debug for QueryHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryHandle")
            .field("headers", &self.headers)
            .field("rows", &"<stream>")
            .finish()
    }
}

/// Network client for one ClickHouse endpoint.
///
/// Implementations must tolerate several requests in flight from the same handle.
#[async_trait]
pub trait ClickhouseTransport: Send + Sync {
    /// Run a row-returning statement.
    async fn query(&self, request: SqlRequest) -> Result<QueryHandle, SqlMiddlewareDbError>;

    /// Bulk-insert literal rows.
    async fn insert(&self, request: InsertRequest) -> Result<WriteSummary, SqlMiddlewareDbError>;

    /// Run a statement for its side effects only.
    async fn command(&self, request: SqlRequest)
    -> Result<ResponseHeaders, SqlMiddlewareDbError>;
}

/// One transport plus the session every request is tagged with.
#[derive(Clone)]
pub struct Gateway {
    transport: Arc<dyn ClickhouseTransport>,
    session: ConnectionSession,
}

impl Gateway {
    pub fn new(transport: Arc<dyn ClickhouseTransport>, session: ConnectionSession) -> Self {
        Self { transport, session }
    }

    #[must_use]
    pub fn session(&self) -> &ConnectionSession {
        &self.session
    }

    fn settings(extra: &[(&str, &str)]) -> Settings {
        std::iter::once(DATE_TIME_INPUT_FORMAT)
            .chain(extra.iter().copied())
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sql_request(&self, query: RenderedQuery, extra: &[(&str, &str)]) -> SqlRequest {
        let (sql, params) = match query {
            RenderedQuery::Inline(sql) => (sql, None),
            RenderedQuery::Named { sql, params } => (sql, Some(params)),
        };
        SqlRequest {
            sql,
            params,
            session_id: self.session.id().to_string(),
            settings: Self::settings(extra),
        }
    }

    /// # Errors
    /// Propagates the transport's error unchanged.
    pub async fn query(&self, query: RenderedQuery) -> Result<QueryHandle, SqlMiddlewareDbError> {
        tracing::debug!(session = %self.session.id(), sql = %query.sql(), "clickhouse query");
        self.transport.query(self.sql_request(query, &[])).await
    }

    /// # Errors
    /// Propagates the transport's error unchanged.
    pub async fn insert(
        &self,
        table: TableRef,
        columns: Vec<String>,
        rows: Vec<Vec<RowValues>>,
    ) -> Result<WriteSummary, SqlMiddlewareDbError> {
        tracing::debug!(
            session = %self.session.id(),
            table = %table.qualified(),
            rows = rows.len(),
            "clickhouse bulk insert"
        );
        let request = InsertRequest {
            table,
            columns,
            rows,
            session_id: self.session.id().to_string(),
            settings: Self::settings(&[]),
        };
        self.transport.insert(request).await
    }

    /// # Errors
    /// Propagates the transport's error unchanged.
    pub async fn command(
        &self,
        query: RenderedQuery,
    ) -> Result<ResponseHeaders, SqlMiddlewareDbError> {
        tracing::debug!(session = %self.session.id(), sql = %query.sql(), "clickhouse command");
        self.transport
            .command(self.sql_request(query, &[WAIT_END_OF_QUERY]))
            .await
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("session", &self.session)
            .field("transport", &"<ClickhouseTransport>")
            .finish()
    }
}
