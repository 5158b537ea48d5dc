//! ClickHouse HTTP interface transport.

use async_trait::async_trait;
use reqwest::{Client, Response};

use super::{
    ClickhouseTransport, InsertRequest, QueryHandle, ResponseHeaders, Settings, SqlRequest,
    WriteSummary, json_each_row,
};
use crate::config::ClickhouseOptions;
use crate::error::SqlMiddlewareDbError;
use crate::statement::TableRef;

/// Transport over the ClickHouse HTTP interface (`:8123` by default).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    options: ClickhouseOptions,
}

impl HttpTransport {
    /// Build a transport with its own HTTP client.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::ConfigError` for invalid options and
    /// `SqlMiddlewareDbError::ConnectionError` if the HTTP client cannot be built.
    pub fn new(options: &ClickhouseOptions) -> Result<Self, SqlMiddlewareDbError> {
        options.validate()?;
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            SqlMiddlewareDbError::ConnectionError(format!("Failed to build HTTP client: {e}"))
        })?;
        Ok(Self {
            client,
            options: options.clone(),
        })
    }

    fn query_args(&self, session_id: &str, settings: &Settings) -> Vec<(String, String)> {
        let mut args = Vec::with_capacity(settings.len() + self.options.settings.len() + 2);
        if let Some(database) = &self.options.database {
            args.push(("database".to_string(), database.clone()));
        }
        args.push(("session_id".to_string(), session_id.to_string()));
        // per-request settings win over the configured defaults
        for (key, value) in &self.options.settings {
            if !settings.contains_key(key) {
                args.push((key.clone(), value.clone()));
            }
        }
        args.extend(settings.iter().map(|(k, v)| (k.clone(), v.clone())));
        args
    }

    async fn post(
        &self,
        args: Vec<(String, String)>,
        body: String,
    ) -> Result<Response, SqlMiddlewareDbError> {
        let mut request = self
            .client
            .post(&self.options.url)
            .query(&args)
            .body(body);
        if let Some(username) = &self.options.username {
            request = request.basic_auth(username, self.options.password.as_deref());
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        tracing::warn!(status = status.as_u16(), message = %message.trim(), "clickhouse error");
        Err(SqlMiddlewareDbError::ServerError {
            status: status.as_u16(),
            message: message.trim().to_string(),
        })
    }

    fn sql_args(&self, request: &SqlRequest) -> Vec<(String, String)> {
        let mut args = self.query_args(&request.session_id, &request.settings);
        if let Some(params) = &request.params {
            args.extend(params.wire_values());
        }
        args
    }
}

#[async_trait]
impl ClickhouseTransport for HttpTransport {
    async fn query(&self, request: SqlRequest) -> Result<QueryHandle, SqlMiddlewareDbError> {
        let args = self.sql_args(&request);
        let body = query_body(&request.sql);
        let response = self.post(args, body).await?;
        let headers = response_headers(&response);
        let rows = json_each_row(response.bytes_stream());
        Ok(QueryHandle::new(headers, rows))
    }

    async fn insert(&self, request: InsertRequest) -> Result<WriteSummary, SqlMiddlewareDbError> {
        let mut args = self.query_args(&request.session_id, &request.settings);
        args.push((
            "query".to_string(),
            insert_statement(&request.table, &request.columns),
        ));
        let body = compact_rows_body(&request)?;
        let response = self.post(args, body).await?;
        Ok(WriteSummary::from_headers(&response_headers(&response)))
    }

    async fn command(
        &self,
        request: SqlRequest,
    ) -> Result<ResponseHeaders, SqlMiddlewareDbError> {
        let args = self.sql_args(&request);
        let response = self.post(args, request.sql).await?;
        let headers = response_headers(&response);
        // drain so the connection goes back to reqwest's pool
        response.bytes().await?;
        Ok(headers)
    }
}

fn response_headers(response: &Response) -> ResponseHeaders {
    let mut headers = ResponseHeaders::new();
    for (name, value) in response.headers() {
        headers.append(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
    }
    headers
}

// A trailing `;` before the FORMAT clause would make it a second statement.
pub(crate) fn query_body(sql: &str) -> String {
    let sql = sql.trim_end().trim_end_matches(';').trim_end();
    format!("{sql}\nFORMAT JSONEachRow")
}

pub(crate) fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
}

pub(crate) fn insert_statement(table: &TableRef, columns: &[String]) -> String {
    let target = match &table.schema {
        Some(schema) => format!(
            "{}.{}",
            quote_identifier(schema),
            quote_identifier(&table.table)
        ),
        None => quote_identifier(&table.table),
    };
    let columns: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
    format!(
        "INSERT INTO {target} ({}) FORMAT JSONCompactEachRowWithNames",
        columns.join(", ")
    )
}

// Header row of column names, then one JSON array per row.
pub(crate) fn compact_rows_body(request: &InsertRequest) -> Result<String, SqlMiddlewareDbError> {
    let mut body = serde_json::to_string(&request.columns)?;
    body.push('\n');
    for row in &request.rows {
        let cells: Vec<serde_json::Value> = row.iter().map(|v| v.to_json()).collect();
        body.push_str(&serde_json::to_string(&cells)?);
        body.push('\n');
    }
    Ok(body)
}
