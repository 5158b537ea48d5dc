#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clickhouse_middleware::gateway::{
    ClickhouseTransport, InsertRequest, QueryHandle, ResponseHeaders, SUMMARY_HEADER,
    SqlRequest, WriteSummary,
};
use clickhouse_middleware::results::JsonRow;
use clickhouse_middleware::SqlMiddlewareDbError;
use futures_util::StreamExt;
use futures_util::stream;
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum Recorded {
    Query(SqlRequest),
    Insert(InsertRequest),
    Command(SqlRequest),
}

impl Recorded {
    pub fn session_id(&self) -> &str {
        match self {
            Recorded::Query(r) | Recorded::Command(r) => &r.session_id,
            Recorded::Insert(r) => &r.session_id,
        }
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        let settings = match self {
            Recorded::Query(r) | Recorded::Command(r) => &r.settings,
            Recorded::Insert(r) => &r.settings,
        };
        settings.get(key).map(String::as_str)
    }
}

/// In-memory transport that records every request and answers from canned data.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<Recorded>>,
    rows: Vec<JsonRow>,
    summary: Option<String>,
    insert_written: Option<u64>,
    fail: Option<(u16, String)>,
    pulled: Arc<AtomicUsize>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(mut self, rows: Vec<Value>) -> Self {
        self.rows = rows
            .into_iter()
            .map(|v| match v {
                Value::Object(map) => map,
                other => panic!("row must be an object: {other}"),
            })
            .collect();
        self
    }

    /// Summary header attached to query responses.
    pub fn with_summary(mut self, summary: &str) -> Self {
        self.summary = Some(summary.to_string());
        self
    }

    pub fn with_insert_written(mut self, written: u64) -> Self {
        self.insert_written = Some(written);
        self
    }

    pub fn failing(mut self, status: u16, message: &str) -> Self {
        self.fail = Some((status, message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    /// Rows handed out so far across all query responses.
    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }

    fn record(&self, call: Recorded) -> Result<(), SqlMiddlewareDbError> {
        self.calls.lock().unwrap().push(call);
        match &self.fail {
            Some((status, message)) => Err(SqlMiddlewareDbError::ServerError {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClickhouseTransport for RecordingTransport {
    async fn query(&self, request: SqlRequest) -> Result<QueryHandle, SqlMiddlewareDbError> {
        self.record(Recorded::Query(request))?;
        let mut headers = ResponseHeaders::new();
        if let Some(summary) = &self.summary {
            headers.append(SUMMARY_HEADER, summary.clone());
        }
        let pulled = Arc::clone(&self.pulled);
        let rows = stream::iter(self.rows.clone().into_iter().map(Ok::<JsonRow, SqlMiddlewareDbError>))
            .inspect(move |_| {
                pulled.fetch_add(1, Ordering::SeqCst);
            })
            .boxed();
        Ok(QueryHandle::new(headers, rows))
    }

    async fn insert(&self, request: InsertRequest) -> Result<WriteSummary, SqlMiddlewareDbError> {
        self.record(Recorded::Insert(request))?;
        Ok(WriteSummary {
            query_id: None,
            written_rows: self.insert_written,
        })
    }

    async fn command(
        &self,
        request: SqlRequest,
    ) -> Result<ResponseHeaders, SqlMiddlewareDbError> {
        self.record(Recorded::Command(request))?;
        Ok(ResponseHeaders::new())
    }
}
