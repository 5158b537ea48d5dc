//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::config::{ClickhouseOptions, ClickhouseOptionsBuilder};
pub use crate::connection::{ClickhouseConnection, ResultStream};
pub use crate::dialect::{ClickhouseAdapter, ClickhouseDialect};
pub use crate::driver::ClickhouseDriver;
pub use crate::error::SqlMiddlewareDbError;
pub use crate::gateway::{ClickhouseTransport, QueryHandle, ResponseHeaders, WriteSummary};
pub use crate::plan::{ExecutionPlan, InsertPlan, plan};
pub use crate::render::{NamedParams, RenderedQuery, render_inline, render_named};
pub use crate::results::{CustomDbRow, ExecutionResult};
pub use crate::rewrite::{RewriteAnchor, rewrite_update};
pub use crate::session::ConnectionSession;
pub use crate::statement::{CompiledStatement, InsertSource, StatementNode, TableRef};
pub use crate::types::RowValues;

#[cfg(feature = "http")]
pub use crate::gateway::http::HttpTransport;
