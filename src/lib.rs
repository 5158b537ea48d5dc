//! Translation layer between an OLTP-shaped query surface and ClickHouse.
//!
//! Compiled statements with positional `?` placeholders are classified, rendered the way
//! ClickHouse accepts them for that statement kind, and sent over one of three verbs
//! (bulk insert, query, command). Results come back as uniform [`ExecutionResult`]s.
//!
//! ```rust,no_run
//! use clickhouse_middleware::prelude::*;
//!
//! # async fn run() -> Result<(), SqlMiddlewareDbError> {
//! let options = ClickhouseOptions::builder("http://localhost:8123")
//!     .database("analytics")
//!     .finish();
//! let driver = ClickhouseDialect::new(options).create_driver();
//! let conn = driver.acquire_connection().await?;
//!
//! let stmt = CompiledStatement::select(
//!     "select * from company_metrics where company_id = ?",
//!     vec![RowValues::Int(1)],
//! );
//! let result = conn.execute_query(&stmt).await?;
//! println!("{} rows", result.rows.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connection;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod gateway;
pub mod plan;
pub mod prelude;
pub mod render;
pub mod results;
pub mod rewrite;
pub mod session;
pub mod statement;
pub mod types;

pub use config::{ClickhouseOptions, ClickhouseOptionsBuilder};
pub use connection::{ClickhouseConnection, ResultStream};
pub use dialect::{ClickhouseAdapter, ClickhouseDialect};
pub use driver::{ClickhouseDriver, TransportFactory};
pub use error::SqlMiddlewareDbError;
pub use results::{CustomDbRow, ExecutionResult};
pub use statement::CompiledStatement;
pub use types::RowValues;
