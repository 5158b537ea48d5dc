use std::sync::Arc;

use crate::config::ClickhouseOptions;
use crate::connection::ClickhouseConnection;
use crate::error::SqlMiddlewareDbError;
use crate::gateway::ClickhouseTransport;

/// Builds the transport for a newly acquired connection.
pub type TransportFactory = Arc<
    dyn Fn(&ClickhouseOptions) -> Result<Arc<dyn ClickhouseTransport>, SqlMiddlewareDbError>
        + Send
        + Sync,
>;

/// Hands out connections; each acquisition gets its own transport and session token.
#[derive(Clone)]
pub struct ClickhouseDriver {
    options: ClickhouseOptions,
    factory: TransportFactory,
}

impl ClickhouseDriver {
    /// Driver backed by the HTTP transport.
    #[cfg(feature = "http")]
    #[must_use]
    pub fn new(options: ClickhouseOptions) -> Self {
        let factory: TransportFactory = Arc::new(|options: &ClickhouseOptions| {
            let transport = crate::gateway::http::HttpTransport::new(options)?;
            Ok::<_, SqlMiddlewareDbError>(Arc::new(transport) as Arc<dyn ClickhouseTransport>)
        });
        Self::with_transport_factory(options, factory)
    }

    pub fn with_transport_factory(options: ClickhouseOptions, factory: TransportFactory) -> Self {
        Self { options, factory }
    }

    #[must_use]
    pub fn options(&self) -> &ClickhouseOptions {
        &self.options
    }

    /// Check the options; there is nothing else to set up.
    ///
    /// # Errors
    /// Returns `SqlMiddlewareDbError::ConfigError` for invalid options.
    #[allow(clippy::unused_async)]
    pub async fn init(&self) -> Result<(), SqlMiddlewareDbError> {
        self.options.validate()
    }

    /// Open a connection with a fresh transport and session token.
    ///
    /// # Errors
    /// Returns whatever the transport factory fails with.
    #[allow(clippy::unused_async)]
    pub async fn acquire_connection(&self) -> Result<ClickhouseConnection, SqlMiddlewareDbError> {
        let transport = (self.factory)(&self.options)?;
        let connection = ClickhouseConnection::new(transport);
        tracing::debug!(session = %connection.session().id(), "clickhouse connection acquired");
        Ok(connection)
    }

    /// Drop the connection together with its transport and session.
    ///
    /// # Errors
    /// Never fails; the signature matches the other lifecycle calls.
    #[allow(clippy::unused_async)]
    pub async fn release_connection(
        &self,
        connection: ClickhouseConnection,
    ) -> Result<(), SqlMiddlewareDbError> {
        tracing::debug!(session = %connection.session().id(), "clickhouse connection released");
        drop(connection);
        Ok(())
    }

    /// # Errors
    /// Always returns `SqlMiddlewareDbError::Unsupported`.
    pub async fn begin_transaction(
        &self,
        connection: &ClickhouseConnection,
    ) -> Result<(), SqlMiddlewareDbError> {
        connection.begin_transaction().await
    }

    /// # Errors
    /// Always returns `SqlMiddlewareDbError::Unsupported`.
    pub async fn commit_transaction(
        &self,
        connection: &ClickhouseConnection,
    ) -> Result<(), SqlMiddlewareDbError> {
        connection.commit_transaction().await
    }

    /// # Errors
    /// Always returns `SqlMiddlewareDbError::Unsupported`.
    pub async fn rollback_transaction(
        &self,
        connection: &ClickhouseConnection,
    ) -> Result<(), SqlMiddlewareDbError> {
        connection.rollback_transaction().await
    }

    /// # Errors
    /// Never fails.
    #[allow(clippy::unused_async)]
    pub async fn destroy(&self) -> Result<(), SqlMiddlewareDbError> {
        Ok(())
    }
}

impl std::fmt::Debug for ClickhouseDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickhouseDriver")
            .field("options", &self.options)
            .field("factory", &"<TransportFactory>")
            .finish()
    }
}
