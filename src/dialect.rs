//! Capabilities and factories a host query builder asks of a backend.

use crate::config::ClickhouseOptions;
use crate::driver::ClickhouseDriver;
use crate::error::SqlMiddlewareDbError;

/// ClickHouse capability flags and migration-lock hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickhouseAdapter;

impl ClickhouseAdapter {
    /// DDL is applied immediately and cannot be rolled back.
    #[must_use]
    pub fn supports_transactional_ddl(&self) -> bool {
        false
    }

    #[must_use]
    pub fn supports_returning(&self) -> bool {
        true
    }

    /// ClickHouse has no lock primitive to hold; migrations run unguarded.
    ///
    /// # Errors
    /// Never fails.
    #[allow(clippy::unused_async)]
    pub async fn acquire_migration_lock(&self) -> Result<(), SqlMiddlewareDbError> {
        Ok(())
    }

    /// # Errors
    /// Never fails.
    #[allow(clippy::unused_async)]
    pub async fn release_migration_lock(&self) -> Result<(), SqlMiddlewareDbError> {
        Ok(())
    }
}

/// Entry point that wires options to a driver and an adapter.
#[derive(Debug, Clone)]
pub struct ClickhouseDialect {
    options: ClickhouseOptions,
}

impl ClickhouseDialect {
    #[must_use]
    pub fn new(options: ClickhouseOptions) -> Self {
        Self { options }
    }

    #[must_use]
    pub fn options(&self) -> &ClickhouseOptions {
        &self.options
    }

    #[cfg(feature = "http")]
    #[must_use]
    pub fn create_driver(&self) -> ClickhouseDriver {
        ClickhouseDriver::new(self.options.clone())
    }

    #[must_use]
    pub fn create_driver_with(&self, factory: crate::driver::TransportFactory) -> ClickhouseDriver {
        ClickhouseDriver::with_transport_factory(self.options.clone(), factory)
    }

    #[must_use]
    pub fn create_adapter(&self) -> ClickhouseAdapter {
        ClickhouseAdapter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::runtime::Runtime;

    #[test]
    fn adapter_flags_and_locks() -> Result<(), Box<dyn std::error::Error>> {
        let dialect = ClickhouseDialect::new(ClickhouseOptions::default());
        let adapter = dialect.create_adapter();
        assert!(!adapter.supports_transactional_ddl());
        assert!(adapter.supports_returning());

        let rt = Runtime::new()?;
        rt.block_on(async {
            adapter.acquire_migration_lock().await?;
            adapter.release_migration_lock().await
        })?;
        Ok(())
    }
}
