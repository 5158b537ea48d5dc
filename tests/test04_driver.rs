mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use clickhouse_middleware::prelude::*;
use clickhouse_middleware::TransportFactory;
use common::RecordingTransport;
use tokio::runtime::Runtime;

fn counting_factory(built: Arc<AtomicUsize>) -> TransportFactory {
    Arc::new(move |_options: &ClickhouseOptions| {
        built.fetch_add(1, Ordering::SeqCst);
        Ok::<_, SqlMiddlewareDbError>(
            Arc::new(RecordingTransport::new()) as Arc<dyn ClickhouseTransport>
        )
    })
}

#[test]
fn each_acquire_builds_a_fresh_session() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let built = Arc::new(AtomicUsize::new(0));
        let dialect = ClickhouseDialect::new(
            ClickhouseOptions::builder("http://clickhouse:8123")
                .database("analytics")
                .finish(),
        );
        let driver = dialect.create_driver_with(counting_factory(built.clone()));
        driver.init().await?;

        let first = driver.acquire_connection().await?;
        let second = driver.acquire_connection().await?;
        assert_eq!(built.load(Ordering::SeqCst), 2);
        assert_ne!(first.session().id(), second.session().id());

        assert!(matches!(
            driver.begin_transaction(&first).await,
            Err(SqlMiddlewareDbError::Unsupported(_))
        ));
        assert!(matches!(
            driver.commit_transaction(&first).await,
            Err(SqlMiddlewareDbError::Unsupported(_))
        ));
        assert!(matches!(
            driver.rollback_transaction(&second).await,
            Err(SqlMiddlewareDbError::Unsupported(_))
        ));

        driver.release_connection(first).await?;
        driver.release_connection(second).await?;
        driver.destroy().await?;
        Ok::<(), SqlMiddlewareDbError>(())
    })?;
    Ok(())
}

#[test]
fn init_rejects_bad_options() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let built = Arc::new(AtomicUsize::new(0));
        let driver = ClickhouseDriver::with_transport_factory(
            ClickhouseOptions::new("tcp://clickhouse:9000".into()),
            counting_factory(built),
        );
        assert!(matches!(
            driver.init().await,
            Err(SqlMiddlewareDbError::ConfigError(_))
        ));
    });
    Ok(())
}

#[test]
fn http_driver_builds_http_transport() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let driver = ClickhouseDialect::new(ClickhouseOptions::default()).create_driver();
        driver.init().await?;
        // no request is sent until a statement runs
        let conn = driver.acquire_connection().await?;
        driver.release_connection(conn).await
    })?;
    Ok(())
}
