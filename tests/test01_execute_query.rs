mod common;

use std::sync::Arc;

use clickhouse_middleware::gateway::WAIT_END_OF_QUERY;
use clickhouse_middleware::prelude::*;
use common::{Recorded, RecordingTransport};
use serde_json::json;
use tokio::runtime::Runtime;

fn metric_columns() -> Vec<String> {
    vec!["company_id".into(), "date".into(), "mrr".into()]
}

fn literal_insert(rows: Vec<Vec<RowValues>>) -> CompiledStatement {
    let tuples = vec!["(?, ?, ?)"; rows.len()].join(", ");
    CompiledStatement::insert(
        format!("insert into `company_metrics` (`company_id`, `date`, `mrr`) values {tuples}"),
        rows.concat(),
        TableRef::new("company_metrics"),
        metric_columns(),
        Some(InsertSource::Values(rows)),
    )
}

fn metric_row(id: i64, mrr: i64) -> Vec<RowValues> {
    vec![
        RowValues::Int(id),
        RowValues::Text("2025-04-15".into()),
        RowValues::Int(mrr),
    ]
}

#[test]
fn literal_insert_goes_through_bulk_insert() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let transport = Arc::new(RecordingTransport::new().with_insert_written(2));
        let conn = ClickhouseConnection::new(transport.clone());

        let stmt = literal_insert(vec![metric_row(1, 100), metric_row(2, 200)]);
        let result = conn.execute_query(&stmt).await?;

        assert!(result.rows.is_empty());
        assert_eq!(result.affected_rows, Some(2));
        assert_eq!(result.changed_rows, Some(2));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        let Recorded::Insert(request) = &calls[0] else {
            panic!("expected bulk insert, got {:?}", calls[0]);
        };
        assert_eq!(request.table.qualified(), "company_metrics");
        assert_eq!(request.columns, metric_columns());
        assert_eq!(request.rows, vec![metric_row(1, 100), metric_row(2, 200)]);
        Ok::<(), SqlMiddlewareDbError>(())
    })?;
    Ok(())
}

#[test]
fn literal_insert_counts_submitted_rows_without_summary() -> Result<(), Box<dyn std::error::Error>>
{
    let rt = Runtime::new()?;
    rt.block_on(async {
        for n in 1..=5_i64 {
            let transport = Arc::new(RecordingTransport::new());
            let conn = ClickhouseConnection::new(transport);
            let rows = (0..n).map(|i| metric_row(i, i * 10)).collect();
            let result = conn.execute_query(&literal_insert(rows)).await?;
            let expected = u64::try_from(n).unwrap();
            assert_eq!(result.affected_rows, Some(expected));
            assert_eq!(result.changed_rows, Some(expected));
        }
        Ok::<(), SqlMiddlewareDbError>(())
    })?;
    Ok(())
}

#[test]
fn subselect_insert_is_a_named_parameter_command() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let transport = Arc::new(RecordingTransport::new());
        let conn = ClickhouseConnection::new(transport.clone());

        let stmt = CompiledStatement::insert(
            "insert into `company_metrics` (`company_id`, `date`, `mrr`) select ?, `date`, `mrr` + ? from `company_metrics`",
            vec![RowValues::Int(3), RowValues::Int(300)],
            TableRef::new("company_metrics"),
            metric_columns(),
            Some(InsertSource::Select),
        );
        let result = conn.execute_query(&stmt).await?;

        assert!(result.rows.is_empty());
        assert_eq!(result.affected_rows, None);
        assert_eq!(result.changed_rows, None);

        let calls = transport.calls();
        let Recorded::Command(request) = &calls[0] else {
            panic!("expected command, got {:?}", calls[0]);
        };
        assert_eq!(
            request.sql,
            "insert into `company_metrics` (`company_id`, `date`, `mrr`) select {p0:UInt64}, `date`, `mrr` + {p1:UInt64} from `company_metrics`"
        );
        let params = request.params.as_ref().expect("named params");
        assert_eq!(params.get("p0"), Some(&RowValues::Int(3)));
        assert_eq!(params.get("p1"), Some(&RowValues::Int(300)));
        assert_eq!(calls[0].setting(WAIT_END_OF_QUERY.0), Some("1"));
        Ok::<(), SqlMiddlewareDbError>(())
    })?;
    Ok(())
}

#[test]
fn update_runs_as_alter_table_query() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let transport = Arc::new(RecordingTransport::new());
        let conn = ClickhouseConnection::new(transport.clone());

        let stmt = CompiledStatement::update(
            "UPDATE company_metrics SET mrr = ? WHERE company_id = ? AND date = ?",
            vec![
                RowValues::Int(300),
                RowValues::Int(1),
                RowValues::Text("2025-04-15".into()),
            ],
            TableRef::new("company_metrics"),
        );
        let result = conn.execute_query(&stmt).await?;
        assert!(result.rows.is_empty());
        assert_eq!(result.affected_rows, None);

        let calls = transport.calls();
        let Recorded::Query(request) = &calls[0] else {
            panic!("expected query, got {:?}", calls[0]);
        };
        assert_eq!(
            request.sql,
            "ALTER TABLE company_metrics UPDATE mrr = 300 WHERE company_id = 1 AND date = '2025-04-15'"
        );
        assert!(request.params.is_none());
        Ok::<(), SqlMiddlewareDbError>(())
    })?;
    Ok(())
}

#[test]
fn select_rows_are_mapped_in_engine_order() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let transport = Arc::new(RecordingTransport::new().with_rows(vec![
            json!({"id": 1, "name": "alpha", "score": 1.5}),
            json!({"id": 2, "name": "beta", "score": null}),
        ]));
        let conn = ClickhouseConnection::new(transport.clone());

        let stmt = CompiledStatement::select(
            "select id, name, score from test where name <> ?",
            vec![RowValues::Text("it's".into())],
        );
        let result = conn.execute_query(&stmt).await?;

        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.affected_rows, None);
        assert_eq!(result.rows[0].column_names.as_slice(), ["id", "name", "score"]);
        assert_eq!(result.rows[0].get("score"), Some(&RowValues::Float(1.5)));
        assert_eq!(result.rows[1].get("name"), Some(&RowValues::Text("beta".into())));
        assert_eq!(result.rows[1].get("score"), Some(&RowValues::Null));

        let Recorded::Query(request) = &transport.calls()[0] else {
            panic!("expected query");
        };
        assert_eq!(request.sql, r"select id, name, score from test where name <> 'it\'s'");
        Ok::<(), SqlMiddlewareDbError>(())
    })?;
    Ok(())
}

#[test]
fn opaque_insert_reads_written_rows_from_summary() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let transport = Arc::new(
            RecordingTransport::new().with_summary(r#"{"read_rows":"4","written_rows":"4"}"#),
        );
        let conn = ClickhouseConnection::new(transport.clone());

        let stmt = CompiledStatement::insert(
            "insert into archive select * from company_metrics where date < ?",
            vec![RowValues::Text("2025-01-01".into())],
            TableRef::new("archive"),
            Vec::new(),
            None,
        );
        let result = conn.execute_query(&stmt).await?;
        assert_eq!(result.affected_rows, Some(4));
        assert_eq!(result.changed_rows, Some(4));

        let Recorded::Query(request) = &transport.calls()[0] else {
            panic!("expected query");
        };
        assert_eq!(
            request.sql,
            "insert into archive select * from company_metrics where date < '2025-01-01'"
        );
        Ok::<(), SqlMiddlewareDbError>(())
    })?;
    Ok(())
}

#[test]
fn other_statements_wait_for_completion() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let transport = Arc::new(RecordingTransport::new());
        let conn = ClickhouseConnection::new(transport.clone());

        let stmt = CompiledStatement::other(
            "create table test (id UInt64, name String) engine = MergeTree order by id",
        );
        let result = conn.execute_query(&stmt).await?;
        assert_eq!(result, ExecutionResult::empty());

        let calls = transport.calls();
        assert!(matches!(calls[0], Recorded::Command(_)));
        assert_eq!(calls[0].setting(WAIT_END_OF_QUERY.0), Some("1"));
        Ok::<(), SqlMiddlewareDbError>(())
    })?;
    Ok(())
}

#[test]
fn unsupported_parameter_kind_fails_before_sending() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let transport = Arc::new(RecordingTransport::new());
        let conn = ClickhouseConnection::new(transport.clone());

        let stmt = CompiledStatement::select(
            "select * from test where flag = ?",
            vec![RowValues::Bool(true)],
        );
        let err = conn.execute_query(&stmt).await.unwrap_err();
        assert!(matches!(err, SqlMiddlewareDbError::RenderingError { kind: "bool" }));
        assert!(transport.calls().is_empty());
        Ok::<(), SqlMiddlewareDbError>(())
    })?;
    Ok(())
}

#[test]
fn server_errors_propagate_unchanged() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let transport = Arc::new(RecordingTransport::new().failing(404, "Code: 60. Table missing"));
        let conn = ClickhouseConnection::new(transport.clone());

        let err = conn
            .execute_query(&CompiledStatement::select("select * from missing", Vec::new()))
            .await
            .unwrap_err();
        match err {
            SqlMiddlewareDbError::ServerError { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Code: 60. Table missing");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(transport.calls().len(), 1);
        Ok::<(), SqlMiddlewareDbError>(())
    })?;
    Ok(())
}
