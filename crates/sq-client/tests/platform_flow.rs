//! Integration tests for the discovery and SQL wrappers against a mock
//! platform API.

use std::sync::Arc;

use chrono::DateTime;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sq_auth::{AuthConfig, AuthError, MemorySessionStore, Session, SessionStore};
use sq_client::{ClientError, PlatformClient};

fn config_for(server: &MockServer) -> AuthConfig {
    AuthConfig::new(server.uri().parse().unwrap(), "user1", "abc", "code1")
}

fn stored_session() -> Session {
    Session {
        access_token: "AT1".to_string(),
        refresh_token: "RT1".to_string(),
        access_token_expires: DateTime::from_timestamp_millis(300_000).unwrap(),
        refresh_token_expires: DateTime::from_timestamp_millis(86_400_000).unwrap(),
    }
}

async fn seeded_client(server: &MockServer) -> PlatformClient {
    let store = Arc::new(MemorySessionStore::new());
    store.save(&stored_session()).await.unwrap();
    PlatformClient::new(&config_for(server), store).unwrap()
}

/// Test that discovery calls present the stored access token
#[tokio::test]
async fn test_discovery_presents_the_stored_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/discover/namespace"))
        .and(header("Authorization", "Bearer AT1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([{"namespace": "NS1"}])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = seeded_client(&mock_server).await;
    let namespaces = client.namespaces().await.unwrap();

    assert_eq!(namespaces[0]["namespace"], "NS1");
}

/// Test that the table listing passes scope and namespace through
#[tokio::test]
async fn test_tables_passes_scope_and_namespace() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/discover/table"))
        .and(query_param("scope", "ALL"))
        .and(query_param("namespace", "NS1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = seeded_client(&mock_server).await;
    client.tables("ALL", "NS1").await.unwrap();
}

/// Test that key reference lookups pass table, column and namespace
#[tokio::test]
async fn test_reference_lookup_passes_all_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/discover/refs/foreignkey"))
        .and(query_param("table", "TAB1"))
        .and(query_param("namespace", "NS1"))
        .and(query_param("column", "ID"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = seeded_client(&mock_server).await;
    client
        .foreign_key_references("TAB1", "ID", "NS1")
        .await
        .unwrap();
}

/// Test that DQL uppercases the resource id, passes the SQL text verbatim
/// and carries the biscuit capability token
#[tokio::test]
async fn test_dql_carries_biscuit_and_row_count() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sql/dql"))
        .and(header("Authorization", "Bearer AT1"))
        .and(header("Biscuit", "B1"))
        .and(body_json(serde_json::json!({
            "resourceId": "NS1.TAB1",
            "sqlText": "select * from ns1.tab1",
            "rowCount": 5,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{"ID": 1}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = seeded_client(&mock_server).await;
    let rows = client
        .dql("ns1.tab1", "select * from ns1.tab1", "B1", Some(5))
        .await
        .unwrap();

    assert_eq!(rows[0]["ID"], 1);
}

/// Test that an absent or zero row count is omitted from the payload
#[tokio::test]
async fn test_dql_omits_row_count_to_fetch_everything() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sql/dql"))
        .and(body_json(serde_json::json!({
            "resourceId": "NS1.TAB1",
            "sqlText": "select * from ns1.tab1",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = seeded_client(&mock_server).await;
    client
        .dql("ns1.tab1", "select * from ns1.tab1", "B1", None)
        .await
        .unwrap();
    client
        .dql("ns1.tab1", "select * from ns1.tab1", "B1", Some(0))
        .await
        .unwrap();
}

/// Test that schema creation sends neither a resource id nor a biscuit
#[tokio::test]
async fn test_create_schema_is_bare() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sql/ddl"))
        .and(body_json(serde_json::json!({"sqlText": "CREATE SCHEMA NS1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = seeded_client(&mock_server).await;
    client.create_schema("CREATE SCHEMA NS1").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("biscuit"));
}

/// Test that table creation appends the ownership clause
#[tokio::test]
async fn test_create_table_appends_the_ownership_clause() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sql/ddl"))
        .and(header("Biscuit", "B1"))
        .and(body_json(serde_json::json!({
            "resourceId": "NS1.TAB1",
            "sqlText":
                "CREATE TABLE NS1.TAB1 (ID INT) WITH \"public_key=PK1,access_type=permissioned\"",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = seeded_client(&mock_server).await;
    client
        .ddl_create_table(
            "ns1.tab1",
            "CREATE TABLE NS1.TAB1 (ID INT)",
            "permissioned",
            "PK1",
            "B1",
        )
        .await
        .unwrap();
}

/// Test that view parameters are packed into a single query value
#[tokio::test]
async fn test_execute_view_packs_params_into_one_query_value() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sql/views/sales_report"))
        .and(query_param("params", "start=2024&end=2025"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = seeded_client(&mock_server).await;
    client
        .execute_view("sales_report", &[("start", "2024"), ("end", "2025")])
        .await
        .unwrap();
}

/// Test that a view without parameters gets a bare URL
#[tokio::test]
async fn test_execute_view_without_params_has_no_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sql/views/sales_report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = seeded_client(&mock_server).await;
    client.execute_view("sales_report", &[]).await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

/// Test that a rejected token maps to the unauthorized error
#[tokio::test]
async fn test_token_rejection_is_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sql/dml"))
        .respond_with(ResponseTemplate::new(401).set_body_string("access token expired"))
        .mount(&mock_server)
        .await;

    let client = seeded_client(&mock_server).await;
    let err = client
        .dml("ns1.tab1", "DELETE FROM ns1.tab1", "B1")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized { .. }));
}

/// Test that a missing session surfaces before any request goes out
#[tokio::test]
async fn test_missing_session_fails_before_any_request() {
    let mock_server = MockServer::start().await;

    let client = PlatformClient::new(
        &config_for(&mock_server),
        Arc::new(MemorySessionStore::new()),
    )
    .unwrap();

    let err = client.namespaces().await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Auth(AuthError::SessionNotFound)
    ));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

/// Test that a malformed resource id never reaches the network
#[tokio::test]
async fn test_invalid_resource_id_fails_before_any_request() {
    let mock_server = MockServer::start().await;

    let client = seeded_client(&mock_server).await;
    let err = client
        .dml("ns1.tab1; DROP TABLE x", "DELETE FROM ns1.tab1", "B1")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation { .. }));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
