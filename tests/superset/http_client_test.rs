//! HTTP client tests against a wiremock Superset.

use serde_json::json;
use superset_sync::superset::{
    DatasetUpdate, HttpClient, NewDataset, RemoteError, RemoteMetric, SupersetClient,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn list_q(page: usize) -> String {
    format!(
        "(filters:!((col:database,opr:rel_o_m,value:1),(col:table_name,opr:eq,value:'orders')),page:{page},page_size:100)"
    )
}

#[tokio::test]
async fn test_find_datasets_sends_filters_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dataset/"))
        .and(query_param("q", list_q(0)))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "result": [{
                "id": 5,
                "table_name": "orders",
                "schema": "public",
                "extra": "{\"unique_id\": \"model.shop.orders\"}",
                "database": {"id": 1, "database_name": "warehouse"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri(), Some("secret")).unwrap();
    let found = client.find_datasets(1, "orders").await.unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 5);
    assert_eq!(found[0].unique_id().as_deref(), Some("model.shop.orders"));
}

#[tokio::test]
async fn test_find_datasets_follows_pages() {
    let server = MockServer::start().await;
    let page = |ids: std::ops::Range<i64>| {
        let result: Vec<_> = ids
            .map(|id| json!({"id": id, "table_name": "orders"}))
            .collect();
        json!({"count": 150, "result": result})
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/dataset/"))
        .and(query_param("q", list_q(0)))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(0..100)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dataset/"))
        .and(query_param("q", list_q(1)))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(100..150)))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri(), None).unwrap();
    let found = client.find_datasets(1, "orders").await.unwrap();

    assert_eq!(found.len(), 150);
    assert_eq!(found[149].id, 149);
}

#[tokio::test]
async fn test_get_dataset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/superset/api/v1/dataset/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "result": {
                "table_name": "orders",
                "owners": [],
                "metrics": [{
                    "id": 11,
                    "metric_name": "count",
                    "expression": "COUNT(*)",
                    "changed_on": "2024-01-01T00:00:00"
                }],
                "columns": [
                    {"column_name": "amount", "is_dttm": false, "type": "NUMERIC"},
                    {"column_name": "ordered_at", "is_dttm": true, "type": "TIMESTAMP"}
                ]
            }
        })))
        .mount(&server)
        .await;

    let client = HttpClient::new(&format!("{}/superset", server.uri()), None).unwrap();
    let detail = client.get_dataset(5).await.unwrap();

    assert_eq!(detail.id, 5);
    assert_eq!(detail.metrics, vec![RemoteMetric::new("count", "COUNT(*)")]);
    assert_eq!(detail.columns.len(), 2);
    assert!(detail.columns[1].is_dttm);
    assert_eq!(detail.columns[0].data_type.as_deref(), Some("NUMERIC"));
}

#[tokio::test]
async fn test_create_dataset() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/dataset/"))
        .and(body_json(json!({
            "database": 1,
            "schema": "tracking",
            "table_name": "events",
            "sql": "SELECT * FROM \"raw\".\"tracking\".\"events\""
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 9,
            "result": {"database": 1, "schema": "tracking", "table_name": "events"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri(), None).unwrap();
    let created = client
        .create_dataset(&NewDataset {
            database: 1,
            schema: "tracking".to_string(),
            table_name: "events".to_string(),
            sql: Some("SELECT * FROM \"raw\".\"tracking\".\"events\"".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(created.id, 9);
    assert_eq!(created.table_name, "events");
    assert_eq!(created.schema.as_deref(), Some("tracking"));
}

#[tokio::test]
async fn test_update_dataset_passes_override_flag() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/v1/dataset/9"))
        .and(query_param("override_columns", "false"))
        .and(body_json(json!({
            "metrics": [{"metric_name": "revenue", "expression": "SUM(amount)"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 9, "result": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri(), None).unwrap();
    let update = DatasetUpdate::metrics(vec![RemoteMetric::new("revenue", "SUM(amount)")]);
    client.update_dataset(9, false, &update).await.unwrap();
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/dataset/404"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"message\": \"Not found\"}"))
        .mount(&server)
        .await;

    let client = HttpClient::new(&server.uri(), None).unwrap();
    let err = client.get_dataset(404).await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    match err {
        RemoteError::Status { method, body, .. } => {
            assert_eq!(method, "GET");
            assert!(body.contains("Not found"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_invalid_base_url() {
    assert!(matches!(
        HttpClient::new("not a url", None),
        Err(RemoteError::InvalidUrl(_))
    ));
}
