mod fake;

use fake::FakeSuperset;
use superset_sync::config::DatabaseConnection;
use superset_sync::model::{Metric, MetricMap, Model};
use superset_sync::superset::RemoteMetric;
use superset_sync::sync::{sync_datasets, SyncOptions};

fn warehouse() -> DatabaseConnection {
    DatabaseConnection::new(1, "postgresql://superset@db.internal/warehouse").unwrap()
}

fn orders() -> Model {
    Model::new("model.shop.orders", "orders", "warehouse", "public")
}

fn map(metrics: Vec<Metric>) -> MetricMap {
    metrics.into_iter().map(|m| (m.name.clone(), m)).collect()
}

const ORDERS_EXTRA: &str = r#"{"unique_id": "model.shop.orders"}"#;

fn hand_made_metric() -> RemoteMetric {
    let mut metric = RemoteMetric::new("p95_amount", "PERCENTILE_CONT(0.95) WITHIN GROUP (ORDER BY amount)");
    metric.verbose_name = Some("P95 amount".to_string());
    metric.d3format = Some(",.2f".to_string());
    metric.warning_text = Some("Maintained by finance".to_string());
    metric
}

async fn sync_orders(client: &FakeSuperset, metrics: &MetricMap) -> i64 {
    let datasets = sync_datasets(
        client,
        &[orders()],
        metrics,
        &warehouse(),
        &SyncOptions::default(),
    )
    .await;
    assert_eq!(datasets.len(), 1);
    datasets[0].id
}

#[tokio::test]
async fn test_remote_only_metric_survives_unchanged() {
    let client = FakeSuperset::new();
    let id = client.seed(1, "orders", Some(ORDERS_EXTRA), vec![hand_made_metric()]);
    let metrics = map(vec![
        Metric::new("revenue", "sum", "amount").depending_on("model.shop.orders")
    ]);

    sync_orders(&client, &metrics).await;

    let stored = client.dataset(id).metrics;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0], hand_made_metric());
    assert_eq!(stored[1].metric_name, "revenue");
}

#[tokio::test]
async fn test_manifest_wins_on_name_collision() {
    let client = FakeSuperset::new();
    let id = client.seed(
        1,
        "orders",
        Some(ORDERS_EXTRA),
        vec![RemoteMetric::new("revenue", "SUM(old_amount)")],
    );
    let metrics = map(vec![
        Metric::new("revenue", "sum", "amount").depending_on("model.shop.orders")
    ]);

    sync_orders(&client, &metrics).await;

    let stored = client.dataset(id).metrics;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].expression, "SUM(amount)");
}

#[tokio::test]
async fn test_collision_with_metric_of_another_model_is_dropped() {
    let client = FakeSuperset::new();
    let id = client.seed(
        1,
        "orders",
        Some(ORDERS_EXTRA),
        vec![RemoteMetric::new("visits", "COUNT(*)")],
    );
    let metrics = map(vec![
        Metric::new("revenue", "sum", "amount").depending_on("model.shop.orders"),
        Metric::new("visits", "count", "session_id").depending_on("model.web.sessions"),
    ]);

    sync_orders(&client, &metrics).await;

    let names: Vec<_> = client
        .dataset(id)
        .metrics
        .into_iter()
        .map(|m| m.metric_name)
        .collect();
    assert_eq!(names, vec!["revenue"]);
}

#[tokio::test]
async fn test_count_metric_is_not_carried_over() {
    let client = FakeSuperset::new();
    let id = client.seed(
        1,
        "orders",
        Some(ORDERS_EXTRA),
        vec![RemoteMetric::new("count", "COUNT(*)"), hand_made_metric()],
    );
    let metrics = map(vec![
        Metric::new("revenue", "sum", "amount").depending_on("model.shop.orders")
    ]);

    sync_orders(&client, &metrics).await;

    let names: Vec<_> = client
        .dataset(id)
        .metrics
        .into_iter()
        .map(|m| m.metric_name)
        .collect();
    assert_eq!(names, vec!["p95_amount", "revenue"]);
}

#[tokio::test]
async fn test_remote_metrics_restored_when_manifest_has_none_for_model() {
    let client = FakeSuperset::new();
    let id = client.seed(1, "orders", Some(ORDERS_EXTRA), vec![hand_made_metric()]);

    sync_orders(&client, &MetricMap::new()).await;

    assert_eq!(client.dataset(id).metrics, vec![hand_made_metric()]);
}

#[tokio::test]
async fn test_repeated_sync_is_stable() {
    let client = FakeSuperset::new();
    let id = client.seed(1, "orders", Some(ORDERS_EXTRA), vec![hand_made_metric()]);
    let metrics = map(vec![
        Metric::new("revenue", "sum", "amount").depending_on("model.shop.orders"),
        Metric::new("orders", "count", "order_id").depending_on("model.shop.orders"),
        Metric::new("aov", "derived", "revenue / orders").with_sub_metrics(["revenue", "orders"]),
    ]);

    sync_orders(&client, &metrics).await;
    let first = client.dataset(id).metrics;
    sync_orders(&client, &metrics).await;
    let second = client.dataset(id).metrics;

    assert_eq!(first, second);
    let names: Vec<_> = second.iter().map(|m| m.metric_name.as_str()).collect();
    assert_eq!(names, vec!["p95_amount", "aov", "orders", "revenue"]);
    assert_eq!(second[1].expression, "SUM(amount) / COUNT(order_id)");
}

#[tokio::test]
async fn test_metric_overrides_are_applied() {
    let client = FakeSuperset::new();
    let mut revenue = Metric::new("revenue", "sum", "amount")
        .with_description("Gross revenue")
        .depending_on("model.shop.orders");
    revenue.meta.superset.d3format = Some("$,.0f".to_string());
    revenue.meta.superset.description = Some("Revenue before refunds".to_string());
    let metrics = map(vec![revenue]);

    let id = sync_orders(&client, &metrics).await;

    let stored = client.dataset(id).metrics;
    assert_eq!(stored[0].d3format.as_deref(), Some("$,.0f"));
    assert_eq!(stored[0].description.as_deref(), Some("Revenue before refunds"));
    assert_eq!(stored[0].metric_type.as_deref(), Some("sum"));
}
