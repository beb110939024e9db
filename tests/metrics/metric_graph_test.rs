use superset_sync::metrics::{MetricError, MetricGraph};
use superset_sync::model::{Metric, MetricMap};

fn map(metrics: Vec<Metric>) -> MetricMap {
    metrics.into_iter().map(|m| (m.name.clone(), m)).collect()
}

fn names(metrics: Vec<&Metric>) -> Vec<&str> {
    metrics.into_iter().map(|m| m.name.as_str()).collect()
}

fn two_model_metrics() -> MetricMap {
    map(vec![
        Metric::new("revenue", "sum", "amount").depending_on("model.shop.orders"),
        Metric::new("refunds", "sum", "amount").depending_on("model.shop.refunds"),
        Metric::new("visits", "count", "session_id").depending_on("model.web.sessions"),
        Metric::new("net_revenue", "derived", "revenue - refunds")
            .with_sub_metrics(["revenue", "refunds"]),
        Metric::new("net_per_visit", "derived", "net_revenue / visits")
            .with_sub_metrics(["net_revenue", "visits"]),
    ])
}

#[test]
fn test_direct_dependency() {
    let metrics = two_model_metrics();
    let graph = MetricGraph::build(&metrics);

    let deps = graph.model_dependencies("revenue").unwrap();
    assert_eq!(deps.into_iter().collect::<Vec<_>>(), vec!["model.shop.orders"]);
}

#[test]
fn test_transitive_dependencies() {
    let metrics = two_model_metrics();
    let graph = MetricGraph::build(&metrics);

    let deps = graph.model_dependencies("net_per_visit").unwrap();
    assert_eq!(
        deps.into_iter().collect::<Vec<_>>(),
        vec!["model.shop.orders", "model.shop.refunds", "model.web.sessions"]
    );
}

#[test]
fn test_metrics_for_model_includes_derived() {
    let metrics = two_model_metrics();
    let graph = MetricGraph::build(&metrics);

    assert_eq!(
        names(graph.metrics_for_model("model.shop.orders").unwrap()),
        vec!["net_per_visit", "net_revenue", "revenue"]
    );
    assert_eq!(
        names(graph.metrics_for_model("model.web.sessions").unwrap()),
        vec!["net_per_visit", "visits"]
    );
    assert!(graph.metrics_for_model("model.shop.customers").unwrap().is_empty());
}

#[test]
fn test_acyclic_graph_validates() {
    let metrics = two_model_metrics();
    let graph = MetricGraph::build(&metrics);

    assert!(graph.detect_cycles().is_empty());
    assert_eq!(graph.validate(), Ok(()));
}

#[test]
fn test_two_metric_cycle() {
    let metrics = map(vec![
        Metric::new("a", "derived", "b + 1").with_sub_metrics(["b"]),
        Metric::new("b", "derived", "a * 2").with_sub_metrics(["a"]),
        Metric::new("c", "sum", "x").depending_on("model.p.t"),
    ]);
    let graph = MetricGraph::build(&metrics);

    assert_eq!(
        graph.detect_cycles(),
        vec![vec!["a".to_string(), "b".to_string()]]
    );
    assert_eq!(
        graph.validate(),
        Err(MetricError::CyclicDependency {
            path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        })
    );

    // Walking a cycle terminates.
    assert_eq!(
        graph.metrics_for_model("model.p.t").unwrap().len(),
        1
    );
}

#[test]
fn test_dangling_sub_metric() {
    let metrics = map(vec![
        Metric::new("ratio", "derived", "revenue / ghost").with_sub_metrics(["revenue", "ghost"]),
        Metric::new("revenue", "sum", "amount").depending_on("model.shop.orders"),
    ]);
    let graph = MetricGraph::build(&metrics);

    assert_eq!(
        graph.validate(),
        Err(MetricError::UnknownMetric("ghost".to_string()))
    );
    assert_eq!(
        graph.model_dependencies("ratio"),
        Err(MetricError::UnknownMetric("ghost".to_string()))
    );
    assert_eq!(
        graph.model_dependencies("nope"),
        Err(MetricError::UnknownMetric("nope".to_string()))
    );
}
