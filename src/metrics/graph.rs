//! Metric dependency graph.
//!
//! Edges point from a metric to the sub-metrics it is composed from. The
//! graph answers two questions for the sync: which models a metric is
//! ultimately computed from, and whether the manifest contains reference
//! loops or dangling sub-metric names.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use std::collections::{BTreeSet, HashMap};

use super::error::{MetricError, MetricResult};
use crate::model::{Metric, MetricMap};

/// Directed graph over a metric map.
#[derive(Debug, Clone)]
pub struct MetricGraph<'a> {
    metrics: &'a MetricMap,
    graph: DiGraph<&'a str, ()>,
    index: HashMap<&'a str, NodeIndex>,
    /// (metric, missing sub-metric) pairs.
    dangling: Vec<(&'a str, &'a str)>,
}

impl<'a> MetricGraph<'a> {
    /// Build the graph. Sub-metric names with no definition are recorded, not fatal.
    pub fn build(metrics: &'a MetricMap) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for name in metrics.keys() {
            let idx = graph.add_node(name.as_str());
            index.insert(name.as_str(), idx);
        }

        let mut dangling = Vec::new();
        for (name, metric) in metrics {
            let from = index[name.as_str()];
            for sub in metric.sub_metric_names() {
                match index.get(sub) {
                    Some(&to) => {
                        graph.update_edge(from, to, ());
                    }
                    None => dangling.push((name.as_str(), sub)),
                }
            }
        }

        Self {
            metrics,
            graph,
            index,
            dangling,
        }
    }

    /// Every reference loop, each as the list of metric names involved.
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                // A single node is only a cycle if it has a self-loop
                scc.len() > 1
                    || self
                        .graph
                        .edges_connecting(scc[0], scc[0])
                        .next()
                        .is_some()
            })
            .map(|scc| {
                let mut names: Vec<String> = scc
                    .into_iter()
                    .map(|idx| self.graph[idx].to_string())
                    .collect();
                names.sort();
                names
            })
            .collect()
    }

    /// Check that every sub-metric exists and there are no loops.
    pub fn validate(&self) -> MetricResult<()> {
        if let Some((_, missing)) = self.dangling.first() {
            return Err(MetricError::UnknownMetric((*missing).to_string()));
        }

        if let Some(mut cycle) = self.detect_cycles().into_iter().next() {
            if let Some(first) = cycle.first().cloned() {
                cycle.push(first);
            }
            return Err(MetricError::CyclicDependency { path: cycle });
        }

        Ok(())
    }

    /// Model unique ids a metric is computed from, directly or through its sub-metrics.
    pub fn model_dependencies(&self, name: &str) -> MetricResult<BTreeSet<&'a str>> {
        let (models, missing) = self.closure(name)?;
        match missing {
            Some(missing) => Err(MetricError::UnknownMetric(missing.to_string())),
            None => Ok(models),
        }
    }

    /// Metrics that belong to a model, in name order.
    ///
    /// A metric with a dangling sub-metric only fails the models its
    /// resolvable part reaches; other models never see it.
    pub fn metrics_for_model(&self, unique_id: &str) -> MetricResult<Vec<&'a Metric>> {
        let mut result = Vec::new();
        for (name, metric) in self.metrics {
            let (models, missing) = self.closure(name)?;
            if !models.contains(unique_id) {
                continue;
            }
            if let Some(missing) = missing {
                return Err(MetricError::UnknownMetric(missing.to_string()));
            }
            result.push(metric);
        }
        Ok(result)
    }

    /// Models reachable from a metric, plus the first undefined sub-metric met
    /// on the way.
    fn closure(&self, name: &str) -> MetricResult<(BTreeSet<&'a str>, Option<&'a str>)> {
        let start = *self
            .index
            .get(name)
            .ok_or_else(|| MetricError::UnknownMetric(name.to_string()))?;

        let metrics: &'a MetricMap = self.metrics;
        let mut models = BTreeSet::new();
        let mut missing = None;
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(idx) = dfs.next(&self.graph) {
            let metric_name = self.graph[idx];
            if missing.is_none() {
                missing = self
                    .dangling
                    .iter()
                    .find(|(m, _)| *m == metric_name)
                    .map(|(_, sub)| *sub);
            }
            models.extend(metrics[metric_name].depends_on.iter().map(String::as_str));
        }

        Ok((models, missing))
    }
}
