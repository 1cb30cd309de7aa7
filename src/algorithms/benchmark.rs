use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::algorithms::kosaraju::kosaraju_with_stats;
use crate::algorithms::tarjan::tarjan_with_stats;
use crate::error::{fail, Result, SccError};
use crate::timing::Timer;
use crate::types::graph_query::GraphQuery;

/// Side-by-side measurements of both engines on one graph.
///
/// Memory figures are estimates derived from the sizes of each engine's state
/// arrays, transpose and result, not allocator measurements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub tarjan_time: Duration,
    pub kosaraju_time: Duration,
    pub tarjan_memory_peak_bytes: usize,
    pub kosaraju_memory_peak_bytes: usize,
    pub tarjan_stack_max_depth: usize,
    pub kosaraju_transpose_edges: usize,
    pub tarjan_components: usize,
    pub kosaraju_components: usize,
    /// Both engines found the same number of components.
    pub component_counts_match: bool,
    /// Both engines found the same partition.
    pub results_match: bool,
}

impl BenchmarkReport {
    /// Kosaraju time over Tarjan time; `None` when Tarjan took no measurable time.
    pub fn speed_ratio(&self) -> Option<f64> {
        let tarjan = self.tarjan_time.as_secs_f64();
        (tarjan > 0.0).then(|| self.kosaraju_time.as_secs_f64() / tarjan)
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Graph: {} vertices, {} edges", self.vertex_count, self.edge_count)?;
        writeln!(
            f,
            "Tarjan:   {:>10.3} ms, {:>10} bytes, {} components, stack depth {}",
            self.tarjan_time.as_secs_f64() * 1000.0,
            self.tarjan_memory_peak_bytes,
            self.tarjan_components,
            self.tarjan_stack_max_depth
        )?;
        writeln!(
            f,
            "Kosaraju: {:>10.3} ms, {:>10} bytes, {} components, transpose edges {}",
            self.kosaraju_time.as_secs_f64() * 1000.0,
            self.kosaraju_memory_peak_bytes,
            self.kosaraju_components,
            self.kosaraju_transpose_edges
        )?;
        write!(
            f,
            "Results match: {}",
            if self.results_match { "yes" } else { "NO" }
        )
    }
}

/// Runs both engines on `graph` and reports time, estimated memory and
/// whether they agree.
///
/// Disagreement is reported, not returned as an error; it is logged at `warn`.
///
/// # Errors
/// `GraphEmpty` for a graph without vertices, or any engine error.
pub fn benchmark<G: GraphQuery>(graph: &G) -> Result<BenchmarkReport> {
    if graph.vertex_count() == 0 {
        return fail(SccError::GraphEmpty);
    }

    let tarjan_run = Timer::measure(|| tarjan_with_stats(graph));
    let (tarjan, tarjan_stats) = tarjan_run.result?;
    let kosaraju_run = Timer::measure(|| kosaraju_with_stats(graph));
    let (kosaraju, kosaraju_stats) = kosaraju_run.result?;

    let report = BenchmarkReport {
        vertex_count: graph.vertex_count(),
        edge_count: graph.edge_count(),
        tarjan_time: tarjan_run.duration,
        kosaraju_time: kosaraju_run.duration,
        tarjan_memory_peak_bytes: tarjan_stats.peak_memory_bytes,
        kosaraju_memory_peak_bytes: kosaraju_stats.peak_memory_bytes,
        tarjan_stack_max_depth: tarjan_stats.max_stack_depth,
        kosaraju_transpose_edges: kosaraju_stats.transpose_edges,
        tarjan_components: tarjan.component_count(),
        kosaraju_components: kosaraju.component_count(),
        component_counts_match: tarjan.component_count() == kosaraju.component_count(),
        results_match: tarjan.is_equivalent(&kosaraju),
    };

    if !report.results_match {
        warn!(
            tarjan_components = report.tarjan_components,
            kosaraju_components = report.kosaraju_components,
            "engines disagree"
        );
    }
    debug!(
        tarjan_us = report.tarjan_time.as_micros() as u64,
        kosaraju_us = report.kosaraju_time.as_micros() as u64,
        "benchmark finished"
    );
    Ok(report)
}
