use std::mem::size_of;

use tracing::debug;

use crate::algorithms::selector::Algorithm;
use crate::algorithms::{EnginePhase, PhaseTracker};
use crate::error::{fail, record, Result, SccError};
use crate::types::csr_graph::CsrGraph;
use crate::types::graph_query::GraphQuery;
use crate::types::scc_result::{ResultBuilder, SccResult};
use crate::types::VertexId;
use crate::util::{try_filled_vec, try_push, try_vec_with_capacity};

/// Frame of the first-pass DFS: the vertex and where its out-edge scan stands.
#[derive(Clone, Copy)]
enum Visit<C> {
    Enter,
    Resume(Option<C>),
}

/// Measurements of one Kosaraju run, reported by the benchmark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct KosarajuStats {
    /// Edges in the transpose built for the second pass.
    pub transpose_edges: usize,
    /// Estimated peak bytes of engine state, transpose and result included.
    pub peak_memory_bytes: usize,
}

struct KosarajuState {
    phase: PhaseTracker,
    finish_order: Vec<VertexId>,
    visited_first: Vec<bool>,
    visited_second: Vec<bool>,
    transpose: Option<CsrGraph>,
    result: Option<ResultBuilder>,
    frame_bytes: usize,
    stats: KosarajuStats,
}

impl KosarajuState {
    fn new(vertex_count: usize) -> Result<Self> {
        Ok(Self {
            phase: PhaseTracker::new("kosaraju"),
            finish_order: try_vec_with_capacity(vertex_count)?,
            visited_first: try_filled_vec(vertex_count, false)?,
            visited_second: try_filled_vec(vertex_count, false)?,
            transpose: None,
            result: Some(ResultBuilder::new(vertex_count)?),
            frame_bytes: 0,
            stats: KosarajuStats::default(),
        })
    }

    /// Depth-first pass over the graph recording vertices by finish time.
    fn record_finish_order<G: GraphQuery>(&mut self, graph: &G) -> Result<()> {
        self.phase.advance(EnginePhase::Discovering);
        let mut dfs_stack: Vec<(VertexId, Visit<G::Cursor>)> = Vec::new();

        for root in 0..graph.vertex_count() as VertexId {
            if self.visited_first[root as usize] {
                continue;
            }
            try_push(&mut dfs_stack, (root, Visit::Enter))?;

            while let Some((vertex, visit)) = dfs_stack.pop() {
                let cursor = match visit {
                    Visit::Enter => {
                        self.visited_first[vertex as usize] = true;
                        graph.first_edge(vertex)
                    }
                    Visit::Resume(cursor) => cursor,
                };

                match cursor {
                    Some(cursor) => {
                        let (neighbor, rest) = graph.advance(cursor);
                        try_push(&mut dfs_stack, (vertex, Visit::Resume(rest)))?;
                        if !self.visited_first[neighbor as usize] {
                            // Mark now so a second path cannot enter it twice.
                            self.visited_first[neighbor as usize] = true;
                            try_push(&mut dfs_stack, (neighbor, Visit::Resume(graph.first_edge(neighbor))))?;
                        }
                    }
                    None => try_push(&mut self.finish_order, vertex)?,
                }
            }
        }

        self.frame_bytes = dfs_stack.capacity() * size_of::<(VertexId, Visit<G::Cursor>)>();
        Ok(())
    }

    fn build_transpose<G: GraphQuery>(&mut self, graph: &G) -> Result<()> {
        let transpose = CsrGraph::transpose_of(graph)?;
        self.stats.transpose_edges = transpose.edge_count();
        self.transpose = Some(transpose);
        Ok(())
    }

    /// Walks the transpose from each vertex in decreasing finish time; every
    /// walk collects exactly one component.
    fn collect_components(&mut self) -> Result<()> {
        let transpose = self
            .transpose
            .as_ref()
            .ok_or_else(|| record(SccError::InvalidParameter("transpose not built".into())))?;
        let builder = self
            .result
            .as_mut()
            .ok_or_else(|| record(SccError::InvalidParameter("result already detached".into())))?;
        let mut pending: Vec<VertexId> = Vec::new();

        for &root in self.finish_order.iter().rev() {
            if self.visited_second[root as usize] {
                continue;
            }
            self.phase.advance(EnginePhase::Extracting);
            builder.open_component()?;

            self.visited_second[root as usize] = true;
            try_push(&mut pending, root)?;
            while let Some(vertex) = pending.pop() {
                builder.assign(vertex)?;
                for &neighbor in transpose.neighbors(vertex) {
                    if !self.visited_second[neighbor as usize] {
                        self.visited_second[neighbor as usize] = true;
                        try_push(&mut pending, neighbor)?;
                    }
                }
            }
            self.phase.advance(EnginePhase::Discovering);
        }

        self.frame_bytes = self
            .frame_bytes
            .max(pending.capacity() * size_of::<VertexId>());
        Ok(())
    }

    fn detach(&mut self) -> Result<ResultBuilder> {
        let builder = self
            .result
            .take()
            .ok_or_else(|| record(SccError::InvalidParameter("result already detached".into())))?;
        let transpose_bytes = self.transpose.as_ref().map_or(0, CsrGraph::heap_bytes);
        self.stats.peak_memory_bytes = self.finish_order.capacity() * size_of::<VertexId>()
            + (self.visited_first.capacity() + self.visited_second.capacity()) * size_of::<bool>()
            + self.frame_bytes
            + transpose_bytes
            + builder.heap_bytes();
        // The transpose is engine-private; drop it as soon as the walk is done.
        self.transpose = None;
        self.phase.advance(EnginePhase::Finished);
        Ok(builder)
    }
}

/// Computes the strongly connected components with Kosaraju's algorithm.
///
/// Two depth-first passes, `O(V + E)` time: the first records finish order on
/// the graph, the second walks an internally built transpose in decreasing
/// finish order. Components come out in topological order of the
/// condensation: an edge from component `a` to a different component `b`
/// means `a < b`.
///
/// # Errors
/// * `GraphEmpty` if the graph has no vertices
/// * `OutOfMemory` if engine state or the transpose cannot be allocated
pub fn find_scc_kosaraju<G: GraphQuery>(graph: &G) -> Result<SccResult> {
    kosaraju_with_stats(graph).map(|(result, _)| result)
}

pub(crate) fn kosaraju_with_stats<G: GraphQuery>(graph: &G) -> Result<(SccResult, KosarajuStats)> {
    let vertex_count = graph.vertex_count();
    if vertex_count == 0 {
        return fail(SccError::GraphEmpty);
    }
    debug!(vertex_count, edge_count = graph.edge_count(), "running kosaraju");

    let mut state = KosarajuState::new(vertex_count)?;
    let outcome = state
        .record_finish_order(graph)
        .and_then(|_| state.build_transpose(graph))
        .and_then(|_| state.collect_components())
        .and_then(|_| state.detach());
    let builder = match outcome {
        Ok(builder) => builder,
        Err(err) => {
            debug!(error = %err, phase = ?state.phase.phase(), "kosaraju failed");
            state.phase.advance(EnginePhase::Failed);
            return Err(err);
        }
    };

    let result = builder.finish(Algorithm::Kosaraju)?;
    debug!(
        components = result.component_count(),
        transpose_edges = state.stats.transpose_edges,
        "kosaraju finished"
    );
    Ok((result, state.stats))
}

#[cfg(test)]
mod test_kosaraju {
    use super::*;
    use crate::algorithms::tarjan::find_scc_tarjan;
    use crate::types::Graph;

    fn graph_from(vertex_count: usize, edges: &[(VertexId, VertexId)]) -> Graph {
        let mut graph = Graph::with_vertices(vertex_count).unwrap();
        for &(src, dest) in edges {
            graph.add_edge(src, dest).unwrap();
        }
        graph
    }

    #[test]
    fn test_simple_cycle() {
        let graph = graph_from(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let result = find_scc_kosaraju(&graph).unwrap();
        assert_eq!(result.component_count(), 1);
        assert_eq!(result.component_size(0).unwrap(), 4);
        assert_eq!(result.algorithm(), Algorithm::Kosaraju);
    }

    #[test]
    fn test_chain_in_topological_order() {
        let graph = graph_from(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]);
        let result = find_scc_kosaraju(&graph).unwrap();
        assert_eq!(result.component_count(), 5);
        for vertex in 0..5 {
            assert_eq!(result.vertex_component(vertex).unwrap(), vertex);
        }
    }

    #[test]
    fn test_two_cycles_joined_by_bridge() {
        let graph = graph_from(
            6,
            &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (2, 3)],
        );
        let result = find_scc_kosaraju(&graph).unwrap();
        assert_eq!(result.component_count(), 2);
        assert_eq!(result.vertex_component(0).unwrap(), 0);
        assert_eq!(result.vertex_component(5).unwrap(), 1);
        assert!(result.is_equivalent(&find_scc_tarjan(&graph).unwrap()));
    }

    #[test]
    fn test_self_loops_and_isolated_vertices() {
        let graph = graph_from(4, &[(0, 0), (1, 2)]);
        let result = find_scc_kosaraju(&graph).unwrap();
        assert_eq!(result.component_count(), 4);
    }

    #[test]
    fn test_graph_left_unmodified() {
        let graph = graph_from(3, &[(0, 1), (1, 0), (1, 2)]);
        let before: Vec<_> = graph.edges().collect();
        let (_, stats) = kosaraju_with_stats(&graph).unwrap();
        assert_eq!(graph.edges().collect::<Vec<_>>(), before);
        assert_eq!(stats.transpose_edges, 3);
        assert!(stats.peak_memory_bytes > 0);
    }

    #[test]
    fn test_empty_graph_is_rejected() {
        let graph = Graph::with_vertices(0).unwrap();
        assert_eq!(find_scc_kosaraju(&graph).unwrap_err(), SccError::GraphEmpty);
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let vertex_count = 200_000;
        let mut graph = Graph::with_vertices(vertex_count).unwrap();
        for src in 0..vertex_count as VertexId - 1 {
            graph.add_edge(src, src + 1).unwrap();
        }
        let result = find_scc_kosaraju(&graph).unwrap();
        assert_eq!(result.component_count(), vertex_count);
    }
}
