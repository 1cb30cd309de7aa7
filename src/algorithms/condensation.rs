use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::algorithms::selector::find_scc;
use crate::error::{fail, Result, SccError};
use crate::types::graph_query::GraphQuery;
use crate::types::scc_result::{ComponentId, SccResult};
use crate::types::{Graph, VertexId};
use crate::util::{try_filled_vec, try_push, try_vec_with_capacity};

/// Collapses every component of `result` into a single vertex.
///
/// Vertex `i` of the returned graph stands for component `i`. There is an
/// edge `a -> b` exactly when some original edge leads from a vertex of `a` to
/// a vertex of `b != a`; each such pair appears once. The condensation has no
/// self-loops and is acyclic.
///
/// # Errors
/// * `InvalidParameter` if `result` was computed for a graph with a different
///   vertex count
/// * `OutOfMemory` if the condensation cannot be allocated
pub fn build_condensation<G: GraphQuery>(graph: &G, result: &SccResult) -> Result<Graph> {
    if result.vertex_count() != graph.vertex_count() {
        return fail(SccError::InvalidParameter(format!(
            "result covers {} vertices but the graph has {}",
            result.vertex_count(),
            graph.vertex_count()
        )));
    }

    let component_of = result.vertex_to_component();
    let mut condensation = Graph::with_vertices(result.component_count())?;
    let mut seen: FxHashSet<(ComponentId, ComponentId)> = FxHashSet::default();

    for src in 0..graph.vertex_count() as VertexId {
        let from = component_of[src as usize];
        let mut cursor = graph.first_edge(src);
        while let Some(current) = cursor {
            let (dest, next) = graph.advance(current);
            let to = component_of[dest as usize];
            if from != to && seen.insert((from, to)) {
                condensation.insert_edge_unchecked(from, to)?;
            }
            cursor = next;
        }
    }

    debug!(
        components = condensation.vertex_count(),
        edges = condensation.edge_count(),
        "built condensation"
    );
    Ok(condensation)
}

/// Components that contain a cycle: more than one vertex, or a single vertex
/// with a self-loop.
pub fn cyclic_components<G: GraphQuery>(graph: &G, result: &SccResult) -> Result<Vec<ComponentId>> {
    if result.vertex_count() != graph.vertex_count() {
        return fail(SccError::InvalidParameter(format!(
            "result covers {} vertices but the graph has {}",
            result.vertex_count(),
            graph.vertex_count()
        )));
    }

    let mut cyclic = Vec::new();
    for (id, component) in result.components().iter().enumerate() {
        let is_cyclic = match component.vertices() {
            [single] => graph.has_edge(*single, *single),
            _ => true,
        };
        if is_cyclic {
            try_push(&mut cyclic, id as ComponentId)?;
        }
    }
    Ok(cyclic)
}

/// Checks if the graph contains any directed cycle, self-loops included.
///
/// An empty graph has none.
pub fn has_cycle<G: GraphQuery>(graph: &G) -> Result<bool> {
    if graph.vertex_count() == 0 {
        return Ok(false);
    }
    let result = find_scc(graph)?;
    Ok(!cyclic_components(graph, &result)?.is_empty())
}

/// Orders the vertices of an acyclic graph so that every edge points forward
/// (Kahn's algorithm; sources are seeded in id order).
///
/// # Errors
/// `InvalidParameter` if the graph has a cycle.
pub fn topological_order<G: GraphQuery>(graph: &G) -> Result<Vec<VertexId>> {
    let vertex_count = graph.vertex_count();
    let mut in_degree = try_filled_vec(vertex_count, 0usize)?;
    graph.for_each_edge(|_, dest| in_degree[dest as usize] += 1);

    let mut ready: VecDeque<VertexId> = (0..vertex_count as VertexId)
        .filter(|&vertex| in_degree[vertex as usize] == 0)
        .collect();
    let mut order = try_vec_with_capacity(vertex_count)?;

    while let Some(vertex) = ready.pop_front() {
        order.push(vertex);
        let mut cursor = graph.first_edge(vertex);
        while let Some(current) = cursor {
            let (dest, next) = graph.advance(current);
            in_degree[dest as usize] -= 1;
            if in_degree[dest as usize] == 0 {
                ready.push_back(dest);
            }
            cursor = next;
        }
    }

    if order.len() != vertex_count {
        return fail(SccError::InvalidParameter(format!(
            "graph has a cycle through {} vertices",
            vertex_count - order.len()
        )));
    }
    Ok(order)
}
