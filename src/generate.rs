//! Deterministic graph builders for tests, benchmarks and the CLI.
use rand::Rng;

use crate::error::{fail, record, Result, SccError};
use crate::types::{Graph, VertexId};

/// `0 -> 1 -> ... -> n-1 -> 0`. A single vertex gets a self-loop.
pub fn cycle(vertex_count: usize) -> Result<Graph> {
    let mut graph = Graph::with_vertices(vertex_count)?;
    for src in 0..vertex_count {
        let dest = (src + 1) % vertex_count;
        graph.insert_edge_unchecked(src as VertexId, dest as VertexId)?;
    }
    Ok(graph)
}

/// `0 -> 1 -> ... -> n-1`.
pub fn chain(vertex_count: usize) -> Result<Graph> {
    let mut graph = Graph::with_vertices(vertex_count)?;
    for src in 1..vertex_count {
        graph.insert_edge_unchecked((src - 1) as VertexId, src as VertexId)?;
    }
    Ok(graph)
}

/// Every ordered pair of distinct vertices connected.
pub fn complete(vertex_count: usize) -> Result<Graph> {
    let mut graph = Graph::with_vertices(vertex_count)?;
    for src in 0..vertex_count as VertexId {
        for dest in 0..vertex_count as VertexId {
            if src != dest {
                graph.insert_edge_unchecked(src, dest)?;
            }
        }
    }
    Ok(graph)
}

/// Isolated vertices, each with a self-loop.
pub fn self_loops(vertex_count: usize) -> Result<Graph> {
    let mut graph = Graph::with_vertices(vertex_count)?;
    for vertex in 0..vertex_count as VertexId {
        graph.insert_edge_unchecked(vertex, vertex)?;
    }
    Ok(graph)
}

/// `count` vertex-disjoint cycles of `size` vertices each; cycle `k` covers
/// ids `k * size .. (k + 1) * size`.
pub fn disjoint_cycles(count: usize, size: usize) -> Result<Graph> {
    if size == 0 {
        return fail(SccError::InvalidParameter("cycle size must be positive".into()));
    }
    let vertex_count = count.checked_mul(size).ok_or_else(|| {
        record(SccError::InvalidParameter(format!(
            "{count} cycles of {size} vertices overflow"
        )))
    })?;
    let mut graph = Graph::with_vertices(vertex_count)?;
    for base in (0..vertex_count).step_by(size) {
        for offset in 0..size {
            let src = base + offset;
            let dest = base + (offset + 1) % size;
            graph.insert_edge_unchecked(src as VertexId, dest as VertexId)?;
        }
    }
    Ok(graph)
}

/// Erdős–Rényi style digraph: each ordered pair `(src, dest)`, self-loops
/// included, is an edge with probability `edge_probability`.
///
/// # Errors
/// `InvalidParameter` if `edge_probability` is not within `[0, 1]`.
pub fn random<R: Rng + ?Sized>(vertex_count: usize, edge_probability: f64, rng: &mut R) -> Result<Graph> {
    if !(0.0..=1.0).contains(&edge_probability) {
        return fail(SccError::InvalidParameter(format!(
            "edge probability {edge_probability} is not within [0, 1]"
        )));
    }
    let mut graph = Graph::with_vertices(vertex_count)?;
    for src in 0..vertex_count as VertexId {
        for dest in 0..vertex_count as VertexId {
            if rng.gen_bool(edge_probability) {
                graph.insert_edge_unchecked(src, dest)?;
            }
        }
    }
    Ok(graph)
}

/// Digraph with exactly `edge_count` distinct edges between uniformly chosen
/// endpoints (self-loops allowed).
///
/// Meant for sparse graphs; sampling slows down as `edge_count` approaches
/// `vertex_count^2`.
pub fn random_with_edge_count<R: Rng + ?Sized>(
    vertex_count: usize,
    edge_count: usize,
    rng: &mut R,
) -> Result<Graph> {
    let max_edges = vertex_count.saturating_mul(vertex_count);
    if edge_count > max_edges {
        return fail(SccError::InvalidParameter(format!(
            "{edge_count} edges do not fit in {vertex_count} vertices"
        )));
    }
    let mut graph = Graph::with_vertices(vertex_count)?;
    while graph.edge_count() < edge_count {
        let src = rng.gen_range(0..vertex_count) as VertexId;
        let dest = rng.gen_range(0..vertex_count) as VertexId;
        if !graph.has_edge(src, dest) {
            graph.insert_edge_unchecked(src, dest)?;
        }
    }
    Ok(graph)
}
