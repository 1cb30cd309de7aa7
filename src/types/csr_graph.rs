use crate::error::Result;
use crate::types::graph_query::GraphQuery;
use crate::types::VertexId;
use crate::util::{try_filled_vec, try_push, try_vec_with_capacity};

/// Immutable compressed-sparse-row adjacency.
///
/// The out-neighbours of vertex `v` are
/// `neighbor_list[offsets[v]..offsets[v + 1]]`. Kosaraju's engine freezes the
/// transpose into this form, and callers that run many read-only queries can
/// freeze a [`Graph`](crate::types::Graph) with
/// [`Graph::to_csr`](crate::types::Graph::to_csr).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrGraph {
    vertex_count: usize,
    offsets: Vec<usize>,
    neighbor_list: Vec<VertexId>,
}

/// Position inside one vertex's slice of the neighbour list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsrCursor {
    position: usize,
    end: usize,
}

impl CsrGraph {
    /// Copies the adjacency of any graph, keeping each vertex's out-edge order.
    pub fn from_query<G: GraphQuery>(graph: &G) -> Result<Self> {
        let vertex_count = graph.vertex_count();
        let mut offsets = try_filled_vec(vertex_count + 1, 0usize)?;
        let mut neighbor_list = try_vec_with_capacity(graph.edge_count())?;

        for vertex in 0..vertex_count {
            offsets[vertex] = neighbor_list.len();
            let mut cursor = graph.first_edge(vertex as VertexId);
            while let Some(current) = cursor {
                let (dest, next) = graph.advance(current);
                try_push(&mut neighbor_list, dest)?;
                cursor = next;
            }
        }
        offsets[vertex_count] = neighbor_list.len();

        Ok(Self {
            vertex_count,
            offsets,
            neighbor_list,
        })
    }

    /// Builds the transpose of `graph` with a counting sort on destinations.
    ///
    /// Every reversed list comes out in increasing source order.
    pub fn transpose_of<G: GraphQuery>(graph: &G) -> Result<Self> {
        let vertex_count = graph.vertex_count();
        let mut offsets = try_filled_vec(vertex_count + 1, 0usize)?;

        // In-degrees, shifted by one so the prefix sum lands in place.
        graph.for_each_edge(|_, dest| offsets[dest as usize + 1] += 1);
        for vertex in 0..vertex_count {
            offsets[vertex + 1] += offsets[vertex];
        }

        let edge_count = offsets[vertex_count];
        let mut neighbor_list = try_filled_vec(edge_count, 0 as VertexId)?;
        let mut fill = try_vec_with_capacity(vertex_count)?;
        fill.extend_from_slice(&offsets[..vertex_count]);

        graph.for_each_edge(|src, dest| {
            let slot = &mut fill[dest as usize];
            neighbor_list[*slot] = src;
            *slot += 1;
        });

        Ok(Self {
            vertex_count,
            offsets,
            neighbor_list,
        })
    }

    /// Out-neighbours of `vertex`; empty for an out-of-range id.
    pub fn neighbors(&self, vertex: VertexId) -> &[VertexId] {
        let vertex = vertex as usize;
        if vertex >= self.vertex_count {
            return &[];
        }
        &self.neighbor_list[self.offsets[vertex]..self.offsets[vertex + 1]]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn edge_count(&self) -> usize {
        self.neighbor_list.len()
    }

    /// Bytes held by the two backing arrays.
    pub(crate) fn heap_bytes(&self) -> usize {
        self.offsets.capacity() * std::mem::size_of::<usize>()
            + self.neighbor_list.capacity() * std::mem::size_of::<VertexId>()
    }
}

impl GraphQuery for CsrGraph {
    type Cursor = CsrCursor;

    fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    fn edge_count(&self) -> usize {
        self.neighbor_list.len()
    }

    fn first_edge(&self, vertex: VertexId) -> Option<CsrCursor> {
        let vertex = vertex as usize;
        let (start, end) = (self.offsets[vertex], self.offsets[vertex + 1]);
        (start < end).then_some(CsrCursor {
            position: start,
            end,
        })
    }

    fn advance(&self, cursor: CsrCursor) -> (VertexId, Option<CsrCursor>) {
        let next = cursor.position + 1;
        let rest = (next < cursor.end).then_some(CsrCursor {
            position: next,
            end: cursor.end,
        });
        (self.neighbor_list[cursor.position], rest)
    }
}
