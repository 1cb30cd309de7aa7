use crate::types::VertexId;

/// Read-only adjacency access shared by every graph representation.
///
/// The SCC engines walk adjacency through an opaque cursor instead of
/// collecting neighbour lists, so an explicit DFS frame can remember
/// "where it was" in a vertex's out-edges as a single `Copy` value. Both the
/// mutable [`Graph`](crate::types::Graph) store and the frozen
/// [`CsrGraph`](crate::types::csr_graph::CsrGraph) implement it.
pub trait GraphQuery {
    /// Position inside one vertex's out-edge sequence.
    type Cursor: Copy;

    /// Number of vertices; ids are exactly `0..vertex_count()`.
    fn vertex_count(&self) -> usize;

    /// Number of directed edges.
    fn edge_count(&self) -> usize;

    /// Cursor at the first out-edge of `vertex`, or `None` if it has none.
    ///
    /// `vertex` must be below [`vertex_count`](Self::vertex_count).
    fn first_edge(&self, vertex: VertexId) -> Option<Self::Cursor>;

    /// Destination of the edge under `cursor`, plus the cursor of the next
    /// out-edge of the same source.
    fn advance(&self, cursor: Self::Cursor) -> (VertexId, Option<Self::Cursor>);

    /// Collects the out-neighbours of `vertex`.
    ///
    /// Returns an empty vector for an out-of-range vertex.
    fn read_neighbor(&self, vertex: VertexId) -> Vec<VertexId> {
        let mut neighbors = Vec::new();
        if !self.has_vertex(vertex) {
            return neighbors;
        }
        let mut cursor = self.first_edge(vertex);
        while let Some(current) = cursor {
            let (dest, next) = self.advance(current);
            neighbors.push(dest);
            cursor = next;
        }
        neighbors
    }

    /// Checks if a vertex id is in range.
    fn has_vertex(&self, vertex: VertexId) -> bool {
        (vertex as usize) < self.vertex_count()
    }

    /// Checks if the edge `src -> dest` exists. Out-of-range ids yield `false`.
    fn has_edge(&self, src: VertexId, dest: VertexId) -> bool {
        if !self.has_vertex(src) || !self.has_vertex(dest) {
            return false;
        }
        let mut cursor = self.first_edge(src);
        while let Some(current) = cursor {
            let (target, next) = self.advance(current);
            if target == dest {
                return true;
            }
            cursor = next;
        }
        false
    }

    /// Visits every edge as `(src, dest)`, sources in id order.
    fn for_each_edge<F>(&self, mut visit: F)
    where
        F: FnMut(VertexId, VertexId),
        Self: Sized,
    {
        for src in 0..self.vertex_count() as VertexId {
            let mut cursor = self.first_edge(src);
            while let Some(current) = cursor {
                let (dest, next) = self.advance(current);
                visit(src, dest);
                cursor = next;
            }
        }
    }
}
