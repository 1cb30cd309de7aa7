use std::any::Any;
use std::sync::Arc;

use crate::config::DEFAULT_GRAPH_CAPACITY;
use crate::error::{fail, Result, SccError};
use crate::types::csr_graph::CsrGraph;
use crate::types::graph_query::GraphQuery;
use crate::util::{try_push, try_vec_with_capacity};

pub mod csr_graph;
pub mod graph_query;
pub mod scc_result;

/// Dense vertex identifier, `0..vertex_count`.
pub type VertexId = u32;

/// Index of an edge slot inside a graph's edge arena.
pub type EdgeId = u32;

/// Opaque user data attached to a vertex.
///
/// Copying a graph clones the `Arc`, so the copy refers to the same value
/// rather than owning a duplicate of it.
pub type VertexData = Arc<dyn Any + Send + Sync>;

/// Upper bound on the number of vertices (ids must fit in [`VertexId`]).
pub const MAX_VERTICES: usize = VertexId::MAX as usize;

/// Upper bound on the number of edge slots (slot indices must fit in [`EdgeId`]).
pub const MAX_EDGE_SLOTS: usize = EdgeId::MAX as usize;

/// One slot of the edge arena. Live slots form per-vertex singly linked
/// lists; released slots are chained into the free list through `next`.
#[derive(Debug, Clone, Copy)]
struct EdgeSlot {
    dest: VertexId,
    next: Option<EdgeId>,
}

#[derive(Debug, Clone)]
struct VertexEntry {
    id: VertexId,
    /// Most recently inserted out-edge.
    head: Option<EdgeId>,
    out_degree: u32,
    data: Option<VertexData>,
}

/// Mutable directed graph over dense vertex ids.
///
/// Edges live in a single arena owned by the graph; each vertex keeps the
/// index of its newest out-edge, so a vertex's neighbours are visited
/// most-recent-first. Algorithms must not depend on that order. Removed edge
/// slots are recycled by later insertions.
///
/// The graph is never written to by an SCC computation: engines keep their
/// per-vertex bookkeeping in their own arrays, so any number of runs may read
/// the same graph concurrently.
#[derive(Debug)]
pub struct Graph {
    vertices: Vec<VertexEntry>,
    edges: Vec<EdgeSlot>,
    free_edges: Option<EdgeId>,
    edge_count: usize,
    capacity: usize,
}

impl Graph {
    /// Creates an empty graph with room for `capacity` vertices.
    ///
    /// # Errors
    /// * `InvalidParameter` if `capacity` is zero or exceeds [`MAX_VERTICES`]
    /// * `OutOfMemory` if the vertex table cannot be allocated
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return fail(SccError::InvalidParameter("graph capacity must be positive".into()));
        }
        if capacity > MAX_VERTICES {
            return fail(SccError::InvalidParameter(format!(
                "graph capacity {capacity} exceeds the limit of {MAX_VERTICES} vertices"
            )));
        }
        Ok(Self {
            vertices: try_vec_with_capacity(capacity)?,
            edges: Vec::new(),
            free_edges: None,
            edge_count: 0,
            capacity,
        })
    }

    /// Creates an empty graph with the default starting capacity.
    pub fn with_default_capacity() -> Result<Self> {
        Self::new(DEFAULT_GRAPH_CAPACITY)
    }

    /// Creates a graph holding vertices `0..vertex_count` and no edges.
    pub fn with_vertices(vertex_count: usize) -> Result<Self> {
        let mut graph = Self::new(vertex_count.max(1))?;
        for _ in 0..vertex_count {
            graph.add_vertex()?;
        }
        Ok(graph)
    }

    /// Appends a vertex and returns its id, doubling the capacity when full.
    pub fn add_vertex(&mut self) -> Result<VertexId> {
        let vertex_count = self.vertices.len();
        if vertex_count >= MAX_VERTICES {
            return fail(SccError::GraphFull { limit: MAX_VERTICES });
        }
        if vertex_count == self.capacity {
            let grown = self.capacity.saturating_mul(2).clamp(vertex_count + 1, MAX_VERTICES);
            self.reserve_vertices(grown)?;
        }

        let id = vertex_count as VertexId;
        self.vertices.push(VertexEntry {
            id,
            head: None,
            out_degree: 0,
            data: None,
        });
        Ok(id)
    }

    /// Inserts the edge `src -> dest` at the front of `src`'s adjacency.
    ///
    /// # Errors
    /// * `InvalidVertex` if either endpoint is out of range
    /// * `EdgeExists` if the edge is already present
    /// * `OutOfMemory` / `GraphFull` if no edge slot can be obtained
    pub fn add_edge(&mut self, src: VertexId, dest: VertexId) -> Result<()> {
        self.check_vertex(src)?;
        self.check_vertex(dest)?;
        if self.has_edge(src, dest) {
            return fail(SccError::EdgeExists { src, dest });
        }
        self.insert_edge_unchecked(src, dest)
    }

    /// Removes the edge `src -> dest`, returning its slot to the free list.
    pub fn remove_edge(&mut self, src: VertexId, dest: VertexId) -> Result<()> {
        self.check_vertex(src)?;
        self.check_vertex(dest)?;

        let mut previous: Option<EdgeId> = None;
        let mut cursor = self.vertices[src as usize].head;
        while let Some(current) = cursor {
            let slot = self.edges[current as usize];
            if slot.dest == dest {
                match previous {
                    None => self.vertices[src as usize].head = slot.next,
                    Some(previous) => self.edges[previous as usize].next = slot.next,
                }
                self.edges[current as usize].next = self.free_edges;
                self.free_edges = Some(current);
                self.vertices[src as usize].out_degree -= 1;
                self.edge_count -= 1;
                return Ok(());
            }
            previous = Some(current);
            cursor = slot.next;
        }

        fail(SccError::EdgeNotFound { src, dest })
    }

    /// Checks if the edge `src -> dest` exists. Out-of-range ids yield `false`.
    pub fn has_edge(&self, src: VertexId, dest: VertexId) -> bool {
        GraphQuery::has_edge(self, src, dest)
    }

    /// Number of out-edges of `vertex`.
    pub fn out_degree(&self, vertex: VertexId) -> Result<usize> {
        self.check_vertex(vertex)?;
        Ok(self.vertices[vertex as usize].out_degree as usize)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Number of vertices the graph can hold before it has to grow.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Changes the vertex capacity. Shrinking below the current vertex count
    /// is rejected with `InvalidParameter`.
    pub fn resize(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity == 0 || new_capacity < self.vertices.len() || new_capacity > MAX_VERTICES {
            return fail(SccError::InvalidParameter(format!(
                "cannot resize graph with {} vertices to capacity {new_capacity}",
                self.vertices.len()
            )));
        }
        if new_capacity > self.capacity {
            self.reserve_vertices(new_capacity)
        } else {
            self.vertices.shrink_to(new_capacity);
            self.capacity = new_capacity;
            Ok(())
        }
    }

    /// Iterates the out-neighbours of `vertex`, newest edge first.
    ///
    /// An out-of-range vertex yields an empty iterator.
    pub fn neighbors(&self, vertex: VertexId) -> Neighbors<'_> {
        let cursor = self.vertices.get(vertex as usize).and_then(|entry| entry.head);
        Neighbors { graph: self, cursor }
    }

    /// Iterates every edge as `(src, dest)`, sources in id order.
    pub fn edges(&self) -> Edges<'_> {
        Edges {
            graph: self,
            src: 0,
            cursor: self.vertices.first().and_then(|entry| entry.head),
        }
    }

    /// Attaches (or with `None`, detaches) user data to a vertex.
    pub fn set_vertex_data(&mut self, vertex: VertexId, data: Option<VertexData>) -> Result<()> {
        self.check_vertex(vertex)?;
        self.vertices[vertex as usize].data = data;
        Ok(())
    }

    /// User data attached to `vertex`, if any. Out-of-range ids yield `None`.
    pub fn vertex_data(&self, vertex: VertexId) -> Option<&VertexData> {
        self.vertices.get(vertex as usize).and_then(|entry| entry.data.as_ref())
    }

    /// Deep copy: same vertices, same edges in the same per-vertex order,
    /// same capacity. Attached data is shared with the original.
    pub fn copy(&self) -> Result<Graph> {
        let mut copy = Graph::new(self.capacity)?;
        copy.edges.try_reserve_exact(self.edge_count)?;
        for entry in &self.vertices {
            let id = copy.add_vertex()?;
            copy.vertices[id as usize].data = entry.data.clone();
        }

        let mut targets = Vec::new();
        for src in 0..self.vertices.len() as VertexId {
            targets.clear();
            targets.extend(self.neighbors(src));
            // Insertion prepends, so replaying oldest-first restores the order.
            for &dest in targets.iter().rev() {
                copy.insert_edge_unchecked(src, dest)?;
            }
        }
        Ok(copy)
    }

    /// Builds a new graph over the same vertices with every edge reversed.
    /// Vertex data is not carried over.
    pub fn transpose(&self) -> Result<Graph> {
        let mut transpose = Graph::new(self.capacity)?;
        transpose.edges.try_reserve_exact(self.edge_count)?;
        for _ in 0..self.vertices.len() {
            transpose.add_vertex()?;
        }
        for (src, dest) in self.edges() {
            transpose.insert_edge_unchecked(dest, src)?;
        }
        Ok(transpose)
    }

    /// Freezes the adjacency into contiguous CSR storage.
    pub fn to_csr(&self) -> Result<CsrGraph> {
        CsrGraph::from_query(self)
    }

    /// Checks the structural invariants and reports the first violation:
    /// ids are dense, every destination is in range, per-vertex out-degrees
    /// match their lists and the edge total matches the sum.
    pub fn verify_integrity(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        if vertex_count > self.capacity {
            return fail(SccError::InvalidParameter(format!(
                "{vertex_count} vertices exceed capacity {}",
                self.capacity
            )));
        }

        let mut counted_edges = 0usize;
        for (position, entry) in self.vertices.iter().enumerate() {
            if entry.id as usize != position {
                return fail(SccError::InvalidVertex { vertex: entry.id, vertex_count });
            }

            let mut degree = 0usize;
            let mut cursor = entry.head;
            while let Some(current) = cursor {
                let slot = match self.edges.get(current as usize) {
                    Some(slot) => slot,
                    None => {
                        return fail(SccError::InvalidParameter(format!(
                            "vertex {position} links to missing edge slot {current}"
                        )))
                    }
                };
                if slot.dest as usize >= vertex_count {
                    return fail(SccError::InvalidVertex { vertex: slot.dest, vertex_count });
                }
                degree += 1;
                if degree > self.edges.len() {
                    return fail(SccError::InvalidParameter(format!(
                        "edge list of vertex {position} loops"
                    )));
                }
                cursor = slot.next;
            }

            if degree != entry.out_degree as usize {
                return fail(SccError::InvalidParameter(format!(
                    "vertex {position} records out-degree {} but has {degree} edges",
                    entry.out_degree
                )));
            }
            counted_edges += degree;
        }

        if counted_edges != self.edge_count {
            return fail(SccError::InvalidParameter(format!(
                "graph records {} edges but holds {counted_edges}",
                self.edge_count
            )));
        }
        Ok(())
    }

    /// `true` when [`verify_integrity`](Self::verify_integrity) passes.
    pub fn is_valid(&self) -> bool {
        self.verify_integrity().is_ok()
    }

    /// Inserts an edge without the range and duplicate checks. Callers
    /// guarantee both endpoints exist and the edge is new.
    pub(crate) fn insert_edge_unchecked(&mut self, src: VertexId, dest: VertexId) -> Result<()> {
        let head = self.vertices[src as usize].head;
        let slot = self.allocate_edge_slot(dest, head)?;
        let entry = &mut self.vertices[src as usize];
        entry.head = Some(slot);
        entry.out_degree += 1;
        self.edge_count += 1;
        Ok(())
    }

    fn allocate_edge_slot(&mut self, dest: VertexId, next: Option<EdgeId>) -> Result<EdgeId> {
        if let Some(slot) = self.free_edges {
            let entry = &mut self.edges[slot as usize];
            self.free_edges = entry.next;
            *entry = EdgeSlot { dest, next };
            return Ok(slot);
        }
        if self.edges.len() >= MAX_EDGE_SLOTS {
            return fail(SccError::GraphFull { limit: MAX_EDGE_SLOTS });
        }
        try_push(&mut self.edges, EdgeSlot { dest, next })?;
        Ok((self.edges.len() - 1) as EdgeId)
    }

    fn reserve_vertices(&mut self, new_capacity: usize) -> Result<()> {
        let additional = new_capacity.saturating_sub(self.vertices.len());
        self.vertices.try_reserve_exact(additional)?;
        self.capacity = new_capacity;
        Ok(())
    }

    fn check_vertex(&self, vertex: VertexId) -> Result<()> {
        if (vertex as usize) < self.vertices.len() {
            Ok(())
        } else {
            fail(SccError::InvalidVertex {
                vertex,
                vertex_count: self.vertices.len(),
            })
        }
    }
}

impl GraphQuery for Graph {
    type Cursor = EdgeId;

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_count
    }

    fn first_edge(&self, vertex: VertexId) -> Option<EdgeId> {
        self.vertices[vertex as usize].head
    }

    fn advance(&self, cursor: EdgeId) -> (VertexId, Option<EdgeId>) {
        let slot = self.edges[cursor as usize];
        (slot.dest, slot.next)
    }
}

/// Iterator over one vertex's out-neighbours.
pub struct Neighbors<'a> {
    graph: &'a Graph,
    cursor: Option<EdgeId>,
}

impl Iterator for Neighbors<'_> {
    type Item = VertexId;

    fn next(&mut self) -> Option<VertexId> {
        let current = self.cursor?;
        let (dest, next) = self.graph.advance(current);
        self.cursor = next;
        Some(dest)
    }
}

/// Iterator over all edges of a graph as `(src, dest)` pairs.
pub struct Edges<'a> {
    graph: &'a Graph,
    src: usize,
    cursor: Option<EdgeId>,
}

impl Iterator for Edges<'_> {
    type Item = (VertexId, VertexId);

    fn next(&mut self) -> Option<(VertexId, VertexId)> {
        loop {
            if let Some(current) = self.cursor {
                let (dest, next) = self.graph.advance(current);
                self.cursor = next;
                return Some((self.src as VertexId, dest));
            }
            self.src += 1;
            let entry = self.graph.vertices.get(self.src)?;
            self.cursor = entry.head;
        }
    }
}
