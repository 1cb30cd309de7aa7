use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::algorithms::selector::Algorithm;
use crate::error::{fail, record, Result, SccError};
use crate::types::VertexId;
use crate::util::{try_filled_vec, try_push};

/// Dense component identifier, `0..component_count`.
pub type ComponentId = u32;

const UNASSIGNED: ComponentId = ComponentId::MAX;

/// One strongly connected component: its member vertices in the order the
/// engine extracted them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    vertices: Vec<VertexId>,
}

impl Component {
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn contains(&self, vertex: VertexId) -> bool {
        self.vertices.contains(&vertex)
    }
}

/// Size summary over all components of a result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentStats {
    pub largest: usize,
    pub smallest: usize,
    /// Mean component size (`vertex_count / component_count`).
    pub average: f64,
}

impl fmt::Display for ComponentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "largest: {}, smallest: {}, average: {:.2}",
            self.largest, self.smallest, self.average
        )
    }
}

/// Partition of a graph's vertices into strongly connected components.
///
/// The result is self-contained: it does not borrow the graph it was computed
/// from, and every vertex of that graph belongs to exactly one component.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SccResult {
    algorithm: Algorithm,
    components: Vec<Component>,
    vertex_to_component: Vec<ComponentId>,
    stats: ComponentStats,
}

impl SccResult {
    /// Engine that produced the result.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of vertices of the graph the result was computed from.
    pub fn vertex_count(&self) -> usize {
        self.vertex_to_component.len()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Component at `id`, or `InvalidParameter` when `id` is out of range.
    pub fn component(&self, id: ComponentId) -> Result<&Component> {
        match self.components.get(id as usize) {
            Some(component) => Ok(component),
            None => fail(SccError::InvalidParameter(format!(
                "component {id} out of range ({} components)",
                self.components.len()
            ))),
        }
    }

    pub fn component_size(&self, id: ComponentId) -> Result<usize> {
        self.component(id).map(Component::len)
    }

    pub fn component_vertices(&self, id: ComponentId) -> Result<&[VertexId]> {
        self.component(id).map(Component::vertices)
    }

    /// Component containing `vertex`.
    ///
    /// # Errors
    /// `InvalidVertex` if `vertex` is not a vertex of the source graph.
    pub fn vertex_component(&self, vertex: VertexId) -> Result<ComponentId> {
        match self.vertex_to_component.get(vertex as usize) {
            Some(&component) => Ok(component),
            None => fail(SccError::InvalidVertex {
                vertex,
                vertex_count: self.vertex_to_component.len(),
            }),
        }
    }

    /// Component id of every vertex, indexed by vertex id.
    pub fn vertex_to_component(&self) -> &[ComponentId] {
        &self.vertex_to_component
    }

    /// Checks if two vertices lie in the same component.
    pub fn same_component(&self, a: VertexId, b: VertexId) -> Result<bool> {
        Ok(self.vertex_component(a)? == self.vertex_component(b)?)
    }

    pub fn stats(&self) -> ComponentStats {
        self.stats
    }

    /// First component of maximal size.
    pub fn largest_component(&self) -> Option<&Component> {
        self.components
            .iter()
            .reduce(|best, component| if component.len() > best.len() { component } else { best })
    }

    /// The partition as sorted vertex sets, independent of component ids and
    /// extraction order.
    pub fn partition(&self) -> BTreeSet<Vec<VertexId>> {
        self.components
            .iter()
            .map(|component| {
                let mut vertices = component.vertices.clone();
                vertices.sort_unstable();
                vertices
            })
            .collect()
    }

    /// Checks if `other` describes the same partition, up to renumbering of
    /// the components.
    pub fn is_equivalent(&self, other: &SccResult) -> bool {
        if self.vertex_count() != other.vertex_count()
            || self.component_count() != other.component_count()
        {
            return false;
        }

        // Component ids must correspond one-to-one.
        let mut forward = vec![UNASSIGNED; self.component_count()];
        let mut backward = vec![UNASSIGNED; other.component_count()];
        for (&ours, &theirs) in self.vertex_to_component.iter().zip(&other.vertex_to_component) {
            let (ours, theirs) = (ours as usize, theirs as usize);
            if forward[ours] == UNASSIGNED && backward[theirs] == UNASSIGNED {
                forward[ours] = theirs as ComponentId;
                backward[theirs] = ours as ComponentId;
            } else if forward[ours] != theirs as ComponentId || backward[theirs] != ours as ComponentId {
                return false;
            }
        }
        true
    }

    /// Independent deep copy.
    pub fn copy(&self) -> SccResult {
        self.clone()
    }
}

/// Accumulates components while an engine runs.
///
/// Engines own one builder in their state and hand it over exactly once when
/// they finish; [`finish`](Self::finish) then seals it into an [`SccResult`].
#[derive(Debug)]
pub(crate) struct ResultBuilder {
    components: Vec<Component>,
    vertex_to_component: Vec<ComponentId>,
}

impl ResultBuilder {
    pub(crate) fn new(vertex_count: usize) -> Result<Self> {
        Ok(Self {
            components: Vec::new(),
            vertex_to_component: try_filled_vec(vertex_count, UNASSIGNED)?,
        })
    }

    /// Starts a new, empty component and returns its id.
    pub(crate) fn open_component(&mut self) -> Result<ComponentId> {
        let id = self.components.len() as ComponentId;
        try_push(&mut self.components, Component { vertices: Vec::new() })?;
        Ok(id)
    }

    /// Adds `vertex` to the most recently opened component.
    pub(crate) fn assign(&mut self, vertex: VertexId) -> Result<()> {
        let id = self.components.len().checked_sub(1).ok_or_else(|| {
            record(SccError::InvalidParameter("no open component".into()))
        })?;
        let component = &mut self.components[id];
        try_push(&mut component.vertices, vertex)?;
        self.vertex_to_component[vertex as usize] = id as ComponentId;
        Ok(())
    }

    pub(crate) fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Bytes currently held by the builder.
    pub(crate) fn heap_bytes(&self) -> usize {
        let members: usize = self
            .components
            .iter()
            .map(|component| component.vertices.capacity() * std::mem::size_of::<VertexId>())
            .sum();
        members
            + self.components.capacity() * std::mem::size_of::<Component>()
            + self.vertex_to_component.capacity() * std::mem::size_of::<ComponentId>()
    }

    /// Seals the builder, computing the size statistics.
    pub(crate) fn finish(self, algorithm: Algorithm) -> Result<SccResult> {
        if let Some(vertex) = self.vertex_to_component.iter().position(|&c| c == UNASSIGNED) {
            return fail(SccError::InvalidParameter(format!(
                "vertex {vertex} was not assigned to any component"
            )));
        }

        let vertex_count = self.vertex_to_component.len();
        let component_count = self.components.len();
        let stats = ComponentStats {
            largest: self.components.iter().map(Component::len).max().unwrap_or(0),
            smallest: self.components.iter().map(Component::len).min().unwrap_or(0),
            average: if component_count == 0 {
                0.0
            } else {
                vertex_count as f64 / component_count as f64
            },
        };

        Ok(SccResult {
            algorithm,
            components: self.components,
            vertex_to_component: self.vertex_to_component,
            stats,
        })
    }
}

#[cfg(test)]
mod test_scc_result {
    use super::*;
    use crate::error::ErrorCode;

    /// {0, 2}, {1}, {3, 4, 5}
    fn sample(algorithm: Algorithm, order: &[&[VertexId]]) -> SccResult {
        let mut builder = ResultBuilder::new(6).unwrap();
        for members in order {
            builder.open_component().unwrap();
            for &vertex in *members {
                builder.assign(vertex).unwrap();
            }
        }
        builder.finish(algorithm).unwrap()
    }

    #[test]
    fn test_accessors() {
        let result = sample(Algorithm::Tarjan, &[&[2, 0], &[1], &[5, 4, 3]]);
        assert_eq!(result.algorithm(), Algorithm::Tarjan);
        assert_eq!(result.component_count(), 3);
        assert_eq!(result.vertex_count(), 6);
        assert_eq!(result.component_size(2).unwrap(), 3);
        assert_eq!(result.component_vertices(0).unwrap(), &[2, 0]);
        assert_eq!(result.vertex_component(4).unwrap(), 2);
        assert!(result.same_component(0, 2).unwrap());
        assert!(!result.same_component(0, 1).unwrap());
        assert_eq!(result.largest_component().unwrap().vertices(), &[5, 4, 3]);
        assert!(result.component(0).unwrap().contains(0));
    }

    #[test]
    fn test_out_of_range_lookups() {
        let result = sample(Algorithm::Tarjan, &[&[0, 1, 2, 3, 4, 5]]);
        assert_eq!(
            result.vertex_component(6).unwrap_err(),
            SccError::InvalidVertex { vertex: 6, vertex_count: 6 }
        );
        assert_eq!(
            result.component_size(1).unwrap_err().code(),
            ErrorCode::InvalidParameter
        );
    }

    #[test]
    fn test_stats() {
        let result = sample(Algorithm::Kosaraju, &[&[2, 0], &[1], &[5, 4, 3]]);
        let stats = result.stats();
        assert_eq!(stats.largest, 3);
        assert_eq!(stats.smallest, 1);
        assert!((stats.average - 2.0).abs() < f64::EPSILON);
        assert_eq!(stats.to_string(), "largest: 3, smallest: 1, average: 2.00");
    }

    #[test]
    fn test_equivalence_ignores_numbering() {
        let tarjan = sample(Algorithm::Tarjan, &[&[2, 0], &[1], &[5, 4, 3]]);
        let kosaraju = sample(Algorithm::Kosaraju, &[&[3, 4, 5], &[0, 2], &[1]]);
        assert!(tarjan.is_equivalent(&kosaraju));
        assert_eq!(tarjan.partition(), kosaraju.partition());

        let other = sample(Algorithm::Kosaraju, &[&[0, 1], &[2], &[3, 4, 5]]);
        assert!(!tarjan.is_equivalent(&other));
        assert_ne!(tarjan.partition(), other.partition());
    }

    #[test]
    fn test_equivalence_rejects_merged_components() {
        let split = sample(Algorithm::Tarjan, &[&[0], &[1], &[2, 3, 4, 5]]);
        let merged = sample(Algorithm::Tarjan, &[&[0, 1], &[2, 3], &[4, 5]]);
        assert!(!split.is_equivalent(&merged));
    }

    #[test]
    fn test_copy_is_independent() {
        let result = sample(Algorithm::Tarjan, &[&[2, 0], &[1], &[5, 4, 3]]);
        let copy = result.copy();
        drop(result);
        assert_eq!(copy.component_count(), 3);
        assert_eq!(copy.vertex_component(5).unwrap(), 2);
    }

    #[test]
    fn test_unassigned_vertex_is_rejected() {
        let mut builder = ResultBuilder::new(2).unwrap();
        builder.open_component().unwrap();
        builder.assign(0).unwrap();
        assert_eq!(builder.component_count(), 1);
        assert!(builder.finish(Algorithm::Tarjan).is_err());
    }

    #[test]
    fn test_assign_without_component_fails() {
        let mut builder = ResultBuilder::new(1).unwrap();
        assert!(builder.assign(0).is_err());
    }
}
