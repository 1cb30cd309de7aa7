use std::mem::size_of;

use tracing::debug;

use crate::algorithms::selector::Algorithm;
use crate::algorithms::{EnginePhase, PhaseTracker};
use crate::error::{fail, record, Result, SccError};
use crate::types::graph_query::GraphQuery;
use crate::types::scc_result::{ResultBuilder, SccResult};
use crate::types::VertexId;
use crate::util::{try_filled_vec, try_push};

const UNVISITED: u32 = u32::MAX;

/// Step of the explicit DFS for one vertex.
#[derive(Clone, Copy)]
enum State<C> {
    /// Assign discovery index and lowlink, push onto the Tarjan stack.
    Start,
    /// Examine the out-edge under the cursor; `None` once all are seen.
    ProcessNeighbor(Option<C>),
    /// Propagate the lowlink to the DFS parent and extract a component if
    /// this vertex is a root.
    Finish,
}

/// Measurements of one Tarjan run, reported by the benchmark.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TarjanStats {
    /// Deepest the Tarjan stack of open vertices grew.
    pub max_stack_depth: usize,
    /// Estimated peak bytes of engine state, result included.
    pub peak_memory_bytes: usize,
}

/// Per-run bookkeeping. Lives only for one call and never touches the graph.
struct TarjanState<C> {
    phase: PhaseTracker,
    next_index: u32,
    index: Vec<u32>,
    lowlink: Vec<u32>,
    on_stack: Vec<bool>,
    stack: Vec<VertexId>,
    dfs_stack: Vec<(VertexId, State<C>)>,
    result: Option<ResultBuilder>,
    stats: TarjanStats,
}

impl<C: Copy> TarjanState<C> {
    fn new(vertex_count: usize) -> Result<Self> {
        Ok(Self {
            phase: PhaseTracker::new("tarjan"),
            next_index: 0,
            index: try_filled_vec(vertex_count, UNVISITED)?,
            lowlink: try_filled_vec(vertex_count, UNVISITED)?,
            on_stack: try_filled_vec(vertex_count, false)?,
            stack: Vec::new(),
            dfs_stack: Vec::new(),
            result: Some(ResultBuilder::new(vertex_count)?),
            stats: TarjanStats::default(),
        })
    }

    fn run<G>(&mut self, graph: &G) -> Result<()>
    where
        G: GraphQuery<Cursor = C>,
    {
        self.phase.advance(EnginePhase::Discovering);

        // Roots in id order; every vertex gets visited exactly once.
        for root in 0..graph.vertex_count() as VertexId {
            if self.index[root as usize] != UNVISITED {
                continue;
            }
            try_push(&mut self.dfs_stack, (root, State::Start))?;

            while let Some((vertex, state)) = self.dfs_stack.pop() {
                let v = vertex as usize;
                match state {
                    State::Start => {
                        self.index[v] = self.next_index;
                        self.lowlink[v] = self.next_index;
                        self.next_index += 1;

                        try_push(&mut self.stack, vertex)?;
                        self.on_stack[v] = true;
                        self.stats.max_stack_depth = self.stats.max_stack_depth.max(self.stack.len());

                        try_push(
                            &mut self.dfs_stack,
                            (vertex, State::ProcessNeighbor(graph.first_edge(vertex))),
                        )?;
                    }

                    State::ProcessNeighbor(Some(cursor)) => {
                        let (neighbor, rest) = graph.advance(cursor);
                        let w = neighbor as usize;
                        try_push(&mut self.dfs_stack, (vertex, State::ProcessNeighbor(rest)))?;

                        if self.index[w] == UNVISITED {
                            // Tree edge: descend, resume this vertex afterwards.
                            try_push(&mut self.dfs_stack, (neighbor, State::Start))?;
                        } else if self.on_stack[w] {
                            self.lowlink[v] = self.lowlink[v].min(self.index[w]);
                        }
                        // Edges into finished components are ignored.
                    }

                    State::ProcessNeighbor(None) => {
                        try_push(&mut self.dfs_stack, (vertex, State::Finish))?;
                    }

                    State::Finish => {
                        // The parent's resume frame sits right below a finished child.
                        if let Some(&(parent, _)) = self.dfs_stack.last() {
                            let p = parent as usize;
                            self.lowlink[p] = self.lowlink[p].min(self.lowlink[v]);
                        }
                        if self.lowlink[v] == self.index[v] {
                            self.extract(vertex)?;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Pops the Tarjan stack down to and including `root` into a new component.
    fn extract(&mut self, root: VertexId) -> Result<()> {
        self.phase.advance(EnginePhase::Extracting);
        let builder = self
            .result
            .as_mut()
            .ok_or_else(|| record(SccError::InvalidParameter("result already detached".into())))?;

        builder.open_component()?;
        loop {
            let member = match self.stack.pop() {
                Some(member) => member,
                None => {
                    return fail(SccError::InvalidParameter(format!(
                        "stack exhausted before reaching root {root}"
                    )))
                }
            };
            self.on_stack[member as usize] = false;
            builder.assign(member)?;
            if member == root {
                break;
            }
        }

        self.phase.advance(EnginePhase::Discovering);
        Ok(())
    }

    /// Hands the accumulated result over. Succeeds at most once per run.
    fn detach(&mut self) -> Result<ResultBuilder> {
        let builder = self
            .result
            .take()
            .ok_or_else(|| record(SccError::InvalidParameter("result already detached".into())))?;
        self.stats.peak_memory_bytes = self.footprint() + builder.heap_bytes();
        self.phase.advance(EnginePhase::Finished);
        Ok(builder)
    }

    fn footprint(&self) -> usize {
        (self.index.capacity() + self.lowlink.capacity()) * size_of::<u32>()
            + self.on_stack.capacity() * size_of::<bool>()
            + self.stack.capacity() * size_of::<VertexId>()
            + self.dfs_stack.capacity() * size_of::<(VertexId, State<C>)>()
    }
}

/// Computes the strongly connected components with Tarjan's algorithm.
///
/// Single depth-first pass, `O(V + E)` time. The DFS runs on an explicit stack,
/// so graph depth is bounded by memory rather than the call stack.
///
/// Components come out in reverse topological order of the condensation: if an
/// edge leads from component `a` to a different component `b`, then `b` has the
/// smaller id. Within a component, vertices are listed in the order they were
/// popped, so the component's root comes last.
///
/// # Errors
/// * `GraphEmpty` if the graph has no vertices
/// * `OutOfMemory` if engine state cannot be allocated; nothing is returned
pub fn find_scc_tarjan<G: GraphQuery>(graph: &G) -> Result<SccResult> {
    tarjan_with_stats(graph).map(|(result, _)| result)
}

pub(crate) fn tarjan_with_stats<G: GraphQuery>(graph: &G) -> Result<(SccResult, TarjanStats)> {
    let vertex_count = graph.vertex_count();
    if vertex_count == 0 {
        return fail(SccError::GraphEmpty);
    }
    debug!(vertex_count, edge_count = graph.edge_count(), "running tarjan");

    let mut state = TarjanState::<G::Cursor>::new(vertex_count)?;
    let builder = match state.run(graph).and_then(|_| state.detach()) {
        Ok(builder) => builder,
        Err(err) => {
            debug!(error = %err, phase = ?state.phase.phase(), "tarjan failed");
            state.phase.advance(EnginePhase::Failed);
            return Err(err);
        }
    };

    let result = builder.finish(Algorithm::Tarjan)?;
    debug!(
        components = result.component_count(),
        max_stack_depth = state.stats.max_stack_depth,
        "tarjan finished"
    );
    Ok((result, state.stats))
}
