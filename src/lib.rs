//! Strongly connected components of directed graphs.
//!
//! A mutable [`Graph`] store, two interchangeable engines ([`find_scc_tarjan`]
//! and [`find_scc_kosaraju`]), a self-contained [`SccResult`], the
//! [`build_condensation`] DAG builder and a shape-based engine selector
//! ([`find_scc`]).
//!
//! ```
//! use strongcc::{build_condensation, find_scc, Graph};
//!
//! let mut graph = Graph::with_vertices(4).unwrap();
//! for (src, dest) in [(0, 1), (1, 0), (1, 2), (2, 3), (3, 2)] {
//!     graph.add_edge(src, dest).unwrap();
//! }
//!
//! let result = find_scc(&graph).unwrap();
//! assert_eq!(result.component_count(), 2);
//! assert!(result.same_component(2, 3).unwrap());
//!
//! let condensation = build_condensation(&graph, &result).unwrap();
//! assert_eq!(condensation.edge_count(), 1);
//! ```
pub mod algorithms;
pub mod config;
pub mod error;
pub mod generate;
pub mod timing;
pub mod types;
mod util;

pub use algorithms::benchmark::{benchmark, BenchmarkReport};
pub use algorithms::condensation::{build_condensation, cyclic_components, has_cycle, topological_order};
pub use algorithms::kosaraju::find_scc_kosaraju;
pub use algorithms::selector::{
    find_scc, find_scc_with, is_strongly_connected, recommend_algorithm, recommend_algorithm_with, Algorithm,
};
pub use algorithms::stress::{stress_test, StressFailure, StressReport};
pub use algorithms::tarjan::find_scc_tarjan;
pub use config::{Config, ConfigError, SelectorConfig, StressConfig};
pub use error::{clear_last_error, last_error, ErrorCode, Result, SccError};
pub use types::csr_graph::CsrGraph;
pub use types::graph_query::GraphQuery;
pub use types::scc_result::{Component, ComponentId, ComponentStats, SccResult};
pub use types::{Graph, VertexData, VertexId};
