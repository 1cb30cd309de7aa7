use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::kosaraju::find_scc_kosaraju;
use crate::algorithms::tarjan::find_scc_tarjan;
use crate::config::SelectorConfig;
use crate::error::{record, Result, SccError};
use crate::types::graph_query::GraphQuery;
use crate::types::scc_result::SccResult;

/// SCC engine choice. `Auto` defers to [`recommend_algorithm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Auto,
    Tarjan,
    Kosaraju,
}

impl Algorithm {
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Auto => "auto",
            Algorithm::Tarjan => "tarjan",
            Algorithm::Kosaraju => "kosaraju",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SccError;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "auto" => Ok(Algorithm::Auto),
            "tarjan" => Ok(Algorithm::Tarjan),
            "kosaraju" => Ok(Algorithm::Kosaraju),
            _ => Err(record(SccError::InvalidParameter(format!(
                "unknown algorithm '{name}' (expected auto, tarjan or kosaraju)"
            )))),
        }
    }
}

/// Picks an engine from graph shape using the default thresholds.
///
/// Never returns [`Algorithm::Auto`].
pub fn recommend_algorithm<G: GraphQuery>(graph: &G) -> Algorithm {
    recommend_algorithm_with(graph, &SelectorConfig::default())
}

/// Picks an engine from graph shape:
///
/// 1. fewer than `vertex_threshold` vertices (empty included): Tarjan
/// 2. density `|E| / |V|^2` above `density_threshold`: Kosaraju
/// 3. otherwise: Tarjan
pub fn recommend_algorithm_with<G: GraphQuery>(graph: &G, config: &SelectorConfig) -> Algorithm {
    let vertex_count = graph.vertex_count();
    if vertex_count < config.vertex_threshold || vertex_count == 0 {
        return Algorithm::Tarjan;
    }
    let density = graph.edge_count() as f64 / (vertex_count as f64 * vertex_count as f64);
    if density > config.density_threshold {
        Algorithm::Kosaraju
    } else {
        Algorithm::Tarjan
    }
}

/// Computes the strongly connected components with the recommended engine.
///
/// The returned result records which engine actually ran.
pub fn find_scc<G: GraphQuery>(graph: &G) -> Result<SccResult> {
    find_scc_with(graph, Algorithm::Auto)
}

/// Computes the strongly connected components with a chosen engine.
pub fn find_scc_with<G: GraphQuery>(graph: &G, algorithm: Algorithm) -> Result<SccResult> {
    let algorithm = match algorithm {
        Algorithm::Auto => recommend_algorithm(graph),
        chosen => chosen,
    };
    debug!(%algorithm, "dispatching scc computation");
    match algorithm {
        Algorithm::Kosaraju => find_scc_kosaraju(graph),
        _ => find_scc_tarjan(graph),
    }
}

/// Checks if every vertex can reach every other vertex.
///
/// # Errors
/// `GraphEmpty` if the graph has no vertices.
pub fn is_strongly_connected<G: GraphQuery>(graph: &G) -> Result<bool> {
    Ok(find_scc(graph)?.component_count() == 1)
}

#[cfg(test)]
mod test_selector {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::{Graph, VertexId};

    fn complete(vertex_count: usize) -> Graph {
        let mut graph = Graph::with_vertices(vertex_count).unwrap();
        for src in 0..vertex_count as VertexId {
            for dest in 0..vertex_count as VertexId {
                if src != dest {
                    graph.add_edge(src, dest).unwrap();
                }
            }
        }
        graph
    }

    #[test]
    fn test_small_graphs_use_tarjan() {
        assert_eq!(recommend_algorithm(&complete(5)), Algorithm::Tarjan);
        assert_eq!(recommend_algorithm(&Graph::with_vertices(0).unwrap()), Algorithm::Tarjan);
    }

    #[test]
    fn test_dense_large_graph_uses_kosaraju() {
        let config = SelectorConfig {
            vertex_threshold: 10,
            ..SelectorConfig::default()
        };
        assert_eq!(recommend_algorithm_with(&complete(12), &config), Algorithm::Kosaraju);
        assert_eq!(
            recommend_algorithm_with(&Graph::with_vertices(12).unwrap(), &config),
            Algorithm::Tarjan
        );
    }

    #[test]
    fn test_density_threshold_is_exclusive() {
        // 10 edges over 10 vertices: density exactly 0.1.
        let mut graph = Graph::with_vertices(10).unwrap();
        for src in 0..10 {
            graph.add_edge(src, (src + 1) % 10).unwrap();
        }
        let config = SelectorConfig {
            vertex_threshold: 10,
            density_threshold: 0.1,
        };
        assert_eq!(recommend_algorithm_with(&graph, &config), Algorithm::Tarjan);
    }

    #[test]
    fn test_default_threshold_boundary() {
        let below = Graph::with_vertices(999).unwrap();
        let at = Graph::with_vertices(1000).unwrap();
        assert_eq!(recommend_algorithm(&below), Algorithm::Tarjan);
        assert_eq!(recommend_algorithm(&at), Algorithm::Tarjan);
    }

    #[test]
    fn test_find_scc_records_engine() {
        let graph = complete(4);
        assert_eq!(find_scc(&graph).unwrap().algorithm(), Algorithm::Tarjan);
        let result = find_scc_with(&graph, Algorithm::Kosaraju).unwrap();
        assert_eq!(result.algorithm(), Algorithm::Kosaraju);
        assert_eq!(result.component_count(), 1);
    }

    #[test]
    fn test_is_strongly_connected() {
        assert!(is_strongly_connected(&complete(3)).unwrap());
        assert!(is_strongly_connected(&Graph::with_vertices(1).unwrap()).unwrap());
        assert!(!is_strongly_connected(&Graph::with_vertices(2).unwrap()).unwrap());
        assert_eq!(
            is_strongly_connected(&Graph::with_vertices(0).unwrap()).unwrap_err().code(),
            ErrorCode::GraphEmpty
        );
    }

    #[test]
    fn test_reference_graphs_on_both_engines() {
        use crate::algorithms::condensation::build_condensation;
        use crate::generate;

        let mut bridged = generate::disjoint_cycles(2, 3).unwrap();
        bridged.add_edge(2, 3).unwrap();

        let cases: Vec<(Graph, Vec<usize>)> = vec![
            (generate::cycle(4).unwrap(), vec![4]),
            (bridged, vec![3, 3]),
            (generate::chain(5).unwrap(), vec![1; 5]),
            (generate::self_loops(3).unwrap(), vec![1; 3]),
            (generate::complete(4).unwrap(), vec![4]),
        ];
        for (graph, expected_sizes) in &cases {
            for algorithm in [Algorithm::Tarjan, Algorithm::Kosaraju] {
                let result = find_scc_with(graph, algorithm).unwrap();
                let mut sizes: Vec<usize> = result.components().iter().map(|c| c.len()).collect();
                sizes.sort_unstable();
                assert_eq!(&sizes, expected_sizes, "{algorithm} on {graph:?}");
            }
        }

        let (bridged, _) = &cases[1];
        let result = find_scc(bridged).unwrap();
        assert_eq!(build_condensation(bridged, &result).unwrap().edge_count(), 1);

        let empty = Graph::with_vertices(0).unwrap();
        assert_eq!(find_scc(&empty).unwrap_err().code(), ErrorCode::GraphEmpty);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("Tarjan".parse::<Algorithm>().unwrap(), Algorithm::Tarjan);
        assert_eq!("kosaraju".parse::<Algorithm>().unwrap(), Algorithm::Kosaraju);
        assert_eq!(Algorithm::Auto.to_string(), "auto");
        assert!("dijkstra".parse::<Algorithm>().is_err());
    }
}
