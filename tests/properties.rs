//! Property-based tests for the SCC engines
//!
//! Both engines must agree on every graph, produce a total partition, and the
//! condensation of any graph must be acyclic.

use proptest::prelude::*;
use rayon::prelude::*;
use strongcc::{
    build_condensation, find_scc_kosaraju, find_scc_tarjan, has_cycle, topological_order, CsrGraph,
    Graph, VertexId,
};

// ============================================================================
// Helper functions
// ============================================================================

/// Builds a graph from a vertex count and an edge list, skipping duplicates.
fn build_graph(vertex_count: usize, edges: &[(VertexId, VertexId)]) -> Graph {
    let mut graph = Graph::with_vertices(vertex_count).unwrap();
    for &(src, dest) in edges {
        if !graph.has_edge(src, dest) {
            graph.add_edge(src, dest).unwrap();
        }
    }
    graph
}

/// Non-empty graphs of up to 40 vertices with up to three edges per vertex.
fn arb_graph() -> impl Strategy<Value = Graph> {
    (1usize..40).prop_flat_map(|vertex_count| {
        let vertex = 0..vertex_count as VertexId;
        prop::collection::vec((vertex.clone(), vertex), 0..vertex_count * 3)
            .prop_map(move |edges| build_graph(vertex_count, &edges))
    })
}

// ============================================================================
// Engine properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_partition_is_total(graph in arb_graph()) {
        for result in [find_scc_tarjan(&graph).unwrap(), find_scc_kosaraju(&graph).unwrap()] {
            let mut seen = vec![false; graph.vertex_count()];
            for (id, component) in result.components().iter().enumerate() {
                prop_assert!(!component.is_empty());
                for &vertex in component.vertices() {
                    prop_assert!(!seen[vertex as usize], "vertex {} listed twice", vertex);
                    seen[vertex as usize] = true;
                    prop_assert_eq!(result.vertex_component(vertex).unwrap() as usize, id);
                }
            }
            prop_assert!(seen.iter().all(|&covered| covered));
            let total: usize = result.components().iter().map(|component| component.len()).sum();
            prop_assert_eq!(total, graph.vertex_count());
        }
    }

    #[test]
    fn prop_engines_agree(graph in arb_graph()) {
        let tarjan = find_scc_tarjan(&graph).unwrap();
        let kosaraju = find_scc_kosaraju(&graph).unwrap();
        prop_assert!(tarjan.is_equivalent(&kosaraju));
        prop_assert_eq!(tarjan.partition(), kosaraju.partition());
    }

    #[test]
    fn prop_condensation_is_acyclic(graph in arb_graph()) {
        let result = find_scc_tarjan(&graph).unwrap();
        let condensation = build_condensation(&graph, &result).unwrap();
        prop_assert_eq!(condensation.vertex_count(), result.component_count());
        prop_assert!(!has_cycle(&condensation).unwrap());
        prop_assert!(topological_order(&condensation).is_ok());
        for (src, dest) in condensation.edges() {
            prop_assert_ne!(src, dest);
        }
    }

    #[test]
    fn prop_recomputation_is_idempotent(graph in arb_graph()) {
        let before: Vec<_> = graph.edges().collect();
        let first = find_scc_tarjan(&graph).unwrap();
        let second = find_scc_tarjan(&graph).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(graph.edges().collect::<Vec<_>>(), before);
        prop_assert!(graph.is_valid());
    }

    #[test]
    fn prop_tarjan_emits_reverse_topological_order(graph in arb_graph()) {
        let result = find_scc_tarjan(&graph).unwrap();
        for (src, dest) in graph.edges() {
            let from = result.vertex_component(src).unwrap();
            let to = result.vertex_component(dest).unwrap();
            prop_assert!(from >= to, "edge {} -> {} goes from component {} to {}", src, dest, from, to);
        }
    }

    #[test]
    fn prop_kosaraju_emits_topological_order(graph in arb_graph()) {
        let result = find_scc_kosaraju(&graph).unwrap();
        for (src, dest) in graph.edges() {
            prop_assert!(result.vertex_component(src).unwrap() <= result.vertex_component(dest).unwrap());
        }
    }

    #[test]
    fn prop_transpose_is_an_involution(graph in arb_graph()) {
        let twice = graph.transpose().unwrap().transpose().unwrap();
        let mut expected: Vec<_> = graph.edges().collect();
        let mut actual: Vec<_> = twice.edges().collect();
        expected.sort_unstable();
        actual.sort_unstable();
        prop_assert_eq!(expected, actual);

        // Reversing every edge keeps the components.
        let transposed = find_scc_tarjan(&graph.transpose().unwrap()).unwrap();
        prop_assert!(transposed.is_equivalent(&find_scc_tarjan(&graph).unwrap()));
    }

    #[test]
    fn prop_csr_view_matches_graph(graph in arb_graph()) {
        let csr = CsrGraph::from_query(&graph).unwrap();
        prop_assert_eq!(csr.edge_count(), graph.edge_count());
        prop_assert!(find_scc_kosaraju(&csr).unwrap().is_equivalent(&find_scc_tarjan(&graph).unwrap()));
    }
}

// ============================================================================
// Concurrent reads
// ============================================================================

#[test]
fn concurrent_runs_share_one_graph() {
    let mut edges = Vec::new();
    for block in 0..50u32 {
        let base = block * 4;
        edges.extend([(base, base + 1), (base + 1, base + 2), (base + 2, base), (base + 2, base + 3)]);
    }
    let graph = build_graph(200, &edges);
    let expected = find_scc_tarjan(&graph).unwrap();

    let results: Vec<_> = (0..16)
        .into_par_iter()
        .map(|run| {
            if run % 2 == 0 {
                find_scc_tarjan(&graph).unwrap()
            } else {
                find_scc_kosaraju(&graph).unwrap()
            }
        })
        .collect();

    assert!(results.iter().all(|result| result.is_equivalent(&expected)));
    assert_eq!(expected.component_count(), 100);
}
