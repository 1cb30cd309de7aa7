use std::fmt;

use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use tracing::{debug, warn};

use crate::algorithms::condensation::{build_condensation, topological_order};
use crate::algorithms::kosaraju::find_scc_kosaraju;
use crate::algorithms::tarjan::find_scc_tarjan;
use crate::config::StressConfig;
use crate::error::{fail, record, Result, SccError};
use crate::generate;

/// A trial whose graph violated one of the checked properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StressFailure {
    pub trial: usize,
    /// Seed that regenerates the offending graph.
    pub seed: u64,
    pub reason: String,
}

/// Aggregate outcome of [`stress_test`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StressReport {
    pub trials: usize,
    pub passed: usize,
    pub total_edges: usize,
    pub total_components: usize,
    pub failures: Vec<StressFailure>,
}

impl StressReport {
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} trials passed ({} edges, {} components checked)",
            self.passed, self.trials, self.total_edges, self.total_components
        )?;
        for failure in &self.failures {
            write!(f, "\n  trial {} (seed {}): {}", failure.trial, failure.seed, failure.reason)?;
        }
        Ok(())
    }
}

struct TrialOutcome {
    edges: usize,
    components: usize,
    failure: Option<StressFailure>,
}

/// Cross-checks both engines on many seeded random graphs.
///
/// Trial `i` generates a graph from seed `config.seed + i` and checks that
/// Tarjan and Kosaraju find the same partition, that it covers every vertex,
/// and that the condensation is acyclic. Trials run concurrently on a pool of
/// `config.thread_num` workers; each engine run itself stays single-threaded.
///
/// Property violations are collected in the report. Engine errors such as
/// `OutOfMemory` abort the whole run.
pub fn stress_test(config: &StressConfig) -> Result<StressReport> {
    if config.trials == 0 || config.vertex_count == 0 || config.thread_num == 0 {
        return fail(SccError::InvalidParameter(
            "trials, vertex_count and thread_num must be positive".into(),
        ));
    }
    if !(0.0..=1.0).contains(&config.edge_probability) {
        return fail(SccError::InvalidParameter(format!(
            "edge probability {} is not within [0, 1]",
            config.edge_probability
        )));
    }

    let pool = ThreadPoolBuilder::new()
        .num_threads(config.thread_num)
        .build()
        .map_err(|err| record(SccError::InvalidParameter(err.to_string())))?;

    let pb = if config.show_progress {
        ProgressBar::new(config.trials as u64)
    } else {
        ProgressBar::hidden()
    };
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb.set_message("SCC Cross-Checking.");

    debug!(trials = config.trials, threads = config.thread_num, "starting stress test");
    let outcomes: Vec<Result<TrialOutcome>> = pool.install(|| {
        (0..config.trials)
            .into_par_iter()
            .map(|trial| {
                let outcome = run_trial(config, trial);
                pb.inc(1);
                outcome
            })
            .collect()
    });
    pb.finish_with_message("SCC Cross-Checking Finished.");

    let mut report = StressReport {
        trials: config.trials,
        ..StressReport::default()
    };
    for outcome in outcomes {
        let outcome = outcome?;
        report.total_edges += outcome.edges;
        report.total_components += outcome.components;
        match outcome.failure {
            Some(failure) => {
                warn!(trial = failure.trial, seed = failure.seed, reason = %failure.reason, "stress trial failed");
                report.failures.push(failure);
            }
            None => report.passed += 1,
        }
    }
    Ok(report)
}

fn run_trial(config: &StressConfig, trial: usize) -> Result<TrialOutcome> {
    let seed = config.seed.wrapping_add(trial as u64);
    let mut rng = StdRng::seed_from_u64(seed);
    let graph = generate::random(config.vertex_count, config.edge_probability, &mut rng)?;

    let tarjan = find_scc_tarjan(&graph)?;
    let kosaraju = find_scc_kosaraju(&graph)?;

    let covered: usize = tarjan.components().iter().map(|component| component.len()).sum();
    let reason = if !tarjan.is_equivalent(&kosaraju) {
        Some(format!(
            "engines disagree: tarjan found {} components, kosaraju {}",
            tarjan.component_count(),
            kosaraju.component_count()
        ))
    } else if covered != graph.vertex_count() {
        Some(format!("partition covers {covered} of {} vertices", graph.vertex_count()))
    } else {
        let condensation = build_condensation(&graph, &tarjan)?;
        match topological_order(&condensation) {
            Ok(_) => None,
            Err(_) => Some("condensation has a cycle".to_string()),
        }
    };

    Ok(TrialOutcome {
        edges: graph.edge_count(),
        components: tarjan.component_count(),
        failure: reason.map(|reason| StressFailure { trial, seed, reason }),
    })
}

#[cfg(test)]
mod test_stress {
    use super::*;

    #[test]
    fn test_small_run_passes() {
        let config = StressConfig {
            trials: 20,
            vertex_count: 30,
            edge_probability: 0.08,
            seed: 11,
            thread_num: 2,
            show_progress: false,
        };
        let report = stress_test(&config).unwrap();
        assert_eq!(report.trials, 20);
        assert_eq!(report.passed, 20);
        assert!(report.all_passed());
        assert!(report.total_components >= 20);
        assert!(report.to_string().starts_with("20/20 trials passed"));
    }

    #[test]
    fn test_runs_are_reproducible() {
        let config = StressConfig {
            trials: 5,
            vertex_count: 20,
            edge_probability: 0.1,
            seed: 99,
            thread_num: 3,
            show_progress: false,
        };
        assert_eq!(stress_test(&config).unwrap(), stress_test(&config).unwrap());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let zero_trials = StressConfig {
            trials: 0,
            ..StressConfig::default()
        };
        assert!(stress_test(&zero_trials).is_err());

        let bad_probability = StressConfig {
            edge_probability: -0.5,
            ..StressConfig::default()
        };
        assert!(stress_test(&bad_probability).is_err());
    }
}
