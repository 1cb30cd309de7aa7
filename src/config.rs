use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Vertex capacity a graph starts with when the caller has no better estimate.
pub const DEFAULT_GRAPH_CAPACITY: usize = 16;

/// Graphs with fewer vertices than this always run Tarjan's engine.
pub const TARJAN_VERTEX_THRESHOLD: usize = 1000;

/// Edge density (`|E| / |V|^2`) above which Kosaraju's engine is preferred.
pub const KOSARAJU_DENSITY_THRESHOLD: f64 = 0.1;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Thresholds used by the algorithm selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Graphs below this vertex count prefer Tarjan.
    pub vertex_threshold: usize,
    /// Graphs at or above the vertex threshold whose density exceeds this prefer Kosaraju.
    pub density_threshold: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            vertex_threshold: TARJAN_VERTEX_THRESHOLD,
            density_threshold: KOSARAJU_DENSITY_THRESHOLD,
        }
    }
}

/// Parameters of the randomized cross-check harness.
///
/// # Fields
///
/// * `trials` - Number of random graphs to generate and check
/// * `vertex_count` - Vertices per generated graph
/// * `edge_probability` - Probability of each ordered pair being connected
/// * `seed` - Base seed; trial `i` uses `seed + i`
/// * `thread_num` - Worker threads checking graphs concurrently
/// * `show_progress` - Draw a progress bar on stderr
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressConfig {
    pub trials: usize,
    pub vertex_count: usize,
    pub edge_probability: f64,
    pub seed: u64,
    pub thread_num: usize,
    pub show_progress: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            trials: 100,
            vertex_count: 64,
            edge_probability: 0.05,
            seed: 0,
            thread_num: 4,
            show_progress: false,
        }
    }
}

/// Top-level configuration file layout. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub selector: SelectorConfig,
    pub stress: StressConfig,
}

impl Config {
    /// Parses a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reads and parses a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}
