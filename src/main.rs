use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use strongcc::timing::Timer;
use strongcc::{
    benchmark, build_condensation, cyclic_components, find_scc_with, generate, recommend_algorithm_with,
    stress_test, topological_order, Algorithm, ComponentStats, Config, Graph,
};

#[derive(Parser, Debug, Serialize)]
#[command(author, version, about)]
struct Args {

    /// The task to be performed: scc, bench, condense, recommend or stress.
    #[arg(short, long, default_value_t = String::from("scc"))]
    task: String,

    /// Graph shape: random, cycle, chain, complete, self-loops or disjoint-cycles.
    #[arg(short, long, default_value_t = String::from("random"))]
    generator: String,

    /// Number of vertices of the generated graph.
    #[arg(short = 'n', long, default_value_t = 1000)]
    vertices: usize,

    /// Edge probability of the random generator.
    #[arg(short = 'p', long, default_value_t = 0.002)]
    edge_probability: f64,

    /// Cycle length of the disjoint-cycles generator.
    #[arg(long, default_value_t = 3)]
    cycle_size: usize,

    /// Random seed.
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// SCC engine: auto, tarjan or kosaraju.
    #[arg(short, long, default_value_t = String::from("auto"))]
    algorithm: String,

    /// Worker threads of the stress task.
    #[arg(short = 'j', long, default_value_t = 4)]
    num_threads: usize,

    /// Graphs checked by the stress task.
    #[arg(long, default_value_t = 100)]
    trials: usize,

    /// YAML config file; its stress section replaces the stress flags.
    #[arg(short, long)]
    config: Option<String>,

    /// Log at debug level (RUST_LOG takes precedence).
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Serialize)]
struct SccSummary {
    algorithm: Algorithm,
    vertex_count: usize,
    edge_count: usize,
    component_count: usize,
    cyclic_components: usize,
    stats: ComponentStats,
    elapsed_us: u128,
}

#[derive(Serialize)]
struct CondensationSummary {
    components: usize,
    condensation_edges: usize,
    topological_order_len: usize,
    elapsed_us: u128,
}

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn build_graph(args: &Args) -> anyhow::Result<Graph> {
    let vertex_count = args.vertices;
    let graph = match args.generator.as_str() {
        "random" => {
            let mut rng = StdRng::seed_from_u64(args.seed);
            generate::random(vertex_count, args.edge_probability, &mut rng)?
        }
        "cycle" => generate::cycle(vertex_count)?,
        "chain" => generate::chain(vertex_count)?,
        "complete" => generate::complete(vertex_count)?,
        "self-loops" => generate::self_loops(vertex_count)?,
        "disjoint-cycles" => {
            let cycle_size = args.cycle_size.max(1);
            generate::disjoint_cycles(vertex_count / cycle_size, cycle_size)?
        }
        other => bail!("generator '{other}' is not supported"),
    };
    info!(
        generator = %args.generator,
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "graph generated"
    );
    Ok(graph)
}

fn print_yaml<T: Serialize>(value: &T) -> anyhow::Result<()> {
    print!("{}", serde_yaml::to_string(value)?);
    Ok(())
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => Config::from_yaml_file(path).with_context(|| format!("loading {path}"))?,
        None => Config::default(),
    };
    let algorithm: Algorithm = args.algorithm.parse()?;

    // Perform the task, and report the time.
    match args.task.as_str() {
        "scc" => {
            let graph = build_graph(&args)?;
            let algorithm = match algorithm {
                Algorithm::Auto => recommend_algorithm_with(&graph, &config.selector),
                chosen => chosen,
            };
            let execution = Timer::measure(|| find_scc_with(&graph, algorithm));
            execution.log_summary("SCC");
            let result = execution.result?;
            print_yaml(&SccSummary {
                algorithm: result.algorithm(),
                vertex_count: graph.vertex_count(),
                edge_count: graph.edge_count(),
                component_count: result.component_count(),
                cyclic_components: cyclic_components(&graph, &result)?.len(),
                stats: result.stats(),
                elapsed_us: execution.duration.as_micros(),
            })?;
        }
        "bench" => {
            let graph = build_graph(&args)?;
            let report = benchmark(&graph)?;
            println!("{report}");
        }
        "condense" => {
            let graph = build_graph(&args)?;
            let execution = Timer::measure(|| -> strongcc::Result<_> {
                let result = find_scc_with(&graph, algorithm)?;
                let condensation = build_condensation(&graph, &result)?;
                let order = topological_order(&condensation)?;
                Ok((condensation, order))
            });
            execution.log_summary("Condensation");
            let (condensation, order) = execution.result?;
            print_yaml(&CondensationSummary {
                components: condensation.vertex_count(),
                condensation_edges: condensation.edge_count(),
                topological_order_len: order.len(),
                elapsed_us: execution.duration.as_micros(),
            })?;
        }
        "recommend" => {
            let graph = build_graph(&args)?;
            let execution = Timer::measure(|| recommend_algorithm_with(&graph, &config.selector));
            execution.log_report("Recommend");
            println!("{}", execution.result);
        }
        "stress" => {
            let mut stress = config.stress.clone();
            if args.config.is_none() {
                stress.trials = args.trials;
                stress.vertex_count = args.vertices;
                stress.edge_probability = args.edge_probability;
                stress.seed = args.seed;
                stress.thread_num = args.num_threads;
                stress.show_progress = true;
            }
            let report = strongcc::measure_time!("Stress", { stress_test(&stress) })?;
            println!("{report}");
            if !report.all_passed() {
                bail!("{} of {} stress trials failed", report.failures.len(), report.trials);
            }
        }
        other => bail!("task '{other}' is not supported"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Args = Args::parse();
    setup_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
