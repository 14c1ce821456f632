use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use u_tour::cache::CacheKind;
use u_tour::experiment::{default_input, read_waypoint_sets, ExperimentConfig, ExperimentRunner};
use u_tour::graph::{AccessMode, GraphConfig, GraphSize, StoreKind};
use u_tour::matrix::MatrixConfig;
use u_tour::search::{FrontierKind, SearchConfig};

#[derive(Parser, Debug)]
#[command(
    name = "u-tour",
    version,
    about = "Shortest waypoint tours over cached graphs: one-to-many Dijkstra plus annealing"
)]
struct Args {
    /// Backing store: csv or grid.
    store: StoreKind,

    /// Graph access: all (preload) or on_demand.
    access: AccessMode,

    /// Size class: tiny, small, medium, large or eu.
    size: GraphSize,

    /// Search frontier: binary_heap or priority_queue.
    frontier: Option<FrontierKind>,

    /// Edge file for the csv store.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Waypoint sets, one comma-separated line each. Defaults to the
    /// reference set of the size class.
    #[arg(long)]
    inputs: Option<PathBuf>,

    /// Cache eviction strategy.
    #[arg(long, default_value = "linked")]
    cache: CacheKind,

    /// Cache capacity in elements for on-demand access.
    #[arg(long, default_value_t = 500)]
    capacity: usize,

    /// Fraction of the graph preloaded in `all` mode.
    #[arg(long, default_value_t = 1.0)]
    preload_ratio: f64,

    /// Runs per waypoint set.
    #[arg(long, default_value_t = 3)]
    repetitions: usize,

    /// Byte budget for a single search before it reports out of memory.
    #[arg(long)]
    memory_budget: Option<usize>,

    /// JSON lines output. Defaults to `{store}-{access}-{size}-experiment_results.jsonl`.
    #[arg(long)]
    results: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn experiment_config(&self) -> ExperimentConfig {
        let mut search = SearchConfig::default().with_frontier(self.frontier.unwrap_or_default());
        if let Some(budget) = self.memory_budget {
            search = search.with_memory_budget(budget);
        }
        let graph = GraphConfig::default()
            .with_access_mode(self.access)
            .with_size(self.size)
            .with_cache(self.cache)
            .with_capacity(self.capacity)
            .with_preload_ratio(self.preload_ratio);

        let mut config = ExperimentConfig::default()
            .with_store(self.store)
            .with_graph(graph)
            .with_matrix(MatrixConfig::default().with_search(search))
            .with_repetitions(self.repetitions);
        if let Some(path) = &self.data {
            config = config.with_data_path(path);
        }
        config
    }

    fn results_path(&self) -> PathBuf {
        self.results.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "{}-{}-{}-experiment_results.jsonl",
                self.store, self.access, self.size
            ))
        })
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .with_context(|| format!("invalid log filter `{}`", args.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = args.experiment_config();
    config.validate().context("invalid configuration")?;

    let sets = match &args.inputs {
        Some(path) => read_waypoint_sets(path)?,
        None => vec![default_input(args.size)],
    };
    info!(
        store = %args.store,
        access = %args.access,
        size = %args.size,
        sets = sets.len(),
        "starting experiment"
    );

    let report = ExperimentRunner::new(config)
        .run(&sets)
        .context("experiment failed")?;

    let path = args.results_path();
    let file =
        File::create(&path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for run in &report.runs {
        serde_json::to_writer(&mut out, run)?;
        writeln!(out)?;
    }
    for failure in &report.failures {
        serde_json::to_writer(&mut out, &json!({ "failure": failure }))?;
        writeln!(out)?;
    }
    if let Some(halt) = &report.halt {
        serde_json::to_writer(&mut out, &json!({ "halt": halt }))?;
        writeln!(out)?;
    }
    out.flush()?;

    info!(
        runs = report.runs.len(),
        failures = report.failures.len(),
        total_secs = report.total_secs,
        results = %path.display(),
        "experiment finished"
    );

    if let Some(halt) = report.halt {
        error!(set = halt.set, repetition = halt.repetition, "{}", halt.search);
        bail!(
            "out of memory on set {} repetition {}; cache {}",
            halt.set,
            halt.repetition,
            halt.cache_footprint
        );
    }
    Ok(())
}
