//! Visualizer Headless - Run One Visualization Without a Renderer
//!
//! Loads configuration, selects an algorithm, plays it to completion and
//! prints every distinct snapshot the engine publishes.
//!
//! # Usage
//!
//! ```bash
//! # Play the configured default sort
//! visualizer-headless
//!
//! # Play Dijkstra at full speed, snapshots as JSON lines
//! visualizer-headless dijkstra --speed 100 --json
//!
//! # A mode name plays that mode's configured default algorithm
//! visualizer-headless recursion --input 6
//!
//! # List algorithm identifiers
//! visualizer-headless --list
//!
//! # Verbose logging
//! RUST_LOG=debug visualizer-headless bfs
//! ```
//!
//! Logs go to stderr; snapshots go to stdout.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info};

use visualizer_core::{
    default_config_path, load_config_from_path, Algorithm, ConfigOverrides, Engine,
    EngineConfig, EngineMessage, GraphAlgorithm, Mode, Phase, RecursionAlgorithm, Scene,
    Snapshot, SortAlgorithm, TreeAlgorithm,
};

/// Unread snapshots held for stdout before newer ones are dropped
const SNAPSHOT_BACKLOG: usize = 4096;

/// Visualizer Headless - play one algorithm visualization without a renderer
#[derive(Parser, Debug)]
#[command(name = "visualizer-headless")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Algorithm identifier, or a mode name (sorting, graph, tree, recursion)
    algorithm: Option<String>,

    /// Playback speed, 1 (slowest) to 100 (fastest)
    #[arg(short = 's', long)]
    speed: Option<i64>,

    /// Mode input: array size, search key or recursion argument
    #[arg(short = 'i', long)]
    input: Option<i64>,

    /// Seed for the demo array
    #[arg(long)]
    seed: Option<u64>,

    /// Print snapshots as JSON lines
    #[arg(long)]
    json: bool,

    /// Configuration file path
    #[arg(short = 'c', long, env = "VISUALIZER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// List algorithm identifiers and exit
    #[arg(long)]
    list: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "visualizer_core={level},visualizer_headless={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Resolve a positional argument against the configuration
fn resolve_algorithm(config: &EngineConfig, id: &str) -> Result<Algorithm> {
    let mode = match id.trim().to_ascii_lowercase().as_str() {
        "sorting" => Some(Mode::Sorting),
        "graph" => Some(Mode::Graph),
        "tree" => Some(Mode::Tree),
        "recursion" => Some(Mode::Recursion),
        _ => None,
    };
    match mode {
        Some(mode) => Ok(config.algorithm_for(mode)),
        None => id
            .parse()
            .with_context(|| format!("Unknown algorithm {id:?}; try --list")),
    }
}

fn print_algorithms() {
    fn line(mode: &str, ids: impl Iterator<Item = &'static str>) {
        println!("{mode:<10} {}", ids.collect::<Vec<_>>().join(", "));
    }
    line("sorting", SortAlgorithm::ALL.iter().map(|a| a.id()));
    line("graph", GraphAlgorithm::ALL.iter().map(|a| a.id()));
    line("tree", TreeAlgorithm::ALL.iter().map(|a| a.id()));
    line("recursion", RecursionAlgorithm::ALL.iter().map(|a| a.id()));
}

/// One human-readable line per snapshot
fn describe(snapshot: &Snapshot) -> String {
    let head = format!(
        "[{:>5}] {:<8} {}",
        snapshot.mutations,
        format!("{:?}", snapshot.phase).to_lowercase(),
        snapshot.algorithm
    );
    match &snapshot.scene {
        Scene::Bars { bars } => {
            let values: Vec<String> = bars.iter().map(|b| b.value.to_string()).collect();
            let cursor = snapshot
                .cursor
                .map(|c| format!(" step {}/{}", c.position, c.total))
                .unwrap_or_default();
            format!(
                "{head}{cursor} cmp={} swp={} [{}]",
                snapshot.counters.comparisons,
                snapshot.counters.swaps,
                values.join(" ")
            )
        }
        Scene::Calls { .. } => format!(
            "{head} order=[{}] stack=[{}]",
            snapshot.order.join(" "),
            snapshot.call_stack.join(" > ")
        ),
        Scene::Graph { .. } | Scene::Tree { .. } => {
            format!("{head} order=[{}]", snapshot.order.join(" "))
        }
    }
}

fn emit(out: &mut impl Write, snapshot: &Snapshot, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, snapshot)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", describe(snapshot))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    if args.list {
        print_algorithms();
        return Ok(());
    }

    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(ref id) = args.algorithm {
        overrides = overrides.with_algorithm(resolve_algorithm(&config, id)?);
    }
    if let Some(speed) = args.speed {
        overrides = overrides.with_speed(speed);
    }
    if let Some(seed) = args.seed {
        overrides = overrides.with_seed(seed);
    }
    overrides.apply(&mut config);
    info!(
        algorithm = %config.initial_algorithm(),
        speed = config.speed.get(),
        source = %config.source(),
        "Configuration resolved"
    );

    let (tx, mut rx) = mpsc::channel(256);
    let mut engine = Engine::new(&config, tx);
    if let Some(value) = args.input {
        engine.set_input(value).context("Input rejected")?;
    }

    tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            match message {
                EngineMessage::RunFinished {
                    algorithm,
                    order,
                    mutations,
                } => info!(%algorithm, order = %order.join(","), mutations, "Finished"),
                other => debug!(message = ?other, "Engine message"),
            }
        }
    });

    let mut snapshots = engine.tap_snapshots(SNAPSHOT_BACKLOG);
    let mut stdout = std::io::stdout().lock();
    let mut last = engine.snapshot();
    emit(&mut stdout, &last, args.json)?;

    engine.play().context("Failed to start run")?;

    loop {
        tokio::select! {
            received = snapshots.recv() => {
                let Some(snapshot) = received else {
                    break;
                };
                if snapshot == last {
                    continue;
                }
                emit(&mut stdout, &snapshot, args.json)?;
                let done = snapshot.phase != Phase::Running;
                last = snapshot;
                if done {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, resetting");
                engine.reset();
                break;
            }
        }
    }

    engine.wait_idle().await;
    stdout.flush()?;
    Ok(())
}
