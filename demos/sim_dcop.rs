//! Config-driven SyncBB run over a graph coloring, N-Queens or integer chain problem

use chrono::Local;
use clap::Parser;
use serde::Deserialize;
use std::path::Path;
use std::time::Instant;
use syncbb::config::load_config;
use syncbb::logger;
use syncbb::problem::{
    ChainProblem, ColoringGenParams, ProblemInstance, Queens, SourceMode, build_report,
    generate_random_coloring, load_coloring, save_coloring, write_report_json,
};
use syncbb::dcop::engine::logging as syncbb_log;
use syncbb::Outcome;
use tracing::{info, warn};

#[derive(Debug, Deserialize, Clone)]
struct FileSourceConfig {
    path: String,
}

#[derive(Debug, Deserialize, Clone)]
struct ColoringSourceWrapper {
    mode: SourceMode,
    #[serde(default)]
    random: Option<ColoringGenParams>,
    #[serde(default)]
    file: Option<FileSourceConfig>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(try_from = "ColoringSourceWrapper")]
enum ColoringSourceConfig {
    Random(ColoringGenParams),
    File(FileSourceConfig),
}

impl TryFrom<ColoringSourceWrapper> for ColoringSourceConfig {
    type Error = String;

    fn try_from(w: ColoringSourceWrapper) -> Result<Self, Self::Error> {
        match w.mode {
            SourceMode::Random => Ok(ColoringSourceConfig::Random(w.random.unwrap_or_default())),
            SourceMode::File => w
                .file
                .map(ColoringSourceConfig::File)
                .ok_or_else(|| "Missing file config for file mode".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ProblemConfig {
    Coloring(ColoringSourceConfig),
    Queens(Queens),
    Chain(ChainProblem),
}

impl Default for ProblemConfig {
    fn default() -> Self {
        ProblemConfig::Queens(Queens::four())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct OutputConfig {
    dir: String,
    use_timestamp: bool,
    timestamp_fmt: String,
    log_level: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "results".to_string(),
            use_timestamp: true,
            timestamp_fmt: "%Y-%m-%d_%H-%M-%S".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SimConfig {
    problem: ProblemConfig,
    /// Turn limit for the driving loop, 0 for none
    max_steps: u64,
    output_config: OutputConfig,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (.json, or .pkl evaluated through the pkl CLI)
    #[arg(long, default_value = "demos/config.json")]
    config: String,

    /// Override the configured turn limit
    #[arg(long)]
    max_steps: Option<u64>,
}

fn solve<P: ProblemInstance>(problem: &P, max_steps: u64) -> syncbb::Result<Outcome<P::Value>> {
    let mut engine = problem.build_with(problem.engine_config().with_max_steps(max_steps))?;
    syncbb_log::log_order_status(engine.order());
    engine.run()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = &cli.config;
    let mut config: SimConfig = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config {}: {}", config_path, e);
            return Err(e.into());
        }
    };
    if let Some(max_steps) = cli.max_steps {
        config.max_steps = max_steps;
    }

    let output = &config.output_config;
    let result_dir = if output.use_timestamp {
        let date_str = Local::now().format(&output.timestamp_fmt).to_string();
        Path::new(&output.dir).join(date_str)
    } else {
        Path::new(&output.dir).to_path_buf()
    };
    std::fs::create_dir_all(&result_dir)?;

    let log_path = result_dir.join("simulation.log");
    let _guard = logger::init(log_path, &output.log_level)?;

    info!("Loaded configuration from {}", config_path);
    info!("Results will be saved to: {}", result_dir.display());

    let run_start = Instant::now();
    let report = match &config.problem {
        ProblemConfig::Coloring(source) => {
            let problem = match source {
                ColoringSourceConfig::Random(params) => {
                    info!("Generating random coloring over {} nodes", params.nodes);
                    let problem = generate_random_coloring(params)?;
                    save_coloring(&problem, &result_dir.join("coloring.json"))?;
                    problem
                }
                ColoringSourceConfig::File(cfg) => {
                    info!("Loading coloring from file: {}", cfg.path);
                    let path = Path::new(&cfg.path);
                    if let Err(e) = std::fs::copy(path, result_dir.join("coloring.json")) {
                        warn!("Failed to copy coloring file: {}", e);
                    }
                    load_coloring(path)?
                }
            };
            info!(
                "Coloring with {} nodes, {} edges, {} colors",
                problem.nodes.len(),
                problem.edges.len(),
                problem.colors
            );
            let outcome = solve(&problem, config.max_steps)?;
            if let Some(solution) = &outcome.solution {
                info!("Conflicting edges: {}", problem.conflicts(solution.assignment()));
            }
            build_report(&outcome, problem.nodes.len(), problem.max_cost, run_start)
        }
        ProblemConfig::Queens(queens) => {
            info!(
                "{} queens on a {}x{} board",
                queens.num_agents, queens.board_size, queens.board_size
            );
            let outcome = solve(queens, config.max_steps)?;
            build_report(&outcome, queens.num_agents as usize, queens.max_cost, run_start)
        }
        ProblemConfig::Chain(chain) => {
            info!(
                "Chain of {} agents with checker {}",
                chain.domains.len(),
                chain.checker
            );
            let outcome = solve(chain, config.max_steps)?;
            build_report(&outcome, chain.domains.len(), chain.max_cost, run_start)
        }
    };

    let summary_path = write_report_json(&report, &result_dir)?;
    info!("Summary written to {}", summary_path.display());

    Ok(())
}
