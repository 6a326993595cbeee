use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use combinadas::combinations;
use combinadas::logging;
use combinadas::persist;
use combinadas::report::{self, Execution};

const DEFAULT_SLATE_PATH: &str = "data/jornada.json";
const DEFAULT_PICKS_OUTPUT: &str = "public/data/picks_complete.json";
const DEFAULT_COMBOS_OUTPUT: &str = "public/data/combinadas.json";

#[derive(Debug, Clone, PartialEq)]
struct RunConfig {
    slate_path: PathBuf,
    picks_output: PathBuf,
    combos_output: PathBuf,
    model_config: Option<PathBuf>,
    allocator_config: Option<PathBuf>,
    parallel: bool,
}

impl RunConfig {
    fn from_env() -> Self {
        Self {
            slate_path: env_path("SLATE_PATH").unwrap_or_else(|| DEFAULT_SLATE_PATH.into()),
            picks_output: env_path("PICKS_OUTPUT_PATH")
                .unwrap_or_else(|| DEFAULT_PICKS_OUTPUT.into()),
            combos_output: env_path("COMBINADAS_OUTPUT_PATH")
                .unwrap_or_else(|| DEFAULT_COMBOS_OUTPUT.into()),
            model_config: env_path("MODEL_CONFIG_PATH"),
            allocator_config: env_path("ALLOCATOR_CONFIG_PATH"),
            parallel: env_bool("REPORT_PARALLEL", true),
        }
    }

    fn apply_args(mut self, args: &[String]) -> Self {
        if let Some(p) = parse_path_arg(args, "--slate") {
            self.slate_path = p;
        }
        if let Some(p) = parse_path_arg(args, "--picks-out") {
            self.picks_output = p;
        }
        if let Some(p) = parse_path_arg(args, "--combos-out") {
            self.combos_output = p;
        }
        if has_flag(args, "--sequential") {
            self.parallel = false;
        }
        self
    }

    fn execution(&self) -> Execution {
        if self.parallel {
            Execution::Parallel
        } else {
            Execution::Sequential
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init_logging();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let run = RunConfig::from_env().apply_args(&args);

    let slate = persist::load_slate(&run.slate_path)?;
    let model = persist::load_model_config(run.model_config.as_deref())?;
    let allocator = persist::load_allocator_config(run.allocator_config.as_deref())?;
    info!(
        slate = %run.slate_path.display(),
        fixtures = slate.fixtures.len(),
        priced = slate.odds.len(),
        "slate loaded"
    );

    let report = report::generate_report(&slate, &model, run.execution())
        .context("generate report")?;
    persist::write_json_atomic(&run.picks_output, &report)?;

    let allocation = combinations::allocate(&report, &allocator).context("allocate parlays")?;
    persist::write_json_atomic(&run.combos_output, &allocation)?;

    info!(
        picks = report.summary.total_picks,
        staked = report.summary.staked_picks,
        roi_pct = report.summary.expected_roi_percent,
        pool = allocation.pool_size,
        parlays = allocation.stats.total,
        skipped = allocation.skipped.len(),
        picks_out = %run.picks_output.display(),
        combos_out = %run.combos_output.display(),
        "run complete"
    );
    Ok(())
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

fn parse_path_arg(args: &[String], name: &str) -> Option<PathBuf> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&format!("{name}="))
            && !v.trim().is_empty()
        {
            return Some(PathBuf::from(v.trim()));
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next.trim()));
        }
    }
    None
}
