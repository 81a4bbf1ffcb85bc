use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use archrecon_core::binder::InterfacePortBinder;
use archrecon_core::config::{Config, CONFIG_FILE};
use archrecon_core::metrics::{MetricContext, MetricRegistry};
use archrecon_core::pipeline;
use archrecon_core::snapshot::Snapshot;

use archrecon_report::{json, text};

#[derive(Parser)]
#[command(name = "archrecon")]
#[command(about = "Score component candidates and bind composite interfaces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every pair of candidate groupings with all built-in metrics
    Score {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Config file path (defaults to .archrecon.toml next to the snapshot)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Bind the interfaces of every composite in the component hierarchy
    Bind {
        /// Snapshot JSON file
        snapshot: PathBuf,
        /// Config file path
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Create a default .archrecon.toml configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Score {
            snapshot,
            config,
            json,
        } => cmd_score(&snapshot, config.as_deref(), json),
        Commands::Bind {
            snapshot,
            config,
            json,
        } => cmd_bind(&snapshot, config.as_deref(), json),
        Commands::Init { force } => cmd_init(force),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(2);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_score(snapshot_path: &Path, config_path: Option<&Path>, as_json: bool) -> Result<()> {
    let config = load_config(snapshot_path, config_path)?;
    let snapshot = Snapshot::load(snapshot_path)?;
    let graph = snapshot
        .build_graph()
        .context("snapshot describes an inconsistent type graph")?;

    let filter = config.blacklist_filter()?;
    let candidates = snapshot
        .candidates(&graph, &filter)
        .context("failed to resolve candidate groupings")?;
    info!(
        types = graph.type_count(),
        candidates = candidates.len(),
        "scoring candidates"
    );

    let ctx = MetricContext::initialize(&graph, config.trimmer());
    let registry = MetricRegistry::with_defaults();
    let result = pipeline::score_candidates(&ctx, &registry, &candidates)?;
    debug!(
        memoised_unions = ctx.access().memoised_unions(),
        "scoring finished"
    );

    if as_json {
        println!("{}", json::format_scores(&result, false)?);
    } else {
        print!("{}", text::format_scores(&result));
    }
    Ok(())
}

fn cmd_bind(snapshot_path: &Path, config_path: Option<&Path>, as_json: bool) -> Result<()> {
    let config = load_config(snapshot_path, config_path)?;
    let snapshot = Snapshot::load(snapshot_path)?;
    let root = snapshot
        .links
        .as_ref()
        .context("snapshot has no component links to bind")?;

    let repository = snapshot
        .repository()
        .context("snapshot describes an inconsistent component repository")?;
    let binder = InterfacePortBinder::new(&repository, snapshot.system.as_ref())
        .with_policy(config.exhibit_policy());
    let result = pipeline::bind_hierarchy(&binder, root)?;

    if as_json {
        println!("{}", json::format_bindings(&result, false)?);
    } else {
        print!("{}", text::format_bindings(&result));
    }
    Ok(())
}

fn cmd_init(force: bool) -> Result<()> {
    let target = PathBuf::from(CONFIG_FILE);
    if target.exists() && !force {
        anyhow::bail!("{CONFIG_FILE} already exists. Use --force to overwrite.");
    }
    std::fs::write(&target, Config::default_toml())
        .with_context(|| format!("failed to write {CONFIG_FILE}"))?;
    println!("Created {CONFIG_FILE} with default configuration.");
    Ok(())
}

fn load_config(snapshot_path: &Path, config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(p) => Config::load(p),
        None => {
            let dir = snapshot_path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            Ok(Config::load_or_default(dir))
        }
    }
}
