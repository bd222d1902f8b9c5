use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cogito_core::{Config, Mind, export_json};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "cogito", about = "Drive a simulated cognitive state from the command line")]
struct Cli {
    /// TOML config file (falls back to $COGITO_CONFIG, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fixed RNG seed, overriding the config
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Stimuli file, one per line, processed before the command runs
    #[arg(long, global = true)]
    feed: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process stimuli through resonance, memory and one engine step each
    Process {
        #[arg(required = true)]
        texts: Vec<String>,

        #[arg(long, default_value_t = 1.0)]
        intensity: f64,

        /// Print thoughts as JSON instead of one line each
        #[arg(long)]
        json: bool,
    },

    /// Resonate a stimulus without touching memory
    Think { text: String },

    /// Show what memory holds about a concept
    Recall { concept: String },

    /// Check whether a question is reachable from a premise in memory
    Reason { premise: String, question: String },

    /// Think a scenario and let the engine evolve
    Imagine {
        scenario: String,

        #[arg(long, default_value_t = 10)]
        steps: usize,
    },

    /// Run one consolidation pass
    Dream,

    /// Show memory statistics, recent experiences and essence principles
    Summary,

    /// Export the full state as JSON
    Snapshot {
        /// Output file; stdout when absent
        path: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var("COGITO_CONFIG").ok().map(PathBuf::from));

    let mut config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Config::from_toml_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => Config::default(),
    };
    if let Some(seed) = cli.seed {
        config.mind.seed = Some(seed);
    }
    Ok(config)
}

fn build_mind(cli: &Cli) -> Result<Mind> {
    let config = load_config(cli)?;
    let mut mind = Mind::new(config).context("failed to build mind")?;
    if let Some(feed) = &cli.feed {
        let fed = replay(&mut mind, feed)?;
        tracing::info!(stimuli = fed, "replayed feed {}", feed.display());
    }
    Ok(mind)
}

/// Process every non-blank line of `path`. Returns the number processed.
fn replay(mind: &mut Mind, path: &Path) -> Result<usize> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut count = 0;
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        mind.process(line, 1.0);
        count += 1;
    }
    Ok(count)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Process {
            texts,
            intensity,
            json,
        } => cmd_process(&cli, texts, *intensity, *json),
        Commands::Think { text } => {
            let mut mind = build_mind(&cli)?;
            println!("{}", mind.think(text));
            Ok(())
        }
        Commands::Recall { concept } => print_json(&build_mind(&cli)?.recall(concept)),
        Commands::Reason { premise, question } => {
            print_json(&build_mind(&cli)?.reason(premise, question))
        }
        Commands::Imagine { scenario, steps } => {
            print_json(&build_mind(&cli)?.imagine(scenario, *steps))
        }
        Commands::Dream => print_json(&build_mind(&cli)?.dream()),
        Commands::Summary => print_json(&build_mind(&cli)?.memory_summary()),
        Commands::Snapshot { path } => cmd_snapshot(&cli, path.as_deref()),
        Commands::Config => cmd_config(&cli),
    }
}

fn cmd_process(cli: &Cli, texts: &[String], intensity: f64, json: bool) -> Result<()> {
    let mut mind = build_mind(cli)?;
    let thoughts: Vec<_> = texts
        .iter()
        .map(|text| mind.process(text, intensity))
        .collect();

    if json {
        return print_json(&thoughts);
    }
    for thought in &thoughts {
        println!("{thought}");
    }
    if cli.verbose {
        let stats = mind.memory().statistics();
        eprintln!(
            "--- memory: nodes={}, edges={}, experiences={}, identity={}, essence={} ---",
            stats.nodes,
            stats.edges,
            stats.experiences,
            stats.identity_fragments,
            stats.essence_principles
        );
    }
    Ok(())
}

fn cmd_snapshot(cli: &Cli, path: Option<&Path>) -> Result<()> {
    let mind = build_mind(cli)?;
    let json = export_json(&mind).context("failed to serialize state")?;
    match path {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("exported to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_config(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let text = toml::to_string_pretty(&config).context("failed to render config")?;
    print!("{text}");
    Ok(())
}
