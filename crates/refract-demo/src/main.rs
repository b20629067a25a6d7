//! Command-line front end for the Refract demonstrations.
//!
//! `copy` runs the copy-strategy probes, `reflect` walks the reflected `Human`
//! through its descriptor, and `describe` / `list` inspect the registry.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{LevelFilter, debug, info};
use refract_copy::Duplicate;
use refract_demo::copying::{self, CopyStrategy};
use refract_demo::reflection::{self, HUMAN_PATH};
use refract_runtime::Registry;

/// CLI arguments for the Refract demo
#[derive(Parser, Debug)]
#[command(name = "refract-demo")]
#[command(about = "Copy semantics and runtime reflection demonstrations")]
struct Args {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Copy a Human, mutate the source and report what the copy sees
    Copy {
        /// Run a single strategy instead of all of them
        #[arg(short, long, value_enum)]
        strategy: Option<CopyStrategy>,
    },

    /// Reach the Human descriptor three ways and instantiate through it
    Reflect,

    /// Print the descriptor of a registered class as JSON
    Describe {
        /// Fully qualified path, e.g. refract_demo::reflection::Human
        path: String,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// List registered classes matching a glob pattern
    List {
        /// `foo::*`, `foo::**`, `foo::Bar*` or an exact path
        #[arg(default_value = "**")]
        pattern: String,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run_copy(strategy: Option<CopyStrategy>) -> Result<()> {
    let strategies = match strategy {
        Some(strategy) => vec![strategy],
        None => CopyStrategy::ALL.to_vec(),
    };

    for strategy in strategies {
        let report = copying::probe(strategy)
            .with_context(|| format!("Copy strategy '{}' failed", strategy))?;
        println!("{}", report);
    }

    if strategy.is_none() {
        let shared = copying::probe_household()?;
        println!("household duplicate shares member list: {}", shared);
        if let Err(e) = copying::Ledger::default().duplicate() {
            println!("ledger: {}", e);
        }
    }

    Ok(())
}

fn run_reflect(registry: &Registry) -> Result<()> {
    let identities = reflection::descriptor_identities(registry)?;
    println!("by type:     {:#x}", identities.by_type);
    println!("by instance: {:#x}", identities.by_instance);
    println!("by name:     {:#x}", identities.by_name);
    println!("same descriptor: {}", identities.all_equal());

    let class = registry.for_name(HUMAN_PATH)?;
    println!();
    println!("{}", class);
    for ctor in class.constructors() {
        println!("  {}", ctor);
    }

    let (empty, full) = reflection::instantiate(class)?;
    println!();
    println!("{}", empty);
    println!("{}", full);
    debug!("{} is instance: {}", class, class.is_instance(&full));

    Ok(())
}

fn run_describe(registry: &Registry, path: &str, pretty: bool) -> Result<()> {
    let class = registry.for_name(path)?;
    let info = class.info();
    let json = if pretty {
        serde_json::to_string_pretty(&info)
    } else {
        serde_json::to_string(&info)
    }
    .context("Failed to serialize class info")?;
    println!("{}", json);
    Ok(())
}

fn run_list(registry: &Registry, pattern: &str) -> Result<()> {
    let classes = registry.find(pattern);
    if classes.is_empty() {
        info!("No classes match '{}'", pattern);
    }
    for class in classes {
        println!("{}", class.path());
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let registry = Registry::global();
    refract_demo::register_all(registry);
    debug!("{} classes registered", registry.len());

    match args.command {
        Command::Copy { strategy } => run_copy(strategy),
        Command::Reflect => run_reflect(registry),
        Command::Describe { path, pretty } => run_describe(registry, &path, pretty),
        Command::List { pattern } => run_list(registry, &pattern),
    }
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("[refract-demo] Error: {:#}", e);
        std::process::exit(1);
    }
}
