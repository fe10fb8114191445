mod error;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use tlm_components::ComponentRegistry;
use tlm_core::Severity;
use tlm_model::{ModelDef, build_system, load_model};
use tlm_results::{RunManifest, RunStore, RunTraces, compute_run_id, write_csv};
use tlm_system::SimOutcome;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, CliResult};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "tlm-cli")]
#[command(about = "Fixed-step TLM simulation of multi-domain component models", long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a model file and check that it builds
    Validate {
        /// Path to the model file (YAML, or JSON by extension)
        model_path: PathBuf,
    },
    /// List the built-in component types
    Components,
    /// Run a model
    Run {
        /// Path to the model file (YAML, or JSON by extension)
        model_path: PathBuf,
        /// Stop time in seconds, overriding the model settings
        #[arg(long)]
        stop: Option<f64>,
        /// Time step in seconds, overriding the model settings
        #[arg(long)]
        timestep: Option<f64>,
        /// Number of logged samples
        #[arg(long)]
        log_samples: Option<usize>,
        /// Step with this many worker threads (0 picks a count)
        #[arg(long)]
        parallel: Option<usize>,
        /// Write every logged trace to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Save the run under this directory
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Show a stored run
    ShowRun {
        /// Run store directory
        store: PathBuf,
        /// Run ID to display
        run_id: String,
    },
}

struct RunArgs {
    stop: Option<f64>,
    timestep: Option<f64>,
    log_samples: Option<usize>,
    parallel: Option<usize>,
    csv: Option<PathBuf>,
    store: Option<PathBuf>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate { model_path } => cmd_validate(&model_path),
        Commands::Components => cmd_components(),
        Commands::Run {
            model_path,
            stop,
            timestep,
            log_samples,
            parallel,
            csv,
            store,
        } => cmd_run(
            &model_path,
            RunArgs {
                stop,
                timestep,
                log_samples,
                parallel,
                csv,
                store,
            },
        ),
        Commands::ShowRun { store, run_id } => cmd_show_run(&store, &run_id),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn cmd_validate(model_path: &Path) -> CliResult<()> {
    println!("Validating model: {}", model_path.display());
    let model = load_model(model_path)?;
    build_system(&model, &ComponentRegistry::with_builtin())?;
    println!(
        "✓ Model '{}' is valid ({} components, {} connections)",
        model.name,
        model.components.len(),
        model.connections.len()
    );
    Ok(())
}

fn cmd_components() -> CliResult<()> {
    let registry = ComponentRegistry::with_builtin();
    let mut keys: Vec<&str> = registry.type_keys().collect();
    keys.sort_unstable();
    println!("Component types ({}):", keys.len());
    for key in keys {
        match registry.create(key, key) {
            Some(c) => println!("  [{}] {}", c.cqs_type(), key),
            None => println!("  [?] {key}"),
        }
    }
    Ok(())
}

fn apply_overrides(model: &mut ModelDef, args: &RunArgs) {
    let settings = &mut model.settings;
    if let Some(stop) = args.stop {
        settings.stop_time = stop;
    }
    if let Some(ts) = args.timestep {
        settings.timestep = ts;
    }
    if let Some(n) = args.log_samples {
        settings.log_samples = n;
    }
    if args.parallel.is_some() {
        settings.parallel = args.parallel;
    }
}

fn cmd_run(model_path: &Path, args: RunArgs) -> CliResult<()> {
    let mut model = load_model(model_path)?;
    apply_overrides(&mut model, &args);
    let (mut system, options) = build_system(&model, &ComponentRegistry::with_builtin())?;
    println!(
        "Running '{}': t = {} .. {} s, dt = {} s",
        model.name, options.start_time, options.stop_time, options.timestep
    );

    let started = Instant::now();
    let report = system.run(&options)?;
    let elapsed = started.elapsed().as_secs_f64();
    info!(steps = report.steps_taken, elapsed_s = elapsed, "simulation done");

    println!("  Steps:    {}", report.steps_taken);
    println!("  Time:     {} s", report.time);
    println!("  Wall:     {elapsed:.3} s");
    println!(
        "  Messages: {} warnings, {} errors",
        system.message_count(Severity::Warning),
        system.message_count(Severity::Error)
    );

    let traces = RunTraces::from_system(&system);
    println!("  Samples:  {} x {} traces", traces.time.len(), traces.series.len());

    if let Some(path) = &args.csv {
        write_csv(path, &traces.time, &traces.series)?;
        println!("✓ Wrote {}", path.display());
    }

    if let Some(dir) = &args.store {
        let store = RunStore::new(dir.clone())?;
        let run_id = compute_run_id(&model, &options, VERSION);
        let manifest = RunManifest::new(
            run_id.clone(),
            &model.name,
            &options,
            &report,
            system.take_messages(),
        );
        store.save_run(&manifest, &traces)?;
        println!("✓ Saved run {run_id}");
    }

    match report.outcome {
        SimOutcome::Finished => {
            println!("✓ Simulation completed");
            Ok(())
        }
        SimOutcome::Stopped { time, reason, .. } => Err(CliError::Stopped { time, reason }),
    }
}

fn cmd_show_run(store_dir: &Path, run_id: &str) -> CliResult<()> {
    let store = RunStore::new(store_dir)?;
    let manifest = store.load_manifest(run_id)?;
    let traces = store.load_traces(run_id)?;

    println!("Run {}", manifest.run_id);
    println!("  Model:    {}", manifest.model_name);
    println!("  Saved:    {}", manifest.timestamp);
    println!(
        "  Range:    {} .. {} s, dt = {} s",
        manifest.start_time, manifest.stop_time, manifest.timestep
    );
    println!("  Steps:    {}", manifest.steps_taken);
    match &manifest.outcome {
        SimOutcome::Finished => println!("  Outcome:  finished"),
        SimOutcome::Stopped { time, reason, .. } => {
            println!("  Outcome:  stopped at t={time}: {reason}")
        }
    }

    let notable: Vec<_> = manifest
        .messages
        .iter()
        .filter(|m| m.severity >= Severity::Warning)
        .collect();
    if !notable.is_empty() {
        println!("\nMessages:");
        for m in notable {
            println!("  {}: [{}] {}", m.severity, m.source, m.text);
        }
    }

    println!("\nTraces ({} samples):", traces.time.len());
    for series in &traces.series {
        let last = series.values.last().copied().unwrap_or(f64::NAN);
        if series.unit.is_empty() {
            println!("  {} = {last}", series.name());
        } else {
            println!("  {} = {last} {}", series.name(), series.unit);
        }
    }
    Ok(())
}
