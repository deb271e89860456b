use clap::{Parser, Subcommand};
use hf_app::{AppResult, CaseConfig, describe_basis, load_config, run_case, save_config};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hf-cli")]
#[command(about = "hammerflow - FSI water-hammer solver on a coordinator/worker task farm")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a case and write the output tables
    Run {
        /// Case YAML file (defaults to the Delft rig)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of worker threads, overriding the case file
        #[arg(short, long)]
        workers: Option<usize>,
        /// Output directory
        #[arg(short, long, default_value = "hammerflow-out")]
        out: PathBuf,
    },
    /// Print wave speeds, modal transforms and the initial state
    Basis {
        /// Case YAML file (defaults to the Delft rig)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Write the default case file
    InitConfig {
        /// Destination YAML file
        path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            workers,
            out,
        } => cmd_run(config.as_deref(), workers, &out),
        Commands::Basis { config } => cmd_basis(config.as_deref()),
        Commands::InitConfig { path } => cmd_init_config(&path),
    }
}

fn case_from(path: Option<&Path>) -> AppResult<CaseConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(CaseConfig::default()),
    }
}

fn cmd_run(config_path: Option<&Path>, workers: Option<usize>, out: &Path) -> AppResult<()> {
    let mut config = case_from(config_path)?;
    if let Some(workers) = workers {
        config.run.workers = workers;
    }
    println!(
        "Running case: L = {} m, t_end = {} s, dt = {} s, {} workers",
        config.pipe.length_m, config.run.t_end_s, config.run.dt_s, config.run.workers
    );

    let summary = run_case(&config, out)?;

    println!("✓ Run completed: {}", summary.run_id);
    println!("  Time samples: {}", summary.tasks);
    println!("  Wall time: {:.3} s", summary.wall_time_s);
    println!("  Output: {}", summary.output_dir.display());
    for table in summary.failed_tables() {
        println!("  ! {} was not written", table.file());
    }
    Ok(())
}

fn cmd_basis(config_path: Option<&Path>) -> AppResult<()> {
    let config = case_from(config_path)?;
    let basis = describe_basis(&config)?;

    let [l1, l2, l3, l4] = basis.speeds;
    println!("Wave speeds [m/s]:");
    println!("  l1 = {l1:.3}  l2 = {l2:.3}  (fluid)");
    println!("  l3 = {l3:.3}  l4 = {l4:.3}  (wall)");
    println!("S (modal -> physical):{}", basis.s);
    println!("S^-1 (physical -> modal):{}", basis.s_inv);
    println!("q_IC = {:?}", basis.q_initial.as_slice());
    println!("w_IC = {:?}", basis.w_initial.as_slice());
    println!("|S S^-1 - I| = {:.3e}", basis.identity_residual);
    Ok(())
}

fn cmd_init_config(path: &Path) -> AppResult<()> {
    save_config(path, &CaseConfig::default())?;
    println!("✓ Wrote default case to {}", path.display());
    Ok(())
}
