use b3_app::{AppResult, VehicleChargingConfig, convert, query, write_vehicle_charging};
use b3_core::format_timestamp;
use clap::{Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "b3-cli")]
#[command(about = "Convert timeseries between wide and stacked CSV layouts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stack a wide CSV (timestamp column plus one column per series)
    Stack {
        /// Path to the wide CSV file
        input: PathBuf,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Unstack a stacked CSV whose rows share one time index
    Unstack {
        /// Path to the stacked CSV file
        input: PathBuf,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarize the rows and time indexes of a stacked CSV
    Inspect {
        /// Path to the stacked CSV file
        input: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode every series of a stacked CSV
    Check {
        /// Path to the stacked CSV file
        input: PathBuf,
    },
    /// Prepare normalized vehicle charging profiles from simBEV exports
    ChargingProfiles {
        /// Directory of exports named <prefix>_<kind>_<Region>_<year>.csv
        input_dir: PathBuf,
        /// Output b3 timeseries CSV file path
        output: PathBuf,
        /// Keep the greedy charging of simBEV instead of balancing home and work charging
        #[arg(long)]
        greedy: bool,
    },
}

fn main() -> AppResult<()> {
    // Logs go to stderr; stdout may carry CSV output
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Stack { input, output } => cmd_stack(&input, output.as_deref()),
        Commands::Unstack { input, output } => cmd_unstack(&input, output.as_deref()),
        Commands::Inspect { input, json } => cmd_inspect(&input, json),
        Commands::Check { input } => cmd_check(&input),
        Commands::ChargingProfiles {
            input_dir,
            output,
            greedy,
        } => cmd_charging_profiles(input_dir, output, greedy),
    }
}

fn cmd_stack(input: &Path, output: Option<&Path>) -> AppResult<()> {
    if let Some(path) = output {
        let stacked = convert::stack_file(input, path)?;
        println!("✓ Stacked {} series to {}", stacked.len(), path.display());
    } else {
        let stacked = convert::stack_to_writer(input, io::stdout().lock())?;
        debug!(rows = stacked.len(), "wrote stacked csv to stdout");
    }
    Ok(())
}

fn cmd_unstack(input: &Path, output: Option<&Path>) -> AppResult<()> {
    if let Some(path) = output {
        let table = convert::unstack_file(input, path)?;
        println!(
            "✓ Unstacked {} series of {} steps to {}",
            table.width(),
            table.len(),
            path.display()
        );
    } else {
        let table = convert::unstack_to_writer(input, io::stdout().lock())?;
        debug!(columns = table.width(), "wrote wide csv to stdout");
    }
    Ok(())
}

fn cmd_inspect(input: &Path, json: bool) -> AppResult<()> {
    let stacked = b3_data::load_stacked_csv(input)?;
    let summary = query::summarize(&stacked);

    if json {
        println!("{}", summary.to_json_pretty()?);
        return Ok(());
    }

    println!("Stacked file: {}", input.display());
    println!("  Rows: {}", summary.row_count);
    println!("\nTime indexes:");
    for group in &summary.groups {
        let len = group
            .len
            .map(|n| n.to_string())
            .unwrap_or_else(|| "misaligned".to_string());
        println!(
            "  {} .. {} every {} ({} steps, {} rows)",
            format_timestamp(&group.start),
            format_timestamp(&group.stop),
            group.resolution,
            len,
            group.rows
        );
    }
    println!("\nSeries:");
    for name in &summary.var_names {
        println!("  {}", name);
    }
    Ok(())
}

fn cmd_check(input: &Path) -> AppResult<()> {
    println!("Checking stacked file: {}", input.display());
    let stacked = b3_data::load_stacked_csv(input)?;
    let groups = query::check(&stacked)?;
    println!(
        "✓ {} series in {} time index group(s) decode cleanly",
        stacked.len(),
        groups
    );
    Ok(())
}

fn cmd_charging_profiles(input_dir: PathBuf, output: PathBuf, greedy: bool) -> AppResult<()> {
    let config = VehicleChargingConfig {
        balanced: !greedy,
        ..VehicleChargingConfig::new(input_dir, output)
    };
    let rows = write_vehicle_charging(&config)?;
    println!(
        "✓ Wrote {} charging profile(s) to {}",
        rows,
        config.output_path.display()
    );
    Ok(())
}
