use clap::{Parser, Subcommand};
use srm_app::{AppError, AppResult, Scenario, SectionState, load_scenario, run_scenario, run_sweep};
use srm_core::parse_value;
use srm_model::Registry;
use srm_section::SECTION_TABLE;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "srm-cli")]
#[command(about = "srmflow CLI - Solid rocket motor burn-section optimisation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the burn-section quantity table
    Quantities,
    /// Solve the standard reference scenario
    Reference {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Solve a scenario file
    Solve {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Solve a scenario once per value of one quantity
    Sweep {
        /// Path to the scenario YAML file
        scenario_path: PathBuf,
        /// Quantity to vary (e.g., T_t_in)
        #[arg(long)]
        quantity: String,
        /// Comma-separated values
        #[arg(long, value_delimiter = ',', required = true)]
        values: Vec<f64>,
        /// Unit of the values (e.g., K, kPa)
        #[arg(long, default_value = "-")]
        unit: String,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Quantities => cmd_quantities(),
        Commands::Reference { json } => print_state(&run_scenario(&Scenario::reference())?, json),
        Commands::Solve {
            scenario_path,
            json,
        } => cmd_solve(&scenario_path, json),
        Commands::Sweep {
            scenario_path,
            quantity,
            values,
            unit,
        } => cmd_sweep(&scenario_path, &quantity, &values, &unit),
    }
}

fn cmd_quantities() -> AppResult<()> {
    let registry = Registry::from_table(SECTION_TABLE)?;
    println!("{:<10} {:<10} {:>12}  description", "name", "unit", "value");
    for q in registry.iter() {
        let value = q
            .value
            .map(|v| format!("{:.6}", q.in_declared_unit(v)))
            .unwrap_or_else(|| "free".to_string());
        println!(
            "{:<10} {:<10} {:>12}  {}",
            q.name, q.unit_label, value, q.description
        );
    }
    Ok(())
}

fn cmd_solve(scenario_path: &Path, json: bool) -> AppResult<()> {
    let scenario = load_scenario(scenario_path)?;
    if !json {
        println!("Solving scenario: {}", scenario.name);
    }
    print_state(&run_scenario(&scenario)?, json)
}

fn cmd_sweep(scenario_path: &Path, quantity: &str, values: &[f64], unit: &str) -> AppResult<()> {
    let scenario = load_scenario(scenario_path)?;
    let measured = values
        .iter()
        .map(|v| {
            parse_value(&format!("{v} {unit}")).map_err(|source| AppError::Value {
                name: quantity.to_string(),
                source,
            })
        })
        .collect::<AppResult<Vec<_>>>()?;

    println!(
        "Sweeping {} over {} values for scenario: {}",
        quantity,
        values.len(),
        scenario.name
    );
    let points = run_sweep(&scenario, quantity, &measured);
    for (point, raw) in points.iter().zip(values) {
        match &point.result {
            Ok(state) => println!(
                "  {quantity} = {raw} {unit}: objective {:.6e}, mdot_out {}, T_t_out {}",
                state.objective,
                fmt_si(state, "mdot_out"),
                fmt_si(state, "T_t_out"),
            ),
            Err(e) => println!("  {quantity} = {raw} {unit}: failed: {e}"),
        }
    }
    Ok(())
}

fn fmt_si(state: &SectionState, name: &str) -> String {
    state
        .si(name)
        .map(|v| format!("{v:.6}"))
        .unwrap_or_else(|| "-".to_string())
}

fn print_state(state: &SectionState, json: bool) -> AppResult<()> {
    if json {
        println!("{}", state.to_json()?);
    } else {
        print!("{}", state.render());
    }
    Ok(())
}
