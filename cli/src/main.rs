mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    Measurements, cmd_chart, cmd_delete, cmd_edit, cmd_export, cmd_goal_achieve, cmd_goal_clear,
    cmd_goal_set, cmd_goal_show, cmd_goal_update, cmd_history, cmd_import, cmd_log, cmd_reset,
    cmd_settings_set, cmd_settings_show, cmd_show, cmd_stats, cmd_summary, cmd_trend, json_error,
    parse_period,
};
use crate::config::{Config, LOG_ENV};
use heft_core::models::TimePeriod;
use heft_core::service::WeightService;

#[derive(Parser)]
#[command(
    name = "heft",
    version,
    about = "A simple body weight tracker CLI",
    long_about = "Log your weight, body fat, and muscle mass, watch the trend, and track a goal.\n\
                  All data stays in a local file."
)]
struct Cli {
    /// Path to the data store (default: platform data dir, or $HEFT_DATA_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a weight measurement
    Log {
        /// Weight value (number)
        weight: f64,
        /// Unit: kg or lbs (default: kg)
        #[arg(short, long, default_value = "kg")]
        unit: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Body fat percentage (0-100)
        #[arg(long)]
        body_fat: Option<f64>,
        /// Muscle mass in kg
        #[arg(long)]
        muscle: Option<f64>,
    },
    /// Edit a weight record (unspecified fields keep their values)
    Edit {
        /// Record ID (or a unique prefix of it)
        id: String,
        /// New weight value
        #[arg(short, long)]
        weight: Option<f64>,
        /// Unit of --weight: kg or lbs (default: kg)
        #[arg(short, long, default_value = "kg")]
        unit: String,
        /// New date (YYYY-MM-DD or today/yesterday/tomorrow)
        #[arg(long)]
        date: Option<String>,
        /// New body fat percentage
        #[arg(long, conflicts_with = "clear_body_fat")]
        body_fat: Option<f64>,
        /// New muscle mass in kg
        #[arg(long, conflicts_with = "clear_muscle")]
        muscle: Option<f64>,
        /// Remove the body fat value
        #[arg(long)]
        clear_body_fat: bool,
        /// Remove the muscle mass value
        #[arg(long)]
        clear_muscle: bool,
    },
    /// Delete a weight record
    Delete {
        /// Record ID (or a unique prefix of it)
        id: String,
    },
    /// Show records for a date (default: today)
    Show {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow)
        date: Option<String>,
    },
    /// List weight records, newest first
    History {
        /// Only records in this period: week, month, half-year, year
        #[arg(short, long, value_parser = parse_period)]
        period: Option<TimePeriod>,
        /// Maximum number of records to show
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show statistics for one period (default: all periods)
    Stats {
        /// week, month, half-year, or year
        #[arg(short, long, value_parser = parse_period)]
        period: Option<TimePeriod>,
    },
    /// Show whether weight is increasing, decreasing, or stable
    Trend,
    /// Plot weight over a period
    Chart {
        /// week, month, half-year, or year
        #[arg(short, long, value_parser = parse_period, default_value = "month")]
        period: TimePeriod,
    },
    /// Dashboard: latest weight, BMI, trend, weekly stats, goal progress
    Summary,
    /// Manage the target weight goal
    Goal {
        #[command(subcommand)]
        command: GoalCommands,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Export all data as JSON (or records as CSV)
    Export {
        /// Export weight records as CSV instead of the full JSON document
        #[arg(long)]
        csv: bool,
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Replace all data with a previously exported JSON document
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },
    /// Delete all data
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum GoalCommands {
    /// Set a new goal (replaces any existing goal)
    Set {
        /// Target weight in kg
        target: f64,
        /// Starting weight in kg (default: latest recorded weight)
        #[arg(long)]
        start: Option<f64>,
    },
    /// Change the target of the current goal
    Update {
        /// New target weight in kg
        target: f64,
    },
    /// Show goal progress
    Show,
    /// Mark the current goal as achieved
    Achieve,
    /// Remove the goal
    Clear,
}

#[derive(Subcommand)]
enum SettingsCommands {
    /// Show current settings
    Show,
    /// Change settings
    Set {
        /// Height in cm (used for BMI)
        #[arg(long)]
        height: Option<f64>,
        /// Theme: light or dark
        #[arg(long)]
        theme: Option<String>,
        /// Enable or disable notifications
        #[arg(long)]
        notifications: Option<bool>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(e) = run(cli) {
        if json {
            println!("{}", json_error(&format!("{e:#}")));
        } else {
            eprintln!("Error: {e:#}");
        }
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.data)?;
    tracing::debug!(path = %config.db_path.display(), "opening store");
    let svc = WeightService::open(&config.db_path)?;
    let json = cli.json;

    match cli.command {
        Commands::Log {
            weight,
            unit,
            date,
            body_fat,
            muscle,
        } => cmd_log(
            &svc,
            Measurements {
                weight: Some(weight),
                unit,
                date,
                body_fat,
                muscle,
            },
            json,
        ),
        Commands::Edit {
            id,
            weight,
            unit,
            date,
            body_fat,
            muscle,
            clear_body_fat,
            clear_muscle,
        } => cmd_edit(
            &svc,
            &id,
            Measurements {
                weight,
                unit,
                date,
                body_fat,
                muscle,
            },
            clear_body_fat,
            clear_muscle,
            json,
        ),
        Commands::Delete { id } => cmd_delete(&svc, &id, json),
        Commands::Show { date } => cmd_show(&svc, date, json),
        Commands::History { period, limit } => cmd_history(&svc, period, limit, json),
        Commands::Stats { period } => cmd_stats(&svc, period, json),
        Commands::Trend => cmd_trend(&svc, json),
        Commands::Chart { period } => cmd_chart(&svc, period, json),
        Commands::Summary => cmd_summary(&svc, json),
        Commands::Goal { command } => match command {
            GoalCommands::Set { target, start } => cmd_goal_set(&svc, target, start, json),
            GoalCommands::Update { target } => cmd_goal_update(&svc, target, json),
            GoalCommands::Show => cmd_goal_show(&svc, json),
            GoalCommands::Achieve => cmd_goal_achieve(&svc, json),
            GoalCommands::Clear => cmd_goal_clear(&svc, json),
        },
        Commands::Settings { command } => match command {
            SettingsCommands::Show => cmd_settings_show(&svc, json),
            SettingsCommands::Set {
                height,
                theme,
                notifications,
            } => cmd_settings_set(&svc, height, theme.as_deref(), notifications, json),
        },
        Commands::Export { csv, output } => cmd_export(&svc, csv, output.as_deref(), json),
        Commands::Import { file } => cmd_import(&svc, &file, json),
        Commands::Reset { yes } => cmd_reset(&svc, yes, json),
    }
}
