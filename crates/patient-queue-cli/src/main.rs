//! Front-desk command line for the hospital patient queue.
//!
//! Every invocation opens the SQLite database, runs one command against the
//! queue engine and prints the result as JSON (the roster prints CSV by
//! default). Logs go to stderr.

mod config;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use patient_queue_core::{
    BoardExporter, Database, DepartmentKind, QueueEngine, RegistrationForm, RosterExporter,
};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "patient-queue")]
#[command(about = "Hospital patient queue: registration, calling and service tracking")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides configuration)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Log level (overrides configuration)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a patient and print the assigned token
    Register {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<i64>,
        #[arg(long)]
        gender: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        visit_type: Option<String>,
    },
    /// List waiting patients of a department in queue order
    Waiting { department: DepartmentKind },
    /// Call the next patient of a department
    CallNext { department: DepartmentKind },
    /// Mark an in-progress patient as completed
    Complete { patient_id: String },
    /// Today's queue statistics
    Stats,
    /// All departments with their live tokens
    Departments,
    /// Look up a patient by department and token
    Lookup {
        department: DepartmentKind,
        token: u32,
    },
    /// Queue position and estimated wait of a patient
    Position { patient_id: String },
    /// Display-board payload
    Board,
    /// Today's registrations
    Roster {
        #[arg(long, value_enum, default_value_t = RosterFormat::Csv)]
        format: RosterFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RosterFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(database) = args.database {
        config.database_path = database;
    }
    if let Some(log_level) = args.log_level {
        config.log_level = log_level;
    }

    // Initialize logging
    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("Invalid log level: {}", config.log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let db = Database::open(&config.database_path).with_context(|| {
        format!(
            "Failed to open database at {}",
            config.database_path.display()
        )
    })?;
    let mut engine = QueueEngine::open(db, config.queue.clone());

    run(&mut engine, args.command)?;

    if engine.failed_saves() > 0 {
        bail!(
            "Queue state could not be saved to {}",
            config.database_path.display()
        );
    }
    Ok(())
}

fn run(engine: &mut QueueEngine, command: Command) -> Result<()> {
    match command {
        Command::Register {
            name,
            age,
            gender,
            department,
            visit_type,
        } => {
            let form = RegistrationForm {
                name,
                age,
                gender,
                department,
                visit_type,
            };
            let new_patient = form.validate()?;
            let patient = engine.register_patient(new_patient)?;
            print_json(&patient)
        }
        Command::Waiting { department } => print_json(&engine.waiting_patients(department)),
        Command::CallNext { department } => match engine.call_next_patient(department)? {
            Some(patient) => print_json(&patient),
            None => {
                info!(department = %department, "Nobody is waiting");
                print_json(&Option::<()>::None)
            }
        },
        Command::Complete { patient_id } => {
            engine.complete_patient(&patient_id)?;
            print_json(&engine.patient(&patient_id))
        }
        Command::Stats => print_json(&engine.queue_stats()),
        Command::Departments => print_json(&engine.department_listing()),
        Command::Lookup { department, token } => match engine.find_by_token(department, token) {
            Some(patient) => print_json(patient),
            None => bail!("No patient with token {} in {}", token, department),
        },
        Command::Position { patient_id } => print_json(&engine.queue_position(&patient_id)?),
        Command::Board => {
            let board = BoardExporter::new(engine).export();
            println!("{}", board.to_json()?);
            Ok(())
        }
        Command::Roster { format } => {
            let roster = RosterExporter::new(engine).export_today();
            if roster.entries.is_empty() {
                warn!("No registrations today");
            }
            match format {
                RosterFormat::Csv => print!("{}", roster.to_csv()),
                RosterFormat::Json => println!("{}", roster.to_json()?),
            }
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
