use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clinic_core::{
    CoreConfig, Gateway, NoteCode, PatientDetails, Phn, StorageMode, DEFAULT_DATA_DIR,
};

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic patient catalog and note log CLI")]
struct Cli {
    /// Operator username
    #[arg(long)]
    username: String,
    /// Operator password
    #[arg(long)]
    password: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the patient catalog
    Patients {
        #[command(subcommand)]
        action: PatientCommand,
    },
    /// Manage one patient's notes
    Notes {
        /// PHN of the patient whose notes to act on
        #[arg(long)]
        phn: Phn,
        #[command(subcommand)]
        action: NoteCommand,
    },
}

#[derive(Subcommand)]
enum PatientCommand {
    /// List all patients
    List,
    /// Show the patient with the given PHN
    Search { phn: Phn },
    /// Find patients whose name contains the text
    Find { name: String },
    /// Register a new patient
    Add(PatientArgs),
    /// Replace a patient's details, possibly under a new PHN
    Update {
        /// PHN the patient is currently registered under
        original_phn: Phn,
        #[command(flatten)]
        details: PatientArgs,
    },
    /// Remove a patient
    Remove { phn: Phn },
}

#[derive(Args)]
struct PatientArgs {
    #[arg(long)]
    phn: Phn,
    #[arg(long)]
    name: String,
    /// Birth date (YYYY-MM-DD)
    #[arg(long)]
    birth_date: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    address: String,
}

impl From<PatientArgs> for PatientDetails {
    fn from(args: PatientArgs) -> Self {
        PatientDetails::new(
            args.phn,
            args.name,
            args.birth_date,
            args.phone,
            args.email,
            args.address,
        )
    }
}

#[derive(Subcommand)]
enum NoteCommand {
    /// List notes, most recent first
    List,
    /// Show the note with the given code
    Search { code: NoteCode },
    /// Find notes whose text contains the query
    Find { query: String },
    /// Append a note
    Add { text: String },
    /// Replace a note's text
    Update { code: NoteCode, text: String },
    /// Remove a note
    Remove { code: NoteCode },
}

/// Entry point for the clinic CLI
///
/// Each invocation logs in, runs a single gateway operation, prints the result and logs out.
///
/// # Environment Variables
/// - `CLINIC_DATA_DIR`: Directory for catalog and note units (default: "clinic_data")
/// - `CLINIC_STORAGE`: `memory` or `persistent` (default: "persistent")
/// - `CLINIC_USERS_FILE`: Optional `username,sha256-hex` credentials file
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("clinic=info".parse()?)
                .add_directive("clinic_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = Arc::new(config_from_env()?);
    tracing::debug!("using data directory {}", cfg.data_dir().display());

    let mut gateway = Gateway::new(cfg)?;
    gateway.login(&cli.username, &cli.password)?;
    let outcome = run(&mut gateway, cli.command);
    gateway.logout()?;
    outcome
}

fn config_from_env() -> anyhow::Result<CoreConfig> {
    let data_dir = std::env::var("CLINIC_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.into());
    let storage_mode = match std::env::var("CLINIC_STORAGE") {
        Ok(value) => value.parse()?,
        Err(_) => StorageMode::Persistent,
    };
    let users_file = std::env::var_os("CLINIC_USERS_FILE").map(PathBuf::from);

    Ok(CoreConfig::new(
        PathBuf::from(data_dir),
        storage_mode,
        users_file,
    )?)
}

fn run(gateway: &mut Gateway, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Patients { action } => run_patients(gateway, action),
        Commands::Notes { phn, action } => {
            gateway.set_current_patient(phn)?;
            run_notes(gateway, action)
        }
    }
}

fn run_patients(gateway: &mut Gateway, action: PatientCommand) -> anyhow::Result<()> {
    match action {
        PatientCommand::List => {
            let patients = gateway.list_patients()?;
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in patients {
                println!("{patient}");
            }
        }
        PatientCommand::Search { phn } => match gateway.search_patient(phn)? {
            Some(patient) => println!("{patient}"),
            None => println!("No patient with PHN {phn}."),
        },
        PatientCommand::Find { name } => {
            for patient in gateway.retrieve_patients(&name)? {
                println!("{patient}");
            }
        }
        PatientCommand::Add(args) => {
            let patient = gateway.create_patient(args.into())?;
            println!("Created: {patient}");
        }
        PatientCommand::Update {
            original_phn,
            details,
        } => {
            let details = PatientDetails::from(details);
            let phn = details.phn;
            gateway.update_patient(original_phn, details)?;
            println!("Updated patient {original_phn} (now {phn}).");
        }
        PatientCommand::Remove { phn } => {
            gateway.delete_patient(phn)?;
            println!("Removed patient {phn}.");
        }
    }
    Ok(())
}

fn run_notes(gateway: &mut Gateway, action: NoteCommand) -> anyhow::Result<()> {
    match action {
        NoteCommand::List => {
            let notes = gateway.list_notes()?;
            if notes.is_empty() {
                println!("No notes found.");
            }
            for note in notes {
                println!("{note}");
            }
        }
        NoteCommand::Search { code } => match gateway.search_note(code)? {
            Some(note) => println!("{note}"),
            None => println!("No note with code {code}."),
        },
        NoteCommand::Find { query } => {
            for note in gateway.retrieve_notes(&query)? {
                println!("{note}");
            }
        }
        NoteCommand::Add { text } => {
            let note = gateway.create_note(&text)?;
            println!("Created: {note}");
        }
        NoteCommand::Update { code, text } => {
            if gateway.update_note(code, &text)? {
                println!("Updated note {code}.");
            } else {
                println!("No note with code {code}.");
            }
        }
        NoteCommand::Remove { code } => {
            if gateway.delete_note(code)? {
                println!("Removed note {code}.");
            } else {
                println!("No note with code {code}.");
            }
        }
    }
    Ok(())
}
