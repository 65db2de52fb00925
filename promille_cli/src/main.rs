use chrono::Utc;
use clap::{Parser, Subcommand};
use promille_core::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "promille")]
#[command(about = "Blood alcohol estimation from a session drink ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Session identifier (one ledger per session)
    #[arg(long, global = true, default_value = "default")]
    session: String,

    /// Override session storage directory
    #[arg(long, global = true)]
    session_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the drink catalog, current selection and summary (default)
    Status,

    /// Add a drink from the selection pool by its display token
    Add {
        /// Display token, e.g. "Bier (0.5 L, 5%)"
        token: String,
    },

    /// Remove a previously added drink by its display token
    Remove {
        token: String,
    },

    /// Add a custom drink
    Custom {
        #[arg(long)]
        name: String,

        #[arg(long)]
        volume: String,

        /// Volume unit: L, ml or cl
        #[arg(long)]
        unit: String,

        /// Alcohol percentage
        #[arg(long)]
        alcohol: String,
    },

    /// Estimate BAC and hours to sober for the current selection
    Calculate {
        /// Body weight in kg (default 70)
        #[arg(long)]
        weight: Option<String>,

        /// male or female (default male)
        #[arg(long)]
        gender: Option<String>,

        /// Age in years (default 20)
        #[arg(long)]
        age: Option<String>,
    },

    /// Show the drink history log
    History,

    /// Remove one history entry by exact drink token and time
    HistoryRemove {
        #[arg(long)]
        drink: String,

        #[arg(long)]
        time: String,
    },

    /// Clear the current selection (the history log is kept)
    Reset,

    /// Clear the selection and the history log
    ResetHistory,
}

fn main() -> Result<()> {
    promille_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let session_dir = cli
        .session_dir
        .unwrap_or_else(|| config.session.dir.clone());
    let catalog = config.catalog()?;

    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Config("Invalid catalog".into()));
    }

    let path = session_path(&session_dir, &cli.session);

    match cli.command {
        Some(Commands::Status) | None => cmd_status(&catalog, &path),
        Some(Commands::Add { token }) => cmd_add(&catalog, &path, &token),
        Some(Commands::Remove { token }) => cmd_remove(&catalog, &path, &token),
        Some(Commands::Custom {
            name,
            volume,
            unit,
            alcohol,
        }) => cmd_custom(&path, &name, &volume, &unit, &alcohol),
        Some(Commands::Calculate {
            weight,
            gender,
            age,
        }) => cmd_calculate(&path, weight, gender, age),
        Some(Commands::History) => cmd_history(&path),
        Some(Commands::HistoryRemove { drink, time }) => cmd_history_remove(&path, &drink, &time),
        Some(Commands::Reset) => cmd_reset(&path),
        Some(Commands::ResetHistory) => cmd_reset_history(&path),
    }
}

fn cmd_status(catalog: &Catalog, path: &std::path::Path) -> Result<()> {
    let session = Session::load(path)?;

    println!("Drinks:");
    for drink in session.ledger.offerings(catalog) {
        println!("  {}", drink);
    }

    let summary = session.ledger.summary();
    if summary.is_empty() {
        println!("\nNo drinks selected.");
    } else {
        println!("\nSelected:");
        for (token, count) in &summary {
            println!("  {}x {}", count, token);
        }
    }

    if let Some(user) = &session.user {
        println!("\nUser: {}", user);
    }

    Ok(())
}

fn cmd_add(catalog: &Catalog, path: &std::path::Path, token: &str) -> Result<()> {
    let result = Session::update(path, |session| {
        session.ledger.add_selected(catalog, token, Utc::now())
    });

    match result {
        Ok(drink) => println!("{} added.", drink.name()),
        Err(Error::NotFound(_)) => println!("Drink not found."),
        Err(e) => return Err(e),
    }
    Ok(())
}

fn cmd_remove(catalog: &Catalog, path: &std::path::Path, token: &str) -> Result<()> {
    let result = Session::update(path, |session| session.ledger.remove(catalog, token));

    match result {
        Ok(drink) => println!("{} removed.", drink.name()),
        Err(Error::NotFound(_)) => println!("Drink not found."),
        Err(e) => return Err(e),
    }
    Ok(())
}

fn cmd_custom(
    path: &std::path::Path,
    name: &str,
    volume: &str,
    unit: &str,
    alcohol: &str,
) -> Result<()> {
    let result = Session::update(path, |session| {
        session
            .ledger
            .add_custom(name, volume, unit, alcohol, Utc::now())
    });

    match result {
        Ok(drink) => println!("Custom drink {} added.", drink.name()),
        Err(e @ (Error::InvalidName(_) | Error::InvalidUnit(_) | Error::OutOfRange(_))) => {
            println!("Invalid input: {}", e);
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

fn cmd_calculate(
    path: &std::path::Path,
    weight: Option<String>,
    gender: Option<String>,
    age: Option<String>,
) -> Result<()> {
    let form = UserForm {
        weight,
        gender,
        age,
    };

    let user = match form.parse() {
        Ok(user) => user,
        Err(e) => {
            // Validation failure: nothing is stored
            println!("Invalid input: {}", e);
            return Ok(());
        }
    };

    // Load, store the user, save - then estimate over the saved ledger
    let mut session = Session::load(path)?;
    session.user = Some(user.clone());
    session.save(path)?;

    match calculate(&user, &session.ledger) {
        Ok(report) => {
            println!("BAC: {:.3} promille", report.bac);
            println!("Time to sober: {:.2} hours", report.time_to_sober);
            println!("Drinks:");
            for (token, count) in &report.drink_summary {
                println!("  {}x {}", count, token);
            }
        }
        Err(Error::NoDrinksSelected) => println!("No drinks selected."),
        Err(e @ Error::DivisionUndefined(_)) => println!("Calculation error: {}", e),
        Err(e) => return Err(e),
    }
    Ok(())
}

fn cmd_history(path: &std::path::Path) -> Result<()> {
    let session = Session::load(path)?;

    if session.ledger.history().is_empty() {
        println!("History is empty.");
        return Ok(());
    }

    println!("History:");
    for entry in session.ledger.history() {
        println!("  {}  {}", entry.time, entry.drink);
    }
    Ok(())
}

fn cmd_history_remove(path: &std::path::Path, drink: &str, time: &str) -> Result<()> {
    Session::update(path, |session| {
        session.ledger.remove_history_entry(drink, time);
        Ok(())
    })?;
    println!("History entry removed.");
    Ok(())
}

fn cmd_reset(path: &std::path::Path) -> Result<()> {
    Session::update(path, |session| {
        session.ledger.reset();
        Ok(())
    })?;
    println!("Selection reset.");
    Ok(())
}

fn cmd_reset_history(path: &std::path::Path) -> Result<()> {
    Session::update(path, |session| {
        session.ledger.reset_history();
        Ok(())
    })?;
    println!("History reset.");
    Ok(())
}
