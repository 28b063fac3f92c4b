//! planwise - assistant turn processor
//!
//! Runs utterances through the calendar/finance pipeline and manages the
//! local event store.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use planwise_core::intent_service::IntentServiceClient;
use planwise_core::{AiResponse, CalendarEvent, Config, Database, Error, EventStore, Pipeline};

#[derive(Parser)]
#[command(name = "planwise")]
#[command(about = "Turn assistant utterances into calendar events and finance tool actions")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process one utterance and print the assistant response
    Say {
        /// The utterance, e.g. "put dance recital on the 22nd"
        message: String,

        /// Prior assistant response as JSON; new actions are appended to it
        #[arg(long)]
        prior_json: Option<String>,

        /// Reference time as YYYY-MM-DDTHH:MM (defaults to the local clock)
        #[arg(long)]
        now: Option<String>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect or edit stored calendar events
    Events {
        #[command(subcommand)]
        command: EventsCommand,
    },

    /// Show resolved paths and intent service status
    Config,
}

#[derive(Subcommand)]
enum EventsCommand {
    /// List stored events in date order
    List {
        /// Print events as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete one event by id
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        planwise_core::logging::init(&config.logging).context("failed to initialize logging")?;

    match args.command {
        Command::Config => {
            print_config(&config);
            Ok(())
        }
        Command::Say {
            message,
            prior_json,
            now,
            json,
        } => {
            let db = open_database()?;
            say(db, &config, &message, prior_json.as_deref(), now.as_deref(), json).await
        }
        Command::Events { command } => {
            let db = open_database()?;
            match command {
                EventsCommand::List { json } => list_events(&db, json),
                EventsCommand::Delete { id } => delete_event(&db, &id),
            }
        }
    }
}

fn open_database() -> Result<Database> {
    let db_path = Config::database_path();
    tracing::info!(path = %db_path.display(), "Opening database");

    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;
    Ok(db)
}

async fn say(
    db: Database,
    config: &Config,
    message: &str,
    prior_json: Option<&str>,
    now: Option<&str>,
    json: bool,
) -> Result<()> {
    let prior: Option<AiResponse> = prior_json
        .map(serde_json::from_str)
        .transpose()
        .context("invalid --prior-json")?;

    let now = match now {
        Some(raw) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
            .with_context(|| format!("invalid --now '{}', expected YYYY-MM-DDTHH:MM", raw))?,
        None => chrono::Local::now().naive_local(),
    };

    let pipeline = Pipeline::new(db, config);
    let Some(response) = pipeline.process(message, prior.as_ref(), now).await else {
        println!("No action taken.");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.response);
    }
    Ok(())
}

fn list_events(db: &Database, json: bool) -> Result<()> {
    let events = db.list_events().context("failed to list events")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("No events stored.");
        return Ok(());
    }

    for event in &events {
        println!("{}", event_line(event));
    }
    Ok(())
}

fn event_line(event: &CalendarEvent) -> String {
    let mut line = format!(
        "{}  {}  {} [{}]",
        event.id,
        event.date.format("%Y-%m-%d %H:%M"),
        event.title,
        event.category.as_str()
    );
    if let Some(frequency) = event.recurring {
        line.push_str(&format!(" ({})", frequency.as_str()));
    }
    line
}

fn delete_event(db: &Database, id: &str) -> Result<()> {
    if !db.delete_by_id(id).context("failed to delete event")? {
        return Err(Error::EventNotFound(id.to_string()).into());
    }
    println!("Deleted event {}", id);
    Ok(())
}

fn print_config(config: &Config) {
    println!("Config file:   {}", Config::config_path().display());
    println!("Database:      {}", Config::database_path().display());
    println!("Log file:      {}", Config::log_path().display());
    println!(
        "Recurrence:    {} months by default, at most {} instances",
        config.calendar.default_recurrence_months, config.calendar.max_recurrence_instances
    );

    let service = &config.intent_service;
    if !service.is_ready() {
        println!("Intent service: disabled, using local classification");
        return;
    }
    match IntentServiceClient::from_config(service) {
        Some(client) => println!("Intent service: enabled ({})", client.endpoint()),
        None => println!("Intent service: misconfigured, using local classification"),
    }
}
