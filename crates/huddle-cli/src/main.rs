//! Huddle - command-line client for the Huddle team calendar.

mod config;

use std::io::{BufRead, Write as _};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use config::Config;
use credential_store::FileCredentialStore;
use event_gateway::{RegisterRequest, RemoteGateway};
use session_engine::{Credential, SessionManager, SessionState};
use sync_engine::SyncController;
use tracing_subscriber::EnvFilter;

/// Huddle calendar command-line interface.
#[derive(Parser)]
#[command(name = "huddle")]
#[command(about = "Team calendar client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error). Defaults to the config
    /// file's level.
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Base directory for runtime files (token, config). Defaults to ~/.huddle
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        /// Password (prompted on stdin if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Register a new account
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        full_name: String,
        /// Organization id (see `huddle orgs`)
        #[arg(short, long)]
        organization: i64,
        /// Password (prompted on stdin if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Log out and clear the stored token
    Logout,
    /// Show session status
    Status,
    /// List organizations
    Orgs,
    /// Work with calendar events
    Events {
        #[command(subcommand)]
        command: EventCommands,
    },
}

#[derive(Subcommand)]
enum EventCommands {
    /// List all events
    List,
    /// Create an event
    Create {
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Start instant, RFC 3339 (e.g. 2026-09-01T09:00:00Z)
        #[arg(short, long)]
        start: String,
        /// End instant, RFC 3339
        #[arg(short, long)]
        end: String,
    },
    /// Delete an event by id
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_dir = config::base_dir(cli.base_dir.clone())?;
    let config = Config::load(&base_dir)?;
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(level);

    tracing::debug!(api_url = %config.api_url, "Loaded configuration");

    let store = FileCredentialStore::with_base_dir(base_dir);
    let session = Arc::new(SessionManager::from_storage(Box::new(store))?);
    let gateway = RemoteGateway::new(config.api_url.clone());

    match cli.command {
        Commands::Login { email, password } => {
            let password = password_or_prompt(password)?;
            login(&session, &gateway, &email, &password).await?;
            println!("Logged in as {}", email);
        }
        Commands::Register {
            email,
            full_name,
            organization,
            password,
        } => {
            let password = password_or_prompt(password)?;
            register(&session, &gateway, email.clone(), full_name, organization, password).await?;
            println!("Registered and logged in as {}", email);
        }
        Commands::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        Commands::Status => print_status(&session),
        Commands::Orgs => {
            // Reference data for registration: works without a login.
            let credential = session.credential();
            let orgs = gateway.organizations(credential.as_ref()).await?;
            if orgs.is_empty() {
                println!("No organizations");
            }
            for org in orgs {
                println!("{:>6}  {}", org.id, org.name);
            }
        }
        Commands::Events { command } => {
            let controller = SyncController::new(Arc::clone(&session), Arc::new(gateway));
            run_event_command(&session, &controller, command).await?;
        }
    }

    Ok(())
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn login(
    session: &SessionManager,
    gateway: &RemoteGateway,
    email: &str,
    password: &str,
) -> Result<()> {
    session.begin_login()?;
    match gateway.login(email, password).await {
        Ok(payload) => complete_login(session, payload),
        Err(e) => {
            session.fail_login(e.to_string())?;
            Err(e.into())
        }
    }
}

async fn register(
    session: &SessionManager,
    gateway: &RemoteGateway,
    email: String,
    full_name: String,
    organization: i64,
    password: String,
) -> Result<()> {
    let request = RegisterRequest {
        email,
        password,
        full_name,
        organization,
    };
    session.begin_login()?;
    match gateway.register(&request).await {
        Ok(payload) => complete_login(session, payload),
        Err(e) => {
            session.fail_login(e.to_string())?;
            Err(e.into())
        }
    }
}

fn complete_login(session: &SessionManager, payload: event_gateway::AuthPayload) -> Result<()> {
    let credential = match Credential::decode(&payload.access) {
        Ok(credential) => credential,
        Err(e) => {
            session.fail_login(e.to_string())?;
            return Err(e).context("Server returned an unusable token");
        }
    };
    session.complete_login(credential, payload.user.into())?;
    Ok(())
}

async fn run_event_command(
    session: &Arc<SessionManager>,
    controller: &SyncController,
    command: EventCommands,
) -> Result<()> {
    require_login(session)?;
    match command {
        EventCommands::List => {
            controller.refresh().await?;
            let events = controller.events().await;
            if events.is_empty() {
                println!("No events");
            }
            for event in events {
                println!(
                    "{}  {}  {} .. {}  {}",
                    event.id,
                    controller.color_for(&event.owner_id),
                    event.start.to_rfc3339(),
                    event.end.to_rfc3339(),
                    event.title,
                );
            }
        }
        EventCommands::Create {
            title,
            description,
            start,
            end,
        } => {
            let draft = calendar_types::EventDraft {
                title,
                description,
                start: parse_instant(&start)?,
                end: parse_instant(&end)?,
            };
            let created = controller.create_event(&draft).await?;
            println!("Created event {}", created.id);
        }
        EventCommands::Delete { id } => {
            // Deletion is cache-guarded, so hydrate the cache first.
            controller.refresh().await?;
            controller.delete_event(&id).await?;
            println!("Deleted event {}", id);
        }
    }
    Ok(())
}

fn print_status(session: &SessionManager) {
    let snapshot = session.snapshot();
    match snapshot.state {
        SessionState::LoggedIn => {
            println!("Logged in");
            if let Some(identity) = snapshot.identity {
                println!("  user:  {} ({})", identity.email, identity.id);
                if let Some(name) = identity.full_name {
                    println!("  name:  {}", name);
                }
            }
            if let Some(credential) = session.credential() {
                println!("  token expires: {}", credential.expires_at.to_rfc3339());
            }
        }
        SessionState::LoggingIn => println!("Login in progress"),
        SessionState::LoggedOut => {
            println!("Logged out");
            if let Some(error) = snapshot.last_error {
                println!("  last error: {}", error);
            }
        }
    }
}

fn require_login(session: &SessionManager) -> Result<Credential> {
    match session.credential() {
        Some(credential) => Ok(credential),
        None => bail!("Not logged in (run `huddle login` first)"),
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("Invalid RFC 3339 instant: {raw}"))?;
    Ok(parsed.with_timezone(&Utc))
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    Ok(password)
}
