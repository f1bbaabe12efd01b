//! carelog binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! SQLite store and either serves the incident API over HTTP or runs one of
//! the offline commands.
//!
//! ```text
//! carelog serve
//! carelog onboard --name "Willow Court" --manager alice
//! carelog add-staff --care-home-id 1 --username bob
//! carelog export --output register.csv
//! ```

use std::{io, path::PathBuf, sync::Arc};

use anyhow::Context as _;
use carelog_core::{
  IncidentRegister, account::StaffRole, store::IncidentFilter,
};
use carelog_server::{ServerConfig, provision};
use carelog_store_sqlite::SqliteStore;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Clinical and safety incident register")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Create a care home and its manager account. Reads the password from
  /// stdin.
  Onboard {
    #[arg(long)]
    name:    String,
    #[arg(long)]
    manager: String,
  },
  /// Add a staff account to an existing care home, then list its accounts.
  /// Reads the password from stdin.
  AddStaff {
    #[arg(long)]
    care_home_id: i64,
    #[arg(long)]
    username:     String,
  },
  /// Write the whole register to a CSV file.
  Export {
    /// Output path; defaults to a timestamped file in the working directory.
    #[arg(short, long)]
    output: Option<PathBuf>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let store_path = server_cfg.resolved_store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(&server_cfg, store).await,
    Command::Onboard { name, manager } => onboard(&store, &name, &manager).await,
    Command::AddStaff { care_home_id, username } => {
      add_staff(&store, care_home_id, &username).await
    }
    Command::Export { output } => export(store, output).await,
  }
}

async fn serve(server_cfg: &ServerConfig, store: SqliteStore) -> anyhow::Result<()> {
  let register = Arc::new(IncidentRegister::new(store));
  let app = carelog_server::app(register);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

fn prompt_password() -> anyhow::Result<String> {
  use std::io::Write as _;
  eprint!("Password: ");
  io::stderr().flush().ok();
  Ok(provision::read_password(io::stdin().lock())?)
}

async fn onboard(store: &SqliteStore, name: &str, manager: &str) -> anyhow::Result<()> {
  let name = provision::care_home_name(name)?;
  let password = prompt_password()?;
  let account = provision::new_account(manager, &password, StaffRole::Manager)?;

  let (home, user) = store
    .onboard_care_home(name, account)
    .await
    .context("onboarding failed")?;

  println!("Care home created successfully");
  println!("Care home ID: {}", home.care_home_id);
  println!("Manager username: {}", user.username);
  Ok(())
}

async fn add_staff(
  store: &SqliteStore,
  care_home_id: i64,
  username: &str,
) -> anyhow::Result<()> {
  let password = prompt_password()?;
  let account = provision::new_account(username, &password, StaffRole::Staff)?;

  let user = store
    .add_staff(care_home_id, account)
    .await
    .context("could not add staff account")?;

  println!("Staff user added successfully");
  println!("Username: {}", user.username);
  println!("Care home ID: {}", user.care_home_id);

  if let Some(home) = store.get_care_home(care_home_id).await? {
    println!("Accounts at {}:", home.name);
  }
  for account in store.list_staff(care_home_id).await? {
    println!("  {} ({})", account.username, account.role.as_str());
  }
  Ok(())
}

async fn export(store: SqliteStore, output: Option<PathBuf>) -> anyhow::Result<()> {
  let register = IncidentRegister::new(store);
  let records = register.fetch_all(&IncidentFilter::default()).await?;

  let path = output
    .unwrap_or_else(|| PathBuf::from(carelog_export::export_file_name(Utc::now())));
  std::fs::write(&path, carelog_export::to_csv(&records))
    .with_context(|| format!("failed to write {path:?}"))?;

  tracing::info!(rows = records.len(), path = %path.display(), "register exported");
  Ok(())
}
