//! festd — the festival site daemon.
//!
//! Single binary that assembles the festival subsystems:
//! - Document store (redb)
//! - Content layer and public site
//! - Admin auth and REST API
//! - Registration monitor
//!
//! # Usage
//!
//! ```text
//! festd serve --port 3000 --data-dir ./data --config festival.toml
//! festd init-content
//! festd create-admin --email captain@example.com --password ... --name Captain
//! festd check-registrations [--dry-run]
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::watch;
use tracing::{info, warn};

use fest_api::ApiState;
use fest_core::{FestConfig, epoch_secs};
use fest_monitor::RegistrationMonitor;
use fest_state::{AdminRole, StateStore};

#[derive(Parser)]
#[command(name = "festd", about = "Festival site daemon")]
struct Cli {
    /// Data directory for persistent state.
    #[arg(long, global = true, default_value = "./data")]
    data_dir: PathBuf,

    /// Path to festival.toml. Defaults apply when the file is absent.
    #[arg(long, global = true, default_value = "festival.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Admin,
    Editor,
}

impl From<RoleArg> for AdminRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => AdminRole::Admin,
            RoleArg::Editor => AdminRole::Editor,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Serve the public site and the API.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Do not run the periodic registration monitor.
        #[arg(long)]
        no_monitor: bool,
    },

    /// Overwrite all content documents with the default festival content.
    InitContent,

    /// Create an account and add it to the admin allow-list.
    CreateAdmin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        name: String,

        #[arg(long, value_enum, default_value = "admin")]
        role: RoleArg,
    },

    /// Run one registration check and print the report.
    CheckRegistrations {
        /// Report what would happen without sending mail.
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,festd=debug,fest=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = FestConfig::load(Some(&cli.config))
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let store = open_store(&cli.data_dir)?;

    match cli.command {
        Command::Serve { port, no_monitor } => run_serve(store, config, port, no_monitor).await,
        Command::InitContent => {
            let state = ApiState::new(store, &config);
            state.content.initialize_default_content().await?;
            info!("default content written");
            Ok(())
        }
        Command::CreateAdmin {
            email,
            password,
            name,
            role,
        } => {
            let state = ApiState::new(store, &config);
            let admin = state
                .auth
                .create_admin(&email, &password, &name, role.into())
                .map_err(|e| anyhow::anyhow!("{}", e.detail()))?;
            info!(uid = %admin.id, email = %admin.email, "admin created");
            Ok(())
        }
        Command::CheckRegistrations { dry_run } => {
            let monitor = RegistrationMonitor::new(store, config.monitoring, config.site.name);
            let report = if dry_run {
                monitor.dry_run(epoch_secs())?
            } else {
                monitor.check(epoch_secs()).await?
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
    }
}

fn open_store(data_dir: &Path) -> anyhow::Result<StateStore> {
    std::fs::create_dir_all(data_dir)?;
    let db_path = data_dir.join("festival.redb");
    let store = StateStore::open(&db_path)?;
    info!(path = ?db_path, "state store opened");
    Ok(store)
}

async fn run_serve(
    store: StateStore,
    config: FestConfig,
    port: u16,
    no_monitor: bool,
) -> anyhow::Result<()> {
    info!(site = %config.site.name, "festival daemon starting");

    let state = ApiState::new(store, &config);
    if state.auth.needs_setup()? {
        warn!("no admins yet; POST /api/v1/auth/setup or run `festd create-admin`");
    }

    // ── Shutdown signal ────────────────────────────────────────

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Background tasks ───────────────────────────────────────

    let monitor_handle = match state.monitor.missing_config() {
        _ if no_monitor => None,
        Some(missing) => {
            info!(%missing, "periodic registration monitor disabled");
            None
        }
        None => Some(state.monitor.clone().spawn_periodic(shutdown_rx)),
    };

    // ── HTTP server ────────────────────────────────────────────

    let router = fest_api::build_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "HTTP server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    server.await?;

    if let Some(handle) = monitor_handle {
        let _ = handle.await;
    }

    info!("festival daemon stopped");
    Ok(())
}
