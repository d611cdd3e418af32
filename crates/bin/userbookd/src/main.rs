//! # userbookd — userbook daemon
//!
//! Composition root that wires the adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialize logging
//! - Pick the storage backend: `SQLite` (pool + migrations) or in-memory
//! - Construct the user service, injecting the repository via its port trait
//! - Build the axum router, injecting the service into both presentations
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use userbook_adapter_http_axum::state::AppState;
use userbook_adapter_storage_sqlite_sqlx::SqliteUserRepository;
use userbook_app::memory::InMemoryUserRepository;
use userbook_app::ports::UserRepository;
use userbook_app::services::user_service::UserService;

use crate::config::{Backend, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|err| {
            eprintln!("invalid log filter {:?}: {err}", config.logging.filter);
            EnvFilter::new("info")
        }))
        .init();

    match config.database.backend {
        Backend::Sqlite => {
            let db = userbook_adapter_storage_sqlite_sqlx::Config {
                database_url: config.database_url().to_string(),
                max_connections: config.database.max_connections,
            }
            .build()
            .await
            .context("opening sqlite database")?;
            serve(SqliteUserRepository::new(db.pool().clone()), &config).await
        }
        Backend::Memory => {
            tracing::warn!("using in-memory storage, users are lost on exit");
            serve(InMemoryUserRepository::new(), &config).await
        }
    }
}

async fn serve<R>(repo: R, config: &Config) -> anyhow::Result<()>
where
    R: UserRepository + Send + Sync + 'static,
{
    let state = AppState::new(UserService::new(repo), config.page_size()?);
    let mounts = config.mounts();
    let app = userbook_adapter_http_axum::router::build(state, &mounts);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(
        %bind_addr,
        api = %mounts.api,
        html = %mounts.html,
        backend = ?config.database.backend,
        "userbookd listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("userbookd stopped");
    Ok(())
}

/// Wait for Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
