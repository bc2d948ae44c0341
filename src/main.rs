//! libsearch — library catalog search server.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use libsearch::{api, db, lookup, AppState};

#[derive(Parser)]
#[command(name = "libsearch", version, about = "Library catalog search with Google Books fallback")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "127.0.0.1", env = "LIBSEARCH_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "5000", env = "LIBSEARCH_PORT")]
    port: u16,

    /// SQLite database path
    #[arg(short, long, default_value = "books.db", env = "LIBSEARCH_DB")]
    db: String,

    /// Google Books volumes endpoint
    #[arg(long, default_value = lookup::DEFAULT_VOLUMES_URL, env = "LIBSEARCH_LOOKUP_URL")]
    lookup_url: String,

    /// Timeout for external lookups, in seconds
    #[arg(long, default_value = "5", env = "LIBSEARCH_LOOKUP_TIMEOUT")]
    lookup_timeout_secs: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Drop and recreate the books table, then load the default books
    InitDb,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!(error = %e, "libsearch failed");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let bdb = db::BookDB::open(&args.db)?;

    if let Some(Command::InitDb) = args.command {
        let n = bdb.reset_and_seed()?;
        info!(db = %args.db, seeded = n, "database rebuilt");
        return Ok(());
    }

    let lookup_cfg = lookup::LookupConfig::new(
        args.lookup_url.trim_end_matches('/'),
        Duration::from_secs(args.lookup_timeout_secs),
    )?;
    let state = AppState::new(bdb, lookup_cfg);
    let app = api::router(state);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %args.host,
        port = args.port,
        db = %args.db,
        lookup = %args.lookup_url,
        "libsearch starting"
    );

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    info!("shutting down");
}
