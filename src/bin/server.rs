use anyhow::Context;
use clap::Parser;
use remindr::{
    config::{self, CliArgs},
    db,
    logging::{init_tracing, LogOptions},
    repo::{self, SqliteStore},
    seed::{self, AdminCredentials},
    AppContext,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenv::dotenv().ok();

    let args = CliArgs::parse();

    let _log_guard = init_tracing(&LogOptions {
        debug: args.debug,
        json: args.json_logs,
        log_dir: args.log_dir.clone(),
    })?;

    let config = config::get_config(&args);

    let pool = Arc::new(db::init_pool(&config.database_url)?);
    {
        let mut conn = pool.get().context("failed to get a connection for migrations")?;
        remindr::run_migrations(&mut conn)?;
    }

    let purged = repo::purge_expired_sessions(&pool)?;
    if purged > 0 {
        info!("Removed {} expired sessions", purged);
    }

    if args.seed {
        let admin = match (&args.admin_username, &args.admin_password) {
            (Some(username), Some(password)) => Some(AdminCredentials {
                username: username.clone(),
                password: password.clone(),
            }),
            (None, None) => None,
            _ => {
                warn!("Both admin username and password are needed to seed an admin account");
                None
            }
        };
        seed::seed(&SqliteStore::new(pool.clone()), admin.as_ref())?;
    }

    let app = remindr::create_app(AppContext::new(pool, &config));

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
