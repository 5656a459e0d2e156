//! SmartNotes HTTP service entry point.
//!
//! Opens the note store before binding; a store that cannot be opened stops
//! the process instead of serving requests without storage.

use log::{error, info};
use smartnotes_core::{init_logging, StoreContext};
use smartnotes_server::{build_router, AppState, ServerConfig};
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    let store = StoreContext::new(config.store_location()).with_id_strategy(config.id_strategy);
    if let Err(err) = store.service() {
        error!("event=server_start module=http status=error error_code=store_init_failed error={err}");
        return ExitCode::FAILURE;
    }

    let app = build_router(Arc::new(AppState::new(store)));
    let addr = config.bind_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("event=server_start module=http status=error error_code=bind_failed addr={addr} error={err}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        "event=server_start module=http status=ok addr={addr} db_path={} api=/api/notes health=/health",
        config.db_path
    );

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("event=server_stop module=http status=error error={err}");
        return ExitCode::FAILURE;
    }

    info!("event=server_stop module=http status=ok");
    ExitCode::SUCCESS
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("event=shutdown_signal module=http status=error error={err}");
        // Without a signal handler, keep serving until killed.
        std::future::pending::<()>().await;
    }
}
