use std::process::ExitCode;

use tokio::net::TcpListener;
use todo_server::{store, telemetry, AppState, CorsPolicy, ServerConfig};

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let (Ok(mut sigterm), Ok(mut sigint)) = (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) else {
            tracing::warn!("could not register signal handlers; falling back to ctrl-c");
            let _ = tokio::signal::ctrl_c().await;
            return;
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            return ExitCode::FAILURE;
        }
    };
    telemetry::init_tracing(config.log_json);

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "server exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = store::connect(&config.database_url).await?;
    let state = AppState::new(store.clone(), CorsPolicy::new(config.cors_allowed_origins.clone()));

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, backend = store.backend_tag(), "server listening");

    let served = todo_server::run_until(listener, state, wait_for_shutdown_signal()).await;
    tracing::info!("shutting down, closing store");
    store.close().await?;
    Ok(served?)
}
