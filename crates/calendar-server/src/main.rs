//! Calendar service binary.
//!
//! Runs the JSON API and the gRPC API side by side over one shared
//! storage backend.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration (defaults when the file is absent)
//! 3. Initialize structured logging (tracing)
//! 4. Build the storage backend
//! 5. Bind both servers, then serve them on separate tasks
//! 6. Wait for a termination signal or for either server to stop
//! 7. Cancel the shared token and drain within the shutdown budget
//! 8. Close the backend

mod cli;
mod error;
mod shutdown;
mod storage;

use std::future::Future;
use std::path::Path;
use std::process::ExitCode;

use calendar_core::config::{LogFormat, LoggerConfig};
use calendar_core::{Calendar, CalendarConfig, CancelToken, ConfigError};
use calendar_grpc::{CalendarGrpcService, GrpcServer};
use calendar_http::{AppState, HttpServer, ServerConfig};
use clap::Parser;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::AppError;
use crate::storage::Backend;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Command::Version)) {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    let (config, from_file) = match load_config(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            // Tracing is not up yet.
            eprintln!("calendar: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logger);
    if from_file {
        info!(path = %cli.config.display(), "Configuration loaded");
    } else {
        warn!(path = %cli.config.display(), "Configuration file not found; using defaults");
    }

    match run(config).await {
        Ok(()) => {
            info!("calendar stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "calendar failed");
            ExitCode::FAILURE
        }
    }
}

/// Load `path`, falling back to defaults (plus environment overrides)
/// when the file does not exist. The flag reports which happened.
fn load_config(path: &Path) -> Result<(CalendarConfig, bool), AppError> {
    match CalendarConfig::from_file(path) {
        Ok(config) => Ok((config, true)),
        Err(ConfigError::Io { source }) if source.kind() == std::io::ErrorKind::NotFound => {
            let mut config = CalendarConfig::default();
            config.apply_env_overrides();
            Ok((config, false))
        }
        Err(e) => Err(e.into()),
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logger.level`.
fn init_tracing(logger: &LoggerConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logger.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match logger.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn run(config: CalendarConfig) -> Result<(), AppError> {
    let backend = Backend::connect(&config.storage).await?;
    let result = serve(&config, &backend).await;
    backend.close().await;
    result
}

async fn serve(config: &CalendarConfig, backend: &Backend) -> Result<(), AppError> {
    let calendar = Calendar::new(backend.repository());

    // Bind both before serving either, so a taken port fails startup.
    let http = HttpServer::bind(
        &ServerConfig::from(&config.http),
        AppState::new(calendar.clone(), config.http.request_timeout()),
    )
    .await?;
    let grpc = GrpcServer::bind(
        &config.grpc,
        CalendarGrpcService::new(calendar, config.grpc.request_timeout()),
    )
    .await?;

    let token = CancelToken::new();
    let mut http_task = spawn_server("http", http.serve(token.clone()), token.clone());
    let mut grpc_task = spawn_server("grpc", grpc.serve(token.clone()), token.clone());
    info!("calendar started");

    tokio::select! {
        signal = shutdown::wait_for_signal() => info!(signal, "Shutdown signal received"),
        () = token.cancelled() => warn!("A server stopped unexpectedly; shutting down"),
    }
    token.cancel();

    let budget = config.server.shutdown_timeout();
    let drained = tokio::time::timeout(budget, async {
        tokio::join!(&mut http_task, &mut grpc_task)
    })
    .await;

    match drained {
        Ok((http_result, grpc_result)) => {
            let http_result = task_result(http_result);
            let grpc_result = task_result(grpc_result);
            http_result.and(grpc_result)
        }
        Err(_elapsed) => {
            http_task.abort();
            grpc_task.abort();
            Err(AppError::ShutdownTimeout(budget))
        }
    }
}

/// Run one server on its own task. Whatever way it ends, the shared
/// token is cancelled so the other server stops too.
fn spawn_server<F, E>(
    name: &'static str,
    serve: F,
    token: CancelToken,
) -> JoinHandle<Result<(), AppError>>
where
    F: Future<Output = Result<(), E>> + Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    tokio::spawn(async move {
        let result = serve.await.map_err(Into::into);
        if let Err(e) = &result {
            error!(server = name, error = %e, "server failed");
        }
        token.cancel();
        result
    })
}

fn task_result(joined: Result<Result<(), AppError>, JoinError>) -> Result<(), AppError> {
    joined.map_err(|e| AppError::Task {
        message: e.to_string(),
    })?
}
