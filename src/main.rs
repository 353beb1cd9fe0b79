use anyhow::Context;
use clap::Parser;
use house_price::api::{create_router, AppState};
use house_price::cli::{self, Cli, Commands};
use house_price::config::{AppConfig, LoggingConfig};
use house_price::error::{PredictorError, Result};
use house_price::services::PriceService;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load_from(&cli.config_dir).with_context(|| {
        format!("failed to load configuration from {}", cli.config_dir.display())
    })?;

    match cli.command {
        None => {
            init_logging(&config.logging, cli.verbose);
            validate(&config)?;
            run_server(config).await?;
        }
        Some(Commands::Serve { host, port, data }) => {
            init_logging(&config.logging, cli.verbose);
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            override_dataset(&mut config, data);
            validate(&config)?;
            run_server(config).await?;
        }
        Some(Commands::Predict { data, listing, json }) => {
            init_logging_simple(cli.verbose);
            override_dataset(&mut config, data);
            validate(&config)?;
            cli::run_predict(&config, &listing.into(), json)?;
        }
        Some(Commands::Options { data, column }) => {
            init_logging_simple(cli.verbose);
            override_dataset(&mut config, data);
            validate(&config)?;
            cli::run_options(&config, column.as_deref())?;
        }
        Some(Commands::Evaluate {
            data,
            test_fraction,
            seed,
        }) => {
            init_logging(&config.logging, cli.verbose);
            override_dataset(&mut config, data);
            validate(&config)?;
            cli::run_evaluate(&config, test_fraction, seed)?;
        }
    }

    Ok(())
}

fn override_dataset(config: &mut AppConfig, data: Option<PathBuf>) {
    if let Some(path) = data {
        config.dataset.path = path;
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    config.validate().map_err(|errors| {
        for e in &errors {
            error!("config: {}", e);
        }
        PredictorError::Validation(errors.join("; "))
    })
}

async fn run_server(config: AppConfig) -> Result<()> {
    // Fit once before binding; handlers only read the pipeline.
    let service = PriceService::from_config(&config)?;
    let state = AppState::new(service, config.ui.clone());
    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, dataset = %config.dataset.path.display(), "price form listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let default = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    if logging.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .init();
    }
}

fn init_logging_simple(verbose: bool) {
    // Keep stdout clean for command output
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
