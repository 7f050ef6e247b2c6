use nf_server::{build_router, logger, metrics_exporter};
use nf_stream::{AppState, Metrics, NotificationService, ShutdownCoordinator, StreamSettings};

use std::error::Error;

use log::{error, info};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load and validate configuration
    let config = nf_config::Config::load()?;
    config.validate()?;

    // Construct log file path if configured
    let log_file_path: Option<std::path::PathBuf> = if let Some(ref filename) = config.logging.file
    {
        let config_dir = nf_config::Config::config_dir()?;
        let log_dir = config_dir.join(&config.logging.dir);

        // Ensure log directory exists
        std::fs::create_dir_all(&log_dir)?;

        Some(log_dir.join(filename))
    } else {
        None
    };

    // Initialize logger (before any other logging)
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting nf-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    // Install the metrics recorder before any metric is touched
    let metrics_handle = metrics_exporter::install()?;

    // Connect the broker backend
    info!(
        "Connecting to {} broker: {}",
        config.broker.kind,
        config.broker.redacted_url()
    );
    let broker = nf_broker::connect_broker(&config.broker).await?;

    let metrics = Metrics::new();
    let shutdown = ShutdownCoordinator::new();

    let service = NotificationService::new(
        broker,
        StreamSettings::from_config(&config),
        metrics.clone(),
        shutdown.clone(),
    );

    // Build router
    let app_state = AppState {
        service: service.clone(),
        metrics,
    };
    let app = build_router(app_state, metrics_handle);

    // Create TCP listener
    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;

    // Get actual bound address (important when port is 0 / auto-assigned)
    let actual_addr = listener.local_addr()?;
    info!("Server listening on {}", actual_addr);

    // Spawn signal handler for graceful shutdown
    let service_for_signal = service.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                service_for_signal.shutdown();
            }
            Err(e) => {
                error!("Failed to listen for SIGINT: {}", e);
            }
        }
    });

    // Start server with graceful shutdown
    info!("Server ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.subscribe_guard().wait().await;
            info!("Graceful shutdown complete");
        })
        .await?;

    Ok(())
}
