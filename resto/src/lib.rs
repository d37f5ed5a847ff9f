pub mod api;
pub mod query;
pub mod services;
pub mod storage;
pub mod utils;


use std::sync::Arc;
use common::config::{LoggingConfig, Settings};
use common::Result;
use services::RestaurantService;
use storage::{MongoStore, RestaurantStore};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global tracing subscriber. `RUST_LOG` wins over the configured
/// filter.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = fmt().with_env_filter(filter);

    let result = if logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    if let Err(e) = result {
        eprintln!("Tracing already initialized: {}", e);
    }
}

async fn connect_service(settings: &Settings) -> Result<Arc<RestaurantService>> {
    let store: Arc<dyn RestaurantStore> = Arc::new(MongoStore::connect(&settings.mongodb).await?);
    Ok(Arc::new(RestaurantService::new(store)))
}

/// Runs the restaurant query API until Ctrl+C or SIGTERM
pub async fn run_resto_api(config_path: &str) -> Result<()> {
    let settings = Settings::new(config_path)?;
    init_tracing(&settings.logging);

    info!("Initializing restaurant service...");
    let service = connect_service(&settings).await?;

    let app = api::routes(service);

    let address = settings.api.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Restaurant API listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Pings the configured database and prints what the service would see.
pub async fn run_connection_check(config_path: &str) -> Result<()> {
    let settings = Settings::new(config_path)?;
    init_tracing(&settings.logging);

    let service = connect_service(&settings).await?;
    let ping = service.ping().await?;
    info!("{}", ping.message);

    let debug_info = service.debug_info().await?;
    println!("{}", serde_json::to_string_pretty(&debug_info)?);

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
