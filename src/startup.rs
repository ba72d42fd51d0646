use crate::components::event_store::{EventStorage, FileStorage, InMemoryStorage, RedisStorage};
use crate::components::prompt_relay::{Extractor, GeminiExtractor};
use crate::config::{Config, StorageConfig};
use crate::controller::CalendarController;
use crate::error::{AppResult, Error};
use crate::shutdown;
use crate::utils::{i18n, time};
use crate::web::{router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config; a missing credential stops startup here
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Create the storage backend selected in the config
pub fn build_storage(config: &Config) -> AppResult<Arc<dyn EventStorage>> {
    let storage: Arc<dyn EventStorage> = match &config.storage {
        StorageConfig::File { data_dir } => {
            let storage = FileStorage::new(data_dir, &config.storage_key);
            info!("Using file storage at {}", storage.path().display());
            Arc::new(storage)
        }
        StorageConfig::Redis { url } => Arc::new(RedisStorage::new(url, &config.storage_key)?),
        StorageConfig::Memory => {
            info!("Using in-memory storage; events are lost on exit");
            Arc::new(InMemoryStorage::new())
        }
    };

    Ok(storage)
}

/// Create the model client
pub fn build_extractor(config: &Config) -> AppResult<Arc<dyn Extractor>> {
    let extractor = GeminiExtractor::new(
        &config.gemini_api_key,
        &config.gemini_model,
        &config.gemini_base_url,
        config.gemini_timeout,
    )?;
    info!("Using Gemini endpoint {}", extractor.endpoint());

    Ok(Arc::new(extractor))
}

/// Wire up the components and serve HTTP until a shutdown signal arrives
pub async fn start_server(config: Config) -> miette::Result<()> {
    i18n::set_locale(&config.locale);

    let storage = build_storage(&config)?;
    let extractor = build_extractor(&config)?;

    let controller =
        CalendarController::load(storage, extractor, config.grid, time::today()).await;
    let state = AppState::new(Arc::new(controller));
    let app = router(state, config.static_dir.clone());

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| Error::Other(format!("Failed to bind {}: {}", address, e)))?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::wait_for_signal())
        .await
        .map_err(Error::from)?;

    info!("Server stopped");
    Ok(())
}
