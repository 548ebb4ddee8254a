use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::application::DatasetHandle;
use crate::infrastructure::assets::CharacterImages;
use crate::infrastructure::config::ConfigService;
use crate::interfaces::http::start_server;

pub fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config_service = ConfigService::new();
    let config = match config_service.load() {
        Ok(config) => config,
        Err(err) => {
            init_tracing("info");
            error!(
                path = %config_service.path().display(),
                error = %err,
                "Failed to load configuration"
            );
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                err.to_string(),
            ));
        }
    };

    init_tracing(&config.log_filter);

    let dataset = Arc::new(DatasetHandle::from_config(&config));
    let catalog = dataset.get();
    match catalog.ensure_available() {
        Ok(binding) => {
            let (region, character, feature) = binding.columns();
            info!(
                path = %dataset.path().display(),
                rows = catalog.dataset().len(),
                region,
                character,
                feature,
                "Dataset ready"
            );
        }
        Err(err) => {
            error!(
                path = %dataset.path().display(),
                error = %err,
                "Dataset unavailable; region endpoints will answer 503"
            );
        }
    }

    let images = CharacterImages::new(config.image_dir.clone());
    if !images.dir().is_dir() {
        warn!(dir = %images.dir().display(), "Image directory not found; profiles will have no image");
    }

    let logs = Arc::new(Mutex::new(Vec::new()));
    let host = config.server.host.clone();
    let port = config.server.port;

    info!(host = %host, port, "Starting HTTP server");
    actix_web::rt::System::new()
        .block_on(async move { start_server(dataset, images, logs, &host, port)?.await })
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
