pub mod api;
pub mod config;
pub mod errors;
pub mod media;
pub mod metrics_defs;
pub mod play_metrics;

use crate::api::AppState;
use crate::config::Config;
use crate::errors::RouletteError;
use crate::media::MediaClient;
use crate::play_metrics::PlayMetricsStore;
use std::path::Path;
use std::sync::Arc;
use versions::cache::VersionCache;
use versions::catalog::{CatalogClient, UniverseSearchClient};
use versions::fetch::SavedVersionsClient;
use versions::store::SqliteVersionStore;

pub async fn run(config_path: &Path) -> Result<(), RouletteError> {
    let config = Config::load(config_path)?;

    if let Some(statsd) = &config.statsd {
        shared::metrics::install_statsd(&statsd.host, statsd.port, &statsd.prefix)?;
        shared::metrics_defs::describe_all(metrics_defs::ALL_METRICS);
        shared::metrics_defs::describe_all(versions::metrics_defs::ALL_METRICS);
    }

    let cookie = config.platform.security_cookie();

    let catalog: Arc<dyn CatalogClient> = Arc::new(UniverseSearchClient::new(
        config.platform.catalog_url.as_str(),
        cookie.clone(),
        config.platform.creator_type,
        config.platform.creator_id,
    ));
    let pages = Arc::new(SavedVersionsClient::new(
        config.platform.develop_url.as_str(),
        cookie.clone(),
    ));
    let store = Arc::new(SqliteVersionStore::open(&config.database.path)?);

    let state = AppState {
        versions: Arc::new(VersionCache::new(catalog.clone(), pages, store)),
        catalog,
        media: Arc::new(MediaClient::new(
            config.platform.games_url.as_str(),
            cookie,
        )),
        play_metrics: Arc::new(PlayMetricsStore::open(&config.database.path)?),
    };

    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        "starting roulette service"
    );

    api::serve(&config.listener, state).await
}
