use crate::config::Listener as ListenerConfig;
use crate::errors::RouletteError;
use crate::media::{GameMedia, MediaClient};
use crate::metrics_defs::{HISTORY_REQUESTS, ROULETTE_SPINS, TELEPORT_REPORTS};
use crate::play_metrics::{GameMetrics, PlayMetricsStore, PlayerMetrics};
use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::counter;
use std::sync::Arc;
use tokio::net::TcpListener;
use versions::cache::{Lookup, VersionCache};
use versions::catalog::{CatalogClient, Game};
use versions::types::{GameId, VersionRecord};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogClient>,
    pub versions: Arc<VersionCache>,
    pub media: Arc<MediaClient>,
    pub play_metrics: Arc<PlayMetricsStore>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/roulette", get(spin_roulette))
        .route("/roulette/{game_id}/metrics", put(report_teleports))
        .route("/metrics/{player}", get(player_metrics))
        .route("/history", get(catalog_history))
        .with_state(state)
}

pub async fn serve(listener: &ListenerConfig, state: AppState) -> Result<(), RouletteError> {
    let addr = format!("{}:{}", listener.host, listener.port);
    let tcp = TcpListener::bind(addr).await?;
    axum::serve(tcp, router(state)).await?;
    Ok(())
}

/// One catalog entry paired with everything the client renders for it.
#[derive(Serialize)]
pub struct RouletteGame {
    pub roblox: Game,
    pub media: Vec<GameMedia>,
    pub versions: Vec<VersionRecord>,
    pub metrics: GameMetrics,
}

#[derive(Serialize)]
struct HistoryResponse {
    games: Vec<HistoryEntry>,
}

#[derive(Serialize)]
struct HistoryEntry {
    roblox: Game,
    /// Null while the place's backfill has not fit under the budget yet.
    versions: Option<Vec<VersionRecord>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TeleportReport {
    pub teleports: u64,
    pub missed_teleports: u64,
    pub teleported_players: Vec<u64>,
    pub missed_players: Vec<u64>,
}

async fn spin_roulette(
    State(state): State<AppState>,
) -> Result<Json<RouletteGame>, RouletteError> {
    let mut games = state.catalog.list_games(false).await?;
    if games.is_empty() {
        return Err(RouletteError::NoGames);
    }

    let pick = rand::rng().random_range(0..games.len());
    let game = games.swap_remove(pick);

    let media = state.media.game_media(game.id).await?;
    let versions = state
        .versions
        .resolve(game.root_place_id, Lookup::Cached)
        .await?;
    let metrics = state.play_metrics.game_metrics(game.id)?;

    state.play_metrics.record_spin(game.id)?;
    counter!(ROULETTE_SPINS).increment(1);

    Ok(Json(RouletteGame {
        roblox: game,
        media,
        versions,
        metrics,
    }))
}

async fn report_teleports(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
    Json(report): Json<TeleportReport>,
) -> Result<axum::http::StatusCode, RouletteError> {
    tracing::info!(
        game_id,
        teleports = report.teleports,
        missed_teleports = report.missed_teleports,
        "recording teleport report"
    );

    state
        .play_metrics
        .record_teleports(game_id, report.teleports, report.missed_teleports)?;

    // Every reported player gets a spin; only successful teleports count
    for player in report
        .teleported_players
        .iter()
        .chain(&report.missed_players)
    {
        state.play_metrics.record_player_spin(*player)?;
    }
    for player in &report.teleported_players {
        state.play_metrics.record_player_teleport(*player)?;
    }

    counter!(TELEPORT_REPORTS).increment(1);
    Ok(axum::http::StatusCode::NO_CONTENT)
}

async fn player_metrics(
    State(state): State<AppState>,
    Path(player): Path<u64>,
) -> Result<Json<PlayerMetrics>, RouletteError> {
    state
        .play_metrics
        .player_metrics(player)?
        .map(Json)
        .ok_or(RouletteError::PlayerNotFound)
}

async fn catalog_history(
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, RouletteError> {
    let outcome = state.versions.reconcile_all().await?;
    counter!(HISTORY_REQUESTS).increment(1);

    let mut versions = outcome.versions;
    let games = outcome
        .games
        .into_iter()
        .map(|game| {
            let entry = versions.remove(&game.root_place_id);
            HistoryEntry {
                roblox: game,
                versions: entry,
            }
        })
        .collect();

    Ok(Json(HistoryResponse { games }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use versions::store::{MemoryVersionStore, VersionStore};
    use versions::testutils::{FixedCatalog, ScriptedPages, game, version_record};
    use versions::ttl;
    use versions::types::SecurityCookie;
    use wiremock::matchers::{method, path as url_path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_with(
        games: Vec<Game>,
        pages: ScriptedPages,
        store: Arc<MemoryVersionStore>,
        media_url: &str,
    ) -> AppState {
        let catalog: Arc<dyn CatalogClient> = Arc::new(FixedCatalog::new(games));
        AppState {
            catalog: catalog.clone(),
            versions: Arc::new(VersionCache::new(catalog, Arc::new(pages), store)),
            media: Arc::new(MediaClient::new(media_url, SecurityCookie::new("test"))),
            play_metrics: Arc::new(PlayMetricsStore::in_memory().unwrap()),
        }
    }

    #[tokio::test]
    async fn test_spin_roulette_assembles_game_and_counts_spin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(url_path("/v2/games/11/media"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"data": []}"#))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryVersionStore::new());
        store
            .put(101, &[version_record(1)], ttl::unix_now())
            .unwrap();

        let state = state_with(
            vec![game(11, 101)],
            ScriptedPages::new(),
            store,
            &server.uri(),
        );

        let Json(response) = spin_roulette(State(state.clone())).await.unwrap();

        assert_eq!(response.roblox.id, 11);
        assert_eq!(response.versions, vec![version_record(1)]);
        assert!(response.media.is_empty());
        // Metrics are read before the spin is recorded
        assert_eq!(response.metrics.spins, 0);
        assert_eq!(state.play_metrics.game_metrics(11).unwrap().spins, 1);
    }

    #[tokio::test]
    async fn test_spin_roulette_empty_catalog() {
        let state = state_with(
            vec![],
            ScriptedPages::new(),
            Arc::new(MemoryVersionStore::new()),
            "http://127.0.0.1:1",
        );

        let result = spin_roulette(State(state)).await;
        assert!(matches!(result, Err(RouletteError::NoGames)));
    }

    #[tokio::test]
    async fn test_report_teleports_updates_game_and_players() {
        let state = state_with(
            vec![],
            ScriptedPages::new(),
            Arc::new(MemoryVersionStore::new()),
            "http://127.0.0.1:1",
        );
        state.play_metrics.record_spin(11).unwrap();

        let report = TeleportReport {
            teleports: 2,
            missed_teleports: 1,
            teleported_players: vec![500, 501],
            missed_players: vec![502],
        };

        let status = report_teleports(State(state.clone()), Path(11), Json(report))
            .await
            .unwrap();
        assert_eq!(status, axum::http::StatusCode::NO_CONTENT);

        let metrics = state.play_metrics.game_metrics(11).unwrap();
        assert_eq!(metrics.teleports, 2);
        assert_eq!(metrics.missed_teleports, 1);

        let teleported = state.play_metrics.player_metrics(500).unwrap().unwrap();
        assert_eq!((teleported.spins, teleported.teleports), (1, 1));
        let missed = state.play_metrics.player_metrics(502).unwrap().unwrap();
        assert_eq!((missed.spins, missed.teleports), (1, 0));
    }

    #[tokio::test]
    async fn test_player_metrics_not_found() {
        let state = state_with(
            vec![],
            ScriptedPages::new(),
            Arc::new(MemoryVersionStore::new()),
            "http://127.0.0.1:1",
        );

        let result = player_metrics(State(state), Path(500)).await;
        assert!(matches!(result, Err(RouletteError::PlayerNotFound)));
    }

    #[tokio::test]
    async fn test_history_pairs_every_game_with_versions_or_null() {
        let store = Arc::new(MemoryVersionStore::new());
        store.put(101, &[version_record(1)], 5).unwrap();

        // Place 102 is missing and will be backfilled; 103 fails and stays null
        let pages = ScriptedPages::new()
            .with_pages(102, vec![vec![version_record(2)]])
            .fail_at(103, 0);

        let state = state_with(
            vec![game(11, 101), game(12, 102), game(13, 103)],
            pages,
            store,
            "http://127.0.0.1:1",
        );

        let Json(response) = catalog_history(State(state)).await.unwrap();

        assert_eq!(response.games.len(), 3);
        assert_eq!(
            response.games[0].versions.as_deref(),
            Some(&[version_record(1)][..])
        );
        assert_eq!(
            response.games[1].versions.as_deref(),
            Some(&[version_record(2)][..])
        );
        assert_eq!(response.games[2].versions, None);
    }
}
