//! Test doubles for the upstream catalog and version listing.

use crate::catalog::{CatalogClient, Game, PrivacyType};
use crate::fetch::{FetchError, VersionPage, VersionPages};
use crate::types::{CreatorType, GameId, PlaceId, VersionRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

pub fn version_record(id: u64) -> VersionRecord {
    VersionRecord {
        id,
        asset_id: 9000 + id,
        asset_version_number: id,
        creator_type: CreatorType::User,
        creator_target_id: 77,
        creating_universe_id: None,
        created: "2024-01-01T00:00:00Z".to_string(),
        is_published: false,
    }
}

pub fn game(id: GameId, root_place_id: PlaceId) -> Game {
    Game {
        id,
        name: format!("game-{id}"),
        description: None,
        is_archived: false,
        root_place_id,
        privacy_type: PrivacyType::Public,
        creator_type: CreatorType::User,
        creator_target_id: 77,
        creator_name: "builder".to_string(),
        created: "2023-01-01T00:00:00Z".to_string(),
        updated: "2024-01-01T00:00:00Z".to_string(),
    }
}

/// Serves scripted version pages per place and counts every upstream call.
/// Cursors are synthesized as `page-N` so pagination order is observable.
#[derive(Default)]
pub struct ScriptedPages {
    pages: HashMap<PlaceId, Vec<Vec<VersionRecord>>>,
    failures: HashMap<PlaceId, usize>,
    calls: AtomicU32,
}

impl ScriptedPages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(mut self, place_id: PlaceId, pages: Vec<Vec<VersionRecord>>) -> Self {
        self.pages.insert(place_id, pages);
        self
    }

    /// Make the given page index for `place_id` fail with a server error.
    pub fn fail_at(mut self, place_id: PlaceId, page_index: usize) -> Self {
        self.failures.insert(place_id, page_index);
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionPages for ScriptedPages {
    async fn list_page(
        &self,
        place_id: PlaceId,
        cursor: Option<&str>,
    ) -> Result<VersionPage, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let index = match cursor {
            None => 0,
            Some(cursor) => cursor
                .strip_prefix("page-")
                .and_then(|n| n.parse().ok())
                .unwrap_or(0),
        };

        if self.failures.get(&place_id) == Some(&index) {
            return Err(FetchError::Status(
                reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }

        let pages = self.pages.get(&place_id);
        let data = pages
            .and_then(|pages| pages.get(index))
            .cloned()
            .unwrap_or_default();
        let page_count = pages.map(Vec::len).unwrap_or(0);
        let next_page_cursor = if index + 1 < page_count {
            Some(format!("page-{}", index + 1))
        } else {
            None
        };

        Ok(VersionPage {
            data,
            next_page_cursor,
        })
    }
}

/// Catalog client backed by a fixed game list.
pub struct FixedCatalog {
    games: Vec<Game>,
}

impl FixedCatalog {
    pub fn new(games: Vec<Game>) -> Self {
        FixedCatalog { games }
    }
}

#[async_trait]
impl CatalogClient for FixedCatalog {
    async fn list_games(&self, include_archived: bool) -> Result<Vec<Game>, FetchError> {
        Ok(self
            .games
            .iter()
            .filter(|game| include_archived || !game.is_archived)
            .cloned()
            .collect())
    }
}
