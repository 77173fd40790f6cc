use crate::fetch::FetchError;
use crate::types::{CreatorType, GameId, PlaceId, SecurityCookie};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The catalog is fetched as a single page; creators stay well under this.
const CATALOG_PAGE_SIZE: u32 = 1000;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PrivacyType {
    Private,
    Public,
    FriendsOnly,
}

/// One catalog entry. The core only depends on `root_place_id` (the join key
/// into the version store) and on membership for pruning.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub description: Option<String>,
    pub is_archived: bool,
    pub root_place_id: PlaceId,
    pub privacy_type: PrivacyType,
    pub creator_type: CreatorType,
    pub creator_target_id: u64,
    pub creator_name: String,
    pub created: String,
    pub updated: String,
}

#[derive(Deserialize)]
struct GameListing {
    data: Vec<Game>,
}

/// Lists all games owned by the configured creator.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn list_games(&self, include_archived: bool) -> Result<Vec<Game>, FetchError>;
}

/// HTTP client for the universe search endpoint.
pub struct UniverseSearchClient {
    client: reqwest::Client,
    base_url: String,
    cookie: SecurityCookie,
    creator_type: CreatorType,
    creator_id: u64,
}

impl UniverseSearchClient {
    pub fn new(
        base_url: &str,
        cookie: SecurityCookie,
        creator_type: CreatorType,
        creator_id: u64,
    ) -> Self {
        UniverseSearchClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie,
            creator_type,
            creator_id,
        }
    }
}

#[async_trait]
impl CatalogClient for UniverseSearchClient {
    async fn list_games(&self, include_archived: bool) -> Result<Vec<Game>, FetchError> {
        let url = format!("{}/universes/v1/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("CreatorType", self.creator_type.as_str().to_string()),
                ("CreatorTargetId", self.creator_id.to_string()),
                ("IsArchived", include_archived.to_string()),
                ("PageSize", CATALOG_PAGE_SIZE.to_string()),
                ("SortParam", "LastUpdated".to_string()),
                ("SortOrder", "Desc".to_string()),
            ])
            .header(reqwest::header::COOKIE, self.cookie.header_value())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        Ok(response.json::<GameListing>().await?.data)
    }
}
