use serde::{Deserialize, Serialize};
use versions::fetch::FetchError;
use versions::types::{GameId, SecurityCookie};

/// One media entry for a game. Most fields are only present for the matching
/// asset type, so everything but the type id is optional.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GameMedia {
    pub asset_type_id: u32,
    pub asset_type: Option<String>,
    pub image_id: Option<u64>,
    pub video_hash: Option<String>,
    pub video_title: Option<String>,
    pub approved: bool,
    pub alt_text: Option<String>,
    pub video_id: Option<String>,
}

#[derive(Deserialize)]
struct MediaListing {
    data: Vec<GameMedia>,
}

/// Pass-through client for the games API media listing.
pub struct MediaClient {
    client: reqwest::Client,
    base_url: String,
    cookie: SecurityCookie,
}

impl MediaClient {
    pub fn new(base_url: &str, cookie: SecurityCookie) -> Self {
        MediaClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie,
        }
    }

    pub async fn game_media(&self, game_id: GameId) -> Result<Vec<GameMedia>, FetchError> {
        let url = format!("{}/v2/games/{game_id}/media", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::COOKIE, self.cookie.header_value())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        Ok(response.json::<MediaListing>().await?.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_game_media_parses_listing() {
        let server = MockServer::start().await;

        let body = r#"{
            "data": [
                {
                    "assetTypeId": 1,
                    "assetType": "Image",
                    "imageId": 5555,
                    "videoHash": null,
                    "videoTitle": null,
                    "approved": true,
                    "altText": "thumbnail",
                    "videoId": null
                }
            ]
        }"#;

        Mock::given(method("GET"))
            .and(path("/v2/games/11/media"))
            .and(header("Cookie", ".ROBLOSECURITY=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = MediaClient::new(&server.uri(), SecurityCookie::new("secret"));
        let media = client.game_media(11).await.unwrap();

        assert_eq!(media.len(), 1);
        assert_eq!(media[0].image_id, Some(5555));
        assert_eq!(media[0].asset_type.as_deref(), Some("Image"));
        assert!(media[0].approved);
    }

    #[tokio::test]
    async fn test_game_media_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/games/11/media"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = MediaClient::new(&server.uri(), SecurityCookie::new("secret"));
        let result = client.game_media(11).await;

        assert!(matches!(result, Err(FetchError::Status(_))));
    }
}
