use crate::types::{PlaceId, SecurityCookie, VersionRecord};
use async_trait::async_trait;
use serde::Deserialize;

/// Saved versions are requested in pages of this size.
const PAGE_LIMIT: u32 = 100;

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("upstream request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(reqwest::StatusCode),
}

/// One page of the saved-versions listing. A null or empty cursor marks the
/// last page.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionPage {
    pub data: Vec<VersionRecord>,
    pub next_page_cursor: Option<String>,
}

/// Upstream saved-versions listing, one page per call.
#[async_trait]
pub trait VersionPages: Send + Sync {
    async fn list_page(
        &self,
        place_id: PlaceId,
        cursor: Option<&str>,
    ) -> Result<VersionPage, FetchError>;
}

pub struct FetchOutcome {
    /// All version records for the place, oldest page first.
    pub versions: Vec<VersionRecord>,
    /// Number of upstream page requests this fetch performed. Always >= 1.
    pub calls: u32,
}

/// Walks the saved-versions listing for a place to completion, concatenating
/// pages in upstream order. Any page failure aborts the whole fetch; callers
/// never see a partial result.
pub async fn fetch_all(
    pages: &dyn VersionPages,
    place_id: PlaceId,
) -> Result<FetchOutcome, FetchError> {
    let mut versions = Vec::new();
    let mut calls = 0u32;
    let mut cursor: Option<String> = None;

    loop {
        let page = pages.list_page(place_id, cursor.as_deref()).await?;
        calls += 1;
        versions.extend(page.data);

        match page.next_page_cursor {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => break,
        }
    }

    Ok(FetchOutcome { versions, calls })
}

/// HTTP client for the develop API's saved-versions listing.
pub struct SavedVersionsClient {
    client: reqwest::Client,
    base_url: String,
    cookie: SecurityCookie,
}

impl SavedVersionsClient {
    pub fn new(base_url: &str, cookie: SecurityCookie) -> Self {
        SavedVersionsClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cookie,
        }
    }
}

#[async_trait]
impl VersionPages for SavedVersionsClient {
    async fn list_page(
        &self,
        place_id: PlaceId,
        cursor: Option<&str>,
    ) -> Result<VersionPage, FetchError> {
        let url = format!("{}/v1/assets/{place_id}/saved-versions", self.base_url);

        let mut request = self
            .client
            .get(&url)
            .query(&[("limit", PAGE_LIMIT.to_string())])
            .header(reqwest::header::COOKIE, self.cookie.header_value());

        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        Ok(response.json::<VersionPage>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{ScriptedPages, version_record};
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_all_concatenates_pages_in_order() {
        let pages = ScriptedPages::new().with_pages(
            7,
            vec![
                vec![version_record(1), version_record(2)],
                vec![version_record(3)],
                vec![version_record(4), version_record(5)],
            ],
        );

        let outcome = fetch_all(&pages, 7).await.unwrap();

        assert_eq!(outcome.calls, 3);
        let ids: Vec<u64> = outcome.versions.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_fetch_all_single_page_reports_one_call() {
        let pages = ScriptedPages::new().with_pages(7, vec![vec![version_record(1)]]);

        let outcome = fetch_all(&pages, 7).await.unwrap();

        assert_eq!(outcome.calls, 1);
        assert_eq!(outcome.versions.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_all_aborts_on_mid_pagination_failure() {
        let pages = ScriptedPages::new()
            .with_pages(7, vec![vec![version_record(1)], vec![version_record(2)]])
            .fail_at(7, 1);

        let result = fetch_all(&pages, 7).await;

        assert!(matches!(result, Err(FetchError::Status(_))));
        assert_eq!(pages.calls(), 2);
    }

    #[tokio::test]
    async fn test_saved_versions_client_walks_cursors() {
        let server = MockServer::start().await;

        let first_page = r#"{
            "data": [{
                "Id": 1, "assetId": 99, "assetVersionNumber": 1,
                "creatorType": "User", "creatorTargetId": 5,
                "creatingUniverseId": null,
                "created": "2024-01-01T00:00:00Z", "isPublished": false
            }],
            "nextPageCursor": "abc"
        }"#;
        let last_page = r#"{
            "data": [{
                "Id": 2, "assetId": 99, "assetVersionNumber": 2,
                "creatorType": "User", "creatorTargetId": 5,
                "creatingUniverseId": 1234,
                "created": "2024-01-02T00:00:00Z", "isPublished": true
            }],
            "nextPageCursor": null
        }"#;

        Mock::given(method("GET"))
            .and(path("/v1/assets/99/saved-versions"))
            .and(query_param("limit", "100"))
            .and(query_param_is_missing("cursor"))
            .and(header("Cookie", ".ROBLOSECURITY=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(first_page))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/assets/99/saved-versions"))
            .and(query_param("cursor", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string(last_page))
            .mount(&server)
            .await;

        let client = SavedVersionsClient::new(&server.uri(), SecurityCookie::new("secret"));
        let outcome = fetch_all(&client, 99).await.unwrap();

        assert_eq!(outcome.calls, 2);
        assert_eq!(outcome.versions.len(), 2);
        assert_eq!(outcome.versions[0].id, 1);
        assert_eq!(outcome.versions[1].id, 2);
        assert_eq!(outcome.versions[1].creating_universe_id, Some(1234));
    }

    #[tokio::test]
    async fn test_saved_versions_client_propagates_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/assets/99/saved-versions"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = SavedVersionsClient::new(&server.uri(), SecurityCookie::new("expired"));
        let result = client.list_page(99, None).await;

        assert!(matches!(
            result,
            Err(FetchError::Status(reqwest::StatusCode::UNAUTHORIZED))
        ));
    }
}
