use serde::{Deserialize, Serialize};

/// Root place identifier. Version history is keyed by place, not by game id.
pub type PlaceId = u64;

pub type GameId = u64;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CreatorType {
    User,
    Group,
}

impl CreatorType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CreatorType::User => "User",
            CreatorType::Group => "Group",
        }
    }
}

/// Session credential for the game platform, sent as the `.ROBLOSECURITY`
/// cookie on every upstream call.
#[derive(Clone)]
pub struct SecurityCookie(String);

impl SecurityCookie {
    pub fn new(value: impl Into<String>) -> Self {
        SecurityCookie(value.into())
    }

    /// Rejoins the split parts the credential store hands out. Secrets larger
    /// than the store's size cap are stored as multiple entries.
    pub fn from_parts<I>(parts: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut value = String::new();
        for part in parts {
            value.push_str(part.as_ref());
        }
        SecurityCookie(value)
    }

    pub fn header_value(&self) -> String {
        format!(".ROBLOSECURITY={}", self.0)
    }
}

/// One saved-version entry for a place, as returned by the upstream listing.
/// Records are never mutated once received.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    #[serde(rename = "Id")]
    pub id: u64,
    pub asset_id: u64,
    pub asset_version_number: u64,
    pub creator_type: CreatorType,
    pub creator_target_id: u64,
    pub creating_universe_id: Option<u64>,
    pub created: String,
    pub is_published: bool,
}

/// A place's cached version list plus the epoch-seconds timestamp of the
/// last complete re-fetch. Refreshes overwrite the whole entry.
#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    pub versions: Vec<VersionRecord>,
    pub updated_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_record_wire_format() {
        let json = r#"{
            "Id": 42,
            "assetId": 1001,
            "assetVersionNumber": 7,
            "creatorType": "User",
            "creatorTargetId": 55,
            "creatingUniverseId": null,
            "created": "2024-03-01T12:00:00Z",
            "isPublished": false
        }"#;

        let record: VersionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 42);
        assert_eq!(record.asset_id, 1001);
        assert_eq!(record.asset_version_number, 7);
        assert_eq!(record.creator_type, CreatorType::User);
        assert_eq!(record.creating_universe_id, None);
        assert!(!record.is_published);

        // Round-trips through the same key names
        let encoded = serde_json::to_value(&record).unwrap();
        assert_eq!(encoded["Id"], 42);
        assert_eq!(encoded["assetVersionNumber"], 7);
    }

    #[test]
    fn test_cookie_from_parts() {
        let cookie = SecurityCookie::from_parts(["abc", "def"]);
        assert_eq!(cookie.header_value(), ".ROBLOSECURITY=abcdef");
    }
}
