//! Wire shapes of the YouTube Data API v3 `subscriptions` resource.
//!
//! Only the fields the client reads are modelled. Everything else in the
//! upstream payload is ignored by serde.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListSubscriptionsQuery {
    pub part: String,
    pub mine: bool,
    pub max_results: u32,
    pub order: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

impl ListSubscriptionsQuery {
    pub fn mine(max_results: u32, page_token: Option<&str>) -> Self {
        Self {
            part: "snippet".into(),
            mine: true,
            max_results,
            order: "alphabetical".into(),
            page_token: page_token.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteSubscriptionQuery {
    pub id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionListResponse {
    #[serde(default)]
    pub items: Vec<SubscriptionItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_info: Option<PageInfo>,
}

impl SubscriptionListResponse {
    /// Continuation token, treating an empty string as "no more pages".
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token
            .as_deref()
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub total_results: Option<u32>,
    #[serde(default)]
    pub results_per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionItem {
    pub id: String,
    #[serde(default)]
    pub snippet: SubscriptionSnippet,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub resource_id: ResourceId,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    #[serde(default)]
    pub channel_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Thumbnail>,
}

impl Thumbnails {
    /// Highest quality thumbnail with a non-empty URL.
    pub fn best(&self) -> Option<&str> {
        [&self.high, &self.medium, &self.default]
            .into_iter()
            .flatten()
            .map(|thumb| thumb.url.as_str())
            .find(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
}

/// Google API error envelope: `{"error": {"code": 403, "message": "..."}}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleErrorResponse {
    #[serde(default)]
    pub error: Option<GoogleErrorDetail>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}

impl GoogleErrorResponse {
    pub fn message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|detail| detail.message.as_deref())
            .filter(|message| !message.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_page_with_continuation_token() {
        let raw = serde_json::json!({
            "kind": "youtube#subscriptionListResponse",
            "nextPageToken": "CDIQAA",
            "pageInfo": { "totalResults": 51, "resultsPerPage": 50 },
            "items": [{
                "id": "sub-1",
                "snippet": {
                    "title": "Alpha",
                    "description": "",
                    "resourceId": { "kind": "youtube#channel", "channelId": "UC1" },
                    "thumbnails": { "default": { "url": "https://yt3.ggpht.com/a" } }
                }
            }]
        });
        let page: SubscriptionListResponse = serde_json::from_value(raw).expect("decode");
        assert_eq!(page.continuation(), Some("CDIQAA"));
        assert_eq!(page.items[0].snippet.resource_id.channel_id, "UC1");
        assert_eq!(page.page_info.and_then(|info| info.total_results), Some(51));
    }

    #[test]
    fn empty_token_and_missing_items_end_pagination() {
        let page: SubscriptionListResponse =
            serde_json::from_value(serde_json::json!({ "nextPageToken": "" })).expect("decode");
        assert!(page.items.is_empty());
        assert_eq!(page.continuation(), None);
    }

    #[test]
    fn best_thumbnail_prefers_high_then_medium_then_default() {
        let thumbs = Thumbnails {
            high: None,
            medium: Some(Thumbnail { url: "m".into() }),
            default: Some(Thumbnail { url: "d".into() }),
        };
        assert_eq!(thumbs.best(), Some("m"));
        assert_eq!(Thumbnails::default().best(), None);
    }

    #[test]
    fn list_query_uses_camel_case_keys() {
        let query = serde_json::to_value(ListSubscriptionsQuery::mine(50, Some("tok"))).expect("json");
        assert_eq!(query["maxResults"], 50);
        assert_eq!(query["pageToken"], "tok");
        assert_eq!(query["order"], "alphabetical");
    }

    #[test]
    fn google_error_message_is_extracted() {
        let body: GoogleErrorResponse = serde_json::from_value(serde_json::json!({
            "error": { "code": 404, "message": "subscriptionNotFound" }
        }))
        .expect("decode");
        assert_eq!(body.message(), Some("subscriptionNotFound"));
    }
}
