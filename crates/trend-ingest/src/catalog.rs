//! Video catalog client (YouTube Data API v3) and item mapping.

use serde_json::Value;
use thiserror::Error;
use trend_core::{join_tags, permalink, VideoRecord};

use crate::{agent_for, IngestConfig};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("catalog API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("catalog response could not be parsed: {0}")]
    Parse(String),
}

/// Source of "most popular" catalog items.
pub trait CatalogSource {
    /// Fetch the first page of most-popular items for the configured category and region.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-success status, or an unparsable body.
    fn fetch_most_popular(&self, config: &IngestConfig) -> Result<Vec<Value>, CatalogError>;
}

pub struct YouTubeClient {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    #[must_use]
    pub fn new(api_key: impl Into<String>, config: &IngestConfig) -> Self {
        Self {
            agent: agent_for(config),
            api_key: api_key.into(),
            base_url: config.catalog_base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl CatalogSource for YouTubeClient {
    fn fetch_most_popular(&self, config: &IngestConfig) -> Result<Vec<Value>, CatalogError> {
        let url = format!("{}/youtube/v3/videos", self.base_url);
        let max_results = config.max_results.to_string();

        let response = self
            .agent
            .get(&url)
            .query("part", "snippet,statistics")
            .query("chart", "mostPopular")
            .query("regionCode", &config.region_code)
            .query("videoCategoryId", &config.category_id)
            .query("maxResults", &max_results)
            .query("key", &self.api_key)
            .call()
            .map_err(catalog_error_from)?;

        let body: Value =
            response.into_json().map_err(|err| CatalogError::Parse(err.to_string()))?;
        let items = parse_catalog_page(&body)?;
        tracing::debug!(items = items.len(), "fetched catalog page");
        Ok(items)
    }
}

/// Pull the `items` array out of a catalog page. Paging tokens are ignored.
///
/// # Errors
/// Returns an error when the page has no `items` array.
pub fn parse_catalog_page(body: &Value) -> Result<Vec<Value>, CatalogError> {
    body.get("items")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| CatalogError::Parse("response has no items array".to_string()))
}

/// Map one catalog item onto a record, defaulting every missing field.
#[must_use]
pub fn map_catalog_item(item: &Value, scrapped_date: &str) -> VideoRecord {
    let snippet = &item["snippet"];
    let statistics = &item["statistics"];

    let video_url = item["id"].as_str().map(permalink).unwrap_or_default();
    let tags = snippet["tags"]
        .as_array()
        .map(|tags| {
            tags.iter().filter_map(Value::as_str).map(str::to_string).collect::<Vec<_>>()
        })
        .unwrap_or_default();

    VideoRecord {
        title: text_field(snippet, "title"),
        channel: text_field(snippet, "channelTitle"),
        view_count: count_field(statistics, "viewCount"),
        like_count: count_field(statistics, "likeCount"),
        comment_count: count_field(statistics, "commentCount"),
        publish_date: text_field(snippet, "publishedAt"),
        tags: join_tags(&tags),
        thumbnail_url: thumbnail_url(&snippet["thumbnails"]),
        video_url,
        scrapped_date: scrapped_date.to_string(),
        ai_summary: None,
    }
}

fn text_field(object: &Value, key: &str) -> String {
    object[key].as_str().unwrap_or_default().to_string()
}

// Counts arrive as decimal strings; plain numbers are accepted too.
fn count_field(statistics: &Value, key: &str) -> u64 {
    match &statistics[key] {
        Value::String(raw) => raw.trim().parse().unwrap_or(0),
        Value::Number(number) => number.as_u64().unwrap_or(0),
        _ => 0,
    }
}

fn thumbnail_url(thumbnails: &Value) -> String {
    ["medium", "high", "default"]
        .iter()
        .find_map(|size| thumbnails[*size]["url"].as_str())
        .unwrap_or_default()
        .to_string()
}

fn catalog_error_from(err: ureq::Error) -> CatalogError {
    match err {
        ureq::Error::Status(status, response) => {
            CatalogError::Status { status, body: crate::truncated_body(response) }
        }
        ureq::Error::Transport(transport) => {
            CatalogError::Transport(crate::describe_transport(&transport))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_item() -> Value {
        json!({
            "id": "abc123XYZ_0",
            "snippet": {
                "title": "Final round highlights",
                "channelTitle": "PGA TOUR",
                "publishedAt": "2024-05-01T09:30:00Z",
                "tags": ["golf", "pga", "highlights"],
                "thumbnails": {
                    "default": { "url": "https://i.ytimg.com/vi/abc/default.jpg" },
                    "medium": { "url": "https://i.ytimg.com/vi/abc/mqdefault.jpg" },
                    "high": { "url": "https://i.ytimg.com/vi/abc/hqdefault.jpg" }
                }
            },
            "statistics": {
                "viewCount": "125000",
                "likeCount": "4200",
                "commentCount": "310"
            }
        })
    }

    #[test]
    fn maps_full_item() {
        let record = map_catalog_item(&full_item(), "2024-05-02");

        assert_eq!(record.title, "Final round highlights");
        assert_eq!(record.channel, "PGA TOUR");
        assert_eq!(record.view_count, 125_000);
        assert_eq!(record.like_count, 4_200);
        assert_eq!(record.comment_count, 310);
        assert_eq!(record.publish_date, "2024-05-01T09:30:00Z");
        assert_eq!(record.tags, "golf,pga,highlights");
        assert_eq!(record.thumbnail_url, "https://i.ytimg.com/vi/abc/mqdefault.jpg");
        assert_eq!(record.video_url, "https://www.youtube.com/watch?v=abc123XYZ_0");
        assert_eq!(record.scrapped_date, "2024-05-02");
        assert_eq!(record.ai_summary, None);
    }

    #[test]
    fn missing_statistics_and_tags_default() {
        let item = json!({
            "id": "quiet",
            "snippet": { "title": "No stats", "channelTitle": "Somebody" },
            "statistics": { "viewCount": "17", "likeCount": "not-a-number" }
        });

        let record = map_catalog_item(&item, "2024-05-02");
        assert_eq!(record.view_count, 17);
        assert_eq!(record.like_count, 0);
        assert_eq!(record.comment_count, 0);
        assert_eq!(record.tags, "");
        assert_eq!(record.thumbnail_url, "");
        assert_eq!(record.publish_date, "");
    }

    #[test]
    fn thumbnail_falls_back_past_missing_medium() {
        let item = json!({
            "id": "thumbs",
            "snippet": {
                "thumbnails": {
                    "default": { "url": "https://example.test/default.jpg" },
                    "high": { "url": "https://example.test/high.jpg" }
                }
            }
        });
        assert_eq!(
            map_catalog_item(&item, "2024-05-02").thumbnail_url,
            "https://example.test/high.jpg"
        );

        let only_default = json!({
            "snippet": { "thumbnails": { "default": { "url": "https://example.test/d.jpg" } } }
        });
        assert_eq!(
            map_catalog_item(&only_default, "2024-05-02").thumbnail_url,
            "https://example.test/d.jpg"
        );
    }

    #[test]
    fn item_without_id_gets_empty_permalink() {
        let item = json!({ "snippet": { "title": "orphan" } });
        let record = map_catalog_item(&item, "2024-05-02");
        assert_eq!(record.title, "orphan");
        assert_eq!(record.video_url, "");
    }

    #[test]
    fn numeric_statistics_are_accepted() {
        let item = json!({ "id": "n", "statistics": { "viewCount": 99, "commentCount": -3 } });
        let record = map_catalog_item(&item, "2024-05-02");
        assert_eq!(record.view_count, 99);
        assert_eq!(record.comment_count, 0);
    }

    #[test]
    fn catalog_page_requires_items_array() {
        let page = json!({ "items": [full_item(), full_item()], "nextPageToken": "CAoQAA" });
        let items = match parse_catalog_page(&page) {
            Ok(items) => items,
            Err(err) => panic!("page should parse: {err}"),
        };
        assert_eq!(items.len(), 2);

        let err = match parse_catalog_page(&json!({ "error": { "code": 403 } })) {
            Ok(items) => panic!("expected parse error, got {} items", items.len()),
            Err(err) => err,
        };
        assert!(matches!(err, CatalogError::Parse(_)));
    }
}
