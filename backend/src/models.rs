use crate::utils::parse_iso8601_duration_to_seconds;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::Responder;
use rocket::serde::{Deserialize, Serialize};
use rocket::{response, Response};
use std::io::Cursor;

// Documentation: https://developers.google.com/youtube/v3/docs/search/list
#[derive(Debug, Default, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchItem {
    #[serde(default)]
    pub id: SearchItemId,
    #[serde(default)]
    pub snippet: SearchSnippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    pub video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnippet {
    pub live_broadcast_content: Option<String>,
}

impl SearchItem {
    /// Video id of a finished, non-live upload. Anything else is not a candidate.
    pub fn candidate_id(&self) -> Option<&str> {
        if self.snippet.live_broadcast_content.as_deref() != Some("none") {
            return None;
        }
        self.id.video_id.as_deref().filter(|id| !id.is_empty())
    }
}

// Documentation: https://developers.google.com/youtube/v3/docs/videos/list
#[derive(Debug, Default, Deserialize)]
pub struct VideoListResponse {
    #[serde(default)]
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: VideoStatus,
    #[serde(default)]
    pub statistics: VideoStatistics,
    #[serde(default)]
    pub content_details: VideoContentDetails,
    #[serde(default)]
    pub snippet: VideoSnippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatus {
    #[serde(default)]
    pub embeddable: bool,
    pub upload_status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStatistics {
    // the API encodes counters as strings
    pub view_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VideoContentDetails {
    pub duration: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub channel_title: String,
    pub category_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Per-request view of a video, built from one `videos.list` item.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct VideoMetadata {
    pub video_id: String,
    pub title: String,
    pub channel_name: String,
    pub tags: Vec<String>,
    pub category_id: Option<u32>,
    pub duration: u64, // in seconds
    pub views: u64,
    pub has_captions: bool,
    pub embeddable: bool,
    pub processed: bool,
}

impl From<VideoItem> for VideoMetadata {
    fn from(item: VideoItem) -> Self {
        VideoMetadata {
            video_id: item.id,
            title: item.snippet.title,
            channel_name: item.snippet.channel_title,
            tags: item.snippet.tags,
            category_id: item
                .snippet
                .category_id
                .as_deref()
                .and_then(|c| c.parse().ok()),
            duration: parse_iso8601_duration_to_seconds(
                item.content_details.duration.as_deref().unwrap_or(""),
            ),
            views: item
                .statistics
                .view_count
                .as_deref()
                .unwrap_or("0")
                .parse()
                .unwrap_or(0),
            has_captions: item
                .content_details
                .caption
                .as_deref()
                .map(|s| s == "true")
                .unwrap_or(false),
            embeddable: item.status.embeddable,
            processed: item.status.upload_status.as_deref() == Some("processed"),
        }
    }
}

/// Diagnostic body returned instead of the id array when `debug=1`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DebugReport {
    pub step: String,
    pub query: String,
    pub search_statuses: Vec<Option<u16>>,
    pub details_status: Option<u16>,
    pub candidates: usize,
    pub details: usize,
    pub strict_count: usize,
    pub relaxed_used: bool,
    pub output_count: usize,
    pub sample: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl<'r> Responder<'r, 'static> for ErrorResponse {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let json = serde_json::to_string(&self).map_err(|_| Status::InternalServerError)?;
        Response::build()
            .status(Status::InternalServerError)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}
