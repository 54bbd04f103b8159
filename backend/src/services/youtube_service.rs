use crate::error::{FeedError, Result, Step};
use crate::models::{SearchListResponse, VideoListResponse, VideoMetadata};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, error, info};
use reqwest::{Client, Response};
use serde_json::Value;
use url::Url;

pub const MAX_RESULTS: usize = 50;

#[derive(Debug, Clone)]
pub struct SearchRequest<'a> {
    pub query: &'a str,
    pub published_after: DateTime<Utc>,
    pub region: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub status: u16,
    pub value: T,
}

#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: Client,
    base_url: Url,
}

impl YouTubeClient {
    pub fn new(http: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FeedError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FeedError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(name);
        }
        url
    }

    /// Newest embeddable, caption-free uploads for `request.query`, live
    /// broadcasts removed. Returns ids in API order.
    pub async fn search(
        &self,
        api_key: &str,
        request: &SearchRequest<'_>,
    ) -> Result<Fetched<Vec<String>>> {
        let published_after = request
            .published_after
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = MAX_RESULTS.to_string();

        let mut params: Vec<(&str, &str)> = vec![
            ("key", api_key),
            ("part", "snippet"),
            ("type", "video"),
            ("order", "date"),
            ("maxResults", max_results.as_str()),
            ("q", request.query),
            ("publishedAfter", published_after.as_str()),
            ("videoEmbeddable", "true"),
            ("videoSyndicated", "true"),
            ("videoCaption", "none"),
            ("safeSearch", "none"),
        ];
        if let Some(region) = request.region {
            params.push(("regionCode", region));
        }

        let response = self
            .http
            .get(self.endpoint("search"))
            .query(&params)
            .send()
            .await
            .map_err(|e| FeedError::from_reqwest(Step::Search, e))?;
        let (status, response) = check_status(Step::Search, response).await?;

        let body: SearchListResponse = response
            .json()
            .await
            .map_err(|e| FeedError::from_reqwest(Step::Search, e))?;

        let total = body.items.len();
        let ids: Vec<String> = body
            .items
            .iter()
            .filter_map(|item| item.candidate_id())
            .map(String::from)
            .collect();
        info!(
            "Search '{}' returned {} items, {} usable candidates",
            request.query,
            total,
            ids.len()
        );

        Ok(Fetched { status, value: ids })
    }

    pub async fn video_details(
        &self,
        api_key: &str,
        ids: &[String],
    ) -> Result<Fetched<Vec<VideoMetadata>>> {
        let joined = ids
            .iter()
            .take(MAX_RESULTS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let max_results = MAX_RESULTS.to_string();

        let params = [
            ("key", api_key),
            ("part", "status,statistics,contentDetails,snippet"),
            ("id", joined.as_str()),
            ("maxResults", max_results.as_str()),
        ];

        let response = self
            .http
            .get(self.endpoint("videos"))
            .query(&params)
            .send()
            .await
            .map_err(|e| FeedError::from_reqwest(Step::Details, e))?;
        let (status, response) = check_status(Step::Details, response).await?;

        let body: VideoListResponse = response
            .json()
            .await
            .map_err(|e| FeedError::from_reqwest(Step::Details, e))?;

        let videos: Vec<VideoMetadata> = body.items.into_iter().map(VideoMetadata::from).collect();
        debug!("Fetched details for {} of {} ids", videos.len(), ids.len());

        Ok(Fetched {
            status,
            value: videos,
        })
    }
}

async fn check_status(step: Step, response: Response) -> Result<(u16, Response)> {
    let status = response.status();
    if status.is_success() {
        return Ok((status.as_u16(), response));
    }

    let body = response.text().await.unwrap_or_default();
    let message = api_error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
    error!("YouTube {step} request failed with status {status}: {message}");

    Err(FeedError::Upstream {
        step,
        status: Some(status.as_u16()),
        message,
    })
}

// {"error": {"code": 403, "message": "...", "errors": [{"reason": "quotaExceeded"}]}}
fn api_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    let error = json.get("error")?;
    let message = error["message"].as_str()?;
    match error["errors"][0]["reason"].as_str() {
        Some(reason) => Some(format!("{message} ({reason})")),
        None => Some(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> YouTubeClient {
        YouTubeClient::new(Client::new(), &format!("{}/youtube/v3", server.uri())).unwrap()
    }

    fn request(query: &str) -> SearchRequest<'_> {
        SearchRequest {
            query,
            published_after: Utc::now(),
            region: None,
        }
    }

    #[test]
    fn endpoint_appends_to_base_path() {
        let yt = YouTubeClient::new(Client::new(), "https://example.test/youtube/v3/").unwrap();
        assert_eq!(yt.endpoint("search").as_str(), "https://example.test/youtube/v3/search");
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(matches!(
            YouTubeClient::new(Client::new(), "not a url"),
            Err(FeedError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            YouTubeClient::new(Client::new(), "mailto:someone@example.test"),
            Err(FeedError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn extracts_api_error_reason() {
        let body = json!({
            "error": { "code": 403, "message": "quota", "errors": [{ "reason": "quotaExceeded" }] }
        })
        .to_string();
        assert_eq!(api_error_message(&body).as_deref(), Some("quota (quotaExceeded)"));
        assert_eq!(api_error_message("<html>"), None);
    }

    #[tokio::test]
    async fn search_sends_filters_and_drops_live_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/search"))
            .and(query_param("key", "k"))
            .and(query_param("q", "dashcam night"))
            .and(query_param("type", "video"))
            .and(query_param("order", "date"))
            .and(query_param("maxResults", "50"))
            .and(query_param("videoEmbeddable", "true"))
            .and(query_param("videoCaption", "none"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    { "id": { "videoId": "a1" }, "snippet": { "liveBroadcastContent": "none" } },
                    { "id": { "videoId": "b2" }, "snippet": { "liveBroadcastContent": "live" } },
                    { "id": { "videoId": "c3" }, "snippet": { "liveBroadcastContent": "none" } }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let fetched = client(&server)
            .search("k", &request("dashcam night"))
            .await
            .unwrap();
        assert_eq!(fetched.status, 200);
        assert_eq!(fetched.value, vec!["a1", "c3"]);
    }

    #[tokio::test]
    async fn search_forwards_region() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/search"))
            .and(query_param("regionCode", "DE"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let mut req = request("walking tour today");
        req.region = Some("DE");
        let fetched = client(&server).search("k", &req).await.unwrap();
        assert!(fetched.value.is_empty());
    }

    #[tokio::test]
    async fn search_error_status_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/search"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "message": "quota", "errors": [{ "reason": "quotaExceeded" }] }
            })))
            .mount(&server)
            .await;

        let err = client(&server).search("k", &request("x")).await.unwrap_err();
        assert_eq!(err.step(), Step::Search);
        assert_eq!(err.upstream_status(), Some(403));
        assert!(err.to_string().contains("quotaExceeded"));
    }

    #[tokio::test]
    async fn details_batches_ids_in_one_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/videos"))
            .and(query_param("id", "a1,c3"))
            .and(query_param("part", "status,statistics,contentDetails,snippet"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {
                        "id": "a1",
                        "status": { "embeddable": true, "uploadStatus": "processed" },
                        "statistics": { "viewCount": "12" },
                        "contentDetails": { "duration": "PT1M", "caption": "false" },
                        "snippet": { "title": "t", "channelTitle": "c", "categoryId": "22" }
                    },
                    { "id": "c3" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let ids = vec!["a1".to_string(), "c3".to_string()];
        let fetched = client(&server).video_details("k", &ids).await.unwrap();
        assert_eq!(fetched.value.len(), 2);
        assert_eq!(fetched.value[0].duration, 60);
        assert_eq!(fetched.value[0].views, 12);
        assert!(!fetched.value[1].processed);
    }

    #[tokio::test]
    async fn details_garbage_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/youtube/v3/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server)
            .video_details("k", &["a1".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Decode { step: Step::Details, .. }));
    }
}
