use crate::error::FeedError;
use crate::models::{DebugReport, ErrorResponse};
use crate::services::feed_service::{build_feed, FeedRequest};
use crate::AppState;
use chrono::Utc;
use log::info;
use rocket::http::{Header, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use rocket::serde::json::Json;
use rocket::{get, options, State};

/// Edge cache may serve a response for 2 minutes, and a stale one for up to
/// 10 minutes while it revalidates.
pub const FEED_CACHE_CONTROL: &str = "public, s-maxage=120, stale-while-revalidate=600";

pub enum FeedResponse {
    Ids(Vec<String>),
    Report(DebugReport, Status),
    ConfigError(ErrorResponse),
}

impl<'r> Responder<'r, 'static> for FeedResponse {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        match self {
            FeedResponse::Ids(ids) => {
                // an empty feed means "try again shortly"; keep it out of the edge cache
                let cache = if ids.is_empty() {
                    "no-store"
                } else {
                    FEED_CACHE_CONTROL
                };
                Response::build_from(Json(ids).respond_to(request)?)
                    .status(Status::Ok)
                    .header(Header::new("Cache-Control", cache))
                    .ok()
            }
            FeedResponse::Report(report, status) => {
                Response::build_from(Json(report).respond_to(request)?)
                    .status(status)
                    .header(Header::new("Cache-Control", "no-store"))
                    .ok()
            }
            FeedResponse::ConfigError(error) => error.respond_to(request),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[get("/feed?<q>&<debug>&<region>")]
pub async fn get_feed(
    q: Option<String>,
    debug: Option<String>,
    region: Option<String>,
    state: &State<AppState>,
) -> FeedResponse {
    let debug = debug.as_deref() == Some("1");
    let request = FeedRequest {
        query: non_blank(q),
        region: non_blank(region),
    };

    let run = build_feed(
        &state.youtube,
        &state.credentials,
        &state.policy,
        &state.rng,
        &request,
        Utc::now(),
    )
    .await;

    match (run.failure, debug) {
        (Some(FeedError::MissingApiKey), false) => FeedResponse::ConfigError(ErrorResponse {
            error: "Missing YOUTUBE_API_KEY".to_string(),
            message: "The feed is not configured with a YouTube API key.".to_string(),
        }),
        (Some(_), true) => FeedResponse::Report(run.report, Status::InternalServerError),
        (None, true) => FeedResponse::Report(run.report, Status::Ok),
        (Some(e), false) => {
            info!("Serving empty feed after {} failure", e.step());
            FeedResponse::Ids(Vec::new())
        }
        (None, false) => FeedResponse::Ids(run.ids),
    }
}

#[options("/feed")]
pub fn feed_preflight() -> Status {
    Status::NoContent
}
