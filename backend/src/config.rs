use crate::error::{FeedError, Step};
use crate::services::feed_service::FeedPolicy;
use crate::services::youtube_service::YouTubeClient;
use crate::AppState;
use anyhow::Result;
use env_logger::{Builder, Env};
use lazy_static::lazy_static;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};
use std::env;
use std::sync::Mutex;
use std::time::Duration;

pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

lazy_static! {
    pub static ref YOUTUBE_API_BASE_URL: String = env::var("YOUTUBE_API_BASE_URL")
        .unwrap_or_else(|_| "https://www.googleapis.com/youtube/v3".to_string());
    pub static ref UPSTREAM_TIMEOUT_SECS: u64 = env::var("UPSTREAM_TIMEOUT_SECS")
        .unwrap_or_else(|_| "10".to_string())
        .parse::<u64>()
        .unwrap_or(10);
}

pub fn init_logger() {
    Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting footage feed backend...");
}

pub fn load_environment() {
    dotenv::dotenv().ok();
}

/// Where the YouTube API key comes from. Resolved on every request so a
/// key rotated in the environment takes effect without a restart.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    Env(&'static str),
    Fixed(Option<String>),
}

impl CredentialSource {
    pub fn api_key(&self) -> Result<String, FeedError> {
        let key = match self {
            CredentialSource::Env(var) => env::var(var).ok(),
            CredentialSource::Fixed(key) => key.clone(),
        };
        key.filter(|k| !k.trim().is_empty())
            .ok_or(FeedError::MissingApiKey)
    }
}

pub fn create_http_client(timeout: Duration) -> Result<reqwest::Client, FeedError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FeedError::Upstream {
            step: Step::Config,
            status: None,
            message: format!("failed to build HTTP client: {e}"),
        })
}

pub fn create_app_state() -> Result<AppState> {
    let http = create_http_client(Duration::from_secs(*UPSTREAM_TIMEOUT_SECS))?;
    let youtube = YouTubeClient::new(http, &YOUTUBE_API_BASE_URL)?;
    info!("Using YouTube Data API at: {}", youtube.base_url());

    Ok(AppState {
        youtube,
        credentials: CredentialSource::Env(API_KEY_VAR),
        policy: FeedPolicy::default(),
        rng: Mutex::new(StdRng::from_entropy()),
    })
}

/// Any page may embed the feed, so every origin gets a wildcard answer.
pub fn create_cors() -> Result<rocket_cors::Cors> {
    let cors = CorsOptions::default()
        .allowed_origins(AllowedOrigins::all())
        .allowed_methods(
            vec![Method::Get, Method::Options]
                .into_iter()
                .map(From::from)
                .collect(),
        )
        .allowed_headers(AllowedHeaders::some(&["Content-Type"]))
        .send_wildcard(true)
        .to_cors()
        .map_err(|e| anyhow::anyhow!("Failed to create CORS options: {}", e))?;

    Ok(cors)
}
