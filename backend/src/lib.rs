pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::{create_cors, CredentialSource};
use crate::services::feed_service::FeedPolicy;
use crate::services::youtube_service::YouTubeClient;
use anyhow::Result;
use rand::rngs::StdRng;
use rocket::{routes, Build, Rocket};
use std::sync::Mutex;

pub struct AppState {
    pub youtube: YouTubeClient,
    pub credentials: CredentialSource,
    pub policy: FeedPolicy,
    /// Drives seed selection and shuffling. Never held across an await.
    pub rng: Mutex<StdRng>,
}

pub fn build_rocket(state: AppState) -> Result<Rocket<Build>> {
    let rocket = rocket::build()
        .manage(state)
        .attach(create_cors()?)
        .mount("/", routes![api::health])
        .mount("/api", routes![api::get_feed, api::feed_preflight]);

    Ok(rocket)
}
