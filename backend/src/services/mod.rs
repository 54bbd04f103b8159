pub mod feed_service;
pub mod filter_service;
pub mod query_service;
pub mod youtube_service;
