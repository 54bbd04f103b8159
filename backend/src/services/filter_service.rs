use crate::models::VideoMetadata;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

pub mod category {
    pub const FILM_AND_ANIMATION: u32 = 1;
    pub const AUTOS_AND_VEHICLES: u32 = 2;
    pub const MUSIC: u32 = 10;
    pub const PETS_AND_ANIMALS: u32 = 15;
    pub const SPORTS: u32 = 17;
    pub const TRAVEL_AND_EVENTS: u32 = 19;
    pub const GAMING: u32 = 20;
    pub const PEOPLE_AND_BLOGS: u32 = 22;
    pub const COMEDY: u32 = 23;
    pub const ENTERTAINMENT: u32 = 24;
    pub const NEWS_AND_POLITICS: u32 = 25;
    pub const HOWTO_AND_STYLE: u32 = 26;
    pub const SCIENCE_AND_TECHNOLOGY: u32 = 28;
    pub const NONPROFITS_AND_ACTIVISM: u32 = 29;
}

/// "People and things" categories the strict pass accepts.
pub const ALLOWED_CATEGORIES: &[u32] = &[
    category::AUTOS_AND_VEHICLES,
    category::PETS_AND_ANIMALS,
    category::TRAVEL_AND_EVENTS,
    category::PEOPLE_AND_BLOGS,
    category::HOWTO_AND_STYLE,
    category::SCIENCE_AND_TECHNOLOGY,
];

pub const DENIED_CATEGORIES: &[u32] = &[
    category::FILM_AND_ANIMATION,
    category::MUSIC,
    category::SPORTS,
    category::GAMING,
    category::COMEDY,
    category::ENTERTAINMENT,
    category::NEWS_AND_POLITICS,
    category::NONPROFITS_AND_ACTIVISM,
];

lazy_static! {
    pub static ref BRAND_PATTERN: Regex = Regex::new(
        r"(?i)\b(official|trailer|teaser|label|records|sponsored|sponsor|music video|lyric video|lyrics|episode|full album|promo|advert|vevo|podcast)\b"
    )
    .expect("brand pattern is valid");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryRule {
    Allow(&'static [u32]),
    Deny(&'static [u32]),
}

impl CategoryRule {
    pub fn accepts(&self, category_id: Option<u32>) -> bool {
        match (self, category_id) {
            (CategoryRule::Allow(list), Some(id)) => list.contains(&id),
            (CategoryRule::Allow(_), None) => false,
            (CategoryRule::Deny(list), Some(id)) => !list.contains(&id),
            (CategoryRule::Deny(_), None) => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPolicy {
    pub name: &'static str,
    pub min_duration_secs: u64,
    pub max_duration_secs: u64,
    /// Exclusive upper bound.
    pub max_views: u64,
    pub categories: CategoryRule,
}

impl FilterPolicy {
    pub fn strict() -> Self {
        Self {
            name: "strict",
            min_duration_secs: 20,
            max_duration_secs: 1200,
            max_views: 5000,
            categories: CategoryRule::Allow(ALLOWED_CATEGORIES),
        }
    }

    pub fn relaxed() -> Self {
        Self {
            name: "relaxed",
            min_duration_secs: 15,
            max_duration_secs: 1800,
            max_views: 15000,
            categories: CategoryRule::Deny(DENIED_CATEGORIES),
        }
    }

    /// The first failing predicate, or `None` if the video passes.
    pub fn rejection(&self, video: &VideoMetadata) -> Option<&'static str> {
        if !video.embeddable || !video.processed {
            return Some("not embeddable or not processed");
        }
        if video.has_captions {
            return Some("has captions");
        }
        if video.duration < self.min_duration_secs || video.duration > self.max_duration_secs {
            return Some("duration out of range");
        }
        if video.views >= self.max_views {
            return Some("too many views");
        }
        if !self.categories.accepts(video.category_id) {
            return Some("category");
        }
        if looks_branded(video) {
            return Some("branded");
        }
        None
    }

    pub fn accepts(&self, video: &VideoMetadata) -> bool {
        self.rejection(video).is_none()
    }

    pub fn apply(&self, videos: &[VideoMetadata]) -> Vec<String> {
        videos
            .iter()
            .filter(|video| match self.rejection(video) {
                Some(reason) => {
                    debug!("{} pass rejected {}: {}", self.name, video.video_id, reason);
                    false
                }
                None => true,
            })
            .map(|video| video.video_id.clone())
            .collect()
    }
}

pub fn looks_branded(video: &VideoMetadata) -> bool {
    BRAND_PATTERN.is_match(&video.title)
        || BRAND_PATTERN.is_match(&video.channel_name)
        || video.tags.iter().any(|tag| BRAND_PATTERN.is_match(tag))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub ids: Vec<String>,
    pub strict_count: usize,
    pub relaxed_used: bool,
}

/// Strict pass first; relaxed pass only when strict keeps fewer than `min_results`.
pub fn filter_videos(
    videos: &[VideoMetadata],
    strict: &FilterPolicy,
    relaxed: &FilterPolicy,
    min_results: usize,
) -> FilterOutcome {
    let strict_ids = strict.apply(videos);
    let strict_count = strict_ids.len();

    if strict_count >= min_results {
        return FilterOutcome {
            ids: strict_ids,
            strict_count,
            relaxed_used: false,
        };
    }

    debug!("Strict pass kept {strict_count} (< {min_results}), running relaxed pass");
    FilterOutcome {
        ids: relaxed.apply(videos),
        strict_count,
        relaxed_used: true,
    }
}
