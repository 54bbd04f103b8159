use crate::config::CredentialSource;
use crate::error::{FeedError, Step};
use crate::models::DebugReport;
use crate::services::filter_service::{filter_videos, FilterPolicy};
use crate::services::query_service::{plan_queries, QueryPlan};
use crate::services::youtube_service::{SearchRequest, YouTubeClient};
use crate::utils::shuffle_and_truncate;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use log::{error, info, warn};
use rand::Rng;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

const DEBUG_SAMPLE_SIZE: usize = 5;

#[derive(Debug, Clone)]
pub struct FeedPolicy {
    pub strict: FilterPolicy,
    pub relaxed: FilterPolicy,
    /// Relaxed pass runs when strict keeps fewer than this.
    pub min_strict_results: usize,
    pub lookback: Duration,
    pub widened_lookback: Duration,
    pub min_candidates: usize,
    pub max_candidates: usize,
    pub max_output: usize,
    pub extra_seeds: usize,
}

impl Default for FeedPolicy {
    fn default() -> Self {
        Self {
            strict: FilterPolicy::strict(),
            relaxed: FilterPolicy::relaxed(),
            min_strict_results: 8,
            lookback: Duration::hours(48),
            widened_lookback: Duration::hours(168),
            min_candidates: 10,
            max_candidates: 50,
            max_output: 50,
            extra_seeds: 2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeedRequest {
    pub query: Option<String>,
    pub region: Option<String>,
}

/// Result of one pipeline run. `failure` is set when an error left the
/// request without data; `ids` is then empty.
#[derive(Debug)]
pub struct FeedRun {
    pub ids: Vec<String>,
    pub report: DebugReport,
    pub failure: Option<FeedError>,
}

impl FeedRun {
    fn failed(mut report: DebugReport, err: FeedError) -> Self {
        report.step = err.step().to_string();
        report.error = Some(err.to_string());
        FeedRun {
            ids: Vec::new(),
            report,
            failure: Some(err),
        }
    }
}

#[derive(Debug, Default)]
struct Candidates {
    ids: Vec<String>,
    seen: HashSet<String>,
    statuses: Vec<Option<u16>>,
    succeeded: usize,
    first_error: Option<FeedError>,
}

impl Candidates {
    fn extend(&mut self, ids: Vec<String>, cap: usize) {
        for id in ids {
            if self.ids.len() >= cap {
                break;
            }
            if self.seen.insert(id.clone()) {
                self.ids.push(id);
            }
        }
    }
}

fn lock<R>(rng: &Mutex<R>) -> MutexGuard<'_, R> {
    rng.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn search_window(
    youtube: &YouTubeClient,
    api_key: &str,
    plan: &QueryPlan,
    region: Option<&str>,
    published_after: DateTime<Utc>,
    policy: &FeedPolicy,
    candidates: &mut Candidates,
) {
    let requests: Vec<SearchRequest> = plan
        .terms()
        .map(|query| SearchRequest {
            query,
            published_after,
            region,
        })
        .collect();

    let results = join_all(requests.iter().map(|r| youtube.search(api_key, r))).await;

    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(fetched) => {
                candidates.statuses.push(Some(fetched.status));
                candidates.succeeded += 1;
                candidates.extend(fetched.value, policy.max_candidates);
            }
            Err(e) => {
                warn!("Search for '{}' contributed no candidates: {e}", request.query);
                candidates.statuses.push(e.upstream_status());
                candidates.first_error.get_or_insert(e);
            }
        }
    }
}

async fn gather_candidates(
    youtube: &YouTubeClient,
    api_key: &str,
    plan: &QueryPlan,
    region: Option<&str>,
    now: DateTime<Utc>,
    policy: &FeedPolicy,
) -> Candidates {
    let mut candidates = Candidates::default();

    search_window(
        youtube,
        api_key,
        plan,
        region,
        now - policy.lookback,
        policy,
        &mut candidates,
    )
    .await;

    // a longer window cannot help calls that failed outright
    let scarce = candidates.ids.len() < policy.min_candidates;
    if scarce && candidates.succeeded > 0 && policy.widened_lookback > policy.lookback {
        info!(
            "Only {} candidates in the last {}h, widening to {}h",
            candidates.ids.len(),
            policy.lookback.num_hours(),
            policy.widened_lookback.num_hours()
        );
        search_window(
            youtube,
            api_key,
            plan,
            region,
            now - policy.widened_lookback,
            policy,
            &mut candidates,
        )
        .await;
    }

    candidates
}

/// Run the whole feed pipeline: pick queries, gather candidates, fetch
/// details, filter, shuffle.
pub async fn build_feed<R: Rng + Send>(
    youtube: &YouTubeClient,
    credentials: &CredentialSource,
    policy: &FeedPolicy,
    rng: &Mutex<R>,
    request: &FeedRequest,
    now: DateTime<Utc>,
) -> FeedRun {
    let mut report = DebugReport::default();

    let api_key = match credentials.api_key() {
        Ok(key) => key,
        Err(e) => {
            error!("Cannot serve feed: {e}");
            return FeedRun::failed(report, e);
        }
    };

    let plan = {
        let mut rng = lock(rng);
        plan_queries(request.query.as_deref(), policy.extra_seeds, &mut *rng)
    };
    report.query = plan.primary.clone();
    info!("Building feed for '{}' (+{} extra seeds)", plan.primary, plan.extra.len());

    // 1) candidate ids
    let candidates = gather_candidates(
        youtube,
        &api_key,
        &plan,
        request.region.as_deref(),
        now,
        policy,
    )
    .await;
    report.search_statuses = candidates.statuses.clone();
    report.candidates = candidates.ids.len();

    if candidates.ids.is_empty() {
        if candidates.succeeded == 0 {
            if let Some(e) = candidates.first_error {
                return FeedRun::failed(report, e);
            }
        }
        info!("No candidates found for '{}'", plan.primary);
        report.step = Step::Search.to_string();
        return FeedRun {
            ids: Vec::new(),
            report,
            failure: None,
        };
    }

    // 2) details + filter
    let videos = match youtube.video_details(&api_key, &candidates.ids).await {
        Ok(fetched) => {
            report.details_status = Some(fetched.status);
            fetched.value
        }
        Err(e) => {
            error!("Details lookup failed, serving empty feed: {e}");
            report.details_status = e.upstream_status();
            return FeedRun::failed(report, e);
        }
    };
    report.details = videos.len();

    let outcome = filter_videos(
        &videos,
        &policy.strict,
        &policy.relaxed,
        policy.min_strict_results,
    );
    report.strict_count = outcome.strict_count;
    report.relaxed_used = outcome.relaxed_used;

    // 3) shuffle
    let mut ids = outcome.ids;
    {
        let mut rng = lock(rng);
        shuffle_and_truncate(&mut ids, policy.max_output, &mut *rng);
    }

    info!(
        "Feed for '{}': {} candidates, {} details, {} strict, relaxed={}, {} served",
        plan.primary,
        report.candidates,
        report.details,
        report.strict_count,
        report.relaxed_used,
        ids.len()
    );

    report.step = "done".to_string();
    report.output_count = ids.len();
    report.sample = ids.iter().take(DEBUG_SAMPLE_SIZE).cloned().collect();

    FeedRun {
        ids,
        report,
        failure: None,
    }
}
