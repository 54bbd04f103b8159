use rand::seq::SliceRandom;
use rand::Rng;

/// Phone-like, non-live "ordinary footage" seed phrases used when the caller
/// gives no query.
pub const SEED_QUERIES: &[&str] = &[
    "iphone vertical vlog",
    "walking tour today",
    "city street night b-roll",
    "home video",
    "camcorder raw footage",
    "dashcam night",
    "travel diary",
    "my first vlog",
    "backyard birds",
    "family trip footage",
    "fixing my car",
    "unboxing at home",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub primary: String,
    pub extra: Vec<String>,
}

impl QueryPlan {
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.primary.as_str()).chain(self.extra.iter().map(String::as_str))
    }
}

/// Use the caller's query when it has content, otherwise pick a seed and up
/// to `extra_seeds` more. A caller query is searched on its own.
pub fn plan_queries<R: Rng + ?Sized>(
    requested: Option<&str>,
    extra_seeds: usize,
    rng: &mut R,
) -> QueryPlan {
    if let Some(q) = requested.map(str::trim).filter(|q| !q.is_empty()) {
        return QueryPlan {
            primary: q.to_string(),
            extra: Vec::new(),
        };
    }

    let picked: Vec<&str> = SEED_QUERIES
        .choose_multiple(rng, extra_seeds + 1)
        .copied()
        .collect();

    QueryPlan {
        primary: picked.first().copied().unwrap_or(SEED_QUERIES[0]).to_string(),
        extra: picked.iter().skip(1).map(|s| s.to_string()).collect(),
    }
}
