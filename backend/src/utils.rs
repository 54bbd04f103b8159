use lazy_static::lazy_static;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

lazy_static! {
    static ref ISO8601_DURATION: Regex =
        Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
            .expect("duration pattern is valid");
}

/// Parse ISO8601 duration string (PT1H2M3S) to total seconds.
/// Returns 0 for empty, unrecognised or overflowing input.
pub fn parse_iso8601_duration_to_seconds(duration_str: &str) -> u64 {
    let Some(captures) = ISO8601_DURATION.captures(duration_str.trim()) else {
        return 0;
    };

    let component = |idx: usize| -> u64 {
        captures
            .get(idx)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };

    [(1, 86_400), (2, 3600), (3, 60), (4, 1)]
        .into_iter()
        .try_fold(0u64, |total, (idx, unit)| {
            component(idx)
                .checked_mul(unit)
                .and_then(|secs| total.checked_add(secs))
        })
        .unwrap_or(0)
}

/// Randomly permute `ids` in place and keep at most `limit` of them.
pub fn shuffle_and_truncate<R: Rng + ?Sized>(ids: &mut Vec<String>, limit: usize, rng: &mut R) {
    ids.shuffle(rng);
    ids.truncate(limit);
}
