use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Config,
    Search,
    Details,
}

impl Step {
    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Config => "config",
            Step::Search => "search",
            Step::Details => "details",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("missing YOUTUBE_API_KEY")]
    MissingApiKey,

    #[error("{step} request failed: {message}")]
    Upstream {
        step: Step,
        status: Option<u16>,
        message: String,
    },

    #[error("{step} response could not be decoded: {message}")]
    Decode { step: Step, message: String },

    #[error("invalid YouTube API base url: {0}")]
    InvalidBaseUrl(String),
}

impl FeedError {
    pub fn step(&self) -> Step {
        match self {
            FeedError::MissingApiKey | FeedError::InvalidBaseUrl(_) => Step::Config,
            FeedError::Upstream { step, .. } | FeedError::Decode { step, .. } => *step,
        }
    }

    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            FeedError::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn from_reqwest(step: Step, err: reqwest::Error) -> Self {
        // reqwest errors embed the full url, which carries the key
        let err = err.without_url();
        if err.is_decode() {
            FeedError::Decode {
                step,
                message: err.to_string(),
            }
        } else {
            FeedError::Upstream {
                step,
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_error_reports_step_and_status() {
        let err = FeedError::Upstream {
            step: Step::Search,
            status: Some(403),
            message: "quotaExceeded".into(),
        };
        assert_eq!(err.step(), Step::Search);
        assert_eq!(err.upstream_status(), Some(403));
        assert_eq!(err.to_string(), "search request failed: quotaExceeded");
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let err = FeedError::MissingApiKey;
        assert_eq!(err.step(), Step::Config);
        assert_eq!(err.upstream_status(), None);
        assert_eq!(err.to_string(), "missing YOUTUBE_API_KEY");
    }

    #[test]
    fn decode_error_has_no_status() {
        let err = FeedError::Decode {
            step: Step::Details,
            message: "expected value".into(),
        };
        assert_eq!(err.step().as_str(), "details");
        assert_eq!(err.upstream_status(), None);
    }
}
