use reqwest::StatusCode;
use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

pub(crate) const RESOLVE_HANDLE_FAILED: &str = "failed to resolve handle";
pub(crate) const GET_PROFILE_FAILED: &str = "failed to get profile";

/// Everything that can go wrong while looking up a profile image.
///
/// A profile without an avatar is not an error; that comes back as `Ok(None)`.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(
        "required environment variable '{var}' is not set. \
         Please check your .env file or system environment variables"
    )]
    Configuration { var: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("authentication failed: HTTP error code {}", .status.as_u16())]
    Authentication { status: StatusCode },

    #[error("{context}: HTTP error code {}", .status.as_u16())]
    Transport {
        context: &'static str,
        status: StatusCode,
    },

    #[error("failed to parse {context}: {source}")]
    Parse {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request interrupted")]
    Interrupted,
}

impl FetchError {
    /// The HTTP status carried by authentication and transport failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Authentication { status } | FetchError::Transport { status, .. } => {
                Some(*status)
            }
            FetchError::Http(err) => err.status(),
            _ => None,
        }
    }
}
