use crate::errors::{FetchError, FetchResult};

/// Trim a handle and qualify it with `default_domain` when it has no domain of its own.
///
/// `"devoxx"` becomes `"devoxx.bsky.social"`, while `" devoxx.example.com "` is only trimmed.
pub fn normalize_handle(handle: &str, default_domain: &str) -> FetchResult<String> {
    let handle = handle.trim();
    if handle.is_empty() {
        return Err(FetchError::InvalidArgument(
            "handle cannot be empty".to_string(),
        ));
    }

    if handle.contains('.') {
        Ok(handle.to_string())
    } else {
        Ok(format!("{handle}.{default_domain}"))
    }
}
