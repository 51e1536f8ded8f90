use std::future::Future;

use crate::errors::{FetchError, FetchResult};

/// Runs `fut` to completion unless `cancel` resolves first, in which case the
/// request is dropped and [`FetchError::Interrupted`] is returned.
///
/// The binary passes `tokio::signal::ctrl_c()` as `cancel`.
pub async fn interruptible<T, C>(
    fut: impl Future<Output = FetchResult<T>>,
    cancel: C,
) -> FetchResult<T>
where
    C: Future,
{
    tokio::select! {
        result = fut => result,
        _ = cancel => Err(FetchError::Interrupted),
    }
}
