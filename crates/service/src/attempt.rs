use std::fmt::Display;
use std::future::Future;

use tracing::warn;

/// Run a best-effort side effect: the failure is logged and swallowed, never
/// surfaced to the caller. Email, SMS and file cleanup all go through here so
/// the policy lives in one place.
pub async fn attempt<F, T, E>(what: &str, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match fut.await {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(operation = what, error = %e, "best-effort operation failed");
            None
        }
    }
}
