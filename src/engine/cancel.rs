//! engine::cancel
//!
//! Caller cancellation for repository calls.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::EngineError;

/// Run `fut` unless the token is (or becomes) cancelled first.
///
/// Cancellation wins ties, so a token cancelled before the call never lets
/// the future start. The future's own output is passed through untouched,
/// which lets callers apply `?` twice: once for cancellation, once for the
/// call's error.
///
/// # Example
///
/// ```
/// use cascadework::engine::cancel::cancellable;
/// use cascadework::engine::EngineError;
/// use tokio_util::sync::CancellationToken;
///
/// # tokio_test::block_on(async {
/// let token = CancellationToken::new();
/// assert_eq!(cancellable(&token, async { 7 }).await.unwrap(), 7);
///
/// token.cancel();
/// assert!(matches!(
///     cancellable(&token, async { 7 }).await,
///     Err(EngineError::Cancelled)
/// ));
/// # });
/// ```
pub async fn cancellable<F>(token: &CancellationToken, fut: F) -> Result<F::Output, EngineError>
where
    F: Future,
{
    tokio::select! {
        biased;

        _ = token.cancelled() => Err(EngineError::Cancelled),
        output = fut => Ok(output),
    }
}
