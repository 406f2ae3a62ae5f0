//! Task spawning.
//!
//! Pipelines run as independent tokio tasks. Callers keep the returned
//! [`JoinHandle`] and await it when the pipeline is stopped; a task is never
//! aborted from outside, it observes its cancellation token and returns.

pub use tokio::task::{spawn_blocking, yield_now, JoinError, JoinHandle};

/// Spawns `future` onto the current runtime.
///
/// # Panics
///
/// Panics when called outside a runtime context.
///
/// # Examples
///
/// ```rust
/// use core_async::task::spawn;
///
/// # core_async::runtime::block_on(async {
/// let handle = spawn(async { 42 });
/// assert_eq!(handle.await.unwrap(), 42);
/// # });
/// ```
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Returns `true` while the task behind `handle` has not finished.
pub fn is_live<T>(handle: Option<&JoinHandle<T>>) -> bool {
    handle.is_some_and(|h| !h.is_finished())
}

/// Result type for awaiting a task handle.
pub type Result<T> = std::result::Result<T, JoinError>;
