//! Synchronization primitives.
//!
//! Async-aware locks and channels come from `tokio::sync`. Cooperative
//! cancellation comes from `tokio_util`: one [`CancellationToken`] scopes a
//! whole streaming session and child tokens scope individual pipelines, so
//! cancelling the session reaches every pipeline while stopping one pipeline
//! leaves its siblings alone.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//!
//! let session = CancellationToken::new();
//! let pushing = session.child_token();
//!
//! pushing.cancel();
//! assert!(!session.is_cancelled());
//!
//! session.cancel();
//! assert!(session.child_token().is_cancelled());
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, RwLockReadGuard,
    RwLockWriteGuard, Semaphore,
};

pub use tokio_util::sync::{CancellationToken, DropGuard, WaitForCancellationFuture};

/// Cancels `current` and swaps a fresh token into its place.
///
/// Returns the cancelled token so callers can still hand it to code that wants
/// to observe the old scope.
pub fn renew_token(current: &mut CancellationToken) -> CancellationToken {
    let previous = std::mem::replace(current, CancellationToken::new());
    previous.cancel();
    previous
}
