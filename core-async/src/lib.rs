//! Async runtime façade for the playback engine.
//!
//! Every engine crate spawns, sleeps, cancels and synchronizes through this
//! crate rather than naming tokio directly, so the executor stays a single,
//! swappable dependency.
//!
//! # Modules
//!
//! - `task`: spawning pipeline tasks and awaiting their handles
//! - `time`: sleep, timeout and monotonic instants
//! - `sync`: channels, locks and the session `CancellationToken`
//! - `runtime`: blocking entry points for hosts and synchronous callers
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::CancellationToken;
//! use core_async::task;
//!
//! # core_async::runtime::block_on(async {
//! let session = CancellationToken::new();
//! let token = session.child_token();
//! let pipeline = task::spawn(async move {
//!     token.cancelled().await;
//!     "drained"
//! });
//!
//! session.cancel();
//! assert_eq!(pipeline.await.unwrap(), "drained");
//! # });
//! ```

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn;
pub use time::{sleep, Duration, Instant};

/// Waits on several branches at once, running the first that completes.
///
/// Re-exported so orchestration code can drive a platform call and its
/// readiness channel together without depending on tokio.
pub use tokio::select;
