//! Runtime entry points.
//!
//! Hosts that embed the engine from synchronous code use [`block_on`]; code
//! already running inside the runtime reaches it through [`Handle`].

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs `future` to completion on a fresh current-thread runtime.
///
/// # Panics
///
/// Panics if the runtime cannot be built (out of file descriptors or similar),
/// or when called from inside another runtime's worker thread.
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}
