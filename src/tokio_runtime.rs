//! Global Tokio runtime for the HTTP services
//!
//! gpui runs its own executor, but reqwest needs Tokio. Service calls are
//! spawned on a lazily created runtime and awaited from gpui tasks.

use gpui::{App, Context, Task};
use log::debug;
use std::future::Future;
use std::sync::OnceLock;
use tokio::runtime::{Handle, Runtime};

static TOKIO_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Create the global runtime. Call this during app startup.
pub fn init(_cx: &mut App) -> std::io::Result<()> {
    if TOKIO_RUNTIME.get().is_some() {
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("storynest-io")
        .enable_all()
        .build()?;
    let _ = TOKIO_RUNTIME.set(runtime);
    debug!("Tokio runtime started");
    Ok(())
}

fn handle() -> Option<Handle> {
    TOKIO_RUNTIME.get().map(|rt| rt.handle().clone())
}

/// Run `future` on the Tokio runtime and return a gpui task for its output
///
/// Resolves to `None` if the runtime was never initialized or the future
/// panicked.
pub fn spawn<T, R, F>(cx: &mut Context<T>, future: F) -> Task<Option<R>>
where
    R: Send + 'static,
    F: Future<Output = R> + Send + 'static,
{
    let Some(handle) = handle() else {
        return Task::ready(None);
    };
    let join_handle = handle.spawn(future);

    cx.foreground_executor()
        .spawn(async move { join_handle.await.ok() })
}
