//! Profiling utilities based on the `puffin` crate.
//!
//! Scopes are recorded only when [`set_enabled`] (or [`init_profiling`]) has
//! turned them on, so the macros are cheap to leave in hot paths such as the
//! packer and the frame flush.

pub use puffin::{GlobalProfiler, profile_function, profile_scope};

/// Profiling backend options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingBackend {
    /// Record scopes in-process only.
    InProcess,
    /// Send profiling data to puffin_viewer via HTTP.
    #[cfg(feature = "profiling")]
    PuffinHttp,
}

#[cfg(feature = "profiling")]
static PROFILING_SERVER: std::sync::OnceLock<puffin_http::Server> = std::sync::OnceLock::new();

/// Turn scope recording on or off.
pub fn set_enabled(enabled: bool) {
    puffin::set_scopes_on(enabled);
}

/// Initialize profiling with the specified backend.
///
/// # Example
/// ```no_run
/// use brickwork_core::profiling::{init_profiling, ProfilingBackend};
///
/// init_profiling(ProfilingBackend::InProcess);
/// ```
pub fn init_profiling(backend: ProfilingBackend) {
    puffin::set_scopes_on(true);
    match backend {
        ProfilingBackend::InProcess => {
            tracing::debug!("Puffin scopes enabled (in-process)");
        }
        #[cfg(feature = "profiling")]
        ProfilingBackend::PuffinHttp => match puffin_http::Server::new("0.0.0.0:8585") {
            Ok(server) => {
                tracing::info!("Puffin profiler server started on http://0.0.0.0:8585");
                let _ = PROFILING_SERVER.set(server);
            }
            Err(e) => {
                tracing::error!("Failed to start puffin server: {}", e);
            }
        },
    }
}

/// Mark the start of a new frame for profiling.
///
/// `GridSystem::frame` calls this once per frame when profiling is enabled.
#[inline]
pub fn new_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}
