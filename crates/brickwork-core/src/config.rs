//! Engine-wide configuration.

use crate::profiling::ProfilingBackend;

/// Default number of scheduler entries drained per frame.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Configuration for a Brickwork grid system.
#[derive(Debug, Clone)]
pub struct Config {
    /// How many scheduled read/write pairs are flushed per frame.
    pub batch_size: usize,
    pub profiling: ProfilingMode,
    /// Install the default `tracing` subscriber on startup.
    pub logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            batch_size: DEFAULT_BATCH_SIZE,
            profiling: ProfilingMode::Off,
            logging: false,
        }
    }
}

impl Config {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_profiling(mut self, profiling: ProfilingMode) -> Self {
        self.profiling = profiling;
        self
    }

    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }
}

impl ProfilingMode {
    /// Backend to initialize for this mode, `None` when profiling is off.
    pub fn backend(self) -> Option<ProfilingBackend> {
        match self {
            ProfilingMode::Off => None,
            ProfilingMode::On => Some(ProfilingBackend::InProcess),
            #[cfg(feature = "profiling")]
            ProfilingMode::WithWebserver => Some(ProfilingBackend::PuffinHttp),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingMode {
    /// Profiling is disabled
    Off,
    /// Scopes are recorded and frames are marked by the grid system
    On,
    /// Scopes are recorded and served to external tools such as 'puffin_viewer'
    #[cfg(feature = "profiling")]
    WithWebserver,
}
