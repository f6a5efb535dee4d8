//! Tracing setup for the hermod binaries and tests.
//!
//! A [`HermodTracer`] collects the layers to install (stdout, journald and a rolling log file),
//! each with its own [`LogFormat`] and filter, and installs them as the global subscriber.
//!
//! ```no_run
//! use hermod_tracing::{HermodTracer, LayerInfo, LogFormat, Tracer};
//!
//! let stdout = LayerInfo::new(LogFormat::Terminal, "info".to_string(), String::new(), None);
//! let _guard = HermodTracer::new().with_stdout(stdout).init().expect("tracing installs");
//! ```

// re-export tracing crates.
pub use tracing;
pub use tracing_subscriber;

pub use formatter::LogFormat;
pub use layers::{FileInfo, FileWorkerGuard};

mod formatter;
mod layers;

use crate::layers::Layers;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Tracer for application logging.
///
/// Manages the configuration and initialization of logging layers, including standard output
/// logging, journald logging and file logging.
#[derive(Debug, Clone)]
pub struct HermodTracer {
    stdout: LayerInfo,
    journald: Option<String>,
    file: Option<(LayerInfo, FileInfo)>,
}

impl HermodTracer {
    /// Constructs a new tracer with a default stdout layer and no journald or file layer.
    pub fn new() -> Self {
        Self { stdout: LayerInfo::default(), journald: None, file: None }
    }

    /// Sets the stdout layer configuration.
    pub fn with_stdout(mut self, config: LayerInfo) -> Self {
        self.stdout = config;
        self
    }

    /// Enables journald logging with `filter`.
    pub fn with_journald(mut self, filter: String) -> Self {
        self.journald = Some(filter);
        self
    }

    /// Enables logging to rolling files in the directory described by `file_info`.
    pub fn with_file(mut self, config: LayerInfo, file_info: FileInfo) -> Self {
        self.file = Some((config, file_info));
        self
    }
}

impl Default for HermodTracer {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of a single logging layer.
#[derive(Debug, Clone)]
pub struct LayerInfo {
    format: LogFormat,
    default_directive: String,
    filters: String,
    color: Option<String>,
}

impl LayerInfo {
    /// Creates a layer configuration.
    ///
    /// `default_directive` applies when `RUST_LOG` is unset, `filters` is a comma separated list
    /// of extra directives, and `color` is one of `always`, `auto` or `never` (`None` disables
    /// ANSI colors).
    pub fn new(
        format: LogFormat,
        default_directive: String,
        filters: String,
        color: Option<String>,
    ) -> Self {
        Self { format, default_directive, filters, color }
    }
}

impl Default for LayerInfo {
    fn default() -> Self {
        Self {
            format: LogFormat::Terminal,
            default_directive: LevelFilter::INFO.to_string(),
            filters: String::new(),
            color: Some("always".to_string()),
        }
    }
}

/// Installs a configured set of layers as the global subscriber.
pub trait Tracer {
    /// Installs the layers. Returns the guard of the file writer when file logging is enabled;
    /// buffered lines are flushed when it is dropped. Fails when a global subscriber is already
    /// installed.
    fn init(self) -> eyre::Result<Option<FileWorkerGuard>>;
}

impl Tracer for HermodTracer {
    fn init(self) -> eyre::Result<Option<FileWorkerGuard>> {
        let mut layers = Layers::new();

        layers.stdout(
            self.stdout.format,
            self.stdout.default_directive.parse()?,
            &self.stdout.filters,
            self.stdout.color,
        )?;

        if let Some(filter) = self.journald {
            layers.journald(&filter)?;
        }

        let file_guard = match self.file {
            Some((config, file_info)) => {
                Some(layers.file(config.format, &config.filters, file_info)?)
            }
            None => None,
        };

        tracing_subscriber::registry()
            .with(layers.into_inner())
            .try_init()
            .map_err(|e| eyre::eyre!("failed to install tracing subscriber: {e}"))?;
        Ok(file_guard)
    }
}

/// Installs a test-friendly subscriber honoring `RUST_LOG`. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layer_is_terminal_info() {
        let layer = LayerInfo::default();
        assert_eq!(layer.format, LogFormat::Terminal);
        assert_eq!(layer.default_directive, "info");
        assert!(layer.filters.is_empty());
    }

    #[test]
    fn test_builder_sets_layers() {
        let stdout = LayerInfo::new(LogFormat::Json, "debug".to_string(), String::new(), None);
        let tracer = HermodTracer::new()
            .with_stdout(stdout)
            .with_journald("error".to_string())
            .with_file(LayerInfo::default(), FileInfo::new(std::env::temp_dir(), 1024, 2));

        assert_eq!(tracer.stdout.format, LogFormat::Json);
        assert_eq!(tracer.journald.as_deref(), Some("error"));
        assert!(tracer.file.is_some());
    }

    #[test]
    fn test_init_fails_when_a_subscriber_is_installed() {
        init_test_tracing();

        let dir = std::env::temp_dir().join("hermod-tracing-reinit");
        let result = HermodTracer::new()
            .with_file(LayerInfo::default(), FileInfo::new(dir, 1024 * 1024, 1))
            .init();
        assert!(result.is_err());
    }

    #[test]
    fn test_init_test_tracing_is_reentrant() {
        init_test_tracing();
        init_test_tracing();
        tracing::debug!("still alive");
    }
}
