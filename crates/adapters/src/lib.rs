//! # notifyconf-adapters
//!
//! Adapter implementations for ports: configuration readers (file, memory,
//! HTTP), loggers, the system clock and the built-in notification plugins.
//! This crate depends on `ports`, `domain` and `shared`.

pub mod clock;
pub mod log_sink;
pub mod logger;
pub mod plugins;
pub mod readers;
pub mod tracing_logger;

pub use clock::SystemClock;
pub use log_sink::{LogSink, MemoryLogSink, StderrLogSink};
pub use logger::JsonLogger;
pub use plugins::{
    CustomNotification, CustomPlugin, CustomPluginBuilder, MailtoPlugin, WebhookPlugin,
    builtin_plugins,
};
pub use readers::{
    FileConfigReader, HttpConfigReader, HttpReaderConfig, MAX_BUFFER_SIZE, MemoryConfigReader,
    ReaderError,
};
pub use tracing_logger::TracingLogger;

/// Returns the adapters crate version.
#[must_use]
pub const fn adapters_crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
