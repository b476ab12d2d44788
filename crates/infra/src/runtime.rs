//! Composition root: registries, readers, logger and clock wired together.

use crate::InfraResult;
use notifyconf_adapters::{
    CustomPluginBuilder, FileConfigReader, HttpConfigReader, HttpReaderConfig, JsonLogger,
    LogSink, MemoryConfigReader, StderrLogSink, SystemClock, TracingLogger, builtin_plugins,
};
use notifyconf_app::{PluginRegistry, ReaderRegistry, ResolverDeps};
use notifyconf_ports::{ClockPort, ConfigReaderPort, LoggerPort, NotifyPlugin};
use notifyconf_shared::ErrorEnvelope;
use std::fmt;
use std::sync::Arc;

/// Where resolution events go.
#[derive(Clone, Default)]
pub enum LoggerChoice {
    /// Events are dropped.
    Silent,
    /// Events are forwarded to `tracing`.
    #[default]
    Tracing,
    /// One JSON line per event on stderr.
    JsonStderr,
    /// One JSON line per event on the given sink.
    JsonSink(Arc<dyn LogSink>),
}

impl fmt::Debug for LoggerChoice {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Silent => "Silent",
            Self::Tracing => "Tracing",
            Self::JsonStderr => "JsonStderr",
            Self::JsonSink(_) => "JsonSink",
        };
        formatter.write_str(name)
    }
}

impl LoggerChoice {
    fn build(self) -> Option<Arc<dyn LoggerPort>> {
        match self {
            Self::Silent => None,
            Self::Tracing => Some(Arc::new(TracingLogger::new())),
            Self::JsonStderr => Some(Arc::new(JsonLogger::new(Arc::new(StderrLogSink)))),
            Self::JsonSink(sink) => Some(Arc::new(JsonLogger::new(sink))),
        }
    }
}

/// Builder for a [`Runtime`].
///
/// Built-in plugins and the `file`, `memory`, `http` and `https` readers are
/// always present; extra plugins and readers are added on top.
#[derive(Default)]
pub struct RuntimeBuilder {
    logger: LoggerChoice,
    http: HttpReaderConfig,
    plugins: Vec<Arc<dyn NotifyPlugin>>,
    custom: Vec<CustomPluginBuilder>,
    readers: Vec<Arc<dyn ConfigReaderPort>>,
    clock: Option<Arc<dyn ClockPort>>,
}

impl fmt::Debug for RuntimeBuilder {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RuntimeBuilder")
            .field("logger", &self.logger)
            .field("http", &self.http)
            .field("plugins", &self.plugins.len())
            .field("custom", &self.custom)
            .field("readers", &self.readers.len())
            .finish_non_exhaustive()
    }
}

impl RuntimeBuilder {
    /// Start from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Choose the logger.
    #[must_use]
    pub fn logger(mut self, logger: LoggerChoice) -> Self {
        self.logger = logger;
        self
    }

    /// Override the HTTP reader settings.
    #[must_use]
    pub fn http(mut self, config: HttpReaderConfig) -> Self {
        self.http = config;
        self
    }

    /// Register an extra plugin.
    #[must_use]
    pub fn plugin(mut self, plugin: Arc<dyn NotifyPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Register a runtime-defined plugin.
    #[must_use]
    pub fn custom(mut self, builder: CustomPluginBuilder) -> Self {
        self.custom.push(builder);
        self
    }

    /// Register an extra configuration reader.
    #[must_use]
    pub fn reader(mut self, reader: Arc<dyn ConfigReaderPort>) -> Self {
        self.readers.push(reader);
        self
    }

    /// Replace the wall clock.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn ClockPort>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Wire everything together.
    ///
    /// Fails when two plugins or two readers claim the same schema, or a
    /// custom plugin has an invalid schema.
    #[tracing::instrument(name = "runtime.build", skip_all)]
    pub fn build(self) -> InfraResult<Runtime> {
        let mut plugins = PluginRegistry::new();
        for plugin in builtin_plugins().into_iter().chain(self.plugins) {
            plugins.register(plugin).map_err(ErrorEnvelope::from)?;
        }
        for builder in self.custom {
            let plugin = builder.build().map_err(ErrorEnvelope::from)?;
            plugins.register(Arc::new(plugin)).map_err(ErrorEnvelope::from)?;
        }

        let memory = Arc::new(MemoryConfigReader::new());
        let mut readers = ReaderRegistry::new();
        readers.register(Arc::new(FileConfigReader::new()))?;
        readers.register(Arc::clone(&memory) as Arc<dyn ConfigReaderPort>)?;
        readers.register(Arc::new(HttpConfigReader::new(self.http)))?;
        for reader in self.readers {
            readers.register(reader)?;
        }

        tracing::debug!(
            plugins = plugins.len(),
            readers = readers.schemas().count(),
            "runtime wired"
        );

        let deps = ResolverDeps {
            plugins: Arc::new(plugins),
            readers: Arc::new(readers),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            logger: self.logger.build(),
        };
        Ok(Runtime { deps, memory })
    }
}

/// Wired collaborators shared by every resolution.
#[derive(Clone)]
pub struct Runtime {
    deps: ResolverDeps,
    memory: Arc<MemoryConfigReader>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Runtime")
            .field("deps", &self.deps)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Runtime with the defaults.
    pub fn new() -> InfraResult<Self> {
        RuntimeBuilder::new().build()
    }

    /// Start a builder.
    #[must_use]
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Dependencies for [`notifyconf_app::ConfigSource`].
    #[must_use]
    pub fn deps(&self) -> ResolverDeps {
        self.deps.clone()
    }

    /// Plugin registry.
    #[must_use]
    pub fn plugins(&self) -> &PluginRegistry {
        &self.deps.plugins
    }

    /// Reader registry.
    #[must_use]
    pub fn readers(&self) -> &ReaderRegistry {
        &self.deps.readers
    }

    /// Logger, when one is configured.
    #[must_use]
    pub fn logger(&self) -> Option<&dyn LoggerPort> {
        self.deps.logger.as_deref()
    }

    /// In-process documents served under `memory://`.
    #[must_use]
    pub fn memory(&self) -> &MemoryConfigReader {
        &self.memory
    }
}
