//! Logging configuration for the profiler engine.
//!
//! The engine only emits `tracing` events; installing a subscriber is left to
//! the application. [`setup::init_logging`] is a convenience for binaries and
//! tests that do not have their own.

use tracing::Level;

/// Controls what the engine logs.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Base log level for engine components
    pub base_level: Level,
    /// Whether synthesized SQL is logged
    pub log_queries: bool,
    /// Maximum length for logged field values
    pub max_field_length: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            base_level: Level::INFO,
            log_queries: false,
            max_field_length: 256,
        }
    }
}

impl LogConfig {
    /// Logs every query in full.
    pub fn verbose() -> Self {
        Self {
            base_level: Level::DEBUG,
            log_queries: true,
            max_field_length: 4096,
        }
    }

    pub fn production() -> Self {
        Self {
            base_level: Level::WARN,
            log_queries: false,
            max_field_length: 128,
        }
    }

    /// Shortens a field value before logging it.
    pub fn truncate_field(&self, value: &str) -> String {
        truncate_field(value, self.max_field_length)
    }
}

/// Logs a synthesized query at debug level when query logging is enabled.
#[macro_export]
macro_rules! log_query {
    ($config:expr, $sql:expr, $($arg:tt)*) => {
        if $config.log_queries {
            tracing::debug!(sql = %$config.truncate_field($sql), $($arg)*);
        }
    };
}

/// Truncates a string to `max_length` characters, marking the cut.
pub fn truncate_field(value: &str, max_length: usize) -> String {
    match value.char_indices().nth(max_length) {
        Some((byte_index, _)) => format!("{}...(truncated)", &value[..byte_index]),
        None => value.to_string(),
    }
}

/// Subscriber setup.
pub mod setup {
    use tracing::Level;

    /// Configuration for installing a global subscriber.
    #[derive(Debug, Clone)]
    pub struct LoggingConfig {
        /// Log level for everything outside the engine
        pub level: Level,
        /// Log level for `profiler_engine` targets
        pub engine_level: Level,
        /// Whether to use JSON output format
        pub json_format: bool,
        /// Environment filter override
        pub env_filter: Option<String>,
    }

    impl Default for LoggingConfig {
        fn default() -> Self {
            Self {
                level: Level::INFO,
                engine_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }
    }

    impl LoggingConfig {
        pub fn production() -> Self {
            Self {
                level: Level::WARN,
                engine_level: Level::INFO,
                json_format: true,
                env_filter: None,
            }
        }

        pub fn development() -> Self {
            Self {
                level: Level::DEBUG,
                engine_level: Level::DEBUG,
                json_format: false,
                env_filter: None,
            }
        }

        pub fn with_level(mut self, level: Level) -> Self {
            self.level = level;
            self
        }

        pub fn with_engine_level(mut self, level: Level) -> Self {
            self.engine_level = level;
            self
        }

        pub fn with_json_format(mut self, enabled: bool) -> Self {
            self.json_format = enabled;
            self
        }

        pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
            self.env_filter = Some(filter.into());
            self
        }

        /// Builds the environment filter directive.
        pub fn env_filter(&self) -> String {
            match &self.env_filter {
                Some(filter) => filter.clone(),
                None => format!(
                    "{},profiler_engine={}",
                    self.level.as_str().to_lowercase(),
                    self.engine_level.as_str().to_lowercase()
                ),
            }
        }
    }

    /// Installs a global `tracing` subscriber.
    ///
    /// `RUST_LOG`, when set, takes precedence over the configured filter.
    ///
    /// ```rust,no_run
    /// use profiler_engine::logging::setup::{init_logging, LoggingConfig};
    ///
    /// init_logging(LoggingConfig::development().with_json_format(true)).unwrap();
    /// ```
    pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config.env_filter()))?;

        let fmt_layer = if config.json_format {
            tracing_subscriber::fmt::layer().json().boxed()
        } else {
            tracing_subscriber::fmt::layer().boxed()
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;

        Ok(())
    }
}
