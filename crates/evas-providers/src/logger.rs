//! Logger repository
//!
//! A thin facade over `tracing` so artifacts log through the IoC container
//! instead of depending on the subscriber setup. Every instance carries its
//! own minimum level; records below it are dropped before reaching tracing.
//!
//! ```ignore
//! let logger = container
//!     .resolve_as::<LoggerRepository>("Logger", &json!({ "level": "debug" }))
//!     .await?;
//! logger.info("tenant domain ready");
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use evas_domain::Lifecycle;
use evas_domain::error::Result;
use evas_infrastructure::artifacts::StateCell;
use evas_infrastructure::di::{IocContainer, Repository, SingletonRepositoryFactory};
use evas_infrastructure::loader::{ARTIFACT_MODULES, ModuleEntry, ModuleExport};
use evas_infrastructure::logging::parse_log_level;
use serde::Deserialize;
use serde_json::Value;
use tracing::{Level, debug, error, info, trace, warn};

use crate::constants::{LOGGER_DEFAULT_LEVEL, LOGGER_MODULE_ID, LOGGER_REPOSITORY};
use crate::settings::from_configuration;

/// Logger configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    /// Minimum level (trace, debug, info, warn, error)
    pub level: String,
    /// Name attached to every record
    pub source: Option<String>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: LOGGER_DEFAULT_LEVEL.to_string(),
            source: None,
        }
    }
}

/// Leveled logger
#[derive(Debug)]
pub struct LoggerRepository {
    level: Level,
    source: String,
    state: StateCell,
}

impl LoggerRepository {
    pub fn new(settings: &LoggerSettings) -> Result<Self> {
        Ok(Self {
            level: parse_log_level(&settings.level)?,
            source: settings
                .source
                .clone()
                .unwrap_or_else(|| LOGGER_REPOSITORY.to_lowercase()),
            state: StateCell::default(),
        })
    }

    /// Minimum level of this instance
    pub fn level(&self) -> Level {
        self.level
    }

    /// True when records at `level` pass this instance's threshold
    pub fn enabled(&self, level: Level) -> bool {
        // tracing orders levels by verbosity: TRACE > DEBUG > ... > ERROR
        level <= self.level
    }

    /// Emit `message` at `level`; returns whether it passed the threshold
    pub fn log(&self, level: Level, message: &str) -> bool {
        if !self.enabled(level) {
            return false;
        }
        let source = self.source.as_str();
        match level {
            Level::ERROR => error!(source = source, "{message}"),
            Level::WARN => warn!(source = source, "{message}"),
            Level::INFO => info!(source = source, "{message}"),
            Level::DEBUG => debug!(source = source, "{message}"),
            _ => trace!(source = source, "{message}"),
        }
        true
    }

    pub fn error(&self, message: &str) -> bool {
        self.log(Level::ERROR, message)
    }

    pub fn warn(&self, message: &str) -> bool {
        self.log(Level::WARN, message)
    }

    pub fn info(&self, message: &str) -> bool {
        self.log(Level::INFO, message)
    }

    pub fn debug(&self, message: &str) -> bool {
        self.log(Level::DEBUG, message)
    }
}

#[async_trait]
impl Lifecycle for LoggerRepository {
    async fn load(&self) -> Result<()> {
        self.state.begin_load(LOGGER_REPOSITORY)
    }

    async fn unload(&self) -> Result<()> {
        self.state.begin_unload(LOGGER_REPOSITORY)
    }
}

impl Repository for LoggerRepository {
    fn name(&self) -> &str {
        LOGGER_REPOSITORY
    }
}

/// Factory serving one [`LoggerRepository`] per configuration
pub fn logger_factory() -> Arc<SingletonRepositoryFactory> {
    Arc::new(SingletonRepositoryFactory::new(
        LOGGER_REPOSITORY,
        |configuration: &Value, _container: &Arc<IocContainer>| {
            let settings: LoggerSettings = from_configuration(LOGGER_REPOSITORY, configuration)?;
            let repository: Arc<dyn Repository> = Arc::new(LoggerRepository::new(&settings)?);
            Ok(repository)
        },
    ))
}

#[linkme::distributed_slice(ARTIFACT_MODULES)]
static LOGGER_MODULE: ModuleEntry = ModuleEntry {
    path: LOGGER_MODULE_ID,
    export: || ModuleExport::Repository(logger_factory()),
};
