//! Provider constants

// ============================================================================
// Repository names
// ============================================================================

pub const CONFIGURATION_REPOSITORY: &str = "Configuration";

pub const LOGGER_REPOSITORY: &str = "Logger";

pub const CACHE_REPOSITORY: &str = "Cache";

// ============================================================================
// Module ids
// ============================================================================

/// Configuration is needed before anything else loads
pub const CONFIGURATION_MODULE_ID: &str = "repositories/init/configuration";

pub const LOGGER_MODULE_ID: &str = "repositories/runtime/logger";

pub const CACHE_MODULE_ID: &str = "repositories/runtime/cache";

// ============================================================================
// Defaults
// ============================================================================

/// Prefix of per-artifact environment fallbacks (`EVAS_<NAME>`)
pub const ARTIFACT_ENV_PREFIX: &str = "EVAS_";

/// Key of the artifacts table inside the Configuration resolve arguments
pub const ARTIFACTS_KEY: &str = "artifacts";

/// Default cache capacity in entries
pub const CACHE_DEFAULT_CAPACITY: u64 = 10_000;

/// Default logger level
pub const LOGGER_DEFAULT_LEVEL: &str = "info";
