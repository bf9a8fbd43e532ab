//! Infrastructure constants
//!
//! Directory conventions, configuration defaults and environment names.

// ============================================================================
// Configuration
// ============================================================================

/// Environment variable prefix for configuration overrides
pub const CONFIG_ENV_PREFIX: &str = "EVAS";

/// Separator between nested keys in environment overrides
pub const CONFIG_ENV_SEPARATOR: &str = "__";

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "evas.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Default server name
pub const DEFAULT_SERVER_NAME: &str = "REST API Server";

/// Default capacity of a scope's event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

// ============================================================================
// Logging
// ============================================================================

/// Environment variable holding a tracing filter directive
pub const LOG_FILTER_ENV: &str = "EVAS_LOG";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log file stem
pub const DEFAULT_LOG_FILE_STEM: &str = "evas";

// ============================================================================
// Directory conventions
// ============================================================================

/// Entry module file stem inside an artifact directory
pub const ENTRY_MODULE_STEM: &str = "index";

/// Repositories needed before anything else (server scope)
pub const INIT_REPOSITORIES_DIR: &str = "repositories/init";

/// Repositories needed at runtime (server scope)
pub const RUNTIME_REPOSITORIES_DIR: &str = "repositories/runtime";

/// Repositories owned by a domain
pub const DOMAIN_REPOSITORIES_DIR: &str = "repositories";

/// Domains under the server or a parent domain
pub const DOMAINS_DIR: &str = "domains";

/// Bounded contexts under the server or a domain
pub const BOUNDED_CONTEXTS_DIR: &str = "bounded_contexts";

/// Middlewares of a bounded context
pub const MIDDLEWARES_DIR: &str = "middlewares";

/// Command surfaces of a bounded context
pub const COMMAND_SURFACES_DIR: &str = "surfaces/command";

/// Query surfaces of a bounded context
pub const QUERY_SURFACES_DIR: &str = "surfaces/query";

/// Event handlers of a bounded context
pub const EVENT_HANDLERS_DIR: &str = "event_handlers";

/// Templates of a domain
pub const TEMPLATES_DIR: &str = "templates";

/// Default template file extension
pub const DEFAULT_TEMPLATE_EXTENSION: &str = "ejs";
