//! Server constants

/// Exit code of a failed bootstrap or shutdown
pub const EXIT_FAILURE: u8 = 1;

/// Startup record written through the Logger repository
pub const STARTUP_MESSAGE: &str = "server started";

/// Shutdown record written through the Logger repository
pub const SHUTDOWN_MESSAGE: &str = "server stopping";
