//! # EVAS Server
//!
//! The root of the artifact tree. [`ApplicationServer`] builds the root
//! capabilities, runs the server lifecycle manager over the configured
//! artifact root and tears everything down in reverse on unload.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ApplicationServer`] | Server artifact |
//! | [`ApplicationServerFactory`] | Memoizes the single server instance |
//! | [`run`] | Binary entry point: config, logging, bootstrap, signals, shutdown |
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     evas_server::run(evas_server::RunOptions::default()).await
//! }
//! ```

pub mod constants;
pub mod factory;
pub mod init;
pub mod server;

pub use factory::ApplicationServerFactory;
pub use init::{RunOptions, load_config, run, serve, shutdown_signal};
pub use server::ApplicationServer;
