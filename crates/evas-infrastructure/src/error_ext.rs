//! Error extension utilities
//!
//! Context conversion for foreign errors and a renderer for nested
//! aggregate errors.

use std::error::Error as StdError;
use std::fmt::{self, Write as _};

use evas_domain::error::{Error, Result};

/// Extension trait for adding context to errors
///
/// ```ignore
/// use evas_infrastructure::error_ext::ErrorContext;
///
/// let content = tokio::fs::read_to_string(&path)
///     .await
///     .io_context(format!("Failed to read template {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to a Result, converting the error to an internal error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context with lazy evaluation
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;

    /// Add context for I/O operations
    fn io_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context for configuration operations
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::internal(format!("{context}: {err}")))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|err| Error::internal(format!("{}: {err}", f())))
    }

    fn io_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::io_with_source(context.to_string(), err))
    }

    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::configuration_with_source(context.to_string(), err))
    }
}

/// Indented rendering of an error, its aggregate causes and source chain
///
/// ```text
/// Errors loading bounded context children (1 cause(s))
///   - Error loading middleware 'audit' in SERVER::TENANT::USERS
///     - Internal error: boom
/// ```
pub struct ErrorTree<'a>(pub &'a Error);

impl fmt::Display for ErrorTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        render(self.0, 0, &mut out)?;
        f.write_str(out.trim_end())
    }
}

fn render(error: &Error, depth: usize, out: &mut String) -> fmt::Result {
    let indent = "  ".repeat(depth);
    let bullet = if depth == 0 { "" } else { "- " };
    writeln!(out, "{indent}{bullet}{error}")?;

    match error {
        Error::Aggregate(aggregate) => {
            for cause in aggregate.causes() {
                render(cause, depth + 1, out)?;
            }
        }
        Error::ArtifactLoad { source, .. }
        | Error::ArtifactUnload { source, .. }
        | Error::Instantiation { source, .. } => render(source, depth + 1, out)?,
        other => {
            let mut source = other.source();
            while let Some(inner) = source {
                writeln!(out, "{indent}  caused by: {inner}")?;
                source = inner.source();
            }
        }
    }
    Ok(())
}
