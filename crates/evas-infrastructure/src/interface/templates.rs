//! Domain template files
//!
//! Templates live at `<domain>/templates/<type>/<action>.<ext>`. Reads run
//! concurrently and every request gets its own result.

use std::path::PathBuf;

use evas_domain::error::{Error, Result};
use futures::future::join_all;

use crate::constants::{DEFAULT_TEMPLATE_EXTENSION, TEMPLATES_DIR};
use crate::error_ext::ErrorContext;

/// One template to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateRequest {
    /// Resource type directory
    pub template_type: String,
    /// Action; lower-cased to form the file name
    pub action: String,
}

impl TemplateRequest {
    pub fn new<T: Into<String>, A: Into<String>>(template_type: T, action: A) -> Self {
        Self {
            template_type: template_type.into(),
            action: action.into(),
        }
    }
}

/// Outcome of one [`TemplateRequest`]
#[derive(Debug)]
pub struct TemplateResolution {
    pub request: TemplateRequest,
    pub template: Result<String>,
}

/// Template reader of one domain
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: Option<PathBuf>,
    extension: String,
}

impl TemplateStore {
    /// Store reading from `<domain_location>/templates`
    pub fn for_domain<P: Into<PathBuf>>(domain_location: P) -> Self {
        Self {
            root: Some(domain_location.into().join(TEMPLATES_DIR)),
            extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
        }
    }

    /// Store outside any domain; every read fails
    pub fn empty() -> Self {
        Self {
            root: None,
            extension: DEFAULT_TEMPLATE_EXTENSION.to_string(),
        }
    }

    /// Use `extension` instead of the default
    #[must_use]
    pub fn with_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.extension = extension.into();
        self
    }

    /// Path the request would be read from
    pub fn path_for(&self, request: &TemplateRequest) -> Option<PathBuf> {
        self.root.as_ref().map(|root| {
            root.join(&request.template_type).join(format!(
                "{}.{}",
                request.action.to_lowercase(),
                self.extension
            ))
        })
    }

    /// Read every requested template
    pub async fn get(&self, requests: Vec<TemplateRequest>) -> Vec<TemplateResolution> {
        join_all(requests.into_iter().map(|request| async move {
            let template = self.read(&request).await;
            TemplateResolution { request, template }
        }))
        .await
    }

    async fn read(&self, request: &TemplateRequest) -> Result<String> {
        let path = self.path_for(request).ok_or_else(|| {
            Error::io(format!(
                "No template directory for {}/{}",
                request.template_type, request.action
            ))
        })?;
        tokio::fs::read_to_string(&path)
            .await
            .io_context(format!("Failed to read template {}", path.display()))
    }
}
