use evas_domain::error::Result;
use evas_infrastructure::error_ext::ErrorContext;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Typed settings from a resolve configuration; `null` means defaults
pub(crate) fn from_configuration<T>(repository: &str, configuration: &Value) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if configuration.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(configuration.clone())
        .config_context(format!("Invalid {repository} configuration"))
}
