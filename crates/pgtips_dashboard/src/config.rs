use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationError};

use crate::errors::ConfigError;
use crate::query_builder::DataSourceRef;

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_DATASOURCE_TYPE: &str = "grafana-azure-monitor-datasource";
pub const DEFAULT_DATASOURCE_UID: &str = "fp9e08q4z";
pub const DEFAULT_LOG_ANALYTICS_RESOURCE: &str = concat!(
    "/subscriptions/64865690-933f-4328-9a41-6b2f546777af/resourceGroups/monitor/providers/",
    "Microsoft.Insights/components/monitor"
);
const RESOURCE_PATH_PREFIX: &str = "/subscriptions/";

/// Deployment specific identifiers embedded in the generated dashboard. Every field is optional
/// in a config file; missing fields keep their defaults.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Validate)]
#[serde(default, deny_unknown_fields)]
pub struct PgTipsDashboardConfig {
    /// The Azure Monitor datasource every query runs against.
    #[validate(nested)]
    pub datasource: DataSourceRef,
    /// The Application Insights resource the queries are scoped to.
    #[validate(custom(function = "validate_resource_path"))]
    pub log_analytics_resource: String,
}

impl Default for PgTipsDashboardConfig {
    fn default() -> Self {
        Self {
            datasource: DataSourceRef::new(DEFAULT_DATASOURCE_TYPE, DEFAULT_DATASOURCE_UID),
            log_analytics_resource: DEFAULT_LOG_ANALYTICS_RESOURCE.to_string(),
        }
    }
}

impl PgTipsDashboardConfig {
    /// Loads a JSON config file and validates it.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        info!("Loaded config from {}.", path.display());
        Ok(config)
    }
}

fn validate_resource_path(resource: &str) -> Result<(), ValidationError> {
    if resource.starts_with(RESOURCE_PATH_PREFIX) {
        return Ok(());
    }
    let mut error = ValidationError::new("invalid_resource_path");
    error.message = Some(format!("Resource path must start with {RESOURCE_PATH_PREFIX}.").into());
    Err(error)
}
