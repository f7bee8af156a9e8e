use std::fs;
use std::path::Path;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use tempfile::TempDir;
use validator::Validate;

use crate::config::{
    PgTipsDashboardConfig,
    DEFAULT_DATASOURCE_TYPE,
    DEFAULT_DATASOURCE_UID,
    DEFAULT_LOG_ANALYTICS_RESOURCE,
};
use crate::errors::ConfigError;
use crate::query_builder::DataSourceRef;

const CUSTOM_RESOURCE: &str =
    "/subscriptions/00000000-0000-0000-0000-000000000000/resourceGroups/rg/components/y";

fn write_config(dir: &TempDir, content: &serde_json::Value) -> std::path::PathBuf {
    let path = dir.path().join("config.json");
    fs::write(&path, content.to_string()).unwrap();
    path
}

#[test]
fn default_config_holds_the_deployment_identifiers() {
    let config = PgTipsDashboardConfig::default();
    assert_eq!(
        config.datasource,
        DataSourceRef::new(DEFAULT_DATASOURCE_TYPE, DEFAULT_DATASOURCE_UID)
    );
    assert_eq!(config.log_analytics_resource, DEFAULT_LOG_ANALYTICS_RESOURCE);
    assert!(config.validate().is_ok());
}

#[test]
fn load_full_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        &json!({
            "datasource": { "type": "grafana-azure-monitor-datasource", "uid": "other" },
            "log_analytics_resource": CUSTOM_RESOURCE
        }),
    );

    let config = PgTipsDashboardConfig::load(&path).unwrap();
    assert_eq!(config.datasource.uid, "other");
    assert_eq!(config.log_analytics_resource, CUSTOM_RESOURCE);
}

#[test]
fn missing_fields_keep_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, &json!({ "log_analytics_resource": CUSTOM_RESOURCE }));

    let config = PgTipsDashboardConfig::load(&path).unwrap();
    assert_eq!(config.datasource, PgTipsDashboardConfig::default().datasource);
    assert_eq!(config.log_analytics_resource, CUSTOM_RESOURCE);
}

#[rstest]
#[case::unknown_field(json!({ "refresh": "5m" }))]
#[case::wrong_type(json!({ "log_analytics_resource": 7 }))]
#[case::partial_datasource(json!({ "datasource": { "uid": "only-uid" } }))]
fn malformed_config_is_rejected(#[case] content: serde_json::Value) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, &content);

    assert_matches!(PgTipsDashboardConfig::load(&path), Err(ConfigError::Parse { .. }));
}

#[rstest]
#[case::empty_uid(json!({ "datasource": { "type": "azure-monitor", "uid": "" } }))]
#[case::empty_type(json!({ "datasource": { "type": "", "uid": "uid" } }))]
#[case::not_a_resource_path(json!({ "log_analytics_resource": "monitor" }))]
fn invalid_config_is_rejected(#[case] content: serde_json::Value) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, &content);

    assert_matches!(PgTipsDashboardConfig::load(&path), Err(ConfigError::Validation(_)));
}

#[test]
fn missing_file_is_a_read_error() {
    let error = PgTipsDashboardConfig::load(Path::new("/no/such/config.json")).unwrap_err();
    assert_matches!(error, ConfigError::Read { .. });
    assert!(error.to_string().contains("/no/such/config.json"));
}
