use serde::{Deserialize, Serialize};
use validator::Validate;

#[cfg(test)]
#[path = "query_builder_test.rs"]
mod query_builder_test;

/// Correlation id given to every query built here. Each panel carries a single query, so one id
/// suffices.
pub const DEFAULT_REF_ID: &str = "A";
pub const AZURE_LOG_ANALYTICS_QUERY_TYPE: &str = "Azure Log Analytics";

/// Selects the datasource a query executes against.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Validate)]
pub struct DataSourceRef {
    #[serde(rename = "type")]
    #[validate(length(min = 1))]
    pub datasource_type: String,
    #[validate(length(min = 1))]
    pub uid: String,
}

impl DataSourceRef {
    pub fn new(datasource_type: impl ToString, uid: impl ToString) -> Self {
        Self { datasource_type: datasource_type.to_string(), uid: uid.to_string() }
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResultFormat {
    Table,
    TimeSeries,
}

/// The Log Analytics part of an Azure Monitor query.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AzureLogsQuery {
    pub query: String,
    pub resources: Vec<String>,
    pub result_format: ResultFormat,
}

/// A panel target of the Azure Monitor datasource.
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AzureMonitorQuery {
    pub datasource: DataSourceRef,
    pub ref_id: String,
    pub query_type: String,
    pub azure_log_analytics: AzureLogsQuery,
}

impl AzureMonitorQuery {
    pub fn with_ref_id(mut self, ref_id: impl ToString) -> Self {
        self.ref_id = ref_id.to_string();
        self
    }
}

/// Builds a Log Analytics time-series query over `resource`. The query text is passed through
/// as is.
pub fn build_azure_query(
    datasource: &DataSourceRef,
    resource: &str,
    query: impl ToString,
) -> AzureMonitorQuery {
    AzureMonitorQuery {
        datasource: datasource.clone(),
        ref_id: DEFAULT_REF_ID.to_string(),
        query_type: AZURE_LOG_ANALYTICS_QUERY_TYPE.to_string(),
        azure_log_analytics: AzureLogsQuery {
            query: query.to_string(),
            resources: vec![resource.to_string()],
            result_format: ResultFormat::TimeSeries,
        },
    }
}

/// Appends a pipeline stage to a Kusto query.
pub(crate) fn with_stage(base: &str, stage: &str) -> String {
    format!("{base}{stage}")
}
