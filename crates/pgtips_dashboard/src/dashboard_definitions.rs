use tracing::info;

use crate::config::PgTipsDashboardConfig;
use crate::dashboard::{Dashboard, Timezone};
use crate::errors::DashboardError;
use crate::panels::north_star::get_north_star_row;

#[cfg(test)]
#[path = "dashboard_definitions_test.rs"]
mod dashboard_definitions_test;

pub const DEV_JSON_PATH: &str = "crates/pgtips_dashboard/resources/pgtips_dashboard.json";

pub const DASHBOARD_TITLE: &str = "[TEST] pgTips";
pub const DASHBOARD_UID: &str = "estatemanagent-pgtips-main";
pub const DASHBOARD_TAGS: [&str; 4] = ["generated", "estate-management", "sql-monitor", "pgtips"];
pub const REFRESH_INTERVAL: &str = "1m";
pub const TIME_RANGE_FROM: &str = "now-90d";
pub const TIME_RANGE_TO: &str = "now";

pub fn get_pgtips_dashboard(config: &PgTipsDashboardConfig) -> Result<Dashboard, DashboardError> {
    info!(datasource_uid = %config.datasource.uid, "Building the pgTips dashboard.");
    Dashboard::builder(DASHBOARD_TITLE)
        .uid(DASHBOARD_UID)
        .tags(DASHBOARD_TAGS)
        .refresh(REFRESH_INTERVAL)
        .time(TIME_RANGE_FROM, TIME_RANGE_TO)
        .timezone(Timezone::Browser)
        .with_row(get_north_star_row(config))
        .build()
}
