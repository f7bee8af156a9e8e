use indoc::indoc;

use crate::config::PgTipsDashboardConfig;
use crate::dashboard::Row;
use crate::panel::{ColorMode, GraphMode, Panel, TextMode};
use crate::query_builder::{build_azure_query, with_stage};

const NORTH_STAR_ROW_TITLE: &str = "North Star";

// The latest daily `monitoredentities.report` event of every user monitoring at least one
// PostgreSQL instance, excluding developer mode and the current, incomplete, day.
const DAILY_POSTGRES_REPORTS: &str = indoc! {r#"
    customEvents
    | where name == "monitoredentities.report"
    | where customDimensions["DeveloperMode"] != true
    | where timestamp < endofday(ago(1d))
    | summarize arg_max(timestamp, numPostgresInstances=toint(customDimensions["postgresInstances"])) by user_Id, bin(timestamp, 1d)
    | where numPostgresInstances > 0
"#};

const INSTANCES_AND_MONITORS_PER_DAY: &str = indoc! {"
    | summarize
        total_postgres_instances=sum(numPostgresInstances),
        base_monitor_count=dcount(user_Id)
        by bin(timestamp, 1d)
"};

const INSTANCES_PER_DAY: &str = indoc! {"
    | summarize
        sum(numPostgresInstances)
        by day=bin(timestamp, 1d)
    | order by day
"};

fn get_panel_monitored_instances_and_base_monitors(config: &PgTipsDashboardConfig) -> Panel {
    Panel::time_series(
        "Number of monitored PostgreSQL instances and base monitors with a PostgreSQL instance",
    )
    .with_min(0.0)
    .with_datasource(&config.datasource)
    .with_target(build_azure_query(
        &config.datasource,
        &config.log_analytics_resource,
        with_stage(DAILY_POSTGRES_REPORTS, INSTANCES_AND_MONITORS_PER_DAY),
    ))
}

fn get_panel_monitored_instances(config: &PgTipsDashboardConfig) -> Panel {
    Panel::stat("Monitored PostgreSQL Instances")
        .with_datasource(&config.datasource)
        .with_target(build_azure_query(
            &config.datasource,
            &config.log_analytics_resource,
            with_stage(DAILY_POSTGRES_REPORTS, INSTANCES_PER_DAY),
        ))
        .with_color_mode(ColorMode::Value)
        .with_graph_mode(GraphMode::None)
        .with_text_mode(TextMode::Value)
        .with_absolute_thresholds(vec![("green", None), ("red", Some(80.0))])
}

pub(crate) fn get_north_star_row(config: &PgTipsDashboardConfig) -> Row {
    Row::new(
        NORTH_STAR_ROW_TITLE,
        vec![
            get_panel_monitored_instances_and_base_monitors(config),
            get_panel_monitored_instances(config),
        ],
    )
    .collapsed(true)
}
