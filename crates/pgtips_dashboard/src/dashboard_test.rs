use assert_matches::assert_matches;
use pgtips_infra_utils::dumping::to_canonical_json;
use pgtips_infra_utils::test_utils::{assert_json_eq, assert_json_keys_sorted};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::dashboard::{Dashboard, Row, Timezone, SCHEMA_VERSION};
use crate::errors::{DashboardError, ThresholdsError};
use crate::panel::{GridPos, Panel};

fn grid_positions(row: &Row) -> Vec<(u32, GridPos)> {
    row.panels().iter().map(|panel| (panel.id, panel.grid_pos)).collect()
}

#[test]
fn serialize_dashboard_metadata() {
    let dashboard = Dashboard::builder("Title")
        .uid("uid")
        .tags(["a", "b"])
        .refresh("5m")
        .time("now-1d", "now")
        .timezone(Timezone::Utc)
        .build()
        .unwrap();

    let expected = json!({
        "editable": true,
        "fiscalYearStartMonth": 0,
        "graphTooltip": 0,
        "links": [],
        "panels": [],
        "refresh": "5m",
        "schemaVersion": SCHEMA_VERSION,
        "tags": ["a", "b"],
        "templating": { "list": [] },
        "time": { "from": "now-1d", "to": "now" },
        "timezone": "utc",
        "title": "Title",
        "uid": "uid"
    });
    assert_json_eq(&dashboard, &expected, "Json Comparison failed".to_string());
}

#[test]
fn builder_defaults() {
    let value = serde_json::to_value(Dashboard::builder("Title").build().unwrap()).unwrap();

    assert_eq!(value["time"], json!({ "from": "now-6h", "to": "now" }));
    assert_eq!(value["timezone"], "browser");
    assert_eq!(value["tags"], json!([]));
    assert!(value.get("uid").is_none());
    assert!(value.get("refresh").is_none());
}

#[test]
fn layout_assigns_ids_and_wraps_panels() {
    let dashboard = Dashboard::builder("Layout")
        .with_row(
            Row::new("First", vec![Panel::stat("a"), Panel::stat("b")])
                .with_panel(Panel::time_series("c").with_grid_size(24, 6)),
        )
        .with_row(Row::new("Second", vec![Panel::stat("d").with_grid_size(8, 4)]))
        .build()
        .unwrap();

    let rows = dashboard.rows();
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[0].grid_pos, GridPos { h: 1, w: 24, x: 0, y: 0 });
    assert_eq!(
        grid_positions(&rows[0]),
        vec![
            (2, GridPos { h: 8, w: 12, x: 0, y: 1 }),
            (3, GridPos { h: 8, w: 12, x: 12, y: 1 }),
            (4, GridPos { h: 6, w: 24, x: 0, y: 9 }),
        ]
    );

    assert_eq!(rows[1].id, 5);
    assert_eq!(rows[1].grid_pos, GridPos { h: 1, w: 24, x: 0, y: 15 });
    assert_eq!(grid_positions(&rows[1]), vec![(6, GridPos { h: 4, w: 8, x: 0, y: 16 })]);
}

#[test]
fn collapsed_row_nests_its_panels() {
    let dashboard = Dashboard::builder("Collapsed")
        .with_row(Row::new("Row", vec![Panel::stat("a"), Panel::stat("b")]).collapsed(true))
        .build()
        .unwrap();

    let value = serde_json::to_value(&dashboard).unwrap();
    let panels = value["panels"].as_array().unwrap();
    assert_eq!(panels.len(), 1);
    assert_eq!(panels[0]["type"], "row");
    assert_eq!(panels[0]["collapsed"], true);
    let titles: Vec<&str> = panels[0]["panels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|panel| panel["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["a", "b"]);
}

#[test]
fn expanded_row_is_followed_by_its_panels() {
    let dashboard = Dashboard::builder("Expanded")
        .with_row(Row::new("Row", vec![Panel::stat("a"), Panel::stat("b")]))
        .build()
        .unwrap();

    let value = serde_json::to_value(&dashboard).unwrap();
    let panels = value["panels"].as_array().unwrap();
    let entries: Vec<(&str, &str)> = panels
        .iter()
        .map(|panel| (panel["type"].as_str().unwrap(), panel["title"].as_str().unwrap()))
        .collect();
    assert_eq!(entries, vec![("row", "Row"), ("stat", "a"), ("stat", "b")]);
    assert_eq!(panels[0]["panels"], json!([]));
    assert_eq!(panels[0]["collapsed"], false);
}

#[test]
fn non_increasing_thresholds_fail_the_build() {
    let result = Dashboard::builder("Thresholds")
        .with_row(Row::new(
            "Row",
            vec![Panel::stat("Descending").with_absolute_thresholds(vec![
                ("green", None),
                ("red", Some(80.0)),
                ("blue", Some(50.0)),
            ])],
        ))
        .build();

    assert_eq!(
        result,
        Err(DashboardError::InvalidThresholds {
            panel: "Descending".to_string(),
            source: ThresholdsError::NotIncreasing { index: 2, previous: 80.0, value: 50.0 },
        })
    );
}

#[test]
fn duplicate_tags_fail_the_build() {
    let result = Dashboard::builder("Tags").tags(["a", "b", "a"]).build();
    assert_eq!(result, Err(DashboardError::DuplicateTag("a".to_string())));
}

#[test]
fn empty_uid_fails_the_build() {
    assert_eq!(Dashboard::builder("Uid").uid("").build(), Err(DashboardError::EmptyUid));
}

#[test]
fn invalid_panel_fails_the_build() {
    let result = Dashboard::builder("Size")
        .with_row(Row::new("Row", vec![Panel::stat("Wide").with_grid_size(30, 8)]))
        .build();
    assert_matches!(result, Err(DashboardError::InvalidPanelSize { width: 30, .. }));
}

#[test]
fn canonical_dashboard_json_has_sorted_keys() {
    let dashboard = Dashboard::builder("Sorted")
        .uid("uid")
        .with_row(Row::new("Row", vec![Panel::stat("a").with_min(1.0)]))
        .build()
        .unwrap();

    let rendered = to_canonical_json(&dashboard).unwrap();
    let reparsed: Value = serde_json::from_str(&rendered).unwrap();
    assert_json_keys_sorted(&reparsed);
    assert!(rendered.starts_with("{\n  \"editable\": true,\n"));
}

#[test]
fn collapsed_row_takes_no_grid_space_for_its_panels() {
    let dashboard = Dashboard::builder("Collapsed rows")
        .with_row(Row::new("First", vec![Panel::stat("a"), Panel::stat("b")]).collapsed(true))
        .with_row(Row::new("Second", vec![Panel::stat("c")]))
        .build()
        .unwrap();

    let rows = dashboard.rows();
    assert_eq!(
        grid_positions(&rows[0]),
        vec![
            (2, GridPos { h: 8, w: 12, x: 0, y: 1 }),
            (3, GridPos { h: 8, w: 12, x: 12, y: 1 }),
        ]
    );
    assert_eq!(rows[1].id, 4);
    assert_eq!(rows[1].grid_pos, GridPos { h: 1, w: 24, x: 0, y: 1 });
    assert_eq!(grid_positions(&rows[1]), vec![(5, GridPos { h: 8, w: 12, x: 0, y: 2 })]);
}

#[test]
fn panels_beyond_the_grid_fail_the_build() {
    let result = Dashboard::builder("Tall")
        .with_row(Row::new("Row", vec![Panel::stat("tall").with_grid_size(12, u32::MAX)]))
        .build();
    assert_eq!(result, Err(DashboardError::GridOverflow { row: "Row".to_string() }));

    let result = Dashboard::builder("Wrapped")
        .with_row(
            Row::new("Row", vec![Panel::stat("a").with_grid_size(24, u32::MAX)])
                .with_panel(Panel::stat("b"))
                .collapsed(true),
        )
        .build();
    assert_eq!(result, Err(DashboardError::GridOverflow { row: "Row".to_string() }));
}
