use std::collections::HashSet;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::errors::DashboardError;
use crate::panel::{GridPos, Panel, GRID_WIDTH};

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod dashboard_test;

/// Dashboard JSON model version understood by the targeted Grafana releases.
pub const SCHEMA_VERSION: u32 = 39;
const ROW_HEIGHT: u32 = 1;
const DEFAULT_TIME_FROM: &str = "now-6h";
const DEFAULT_TIME_TO: &str = "now";

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Timezone {
    /// Render times in the viewer's browser timezone.
    Browser,
    Utc,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

impl TimeRange {
    pub fn new(from: impl ToString, to: impl ToString) -> Self {
        Self { from: from.to_string(), to: to.to_string() }
    }
}

/// A collapsible group of panels. Affects layout only.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub(crate) title: String,
    pub(crate) collapsed: bool,
    pub(crate) panels: Vec<Panel>,
    // Assigned when the dashboard is built.
    pub(crate) id: u32,
    pub(crate) grid_pos: GridPos,
}

impl Row {
    pub fn new(title: impl ToString, panels: Vec<Panel>) -> Self {
        Self {
            title: title.to_string(),
            collapsed: false,
            panels,
            id: 0,
            grid_pos: GridPos::default(),
        }
    }

    pub fn collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.push(panel);
        self
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Places the row header on line `y` and flows its panels left to right below it, wrapping
    /// whenever a panel does not fit in the remaining columns. Returns the first free line; the
    /// panels of a collapsed row take no grid space.
    fn lay_out(&mut self, next_id: &mut u32, y: u32) -> Result<u32, DashboardError> {
        self.id = take_id(next_id);
        self.grid_pos = GridPos { h: ROW_HEIGHT, w: GRID_WIDTH, x: 0, y };
        let panels_y = grid_add(&self.title, y, ROW_HEIGHT)?;

        let mut line_y = panels_y;
        let mut x = 0;
        let mut line_height = 0;
        for panel in self.panels.iter_mut() {
            // Panel widths are validated to be at most GRID_WIDTH.
            if x + panel.width > GRID_WIDTH {
                line_y = grid_add(&self.title, line_y, line_height)?;
                x = 0;
                line_height = 0;
            }
            panel.id = take_id(next_id);
            panel.grid_pos = GridPos { h: panel.height, w: panel.width, x, y: line_y };
            x += panel.width;
            line_height = line_height.max(panel.height);
        }

        if self.collapsed {
            return Ok(panels_y);
        }
        grid_add(&self.title, line_y, line_height)
    }
}

fn grid_add(row: &str, y: u32, height: u32) -> Result<u32, DashboardError> {
    y.checked_add(height).ok_or_else(|| DashboardError::GridOverflow { row: row.to_string() })
}

fn take_id(next_id: &mut u32) -> u32 {
    let id = *next_id;
    *next_id += 1;
    id
}

// Custom Serialize implementation for Row. Grafana nests the panels of a collapsed row inside it,
// while the panels of an expanded row follow it at the top level of the dashboard.
impl Serialize for Row {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let nested_panels: &[Panel] = if self.collapsed { &self.panels } else { &[] };

        let mut state = serializer.serialize_struct("Row", 6)?;
        state.serialize_field("collapsed", &self.collapsed)?;
        state.serialize_field("gridPos", &self.grid_pos)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("panels", nested_panels)?;
        state.serialize_field("title", &self.title)?;
        state.serialize_field("type", "row")?;
        state.end()
    }
}

/// An entry of the dashboard's top level `panels` list.
#[derive(Serialize)]
#[serde(untagged)]
enum DashboardPanel<'a> {
    Row(&'a Row),
    Panel(&'a Panel),
}

/// A validated dashboard with its layout assigned. Created through [`DashboardBuilder`].
#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    title: String,
    uid: Option<String>,
    tags: Vec<String>,
    refresh: Option<String>,
    time: TimeRange,
    timezone: Timezone,
    rows: Vec<Row>,
}

impl Dashboard {
    pub fn builder(title: impl ToString) -> DashboardBuilder {
        DashboardBuilder {
            title: title.to_string(),
            uid: None,
            tags: vec![],
            refresh: None,
            time: TimeRange::new(DEFAULT_TIME_FROM, DEFAULT_TIME_TO),
            timezone: Timezone::Browser,
            rows: vec![],
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn top_level_panels(&self) -> Vec<DashboardPanel<'_>> {
        let mut panels = vec![];
        for row in &self.rows {
            panels.push(DashboardPanel::Row(row));
            if !row.collapsed {
                panels.extend(row.panels.iter().map(DashboardPanel::Panel));
            }
        }
        panels
    }
}

// Custom Serialize implementation for Dashboard, following the Grafana dashboard JSON model.
impl Serialize for Dashboard {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Dashboard", 13)?;
        state.serialize_field("editable", &true)?;
        state.serialize_field("fiscalYearStartMonth", &0)?;
        state.serialize_field("graphTooltip", &0)?;
        state.serialize_field("links", &serde_json::json!([]))?;
        state.serialize_field("panels", &self.top_level_panels())?;
        match &self.refresh {
            Some(refresh) => state.serialize_field("refresh", refresh)?,
            None => state.skip_field("refresh")?,
        }
        state.serialize_field("schemaVersion", &SCHEMA_VERSION)?;
        state.serialize_field("tags", &self.tags)?;
        state.serialize_field("templating", &serde_json::json!({ "list": [] }))?;
        state.serialize_field("time", &self.time)?;
        state.serialize_field("timezone", &self.timezone)?;
        state.serialize_field("title", &self.title)?;
        match &self.uid {
            Some(uid) => state.serialize_field("uid", uid)?,
            None => state.skip_field("uid")?,
        }
        state.end()
    }
}

#[derive(Clone, Debug)]
pub struct DashboardBuilder {
    title: String,
    uid: Option<String>,
    tags: Vec<String>,
    refresh: Option<String>,
    time: TimeRange,
    timezone: Timezone,
    rows: Vec<Row>,
}

impl DashboardBuilder {
    pub fn uid(mut self, uid: impl ToString) -> Self {
        self.uid = Some(uid.to_string());
        self
    }

    pub fn tags<T: ToString>(mut self, tags: impl IntoIterator<Item = T>) -> Self {
        self.tags = tags.into_iter().map(|tag| tag.to_string()).collect();
        self
    }

    /// Sets the auto-refresh interval, e.g. `"1m"`.
    pub fn refresh(mut self, refresh: impl ToString) -> Self {
        self.refresh = Some(refresh.to_string());
        self
    }

    /// Sets the time range using Grafana's relative syntax, e.g. `("now-90d", "now")`.
    pub fn time(mut self, from: impl ToString, to: impl ToString) -> Self {
        self.time = TimeRange::new(from, to);
        self
    }

    pub fn timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_row(mut self, row: Row) -> Self {
        self.rows.push(row);
        self
    }

    /// Validates the dashboard and assigns panel ids and grid positions.
    pub fn build(self) -> Result<Dashboard, DashboardError> {
        if self.uid.as_deref().is_some_and(str::is_empty) {
            return Err(DashboardError::EmptyUid);
        }

        let mut seen_tags = HashSet::new();
        for tag in &self.tags {
            if !seen_tags.insert(tag.as_str()) {
                return Err(DashboardError::DuplicateTag(tag.clone()));
            }
        }

        for panel in self.rows.iter().flat_map(|row| row.panels.iter()) {
            panel.validate()?;
        }

        let mut rows = self.rows;
        let mut next_id = 1;
        let mut y = 0;
        for row in rows.iter_mut() {
            y = row.lay_out(&mut next_id, y)?;
        }
        debug!(title = %self.title, n_rows = rows.len(), "Built dashboard.");

        Ok(Dashboard {
            title: self.title,
            uid: self.uid,
            tags: self.tags,
            refresh: self.refresh,
            time: self.time,
            timezone: self.timezone,
            rows,
        })
    }
}
