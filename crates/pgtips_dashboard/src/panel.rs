use std::collections::HashSet;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::errors::{DashboardError, ThresholdsError};
use crate::query_builder::{AzureMonitorQuery, DataSourceRef};

#[cfg(test)]
#[path = "panel_test.rs"]
mod panel_test;

/// Number of columns in the Grafana layout grid.
pub const GRID_WIDTH: u32 = 24;
pub(crate) const DEFAULT_PANEL_WIDTH: u32 = 12;
pub(crate) const DEFAULT_PANEL_HEIGHT: u32 = 8;

/// Grafana panel types.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum PanelType {
    #[serde(rename = "stat")]
    Stat,
    #[serde(rename = "timeseries")]
    TimeSeries,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum Unit {
    #[serde(rename = "short")]
    Short,
    #[serde(rename = "bytes")]
    Bytes,
    #[serde(rename = "percentunit")]
    PercentUnit,
    #[serde(rename = "s")]
    Seconds,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    Value,
    Background,
    None,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GraphMode {
    Area,
    None,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    Auto,
    Value,
    ValueAndName,
    Name,
    None,
}

/// Display options of a stat panel. Ignored for other panel types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatOptions {
    pub color_mode: ColorMode,
    pub graph_mode: GraphMode,
    pub text_mode: TextMode,
}

impl Default for StatOptions {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Value,
            graph_mode: GraphMode::Area,
            text_mode: TextMode::Auto,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMode {
    Absolute,
    Percentage,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ThresholdStep {
    pub color: String,
    // `None` is the base step, below every breakpoint.
    pub value: Option<f64>,
}

/// Coloring rule of a panel: the base color followed by ascending breakpoints.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Thresholds {
    pub mode: ThresholdMode,
    pub steps: Vec<ThresholdStep>,
}

impl Thresholds {
    pub fn new(mode: ThresholdMode, steps: Vec<(&str, Option<f64>)>) -> Self {
        let steps = steps
            .into_iter()
            .map(|(color, value)| ThresholdStep { color: color.to_string(), value })
            .collect();
        Self { mode, steps }
    }

    /// Checks that there is at least one step, that only the first step is unbounded, and that
    /// the bounded values are finite and strictly increasing.
    pub fn validate(&self) -> Result<(), ThresholdsError> {
        if self.steps.is_empty() {
            return Err(ThresholdsError::NoSteps);
        }
        let mut previous: Option<f64> = None;
        for (index, step) in self.steps.iter().enumerate() {
            let Some(value) = step.value else {
                if index > 0 {
                    return Err(ThresholdsError::UnboundedStepNotFirst { index });
                }
                continue;
            };
            if !value.is_finite() {
                return Err(ThresholdsError::NonFiniteValue { index, value });
            }
            if let Some(previous) = previous {
                if value <= previous {
                    return Err(ThresholdsError::NotIncreasing { index, previous, value });
                }
            }
            previous = Some(value);
        }
        Ok(())
    }
}

/// Position and size of a panel on the dashboard grid.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
pub struct GridPos {
    pub h: u32,
    pub w: u32,
    pub x: u32,
    pub y: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Panel {
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) panel_type: PanelType,
    pub(crate) datasource: Option<DataSourceRef>,
    pub(crate) targets: Vec<AzureMonitorQuery>,
    pub(crate) min: Option<f64>,
    pub(crate) unit: Option<Unit>,
    pub(crate) thresholds: Option<Thresholds>,
    pub(crate) stat_options: StatOptions,
    pub(crate) width: u32,
    pub(crate) height: u32,
    // Assigned when the dashboard is built.
    pub(crate) id: u32,
    pub(crate) grid_pos: GridPos,
}

impl Panel {
    pub fn new(title: impl ToString, panel_type: PanelType) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            panel_type,
            datasource: None,
            targets: vec![],
            min: None,
            unit: None,
            thresholds: None,
            stat_options: StatOptions::default(),
            width: DEFAULT_PANEL_WIDTH,
            height: DEFAULT_PANEL_HEIGHT,
            id: 0,
            grid_pos: GridPos::default(),
        }
    }

    pub fn time_series(title: impl ToString) -> Self {
        Self::new(title, PanelType::TimeSeries)
    }

    pub fn stat(title: impl ToString) -> Self {
        Self::new(title, PanelType::Stat)
    }

    pub fn with_description(mut self, description: impl ToString) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_datasource(mut self, datasource: &DataSourceRef) -> Self {
        self.datasource = Some(datasource.clone());
        self
    }

    pub fn with_target(mut self, target: AzureMonitorQuery) -> Self {
        self.targets.push(target);
        self
    }

    /// Sets the lower bound of the value axis.
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn with_absolute_thresholds(self, steps: Vec<(&str, Option<f64>)>) -> Self {
        self.with_thresholds(Thresholds::new(ThresholdMode::Absolute, steps))
    }

    pub fn with_color_mode(mut self, color_mode: ColorMode) -> Self {
        self.stat_options.color_mode = color_mode;
        self
    }

    pub fn with_graph_mode(mut self, graph_mode: GraphMode) -> Self {
        self.stat_options.graph_mode = graph_mode;
        self
    }

    pub fn with_text_mode(mut self, text_mode: TextMode) -> Self {
        self.stat_options.text_mode = text_mode;
        self
    }

    /// Overrides the default grid size of 12 columns by 8 rows.
    pub fn with_grid_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), DashboardError> {
        if self.width == 0 || self.width > GRID_WIDTH || self.height == 0 {
            return Err(DashboardError::InvalidPanelSize {
                panel: self.title.clone(),
                width: self.width,
                height: self.height,
                max_width: GRID_WIDTH,
            });
        }

        if let Some(min) = self.min.filter(|min| !min.is_finite()) {
            return Err(DashboardError::NonFiniteMin { panel: self.title.clone(), value: min });
        }

        let mut ref_ids = HashSet::new();
        for target in &self.targets {
            if !ref_ids.insert(target.ref_id.as_str()) {
                return Err(DashboardError::DuplicateRefId {
                    panel: self.title.clone(),
                    ref_id: target.ref_id.clone(),
                });
            }
        }

        if let Some(thresholds) = &self.thresholds {
            thresholds.validate().map_err(|source| DashboardError::InvalidThresholds {
                panel: self.title.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn field_config(&self) -> FieldConfig<'_> {
        FieldConfig {
            defaults: FieldDefaults {
                min: self.min,
                unit: self.unit,
                thresholds: self.thresholds.as_ref(),
            },
            overrides: vec![],
        }
    }

    fn options(&self) -> serde_json::Value {
        match self.panel_type {
            PanelType::Stat => serde_json::json!({
                "colorMode": self.stat_options.color_mode,
                "graphMode": self.stat_options.graph_mode,
                "justifyMode": "auto",
                "orientation": "auto",
                "reduceOptions": {
                    "calcs": ["lastNotNull"],
                    "fields": "",
                    "values": false
                },
                "textMode": self.stat_options.text_mode,
            }),
            PanelType::TimeSeries => serde_json::json!({
                "legend": {
                    "calcs": [],
                    "displayMode": "list",
                    "placement": "bottom",
                    "showLegend": true
                },
                "tooltip": {
                    "mode": "single",
                    "sort": "none"
                },
            }),
        }
    }
}

#[derive(Serialize)]
struct FieldConfig<'a> {
    defaults: FieldDefaults<'a>,
    overrides: Vec<serde_json::Value>,
}

#[derive(Serialize)]
struct FieldDefaults<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<Unit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thresholds: Option<&'a Thresholds>,
}

// Custom Serialize implementation for Panel, nesting the flat builder fields the way the Grafana
// panel schema expects.
impl Serialize for Panel {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("Panel", 9)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", &self.panel_type)?;
        state.serialize_field("title", &self.title)?;
        match &self.description {
            Some(description) => state.serialize_field("description", description)?,
            None => state.skip_field("description")?,
        }
        match &self.datasource {
            Some(datasource) => state.serialize_field("datasource", datasource)?,
            None => state.skip_field("datasource")?,
        }
        state.serialize_field("gridPos", &self.grid_pos)?;
        state.serialize_field("targets", &self.targets)?;
        state.serialize_field("fieldConfig", &self.field_config())?;
        state.serialize_field("options", &self.options())?;
        state.end()
    }
}
