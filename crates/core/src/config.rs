//! Typed chart configuration. Every recognized option is a field; unknown
//! fields in JSON input are rejected rather than silently ignored.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};
use crate::layout::{LegendSlot, Margin, Size};
use crate::model::{ChartMode, DataPoint, SliceDatum, TreeMapNode};
use crate::scale::MAX_TICK_COUNT;
use crate::scene::TextAnchor;
use crate::theme::Color;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    #[default]
    Compact,
    Plain,
    Bytes,
    Percent,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegendPosition {
    Top,
    #[default]
    Bottom,
}

impl From<LegendPosition> for LegendSlot {
    fn from(p: LegendPosition) -> Self {
        match p {
            LegendPosition::Top => LegendSlot::Top,
            LegendPosition::Bottom => LegendSlot::Bottom,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LegendConfig {
    pub show: bool,
    pub position: LegendPosition,
    pub swatch_size: f32,
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            show: true,
            position: LegendPosition::Bottom,
            swatch_size: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TooltipConfig {
    pub show: bool,
    pub format: ValueFormat,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            show: true,
            format: ValueFormat::Compact,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TitleConfig {
    pub align: TextAnchor,
    /// Overrides the theme's title size.
    pub size: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisConfig {
    pub show_x_ticks: bool,
    pub show_y_ticks: bool,
    pub show_grid: bool,
    pub tick_count: usize,
    pub format: ValueFormat,
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            show_x_ticks: true,
            show_y_ticks: true,
            show_grid: true,
            tick_count: 5,
            format: ValueFormat::Compact,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DonutConfig {
    /// Hole radius as a fraction of the outer radius; 0 draws a pie.
    pub inner_radius_ratio: f32,
    /// Gap between slices, in radians.
    pub pad_angle: f32,
    pub show_labels: bool,
    pub show_total: bool,
}

impl Default for DonutConfig {
    fn default() -> Self {
        Self {
            inner_radius_ratio: 0.6,
            pad_angle: 0.01,
            show_labels: true,
            show_total: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeMapConfig {
    /// Levels below the root that get their own rectangles.
    pub max_depth: usize,
    pub padding: f32,
    pub show_labels: bool,
}

impl Default for TreeMapConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            padding: 2.0,
            show_labels: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartKind {
    Bar {
        data: Vec<DataPoint>,
        group_keys: Vec<String>,
        #[serde(default)]
        mode: ChartMode,
    },
    Donut {
        data: Vec<SliceDatum>,
        #[serde(default)]
        donut: DonutConfig,
    },
    #[serde(rename = "treemap")]
    TreeMap {
        root: TreeMapNode,
        #[serde(default)]
        treemap: TreeMapConfig,
    },
}

impl ChartKind {
    /// Labels the legend toggles, in their original order.
    pub fn legend_keys(&self) -> Vec<String> {
        match self {
            ChartKind::Bar { group_keys, .. } => group_keys.clone(),
            ChartKind::Donut { data, .. } => data.iter().map(|s| s.label.clone()).collect(),
            ChartKind::TreeMap { root, .. } => root.children.iter().map(|c| c.name.clone()).collect(),
        }
    }
}

fn default_size() -> Size {
    Size::new(640.0, 400.0)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartConfig {
    #[serde(default)]
    pub title: Option<String>,
    pub chart: ChartKind,
    #[serde(default = "default_size")]
    pub size: Size,
    #[serde(default)]
    pub margin: Margin,
    /// Replaces the theme's series palette when non-empty.
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub loading: bool,
    #[serde(default)]
    pub legend: LegendConfig,
    #[serde(default)]
    pub tooltip: TooltipConfig,
    #[serde(default)]
    pub title_style: TitleConfig,
    #[serde(default)]
    pub axes: AxisConfig,
}

impl ChartConfig {
    pub fn new(chart: ChartKind) -> Self {
        Self {
            title: None,
            chart,
            size: default_size(),
            margin: Margin::default(),
            colors: Vec::new(),
            loading: false,
            legend: LegendConfig::default(),
            tooltip: TooltipConfig::default(),
            title_style: TitleConfig::default(),
            axes: AxisConfig::default(),
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn bar(data: Vec<DataPoint>, group_keys: Vec<String>, mode: ChartMode) -> Self {
        Self::new(ChartKind::Bar {
            data,
            group_keys,
            mode,
        })
    }

    pub fn donut(data: Vec<SliceDatum>) -> Self {
        Self::new(ChartKind::Donut {
            data,
            donut: DonutConfig::default(),
        })
    }

    pub fn treemap(root: TreeMapNode) -> Self {
        Self::new(ChartKind::TreeMap {
            root,
            treemap: TreeMapConfig::default(),
        })
    }

    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ChartError::InvalidConfig(msg));
        if !(self.size.width.is_finite() && self.size.height.is_finite())
            || self.size.width < 0.0
            || self.size.height < 0.0
        {
            return invalid(format!(
                "size must be finite and non-negative, got {}x{}",
                self.size.width, self.size.height
            ));
        }
        if !(1..=MAX_TICK_COUNT).contains(&self.axes.tick_count) {
            return invalid(format!(
                "axes.tick_count must be between 1 and {MAX_TICK_COUNT}, got {}",
                self.axes.tick_count
            ));
        }
        if self.legend.swatch_size <= 0.0 {
            return invalid("legend.swatch_size must be positive".into());
        }
        match &self.chart {
            ChartKind::Donut { donut, .. } => {
                if !(0.0..1.0).contains(&donut.inner_radius_ratio) {
                    return invalid("donut.inner_radius_ratio must be in [0, 1)".into());
                }
                if donut.pad_angle < 0.0 {
                    return invalid("donut.pad_angle must not be negative".into());
                }
            }
            ChartKind::TreeMap { treemap, .. } => {
                if treemap.max_depth == 0 {
                    return invalid("treemap.max_depth must be at least 1".into());
                }
            }
            ChartKind::Bar { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_bar_config_with_defaults() {
        let json = r#"{
            "title": "Revenue",
            "chart": {
                "kind": "bar",
                "mode": "stacked",
                "group_keys": ["a", "b"],
                "data": [{"label": "Jan", "data": {"a": 10, "b": 20}}]
            }
        }"#;
        let config = ChartConfig::from_json_str(json).unwrap();
        assert_eq!(config.title.as_deref(), Some("Revenue"));
        assert_eq!(config.size, Size::new(640.0, 400.0));
        assert!(config.legend.show);
        assert!(config.axes.show_grid);
        match &config.chart {
            ChartKind::Bar { mode, group_keys, .. } => {
                assert_eq!(*mode, ChartMode::Stacked);
                assert_eq!(group_keys.len(), 2);
            }
            other => panic!("unexpected chart {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_fields() {
        let json = r#"{"chart": {"kind": "donut", "data": []}, "colour": "red"}"#;
        assert!(matches!(
            ChartConfig::from_json_str(json),
            Err(ChartError::Json(_))
        ));
        let json = r#"{"chart": {"kind": "donut", "data": []}, "axes": {"show_ticks": false}}"#;
        assert!(ChartConfig::from_json_str(json).is_err());
    }

    #[test]
    fn validates_ranges() {
        let json = r#"{"chart": {"kind": "donut", "data": [], "donut": {"inner_radius_ratio": 1.5}}}"#;
        assert!(matches!(
            ChartConfig::from_json_str(json),
            Err(ChartError::InvalidConfig(_))
        ));
        let mut config = ChartConfig::donut(vec![]);
        config.size = Size::new(f32::NAN, 10.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn treemap_kind_tag_round_trips() {
        let json = r#"{"chart": {"kind": "treemap", "root": {"id": 0, "name": "/", "children": [
            {"id": 1, "name": "src", "value": 3.0}
        ]}}}"#;
        let config = ChartConfig::from_json_str(json).unwrap();
        assert!(matches!(config.chart, ChartKind::TreeMap { .. }));
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["chart"]["kind"], "treemap");
        assert!(ChartConfig::from_json_str(&value.to_string()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_tick_counts() {
        for count in [0u64, 101, 1_000_000_000_000] {
            let json = format!(
                r#"{{"chart": {{"kind": "donut", "data": []}}, "axes": {{"tick_count": {count}}}}}"#
            );
            assert!(
                matches!(ChartConfig::from_json_str(&json), Err(ChartError::InvalidConfig(_))),
                "{count}"
            );
        }
        let mut config = ChartConfig::donut(vec![]);
        config.axes.tick_count = MAX_TICK_COUNT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn legend_keys_per_kind() {
        let tree = TreeMapNode::branch(
            0,
            "root",
            vec![TreeMapNode::leaf(1, "src", 3.0), TreeMapNode::leaf(2, "docs", 1.0)],
        );
        assert_eq!(ChartConfig::treemap(tree).chart.legend_keys(), vec!["src", "docs"]);
        let donut = ChartConfig::donut(vec![SliceDatum::new("x", 1.0)]);
        assert_eq!(donut.chart.legend_keys(), vec!["x"]);
    }
}
