pub mod bar;
pub mod chart;
pub mod config;
pub mod demo;
pub mod donut;
pub mod error;
pub mod export;
pub mod human;
pub mod layout;
pub mod legend;
pub mod logging;
pub mod mock;
pub mod model;
pub mod reorder;
pub mod scale;
pub mod scene;
pub mod search;
pub mod theme;
pub mod tooltip;
pub mod transform;
pub mod treemap;

pub use chart::{render_chart, RenderContext, RenderOutcome};
pub use config::{ChartConfig, ChartKind, ValueFormat};
pub use error::{ChartError, Result};
pub use layout::{ApproxTextMeasure, Point, Rect, Size, TextMeasure};
pub use legend::LegendState;
pub use model::*;
pub use reorder::{CardId, DragState, ReorderList};
pub use scene::{Mark, Scene};
pub use theme::{Color, Theme, ThemeMode};
