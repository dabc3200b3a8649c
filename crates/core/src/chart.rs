//! Turns a [`ChartConfig`] into a [`Scene`], or into one of the placeholders
//! a chart shows instead of geometry.

use tracing::debug;

use crate::config::{ChartConfig, ChartKind};
use crate::layout::{ChartLayout, LegendSlot, Point, Size, TextMeasure};
use crate::legend::{LegendLayout, LegendState};
use crate::scene::{LegendHit, Mark, RectMark, Scene, TextAnchor, TextMark};
use crate::theme::Theme;
use crate::{bar, donut, treemap};

pub const CANNOT_RENDER_MESSAGE: &str = "Not enough room to render this chart";
pub const NO_DATA_MESSAGE: &str = "No data";
pub const LOADING_MESSAGE: &str = "Loading…";

/// Opacity of a legend swatch whose series is toggled off.
const HIDDEN_SWATCH_OPACITY: f32 = 0.25;

pub struct RenderContext<'a> {
    pub theme: &'a Theme,
    pub legend: &'a LegendState,
    pub measure: &'a dyn TextMeasure,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutcome {
    Scene(Scene),
    Loading,
    NoData,
    CannotRender,
}

impl RenderOutcome {
    pub fn scene(&self) -> Option<&Scene> {
        match self {
            RenderOutcome::Scene(s) => Some(s),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&'static str> {
        match self {
            RenderOutcome::Scene(_) => None,
            RenderOutcome::Loading => Some(LOADING_MESSAGE),
            RenderOutcome::NoData => Some(NO_DATA_MESSAGE),
            RenderOutcome::CannotRender => Some(CANNOT_RENDER_MESSAGE),
        }
    }

    /// A drawable scene; placeholders become a single centered message.
    pub fn into_scene(self, size: Size, theme: &Theme) -> Scene {
        let message = match self {
            RenderOutcome::Scene(s) => return s,
            other => other.message().unwrap_or_default(),
        };
        let mut scene = Scene::new(size, theme.colors.background, &theme.typography.font_family);
        scene.push(Mark::Text(TextMark {
            pos: Point::new(size.width / 2.0, size.height / 2.0),
            text: message.to_string(),
            size: theme.typography.label_size,
            color: theme.colors.text_muted,
            anchor: TextAnchor::Middle,
            bold: false,
        }));
        scene
    }
}

pub fn render_chart(config: &ChartConfig, ctx: &RenderContext<'_>) -> RenderOutcome {
    let size = config.size;
    if !size.fits_minimum() {
        debug!(width = size.width, height = size.height, "chart below minimum size");
        return RenderOutcome::CannotRender;
    }
    if config.loading {
        return RenderOutcome::Loading;
    }

    let theme = ctx.theme;
    let typography = &theme.typography;
    let keys = config.chart.legend_keys();
    let title_size = config.title_style.size.unwrap_or(typography.title_size);

    let legend = (config.legend.show && !keys.is_empty()).then(|| {
        let labels: Vec<&str> = keys.iter().map(String::as_str).collect();
        LegendLayout::measure(
            &labels,
            typography.label_size,
            config.legend.swatch_size,
            size.width - 16.0,
            ctx.measure,
        )
    });

    let Some(layout) = ChartLayout::compute(
        size,
        config.margin,
        config.title.as_ref().map(|_| title_size * 1.3),
        legend
            .as_ref()
            .map(|l| (l.size, LegendSlot::from(config.legend.position))),
    ) else {
        return RenderOutcome::CannotRender;
    };

    let mut scene = Scene::new(size, theme.colors.background, &typography.font_family);
    let drew = match &config.chart {
        ChartKind::Bar {
            data,
            group_keys,
            mode,
        } => bar::draw(data, group_keys, *mode, config, layout.plot, ctx, &mut scene),
        ChartKind::Donut { data, donut } => {
            donut::draw(data, donut, config, layout.plot, ctx, &mut scene)
        }
        ChartKind::TreeMap { root, treemap } => {
            treemap::draw(root, treemap, config, layout.plot, ctx, &mut scene)
        }
    };
    if !drew {
        return RenderOutcome::NoData;
    }

    if let (Some(title), Some(rect)) = (&config.title, layout.title) {
        let x = match config.title_style.align {
            TextAnchor::Start => rect.x,
            TextAnchor::Middle => rect.center().x,
            TextAnchor::End => rect.right(),
        };
        scene.push(Mark::Text(TextMark {
            pos: Point::new(x, rect.center().y),
            text: title.clone(),
            size: title_size,
            color: theme.colors.text,
            anchor: config.title_style.align,
            bold: true,
        }));
    }

    if let (Some(legend), Some(rect)) = (legend, layout.legend) {
        let legend = legend.translate(Point::new(rect.x, rect.y));
        for item in legend.items {
            let key = &keys[item.index];
            let hidden = ctx.legend.is_hidden(item.index);
            scene.push(Mark::Rect(RectMark {
                rect: item.swatch,
                fill: theme.series_color(item.index, &config.colors),
                opacity: if hidden {
                    HIDDEN_SWATCH_OPACITY
                } else {
                    ctx.legend.opacity_for(key)
                },
                corner_radius: 2.0,
                datum: None,
            }));
            scene.push(Mark::Text(TextMark {
                pos: item.label_at,
                text: key.clone(),
                size: typography.label_size,
                color: if hidden {
                    theme.colors.text_muted
                } else {
                    theme.colors.text
                },
                anchor: TextAnchor::Start,
                bold: false,
            }));
            scene.legend.push(LegendHit {
                index: item.index,
                key: key.clone(),
                bounds: item.bounds,
            });
        }
    }

    RenderOutcome::Scene(scene)
}
