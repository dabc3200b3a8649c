//! Grouped and stacked bar charts.

use std::collections::HashMap;

use crate::chart::RenderContext;
use crate::config::ChartConfig;
use crate::error::Result;
use crate::human::format_value;
use crate::layout::{truncate_to_width, Point, Rect};
use crate::model::{ChartMode, DataPoint, TooltipDatum};
use crate::scale::{BandScale, LinearScale};
use crate::scene::{Mark, RectMark, RuleMark, Scene, TextAnchor, TextMark};
use crate::transform::{transform_or_empty, SeriesSet};

/// Value axis headroom so the tallest bar stops short of the plot's top edge.
pub const HEADROOM: f32 = 1.2;

/// Pixel math runs in f32; values beyond its range saturate at `f32::MAX`
/// instead of becoming infinite, so oversized bars clamp to the plot top.
pub fn saturating_f32(value: f64) -> f32 {
    value.clamp(-(f32::MAX as f64), f32::MAX as f64) as f32
}

const CATEGORY_PADDING_INNER: f32 = 0.2;
const CATEGORY_PADDING_OUTER: f32 = 0.1;
const GROUP_PADDING: f32 = 0.1;

/// Scales for one render pass. Rebuilt from scratch every time.
#[derive(Debug, Clone)]
pub struct BarScales {
    /// Category index to band start.
    pub x: BandScale<usize>,
    /// Active key to offset within a category band; only for grouped bars.
    pub group: Option<BandScale<String>>,
    pub y: LinearScale,
}

impl BarScales {
    pub fn compute(series: &SeriesSet, active_keys: &[&str], plot: Rect) -> Result<Self> {
        let x = BandScale::try_new((0..series.len()).collect())?
            .range((plot.x, plot.right()))
            .padding_inner(CATEGORY_PADDING_INNER)
            .padding_outer(CATEGORY_PADDING_OUTER);

        let group = match series {
            SeriesSet::Grouped(_) => Some(
                BandScale::try_new(active_keys.iter().map(|k| k.to_string()).collect())?
                    .range((0.0, x.bandwidth()))
                    .padding_inner(GROUP_PADDING),
            ),
            SeriesSet::Stacked(_) => None,
        };

        let max = saturating_f32(series.max_value() * HEADROOM as f64);
        let top = if max.is_finite() && max > 0.0 { max } else { 1.0 };
        let y = LinearScale::new((0.0, top), (plot.bottom(), plot.y)).clamp(true);

        Ok(Self { x, group, y })
    }
}

/// Draws bars and axes into `plot`. Returns false when there is nothing to draw.
pub fn draw(
    data: &[DataPoint],
    group_keys: &[String],
    mode: ChartMode,
    config: &ChartConfig,
    plot: Rect,
    ctx: &RenderContext<'_>,
    scene: &mut Scene,
) -> bool {
    let series = transform_or_empty(data, group_keys, mode, ctx.legend.hidden());
    let active = ctx.legend.active_keys(group_keys);
    if series.is_empty() || active.is_empty() {
        return false;
    }
    let scales = match BarScales::compute(&series, &active, plot) {
        Ok(s) => s,
        Err(err) => {
            tracing::warn!(%err, "bar scales unavailable");
            return false;
        }
    };

    draw_value_axis(&scales, config, plot, ctx, scene);
    draw_category_axis(&scales, &series, config, plot, ctx, scene);

    let color_index: HashMap<&str, usize> = group_keys
        .iter()
        .enumerate()
        .map(|(i, k)| (k.as_str(), i))
        .collect();
    let bar = |key: &str, label: &str, value: f64, rect: Rect| {
        let idx = color_index.get(key).copied().unwrap_or(0);
        Mark::Rect(RectMark {
            rect,
            fill: ctx.theme.series_color(idx, &config.colors),
            opacity: ctx.legend.opacity_for(key),
            corner_radius: 2.0,
            datum: Some(TooltipDatum {
                label: label.to_string(),
                value,
                series: Some(key.to_string()),
            }),
        })
    };

    match (&series, &scales.group) {
        (SeriesSet::Grouped(categories), Some(group)) => {
            let baseline = scales.y.scale(0.0);
            for (ci, cat) in categories.iter().enumerate() {
                let Some(x0) = scales.x.scale(&ci) else { continue };
                for (key, value) in &cat.values {
                    let Some(gx) = group.scale(key) else { continue };
                    let top = scales.y.scale(saturating_f32(*value));
                    let rect = Rect::new(
                        x0 + gx,
                        top.min(baseline),
                        group.bandwidth(),
                        (baseline - top).abs(),
                    );
                    scene.push(bar(key, &cat.label, *value, rect));
                }
            }
        }
        (SeriesSet::Stacked(categories), _) => {
            for (ci, cat) in categories.iter().enumerate() {
                let Some(x0) = scales.x.scale(&ci) else { continue };
                for interval in cat.intervals.iter().filter(|i| i.value() > 0.0) {
                    let top = scales.y.scale(saturating_f32(interval.end));
                    let bottom = scales.y.scale(saturating_f32(interval.start));
                    let rect = Rect::new(x0, top, scales.x.bandwidth(), bottom - top);
                    scene.push(bar(&interval.key, &cat.label, interval.value(), rect));
                }
            }
        }
        (SeriesSet::Grouped(_), None) => return false,
    }
    true
}

fn draw_value_axis(
    scales: &BarScales,
    config: &ChartConfig,
    plot: Rect,
    ctx: &RenderContext<'_>,
    scene: &mut Scene,
) {
    let colors = &ctx.theme.colors;
    for tick in scales.y.ticks(config.axes.tick_count) {
        let y = scales.y.scale(tick);
        if config.axes.show_grid && tick != 0.0 {
            scene.push(Mark::Rule(RuleMark {
                from: Point::new(plot.x, y),
                to: Point::new(plot.right(), y),
                stroke: colors.grid,
                width: 1.0,
            }));
        }
        if config.axes.show_y_ticks {
            scene.push(Mark::Text(TextMark {
                pos: Point::new(plot.x - 6.0, y),
                text: format_value(tick as f64, config.axes.format),
                size: ctx.theme.typography.tick_size,
                color: colors.text_muted,
                anchor: TextAnchor::End,
                bold: false,
            }));
        }
    }
    scene.push(Mark::Rule(RuleMark {
        from: Point::new(plot.x, plot.bottom()),
        to: Point::new(plot.right(), plot.bottom()),
        stroke: colors.axis,
        width: 1.0,
    }));
}

fn draw_category_axis(
    scales: &BarScales,
    series: &SeriesSet,
    config: &ChartConfig,
    plot: Rect,
    ctx: &RenderContext<'_>,
    scene: &mut Scene,
) {
    if !config.axes.show_x_ticks {
        return;
    }
    let size = ctx.theme.typography.tick_size;
    for (i, label) in series.labels().into_iter().enumerate() {
        let Some(cx) = scales.x.center(&i) else { continue };
        let Some(text) = truncate_to_width(label, scales.x.step(), size, ctx.measure) else {
            continue;
        };
        scene.push(Mark::Text(TextMark {
            pos: Point::new(cx, plot.bottom() + size),
            text,
            size,
            color: ctx.theme.colors.text_muted,
            anchor: TextAnchor::Middle,
            bold: false,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HiddenSet;
    use crate::transform::transform_or_empty;
    use float_cmp::approx_eq;

    fn keys(k: &[&str]) -> Vec<String> {
        k.iter().map(|s| s.to_string()).collect()
    }

    fn data() -> Vec<DataPoint> {
        vec![
            DataPoint::new("Jan").with("a", 10.0).with("b", 20.0),
            DataPoint::new("Feb").with("a", 40.0).with("b", 5.0),
        ]
    }

    #[test]
    fn stacked_domain_uses_summed_max_with_headroom() {
        let k = keys(&["a", "b"]);
        let series = transform_or_empty(&data(), &k, ChartMode::Stacked, &HiddenSet::new());
        let plot = Rect::new(0.0, 0.0, 200.0, 100.0);
        let scales = BarScales::compute(&series, &["a", "b"], plot).unwrap();
        assert!(approx_eq!(f32, scales.y.domain().1, 45.0 * 1.2, epsilon = 1e-4));
        assert!(scales.group.is_none());
        assert_eq!(scales.y.scale(0.0), 100.0);
    }

    #[test]
    fn grouped_domain_uses_single_value_max() {
        let k = keys(&["a", "b"]);
        let series = transform_or_empty(&data(), &k, ChartMode::Grouped, &HiddenSet::new());
        let plot = Rect::new(10.0, 5.0, 200.0, 100.0);
        let scales = BarScales::compute(&series, &["a", "b"], plot).unwrap();
        assert!(approx_eq!(f32, scales.y.domain().1, 48.0, epsilon = 1e-4));
        let group = scales.group.as_ref().unwrap();
        assert!(group.bandwidth() * 2.0 < scales.x.bandwidth());
        assert!(scales.x.scale(&0).unwrap() >= plot.x);
        assert!(scales.x.scale(&1).unwrap() + scales.x.bandwidth() <= plot.right());
    }

    #[test]
    fn values_beyond_f32_saturate_instead_of_collapsing_the_domain() {
        let k = keys(&["a"]);
        let data = vec![
            DataPoint::new("huge").with("a", 1e300),
            DataPoint::new("tiny").with("a", 1.0),
        ];
        let series = transform_or_empty(&data, &k, ChartMode::Grouped, &HiddenSet::new());
        let plot = Rect::new(0.0, 0.0, 100.0, 100.0);
        let scales = BarScales::compute(&series, &["a"], plot).unwrap();
        assert_eq!(scales.y.domain(), (0.0, f32::MAX));
        assert_eq!(scales.y.scale(saturating_f32(1e300)), plot.y);
        assert!(approx_eq!(f32, scales.y.scale(saturating_f32(1.0)), plot.bottom(), epsilon = 1e-3));
        assert_eq!(saturating_f32(-1e300), -f32::MAX);
        assert_eq!(saturating_f32(2.5), 2.5);
    }

    #[test]
    fn all_zero_values_fall_back_to_unit_domain() {
        let k = keys(&["a"]);
        let zeros = vec![DataPoint::new("x").with("a", 0.0)];
        let series = transform_or_empty(&zeros, &k, ChartMode::Grouped, &HiddenSet::new());
        let scales = BarScales::compute(&series, &["a"], Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
        assert_eq!(scales.y.domain(), (0.0, 1.0));
    }

    #[test]
    fn scale_computation_is_deterministic() {
        let k = keys(&["a", "b"]);
        let series = transform_or_empty(&data(), &k, ChartMode::Grouped, &HiddenSet::new());
        let plot = Rect::new(0.0, 0.0, 300.0, 150.0);
        let a = BarScales::compute(&series, &["a", "b"], plot).unwrap();
        let b = BarScales::compute(&series, &["a", "b"], plot).unwrap();
        assert_eq!(a.y, b.y);
        assert_eq!(a.x.scale(&1), b.x.scale(&1));
        assert_eq!(a.x.bandwidth(), b.x.bandwidth());
    }
}
