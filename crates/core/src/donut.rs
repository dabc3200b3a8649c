use std::f32::consts::TAU;

use crate::chart::RenderContext;
use crate::config::{ChartConfig, DonutConfig};
use crate::human::format_value;
use crate::layout::{Point, Rect};
use crate::model::{SliceDatum, TooltipDatum};
use crate::scene::{ArcMark, Mark, Scene, TextAnchor, TextMark};

/// Slices narrower than this get no percentage label.
const MIN_LABEL_ANGLE: f32 = 0.35;

/// `(start, end)` angle for each value, clockwise from 12 o'clock.
///
/// Non-positive and non-finite values get an empty span. Every positive value's
/// span includes one `pad_angle` gap, trimmed equally from both ends, so the
/// spans plus gaps cover the full circle.
pub fn pie_angles(values: &[f64], pad_angle: f32) -> Vec<(f32, f32)> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    let n = values.iter().filter(|v| positive(**v)).count();
    let total: f64 = values.iter().copied().filter(|v| positive(*v)).sum();
    if n == 0 || total <= 0.0 {
        return vec![(0.0, 0.0); values.len()];
    }
    let pad = if n > 1 { pad_angle.max(0.0).min(TAU / n as f32) } else { 0.0 };
    let k = (TAU - pad * n as f32) as f64 / total;

    let mut a0 = 0.0_f32;
    values
        .iter()
        .map(|&v| {
            if !positive(v) {
                return (a0, a0);
            }
            let span = (v * k) as f32 + pad;
            let slice = (a0 + pad / 2.0, a0 + span - pad / 2.0);
            a0 += span;
            slice
        })
        .collect()
}

pub fn draw(
    data: &[SliceDatum],
    donut: &DonutConfig,
    config: &ChartConfig,
    plot: Rect,
    ctx: &RenderContext<'_>,
    scene: &mut Scene,
) -> bool {
    let visible: Vec<(usize, &SliceDatum)> = data
        .iter()
        .enumerate()
        .filter(|(i, s)| !ctx.legend.is_hidden(*i) && s.value.is_finite() && s.value > 0.0)
        .collect();
    let total: f64 = visible.iter().map(|(_, s)| s.value).sum();
    if visible.is_empty() || total <= 0.0 {
        return false;
    }

    let outer = (plot.w.min(plot.h) / 2.0).max(0.0);
    let inner = outer * donut.inner_radius_ratio;
    let center = plot.center();
    let values: Vec<f64> = visible.iter().map(|(_, s)| s.value).collect();
    let angles = pie_angles(&values, donut.pad_angle);
    let colors = &ctx.theme.colors;

    for ((index, slice), (start, end)) in visible.iter().zip(angles) {
        let arc = ArcMark {
            center,
            inner_radius: inner,
            outer_radius: outer,
            start_angle: start,
            end_angle: end,
            fill: ctx.theme.series_color(*index, &config.colors),
            opacity: ctx.legend.opacity_for(&slice.label),
            datum: Some(TooltipDatum {
                label: slice.label.clone(),
                value: slice.value,
                series: None,
            }),
        };
        let label_at = arc.centroid();
        scene.push(Mark::Arc(arc));
        if donut.show_labels && end - start >= MIN_LABEL_ANGLE {
            scene.push(Mark::Text(TextMark {
                pos: label_at,
                text: format!("{:.0}%", slice.value / total * 100.0),
                size: ctx.theme.typography.tick_size,
                color: colors.background,
                anchor: TextAnchor::Middle,
                bold: true,
            }));
        }
    }

    if donut.show_total && inner > 0.0 {
        let size = ctx.theme.typography.label_size;
        scene.push(Mark::Text(TextMark {
            pos: Point::new(center.x, center.y - size * 0.4),
            text: format_value(total, config.tooltip.format),
            size: size * 1.6,
            color: colors.text,
            anchor: TextAnchor::Middle,
            bold: true,
        }));
        scene.push(Mark::Text(TextMark {
            pos: Point::new(center.x, center.y + size * 1.1),
            text: "Total".to_string(),
            size,
            color: colors.text_muted,
            anchor: TextAnchor::Middle,
            bold: false,
        }));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn spans_cover_the_circle() {
        let pad = 0.02;
        let angles = pie_angles(&[1.0, 2.0, 3.0], pad);
        let covered: f32 = angles.iter().map(|(s, e)| e - s + pad).sum();
        assert!(approx_eq!(f32, covered, TAU, epsilon = 1e-4));
        assert!(approx_eq!(f32, angles[0].0, pad / 2.0, epsilon = 1e-6));
        for w in angles.windows(2) {
            assert!(w[1].0 > w[0].1);
        }
    }

    #[test]
    fn spans_are_proportional() {
        let angles = pie_angles(&[1.0, 3.0], 0.0);
        let a = angles[0].1 - angles[0].0;
        let b = angles[1].1 - angles[1].0;
        assert!(approx_eq!(f32, b / a, 3.0, epsilon = 1e-4));
    }

    #[test]
    fn single_slice_has_no_pad() {
        let angles = pie_angles(&[5.0], 0.3);
        assert_eq!(angles[0].0, 0.0);
        assert!(approx_eq!(f32, angles[0].1, TAU, epsilon = 1e-5));
    }

    #[test]
    fn non_positive_values_get_empty_spans() {
        let angles = pie_angles(&[2.0, -1.0, f64::NAN, 2.0], 0.0);
        assert_eq!(angles[1].0, angles[1].1);
        assert_eq!(angles[2].0, angles[2].1);
        assert!(approx_eq!(f32, angles[3].1, TAU, epsilon = 1e-5));
        assert!(pie_angles(&[0.0, 0.0], 0.1).iter().all(|(s, e)| s == e));
    }
}
