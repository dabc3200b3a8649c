use crate::config::ValueFormat;
use crate::human::format_value;
use crate::layout::{Point, Size, TextMeasure};
use crate::model::TooltipDatum;
use crate::scene::Scene;

/// Gap between the pointer and the tooltip's nearest corner.
pub const TOOLTIP_OFFSET: f32 = 12.0;
const TOOLTIP_PADDING: f32 = 6.0;

/// Top-left corner for a tooltip of `size` anchored at the pointer.
///
/// Prefers below-right of the pointer, flips to the other side when that
/// would overflow, and finally clamps into the container.
pub fn place_tooltip(anchor: Point, size: Size, container: Size) -> Point {
    let axis = |a: f32, len: f32, limit: f32| {
        let mut v = a + TOOLTIP_OFFSET;
        if v + len > limit {
            v = a - TOOLTIP_OFFSET - len;
        }
        v.clamp(0.0, (limit - len).max(0.0))
    };
    Point::new(
        axis(anchor.x, size.width, container.width),
        axis(anchor.y, size.height, container.height),
    )
}

/// Hover state of one chart: the datum under the pointer and where it was hovered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TooltipState {
    active: Option<(TooltipDatum, Point)>,
}

impl TooltipState {
    pub fn update(&mut self, scene: &Scene, pointer: Option<Point>) {
        self.active = pointer.and_then(|p| scene.hit_test(p).map(|d| (d.clone(), p)));
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn datum(&self) -> Option<&TooltipDatum> {
        self.active.as_ref().map(|(d, _)| d)
    }

    pub fn anchor(&self) -> Option<Point> {
        self.active.as_ref().map(|(_, p)| *p)
    }
}

/// Laid-out tooltip box ready to be painted.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipBox {
    pub origin: Point,
    pub size: Size,
    pub lines: Vec<String>,
    pub line_height: f32,
    pub padding: f32,
}

pub fn tooltip_lines(datum: &TooltipDatum, format: ValueFormat) -> Vec<String> {
    let value = format_value(datum.value, format);
    match &datum.series {
        Some(series) => vec![datum.label.clone(), format!("{series}: {value}")],
        None => vec![format!("{}: {value}", datum.label)],
    }
}

pub fn layout_tooltip(
    datum: &TooltipDatum,
    anchor: Point,
    container: Size,
    font_size: f32,
    format: ValueFormat,
    measure: &dyn TextMeasure,
) -> TooltipBox {
    let lines = tooltip_lines(datum, format);
    let line_height = font_size * 1.3;
    let width = lines
        .iter()
        .map(|l| measure.text_width(l, font_size))
        .fold(0.0, f32::max)
        + 2.0 * TOOLTIP_PADDING;
    let size = Size::new(width, line_height * lines.len() as f32 + 2.0 * TOOLTIP_PADDING);
    TooltipBox {
        origin: place_tooltip(anchor, size, container),
        size,
        lines,
        line_height,
        padding: TOOLTIP_PADDING,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ApproxTextMeasure, Rect};
    use crate::scene::{Mark, RectMark};
    use crate::theme::Color;

    #[test]
    fn prefers_below_right() {
        let p = place_tooltip(Point::new(10.0, 10.0), Size::new(50.0, 20.0), Size::new(300.0, 200.0));
        assert_eq!(p, Point::new(22.0, 22.0));
    }

    #[test]
    fn flips_near_the_far_edges() {
        let p = place_tooltip(Point::new(290.0, 190.0), Size::new(50.0, 20.0), Size::new(300.0, 200.0));
        assert_eq!(p, Point::new(228.0, 158.0));
    }

    #[test]
    fn stays_inside_container_when_it_fits() {
        let container = Size::new(120.0, 90.0);
        let size = Size::new(100.0, 40.0);
        for x in [0.0, 30.0, 60.0, 119.0] {
            for y in [0.0, 45.0, 89.0] {
                let p = place_tooltip(Point::new(x, y), size, container);
                assert!(p.x >= 0.0 && p.x + size.width <= container.width);
                assert!(p.y >= 0.0 && p.y + size.height <= container.height);
            }
        }
    }

    #[test]
    fn state_tracks_hovered_datum() {
        let mut scene = Scene::new(Size::new(100.0, 100.0), Color::rgb(0, 0, 0), "sans");
        scene.push(Mark::Rect(RectMark {
            rect: Rect::new(0.0, 0.0, 50.0, 50.0),
            fill: Color::rgb(1, 1, 1),
            opacity: 1.0,
            corner_radius: 0.0,
            datum: Some(TooltipDatum {
                label: "Jan".into(),
                value: 1500.0,
                series: Some("a".into()),
            }),
        }));
        let mut state = TooltipState::default();
        state.update(&scene, Some(Point::new(10.0, 10.0)));
        assert_eq!(state.datum().unwrap().label, "Jan");
        state.update(&scene, Some(Point::new(90.0, 90.0)));
        assert!(state.datum().is_none());
        state.update(&scene, Some(Point::new(10.0, 10.0)));
        state.clear();
        assert!(state.anchor().is_none());
    }

    #[test]
    fn tooltip_box_lists_series_and_value() {
        let datum = TooltipDatum {
            label: "Jan".into(),
            value: 1500.0,
            series: Some("a".into()),
        };
        let b = layout_tooltip(
            &datum,
            Point::new(5.0, 5.0),
            Size::new(300.0, 200.0),
            12.0,
            ValueFormat::Compact,
            &ApproxTextMeasure,
        );
        assert_eq!(b.lines, vec!["Jan".to_string(), "a: 1.5k".to_string()]);
        assert!(b.origin.x + b.size.width <= 300.0);
    }
}
