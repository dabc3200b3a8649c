use std::f32::consts::TAU;

use serde::Serialize;

use crate::layout::{Point, Rect, Size};
use crate::model::TooltipDatum;
use crate::theme::Color;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RectMark {
    pub rect: Rect,
    pub fill: Color,
    pub opacity: f32,
    pub corner_radius: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datum: Option<TooltipDatum>,
}

/// Annular sector. Angles are radians measured clockwise from 12 o'clock.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArcMark {
    pub center: Point,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub start_angle: f32,
    pub end_angle: f32,
    pub fill: Color,
    pub opacity: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datum: Option<TooltipDatum>,
}

impl ArcMark {
    pub fn point_at(&self, angle: f32, radius: f32) -> Point {
        Point::new(
            self.center.x + radius * angle.sin(),
            self.center.y - radius * angle.cos(),
        )
    }

    pub fn centroid(&self) -> Point {
        let angle = (self.start_angle + self.end_angle) / 2.0;
        self.point_at(angle, (self.inner_radius + self.outer_radius) / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        let dx = p.x - self.center.x;
        let dy = p.y - self.center.y;
        let r = (dx * dx + dy * dy).sqrt();
        if r < self.inner_radius || r > self.outer_radius {
            return false;
        }
        let angle = dx.atan2(-dy).rem_euclid(TAU);
        angle >= self.start_angle && angle <= self.end_angle
    }

    /// Polygon approximating the sector: outer edge clockwise, inner edge back.
    pub fn outline(&self, segments_per_turn: usize) -> Vec<Point> {
        let span = self.end_angle - self.start_angle;
        let n = ((span / TAU) * segments_per_turn as f32).ceil().max(1.0) as usize;
        let step = span / n as f32;
        let mut points: Vec<Point> = (0..=n)
            .map(|i| self.point_at(self.start_angle + step * i as f32, self.outer_radius))
            .collect();
        if self.inner_radius > 0.0 {
            points.extend(
                (0..=n)
                    .rev()
                    .map(|i| self.point_at(self.start_angle + step * i as f32, self.inner_radius)),
            );
        } else {
            points.push(self.center);
        }
        points
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextMark {
    pub pos: Point,
    pub text: String,
    pub size: f32,
    pub color: Color,
    pub anchor: TextAnchor,
    pub bold: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuleMark {
    pub from: Point,
    pub to: Point,
    pub stroke: Color,
    pub width: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mark {
    Rect(RectMark),
    Arc(ArcMark),
    Text(TextMark),
    Rule(RuleMark),
}

impl Mark {
    pub fn datum(&self) -> Option<&TooltipDatum> {
        match self {
            Mark::Rect(r) => r.datum.as_ref(),
            Mark::Arc(a) => a.datum.as_ref(),
            Mark::Text(_) | Mark::Rule(_) => None,
        }
    }

    fn contains(&self, p: Point) -> bool {
        match self {
            Mark::Rect(r) => r.rect.contains(p),
            Mark::Arc(a) => a.contains(p),
            Mark::Text(_) | Mark::Rule(_) => false,
        }
    }
}

/// Hit box of one legend entry; `key` is what hovering it highlights.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LegendHit {
    pub index: usize,
    pub key: String,
    pub bounds: Rect,
}

/// Everything a renderer needs to draw one chart, in chart-local pixels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Scene {
    pub size: Size,
    pub background: Color,
    pub font_family: String,
    pub marks: Vec<Mark>,
    pub legend: Vec<LegendHit>,
}

impl Scene {
    pub fn new(size: Size, background: Color, font_family: impl Into<String>) -> Self {
        Self {
            size,
            background,
            font_family: font_family.into(),
            marks: Vec::new(),
            legend: Vec::new(),
        }
    }

    pub fn push(&mut self, mark: Mark) {
        self.marks.push(mark);
    }

    /// Topmost data mark under `p`.
    pub fn hit_test(&self, p: Point) -> Option<&TooltipDatum> {
        self.marks
            .iter()
            .rev()
            .filter(|m| m.contains(p))
            .find_map(Mark::datum)
    }

    pub fn legend_hit(&self, p: Point) -> Option<&LegendHit> {
        self.legend.iter().find(|l| l.bounds.contains(p))
    }

    /// Marks that carry a datum, in paint order.
    pub fn data_marks(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter().filter(|m| m.datum().is_some())
    }

    /// True when the scene draws rects or arcs (as opposed to text-only placeholders).
    pub fn has_geometry(&self) -> bool {
        self.marks
            .iter()
            .any(|m| matches!(m, Mark::Rect(_) | Mark::Arc(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn arc(start: f32, end: f32) -> ArcMark {
        ArcMark {
            center: Point::new(100.0, 100.0),
            inner_radius: 40.0,
            outer_radius: 80.0,
            start_angle: start,
            end_angle: end,
            fill: Color::rgb(0, 0, 0),
            opacity: 1.0,
            datum: None,
        }
    }

    #[test]
    fn arc_angles_run_clockwise_from_twelve() {
        let a = arc(0.0, PI / 2.0);
        // 1:30 on the clock face, midway between the radii
        assert!(a.contains(Point::new(100.0 + 42.0, 100.0 - 42.0)));
        // 7:30 is in the opposite quadrant
        assert!(!a.contains(Point::new(100.0 - 42.0, 100.0 + 42.0)));
        // inside the hole
        assert!(!a.contains(Point::new(101.0, 99.0)));
        let c = a.centroid();
        assert!(c.x > 100.0 && c.y < 100.0);
    }

    #[test]
    fn outline_closes_through_inner_edge() {
        let a = arc(0.0, PI);
        let pts = a.outline(64);
        assert_eq!(pts.len(), 2 * (32 + 1));
        let first = pts[0];
        assert!((first.x - 100.0).abs() < 1e-3 && (first.y - 20.0).abs() < 1e-3);
    }

    #[test]
    fn hit_test_prefers_topmost_data_mark() {
        let mut scene = Scene::new(Size::new(200.0, 200.0), Color::rgb(255, 255, 255), "sans");
        let datum = |label: &str| {
            Some(TooltipDatum {
                label: label.into(),
                value: 1.0,
                series: None,
            })
        };
        scene.push(Mark::Rect(RectMark {
            rect: Rect::new(0.0, 0.0, 100.0, 100.0),
            fill: Color::rgb(0, 0, 0),
            opacity: 1.0,
            corner_radius: 0.0,
            datum: datum("below"),
        }));
        scene.push(Mark::Rect(RectMark {
            rect: Rect::new(50.0, 50.0, 100.0, 100.0),
            fill: Color::rgb(0, 0, 0),
            opacity: 1.0,
            corner_radius: 0.0,
            datum: datum("above"),
        }));
        assert_eq!(scene.hit_test(Point::new(60.0, 60.0)).unwrap().label, "above");
        assert_eq!(scene.hit_test(Point::new(10.0, 10.0)).unwrap().label, "below");
        assert!(scene.hit_test(Point::new(190.0, 10.0)).is_none());
        assert!(scene.has_geometry());
    }
}
