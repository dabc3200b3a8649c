use serde::{Deserialize, Serialize};

/// Charts smaller than this render a static placeholder instead of geometry.
pub const MIN_CHART_WIDTH: f32 = 120.0;
pub const MIN_CHART_HEIGHT: f32 = 80.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn fits_minimum(&self) -> bool {
        self.width >= MIN_CHART_WIDTH && self.height >= MIN_CHART_HEIGHT
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn area(&self) -> f32 {
        self.w * self.h
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Shrinks by `pad` on every side; never goes negative.
    pub fn inset(&self, pad: f32) -> Rect {
        let w = (self.w - 2.0 * pad).max(0.0);
        let h = (self.h - 2.0 * pad).max(0.0);
        Rect::new(self.x + pad.min(self.w / 2.0), self.y + pad.min(self.h / 2.0), w, h)
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Margin {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 12.0,
            right: 16.0,
            bottom: 32.0,
            left: 48.0,
        }
    }
}

impl Margin {
    pub fn uniform(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }
}

/// Reports rendered text extents. Renderers that own a font system supply their own;
/// [`ApproxTextMeasure`] is used where none is available (file export).
pub trait TextMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.58
    }
}

/// Cuts `text` so it fits in `max_width`, appending an ellipsis when shortened.
pub fn truncate_to_width(
    text: &str,
    max_width: f32,
    font_size: f32,
    measure: &dyn TextMeasure,
) -> Option<String> {
    if measure.text_width(text, font_size) <= max_width {
        return Some(text.to_string());
    }
    let chars: Vec<char> = text.chars().collect();
    (1..chars.len()).rev().find_map(|n| {
        let candidate: String = chars[..n].iter().chain(std::iter::once(&'…')).collect();
        (measure.text_width(&candidate, font_size) <= max_width).then_some(candidate)
    })
}

/// Where each sub-component of a chart goes, derived from the sizes the
/// title and legend report rather than from inspecting rendered output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartLayout {
    pub viewport: Rect,
    pub title: Option<Rect>,
    pub legend: Option<Rect>,
    pub plot: Rect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegendSlot {
    Top,
    Bottom,
}

const SECTION_GAP: f32 = 8.0;

impl ChartLayout {
    /// Returns `None` when nothing is left for the plot.
    pub fn compute(
        size: Size,
        margin: Margin,
        title_height: Option<f32>,
        legend: Option<(Size, LegendSlot)>,
    ) -> Option<Self> {
        let viewport = Rect::from_size(size);
        let mut top = margin.top.min(SECTION_GAP);
        let mut bottom = size.height;

        let title = title_height.map(|h| {
            let r = Rect::new(margin.left.min(SECTION_GAP), top, size.width - 2.0 * SECTION_GAP, h);
            top += h + SECTION_GAP;
            r
        });

        let legend = legend.map(|(s, slot)| {
            let x = (size.width - s.width).max(0.0) / 2.0;
            match slot {
                LegendSlot::Top => {
                    let r = Rect::new(x, top, s.width, s.height);
                    top += s.height + SECTION_GAP;
                    r
                }
                LegendSlot::Bottom => {
                    bottom -= s.height + SECTION_GAP;
                    Rect::new(x, bottom, s.width, s.height)
                }
            }
        });

        let plot = Rect::new(
            margin.left,
            top + margin.top,
            size.width - margin.left - margin.right,
            bottom - top - margin.top - margin.bottom,
        );
        if plot.w <= 0.0 || plot.h <= 0.0 {
            return None;
        }
        Some(Self {
            viewport,
            title,
            legend,
            plot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_size_check() {
        assert!(Size::new(120.0, 80.0).fits_minimum());
        assert!(!Size::new(119.0, 300.0).fits_minimum());
        assert!(!Size::new(300.0, 79.0).fits_minimum());
    }

    #[test]
    fn inset_never_goes_negative() {
        let r = Rect::new(0.0, 0.0, 4.0, 10.0).inset(3.0);
        assert_eq!(r.w, 0.0);
        assert_eq!(r.h, 4.0);
        assert_eq!(r.x, 2.0);
    }

    #[test]
    fn plot_area_accounts_for_reported_sizes() {
        let size = Size::new(400.0, 300.0);
        let margin = Margin::uniform(10.0);
        let bare = ChartLayout::compute(size, margin, None, None).unwrap();
        let full = ChartLayout::compute(
            size,
            margin,
            Some(20.0),
            Some((Size::new(200.0, 16.0), LegendSlot::Bottom)),
        )
        .unwrap();
        assert_eq!(bare.plot.w, full.plot.w);
        assert_eq!(bare.plot.h - full.plot.h, 20.0 + 16.0 + 2.0 * SECTION_GAP);
        let legend = full.legend.unwrap();
        assert!(legend.y >= full.plot.bottom());
        assert_eq!(legend.x, 100.0);
        assert!(full.title.unwrap().bottom() <= full.plot.y);
    }

    #[test]
    fn layout_gives_up_when_plot_vanishes() {
        let layout = ChartLayout::compute(
            Size::new(100.0, 60.0),
            Margin::default(),
            Some(30.0),
            None,
        );
        assert!(layout.is_none());
    }

    #[test]
    fn truncates_long_labels() {
        let m = ApproxTextMeasure;
        assert_eq!(truncate_to_width("abc", 100.0, 10.0, &m).as_deref(), Some("abc"));
        let cut = truncate_to_width("a very long label", 40.0, 10.0, &m).unwrap();
        assert!(cut.ends_with('…'));
        assert!(m.text_width(&cut, 10.0) <= 40.0);
        assert!(truncate_to_width("abc", 1.0, 10.0, &m).is_none());
    }
}
