use tracing::debug;

use crate::layout::{Point, Rect, Size, TextMeasure};
use crate::model::HiddenSet;

/// Opacity of series that are not under a hovered legend entry.
pub const DIMMED_OPACITY: f32 = 0.3;

/// Ephemeral legend interaction state: which series are toggled off and which one is hovered.
///
/// Indices always refer to positions in the unfiltered key sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegendState {
    hidden: HiddenSet,
    hovered: Option<String>,
}

impl LegendState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips visibility of `index`. Returns whether it is now hidden.
    /// Indices outside `0..len` are ignored.
    pub fn toggle(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            debug!(index, len, "ignoring legend toggle outside key range");
            return false;
        }
        let hidden = if self.hidden.remove(&index) {
            false
        } else {
            self.hidden.insert(index);
            true
        };
        debug!(index, hidden, "legend toggle");
        hidden
    }

    pub fn hidden(&self) -> &HiddenSet {
        &self.hidden
    }

    pub fn is_hidden(&self, index: usize) -> bool {
        self.hidden.contains(&index)
    }

    pub fn show_all(&mut self) {
        self.hidden.clear();
    }

    pub fn hover(&mut self, key: Option<&str>) {
        self.hovered = key.map(str::to_owned);
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn opacity_for(&self, key: &str) -> f32 {
        match &self.hovered {
            Some(h) if h != key => DIMMED_OPACITY,
            _ => 1.0,
        }
    }

    /// Drops hidden indices that no longer point into a key sequence of length `len`.
    pub fn reconcile(&mut self, len: usize) {
        let before = self.hidden.len();
        self.hidden.retain(|&i| i < len);
        if self.hidden.len() != before {
            debug!(len, dropped = before - self.hidden.len(), "reconciled legend after key change");
        }
    }

    pub fn active_keys<'a>(&self, keys: &'a [String]) -> Vec<&'a str> {
        crate::transform::active_keys(keys, &self.hidden)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendItemBox {
    pub index: usize,
    pub bounds: Rect,
    pub swatch: Rect,
    pub label_at: Point,
}

/// Legend geometry in legend-local coordinates, plus the size it needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LegendLayout {
    pub items: Vec<LegendItemBox>,
    pub size: Size,
}

const ITEM_GAP: f32 = 14.0;
const SWATCH_GAP: f32 = 6.0;
const ROW_GAP: f32 = 6.0;

impl LegendLayout {
    /// Flows entries left to right, wrapping rows at `max_width`.
    pub fn measure(
        labels: &[&str],
        font_size: f32,
        swatch_size: f32,
        max_width: f32,
        measure: &dyn TextMeasure,
    ) -> Self {
        let row_height = font_size.max(swatch_size);
        let mut items = Vec::with_capacity(labels.len());
        let (mut x, mut y, mut widest) = (0.0_f32, 0.0_f32, 0.0_f32);

        for (index, label) in labels.iter().enumerate() {
            let width = swatch_size + SWATCH_GAP + measure.text_width(label, font_size);
            if x > 0.0 && x + width > max_width {
                x = 0.0;
                y += row_height + ROW_GAP;
            }
            items.push(LegendItemBox {
                index,
                bounds: Rect::new(x, y, width, row_height),
                swatch: Rect::new(x, y + (row_height - swatch_size) / 2.0, swatch_size, swatch_size),
                label_at: Point::new(x + swatch_size + SWATCH_GAP, y + row_height / 2.0),
            });
            widest = widest.max(x + width);
            x += width + ITEM_GAP;
        }

        let height = if items.is_empty() { 0.0 } else { y + row_height };
        Self {
            items,
            size: Size::new(widest, height),
        }
    }

    pub fn translate(mut self, origin: Point) -> Self {
        for item in &mut self.items {
            item.bounds = item.bounds.translate(origin.x, origin.y);
            item.swatch = item.swatch.translate(origin.x, origin.y);
            item.label_at = Point::new(item.label_at.x + origin.x, item.label_at.y + origin.y);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ApproxTextMeasure;

    #[test]
    fn toggle_twice_restores_hidden_set() {
        let mut legend = LegendState::new();
        legend.toggle(2, 4);
        let before = legend.hidden().clone();
        assert!(legend.toggle(0, 4));
        assert!(!legend.toggle(0, 4));
        assert_eq!(legend.hidden(), &before);
    }

    #[test]
    fn out_of_range_toggle_is_ignored() {
        let mut legend = LegendState::new();
        assert!(!legend.toggle(5, 3));
        assert!(legend.hidden().is_empty());
    }

    #[test]
    fn hover_dims_other_series_without_hiding() {
        let mut legend = LegendState::new();
        assert_eq!(legend.opacity_for("a"), 1.0);
        legend.hover(Some("a"));
        assert_eq!(legend.opacity_for("a"), 1.0);
        assert_eq!(legend.opacity_for("b"), DIMMED_OPACITY);
        assert!(legend.hidden().is_empty());
        legend.hover(None);
        assert_eq!(legend.opacity_for("b"), 1.0);
    }

    #[test]
    fn reconcile_drops_dangling_indices() {
        let mut legend = LegendState::new();
        legend.toggle(1, 5);
        legend.toggle(4, 5);
        legend.reconcile(3);
        assert_eq!(legend.hidden().iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn show_all_clears_hidden_but_not_hover() {
        let mut legend = LegendState::new();
        legend.toggle(0, 3);
        legend.toggle(2, 3);
        legend.hover(Some("b"));
        legend.show_all();
        assert!(legend.hidden().is_empty());
        assert_eq!(legend.hovered(), Some("b"));
    }

    #[test]
    fn active_keys_keep_original_order() {
        let keys: Vec<String> = ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect();
        let mut legend = LegendState::new();
        legend.toggle(1, keys.len());
        assert_eq!(legend.active_keys(&keys), vec!["a", "c", "d"]);
    }

    #[test]
    fn legend_wraps_rows() {
        let m = ApproxTextMeasure;
        let one_row = LegendLayout::measure(&["alpha", "beta"], 10.0, 10.0, 1000.0, &m);
        assert_eq!(one_row.size.height, 10.0);
        let wrapped = LegendLayout::measure(&["alpha", "beta", "gamma"], 10.0, 10.0, 60.0, &m);
        assert_eq!(wrapped.items.len(), 3);
        assert!(wrapped.size.height > one_row.size.height);
        assert!(wrapped.items.iter().all(|i| i.bounds.x == 0.0));
        let moved = wrapped.clone().translate(Point::new(5.0, 7.0));
        assert_eq!(moved.items[1].bounds.y, wrapped.items[1].bounds.y + 7.0);
        assert!(LegendLayout::measure(&[], 10.0, 10.0, 100.0, &m).size.height == 0.0);
    }
}
