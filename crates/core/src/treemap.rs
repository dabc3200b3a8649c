use crate::chart::RenderContext;
use crate::config::{ChartConfig, TreeMapConfig};
use crate::layout::{truncate_to_width, Point, Rect};
use crate::model::{HiddenSet, NodeId, TooltipDatum, TreeMapNode};
use crate::scene::{Mark, RectMark, Scene, TextAnchor, TextMark};

#[derive(Clone, Debug, PartialEq)]
pub struct TreemapItem<K> {
    pub id: K,
    pub weight: f64,
    pub rect: Rect,
}

/// Squarified treemap (Bruls, Huizing, van Wijk) of `weights` over `area`.
///
/// Items come back largest first; non-positive weights are left out.
pub fn squarify<K: Copy>(weights: &[(K, f64)], area: Rect) -> Vec<TreemapItem<K>> {
    let mut items: Vec<(K, f64)> = weights
        .iter()
        .copied()
        .filter(|(_, w)| w.is_finite() && *w > 0.0)
        .collect();
    let total: f64 = items.iter().map(|(_, w)| w).sum();
    if items.is_empty() || area.w <= 0.0 || area.h <= 0.0 {
        return Vec::new();
    }
    items.sort_by(|a, b| b.1.total_cmp(&a.1));

    let scale = area.area() as f64 / total;
    let mut out = Vec::with_capacity(items.len());
    let mut rect = area;
    let mut row: Vec<(K, f64, f64)> = Vec::new();

    for (id, weight) in items {
        let cell = (id, weight, weight * scale);
        let side = rect.w.min(rect.h) as f64;
        if row.is_empty() {
            row.push(cell);
            continue;
        }
        let current = worst(&row, side);
        row.push(cell);
        if worst(&row, side) > current {
            row.pop();
            rect = lay_row(&row, rect, &mut out);
            row.clear();
            row.push(cell);
        }
    }
    if !row.is_empty() {
        lay_row(&row, rect, &mut out);
    }
    out
}

/// Worst aspect ratio in `row` when laid along a side of length `side`.
fn worst<K>(row: &[(K, f64, f64)], side: f64) -> f64 {
    let sum: f64 = row.iter().map(|r| r.2).sum();
    if sum <= 0.0 || side <= 0.0 {
        return f64::INFINITY;
    }
    let side2 = side * side;
    let sum2 = sum * sum;
    row.iter()
        .map(|r| (side2 * r.2 / sum2).max(sum2 / (side2 * r.2)))
        .fold(0.0, f64::max)
}

/// Places `row` along the shorter side of `rect` and returns what is left.
fn lay_row<K: Copy>(row: &[(K, f64, f64)], rect: Rect, out: &mut Vec<TreemapItem<K>>) -> Rect {
    let sum: f64 = row.iter().map(|r| r.2).sum();
    if rect.w >= rect.h {
        let col_w = (sum / rect.h as f64) as f32;
        let mut y = rect.y;
        for &(id, weight, area) in row {
            let h = (area / col_w as f64) as f32;
            out.push(TreemapItem {
                id,
                weight,
                rect: Rect::new(rect.x, y, col_w, h),
            });
            y += h;
        }
        Rect::new(rect.x + col_w, rect.y, (rect.w - col_w).max(0.0), rect.h)
    } else {
        let row_h = (sum / rect.w as f64) as f32;
        let mut x = rect.x;
        for &(id, weight, area) in row {
            let w = (area / row_h as f64) as f32;
            out.push(TreemapItem {
                id,
                weight,
                rect: Rect::new(x, rect.y, w, row_h),
            });
            x += w;
        }
        Rect::new(rect.x, rect.y + row_h, rect.w, (rect.h - row_h).max(0.0))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TreemapCell {
    pub id: NodeId,
    pub name: String,
    /// 1 for the root's children.
    pub depth: usize,
    /// Index of the top-level ancestor among the root's children.
    pub branch: usize,
    pub value: f64,
    pub rect: Rect,
    /// No nested cells were laid out inside this one.
    pub leaf: bool,
}

/// Lays out `root`'s descendants down to `max_depth`, parents before children.
/// Top-level branches whose index is in `hidden` are left out.
pub fn layout_tree(
    root: &TreeMapNode,
    area: Rect,
    max_depth: usize,
    padding: f32,
    hidden: &HiddenSet,
) -> Vec<TreemapCell> {
    let weights: Vec<(usize, f64)> = root
        .children
        .iter()
        .enumerate()
        .filter(|(i, _)| !hidden.contains(i))
        .map(|(i, c)| (i, c.weight()))
        .collect();
    let mut cells = Vec::new();
    for item in squarify(&weights, area) {
        let child = &root.children[item.id];
        nest(child, item.rect, 1, item.id, max_depth, padding, &mut cells);
    }
    cells
}

fn nest(
    node: &TreeMapNode,
    rect: Rect,
    depth: usize,
    branch: usize,
    max_depth: usize,
    padding: f32,
    cells: &mut Vec<TreemapCell>,
) {
    let at = cells.len();
    cells.push(TreemapCell {
        id: node.id,
        name: node.name.clone(),
        depth,
        branch,
        value: if node.is_leaf() { node.value } else { node.weight() },
        rect,
        leaf: true,
    });
    if depth >= max_depth || node.is_leaf() {
        return;
    }
    let inner = rect.inset(padding);
    let weights: Vec<(usize, f64)> = node
        .children
        .iter()
        .enumerate()
        .map(|(i, c)| (i, c.weight()))
        .collect();
    let items = squarify(&weights, inner);
    if items.is_empty() {
        return;
    }
    cells[at].leaf = false;
    for item in items {
        nest(
            &node.children[item.id],
            item.rect,
            depth + 1,
            branch,
            max_depth,
            padding,
            cells,
        );
    }
}

const MIN_LABEL_WIDTH: f32 = 36.0;
const MIN_LABEL_HEIGHT: f32 = 16.0;

pub fn draw(
    root: &TreeMapNode,
    treemap: &TreeMapConfig,
    config: &ChartConfig,
    plot: Rect,
    ctx: &RenderContext<'_>,
    scene: &mut Scene,
) -> bool {
    let cells = layout_tree(root, plot, treemap.max_depth, treemap.padding, ctx.legend.hidden());
    if cells.is_empty() {
        return false;
    }
    let colors = &ctx.theme.colors;
    let label_size = ctx.theme.typography.tick_size;

    for cell in &cells {
        let branch_name = root.children[cell.branch].name.as_str();
        let base = ctx.theme.series_color(cell.branch, &config.colors);
        let fill = if cell.leaf {
            base.mix(colors.background, 0.15 * (cell.depth.saturating_sub(1)) as f32)
        } else {
            base.mix(colors.background, 0.6)
        };
        scene.push(Mark::Rect(RectMark {
            rect: cell.rect,
            fill,
            opacity: ctx.legend.opacity_for(branch_name),
            corner_radius: 1.0,
            datum: Some(TooltipDatum {
                label: cell.name.clone(),
                value: cell.value,
                series: Some(branch_name.to_string()),
            }),
        }));

        if treemap.show_labels
            && cell.leaf
            && cell.rect.w >= MIN_LABEL_WIDTH
            && cell.rect.h >= MIN_LABEL_HEIGHT
        {
            if let Some(text) =
                truncate_to_width(&cell.name, cell.rect.w - 8.0, label_size, ctx.measure)
            {
                scene.push(Mark::Text(TextMark {
                    pos: Point::new(cell.rect.x + 4.0, cell.rect.y + label_size * 0.5 + 4.0),
                    text,
                    size: label_size,
                    color: colors.background,
                    anchor: TextAnchor::Start,
                    bold: false,
                }));
            }
        }
    }
    true
}
