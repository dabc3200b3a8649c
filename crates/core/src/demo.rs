//! Canned datasets behind the two demo dashboards.

use chrono::{Datelike, Months, NaiveDate};

use crate::config::{ChartConfig, ValueFormat};
use crate::model::{ChartMode, DataPoint, SliceDatum, TreeMapNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dashboard {
    Sales,
    Storage,
}

impl Dashboard {
    pub const ALL: [Dashboard; 2] = [Dashboard::Sales, Dashboard::Storage];

    pub fn title(&self) -> &'static str {
        match self {
            Dashboard::Sales => "Sales",
            Dashboard::Storage => "Storage",
        }
    }

    /// `(card title, config)` for each card, in default order.
    pub fn cards(&self, today: NaiveDate) -> Vec<(String, ChartConfig)> {
        match self {
            Dashboard::Sales => sales(today),
            Dashboard::Storage => storage(),
        }
    }
}

/// Abbreviated names of the `n` months ending with `today`'s, oldest first.
pub fn recent_months(today: NaiveDate, n: u32) -> Vec<String> {
    let first = today.with_day(1).unwrap_or(today);
    (0..n)
        .rev()
        .filter_map(|back| first.checked_sub_months(Months::new(back)))
        .map(|d| d.format("%b").to_string())
        .collect()
}

const REGIONS: [&str; 3] = ["north", "south", "west"];

fn sales(today: NaiveDate) -> Vec<(String, ChartConfig)> {
    let months = recent_months(today, 6);
    let data: Vec<DataPoint> = months
        .iter()
        .enumerate()
        .map(|(m, label)| {
            REGIONS
                .iter()
                .enumerate()
                .fold(DataPoint::new(label.as_str()), |p, (r, region)| {
                    let base = 40.0 + 12.0 * r as f64;
                    let wave = ((m * 7 + r * 3) % 11) as f64 * 4.5;
                    p.with(*region, (base + wave) * 1000.0)
                })
        })
        .collect();
    let keys: Vec<String> = REGIONS.iter().map(|s| s.to_string()).collect();

    let monthly_total: Vec<DataPoint> = data
        .iter()
        .map(|p| {
            let sum: f64 = keys.iter().filter_map(|k| p.value(k)).sum();
            DataPoint::new(p.label.as_str()).with("revenue", sum)
        })
        .collect();

    let mix = vec![
        SliceDatum::new("Subscriptions", 48.0),
        SliceDatum::new("Services", 27.0),
        SliceDatum::new("Hardware", 15.0),
        SliceDatum::new("Training", 10.0),
    ];

    vec![
        (
            "Revenue by region".to_string(),
            ChartConfig::bar(data.clone(), keys.clone(), ChartMode::Grouped)
                .titled("Revenue by region"),
        ),
        (
            "Regional stack".to_string(),
            ChartConfig::bar(data, keys, ChartMode::Stacked).titled("Regional stack"),
        ),
        (
            "Monthly revenue".to_string(),
            {
                let mut c = ChartConfig::bar(
                    monthly_total,
                    vec!["revenue".to_string()],
                    ChartMode::Grouped,
                )
                .titled("Monthly revenue");
                c.legend.show = false;
                c
            },
        ),
        (
            "Revenue mix".to_string(),
            ChartConfig::donut(mix).titled("Revenue mix"),
        ),
    ]
}

fn storage() -> Vec<(String, ChartConfig)> {
    const MB: f64 = 1024.0 * 1024.0;
    let tree = TreeMapNode::branch(
        0,
        "/",
        vec![
            TreeMapNode::branch(
                1,
                "media",
                vec![
                    TreeMapNode::leaf(2, "videos", 5200.0 * MB),
                    TreeMapNode::leaf(3, "photos", 2100.0 * MB),
                    TreeMapNode::leaf(4, "music", 900.0 * MB),
                ],
            ),
            TreeMapNode::branch(
                5,
                "code",
                vec![
                    TreeMapNode::leaf(6, "target", 3100.0 * MB),
                    TreeMapNode::leaf(7, "node_modules", 1800.0 * MB),
                    TreeMapNode::leaf(8, "src", 120.0 * MB),
                ],
            ),
            TreeMapNode::branch(
                9,
                "documents",
                vec![
                    TreeMapNode::leaf(10, "reports", 400.0 * MB),
                    TreeMapNode::leaf(11, "scans", 650.0 * MB),
                ],
            ),
            TreeMapNode::leaf(12, "cache", 1400.0 * MB),
        ],
    );

    let by_branch: Vec<SliceDatum> = tree
        .children
        .iter()
        .map(|c| SliceDatum::new(c.name.as_str(), c.weight()))
        .collect();

    let largest: Vec<DataPoint> = {
        let mut leaves: Vec<(&str, f64)> = Vec::new();
        collect_leaves(&tree, &mut leaves);
        leaves.sort_by(|a, b| b.1.total_cmp(&a.1));
        leaves
            .into_iter()
            .take(5)
            .map(|(name, size)| DataPoint::new(name).with("size", size))
            .collect()
    };

    let mut treemap = ChartConfig::treemap(tree).titled("Disk usage");
    treemap.tooltip.format = ValueFormat::Bytes;

    let mut donut = ChartConfig::donut(by_branch).titled("Usage by folder");
    donut.tooltip.format = ValueFormat::Bytes;

    let mut bars = ChartConfig::bar(largest, vec!["size".to_string()], ChartMode::Grouped)
        .titled("Largest items");
    bars.tooltip.format = ValueFormat::Bytes;
    bars.axes.format = ValueFormat::Bytes;
    bars.legend.show = false;
    bars.margin.left = 64.0;

    vec![
        ("Disk usage".to_string(), treemap),
        ("Usage by folder".to_string(), donut),
        ("Largest items".to_string(), bars),
    ]
}

fn collect_leaves<'a>(node: &'a TreeMapNode, out: &mut Vec<(&'a str, f64)>) {
    if node.is_leaf() {
        out.push((node.name.as_str(), node.weight()));
    } else {
        for child in &node.children {
            collect_leaves(child, out);
        }
    }
}
