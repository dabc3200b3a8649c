//! Category/group data transform: drops hidden series, then either passes
//! values through for side-by-side bars or accumulates them into stacks.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{ChartError, Result};
use crate::model::{ChartMode, DataPoint, HiddenSet};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedCategory {
    pub label: String,
    /// Present values only, in active group-key order.
    pub values: Vec<(String, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackInterval {
    pub key: String,
    pub start: f64,
    pub end: f64,
}

impl StackInterval {
    pub fn value(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedCategory {
    pub label: String,
    pub intervals: Vec<StackInterval>,
}

impl StackedCategory {
    pub fn total(&self) -> f64 {
        self.intervals.last().map(|i| i.end).unwrap_or(0.0)
    }

    pub fn interval(&self, key: &str) -> Option<&StackInterval> {
        self.intervals.iter().find(|i| i.key == key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "categories", rename_all = "snake_case")]
pub enum SeriesSet {
    Grouped(Vec<GroupedCategory>),
    Stacked(Vec<StackedCategory>),
}

impl SeriesSet {
    pub fn empty(mode: ChartMode) -> Self {
        match mode {
            ChartMode::Grouped => SeriesSet::Grouped(Vec::new()),
            ChartMode::Stacked => SeriesSet::Stacked(Vec::new()),
        }
    }

    pub fn mode(&self) -> ChartMode {
        match self {
            SeriesSet::Grouped(_) => ChartMode::Grouped,
            SeriesSet::Stacked(_) => ChartMode::Stacked,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SeriesSet::Grouped(c) => c.len(),
            SeriesSet::Stacked(c) => c.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn labels(&self) -> Vec<&str> {
        match self {
            SeriesSet::Grouped(c) => c.iter().map(|c| c.label.as_str()).collect(),
            SeriesSet::Stacked(c) => c.iter().map(|c| c.label.as_str()).collect(),
        }
    }

    /// Largest bar extent: the tallest single value when grouped, the tallest stack when stacked.
    pub fn max_value(&self) -> f64 {
        let max = match self {
            SeriesSet::Grouped(cats) => cats
                .iter()
                .flat_map(|c| c.values.iter().map(|(_, v)| *v))
                .fold(f64::NEG_INFINITY, f64::max),
            SeriesSet::Stacked(cats) => cats
                .iter()
                .map(StackedCategory::total)
                .fold(f64::NEG_INFINITY, f64::max),
        };
        if max.is_finite() {
            max.max(0.0)
        } else {
            0.0
        }
    }
}

/// Non-hidden keys in their original order.
pub fn active_keys<'a>(group_keys: &'a [String], hidden: &HiddenSet) -> Vec<&'a str> {
    group_keys
        .iter()
        .enumerate()
        .filter(|(i, _)| !hidden.contains(i))
        .map(|(_, k)| k.as_str())
        .collect()
}

fn check_keys(group_keys: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(group_keys.len());
    for key in group_keys {
        if !seen.insert(key.as_str()) {
            return Err(ChartError::DuplicateGroupKey(key.clone()));
        }
    }
    Ok(())
}

pub fn try_group(
    data: &[DataPoint],
    group_keys: &[String],
    hidden: &HiddenSet,
) -> Result<Vec<GroupedCategory>> {
    check_keys(group_keys)?;
    let keys = active_keys(group_keys, hidden);
    Ok(data
        .iter()
        .map(|point| GroupedCategory {
            label: point.label.clone(),
            values: keys
                .iter()
                .filter_map(|k| point.value(k).map(|v| (k.to_string(), v)))
                .collect(),
        })
        .collect())
}

pub fn try_stack(
    data: &[DataPoint],
    group_keys: &[String],
    hidden: &HiddenSet,
) -> Result<Vec<StackedCategory>> {
    check_keys(group_keys)?;
    let keys = active_keys(group_keys, hidden);
    data.iter()
        .map(|point| {
            let mut running = 0.0_f64;
            let mut intervals = Vec::with_capacity(keys.len());
            for key in &keys {
                let raw = point.value(key).unwrap_or(0.0);
                if raw < 0.0 {
                    debug!(label = %point.label, key, raw, "negative value clamped to zero in stack");
                }
                let start = running;
                running += raw.max(0.0);
                if !running.is_finite() {
                    return Err(ChartError::NonFiniteSum {
                        label: point.label.clone(),
                    });
                }
                intervals.push(StackInterval {
                    key: key.to_string(),
                    start,
                    end: running,
                });
            }
            Ok(StackedCategory {
                label: point.label.clone(),
                intervals,
            })
        })
        .collect()
}

pub fn try_transform(
    data: &[DataPoint],
    group_keys: &[String],
    mode: ChartMode,
    hidden: &HiddenSet,
) -> Result<SeriesSet> {
    match mode {
        ChartMode::Grouped => try_group(data, group_keys, hidden).map(SeriesSet::Grouped),
        ChartMode::Stacked => try_stack(data, group_keys, hidden).map(SeriesSet::Stacked),
    }
}

/// Call-site wrapper: a failed transform is logged and renders as an empty series.
pub fn transform_or_empty(
    data: &[DataPoint],
    group_keys: &[String],
    mode: ChartMode,
    hidden: &HiddenSet,
) -> SeriesSet {
    match try_transform(data, group_keys, mode, hidden) {
        Ok(series) => series,
        Err(err) => {
            warn!(%err, ?mode, categories = data.len(), "series transform failed, rendering empty");
            SeriesSet::empty(mode)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(k: &[&str]) -> Vec<String> {
        k.iter().map(|s| s.to_string()).collect()
    }

    fn sample() -> Vec<DataPoint> {
        vec![
            DataPoint::new("Jan").with("a", 10.0).with("b", 20.0),
            DataPoint::new("Feb").with("a", 5.0).with("c", 7.0),
        ]
    }

    #[test]
    fn stacks_in_key_order() {
        let data = vec![DataPoint::new("Jan").with("a", 10.0).with("b", 20.0)];
        let stacked = try_stack(&data, &keys(&["a", "b"]), &HiddenSet::new()).unwrap();
        let jan = &stacked[0];
        assert_eq!(jan.label, "Jan");
        let a = jan.interval("a").unwrap();
        let b = jan.interval("b").unwrap();
        assert_eq!((a.start, a.end), (0.0, 10.0));
        assert_eq!((b.start, b.end), (10.0, 30.0));
        assert_eq!(jan.total(), 30.0);
    }

    #[test]
    fn missing_values_are_zero_when_stacked_and_absent_when_grouped() {
        let data = sample();
        let k = keys(&["a", "b", "c"]);
        let stacked = try_stack(&data, &k, &HiddenSet::new()).unwrap();
        let feb = &stacked[1];
        let b = feb.interval("b").unwrap();
        assert_eq!((b.start, b.end), (5.0, 5.0));
        assert_eq!(feb.interval("c").unwrap().end, 12.0);

        let grouped = try_group(&data, &k, &HiddenSet::new()).unwrap();
        assert_eq!(
            grouped[1].values,
            vec![("a".to_string(), 5.0), ("c".to_string(), 7.0)]
        );
    }

    #[test]
    fn hidden_keys_are_dropped_without_reordering() {
        let data = sample();
        let k = keys(&["a", "b", "c"]);
        let hidden: HiddenSet = [1].into_iter().collect();
        let stacked = try_stack(&data, &k, &hidden).unwrap();
        let order: Vec<_> = stacked[0].intervals.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(order, vec!["a", "c"]);

        let grouped = try_group(&data, &k, &hidden).unwrap();
        for cat in &grouped {
            for (key, _) in &cat.values {
                assert!(k.contains(key));
                assert_ne!(key, "b");
            }
        }
    }

    #[test]
    fn stacked_intervals_never_decrease() {
        let data = vec![DataPoint::new("x")
            .with("a", 3.0)
            .with("b", -4.0)
            .with("c", 0.0)
            .with("d", 2.5)];
        let stacked = try_stack(&data, &keys(&["a", "b", "c", "d"]), &HiddenSet::new()).unwrap();
        let mut last = 0.0;
        for interval in &stacked[0].intervals {
            assert!(interval.start >= last);
            assert!(interval.end >= interval.start);
            last = interval.end;
        }
        assert_eq!(stacked[0].total(), 5.5);
    }

    #[test]
    fn duplicate_keys_degrade_to_empty() {
        let data = sample();
        let k = keys(&["a", "a"]);
        assert!(matches!(
            try_transform(&data, &k, ChartMode::Stacked, &HiddenSet::new()),
            Err(ChartError::DuplicateGroupKey(_))
        ));
        let series = transform_or_empty(&data, &k, ChartMode::Stacked, &HiddenSet::new());
        assert!(series.is_empty());
        assert_eq!(series.mode(), ChartMode::Stacked);
    }

    #[test]
    fn overflowing_stack_degrades_to_empty() {
        let data = vec![DataPoint::new("big").with("a", f64::MAX).with("b", f64::MAX)];
        let series =
            transform_or_empty(&data, &keys(&["a", "b"]), ChartMode::Stacked, &HiddenSet::new());
        assert!(series.is_empty());
    }

    #[test]
    fn max_value_depends_on_mode() {
        let data = sample();
        let k = keys(&["a", "b", "c"]);
        let grouped = transform_or_empty(&data, &k, ChartMode::Grouped, &HiddenSet::new());
        let stacked = transform_or_empty(&data, &k, ChartMode::Stacked, &HiddenSet::new());
        assert_eq!(grouped.max_value(), 20.0);
        assert_eq!(stacked.max_value(), 30.0);
        assert_eq!(SeriesSet::empty(ChartMode::Grouped).max_value(), 0.0);
    }
}
