use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Indices into a group-key (or slice, or branch) sequence that the legend has toggled off.
pub type HiddenSet = BTreeSet<usize>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl Default for NodeId {
    fn default() -> Self {
        NodeId(0)
    }
}

/// One category's values across groups.
///
/// Values are kept as raw JSON so loosely typed input survives deserialization;
/// [`DataPoint::value`] decides what counts as numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub label: String,
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
}

impl DataPoint {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.data.insert(key.into(), Value::from(value));
        self
    }

    /// Finite numeric value stored under `key`, or `None` when it is missing or not a number.
    pub fn value(&self, key: &str) -> Option<f64> {
        self.data
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    #[default]
    Grouped,
    Stacked,
}

/// A single donut slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceDatum {
    pub label: String,
    pub value: f64,
}

impl SliceDatum {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// What the pointer is over. Only exists while hover is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipDatum {
    pub label: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeMapNode {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeMapNode>,
}

impl TreeMapNode {
    pub fn leaf(id: u64, name: impl Into<String>, value: f64) -> Self {
        Self {
            id: NodeId(id),
            name: name.into(),
            value,
            children: Vec::new(),
        }
    }

    /// Interior node whose displayed value is the sum of its children.
    pub fn branch(id: u64, name: impl Into<String>, children: Vec<TreeMapNode>) -> Self {
        let value = children.iter().map(TreeMapNode::weight).sum();
        Self {
            id: NodeId(id),
            name: name.into(),
            value,
            children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Layout weight: the leaf value, or the sum over leaves for interior nodes.
    /// Negative and non-finite leaf values weigh nothing.
    pub fn weight(&self) -> f64 {
        if self.is_leaf() {
            if self.value.is_finite() {
                self.value.max(0.0)
            } else {
                0.0
            }
        } else {
            self.children.iter().map(TreeMapNode::weight).sum()
        }
    }

    pub fn find(&self, id: NodeId) -> Option<&TreeMapNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_ignores_non_numeric_entries() {
        let mut p = DataPoint::new("Jan").with("a", 10.0);
        p.data.insert("b".into(), Value::String("n/a".into()));
        p.data.insert("c".into(), Value::Null);
        assert_eq!(p.value("a"), Some(10.0));
        assert_eq!(p.value("b"), None);
        assert_eq!(p.value("c"), None);
        assert_eq!(p.value("missing"), None);
    }

    #[test]
    fn data_point_deserializes_from_loose_json() {
        let p: DataPoint =
            serde_json::from_str(r#"{"label":"Feb","data":{"a":3,"b":"x"}}"#).unwrap();
        assert_eq!(p.value("a"), Some(3.0));
        assert_eq!(p.value("b"), None);
    }

    #[test]
    fn branch_weight_sums_leaves() {
        let tree = TreeMapNode::branch(
            0,
            "root",
            vec![
                TreeMapNode::leaf(1, "a", 4.0),
                TreeMapNode::branch(2, "b", vec![TreeMapNode::leaf(3, "c", 6.0)]),
                TreeMapNode::leaf(4, "bad", f64::NAN),
                TreeMapNode::leaf(5, "neg", -3.0),
            ],
        );
        assert_eq!(tree.weight(), 10.0);
        assert_eq!(tree.value, 10.0);
        assert_eq!(tree.find(NodeId(3)).map(|n| n.name.as_str()), Some("c"));
        assert!(tree.find(NodeId(42)).is_none());
    }
}
