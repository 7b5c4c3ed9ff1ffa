//! Phylogenetic tree model and tolerant parser
//!
//! Trees are user-edited JSON documents. Parsing never fails loudly: any
//! text that is not an object carrying a `name` key is treated as "no tree".

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// One node of a user-maintained phylogenetic tree
///
/// `linked_tree` names another classification whose tree is spliced in at
/// traversal time. It is a lookup key, never an embedded pointer, so each
/// tree stays a plain owned structure even when trees reference each other.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_tree: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub link_only: bool,
}

impl TreeNode {
    /// Leaf node with just a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder: replace children
    pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = Some(children);
        self
    }

    /// Children as a slice (empty when absent)
    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.children().is_empty()
    }

    /// A node with no name and no children is never displayable
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty() && !self.has_children()
    }

    /// Build a node from an already-parsed JSON value
    ///
    /// The top-level value must be an object with a `name` key. Below the
    /// root, entries that are not objects are skipped and fields with the
    /// wrong type are ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if !object.contains_key("name") {
            return None;
        }
        Some(node_from_object(object))
    }
}

/// Parse raw tree text into a [`TreeNode`]
///
/// Returns `None` for absent, empty, or malformed text, and for valid JSON
/// that is not an object carrying a `name` key.
pub fn parse_tree(text: Option<&str>) -> Option<TreeNode> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            let node = TreeNode::from_value(&value);
            if node.is_none() {
                debug!("Tree text parsed but is not an object with a name key");
            }
            node
        }
        Err(e) => {
            debug!("Ignoring malformed tree text: {}", e);
            None
        }
    }
}

fn node_from_object(object: &Map<String, Value>) -> TreeNode {
    let children = match object.get("children") {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(Value::as_object)
                .map(node_from_object)
                .collect(),
        ),
        _ => None,
    };

    TreeNode {
        name: string_field(object, "name").unwrap_or_default(),
        children,
        from: string_field(object, "from"),
        to: string_field(object, "to"),
        linked_tree: string_field(object, "linked_tree")
            .or_else(|| string_field(object, "linkedTree"))
            .filter(|name| !name.trim().is_empty()),
        link_only: bool_field(object, "link_only")
            .or_else(|| bool_field(object, "linkOnly"))
            .unwrap_or(false),
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(str::to_string)
}

fn bool_field(object: &Map<String, Value>, key: &str) -> Option<bool> {
    object.get(key).and_then(Value::as_bool)
}
