//! Age window filter
//!
//! Prunes a tree down to the nodes relevant to a selected set of age ids.
//! The input tree is never mutated; a filtered copy is returned.

use super::{has_overlap, AgeId, AgeIndex};
use crate::tree::TreeNode;
use std::collections::BTreeSet;

/// Display eligibility of a single node (children not considered)
///
/// - no bounds: always eligible
/// - `from` only: some selected id ≤ min(ids(from))
/// - `to` only: some selected id ≥ max(ids(to))
/// - both: selected ids overlap `ids_in_range(from, to)`
///
/// A bound that does not resolve against the index makes the node ineligible.
pub fn is_eligible(node: &TreeNode, selected: &BTreeSet<AgeId>, index: &AgeIndex) -> bool {
    match (node.from.as_deref(), node.to.as_deref()) {
        (None, None) => true,
        (Some(from), None) => match index.ids_for_name(from).into_iter().min() {
            Some(bound) => selected.iter().any(|&id| id <= bound),
            None => false,
        },
        (None, Some(to)) => match index.ids_for_name(to).into_iter().max() {
            Some(bound) => selected.iter().any(|&id| id >= bound),
            None => false,
        },
        (Some(from), Some(to)) => {
            if index.ids_for_name(from).is_empty() || index.ids_for_name(to).is_empty() {
                return false;
            }
            has_overlap(selected, &index.ids_in_range(from, to))
        }
    }
}

/// Filter a tree against `selected`
///
/// Returns `None` when there is no tree at all or when nothing survives.
pub fn filter_tree(
    root: Option<&TreeNode>,
    selected: &BTreeSet<AgeId>,
    index: &AgeIndex,
) -> Option<TreeNode> {
    filter_node(root?, selected, index)
}

fn filter_node(node: &TreeNode, selected: &BTreeSet<AgeId>, index: &AgeIndex) -> Option<TreeNode> {
    if node.is_blank() {
        return None;
    }

    let eligible = is_eligible(node, selected, index);

    // Ineligible parents may still surface eligible descendants
    let children: Option<Vec<TreeNode>> = node.children.as_ref().map(|children| {
        children
            .iter()
            .filter_map(|child| filter_node(child, selected, index))
            .collect()
    });
    let any_child_survived = children.as_ref().is_some_and(|c| !c.is_empty());

    if !any_child_survived && (!eligible || node.name.trim().is_empty()) {
        return None;
    }

    Some(TreeNode {
        children,
        ..node_without_children(node)
    })
}

fn node_without_children(node: &TreeNode) -> TreeNode {
    TreeNode {
        name: node.name.clone(),
        children: None,
        from: node.from.clone(),
        to: node.to.clone(),
        linked_tree: node.linked_tree.clone(),
        link_only: node.link_only,
    }
}
