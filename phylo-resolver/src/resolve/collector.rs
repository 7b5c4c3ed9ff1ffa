//! Descendant name collection
//!
//! Walks a tree depth-first in document order and gathers every descendant
//! name. Nodes carrying `linked_tree` have that classification's tree fetched,
//! parsed and spliced in as their only child; `link_only` nodes contribute no
//! name of their own. Each branch remembers the linked classifications entered
//! above it; a link back into one of them truncates the branch, so mutually
//! linked trees terminate. A link that cannot be loaded keeps the node's own
//! children.

use crate::store::{StoredTree, TreeStore};
use phylo_common::tree::{parse_tree, TreeNode};
use phylo_common::Result;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Names under the first node named `target` (document order), excluding `target`
///
/// Returns an empty list when no node carries that name.
pub async fn collect_direct_children_names_of_target(
    root: &TreeNode,
    target: &str,
    store: &dyn TreeStore,
) -> Vec<String> {
    match find_node(root, target) {
        Some(node) => walk(node, store).await,
        None => Vec::new(),
    }
}

/// Names of every descendant of `root`, excluding the root's own name
pub async fn collect_all_children_names_with_linked_tree(
    root: &TreeNode,
    store: &dyn TreeStore,
) -> Vec<String> {
    walk(root, store).await
}

/// Stored trees whose raw text mentions `name`
pub async fn find_related_classifications(
    store: &dyn TreeStore,
    name: &str,
) -> Result<Vec<StoredTree>> {
    store.search_trees(name).await
}

/// Descendants of `name` across every stored tree that mentions it
///
/// Each hit is parsed and searched for a node named `name`; the per-tree
/// results are unioned in hit order without duplicates. Hits that fail to
/// parse or do not contain the node contribute nothing.
pub async fn collect_from_related_trees(store: &dyn TreeStore, name: &str) -> Result<Vec<String>> {
    let hits = find_related_classifications(store, name).await?;
    debug!(classification = %name, hits = hits.len(), "Related trees found");

    let mut names = OrderedNames::default();
    for hit in &hits {
        let Some(tree) = parse_tree(Some(&hit.content)) else {
            debug!(classification_id = hit.classification_id, "Skipping unparseable tree");
            continue;
        };
        let found = collect_direct_children_names_of_target(&tree, name, store).await;
        names.extend(found);
    }

    Ok(names.into_vec())
}

/// First node named `target` in depth-first document order
pub fn find_node<'a>(root: &'a TreeNode, target: &str) -> Option<&'a TreeNode> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.name == target {
            return Some(node);
        }
        stack.extend(node.children().iter().rev());
    }
    None
}

async fn walk(root: &TreeNode, store: &dyn TreeStore) -> Vec<String> {
    let mut loaded: HashMap<String, Option<TreeNode>> = HashMap::new();
    let mut names = OrderedNames::default();
    // each entry carries the linked trees entered on its own branch
    let mut stack: Vec<(TreeNode, Vec<String>)> = vec![(root.clone(), Vec::new())];
    let mut is_root = true;

    while let Some((mut node, mut path)) = stack.pop() {
        let mut children = node.children.take().unwrap_or_default();

        if let Some(link) = node.linked_tree.take() {
            if path.contains(&link) {
                debug!(linked_tree = %link, "Linked tree re-entered on this branch, truncating");
                children.clear();
            } else {
                let linked_root = match loaded.get(&link) {
                    Some(cached) => cached.clone(),
                    None => {
                        let tree = load_linked_tree(store, &link).await;
                        loaded.insert(link.clone(), tree.clone());
                        tree
                    }
                };
                if let Some(linked_root) = linked_root {
                    children = vec![linked_root];
                    path.push(link);
                }
            }
        }

        if !is_root && !node.link_only {
            names.push(node.name);
        }
        is_root = false;

        stack.extend(children.into_iter().rev().map(|child| (child, path.clone())));
    }

    names.remove(&root.name);
    names.into_vec()
}

/// Insertion-ordered, duplicate-free list of non-empty names
#[derive(Default)]
struct OrderedNames {
    seen: HashSet<String>,
    names: Vec<String>,
}

impl OrderedNames {
    fn push(&mut self, name: String) {
        if name.trim().is_empty() {
            return;
        }
        if self.seen.insert(name.clone()) {
            self.names.push(name);
        }
    }

    fn extend(&mut self, names: impl IntoIterator<Item = String>) {
        for name in names {
            self.push(name);
        }
    }

    fn remove(&mut self, name: &str) {
        if self.seen.remove(name) {
            self.names.retain(|n| n != name);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;

    fn linked(name: &str, link: &str, link_only: bool) -> TreeNode {
        TreeNode {
            name: name.to_string(),
            linked_tree: Some(link.to_string()),
            link_only,
            ..TreeNode::default()
        }
    }

    fn sample() -> TreeNode {
        TreeNode::named("爬虫類").with_children(vec![
            TreeNode::named("ワニ目").with_children(vec![
                TreeNode::named("クロコダイル科"),
                TreeNode::named("アリゲーター科")
                    .with_children(vec![TreeNode::named("アリゲーター属")]),
            ]),
            TreeNode::named("カメ目"),
        ])
    }

    #[tokio::test]
    async fn test_direct_children_of_target_in_document_order() {
        let store = MemoryStore::default();
        let names = collect_direct_children_names_of_target(&sample(), "ワニ目", &store).await;
        assert_eq!(names, vec!["クロコダイル科", "アリゲーター科", "アリゲーター属"]);
    }

    #[tokio::test]
    async fn test_missing_target_yields_nothing() {
        let store = MemoryStore::default();
        let names = collect_direct_children_names_of_target(&sample(), "トカゲ目", &store).await;
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_all_children_excludes_root() {
        let store = MemoryStore::default();
        let names = collect_all_children_names_with_linked_tree(&sample(), &store).await;
        assert_eq!(
            names,
            vec!["ワニ目", "クロコダイル科", "アリゲーター科", "アリゲーター属", "カメ目"]
        );
    }

    #[tokio::test]
    async fn test_linked_tree_spliced_and_link_only_name_excluded() {
        let store = MemoryStore::default().with_tree(
            "ガビアル科",
            r#"{"name": "ガビアル科", "children": [{"name": "インドガビアル"}]}"#,
        );
        let root = TreeNode::named("ワニ目").with_children(vec![
            TreeNode::named("クロコダイル科"),
            linked("placeholder", "ガビアル科", true),
        ]);

        let names = collect_all_children_names_with_linked_tree(&root, &store).await;
        assert_eq!(names, vec!["クロコダイル科", "ガビアル科", "インドガビアル"]);
    }

    #[tokio::test]
    async fn test_link_replaces_own_children() {
        let store = MemoryStore::default()
            .with_tree("B", r#"{"name": "B", "children": [{"name": "from-link"}]}"#);
        let root = TreeNode::named("A").with_children(vec![
            linked("B", "B", false).with_children(vec![TreeNode::named("stale")]),
        ]);

        let names = collect_all_children_names_with_linked_tree(&root, &store).await;
        assert_eq!(names, vec!["B", "from-link"]);
    }

    #[tokio::test]
    async fn test_malformed_linked_tree_keeps_own_children() {
        let store = MemoryStore::default().with_tree("B", "{ broken");
        let root = TreeNode::named("A").with_children(vec![
            linked("B", "B", false).with_children(vec![TreeNode::named("own")]),
        ]);

        let names = collect_all_children_names_with_linked_tree(&root, &store).await;
        assert_eq!(names, vec!["B", "own"]);
    }

    #[tokio::test]
    async fn test_mutually_linked_trees_terminate() {
        let store = MemoryStore::default()
            .with_tree(
                "A",
                r#"{"name": "A", "children": [{"name": "a1"}, {"name": "toB", "linked_tree": "B", "link_only": true}]}"#,
            )
            .with_tree(
                "B",
                r#"{"name": "B", "children": [{"name": "b1"}, {"name": "toA", "linked_tree": "A", "link_only": true}]}"#,
            );
        let root = phylo_common::tree::parse_tree(store.raw_tree("A")).unwrap();

        let names = collect_all_children_names_with_linked_tree(&root, &store).await;
        assert_eq!(names, vec!["a1", "B", "b1"]);
        assert!(!names.contains(&"A".to_string()));
    }

    #[tokio::test]
    async fn test_sibling_links_to_missing_tree_keep_own_children() {
        let store = MemoryStore::default();
        let root = TreeNode::named("R").with_children(vec![
            linked("X1", "Missing", false).with_children(vec![TreeNode::named("c1")]),
            linked("X2", "Missing", false).with_children(vec![TreeNode::named("c2")]),
        ]);

        let names = collect_all_children_names_with_linked_tree(&root, &store).await;
        assert_eq!(names, vec!["X1", "c1", "X2", "c2"]);
    }

    #[tokio::test]
    async fn test_sibling_links_to_same_tree_both_spliced() {
        let store = MemoryStore::default()
            .with_tree("B", r#"{"name": "B", "children": [{"name": "b1"}]}"#);
        let root = TreeNode::named("R").with_children(vec![
            linked("left", "B", true),
            TreeNode::named("mid").with_children(vec![linked("right", "B", true)]),
        ]);

        let names = collect_all_children_names_with_linked_tree(&root, &store).await;
        assert_eq!(names, vec!["B", "b1", "mid"]);
    }

    #[tokio::test]
    async fn test_self_link_terminates() {
        let store = MemoryStore::default().with_tree(
            "A",
            r#"{"name": "A", "children": [{"name": "again", "linked_tree": "A"}]}"#,
        );
        let root = phylo_common::tree::parse_tree(store.raw_tree("A")).unwrap();

        let names = collect_all_children_names_with_linked_tree(&root, &store).await;
        assert_eq!(names, vec!["again"]);
    }

    #[tokio::test]
    async fn test_related_trees_unioned_without_duplicates() {
        let store = MemoryStore::default()
            .with_tree(
                "爬虫類",
                r#"{"name": "爬虫類", "children": [{"name": "ワニ目", "children": [{"name": "クロコダイル科"}]}]}"#,
            )
            .with_tree(
                "主竜類",
                r#"{"name": "主竜類", "children": [{"name": "ワニ目", "children": [{"name": "クロコダイル科"}, {"name": "アリゲーター科"}]}]}"#,
            )
            .with_tree("壊れた", "ワニ目 {");

        let names = collect_from_related_trees(&store, "ワニ目").await.unwrap();
        assert_eq!(names, vec!["クロコダイル科", "アリゲーター科"]);
    }
}
