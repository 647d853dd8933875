//! Declarative sibling reordering over an element tree
//!
//! Instead of mutating a live tree, planning produces a [`ReorderPlan`]: for
//! each container path, the desired order of child keys. Applying a plan
//! sorts children by key, so applying it twice gives the same tree.
//!
//! Protection rules:
//! - a `Protected` node never moves among its siblings, and its own children
//!   keep their order;
//! - an `Exempt` child of a protected subtree may reorder its direct
//!   children only (one level), deeper descendants stay locked;
//! - protection never spreads upward: the parent of a protected node still
//!   reorders its other children around it.

use serde::Serialize;
use std::collections::BTreeMap;

/// Path separator used in plan keys
pub const PATH_SEPARATOR: char = '/';

/// Protection marking for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    /// Reorderable unless inside a protected subtree
    #[default]
    Normal,
    /// Pinned in place, children locked
    Protected,
    /// Children may reorder even inside a protected subtree
    Exempt,
}

/// One node of a declarative element tree
///
/// Keys must be unique among siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementNode {
    /// Sibling-unique key
    pub key: String,
    /// Protection marking
    pub region: Region,
    /// Children in canonical order
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    /// Leaf or container with normal region
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            region: Region::Normal,
            children: Vec::new(),
        }
    }

    /// Mark protected
    #[inline]
    #[must_use]
    pub fn protected(mut self) -> Self {
        self.region = Region::Protected;
        self
    }

    /// Mark exempt
    #[inline]
    #[must_use]
    pub fn exempt(mut self) -> Self {
        self.region = Region::Exempt;
        self
    }

    /// Append a child
    #[inline]
    #[must_use]
    pub fn child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append children
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = ElementNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Child keys in current order
    #[must_use]
    pub fn child_keys(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.key.as_str()).collect()
    }

    /// Find a descendant by plan path (root key first)
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&ElementNode> {
        let mut parts = path.split(PATH_SEPARATOR);
        if parts.next() != Some(self.key.as_str()) {
            return None;
        }
        parts.try_fold(self, |node, key| node.children.iter().find(|c| c.key == key))
    }
}

/// Desired child key order per container path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReorderPlan {
    orders: BTreeMap<String, Vec<String>>,
}

impl ReorderPlan {
    /// Plan that changes nothing
    #[inline]
    #[must_use]
    pub fn identity() -> Self {
        Self::default()
    }

    /// Whether the plan changes nothing
    #[inline]
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.orders.is_empty()
    }

    /// Desired child order for a container
    #[must_use]
    pub fn order_for(&self, path: &str) -> Option<&[String]> {
        self.orders.get(path).map(Vec::as_slice)
    }

    /// Containers the plan reorders
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.orders.keys().map(String::as_str)
    }

    /// Tree with the plan applied; idempotent
    #[must_use]
    pub fn apply(&self, root: &ElementNode) -> ElementNode {
        self.apply_at(root, &root.key)
    }

    fn apply_at(&self, node: &ElementNode, path: &str) -> ElementNode {
        let mut children: Vec<ElementNode> = node
            .children
            .iter()
            .map(|child| self.apply_at(child, &join(path, &child.key)))
            .collect();

        if let Some(order) = self.orders.get(path) {
            // Keys missing from the plan keep their relative order at the end.
            children.sort_by_key(|child| {
                order
                    .iter()
                    .position(|k| *k == child.key)
                    .unwrap_or(usize::MAX)
            });
        }

        ElementNode {
            key: node.key.clone(),
            region: node.region,
            children,
        }
    }
}

fn is_permutation(order: &[usize], len: usize) -> bool {
    let mut sorted = order.to_vec();
    sorted.sort_unstable();
    sorted.len() == len && sorted.iter().enumerate().all(|(i, j)| i == *j)
}

fn join(parent: &str, key: &str) -> String {
    format!("{parent}{PATH_SEPARATOR}{key}")
}

/// Build a plan by asking `order_fn(path, pinned)` for each reorderable container
///
/// `order_fn` returns an index permutation over the container's children;
/// `pinned[i]` marks protected children that must map to themselves.
pub(crate) fn plan_tree<F>(root: &ElementNode, order_fn: F) -> ReorderPlan
where
    F: Fn(&str, &[bool]) -> Vec<usize>,
{
    let mut plan = ReorderPlan::identity();
    walk(root, &root.key, false, &order_fn, &mut plan);
    plan
}

fn walk<F>(node: &ElementNode, path: &str, inherited_lock: bool, order_fn: &F, plan: &mut ReorderPlan)
where
    F: Fn(&str, &[bool]) -> Vec<usize>,
{
    let (children_reorderable, descendant_lock) = match node.region {
        Region::Protected => (false, true),
        Region::Exempt => (true, inherited_lock),
        Region::Normal => (!inherited_lock, inherited_lock),
    };

    if children_reorderable && node.children.len() > 1 {
        let pinned: Vec<bool> = node
            .children
            .iter()
            .map(|c| c.region == Region::Protected)
            .collect();
        let order = order_fn(path, &pinned);
        let is_identity = order.iter().enumerate().all(|(i, j)| i == *j);
        let valid = is_permutation(&order, pinned.len())
            && pinned.iter().enumerate().all(|(i, pin)| !pin || order[i] == i);
        if valid && !is_identity {
            let keys = order
                .iter()
                .map(|i| node.children[*i].key.clone())
                .collect();
            plan.orders.insert(path.to_string(), keys);
        } else if !valid {
            tracing::warn!(path, "discarding malformed sibling order");
        }
    }

    for child in &node.children {
        walk(child, &join(path, &child.key), descendant_lock, order_fn, plan);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reversed(_: &str, pinned: &[bool]) -> Vec<usize> {
        let free: Vec<usize> = (0..pinned.len()).filter(|i| !pinned[*i]).collect();
        let mut order: Vec<usize> = (0..pinned.len()).collect();
        for (slot, source) in free.iter().zip(free.iter().rev()) {
            order[*slot] = *source;
        }
        order
    }

    fn page() -> ElementNode {
        ElementNode::new("page").with_children([
            ElementNode::new("nav").with_children(["a", "b", "c"].map(ElementNode::new)),
            ElementNode::new("hero")
                .protected()
                .with_children([
                    ElementNode::new("title"),
                    ElementNode::new("cta-row")
                        .exempt()
                        .with_children(["x", "y", "z"].map(ElementNode::new)),
                    ElementNode::new("stats").with_children(["s1", "s2"].map(ElementNode::new)),
                ]),
            ElementNode::new("cards").with_children(["c1", "c2", "c3", "c4"].map(ElementNode::new)),
        ])
    }

    #[test]
    fn protected_subtree_is_locked_except_exempt_level() {
        let plan = plan_tree(&page(), reversed);
        let paths: Vec<&str> = plan.paths().collect();

        assert!(paths.contains(&"page/nav"));
        assert!(paths.contains(&"page/cards"));
        assert!(paths.contains(&"page/hero/cta-row"));
        assert!(!paths.contains(&"page/hero"));
        assert!(!paths.contains(&"page/hero/stats"));
    }

    #[test]
    fn protected_child_keeps_position_among_siblings() {
        let tree = page();
        let plan = plan_tree(&tree, reversed);
        let applied = plan.apply(&tree);
        assert_eq!(applied.child_keys(), vec!["cards", "hero", "nav"]);
        assert_eq!(applied.children[1].key, "hero");
    }

    #[test]
    fn apply_is_idempotent() {
        let tree = page();
        let plan = plan_tree(&tree, reversed);
        let once = plan.apply(&tree);
        let twice = plan.apply(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn identity_orders_are_not_recorded() {
        let plan = plan_tree(&page(), |_, pinned| (0..pinned.len()).collect());
        assert!(plan.is_identity());
        assert_eq!(plan.apply(&page()), page());
    }

    #[test]
    fn malformed_orders_are_discarded() {
        let plan = plan_tree(&page(), |_, _| vec![0]);
        assert!(plan.is_identity());
    }

    #[test]
    fn find_by_path() {
        let tree = page();
        assert_eq!(tree.find("page/hero/cta-row").map(|n| n.region), Some(Region::Exempt));
        assert!(tree.find("page/missing").is_none());
        assert!(tree.find("other").is_none());
    }
}
