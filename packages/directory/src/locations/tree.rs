//! Flat location list -> sorted nested forest.
//!
//! Nodes whose `parentId` does not resolve inside the input become roots.
//! Children (and roots) are ordered by name, case-insensitively, with the raw
//! name and then the id as tie-breakers so output is deterministic.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::common::LocationId;
use crate::locations::models::{LocationNode, LocationTreeNode};

/// Collation used for every name-ordered listing in the directory.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_nodes(a: &LocationNode, b: &LocationNode) -> Ordering {
    compare_names(&a.name, &b.name).then_with(|| a.id.cmp(&b.id))
}

/// Sort nodes in place by name.
pub fn sort_by_name(nodes: &mut [LocationNode]) {
    nodes.sort_by(compare_nodes);
}

/// Build the display tree. The input is left untouched.
pub fn build_tree(nodes: &[LocationNode]) -> Vec<LocationTreeNode> {
    let by_id: HashMap<LocationId, &LocationNode> = nodes.iter().map(|n| (n.id, n)).collect();

    let mut children: HashMap<LocationId, Vec<&LocationNode>> = HashMap::new();
    let mut roots: Vec<&LocationNode> = Vec::new();

    for node in nodes {
        match node.parent_id {
            Some(parent_id) if parent_id != node.id && by_id.contains_key(&parent_id) => {
                children.entry(parent_id).or_default().push(node);
            }
            _ => roots.push(node),
        }
    }

    // Whatever is unreachable from a root hangs off a parent cycle. Promote
    // the first cycle member in name order, whatever the input order was, so
    // rebuilding from `flatten` gives the same forest.
    let mut reachable: HashSet<LocationId> = HashSet::new();
    let mut stack: Vec<LocationId> = roots.iter().map(|n| n.id).collect();
    mark_reachable(&mut stack, &children, &mut reachable);

    for node in nodes {
        if reachable.contains(&node.id) {
            continue;
        }
        let head = cycle_head(node, &by_id);
        if let Some(parent_id) = head.parent_id {
            if let Some(siblings) = children.get_mut(&parent_id) {
                siblings.retain(|s| s.id != head.id);
            }
        }
        roots.push(head);
        let mut stack = vec![head.id];
        mark_reachable(&mut stack, &children, &mut reachable);
    }

    roots.sort_by(|a, b| compare_nodes(a, b));
    roots
        .into_iter()
        .map(|root| assemble(root, &children))
        .collect()
}

fn mark_reachable(
    stack: &mut Vec<LocationId>,
    children: &HashMap<LocationId, Vec<&LocationNode>>,
    reachable: &mut HashSet<LocationId>,
) {
    while let Some(id) = stack.pop() {
        if reachable.insert(id) {
            if let Some(kids) = children.get(&id) {
                stack.extend(kids.iter().map(|k| k.id));
            }
        }
    }
}

/// Smallest node, by name, on the parent cycle above `start`.
///
/// `start` must be unreachable from every root, so its parent chain always
/// resolves inside the input and eventually repeats.
fn cycle_head<'a>(
    start: &'a LocationNode,
    by_id: &HashMap<LocationId, &'a LocationNode>,
) -> &'a LocationNode {
    let parent_of = |node: &LocationNode| node.parent_id.and_then(|id| by_id.get(&id).copied());

    let mut visited: HashSet<LocationId> = HashSet::new();
    let mut current = start;
    while visited.insert(current.id) {
        match parent_of(current) {
            Some(parent) => current = parent,
            None => return current,
        }
    }

    // `current` is on the cycle; walk it once
    let entry = current;
    let mut head = entry;
    let mut member = entry;
    while let Some(parent) = parent_of(member) {
        if parent.id == entry.id {
            break;
        }
        if compare_nodes(parent, head) == Ordering::Less {
            head = parent;
        }
        member = parent;
    }
    head
}

fn assemble(
    node: &LocationNode,
    children: &HashMap<LocationId, Vec<&LocationNode>>,
) -> LocationTreeNode {
    let mut kids: Vec<&LocationNode> = children.get(&node.id).cloned().unwrap_or_default();
    kids.sort_by(|a, b| compare_nodes(a, b));

    LocationTreeNode {
        node: node.clone(),
        children: kids
            .into_iter()
            .map(|child| assemble(child, children))
            .collect(),
    }
}

/// Depth-first pre-order listing of every node in the forest.
pub fn flatten(tree: &[LocationTreeNode]) -> Vec<LocationNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&LocationTreeNode> = tree.iter().rev().collect();
    while let Some(entry) = stack.pop() {
        out.push(entry.node.clone());
        stack.extend(entry.children.iter().rev());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locations::models::{Ancestry, LocationType};

    fn country(name: &str) -> LocationNode {
        LocationNode::new(name, LocationType::Country, Ancestry::root())
    }

    fn child(name: &str, parent: &LocationNode, location_type: LocationType) -> LocationNode {
        LocationNode::new(name, location_type, Ancestry::under(parent))
    }

    #[test]
    fn test_nests_and_sorts() {
        let canada = country("Canada");
        let austria = country("austria");
        let quebec = child("Quebec", &canada, LocationType::Province);
        let ontario = child("Ontario", &canada, LocationType::Province);
        let toronto = child("Toronto", &ontario, LocationType::City);
        let ottawa = child("Ottawa", &ontario, LocationType::City);

        let nodes = vec![
            toronto.clone(),
            canada.clone(),
            quebec.clone(),
            ottawa.clone(),
            austria.clone(),
            ontario.clone(),
        ];
        let tree = build_tree(&nodes);

        let roots: Vec<_> = tree.iter().map(|t| t.node.name.as_str()).collect();
        assert_eq!(roots, vec!["austria", "Canada"]);

        let provinces: Vec<_> = tree[1].children.iter().map(|t| t.node.name.as_str()).collect();
        assert_eq!(provinces, vec!["Ontario", "Quebec"]);

        let cities: Vec<_> = tree[1].children[0]
            .children
            .iter()
            .map(|t| t.node.name.as_str())
            .collect();
        assert_eq!(cities, vec!["Ottawa", "Toronto"]);
    }

    #[test]
    fn test_dangling_parent_becomes_root() {
        let ghost = country("Ghost");
        let orphan = child("Orphan", &ghost, LocationType::Province);

        let tree = build_tree(&[orphan.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].node.id, orphan.id);
    }

    fn shape(tree: &[LocationTreeNode]) -> Vec<(String, Vec<String>)> {
        flatten(tree)
            .iter()
            .map(|node| {
                let kids = find(tree, node.id)
                    .map(|t| t.children.iter().map(|c| c.node.name.clone()).collect())
                    .unwrap_or_default();
                (node.name.clone(), kids)
            })
            .collect()
    }

    fn find(tree: &[LocationTreeNode], id: LocationId) -> Option<&LocationTreeNode> {
        tree.iter()
            .find_map(|t| if t.node.id == id { Some(t) } else { find(&t.children, id) })
    }

    #[test]
    fn test_cycle_does_not_drop_nodes() {
        let mut a = country("A");
        let mut b = country("B");
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);

        let tree = build_tree(&[a.clone(), b.clone()]);
        assert_eq!(flatten(&tree).len(), 2);
    }

    #[test]
    fn test_cycle_member_is_promoted_not_its_dependents() {
        let mut a = country("A");
        let mut b = country("B");
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let mut c = country("C");
        c.parent_id = Some(a.id);

        let first = build_tree(&[c.clone(), a.clone(), b.clone()]);
        let expected = vec![
            ("A".to_string(), vec!["B".to_string(), "C".to_string()]),
            ("B".to_string(), vec![]),
            ("C".to_string(), vec![]),
        ];
        assert_eq!(shape(&first), expected);

        // input order does not matter
        assert_eq!(build_tree(&[b.clone(), c.clone(), a.clone()]), first);

        let second = build_tree(&flatten(&first));
        assert_eq!(second, first);
    }

    #[test]
    fn test_cycle_head_is_smallest_member() {
        let mut x = country("x-ray");
        let mut y = country("Yankee");
        let mut z = country("Zulu");
        x.parent_id = Some(z.id);
        z.parent_id = Some(y.id);
        y.parent_id = Some(x.id);
        let mut tail = country("alpha");
        tail.parent_id = Some(y.id);

        let tree = build_tree(&[tail.clone(), z.clone(), y.clone(), x.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].node.name, "x-ray");
        assert_eq!(flatten(&tree).len(), 4);
        assert_eq!(build_tree(&flatten(&tree)), tree);
    }

    #[test]
    fn test_rebuild_from_flatten_is_stable() {
        let canada = country("Canada");
        let ontario = child("Ontario", &canada, LocationType::Province);
        let toronto = child("Toronto", &ontario, LocationType::City);
        let ghost = country("Ghost");
        let orphan = child("Orphan", &ghost, LocationType::Province);
        let lost_city = child("Lost City", &orphan, LocationType::City);

        let tree = build_tree(&[lost_city, toronto, orphan, ontario, canada]);
        let roots: Vec<_> = tree.iter().map(|t| t.node.name.as_str()).collect();
        assert_eq!(roots, vec!["Canada", "Orphan"]);
        assert_eq!(build_tree(&flatten(&tree)), tree);
    }

    #[test]
    fn test_flatten_is_preorder() {
        let canada = country("Canada");
        let ontario = child("Ontario", &canada, LocationType::Province);
        let toronto = child("Toronto", &ontario, LocationType::City);

        let tree = build_tree(&[toronto.clone(), ontario.clone(), canada.clone()]);
        let names: Vec<_> = flatten(&tree).into_iter().map(|n| n.name).collect();
        assert_eq!(names, vec!["Canada", "Ontario", "Toronto"]);
    }

    #[test]
    fn test_compare_names_case_insensitive() {
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_names("ottawa", "Ontario"), Ordering::Greater);
        assert_ne!(compare_names("a", "A"), Ordering::Equal);
    }
}
