//! Permission tree construction
//!
//! Turns a flat permission list into a forest keyed by `parent_id`.

use std::collections::HashMap;

use shared::models::{Permission, PermissionNode, is_root_parent};

/// Build a forest from `permissions`.
///
/// - nodes whose `parent_id` is `""` or `"0"` become roots
/// - every other node is appended to its parent's `children`
/// - a node whose parent is absent from the input is dropped together with
///   its descendants; nodes on a parent cycle are never reachable and are
///   dropped the same way
///
/// Roots and children keep input order, so callers pre-sort by `sort`.
pub fn build_permission_tree(permissions: Vec<Permission>) -> Vec<PermissionNode> {
    build_permission_tree_under(permissions, "")
}

/// Same as [`build_permission_tree`] but nodes whose `parent_id` equals
/// `root_id` become the roots. A root sentinel behaves like the plain build.
pub fn build_permission_tree_under(
    permissions: Vec<Permission>,
    root_id: &str,
) -> Vec<PermissionNode> {
    let n = permissions.len();
    let is_top = |parent_id: &str| {
        if is_root_parent(root_id) {
            is_root_parent(parent_id)
        } else {
            parent_id == root_id
        }
    };

    // pass 1: id → index (first occurrence wins)
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(n);
    for (i, p) in permissions.iter().enumerate() {
        index.entry(p.id.as_str()).or_insert(i);
    }

    // pass 2: link each node to the root list or its parent
    let mut roots = Vec::new();
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (i, p) in permissions.iter().enumerate() {
        if is_top(&p.parent_id) {
            roots.push(i);
        } else if let Some(&parent) = index.get(p.parent_id.as_str()) {
            children[parent].push(i);
        }
    }
    drop(index);

    // breadth-first order from the roots; unreachable nodes never appear
    let mut order = Vec::with_capacity(n);
    order.extend_from_slice(&roots);
    let mut head = 0;
    while head < order.len() {
        let i = order[head];
        order.extend_from_slice(&children[i]);
        head += 1;
    }

    // assemble bottom-up so every child is finished before its parent
    let mut slots: Vec<Option<Permission>> = permissions.into_iter().map(Some).collect();
    let mut built: Vec<Option<PermissionNode>> = vec![None; n];
    for &i in order.iter().rev() {
        let Some(permission) = slots[i].take() else {
            continue;
        };
        let kids = children[i]
            .iter()
            .filter_map(|&c| built[c].take())
            .collect();
        built[i] = Some(PermissionNode {
            permission,
            children: kids,
        });
    }

    roots.iter().filter_map(|&i| built[i].take()).collect()
}

/// Count nodes across a forest
pub fn tree_size(forest: &[PermissionNode]) -> usize {
    forest.iter().map(PermissionNode::size).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{PermissionType, Status};

    fn perm(id: &str, parent: &str, sort: i64) -> Permission {
        Permission {
            id: id.into(),
            code: format!("code:{id}"),
            name: id.to_uppercase(),
            permission_type: PermissionType::Menu,
            parent_id: parent.into(),
            path: None,
            icon: None,
            sort,
            status: Status::Enabled,
            remark: None,
            created_at: 0,
            created_by: String::new(),
            updated_at: 0,
            updated_by: String::new(),
            deleted_at: None,
            deleted_by: None,
        }
    }

    fn ids(nodes: &[PermissionNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.permission.id.as_str()).collect()
    }

    #[test]
    fn test_simple_forest() {
        let tree = build_permission_tree(vec![
            perm("A", "0", 1),
            perm("B", "A", 2),
            perm("C", "0", 3),
        ]);
        assert_eq!(ids(&tree), vec!["A", "C"]);
        assert_eq!(ids(&tree[0].children), vec!["B"]);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_full_depth() {
        let tree = build_permission_tree(vec![
            perm("root", "", 0),
            perm("child", "root", 0),
            perm("grandchild", "child", 0),
            perm("great", "grandchild", 0),
        ]);
        assert_eq!(tree.len(), 1);
        let great = &tree[0].children[0].children[0].children[0];
        assert_eq!(great.permission.id, "great");
        assert_eq!(tree_size(&tree), 4);
    }

    #[test]
    fn test_child_before_parent_in_input() {
        let tree = build_permission_tree(vec![perm("B", "A", 0), perm("A", "0", 0)]);
        assert_eq!(ids(&tree), vec!["A"]);
        assert_eq!(ids(&tree[0].children), vec!["B"]);
    }

    #[test]
    fn test_children_keep_input_order() {
        let tree = build_permission_tree(vec![
            perm("P", "0", 0),
            perm("z", "P", 1),
            perm("a", "P", 2),
            perm("m", "P", 3),
        ]);
        assert_eq!(ids(&tree[0].children), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_orphans_are_dropped() {
        let input = vec![
            perm("A", "0", 0),
            perm("X", "missing", 0),
            perm("Y", "X", 0),
            perm("B", "A", 0),
        ];
        let tree = build_permission_tree(input);
        assert_eq!(ids(&tree), vec!["A"]);
        assert_eq!(tree_size(&tree), 2);
    }

    #[test]
    fn test_cycles_are_dropped() {
        let tree = build_permission_tree(vec![
            perm("A", "0", 0),
            perm("L", "M", 0),
            perm("M", "L", 0),
            perm("S", "S", 0),
        ]);
        assert_eq!(ids(&tree), vec!["A"]);
        assert_eq!(tree_size(&tree), 1);
    }

    #[test]
    fn test_partition_property() {
        // every kept node appears exactly once
        let input: Vec<Permission> = (0..50)
            .map(|i| {
                let parent = if i % 7 == 0 { "0".to_string() } else { format!("n{}", i / 2) };
                perm(&format!("n{i}"), &parent, i)
            })
            .collect();
        let tree = build_permission_tree(input.clone());

        let mut seen = Vec::new();
        let mut stack: Vec<&PermissionNode> = tree.iter().collect();
        while let Some(node) = stack.pop() {
            seen.push(node.permission.id.clone());
            stack.extend(node.children.iter());
        }
        seen.sort();
        let before = seen.len();
        seen.dedup();
        assert_eq!(seen.len(), before);
        // every parent index is smaller than the child's, so all nodes are reachable
        assert_eq!(seen.len(), input.len());
        assert_eq!(tree_size(&tree), seen.len());
    }

    #[test]
    fn test_build_under_concrete_parent() {
        let tree = build_permission_tree_under(
            vec![perm("x", "sys", 0), perm("y", "sys", 1), perm("x1", "x", 0)],
            "sys",
        );
        assert_eq!(ids(&tree), vec!["x", "y"]);
        assert_eq!(ids(&tree[0].children), vec!["x1"]);

        // with the root sentinel nothing here is top-level
        let tree = build_permission_tree_under(vec![perm("x", "sys", 0)], "0");
        assert!(tree.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(build_permission_tree(Vec::new()).is_empty());
    }
}
