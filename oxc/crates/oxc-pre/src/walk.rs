//! Reusable tree traversal.
//!
//! Pre-order, post-order, and breadth-first walks over block trees with
//! skip/stop control, plus the small query utilities built on top of
//! them. The macro cursor in `expand` layers frontier control over the
//! same traversal idea.

use std::collections::VecDeque;

use oxc_par::{Block, Literal, Node, PropValue};

/// Traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOrder {
    /// Parents before children.
    Pre,
    /// Children before parents.
    Post,
    /// Level by level.
    Bfs,
}

/// What a walk callback wants next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkControl {
    /// Keep going.
    Continue,
    /// Do not descend into this node's children.
    Skip,
    /// Terminate the entire walk.
    Stop,
}

/// Walk configuration.
pub struct WalkOptions<'f> {
    /// Traversal order.
    pub order: WalkOrder,
    /// Record the ancestor chain in the context.
    pub track_ancestors: bool,
    /// Record the depth in the context.
    pub track_depth: bool,
    /// Only invoke the callback for nodes passing the filter. Children of
    /// filtered-out nodes are still visited.
    pub filter: Option<&'f dyn Fn(&Node) -> bool>,
}

impl Default for WalkOptions<'_> {
    fn default() -> Self {
        Self {
            order: WalkOrder::Pre,
            track_ancestors: true,
            track_depth: true,
            filter: None,
        }
    }
}

/// Context handed to the walk callback alongside each node.
pub struct WalkContext<'a> {
    /// Parent block, if any.
    pub parent: Option<&'a Block>,
    /// Depth below the roots (0 for top-level nodes); only populated when
    /// `track_depth` is set.
    pub depth: usize,
    /// Ancestor chain, outermost first; only populated when
    /// `track_ancestors` is set.
    pub ancestors: Vec<&'a Block>,
}

/// Walk a forest of nodes.
///
/// The callback decides per node whether to continue, skip the node's
/// children, or stop the walk entirely. With `Post` order, `Skip` has no
/// effect (children were already visited).
pub fn walk<'a>(
    nodes: &'a [Node],
    callback: &mut dyn FnMut(&'a Node, &WalkContext<'a>) -> WalkControl,
    options: &WalkOptions<'_>,
) {
    match options.order {
        WalkOrder::Pre | WalkOrder::Post => {
            let mut ancestors: Vec<&Block> = Vec::new();
            for node in nodes {
                if walk_depth_first(node, callback, options, &mut ancestors, 0)
                    == WalkControl::Stop
                {
                    return;
                }
            }
        }
        WalkOrder::Bfs => walk_bfs(nodes, callback, options),
    }
}

fn visit_node<'a>(
    node: &'a Node,
    ancestors: &[&'a Block],
    depth: usize,
    options: &WalkOptions<'_>,
    callback: &mut dyn FnMut(&'a Node, &WalkContext<'a>) -> WalkControl,
) -> WalkControl {
    if let Some(filter) = options.filter {
        if !filter(node) {
            return WalkControl::Continue;
        }
    }
    let context = WalkContext {
        parent: ancestors.last().copied(),
        depth: if options.track_depth { depth } else { 0 },
        ancestors: if options.track_ancestors {
            ancestors.to_vec()
        } else {
            Vec::new()
        },
    };
    callback(node, &context)
}

fn walk_depth_first<'a>(
    node: &'a Node,
    callback: &mut dyn FnMut(&'a Node, &WalkContext<'a>) -> WalkControl,
    options: &WalkOptions<'_>,
    ancestors: &mut Vec<&'a Block>,
    depth: usize,
) -> WalkControl {
    if options.order == WalkOrder::Pre {
        match visit_node(node, ancestors, depth, options, callback) {
            WalkControl::Stop => return WalkControl::Stop,
            WalkControl::Skip => return WalkControl::Continue,
            WalkControl::Continue => {}
        }
    }

    if let Node::Block(block) = node {
        ancestors.push(block);
        for child in &block.children {
            if walk_depth_first(child, callback, options, ancestors, depth + 1)
                == WalkControl::Stop
            {
                ancestors.pop();
                return WalkControl::Stop;
            }
        }
        ancestors.pop();
    }

    if options.order == WalkOrder::Post {
        return match visit_node(node, ancestors, depth, options, callback) {
            WalkControl::Stop => WalkControl::Stop,
            _ => WalkControl::Continue,
        };
    }

    WalkControl::Continue
}

fn walk_bfs<'a>(
    nodes: &'a [Node],
    callback: &mut dyn FnMut(&'a Node, &WalkContext<'a>) -> WalkControl,
    options: &WalkOptions<'_>,
) {
    let mut queue: VecDeque<(&Node, usize, Vec<&Block>)> = nodes
        .iter()
        .map(|node| (node, 0usize, Vec::new()))
        .collect();

    while let Some((node, depth, ancestors)) = queue.pop_front() {
        let passes = options.filter.map(|f| f(node)).unwrap_or(true);
        let control = if passes {
            let context = WalkContext {
                parent: ancestors.last().copied(),
                depth: if options.track_depth { depth } else { 0 },
                ancestors: if options.track_ancestors {
                    ancestors.clone()
                } else {
                    Vec::new()
                },
            };
            callback(node, &context)
        } else {
            WalkControl::Continue
        };

        match control {
            WalkControl::Stop => return,
            WalkControl::Skip => continue,
            WalkControl::Continue => {}
        }

        if let Node::Block(block) = node {
            let mut child_ancestors = ancestors;
            child_ancestors.push(block);
            for child in &block.children {
                queue.push_back((child, depth + 1, child_ancestors.clone()));
            }
        }
    }
}

// =============================================================================
// QUERY UTILITIES
// =============================================================================

/// First node satisfying the predicate, in pre-order.
pub fn find_node<'a>(nodes: &'a [Node], predicate: impl Fn(&Node) -> bool) -> Option<&'a Node> {
    let mut found = None;
    walk(
        nodes,
        &mut |node, _ctx| {
            if predicate(node) {
                found = Some(node);
                WalkControl::Stop
            } else {
                WalkControl::Continue
            }
        },
        &WalkOptions::default(),
    );
    found
}

/// All nodes satisfying the predicate, in pre-order.
pub fn find_all_nodes<'a>(
    nodes: &'a [Node],
    predicate: impl Fn(&Node) -> bool,
) -> Vec<&'a Node> {
    let mut found = Vec::new();
    walk(
        nodes,
        &mut |node, _ctx| {
            if predicate(node) {
                found.push(node);
            }
            WalkControl::Continue
        },
        &WalkOptions::default(),
    );
    found
}

/// All blocks carrying a tag with the given name.
pub fn find_by_tag<'a>(nodes: &'a [Node], name: &str) -> Vec<&'a Block> {
    find_all_nodes(nodes, |node| match node {
        Node::Block(block) => block.tags.iter().any(|t| t.name == name),
        _ => false,
    })
    .into_iter()
    .filter_map(|node| match node {
        Node::Block(block) => Some(block),
        _ => None,
    })
    .collect()
}

/// All blocks carrying a property, optionally with a specific literal
/// value.
pub fn find_by_property<'a>(
    nodes: &'a [Node],
    name: &str,
    value: Option<&Literal>,
) -> Vec<&'a Block> {
    find_all_nodes(nodes, |node| match node {
        Node::Block(block) => match block.properties.get(name) {
            Some(PropValue::Literal(lit)) => value.map(|v| v == lit).unwrap_or(true),
            Some(_) => value.is_none(),
            None => false,
        },
        _ => false,
    })
    .into_iter()
    .filter_map(|node| match node {
        Node::Block(block) => Some(block),
        _ => None,
    })
    .collect()
}

/// Ancestor chain of a block found by pointer identity, outermost first.
pub fn get_ancestors<'a>(nodes: &'a [Node], target: &Block) -> Vec<&'a Block> {
    let mut result = Vec::new();
    walk(
        nodes,
        &mut |node, ctx| match node {
            Node::Block(block) if std::ptr::eq(block, target) => {
                result = ctx.ancestors.clone();
                WalkControl::Stop
            }
            _ => WalkControl::Continue,
        },
        &WalkOptions::default(),
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_par::parse_source;

    fn nodes(source: &str) -> Vec<Node> {
        parse_source(source, "walk.ox").unwrap().blocks
    }

    fn id_of(node: &Node) -> String {
        match node {
            Node::Block(b) => b.id.clone().unwrap_or_default(),
            Node::FreeText(_) => "<text>".to_string(),
            Node::Template(_) => "<template>".to_string(),
        }
    }

    fn order_of(source: &str, order: WalkOrder) -> Vec<String> {
        let tree = nodes(source);
        let mut visited = Vec::new();
        walk(
            &tree,
            &mut |node, _ctx| {
                visited.push(id_of(node));
                WalkControl::Continue
            },
            &WalkOptions {
                order,
                ..WalkOptions::default()
            },
        );
        visited
    }

    const TREE: &str = "[A [B [D]] [C]] [E]";

    #[test]
    fn test_pre_order() {
        assert_eq!(order_of(TREE, WalkOrder::Pre), ["A", "B", "D", "C", "E"]);
    }

    #[test]
    fn test_post_order() {
        assert_eq!(order_of(TREE, WalkOrder::Post), ["D", "B", "C", "A", "E"]);
    }

    #[test]
    fn test_bfs_order() {
        assert_eq!(order_of(TREE, WalkOrder::Bfs), ["A", "E", "B", "C", "D"]);
    }

    #[test]
    fn test_skip_children() {
        let tree = nodes(TREE);
        let mut visited = Vec::new();
        walk(
            &tree,
            &mut |node, _ctx| {
                let id = id_of(node);
                let skip = id == "B";
                visited.push(id);
                if skip {
                    WalkControl::Skip
                } else {
                    WalkControl::Continue
                }
            },
            &WalkOptions::default(),
        );
        assert_eq!(visited, ["A", "B", "C", "E"]);
    }

    #[test]
    fn test_stop_terminates_walk() {
        let tree = nodes(TREE);
        let mut visited = Vec::new();
        walk(
            &tree,
            &mut |node, _ctx| {
                visited.push(id_of(node));
                if visited.len() == 2 {
                    WalkControl::Stop
                } else {
                    WalkControl::Continue
                }
            },
            &WalkOptions::default(),
        );
        assert_eq!(visited, ["A", "B"]);
    }

    #[test]
    fn test_context_parent_and_depth() {
        let tree = nodes(TREE);
        let mut seen = Vec::new();
        walk(
            &tree,
            &mut |node, ctx| {
                seen.push((
                    id_of(node),
                    ctx.parent.and_then(|p| p.id.clone()),
                    ctx.depth,
                    ctx.ancestors.len(),
                ));
                WalkControl::Continue
            },
            &WalkOptions::default(),
        );
        assert!(seen.contains(&("D".to_string(), Some("B".to_string()), 2, 2)));
        assert!(seen.contains(&("E".to_string(), None, 0, 0)));
    }

    #[test]
    fn test_filter() {
        let tree = nodes(TREE);
        let filter = |node: &Node| matches!(node, Node::Block(b) if b.id.as_deref() == Some("C"));
        let mut visited = Vec::new();
        walk(
            &tree,
            &mut |node, _ctx| {
                visited.push(id_of(node));
                WalkControl::Continue
            },
            &WalkOptions {
                filter: Some(&filter),
                ..WalkOptions::default()
            },
        );
        assert_eq!(visited, ["C"]);
    }

    #[test]
    fn test_find_node_and_all() {
        let tree = nodes(TREE);
        let found = find_node(&tree, |n| id_of(n) == "C").unwrap();
        assert_eq!(id_of(found), "C");
        assert!(find_node(&tree, |n| id_of(n) == "Z").is_none());
        assert_eq!(find_all_nodes(&tree, |n| matches!(n, Node::Block(_))).len(), 5);
    }

    #[test]
    fn test_find_by_tag_and_property() {
        let tree = nodes("#note [N (pinned: true)] [M (pinned: false)] [O]");
        assert_eq!(find_by_tag(&tree, "note").len(), 1);
        assert_eq!(find_by_property(&tree, "pinned", None).len(), 2);
        assert_eq!(
            find_by_property(&tree, "pinned", Some(&Literal::Bool(true))).len(),
            1
        );
    }

    #[test]
    fn test_get_ancestors() {
        let tree = nodes(TREE);
        let d = match find_node(&tree, |n| id_of(n) == "D").unwrap() {
            Node::Block(b) => b,
            _ => unreachable!(),
        };
        let chain: Vec<Option<&str>> = get_ancestors(&tree, d)
            .iter()
            .map(|b| b.id.as_deref())
            .collect();
        assert_eq!(chain, [Some("A"), Some("B")]);
    }
}
