//! Depth analysis over the parent forest, plus the depth-tiered visual scale
//! table the layouts use for spacing and collision radii.

use crate::graph::Node;
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, VecDeque};

/// Indexed view of the parent forest: id lookups, input-ordered child lists,
/// the effective root set, and per-node depth. Built once per layout call.
#[derive(Debug)]
pub(crate) struct Forest<'a> {
    pub(crate) nodes: &'a [Node],
    pub(crate) index_of: FxHashMap<&'a str, usize>,
    pub(crate) children: Vec<Vec<usize>>,
    pub(crate) roots: Vec<usize>,
    pub(crate) depth: Vec<usize>,
}

impl<'a> Forest<'a> {
    pub(crate) fn build(nodes: &'a [Node]) -> Self {
        let mut index_of: FxHashMap<&'a str, usize> = FxHashMap::default();
        for (i, n) in nodes.iter().enumerate() {
            index_of.entry(n.id.as_str()).or_insert(i);
        }

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        let mut roots: Vec<usize> = Vec::new();
        for (i, n) in nodes.iter().enumerate() {
            match n.parent.as_deref().and_then(|p| index_of.get(p).copied()) {
                Some(p) if p != i => children[p].push(i),
                // No parent, parent id absent, or a self-reference: all roots.
                _ => roots.push(i),
            }
        }

        let mut depth = vec![usize::MAX; nodes.len()];
        let mut queue: VecDeque<usize> = VecDeque::new();
        for &r in &roots {
            depth[r] = 0;
            queue.push_back(r);
        }
        let mut bfs = |queue: &mut VecDeque<usize>, depth: &mut Vec<usize>| {
            while let Some(i) = queue.pop_front() {
                for &c in &children[i] {
                    if depth[c] == usize::MAX {
                        depth[c] = depth[i] + 1;
                        queue.push_back(c);
                    }
                }
            }
        };
        bfs(&mut queue, &mut depth);

        // Members of a parent cycle are unreachable from any root; promote the
        // first unvisited one (input order) and traverse again until all nodes
        // carry a depth.
        for i in 0..nodes.len() {
            if depth[i] == usize::MAX {
                depth[i] = 0;
                roots.push(i);
                queue.push_back(i);
                bfs(&mut queue, &mut depth);
            }
        }

        // Keep only traversal-tree edges. The lone mismatch case is the back
        // edge closing a promoted cycle, which would otherwise send recursive
        // layout passes around the loop forever.
        for i in 0..nodes.len() {
            let d = depth[i];
            children[i].retain(|&c| depth[c] == d + 1);
        }

        Self {
            nodes,
            index_of,
            children,
            roots,
            depth,
        }
    }
}

/// Breadth-first depth of every node: 0 for roots (including orphaned-parent
/// and cycle-trapped nodes, which are promoted to roots), parent depth + 1
/// otherwise. Pure function of the input forest.
pub fn compute_depths(nodes: &[Node]) -> BTreeMap<String, usize> {
    let forest = Forest::build(nodes);
    nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.clone(), forest.depth[i]))
        .collect()
}

/// Visual scale for one depth tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualTier {
    pub radius: f64,
    pub stroke_width: f64,
    pub font_size: f64,
}

const TIERS: [VisualTier; 5] = [
    VisualTier {
        radius: 34.0,
        stroke_width: 3.0,
        font_size: 18.0,
    },
    VisualTier {
        radius: 26.0,
        stroke_width: 2.5,
        font_size: 16.0,
    },
    VisualTier {
        radius: 21.0,
        stroke_width: 2.0,
        font_size: 14.0,
    },
    VisualTier {
        radius: 17.0,
        stroke_width: 1.5,
        font_size: 12.0,
    },
    VisualTier {
        radius: 14.0,
        stroke_width: 1.25,
        font_size: 11.0,
    },
];

/// Fixed lookup indexed by `min(depth, last tier)`; depths past the table end
/// share the last tier's values.
pub fn visual_tier(depth: usize) -> &'static VisualTier {
    &TIERS[depth.min(TIERS.len() - 1)]
}
