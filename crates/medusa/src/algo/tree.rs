//! Deterministic top-down tree placement: a bottom-up subtree-width pass
//! followed by a top-down banding pass. Identical input produces identical
//! output on every invocation.

use crate::algo::collide::{self, Circle};
use crate::algo::{CompactTreeOptions, TreeOptions};
use crate::error::Result;
use crate::graph::{Graph, LayoutResult, Point, Viewport};
use crate::hierarchy::{Forest, visual_tier};

pub fn layout(graph: &Graph, opts: &TreeOptions, viewport: Viewport) -> Result<LayoutResult> {
    graph.validate()?;
    let forest = Forest::build(&graph.nodes);
    let mut result = LayoutResult::default();
    if forest.nodes.is_empty() {
        return Ok(result);
    }

    let widths = subtree_widths(&forest, opts.leaf_width);
    if let [root] = forest.roots[..] {
        place(&forest, &widths, opts, root, viewport.width / 2.0, opts.top_margin, &mut result);
    } else {
        // Multiple roots hang off a virtual root that never reaches the
        // output; the real roots share the top-margin row, banded around the
        // horizontal center exactly like siblings under a real parent.
        place_children(
            &forest,
            &widths,
            opts,
            &forest.roots,
            viewport.width / 2.0,
            opts.top_margin,
            &mut result,
        );
    }
    Ok(result)
}

/// Tree placement at compact spacing, then a generic collision cleanup pass
/// over the produced positions.
pub fn compact_layout(
    graph: &Graph,
    opts: &CompactTreeOptions,
    viewport: Viewport,
) -> Result<LayoutResult> {
    let mut result = layout(graph, &opts.tree, viewport)?;
    let forest = Forest::build(&graph.nodes);

    let mut ids: Vec<&String> = Vec::with_capacity(result.positions.len());
    let mut circles: Vec<Circle> = Vec::with_capacity(result.positions.len());
    for (id, p) in &result.positions {
        let depth = forest.index_of.get(id.as_str()).map_or(0, |&i| forest.depth[i]);
        ids.push(id);
        circles.push(Circle {
            x: p.x,
            y: p.y,
            radius: visual_tier(depth).radius,
        });
    }
    collide::resolve(&mut circles, &opts.cleanup);

    let positions = ids
        .into_iter()
        .zip(&circles)
        .map(|(id, c)| (id.clone(), Point { x: c.x, y: c.y }))
        .collect();
    Ok(LayoutResult { positions })
}

/// `max(leafWidth, Σ child widths)` from the leaves up.
fn subtree_widths(forest: &Forest<'_>, leaf_width: f64) -> Vec<f64> {
    fn fill(forest: &Forest<'_>, leaf_width: f64, i: usize, out: &mut [f64]) -> f64 {
        let sum: f64 = forest.children[i]
            .iter()
            .map(|&c| fill(forest, leaf_width, c, out))
            .sum();
        out[i] = sum.max(leaf_width);
        out[i]
    }

    let mut out = vec![0.0; forest.nodes.len()];
    for &r in &forest.roots {
        fill(forest, leaf_width, r, &mut out);
    }
    out
}

fn place(
    forest: &Forest<'_>,
    widths: &[f64],
    opts: &TreeOptions,
    node: usize,
    x: f64,
    y: f64,
    result: &mut LayoutResult,
) {
    result
        .positions
        .insert(forest.nodes[node].id.clone(), Point { x, y });
    place_children(
        forest,
        widths,
        opts,
        &forest.children[node],
        x,
        y + opts.level_height,
        result,
    );
}

/// Distributes `children` left-to-right around `center_x`, each centered in a
/// band as wide as its own subtree, separated by the sibling gap.
fn place_children(
    forest: &Forest<'_>,
    widths: &[f64],
    opts: &TreeOptions,
    children: &[usize],
    center_x: f64,
    y: f64,
    result: &mut LayoutResult,
) {
    if children.is_empty() {
        return;
    }
    let bands: f64 = children.iter().map(|&c| widths[c]).sum();
    let total = bands + opts.sibling_gap * (children.len() - 1) as f64;
    let mut cursor = center_x - total / 2.0;
    for &c in children {
        place(forest, widths, opts, c, cursor + widths[c] / 2.0, y, result);
        cursor += widths[c] + opts.sibling_gap;
    }
}
