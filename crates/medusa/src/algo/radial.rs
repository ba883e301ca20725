//! Polar placement around the viewport center: first-level branches split the
//! circle into equal sectors, descendants sit in concentric depth rings inside
//! the sector they inherit.

use crate::algo::collide::{self, Circle};
use crate::algo::{BasicRadialOptions, RadialClusterOptions};
use crate::error::Result;
use crate::graph::{Graph, LayoutResult, Point, Viewport};
use crate::hierarchy::{Forest, visual_tier};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Branch 0 points straight up; screen y grows downward.
const START_ANGLE: f64 = -FRAC_PI_2;

/// Complexity weighting for the root-to-branch radius.
const NODE_COUNT_WEIGHT: f64 = 6.0;
const BRANCHING_WEIGHT: f64 = 14.0;

/// Usable-fraction schedule for fanning siblings inside an inherited sector.
const USABLE_BASE: f64 = 0.5;
const USABLE_DEPTH_GAIN: f64 = 0.08;
const USABLE_SIBLING_GAIN: f64 = 0.04;
const USABLE_MAX: f64 = 0.95;

/// Clear padding between node edges during scoped relaxation.
const RELAX_PADDING: f64 = 8.0;

pub fn cluster_layout(
    graph: &Graph,
    opts: &RadialClusterOptions,
    viewport: Viewport,
) -> Result<LayoutResult> {
    graph.validate()?;
    let forest = Forest::build(&graph.nodes);
    let mut result = LayoutResult::default();
    if forest.nodes.is_empty() {
        return Ok(result);
    }

    let center = viewport.center();
    let mut pass = ClusterPass {
        forest: &forest,
        opts,
        center,
        pos: vec![None; forest.nodes.len()],
        members: Vec::new(),
    };

    // A lone root anchors the center; multiple roots hang off a virtual
    // center node that never reaches the output, and become branches.
    let branches: &[usize] = match forest.roots[..] {
        [root] => {
            pass.pos[root] = Some(center);
            &forest.children[root]
        }
        _ => &forest.roots,
    };

    if !branches.is_empty() {
        let first_radius = opts.base_radius
            + complexity_factor(forest.nodes.len(), avg_branching_factor(&forest));
        let span = TAU / branches.len() as f64;
        for (k, &b) in branches.iter().enumerate() {
            pass.members.clear();
            pass.place(b, START_ANGLE + span * k as f64, span, 1, first_radius);
            pass.relax_members();
        }
    }

    collect(&forest, &pass.pos, &mut result);
    Ok(result)
}

/// Uniform polar variant: rings at `depth * ring_spacing`, every sibling set
/// fanned across the full inherited sector, no complexity scaling, no
/// relaxation.
pub fn basic_layout(
    graph: &Graph,
    opts: &BasicRadialOptions,
    viewport: Viewport,
) -> Result<LayoutResult> {
    graph.validate()?;
    let forest = Forest::build(&graph.nodes);
    let mut result = LayoutResult::default();
    if forest.nodes.is_empty() {
        return Ok(result);
    }

    let center = viewport.center();
    let mut pos: Vec<Option<Point>> = vec![None; forest.nodes.len()];
    let branches: &[usize] = match forest.roots[..] {
        [root] => {
            pos[root] = Some(center);
            &forest.children[root]
        }
        _ => &forest.roots,
    };

    if !branches.is_empty() {
        let span = TAU / branches.len() as f64;
        for (k, &b) in branches.iter().enumerate() {
            place_basic(&forest, opts, center, b, START_ANGLE + span * k as f64, span, 1, &mut pos);
        }
    }

    collect(&forest, &pos, &mut result);
    Ok(result)
}

struct ClusterPass<'f, 'n> {
    forest: &'f Forest<'n>,
    opts: &'f RadialClusterOptions,
    center: Point,
    pos: Vec<Option<Point>>,
    /// (node, ring) pairs of the branch currently being placed.
    members: Vec<(usize, usize)>,
}

impl ClusterPass<'_, '_> {
    fn place(&mut self, node: usize, angle: f64, span: f64, ring: usize, radius: f64) {
        self.pos[node] = Some(polar(self.center, angle, radius));
        self.members.push((node, ring));

        let forest = self.forest;
        let kids = &forest.children[node];
        let next_radius = radius + self.opts.ring_spacing;
        match kids[..] {
            [] => {}
            // A single child continues the parent's angle and keeps the whole
            // sector for its own descendants.
            [only] => self.place(only, angle, span, ring + 1, next_radius),
            _ => {
                let usable = span * usable_fraction(ring + 1, kids.len());
                let child_span = usable / kids.len() as f64;
                for (j, &c) in kids.iter().enumerate() {
                    let a = angle - usable / 2.0 + child_span * (j as f64 + 0.5);
                    self.place(c, a, child_span, ring + 1, next_radius);
                }
            }
        }
    }

    /// Scoped relaxation: a few pairwise passes over one branch's members,
    /// restricted to pairs on the same or adjacent rings. The center node is
    /// never a member, so the root cannot move.
    fn relax_members(&mut self) {
        if self.members.len() < 2 {
            return;
        }
        let mut circles: Vec<Circle> = self
            .members
            .iter()
            .map(|&(node, _)| {
                let p = self.pos[node].unwrap_or(self.center);
                Circle {
                    x: p.x,
                    y: p.y,
                    radius: visual_tier(self.forest.depth[node]).radius,
                }
            })
            .collect();

        for _ in 0..self.opts.relaxation_passes {
            let mut moved = false;
            for i in 0..circles.len() {
                for j in (i + 1)..circles.len() {
                    if self.members[i].1.abs_diff(self.members[j].1) > 1 {
                        continue;
                    }
                    let (left, right) = circles.split_at_mut(j);
                    if collide::separate_pair(
                        &mut left[i],
                        &mut right[0],
                        RELAX_PADDING,
                        collide::fallback_angle(i + j),
                    ) {
                        moved = true;
                    }
                }
            }
            if !moved {
                break;
            }
        }

        for (&(node, _), c) in self.members.iter().zip(&circles) {
            self.pos[node] = Some(Point { x: c.x, y: c.y });
        }
    }
}

fn place_basic(
    forest: &Forest<'_>,
    opts: &BasicRadialOptions,
    center: Point,
    node: usize,
    angle: f64,
    span: f64,
    ring: usize,
    pos: &mut [Option<Point>],
) {
    pos[node] = Some(polar(center, angle, opts.ring_spacing * ring as f64));

    let kids = &forest.children[node];
    if kids.is_empty() {
        return;
    }
    let child_span = span / kids.len() as f64;
    for (j, &c) in kids.iter().enumerate() {
        let a = angle - span / 2.0 + child_span * (j as f64 + 0.5);
        place_basic(forest, opts, center, c, a, child_span, ring + 1, pos);
    }
}

/// Denser maps push the first ring further out; strictly increasing in both
/// the node count and the average branching factor.
fn complexity_factor(total_node_count: usize, avg_branching_factor: f64) -> f64 {
    NODE_COUNT_WEIGHT * (total_node_count as f64).sqrt()
        + BRANCHING_WEIGHT * avg_branching_factor
}

/// Mean child count over nodes that have children; 0.0 for a childless forest.
fn avg_branching_factor(forest: &Forest<'_>) -> f64 {
    let mut parents = 0usize;
    let mut edges = 0usize;
    for kids in &forest.children {
        if !kids.is_empty() {
            parents += 1;
            edges += kids.len();
        }
    }
    if parents == 0 {
        0.0
    } else {
        edges as f64 / parents as f64
    }
}

/// Grows with ring depth and sibling count; deeper, denser rings may spread
/// across most of the inherited sector but never the whole of it.
fn usable_fraction(ring: usize, sibling_count: usize) -> f64 {
    (USABLE_BASE + USABLE_DEPTH_GAIN * ring as f64 + USABLE_SIBLING_GAIN * sibling_count as f64)
        .min(USABLE_MAX)
}

fn polar(center: Point, angle: f64, radius: f64) -> Point {
    Point {
        x: center.x + radius * angle.cos(),
        y: center.y + radius * angle.sin(),
    }
}

fn collect(forest: &Forest<'_>, pos: &[Option<Point>], result: &mut LayoutResult) {
    for (i, n) in forest.nodes.iter().enumerate() {
        if let Some(p) = pos[i] {
            result.positions.insert(n.id.clone(), p);
        }
    }
}
