//! The per-tick force chain. Each force accumulates velocity deltas; the
//! simulation integrates them afterwards, so a force never writes positions.

use super::{SimNode, XorShift64Star};
use crate::graph::{Link, Point};
use rustc_hash::FxHashMap;

/// One member of the simulation's ordered force chain.
pub trait Force {
    fn apply(&mut self, nodes: &mut [SimNode], alpha: f64);
}

/// Resolved spring between two working-set slots.
#[derive(Debug, Clone, Copy)]
struct SpringLink {
    source: usize,
    target: usize,
    distance: f64,
    strength: f64,
    /// Share of the correction carried by the target; heavier-degree
    /// endpoints move less.
    bias: f64,
}

pub struct LinkForce {
    springs: Vec<SpringLink>,
    rng: XorShift64Star,
    skipped: usize,
}

impl LinkForce {
    /// Added to the endpoint radii when no explicit link distance is given.
    pub const DEFAULT_SLACK: f64 = 30.0;

    pub(crate) fn new(
        nodes: &[SimNode],
        links: &[Link],
        index_of: &FxHashMap<String, usize>,
        distance_override: Option<f64>,
        seed: u64,
    ) -> Self {
        let mut degree = vec![0usize; nodes.len()];
        let mut resolved: Vec<(usize, usize)> = Vec::with_capacity(links.len());
        let mut skipped = 0usize;
        for l in links {
            match (index_of.get(&l.source), index_of.get(&l.target)) {
                (Some(&s), Some(&t)) if s != t => {
                    resolved.push((s, t));
                    degree[s] += 1;
                    degree[t] += 1;
                }
                _ => skipped += 1,
            }
        }

        let springs = resolved
            .into_iter()
            .map(|(s, t)| SpringLink {
                source: s,
                target: t,
                distance: distance_override
                    .unwrap_or(nodes[s].radius + nodes[t].radius + Self::DEFAULT_SLACK),
                strength: 1.0 / degree[s].min(degree[t]) as f64,
                bias: degree[s] as f64 / (degree[s] + degree[t]) as f64,
            })
            .collect();

        Self {
            springs,
            rng: XorShift64Star::new(seed),
            skipped,
        }
    }

    /// Links dropped at resolution time for naming ids outside the working
    /// set (or for being self-loops).
    pub(crate) fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Force for LinkForce {
    fn apply(&mut self, nodes: &mut [SimNode], alpha: f64) {
        for k in 0..self.springs.len() {
            let l = self.springs[k];
            let (s, t) = pair_mut(nodes, l.source, l.target);
            let mut dx = (t.x + t.vx) - (s.x + s.vx);
            let mut dy = (t.y + t.vy) - (s.y + s.vy);
            if dx == 0.0 {
                dx = self.rng.jiggle();
            }
            if dy == 0.0 {
                dy = self.rng.jiggle();
            }
            let dist = (dx * dx + dy * dy).sqrt();
            let f = (dist - l.distance) / dist * alpha * l.strength;
            let (px, py) = (dx * f, dy * f);
            t.vx -= px * l.bias;
            t.vy -= py * l.bias;
            s.vx += px * (1.0 - l.bias);
            s.vy += py * (1.0 - l.bias);
        }
    }
}

/// Pairwise charge repulsion with a hard range cutoff.
pub struct ManyBodyForce {
    rng: XorShift64Star,
}

impl ManyBodyForce {
    pub const STRENGTH: f64 = -260.0;
    pub const MAX_DISTANCE: f64 = 480.0;
    /// Squared floor stopping near-coincident pairs from exploding.
    const MIN_DISTANCE_SQ: f64 = 1.0;

    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: XorShift64Star::new(seed.wrapping_add(1)),
        }
    }
}

impl Force for ManyBodyForce {
    fn apply(&mut self, nodes: &mut [SimNode], alpha: f64) {
        let max_sq = Self::MAX_DISTANCE * Self::MAX_DISTANCE;
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let mut dx = nodes[j].x - nodes[i].x;
                let mut dy = nodes[j].y - nodes[i].y;
                let mut d2 = dx * dx + dy * dy;
                if d2 >= max_sq {
                    continue;
                }
                if dx == 0.0 {
                    dx = self.rng.jiggle();
                    d2 += dx * dx;
                }
                if dy == 0.0 {
                    dy = self.rng.jiggle();
                    d2 += dy * dy;
                }
                if d2 < Self::MIN_DISTANCE_SQ {
                    d2 = (Self::MIN_DISTANCE_SQ * d2).sqrt();
                }
                let w = Self::STRENGTH * alpha / d2;
                nodes[i].vx += dx * w;
                nodes[i].vy += dy * w;
                nodes[j].vx -= dx * w;
                nodes[j].vy -= dy * w;
            }
        }
    }
}

/// Pairwise overlap rejection on anticipated positions; radius-weighted so
/// the smaller node yields more.
pub struct CollideForce {
    rng: XorShift64Star,
}

impl CollideForce {
    pub const STRENGTH: f64 = 0.7;
    pub const PADDING: f64 = 4.0;

    pub(crate) fn new(seed: u64) -> Self {
        Self {
            rng: XorShift64Star::new(seed.wrapping_add(2)),
        }
    }
}

impl Force for CollideForce {
    fn apply(&mut self, nodes: &mut [SimNode], _alpha: f64) {
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let required = nodes[i].radius + nodes[j].radius + Self::PADDING;
                let mut dx = (nodes[i].x + nodes[i].vx) - (nodes[j].x + nodes[j].vx);
                let mut dy = (nodes[i].y + nodes[i].vy) - (nodes[j].y + nodes[j].vy);
                let mut d2 = dx * dx + dy * dy;
                if d2 >= required * required {
                    continue;
                }
                if dx == 0.0 {
                    dx = self.rng.jiggle();
                    d2 += dx * dx;
                }
                if dy == 0.0 {
                    dy = self.rng.jiggle();
                    d2 += dy * dy;
                }
                let dist = d2.sqrt();
                let push = (required - dist) / dist * Self::STRENGTH;
                let (px, py) = (dx * push, dy * push);
                let ri_sq = nodes[i].radius * nodes[i].radius;
                let rj_sq = nodes[j].radius * nodes[j].radius;
                let wi = rj_sq / (ri_sq + rj_sq);
                nodes[i].vx += px * wi;
                nodes[i].vy += py * wi;
                nodes[j].vx -= px * (1.0 - wi);
                nodes[j].vy -= py * (1.0 - wi);
            }
        }
    }
}

/// Weak pull toward the viewport center keeping disconnected pieces on
/// screen.
pub struct CenterForce {
    cx: f64,
    cy: f64,
}

impl CenterForce {
    pub const STRENGTH: f64 = 0.03;

    pub(crate) fn new(center: Point) -> Self {
        Self {
            cx: center.x,
            cy: center.y,
        }
    }
}

impl Force for CenterForce {
    fn apply(&mut self, nodes: &mut [SimNode], alpha: f64) {
        for n in nodes.iter_mut() {
            n.vx += (self.cx - n.x) * Self::STRENGTH * alpha;
            n.vy += (self.cy - n.y) * Self::STRENGTH * alpha;
        }
    }
}

/// Simultaneous mutable access to two distinct slots, returned in argument
/// order.
fn pair_mut(nodes: &mut [SimNode], a: usize, b: usize) -> (&mut SimNode, &mut SimNode) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = nodes.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = nodes.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim_node(id: &str, x: f64, y: f64, radius: f64) -> SimNode {
        SimNode {
            id: id.to_string(),
            x,
            y,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
            radius,
        }
    }

    fn index_of(nodes: &[SimNode]) -> FxHashMap<String, usize> {
        nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect()
    }

    #[test]
    fn pair_mut_returns_slots_in_argument_order() {
        let mut nodes = vec![sim_node("a", 0.0, 0.0, 1.0), sim_node("b", 1.0, 0.0, 1.0)];
        {
            let (a, b) = pair_mut(&mut nodes, 0, 1);
            assert_eq!((a.id.as_str(), b.id.as_str()), ("a", "b"));
        }
        let (b, a) = pair_mut(&mut nodes, 1, 0);
        assert_eq!((b.id.as_str(), a.id.as_str()), ("b", "a"));
    }

    #[test]
    fn link_force_drops_dangling_and_self_links() {
        let nodes = vec![sim_node("a", 0.0, 0.0, 10.0), sim_node("b", 100.0, 0.0, 10.0)];
        let links = vec![
            Link::new("a", "b"),
            Link::new("a", "a"),
            Link::new("a", "ghost"),
        ];
        let force = LinkForce::new(&nodes, &links, &index_of(&nodes), None, 0);
        assert_eq!(force.springs.len(), 1);
        assert_eq!(force.skipped(), 2);
    }

    #[test]
    fn link_force_pulls_a_stretched_pair_together() {
        let mut nodes = vec![sim_node("a", 0.0, 0.0, 10.0), sim_node("b", 400.0, 0.0, 10.0)];
        let links = vec![Link::new("a", "b")];
        let mut force = LinkForce::new(&nodes, &links, &index_of(&nodes), Some(50.0), 0);
        force.apply(&mut nodes, 1.0);
        // The spring is stretched, so the source drifts right and the target
        // drifts left; the zero y component only picks up the coincidence
        // jiggle.
        assert!(nodes[0].vx > 0.0);
        assert!(nodes[1].vx < 0.0);
        assert!(nodes[0].vy.abs() < 1e-5);
    }

    #[test]
    fn many_body_pushes_close_nodes_apart_and_ignores_far_ones() {
        let mut nodes = vec![sim_node("a", 0.0, 0.0, 10.0), sim_node("b", 40.0, 0.0, 10.0)];
        let mut force = ManyBodyForce::new(0);
        force.apply(&mut nodes, 1.0);
        assert!(nodes[0].vx < 0.0);
        assert!(nodes[1].vx > 0.0);

        let mut far = vec![
            sim_node("a", 0.0, 0.0, 10.0),
            sim_node("b", ManyBodyForce::MAX_DISTANCE + 1.0, 0.0, 10.0),
        ];
        force.apply(&mut far, 1.0);
        assert_eq!((far[0].vx, far[1].vx), (0.0, 0.0));
    }

    #[test]
    fn collide_force_separates_overlapping_pairs_only() {
        let mut nodes = vec![sim_node("a", 0.0, 0.0, 20.0), sim_node("b", 10.0, 0.0, 20.0)];
        let mut force = CollideForce::new(0);
        force.apply(&mut nodes, 1.0);
        assert!(nodes[0].vx < 0.0);
        assert!(nodes[1].vx > 0.0);

        let mut apart = vec![sim_node("a", 0.0, 0.0, 5.0), sim_node("b", 100.0, 0.0, 5.0)];
        force.apply(&mut apart, 1.0);
        assert_eq!((apart[0].vx, apart[1].vx), (0.0, 0.0));
    }

    #[test]
    fn center_force_pulls_toward_the_configured_center() {
        let mut nodes = vec![sim_node("a", 0.0, 0.0, 10.0)];
        let mut force = CenterForce::new(Point { x: 100.0, y: -50.0 });
        force.apply(&mut nodes, 1.0);
        assert!(nodes[0].vx > 0.0);
        assert!(nodes[0].vy < 0.0);
    }
}
