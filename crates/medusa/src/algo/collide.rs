//! Iterative pairwise overlap removal: a generic push-apart resolver and a
//! radial-aware variant that re-buckets crowded results into concentric rings.

use crate::algo::CollideOptions;
use crate::graph::{Point, Viewport};
use indexmap::IndexMap;
use std::f64::consts::{PI, TAU};

/// Working record of one positioned node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// Fixed band thickness used to group nodes by distance from the center in
/// the radial-aware pass.
const RING_THICKNESS: f64 = 64.0;

/// How far a redistributed node moves from its original angle toward its
/// evenly-spaced target (1.0 would be a hard snap).
const ANGLE_BLEND: f64 = 0.35;

/// π(3 − √5); multiples of it spread deterministic separation directions for
/// exactly coincident pairs.
const GOLDEN_ANGLE: f64 = 2.399963229728653;

pub(crate) fn fallback_angle(seed: usize) -> f64 {
    seed as f64 * GOLDEN_ANGLE
}

/// Repeats up to `max_iterations` passes, pushing every overlapping pair
/// apart by half the overlap along the line connecting their centers, and
/// stops at the first collision-free pass. Returns the number of passes run;
/// exhausting the budget leaves the best achieved result in place.
pub fn resolve(circles: &mut [Circle], opts: &CollideOptions) -> usize {
    let mut used = 0;
    let mut still_moving = false;
    while used < opts.max_iterations {
        used += 1;
        let mut any = false;
        for i in 0..circles.len() {
            for j in (i + 1)..circles.len() {
                let (left, right) = circles.split_at_mut(j);
                if separate_pair(
                    &mut left[i],
                    &mut right[0],
                    opts.min_distance,
                    fallback_angle(i + j),
                ) {
                    any = true;
                }
            }
        }
        if let Some(vp) = opts.bounds {
            clamp_to_viewport(circles, vp);
        }
        still_moving = any;
        if !any {
            break;
        }
    }
    if still_moving {
        tracing::warn!(
            "collision resolver spent its {} iteration budget before a collision-free pass",
            opts.max_iterations
        );
    }
    used
}

/// Generic pass first, then concentric re-bucketing around `center`: every
/// ring holding more than one node is redistributed at even angular spacing on
/// a radius with enough angular capacity for all members, each node's angle
/// blended toward its target rather than snapped.
pub fn resolve_radial(circles: &mut [Circle], center: Point, opts: &CollideOptions) {
    resolve(circles, opts);

    let mut rings: IndexMap<i64, Vec<usize>> = IndexMap::new();
    for (i, c) in circles.iter().enumerate() {
        let dist = (c.x - center.x).hypot(c.y - center.y);
        let ring = (dist / RING_THICKNESS).floor() as i64;
        rings.entry(ring).or_default().push(i);
    }

    for (&ring, members) in &rings {
        if members.len() < 2 {
            continue;
        }
        let mut ordered: Vec<(usize, f64)> = members
            .iter()
            .map(|&i| {
                let c = &circles[i];
                (i, (c.y - center.y).atan2(c.x - center.x))
            })
            .collect();
        ordered.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        let count = ordered.len();
        let step = TAU / count as f64;
        let max_required = ordered
            .iter()
            .map(|&(i, _)| 2.0 * circles[i].radius + opts.min_distance)
            .fold(0.0, f64::max);
        // Adjacent members sit one chord apart; grow the ring until that
        // chord fits the widest pair.
        let needed = max_required / (2.0 * (PI / count as f64).sin());
        let nominal = (ring as f64 + 0.5) * RING_THICKNESS;
        let radius = nominal.max(needed);

        let base = ordered[0].1;
        for (k, &(i, orig)) in ordered.iter().enumerate() {
            let target = base + step * k as f64;
            let angle = orig + wrap_angle(target - orig) * ANGLE_BLEND;
            circles[i].x = center.x + radius * angle.cos();
            circles[i].y = center.y + radius * angle.sin();
        }
    }

    if let Some(vp) = opts.bounds {
        clamp_to_viewport(circles, vp);
    }
}

/// Pushes both circles apart by half the overlap when their centers are
/// closer than `radius_a + radius_b + padding`. Coincident pairs separate
/// along `fallback` instead of an undefined direction. Returns whether a push
/// happened.
pub(crate) fn separate_pair(a: &mut Circle, b: &mut Circle, padding: f64, fallback: f64) -> bool {
    let required = a.radius + b.radius + padding;
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let dist_sq = dx * dx + dy * dy;
    if dist_sq >= required * required {
        return false;
    }
    let dist = dist_sq.sqrt();
    let (ux, uy, overlap) = if dist > f64::EPSILON {
        (dx / dist, dy / dist, required - dist)
    } else {
        (fallback.cos(), fallback.sin(), required)
    };
    let half = overlap / 2.0;
    a.x -= ux * half;
    a.y -= uy * half;
    b.x += ux * half;
    b.y += uy * half;
    true
}

fn clamp_to_viewport(circles: &mut [Circle], vp: Viewport) {
    for c in circles.iter_mut() {
        c.x = c.x.max(c.radius).min(vp.width - c.radius);
        c.y = c.y.max(c.radius).min(vp.height - c.radius);
    }
}

fn wrap_angle(mut d: f64) -> f64 {
    while d > PI {
        d -= TAU;
    }
    while d < -PI {
        d += TAU;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(x: f64, y: f64, radius: f64) -> Circle {
        Circle { x, y, radius }
    }

    #[test]
    fn separate_pair_pushes_half_the_overlap_each_way() {
        let mut a = circle(0.0, 0.0, 10.0);
        let mut b = circle(10.0, 0.0, 10.0);
        // Required separation 25, overlap 15, so 7.5 for each side.
        assert!(separate_pair(&mut a, &mut b, 5.0, 0.0));
        assert_eq!(a.x, -7.5);
        assert_eq!(b.x, 17.5);
        assert_eq!((a.y, b.y), (0.0, 0.0));
    }

    #[test]
    fn separate_pair_leaves_distant_circles_alone() {
        let mut a = circle(0.0, 0.0, 5.0);
        let mut b = circle(100.0, 0.0, 5.0);
        assert!(!separate_pair(&mut a, &mut b, 4.0, 0.0));
        assert_eq!((a.x, b.x), (0.0, 100.0));
    }

    #[test]
    fn coincident_pair_separates_along_the_fallback_direction() {
        let mut a = circle(50.0, 50.0, 0.0);
        let mut b = circle(50.0, 50.0, 0.0);
        assert!(separate_pair(&mut a, &mut b, 12.0, 0.0));
        // Fallback angle 0 is the +x axis.
        assert!((a.x - 44.0).abs() < 1e-9);
        assert!((b.x - 56.0).abs() < 1e-9);
        let dist = (b.x - a.x).hypot(b.y - a.y);
        assert!((dist - 12.0).abs() < 1e-9);
    }

    #[test]
    fn resolve_exits_early_when_nothing_overlaps() {
        let mut circles = vec![circle(0.0, 0.0, 5.0), circle(100.0, 0.0, 5.0)];
        let used = resolve(&mut circles, &CollideOptions::default());
        assert_eq!(used, 1);
    }

    #[test]
    fn wrap_angle_maps_into_half_open_circle() {
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < 1e-12);
        assert!((wrap_angle(-TAU - 0.25) + 0.25).abs() < 1e-12);
        assert_eq!(wrap_angle(0.0), 0.0);
    }

    #[test]
    fn fallback_angles_differ_per_pair() {
        assert_ne!(fallback_angle(1), fallback_angle(2));
    }
}
