//! Physics-based layout: a cooperative simulation advancing one integration
//! step per external tick. Forces accumulate velocity deltas, semi-implicit
//! Euler integration applies them, and a geometrically decaying alpha drives
//! the idle → running → settled lifecycle.

use crate::algo::ForceOptions;
use crate::error::Result;
use crate::graph::{Graph, Link, Point, Viewport};
use crate::hierarchy::{Forest, visual_tier};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::time::Instant;

mod forces;

pub use forces::{CenterForce, CollideForce, Force, LinkForce, ManyBodyForce};

/// One node of the simulation's working copy. The engine owns these outright;
/// callers only ever see snapshots.
#[derive(Debug, Clone)]
pub struct SimNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub fx: Option<f64>,
    pub fy: Option<f64>,
    /// Collision radius, taken from the node's depth tier.
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationPhase {
    Idle,
    Running,
    Settled,
}

/// Handle to a per-tick position subscription; pass back to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type TickCallback = Box<dyn FnMut(&BTreeMap<String, Point>)>;

pub struct Simulation {
    nodes: Vec<SimNode>,
    links: Vec<Link>,
    forces: Vec<Box<dyn Force>>,
    index_of: FxHashMap<String, usize>,
    alpha: f64,
    alpha_target: f64,
    alpha_decay: f64,
    velocity_decay: f64,
    phase: SimulationPhase,
    started_at: Instant,
    opts: ForceOptions,
    center: Point,
    subscribers: Vec<(SubscriptionId, TickCallback)>,
    next_subscription: u64,
}

impl Simulation {
    pub const ALPHA_MIN: f64 = 0.001;
    pub const VELOCITY_DECAY: f64 = 0.4;
    pub const DRAG_ALPHA_TARGET: f64 = 0.3;
    /// Alpha reaches `ALPHA_MIN` after roughly this many unassisted ticks.
    const DECAY_HORIZON: f64 = 300.0;
    /// Spiral constants for seeding nodes that arrive without a position.
    const SEED_RADIUS_STEP: f64 = 10.0;
    const SEED_ANGLE: f64 = 2.399963229728653;

    /// Copies the dataset into a working set, seeds missing positions on a
    /// deterministic spiral around the viewport center, registers the four
    /// standard forces, and starts running with full energy.
    pub fn new(graph: &Graph, opts: &ForceOptions, viewport: Viewport) -> Result<Self> {
        graph.validate()?;
        let center = viewport.center();
        let forest = Forest::build(&graph.nodes);

        let mut nodes = Vec::with_capacity(graph.nodes.len());
        for (i, n) in graph.nodes.iter().enumerate() {
            let (x, y) = match (n.x, n.y) {
                (Some(x), Some(y)) => (x, y),
                _ => Self::seed_position(center, i),
            };
            nodes.push(SimNode {
                id: n.id.clone(),
                x,
                y,
                vx: n.vx,
                vy: n.vy,
                fx: n.fx,
                fy: n.fy,
                radius: visual_tier(forest.depth[i]).radius,
            });
        }
        let index_of = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut sim = Self {
            nodes,
            links: graph.links.clone(),
            forces: Vec::new(),
            index_of,
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: 1.0 - Self::ALPHA_MIN.powf(1.0 / Self::DECAY_HORIZON),
            velocity_decay: Self::VELOCITY_DECAY,
            phase: SimulationPhase::Running,
            started_at: Instant::now(),
            opts: opts.clone(),
            center,
            subscribers: Vec::new(),
            next_subscription: 0,
        };
        sim.rebuild_forces();
        Ok(sim)
    }

    /// Advances one integration step; the sole suspension point. No-op unless
    /// running. Settles once alpha drops under the minimum or the wall-clock
    /// safety cutoff fires.
    pub fn tick(&mut self) -> SimulationPhase {
        if self.phase != SimulationPhase::Running {
            return self.phase;
        }
        if self.started_at.elapsed() >= self.opts.safety_timeout {
            tracing::debug!("simulation settled by safety timeout before reaching alpha minimum");
            self.phase = SimulationPhase::Settled;
            return self.phase;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        for force in &mut self.forces {
            force.apply(&mut self.nodes, self.alpha);
        }
        for n in &mut self.nodes {
            match n.fx {
                Some(fx) => {
                    n.x = fx;
                    n.vx = 0.0;
                }
                None => {
                    n.vx *= 1.0 - self.velocity_decay;
                    n.x += n.vx;
                }
            }
            match n.fy {
                Some(fy) => {
                    n.y = fy;
                    n.vy = 0.0;
                }
                None => {
                    n.vy *= 1.0 - self.velocity_decay;
                    n.y += n.vy;
                }
            }
        }
        self.publish();

        if self.alpha < Self::ALPHA_MIN {
            self.phase = SimulationPhase::Settled;
        }
        self.phase
    }

    /// Explicit cancellation; the simulation holds its state and can be
    /// restarted.
    pub fn stop(&mut self) {
        self.phase = SimulationPhase::Idle;
    }

    pub fn restart(&mut self) {
        self.phase = SimulationPhase::Running;
        self.started_at = Instant::now();
    }

    /// Pins the node at its current position and raises the alpha target so
    /// the system re-energizes around the grab. Unknown ids are ignored; drag
    /// events race with deletions.
    pub fn drag_start(&mut self, id: &str) {
        let Some(&i) = self.index_of.get(id) else { return };
        let n = &mut self.nodes[i];
        n.fx = Some(n.x);
        n.fy = Some(n.y);
        self.alpha_target = Self::DRAG_ALPHA_TARGET;
        self.restart();
    }

    /// Moves the pin; called for every pointer move.
    pub fn drag(&mut self, id: &str, x: f64, y: f64) {
        let Some(&i) = self.index_of.get(id) else { return };
        let n = &mut self.nodes[i];
        n.fx = Some(x);
        n.fy = Some(y);
    }

    /// Releases the pin and lets the energy drain back out.
    pub fn drag_end(&mut self, id: &str) {
        let Some(&i) = self.index_of.get(id) else { return };
        let n = &mut self.nodes[i];
        n.fx = None;
        n.fy = None;
        self.alpha_target = 0.0;
    }

    /// Swaps the working node array. Nodes whose id already exists keep their
    /// simulated position and velocity unless the incoming record supplies
    /// explicit coordinates; new ids are seeded like at construction. Unless
    /// `reheat` is suppressed the system re-energizes to full alpha and
    /// restarts.
    pub fn update_nodes(&mut self, nodes: &[crate::graph::Node], reheat: bool) {
        let forest = Forest::build(nodes);
        let mut next = Vec::with_capacity(nodes.len());
        for (i, n) in nodes.iter().enumerate() {
            let carried = self.index_of.get(n.id.as_str()).map(|&slot| &self.nodes[slot]);
            let (x, y, vx, vy) = match (n.x, n.y, carried) {
                (Some(x), Some(y), _) => (x, y, n.vx, n.vy),
                (_, _, Some(old)) => (old.x, old.y, old.vx, old.vy),
                _ => {
                    let (x, y) = Self::seed_position(self.center, i);
                    (x, y, n.vx, n.vy)
                }
            };
            let (fx, fy) = match carried {
                Some(old) if n.fx.is_none() && n.fy.is_none() => (old.fx, old.fy),
                _ => (n.fx, n.fy),
            };
            next.push(SimNode {
                id: n.id.clone(),
                x,
                y,
                vx,
                vy,
                fx,
                fy,
                radius: visual_tier(forest.depth[i]).radius,
            });
        }
        self.nodes = next;
        self.index_of = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
        self.rebuild_forces();
        if reheat {
            self.reenergize();
        }
    }

    /// Swaps the working link array; same re-energize contract as
    /// `update_nodes`.
    pub fn update_links(&mut self, links: Vec<Link>, reheat: bool) {
        self.links = links;
        self.rebuild_forces();
        if reheat {
            self.reenergize();
        }
    }

    /// Registers a per-tick observer receiving a fresh position snapshot.
    pub fn on_tick(&mut self, callback: impl FnMut(&BTreeMap<String, Point>) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Cancels a subscription; unknown handles are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Snapshot copy of the current positions.
    pub fn positions(&self) -> BTreeMap<String, Point> {
        self.nodes
            .iter()
            .map(|n| (n.id.clone(), Point { x: n.x, y: n.y }))
            .collect()
    }

    pub fn node(&self, id: &str) -> Option<&SimNode> {
        self.index_of.get(id).map(|&i| &self.nodes[i])
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    fn reenergize(&mut self) {
        self.alpha = 1.0;
        self.restart();
    }

    fn rebuild_forces(&mut self) {
        let link_force = LinkForce::new(
            &self.nodes,
            &self.links,
            &self.index_of,
            self.opts.link_distance,
            self.opts.random_seed,
        );
        if link_force.skipped() > 0 {
            tracing::debug!(
                "{} link(s) referenced ids outside the working set; ignored",
                link_force.skipped()
            );
        }
        self.forces = vec![
            Box::new(link_force),
            Box::new(ManyBodyForce::new(self.opts.random_seed)),
            Box::new(CollideForce::new(self.opts.random_seed)),
            Box::new(CenterForce::new(self.center)),
        ];
    }

    /// Deterministic phyllotaxis spiral for nodes that arrive unplaced.
    fn seed_position(center: Point, index: usize) -> (f64, f64) {
        let radius = Self::SEED_RADIUS_STEP * (0.5 + index as f64).sqrt();
        let angle = Self::SEED_ANGLE * index as f64;
        (
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        )
    }

    fn publish(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }
        let snapshot = self.positions();
        for (_, callback) in &mut self.subscribers {
            callback(&snapshot);
        }
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("nodes", &self.nodes.len())
            .field("links", &self.links.len())
            .field("alpha", &self.alpha)
            .field("phase", &self.phase)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// xorshift64* with the multiply finalizer; reproducible across platforms.
#[derive(Debug, Clone)]
pub(crate) struct XorShift64Star {
    state: u64,
}

impl XorShift64Star {
    pub(crate) fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D_u64)
    }

    /// Uniform in [0, 1).
    pub(crate) fn next_f64_unit(&mut self) -> f64 {
        ((self.next_u64() >> 11) as f64) / ((1u64 << 53) as f64)
    }

    /// Tiny symmetric offset separating exactly coincident nodes.
    pub(crate) fn jiggle(&mut self) -> f64 {
        (self.next_f64_unit() - 0.5) * 1e-6
    }
}
