#![forbid(unsafe_code)]

//! Headless mind-map layout algorithms.
//!
//! `medusa` arranges a mind map (nodes with parent pointers, optionally plus
//! explicit links) inside a viewport. Four synchronous strategies return a
//! finished position map through [`layout`]; the force-directed strategy runs
//! as a tick-driven [`Simulation`]. [`LayoutManager`] wraps all five behind
//! one entry and remembers the last chosen kind.

pub mod algo;
pub mod error;
pub mod graph;
pub mod hierarchy;
pub mod manager;

pub use algo::force::{
    CenterForce, CollideForce, Force, LinkForce, ManyBodyForce, SimNode, Simulation,
    SimulationPhase, SubscriptionId,
};
pub use algo::{
    BasicRadialOptions, CollideOptions, CompactTreeOptions, ForceOptions, Layout,
    RadialClusterOptions, TreeOptions,
};
pub use error::{Error, Result};
pub use graph::{Bounds, Graph, LayoutResult, Link, Node, Point, Viewport};
pub use hierarchy::{VisualTier, compute_depths, visual_tier};
pub use manager::{LayoutKind, LayoutManager, MemoryStore, Outcome, PreferenceStore};

/// Synchronous layout entry point.
///
/// Runs one of the four static strategies and returns the per-node positions.
/// The force-directed strategy has no synchronous form; construct a
/// [`Simulation`] (or use [`LayoutManager`]) instead.
pub fn layout(graph: &Graph, layout: &Layout, viewport: Viewport) -> Result<LayoutResult> {
    match layout {
        Layout::RadialCluster(opts) => algo::radial::cluster_layout(graph, opts, viewport),
        Layout::HierarchicalTree(opts) => algo::tree::layout(graph, opts, viewport),
        Layout::HybridCompactTree(opts) => algo::tree::compact_layout(graph, opts, viewport),
        Layout::BasicRadial(opts) => algo::radial::basic_layout(graph, opts, viewport),
    }
}
