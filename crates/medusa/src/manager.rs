//! Uniform entry over the five layout kinds.
//!
//! [`LayoutManager`] hides the split between the synchronous strategies, which
//! return a finished position map, and the force-directed strategy, which
//! hands back a live [`Simulation`] driven tick by tick. It also remembers the
//! last chosen kind through an optional [`PreferenceStore`] so hosts can
//! restore it across sessions.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::algo::force::{Simulation, SimulationPhase};
use crate::algo::{
    BasicRadialOptions, CompactTreeOptions, ForceOptions, Layout, RadialClusterOptions,
    TreeOptions,
};
use crate::error::{Error, Result};
use crate::graph::{Graph, LayoutResult, Viewport};

/// Key under which the manager persists the current kind in its store.
pub const PREFERENCE_KEY: &str = "layout-kind";

/// The five layout strategies a mind map can be arranged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutKind {
    /// Radial cluster around a pinned root. The default.
    #[default]
    RadialCluster,
    /// Top-down layered tree.
    HierarchicalTree,
    /// Layered tree with tighter constants and an overlap cleanup pass.
    HybridCompactTree,
    /// Concentric rings with uniform angular spread per ring.
    BasicRadial,
    /// Physics simulation driven through [`Simulation`].
    ForceDirected,
}

impl LayoutKind {
    pub const ALL: [LayoutKind; 5] = [
        LayoutKind::RadialCluster,
        LayoutKind::HierarchicalTree,
        LayoutKind::HybridCompactTree,
        LayoutKind::BasicRadial,
        LayoutKind::ForceDirected,
    ];

    /// Stable token used for persistence and host-facing selection.
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutKind::RadialCluster => "radial-cluster",
            LayoutKind::HierarchicalTree => "hierarchical-tree",
            LayoutKind::HybridCompactTree => "hybrid-compact-tree",
            LayoutKind::BasicRadial => "basic-radial",
            LayoutKind::ForceDirected => "force-directed",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LayoutKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::UnknownLayoutKind {
                token: s.to_owned(),
            })
    }
}

/// Where the manager remembers the last chosen layout kind.
///
/// Hosts back this with whatever they have: browser local storage, a config
/// file, a database row. [`MemoryStore`] covers tests and single-session use.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// In-memory [`PreferenceStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }
}

/// What running a layout produced.
#[derive(Debug)]
pub enum Outcome {
    /// A synchronous strategy finished and these are its positions.
    Positions(LayoutResult),
    /// The force-directed strategy started a simulation; drive it with
    /// [`LayoutManager::tick`] or through [`LayoutManager::simulation_mut`].
    Running,
}

/// Dispatches layout runs and owns the live simulation, if any.
///
/// At most one simulation exists at a time. [`LayoutManager::run`] stops and
/// drops the previous one before starting anything else, so a switch from the
/// physics kind to a static kind can never leave a stale simulation writing
/// positions in the background.
pub struct LayoutManager {
    kind: LayoutKind,
    store: Option<Box<dyn PreferenceStore>>,
    simulation: Option<Simulation>,
    force_options: ForceOptions,
}

impl LayoutManager {
    /// Manager with the default kind and no persistence.
    pub fn new() -> Self {
        Self {
            kind: LayoutKind::default(),
            store: None,
            simulation: None,
            force_options: ForceOptions::default(),
        }
    }

    /// Manager that restores its kind from `store` and persists changes back.
    ///
    /// A missing or unrecognized stored token falls back to the default kind.
    pub fn with_store(store: Box<dyn PreferenceStore>) -> Self {
        let kind = store
            .get(PREFERENCE_KEY)
            .and_then(|token| token.parse().ok())
            .unwrap_or_default();
        Self {
            kind,
            store: Some(store),
            simulation: None,
            force_options: ForceOptions::default(),
        }
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    /// Selects `kind` for subsequent runs and persists it if a store is set.
    pub fn set_kind(&mut self, kind: LayoutKind) {
        self.kind = kind;
        if let Some(store) = self.store.as_mut() {
            store.set(PREFERENCE_KEY, kind.as_str());
        }
    }

    /// Options handed to the simulation when the force-directed kind runs.
    pub fn set_force_options(&mut self, options: ForceOptions) {
        self.force_options = options;
    }

    /// Runs the current kind over `graph`.
    ///
    /// Synchronous kinds return [`Outcome::Positions`] with their defaults;
    /// hosts that want tuned options call [`crate::layout`] directly. The
    /// force-directed kind seeds a fresh [`Simulation`] and returns
    /// [`Outcome::Running`]. Any simulation left over from an earlier run is
    /// stopped and dropped first.
    pub fn run(&mut self, graph: &Graph, viewport: Viewport) -> Result<Outcome> {
        self.stop();
        let layout = match self.kind {
            LayoutKind::RadialCluster => Layout::RadialCluster(RadialClusterOptions::default()),
            LayoutKind::HierarchicalTree => Layout::HierarchicalTree(TreeOptions::default()),
            LayoutKind::HybridCompactTree => {
                Layout::HybridCompactTree(CompactTreeOptions::default())
            }
            LayoutKind::BasicRadial => Layout::BasicRadial(BasicRadialOptions::default()),
            LayoutKind::ForceDirected => {
                let simulation = if graph.links.is_empty() {
                    // A graph described only by parent pointers still gets
                    // spring edges, derived on the fly.
                    let derived = Graph {
                        nodes: graph.nodes.clone(),
                        links: graph.links_from_parents(),
                    };
                    Simulation::new(&derived, &self.force_options, viewport)?
                } else {
                    Simulation::new(graph, &self.force_options, viewport)?
                };
                self.simulation = Some(simulation);
                return Ok(Outcome::Running);
            }
        };
        crate::layout(graph, &layout, viewport).map(Outcome::Positions)
    }

    /// Advances the live simulation one step, if one is running.
    pub fn tick(&mut self) -> Option<SimulationPhase> {
        self.simulation.as_mut().map(Simulation::tick)
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    pub fn simulation_mut(&mut self) -> Option<&mut Simulation> {
        self.simulation.as_mut()
    }

    /// Stops and drops the live simulation, if any.
    pub fn stop(&mut self) {
        if let Some(simulation) = self.simulation.as_mut() {
            simulation.stop();
        }
        self.simulation = None;
    }
}

impl Default for LayoutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LayoutManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutManager")
            .field("kind", &self.kind)
            .field("has_store", &self.store.is_some())
            .field("simulation", &self.simulation)
            .finish()
    }
}
