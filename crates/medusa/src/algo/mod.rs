use crate::graph::Viewport;
use std::time::Duration;

pub mod collide;
pub mod force;
pub mod radial;
pub mod tree;

/// Synchronous layout strategies. The force-directed strategy is constructed
/// separately (`force::Simulation`) because it yields a running handle, not a
/// terminal position map.
#[derive(Debug, Clone)]
pub enum Layout {
    /// Default mind-map presentation: branches fanned around the viewport
    /// center, descendants in sector-scoped depth rings.
    RadialCluster(RadialClusterOptions),
    /// Top-down tree respecting subtree widths.
    HierarchicalTree(TreeOptions),
    /// Tree placement with compact spacing plus a collision cleanup pass.
    HybridCompactTree(CompactTreeOptions),
    /// Uniform polar rings, no sector weighting, no relaxation.
    BasicRadial(BasicRadialOptions),
}

impl Default for Layout {
    fn default() -> Self {
        Self::RadialCluster(RadialClusterOptions::default())
    }
}

#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Horizontal band reserved for a leaf subtree.
    pub leaf_width: f64,
    pub sibling_gap: f64,
    pub level_height: f64,
    pub top_margin: f64,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            leaf_width: 140.0,
            sibling_gap: 24.0,
            level_height: 120.0,
            top_margin: 60.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompactTreeOptions {
    pub tree: TreeOptions,
    pub cleanup: CollideOptions,
}

impl Default for CompactTreeOptions {
    /// Roughly two thirds of the regular tree scale, with a light cleanup
    /// budget.
    fn default() -> Self {
        Self {
            tree: TreeOptions {
                leaf_width: 90.0,
                sibling_gap: 12.0,
                level_height: 84.0,
                top_margin: 48.0,
            },
            cleanup: CollideOptions {
                min_distance: 6.0,
                max_iterations: 24,
                bounds: None,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct RadialClusterOptions {
    /// Root-to-branch distance before the complexity term is added.
    pub base_radius: f64,
    /// Radial distance between consecutive depth rings.
    pub ring_spacing: f64,
    /// Scoped pairwise-repulsion passes run after initial placement.
    pub relaxation_passes: usize,
}

impl Default for RadialClusterOptions {
    fn default() -> Self {
        Self {
            base_radius: 130.0,
            ring_spacing: 110.0,
            relaxation_passes: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BasicRadialOptions {
    pub ring_spacing: f64,
}

impl Default for BasicRadialOptions {
    fn default() -> Self {
        Self { ring_spacing: 100.0 }
    }
}

#[derive(Debug, Clone)]
pub struct CollideOptions {
    /// Clear padding required between node edges (center distance must reach
    /// `radius_a + radius_b + min_distance`).
    pub min_distance: f64,
    pub max_iterations: usize,
    /// When set, resolved positions are clamped to these viewport bounds.
    pub bounds: Option<Viewport>,
}

impl Default for CollideOptions {
    fn default() -> Self {
        Self {
            min_distance: 8.0,
            max_iterations: 32,
            bounds: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForceOptions {
    /// Seed for the tie-breaking jiggle applied to coincident nodes; every run
    /// with the same seed and dataset is reproducible.
    pub random_seed: u64,
    /// Resting length for parent/child springs. `None` derives it from the
    /// endpoint collision radii.
    pub link_distance: Option<f64>,
    /// Wall-clock cutoff after which a still-jittering simulation is declared
    /// settled, measured from the last (re)start.
    pub safety_timeout: Duration,
}

impl Default for ForceOptions {
    fn default() -> Self {
        Self {
            random_seed: 0,
            link_distance: None,
            safety_timeout: Duration::from_secs(10),
        }
    }
}
