use crate::error::{Error, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Graph {
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self { nodes, links }
    }

    /// Rejects duplicate node ids. Every other shape defect (orphaned parents,
    /// dangling link endpoints, parent cycles) is absorbed by the layouts.
    pub fn validate(&self) -> Result<()> {
        let mut seen: std::collections::BTreeSet<&str> = std::collections::BTreeSet::new();
        for n in &self.nodes {
            if !seen.insert(n.id.as_str()) {
                return Err(Error::DuplicateNode { id: n.id.clone() });
            }
        }
        Ok(())
    }

    /// The active working set: every node hidden under a `collapsed` ancestor is
    /// dropped (the collapsed node itself stays), along with links touching a
    /// dropped node. Input order is preserved.
    pub fn visible(&self) -> Graph {
        let by_id: FxHashMap<&str, &Node> = self
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n))
            .collect();

        let hidden = |node: &Node| -> bool {
            let mut cursor = node.parent.as_deref();
            // Bounded walk so a malformed parent cycle cannot loop forever.
            for _ in 0..self.nodes.len() {
                let Some(parent_id) = cursor else { return false };
                let Some(parent) = by_id.get(parent_id) else { return false };
                if parent.collapsed {
                    return true;
                }
                cursor = parent.parent.as_deref();
            }
            false
        };

        let nodes: Vec<Node> = self.nodes.iter().filter(|n| !hidden(n)).cloned().collect();
        let kept: std::collections::BTreeSet<&str> =
            nodes.iter().map(|n| n.id.as_str()).collect();
        let links = self
            .links
            .iter()
            .filter(|l| kept.contains(l.source.as_str()) && kept.contains(l.target.as_str()))
            .cloned()
            .collect();
        Graph { nodes, links }
    }

    /// Derives the parent→child link list from `parent` references, skipping
    /// references to ids not present in the node set.
    pub fn links_from_parents(&self) -> Vec<Link> {
        let ids: std::collections::BTreeSet<&str> =
            self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.nodes
            .iter()
            .filter_map(|n| {
                let parent = n.parent.as_deref()?;
                ids.contains(parent)
                    .then(|| Link::new(parent, n.id.as_str()))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Display label; never consulted by layout math.
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub vx: f64,
    #[serde(default)]
    pub vy: f64,
    /// Pinned coordinates overriding physics; `None` means free. Both are set
    /// or both are `None`; `pin`/`unpin` keep the pair in step.
    #[serde(default)]
    pub fx: Option<f64>,
    #[serde(default)]
    pub fy: Option<f64>,
    /// When true the caller excludes this node's descendants from the working
    /// set (see `Graph::visible`).
    #[serde(default)]
    pub collapsed: bool,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn pin(&mut self, x: f64, y: f64) {
        self.fx = Some(x);
        self.fy = Some(y);
    }

    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }

    pub fn pinned(&self) -> bool {
        self.fx.is_some() && self.fy.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }
}

/// Axis-aligned bounding box of a set of produced positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutResult {
    pub positions: std::collections::BTreeMap<String, Point>,
}

impl LayoutResult {
    /// `None` when the position map is empty.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut iter = self.positions.values();
        let first = iter.next()?;
        let mut b = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in iter {
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
        }
        Some(b)
    }
}
