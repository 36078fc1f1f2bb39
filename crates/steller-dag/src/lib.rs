//! Directed acyclic graph container used by the `steller` layout engine.
//!
//! The container is index-based: nodes and links live in arenas and are
//! addressed by [`NodeId`] / [`LinkId`]. Layout results (layer, coordinates,
//! polyline control points) are stored on the container but written only by a
//! layout pass; constructing a graph never touches them.

use std::fmt;

mod alg;
mod traverse;

pub use alg::{components, find_cycle};
pub use traverse::{BreadthFirst, Topo};

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("link endpoint {0} is not a node of this graph")]
    UnknownNode(NodeId),

    #[error("self-loop on node {0}")]
    SelfLoop(NodeId),

    #[error("link {from} -> {target} already exists; use the link count for parallel edges")]
    DuplicateLink { from: NodeId, target: NodeId },

    #[error("link multiplicity must be at least 1")]
    ZeroCount,

    #[error("graph contains a cycle through {}", format_path(.path))]
    Cycle { path: Vec<NodeId> },
}

fn format_path(path: &[NodeId]) -> String {
    let ids: Vec<String> = path.iter().map(|n| n.to_string()).collect();
    ids.join(" -> ")
}

/// Handle to a node in a [`Dag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

/// Handle to a link in a [`Dag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl LinkId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "~{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
struct NodeRecord<N> {
    payload: N,
    layer: Option<usize>,
    x: Option<f64>,
    y: Option<f64>,
}

#[derive(Debug, Clone)]
struct LinkRecord<L> {
    source: NodeId,
    target: NodeId,
    payload: L,
    count: usize,
    points: Vec<Point>,
}

/// A directed acyclic graph with arbitrary node and link payloads.
///
/// Acyclicity is not enforced on every insertion; call [`Dag::validate`] (the
/// layout entry point does) to reject cycles with the offending path.
#[derive(Debug, Clone)]
pub struct Dag<N, L> {
    nodes: Vec<NodeRecord<N>>,
    links: Vec<LinkRecord<L>>,
    out: Vec<Vec<LinkId>>,
    inc: Vec<Vec<LinkId>>,
}

impl<N, L> Default for Dag<N, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, L> Dag<N, L> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            out: Vec::new(),
            inc: Vec::new(),
        }
    }

    pub fn add_node(&mut self, payload: N) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeRecord {
            payload,
            layer: None,
            x: None,
            y: None,
        });
        self.out.push(Vec::new());
        self.inc.push(Vec::new());
        id
    }

    pub fn add_link(&mut self, source: NodeId, target: NodeId, payload: L) -> Result<LinkId> {
        self.add_link_with_count(source, target, payload, 1)
    }

    /// Adds a link carrying `count` parallel edges.
    ///
    /// A (source, target) pair may appear at most once; multiplicity is
    /// expressed through `count`, never through parallel link records.
    pub fn add_link_with_count(
        &mut self,
        source: NodeId,
        target: NodeId,
        payload: L,
        count: usize,
    ) -> Result<LinkId> {
        if source.0 >= self.nodes.len() {
            return Err(GraphError::UnknownNode(source));
        }
        if target.0 >= self.nodes.len() {
            return Err(GraphError::UnknownNode(target));
        }
        if source == target {
            return Err(GraphError::SelfLoop(source));
        }
        if count == 0 {
            return Err(GraphError::ZeroCount);
        }
        if self.out[source.0]
            .iter()
            .any(|&l| self.links[l.0].target == target)
        {
            return Err(GraphError::DuplicateLink { from: source, target });
        }

        let id = LinkId(self.links.len());
        self.links.push(LinkRecord {
            source,
            target,
            payload,
            count,
            points: Vec::new(),
        });
        self.out[source.0].push(id);
        self.inc[target.0].push(id);
        Ok(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn link_ids(&self) -> impl Iterator<Item = LinkId> + '_ {
        (0..self.links.len()).map(LinkId)
    }

    pub fn payload(&self, id: NodeId) -> &N {
        &self.nodes[id.0].payload
    }

    pub fn payload_mut(&mut self, id: NodeId) -> &mut N {
        &mut self.nodes[id.0].payload
    }

    pub fn link_payload(&self, id: LinkId) -> &L {
        &self.links[id.0].payload
    }

    pub fn source(&self, id: LinkId) -> NodeId {
        self.links[id.0].source
    }

    pub fn target(&self, id: LinkId) -> NodeId {
        self.links[id.0].target
    }

    pub fn count(&self, id: LinkId) -> usize {
        self.links[id.0].count
    }

    /// Outgoing links of `id` in insertion order.
    pub fn out_links(&self, id: NodeId) -> &[LinkId] {
        &self.out[id.0]
    }

    /// Incoming links of `id` in insertion order.
    pub fn in_links(&self, id: NodeId) -> &[LinkId] {
        &self.inc[id.0]
    }

    /// Children of `id` with the multiplicity of the connecting link.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        self.out[id.0]
            .iter()
            .map(|&l| (self.links[l.0].target, self.links[l.0].count))
    }

    /// Parents of `id` with the multiplicity of the connecting link.
    pub fn parents(&self, id: NodeId) -> impl Iterator<Item = (NodeId, usize)> + '_ {
        self.inc[id.0]
            .iter()
            .map(|&l| (self.links[l.0].source, self.links[l.0].count))
    }

    /// Nodes without incoming links, in insertion order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.node_ids().filter(|n| self.inc[n.0].is_empty()).collect()
    }

    /// Nodes without outgoing links, in insertion order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.node_ids().filter(|n| self.out[n.0].is_empty()).collect()
    }

    /// Checks the acyclicity invariant, returning the offending cycle if any.
    pub fn validate(&self) -> Result<()> {
        match alg::find_cycle(self) {
            Some(path) => Err(GraphError::Cycle { path }),
            None => Ok(()),
        }
    }

    pub fn layer(&self, id: NodeId) -> Option<usize> {
        self.nodes[id.0].layer
    }

    pub fn x(&self, id: NodeId) -> Option<f64> {
        self.nodes[id.0].x
    }

    pub fn y(&self, id: NodeId) -> Option<f64> {
        self.nodes[id.0].y
    }

    /// Polyline control points of a link, populated by a layout pass.
    pub fn points(&self, id: LinkId) -> &[Point] {
        &self.links[id.0].points
    }

    pub fn set_layer(&mut self, id: NodeId, layer: usize) {
        self.nodes[id.0].layer = Some(layer);
    }

    pub fn set_position(&mut self, id: NodeId, x: f64, y: f64) {
        self.nodes[id.0].x = Some(x);
        self.nodes[id.0].y = Some(y);
    }

    pub fn set_points(&mut self, id: LinkId, points: Vec<Point>) {
        self.links[id.0].points = points;
    }
}
