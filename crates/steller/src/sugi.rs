//! The layered internal graph the pipeline operates on.
//!
//! Real nodes wrap user nodes; dummies are the interior waypoints of links
//! spanning more than one layer, so every sugi-link connects consecutive
//! layers. Decrossing permutes nodes within layers, coordinate assignment
//! writes `x`, and the orchestrator collapses the graph back onto the user
//! DAG afterwards.

use crate::accessors::NodeSize;
use crate::error::{Error, Result};
use std::collections::VecDeque;
use steller_dag::{Dag, LinkId, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SugiNodeKind {
    /// Wraps a user node and inherits its size.
    Real { node: NodeId },
    /// One interior waypoint of the original link.
    Dummy { link: LinkId },
}

#[derive(Debug, Clone)]
pub struct SugiNode {
    pub kind: SugiNodeKind,
    pub layer: usize,
    pub x: f64,
}

impl SugiNode {
    pub fn is_real(&self) -> bool {
        matches!(self.kind, SugiNodeKind::Real { .. })
    }
}

/// A unit-span segment of an original link.
#[derive(Debug, Clone)]
pub struct SugiLink {
    pub source: usize,
    pub target: usize,
    /// Multiplicity of the original link.
    pub weight: usize,
    /// The original link this segment belongs to.
    pub link: LinkId,
}

#[derive(Debug, Clone)]
pub struct SugiGraph {
    nodes: Vec<SugiNode>,
    links: Vec<SugiLink>,
    layers: Vec<Vec<usize>>,
    out: Vec<Vec<usize>>,
    inc: Vec<Vec<usize>>,
    /// Dummy chain per original link index, in layer order; empty for unit spans.
    chains: Vec<Vec<usize>>,
    component: Vec<usize>,
    component_count: usize,
}

impl SugiGraph {
    /// Expands a layered DAG, inserting one dummy per intermediate layer of
    /// every long link. `layers[n]` is the layer of node `n`; every link must
    /// already satisfy `layer(target) > layer(source)`.
    pub fn build<N, L>(dag: &Dag<N, L>, layers: &[usize]) -> Self {
        let height = layers.iter().map(|&l| l + 1).max().unwrap_or(0);
        let mut graph = Self {
            nodes: Vec::with_capacity(dag.node_count()),
            links: Vec::new(),
            layers: vec![Vec::new(); height],
            out: Vec::new(),
            inc: Vec::new(),
            chains: vec![Vec::new(); dag.link_count()],
            component: Vec::new(),
            component_count: 0,
        };

        let mut real_of = vec![usize::MAX; dag.node_count()];
        for node in dag.node_ids() {
            let layer = layers[node.index()];
            let v = graph.push_node(SugiNode {
                kind: SugiNodeKind::Real { node },
                layer,
                x: 0.0,
            });
            graph.layers[layer].push(v);
            real_of[node.index()] = v;
        }

        for link in dag.link_ids() {
            let source_layer = layers[dag.source(link).index()];
            let target_layer = layers[dag.target(link).index()];
            debug_assert!(target_layer > source_layer, "link {link} does not descend");

            let weight = dag.count(link);
            let mut prev = real_of[dag.source(link).index()];
            for layer in source_layer + 1..target_layer {
                let dummy = graph.push_node(SugiNode {
                    kind: SugiNodeKind::Dummy { link },
                    layer,
                    x: 0.0,
                });
                graph.layers[layer].push(dummy);
                graph.chains[link.index()].push(dummy);
                graph.push_link(SugiLink {
                    source: prev,
                    target: dummy,
                    weight,
                    link,
                });
                prev = dummy;
            }
            graph.push_link(SugiLink {
                source: prev,
                target: real_of[dag.target(link).index()],
                weight,
                link,
            });
        }

        graph.assign_components();
        graph
    }

    fn push_node(&mut self, node: SugiNode) -> usize {
        self.nodes.push(node);
        self.out.push(Vec::new());
        self.inc.push(Vec::new());
        self.nodes.len() - 1
    }

    fn push_link(&mut self, link: SugiLink) {
        let index = self.links.len();
        self.out[link.source].push(index);
        self.inc[link.target].push(index);
        self.links.push(link);
    }

    /// Weak connectivity over sugi-links; component ids follow the discovery
    /// order of the lowest-indexed member, so they are deterministic.
    fn assign_components(&mut self) {
        self.component = vec![usize::MAX; self.nodes.len()];
        let mut next = 0usize;
        for start in 0..self.nodes.len() {
            if self.component[start] != usize::MAX {
                continue;
            }
            let mut queue: VecDeque<usize> = VecDeque::new();
            self.component[start] = next;
            queue.push_back(start);
            while let Some(v) = queue.pop_front() {
                let neighbors = self.out[v]
                    .iter()
                    .map(|&l| self.links[l].target)
                    .chain(self.inc[v].iter().map(|&l| self.links[l].source));
                let neighbors: Vec<usize> = neighbors.collect();
                for w in neighbors {
                    if self.component[w] == usize::MAX {
                        self.component[w] = next;
                        queue.push_back(w);
                    }
                }
            }
            next += 1;
        }
        self.component_count = next;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, v: usize) -> &SugiNode {
        &self.nodes[v]
    }

    pub fn nodes(&self) -> &[SugiNode] {
        &self.nodes
    }

    pub fn link(&self, l: usize) -> &SugiLink {
        &self.links[l]
    }

    pub fn links(&self) -> &[SugiLink] {
        &self.links
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, l: usize) -> &[usize] {
        &self.layers[l]
    }

    pub fn layers(&self) -> &[Vec<usize>] {
        &self.layers
    }

    /// Replaces the order of layer `l`; the permutation must cover exactly the
    /// layer's current members.
    pub fn set_order(&mut self, l: usize, order: Vec<usize>) {
        debug_assert_eq!(order.len(), self.layers[l].len());
        debug_assert!(order.iter().all(|&v| self.nodes[v].layer == l));
        self.layers[l] = order;
    }

    /// Position of every node within its layer.
    pub fn positions(&self) -> Vec<usize> {
        let mut positions = vec![0usize; self.nodes.len()];
        for layer in &self.layers {
            for (i, &v) in layer.iter().enumerate() {
                positions[v] = i;
            }
        }
        positions
    }

    pub fn out_links(&self, v: usize) -> &[usize] {
        &self.out[v]
    }

    pub fn in_links(&self, v: usize) -> &[usize] {
        &self.inc[v]
    }

    /// Children of `v` with link weights.
    pub fn children(&self, v: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.out[v]
            .iter()
            .map(|&l| (self.links[l].target, self.links[l].weight))
    }

    /// Parents of `v` with link weights.
    pub fn parents(&self, v: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.inc[v]
            .iter()
            .map(|&l| (self.links[l].source, self.links[l].weight))
    }

    /// Dummy chain of an original link, in layer order.
    pub fn chain(&self, link: LinkId) -> &[usize] {
        &self.chains[link.index()]
    }

    pub fn x(&self, v: usize) -> f64 {
        self.nodes[v].x
    }

    pub fn set_x(&mut self, v: usize, x: f64) {
        self.nodes[v].x = x;
    }

    pub fn component(&self, v: usize) -> usize {
        self.component[v]
    }

    pub fn component_count(&self) -> usize {
        self.component_count
    }
}

/// Node extents evaluated once per sugi-node.
#[derive(Debug, Clone)]
pub struct SizeCache {
    sizes: Vec<(f64, f64)>,
}

impl SizeCache {
    pub fn evaluate<N, L, S: NodeSize<N>>(
        graph: &SugiGraph,
        dag: &Dag<N, L>,
        accessor: &S,
    ) -> Result<Self> {
        let mut sizes = Vec::with_capacity(graph.node_count());
        for node in graph.nodes() {
            let payload = match node.kind {
                SugiNodeKind::Real { node } => Some(dag.payload(node)),
                SugiNodeKind::Dummy { .. } => None,
            };
            let (width, height) = accessor.size(payload);
            if width < 0.0 || height < 0.0 {
                return Err(Error::config(format!(
                    "node size must be non-negative, got ({width}, {height})"
                )));
            }
            sizes.push((width, height));
        }
        Ok(Self { sizes })
    }

    pub fn width(&self, v: usize) -> f64 {
        self.sizes[v].0
    }

    pub fn height(&self, v: usize) -> f64 {
        self.sizes[v].1
    }
}
