//! The layout orchestrator.
//!
//! Runs layering, dummy insertion, decrossing, and coordinate assignment,
//! verifies the result, then writes coordinates and link polylines back onto
//! the user DAG. Nothing is written until verification passes, so a failed
//! layout leaves the DAG untouched.

use crate::accessors::{DefaultNodeSize, NodeSize, SizeFn};
use crate::coord::{CoordOperator, CoordQuad};
use crate::decross::{DecrossOperator, TwoLayer};
use crate::error::{Error, Result};
use crate::layering::{LayeringOperator, Simplex};
use crate::sugi::{SizeCache, SugiGraph, SugiNodeKind};
use crate::util::{bigrams, time_stage};
use steller_dag::{Dag, Point};

/// Immutable layout configuration.
///
/// Defaults to simplex layering, the two-layer decrossing sweep, and
/// quadratic coordinates. Every `with_*` builder consumes the receiver and
/// returns a new configuration; operators themselves follow the same
/// convention, so configurations can be shared freely.
#[derive(Debug, Clone)]
pub struct Sugiyama<Lay = Simplex, Dx = TwoLayer, Crd = CoordQuad, Sz = DefaultNodeSize> {
    layering: Lay,
    decross: Dx,
    coord: Crd,
    node_size: Sz,
    size: Option<(f64, f64)>,
}

impl Sugiyama {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for Sugiyama {
    fn default() -> Self {
        Self {
            layering: Simplex::new(),
            decross: TwoLayer::new(),
            coord: CoordQuad::new(),
            node_size: DefaultNodeSize,
            size: None,
        }
    }
}

impl<Lay, Dx, Crd, Sz> Sugiyama<Lay, Dx, Crd, Sz> {
    pub fn with_layering<L2>(self, layering: L2) -> Sugiyama<L2, Dx, Crd, Sz> {
        Sugiyama {
            layering,
            decross: self.decross,
            coord: self.coord,
            node_size: self.node_size,
            size: self.size,
        }
    }

    pub fn with_decross<D2>(self, decross: D2) -> Sugiyama<Lay, D2, Crd, Sz> {
        Sugiyama {
            layering: self.layering,
            decross,
            coord: self.coord,
            node_size: self.node_size,
            size: self.size,
        }
    }

    pub fn with_coord<C2>(self, coord: C2) -> Sugiyama<Lay, Dx, C2, Sz> {
        Sugiyama {
            layering: self.layering,
            decross: self.decross,
            coord,
            node_size: self.node_size,
            size: self.size,
        }
    }

    /// Node extents; the closure receives `None` for dummy waypoints and is
    /// called at most once per node per layout.
    pub fn with_node_size<N, F>(self, node_size: F) -> Sugiyama<Lay, Dx, Crd, SizeFn<F>>
    where
        F: Fn(Option<&N>) -> (f64, f64),
    {
        Sugiyama {
            layering: self.layering,
            decross: self.decross,
            coord: self.coord,
            node_size: SizeFn(node_size),
            size: self.size,
        }
    }

    /// Scales the final coordinates into a `width` by `height` box.
    pub fn with_size(self, width: f64, height: f64) -> Self {
        Self {
            size: Some((width, height)),
            ..self
        }
    }

    /// Lays out `dag` in place: every node receives a layer and center
    /// coordinates, every link a polyline through its waypoints. Returns the
    /// final `(width, height)`.
    pub fn layout<N, L>(&self, dag: &mut Dag<N, L>) -> Result<(f64, f64)>
    where
        Lay: LayeringOperator<N, L>,
        Dx: DecrossOperator,
        Crd: CoordOperator<N, L>,
        Sz: NodeSize<N>,
    {
        if let Some((width, height)) = self.size {
            if width <= 0.0 || height <= 0.0 {
                return Err(Error::config(format!(
                    "target size must be positive, got ({width}, {height})"
                )));
            }
        }

        dag.validate()?;

        let layers = time_stage("layering", || self.layering.run(dag))?;
        debug_assert!(dag.link_ids().all(|l| {
            layers[dag.target(l).index()] > layers[dag.source(l).index()]
        }));

        let mut graph = SugiGraph::build(dag, &layers);
        let sizes = SizeCache::evaluate(&graph, dag, &self.node_size)?;

        // Layers stack directly: each occupies a band as tall as its tallest
        // node, and every node sits at its band's center line.
        let band_heights: Vec<f64> = graph
            .layers()
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|&v| sizes.height(v))
                    .fold(0.0f64, f64::max)
            })
            .collect();
        let mut layer_y: Vec<f64> = Vec::with_capacity(band_heights.len());
        let mut cursor = 0.0f64;
        for &band in &band_heights {
            layer_y.push(cursor + band / 2.0);
            cursor += band;
        }
        let height = cursor;
        if height <= 0.0 {
            return Err(Error::ZeroHeight);
        }

        time_stage("decross", || self.decross.run(&mut graph))?;
        let width = time_stage("coord", || self.coord.run(&mut graph, dag, &sizes))?;

        verify_separation(&graph, &sizes)?;

        let (scale_x, scale_y, out_width, out_height) = match self.size {
            Some((target_w, target_h)) if width > 0.0 => {
                (target_w / width, target_h / height, target_w, target_h)
            }
            Some((target_w, target_h)) => (1.0, target_h / height, target_w, target_h),
            None => (1.0, 1.0, width, height),
        };

        for v in 0..graph.node_count() {
            let node = graph.node(v);
            if let SugiNodeKind::Real { node: id } = node.kind {
                dag.set_layer(id, node.layer);
                dag.set_position(id, node.x * scale_x, layer_y[node.layer] * scale_y);
            }
        }
        for link in dag.link_ids().collect::<Vec<_>>() {
            let mut points = Vec::with_capacity(graph.chain(link).len() + 2);
            let source = dag.source(link);
            points.push(Point {
                x: dag.x(source).unwrap_or(0.0),
                y: dag.y(source).unwrap_or(0.0),
            });
            for &dummy in graph.chain(link) {
                let node = graph.node(dummy);
                points.push(Point {
                    x: node.x * scale_x,
                    y: layer_y[node.layer] * scale_y,
                });
            }
            let target = dag.target(link);
            points.push(Point {
                x: dag.x(target).unwrap_or(0.0),
                y: dag.y(target).unwrap_or(0.0),
            });
            dag.set_points(link, points);
        }

        Ok((out_width, out_height))
    }
}

/// Adjacent nodes of a layer may touch but never overlap.
fn verify_separation(graph: &SugiGraph, sizes: &SizeCache) -> Result<()> {
    for (l, layer) in graph.layers().iter().enumerate() {
        for (index, (&p, &v)) in bigrams(layer).enumerate() {
            let right_edge = graph.x(p) + sizes.width(p) / 2.0;
            let left_edge = graph.x(v) - sizes.width(v) / 2.0;
            if right_edge > left_edge + 1e-6 {
                return Err(Error::InvalidCoordAssignment { layer: l, index });
            }
        }
    }
    Ok(())
}
