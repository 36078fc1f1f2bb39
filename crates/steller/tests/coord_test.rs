use steller::accessors::{DefaultNodeSize, SizeFn};
use steller::coord::{CoordCenter, CoordGreedy, CoordOperator, CoordQuad};
use steller::dag::{Dag, NodeId};
use steller::layering::{LayeringOperator, LongestPath};
use steller::{Error, SizeCache, SugiGraph, SugiNodeKind};

fn expand(dag: &Dag<&'static str, ()>) -> (SugiGraph, SizeCache) {
    let layers = LongestPath::new().run(dag).unwrap();
    let graph = SugiGraph::build(dag, &layers);
    let sizes = SizeCache::evaluate(&graph, dag, &DefaultNodeSize).unwrap();
    (graph, sizes)
}

fn x_of(graph: &SugiGraph, id: NodeId) -> f64 {
    for v in 0..graph.node_count() {
        if graph.node(v).kind == (SugiNodeKind::Real { node: id }) {
            return graph.x(v);
        }
    }
    panic!("node {id} not in the sugi-graph");
}

fn assert_separated(graph: &SugiGraph, sizes: &SizeCache) {
    for layer in graph.layers() {
        for pair in layer.windows(2) {
            let (p, v) = (pair[0], pair[1]);
            let gap = graph.x(v) - graph.x(p);
            let need = (sizes.width(p) + sizes.width(v)) / 2.0;
            assert!(
                gap >= need - 1e-6,
                "nodes {p} and {v} too close: gap {gap}, need {need}"
            );
        }
    }
}

/// Hourglass: two roots joining into two leaves through a single waist.
fn square() -> (Dag<&'static str, ()>, [NodeId; 4]) {
    let mut dag: Dag<&'static str, ()> = Dag::new();
    let h = dag.add_node("h");
    let l = dag.add_node("l");
    let r = dag.add_node("r");
    let t = dag.add_node("t");
    dag.add_link(h, l, ()).unwrap();
    dag.add_link(h, r, ()).unwrap();
    dag.add_link(l, t, ()).unwrap();
    dag.add_link(r, t, ()).unwrap();
    (dag, [h, l, r, t])
}

fn diamond() -> (Dag<&'static str, ()>, [NodeId; 4]) {
    let mut dag: Dag<&'static str, ()> = Dag::new();
    let a = dag.add_node("a");
    let b = dag.add_node("b");
    let c = dag.add_node("c");
    let d = dag.add_node("d");
    dag.add_link(a, b, ()).unwrap();
    dag.add_link(a, c, ()).unwrap();
    dag.add_link(b, d, ()).unwrap();
    dag.add_link(c, d, ()).unwrap();
    (dag, [a, b, c, d])
}

#[test]
fn center_matches_the_square_fixture() {
    let (dag, [h, l, r, t]) = square();
    let (mut graph, sizes) = expand(&dag);
    let width = CoordCenter::new().run(&mut graph, &dag, &sizes).unwrap();

    assert!((width - 2.0).abs() < 1e-7);
    assert!((x_of(&graph, h) - 1.0).abs() < 1e-7);
    assert!((x_of(&graph, l) - 0.5).abs() < 1e-7);
    assert!((x_of(&graph, r) - 1.5).abs() < 1e-7);
    assert!((x_of(&graph, t) - 1.0).abs() < 1e-7);
}

fn zero_width(_node: Option<&&'static str>) -> (f64, f64) {
    (0.0, 1.0)
}

#[test]
fn center_fails_when_every_width_is_zero() {
    let mut dag: Dag<&'static str, ()> = Dag::new();
    dag.add_node("only");
    let layers = LongestPath::new().run(&dag).unwrap();
    let mut graph = SugiGraph::build(&dag, &layers);
    let sizes = SizeCache::evaluate(&graph, &dag, &SizeFn(zero_width)).unwrap();

    assert!(matches!(
        CoordCenter::new().run(&mut graph, &dag, &sizes),
        Err(Error::ZeroWidth)
    ));
}

#[test]
fn quad_fails_when_every_width_is_zero() {
    let mut dag: Dag<&'static str, ()> = Dag::new();
    dag.add_node("only");
    let layers = LongestPath::new().run(&dag).unwrap();
    let mut graph = SugiGraph::build(&dag, &layers);
    let sizes = SizeCache::evaluate(&graph, &dag, &SizeFn(zero_width)).unwrap();

    assert!(matches!(
        CoordQuad::new().run(&mut graph, &dag, &sizes),
        Err(Error::ZeroWidth)
    ));
}

#[test]
fn greedy_pulls_a_child_under_its_parent() {
    let mut dag: Dag<&'static str, ()> = Dag::new();
    let a = dag.add_node("a");
    let b = dag.add_node("b");
    let c = dag.add_node("c");
    dag.add_link(a, c, ()).unwrap();
    let _ = b;

    let (mut graph, sizes) = expand(&dag);
    CoordGreedy::new().run(&mut graph, &dag, &sizes).unwrap();

    assert!((x_of(&graph, c) - x_of(&graph, a)).abs() < 1e-7);
    assert_separated(&graph, &sizes);
}

#[test]
fn quad_centers_the_diamond() {
    let (dag, [a, b, c, d]) = diamond();
    let (mut graph, sizes) = expand(&dag);
    CoordQuad::new().run(&mut graph, &dag, &sizes).unwrap();

    let (xb, xc) = (x_of(&graph, b), x_of(&graph, c));
    assert!((xb - xc).abs() > 0.5, "middle layer collapsed: {xb} vs {xc}");
    assert!((x_of(&graph, d) - (xb + xc) / 2.0).abs() < 1e-6);
    assert!((x_of(&graph, a) - (xb + xc) / 2.0).abs() < 1e-6);
    assert_separated(&graph, &sizes);
}

#[test]
fn quad_satisfies_every_separation_constraint() {
    let (dag, _) = square();
    let (mut graph, sizes) = expand(&dag);
    CoordQuad::new().run(&mut graph, &dag, &sizes).unwrap();
    assert_separated(&graph, &sizes);
}

#[test]
fn quad_rejects_negative_weights() {
    let (dag, _) = diamond();
    let (mut graph, sizes) = expand(&dag);
    let op = CoordQuad::new().with_vertical(-1.0, 0.0);
    assert!(matches!(
        op.run(&mut graph, &dag, &sizes),
        Err(Error::InvalidConfig { .. })
    ));
}

#[test]
fn quad_with_all_zero_weights_is_ill_defined() {
    let mut dag: Dag<&'static str, ()> = Dag::new();
    let a = dag.add_node("a");
    let b = dag.add_node("b");
    dag.add_link(a, b, ()).unwrap();

    let (mut graph, sizes) = expand(&dag);
    let op = CoordQuad::new().with_vertical(0.0, 0.0).with_curve(0.0, 0.0);
    assert!(matches!(
        op.run(&mut graph, &dag, &sizes),
        Err(Error::IllDefinedObjective)
    ));
}

#[test]
fn quad_keeps_separate_components_apart() {
    let mut dag: Dag<&'static str, ()> = Dag::new();
    let a = dag.add_node("a");
    let b = dag.add_node("b");
    let c = dag.add_node("c");
    let d = dag.add_node("d");
    dag.add_link(a, b, ()).unwrap();
    dag.add_link(c, d, ()).unwrap();

    let (mut graph, sizes) = expand(&dag);
    let width = CoordQuad::new().run(&mut graph, &dag, &sizes).unwrap();

    assert_separated(&graph, &sizes);
    assert!(width >= 2.0 - 1e-6, "components must sit side by side: {width}");
}

#[test]
fn quad_constant_getters_mirror_the_setters() {
    let op = CoordQuad::new().with_vertical(2.0, 0.5).with_curve(0.25, 4.0);
    assert_eq!(op.vertical(), (2.0, 0.5));
    assert_eq!(op.curve(), (0.25, 4.0));
    assert_eq!(op.component(), 1.0);
}
