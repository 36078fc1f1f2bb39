use steller::dag::{Dag, NodeId};
use steller::decross::{count_crossings, DecrossOperator, DecrossOpt, OptLarge, TwoLayer};
use steller::layering::{LayeringOperator, LongestPath};
use steller::{Error, SugiGraph, SugiNodeKind};

fn expand(dag: &Dag<&'static str, ()>) -> SugiGraph {
    let layers = LongestPath::new().run(dag).unwrap();
    SugiGraph::build(dag, &layers)
}

/// In-layer order of real nodes, as user node ids.
fn layer_order(graph: &SugiGraph, l: usize) -> Vec<NodeId> {
    graph
        .layer(l)
        .iter()
        .filter_map(|&v| match graph.node(v).kind {
            SugiNodeKind::Real { node } => Some(node),
            SugiNodeKind::Dummy { .. } => None,
        })
        .collect()
}

/// Two parents, two children, links crossed.
fn crossed_square() -> (Dag<&'static str, ()>, [NodeId; 4]) {
    let mut dag: Dag<&'static str, ()> = Dag::new();
    let a = dag.add_node("a");
    let b = dag.add_node("b");
    let c = dag.add_node("c");
    let d = dag.add_node("d");
    dag.add_link(a, d, ()).unwrap();
    dag.add_link(b, c, ()).unwrap();
    (dag, [a, b, c, d])
}

#[test]
fn count_crossings_sees_the_crossed_square() {
    let (dag, _) = crossed_square();
    let graph = expand(&dag);
    assert_eq!(count_crossings(&graph), 1);
}

#[test]
fn count_crossings_multiplies_link_weights() {
    let mut dag: Dag<&'static str, ()> = Dag::new();
    let a = dag.add_node("a");
    let b = dag.add_node("b");
    let c = dag.add_node("c");
    let d = dag.add_node("d");
    dag.add_link_with_count(a, d, (), 2).unwrap();
    dag.add_link_with_count(b, c, (), 3).unwrap();

    let graph = expand(&dag);
    assert_eq!(count_crossings(&graph), 6);
}

#[test]
fn two_layer_uncrosses_the_square() {
    let (dag, _) = crossed_square();
    let mut graph = expand(&dag);
    TwoLayer::new().run(&mut graph).unwrap();
    assert_eq!(count_crossings(&graph), 0);
}

#[test]
fn two_layer_keeps_an_already_straight_order() {
    let mut dag: Dag<&'static str, ()> = Dag::new();
    let a = dag.add_node("a");
    let b = dag.add_node("b");
    let c = dag.add_node("c");
    let d = dag.add_node("d");
    dag.add_link(a, c, ()).unwrap();
    dag.add_link(b, d, ()).unwrap();

    let mut graph = expand(&dag);
    TwoLayer::new().run(&mut graph).unwrap();
    assert_eq!(layer_order(&graph, 0), vec![a, b]);
    assert_eq!(layer_order(&graph, 1), vec![c, d]);
}

#[test]
fn opt_decross_reaches_the_crossing_optimum() {
    let (dag, _) = crossed_square();
    let mut graph = expand(&dag);
    DecrossOpt::new().run(&mut graph).unwrap();
    assert_eq!(count_crossings(&graph), 0);
}

#[test]
fn opt_decross_preserves_order_when_tied() {
    // No pair of links can cross, so the incoming order must survive.
    let mut dag: Dag<&'static str, ()> = Dag::new();
    let a = dag.add_node("a");
    let b = dag.add_node("b");
    let c = dag.add_node("c");
    let d = dag.add_node("d");
    dag.add_link(a, c, ()).unwrap();
    dag.add_link(b, d, ()).unwrap();

    let mut graph = expand(&dag);
    DecrossOpt::new().run(&mut graph).unwrap();
    assert_eq!(layer_order(&graph, 0), vec![a, b]);
    assert_eq!(layer_order(&graph, 1), vec![c, d]);
}

#[test]
fn opt_decross_handles_a_three_layer_tangle() {
    // Middle layer must settle between crossed links above and below.
    let mut dag: Dag<&'static str, ()> = Dag::new();
    let a = dag.add_node("a");
    let b = dag.add_node("b");
    let p = dag.add_node("p");
    let q = dag.add_node("q");
    let x = dag.add_node("x");
    let y = dag.add_node("y");
    for (u, v) in [(a, q), (b, p), (p, y), (q, x)] {
        dag.add_link(u, v, ()).unwrap();
    }

    let mut graph = expand(&dag);
    DecrossOpt::new().run(&mut graph).unwrap();
    assert_eq!(count_crossings(&graph), 0);
}

#[test]
fn opt_decross_rejects_an_oversized_layer() {
    let mut dag: Dag<&'static str, ()> = Dag::new();
    for _ in 0..30 {
        dag.add_node("n");
    }

    // 30 nodes in one layer is 435 ordering variables, over the small gate.
    let layers = LongestPath::new().run(&dag).unwrap();
    let mut graph = SugiGraph::build(&dag, &layers);
    let err = DecrossOpt::new().run(&mut graph).unwrap_err();
    let Error::GraphTooLarge { variables, limit } = err else {
        panic!("expected GraphTooLarge, got {err:?}");
    };
    assert_eq!(variables, 435);
    assert_eq!(limit, 400);
}

#[test]
fn opt_decross_medium_still_bounds_the_gate() {
    // 50 nodes in one layer is 1225 ordering variables, past even medium.
    let mut dag: Dag<&'static str, ()> = Dag::new();
    for _ in 0..50 {
        dag.add_node("n");
    }

    let layers = LongestPath::new().run(&dag).unwrap();
    let mut graph = SugiGraph::build(&dag, &layers);
    let err = DecrossOpt::new()
        .with_large(OptLarge::Medium)
        .run(&mut graph)
        .unwrap_err();
    let Error::GraphTooLarge { variables, limit } = err else {
        panic!("expected GraphTooLarge, got {err:?}");
    };
    assert_eq!(variables, 1225);
    assert_eq!(limit, 1200);
}

#[test]
fn opt_decross_large_disables_the_gate() {
    let (dag, _) = crossed_square();
    let mut graph = expand(&dag);
    DecrossOpt::new()
        .with_large(OptLarge::Large)
        .run(&mut graph)
        .unwrap();
    assert_eq!(count_crossings(&graph), 0);
}
