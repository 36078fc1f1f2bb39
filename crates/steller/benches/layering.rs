use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use std::hint::black_box;
use std::time::Duration;
use steller::dag::Dag;
use steller::layering::{LayeringOperator, LongestPath, Simplex};

/// A connected DAG: a spine for connectivity plus deterministic skip links.
fn build_dag(node_count: usize, fanout: usize) -> Dag<usize, ()> {
    let mut dag: Dag<usize, ()> = Dag::new();
    let nodes: Vec<_> = (0..node_count).map(|i| dag.add_node(i)).collect();

    for i in 0..node_count.saturating_sub(1) {
        dag.add_link(nodes[i], nodes[i + 1], ()).unwrap();
    }
    for i in 0..node_count {
        for f in 2..=fanout {
            let j = i + f * 3 + 1;
            if j < node_count {
                let _ = dag.add_link(nodes[i], nodes[j], ());
            }
        }
    }

    dag
}

fn bench_layering(c: &mut Criterion) {
    let mut group = c.benchmark_group("layering");
    group.warm_up_time(Duration::from_millis(300));
    group.measurement_time(Duration::from_secs(2));
    group.sample_size(10);

    for &size in &[16usize, 64, 256] {
        let dag = build_dag(size, 3);

        group.bench_with_input(BenchmarkId::new("longest_path", size), &dag, |b, dag| {
            b.iter_batched(
                || dag.clone(),
                |dag| black_box(LongestPath::new().run(&dag).unwrap()),
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("simplex", size), &dag, |b, dag| {
            b.iter_batched(
                || dag.clone(),
                |dag| black_box(Simplex::new().run(&dag).unwrap()),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_layering);
criterion_main!(benches);
