use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use objlit::{object_fields, Field, Object, ObjectRef, Reader, Registry, Traversal, Walker};

#[derive(Debug, Default)]
struct Node {
    name: String,
    weight: Field<f64>,
    offset: Field<[f64; 3]>,
    children: Field<Vec<ObjectRef>>,
}

impl Object for Node {
    object_fields!("Node", name: name, fields: [weight, offset, children]);
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry.register_type::<Node>().unwrap();
    registry
}

/// A tree of nodes where every node has `breadth` children
fn document(depth: usize, breadth: usize) -> String {
    fn node(out: &mut String, depth: usize, breadth: usize) {
        out.push_str("Node \"n\" { weight: 0.5, offset: [1, 2.5, -3] children: [");
        if depth > 0 {
            for _ in 0..breadth {
                node(out, depth - 1, breadth);
                out.push(',');
            }
        }
        out.push_str("] }");
    }

    let mut out = String::new();
    node(&mut out, depth, breadth);
    out
}

pub fn read_benchmark(c: &mut Criterion) {
    let registry = registry();
    let reader = Reader::new(&registry);
    let mut group = c.benchmark_group("read");
    for depth in [1, 3, 5].iter() {
        let data = document(*depth, 4);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &_depth| {
            b.iter(|| reader.read_str(black_box(&data)).unwrap())
        });
    }
    group.finish();
}

pub fn write_benchmark(c: &mut Criterion) {
    let registry = registry();
    let reader = Reader::new(&registry);
    let mut group = c.benchmark_group("write");
    for depth in [1, 3, 5].iter() {
        let data = document(*depth, 4);
        let obj = reader.read_str(&data).unwrap();
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, &_depth| {
            b.iter(|| objlit::to_string(black_box(&obj)).unwrap())
        });
    }
    group.finish();
}

pub fn visit_benchmark(c: &mut Criterion) {
    let registry = registry();
    let obj = Reader::new(&registry).read_str(&document(5, 4)).unwrap();
    c.bench_function("visit", |b| {
        b.iter(|| {
            let mut count = 0;
            Walker::new().walk(black_box(&obj), &mut |_: &ObjectRef| {
                count += 1;
                Traversal::Continue
            });
            count
        })
    });
}

criterion_group!(benches, read_benchmark, write_benchmark, visit_benchmark);
criterion_main!(benches);
