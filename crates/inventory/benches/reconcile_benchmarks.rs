use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use partstock_inventory::{BoundOp, Registry};

const FORMAT: &str = "Value,Tolerance,Package,Qty";
const VALUES: &[&str] = &["1", "10", "100", "1k", "10k", "100k", "1M"];
const PACKAGES: &[&str] = &["0402", "0603", "0805", "1206"];

/// Build a registry with `n` distinct resistor lines of quantity `qty`.
fn resistors(n: usize, qty: u64) -> Registry {
    let mut registry = Registry::new();
    registry.add_category("Resistors", FORMAT).unwrap();
    for i in 0..n {
        let value = VALUES[i % VALUES.len()];
        let package = PACKAGES[(i / VALUES.len()) % PACKAGES.len()];
        let line = format!("{value},{}%,{package},{qty}", i / (VALUES.len() * PACKAGES.len()));
        registry.add_component("Resistors", &line).unwrap();
    }
    registry
}

fn bench_difference(c: &mut Criterion) {
    let mut group = c.benchmark_group("difference");
    for n in [10usize, 100, 1_000] {
        let stock = resistors(n, 5);
        let project = resistors(n, 7);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(stock.difference(black_box(&project)).unwrap()))
        });
    }
    group.finish();
}

fn bench_subtract_other(c: &mut Criterion) {
    let mut group = c.benchmark_group("subtract_other");
    for n in [10usize, 100, 1_000] {
        let stock = resistors(n, 10);
        let project = resistors(n, 3);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let mut stock = stock.clone();
                stock.subtract_other(black_box(&project)).unwrap();
                black_box(stock)
            })
        });
    }
    group.finish();
}

fn bench_bound_filter(c: &mut Criterion) {
    let stock = resistors(1_000, 5);
    c.bench_function("filter_from_bound/1000", |b| {
        b.iter(|| {
            black_box(
                stock
                    .filter_components_from_bound("Resistors", "Value", black_box("5k"), BoundOp::AtLeast)
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_difference, bench_subtract_other, bench_bound_filter);
criterion_main!(benches);
