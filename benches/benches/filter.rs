//! Parse and filter throughput on a synthetic interface.
//!
//! Run with: cargo bench -p apisift-bench

use apisift_filter::{Conditions, Platform, VersionRange, filter};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

/// An interface with `types` top-level types, each carrying a few members
/// introduced across several releases.
fn interface(types: usize) -> String {
    let mut out = String::from(
        "// swift-interface-format-version: 1.0\n\
         // swift-module-flags: -target arm64e-apple-ios26.0 -module-name Bench\n\
         import Foundation\n",
    );
    for i in 0..types {
        let major = 15 + i % 12;
        out.push_str(&format!(
            "@available(iOS {major}.0, macOS {}.0, *)\n\
             public struct Type{i} : Swift.Sendable {{\n\
             \x20 public var id: Swift.Int\n\
             \x20 @available(iOS 26.0, *)\n\
             \x20 public func refresh(_ value: Swift.String = \"\") async throws -> Swift.Bool {{ true }}\n\
             \x20 @inlinable public init() {{ self.id = {i} }}\n\
             }}\n",
            major - 3
        ));
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for types in [10, 100, 1000] {
        let source = interface(types);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(types), &source, |b, source| {
            b.iter(|| apisift_syntax::parse(black_box(source)))
        });
    }
    group.finish();
}

fn bench_filter(c: &mut Criterion) {
    let conditions: Conditions = [(Platform::Ios, VersionRange::from("26"..))]
        .into_iter()
        .collect();
    let mut group = c.benchmark_group("filter");
    for types in [10, 100, 1000] {
        let source = interface(types);
        group.throughput(Throughput::Bytes(source.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(types), &source, |b, source| {
            b.iter(|| filter(black_box(&conditions), black_box(source)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_filter);
criterion_main!(benches);
