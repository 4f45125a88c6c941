use criterion::{Criterion, black_box, criterion_group, criterion_main};
use deptree_meta::DependencySpec;
use deptree_meta::manifest::declaration_lines;

fn parse_declaration_benchmark(c: &mut Criterion) {
    c.bench_function("DependencySpec::parse (git)", |b| {
        b.iter(|| {
            DependencySpec::parse(black_box(
                "libfoo GIT_REPOSITORY https://example/foo GIT_TAG v1.0 GIT_SHALLOW TRUE",
            ))
            .unwrap()
        })
    });
}

fn manifest_filter_benchmark(c: &mut Criterion) {
    let text: String = (0..500)
        .map(|i| {
            if i % 5 == 0 {
                "# comment\n\n".to_string()
            } else {
                format!("dep{i} GIT_REPOSITORY https://example/dep{i} GIT_TAG v{i}\n")
            }
        })
        .collect();

    c.bench_function("manifest::declaration_lines (500 lines)", |b| {
        b.iter(|| declaration_lines(black_box(&text)))
    });
}

criterion_group!(benches, parse_declaration_benchmark, manifest_filter_benchmark);
criterion_main!(benches);
