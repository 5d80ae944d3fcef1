use asmcache::index::{filter_page, sorted::sort_lines, Column, IndexRecord, SortKey};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

fn generate_index_lines(num_contigs: usize) -> Vec<String> {
    (0..num_contigs)
        .map(|i| {
            let mut record = IndexRecord::new(format!("NZ_CTG{:08}", i));
            record.description = if i % 10 == 0 {
                format!("plasmid p{} complete sequence", i)
            } else {
                format!("chromosome segment {}", i)
            };
            record.length = Some(((i * 7919) % 500_000) as u64);
            record.gc_content = Some((i % 100) as f64 / 100.0);
            record.is_circular = Some(i % 10 == 0);
            record.n_count = Some((i % 13) as u64);
            record.md5 = format!("{:032x}", i * 2654435761);
            record.to_line()
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("contig_filter");

    for num_contigs in [1_000, 10_000, 100_000].iter() {
        let lines = generate_index_lines(*num_contigs);

        group.bench_with_input(
            BenchmarkId::new("match_all", num_contigs),
            &lines,
            |b, lines| {
                b.iter(|| {
                    let page = filter_page(lines.iter().cloned().map(Ok), "", 0, 50, None).unwrap();
                    black_box(page);
                });
            },
        );

        group.bench_with_input(
            BenchmarkId::new("two_tokens", num_contigs),
            &lines,
            |b, lines| {
                b.iter(|| {
                    let page =
                        filter_page(lines.iter().cloned().map(Ok), "plasmid complete", 100, 50, None)
                            .unwrap();
                    black_box(page);
                });
            },
        );
    }

    group.finish();
}

fn bench_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("contig_sort");
    let keys = vec![
        SortKey::new(Column::Gc, false),
        SortKey::new(Column::Length, true),
    ];

    for num_contigs in [1_000, 10_000, 100_000].iter() {
        let lines = generate_index_lines(*num_contigs);
        group.bench_with_input(BenchmarkId::from_parameter(num_contigs), &lines, |b, lines| {
            b.iter(|| {
                let sorted = sort_lines(lines.iter().cloned().map(Ok), &keys).unwrap();
                black_box(sorted);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filter, bench_sort);
criterion_main!(benches);
