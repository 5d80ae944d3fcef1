mod common;

use asmcache::index::{filter_page, SearchParams};
use asmcache::remote::AssemblyRef;
use asmcache::AssemblyError;
use common::{synthetic_sequence, three_contigs, MockContig, TestEnvironment};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::fs;

fn ids(result: &asmcache::SearchResult) -> Vec<String> {
    result.contigs.iter().map(|c| c.contig_id.clone()).collect()
}

fn search(reference: &str, query: &str, start: u64, limit: u64) -> SearchParams {
    SearchParams {
        query: Some(query.to_string()),
        start: Some(start),
        limit: Some(limit),
        ..SearchParams::new(reference)
    }
}

#[test]
fn test_three_contig_scenario() {
    let env = TestEnvironment::new();
    env.accessor.add_assembly("1/2/3", "chk3", &three_contigs());
    let api = env.api();

    let result = api.search_contigs(&search("1/2/3", "", 0, 2)).unwrap();
    assert_eq!(ids(&result), vec!["contig_1", "contig_2"]);
    assert_eq!(result.num_found, 3);
    assert_eq!(result.start, 0);
    assert_eq!(result.contigs[0].length, Some(100));
    assert_eq!(result.contigs[1].length, Some(50));

    let result = api.search_contigs(&search("1/2/3", "xyz", 0, 2)).unwrap();
    assert!(result.contigs.is_empty());
    assert_eq!(result.num_found, 0);
    assert_eq!(result.query, "xyz");
}

#[test]
fn test_defaults_apply() {
    let env = TestEnvironment::new();
    let contigs: Vec<MockContig> = (0..60)
        .map(|i| MockContig::new(&format!("ctg_{:02}", i), &synthetic_sequence(10 + i, i)))
        .collect();
    env.accessor.add_assembly("1/1/1", "chk60", &contigs);

    let result = env.api().search_contigs(&SearchParams::new("1/1/1")).unwrap();
    assert_eq!(result.contigs.len(), 50);
    assert_eq!(result.num_found, 60);
    assert_eq!(result.start, 0);
    assert_eq!(result.query, "");
}

#[test]
fn test_index_is_built_once() {
    let env = TestEnvironment::new();
    env.accessor.add_assembly("1/2/3", "chk3", &three_contigs());
    let api = env.api();

    api.search_contigs(&search("1/2/3", "", 0, 10)).unwrap();
    let index_file = env.index_dir().join("chk3_assembly.tsv.gz");
    let first = fs::read(&index_file).unwrap();

    api.search_contigs(&search("1/2/3", "contig", 0, 10)).unwrap();
    let builder = api.indexer().builder();
    let reference = AssemblyRef::new("1/2/3").unwrap();
    assert_eq!(builder.ensure_index(env.accessor.as_ref(), &reference).unwrap(), "chk3");
    let second = fs::read(&index_file).unwrap();

    assert_eq!(env.accessor.field_fetches(), 1);
    assert_eq!(env.accessor.info_fetches(), 3);
    assert_eq!(first, second);
}

#[test]
fn test_refs_with_same_checksum_share_index() {
    let env = TestEnvironment::new();
    env.accessor.add_assembly("1/2/3", "shared", &three_contigs());
    env.accessor.add_assembly("1/2/4", "shared", &three_contigs());
    let api = env.api();

    let a = api.search_contigs(&search("1/2/3", "", 0, 10)).unwrap();
    let b = api.search_contigs(&search("1/2/4", "", 0, 10)).unwrap();
    assert_eq!(a, b);
    assert_eq!(env.accessor.field_fetches(), 1);
}

#[test]
fn test_numeric_sort() {
    let env = TestEnvironment::new();
    let contigs: Vec<MockContig> = [100usize, 50, 200, 9, 1000, 75]
        .iter()
        .enumerate()
        .map(|(i, len)| MockContig::new(&format!("c{}", i), &synthetic_sequence(*len, i)))
        .collect();
    env.accessor.add_assembly("5/5/5", "chk_sort", &contigs);
    let api = env.api();

    let params = SearchParams {
        sort_by: vec![("length".to_string(), true)],
        limit: Some(100),
        ..SearchParams::new("5/5/5")
    };
    let lengths: Vec<u64> = api
        .search_contigs(&params)
        .unwrap()
        .contigs
        .iter()
        .filter_map(|c| c.length)
        .collect();
    assert_eq!(lengths, vec![9, 50, 75, 100, 200, 1000]);

    let params = SearchParams {
        sort_by: vec![("length".to_string(), false)],
        limit: Some(100),
        ..SearchParams::new("5/5/5")
    };
    let lengths: Vec<u64> = api
        .search_contigs(&params)
        .unwrap()
        .contigs
        .iter()
        .filter_map(|c| c.length)
        .collect();
    assert_eq!(lengths, vec![1000, 200, 100, 75, 50, 9]);

    let unsorted = api.search_contigs(&search("5/5/5", "", 0, 100)).unwrap();
    assert_eq!(ids(&unsorted), vec!["c0", "c1", "c2", "c3", "c4", "c5"]);
}

#[test]
fn test_sorted_view_persistence_follows_threshold() {
    let sort_by = vec![("gc".to_string(), false), ("contig_id".to_string(), true)];

    let mut env = TestEnvironment::new();
    env.config.index.sort_persist_threshold = 0;
    env.accessor.add_assembly("1/2/3", "chk3", &three_contigs());
    let persisted = env
        .api()
        .search_contigs(&SearchParams {
            sort_by: sort_by.clone(),
            ..SearchParams::new("1/2/3")
        })
        .unwrap();
    assert!(env.index_dir().join("chk3__assembly_4d1a.tsv.gz").is_file());

    let env = TestEnvironment::new();
    env.accessor.add_assembly("1/2/3", "chk3", &three_contigs());
    let streamed = env
        .api()
        .search_contigs(&SearchParams {
            sort_by,
            ..SearchParams::new("1/2/3")
        })
        .unwrap();
    assert!(!env.index_dir().join("chk3__assembly_4d1a.tsv.gz").exists());

    assert_eq!(persisted, streamed);
}

#[test]
fn test_pagination_reconstructs_matches() {
    let env = TestEnvironment::new();
    let contigs: Vec<MockContig> = (0..11)
        .map(|i| {
            let description = if i % 3 == 0 { "Plasmid pXO1" } else { "chromosome" };
            MockContig::new(&format!("ctg_{}", i), &synthetic_sequence(20 + i, i))
                .with_description(description)
        })
        .collect();
    env.accessor.add_assembly("2/2/2", "chk_pages", &contigs);
    let api = env.api();

    for query in ["", "plasmid", "PLASMID pxo1", "chromosome,ctg_1"] {
        let full = api.search_contigs(&search("2/2/2", query, 0, 1000)).unwrap();
        for limit in 1..=6 {
            let mut collected = Vec::new();
            let mut start = 0;
            loop {
                let page = api.search_contigs(&search("2/2/2", query, start, limit)).unwrap();
                assert_eq!(page.num_found, full.num_found, "query={:?} limit={}", query, limit);
                if page.contigs.is_empty() {
                    break;
                }
                collected.extend(page.contigs);
                start += limit;
            }
            assert_eq!(collected, full.contigs, "query={:?} limit={}", query, limit);
        }
    }
}

#[test]
fn test_known_count_stops_after_page() {
    let env = TestEnvironment::new();
    env.accessor.add_assembly("1/2/3", "chk3", &three_contigs());
    let params = SearchParams {
        num_found: Some(3),
        limit: Some(1),
        ..SearchParams::new("1/2/3")
    };
    let result = env.api().search_contigs(&params).unwrap();
    assert_eq!(ids(&result), vec!["contig_1"]);
    assert_eq!(result.num_found, 3);
}

#[test]
fn test_legacy_contig_set_is_normalized() {
    let env = TestEnvironment::new();
    let contigs = vec![
        MockContig::new("legacy_1", "ACGTACGT").with_description("first"),
        MockContig::new("legacy_2", "GGCC").with_description("second"),
    ];
    env.accessor.add_contig_set("3/3/3", "chk_legacy", &contigs);

    let result = env.api().search_contigs(&search("3/3/3", "second", 0, 10)).unwrap();
    assert_eq!(result.num_found, 1);
    let record = &result.contigs[0];
    assert_eq!(record.contig_id, "legacy_2");
    assert_eq!(record.description, "second");
    assert_eq!(record.length, Some(4));
    assert_eq!(record.md5, "md5-legacy_2");
    assert_eq!(record.gc_content, None);
    assert_eq!(record.is_circular, None);
    assert_eq!(record.n_count, None);
}

#[test]
fn test_modern_assembly_fields() {
    let env = TestEnvironment::new();
    env.accessor
        .add_assembly("4/4/4", "chk_fields", &[MockContig::new("x", "GGNNAT")]);
    let result = env.api().search_contigs(&search("4/4/4", "", 0, 10)).unwrap();
    let record = &result.contigs[0];
    assert_eq!(record.length, Some(6));
    assert_eq!(record.n_count, Some(2));
    assert_eq!(record.is_circular, Some(false));
    assert!((record.gc_content.unwrap() - 2.0 / 6.0).abs() < 1e-9);
}

#[test]
fn test_unsupported_type() {
    let env = TestEnvironment::new();
    env.accessor.add_object("9/9/9", "KBaseGenomes.Genome-8.2");
    match env.api().search_contigs(&search("9/9/9", "", 0, 10)) {
        Err(AssemblyError::UnsupportedType(type_name)) => {
            assert_eq!(type_name, "KBaseGenomes.Genome-8.2")
        }
        other => panic!("Expected UnsupportedType, got {:?}", other),
    }
    assert_eq!(env.accessor.field_fetches(), 0);
}

#[test]
fn test_unknown_column() {
    let env = TestEnvironment::new();
    env.accessor.add_assembly("1/2/3", "chk3", &three_contigs());
    let params = SearchParams {
        sort_by: vec![("weight".to_string(), true)],
        ..SearchParams::new("1/2/3")
    };
    assert!(matches!(
        env.api().search_contigs(&params),
        Err(AssemblyError::UnknownColumn { .. })
    ));
}

#[test]
fn test_upstream_failure_and_empty_ref() {
    let env = TestEnvironment::new();
    let api = env.api();
    assert!(matches!(
        api.search_contigs(&SearchParams::new("404/1/1")),
        Err(AssemblyError::UpstreamFetch(_))
    ));
    assert!(matches!(
        api.search_contigs(&SearchParams::new("")),
        Err(AssemblyError::InvalidInput(_))
    ));
}

proptest! {
    #[test]
    fn prop_pages_partition_matches(hits in prop::collection::vec(any::<bool>(), 0..40), limit in 1u64..8) {
        let lines: Vec<String> = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| format!("ctg_{}\t{}\t{}\t\t\t\t", i, if *hit { "hit" } else { "miss" }, i))
            .collect();
        let expected: Vec<String> = hits
            .iter()
            .enumerate()
            .filter(|(_, hit)| **hit)
            .map(|(i, _)| format!("ctg_{}", i))
            .collect();

        let mut collected = Vec::new();
        let mut start = 0;
        loop {
            let page = filter_page(
                lines.iter().cloned().map(Ok::<_, AssemblyError>),
                "hit",
                start,
                limit,
                None,
            )
            .unwrap();
            prop_assert_eq!(page.num_found, expected.len() as u64);
            if page.contigs.is_empty() {
                break;
            }
            collected.extend(page.contigs.into_iter().map(|c| c.contig_id));
            start += limit;
        }
        prop_assert_eq!(collected, expected);
    }
}

#[test]
fn test_concurrent_searches_build_index_once() {
    let env = TestEnvironment::new();
    env.accessor.add_assembly("1/2/3", "chk3", &three_contigs());
    let api = env.api();

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| s.spawn(|| api.search_contigs(&search("1/2/3", "", 0, 10))))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for result in results {
        assert_eq!(result.unwrap().num_found, 3);
    }
    assert_eq!(env.accessor.field_fetches(), 1);
}
