//! Common test utilities for asmcache integration tests
//!
//! `MockAccessor` stands in for the object store and blob store. It keeps
//! assemblies in memory and counts every call so tests can check that
//! cached data is not fetched twice.
#![allow(dead_code)]

use asmcache::remote::{AssemblyRef, BlobHandle, ObjectAccessor, ObjectInfo};
use asmcache::{AssemblyApi, AssemblyError, Config, Result};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const ASSEMBLY_TYPE: &str = "KBaseGenomeAnnotations.Assembly-6.0";
pub const CONTIG_SET_TYPE: &str = "KBaseGenomes.ContigSet-3.0";

/// One contig of a mock assembly
#[derive(Clone, Debug)]
pub struct MockContig {
    pub id: String,
    pub description: String,
    pub sequence: String,
}

impl MockContig {
    pub fn new(id: &str, sequence: &str) -> Self {
        Self {
            id: id.to_string(),
            description: String::new(),
            sequence: sequence.to_string(),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn gc_content(&self) -> f64 {
        if self.sequence.is_empty() {
            return 0.0;
        }
        let gc = self
            .sequence
            .bytes()
            .filter(|b| matches!(b.to_ascii_uppercase(), b'G' | b'C'))
            .count();
        gc as f64 / self.sequence.len() as f64
    }

    pub fn n_count(&self) -> usize {
        self.sequence
            .bytes()
            .filter(|b| b.to_ascii_uppercase() == b'N')
            .count()
    }

    pub fn md5(&self) -> String {
        format!("md5-{}", self.id)
    }
}

/// Deterministic ACGT sequence of the given length
pub fn synthetic_sequence(length: usize, seed: usize) -> String {
    const BASES: [char; 4] = ['A', 'C', 'G', 'T'];
    (0..length)
        .map(|i| BASES[(i * 7 + seed * 13 + i / 3) % 4])
        .collect()
}

struct MockObject {
    info: ObjectInfo,
    data: Value,
}

#[derive(Default)]
pub struct MockAccessor {
    objects: Mutex<HashMap<String, MockObject>>,
    blobs: Mutex<HashMap<String, std::result::Result<Vec<u8>, String>>>,
    referencing: Mutex<HashMap<String, Vec<ObjectInfo>>>,
    info_calls: AtomicUsize,
    field_calls: AtomicUsize,
    blob_calls: AtomicUsize,
}

fn object_info(reference: &str, type_name: &str, checksum: &str) -> ObjectInfo {
    let parts: Vec<u64> = reference
        .split('/')
        .map(|p| p.parse().unwrap_or(1))
        .collect();
    let part = |i: usize| parts.get(i).copied().unwrap_or(1);
    ObjectInfo {
        object_id: part(1),
        name: format!("assembly_{}", reference.replace('/', "_")),
        type_name: type_name.to_string(),
        save_date: "2024-01-01T00:00:00+0000".to_string(),
        version: part(2),
        saved_by: "tester".to_string(),
        workspace_id: part(0),
        workspace: "test_ws".to_string(),
        checksum: checksum.to_string(),
        size: 0,
    }
}

impl MockAccessor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Modern assembly whose sequences live in a FASTA blob
    pub fn add_assembly(&self, reference: &str, checksum: &str, contigs: &[MockContig]) {
        let mut contig_map = Map::new();
        let mut fasta = String::new();
        let mut gc_bases = 0.0;
        let mut dna_size = 0;
        for contig in contigs {
            contig_map.insert(
                contig.id.clone(),
                json!({
                    "contig_id": contig.id,
                    "description": contig.description,
                    "length": contig.sequence.len(),
                    "gc_content": contig.gc_content(),
                    "is_circ": 0,
                    "Ncount": contig.n_count(),
                    "md5": contig.md5(),
                }),
            );
            fasta.push_str(&format!(">{} {}\n", contig.id, contig.description));
            for line in contig.sequence.as_bytes().chunks(7) {
                fasta.push_str(std::str::from_utf8(line).unwrap_or_default());
                fasta.push('\n');
            }
            gc_bases += contig.gc_content() * contig.sequence.len() as f64;
            dna_size += contig.sequence.len();
        }

        let blob_id = format!("blob-{}", reference);
        self.blobs
            .lock()
            .unwrap()
            .insert(blob_id.clone(), Ok(fasta.into_bytes()));

        let gc_content = if dna_size > 0 { gc_bases / dna_size as f64 } else { 0.0 };
        let data = json!({
            "contigs": Value::Object(contig_map),
            "fasta_handle_info": {"shock_id": blob_id, "node_file_name": "assembly.fa"},
            "num_contigs": contigs.len(),
            "dna_size": dna_size,
            "gc_content": gc_content,
            "external_source": "NCBI",
            "external_source_id": format!("GCF_{}", checksum),
            "external_source_origination_date": "2019-05-04",
        });
        self.insert(reference, ASSEMBLY_TYPE, checksum, data);
    }

    /// Legacy contig set with inline sequences
    pub fn add_contig_set(&self, reference: &str, checksum: &str, contigs: &[MockContig]) {
        let list: Vec<Value> = contigs
            .iter()
            .map(|c| {
                json!({
                    "id": c.id,
                    "length": c.sequence.len(),
                    "md5": c.md5(),
                    "description": c.description,
                    "sequence": c.sequence,
                })
            })
            .collect();
        self.insert(reference, CONTIG_SET_TYPE, checksum, json!({ "contigs": list }));
    }

    /// Object of an arbitrary type with no data
    pub fn add_object(&self, reference: &str, type_name: &str) {
        self.insert(reference, type_name, "unused", json!({}));
    }

    pub fn add_referencing(&self, reference: &str, referrer: &str, type_name: &str) {
        self.referencing
            .lock()
            .unwrap()
            .entry(reference.to_string())
            .or_default()
            .push(object_info(referrer, type_name, "ref"));
    }

    /// Make the blob of `reference` fail with a blob-store error body
    pub fn fail_blob(&self, reference: &str, message: &str) {
        self.blobs
            .lock()
            .unwrap()
            .insert(format!("blob-{}", reference), Err(message.to_string()));
    }

    fn insert(&self, reference: &str, type_name: &str, checksum: &str, data: Value) {
        self.objects.lock().unwrap().insert(
            reference.to_string(),
            MockObject {
                info: object_info(reference, type_name, checksum),
                data,
            },
        );
    }

    pub fn info_fetches(&self) -> usize {
        self.info_calls.load(Ordering::SeqCst)
    }

    pub fn field_fetches(&self) -> usize {
        self.field_calls.load(Ordering::SeqCst)
    }

    pub fn blob_fetches(&self) -> usize {
        self.blob_calls.load(Ordering::SeqCst)
    }
}

/// Keep only the named contigs when every path is `contigs/{id}[/field]`
fn select_contigs(data: &Value, included: &[String]) -> Value {
    let ids: Option<Vec<&str>> = included
        .iter()
        .map(|path| {
            let mut parts = path.trim_start_matches('/').split('/');
            match (parts.next(), parts.next()) {
                (Some("contigs"), Some(id)) if id != "*" && id != "[*]" => Some(id),
                _ => None,
            }
        })
        .collect();

    match (ids, data.get("contigs").and_then(Value::as_object)) {
        (Some(ids), Some(contigs)) => {
            let selected: Map<String, Value> = contigs
                .iter()
                .filter(|(id, _)| ids.contains(&id.as_str()))
                .map(|(id, v)| (id.clone(), v.clone()))
                .collect();
            json!({ "contigs": Value::Object(selected) })
        }
        _ => data.clone(),
    }
}

impl ObjectAccessor for MockAccessor {
    fn get_object_info(&self, reference: &AssemblyRef) -> Result<ObjectInfo> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        self.objects
            .lock()
            .unwrap()
            .get(reference.as_str())
            .map(|o| o.info.clone())
            .ok_or_else(|| AssemblyError::UpstreamFetch(format!("No object with reference {}", reference)))
    }

    fn get_fields(&self, reference: &AssemblyRef, included: &[String]) -> Result<Value> {
        self.field_calls.fetch_add(1, Ordering::SeqCst);
        let objects = self.objects.lock().unwrap();
        let object = objects
            .get(reference.as_str())
            .ok_or_else(|| AssemblyError::UpstreamFetch(format!("No object with reference {}", reference)))?;
        Ok(select_contigs(&object.data, included))
    }

    fn stream_blob(&self, handle: &BlobHandle, dest: &Path) -> Result<u64> {
        self.blob_calls.fetch_add(1, Ordering::SeqCst);
        let blobs = self.blobs.lock().unwrap();
        match blobs.get(&handle.id) {
            Some(Ok(bytes)) => {
                fs::write(dest, bytes)?;
                Ok(bytes.len() as u64)
            }
            Some(Err(message)) => Err(AssemblyError::UpstreamFetch(message.clone())),
            None => Err(AssemblyError::UpstreamFetch(format!("Node not found: {}", handle.id))),
        }
    }

    fn list_referencing_objects(&self, reference: &AssemblyRef) -> Result<Vec<ObjectInfo>> {
        Ok(self
            .referencing
            .lock()
            .unwrap()
            .get(reference.as_str())
            .cloned()
            .unwrap_or_default())
    }
}

/// Temporary root holding both caches, plus an API over a mock accessor
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub config: Config,
    pub accessor: Arc<MockAccessor>,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = Config::with_root(temp_dir.path());
        TestEnvironment {
            temp_dir,
            config,
            accessor: MockAccessor::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut env = Self::new();
        env.config.sequence_cache.max_cached_objects = capacity;
        env
    }

    pub fn api(&self) -> AssemblyApi {
        AssemblyApi::new(&self.config, self.accessor.clone()).expect("Failed to build API")
    }

    pub fn index_dir(&self) -> &Path {
        &self.config.index.index_dir
    }

    pub fn cache_dir(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("assembly_cache")
    }
}

/// The three-contig assembly used across scenarios: lengths 100, 50, 200
pub fn three_contigs() -> Vec<MockContig> {
    vec![
        MockContig::new("contig_1", &synthetic_sequence(100, 1)),
        MockContig::new("contig_2", &synthetic_sequence(50, 2)),
        MockContig::new("contig_3", &synthetic_sequence(200, 3)),
    ]
}
