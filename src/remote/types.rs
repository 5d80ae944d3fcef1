//! Typed views of the object store payloads the caches read

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Opaque handle of a blob-store payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobHandle {
    pub id: String,
    pub file_name: String,
}

/// `fasta_handle_info` of a modern assembly
#[derive(Debug, Clone, Deserialize)]
pub struct FastaHandleInfo {
    pub shock_id: String,
    #[serde(default)]
    pub node_file_name: Option<String>,
}

impl FastaHandleInfo {
    pub fn handle(&self) -> BlobHandle {
        BlobHandle {
            id: self.shock_id.clone(),
            file_name: self
                .node_file_name
                .clone()
                .unwrap_or_else(|| format!("{}.fa", self.shock_id)),
        }
    }
}

/// One entry of a modern assembly's `contigs` map
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssemblyContigData {
    #[serde(default)]
    pub contig_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(default)]
    pub gc_content: Option<f64>,
    #[serde(default)]
    pub is_circ: Option<i64>,
    #[serde(default, rename = "Ncount")]
    pub n_count: Option<u64>,
    #[serde(default)]
    pub md5: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssemblyContigs {
    #[serde(default)]
    pub contigs: IndexMap<String, AssemblyContigData>,
}

/// One entry of a legacy contig set's `contigs` list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyContig {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub length: Option<u64>,
    #[serde(default)]
    pub md5: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sequence: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyContigs {
    #[serde(default)]
    pub contigs: Vec<LegacyContig>,
}

/// Assembly-level derived statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssemblyStats {
    #[serde(default)]
    pub num_contigs: Option<u64>,
    #[serde(default)]
    pub dna_size: Option<u64>,
    #[serde(default)]
    pub gc_content: Option<f64>,
}

/// Where the assembly came from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalSourceInfo {
    #[serde(default)]
    pub external_source: Option<String>,
    #[serde(default)]
    pub external_source_id: Option<String>,
    #[serde(default)]
    pub external_source_origination_date: Option<String>,
}
