/// Boundary to the object store and blob store
///
/// The caches only need "fetch object metadata/fields by reference" and
/// "stream a blob by handle to a local file". Everything else about the
/// remote systems stays behind the `ObjectAccessor` trait.
pub mod types;
pub mod workspace;

pub use types::{
    AssemblyContigData, AssemblyContigs, AssemblyStats, BlobHandle, ExternalSourceInfo,
    FastaHandleInfo, LegacyContig, LegacyContigs,
};
pub use workspace::WorkspaceClient;

use crate::{AssemblyError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;

pub const ASSEMBLY_TYPE: &str = "KBaseGenomeAnnotations.Assembly";
pub const CONTIG_SET_TYPE: &str = "KBaseGenomes.ContigSet";

/// Reference to one version of an assembly or contig set, e.g. `7989/489/2`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssemblyRef(String);

impl AssemblyRef {
    pub fn new(reference: impl Into<String>) -> Result<Self> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(AssemblyError::InvalidInput(
                "'ref', a reference to an assembly must be provided".to_string(),
            ));
        }
        Ok(Self(reference))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssemblyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two schemas that carry contigs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssemblyKind {
    /// Modern assembly: contig map plus a FASTA blob handle
    Assembly,
    /// Legacy contig set: inline list of contigs with sequences
    ContigSet,
}

impl AssemblyKind {
    /// Resolve a versioned type name such as `KBaseGenomes.ContigSet-3.0`
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        match type_name.split('-').next() {
            Some(ASSEMBLY_TYPE) => Some(AssemblyKind::Assembly),
            Some(CONTIG_SET_TYPE) => Some(AssemblyKind::ContigSet),
            _ => None,
        }
    }
}

/// Object metadata as reported by the object store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    pub object_id: u64,
    pub name: String,
    pub type_name: String,
    pub save_date: String,
    pub version: u64,
    pub saved_by: String,
    pub workspace_id: u64,
    pub workspace: String,
    /// Content checksum, the cache key for the contig index
    pub checksum: String,
    pub size: u64,
}

impl ObjectInfo {
    pub fn kind(&self) -> Option<AssemblyKind> {
        AssemblyKind::from_type_name(&self.type_name)
    }

    /// `wsid/objid/version`
    pub fn reference(&self) -> String {
        format!("{}/{}/{}", self.workspace_id, self.object_id, self.version)
    }

    /// Decode the positional info tuple
    /// `[objid, name, type, save_date, version, saved_by, wsid, workspace, chsum, size, meta]`
    pub fn from_tuple(value: &Value) -> Result<Self> {
        let items = value.as_array().ok_or_else(|| {
            AssemblyError::UpstreamFetch(format!("object info is not a list: {}", value))
        })?;
        if items.len() < 10 {
            return Err(AssemblyError::UpstreamFetch(format!(
                "object info has {} fields, expected at least 10",
                items.len()
            )));
        }

        let text = |i: usize| items[i].as_str().unwrap_or_default().to_string();
        let number = |i: usize| items[i].as_u64().unwrap_or_default();

        Ok(Self {
            object_id: number(0),
            name: text(1),
            type_name: text(2),
            save_date: text(3),
            version: number(4),
            saved_by: text(5),
            workspace_id: number(6),
            workspace: text(7),
            checksum: text(8),
            size: number(9),
        })
    }
}

/// Narrow view of the object store and blob store used by the caches
pub trait ObjectAccessor: Send + Sync {
    /// Fetch metadata for one object version
    fn get_object_info(&self, reference: &AssemblyRef) -> Result<ObjectInfo>;

    /// Fetch a partial record holding only the `included` field paths
    fn get_fields(&self, reference: &AssemblyRef, included: &[String]) -> Result<Value>;

    /// Stream a blob into `dest`, returning the number of bytes written
    fn stream_blob(&self, handle: &BlobHandle, dest: &Path) -> Result<u64>;

    /// Metadata of every object that references this one
    fn list_referencing_objects(&self, reference: &AssemblyRef) -> Result<Vec<ObjectInfo>>;
}
