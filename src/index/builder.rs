//! Builds the checksum-named flat contig index

use crate::core::paths::escape_component;
use crate::index::record::IndexRecord;
use crate::remote::{
    AssemblyContigs, AssemblyKind, AssemblyRef, LegacyContigs, ObjectAccessor,
};
use crate::storage::locks::KeyedLocks;
use crate::utils::write_gz_atomic;
use crate::{AssemblyError, Result};
use flate2::Compression;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const ASSEMBLY_SUFFIX: &str = "_assembly";

const LEGACY_INDEX_FIELDS: [&str; 4] = [
    "/contigs/[*]/id",
    "/contigs/[*]/length",
    "/contigs/[*]/md5",
    "/contigs/[*]/description",
];

pub struct IndexBuilder {
    index_dir: PathBuf,
    locks: KeyedLocks,
}

/// `{checksum}_assembly.tsv.gz` under `index_dir`
pub fn flat_index_file(index_dir: &Path, checksum: &str) -> PathBuf {
    index_dir.join(format!(
        "{}{}.tsv.gz",
        escape_component(checksum),
        ASSEMBLY_SUFFIX
    ))
}

impl IndexBuilder {
    pub fn new(index_dir: impl Into<PathBuf>) -> Self {
        Self {
            index_dir: index_dir.into(),
            locks: KeyedLocks::new(),
        }
    }

    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }

    pub fn flat_index_path(&self, checksum: &str) -> PathBuf {
        flat_index_file(&self.index_dir, checksum)
    }

    /// Make sure a flat index exists for the object behind `reference`.
    ///
    /// Returns the content checksum, which names the index file. An existing
    /// file is never re-fetched or rewritten.
    pub fn ensure_index(
        &self,
        accessor: &dyn ObjectAccessor,
        reference: &AssemblyRef,
    ) -> Result<String> {
        let info = accessor.get_object_info(reference)?;
        let checksum = info.checksum.clone();
        let index_file = self.flat_index_path(&checksum);
        if index_file.is_file() {
            return Ok(checksum);
        }

        let _guard = self.locks.lock(&checksum);
        if index_file.is_file() {
            return Ok(checksum);
        }

        let kind = info
            .kind()
            .ok_or_else(|| AssemblyError::UnsupportedType(info.type_name.clone()))?;

        tracing::info!("Building contig index for {} ({})", reference, checksum);
        let start = Instant::now();
        let records = fetch_records(accessor, reference, kind)?;
        tracing::debug!(
            "Loaded {} contigs for {} in {:?}",
            records.len(),
            reference,
            start.elapsed()
        );

        fs::create_dir_all(&self.index_dir)?;
        write_gz_atomic(&index_file, Compression::default(), |out| {
            for record in &records {
                writeln!(out, "{}", record.to_line())?;
            }
            Ok(())
        })?;

        Ok(checksum)
    }
}

/// Normalize either schema into index rows, in store order
pub fn fetch_records(
    accessor: &dyn ObjectAccessor,
    reference: &AssemblyRef,
    kind: AssemblyKind,
) -> Result<Vec<IndexRecord>> {
    match kind {
        AssemblyKind::Assembly => {
            let data = accessor.get_fields(reference, &["/contigs".to_string()])?;
            let assembly: AssemblyContigs = serde_json::from_value(data)?;
            Ok(assembly
                .contigs
                .into_iter()
                .map(|(key, contig)| IndexRecord {
                    contig_id: contig.contig_id.unwrap_or(key),
                    description: contig.description.unwrap_or_default(),
                    length: contig.length,
                    gc_content: contig.gc_content,
                    is_circular: contig.is_circ.map(|c| c != 0),
                    n_count: contig.n_count,
                    md5: contig.md5.unwrap_or_default(),
                })
                .collect())
        }
        AssemblyKind::ContigSet => {
            let included: Vec<String> =
                LEGACY_INDEX_FIELDS.iter().map(|f| f.to_string()).collect();
            let data = accessor.get_fields(reference, &included)?;
            let contig_set: LegacyContigs = serde_json::from_value(data)?;
            Ok(contig_set
                .contigs
                .into_iter()
                .map(|contig| IndexRecord {
                    contig_id: contig.id.unwrap_or_default(),
                    description: contig.description.unwrap_or_default(),
                    length: contig.length,
                    gc_content: None,
                    is_circular: None,
                    n_count: None,
                    md5: contig.md5.unwrap_or_default(),
                })
                .collect())
        }
    }
}
