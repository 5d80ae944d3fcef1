//! Bounded on-disk cache of per-contig compressed sequences
//!
//! Each cached assembly is a directory named by its escaped reference,
//! holding one gzip file per contig. Entries are assembled in a hidden
//! staging directory and renamed into place once every contig is written,
//! so an entry directory that exists is always complete.

use crate::bio::fasta::FastaContigReader;
use crate::core::config::{CacheBackend, SequenceCacheConfig};
use crate::core::paths::escape_component;
use crate::remote::{AssemblyKind, AssemblyRef, FastaHandleInfo, LegacyContigs, ObjectAccessor};
use crate::storage::locks::KeyedLocks;
use crate::{AssemblyError, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use parking_lot::{RwLock, RwLockReadGuard};
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const STAGING_PREFIX: &str = ".staging-";
const DOWNLOAD_NAME: &str = ".download.fa";

#[derive(Deserialize)]
struct HandleFields {
    #[serde(default)]
    fasta_handle_info: Option<FastaHandleInfo>,
}

/// One cached assembly as seen on disk
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Directory name, the escaped reference
    pub name: String,
    pub path: PathBuf,
    pub created: SystemTime,
    pub contigs: usize,
    pub size_bytes: u64,
}

/// A cache entry that cannot be evicted while this value is alive
pub struct PinnedEntry<'a> {
    path: PathBuf,
    _guard: RwLockReadGuard<'a, ()>,
}

impl PinnedEntry<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub struct SequenceCache {
    cache_dir: PathBuf,
    max_cached_objects: usize,
    compression: Compression,
    build_locks: KeyedLocks,
    // Write side serializes the capacity check, victim selection and install
    // rename. Readers of an entry hold the read side so it is not evicted
    // under them.
    eviction: RwLock<()>,
}

impl SequenceCache {
    pub fn new(config: &SequenceCacheConfig) -> Result<Self> {
        let cache_dir = match &config.backend {
            CacheBackend::LocalDisk { path } => path.clone(),
            CacheBackend::KeyValue { url } => {
                return Err(AssemblyError::Configuration(format!(
                    "key-value sequence cache backend ({}) is not supported, use local-disk",
                    url
                )));
            }
        };

        Ok(Self {
            cache_dir,
            max_cached_objects: config.max_cached_objects,
            compression: Compression::new(config.compression_level),
            build_locks: KeyedLocks::new(),
            eviction: RwLock::new(()),
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn entry_path(&self, reference: &AssemblyRef) -> PathBuf {
        self.cache_dir.join(escape_component(reference.as_str()))
    }

    /// Path of one contig's file inside an entry
    pub fn contig_path(entry: &Path, contig_id: &str) -> PathBuf {
        entry.join(escape_component(contig_id))
    }

    /// Return the entry for `reference`, building it first if needed.
    ///
    /// An existing entry is returned without any remote call or eviction.
    pub fn ensure_cache(
        &self,
        accessor: &dyn ObjectAccessor,
        reference: &AssemblyRef,
    ) -> Result<PathBuf> {
        let entry = self.entry_path(reference);
        if entry.is_dir() {
            return Ok(entry);
        }

        let _guard = self.build_locks.lock(reference.as_str());
        if entry.is_dir() {
            return Ok(entry);
        }

        let info = accessor.get_object_info(reference)?;
        let kind = info
            .kind()
            .ok_or_else(|| AssemblyError::InvalidType(info.type_name.clone()))?;

        tracing::info!("Caching {}", reference);
        fs::create_dir_all(&self.cache_dir)?;
        let staging = self.cache_dir.join(format!(
            "{}{}",
            STAGING_PREFIX,
            uuid::Uuid::new_v4().simple()
        ));
        fs::create_dir(&staging)?;

        let result = self
            .populate(accessor, reference, kind, &staging)
            .and_then(|count| {
                tracing::debug!("Wrote {} contigs for {}", count, reference);
                self.install(&staging, &entry)
            });
        if result.is_err() {
            let _ = fs::remove_dir_all(&staging);
        }
        result?;

        Ok(entry)
    }

    /// `ensure_cache`, with eviction held off until the returned entry drops
    pub fn pin(
        &self,
        accessor: &dyn ObjectAccessor,
        reference: &AssemblyRef,
    ) -> Result<PinnedEntry<'_>> {
        loop {
            let path = self.ensure_cache(accessor, reference)?;
            let guard = self.eviction.read();
            if path.is_dir() {
                return Ok(PinnedEntry {
                    path,
                    _guard: guard,
                });
            }
            tracing::debug!("{} was evicted before it could be read, rebuilding", reference);
        }
    }

    fn populate(
        &self,
        accessor: &dyn ObjectAccessor,
        reference: &AssemblyRef,
        kind: AssemblyKind,
        staging: &Path,
    ) -> Result<usize> {
        let mut count = 0;
        match kind {
            AssemblyKind::Assembly => {
                let data = accessor.get_fields(reference, &["fasta_handle_info".to_string()])?;
                let fields: HandleFields = serde_json::from_value(data)?;
                let handle = fields
                    .fasta_handle_info
                    .ok_or_else(|| {
                        AssemblyError::NotFound(format!(
                            "{} has no fasta_handle_info",
                            reference
                        ))
                    })?
                    .handle();

                let download = staging.join(DOWNLOAD_NAME);
                tracing::debug!(
                    "Fetching blob {} ({}) for {}",
                    handle.id,
                    handle.file_name,
                    reference
                );
                accessor.stream_blob(&handle, &download)?;

                for contig in FastaContigReader::from_path(&download)? {
                    let (contig_id, sequence) = contig?;
                    self.write_contig(staging, &contig_id, &sequence)?;
                    count += 1;
                }
                fs::remove_file(&download)?;
            }
            AssemblyKind::ContigSet => {
                let data = accessor.get_fields(reference, &["contigs".to_string()])?;
                let contig_set: LegacyContigs = serde_json::from_value(data)?;
                for contig in contig_set.contigs {
                    let contig_id = contig.id.ok_or_else(|| {
                        AssemblyError::Parse(format!("contig without id in {}", reference))
                    })?;
                    let sequence = contig.sequence.unwrap_or_default().to_ascii_uppercase();
                    self.write_contig(staging, &contig_id, sequence.as_bytes())?;
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    fn write_contig(&self, dir: &Path, contig_id: &str, sequence: &[u8]) -> Result<()> {
        let file = File::create(Self::contig_path(dir, contig_id))?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), self.compression);
        encoder.write_all(sequence)?;
        encoder.finish()?.flush()?;
        Ok(())
    }

    /// Evict down to below capacity, then rename the staged entry into place
    fn install(&self, staging: &Path, entry: &Path) -> Result<()> {
        let _lock = self.eviction.write();
        if entry.is_dir() {
            // Another process finished the same entry first
            fs::remove_dir_all(staging)?;
            return Ok(());
        }
        self.evict_locked()?;
        fs::rename(staging, entry)?;
        Ok(())
    }

    fn evict_locked(&self) -> Result<()> {
        loop {
            let entries = self.entry_times()?;
            if entries.is_empty() || entries.len() < self.max_cached_objects {
                return Ok(());
            }
            if let Some((oldest, _)) = entries.into_iter().min_by_key(|(_, created)| *created) {
                tracing::info!("Evicting cached assembly {}", oldest.display());
                if let Err(e) = fs::remove_dir_all(&oldest) {
                    tracing::warn!("Failed to evict {}: {}", oldest.display(), e);
                    return Err(e.into());
                }
            }
        }
    }

    /// Complete entry directories with their creation times, without
    /// walking their contents
    fn entry_times(&self) -> Result<Vec<(PathBuf, SystemTime)>> {
        if !self.cache_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.cache_dir)? {
            let dir_entry = dir_entry?;
            if dir_entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let metadata = dir_entry.metadata()?;
            if metadata.is_dir() {
                entries.push((dir_entry.path(), created_time(&metadata)));
            }
        }
        Ok(entries)
    }

    /// Complete entries, oldest first. Staging directories are skipped.
    pub fn list_entries(&self) -> Result<Vec<CacheEntry>> {
        if !self.cache_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.cache_dir)? {
            let dir_entry = dir_entry?;
            let name = dir_entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let metadata = dir_entry.metadata()?;
            if !metadata.is_dir() {
                continue;
            }
            let created = created_time(&metadata);

            let mut contigs = 0;
            let mut size_bytes = 0;
            for file in fs::read_dir(dir_entry.path())? {
                let file = file?;
                contigs += 1;
                size_bytes += file.metadata()?.len();
            }

            entries.push(CacheEntry {
                name,
                path: dir_entry.path(),
                created,
                contigs,
                size_bytes,
            });
        }
        entries.sort_by_key(|e| e.created);
        Ok(entries)
    }

    /// Remove every cached entry, returning how many were removed
    pub fn clear(&self) -> Result<usize> {
        let _lock = self.eviction.write();
        let entries = self.list_entries()?;
        for entry in &entries {
            fs::remove_dir_all(&entry.path)?;
        }
        tracing::info!("Cleared {} cached assemblies", entries.len());
        Ok(entries.len())
    }
}

fn created_time(metadata: &fs::Metadata) -> SystemTime {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
