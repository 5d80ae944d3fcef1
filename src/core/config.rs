//! Configuration types for asmcache

use crate::core::paths;
use crate::AssemblyError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub sequence_cache: SequenceCacheConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory holding the checksum-named contig index files
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
    /// Compressed index size (bytes) above which sorted views are persisted
    #[serde(default = "default_sort_persist_threshold")]
    pub sort_persist_threshold: u64,
    /// Page size used when a search does not name a limit
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

/// Where sequence cache entries live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CacheBackend {
    /// One directory per assembly under `path`
    LocalDisk { path: PathBuf },
    /// Shared networked key-value store
    KeyValue { url: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceCacheConfig {
    #[serde(default = "default_backend")]
    pub backend: CacheBackend,
    /// Number of assemblies kept before the oldest is evicted
    #[serde(default = "default_max_cached_objects")]
    pub max_cached_objects: usize,
    /// gzip level for per-contig files (0-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_workspace_url")]
    pub workspace_url: String,
    #[serde(default = "default_blob_url")]
    pub blob_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_index_dir() -> PathBuf { paths::asmcache_index_dir() }
fn default_sort_persist_threshold() -> u64 { 250_000 }
fn default_limit() -> usize { 50 }
fn default_backend() -> CacheBackend { CacheBackend::LocalDisk { path: paths::asmcache_cache_dir() } }
fn default_max_cached_objects() -> usize { 100 }
fn default_compression_level() -> u32 { 1 }
fn default_workspace_url() -> String { "https://kbase.us/services/ws".to_string() }
fn default_blob_url() -> String { "https://kbase.us/services/shock-api".to_string() }
fn default_timeout_secs() -> u64 { 1800 }

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
            sort_persist_threshold: default_sort_persist_threshold(),
            default_limit: default_limit(),
        }
    }
}

impl Default for SequenceCacheConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            max_cached_objects: default_max_cached_objects(),
            compression_level: default_compression_level(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            workspace_url: default_workspace_url(),
            blob_url: default_blob_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Config rooted at a single directory, with index and cache side by side
    pub fn with_root<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        let mut config = Config::default();
        config.index.index_dir = root.join("index");
        config.sequence_cache.backend = CacheBackend::LocalDisk {
            path: root.join("assembly_cache"),
        };
        config
    }

    pub fn validate(&self) -> Result<(), AssemblyError> {
        if self.sequence_cache.compression_level > 9 {
            return Err(AssemblyError::Configuration(format!(
                "compression_level must be between 0 and 9, got {}",
                self.sequence_cache.compression_level
            )));
        }
        if self.index.default_limit == 0 {
            return Err(AssemblyError::Configuration(
                "default_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, AssemblyError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)
        .map_err(|e| AssemblyError::Configuration(format!("Failed to parse config: {}", e)))?;
    config.validate()?;
    Ok(config)
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<(), AssemblyError> {
    let contents = toml::to_string_pretty(config)
        .map_err(|e| AssemblyError::Configuration(format!("Failed to serialize config: {}", e)))?;
    std::fs::write(path, contents)?;
    Ok(())
}
