use std::path::PathBuf;
use std::sync::OnceLock;

// Cache the paths to avoid repeated environment lookups
static ASMCACHE_HOME: OnceLock<PathBuf> = OnceLock::new();
static ASMCACHE_DATA_DIR: OnceLock<PathBuf> = OnceLock::new();
static ASMCACHE_INDEX_DIR: OnceLock<PathBuf> = OnceLock::new();
static ASMCACHE_CACHE_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Get the asmcache home directory
/// Checks ASMCACHE_HOME environment variable, falls back to ${HOME}/.asmcache
pub fn asmcache_home() -> PathBuf {
    ASMCACHE_HOME
        .get_or_init(|| {
            if let Ok(path) = std::env::var("ASMCACHE_HOME") {
                PathBuf::from(path)
            } else {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".asmcache")
            }
        })
        .clone()
}

/// Get the data directory
/// Checks ASMCACHE_DATA_DIR environment variable, falls back to ASMCACHE_HOME
pub fn asmcache_data_dir() -> PathBuf {
    ASMCACHE_DATA_DIR
        .get_or_init(|| {
            if let Ok(path) = std::env::var("ASMCACHE_DATA_DIR") {
                PathBuf::from(path)
            } else {
                asmcache_home()
            }
        })
        .clone()
}

/// Get the contig index directory
/// Checks ASMCACHE_INDEX_DIR environment variable, falls back to ASMCACHE_DATA_DIR/index
pub fn asmcache_index_dir() -> PathBuf {
    ASMCACHE_INDEX_DIR
        .get_or_init(|| {
            if let Ok(path) = std::env::var("ASMCACHE_INDEX_DIR") {
                PathBuf::from(path)
            } else {
                asmcache_data_dir().join("index")
            }
        })
        .clone()
}

/// Get the sequence cache directory
/// Checks ASMCACHE_CACHE_DIR environment variable, falls back to ASMCACHE_DATA_DIR/assembly_cache
pub fn asmcache_cache_dir() -> PathBuf {
    ASMCACHE_CACHE_DIR
        .get_or_init(|| {
            if let Ok(path) = std::env::var("ASMCACHE_CACHE_DIR") {
                PathBuf::from(path)
            } else {
                asmcache_data_dir().join("assembly_cache")
            }
        })
        .clone()
}

/// Default location of the configuration file
pub fn default_config_path() -> PathBuf {
    asmcache_home().join("config.toml")
}

/// Escape a reference, checksum or contig id for use as a single path component.
///
/// `/` becomes `:` so `12/3/4` reads as `12:3:4`. Any other byte outside
/// `[A-Za-z0-9._-]` is written as `%XX`, including `%` and a literal `:`,
/// so `/` is the only byte that produces `:` and the mapping is injective. A leading `.` is escaped to keep entries visible
/// to directory scans that skip dot-prefixed staging paths.
pub fn escape_component(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for (i, byte) in raw.bytes().enumerate() {
        match byte {
            b'/' => escaped.push(':'),
            b'.' if i == 0 => escaped.push_str("%2E"),
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => {
                escaped.push(byte as char)
            }
            _ => escaped.push_str(&format!("%{:02X}", byte)),
        }
    }
    escaped
}

/// Check if running in a custom data directory
pub fn is_custom_data_dir() -> bool {
    std::env::var("ASMCACHE_DATA_DIR").is_ok() || std::env::var("ASMCACHE_HOME").is_ok()
}

/// Get a human-readable description of the current path configuration
pub fn describe_paths() -> String {
    format!(
        "asmcache Paths:\n  \
        Home: {}\n  \
        Data: {}\n  \
        Index: {}\n  \
        Cache: {}\n  \
        Custom: {}",
        asmcache_home().display(),
        asmcache_data_dir().display(),
        asmcache_index_dir().display(),
        asmcache_cache_dir().display(),
        if is_custom_data_dir() { "Yes" } else { "No (using defaults)" }
    )
}
