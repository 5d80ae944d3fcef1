//! Sorted views over a flat index, cached per sort signature

use crate::core::paths::escape_component;
use crate::index::builder::{flat_index_file, ASSEMBLY_SUFFIX};
use crate::index::record::Column;
use crate::storage::locks::KeyedLocks;
use crate::utils::write_gz_atomic;
use crate::{AssemblyError, Result};
use flate2::read::GzDecoder;
use flate2::Compression;
use std::cmp::Ordering;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Lines, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One requested ordering column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: Column,
    pub ascending: bool,
}

impl SortKey {
    pub fn new(column: Column, ascending: bool) -> Self {
        Self { column, ascending }
    }

    /// Resolve caller-supplied `(column name, ascending)` pairs
    pub fn parse_all(sort_by: &[(String, bool)]) -> Result<Vec<SortKey>> {
        sort_by
            .iter()
            .map(|(name, ascending)| Ok(SortKey::new(Column::parse(name)?, *ascending)))
            .collect()
    }

    /// Stable file-name code: column position then `a`/`d`, e.g. `4a3d`
    pub fn signature(keys: &[SortKey]) -> String {
        keys.iter()
            .map(|k| format!("{}{}", k.column.position(), if k.ascending { 'a' } else { 'd' }))
            .collect()
    }
}

/// Lines of an index, read lazily from disk or served from a sort buffer
pub enum IndexLines {
    File(Lines<BufReader<GzDecoder<File>>>),
    Memory(std::vec::IntoIter<String>),
}

impl IndexLines {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(IndexLines::File(BufReader::new(GzDecoder::new(file)).lines()))
    }
}

impl Iterator for IndexLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            IndexLines::File(lines) => lines.next().map(|line| line.map_err(AssemblyError::from)),
            IndexLines::Memory(lines) => lines.next().map(Ok),
        }
    }
}

pub struct SortedViewProvider {
    index_dir: PathBuf,
    persist_threshold: u64,
    locks: KeyedLocks,
}

impl SortedViewProvider {
    pub fn new(index_dir: impl Into<PathBuf>, persist_threshold: u64) -> Self {
        Self {
            index_dir: index_dir.into(),
            persist_threshold,
            locks: KeyedLocks::new(),
        }
    }

    pub fn flat_path(&self, checksum: &str) -> PathBuf {
        flat_index_file(&self.index_dir, checksum)
    }

    /// `{checksum}__assembly_{signature}.tsv.gz`
    pub fn sorted_path(&self, checksum: &str, keys: &[SortKey]) -> PathBuf {
        self.index_dir.join(format!(
            "{}_{}_{}.tsv.gz",
            escape_component(checksum),
            ASSEMBLY_SUFFIX,
            SortKey::signature(keys)
        ))
    }

    /// Lines of the index for `checksum` in the order given by `sort_by`.
    ///
    /// No keys means FlatIndex order. Sorted output is persisted only when
    /// the flat file is larger than the threshold; smaller inputs are sorted
    /// again on each call.
    pub fn open_view(&self, checksum: &str, sort_by: &[(String, bool)]) -> Result<IndexLines> {
        let keys = SortKey::parse_all(sort_by)?;
        let input = self.flat_path(checksum);
        if !input.is_file() {
            return Err(AssemblyError::NotFound(format!(
                "File not found: {}",
                input.display()
            )));
        }
        if keys.is_empty() {
            return IndexLines::open(&input);
        }

        let output = self.sorted_path(checksum, &keys);
        if output.is_file() {
            return IndexLines::open(&output);
        }

        let persist = fs::metadata(&input)?.len() > self.persist_threshold;
        let _guard = persist.then(|| self.locks.lock(&output.to_string_lossy()));
        if persist && output.is_file() {
            return IndexLines::open(&output);
        }

        let start = Instant::now();
        let lines = sort_lines(IndexLines::open(&input)?, &keys)?;
        tracing::debug!(
            "Sorted {} rows by {} in {:?}",
            lines.len(),
            SortKey::signature(&keys),
            start.elapsed()
        );

        if !persist {
            return Ok(IndexLines::Memory(lines.into_iter()));
        }

        write_gz_atomic(&output, Compression::default(), |out| {
            for line in &lines {
                writeln!(out, "{}", line)?;
            }
            Ok(())
        })?;
        IndexLines::open(&output)
    }
}

enum SortValue {
    Number(Option<f64>),
    Text(String),
}

impl SortValue {
    fn extract(line: &str, column: Column) -> Self {
        let field = line.split('\t').nth(column.position() - 1).unwrap_or("");
        if column.is_numeric() {
            SortValue::Number(field.trim().parse::<f64>().ok())
        } else {
            SortValue::Text(field.to_lowercase())
        }
    }

    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => match (a, b) {
                (Some(a), Some(b)) => a.total_cmp(b),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Stable multi-key sort; rows equal on every key keep their input order
pub fn sort_lines<I>(lines: I, keys: &[SortKey]) -> Result<Vec<String>>
where
    I: IntoIterator<Item = Result<String>>,
{
    let mut rows: Vec<(Vec<SortValue>, String)> = Vec::new();
    for line in lines {
        let line = line?;
        let values = keys
            .iter()
            .map(|k| SortValue::extract(&line, k.column))
            .collect();
        rows.push((values, line));
    }

    rows.sort_by(|(a, _), (b, _)| {
        keys.iter()
            .zip(a.iter().zip(b.iter()))
            .map(|(key, (x, y))| {
                let ord = x.compare(y);
                if key.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });

    Ok(rows.into_iter().map(|(_, line)| line).collect())
}
