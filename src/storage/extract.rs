//! Strand-aware subsequence reads from cached contig files

use crate::bio::sequence::{reverse_complement, Location, Strand};
use crate::remote::{AssemblyRef, ObjectAccessor};
use crate::storage::sequence_cache::SequenceCache;
use crate::{AssemblyError, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

pub struct SubsequenceExtractor {
    cache: SequenceCache,
}

impl SubsequenceExtractor {
    pub fn new(cache: SequenceCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &SequenceCache {
        &self.cache
    }

    /// One sequence per location, in input order. Any invalid location
    /// fails the whole request.
    pub fn extract(
        &self,
        accessor: &dyn ObjectAccessor,
        reference: &AssemblyRef,
        locations: &[Location],
    ) -> Result<Vec<String>> {
        let entry = self.cache.pin(accessor, reference)?;
        let mut cursor = ContigCursor::new(entry.path());
        locations
            .iter()
            .map(|loc| cursor.read_oriented(loc).and_then(into_string))
            .collect()
    }

    /// One sequence per feature: the concatenation of its parts in order
    pub fn extract_features(
        &self,
        accessor: &dyn ObjectAccessor,
        reference: &AssemblyRef,
        features: &[Vec<Location>],
    ) -> Result<Vec<String>> {
        let entry = self.cache.pin(accessor, reference)?;
        let mut cursor = ContigCursor::new(entry.path());
        features
            .iter()
            .map(|parts| {
                let mut joined = Vec::new();
                for loc in parts {
                    joined.extend(cursor.read_oriented(loc)?);
                }
                into_string(joined)
            })
            .collect()
    }
}

fn into_string(bases: Vec<u8>) -> Result<String> {
    String::from_utf8(bases)
        .map_err(|e| AssemblyError::Parse(format!("cached sequence is not text: {}", e)))
}

fn invalid(loc: &Location) -> AssemblyError {
    AssemblyError::InvalidLocation(format!("{} is not a valid location on this assembly", loc))
}

struct OpenContig {
    contig_id: String,
    reader: GzDecoder<BufReader<File>>,
    position: u64,
}

/// Keeps the last contig open so consecutive reads on it skip forward
/// instead of decompressing from the start.
struct ContigCursor<'a> {
    entry: &'a Path,
    open: Option<OpenContig>,
}

impl<'a> ContigCursor<'a> {
    fn new(entry: &'a Path) -> Self {
        Self { entry, open: None }
    }

    fn open_contig(&self, contig_id: &str) -> Result<OpenContig> {
        let path = SequenceCache::contig_path(self.entry, contig_id);
        let file = File::open(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => AssemblyError::NotFound(format!(
                "{} was not found in the cached assembly",
                contig_id
            )),
            _ => AssemblyError::Io(e),
        })?;
        Ok(OpenContig {
            contig_id: contig_id.to_string(),
            reader: GzDecoder::new(BufReader::new(file)),
            position: 0,
        })
    }

    /// Exactly `loc.length` upper-case bases from the forward strand
    fn read(&mut self, loc: &Location) -> Result<Vec<u8>> {
        let offset = loc.file_offset().ok_or_else(|| invalid(loc))?;

        let mut open = match self.open.take() {
            Some(open) if open.contig_id == loc.contig_id && open.position <= offset => open,
            _ => self.open_contig(&loc.contig_id)?,
        };

        let skip = offset - open.position;
        let skipped = io::copy(&mut (&mut open.reader).take(skip), &mut io::sink())?;
        open.position += skipped;
        if skipped < skip {
            return Err(invalid(loc));
        }

        let mut bases = Vec::new();
        let read = (&mut open.reader).take(loc.length).read_to_end(&mut bases)? as u64;
        open.position += read;
        self.open = Some(open);
        if read < loc.length {
            return Err(invalid(loc));
        }

        bases.make_ascii_uppercase();
        Ok(bases)
    }

    fn read_oriented(&mut self, loc: &Location) -> Result<Vec<u8>> {
        let bases = self.read(loc)?;
        Ok(match loc.strand {
            Strand::Forward => bases,
            Strand::Reverse => reverse_complement(&bases),
        })
    }
}
