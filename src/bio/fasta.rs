use crate::{AssemblyError, Result};
use nom::{
    bytes::complete::{tag, take_till},
    IResult,
};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse the contig id out of a FASTA header line (without line ending)
fn parse_header_id(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (input, _) = tag(b">")(input)?;
    take_till(|c: u8| c.is_ascii_whitespace())(input)
}

/// Streaming reader yielding `(contig_id, sequence)` pairs.
///
/// A contig begins at each header line; sequence lines accumulate until the
/// next header or end of input. Whitespace is dropped and bases are
/// upper-cased. Only one contig is held in memory at a time.
pub struct FastaContigReader<R: BufRead> {
    reader: R,
    line: Vec<u8>,
    pending_id: Option<String>,
    line_number: usize,
    done: bool,
}

impl FastaContigReader<BufReader<File>> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> FastaContigReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            pending_id: None,
            line_number: 0,
            done: false,
        }
    }

    fn read_line(&mut self) -> Result<bool> {
        self.line.clear();
        let read = self.reader.read_until(b'\n', &mut self.line)?;
        if read > 0 {
            self.line_number += 1;
        }
        while matches!(self.line.last(), Some(b'\n') | Some(b'\r')) {
            self.line.pop();
        }
        Ok(read > 0)
    }

    fn header_id(&self) -> Result<String> {
        let (_, id) = parse_header_id(&self.line).map_err(|_| {
            AssemblyError::Parse(format!("Malformed FASTA header at line {}", self.line_number))
        })?;
        if id.is_empty() {
            return Err(AssemblyError::Parse(format!(
                "Empty contig id in FASTA header at line {}",
                self.line_number
            )));
        }
        Ok(String::from_utf8_lossy(id).into_owned())
    }

    fn next_contig(&mut self) -> Result<Option<(String, Vec<u8>)>> {
        // Find the first header
        while self.pending_id.is_none() {
            if !self.read_line()? {
                return Ok(None);
            }
            if self.line.first() == Some(&b'>') {
                self.pending_id = Some(self.header_id()?);
            } else if self.line.iter().any(|c| !c.is_ascii_whitespace()) {
                return Err(AssemblyError::Parse(format!(
                    "Sequence data before the first FASTA header at line {}",
                    self.line_number
                )));
            }
        }

        let mut sequence = Vec::new();
        loop {
            if !self.read_line()? {
                let id = self.pending_id.take();
                return Ok(id.map(|id| (id, sequence)));
            }
            if self.line.first() == Some(&b'>') {
                let next_id = self.header_id()?;
                let id = self.pending_id.replace(next_id);
                return Ok(id.map(|id| (id, sequence)));
            }
            sequence.extend(
                self.line
                    .iter()
                    .filter(|c| !c.is_ascii_whitespace())
                    .map(|c| c.to_ascii_uppercase()),
            );
        }
    }
}

impl<R: BufRead> Iterator for FastaContigReader<R> {
    type Item = Result<(String, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_contig() {
            Ok(Some(contig)) => Some(Ok(contig)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contigs(input: &[u8]) -> Result<Vec<(String, String)>> {
        FastaContigReader::new(input)
            .map(|r| r.map(|(id, seq)| (id, String::from_utf8(seq).unwrap())))
            .collect()
    }

    #[test]
    fn test_parse_header_id() {
        let (_, id) = parse_header_id(b">NZ_ALQT01000016 some description").unwrap();
        assert_eq!(id, b"NZ_ALQT01000016");
    }

    #[test]
    fn test_split_wrapped_contigs() {
        let fasta = b">ctg_1 first contig\nacgt\nACGT\n>ctg_2\r\nGGCC\r\n\n>ctg_3\n";
        assert_eq!(
            contigs(fasta).unwrap(),
            vec![
                ("ctg_1".to_string(), "ACGTACGT".to_string()),
                ("ctg_2".to_string(), "GGCC".to_string()),
                ("ctg_3".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_no_trailing_newline() {
        assert_eq!(
            contigs(b">a\nAC\nGT").unwrap(),
            vec![("a".to_string(), "ACGT".to_string())]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(contigs(b"").unwrap().is_empty());
        assert!(contigs(b"\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_sequence_before_header_is_rejected() {
        assert!(matches!(contigs(b"ACGT\n>a\nAC\n"), Err(AssemblyError::Parse(_))));
        assert!(matches!(contigs(b">\nAC\n"), Err(AssemblyError::Parse(_))));
    }
}
