use crate::{AssemblyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strand {
    #[serde(rename = "+")]
    Forward,
    #[serde(rename = "-")]
    Reverse,
}

impl FromStr for Strand {
    type Err = AssemblyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            other => Err(AssemblyError::InvalidInput(format!(
                "Unknown strand '{}', expected '+' or '-'",
                other
            ))),
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => f.write_str("+"),
            Strand::Reverse => f.write_str("-"),
        }
    }
}

/// A subsequence request: `(contig_id, start, strand, length)`.
///
/// `start` is the 0-based forward-strand coordinate of the feature's 5' end.
/// On the reverse strand that is the rightmost base, so the first byte read
/// from the contig is `start - (length - 1)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(String, u64, String, u64)")]
pub struct Location {
    pub contig_id: String,
    pub start: u64,
    pub strand: Strand,
    pub length: u64,
}

impl Location {
    pub fn new(contig_id: impl Into<String>, start: u64, strand: Strand, length: u64) -> Self {
        Self {
            contig_id: contig_id.into(),
            start,
            strand,
            length,
        }
    }

    /// Offset of the first base to read, or `None` when a reverse-strand
    /// feature would begin before the start of the contig
    pub fn file_offset(&self) -> Option<u64> {
        match self.strand {
            Strand::Forward => Some(self.start),
            Strand::Reverse => self.start.checked_add(1)?.checked_sub(self.length),
        }
    }
}

impl TryFrom<(String, u64, String, u64)> for Location {
    type Error = AssemblyError;

    fn try_from((contig_id, start, strand, length): (String, u64, String, u64)) -> Result<Self> {
        Ok(Self::new(contig_id, start, strand.parse()?, length))
    }
}

/// Parses `contig:start:strand:length`; the contig id may itself contain `:`
impl FromStr for Location {
    type Err = AssemblyError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.rsplitn(4, ':').collect();
        if parts.len() != 4 || parts[3].is_empty() {
            return Err(AssemblyError::InvalidInput(format!(
                "Location '{}' must look like contig:start:strand:length",
                s
            )));
        }
        let number = |text: &str, what: &str| {
            text.parse::<u64>().map_err(|_| {
                AssemblyError::InvalidInput(format!("Invalid {} '{}' in location '{}'", what, text, s))
            })
        };
        Ok(Self::new(
            parts[3],
            number(parts[2], "start")?,
            parts[1].parse()?,
            number(parts[0], "length")?,
        ))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "location(contig='{}', start={}, strand='{}', length={})",
            self.contig_id, self.start, self.strand, self.length
        )
    }
}

/// Complement of one base. Only G, C, A and T are mapped; anything else,
/// including `N` and IUPAC ambiguity codes, comes back unchanged.
pub fn complement(base: u8) -> u8 {
    match base {
        b'G' => b'C',
        b'C' => b'G',
        b'A' => b'T',
        b'T' => b'A',
        other => other,
    }
}

/// Reverse complement of an upper-case sequence.
///
/// Unmapped bytes keep their value and are only moved by the reversal, so
/// `reverse_complement(reverse_complement(s)) == s` holds for every input.
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence.iter().rev().map(|&b| complement(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement(b"GATTACA"), b"TGTAATC".to_vec());
        assert_eq!(reverse_complement(b""), Vec::<u8>::new());
        // N is not complemented but still reversed
        assert_eq!(reverse_complement(b"ANGC"), b"GCNT".to_vec());
    }

    #[test]
    fn test_file_offset() {
        assert_eq!(Location::new("c", 10, Strand::Forward, 5).file_offset(), Some(10));
        assert_eq!(Location::new("c", 10, Strand::Reverse, 5).file_offset(), Some(6));
        assert_eq!(Location::new("c", 4, Strand::Reverse, 5).file_offset(), Some(0));
        assert_eq!(Location::new("c", 3, Strand::Reverse, 5).file_offset(), None);
    }

    #[test]
    fn test_location_from_str() {
        let loc: Location = "NZ_ALQT01000016:100:-:20".parse().unwrap();
        assert_eq!(loc, Location::new("NZ_ALQT01000016", 100, Strand::Reverse, 20));

        let loc: Location = "chr:1:7:+:3".parse().unwrap();
        assert_eq!(loc.contig_id, "chr:1");

        assert!("ctg:1:x:3".parse::<Location>().is_err());
        assert!("ctg:1:+".parse::<Location>().is_err());
    }

    #[test]
    fn test_location_from_json_tuple() {
        let loc: Location = serde_json::from_str(r#"["ctg_1", 5, "+", 10]"#).unwrap();
        assert_eq!(loc, Location::new("ctg_1", 5, Strand::Forward, 10));
        assert!(serde_json::from_str::<Location>(r#"["ctg_1", 5, "?", 10]"#).is_err());
    }

    proptest! {
        #[test]
        fn prop_reverse_complement_roundtrip(seq in "[GCAT]{0,200}") {
            let bytes = seq.as_bytes();
            prop_assert_eq!(reverse_complement(&reverse_complement(bytes)), bytes.to_vec());
        }
    }
}
