//! One contig's index row and its tab-separated line form

use crate::{AssemblyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Columns of the flat index, in file order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    ContigId,
    Description,
    Length,
    Gc,
    IsCirc,
    NCount,
    Md5,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::ContigId,
        Column::Description,
        Column::Length,
        Column::Gc,
        Column::IsCirc,
        Column::NCount,
        Column::Md5,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::ContigId => "contig_id",
            Column::Description => "description",
            Column::Length => "length",
            Column::Gc => "gc",
            Column::IsCirc => "is_circ",
            Column::NCount => "N_count",
            Column::Md5 => "md5",
        }
    }

    /// 1-based field position in a line
    pub fn position(&self) -> usize {
        match self {
            Column::ContigId => 1,
            Column::Description => 2,
            Column::Length => 3,
            Column::Gc => 4,
            Column::IsCirc => 5,
            Column::NCount => 6,
            Column::Md5 => 7,
        }
    }

    /// Numeric columns sort by value, the rest case-insensitively by text
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Column::Length | Column::Gc | Column::IsCirc | Column::NCount
        )
    }

    /// Accepts the wire names plus the record field names as aliases
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "contig_id" => Ok(Column::ContigId),
            "description" => Ok(Column::Description),
            "length" => Ok(Column::Length),
            "gc" | "gc_content" => Ok(Column::Gc),
            "is_circ" | "is_circular" => Ok(Column::IsCirc),
            "N_count" | "n_count" => Ok(Column::NCount),
            "md5" => Ok(Column::Md5),
            other => Err(AssemblyError::UnknownColumn {
                column: other.to_string(),
                known: Column::ALL.iter().map(|c| c.name().to_string()).collect(),
            }),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One index row. Absent values stay `None`, distinct from zero or false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub contig_id: String,
    pub description: String,
    pub length: Option<u64>,
    #[serde(rename = "gc")]
    pub gc_content: Option<f64>,
    #[serde(rename = "is_circ")]
    pub is_circular: Option<bool>,
    #[serde(rename = "N_count")]
    pub n_count: Option<u64>,
    pub md5: String,
}

impl IndexRecord {
    pub fn new(contig_id: impl Into<String>) -> Self {
        Self {
            contig_id: contig_id.into(),
            description: String::new(),
            length: None,
            gc_content: None,
            is_circular: None,
            n_count: None,
            md5: String::new(),
        }
    }

    /// Serialize to one tab-separated line (no line ending).
    /// Tabs and line breaks inside text fields become spaces.
    pub fn to_line(&self) -> String {
        fn optional<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(|v| v.to_string()).unwrap_or_default()
        }

        let fields = [
            sanitize(&self.contig_id),
            sanitize(&self.description),
            optional(&self.length),
            optional(&self.gc_content),
            self.is_circular
                .map(|c| if c { "1" } else { "0" }.to_string())
                .unwrap_or_default(),
            optional(&self.n_count),
            sanitize(&self.md5),
        ];
        fields.join("\t")
    }

    /// Decode a line written by [`IndexRecord::to_line`]
    pub fn from_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\n', '\r']);
        let items: Vec<&str> = line.split('\t').collect();
        if items.len() != Column::ALL.len() {
            return Err(corrupt(
                line,
                format!("expected {} fields, found {}", Column::ALL.len(), items.len()),
            ));
        }

        Ok(Self {
            contig_id: items[0].to_string(),
            description: items[1].to_string(),
            length: parse_optional(line, Column::Length, items[2])?,
            gc_content: parse_optional(line, Column::Gc, items[3])?,
            is_circular: match items[4] {
                "" => None,
                "1" | "true" => Some(true),
                "0" | "false" => Some(false),
                other => {
                    return Err(corrupt(line, format!("invalid is_circ value '{}'", other)));
                }
            },
            n_count: parse_optional(line, Column::NCount, items[5])?,
            md5: items[6].to_string(),
        })
    }
}

fn sanitize(text: &str) -> String {
    text.replace(['\t', '\r', '\n'], " ")
}

fn parse_optional<T: std::str::FromStr>(line: &str, column: Column, raw: &str) -> Result<Option<T>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|_| corrupt(line, format!("invalid {} value '{}'", column, raw)))
}

fn corrupt(line: &str, reason: String) -> AssemblyError {
    AssemblyError::CorruptIndex {
        line: line.to_string(),
        reason,
    }
}
