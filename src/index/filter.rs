//! Substring query filter and pagination over index lines

use crate::index::record::IndexRecord;
use crate::Result;
use serde::{Deserialize, Serialize};

/// One page of matching contigs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub num_found: u64,
    pub start: u64,
    pub contigs: Vec<IndexRecord>,
    pub query: String,
}

/// Lower-cased query words; commas, tabs and line breaks separate words too
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .replace(['\r', '\n', '\t', ','], " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// True when every token occurs in the lower-cased line
pub fn matches(line: &str, tokens: &[String]) -> bool {
    if tokens.is_empty() {
        return true;
    }
    let line = line.to_lowercase();
    tokens.iter().all(|token| line.contains(token.as_str()))
}

/// Scan `lines` in order and keep the matches whose rank falls in
/// `[start, start + limit)`.
///
/// With `known_count` the scan stops as soon as the window is filled and
/// reports `known_count` as the total. The caller vouches for that number.
pub fn filter_page<I>(
    lines: I,
    query: &str,
    start: u64,
    limit: u64,
    known_count: Option<u64>,
) -> Result<SearchResult>
where
    I: IntoIterator<Item = Result<String>>,
{
    let tokens = tokenize(query);
    let end = start.saturating_add(limit);
    let mut found: u64 = 0;
    let mut contigs = Vec::new();

    for line in lines {
        let line = line?;
        if !matches(&line, &tokens) {
            continue;
        }
        if found >= start && found < end {
            contigs.push(IndexRecord::from_line(&line)?);
        }
        found += 1;
        if let Some(known) = known_count {
            if found >= end {
                found = known;
                break;
            }
        }
    }

    Ok(SearchResult {
        num_found: found,
        start,
        contigs,
        query: query.to_string(),
    })
}
