/// Content-addressed contig index and paginated contig search
pub mod builder;
pub mod filter;
pub mod record;
pub mod sorted;

pub use builder::IndexBuilder;
pub use filter::{filter_page, tokenize, SearchResult};
pub use record::{Column, IndexRecord};
pub use sorted::{IndexLines, SortKey, SortedViewProvider};

use crate::core::config::IndexConfig;
use crate::remote::{AssemblyRef, ObjectAccessor};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Arguments of one contig search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub query: Option<String>,
    /// `(column, ascending)` pairs, most significant first
    #[serde(default)]
    pub sort_by: Vec<(String, bool)>,
    #[serde(default)]
    pub start: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
    /// Total match count from an earlier page of the same query
    #[serde(default)]
    pub num_found: Option<u64>,
}

impl SearchParams {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }
}

/// Index builder, sorted views and query filter wired together
pub struct ContigIndexer {
    builder: IndexBuilder,
    views: SortedViewProvider,
    default_limit: u64,
}

impl ContigIndexer {
    pub fn new(config: &IndexConfig) -> Self {
        Self {
            builder: IndexBuilder::new(&config.index_dir),
            views: SortedViewProvider::new(&config.index_dir, config.sort_persist_threshold),
            default_limit: config.default_limit as u64,
        }
    }

    pub fn builder(&self) -> &IndexBuilder {
        &self.builder
    }

    pub fn search_contigs(
        &self,
        accessor: &dyn ObjectAccessor,
        params: &SearchParams,
    ) -> Result<SearchResult> {
        let reference = AssemblyRef::new(params.reference.clone())?;
        let query = params.query.clone().unwrap_or_default();
        let start = params.start.unwrap_or(0);
        let limit = params.limit.unwrap_or(self.default_limit);

        tracing::debug!(
            "Search: assembly={}, query=[{}], sort-by=[{:?}], start={}, limit={}",
            reference,
            query,
            params.sort_by,
            start,
            limit
        );
        let timer = Instant::now();

        let checksum = self.builder.ensure_index(accessor, &reference)?;
        let lines = self.views.open_view(&checksum, &params.sort_by)?;
        let result = filter_page(lines, &query, start, limit, params.num_found)?;

        tracing::debug!(
            "Search for {} found {} contigs in {:?}",
            reference,
            result.num_found,
            timer.elapsed()
        );
        Ok(result)
    }
}
