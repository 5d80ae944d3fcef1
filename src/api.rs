//! Request-level entry points over the index, the sequence cache and the
//! object store.
//!
//! Search and extraction go through the caches. The metadata queries read
//! straight from the object store on every call.

use crate::bio::sequence::Location;
use crate::core::config::Config;
use crate::index::{ContigIndexer, SearchParams, SearchResult};
use crate::remote::{
    AssemblyContigData, AssemblyContigs, AssemblyRef, AssemblyStats, ExternalSourceInfo,
    ObjectAccessor, WorkspaceClient,
};
use crate::storage::{SequenceCache, SubsequenceExtractor};
use crate::Result;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;

const GENOME_TYPES: [&str; 2] = ["KBaseGenomes.Genome", "KBaseGenomeAnnotations.GenomeAnnotation"];

#[derive(Deserialize)]
struct NumContigs {
    num_contigs: Option<u64>,
}

#[derive(Deserialize)]
struct GcContent {
    gc_content: Option<f64>,
}

#[derive(Deserialize)]
struct DnaSize {
    dna_size: Option<u64>,
}

pub struct AssemblyApi {
    accessor: Arc<dyn ObjectAccessor>,
    indexer: ContigIndexer,
    extractor: SubsequenceExtractor,
}

impl AssemblyApi {
    pub fn new(config: &Config, accessor: Arc<dyn ObjectAccessor>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            accessor,
            indexer: ContigIndexer::new(&config.index),
            extractor: SubsequenceExtractor::new(SequenceCache::new(&config.sequence_cache)?),
        })
    }

    /// API backed by the HTTP object store and blob store named in `config`
    pub fn connect(config: &Config, token: Option<String>) -> Result<Self> {
        let client = WorkspaceClient::new(&config.remote, token)?;
        Self::new(config, Arc::new(client))
    }

    pub fn indexer(&self) -> &ContigIndexer {
        &self.indexer
    }

    pub fn sequence_cache(&self) -> &SequenceCache {
        self.extractor.cache()
    }

    pub fn search_contigs(&self, params: &SearchParams) -> Result<SearchResult> {
        self.indexer.search_contigs(self.accessor.as_ref(), params)
    }

    /// One sequence per location
    pub fn extract_sequences(&self, reference: &str, locations: &[Location]) -> Result<Vec<String>> {
        let reference = AssemblyRef::new(reference)?;
        self.extractor
            .extract(self.accessor.as_ref(), &reference, locations)
    }

    /// One sequence per multi-part feature
    pub fn extract_features(
        &self,
        reference: &str,
        features: &[Vec<Location>],
    ) -> Result<Vec<String>> {
        let reference = AssemblyRef::new(reference)?;
        self.extractor
            .extract_features(self.accessor.as_ref(), &reference, features)
    }

    /// Object name of the assembly
    pub fn get_assembly_id(&self, reference: &str) -> Result<String> {
        let reference = AssemblyRef::new(reference)?;
        Ok(self.accessor.get_object_info(&reference)?.name)
    }

    /// `wsid/objid/version` of every genome that references this assembly
    pub fn get_genome_annotations(&self, reference: &str) -> Result<Vec<String>> {
        let reference = AssemblyRef::new(reference)?;
        Ok(self
            .accessor
            .list_referencing_objects(&reference)?
            .into_iter()
            .filter(|info| {
                let base = info.type_name.split('-').next().unwrap_or_default();
                GENOME_TYPES.contains(&base)
            })
            .map(|info| info.reference())
            .collect())
    }

    pub fn get_external_source_info(&self, reference: &str) -> Result<ExternalSourceInfo> {
        self.fields(
            reference,
            &[
                "external_source",
                "external_source_id",
                "external_source_origination_date",
            ],
        )
    }

    pub fn get_stats(&self, reference: &str) -> Result<AssemblyStats> {
        self.fields(reference, &["num_contigs", "gc_content", "dna_size"])
    }

    pub fn get_number_contigs(&self, reference: &str) -> Result<Option<u64>> {
        Ok(self.fields::<NumContigs>(reference, &["num_contigs"])?.num_contigs)
    }

    pub fn get_gc_content(&self, reference: &str) -> Result<Option<f64>> {
        Ok(self.fields::<GcContent>(reference, &["gc_content"])?.gc_content)
    }

    pub fn get_dna_size(&self, reference: &str) -> Result<Option<u64>> {
        Ok(self.fields::<DnaSize>(reference, &["dna_size"])?.dna_size)
    }

    /// Contig ids in store order
    pub fn get_contig_ids(&self, reference: &str) -> Result<Vec<String>> {
        let contigs: AssemblyContigs = self.fields(reference, &["contigs/*/contig_id"])?;
        Ok(contigs.contigs.into_keys().collect())
    }

    pub fn get_contig_lengths(
        &self,
        reference: &str,
        contig_ids: &[String],
    ) -> Result<IndexMap<String, Option<u64>>> {
        Ok(self
            .get_contig_fields(reference, contig_ids, Some("length"))?
            .into_iter()
            .map(|(id, data)| (id, data.length))
            .collect())
    }

    pub fn get_contig_gc_content(
        &self,
        reference: &str,
        contig_ids: &[String],
    ) -> Result<IndexMap<String, Option<f64>>> {
        Ok(self
            .get_contig_fields(reference, contig_ids, Some("gc_content"))?
            .into_iter()
            .map(|(id, data)| (id, data.gc_content))
            .collect())
    }

    /// Full contig records for the given ids
    pub fn get_contigs(
        &self,
        reference: &str,
        contig_ids: &[String],
    ) -> Result<IndexMap<String, AssemblyContigData>> {
        self.get_contig_fields(reference, contig_ids, None)
    }

    fn get_contig_fields(
        &self,
        reference: &str,
        contig_ids: &[String],
        field: Option<&str>,
    ) -> Result<IndexMap<String, AssemblyContigData>> {
        let included: Vec<String> = contig_ids
            .iter()
            .map(|id| match field {
                Some(field) => format!("contigs/{}/{}", id, field),
                None => format!("contigs/{}", id),
            })
            .collect();
        let included: Vec<&str> = included.iter().map(String::as_str).collect();
        let contigs: AssemblyContigs = self.fields(reference, &included)?;
        Ok(contigs.contigs)
    }

    fn fields<T: DeserializeOwned>(&self, reference: &str, included: &[&str]) -> Result<T> {
        let reference = AssemblyRef::new(reference)?;
        let included: Vec<String> = included.iter().map(|s| s.to_string()).collect();
        let data = self.accessor.get_fields(&reference, &included)?;
        Ok(serde_json::from_value(data)?)
    }
}
