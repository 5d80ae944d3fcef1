pub mod fasta;
pub mod sequence;

pub use fasta::FastaContigReader;
pub use sequence::{complement, reverse_complement, Location, Strand};
