//! vcf4-reader - streaming VCF v4 reader
//!
//! Parses VCF headers into typed definition tables, streams variant records
//! one at a time or in filtered batches, and decodes the compact genotype
//! notation used by EVS-style annotation files into per-variant statistics.
//!
//! # Features
//!
//! - Plain and gzip/BGZF input, detected by suffix or magic bytes
//! - Header round-trip rendering for pass-through pipelines
//! - Tri-state single-record reads (record / skipped / end of stream)
//! - AND-combined record predicates for batch reads
//!
//! # Example
//!
//! ```ignore
//! use vcf4_reader::{filters, ReaderConfig, VcfReader};
//!
//! let mut reader = VcfReader::open("calls.vcf.gz", ReaderConfig::default())?
//!     .with_filter(filters::pass_only());
//!
//! loop {
//!     let batch = reader.read_batch(1000)?;
//!     if batch.is_empty() {
//!         break;
//!     }
//!     for record in &batch {
//!         println!("{}:{}", record.chrom, record.pos);
//!     }
//! }
//! reader.close();
//! ```

pub mod core;
pub mod formats;

// Re-export commonly used types
pub use self::core::{filters, FilterChain, RecordPredicate, Result, VcfError};
pub use formats::{
    AlleleIndex, Dialect, Genotype, GenotypeToken, ReadOutcome, ReaderConfig, SampleCall,
    SampleIndex, TsvSink, VariantSink, VariantStats, VcfHeader, VcfReader, VcfRecord,
};
