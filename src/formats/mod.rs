//! VCF format layer
//!
//! Header model, record parsing, the streaming reader, compact genotype
//! decoding, per-variant statistics and record sinks.

pub mod genotype;
pub mod header;
pub mod reader;
pub mod record;
pub mod sink;
pub mod stats;

pub use genotype::{decode_genotype, Genotype, GenotypeToken};
pub use header::{DefinitionKind, HeaderDefinition, SampleIndex, VcfHeader, FIXED_COLUMNS};
pub use reader::{Dialect, ReadStats, ReaderConfig, VcfReader, DEFAULT_BATCH_SIZE};
pub use record::{AlleleIndex, ReadOutcome, RecordParseError, SampleCall, VcfRecord};
pub use sink::{TsvSink, VariantSink};
pub use stats::{aggregate_genotypes, GenotypeCounter, VariantStats};
