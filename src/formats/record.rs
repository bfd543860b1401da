//! VCF data line parsing
//!
//! Splits one tab-separated data line into a [`VcfRecord`]. Lines with
//! exactly 8 columns are site-only records; lines with more columns carry
//! FORMAT and per-sample data aligned with the header's sample columns.

use crate::formats::header::SampleIndex;
use crate::formats::stats::VariantStats;
use memchr::memchr_iter;
use std::fmt;
use std::sync::Arc;

/// Number of mandatory columns (CHROM .. INFO)
pub const MANDATORY_FIELDS: usize = 8;

/// Outcome of parsing or reading a single line
#[derive(Debug)]
pub enum ReadOutcome {
    /// A parsed record
    Record(VcfRecord),
    /// The line had fewer than 8 columns and was dropped
    Skipped,
    /// No more input
    EndOfStream,
}

impl ReadOutcome {
    pub fn into_record(self) -> Option<VcfRecord> {
        match self {
            ReadOutcome::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// Why a data line could not become a record
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordParseError {
    #[error("Invalid POS '{0}': expected a positive integer")]
    InvalidPosition(String),
}

/// One VCF data line
#[derive(Debug, Clone)]
pub struct VcfRecord {
    pub chrom: String,
    /// Position (1-based)
    pub pos: u64,
    pub id: String,
    pub ref_allele: String,
    pub alt_alleles: Vec<String>,
    /// QUAL column as written ("." when missing)
    pub qual: String,
    pub filter: String,
    pub info: String,
    pub format: Option<String>,
    /// Per-sample data, aligned with the header's sample columns
    pub samples: Vec<String>,
    /// Statistics attached by dialect-aware readers
    pub stats: Option<VariantStats>,
    sample_index: Arc<SampleIndex>,
}

impl VcfRecord {
    /// Parse a data line
    ///
    /// Returns `Ok(None)` for lines with fewer than 8 columns.
    pub fn parse(
        line: &str,
        sample_index: &Arc<SampleIndex>,
    ) -> Result<Option<Self>, RecordParseError> {
        let fields = split_tabs(line);
        if fields.len() < MANDATORY_FIELDS {
            return Ok(None);
        }

        let pos = fields[1]
            .parse::<u64>()
            .ok()
            .filter(|&p| p >= 1)
            .ok_or_else(|| RecordParseError::InvalidPosition(fields[1].to_string()))?;

        let (format, samples) = if fields.len() > MANDATORY_FIELDS {
            (
                Some(fields[8].to_string()),
                fields[9..].iter().map(|s| s.to_string()).collect(),
            )
        } else {
            (None, Vec::new())
        };

        Ok(Some(Self {
            chrom: fields[0].to_string(),
            pos,
            id: fields[2].to_string(),
            ref_allele: fields[3].to_string(),
            alt_alleles: fields[4].split(',').map(str::to_string).collect(),
            qual: fields[5].to_string(),
            filter: fields[6].to_string(),
            info: fields[7].to_string(),
            format,
            samples,
            stats: None,
            sample_index: Arc::clone(sample_index),
        }))
    }

    /// ALT column as written (comma-joined)
    pub fn alternate(&self) -> String {
        self.alt_alleles.join(",")
    }

    /// QUAL as a number; None for "." or unparsable values
    pub fn quality_value(&self) -> Option<f64> {
        if self.qual == "." {
            return None;
        }
        self.qual.parse().ok()
    }

    /// Look up an INFO attribute
    ///
    /// Splits INFO on every call (O(number of INFO entries)); nothing is cached.
    /// Flags yield `Some("")`.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        if self.info == "." {
            return None;
        }
        self.info.split(';').find_map(|entry| match entry.split_once('=') {
            Some((k, v)) if k == key => Some(v),
            None if entry == key => Some(""),
            _ => None,
        })
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attribute(key).is_some()
    }

    /// Shared sample index from the originating header
    pub fn sample_index(&self) -> &SampleIndex {
        &self.sample_index
    }

    /// Raw data string of a sample
    pub fn sample(&self, name: &str) -> Option<&str> {
        self.sample_index
            .get(name)
            .and_then(|i| self.samples.get(i))
            .map(String::as_str)
    }

    /// One FORMAT subfield (e.g. "GT", "DP") of a sample
    pub fn sample_field(&self, name: &str, key: &str) -> Option<&str> {
        let position = self.format.as_deref()?.split(':').position(|k| k == key)?;
        self.sample(name)?.split(':').nth(position)
    }

    /// Genotype call of a sample, from its GT subfield
    pub fn sample_call(&self, name: &str) -> Option<SampleCall> {
        let gt = self.sample_field(name, "GT")?;
        let (allele1, allele2) = parse_gt(gt);
        Some(SampleCall {
            sample_name: name.to_string(),
            allele1,
            allele2,
        })
    }

    /// Calls for every sample in column order; samples without GT get unknown alleles
    pub fn sample_calls(&self) -> Vec<SampleCall> {
        self.sample_index
            .iter()
            .filter(|(_, i)| *i < self.samples.len())
            .map(|(name, _)| {
                self.sample_call(name).unwrap_or_else(|| SampleCall {
                    sample_name: name.to_string(),
                    allele1: AlleleIndex::Unknown,
                    allele2: AlleleIndex::Unknown,
                })
            })
            .collect()
    }

    /// Whether REF and every ALT are single bases
    pub fn is_snv(&self) -> bool {
        self.ref_allele.len() == 1
            && self
                .alt_alleles
                .iter()
                .all(|alt| alt.len() == 1 && alt != ".")
    }

    /// Render the record back to a tab-separated line (no newline)
    pub fn to_line(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for VcfRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.pos,
            self.id,
            self.ref_allele,
            self.alt_alleles.join(","),
            self.qual,
            self.filter,
            self.info
        )?;
        if let Some(format) = &self.format {
            write!(f, "\t{}", format)?;
            for sample in &self.samples {
                write!(f, "\t{}", sample)?;
            }
        }
        Ok(())
    }
}

/// Split a line on tabs using memchr
fn split_tabs(line: &str) -> Vec<&str> {
    let mut fields = Vec::with_capacity(16);
    let mut start = 0;
    for tab in memchr_iter(b'\t', line.as_bytes()) {
        fields.push(&line[start..tab]);
        start = tab + 1;
    }
    fields.push(&line[start..]);
    fields
}

/// Allele index of a called genotype; `Unknown` stands for "." and is distinct from 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlleleIndex {
    Called(u32),
    Unknown,
}

impl AlleleIndex {
    /// Integer form used by tabular sinks (-1 for unknown)
    pub fn as_i64(&self) -> i64 {
        match self {
            AlleleIndex::Called(i) => i64::from(*i),
            AlleleIndex::Unknown => -1,
        }
    }
}

impl fmt::Display for AlleleIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

/// (sample, allele1, allele2) triple exposed to downstream sinks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCall {
    pub sample_name: String,
    pub allele1: AlleleIndex,
    pub allele2: AlleleIndex,
}

/// Parse a GT value ("0/1", "1|0", "./.", "1") into two allele indices
fn parse_gt(gt: &str) -> (AlleleIndex, AlleleIndex) {
    let parse_allele = |s: &str| match s.parse::<u32>() {
        Ok(i) => AlleleIndex::Called(i),
        Err(_) => AlleleIndex::Unknown,
    };

    let mut alleles = gt.split(['/', '|']);
    let allele1 = alleles.next().map(parse_allele).unwrap_or(AlleleIndex::Unknown);
    // Haploid calls have a single allele
    let allele2 = alleles.next().map(parse_allele).unwrap_or(AlleleIndex::Unknown);
    (allele1, allele2)
}
