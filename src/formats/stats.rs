//! Per-variant statistics for the EVS dialect
//!
//! EVS-style VCFs carry pre-computed population data in INFO:
//!
//! - `MAF=ea,aa,all` minor allele frequencies in percent
//! - `GTS=A1A1,A1R,RR` compact genotype tokens
//! - `GTC=3,10,200` occurrence counts, parallel to `GTS`

use crate::formats::genotype::{decode_genotype, Genotype};
use crate::formats::record::VcfRecord;
use indexmap::IndexMap;
use log::{debug, warn};

/// Statistics attached to one variant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariantStats {
    pub chrom: String,
    pub pos: u64,
    pub ref_allele: String,
    pub alt_alleles: Vec<String>,
    /// Frequency from the annotation (fraction, not percent)
    pub maf: Option<f64>,
    pub maf_allele: String,
    pub missing_alleles: u32,
    pub missing_genotypes: u32,
    /// Decoded genotypes, one per distinct genotype
    pub genotypes: Vec<Genotype>,
}

impl VariantStats {
    /// Derive statistics from a record's MAF/GTS/GTC attributes
    pub fn from_record(record: &VcfRecord) -> Self {
        let mut stats = VariantStats {
            chrom: record.chrom.clone(),
            pos: record.pos,
            ref_allele: record.ref_allele.clone(),
            alt_alleles: record.alt_alleles.clone(),
            ..Default::default()
        };

        if let Some(maf) = record.attribute("MAF") {
            stats.maf = parse_maf(maf);
        }

        if let (Some(gts), Some(gtc)) = (record.attribute("GTS"), record.attribute("GTC")) {
            match aggregate_genotypes(gts, gtc, &record.ref_allele, &record.alt_alleles) {
                Some(genotypes) => stats.genotypes = genotypes,
                None => warn!(
                    "{}:{}: GTS and GTC have different lengths, genotypes skipped",
                    record.chrom, record.pos
                ),
            }
        }

        stats
    }

    /// Sum of all genotype counts
    pub fn total_genotype_count(&self) -> u64 {
        self.genotypes
            .iter()
            .fold(0u64, |total, g| total.saturating_add(g.count))
    }

    /// Look up a decoded genotype by notation (either allele order)
    pub fn genotype(&self, notation: &str) -> Option<&Genotype> {
        let probe = self.genotypes.first().map(|g| {
            Genotype::new(notation, &g.ref_allele, &g.alternate).normalized_key()
        })?;
        self.genotypes.iter().find(|g| g.normalized_key() == probe)
    }
}

/// Third comma-separated MAF value, converted from percent
fn parse_maf(value: &str) -> Option<f64> {
    let parts: Vec<&str> = value.split(',').collect();
    if parts.len() != 3 {
        return None;
    }
    match parts[2].trim().parse::<f64>() {
        Ok(percent) => Some(percent / 100.0),
        Err(_) => {
            debug!("unparsable MAF value '{}'", value);
            None
        }
    }
}

/// Merges genotypes that resolve to the same allele pair
#[derive(Debug, Default)]
pub struct GenotypeCounter {
    genotypes: IndexMap<String, Genotype>,
}

impl GenotypeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a genotype; counts of an already-seen allele pair are summed
    pub fn add(&mut self, genotype: Genotype) {
        let key = genotype.normalized_key();
        match self.genotypes.get_mut(&key) {
            Some(existing) => existing.count = existing.count.saturating_add(genotype.count),
            None => {
                self.genotypes.insert(key, genotype);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.genotypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genotypes.is_empty()
    }

    /// Genotypes in first-seen order
    pub fn into_genotypes(self) -> Vec<Genotype> {
        self.genotypes.into_values().collect()
    }
}

/// Decode parallel GTS/GTC lists
///
/// Returns None when the lists differ in length. Tokens that do not decode,
/// or whose count is not an integer, are skipped individually.
pub fn aggregate_genotypes(
    gts: &str,
    gtc: &str,
    ref_allele: &str,
    alt_alleles: &[String],
) -> Option<Vec<Genotype>> {
    let tokens: Vec<&str> = gts.split(',').collect();
    let counts: Vec<&str> = gtc.split(',').collect();
    if tokens.len() != counts.len() {
        return None;
    }

    let mut counter = GenotypeCounter::new();
    for (token, count) in tokens.iter().zip(&counts) {
        let count = match count.trim().parse::<u64>() {
            Ok(c) => c,
            Err(_) => {
                debug!("skipping genotype '{}' with count '{}'", token, count);
                continue;
            }
        };
        match decode_genotype(token.trim(), ref_allele, alt_alleles) {
            Some(mut genotype) => {
                genotype.count = count;
                counter.add(genotype);
            }
            None => debug!("skipping unrecognized genotype token '{}'", token),
        }
    }
    Some(counter.into_genotypes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::header::SampleIndex;
    use std::sync::Arc;

    fn record(info: &str) -> VcfRecord {
        let line = format!("17\t41244000\trs799917\tT\tC,G\t.\tPASS\t{}", info);
        VcfRecord::parse(&line, &Arc::new(SampleIndex::default()))
            .unwrap()
            .unwrap()
    }

    fn alts() -> Vec<String> {
        vec!["C".to_string(), "G".to_string()]
    }

    #[test]
    fn test_stats_from_evs_record() {
        let stats = VariantStats::from_record(&record(
            "MAF=44.2,38.5,42.1;GTS=A1A1,A1R,RR;GTC=1500,3000,2000",
        ));

        assert_eq!(stats.chrom, "17");
        assert_eq!(stats.pos, 41244000);
        assert_eq!(stats.ref_allele, "T");
        assert_eq!(stats.alt_alleles, alts());
        assert!((stats.maf.unwrap() - 0.421).abs() < 1e-9);
        assert_eq!(stats.genotypes.len(), 3);
        assert_eq!(stats.genotypes[0].notation, "C/C");
        assert_eq!(stats.genotypes[0].count, 1500);
        assert_eq!(stats.genotypes[1].notation, "C/T");
        assert_eq!(stats.genotypes[2].notation, "T/T");
        assert_eq!(stats.total_genotype_count(), 6500);
        assert_eq!(stats.missing_alleles, 0);
        assert_eq!(stats.missing_genotypes, 0);
    }

    #[test]
    fn test_maf_requires_three_values() {
        assert_eq!(VariantStats::from_record(&record("MAF=1.0,2.0")).maf, None);
        assert_eq!(VariantStats::from_record(&record("MAF=1.0,2.0,x")).maf, None);
        assert_eq!(VariantStats::from_record(&record("DP=3")).maf, None);
    }

    #[test]
    fn test_misaligned_lists_skip_genotypes() {
        let stats = VariantStats::from_record(&record("GTS=A1A1,A1R,RR;GTC=1,2"));
        assert!(stats.genotypes.is_empty());
        assert_eq!(aggregate_genotypes("R,A1", "1", "T", &alts()), None);
    }

    #[test]
    fn test_missing_gtc_skips_genotypes() {
        let stats = VariantStats::from_record(&record("GTS=A1A1,A1R,RR"));
        assert!(stats.genotypes.is_empty());
    }

    #[test]
    fn test_unrecognized_token_is_skipped() {
        let genotypes = aggregate_genotypes("A1,N,RR", "5,7,9", "T", &alts()).unwrap();
        assert_eq!(genotypes.len(), 2);
        assert_eq!(genotypes[0].notation, "C/C");
        assert_eq!(genotypes[1].notation, "T/T");
        assert_eq!(genotypes[1].count, 9);
    }

    #[test]
    fn test_bad_count_is_skipped() {
        let genotypes = aggregate_genotypes("A1,RR", "x,9", "T", &alts()).unwrap();
        assert_eq!(genotypes.len(), 1);
        assert_eq!(genotypes[0].notation, "T/T");
    }

    #[test]
    fn test_same_notation_counts_merge() {
        // "R" and "RR" both mean T/T
        let genotypes = aggregate_genotypes("R,RR,A1", "4,6,1", "T", &alts()).unwrap();
        assert_eq!(genotypes.len(), 2);
        assert_eq!(genotypes[0].notation, "T/T");
        assert_eq!(genotypes[0].count, 10);
    }

    #[test]
    fn test_allele_order_counts_merge() {
        // A1R -> C/T and TC -> T/C are the same genotype
        let genotypes = aggregate_genotypes("A1R,TC", "3,4", "T", &alts()).unwrap();
        assert_eq!(genotypes.len(), 1);
        assert_eq!(genotypes[0].notation, "C/T");
        assert_eq!(genotypes[0].count, 7);
    }

    #[test]
    fn test_large_counts_merge_without_overflow() {
        // Both tokens mean T/T and together exceed u32::MAX
        let genotypes =
            aggregate_genotypes("R,RR", "3000000000,3000000000", "T", &alts()).unwrap();
        assert_eq!(genotypes.len(), 1);
        assert_eq!(genotypes[0].count, 6_000_000_000);

        let genotypes = aggregate_genotypes(
            "R,RR",
            &format!("{},1", u64::MAX),
            "T",
            &alts(),
        )
        .unwrap();
        assert_eq!(genotypes[0].count, u64::MAX);
    }

    #[test]
    fn test_genotype_lookup_either_order() {
        let stats = VariantStats::from_record(&record("GTS=A1R;GTC=3"));
        assert_eq!(stats.genotype("T/C").map(|g| g.count), Some(3));
        assert_eq!(stats.genotype("C/T").map(|g| g.count), Some(3));
        assert!(stats.genotype("G/G").is_none());
    }
}
