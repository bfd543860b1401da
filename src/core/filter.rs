//! Record predicates and their AND-combination
//!
//! A [`FilterChain`] accepts a record only if every predicate accepts it.
//! An empty chain accepts everything. Predicates only see `&VcfRecord`, so
//! they cannot modify what they inspect.

use crate::formats::record::VcfRecord;

/// A pure boolean test over a record
pub trait RecordPredicate {
    fn accepts(&self, record: &VcfRecord) -> bool;
}

impl<F> RecordPredicate for F
where
    F: Fn(&VcfRecord) -> bool,
{
    fn accepts(&self, record: &VcfRecord) -> bool {
        self(record)
    }
}

/// Ordered list of predicates combined with logical AND
#[derive(Default)]
pub struct FilterChain {
    predicates: Vec<Box<dyn RecordPredicate>>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate
    pub fn push<P: RecordPredicate + 'static>(&mut self, predicate: P) {
        self.predicates.push(Box::new(predicate));
    }

    /// Builder-style `push`
    pub fn with<P: RecordPredicate + 'static>(mut self, predicate: P) -> Self {
        self.push(predicate);
        self
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// True iff every predicate accepts the record (short-circuits)
    pub fn combined_accepts(&self, record: &VcfRecord) -> bool {
        self.predicates.iter().all(|p| p.accepts(record))
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field("predicates", &self.predicates.len())
            .finish()
    }
}

/// Stock predicates
pub mod filters {
    use super::VcfRecord;

    /// FILTER column is "PASS"
    pub fn pass_only() -> impl Fn(&VcfRecord) -> bool {
        |record: &VcfRecord| record.filter == "PASS"
    }

    /// Record is on the given chromosome
    pub fn chromosome(name: impl Into<String>) -> impl Fn(&VcfRecord) -> bool {
        let name = name.into();
        move |record: &VcfRecord| record.chrom == name
    }

    /// QUAL is present and at least `min`
    pub fn min_quality(min: f64) -> impl Fn(&VcfRecord) -> bool {
        move |record: &VcfRecord| record.quality_value().is_some_and(|q| q >= min)
    }

    /// Single-nucleotide variants only
    pub fn snv_only() -> impl Fn(&VcfRecord) -> bool {
        |record: &VcfRecord| record.is_snv()
    }

    /// INFO contains the key (flag or key=value)
    pub fn has_attribute(key: impl Into<String>) -> impl Fn(&VcfRecord) -> bool {
        let key = key.into();
        move |record: &VcfRecord| record.has_attribute(&key)
    }
}
