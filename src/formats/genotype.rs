//! Compact genotype notation decoding
//!
//! Some annotation VCFs (e.g. the Exome Variant Server dialect) report
//! genotypes as compact tokens in a `GTS` INFO attribute instead of per-sample
//! GT fields:
//!
//! | Token     | Meaning                                 | Notation              |
//! |-----------|-----------------------------------------|-----------------------|
//! | `A`       | homozygous for a literal base           | `A/A`                 |
//! | `R`       | homozygous reference                    | `ref/ref`             |
//! | `AC`      | heterozygous literal bases              | `A/C`                 |
//! | `RR`      | homozygous reference                    | `ref/ref`             |
//! | `A2`      | homozygous for the 2nd alternate        | `alt2/alt2`           |
//! | `A1A2`    | heterozygous between two alternates     | `alt1/alt2`           |
//! | `A1R`     | alternate / reference                   | `alt1/ref`            |

use std::fmt;

/// Classified genotype token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenotypeToken {
    /// `A`, `C`, `G` or `T`
    LiteralHomozygous(char),
    /// `R` or `RR`
    ReferenceHomozygous,
    /// Two literal bases, e.g. `AC`
    LiteralHeterozygous(char, char),
    /// `A<i>`, 1-based alternate index
    AltIndexHomozygous(usize),
    /// `A<i>A<j>`
    AltIndexHeterozygous(usize, usize),
    /// `A<i>R`
    AltIndexReference(usize),
    Unrecognized,
}

fn is_base(c: char) -> bool {
    matches!(c, 'A' | 'C' | 'G' | 'T')
}

/// Parse `A<digits>` at the start of `s`, returning the index and the remainder
fn alt_index(s: &str) -> Option<(usize, &str)> {
    let digits = s.strip_prefix('A')?;
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let index = digits[..end].parse::<usize>().ok().filter(|&i| i >= 1)?;
    Some((index, &digits[end..]))
}

impl GenotypeToken {
    /// Classify a token; patterns are tried in table order
    pub fn parse(token: &str) -> Self {
        let chars: Vec<char> = token.chars().collect();

        match chars.as_slice() {
            [b] if is_base(*b) => return GenotypeToken::LiteralHomozygous(*b),
            ['R'] => return GenotypeToken::ReferenceHomozygous,
            [b1, b2] if is_base(*b1) && is_base(*b2) => {
                return GenotypeToken::LiteralHeterozygous(*b1, *b2)
            }
            ['R', 'R'] => return GenotypeToken::ReferenceHomozygous,
            _ => {}
        }

        if let Some((first, rest)) = alt_index(token) {
            if rest.is_empty() {
                return GenotypeToken::AltIndexHomozygous(first);
            }
            if rest == "R" {
                return GenotypeToken::AltIndexReference(first);
            }
            if let Some((second, "")) = alt_index(rest) {
                return GenotypeToken::AltIndexHeterozygous(first, second);
            }
        }

        GenotypeToken::Unrecognized
    }

    /// Resolve the token to its "allele1/allele2" notation
    ///
    /// Returns None for unrecognized tokens and alternate indices that are out of range.
    pub fn notation(&self, ref_allele: &str, alt_alleles: &[String]) -> Option<String> {
        let alt = |i: usize| {
            i.checked_sub(1)
                .and_then(|k| alt_alleles.get(k))
                .map(String::as_str)
        };

        let (allele1, allele2) = match *self {
            GenotypeToken::LiteralHomozygous(b) => return Some(format!("{}/{}", b, b)),
            GenotypeToken::LiteralHeterozygous(b1, b2) => return Some(format!("{}/{}", b1, b2)),
            GenotypeToken::ReferenceHomozygous => (ref_allele, ref_allele),
            GenotypeToken::AltIndexHomozygous(i) => {
                let a = alt(i)?;
                (a, a)
            }
            GenotypeToken::AltIndexHeterozygous(i, j) => (alt(i)?, alt(j)?),
            GenotypeToken::AltIndexReference(i) => (alt(i)?, ref_allele),
            GenotypeToken::Unrecognized => return None,
        };
        Some(format!("{}/{}", allele1, allele2))
    }
}

/// Decoded biallelic genotype with its occurrence count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genotype {
    /// "allele1/allele2" with allele strings, not indices
    pub notation: String,
    pub ref_allele: String,
    /// ALT column of the owning record (comma-joined)
    pub alternate: String,
    pub count: u64,
}

impl Genotype {
    pub fn new(notation: impl Into<String>, ref_allele: &str, alternate: &str) -> Self {
        Self {
            notation: notation.into(),
            ref_allele: ref_allele.to_string(),
            alternate: alternate.to_string(),
            count: 0,
        }
    }

    /// The two allele strings of the notation
    pub fn alleles(&self) -> (&str, &str) {
        self.notation
            .split_once('/')
            .unwrap_or((self.notation.as_str(), ""))
    }

    /// Notation with alleles in a canonical order, so `C/T` and `T/C` compare equal
    ///
    /// The reference allele sorts first, then alternates in ALT order, then
    /// anything else lexically.
    pub fn normalized_key(&self) -> String {
        let alternates: Vec<&str> = self.alternate.split(',').collect();
        let rank = |allele: &str| -> (usize, String) {
            if allele == self.ref_allele {
                (0, String::new())
            } else if let Some(i) = alternates.iter().position(|a| *a == allele) {
                (i + 1, String::new())
            } else {
                (usize::MAX, allele.to_string())
            }
        };

        let (a1, a2) = self.alleles();
        if rank(a2) < rank(a1) {
            format!("{}/{}", a2, a1)
        } else {
            format!("{}/{}", a1, a2)
        }
    }

    pub fn is_homozygous(&self) -> bool {
        let (a1, a2) = self.alleles();
        a1 == a2
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.notation, self.count)
    }
}

/// Decode one compact token against a record's alleles
pub fn decode_genotype(token: &str, ref_allele: &str, alt_alleles: &[String]) -> Option<Genotype> {
    let notation = GenotypeToken::parse(token).notation(ref_allele, alt_alleles)?;
    Some(Genotype::new(notation, ref_allele, &alt_alleles.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alts() -> Vec<String> {
        vec!["C".to_string(), "G".to_string()]
    }

    fn notation(token: &str) -> Option<String> {
        decode_genotype(token, "T", &alts()).map(|g| g.notation)
    }

    #[test]
    fn test_token_classification() {
        assert_eq!(GenotypeToken::parse("T"), GenotypeToken::LiteralHomozygous('T'));
        assert_eq!(GenotypeToken::parse("R"), GenotypeToken::ReferenceHomozygous);
        assert_eq!(GenotypeToken::parse("TG"), GenotypeToken::LiteralHeterozygous('T', 'G'));
        assert_eq!(GenotypeToken::parse("RR"), GenotypeToken::ReferenceHomozygous);
        assert_eq!(GenotypeToken::parse("A12"), GenotypeToken::AltIndexHomozygous(12));
        assert_eq!(GenotypeToken::parse("A1A2"), GenotypeToken::AltIndexHeterozygous(1, 2));
        assert_eq!(GenotypeToken::parse("A3R"), GenotypeToken::AltIndexReference(3));
    }

    #[test]
    fn test_single_a_is_a_base() {
        // "A" alone is the adenine base, not an alternate index
        assert_eq!(GenotypeToken::parse("A"), GenotypeToken::LiteralHomozygous('A'));
        assert_eq!(GenotypeToken::parse("AA"), GenotypeToken::LiteralHeterozygous('A', 'A'));
    }

    #[test]
    fn test_unrecognized_tokens() {
        for token in ["", "N", "RRR", "A0", "A1A", "RA1", "A1RR", "a1", "ACG", "A-1"] {
            assert_eq!(GenotypeToken::parse(token), GenotypeToken::Unrecognized, "{}", token);
        }
    }

    #[test]
    fn test_decoding_table() {
        assert_eq!(notation("T").as_deref(), Some("T/T"));
        assert_eq!(notation("R").as_deref(), Some("T/T"));
        assert_eq!(notation("TG").as_deref(), Some("T/G"));
        assert_eq!(notation("RR").as_deref(), Some("T/T"));
        assert_eq!(notation("A1").as_deref(), Some("C/C"));
        assert_eq!(notation("A2").as_deref(), Some("G/G"));
        assert_eq!(notation("A1A2").as_deref(), Some("C/G"));
        assert_eq!(notation("A1R").as_deref(), Some("C/T"));
    }

    #[test]
    fn test_alt_index_out_of_range() {
        assert_eq!(notation("A3"), None);
        assert_eq!(notation("A1A3"), None);
        assert_eq!(notation("A9R"), None);
    }

    #[test]
    fn test_genotype_carries_record_alleles() {
        let g = decode_genotype("A1R", "T", &alts()).unwrap();
        assert_eq!(g.ref_allele, "T");
        assert_eq!(g.alternate, "C,G");
        assert_eq!(g.count, 0);
        assert!(!g.is_homozygous());
    }

    #[test]
    fn test_normalized_key() {
        let forward = Genotype::new("C/T", "T", "C,G");
        let reverse = Genotype::new("T/C", "T", "C,G");
        assert_eq!(forward.normalized_key(), "T/C");
        assert_eq!(reverse.normalized_key(), "T/C");

        let alts = Genotype::new("G/C", "T", "C,G");
        assert_eq!(alts.normalized_key(), "C/G");

        let literal = Genotype::new("G/A", "T", "C");
        assert_eq!(literal.normalized_key(), "A/G");
    }
}
