//! Family, sequence and basepair QC records.
//!
//! [`QcReport::compute`] runs the whole pipeline over one alignment:
//!
//! 1. parse the consensus structure (an alignment without one has no pairs);
//! 2. weighted composition and unaligned lengths;
//! 3. pairwise identity summary (only with two or more sequences);
//! 4. canonical-pair counts and covariation;
//!
//! and assembles one [`FamilyStats`], one [`SequenceStats`] per sequence and
//! one [`BasepairRow`] per consensus pair. Every ratio whose denominator is
//! zero is reported as `0.0`. Formatting is left to the caller.
//!
//! ### Example
//! ```rust
//! use seedqc::{Alphabet, AlphabetKind, Msa, QcReport};
//! let mut msa = Msa::digital(Alphabet::new(AlphabetKind::Rna),
//!     vec!["a".into(), "b".into()], vec!["GAAC".into(), "AAAU".into()])
//!     .unwrap().with_ss_cons("(..)").unwrap();
//! msa.set_name("fam");
//! let report = QcReport::compute(&msa).unwrap();
//! assert_eq!(report.family.nbp, 1);
//! assert_eq!(report.sequences.len(), 2);
//! assert_eq!(report.basepairs[0].left, 1);
//! ```

use crate::ambiguity::{dominant_two_letter_code, TwoLetterCode};
use crate::basepair::basepair_stats;
use crate::common::{Result, SeedQcError};
use crate::composition::compute_composition;
use crate::identity::{all_pairs_identity, PidStats};
use crate::msa::Msa;
use crate::structure::{parse_structure, PartnerMap};

/// Family name used when the alignment has none.
pub const UNNAMED_FAMILY: &str = "-";

/// Whole-family summary.
#[derive(Clone, Debug, PartialEq)]
pub struct FamilyStats {
    /// Family name.
    pub name: String,
    /// `Σ seq_canonical / (N·nbp)`.
    pub mean_canonical_fraction: f64,
    /// Family-wide covariation.
    pub mean_covariation: f64,
    /// Number of sequences.
    pub nseq: usize,
    /// Number of alignment columns.
    pub alen: usize,
    /// Consensus basepairs after pseudoknot removal.
    pub nbp: usize,
    /// Residues over all sequences.
    pub total_len: usize,
    /// `None` for a single-sequence alignment.
    pub pid: Option<PidStats>,
    /// Mean unaligned length.
    pub mean_len: f64,
    /// Longest unaligned length.
    pub max_len: usize,
    /// Shortest unaligned length.
    pub min_len: usize,
    /// Fraction of alignment cells holding a residue, `total_len / (alen·N)`.
    pub residue_fraction: f64,
    /// Weighted A, C, G, U counts over `total_len`.
    pub base_fractions: [f64; 4],
    /// Dominant two-letter code of the whole family.
    pub two_letter: Option<TwoLetterCode>,
    /// `(C+G) / total_len`.
    pub cg_content: f64,
}

/// Per-sequence summary.
#[derive(Clone, Debug, PartialEq)]
pub struct SequenceStats {
    /// Family name.
    pub family: String,
    /// Sequence name.
    pub name: String,
    /// Canonical pairs of this sequence over `nbp`.
    pub canonical_fraction: f64,
    /// Unaligned length.
    pub len: usize,
    /// Weighted A, C, G, U counts over `w_i·len_i`.
    pub base_fractions: [f64; 4],
    /// Dominant two-letter code of this sequence.
    pub two_letter: Option<TwoLetterCode>,
    /// `(C+G) / (w_i·len_i)`.
    pub cg_content: f64,
}

/// Per-basepair summary.
#[derive(Clone, Debug, PartialEq)]
pub struct BasepairRow {
    /// Family name.
    pub family: String,
    /// Left column (1-based).
    pub left: usize,
    /// Right column (1-based).
    pub right: usize,
    /// Sequences with a canonical pair here, over N.
    pub canonical_fraction: f64,
    /// Covariation normalized by this pair's weight sum.
    pub covariation: f64,
}

/// The three record collections of one alignment.
#[derive(Clone, Debug)]
pub struct QcReport {
    /// The family record.
    pub family: FamilyStats,
    /// One record per sequence, in alignment order.
    pub sequences: Vec<SequenceStats>,
    /// One record per consensus pair, by left column.
    pub basepairs: Vec<BasepairRow>,
}

fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}

impl QcReport {
    /// Compute every record for `msa`, which must be a digitized nucleotide
    /// alignment with at least one sequence.
    pub fn compute(msa: &Msa) -> Result<Self> {
        let abc = msa.alphabet().ok_or_else(|| SeedQcError::contract("QC report requires a digitized alignment"))?;
        if !abc.is_nucleic() {
            return Err(SeedQcError::contract(format!("QC report requires a nucleotide alphabet, got {:?}", abc.kind())));
        }
        let n = msa.nseq();
        if n == 0 {
            return Err(SeedQcError::contract("QC report of an alignment without sequences"));
        }
        let family = msa.name().unwrap_or(UNNAMED_FAMILY).to_string();

        let ct = match msa.ss_cons() {
            Some(ss) => parse_structure(ss, msa.alen())?,
            None => {
                log::info!("{}: no consensus structure, reporting without basepairs", family);
                PartnerMap::unpaired(msa.alen())?
            }
        };
        let comp = compute_composition(msa)?;
        let pid = if n >= 2 { Some(all_pairs_identity(msa)?) } else { None };
        let bp = basepair_stats(msa, &ct)?;
        let nbp = bp.nbp();

        let len_tot = comp.total_len as f64;
        let t = &comp.total;
        let fam = FamilyStats {
            name: family.clone(),
            mean_canonical_fraction: bp.mean_canonical_fraction(),
            mean_covariation: bp.mean_covariation,
            nseq: n,
            alen: msa.alen(),
            nbp,
            total_len: comp.total_len,
            pid,
            mean_len: len_tot / n as f64,
            max_len: comp.max_len,
            min_len: comp.min_len,
            residue_fraction: ratio(len_tot, (msa.alen() * n) as f64),
            base_fractions: [ratio(t[0], len_tot), ratio(t[1], len_tot), ratio(t[2], len_tot), ratio(t[3], len_tot)],
            two_letter: dominant_two_letter_code(t[0], t[1], t[2], t[3]),
            cg_content: ratio(t[1] + t[2], len_tot),
        };

        let sequences = (0..n)
            .map(|i| {
                let c = &comp.per_seq[i];
                let den = msa.effective_weight(i) * comp.lengths[i] as f64;
                SequenceStats {
                    family: family.clone(),
                    name: msa.names()[i].clone(),
                    canonical_fraction: bp.seq_canonical_fraction(i),
                    len: comp.lengths[i],
                    base_fractions: [ratio(c[0], den), ratio(c[1], den), ratio(c[2], den), ratio(c[3], den)],
                    two_letter: dominant_two_letter_code(c[0], c[1], c[2], c[3]),
                    cg_content: ratio(c[1] + c[2], den),
                }
            })
            .collect();

        let basepairs = bp
            .pairs
            .iter()
            .map(|r| BasepairRow {
                family: family.clone(),
                left: r.left,
                right: r.right,
                canonical_fraction: r.canonical_fraction,
                covariation: r.covariation,
            })
            .collect();

        log::debug!("{}: {} sequences, {} columns, {} basepairs", family, n, msa.alen(), nbp);
        Ok(QcReport { family: fam, sequences, basepairs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::{Alphabet, AlphabetKind};

    fn close(a: f64, b: f64) -> bool { (a - b).abs() < 1e-12 }

    fn rna(rows: &[&str]) -> Msa {
        let names = (0..rows.len()).map(|i| format!("s{}", i)).collect();
        Msa::digital(Alphabet::new(AlphabetKind::Rna), names, rows.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    fn two_seq_family() -> Msa {
        let mut msa = rna(&["GAAC", "AAAU"]).with_ss_cons("(..)").unwrap();
        msa.set_name("fam");
        msa
    }

    #[test]
    fn family_record() {
        let r = QcReport::compute(&two_seq_family()).unwrap();
        let f = &r.family;
        assert_eq!(f.name, "fam");
        assert_eq!((f.nseq, f.alen, f.nbp, f.total_len), (2, 4, 1, 8));
        assert!(close(f.mean_canonical_fraction, 1.0));
        assert!(close(f.mean_covariation, 2.0));
        let pid = f.pid.unwrap();
        assert!(close(pid.mean, 0.5));
        assert!(close(f.mean_len, 4.0));
        assert_eq!((f.max_len, f.min_len), (4, 4));
        assert!(close(f.residue_fraction, 1.0));
        assert_eq!(f.base_fractions, [0.625, 0.125, 0.125, 0.125]);
        assert_eq!(f.two_letter, Some(TwoLetterCode { code: 'M', fraction: 0.75 }));
        assert!(close(f.cg_content, 0.25));
    }

    #[test]
    fn sequence_records() {
        let r = QcReport::compute(&two_seq_family()).unwrap();
        let s0 = &r.sequences[0];
        assert_eq!((s0.family.as_str(), s0.name.as_str(), s0.len), ("fam", "s0", 4));
        assert_eq!(s0.base_fractions, [0.5, 0.25, 0.25, 0.0]);
        assert_eq!(s0.two_letter.unwrap().code, 'M');
        assert!(close(s0.cg_content, 0.5));
        let s1 = &r.sequences[1];
        assert_eq!(s1.two_letter, Some(TwoLetterCode { code: 'W', fraction: 1.0 }));
        assert!(close(s1.canonical_fraction, 1.0));
    }

    #[test]
    fn basepair_records() {
        let r = QcReport::compute(&two_seq_family()).unwrap();
        assert_eq!(r.basepairs, vec![BasepairRow {
            family: "fam".into(), left: 1, right: 4, canonical_fraction: 1.0, covariation: 2.0,
        }]);
    }

    #[test]
    fn weights_cancel_in_sequence_fractions() {
        let msa = two_seq_family().with_weights(vec![2.0, 2.0]).unwrap();
        let r = QcReport::compute(&msa).unwrap();
        assert_eq!(r.sequences[0].base_fractions, [0.5, 0.25, 0.25, 0.0]);
        // family fractions divide weighted counts by unweighted length
        assert_eq!(r.family.base_fractions, [1.25, 0.25, 0.25, 0.25]);
    }

    #[test]
    fn single_sequence_has_no_pid() {
        let r = QcReport::compute(&rna(&["GAAC"]).with_ss_cons("(..)").unwrap()).unwrap();
        assert!(r.family.pid.is_none());
        assert_eq!(r.family.name, UNNAMED_FAMILY);
        assert_eq!(r.family.mean_covariation, 0.0);
        assert_eq!(r.basepairs[0].covariation, 0.0);
    }

    #[test]
    fn missing_structure_means_no_pairs() {
        let r = QcReport::compute(&rna(&["ACGU", "ACGA"])).unwrap();
        assert_eq!(r.family.nbp, 0);
        assert!(r.basepairs.is_empty());
        assert_eq!(r.family.mean_canonical_fraction, 0.0);
        assert_eq!(r.sequences[0].canonical_fraction, 0.0);
    }

    #[test]
    fn empty_sequence_reports_zero_fractions() {
        let r = QcReport::compute(&rna(&["----", "ACGU"])).unwrap();
        let s0 = &r.sequences[0];
        assert_eq!(s0.len, 0);
        assert_eq!(s0.base_fractions, [0.0; 4]);
        assert_eq!(s0.cg_content, 0.0);
        assert_eq!(s0.two_letter, None);
    }

    #[test]
    fn preconditions() {
        let text = Msa::from_text(vec!["a".into()], vec!["ACGU".into()]).unwrap();
        assert!(matches!(QcReport::compute(&text), Err(SeedQcError::Contract(_))));
        let aa = Msa::digital(Alphabet::new(AlphabetKind::Amino), vec!["a".into()], vec!["MKV".into()]).unwrap();
        assert!(matches!(QcReport::compute(&aa), Err(SeedQcError::Contract(_))));
        let empty = Msa::digital(Alphabet::new(AlphabetKind::Rna), vec![], vec![]).unwrap();
        assert!(matches!(QcReport::compute(&empty), Err(SeedQcError::Contract(_))));
    }

    #[test]
    fn bad_structure_propagates() {
        let msa = rna(&["ACGU"]).with_ss_cons("((.)").unwrap();
        assert!(matches!(QcReport::compute(&msa), Err(SeedQcError::Structure(_))));
    }
}
