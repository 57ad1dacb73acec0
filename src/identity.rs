//! Pairwise sequence identity.
//!
//! Identity between two aligned sequences is the number of columns where
//! both carry the same residue divided by the number of columns where both
//! carry a residue (gap, missing and `*` columns are ignored). Two
//! sequences with no residue column in common have identity 0.
//!
//! ### Example
//! ```rust
//! use seedqc::{all_pairs_identity, Alphabet, AlphabetKind, Msa};
//! let msa = Msa::digital(Alphabet::new(AlphabetKind::Rna),
//!     vec!["a".into(), "b".into()], vec!["A-CG".into(), "AUCC".into()]).unwrap();
//! let pid = all_pairs_identity(&msa).unwrap();
//! assert!((pid.mean - 2.0 / 3.0).abs() < 1e-12);
//! ```
//!
use rand::Rng;

use crate::alphabet::ResidueClass;
use crate::common::{Result, SeedQcError};
use crate::msa::Msa;

/// Summary of identities over all unordered sequence pairs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PidStats {
    /// Mean identity over all pairs.
    pub mean: f64,
    /// Lowest identity of any pair.
    pub min: f64,
    /// Highest identity of any pair.
    pub max: f64,
    /// Number of pairs, `N(N-1)/2`.
    pub npairs: usize,
}

fn pair_identity(class: &dyn ResidueClass, a: &[u8], b: &[u8]) -> f64 {
    let (mut idents, mut aligned) = (0usize, 0usize);
    for (&x, &y) in a.iter().zip(b) {
        if class.is_residue(x) && class.is_residue(y) {
            aligned += 1;
            if class.same_residue(x, y) { idents += 1; }
        }
    }
    if aligned == 0 { 0.0 } else { idents as f64 / aligned as f64 }
}

/// Fractional identity between sequences `i` and `j`.
pub fn pairwise_identity(msa: &Msa, i: usize, j: usize) -> Result<f64> {
    msa.check_seq(i, "pairwise_identity")?;
    msa.check_seq(j, "pairwise_identity")?;
    let rows = msa.rows();
    Ok(pair_identity(msa.class(), &rows[i], &rows[j]))
}

/// Mean, minimum and maximum identity over every pair `i < j`.
///
/// Needs at least two sequences.
pub fn all_pairs_identity(msa: &Msa) -> Result<PidStats> {
    let n = msa.nseq();
    if n < 2 {
        return Err(SeedQcError::contract(format!("pairwise identity needs at least 2 sequences, alignment has {}", n)));
    }
    let class = msa.class();
    let rows = msa.rows();
    let (mut sum, mut min, mut max) = (0.0f64, 1.0f64, 0.0f64);
    for i in 0..n {
        for j in i+1..n {
            let pid = pair_identity(class, &rows[i], &rows[j]);
            min = min.min(pid);
            max = max.max(pid);
            sum += pid;
        }
    }
    let npairs = n * (n - 1) / 2;
    Ok(PidStats { mean: sum / npairs as f64, min, max, npairs })
}

/// Average identity, sampled for large alignments.
///
/// If there are no more than `max_nseq²` pairs the exact mean is returned;
/// otherwise the mean over `max_nseq²` randomly drawn pairs of distinct
/// sequences. An alignment with fewer than two sequences has identity 1.
pub fn average_identity<R: Rng>(msa: &Msa, max_nseq: usize, rng: &mut R) -> Result<f64> {
    if max_nseq == 0 {
        return Err(SeedQcError::contract("max_nseq must be > 0"));
    }
    let n = msa.nseq();
    if n < 2 { return Ok(1.0); }
    let max_comparisons = max_nseq.saturating_mul(max_nseq);
    if n * (n - 1) / 2 <= max_comparisons {
        return all_pairs_identity(msa).map(|s| s.mean);
    }
    let class = msa.class();
    let rows = msa.rows();
    let mut sum = 0.0;
    for _ in 0..max_comparisons {
        let i = rng.gen_range(0..n);
        let mut j = rng.gen_range(0..n);
        while j == i { j = rng.gen_range(0..n); }
        sum += pair_identity(class, &rows[i], &rows[j]);
    }
    log::debug!("average identity sampled over {} of {} pairs", max_comparisons, n * (n - 1) / 2);
    Ok(sum / max_comparisons as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::{Alphabet, AlphabetKind};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rna(rows: &[&str]) -> Msa {
        let names = (0..rows.len()).map(|i| format!("s{}", i)).collect();
        Msa::digital(Alphabet::new(AlphabetKind::Rna), names, rows.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn identical_sequences_are_fully_identical() {
        let msa = rna(&["ACGU-A", "ACGU-A", "ACGU-A"]);
        let s = all_pairs_identity(&msa).unwrap();
        assert_eq!((s.mean, s.min, s.max), (1.0, 1.0, 1.0));
        assert_eq!(s.npairs, 3);
    }

    #[test]
    fn gaps_are_excluded_from_the_denominator() {
        let msa = rna(&["AC-U", "AGGU"]);
        // aligned columns 1,2,4; identical 1,4
        assert!((pairwise_identity(&msa, 0, 1).unwrap() - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn no_shared_residue_column_gives_zero() {
        let msa = rna(&["AC--", "--GU"]);
        assert_eq!(pairwise_identity(&msa, 0, 1).unwrap(), 0.0);
    }

    #[test]
    fn bad_index_is_a_contract_error() {
        let msa = rna(&["AC", "AC"]);
        assert!(matches!(pairwise_identity(&msa, 0, 2), Err(SeedQcError::Contract(_))));
    }

    #[test]
    fn single_sequence_has_no_pairs() {
        let msa = rna(&["ACGU"]);
        assert!(matches!(all_pairs_identity(&msa), Err(SeedQcError::Contract(_))));
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(average_identity(&msa, 10, &mut rng).unwrap(), 1.0);
    }

    #[test]
    fn min_max_over_mixed_pairs() {
        let msa = rna(&["AAAA", "AAAA", "CCCC"]);
        let s = all_pairs_identity(&msa).unwrap();
        assert_eq!(s.max, 1.0);
        assert_eq!(s.min, 0.0);
        assert!((s.mean - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn text_mode_ignores_case() {
        let msa = Msa::from_text(vec!["a".into(), "b".into()], vec!["acgu".into(), "ACGA".into()]).unwrap();
        assert!((pairwise_identity(&msa, 0, 1).unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn sampled_average_stays_in_range() {
        let rows: Vec<String> = (0..12).map(|i| if i % 2 == 0 { "ACGU".to_string() } else { "ACGG".to_string() }).collect();
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        let msa = rna(&refs);
        let mut rng = StdRng::seed_from_u64(7);
        // 66 pairs > 2*2, so this samples
        let avg = average_identity(&msa, 2, &mut rng).unwrap();
        assert!((0.75..=1.0).contains(&avg));
        let exact = average_identity(&msa, 100, &mut rng).unwrap();
        assert!((exact - all_pairs_identity(&msa).unwrap().mean).abs() < 1e-12);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::alphabet::{Alphabet, AlphabetKind};
    use proptest::prelude::*;

    fn aligned_rows(len: usize) -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec(
            proptest::collection::vec(prop_oneof![Just('A'), Just('C'), Just('G'), Just('U'), Just('-')], len)
                .prop_map(|v| v.into_iter().collect::<String>()),
            2..=8,
        )
    }

    proptest! {
        #[test]
        fn mean_between_min_and_max(rows in aligned_rows(25)) {
            let names = (0..rows.len()).map(|i| format!("s{}", i)).collect();
            let msa = Msa::digital(Alphabet::new(AlphabetKind::Rna), names, rows).unwrap();
            let s = all_pairs_identity(&msa).unwrap();
            prop_assert!(s.min <= s.mean + 1e-12 && s.mean <= s.max + 1e-12);
            prop_assert!(s.min >= 0.0 && s.max <= 1.0);
        }

        #[test]
        fn identity_is_symmetric(rows in aligned_rows(25)) {
            let names = (0..rows.len()).map(|i| format!("s{}", i)).collect();
            let msa = Msa::digital(Alphabet::new(AlphabetKind::Rna), names, rows).unwrap();
            prop_assert_eq!(pairwise_identity(&msa, 0, 1).unwrap(), pairwise_identity(&msa, 1, 0).unwrap());
        }
    }
}
