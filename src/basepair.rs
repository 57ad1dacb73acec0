//! Canonical basepairs and the covariation statistic.
//!
//! For every consensus pair `(p, q)` the engine looks at each sequence's
//! realization `a:b` of the pair and
//!
//! * counts it as canonical if [`is_canonical`]`(a, b)` holds, per sequence
//!   and per pair;
//! * compares it against every later sequence's realization, scoring the
//!   [`bp_distance`] positively when both realizations are canonical and
//!   negatively otherwise, weighted by the sum of both sequence weights.
//!
//! ```text
//! contrib(i,j) = ±d(a_i:b_i, a_j:b_j) · (w_i + w_j)
//! cov(p)       = Σ_{i<j} contrib(i,j)
//! den(p)       = Σ_{i<j} (w_i + w_j)
//! mean_cov     = Σ_p cov(p) / Σ_p den(p)
//! ```
//!
//! The family-wide mean is taken from the raw sums first; only afterwards is
//! each pair's own score divided by its own denominator. A sequence whose
//! pair is a gap on both halves is skipped as the left member of a
//! comparison.
//!
//! The computation is O(N²) per pair. Each pair is independent given the
//! read-only residue matrix.
//!
//! ### Example
//! ```rust
//! use seedqc::{basepair_stats, parse_structure, Alphabet, AlphabetKind, Msa};
//! let msa = Msa::digital(Alphabet::new(AlphabetKind::Rna),
//!     vec!["a".into(), "b".into()], vec!["GAAC".into(), "AAAU".into()])
//!     .unwrap().with_ss_cons("(..)").unwrap();
//! let ct = parse_structure(msa.ss_cons().unwrap(), msa.alen()).unwrap();
//! let bp = basepair_stats(&msa, &ct).unwrap();
//! assert_eq!(bp.pairs.len(), 1);
//! assert_eq!(bp.seq_canonical, vec![1, 1]);
//! assert!((bp.mean_covariation - 2.0).abs() < 1e-12);
//! ```

use crate::common::{try_filled, Result, SeedQcError};
use crate::msa::Msa;
use crate::structure::PartnerMap;

const MIN_DENOMINATOR: f64 = 1e-10;

/// Whether residue codes `a:b` form a canonical pair.
///
/// Watson-Crick and GU wobble pairs under `A=0 C=1 G=2 U=3`, plus the
/// ambiguity-code pairs R:Y, Y:R, M:K, K:M, S:S and W:W under `R=5 Y=6 M=7
/// K=8 S=9 W=10`. Everything else is non-canonical.
pub fn is_canonical(a: u8, b: u8) -> bool {
    matches!(
        (a, b),
        (0, 3) | (3, 0) | (1, 2) | (2, 1) | (2, 3) | (3, 2)
            | (5, 6) | (6, 5) | (7, 8) | (8, 7) | (9, 9) | (10, 10)
    )
}

/// Number of pair halves that differ between `a1:b1` and `a2:b2` (0, 1 or 2).
pub fn bp_distance(a1: u8, b1: u8, a2: u8, b2: u8) -> u8 {
    (a1 != a2) as u8 + (b1 != b2) as u8
}

/// Statistics of one consensus basepair.
#[derive(Clone, Debug, PartialEq)]
pub struct BasepairRecord {
    /// Left column (1-based), always `< right`.
    pub left: usize,
    /// Right column (1-based).
    pub right: usize,
    /// Sequences forming a canonical pair here.
    pub canonical_count: usize,
    /// `canonical_count / N` (0 for an empty alignment).
    pub canonical_fraction: f64,
    /// Covariation score normalized by this pair's own weight sum.
    pub covariation: f64,
}

/// Result of [`basepair_stats`].
#[derive(Clone, Debug)]
pub struct BasepairStats {
    /// One record per consensus pair, ordered by left column.
    pub pairs: Vec<BasepairRecord>,
    /// `[i]`: canonical pairs formed by sequence `i`.
    pub seq_canonical: Vec<usize>,
    /// Family-wide covariation: total contribution over total weight.
    pub mean_covariation: f64,
}

impl BasepairStats {
    /// Number of consensus pairs.
    pub fn nbp(&self) -> usize { self.pairs.len() }

    /// Fraction of sequence `i`'s consensus pairs that are canonical.
    pub fn seq_canonical_fraction(&self, i: usize) -> f64 {
        if self.pairs.is_empty() { return 0.0; }
        self.seq_canonical.get(i).copied().unwrap_or(0) as f64 / self.pairs.len() as f64
    }

    /// Mean over sequences of the canonical fraction, `Σ canonical / (N·nbp)`.
    pub fn mean_canonical_fraction(&self) -> f64 {
        let n = self.seq_canonical.len();
        if self.pairs.is_empty() || n == 0 { return 0.0; }
        self.seq_canonical.iter().sum::<usize>() as f64 / (n * self.pairs.len()) as f64
    }
}

/// Compute canonical-pair counts and covariation for every pair of `ct`.
///
/// The alignment must be digitized and `ct` must cover its columns.
pub fn basepair_stats(msa: &Msa, ct: &PartnerMap) -> Result<BasepairStats> {
    let (abc, rows) = msa.require_digital("basepair statistics")?;
    if ct.len() != msa.alen() {
        return Err(SeedQcError::contract(format!(
            "partner map covers {} columns, alignment has {}", ct.len(), msa.alen()
        )));
    }
    if !abc.is_nucleic() {
        log::warn!("basepair statistics on a {:?} alignment; canonical pairs assume nucleotide codes", abc.kind());
    }
    let n = msa.nseq();
    let gap = abc.gap_code();
    let weights: Vec<f64> = (0..n).map(|i| msa.effective_weight(i)).collect();

    let bps: Vec<(usize, usize)> = ct.pairs().collect();
    let mut seq_canonical = try_filled("per-sequence canonical counts", n, 0usize)?;
    let mut pos_canonical = try_filled("per-pair canonical counts", bps.len(), 0usize)?;
    let mut cov = try_filled("per-pair covariation", bps.len(), 0.0f64)?;
    let mut cov_den = try_filled("per-pair covariation weight", bps.len(), 0.0f64)?;

    for (k, &(p, q)) in bps.iter().enumerate() {
        for i in 0..n {
            let (a1, b1) = (rows[i][p - 1], rows[i][q - 1]);
            if a1 == gap && b1 == gap { continue; }
            let canon1 = is_canonical(a1, b1);
            if canon1 {
                seq_canonical[i] += 1;
                pos_canonical[k] += 1;
            }
            for j in i+1..n {
                let (a2, b2) = (rows[j][p - 1], rows[j][q - 1]);
                let canon2 = is_canonical(a2, b2);
                let d = bp_distance(a1, b1, a2, b2) as f64;
                let wsum = weights[i] + weights[j];
                cov[k] += if canon1 && canon2 { d * wsum } else { -d * wsum };
                cov_den[k] += wsum;
            }
        }
    }

    // family mean from the raw sums, before per-pair normalization
    let total_den: f64 = cov_den.iter().sum();
    let mean_covariation = if bps.is_empty() || total_den.abs() <= MIN_DENOMINATOR {
        0.0
    } else {
        cov.iter().sum::<f64>() / total_den
    };

    let mut pairs = Vec::new();
    pairs.try_reserve_exact(bps.len()).map_err(|_| SeedQcError::Memory { what: "basepair records", len: bps.len() })?;
    for (k, &(left, right)) in bps.iter().enumerate() {
        let covariation = if cov_den[k].abs() > MIN_DENOMINATOR { cov[k] / cov_den[k] } else { cov[k] };
        let canonical_fraction = if n == 0 { 0.0 } else { pos_canonical[k] as f64 / n as f64 };
        pairs.push(BasepairRecord { left, right, canonical_count: pos_canonical[k], canonical_fraction, covariation });
    }
    log::debug!("basepair stats: {} pairs over {} sequences, mean covariation {:.5}", pairs.len(), n, mean_covariation);

    Ok(BasepairStats { pairs, seq_canonical, mean_covariation })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn canonical_is_symmetric(a in 0u8..18, b in 0u8..18) {
            prop_assert_eq!(is_canonical(a, b), is_canonical(b, a));
        }

        #[test]
        fn distance_zero_on_self_and_symmetric(a1 in 0u8..18, b1 in 0u8..18, a2 in 0u8..18, b2 in 0u8..18) {
            prop_assert_eq!(bp_distance(a1, b1, a1, b1), 0);
            prop_assert_eq!(bp_distance(a1, b1, a2, b2), bp_distance(a2, b2, a1, b1));
        }
    }
}
