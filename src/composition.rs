//! Weighted residue composition and unaligned lengths.
//!
//! For every sequence `i` and column, the sequence weight `w_i` is added to
//! one bucket of a `K+1` array:
//!
//! * canonical residue `x` (`x < K`) → bucket `x`
//! * gap, missing data, non-residue `*` → bucket `K`
//! * degenerate residue → **no bucket**; it is skipped entirely
//!
//! Independently, `lengths[i]` counts (unweighted) every column holding a
//! residue, degenerate ones included. Counts are left unnormalized; the
//! report assembler divides by the appropriate length.
//!
//! ### Example
//! ```
//! use seedqc::{compute_composition, Alphabet, AlphabetKind, Msa};
//! let msa = Msa::digital(Alphabet::new(AlphabetKind::Rna),
//!     vec!["a".into(), "b".into()], vec!["AC-G".into(), "ANGG".into()]).unwrap();
//! let comp = compute_composition(&msa).unwrap();
//! assert_eq!(comp.lengths, vec![3, 4]);
//! assert_eq!(comp.total[2], 3.0); // three G's at weight 1
//! ```

use crate::common::{try_filled, Result, SeedQcError};
use crate::msa::Msa;
use crate::alphabet::ResidueClass;

/// Composition and length totals of one alignment.
#[derive(Clone, Debug)]
pub struct Composition {
    /// `[i][0..=K]`: weighted counts of sequence `i`; `K` collects gaps,
    /// missing data and non-residues.
    pub per_seq: Vec<Vec<f64>>,
    /// `[0..=K]`: sum of `per_seq` over all sequences.
    pub total: Vec<f64>,
    /// Unaligned (residue) length of every sequence.
    pub lengths: Vec<usize>,
    /// Sum of `lengths`.
    pub total_len: usize,
    /// Shortest sequence (0 for an empty alignment).
    pub min_len: usize,
    /// Longest sequence (0 for an empty alignment).
    pub max_len: usize,
}

/// Count weighted residues and unaligned lengths. The alignment must be
/// digitized.
pub fn compute_composition(msa: &Msa) -> Result<Composition> {
    let (abc, rows) = msa.require_digital("composition counting")?;
    let k = abc.k() as usize;
    let n = msa.nseq();

    let mut per_seq = Vec::new();
    per_seq.try_reserve_exact(n).map_err(|_| SeedQcError::Memory { what: "composition rows", len: n })?;
    let mut total = try_filled("composition totals", k + 1, 0.0f64)?;
    let mut lengths = try_filled("sequence lengths", n, 0usize)?;
    let (mut total_len, mut min_len, mut max_len) = (0usize, 0usize, 0usize);

    for (i, row) in rows.iter().enumerate() {
        let w = msa.effective_weight(i);
        let mut counts = try_filled("composition row", k + 1, 0.0f64)?;
        for &x in row {
            if abc.is_residue(x) { lengths[i] += 1; }
            if abc.is_canonical(x) {
                counts[x as usize] += w;
            } else if !abc.is_degenerate(x) {
                counts[k] += w;
            }
        }
        for (t, c) in total.iter_mut().zip(&counts) { *t += c; }
        total_len += lengths[i];
        min_len = if i == 0 { lengths[i] } else { min_len.min(lengths[i]) };
        max_len = if i == 0 { lengths[i] } else { max_len.max(lengths[i]) };
        per_seq.push(counts);
    }
    log::debug!("composition: {} sequences, {} residues (min {}, max {})", n, total_len, min_len, max_len);

    Ok(Composition { per_seq, total, lengths, total_len, min_len, max_len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::{Alphabet, AlphabetKind};

    fn rna(rows: &[&str]) -> Msa {
        let names = (0..rows.len()).map(|i| format!("s{}", i)).collect();
        Msa::digital(Alphabet::new(AlphabetKind::Rna), names, rows.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn weighted_counts_and_lengths() {
        let msa = rna(&["ACGU-", "AAN~G"]).with_weights(vec![2.0, 0.5]).unwrap();
        let c = compute_composition(&msa).unwrap();
        assert_eq!(c.per_seq[0], vec![2.0, 2.0, 2.0, 2.0, 2.0]);
        // N skipped, '~' lands in the gap bucket
        assert_eq!(c.per_seq[1], vec![1.0, 0.0, 0.5, 0.0, 0.5]);
        assert_eq!(c.lengths, vec![4, 4]);
        assert_eq!(c.total_len, 8);
        assert_eq!(c.total, vec![3.0, 2.0, 2.5, 2.0, 2.5]);
    }

    #[test]
    fn min_and_max_lengths() {
        let c = compute_composition(&rna(&["AC--", "ACGU", "A---"])).unwrap();
        assert_eq!((c.min_len, c.max_len), (1, 4));
        let c = compute_composition(&rna(&["AC--"])).unwrap();
        assert_eq!((c.min_len, c.max_len), (2, 2));
    }

    #[test]
    fn empty_alignment_has_zero_lengths() {
        let msa = Msa::digital(Alphabet::new(AlphabetKind::Rna), vec![], vec![]).unwrap();
        let c = compute_composition(&msa).unwrap();
        assert!(c.per_seq.is_empty());
        assert_eq!((c.total_len, c.min_len, c.max_len), (0, 0, 0));
        assert_eq!(c.total.len(), 5);
    }

    #[test]
    fn text_alignment_is_rejected() {
        let msa = Msa::from_text(vec!["a".into()], vec!["ACGU".into()]).unwrap();
        assert!(matches!(compute_composition(&msa), Err(SeedQcError::Contract(_))));
    }

    #[test]
    fn zero_weight_contributes_nothing() {
        let msa = rna(&["ACGU", "ACGU"]).with_weights(vec![1.0, 0.0]).unwrap();
        let c = compute_composition(&msa).unwrap();
        assert_eq!(c.per_seq[1], vec![0.0; 5]);
        assert_eq!(c.lengths[1], 4);
    }
}
