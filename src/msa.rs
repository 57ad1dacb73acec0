//! In-memory multiple sequence alignment.
//!
//! [`Msa`] is a structure-of-arrays keyed by a stable sequence index: the
//! residue rows, sequence names and weights are parallel vectors, and every
//! mutator (subsetting, column removal, [`Msa::reorder`]) updates all of
//! them in one step after validating its arguments.
//!
//! Rows are held either as digital codes of an [`Alphabet`] or as raw text;
//! see [`Residues`]. Columns are addressed 1-based (`1..=alen`) in the public
//! API, matching the partner-array convention of
//! [`PartnerMap`](crate::structure::PartnerMap).
//!
//! ### Example
//! ```rust
//! use seedqc::{Alphabet, AlphabetKind, Msa};
//! let msa = Msa::digital(
//!     Alphabet::new(AlphabetKind::Rna),
//!     vec!["a".into(), "b".into()],
//!     vec!["AC-GU".into(), "ACAGU".into()],
//! ).unwrap();
//! assert_eq!(msa.nseq(), 2);
//! assert_eq!(msa.seq_len(0).unwrap(), 4);
//! ```

use std::sync::OnceLock;
use std::collections::HashMap;

use crate::alphabet::{Alphabet, ResidueClass, TextClass};
use crate::common::{FastaRecord, Result, SeedQcError};
use crate::structure;

/// The residue matrix, tagged by representation.
#[derive(Clone, Debug)]
pub enum Residues {
    /// Digital codes, one row per sequence.
    Digital { abc: Alphabet, rows: Vec<Vec<u8>> },
    /// Raw text bytes, one row per sequence.
    Text { rows: Vec<Vec<u8>> },
}

impl Residues {
    fn rows(&self) -> &[Vec<u8>] {
        match self {
            Residues::Digital { rows, .. } | Residues::Text { rows } => rows,
        }
    }

    fn rows_mut(&mut self) -> &mut Vec<Vec<u8>> {
        match self {
            Residues::Digital { rows, .. } | Residues::Text { rows } => rows,
        }
    }
}

/// A multiple sequence alignment with optional consensus structure and
/// per-sequence weights.
#[derive(Clone, Debug)]
pub struct Msa {
    residues: Residues,
    alen: usize,
    names: Vec<String>,
    weights: Vec<f64>,
    name: Option<String>,
    accession: Option<String>,
    ss_cons: Option<String>,
    rf: Option<String>,
    // name -> index, rebuilt on demand after any mutation
    index: OnceLock<HashMap<String, usize>>,
}

impl Msa {
    /// Build a text-mode alignment. All rows must have the same length.
    pub fn from_text(names: Vec<String>, rows: Vec<String>) -> Result<Self> {
        if names.len() != rows.len() {
            return Err(SeedQcError::contract(format!("{} names for {} rows", names.len(), rows.len())));
        }
        let alen = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((i, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != alen) {
            return Err(SeedQcError::contract(format!(
                "aligned sequence {} ({}) has length {}, expected {}", i, names[i], r.len(), alen
            )));
        }
        let n = rows.len();
        Ok(Self {
            residues: Residues::Text { rows: rows.into_iter().map(String::into_bytes).collect() },
            alen,
            names,
            weights: vec![1.0; n],
            name: None,
            accession: None,
            ss_cons: None,
            rf: None,
            index: OnceLock::new(),
        })
    }

    /// Build a digital alignment from text rows.
    pub fn digital(abc: Alphabet, names: Vec<String>, rows: Vec<String>) -> Result<Self> {
        Self::from_text(names, rows)?.digitize(abc)
    }

    /// Build a text-mode alignment from FASTA records (ids become names).
    pub fn from_fasta(records: &[FastaRecord]) -> Result<Self> {
        Self::from_text(
            records.iter().map(|r| r.id.clone()).collect(),
            records.iter().map(|r| r.seq.clone()).collect(),
        )
    }

    /// Convert a text alignment to digital codes of `abc`.
    ///
    /// A digital alignment is returned unchanged if it already uses `abc`.
    pub fn digitize(mut self, abc: Alphabet) -> Result<Self> {
        if let Some(cur) = self.alphabet() {
            if *cur == abc {
                return Ok(self);
            }
            return Err(SeedQcError::contract(format!("alignment is already digitized with the {:?} alphabet", cur.kind())));
        }
        let mut digital = Vec::with_capacity(self.nseq());
        for (i, row) in self.rows().iter().enumerate() {
            let text = String::from_utf8_lossy(row);
            let codes = abc.digitize(&text).map_err(|e| match e {
                SeedQcError::InvalidSequence(msg) => SeedQcError::InvalidSequence(format!("{}: {}", self.names[i], msg)),
                other => other,
            })?;
            digital.push(codes);
        }
        self.residues = Residues::Digital { abc, rows: digital };
        Ok(self)
    }

    /// Attach externally computed sequence weights.
    pub fn with_weights(mut self, weights: Vec<f64>) -> Result<Self> {
        if weights.len() != self.nseq() {
            return Err(SeedQcError::contract(format!("{} weights for {} sequences", weights.len(), self.nseq())));
        }
        let bad = weights.iter().filter(|w| !(w.is_finite() && **w > 0.0)).count();
        if bad > 0 {
            log::warn!("{} sequence weight(s) are not positive and will contribute nothing", bad);
        }
        self.weights = weights;
        Ok(self)
    }

    /// Attach a consensus secondary structure (one symbol per column).
    pub fn with_ss_cons(mut self, ss: impl Into<String>) -> Result<Self> {
        let ss = ss.into();
        self.check_annotation_len("SS_cons", &ss)?;
        self.ss_cons = Some(ss);
        Ok(self)
    }

    /// Attach a reference (RF) annotation line.
    pub fn with_rf(mut self, rf: impl Into<String>) -> Result<Self> {
        let rf = rf.into();
        self.check_annotation_len("RF", &rf)?;
        self.rf = Some(rf);
        Ok(self)
    }

    fn check_annotation_len(&self, tag: &str, line: &str) -> Result<()> {
        if line.len() != self.alen {
            return Err(SeedQcError::contract(format!("{} has length {}, alignment has {} columns", tag, line.len(), self.alen)));
        }
        Ok(())
    }

    /// Set the family name.
    pub fn set_name(&mut self, name: impl Into<String>) { self.name = Some(name.into()); }

    /// Set the family accession.
    pub fn set_accession(&mut self, acc: impl Into<String>) { self.accession = Some(acc.into()); }

    /// Replace the consensus structure with an all-unpaired one.
    pub fn set_blank_ss_cons(&mut self) { self.ss_cons = Some(".".repeat(self.alen)); }

    /// Family name, if set.
    pub fn name(&self) -> Option<&str> { self.name.as_deref() }

    /// Family accession, if set.
    pub fn accession(&self) -> Option<&str> { self.accession.as_deref() }

    /// Consensus secondary structure line, if any.
    pub fn ss_cons(&self) -> Option<&str> { self.ss_cons.as_deref() }

    /// Reference annotation line, if any.
    pub fn rf(&self) -> Option<&str> { self.rf.as_deref() }

    /// Number of sequences (N).
    pub fn nseq(&self) -> usize { self.names.len() }

    /// Number of columns (L).
    pub fn alen(&self) -> usize { self.alen }

    /// Whether rows hold digital codes.
    pub fn is_digital(&self) -> bool { matches!(self.residues, Residues::Digital { .. }) }

    /// The residue matrix.
    pub fn residues(&self) -> &Residues { &self.residues }

    /// The digital alphabet, if the alignment is digitized.
    pub fn alphabet(&self) -> Option<&Alphabet> {
        match &self.residues {
            Residues::Digital { abc, .. } => Some(abc),
            Residues::Text { .. } => None,
        }
    }

    /// Residue classification matching the representation.
    pub fn class(&self) -> &dyn ResidueClass {
        match &self.residues {
            Residues::Digital { abc, .. } => abc,
            Residues::Text { .. } => &TextClass,
        }
    }

    /// Digital alphabet and rows, or a contract error naming `what`.
    pub(crate) fn require_digital(&self, what: &str) -> Result<(&Alphabet, &[Vec<u8>])> {
        match &self.residues {
            Residues::Digital { abc, rows } => Ok((abc, rows)),
            Residues::Text { .. } => Err(SeedQcError::contract(format!("{} requires a digitized alignment", what))),
        }
    }

    /// All rows, 0-based columns.
    pub fn rows(&self) -> &[Vec<u8>] { self.residues.rows() }

    /// Sequence names, by index.
    pub fn names(&self) -> &[String] { &self.names }

    /// Name of sequence `i`.
    pub fn seq_name(&self, i: usize) -> Option<&str> { self.names.get(i).map(String::as_str) }

    /// Stored weights, by index (default 1.0).
    pub fn weights(&self) -> &[f64] { &self.weights }

    /// Stored weight of sequence `i`, as given.
    pub fn weight(&self, i: usize) -> Option<f64> { self.weights.get(i).copied() }

    /// Row of sequence `i`, 0-based columns.
    pub fn row(&self, i: usize) -> Option<&[u8]> { self.rows().get(i).map(Vec::as_slice) }

    /// Weight of sequence `i` as used in weighted sums: zero unless positive
    /// and finite.
    pub fn effective_weight(&self, i: usize) -> f64 {
        match self.weights.get(i) {
            Some(&w) if w.is_finite() && w > 0.0 => w,
            _ => 0.0,
        }
    }

    pub(crate) fn check_seq(&self, i: usize, what: &str) -> Result<()> {
        if i >= self.nseq() {
            return Err(SeedQcError::contract(format!("{}: idx {} out of bounds (nseq: {})", what, i, self.nseq())));
        }
        Ok(())
    }

    fn check_col(&self, col: usize) -> Result<()> {
        if col == 0 || col > self.alen {
            return Err(SeedQcError::contract(format!("column {} out of range 1..={}", col, self.alen)));
        }
        Ok(())
    }

    /// Residue of sequence `i` at 1-based column `col`.
    pub fn residue(&self, i: usize, col: usize) -> Result<u8> {
        self.check_seq(i, "residue")?;
        self.check_col(col)?;
        Ok(self.rows()[i][col - 1])
    }

    /// Whether sequence `i` has a residue at 1-based column `col`.
    pub fn is_residue(&self, i: usize, col: usize) -> Result<bool> {
        let x = self.residue(i, col)?;
        Ok(self.class().is_residue(x))
    }

    /// Unaligned length of sequence `i`.
    pub fn seq_len(&self, i: usize) -> Result<usize> {
        self.check_seq(i, "seq_len")?;
        let class = self.class();
        Ok(self.rows()[i].iter().filter(|&&x| class.is_residue(x)).count())
    }

    /// Total residues over all sequences.
    pub fn count_residues(&self) -> usize {
        let class = self.class();
        self.rows().iter().map(|r| r.iter().filter(|&&x| class.is_residue(x)).count()).sum()
    }

    /// Mean unaligned sequence length.
    pub fn average_seq_len(&self) -> Result<f64> {
        if self.nseq() == 0 {
            return Err(SeedQcError::contract("average length of an empty alignment"));
        }
        Ok(self.count_residues() as f64 / self.nseq() as f64)
    }

    /// Aligned row `i` as text.
    pub fn aligned_string(&self, i: usize) -> Result<String> {
        self.check_seq(i, "aligned_string")?;
        Ok(match &self.residues {
            Residues::Digital { abc, rows } => abc.textize(&rows[i]),
            Residues::Text { rows } => String::from_utf8_lossy(&rows[i]).into_owned(),
        })
    }

    /// Row `i` with every non-residue removed.
    pub fn unaligned_string(&self, i: usize) -> Result<String> {
        self.check_seq(i, "unaligned_string")?;
        let class = self.class();
        let kept: Vec<u8> = self.rows()[i].iter().copied().filter(|&x| class.is_residue(x)).collect();
        Ok(match &self.residues {
            Residues::Digital { abc, .. } => abc.textize(&kept),
            Residues::Text { .. } => String::from_utf8_lossy(&kept).into_owned(),
        })
    }

    /// Index of the sequence called `name`.
    ///
    /// The lookup table is built on first use and dropped by every mutation.
    /// Duplicated names are a contract violation.
    pub fn seq_index(&self, name: &str) -> Result<Option<usize>> {
        if let Some(idx) = self.index.get() {
            return Ok(idx.get(name).copied());
        }
        let mut idx = HashMap::with_capacity(self.nseq());
        for (i, n) in self.names.iter().enumerate() {
            if idx.insert(n.clone(), i).is_some() {
                return Err(SeedQcError::contract(format!("alignment has duplicated sequence name {}", n)));
            }
        }
        let found = idx.get(name).copied();
        let _ = self.index.set(idx);
        Ok(found)
    }

    fn invalidate_index(&mut self) {
        self.index = OnceLock::new();
    }

    /// New alignment holding only the sequences with `keep[i] == true`.
    ///
    /// Weights are transferred as-is; annotation lines are kept.
    pub fn sequence_subset(&self, keep: &[bool]) -> Result<Msa> {
        if keep.len() != self.nseq() {
            return Err(SeedQcError::contract(format!("keep mask has {} entries for {} sequences", keep.len(), self.nseq())));
        }
        if !keep.iter().any(|&k| k) {
            return Err(SeedQcError::contract("no sequences selected"));
        }
        let pick = |i: &usize| keep[*i];
        let idxs: Vec<usize> = (0..self.nseq()).filter(pick).collect();
        let rows: Vec<Vec<u8>> = idxs.iter().map(|&i| self.rows()[i].clone()).collect();
        let residues = match &self.residues {
            Residues::Digital { abc, .. } => Residues::Digital { abc: abc.clone(), rows },
            Residues::Text { .. } => Residues::Text { rows },
        };
        Ok(Msa {
            residues,
            alen: self.alen,
            names: idxs.iter().map(|&i| self.names[i].clone()).collect(),
            weights: idxs.iter().map(|&i| self.weights[i]).collect(),
            name: self.name.clone(),
            accession: self.accession.clone(),
            ss_cons: self.ss_cons.clone(),
            rf: self.rf.clone(),
            index: OnceLock::new(),
        })
    }

    /// Keep only the columns with `keep[c] == true` (0-based mask).
    ///
    /// Consensus base pairs that lose one half are turned into unpaired
    /// columns in the remaining structure.
    pub fn column_subset(&mut self, keep: &[bool]) -> Result<()> {
        if keep.len() != self.alen {
            return Err(SeedQcError::contract(format!("keep mask has {} entries for {} columns", keep.len(), self.alen)));
        }
        let new_ss = match &self.ss_cons {
            Some(ss) => {
                let mut bytes = ss.clone().into_bytes();
                for (i, j) in structure::bracket_pairs(&bytes, true)? {
                    if keep[i] != keep[j] {
                        bytes[i] = b'.';
                        bytes[j] = b'.';
                    }
                }
                Some(filter_cols(&bytes, keep))
            }
            None => None,
        };
        let new_rf = self.rf.as_ref().map(|rf| filter_cols(rf.as_bytes(), keep));
        for row in self.residues.rows_mut().iter_mut() {
            let kept: Vec<u8> = row.iter().zip(keep).filter(|(_, &k)| k).map(|(&x, _)| x).collect();
            *row = kept;
        }
        self.alen = keep.iter().filter(|&&k| k).count();
        self.ss_cons = new_ss;
        self.rf = new_rf;
        self.invalidate_index();
        Ok(())
    }

    /// Whether 1-based column `col` has no residue in any sequence.
    pub(crate) fn is_all_gap_column(&self, col: usize) -> bool {
        let class = self.class();
        self.rows().iter().all(|r| {
            let x = r[col - 1];
            class.is_gap(x) || class.is_missing(x)
        })
    }

    /// Remove columns that are gap or missing in every sequence.
    ///
    /// With `consider_rf`, a column is only removed if the RF annotation is
    /// also a gap there; without an RF line the flag is ignored.
    pub fn remove_all_gap_columns(&mut self, consider_rf: bool) -> Result<()> {
        let rf = if consider_rf { self.rf.as_deref().map(str::as_bytes) } else { None };
        let keep: Vec<bool> = (1..=self.alen)
            .map(|c| {
                let all_gap = self.is_all_gap_column(c);
                let rf_gap = rf.map(|rf| matches!(rf[c - 1], b'.' | b'-' | b'_' | b'~')).unwrap_or(true);
                !(all_gap && rf_gap)
            })
            .collect();
        let removed = keep.iter().filter(|&&k| !k).count();
        log::debug!("removing {} all-gap column(s) of {}", removed, self.alen);
        self.column_subset(&keep)
    }

    /// Reorder sequences: after the call, sequence `k` is the old sequence
    /// `order[k]`. `order` must be a permutation of `0..nseq`.
    pub fn reorder(&mut self, order: &[usize]) -> Result<()> {
        let n = self.nseq();
        if order.len() != n {
            return Err(SeedQcError::contract(format!("order has {} entries for {} sequences", order.len(), n)));
        }
        let mut covered = vec![false; n];
        for (k, &o) in order.iter().enumerate() {
            if o >= n {
                return Err(SeedQcError::contract(format!("order[{}] = {} out of range", k, o)));
            }
            if covered[o] {
                return Err(SeedQcError::contract(format!("order array has duplicate entries for i: {}", k)));
            }
            covered[o] = true;
        }
        let rows = self.residues.rows_mut();
        let mut old_rows: Vec<Option<Vec<u8>>> = std::mem::take(rows).into_iter().map(Some).collect();
        *rows = order.iter().map(|&o| old_rows[o].take().unwrap_or_default()).collect();
        let mut old_names = std::mem::take(&mut self.names);
        self.names = order.iter().map(|&o| std::mem::take(&mut old_names[o])).collect();
        self.weights = order.iter().map(|&o| self.weights[o]).collect();
        self.invalidate_index();
        Ok(())
    }
}

fn filter_cols(line: &[u8], keep: &[bool]) -> String {
    line.iter().zip(keep).filter(|(_, &k)| k).map(|(&b, _)| b as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::AlphabetKind;

    fn rna(names: &[&str], rows: &[&str]) -> Msa {
        Msa::digital(
            Alphabet::new(AlphabetKind::Rna),
            names.iter().map(|s| s.to_string()).collect(),
            rows.iter().map(|s| s.to_string()).collect(),
        ).unwrap()
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let r = Msa::from_text(vec!["a".into(), "b".into()], vec!["ACG".into(), "AC".into()]);
        assert!(matches!(r, Err(SeedQcError::Contract(_))));
    }

    #[test]
    fn lengths_and_residue_counts() {
        let msa = rna(&["a", "b"], &["AC-GU", "A~NGU"]);
        assert_eq!(msa.alen(), 5);
        assert_eq!(msa.seq_len(0).unwrap(), 4);
        // '~' is missing, 'N' is a (degenerate) residue
        assert_eq!(msa.seq_len(1).unwrap(), 4);
        assert_eq!(msa.count_residues(), 8);
        assert!((msa.average_seq_len().unwrap() - 4.0).abs() < 1e-12);
        assert_eq!(msa.unaligned_string(0).unwrap(), "ACGU");
        assert_eq!(msa.aligned_string(1).unwrap(), "A~NGU");
    }

    #[test]
    fn residue_uses_one_based_columns() {
        let msa = rna(&["a"], &["ACGU"]);
        assert_eq!(msa.residue(0, 1).unwrap(), 0);
        assert_eq!(msa.residue(0, 4).unwrap(), 3);
        assert!(msa.residue(0, 0).is_err());
        assert!(msa.residue(0, 5).is_err());
        assert!(msa.residue(1, 1).is_err());
    }

    #[test]
    fn ss_cons_length_is_checked() {
        let msa = rna(&["a"], &["ACGU"]);
        assert!(msa.clone().with_ss_cons("((.))").is_err());
        assert!(msa.with_ss_cons("(..)").is_ok());
    }

    #[test]
    fn weights_length_is_checked() {
        let msa = rna(&["a", "b"], &["AC", "AG"]);
        assert!(msa.clone().with_weights(vec![1.0]).is_err());
        let msa = msa.with_weights(vec![0.5, -1.0]).unwrap();
        assert_eq!(msa.effective_weight(0), 0.5);
        assert_eq!(msa.effective_weight(1), 0.0);
    }

    #[test]
    fn reorder_moves_all_parallel_fields() {
        let mut msa = rna(&["a", "b", "c"], &["AAA", "CCC", "GGG"]).with_weights(vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(msa.seq_index("c").unwrap(), Some(2));
        msa.reorder(&[2, 0, 1]).unwrap();
        assert_eq!(msa.names(), &["c".to_string(), "a".to_string(), "b".to_string()]);
        assert_eq!(msa.weights(), &[3.0, 1.0, 2.0]);
        assert_eq!(msa.aligned_string(0).unwrap(), "GGG");
        assert_eq!(msa.seq_index("c").unwrap(), Some(0));
    }

    #[test]
    fn reorder_rejects_non_permutations() {
        let mut msa = rna(&["a", "b"], &["AA", "CC"]);
        assert!(msa.reorder(&[0, 0]).is_err());
        assert!(msa.reorder(&[0, 2]).is_err());
        assert!(msa.reorder(&[0]).is_err());
        assert_eq!(msa.names()[0], "a");
    }

    #[test]
    fn duplicate_names_fail_lookup() {
        let msa = rna(&["a", "a"], &["AA", "CC"]);
        assert!(msa.seq_index("a").is_err());
    }

    #[test]
    fn sequence_subset_keeps_weights() {
        let msa = rna(&["a", "b", "c"], &["AAA", "CCC", "GGG"]).with_weights(vec![1.0, 2.0, 3.0]).unwrap();
        let sub = msa.sequence_subset(&[true, false, true]).unwrap();
        assert_eq!(sub.nseq(), 2);
        assert_eq!(sub.weights(), &[1.0, 3.0]);
        assert_eq!(sub.seq_index("c").unwrap(), Some(1));
        assert!(msa.sequence_subset(&[false, false, false]).is_err());
    }

    #[test]
    fn column_subset_breaks_orphaned_pairs() {
        let mut msa = rna(&["a"], &["GACUC"]).with_ss_cons("<<.>>").unwrap();
        msa.column_subset(&[true, false, true, true, true]).unwrap();
        assert_eq!(msa.alen(), 4);
        assert_eq!(msa.ss_cons(), Some("<..>"));
        assert_eq!(msa.aligned_string(0).unwrap(), "GCUC");
    }

    #[test]
    fn unmatched_pseudoknot_letters_survive_column_removal() {
        let mut msa = rna(&["a", "b"], &["GA-UCA", "GC-ACU"]).with_ss_cons("(A..)b").unwrap();
        assert_eq!(structure::parse_structure("(A..)b", 6).unwrap().num_pairs(), 1);
        msa.remove_all_gap_columns(false).unwrap();
        assert_eq!(msa.alen(), 5);
        assert_eq!(msa.ss_cons(), Some("(A.)b"));
        assert_eq!(structure::parse_structure(msa.ss_cons().unwrap(), 5).unwrap().num_pairs(), 1);
    }

    #[test]
    fn remove_all_gap_columns_respects_rf() {
        let mut msa = rna(&["a", "b"], &["A-C-", "G-U~"]).with_rf("x.xx").unwrap();
        let mut plain = msa.clone();
        plain.remove_all_gap_columns(false).unwrap();
        assert_eq!(plain.alen(), 2);
        msa.remove_all_gap_columns(true).unwrap();
        assert_eq!(msa.alen(), 3);
        assert_eq!(msa.rf(), Some("xxx"));
    }

    #[test]
    fn text_alignment_classifies_letters() {
        let msa = Msa::from_text(vec!["a".into()], vec!["ac-G".into()]).unwrap();
        assert!(!msa.is_digital());
        assert_eq!(msa.seq_len(0).unwrap(), 3);
        assert!(msa.is_residue(0, 1).unwrap());
        assert!(!msa.is_residue(0, 3).unwrap());
    }

    #[test]
    fn digitize_twice_with_other_alphabet_fails() {
        let msa = rna(&["a"], &["ACGU"]);
        assert!(msa.clone().digitize(Alphabet::new(AlphabetKind::Rna)).is_ok());
        assert!(msa.digitize(Alphabet::new(AlphabetKind::Dna)).is_err());
    }
}
