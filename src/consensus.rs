//! Per-column summaries of an alignment.
//!
//! - [`column_identity`]: marks columns where every sequence agrees.
//! - [`column_coverage`]: fraction of sequences with a canonical residue.
//! - [`any_all_gap_columns`]: whether some column carries no residue at all.
//!
use crate::common::{try_filled, Result, SeedQcError};
use crate::msa::{Msa, Residues};

/// Identity line over all columns. A column where every sequence carries the
/// same code is written as that symbol (with `use_res`) or as `*`; any other
/// column as `.`. Gaps count as residues here, so a column that is all `A`
/// except for one gap is not identical. Text rows compare case-insensitively
/// and report the uppercase symbol.
///
/// An alignment without sequences yields an all-`.` line.
pub fn column_identity(msa: &Msa, use_res: bool) -> String {
    let rows = msa.rows();
    let mut out = String::with_capacity(msa.alen());
    for c in 0..msa.alen() {
        let first = match rows.first() {
            Some(r) => r[c],
            None => { out.push('.'); continue; }
        };
        let ch = match msa.residues() {
            Residues::Digital { abc, .. } => {
                if rows.iter().all(|r| r[c] == first) { Some(abc.symbol(first)) } else { None }
            }
            Residues::Text { .. } => {
                let up = first.to_ascii_uppercase();
                if rows.iter().all(|r| r[c].to_ascii_uppercase() == up) { Some(up as char) } else { None }
            }
        };
        out.push(match ch {
            Some(sym) if use_res => sym,
            Some(_) => '*',
            None => '.',
        });
    }
    out
}

/// Fraction of sequences holding a canonical residue in each column (0-based
/// index into the result). Degenerate residues do not count as covered.
pub fn column_coverage(msa: &Msa) -> Result<Vec<f64>> {
    let (abc, rows) = msa.require_digital("column coverage")?;
    let n = msa.nseq();
    if n == 0 {
        return Err(SeedQcError::contract("column coverage of an alignment without sequences"));
    }
    let mut covered = try_filled("column coverage", msa.alen(), 0usize)?;
    for row in rows {
        for (c, &x) in row.iter().enumerate() {
            if x < abc.k() { covered[c] += 1; }
        }
    }
    Ok(covered.into_iter().map(|k| k as f64 / n as f64).collect())
}

/// Whether any column is gap or missing data in every sequence.
pub fn any_all_gap_columns(msa: &Msa) -> bool {
    (1..=msa.alen()).any(|c| msa.is_all_gap_column(c))
}
