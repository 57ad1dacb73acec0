//! Consensus secondary structure parsing (WUSS notation).
//!
//! [`parse_structure`] turns a consensus structure line into a 1-based
//! [`PartnerMap`]. Pseudoknots are removed on the way:
//!
//! 1. Letter pairs (`A…a`, `B…b`, …) are WUSS pseudoknot annotation and are
//!    read as unpaired columns.
//! 2. The bracket classes `()`, `<>`, `[]` and `{}` are matched, each on its
//!    own stack. An unmatched bracket is a [`SeedQcError::Structure`].
//! 3. The matched pairs are visited left to right by opening column; a pair
//!    is kept only if it crosses none of the pairs kept before it.
//!
//! The result is properly nested: no two retained pairs `(p1,q1)`,
//! `(p2,q2)` satisfy `p1 < p2 < q1 < q2`.
//!
//! ### Example
//! ```
//! use seedqc::parse_structure;
//! let ct = parse_structure("<<..AA..>>..aa", 14).unwrap();
//! assert_eq!(ct.partner(1), Some(10));
//! assert_eq!(ct.partner(5), None);
//! assert_eq!(ct.num_pairs(), 2);
//! ```

use crate::common::{try_filled, Result, SeedQcError};

/// Base-pair partners of every column, 1-based; `0` marks an unpaired column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartnerMap {
    // index 0 is unused so that partner[p] is column p's partner
    partner: Vec<usize>,
}

impl PartnerMap {
    /// An all-unpaired map over `alen` columns.
    pub fn unpaired(alen: usize) -> Result<Self> {
        Ok(Self { partner: try_filled("partner map", alen + 1, 0usize)? })
    }

    fn from_pairs(alen: usize, pairs: &[(usize, usize)]) -> Result<Self> {
        let mut map = Self::unpaired(alen)?;
        for &(i, j) in pairs {
            map.partner[i + 1] = j + 1;
            map.partner[j + 1] = i + 1;
        }
        Ok(map)
    }

    /// Number of columns.
    pub fn len(&self) -> usize { self.partner.len() - 1 }

    /// Whether the map covers no columns.
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Partner of 1-based column `p`, if paired.
    pub fn partner(&self, p: usize) -> Option<usize> {
        match self.partner.get(p) {
            Some(&q) if p > 0 && q > 0 => Some(q),
            _ => None,
        }
    }

    /// The raw partner array, `[0..=L]` with index 0 unused.
    pub fn as_slice(&self) -> &[usize] { &self.partner }

    /// Pairs `(p, q)` with `p < q`, ordered by `p`.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.partner.iter().enumerate().skip(1).filter(|&(p, &q)| q > p).map(|(p, &q)| (p, q))
    }

    /// Number of basepairs.
    pub fn num_pairs(&self) -> usize { self.pairs().count() }

    /// Render as `(`/`)`/`.` notation.
    pub fn to_dot_bracket(&self) -> String {
        let mut out = vec!['.'; self.len()];
        for (p, q) in self.pairs() {
            out[p - 1] = '(';
            out[q - 1] = ')';
        }
        out.into_iter().collect()
    }
}

/// Parse a WUSS consensus structure of `alen` columns into a nested
/// [`PartnerMap`], dropping pseudoknotted pairs.
pub fn parse_structure(ss: &str, alen: usize) -> Result<PartnerMap> {
    if ss.len() != alen {
        return Err(SeedQcError::contract(format!("structure has length {}, alignment has {} columns", ss.len(), alen)));
    }
    let pairs = bracket_pairs(ss.as_bytes(), false)?;
    let total = pairs.len();
    let kept = deknot(pairs);
    if kept.len() < total {
        log::debug!("dropped {} crossing bracket pair(s) of {}", total - kept.len(), total);
    }
    PartnerMap::from_pairs(alen, &kept)
}

/// All bracket pairs of a WUSS line, 0-based and sorted by opening column.
///
/// With `with_letters`, letter pseudoknot pairs are matched too; a letter
/// without a partner counts as unpaired. Otherwise all letters count as
/// unpaired. Brackets must always balance.
pub(crate) fn bracket_pairs(ss: &[u8], with_letters: bool) -> Result<Vec<(usize, usize)>> {
    // one stack per bracket class, then one per letter
    let mut stacks: Vec<Vec<usize>> = vec![Vec::new(); 4 + 26];
    let mut pairs = Vec::new();
    for (pos, &ch) in ss.iter().enumerate() {
        match ch {
            b'(' | b'<' | b'[' | b'{' => stacks[bracket_class(ch)].push(pos),
            b')' | b'>' | b']' | b'}' => {
                let open = stacks[bracket_class(ch)].pop().ok_or_else(|| {
                    SeedQcError::structure(format!("unmatched '{}' at column {}", ch as char, pos + 1))
                })?;
                pairs.push((open, pos));
            }
            b'A'..=b'Z' if with_letters => stacks[4 + (ch - b'A') as usize].push(pos),
            b'a'..=b'z' if with_letters => {
                if let Some(open) = stacks[4 + (ch - b'a') as usize].pop() {
                    pairs.push((open, pos));
                }
            }
            b'A'..=b'Z' | b'a'..=b'z' => {}
            b'.' | b',' | b':' | b'_' | b'-' | b'~' => {}
            other => {
                return Err(SeedQcError::structure(format!("invalid character '{}' at column {}", other as char, pos + 1)));
            }
        }
    }
    if let Some(open) = stacks[..4].iter().flatten().min() {
        return Err(SeedQcError::structure(format!("unmatched '{}' at column {}", ss[*open] as char, open + 1)));
    }
    pairs.sort_unstable();
    Ok(pairs)
}

fn bracket_class(ch: u8) -> usize {
    match ch {
        b'(' | b')' => 0,
        b'<' | b'>' => 1,
        b'[' | b']' => 2,
        _ => 3,
    }
}

/// Leftmost-first greedy removal of crossing pairs. `pairs` must be sorted by
/// opening column.
fn deknot(pairs: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    let mut kept: Vec<(usize, usize)> = Vec::with_capacity(pairs.len());
    for (i, j) in pairs {
        // kept pairs all open before i
        if kept.iter().all(|&(a, b)| !(a < i && i < b && b < j)) {
            kept.push((i, j));
        }
    }
    kept
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn wuss_line(max_len: usize) -> impl Strategy<Value = String> {
        proptest::collection::vec(
            prop_oneof![Just('('), Just(')'), Just('<'), Just('>'), Just('['), Just(']'), Just('.'), Just('A'), Just('a')],
            0..=max_len,
        ).prop_map(|v| v.into_iter().collect())
    }

    proptest! {
        #[test]
        fn retained_pairs_never_cross(ss in wuss_line(60)) {
            if let Ok(ct) = parse_structure(&ss, ss.len()) {
                let pairs: Vec<_> = ct.pairs().collect();
                for &(p1, q1) in &pairs {
                    prop_assert_ne!(p1, q1);
                    prop_assert_eq!(ct.partner(q1), Some(p1));
                    for &(p2, q2) in &pairs {
                        prop_assert!(!(p1 < p2 && p2 < q1 && q1 < q2));
                    }
                }
            }
        }
    }
}
