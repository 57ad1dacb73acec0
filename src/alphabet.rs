//! Digital alphabets and residue classification.
//!
//! Residues are small integer codes laid out the same way for every
//! alphabet:
//!
//! ```text
//! 0 .. K-1      canonical residues (A C G U for RNA)
//! K             gap
//! K+1 .. Kp-3   degenerate / ambiguity codes (R Y M K S W ... for RNA)
//! Kp-2          non-residue '*'
//! Kp-1          missing data '~'
//! ```
//!
//! The canonical-basepair table relies on this layout for the RNA and DNA
//! alphabets (`A=0 C=1 G=2 U=3`, `R=5 Y=6 M=7 K=8 S=9 W=10`).
//!
//! [`ResidueClass`] is the classification capability every analytic is
//! written against, so the same code serves digital and text alignments.
//!
//! ### Example
//! ```
//! use seedqc::{Alphabet, AlphabetKind, ResidueClass};
//! let abc = Alphabet::new(AlphabetKind::Rna);
//! let codes = abc.digitize("ac-gtN").unwrap();
//! assert_eq!(codes, vec![0, 1, 4, 2, 3, 15]);
//! assert!(abc.is_degenerate(15));
//! ```

use crate::common::{Result, SeedQcError};

/// Which digital alphabet an alignment uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlphabetKind {
    Rna,
    Dna,
    Amino,
}

/// Residue classification shared by digital and text alignments.
pub trait ResidueClass {
    /// Gap symbol (`-`).
    fn is_gap(&self, x: u8) -> bool;
    /// Missing data (`~`).
    fn is_missing(&self, x: u8) -> bool;
    /// Canonical or degenerate residue; not gap, missing or `*`.
    fn is_residue(&self, x: u8) -> bool;
    /// One of the K canonical residues.
    fn is_canonical(&self, x: u8) -> bool;
    /// Ambiguity code.
    fn is_degenerate(&self, x: u8) -> bool;
    /// Whether two symbols denote the same residue.
    fn same_residue(&self, a: u8, b: u8) -> bool {
        a == b
    }
}

/// An Easel-style digital alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alphabet {
    kind: AlphabetKind,
    sym: &'static [u8],
    k: u8,
}

const RNA_SYM: &[u8] = b"ACGU-RYMKSWHBVDN*~";
const DNA_SYM: &[u8] = b"ACGT-RYMKSWHBVDN*~";
const AMINO_SYM: &[u8] = b"ACDEFGHIKLMNPQRSTVWY-BJZOUX*~";

impl Alphabet {
    /// Alphabet of the given kind.
    pub fn new(kind: AlphabetKind) -> Self {
        match kind {
            AlphabetKind::Rna => Self { kind, sym: RNA_SYM, k: 4 },
            AlphabetKind::Dna => Self { kind, sym: DNA_SYM, k: 4 },
            AlphabetKind::Amino => Self { kind, sym: AMINO_SYM, k: 20 },
        }
    }

    /// Which alphabet this is.
    pub fn kind(&self) -> AlphabetKind { self.kind }

    /// Number of canonical residues (K). Also the gap code.
    pub fn k(&self) -> u8 { self.k }

    /// Total number of codes (Kp).
    pub fn kp(&self) -> u8 { self.sym.len() as u8 }

    /// Code of the gap symbol `-`.
    pub fn gap_code(&self) -> u8 { self.k }

    /// Code of missing data `~`.
    pub fn missing_code(&self) -> u8 { self.kp() - 1 }

    /// Code of the non-residue `*`.
    pub fn nonresidue_code(&self) -> u8 { self.kp() - 2 }

    /// RNA or DNA.
    pub fn is_nucleic(&self) -> bool {
        matches!(self.kind, AlphabetKind::Rna | AlphabetKind::Dna)
    }

    /// Display symbol for a code (`?` if out of range).
    pub fn symbol(&self, x: u8) -> char {
        self.sym.get(x as usize).map(|&b| b as char).unwrap_or('?')
    }

    /// Digital code for a text symbol, if the alphabet knows it.
    pub fn encode(&self, ch: u8) -> Option<u8> {
        let u = ch.to_ascii_uppercase();
        let u = match (self.kind, u) {
            (_, b'_') | (_, b'.') => b'-',
            (AlphabetKind::Rna, b'T') => b'U',
            (AlphabetKind::Dna, b'U') => b'T',
            (AlphabetKind::Rna, b'X') | (AlphabetKind::Dna, b'X') => b'N',
            (_, other) => other,
        };
        self.sym.iter().position(|&s| s == u).map(|p| p as u8)
    }

    /// Convert a text row into digital codes.
    pub fn digitize(&self, text: &str) -> Result<Vec<u8>> {
        text.bytes()
            .enumerate()
            .map(|(i, b)| self.encode(b).ok_or_else(|| {
                SeedQcError::InvalidSequence(format!("symbol '{}' at position {} is not in the {:?} alphabet", b as char, i + 1, self.kind))
            }))
            .collect()
    }

    /// Render digital codes back to text.
    pub fn textize(&self, codes: &[u8]) -> String {
        codes.iter().map(|&x| self.symbol(x)).collect()
    }
}

impl ResidueClass for Alphabet {
    fn is_gap(&self, x: u8) -> bool { x == self.k }
    fn is_missing(&self, x: u8) -> bool { x == self.missing_code() }
    fn is_residue(&self, x: u8) -> bool { x < self.k || (x > self.k && x < self.nonresidue_code()) }
    fn is_canonical(&self, x: u8) -> bool { x < self.k }
    fn is_degenerate(&self, x: u8) -> bool { x > self.k && x < self.nonresidue_code() }
}

/// Classification for text rows: any ASCII letter is a residue, `-_.~` are
/// gaps, comparisons ignore case.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextClass;

impl ResidueClass for TextClass {
    fn is_gap(&self, x: u8) -> bool { matches!(x, b'-' | b'_' | b'.') }
    fn is_missing(&self, x: u8) -> bool { x == b'~' }
    fn is_residue(&self, x: u8) -> bool { x.is_ascii_alphabetic() }
    fn is_canonical(&self, x: u8) -> bool { x.is_ascii_alphabetic() }
    fn is_degenerate(&self, _x: u8) -> bool { false }
    fn same_residue(&self, a: u8, b: u8) -> bool { a.eq_ignore_ascii_case(&b) }
}
