//! # seedqc
//!
//! Quality-control statistics for RNA seed alignments.
//!
//! Given a digitized multiple sequence alignment, per-sequence weights and a
//! consensus secondary structure in WUSS notation, this crate computes
//!
//! - weighted residue composition and unaligned lengths;
//! - pairwise sequence identity (all pairs, or sampled for large alignments);
//! - canonical basepair counts per sequence and per consensus pair;
//! - a covariation statistic rewarding compensatory changes that keep a pair
//!   canonical and penalizing changes that break it;
//!
//! and assembles them into family, sequence and basepair records
//! ([`QcReport`]).
//!
//! ## Covariation
//! For a consensus pair `(p, q)` and sequences `i < j` with pair residues
//! `a_i:b_i` and `a_j:b_j`:
//!
//! ```text
//! d        = [a_i != a_j] + [b_i != b_j]
//! contrib  = +d·(w_i + w_j)   if both pairs are canonical
//!            -d·(w_i + w_j)   otherwise
//! ```
//!
//! The family score is the sum of all contributions over the sum of all
//! weights `w_i + w_j` that entered them.
//!
//! ### Example
//! ```
//! use seedqc::{Alphabet, AlphabetKind, Msa, QcReport};
//! let msa = Msa::digital(
//!     Alphabet::new(AlphabetKind::Rna),
//!     vec!["s1".into(), "s2".into(), "s3".into()],
//!     vec!["GGAAACC".into(), "AGAAACU".into(), "GCAAAGC".into()],
//! ).unwrap().with_ss_cons("<<...>>").unwrap();
//! let report = QcReport::compute(&msa).unwrap();
//! assert_eq!(report.family.nbp, 2);
//! assert!(report.family.mean_covariation > 0.0);
//! assert!((report.family.mean_canonical_fraction - 1.0).abs() < 1e-12);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub mod alphabet;
pub mod ambiguity;
pub mod basepair;
pub mod common;
pub mod composition;
pub mod consensus;
pub mod identity;
pub mod msa;
pub mod report;
pub mod structure;

pub use alphabet::{Alphabet, AlphabetKind, ResidueClass, TextClass};
pub use ambiguity::{dominant_two_letter_code, TwoLetterCode};
pub use basepair::{basepair_stats, bp_distance, is_canonical, BasepairRecord, BasepairStats};
pub use common::{parse_fasta, FastaRecord, Result, SeedQcError};
pub use composition::{compute_composition, Composition};
pub use consensus::{any_all_gap_columns, column_coverage, column_identity};
pub use identity::{all_pairs_identity, average_identity, pairwise_identity, PidStats};
pub use msa::{Msa, Residues};
pub use report::{BasepairRow, FamilyStats, QcReport, SequenceStats, UNNAMED_FAMILY};
pub use structure::{parse_structure, PartnerMap};
