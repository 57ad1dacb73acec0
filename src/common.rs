//! Common helpers shared by the analytics modules: the crate error type,
//! fallible allocation of working arrays, and a minimal gapped-FASTA reader
//! used by the command-line front end.
//!
//! ## Errors
//! Every public operation returns [`Result`]. A [`SeedQcError`] always aborts
//! the whole call; no partial statistics are returned.
//!
//! ## FASTA
//! The reader is intentionally permissive and suitable for seed-sized
//! alignments. It supports multi-record inputs and keeps gap symbols as-is
//! (conversion to uppercase only).
//!
//! ## Examples
//! ```rust,no_run
//! use seedqc::parse_fasta;
//! let recs = parse_fasta(r#">seq
//! AC-GU
//! >p
//! ACAGU
//! "#);
//! assert_eq!(recs.len(), 2);
//! assert_eq!(recs[0].seq, "AC-GU");
//! ```
//!

/// Errors that can be returned by the algorithms in this crate.
#[derive(thiserror::Error, Debug)]
pub enum SeedQcError {
    /// A caller precondition was violated (text-mode alignment where codes are
    /// required, sequence index out of range, too few sequences, ...).
    #[error("contract violation: {0}")]
    Contract(String),
    /// The consensus secondary structure could not be turned into pairs.
    #[error("consensus structure is inconsistent: {0}")]
    Structure(String),
    /// A working array could not be allocated.
    #[error("out of memory allocating {what} ({len} elements)")]
    Memory { what: &'static str, len: usize },
    /// Returned when sequence input is empty or otherwise invalid.
    #[error("invalid sequence input: {0}")]
    InvalidSequence(String),
}

impl SeedQcError {
    pub(crate) fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        Self::Structure(msg.into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SeedQcError>;

/// Allocate a vector of `len` copies of `value`, reporting allocation failure
/// as [`SeedQcError::Memory`] instead of aborting the process.
pub(crate) fn try_filled<T: Clone>(what: &'static str, len: usize, value: T) -> Result<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len).map_err(|_| SeedQcError::Memory { what, len })?;
    v.resize(len, value);
    Ok(v)
}

/// A single FASTA record (identifier and uppercase, possibly gapped, row).
#[derive(Clone, Debug)]
pub struct FastaRecord {
    /// Identifier from the FASTA header (text after '>').
    pub id: String,
    /// Raw row (uppercase). Gap and ambiguity symbols are kept as-is.
    pub seq: String,
}

/// Parse a minimal FASTA string into a vector of [`FastaRecord`].
///
/// *Lines starting with `>` start a new record.* All other lines are appended
/// (without surrounding whitespace) to the current row. Rows are uppercased.
///
/// ## Examples
/// ```rust,no_run
/// use seedqc::parse_fasta;
/// let recs = parse_fasta(">id\nAC\nG-\n");
/// assert_eq!(recs[0].id, "id");
/// assert_eq!(recs[0].seq, "ACG-");
/// ```
pub fn parse_fasta(text: &str) -> Vec<FastaRecord> {
    let mut out: Vec<FastaRecord> = vec![];
    let mut id = String::new();
    let mut seq = String::new();
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix('>') {
            if !id.is_empty() { out.push(FastaRecord{ id: id.clone(), seq: seq.to_ascii_uppercase() }); seq.clear(); }
            id = rest.trim().split_whitespace().next().unwrap_or("").to_string();
        } else {
            seq.push_str(line.trim());
        }
    }
    if !id.is_empty() { out.push(FastaRecord{ id, seq: seq.to_ascii_uppercase() }); }
    out
}
