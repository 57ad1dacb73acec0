//! Dominant two-letter ambiguity code of a nucleotide composition.
//!
//! Of the six IUPAC codes that name exactly two bases, picks the one whose
//! two bases together make up the largest share of `A+C+G+U`.
//!
//! ### Example
//! ```rust
//! use seedqc::dominant_two_letter_code;
//! let code = dominant_two_letter_code(1.0, 4.0, 4.0, 1.0).unwrap();
//! assert_eq!(code.code, 'S');
//! assert!((code.fraction - 0.8).abs() < 1e-12);
//! ```

/// A two-base ambiguity code and the fraction of the composition it covers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TwoLetterCode {
    /// One of `M R W S Y K`.
    pub code: char,
    /// Combined fraction of the two bases, in `[0, 1]`.
    pub fraction: f64,
}

/// Return the two-letter code with the largest combined fraction.
///
/// Candidates are tried in the order M (A+C), R (A+G), W (A+U), S (C+G),
/// Y (C+U), K (G+U); a later one replaces the current best only if strictly
/// larger, so ties go to the earlier code. `None` if `a+c+g+u` is not
/// positive.
pub fn dominant_two_letter_code(a: f64, c: f64, g: f64, u: f64) -> Option<TwoLetterCode> {
    let total = a + c + g + u;
    if total.is_nan() || total <= 0.0 { return None; }
    let candidates = [
        ('M', a + c),
        ('R', a + g),
        ('W', a + u),
        ('S', c + g),
        ('Y', c + u),
        ('K', g + u),
    ];
    let mut best = TwoLetterCode { code: candidates[0].0, fraction: candidates[0].1 / total };
    for &(code, sum) in &candidates[1..] {
        let fraction = sum / total;
        if fraction > best.fraction {
            best = TwoLetterCode { code, fraction };
        }
    }
    Some(best)
}
