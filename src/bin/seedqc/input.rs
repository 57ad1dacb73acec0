//! Alignment, structure and weight loading shared by the subcommands.
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use seedqc::*;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum AlphabetArg {
    Rna,
    Dna,
}

impl From<AlphabetArg> for AlphabetKind {
    fn from(a: AlphabetArg) -> Self {
        match a {
            AlphabetArg::Rna => AlphabetKind::Rna,
            AlphabetArg::Dna => AlphabetKind::Dna,
        }
    }
}

/// Alignment input options common to every subcommand.
#[derive(Debug, Args)]
pub struct AlignArgs {
    /// Alignment file (gapped FASTA).
    #[arg(long, value_name="FILE")]
    pub align: PathBuf,
    /// Residue alphabet of the alignment.
    #[arg(long, value_enum, default_value_t=AlphabetArg::Rna)]
    pub alphabet: AlphabetArg,
}

pub fn read_text(path: &Path, what: &str) -> Result<String> {
    let mut s = String::new();
    File::open(path).with_context(|| format!("open {}: {}", what, path.display()))?.read_to_string(&mut s)?;
    Ok(s)
}

/// Read and digitize the alignment named by `args`.
pub fn load_alignment(args: &AlignArgs) -> Result<Msa> {
    let text = read_text(&args.align, "alignment")?;
    let recs = parse_fasta(&text);
    if recs.is_empty() { bail!("no sequences in {}", args.align.display()); }
    let msa = Msa::from_fasta(&recs)
        .with_context(|| format!("alignment {}", args.align.display()))?
        .digitize(Alphabet::new(args.alphabet.into()))
        .with_context(|| format!("digitize {}", args.align.display()))?;
    log::info!("read {} sequences of {} columns from {}", msa.nseq(), msa.alen(), args.align.display());
    Ok(msa)
}

/// Consensus structure from a literal or from the first non-empty line of a
/// file.
pub fn load_ss_cons(literal: Option<&str>, file: Option<&Path>) -> Result<Option<String>> {
    if let Some(ss) = literal { return Ok(Some(ss.trim().to_string())); }
    let Some(path) = file else { return Ok(None); };
    let text = read_text(path, "consensus structure")?;
    let line = text.lines().map(str::trim).find(|l| !l.is_empty() && !l.starts_with('#'));
    match line {
        Some(l) => Ok(Some(l.to_string())),
        None => bail!("no consensus structure in {}", path.display()),
    }
}

/// Weights as `name<TAB>weight` rows, reordered to match `msa`. Every
/// sequence of the alignment must be listed.
pub fn load_weights(path: &Path, msa: &Msa) -> Result<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .from_path(path)
        .with_context(|| format!("open weights: {}", path.display()))?;
    let mut by_name: HashMap<String, f64> = HashMap::new();
    for rec in rdr.records() {
        let rec = rec.with_context(|| format!("read weights: {}", path.display()))?;
        let (Some(name), Some(w)) = (rec.get(0), rec.get(1)) else {
            bail!("weights row needs a name and a weight: {:?}", rec);
        };
        let w: f64 = w.trim().parse().with_context(|| format!("weight of {}: {:?}", name, w))?;
        by_name.insert(name.trim().to_string(), w);
    }
    msa.names()
        .iter()
        .map(|n| by_name.get(n).copied().with_context(|| format!("no weight for sequence {} in {}", n, path.display())))
        .collect()
}
