//! CLI for `seedqc info` (alignment summary and column annotations).
use std::path::PathBuf;
use anyhow::{Context, Result};
use clap::Args;
use seedqc::*;

use crate::input::{load_alignment, AlignArgs};

#[derive(Debug, Args)]
pub struct InfoCmd {
    #[command(flatten)]
    pub input: AlignArgs,
    /// Write per-column coverage (TSV) here.
    #[arg(long, value_name="FILE")]
    pub coverage: Option<PathBuf>,
    /// Print the column identity line.
    #[arg(long)]
    pub identity: bool,
    /// In the identity line, print the conserved residue instead of `*`.
    #[arg(long, requires="identity")]
    pub use_res: bool,
    /// Drop all-gap columns before summarizing.
    #[arg(long)]
    pub remove_gap_columns: bool,
}

pub fn run(cmd: InfoCmd) -> Result<()> {
    let mut msa = load_alignment(&cmd.input)?;
    if cmd.remove_gap_columns {
        msa.remove_all_gap_columns(false).context("remove all-gap columns")?;
    }
    println!("nseq\t{}", msa.nseq());
    println!("alen\t{}", msa.alen());
    println!("residues\t{}", msa.count_residues());
    println!("avg_len\t{:.2}", msa.average_seq_len()?);
    println!("all_gap_columns\t{}", if any_all_gap_columns(&msa) { "yes" } else { "no" });

    if cmd.identity {
        println!("identity\t{}", column_identity(&msa, cmd.use_res));
    }
    if let Some(path) = &cmd.coverage {
        let cov = column_coverage(&msa)?;
        let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(path).with_context(|| format!("create {}", path.display()))?;
        w.write_record(["column", "coverage"])?;
        for (c, f) in cov.iter().enumerate() {
            w.write_record([(c + 1).to_string(), format!("{:.4}", f)])?;
        }
        w.flush()?;
    }
    Ok(())
}
