//! CLI for `seedqc pid` (pairwise sequence identity).
use anyhow::{bail, Context, Result};
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;
use seedqc::*;

use crate::input::{load_alignment, AlignArgs};

#[derive(Debug, Args)]
pub struct PidCmd {
    #[command(flatten)]
    pub input: AlignArgs,
    /// First sequence of a single comparison.
    #[arg(long, requires="seq_b")]
    pub seq_a: Option<String>,
    /// Second sequence of a single comparison.
    #[arg(long, requires="seq_a")]
    pub seq_b: Option<String>,
    /// Sample at most this many squared pairs for the average identity.
    #[arg(long, default_value_t=100)]
    pub max_nseq: usize,
    /// RNG seed for sampling.
    #[arg(long, default_value_t=181)]
    pub seed: u64,
}

fn index_of(msa: &Msa, name: &str) -> Result<usize> {
    match msa.seq_index(name)? {
        Some(i) => Ok(i),
        None => bail!("no sequence named {}", name),
    }
}

pub fn run(cmd: PidCmd) -> Result<()> {
    let msa = load_alignment(&cmd.input)?;
    if let (Some(a), Some(b)) = (&cmd.seq_a, &cmd.seq_b) {
        let pid = pairwise_identity(&msa, index_of(&msa, a)?, index_of(&msa, b)?)?;
        println!("{}\t{}\t{:.4}", a, b, pid);
        return Ok(());
    }
    if msa.nseq() < 2 {
        bail!("pairwise identity needs at least 2 sequences, {} has {}", cmd.input.align.display(), msa.nseq());
    }
    let st = all_pairs_identity(&msa)?;
    let mut rng = StdRng::seed_from_u64(cmd.seed);
    let avg = average_identity(&msa, cmd.max_nseq, &mut rng).context("average identity")?;
    println!("pairs\tmean\tmin\tmax\taverage");
    println!("{}\t{:.4}\t{:.4}\t{:.4}\t{:.4}", st.npairs, st.mean, st.min, st.max, avg);
    Ok(())
}
