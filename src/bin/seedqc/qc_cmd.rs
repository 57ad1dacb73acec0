//! CLI for `seedqc qc` (family, sequence and basepair QC tables).
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use seedqc::*;

use crate::input::{load_alignment, load_ss_cons, load_weights, AlignArgs};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width columns with a header line.
    Legacy,
    /// Tab-separated values.
    Tsv,
}

#[derive(Debug, Args)]
pub struct QcCmd {
    #[command(flatten)]
    pub input: AlignArgs,
    /// Consensus structure (WUSS), one character per column.
    #[arg(long, value_name="SS", conflicts_with="ss_cons_file")]
    pub ss_cons: Option<String>,
    /// File whose first non-comment line is the consensus structure.
    #[arg(long, value_name="FILE")]
    pub ss_cons_file: Option<PathBuf>,
    /// Sequence weights, `name<TAB>weight` per line. Default: all 1.0.
    #[arg(long, value_name="FILE")]
    pub weights: Option<PathBuf>,
    /// Family name. Default: alignment file stem.
    #[arg(long)]
    pub name: Option<String>,
    /// Output table format.
    #[arg(long, value_enum, default_value_t=OutputFormat::Legacy)]
    pub format: OutputFormat,
    /// Per-family output.
    #[arg(long, default_value="seedqc.fam")]
    pub fam_out: PathBuf,
    /// Per-sequence output.
    #[arg(long, default_value="seedqc.seq")]
    pub seq_out: PathBuf,
    /// Per-basepair output.
    #[arg(long, default_value="seedqc.bp")]
    pub bp_out: PathBuf,
}

pub fn run(cmd: QcCmd) -> Result<()> {
    let mut msa = load_alignment(&cmd.input)?;
    if let Some(ss) = load_ss_cons(cmd.ss_cons.as_deref(), cmd.ss_cons_file.as_deref())? {
        msa = msa.with_ss_cons(ss).context("consensus structure")?;
    }
    if let Some(path) = &cmd.weights {
        let w = load_weights(path, &msa)?;
        msa = msa.with_weights(w).context("sequence weights")?;
    }
    let name = cmd.name.clone().unwrap_or_else(|| {
        cmd.input.align.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_else(|| UNNAMED_FAMILY.to_string())
    });
    msa.set_name(name);

    let report = QcReport::compute(&msa)?;
    match cmd.format {
        OutputFormat::Legacy => write_legacy(&report, &cmd.fam_out, &cmd.seq_out, &cmd.bp_out)?,
        OutputFormat::Tsv => write_tsv(&report, &cmd.fam_out, &cmd.seq_out, &cmd.bp_out)?,
    }
    log::info!("{}: wrote {}, {}, {}", report.family.name, cmd.fam_out.display(), cmd.seq_out.display(), cmd.bp_out.display());
    Ok(())
}

const FAM_COLUMNS: [&str; 20] = [
    "FAMILY", "MEAN_FRACTN_CANONICAL_BPs", "COVARIATION", "NO_SEQs", "ALN_LENGTH", "NO_BPs", "NO_NUCs",
    "mean_PID", "max_PID", "min_PID", "mean_LEN", "max_LEN", "min_LEN", "FRACTN_NUCs",
    "FRAC_A", "FRAC_C", "FRAC_G", "FRAC_U", "MAX_DINUC", "CG_CONTENT",
];
const SEQ_COLUMNS: [&str; 10] = [
    "FAMILY", "SEQID", "FRACTN_CANONICAL_BPs", "LEN", "FRAC_A", "FRAC_C", "FRAC_G", "FRAC_U", "MAX_DINUC", "CG_CONTENT",
];
const BP_COLUMNS: [&str; 4] = ["FAMILY", "BP_COORDS", "FRACTN_CANONICAL_BPs", "COVARIATION"];

fn create(path: &Path) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path).with_context(|| format!("create {}", path.display()))?))
}

fn dinuc(code: Option<TwoLetterCode>) -> (char, f64) {
    code.map(|c| (c.code, c.fraction)).unwrap_or(('-', 0.0))
}

fn fam_header() -> String {
    let c = &FAM_COLUMNS;
    format!(
        "{:<20}  {:>25}  {:>11}  {:>7}  {:>10}  {:>6}  {:>7}  {:>8}  {:>7}  {:>7}  {:>8}  {:>7}  {:>7}  {:>11}  {:>6}  {:>6}  {:>6}  {:>6}  {:>9}  {:>10}",
        c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7], c[8], c[9], c[10], c[11], c[12], c[13], c[14], c[15], c[16], c[17], c[18], c[19]
    )
}

fn fam_line(f: &FamilyStats) -> String {
    let pid = |v: Option<f64>, w: usize| v.map(|x| format!("{:>w$.3}", x, w = w)).unwrap_or_else(|| format!("{:>w$}", "-", w = w));
    let (code, frac) = dinuc(f.two_letter);
    format!(
        "{:<20}  {:>25.5}  {:>11.5}  {:>7}  {:>10}  {:>6}  {:>7}  {}  {}  {}  {:>8.3}  {:>7}  {:>7}  {:>11.3}  {:>6.3}  {:>6.3}  {:>6.3}  {:>6.3}  {}:{:<7.3}  {:>10.3}",
        f.name, f.mean_canonical_fraction, f.mean_covariation, f.nseq, f.alen, f.nbp, f.total_len,
        pid(f.pid.map(|p| p.mean), 8), pid(f.pid.map(|p| p.max), 7), pid(f.pid.map(|p| p.min), 7),
        f.mean_len, f.max_len, f.min_len, f.residue_fraction,
        f.base_fractions[0], f.base_fractions[1], f.base_fractions[2], f.base_fractions[3],
        code, frac, f.cg_content,
    )
}

fn seq_header() -> String {
    let c = &SEQ_COLUMNS;
    format!(
        "{:<20}  {:<30}  {:>20}  {:>5}  {:>6}  {:>6}  {:>6}  {:>6}  {:>9}  {:>10}",
        c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7], c[8], c[9]
    )
}

fn seq_line(s: &SequenceStats) -> String {
    let (code, frac) = dinuc(s.two_letter);
    format!(
        "{:<20}  {:<30}  {:>20.5}  {:>5}  {:>6.3}  {:>6.3}  {:>6.3}  {:>6.3}  {}:{:<7.3}  {:>10.3}",
        s.family, s.name, s.canonical_fraction, s.len,
        s.base_fractions[0], s.base_fractions[1], s.base_fractions[2], s.base_fractions[3],
        code, frac, s.cg_content,
    )
}

fn bp_header() -> String {
    let c = &BP_COLUMNS;
    format!("{:<20}  {:>11}  {:>20}  {:>11}", c[0], c[1], c[2], c[3])
}

fn bp_line(b: &BasepairRow) -> String {
    format!("{:<20}  {:>5}:{:<5}  {:>20.4}  {:>11.4}", b.family, b.left, b.right, b.canonical_fraction, b.covariation)
}

fn write_legacy(report: &QcReport, fam: &Path, seq: &Path, bp: &Path) -> Result<()> {
    let mut w = create(fam)?;
    writeln!(w, "{}", fam_header())?;
    writeln!(w, "{}", fam_line(&report.family))?;
    w.flush()?;

    let mut w = create(seq)?;
    writeln!(w, "{}", seq_header())?;
    for s in &report.sequences { writeln!(w, "{}", seq_line(s))?; }
    w.flush()?;

    let mut w = create(bp)?;
    writeln!(w, "{}", bp_header())?;
    for b in &report.basepairs { writeln!(w, "{}", bp_line(b))?; }
    w.flush()?;
    Ok(())
}

fn write_tsv(report: &QcReport, fam: &Path, seq: &Path, bp: &Path) -> Result<()> {
    let f = &report.family;
    let (code, frac) = dinuc(f.two_letter);
    let pid = |v: Option<f64>| v.map(|x| format!("{:.3}", x)).unwrap_or_default();
    let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(fam).with_context(|| format!("create {}", fam.display()))?;
    w.write_record(FAM_COLUMNS)?;
    w.write_record([
        f.name.clone(),
        format!("{:.5}", f.mean_canonical_fraction),
        format!("{:.5}", f.mean_covariation),
        f.nseq.to_string(),
        f.alen.to_string(),
        f.nbp.to_string(),
        f.total_len.to_string(),
        pid(f.pid.map(|p| p.mean)),
        pid(f.pid.map(|p| p.max)),
        pid(f.pid.map(|p| p.min)),
        format!("{:.3}", f.mean_len),
        f.max_len.to_string(),
        f.min_len.to_string(),
        format!("{:.3}", f.residue_fraction),
        format!("{:.3}", f.base_fractions[0]),
        format!("{:.3}", f.base_fractions[1]),
        format!("{:.3}", f.base_fractions[2]),
        format!("{:.3}", f.base_fractions[3]),
        format!("{}:{:.3}", code, frac),
        format!("{:.3}", f.cg_content),
    ])?;
    w.flush()?;

    let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(seq).with_context(|| format!("create {}", seq.display()))?;
    w.write_record(SEQ_COLUMNS)?;
    for s in &report.sequences {
        let (code, frac) = dinuc(s.two_letter);
        w.write_record([
            s.family.clone(),
            s.name.clone(),
            format!("{:.5}", s.canonical_fraction),
            s.len.to_string(),
            format!("{:.3}", s.base_fractions[0]),
            format!("{:.3}", s.base_fractions[1]),
            format!("{:.3}", s.base_fractions[2]),
            format!("{:.3}", s.base_fractions[3]),
            format!("{}:{:.3}", code, frac),
            format!("{:.3}", s.cg_content),
        ])?;
    }
    w.flush()?;

    let mut w = csv::WriterBuilder::new().delimiter(b'\t').from_path(bp).with_context(|| format!("create {}", bp.display()))?;
    w.write_record(BP_COLUMNS)?;
    for b in &report.basepairs {
        w.write_record([
            b.family.clone(),
            format!("{}:{}", b.left, b.right),
            format!("{:.4}", b.canonical_fraction),
            format!("{:.4}", b.covariation),
        ])?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> QcReport {
        let mut msa = Msa::digital(Alphabet::new(AlphabetKind::Rna),
            vec!["a".into(), "b".into()], vec!["GAAC".into(), "AAAU".into()])
            .unwrap().with_ss_cons("(..)").unwrap();
        msa.set_name("fam");
        QcReport::compute(&msa).unwrap()
    }

    #[test]
    fn basepair_line_layout() {
        let r = report();
        assert_eq!(bp_line(&r.basepairs[0]), format!("{:<20}  {:>5}:{:<5}  {:>20}  {:>11}", "fam", 1, 4, "1.0000", "2.0000"));
        assert_eq!(bp_header().len(), bp_line(&r.basepairs[0]).len());
    }

    #[test]
    fn sequence_line_layout() {
        let r = report();
        let line = seq_line(&r.sequences[1]);
        assert!(line.starts_with(&format!("{:<20}  {:<30}  ", "fam", "b")));
        assert!(line.contains("W:1.000  "));
        assert_eq!(seq_header().len(), line.len());
    }

    #[test]
    fn family_line_columns_line_up() {
        let r = report();
        let line = fam_line(&r.family);
        assert_eq!(fam_header().len(), line.len());
        assert!(line.contains("M:0.750  "));
        let fields: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(fields.len(), 20);
        assert_eq!(fields[2], "2.00000");
    }

    #[test]
    fn missing_pid_keeps_width() {
        let mut r = report();
        r.family.pid = None;
        assert_eq!(fam_header().len(), fam_line(&r.family).len());
    }
}
