use anc_enrichment::{
    assemble, output, significance, tsv_reader,
    types::{AlleleRecord, EnrichmentResult, NonFinitePolicy},
};
use anyhow::Result;
use clap::{error::ErrorKind, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "anc-enrichment")]
#[command(version)]
#[command(about = "Chi-squared ancestry enrichment with BH-corrected q-values and source contribution scores", long_about = None)]
struct Args {
    /// Observed DOG alternate-allele counts (chrom, pos, count; no header)
    #[arg(value_name = "OBS_DOG_ALT", required_unless_present = "summarize")]
    obs_dog_alt: Option<PathBuf>,

    /// Observed NEGW alternate-allele counts
    #[arg(value_name = "OBS_NEGW_ALT", required_unless_present = "summarize")]
    obs_negw_alt: Option<PathBuf>,

    /// Expected reference-allele counts
    #[arg(value_name = "EXP_REF", required_unless_present = "summarize")]
    exp_ref: Option<PathBuf>,

    /// Expected alternate-allele counts
    #[arg(value_name = "EXP_ALT", required_unless_present = "summarize")]
    exp_alt: Option<PathBuf>,

    /// Observed IBGW reference-allele counts
    #[arg(value_name = "OBS_REF", required_unless_present = "summarize")]
    obs_ref: Option<PathBuf>,

    /// Observed IBGW alternate-allele counts
    #[arg(value_name = "OBS_ALT", required_unless_present = "summarize")]
    obs_alt: Option<PathBuf>,

    /// Output TSV file (overwritten)
    #[arg(value_name = "OUTPUT", required_unless_present = "summarize")]
    output: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Join inputs by row index only, without checking chrom/pos agreement
    #[arg(long)]
    positional_join: bool,

    /// Fail instead of writing inf/NaN contribution scores
    #[arg(long)]
    strict_contributions: bool,

    /// q-value cut-off used when counting significant sites in the summary
    #[arg(long, default_value = "0.05")]
    fdr_threshold: f64,

    /// Summarize an existing results TSV instead of running the analysis
    #[arg(long, value_name = "RESULTS_TSV", conflicts_with = "obs_dog_alt")]
    summarize: Option<PathBuf>,
}

macro_rules! progress {
    ($quiet:expr) => {
        if !$quiet {
            eprintln!();
        }
    };
    ($quiet:expr, $($arg:tt)*) => {
        if !$quiet {
            eprintln!($($arg)*);
        }
    };
}

fn make_progress_bar(quiet: bool, len: u64) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template("  [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    Ok(pb)
}

/// Parse arguments; any usage error exits with status 1.
fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(1);
        }
    }
}

fn main() -> Result<()> {
    let args = parse_args();

    if !(args.fdr_threshold > 0.0 && args.fdr_threshold <= 1.0) {
        anyhow::bail!("Invalid --fdr-threshold {}. Must be in (0, 1]", args.fdr_threshold);
    }

    if let Some(ref results_path) = args.summarize {
        return run_summarize(&args, results_path);
    }

    let inputs: [&Path; 6] = [
        required(&args.obs_dog_alt, "OBS_DOG_ALT")?,
        required(&args.obs_negw_alt, "OBS_NEGW_ALT")?,
        required(&args.exp_ref, "EXP_REF")?,
        required(&args.exp_alt, "EXP_ALT")?,
        required(&args.obs_ref, "OBS_REF")?,
        required(&args.obs_alt, "OBS_ALT")?,
    ];
    let output_path = required(&args.output, "OUTPUT")?;

    for path in inputs {
        if !path.exists() {
            anyhow::bail!("Input file not found: {}", path.display());
        }
    }

    let policy = if args.strict_contributions {
        NonFinitePolicy::Fail
    } else {
        NonFinitePolicy::Keep
    };

    progress!(args.quiet, "Ancestry Enrichment Calculator");
    progress!(args.quiet, "=========================================");
    for (name, path) in assemble::INPUT_COLUMNS.iter().zip(inputs) {
        progress!(args.quiet, "{:<13} {}", format!("{}:", name), path.display());
    }
    progress!(args.quiet, "Output TSV:   {}", output_path.display());
    progress!(args.quiet, "Join: {}", if args.positional_join { "positional (unchecked)" } else { "keyed on chrom/pos" });
    progress!(args.quiet, "Non-finite contributions: {}", if args.strict_contributions { "fail" } else { "keep" });
    progress!(args.quiet);

    // Step 1: Load the six allele tables
    progress!(args.quiet, "Step 1: Loading allele tables...");
    let pb_load = make_progress_bar(args.quiet, inputs.len() as u64)?;
    let mut loaded: Vec<Vec<AlleleRecord>> = Vec::with_capacity(inputs.len());
    for (name, path) in assemble::INPUT_COLUMNS.iter().zip(inputs) {
        pb_load.set_message(*name);
        loaded.push(tsv_reader::load_allele_table(path)?);
        pb_load.inc(1);
    }
    pb_load.finish_and_clear();
    let tables: [Vec<AlleleRecord>; 6] = loaded
        .try_into()
        .map_err(|_| anyhow::anyhow!("Expected exactly six allele tables"))?;
    progress!(args.quiet, "  Rows per table: {:?}", tables.iter().map(Vec::len).collect::<Vec<_>>());

    // Step 2: Join by position
    progress!(args.quiet, "Step 2: Joining tables...");
    let sites = if args.positional_join {
        assemble::join_positional(&tables)
    } else {
        assemble::join_by_position(&tables)?
    };
    drop(tables);
    let n_loaded = sites.len();

    // Step 3: Drop sites with zero expected counts
    progress!(args.quiet, "Step 3: Filtering sites with zero expected counts...");
    let (sites, n_dropped) = assemble::filter_informative(sites);
    progress!(args.quiet, "  Retained {} / {} sites ({} dropped)", sites.len(), n_loaded, n_dropped);
    if sites.is_empty() {
        eprintln!("Warning: no sites passed the filter; output will contain only the header");
    }

    // Step 4: Statistics
    progress!(args.quiet, "Step 4: Computing chi-squared p-values, FDR correction and contributions...");
    let results = significance::run_significance_pipeline(sites, policy)?;

    // Step 5: Summary
    progress!(args.quiet, "Step 5: Summary statistics...");
    report_summary(&results, args.fdr_threshold, args.quiet);

    // Step 6: Write
    progress!(args.quiet, "Step 6: Writing results to TSV...");
    output::write_results(&results, output_path)?;

    progress!(args.quiet);
    println!("Table with chi-squared values and q-values saved to {}", output_path.display());

    Ok(())
}

fn required<'a>(value: &'a Option<PathBuf>, name: &str) -> Result<&'a Path> {
    value
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Missing required argument <{}>", name))
}

/// Summarize an existing results table.
fn run_summarize(args: &Args, results_path: &Path) -> Result<()> {
    progress!(args.quiet, "Ancestry Enrichment Summary");
    progress!(args.quiet, "=========================================");
    progress!(args.quiet, "Input TSV: {}", results_path.display());
    progress!(args.quiet);

    let results = tsv_reader::load_results_tsv(results_path)?;
    progress!(args.quiet, "Loaded {} sites from {}", results.len(), results_path.display());

    // Summary is the whole point here, so it ignores --quiet
    report_summary(&results, args.fdr_threshold, false);
    Ok(())
}

fn report_summary(results: &[EnrichmentResult], fdr_threshold: f64, quiet: bool) {
    if results.is_empty() {
        progress!(quiet, "  No sites to summarize");
        return;
    }

    let mut chisq: Vec<f64> = results.iter().map(|r| r.chisq).filter(|c| !c.is_nan()).collect();
    chisq.sort_by(|a, b| a.total_cmp(b));

    let n_significant = results.iter().filter(|r| r.q_val < fdr_threshold).count();
    let n_non_finite = significance::count_non_finite_contributions(results);

    progress!(quiet, "  Sites: {}", results.len());
    if let (Some(median), Some(max)) = (chisq.get(chisq.len() / 2), chisq.last()) {
        progress!(quiet, "  Mean chisq: {:.3}", chisq.iter().sum::<f64>() / chisq.len() as f64);
        progress!(quiet, "  Median chisq: {:.3}", median);
        progress!(quiet, "  Max chisq: {:.3}", max);
    }
    progress!(quiet, "  Significant sites (q < {}): {} / {}", fdr_threshold, n_significant, results.len());
    if n_non_finite > 0 {
        progress!(quiet, "  Sites with non-finite contribution scores: {}", n_non_finite);
    }
}
