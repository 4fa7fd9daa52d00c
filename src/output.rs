use crate::types::EnrichmentResult;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::path::Path;

/// Column names of the results table, in output order
pub const RESULT_COLUMNS: [&str; 13] = [
    "chr",
    "pos",
    "obs_DOG_alt",
    "obs_NEGW_alt",
    "exp_ref",
    "exp_alt",
    "obs_IBGW_ref",
    "obs_IBGW_alt",
    "chisq",
    "p_val",
    "q_val",
    "DOG_contr",
    "NEGW_contr",
];

/// Write enrichment results as a tab-delimited table with a header row.
///
/// Overwrites `path`. Floats use the shortest representation that parses
/// back to the same value; non-finite scores are written as `inf`/`-inf`/`NaN`.
pub fn write_results(results: &[EnrichmentResult], path: &Path) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    wtr.write_record(RESULT_COLUMNS)?;

    for result in results {
        let site = &result.site;
        wtr.write_record(&[
            site.chrom.clone(),
            site.pos.to_string(),
            site.obs_dog_alt.to_string(),
            site.obs_negw_alt.to_string(),
            site.exp_ref.to_string(),
            site.exp_alt.to_string(),
            site.obs_ibgw_ref.to_string(),
            site.obs_ibgw_alt.to_string(),
            result.chisq.to_string(),
            result.p_val.to_string(),
            result.q_val.to_string(),
            result.dog_contr.to_string(),
            result.negw_contr.to_string(),
        ])
        .with_context(|| format!("Failed to write row for {}:{}", site.chrom, site.pos))?;
    }

    wtr.flush()
        .with_context(|| format!("Failed to flush output file: {}", path.display()))?;
    Ok(())
}
