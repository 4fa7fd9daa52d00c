use crate::output::RESULT_COLUMNS;
use crate::types::{AlleleRecord, AlleleSite, EnrichmentResult};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;

/// Load the first three columns (chrom, pos, value) of a headerless
/// tab-delimited allele table.
///
/// Extra columns are ignored. Rows with fewer than three columns, or with a
/// position or value that doesn't parse, fail with the file and line number.
pub fn load_allele_table(path: &Path) -> Result<Vec<AlleleRecord>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open allele table: {}", path.display()))?;

    let mut records = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("{}: failed to read row {}", path.display(), i + 1))?;
        let line = record.position().map_or(i as u64 + 1, |p| p.line());
        let parsed = parse_allele_record(&record)
            .with_context(|| format!("{}: line {}", path.display(), line))?;
        records.push(parsed);
    }

    Ok(records)
}

fn parse_allele_record(record: &StringRecord) -> Result<AlleleRecord> {
    if record.len() < 3 {
        anyhow::bail!("expected at least 3 columns, found {}", record.len());
    }

    let pos_field = record[1].trim();
    let value_field = record[2].trim();

    Ok(AlleleRecord {
        chrom: record[0].trim().to_string(),
        pos: pos_field
            .parse()
            .with_context(|| format!("invalid position '{}'", pos_field))?,
        value: value_field
            .parse()
            .with_context(|| format!("invalid count '{}'", value_field))?,
    })
}

/// Read a results table written by `output::write_results`.
///
/// Columns are located by header name, so all 13 result columns must be
/// present; column order is not checked.
pub fn load_results_tsv(path: &Path) -> Result<Vec<EnrichmentResult>> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("Failed to open results table: {}", path.display()))?;

    let headers = rdr.headers()?.clone();
    let mut idx = [0usize; RESULT_COLUMNS.len()];
    for (slot, name) in idx.iter_mut().zip(RESULT_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("{}: missing column '{}'", path.display(), name))?;
    }

    let mut results = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to parse results row {}", i + 1))?;
        let result = parse_result_record(&record, &idx)
            .with_context(|| format!("{}: row {}", path.display(), i + 1))?;
        results.push(result);
    }

    Ok(results)
}

fn result_field<'a>(record: &'a StringRecord, idx: &[usize; 13], col: usize) -> Result<&'a str> {
    record
        .get(idx[col])
        .with_context(|| format!("missing value for '{}'", RESULT_COLUMNS[col]))
}

fn result_number(record: &StringRecord, idx: &[usize; 13], col: usize) -> Result<f64> {
    let raw = result_field(record, idx, col)?;
    raw.parse()
        .with_context(|| format!("invalid {} '{}'", RESULT_COLUMNS[col], raw))
}

fn parse_result_record(record: &StringRecord, idx: &[usize; 13]) -> Result<EnrichmentResult> {
    let num = |col: usize| result_number(record, idx, col);

    let pos_raw = result_field(record, idx, 1)?;
    let site = AlleleSite {
        chrom: result_field(record, idx, 0)?.to_string(),
        pos: pos_raw
            .parse()
            .with_context(|| format!("invalid pos '{}'", pos_raw))?,
        obs_dog_alt: num(2)?,
        obs_negw_alt: num(3)?,
        exp_ref: num(4)?,
        exp_alt: num(5)?,
        obs_ibgw_ref: num(6)?,
        obs_ibgw_alt: num(7)?,
    };

    Ok(EnrichmentResult {
        site,
        chisq: num(8)?,
        p_val: num(9)?,
        q_val: num(10)?,
        dog_contr: num(11)?,
        negw_contr: num(12)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_keeps_first_three_columns() {
        let file = write_temp("1\t100\t5\textra\tcols\n2\t200\t0.5\n");
        let records = load_allele_table(file.path()).unwrap();
        assert_eq!(
            records,
            vec![
                AlleleRecord { chrom: "1".into(), pos: 100, value: 5.0 },
                AlleleRecord { chrom: "2".into(), pos: 200, value: 0.5 },
            ]
        );
    }

    #[test]
    fn test_load_too_few_columns() {
        let file = write_temp("1\t100\t5\n1\t200\n");
        let err = load_allele_table(file.path()).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("line 2"), "{}", msg);
        assert!(msg.contains("at least 3 columns"), "{}", msg);
    }

    #[test]
    fn test_load_non_numeric_count() {
        let file = write_temp("1\t100\tfive\n");
        let msg = format!("{:#}", load_allele_table(file.path()).unwrap_err());
        assert!(msg.contains("invalid count 'five'"), "{}", msg);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_allele_table(Path::new("/nonexistent/allele_table.tsv")).unwrap_err();
        assert!(err.to_string().contains("Failed to open allele table"));
    }

    #[test]
    fn test_load_results_rejects_foreign_header() {
        let file = write_temp("chrom\tpos\tg_statistic\n1\t100\t3.2\n");
        let msg = format!("{:#}", load_results_tsv(file.path()).unwrap_err());
        assert!(msg.contains("missing column 'chr'"), "{}", msg);
    }
}
