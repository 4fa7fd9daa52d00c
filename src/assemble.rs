use crate::types::{AlleleRecord, AlleleSite};
use anyhow::Result;

/// Value column carried by each input table, in command-line order
pub const INPUT_COLUMNS: [&str; 6] = [
    "obs_DOG_alt",
    "obs_NEGW_alt",
    "exp_ref",
    "exp_alt",
    "obs_IBGW_ref",
    "obs_IBGW_alt",
];

fn build_site(tables: &[Vec<AlleleRecord>; 6], row: usize) -> AlleleSite {
    let key = &tables[0][row];
    AlleleSite {
        chrom: key.chrom.clone(),
        pos: key.pos,
        obs_dog_alt: tables[0][row].value,
        obs_negw_alt: tables[1][row].value,
        exp_ref: tables[2][row].value,
        exp_alt: tables[3][row].value,
        obs_ibgw_ref: tables[4][row].value,
        obs_ibgw_alt: tables[5][row].value,
    }
}

/// Join the six allele tables row by row, requiring every table to list the
/// same (chrom, pos) keys in the same order as the first one.
pub fn join_by_position(tables: &[Vec<AlleleRecord>; 6]) -> Result<Vec<AlleleSite>> {
    let n = tables[0].len();

    for (t, table) in tables.iter().enumerate().skip(1) {
        if table.len() != n {
            anyhow::bail!(
                "Row count mismatch: {} has {} rows but {} has {}",
                INPUT_COLUMNS[t],
                table.len(),
                INPUT_COLUMNS[0],
                n
            );
        }
    }

    let mut sites = Vec::with_capacity(n);
    for row in 0..n {
        let key = &tables[0][row];
        for (t, table) in tables.iter().enumerate().skip(1) {
            let other = &table[row];
            if other.chrom != key.chrom || other.pos != key.pos {
                anyhow::bail!(
                    "Position mismatch at row {}: {} is at {}:{} but {} is at {}:{}",
                    row + 1,
                    INPUT_COLUMNS[0],
                    key.chrom,
                    key.pos,
                    INPUT_COLUMNS[t],
                    other.chrom,
                    other.pos
                );
            }
        }
        sites.push(build_site(tables, row));
    }

    Ok(sites)
}

/// Join the six allele tables purely by row index.
///
/// chrom/pos come from the first table and are not compared against the
/// others. Unequal lengths truncate to the shortest table.
pub fn join_positional(tables: &[Vec<AlleleRecord>; 6]) -> Vec<AlleleSite> {
    let n = tables.iter().map(Vec::len).min().unwrap_or(0);
    if tables.iter().any(|t| t.len() != n) {
        eprintln!(
            "Warning: input tables have unequal row counts ({:?}); truncating to {}",
            tables.iter().map(Vec::len).collect::<Vec<_>>(),
            n
        );
    }

    (0..n).map(|row| build_site(tables, row)).collect()
}

/// Drop sites with a zero expected count.
///
/// Returns the retained sites in their original order and the number dropped.
pub fn filter_informative(sites: Vec<AlleleSite>) -> (Vec<AlleleSite>, usize) {
    let before = sites.len();
    let kept: Vec<AlleleSite> = sites
        .into_iter()
        .filter(|s| s.exp_ref != 0.0 && s.exp_alt != 0.0)
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, u64, f64)]) -> Vec<AlleleRecord> {
        rows.iter()
            .map(|&(c, p, v)| AlleleRecord { chrom: c.to_string(), pos: p, value: v })
            .collect()
    }

    fn six(rows: &[(&str, u64)], values: [f64; 6]) -> [Vec<AlleleRecord>; 6] {
        std::array::from_fn(|t| {
            table(&rows.iter().map(|&(c, p)| (c, p, values[t])).collect::<Vec<_>>())
        })
    }

    #[test]
    fn test_join_assigns_columns_in_order() {
        let tables = six(&[("1", 100)], [5.0, 3.0, 10.0, 10.0, 8.0, 12.0]);
        let sites = join_by_position(&tables).unwrap();
        assert_eq!(
            sites,
            vec![AlleleSite {
                chrom: "1".into(),
                pos: 100,
                obs_dog_alt: 5.0,
                obs_negw_alt: 3.0,
                exp_ref: 10.0,
                exp_alt: 10.0,
                obs_ibgw_ref: 8.0,
                obs_ibgw_alt: 12.0,
            }]
        );
    }

    #[test]
    fn test_join_rejects_position_mismatch() {
        let mut tables = six(&[("1", 100), ("1", 200)], [1.0; 6]);
        tables[3][1].pos = 201;
        let err = join_by_position(&tables).unwrap_err().to_string();
        assert!(err.contains("row 2"), "{}", err);
        assert!(err.contains("exp_alt is at 1:201"), "{}", err);
    }

    #[test]
    fn test_join_rejects_chrom_mismatch() {
        let mut tables = six(&[("1", 100)], [1.0; 6]);
        tables[5][0].chrom = "2".into();
        assert!(join_by_position(&tables).is_err());
    }

    #[test]
    fn test_join_rejects_length_mismatch() {
        let mut tables = six(&[("1", 100), ("1", 200)], [1.0; 6]);
        tables[1].pop();
        let err = join_by_position(&tables).unwrap_err().to_string();
        assert!(err.contains("obs_NEGW_alt has 1 rows"), "{}", err);
    }

    #[test]
    fn test_positional_join_ignores_keys() {
        let mut tables = six(&[("1", 100), ("1", 200)], [1.0; 6]);
        tables[2][0].pos = 999;
        tables[4].pop();
        let sites = join_positional(&tables);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].pos, 100);
    }

    #[test]
    fn test_filter_drops_zero_expected() {
        let mut tables = six(&[("1", 100), ("1", 200), ("1", 300)], [1.0; 6]);
        tables[2][0].value = 0.0; // exp_ref
        tables[3][2].value = 0.0; // exp_alt
        let sites = join_by_position(&tables).unwrap();
        let (kept, dropped) = filter_informative(sites);
        assert_eq!(dropped, 2);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].pos, 200);
    }
}
