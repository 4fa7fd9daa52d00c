use crate::statistics::{dog_contribution, negw_contribution, site_chi_squared};
use crate::types::{AlleleSite, EnrichmentResult, NonFinitePolicy};
use anyhow::{Context, Result};
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Upper-tail p-value of a chi-squared statistic with one degree of freedom.
///
/// p_value = 1 - CDF(chisq) under χ²(1), evaluated through the survival
/// function so small tails don't cancel to zero.
pub fn chi_squared_p_value(chisq: f64) -> Result<f64> {
    if chisq.is_nan() {
        return Ok(f64::NAN);
    }
    if chisq <= 0.0 {
        return Ok(1.0);
    }
    if chisq.is_infinite() {
        return Ok(0.0);
    }
    let dist = ChiSquared::new(1.0).context("Failed to build chi-squared(1) distribution")?;
    Ok(dist.sf(chisq).clamp(0.0, 1.0))
}

/// Compute p-values for a batch of chi-squared statistics.
pub fn compute_p_values(chisq_values: &[f64]) -> Result<Vec<f64>> {
    chisq_values.iter().map(|&c| chi_squared_p_value(c)).collect()
}

/// Benjamini-Hochberg FDR correction.
///
/// Returns q-values (adjusted p-values) in the same order as input.
/// NaN p-values are excluded from the test count and map to NaN.
pub fn benjamini_hochberg(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len();
    if n == 0 {
        return vec![];
    }

    // Create indexed list and sort by p-value, NaN last
    let mut indexed: Vec<(usize, f64)> = p_values.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| match (a.1.is_nan(), b.1.is_nan()) {
        (true, true) => std::cmp::Ordering::Equal,
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (false, false) => a.1.total_cmp(&b.1),
    });

    let m = indexed.iter().filter(|(_, p)| !p.is_nan()).count();
    let mut q_values = vec![f64::NAN; n];
    let m_f64 = m as f64;

    // Step-up: walk from the largest rank down, carrying the running minimum
    let mut cummin = f64::INFINITY;
    for i in (0..m).rev() {
        let (orig_idx, p) = indexed[i];
        let rank = (i + 1) as f64;
        let adjusted = (p * m_f64 / rank).min(1.0);
        cummin = cummin.min(adjusted);
        q_values[orig_idx] = cummin;
    }

    q_values
}

/// Full statistic pipeline over filtered sites.
///
/// First pass computes chisq and p-values for every site, second pass
/// applies BH across the complete p-value vector, then contribution scores
/// are attached. Output order matches input order.
pub fn run_significance_pipeline(
    sites: Vec<AlleleSite>,
    policy: NonFinitePolicy,
) -> Result<Vec<EnrichmentResult>> {
    let chisq_values: Vec<f64> = sites.iter().map(site_chi_squared).collect();
    let p_values = compute_p_values(&chisq_values)?;
    let q_values = benjamini_hochberg(&p_values);

    sites
        .into_iter()
        .enumerate()
        .map(|(i, site)| {
            let dog_contr = dog_contribution(&site);
            let negw_contr = negw_contribution(&site);

            if policy == NonFinitePolicy::Fail && !(dog_contr.is_finite() && negw_contr.is_finite()) {
                anyhow::bail!(
                    "Non-finite contribution score at {}:{} (DOG_contr={}, NEGW_contr={})",
                    site.chrom,
                    site.pos,
                    dog_contr,
                    negw_contr
                );
            }

            Ok(EnrichmentResult {
                site,
                chisq: chisq_values[i],
                p_val: p_values[i],
                q_val: q_values[i],
                dog_contr,
                negw_contr,
            })
        })
        .collect()
}

/// Count results with at least one non-finite contribution score.
pub fn count_non_finite_contributions(results: &[EnrichmentResult]) -> usize {
    results
        .iter()
        .filter(|r| !(r.dog_contr.is_finite() && r.negw_contr.is_finite()))
        .count()
}
