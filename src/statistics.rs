use crate::types::AlleleSite;

/// Calculate the chi-squared goodness-of-fit statistic for one site
///
/// ```text
///                 Observed      |  Expected
/// REF allele:     obs_ref       |  exp_ref
/// ALT allele:     obs_alt       |  exp_alt
/// ```
///
/// chisq = (obs_ref - exp_ref)² / exp_ref + (obs_alt - exp_alt)² / exp_alt
///
/// Callers must drop sites with a zero expected count first
/// (see `assemble::filter_informative`).
pub fn chi_squared_statistic(obs_ref: f64, obs_alt: f64, exp_ref: f64, exp_alt: f64) -> f64 {
    let term = |observed: f64, expected: f64| -> f64 {
        let d = observed - expected;
        d * d / expected
    };

    term(obs_ref, exp_ref) + term(obs_alt, exp_alt)
}

/// Chi-squared statistic for a joined site
pub fn site_chi_squared(site: &AlleleSite) -> f64 {
    chi_squared_statistic(site.obs_ibgw_ref, site.obs_ibgw_alt, site.exp_ref, site.exp_alt)
}

/// Contribution of `source` relative to `other` at a site with target count `target`
///
/// contr = (source - other) * 2 / (2 - |target - source|)
///
/// The denominator reaches zero when |target - source| == 2; the result is
/// then ±inf (or NaN when source == other) and is returned unchanged.
fn contribution(source: f64, other: f64, target: f64) -> f64 {
    (source - other) * 2.0 / (2.0 - (target - source).abs())
}

/// DOG contribution: (DOG - NEGW) * 2 / (2 - |IBGW - DOG|)
pub fn dog_contribution(site: &AlleleSite) -> f64 {
    contribution(site.obs_dog_alt, site.obs_negw_alt, site.obs_ibgw_alt)
}

/// NEGW contribution: (NEGW - DOG) * 2 / (2 - |IBGW - NEGW|)
pub fn negw_contribution(site: &AlleleSite) -> f64 {
    contribution(site.obs_negw_alt, site.obs_dog_alt, site.obs_ibgw_alt)
}
