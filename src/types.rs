/// One line of an input allele table (first three columns only)
#[derive(Debug, Clone, PartialEq)]
pub struct AlleleRecord {
    pub chrom: String,
    pub pos: u64,
    pub value: f64,
}

/// A genomic site with all six allele-count columns joined
#[derive(Debug, Clone, PartialEq)]
pub struct AlleleSite {
    pub chrom: String,
    pub pos: u64,

    // Source populations
    pub obs_dog_alt: f64,
    pub obs_negw_alt: f64,

    // Expected counts under the null
    pub exp_ref: f64,
    pub exp_alt: f64,

    // Target population
    pub obs_ibgw_ref: f64,
    pub obs_ibgw_alt: f64,
}

/// Per-site enrichment statistics
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentResult {
    pub site: AlleleSite,
    pub chisq: f64,
    pub p_val: f64,  // upper tail of chi2(df=1)
    pub q_val: f64,  // BH-adjusted p-value
    pub dog_contr: f64,
    pub negw_contr: f64,
}

/// What to do with a contribution score whose denominator vanished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonFinitePolicy {
    /// Write inf / NaN to the output as-is
    #[default]
    Keep,
    /// Abort the run on the first non-finite score
    Fail,
}
