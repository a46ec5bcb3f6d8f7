use crate::config::ThresholdConfig;

/// Acceptance cutoff for one household.
pub struct ThresholdCalculator<'a> {
    config: &'a ThresholdConfig,
}

impl<'a> ThresholdCalculator<'a> {
    pub fn new(config: &'a ThresholdConfig) -> Self {
        Self { config }
    }

    /// Raised as candidates outnumber household members, lowered as the
    /// rows get sparser, and always kept inside `[min, max]`.
    ///
    /// Non-increasing in `completeness`, non-decreasing in
    /// `candidate_count / household_size`.
    pub fn threshold(&self, household_size: usize, candidate_count: usize, completeness: f64) -> f64 {
        let cfg = self.config;

        let density = candidate_count as f64 / household_size.max(1) as f64;
        let raise = ((density - 1.0).max(0.0) * cfg.density_step).min(cfg.density_cap);

        let completeness = if completeness.is_finite() { completeness.clamp(0.0, 1.0) } else { 0.0 };
        let relief = (1.0 - completeness) * cfg.completeness_relief;

        (cfg.base + raise - relief).clamp(cfg.min, cfg.max)
    }
}
