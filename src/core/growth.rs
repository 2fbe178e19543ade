pub const MONTHS_PER_YEAR: f64 = 12.0;

/// Grows `balance` by one year of `rate_percent` with a single annual
/// compounding, then adds twelve undiscounted monthly deposits.
///
/// `rate_percent = -100` wipes the prior balance before deposits land.
/// Inputs are not clamped; a rate below -100 turns the balance negative.
pub fn apply_year(balance: f64, rate_percent: f64, monthly_deposit: f64) -> f64 {
    balance * growth_factor(rate_percent) + monthly_deposit * MONTHS_PER_YEAR
}

/// Compounds `balance` over `years` years of `rate_percent` with no deposits.
pub fn apply_years(balance: f64, rate_percent: f64, years: u32) -> f64 {
    balance * period_multiplier(rate_percent, years)
}

pub fn growth_factor(rate_percent: f64) -> f64 {
    1.0 + rate_percent / 100.0
}

/// `(1 + rate/100)^years`. Integer exponent keeps negative bases well defined.
pub fn period_multiplier(rate_percent: f64, years: u32) -> f64 {
    match i32::try_from(years) {
        Ok(exp) => growth_factor(rate_percent).powi(exp),
        Err(_) => growth_factor(rate_percent).powf(years as f64),
    }
}
