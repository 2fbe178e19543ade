use std::fmt;

use serde::Serialize;

/// One simulated year of the dense annual schedule.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnnualScheduleEntry {
    pub year_index: u32,
    pub monthly_deposit: f64,
    /// Annual percentage, e.g. `3.0` for 3%.
    pub rate: f64,
}

impl AnnualScheduleEntry {
    pub fn new(year_index: u32, rate: f64, monthly_deposit: f64) -> Self {
        Self {
            year_index,
            monthly_deposit,
            rate,
        }
    }
}

/// A contiguous assumed-yield stretch: `rate` percent for `year` years, no deposits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct YieldPeriod {
    /// 1-based display position. Ignored by the projector.
    pub order: u32,
    pub year: u32,
    pub rate: f64,
}

impl YieldPeriod {
    pub fn new(order: u32, year: u32, rate: f64) -> Self {
        Self { order, year, rate }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub year: u32,
    pub balance: f64,
}

/// Year-by-year balance curve. Index 0 is always the untouched principal.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProjectionResult {
    points: Vec<ProjectionPoint>,
}

impl ProjectionResult {
    pub(crate) fn from_points(points: Vec<ProjectionPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ProjectionPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn balances(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.balance)
    }

    pub fn final_balance(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.balance)
    }

    pub fn into_points(self) -> Vec<ProjectionPoint> {
        self.points
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub final_amount: i64,
    pub total_years: u32,
}

impl fmt::Display for SummaryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} years -> {}", self.total_years, self.final_amount)
    }
}
