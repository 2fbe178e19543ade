use super::error::PreconditionViolation;
use super::growth::{apply_year, period_multiplier};
use super::types::{ProjectionPoint, ProjectionResult, SummaryResult, YieldPeriod};

/// Terminal value of `principal` compounded through `periods` in the order
/// given. Each period contributes `(1 + rate/100)^year`; there are no deposits.
///
/// `final_amount` uses `f64::round` (half away from zero).
pub fn summarize(principal: f64, periods: &[YieldPeriod]) -> SummaryResult {
    let multiplier = periods
        .iter()
        .fold(1.0, |acc, p| acc * period_multiplier(p.rate, p.year));
    SummaryResult {
        final_amount: (principal * multiplier).round() as i64,
        total_years: total_years(periods),
    }
}

pub fn total_years(periods: &[YieldPeriod]) -> u32 {
    periods.iter().fold(0u32, |acc, p| acc.saturating_add(p.year))
}

/// Year-by-year curve for charting: `total_years + 1` points, each period
/// expanded into single-year steps through the shared kernel.
///
/// Allocates one point per year; callers bound the summed duration.
pub fn series(principal: f64, periods: &[YieldPeriod]) -> ProjectionResult {
    let mut points = Vec::with_capacity(total_years(periods) as usize + 1);
    let mut balance = principal;
    let mut year = 0u32;
    points.push(ProjectionPoint { year, balance });

    for period in periods {
        for _ in 0..period.year {
            balance = apply_year(balance, period.rate, 0.0);
            year += 1;
            points.push(ProjectionPoint { year, balance });
        }
    }

    ProjectionResult::from_points(points)
}

/// Editable list of yield periods whose `order` fields stay 1..=n.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct YieldPlan {
    periods: Vec<YieldPeriod>,
}

impl YieldPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes periods as stored; they are sorted by `order` and renumbered.
    pub fn from_periods(mut periods: Vec<YieldPeriod>) -> Self {
        periods.sort_by_key(|p| p.order);
        let mut plan = Self { periods };
        plan.renumber();
        plan
    }

    /// Keeps periods in the given sequence and renumbers `order` to match it.
    pub fn from_sequence(periods: Vec<YieldPeriod>) -> Self {
        let mut plan = Self { periods };
        plan.renumber();
        plan
    }

    pub fn periods(&self) -> &[YieldPeriod] {
        &self.periods
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Appends a zero-year, zero-rate period and returns its order.
    pub fn push_default(&mut self) -> u32 {
        let order = self.periods.len() as u32 + 1;
        self.periods.push(YieldPeriod::new(order, 0, 0.0));
        order
    }

    pub fn remove(&mut self, order: u32) -> Result<YieldPeriod, PreconditionViolation> {
        let idx = self.position(order)?;
        let removed = self.periods.remove(idx);
        self.renumber();
        Ok(removed)
    }

    pub fn set_years(&mut self, order: u32, years: u32) -> Result<(), PreconditionViolation> {
        let idx = self.position(order)?;
        self.periods[idx].year = years;
        Ok(())
    }

    pub fn set_rate(&mut self, order: u32, rate: f64) -> Result<(), PreconditionViolation> {
        let idx = self.position(order)?;
        self.periods[idx].rate = rate;
        Ok(())
    }

    pub fn summarize(&self, principal: f64) -> SummaryResult {
        summarize(principal, &self.periods)
    }

    pub fn series(&self, principal: f64) -> ProjectionResult {
        series(principal, &self.periods)
    }

    fn position(&self, order: u32) -> Result<usize, PreconditionViolation> {
        self.periods
            .iter()
            .position(|p| p.order == order)
            .ok_or(PreconditionViolation::UnknownOrder { order })
    }

    fn renumber(&mut self) {
        for (idx, period) in self.periods.iter_mut().enumerate() {
            period.order = idx as u32 + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annual::project;
    use crate::core::types::AnnualScheduleEntry;
    use proptest::collection::vec;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn no_periods_returns_principal() {
        let summary = summarize(250_000.0, &[]);
        assert_eq!(
            summary,
            SummaryResult {
                final_amount: 250_000,
                total_years: 0
            }
        );
    }

    #[test]
    fn single_period_compounds_over_its_duration() {
        let summary = summarize(100_000.0, &[YieldPeriod::new(1, 10, 3.0)]);
        assert_eq!(summary.final_amount, 134_392);
        assert_eq!(summary.total_years, 10);
    }

    #[test]
    fn zero_rate_and_zero_year_periods_are_identity() {
        let periods = [YieldPeriod::new(1, 0, 12.0), YieldPeriod::new(2, 25, 0.0)];
        let summary = summarize(77_777.0, &periods);
        assert_eq!(summary.final_amount, 77_777);
        assert_eq!(summary.total_years, 25);
    }

    #[test]
    fn fractional_rates_are_supported() {
        let summary = summarize(1_000_000.0, &[YieldPeriod::new(1, 2, 2.5)]);
        // 1_000_000 * 1.025^2 = 1_050_625
        assert_eq!(summary.final_amount, 1_050_625);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(summarize(2.5, &[]).final_amount, 3);
        assert_eq!(summarize(-2.5, &[]).final_amount, -3);
        assert_eq!(summarize(2.4, &[]).final_amount, 2);
    }

    #[test]
    fn total_loss_period_zeroes_amount() {
        let periods = [YieldPeriod::new(1, 5, 10.0), YieldPeriod::new(2, 1, -100.0)];
        assert_eq!(summarize(10_000.0, &periods).final_amount, 0);
    }

    #[test]
    fn order_field_is_ignored_in_favour_of_sequence() {
        let periods = [YieldPeriod::new(2, 1, 5.0), YieldPeriod::new(1, 1, -50.0)];
        let curve = series(1_000.0, &periods);
        assert_approx_tol(curve.points()[1].balance, 1_050.0, 1e-9);
        assert_approx_tol(curve.points()[2].balance, 525.0, 1e-9);
    }

    #[test]
    fn swapping_equal_rate_periods_does_not_change_result() {
        let a = [YieldPeriod::new(1, 3, 4.0), YieldPeriod::new(2, 7, 4.0)];
        let b = [YieldPeriod::new(1, 7, 4.0), YieldPeriod::new(2, 3, 4.0)];
        assert_eq!(summarize(100_000.0, &a), summarize(100_000.0, &b));
    }

    #[test]
    fn swapping_differing_periods_changes_path_but_not_terminal_value() {
        let a = [YieldPeriod::new(1, 2, 10.0), YieldPeriod::new(2, 1, -50.0)];
        let b = [YieldPeriod::new(1, 1, -50.0), YieldPeriod::new(2, 2, 10.0)];
        let sa = series(1_000.0, &a);
        let sb = series(1_000.0, &b);
        assert_eq!(sa.len(), sb.len());
        assert_approx_tol(sa.points()[1].balance, 1_100.0, 1e-9);
        assert_approx_tol(sb.points()[1].balance, 500.0, 1e-9);
        assert_approx_tol(sa.final_balance(), sb.final_balance(), 1e-9);
        assert_eq!(summarize(1_000.0, &a), summarize(1_000.0, &b));
    }

    #[test]
    fn series_expands_each_period_year_by_year() {
        let periods = [YieldPeriod::new(1, 2, 10.0), YieldPeriod::new(2, 1, 0.0)];
        let result = series(1_000.0, &periods);
        let years: Vec<u32> = result.points().iter().map(|p| p.year).collect();
        assert_eq!(years, vec![0, 1, 2, 3]);
        assert_approx_tol(result.points()[1].balance, 1_100.0, 1e-9);
        assert_approx_tol(result.points()[2].balance, 1_210.0, 1e-9);
        assert_approx_tol(result.points()[3].balance, 1_210.0, 1e-9);
    }

    #[test]
    fn single_year_agrees_with_annual_projection() {
        let annual = project(100_000.0, &[AnnualScheduleEntry::new(0, 3.0, 0.0)])
            .expect("dense");
        let summary = summarize(100_000.0, &[YieldPeriod::new(1, 1, 3.0)]);
        assert_approx_tol(annual.final_balance(), summary.final_amount as f64, 0.5);
    }

    #[test]
    fn plan_push_assigns_next_order_with_zero_values() {
        let mut plan = YieldPlan::new();
        assert_eq!(plan.push_default(), 1);
        assert_eq!(plan.push_default(), 2);
        assert_eq!(plan.periods()[1], YieldPeriod::new(2, 0, 0.0));
    }

    #[test]
    fn plan_remove_renumbers_contiguously() {
        let mut plan = YieldPlan::from_periods(vec![
            YieldPeriod::new(1, 5, 3.0),
            YieldPeriod::new(2, 10, 4.0),
            YieldPeriod::new(3, 15, 5.0),
        ]);
        let removed = plan.remove(2).expect("order 2 exists");
        assert_eq!(removed.year, 10);
        assert_eq!(
            plan.periods(),
            &[YieldPeriod::new(1, 5, 3.0), YieldPeriod::new(2, 15, 5.0)]
        );
        assert_eq!(
            plan.remove(3),
            Err(PreconditionViolation::UnknownOrder { order: 3 })
        );
    }

    #[test]
    fn plan_from_periods_sorts_and_closes_gaps() {
        let plan = YieldPlan::from_periods(vec![
            YieldPeriod::new(7, 1, 1.0),
            YieldPeriod::new(3, 2, 2.0),
        ]);
        assert_eq!(
            plan.periods(),
            &[YieldPeriod::new(1, 2, 2.0), YieldPeriod::new(2, 1, 1.0)]
        );
    }

    #[test]
    fn plan_from_sequence_keeps_arrival_order() {
        let plan = YieldPlan::from_sequence(vec![
            YieldPeriod::new(7, 1, 1.0),
            YieldPeriod::new(3, 2, 2.0),
            YieldPeriod::new(3, 4, 3.0),
        ]);
        assert_eq!(
            plan.periods(),
            &[
                YieldPeriod::new(1, 1, 1.0),
                YieldPeriod::new(2, 2, 2.0),
                YieldPeriod::new(3, 4, 3.0)
            ]
        );
    }

    #[test]
    fn plan_edits_by_order() {
        let mut plan = YieldPlan::new();
        plan.push_default();
        plan.set_years(1, 10).expect("exists");
        plan.set_rate(1, 3.0).expect("exists");
        let summary = plan.summarize(100_000.0);
        assert_eq!(summary.final_amount, 134_392);
        assert_eq!(summary.to_string(), "10 years -> 134392");
        assert_eq!(plan.series(100_000.0).len(), 11);
        assert_eq!(
            plan.set_rate(9, 1.0),
            Err(PreconditionViolation::UnknownOrder { order: 9 })
        );
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_series_end_matches_summary(
            principal in 0u32..5_000_000,
            periods in vec((0u32..15, -20i32..25), 0..6)
        ) {
            let periods: Vec<YieldPeriod> = periods
                .iter()
                .enumerate()
                .map(|(idx, &(year, rate))| YieldPeriod::new(idx as u32 + 1, year, rate as f64))
                .collect();
            let summary = summarize(principal as f64, &periods);
            let curve = series(principal as f64, &periods);

            prop_assert_eq!(curve.len(), summary.total_years as usize + 1);
            let tol = 0.5 + curve.final_balance().abs() * 1e-9;
            prop_assert!(
                (curve.final_balance() - summary.final_amount as f64).abs() <= tol,
                "series {} vs summary {}",
                curve.final_balance(),
                summary.final_amount
            );
        }

        #[test]
        fn prop_annual_and_period_projectors_agree_without_deposits(
            principal in 0u32..5_000_000,
            rate in -99i32..60
        ) {
            let annual = project(
                principal as f64,
                &[AnnualScheduleEntry::new(0, rate as f64, 0.0)],
            )
            .expect("dense");
            let summary = summarize(principal as f64, &[YieldPeriod::new(1, 1, rate as f64)]);
            prop_assert!((annual.final_balance() - summary.final_amount as f64).abs() <= 0.5 + 1e-6);
        }

        #[test]
        fn prop_equal_rate_periods_commute(
            principal in 0u32..5_000_000,
            rate in -50i32..50,
            first in 0u32..20,
            second in 0u32..20
        ) {
            let a = [YieldPeriod::new(1, first, rate as f64), YieldPeriod::new(2, second, rate as f64)];
            let b = [YieldPeriod::new(1, second, rate as f64), YieldPeriod::new(2, first, rate as f64)];
            prop_assert_eq!(summarize(principal as f64, &a), summarize(principal as f64, &b));
        }
    }
}
