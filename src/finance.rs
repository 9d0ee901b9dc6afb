// src/finance.rs

//! Closed-form loan and investment calculators (EMI, SIP) and the
//! month-by-month SWP simulation.
//!
//! All functions assume validated input: positive amounts, a non-negative rate
//! and a tenure of at least one period. The HTTP layer in
//! `handlers::calculator` enforces that before calling in.

use serde::{Deserialize, Serialize};

/// Rounds to the nearest whole currency unit, halves going up.
fn round_unit(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

fn monthly_rate(annual_rate_percent: f64) -> f64 {
    annual_rate_percent / 12.0 / 100.0
}

/// Result of an EMI (equated monthly installment) calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmiBreakdown {
    pub emi: i64,
    pub total_amount: i64,
    pub total_interest: i64,
    pub principal: i64,
}

/// Computes the monthly installment of an amortizing loan.
pub fn emi(principal: f64, annual_rate_percent: f64, tenure_months: u32) -> EmiBreakdown {
    let r = monthly_rate(annual_rate_percent);
    let n = f64::from(tenure_months);
    let growth = (1.0 + r).powf(n);

    // Rates too small to move (1 + r)^n off 1.0 behave like zero.
    if r == 0.0 || growth == 1.0 {
        return EmiBreakdown {
            emi: round_unit(principal / n),
            total_amount: round_unit(principal),
            total_interest: 0,
            principal: round_unit(principal),
        };
    }

    let installment = principal * r * growth / (growth - 1.0);
    let total_amount = installment * n;
    let total_interest = total_amount - principal;

    EmiBreakdown {
        emi: round_unit(installment),
        total_amount: round_unit(total_amount),
        total_interest: round_unit(total_interest),
        principal: round_unit(principal),
    }
}

/// Result of a SIP (systematic investment plan) projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SipProjection {
    pub future_value: i64,
    pub total_investment: i64,
    pub total_returns: i64,
}

/// Future value of a fixed monthly contribution paid at the start of each month.
pub fn sip(monthly_investment: f64, annual_return_percent: f64, tenure_years: u32) -> SipProjection {
    let r = monthly_rate(annual_return_percent);
    let n = f64::from(tenure_years) * 12.0;
    let total_investment = monthly_investment * n;
    let growth = (1.0 + r).powf(n);

    if r == 0.0 || growth == 1.0 {
        return SipProjection {
            future_value: round_unit(total_investment),
            total_investment: round_unit(total_investment),
            total_returns: 0,
        };
    }

    let future_value = monthly_investment * (growth - 1.0) / r * (1.0 + r);

    SipProjection {
        future_value: round_unit(future_value),
        total_investment: round_unit(total_investment),
        total_returns: round_unit(future_value - total_investment),
    }
}

/// Unrounded outcome of an SWP simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwpSchedule {
    pub initial_investment: f64,
    pub total_withdrawn: f64,
    pub remaining_balance: f64,
    /// Months actually simulated, including the month the fund ran dry.
    pub months_elapsed: u32,
    pub exhausted: bool,
}

impl SwpSchedule {
    /// Runs the withdrawal plan month by month.
    ///
    /// Each month the balance first grows by the monthly rate, then the
    /// withdrawal is taken. When the grown balance cannot cover a full
    /// withdrawal, whatever is left is paid out and the plan stops.
    pub fn simulate(
        initial_investment: f64,
        monthly_withdrawal: f64,
        annual_return_percent: f64,
        tenure_years: u32,
    ) -> Self {
        let r = monthly_rate(annual_return_percent);
        let tenure_months = tenure_years * 12;

        let mut balance = initial_investment;
        let mut total_withdrawn = 0.0;
        let mut months_elapsed = 0;
        let mut exhausted = false;

        for _ in 0..tenure_months {
            months_elapsed += 1;
            balance *= 1.0 + r;

            if balance >= monthly_withdrawal {
                balance -= monthly_withdrawal;
                total_withdrawn += monthly_withdrawal;
            } else {
                total_withdrawn += balance;
                balance = 0.0;
                exhausted = true;
                break;
            }
        }

        Self {
            initial_investment,
            total_withdrawn,
            remaining_balance: balance,
            months_elapsed,
            exhausted,
        }
    }

    pub fn total_returns(&self) -> f64 {
        (self.total_withdrawn + self.remaining_balance) - self.initial_investment
    }

    pub fn summary(&self) -> SwpSummary {
        SwpSummary {
            total_withdrawn: round_unit(self.total_withdrawn),
            remaining_balance: round_unit(self.remaining_balance),
            total_returns: round_unit(self.total_returns()),
            initial_investment: round_unit(self.initial_investment),
        }
    }
}

/// Rounded SWP figures as shown to the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwpSummary {
    pub total_withdrawn: i64,
    pub remaining_balance: i64,
    pub total_returns: i64,
    pub initial_investment: i64,
}

pub fn swp(
    initial_investment: f64,
    monthly_withdrawal: f64,
    annual_return_percent: f64,
    tenure_years: u32,
) -> SwpSummary {
    SwpSchedule::simulate(
        initial_investment,
        monthly_withdrawal,
        annual_return_percent,
        tenure_years,
    )
    .summary()
}

/// Formats a whole rupee amount with Indian digit grouping, e.g. `₹12,34,567`.
pub fn format_inr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let sign = if amount < 0 { "-" } else { "" };

    if digits.len() <= 3 {
        return format!("{sign}₹{digits}");
    }

    let (head, last_three) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();

    format!("{sign}₹{},{last_three}", groups.join(","))
}

pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emi_zero_rate_is_straight_line() {
        let result = emi(120_000.0, 0.0, 12);
        assert_eq!(result.emi, 10_000);
        assert_eq!(result.total_amount, 120_000);
        assert_eq!(result.total_interest, 0);
        assert_eq!(result.principal, 120_000);
    }

    #[test]
    fn vanishing_rate_falls_back_to_straight_line() {
        let result = emi(100_000.0, 1e-14, 12);
        assert_eq!(result.emi, 8_333);
        assert_eq!(result.total_amount, 100_000);
        assert_eq!(result.total_interest, 0);

        let result = sip(1_000.0, 1e-14, 1);
        assert_eq!(result.future_value, 12_000);
        assert_eq!(result.total_returns, 0);
    }

    #[test]
    fn emi_recovers_principal() {
        let result = emi(100_000.0, 10.0, 12);
        assert_eq!(result.emi, 8_792);
        assert!((result.total_amount - result.total_interest - result.principal).abs() <= 1);
    }

    #[test]
    fn emi_rounds_each_figure_from_unrounded_values() {
        // 8791.59 * 12 = 105499.06; re-deriving from the rounded emi would give 105504.
        let result = emi(100_000.0, 10.0, 12);
        assert_eq!(result.total_amount, 105_499);
        assert_eq!(result.total_interest, 5_499);
    }

    #[test]
    fn sip_zero_rate() {
        let result = sip(1_000.0, 0.0, 1);
        assert_eq!(result.future_value, 12_000);
        assert_eq!(result.total_investment, 12_000);
        assert_eq!(result.total_returns, 0);
    }

    #[test]
    fn sip_grows_with_positive_rate() {
        let result = sip(5_000.0, 12.0, 10);
        assert_eq!(result.total_investment, 600_000);
        assert_eq!(result.future_value, 1_161_695);
        assert_eq!(result.total_returns, result.future_value - result.total_investment);
    }

    #[test]
    fn swp_runs_full_tenure_when_funded() {
        let schedule = SwpSchedule::simulate(1_000_000.0, 5_000.0, 10.0, 10);
        assert!(!schedule.exhausted);
        assert_eq!(schedule.months_elapsed, 120);
        assert_eq!(schedule.total_withdrawn, 600_000.0);
        assert!(schedule.remaining_balance > 1_000_000.0);
    }

    #[test]
    fn swp_stops_early_when_fund_runs_dry() {
        let summary = swp(100_000.0, 10_000.0, 6.0, 5);
        let schedule = SwpSchedule::simulate(100_000.0, 10_000.0, 6.0, 5);
        assert!(schedule.exhausted);
        assert!(schedule.months_elapsed < 60);
        assert_eq!(summary.remaining_balance, 0);
        assert_eq!(schedule.remaining_balance, 0.0);
    }

    #[test]
    fn swp_withdrawal_larger_than_first_month_balance() {
        let schedule = SwpSchedule::simulate(10_000.0, 50_000.0, 12.0, 3);
        assert_eq!(schedule.months_elapsed, 1);
        assert!(schedule.exhausted);
        assert_eq!(schedule.remaining_balance, 0.0);
        assert!((schedule.total_withdrawn - 10_100.0).abs() < 1e-9);

        let summary = schedule.summary();
        assert_eq!(summary.total_withdrawn, 10_100);
        assert_eq!(summary.total_returns, 100);
    }

    #[test]
    fn swp_conserves_money() {
        let cases = [
            (1_000_000.0, 10_000.0, 10.0, 10),
            (250_000.0, 7_500.0, 0.0, 5),
            (50_000.0, 60_000.0, 8.0, 1),
            (3_000_000.0, 25_000.0, 7.5, 30),
        ];
        for (initial, withdrawal, rate, years) in cases {
            let schedule = SwpSchedule::simulate(initial, withdrawal, rate, years);
            assert_eq!(
                schedule.total_withdrawn + schedule.remaining_balance - initial,
                schedule.total_returns()
            );

            let summary = schedule.summary();
            let drift = summary.total_withdrawn + summary.remaining_balance
                - summary.initial_investment
                - summary.total_returns;
            assert!(drift.abs() <= 1, "rounding drift {drift} for {initial}/{withdrawal}");
        }
    }

    #[test]
    fn swp_zero_rate_depletes_linearly() {
        let summary = swp(120_000.0, 10_000.0, 0.0, 2);
        assert_eq!(summary.total_withdrawn, 120_000);
        assert_eq!(summary.remaining_balance, 0);
        assert_eq!(summary.total_returns, 0);
    }

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_unit(2.5), 3);
        assert_eq!(round_unit(-2.5), -2);
        assert_eq!(round_unit(-2.51), -3);
    }

    #[test]
    fn formats_indian_grouping() {
        assert_eq!(format_inr(0), "₹0");
        assert_eq!(format_inr(999), "₹999");
        assert_eq!(format_inr(1_000), "₹1,000");
        assert_eq!(format_inr(100_000), "₹1,00,000");
        assert_eq!(format_inr(1_234_567), "₹12,34,567");
        assert_eq!(format_inr(-45_000), "-₹45,000");
        assert_eq!(format_percentage(12.0, 2), "12.00%");
    }
}
