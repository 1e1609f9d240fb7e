use serde::Serialize;

use super::growth::{GrowthSchedule, inflation_factor};

/// Annual TFSA contribution room (2025).
pub const TFSA_ANNUAL_LIMIT: f64 = 7_000.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Compounding {
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl Compounding {
    pub fn per_year(self) -> u32 {
        match self {
            Compounding::Monthly => 12,
            Compounding::Quarterly => 4,
            Compounding::SemiAnnual => 2,
            Compounding::Annual => 1,
        }
    }
}

/// Tax wrapper the balance sits in; drives the after-tax valuation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AccountType {
    Tfsa,
    Rrsp,
    NonRegistered,
}

impl AccountType {
    /// TFSA withdrawals are untaxed, RRSP withdrawals are taxed in full,
    /// non-registered accounts pay tax on growth only.
    pub fn after_tax_value(self, balance: f64, contributions: f64, tax_rate: f64) -> f64 {
        let rate = tax_rate / 100.0;
        match self {
            AccountType::Tfsa => balance,
            AccountType::Rrsp => balance * (1.0 - rate),
            AccountType::NonRegistered => balance - (balance - contributions) * rate,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SavingsInputs {
    pub initial_deposit: f64,
    pub monthly_contribution: f64,
    pub interest_rate: f64,
    pub years: u32,
    pub compounding: Compounding,
    pub account_type: AccountType,
    pub tax_rate: f64,
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsYear {
    pub year: u32,
    pub balance: f64,
    pub contributions: f64,
    pub interest: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsResult {
    pub future_value: f64,
    pub total_contributions: f64,
    pub total_interest: f64,
    pub after_tax_value: f64,
    pub inflation_adjusted_value: f64,
    pub exceeds_tfsa_limit: bool,
    pub truncated: bool,
    pub yearly: Vec<SavingsYear>,
}

pub fn calculate_savings(inputs: &SavingsInputs) -> SavingsResult {
    let per_year = inputs.compounding.per_year();
    let run = GrowthSchedule::monthly(
        inputs.initial_deposit,
        inputs.years.saturating_mul(12),
        inputs.interest_rate / 100.0 / per_year as f64,
    )
    .with_growth_interval(12 / per_year)
    .run(|_| inputs.monthly_contribution, |_, _| 0.0);

    let yearly = run
        .periods
        .iter()
        .filter(|p| p.period % 12 == 0)
        .map(|p| SavingsYear {
            year: p.period / 12,
            balance: p.balance,
            contributions: p.total_contributions,
            interest: p.balance - p.total_contributions,
        })
        .collect();

    let years_run = run.periods.len() as f64 / 12.0;
    SavingsResult {
        future_value: run.final_balance,
        total_contributions: run.total_contributions,
        total_interest: run.final_balance - run.total_contributions,
        after_tax_value: inputs.account_type.after_tax_value(
            run.final_balance,
            run.total_contributions,
            inputs.tax_rate,
        ),
        inflation_adjusted_value: run.final_balance
            / inflation_factor(inputs.inflation_rate, years_run),
        exceeds_tfsa_limit: inputs.account_type == AccountType::Tfsa
            && inputs.monthly_contribution * 12.0 > TFSA_ANNUAL_LIMIT,
        truncated: run.truncated,
        yearly,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_inputs() -> SavingsInputs {
        SavingsInputs {
            initial_deposit: 1_000.0,
            monthly_contribution: 100.0,
            interest_rate: 12.0,
            years: 1,
            compounding: Compounding::Annual,
            account_type: AccountType::Tfsa,
            tax_rate: 30.0,
            inflation_rate: 2.0,
        }
    }

    #[test]
    fn oracle_annual_compounding_lands_once_per_year() {
        // (1000 + 12 * 100) * 1.12 = 2464
        let result = calculate_savings(&sample_inputs());
        assert_approx(result.future_value, 2_464.0);
        assert_approx(result.total_contributions, 2_200.0);
        assert_approx(result.total_interest, 264.0);
        assert_approx(result.inflation_adjusted_value, 2_464.0 / 1.02);
        assert_eq!(result.yearly.len(), 1);
    }

    #[test]
    fn quarterly_compounding_applies_rate_over_four() {
        let mut inputs = sample_inputs();
        inputs.compounding = Compounding::Quarterly;
        inputs.monthly_contribution = 0.0;
        let result = calculate_savings(&inputs);
        assert_approx(result.future_value, 1_000.0 * 1.03f64.powi(4));
    }

    #[test]
    fn more_frequent_compounding_earns_more() {
        let annual = calculate_savings(&sample_inputs());
        let mut inputs = sample_inputs();
        inputs.compounding = Compounding::Monthly;
        let monthly = calculate_savings(&inputs);
        assert!(monthly.future_value > annual.future_value);
    }

    #[test]
    fn after_tax_value_depends_on_account_type() {
        assert_approx(AccountType::Tfsa.after_tax_value(2_464.0, 2_200.0, 30.0), 2_464.0);
        assert_approx(AccountType::Rrsp.after_tax_value(2_464.0, 2_200.0, 30.0), 1_724.8);
        assert_approx(
            AccountType::NonRegistered.after_tax_value(2_464.0, 2_200.0, 30.0),
            2_464.0 - 264.0 * 0.3,
        );
    }

    #[test]
    fn tfsa_limit_flag_only_for_tfsa_over_room() {
        let mut inputs = sample_inputs();
        inputs.monthly_contribution = 600.0;
        assert!(calculate_savings(&inputs).exceeds_tfsa_limit);

        inputs.account_type = AccountType::NonRegistered;
        assert!(!calculate_savings(&inputs).exceeds_tfsa_limit);

        inputs.account_type = AccountType::Tfsa;
        inputs.monthly_contribution = 500.0;
        assert!(!calculate_savings(&inputs).exceeds_tfsa_limit);
    }

    #[test]
    fn zero_years_returns_the_deposit() {
        let mut inputs = sample_inputs();
        inputs.years = 0;
        let result = calculate_savings(&inputs);
        assert_eq!(result.future_value, 1_000.0);
        assert!(result.yearly.is_empty());
    }
}
