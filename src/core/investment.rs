use serde::Serialize;

use super::growth::{GrowthSchedule, inflation_factor};
use super::savings::AccountType;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RiskProfile {
    Conservative,
    Balanced,
    Growth,
    Aggressive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpectedReturn {
    pub average: f64,
    pub low: f64,
    pub high: f64,
}

impl RiskProfile {
    pub fn expected_return(self) -> ExpectedReturn {
        let (average, low, high) = match self {
            RiskProfile::Conservative => (4.0, 2.0, 6.0),
            RiskProfile::Balanced => (6.0, 3.0, 9.0),
            RiskProfile::Growth => (8.0, 4.0, 12.0),
            RiskProfile::Aggressive => (10.0, 5.0, 15.0),
        };
        ExpectedReturn { average, low, high }
    }
}

#[derive(Debug, Clone)]
pub struct InvestmentInputs {
    pub initial_investment: f64,
    pub monthly_contribution: f64,
    pub years: u32,
    pub risk_profile: RiskProfile,
    /// Overrides the profile's average when set.
    pub custom_return: Option<f64>,
    pub fee_percentage: f64,
    pub inflation_rate: f64,
    pub tax_rate: f64,
    pub account_type: AccountType,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentYear {
    pub year: u32,
    pub balance: f64,
    pub contributions: f64,
    pub growth: f64,
    pub fees: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentResult {
    pub expected_return: ExpectedReturn,
    pub applied_return: f64,
    pub final_balance: f64,
    pub total_contributions: f64,
    pub total_growth: f64,
    pub total_fees: f64,
    pub after_tax_value: f64,
    pub inflation_adjusted_value: f64,
    pub annualized_return: f64,
    pub effective_return: f64,
    pub truncated: bool,
    pub yearly: Vec<InvestmentYear>,
}

pub fn calculate_investment(inputs: &InvestmentInputs) -> InvestmentResult {
    let expected_return = inputs.risk_profile.expected_return();
    let applied_return = inputs.custom_return.unwrap_or(expected_return.average);

    let run = GrowthSchedule::monthly(
        inputs.initial_investment,
        inputs.years.saturating_mul(12),
        applied_return / 100.0 / 12.0,
    )
    .with_drag(inputs.fee_percentage / 100.0 / 12.0)
    .run(|_| inputs.monthly_contribution, |_, _| 0.0);

    let mut fees = 0.0;
    let mut yearly = Vec::with_capacity(run.periods.len() / 12);
    for p in &run.periods {
        fees += p.drag;
        if p.period % 12 == 0 {
            yearly.push(InvestmentYear {
                year: p.period / 12,
                balance: p.balance,
                contributions: p.total_contributions,
                growth: p.balance - p.total_contributions,
                fees,
            });
        }
    }

    let years_run = run.periods.len() as f64 / 12.0;
    let annualized_return = if inputs.initial_investment > 0.0 && years_run > 0.0 {
        ((run.final_balance / inputs.initial_investment).powf(1.0 / years_run) - 1.0) * 100.0
    } else {
        0.0
    };

    InvestmentResult {
        expected_return,
        applied_return,
        final_balance: run.final_balance,
        total_contributions: run.total_contributions,
        total_growth: run.final_balance - run.total_contributions,
        total_fees: run.total_drag,
        after_tax_value: inputs.account_type.after_tax_value(
            run.final_balance,
            run.total_contributions,
            inputs.tax_rate,
        ),
        inflation_adjusted_value: run.final_balance
            / inflation_factor(inputs.inflation_rate, years_run),
        annualized_return,
        effective_return: annualized_return - inputs.fee_percentage,
        truncated: run.truncated,
        yearly,
    }
}
