use serde::Serialize;

use super::growth::{GrowthSchedule, inflation_factor, ratio_or};

pub const FHSA_ANNUAL_LIMIT: f64 = 8_000.0;
pub const FHSA_LIFETIME_LIMIT: f64 = 40_000.0;
/// Years an account may stay open.
pub const FHSA_MAX_YEARS: u32 = 15;

#[derive(Debug, Clone)]
pub struct FhsaInputs {
    pub current_age: u32,
    pub annual_income: f64,
    pub marginal_tax_rate: f64,
    pub current_balance: f64,
    pub annual_contribution: f64,
    pub expected_return: f64,
    pub inflation_rate: f64,
    pub target_home_price: f64,
    pub down_payment_percent: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FhsaYear {
    pub year: u32,
    pub age: u32,
    pub contribution: f64,
    pub balance: f64,
    pub total_contributions: f64,
    pub tax_savings: f64,
    pub investment_return: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FhsaResult {
    pub adjusted_annual_contribution: f64,
    /// `None` when no further contributions can be made.
    pub years_to_limit: Option<u32>,
    pub horizon_years: u32,
    pub final_balance: f64,
    pub total_contributions: f64,
    pub total_tax_savings: f64,
    pub inflation_adjusted_balance: f64,
    pub target_down_payment: f64,
    pub down_payment_percent_achieved: f64,
    pub additional_savings_needed: f64,
    /// `None` when the target is not reached within the horizon.
    pub years_to_down_payment: Option<u32>,
    pub yearly: Vec<FhsaYear>,
}

pub fn calculate_fhsa(inputs: &FhsaInputs) -> FhsaResult {
    let remaining_room = (FHSA_LIFETIME_LIMIT - inputs.current_balance).max(0.0);
    let adjusted_annual_contribution = inputs
        .annual_contribution
        .min(FHSA_ANNUAL_LIMIT)
        .min(remaining_room)
        .max(0.0);

    let years_to_limit = (adjusted_annual_contribution > 0.0)
        .then(|| (remaining_room / adjusted_annual_contribution).ceil() as u32);
    let horizon_years = years_to_limit.map_or(FHSA_MAX_YEARS, |n| n.min(FHSA_MAX_YEARS));

    let run = GrowthSchedule::annual(
        inputs.current_balance,
        horizon_years,
        inputs.expected_return / 100.0,
    )
    .run(
        |state| {
            adjusted_annual_contribution
                .min(FHSA_LIFETIME_LIMIT - state.total_contributions)
                .max(0.0)
        },
        |_, _| 0.0,
    );

    let rate = inputs.marginal_tax_rate / 100.0;
    let mut tax_savings = 0.0;
    let yearly: Vec<FhsaYear> = run
        .periods
        .iter()
        .map(|p| {
            tax_savings += p.contribution * rate;
            FhsaYear {
                year: p.period,
                age: inputs.current_age.saturating_add(p.period),
                contribution: p.contribution,
                balance: p.balance,
                total_contributions: p.total_contributions,
                tax_savings,
                investment_return: p.growth,
            }
        })
        .collect();

    let target_down_payment = inputs.target_home_price * inputs.down_payment_percent / 100.0;
    let years_to_down_payment = yearly
        .iter()
        .find(|y| y.balance >= target_down_payment)
        .map(|y| y.year);

    FhsaResult {
        adjusted_annual_contribution,
        years_to_limit,
        horizon_years,
        final_balance: run.final_balance,
        total_contributions: run.total_contributions,
        total_tax_savings: tax_savings,
        inflation_adjusted_balance: run.final_balance
            / inflation_factor(inputs.inflation_rate, horizon_years as f64),
        target_down_payment,
        down_payment_percent_achieved: (ratio_or(run.final_balance, target_down_payment, 1.0)
            * 100.0)
            .min(100.0),
        additional_savings_needed: (target_down_payment - run.final_balance).max(0.0),
        years_to_down_payment,
        yearly,
    }
}
