use serde::Serialize;

use super::growth::ratio_or;
use super::mortgage::{annuity_payment, annuity_present_value, insurance_premium_rate};

/// Gross Debt Service ceiling: housing costs as a share of gross income.
pub const MAX_GDS_RATIO: f64 = 0.32;
/// Total Debt Service ceiling: all debt obligations as a share of gross income.
pub const MAX_TDS_RATIO: f64 = 0.40;
/// Percentage points added to the contract rate for the qualifying rate.
pub const STRESS_TEST_BUFFER: f64 = 2.0;
/// Fixed illustrative price used for the minimum-income cross-check.
pub const ILLUSTRATIVE_HOME_PRICE: f64 = 500_000.0;

#[derive(Debug, Clone)]
pub struct AffordabilityInputs {
    pub annual_income: f64,
    pub additional_income: f64,
    pub monthly_debts: f64,
    pub down_payment: f64,
    pub interest_rate: f64,
    pub amortization_years: u32,
    pub property_tax_rate: f64,
    pub monthly_heating: f64,
    pub monthly_condo_fees: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityResult {
    pub monthly_income: f64,
    pub gds_payment_ceiling: f64,
    pub tds_payment_ceiling: f64,
    pub max_monthly_payment: f64,
    pub max_mortgage_amount: f64,
    pub max_home_price: f64,
    pub stress_test_rate: f64,
    pub stress_test_max_mortgage_amount: f64,
    pub stress_test_max_home_price: f64,
    pub monthly_property_tax: f64,
    pub total_monthly_housing_cost: f64,
    pub gds_percent: f64,
    pub tds_percent: f64,
    pub minimum_down_payment: f64,
    pub minimum_down_payment_percent: f64,
    pub cmhc_insurance: f64,
    pub illustrative_home_price: f64,
    pub illustrative_minimum_income: f64,
}

/// Tiered legal minimum: 5% up to $500k, 10% on the portion above up to
/// $1M, 20% of the whole price at or above $1M.
pub fn minimum_down_payment(home_price: f64) -> f64 {
    if home_price <= 500_000.0 {
        home_price * 0.05
    } else if home_price < 1_000_000.0 {
        25_000.0 + (home_price - 500_000.0) * 0.10
    } else {
        home_price * 0.20
    }
}

pub fn calculate_affordability(inputs: &AffordabilityInputs) -> AffordabilityResult {
    let monthly_income = (inputs.annual_income + inputs.additional_income) / 12.0;
    let gds_payment_ceiling = monthly_income * MAX_GDS_RATIO;
    let tds_payment_ceiling = monthly_income * MAX_TDS_RATIO;
    let max_monthly_payment = gds_payment_ceiling
        .min(tds_payment_ceiling - inputs.monthly_debts)
        .max(0.0);

    let periods = inputs.amortization_years * 12;
    let max_mortgage_amount =
        annuity_present_value(max_monthly_payment, monthly_rate(inputs.interest_rate), periods);
    let max_home_price = max_mortgage_amount + inputs.down_payment;

    let stress_test_rate = inputs.interest_rate + STRESS_TEST_BUFFER;
    let stress_test_max_mortgage_amount =
        annuity_present_value(max_monthly_payment, monthly_rate(stress_test_rate), periods);
    let stress_test_max_home_price = stress_test_max_mortgage_amount + inputs.down_payment;

    let monthly_property_tax = max_home_price * inputs.property_tax_rate / 100.0 / 12.0;
    let total_monthly_housing_cost = max_monthly_payment
        + monthly_property_tax
        + inputs.monthly_heating
        + inputs.monthly_condo_fees;

    let minimum_down_payment = minimum_down_payment(max_home_price);
    let down_payment_percent = ratio_or(inputs.down_payment, max_home_price, 0.0) * 100.0;
    let cmhc_insurance = insurance_premium_rate(down_payment_percent).unwrap_or(0.0)
        * (max_home_price - inputs.down_payment).max(0.0);

    AffordabilityResult {
        monthly_income,
        gds_payment_ceiling,
        tds_payment_ceiling,
        max_monthly_payment,
        max_mortgage_amount,
        max_home_price,
        stress_test_rate,
        stress_test_max_mortgage_amount,
        stress_test_max_home_price,
        monthly_property_tax,
        total_monthly_housing_cost,
        gds_percent: ratio_or(total_monthly_housing_cost, monthly_income, 0.0) * 100.0,
        tds_percent: ratio_or(
            total_monthly_housing_cost + inputs.monthly_debts,
            monthly_income,
            0.0,
        ) * 100.0,
        minimum_down_payment,
        minimum_down_payment_percent: ratio_or(minimum_down_payment, max_home_price, 0.0) * 100.0,
        cmhc_insurance,
        illustrative_home_price: ILLUSTRATIVE_HOME_PRICE,
        illustrative_minimum_income: minimum_income_for(inputs, ILLUSTRATIVE_HOME_PRICE),
    }
}

/// Gross annual income at which `home_price` just satisfies both ratios.
fn minimum_income_for(inputs: &AffordabilityInputs, home_price: f64) -> f64 {
    let mortgage = (home_price - inputs.down_payment).max(0.0);
    let payment = annuity_payment(
        mortgage,
        monthly_rate(inputs.interest_rate),
        inputs.amortization_years * 12,
    );
    let housing = payment
        + home_price * inputs.property_tax_rate / 100.0 / 12.0
        + inputs.monthly_heating
        + inputs.monthly_condo_fees;

    let by_gds = housing / MAX_GDS_RATIO * 12.0;
    let by_tds = (housing + inputs.monthly_debts) / MAX_TDS_RATIO * 12.0;
    by_gds.max(by_tds)
}

fn monthly_rate(annual_percent: f64) -> f64 {
    annual_percent / 100.0 / 12.0
}
