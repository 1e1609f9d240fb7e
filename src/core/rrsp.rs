use serde::Serialize;

use super::growth::{GrowthSchedule, inflation_factor};

pub const RRSP_ROOM_RATE: f64 = 0.18;
/// Dollar ceiling on new annual room (2025).
pub const RRSP_DOLLAR_LIMIT: f64 = 31_560.0;
pub const SAFE_WITHDRAWAL_RATE: f64 = 0.04;

#[derive(Debug, Clone)]
pub struct RrspInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_income: f64,
    pub current_balance: f64,
    pub annual_contribution: f64,
    /// Room carried forward from earlier years.
    pub unused_room: f64,
    pub expected_return: f64,
    pub inflation_rate: f64,
    pub current_tax_rate: f64,
    pub retirement_tax_rate: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RrspYear {
    pub age: u32,
    pub year: u32,
    pub balance: f64,
    pub contributions: f64,
    pub tax_savings: f64,
    pub investment_return: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RrspResult {
    pub years_to_retirement: u32,
    pub contribution_room: f64,
    /// New room plus carried-forward room in the first year.
    pub available_room: f64,
    /// First-year contribution after the room clamp.
    pub applied_contribution: f64,
    pub excess_contribution: f64,
    /// Room still unused after the last contribution year.
    pub unused_room_at_retirement: f64,
    pub real_return_rate: f64,
    pub future_value: f64,
    pub total_contributions: f64,
    pub total_tax_savings: f64,
    pub annual_retirement_income: f64,
    pub monthly_retirement_income: f64,
    pub after_tax_retirement_income: f64,
    pub inflation_adjusted_balance: f64,
    pub inflation_adjusted_income: f64,
    pub truncated: bool,
    pub yearly: Vec<RrspYear>,
}

/// New room earned from one year of income.
pub fn contribution_room(income: f64) -> f64 {
    (income.max(0.0) * RRSP_ROOM_RATE).min(RRSP_DOLLAR_LIMIT)
}

/// `None` when retirement is not after the current age.
pub fn calculate_rrsp(inputs: &RrspInputs) -> Option<RrspResult> {
    if inputs.retirement_age <= inputs.current_age {
        return None;
    }
    let years_to_retirement = inputs.retirement_age - inputs.current_age;

    let room = contribution_room(inputs.current_income);
    let contribution = inputs.annual_contribution.max(0.0);
    let mut carried_room = inputs.unused_room.max(0.0);
    let available_room = room + carried_room;
    let applied_contribution = contribution.min(available_room);
    let excess_contribution = (inputs.annual_contribution - applied_contribution).max(0.0);

    // Each year earns fresh room; whatever is not contributed carries forward.
    let run = GrowthSchedule::annual(
        inputs.current_balance,
        years_to_retirement,
        inputs.expected_return / 100.0,
    )
    .run(
        |_| {
            let available = room + carried_room;
            let applied = contribution.min(available);
            carried_room = available - applied;
            applied
        },
        |_, _| 0.0,
    );

    let tax_rate = inputs.current_tax_rate / 100.0;
    let mut tax_savings = 0.0;
    let yearly = run
        .periods
        .iter()
        .map(|p| {
            tax_savings += p.contribution * tax_rate;
            RrspYear {
                age: inputs.current_age.saturating_add(p.period),
                year: p.period,
                balance: p.balance,
                contributions: p.total_contributions,
                tax_savings,
                investment_return: p.growth,
            }
        })
        .collect::<Vec<_>>();

    let years_run = run.periods.len() as u32;
    let annual_retirement_income = run.final_balance * SAFE_WITHDRAWAL_RATE;
    let factor = inflation_factor(inputs.inflation_rate, years_run as f64);

    Some(RrspResult {
        years_to_retirement,
        contribution_room: room,
        available_room,
        applied_contribution,
        excess_contribution,
        unused_room_at_retirement: carried_room,
        real_return_rate: ((1.0 + inputs.expected_return / 100.0)
            / (1.0 + inputs.inflation_rate / 100.0)
            - 1.0)
            * 100.0,
        future_value: run.final_balance,
        total_contributions: run.total_contributions,
        total_tax_savings: tax_savings,
        annual_retirement_income,
        monthly_retirement_income: annual_retirement_income / 12.0,
        after_tax_retirement_income: annual_retirement_income
            * (1.0 - inputs.retirement_tax_rate / 100.0),
        inflation_adjusted_balance: run.final_balance / factor,
        inflation_adjusted_income: annual_retirement_income / factor,
        truncated: run.truncated,
        yearly,
    })
}
