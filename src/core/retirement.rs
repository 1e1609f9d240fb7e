use serde::Serialize;
use tracing::debug;

use super::growth::{GrowthSchedule, MAX_YEARS, inflation_factor};
use super::solver::{SolveConfig, solve_minimum};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalances {
    pub rrsp: f64,
    pub tfsa: f64,
    pub non_registered: f64,
    /// Defined-benefit commuted value; grows but takes no contributions.
    pub pension: f64,
}

impl AccountBalances {
    pub fn total(&self) -> f64 {
        self.rrsp + self.tfsa + self.non_registered + self.pension
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AnnualContributions {
    pub rrsp: f64,
    pub tfsa: f64,
    pub non_registered: f64,
}

impl AnnualContributions {
    pub fn total(&self) -> f64 {
        self.rrsp + self.tfsa + self.non_registered
    }
}

/// A government benefit paid from `start_age` onward.
#[derive(Debug, Clone, Copy)]
pub struct GovernmentBenefit {
    pub start_age: u32,
    pub monthly_amount: f64,
}

impl GovernmentBenefit {
    fn annual_at(&self, age: u32) -> f64 {
        if age >= self.start_age {
            self.monthly_amount * 12.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetirementInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub current_income: f64,
    pub desired_income_percent: f64,
    pub savings: AccountBalances,
    pub contributions: AnnualContributions,
    pub pre_retirement_return: f64,
    pub post_retirement_return: f64,
    pub inflation_rate: f64,
    pub cpp: GovernmentBenefit,
    pub oas: GovernmentBenefit,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementYear {
    pub age: u32,
    pub year: u32,
    pub withdrawal: f64,
    pub required_withdrawal: f64,
    pub cpp: f64,
    pub oas: f64,
    pub total_income: f64,
    pub desired_income: f64,
    pub remaining_savings: f64,
    pub shortfall: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementResult {
    pub years_to_retirement: u32,
    pub years_in_retirement: u32,
    pub desired_annual_income: f64,
    pub desired_monthly_income: f64,
    pub total_current_savings: f64,
    pub total_annual_contributions: f64,
    pub savings_at_retirement: AccountBalances,
    pub total_savings_at_retirement: f64,
    pub average_annual_income: f64,
    pub shortfall_years: u32,
    pub readiness_score: u32,
    /// Coarse advisory figure, 80% of the undiscounted gap spread over the
    /// working years.
    pub additional_monthly_savings: f64,
    /// Smallest extra monthly non-registered saving that removes every
    /// shortfall year; `None` when no amount within the search range does.
    pub required_monthly_savings: Option<f64>,
    pub truncated: bool,
    pub yearly: Vec<RetirementYear>,
}

struct Simulation {
    at_retirement: AccountBalances,
    yearly: Vec<RetirementYear>,
    shortfall_years: u32,
    total_income: f64,
    remaining_savings: f64,
}

/// `None` unless `current_age < retirement_age < life_expectancy`.
pub fn calculate_retirement(inputs: &RetirementInputs) -> Option<RetirementResult> {
    if inputs.retirement_age <= inputs.current_age
        || inputs.life_expectancy <= inputs.retirement_age
    {
        return None;
    }
    let years_to_retirement = inputs.retirement_age - inputs.current_age;
    let years_in_retirement = inputs.life_expectancy - inputs.retirement_age;
    let desired_annual_income = inputs.current_income * inputs.desired_income_percent / 100.0;

    let base = simulate(inputs, desired_annual_income, 0.0);
    let years_simulated = base.yearly.len() as u32;

    let additional_monthly_savings = if base.shortfall_years > 0 {
        ((desired_annual_income * years_simulated as f64 - base.total_income)
            / (years_to_retirement as f64 * 12.0)
            * 0.8)
            .max(0.0)
    } else {
        0.0
    };

    let required_monthly_savings = if base.shortfall_years == 0 {
        Some(0.0)
    } else {
        solve_required_monthly_savings(inputs, desired_annual_income, &base)
    };

    Some(RetirementResult {
        years_to_retirement,
        years_in_retirement,
        desired_annual_income,
        desired_monthly_income: desired_annual_income / 12.0,
        total_current_savings: inputs.savings.total(),
        total_annual_contributions: inputs.contributions.total(),
        total_savings_at_retirement: base.at_retirement.total(),
        savings_at_retirement: base.at_retirement,
        average_annual_income: base.total_income / years_simulated.max(1) as f64,
        shortfall_years: base.shortfall_years,
        readiness_score: readiness_score(
            base.shortfall_years,
            years_simulated,
            base.remaining_savings,
        ),
        additional_monthly_savings,
        required_monthly_savings,
        truncated: years_to_retirement > MAX_YEARS || years_in_retirement > MAX_YEARS,
        yearly: base.yearly,
    })
}

/// 100 when the plan never falls short and money is left over, stepping down
/// with the share of retirement years that fall short.
pub fn readiness_score(shortfall_years: u32, years_in_retirement: u32, remaining: f64) -> u32 {
    let shortfall = shortfall_years as f64;
    let span = years_in_retirement as f64;
    if shortfall_years == 0 {
        if remaining > 0.0 { 100 } else { 90 }
    } else if shortfall < span / 4.0 {
        75
    } else if shortfall < span / 2.0 {
        50
    } else if shortfall < span * 3.0 / 4.0 {
        25
    } else {
        10
    }
}

fn simulate(inputs: &RetirementInputs, desired_annual_income: f64, extra_monthly: f64) -> Simulation {
    let years_to_retirement = inputs.retirement_age - inputs.current_age;
    let pre = inputs.pre_retirement_return / 100.0;
    let grow = |start: f64, contribution: f64| {
        GrowthSchedule::annual(start, years_to_retirement, pre)
            .run(|_| contribution, |_, _| 0.0)
            .final_balance
    };

    let at_retirement = AccountBalances {
        rrsp: grow(inputs.savings.rrsp, inputs.contributions.rrsp),
        tfsa: grow(inputs.savings.tfsa, inputs.contributions.tfsa),
        non_registered: grow(
            inputs.savings.non_registered,
            inputs.contributions.non_registered + extra_monthly * 12.0,
        ),
        pension: grow(inputs.savings.pension, 0.0),
    };

    let years_in_retirement = (inputs.life_expectancy - inputs.retirement_age).min(MAX_YEARS);
    let post = inputs.post_retirement_return / 100.0;
    let mut remaining = at_retirement.total();
    let mut total_income = 0.0;
    let mut shortfall_years = 0;
    let mut yearly = Vec::with_capacity(years_in_retirement as usize);

    for year in 1..=years_in_retirement {
        let age = inputs.retirement_age + year - 1;
        let cpp = inputs.cpp.annual_at(age);
        let oas = inputs.oas.annual_at(age);

        let desired_income =
            desired_annual_income * inflation_factor(inputs.inflation_rate, (year - 1) as f64);
        let required_withdrawal = (desired_income - cpp - oas).max(0.0);
        let withdrawal = required_withdrawal.min(remaining.max(0.0));
        let shortfall = withdrawal < required_withdrawal;
        if shortfall {
            shortfall_years += 1;
        }

        remaining = (remaining - withdrawal) * (1.0 + post);
        let total = withdrawal + cpp + oas;
        total_income += total;

        yearly.push(RetirementYear {
            age,
            year,
            withdrawal,
            required_withdrawal,
            cpp,
            oas,
            total_income: total,
            desired_income,
            remaining_savings: remaining,
            shortfall,
        });
    }

    Simulation {
        at_retirement,
        yearly,
        shortfall_years,
        total_income,
        remaining_savings: remaining,
    }
}

fn solve_required_monthly_savings(
    inputs: &RetirementInputs,
    desired_annual_income: f64,
    base: &Simulation,
) -> Option<f64> {
    // Saving every future withdrawal in a single working year is always enough
    // when returns are non-negative.
    let total_need: f64 = base.yearly.iter().map(|y| y.required_withdrawal).sum();
    let config = SolveConfig {
        search_min: 0.0,
        search_max: (total_need / 12.0).max(1.0),
        tolerance: 0.01,
        max_iterations: 100,
    };

    let solved = solve_minimum(config, |extra| {
        simulate(inputs, desired_annual_income, extra).shortfall_years == 0
    });
    match solved {
        Ok(result) if result.feasible => result.solved_value,
        Ok(result) => {
            debug!(message = %result.message, "required monthly savings not found");
            None
        }
        Err(err) => {
            debug!(error = %err, "required monthly savings solver rejected its config");
            None
        }
    }
}
