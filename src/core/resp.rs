use serde::Serialize;

use super::growth::{GrowthSchedule, inflation_factor, ratio_or};

pub const CESG_MATCH_RATE: f64 = 0.20;
/// Contribution eligible for the basic grant each year.
pub const CESG_ELIGIBLE_CONTRIBUTION: f64 = 2_500.0;
pub const CESG_ANNUAL_MAX: f64 = 500.0;
pub const CESG_LIFETIME_MAX: f64 = 7_200.0;
/// Grants stop after the calendar year the beneficiary turns 17.
pub const CESG_LAST_AGE: u32 = 17;
pub const RESP_LIFETIME_CONTRIBUTION_LIMIT: f64 = 50_000.0;
pub const EDUCATION_AGE: u32 = 18;

#[derive(Debug, Clone)]
pub struct Child {
    pub name: String,
    pub age: u32,
    pub target_amount: f64,
}

#[derive(Debug, Clone)]
pub struct RespInputs {
    pub children: Vec<Child>,
    pub current_balance: f64,
    pub annual_contribution: f64,
    pub expected_return: f64,
    pub inflation_rate: f64,
    pub include_grants: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespYear {
    pub year: u32,
    pub age: u32,
    pub contribution: f64,
    pub grant: f64,
    pub balance: f64,
    pub total_contributions: f64,
    pub total_grants: f64,
    pub investment_return: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildProjection {
    pub name: String,
    pub age: u32,
    pub target_amount: f64,
    pub years_to_education: u32,
    pub final_balance: f64,
    pub total_contributions: f64,
    pub total_grants: f64,
    pub inflation_adjusted_balance: f64,
    pub inflation_adjusted_target: f64,
    pub target_percent_achieved: f64,
    pub additional_savings_needed: f64,
    pub yearly: Vec<RespYear>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespResult {
    pub children: Vec<ChildProjection>,
    /// Names of beneficiaries already at or past education age.
    pub skipped: Vec<String>,
    pub total_final_balance: f64,
    pub total_contributions: f64,
    pub total_grants: f64,
    pub total_additional_needed: f64,
}

/// Basic CESG on one year's contribution, limited by the lifetime room left.
pub fn cesg_for(contribution: f64, grants_so_far: f64) -> f64 {
    let matched = contribution.clamp(0.0, CESG_ELIGIBLE_CONTRIBUTION) * CESG_MATCH_RATE;
    matched
        .min(CESG_ANNUAL_MAX)
        .min((CESG_LIFETIME_MAX - grants_so_far).max(0.0))
}

/// `None` when no children are listed.
pub fn calculate_resp(inputs: &RespInputs) -> Option<RespResult> {
    if inputs.children.is_empty() {
        return None;
    }

    let count = inputs.children.len() as f64;
    let contribution_per_child = inputs.annual_contribution.max(0.0) / count;
    let initial_per_child = inputs.current_balance / count;

    let mut children = Vec::with_capacity(inputs.children.len());
    let mut skipped = Vec::new();
    for child in &inputs.children {
        if child.age >= EDUCATION_AGE {
            skipped.push(child.name.clone());
            continue;
        }
        children.push(project_child(
            inputs,
            child,
            initial_per_child,
            contribution_per_child,
        ));
    }

    Some(RespResult {
        total_final_balance: children.iter().map(|c| c.final_balance).sum(),
        total_contributions: children.iter().map(|c| c.total_contributions).sum(),
        total_grants: children.iter().map(|c| c.total_grants).sum(),
        total_additional_needed: children.iter().map(|c| c.additional_savings_needed).sum(),
        children,
        skipped,
    })
}

fn project_child(
    inputs: &RespInputs,
    child: &Child,
    initial_balance: f64,
    contribution: f64,
) -> ChildProjection {
    let years_to_education = EDUCATION_AGE - child.age;
    let run = GrowthSchedule::annual(
        initial_balance,
        years_to_education,
        inputs.expected_return / 100.0,
    )
    .run(
        |state| {
            contribution
                .min(RESP_LIFETIME_CONTRIBUTION_LIMIT - state.total_contributions)
                .max(0.0)
        },
        |state, paid| {
            if inputs.include_grants && child.age + state.period <= CESG_LAST_AGE {
                cesg_for(paid, state.total_grants)
            } else {
                0.0
            }
        },
    );

    let yearly = run
        .periods
        .iter()
        .map(|p| RespYear {
            year: p.period,
            age: child.age + p.period,
            contribution: p.contribution,
            grant: p.grant,
            balance: p.balance,
            total_contributions: p.total_contributions,
            total_grants: p.total_grants,
            investment_return: p.growth,
        })
        .collect();

    let factor = inflation_factor(inputs.inflation_rate, years_to_education as f64);
    let inflation_adjusted_target = child.target_amount * factor;

    ChildProjection {
        name: child.name.clone(),
        age: child.age,
        target_amount: child.target_amount,
        years_to_education,
        final_balance: run.final_balance,
        total_contributions: run.total_contributions,
        total_grants: run.total_grants,
        inflation_adjusted_balance: run.final_balance / factor,
        inflation_adjusted_target,
        target_percent_achieved: (ratio_or(run.final_balance, inflation_adjusted_target, 1.0)
            * 100.0)
            .min(100.0),
        additional_savings_needed: (inflation_adjusted_target - run.final_balance).max(0.0),
        yearly,
    }
}
