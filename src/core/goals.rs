use serde::Serialize;
use tracing::debug;

use super::growth::{MAX_MONTHS, inflation_factor, ratio_or};
use super::solver::{SolveConfig, solve_minimum};

/// Projection points are kept every this many months.
pub const POINT_INTERVAL_MONTHS: u32 = 3;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone)]
pub struct Goal {
    pub id: u32,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub monthly_contribution: f64,
    pub priority: Priority,
    /// Annual percent.
    pub expected_return: f64,
    /// Months within which the goal should be met, if any.
    pub deadline_months: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct GoalPlanInputs {
    pub goals: Vec<Goal>,
    pub monthly_income: f64,
    pub monthly_expenses: f64,
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPoint {
    pub month: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProjection {
    pub id: u32,
    pub name: String,
    pub priority: Priority,
    pub target_amount: f64,
    pub current_amount: f64,
    pub monthly_contribution: f64,
    pub months: u32,
    pub years: u32,
    pub remaining_months: u32,
    /// False when the month cap ran out first.
    pub reached: bool,
    pub final_balance: f64,
    pub progress_percent: f64,
    pub inflation_adjusted_target: f64,
    pub deadline_months: Option<u32>,
    /// Smallest monthly contribution that meets the deadline.
    pub required_monthly_contribution: Option<f64>,
    pub points: Vec<GoalPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPlanResult {
    pub available_monthly_savings: f64,
    pub total_monthly_contributions: f64,
    pub over_committed: bool,
    /// Sorted high priority first; ties keep their input order.
    pub goals: Vec<GoalProjection>,
}

struct TargetRun {
    months: u32,
    balance: f64,
    reached: bool,
    points: Vec<GoalPoint>,
}

/// Contribute then grow each month until the target is met or `max_months`
/// runs out.
fn run_to_target(goal: &Goal, monthly_contribution: f64, max_months: u32) -> TargetRun {
    let monthly_rate = goal.expected_return / 100.0 / 12.0;
    let mut balance = goal.current_amount;
    let mut months = 0;
    let mut points = Vec::new();

    while balance < goal.target_amount && months < max_months {
        months += 1;
        balance += monthly_contribution;
        balance *= 1.0 + monthly_rate;
        if months % POINT_INTERVAL_MONTHS == 0 || balance >= goal.target_amount {
            points.push(GoalPoint {
                month: months,
                balance,
            });
        }
    }

    TargetRun {
        months,
        balance,
        reached: balance >= goal.target_amount,
        points,
    }
}

fn required_contribution(goal: &Goal, deadline_months: u32) -> Option<f64> {
    if deadline_months == 0 {
        return (goal.current_amount >= goal.target_amount).then_some(0.0);
    }
    let config = SolveConfig {
        search_min: 0.0,
        search_max: goal.target_amount.max(1.0),
        tolerance: 0.01,
        max_iterations: 100,
    };
    let deadline = deadline_months.min(MAX_MONTHS);
    match solve_minimum(config, |c| run_to_target(goal, c, deadline).reached) {
        Ok(result) => result.solved_value,
        Err(err) => {
            debug!(goal = goal.id, error = %err, "deadline solver rejected its config");
            None
        }
    }
}

fn project_goal(goal: &Goal, inflation_rate: f64) -> GoalProjection {
    let run = run_to_target(goal, goal.monthly_contribution, MAX_MONTHS);
    if !run.reached {
        debug!(goal = goal.id, months = run.months, "goal not reached within the month cap");
    }

    let years = run.months / 12;
    let remaining_months = run.months % 12;
    let elapsed_years = years as f64 + remaining_months as f64 / 12.0;

    GoalProjection {
        id: goal.id,
        name: goal.name.clone(),
        priority: goal.priority,
        target_amount: goal.target_amount,
        current_amount: goal.current_amount,
        monthly_contribution: goal.monthly_contribution,
        months: run.months,
        years,
        remaining_months,
        reached: run.reached,
        final_balance: run.balance,
        progress_percent: (ratio_or(goal.current_amount, goal.target_amount, 1.0) * 100.0)
            .min(100.0),
        inflation_adjusted_target: goal.target_amount
            * inflation_factor(inflation_rate, elapsed_years),
        deadline_months: goal.deadline_months,
        required_monthly_contribution: goal
            .deadline_months
            .and_then(|deadline| required_contribution(goal, deadline)),
        points: run.points,
    }
}

pub fn plan_goals(inputs: &GoalPlanInputs) -> GoalPlanResult {
    let available_monthly_savings = inputs.monthly_income - inputs.monthly_expenses;
    let total_monthly_contributions: f64 =
        inputs.goals.iter().map(|g| g.monthly_contribution).sum();

    let mut goals: Vec<GoalProjection> = inputs
        .goals
        .iter()
        .map(|goal| project_goal(goal, inputs.inflation_rate))
        .collect();
    goals.sort_by_key(|g| g.priority);

    GoalPlanResult {
        available_monthly_savings,
        total_monthly_contributions,
        over_committed: total_monthly_contributions > available_monthly_savings,
        goals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn goal(id: u32, priority: Priority) -> Goal {
        Goal {
            id,
            name: format!("goal-{id}"),
            target_amount: 1_000.0,
            current_amount: 100.0,
            monthly_contribution: 100.0,
            priority,
            expected_return: 0.0,
            deadline_months: None,
        }
    }

    fn plan(goals: Vec<Goal>) -> GoalPlanInputs {
        GoalPlanInputs {
            goals,
            monthly_income: 5_000.0,
            monthly_expenses: 3_500.0,
            inflation_rate: 0.0,
        }
    }

    #[test]
    fn oracle_zero_return_goal_takes_nine_months() {
        let result = plan_goals(&plan(vec![goal(1, Priority::High)]));
        let projection = &result.goals[0];
        // 100 + 9 * 100 = 1000
        assert_eq!(projection.months, 9);
        assert_eq!(projection.years, 0);
        assert_eq!(projection.remaining_months, 9);
        assert!(projection.reached);
        assert_approx(projection.progress_percent, 10.0);
        let months: Vec<u32> = projection.points.iter().map(|p| p.month).collect();
        assert_eq!(months, vec![3, 6, 9]);
    }

    #[test]
    fn reaching_target_off_quarter_records_final_point() {
        let mut g = goal(1, Priority::High);
        g.current_amount = 0.0;
        g.monthly_contribution = 250.0;
        let result = plan_goals(&plan(vec![g]));
        let months: Vec<u32> = result.goals[0].points.iter().map(|p| p.month).collect();
        assert_eq!(months, vec![3, 4]);
    }

    #[test]
    fn unreachable_goal_stops_at_cap() {
        let mut g = goal(1, Priority::Low);
        g.monthly_contribution = 0.0;
        let result = plan_goals(&plan(vec![g]));
        let projection = &result.goals[0];
        assert_eq!(projection.months, MAX_MONTHS);
        assert!(!projection.reached);
        assert_eq!(projection.years, 50);
    }

    #[test]
    fn already_funded_goal_needs_no_months() {
        let mut g = goal(1, Priority::Medium);
        g.current_amount = 2_000.0;
        let result = plan_goals(&plan(vec![g]));
        assert_eq!(result.goals[0].months, 0);
        assert!(result.goals[0].reached);
        assert_approx(result.goals[0].progress_percent, 100.0);
    }

    #[test]
    fn goals_sort_by_priority_keeping_input_order_for_ties() {
        let result = plan_goals(&plan(vec![
            goal(1, Priority::Low),
            goal(2, Priority::High),
            goal(3, Priority::Medium),
            goal(4, Priority::High),
        ]));
        let ids: Vec<u32> = result.goals.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 4, 3, 1]);
    }

    #[test]
    fn over_commitment_compares_against_surplus() {
        let mut g = goal(1, Priority::High);
        g.monthly_contribution = 2_000.0;
        let result = plan_goals(&plan(vec![g]));
        assert_approx(result.available_monthly_savings, 1_500.0);
        assert!(result.over_committed);

        let result = plan_goals(&plan(vec![goal(1, Priority::High)]));
        assert!(!result.over_committed);
    }

    #[test]
    fn inflation_adjusts_target_over_time_to_goal() {
        let mut g = goal(1, Priority::High);
        g.current_amount = 0.0;
        g.monthly_contribution = 1_000.0 / 24.0;
        let mut inputs = plan(vec![g]);
        inputs.inflation_rate = 2.0;
        let result = plan_goals(&inputs);
        let projection = &result.goals[0];
        let expected_factor = 1.02f64.powf(projection.months as f64 / 12.0);
        assert!((projection.inflation_adjusted_target - 1_000.0 * expected_factor).abs() < 1e-6);
    }

    #[test]
    fn deadline_solves_required_contribution() {
        let mut g = goal(1, Priority::High);
        g.deadline_months = Some(6);
        let result = plan_goals(&plan(vec![g]));
        let required = result.goals[0]
            .required_monthly_contribution
            .expect("deadline is solvable");
        // (1000 - 100) / 6 = 150
        assert!(required >= 150.0 && required <= 150.01);
    }

    #[test]
    fn goal_without_deadline_has_no_required_contribution() {
        let result = plan_goals(&plan(vec![goal(1, Priority::High)]));
        assert!(result.goals[0].required_monthly_contribution.is_none());
    }
}
