use serde::Serialize;
use tracing::debug;

use super::growth::MAX_MONTHS;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PayoffStrategy {
    /// Highest interest rate first.
    Avalanche,
    /// Lowest balance first.
    Snowball,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Debt {
    pub id: u32,
    pub name: String,
    pub balance: f64,
    /// Annual rate in percent.
    pub interest_rate: f64,
    pub minimum_payment: f64,
}

#[derive(Debug, Clone)]
pub struct DebtPlanInputs {
    pub debts: Vec<Debt>,
    pub monthly_budget: f64,
    pub strategy: PayoffStrategy,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtMonthEntry {
    pub id: u32,
    pub name: String,
    pub interest: f64,
    pub payment: f64,
    pub principal_paid: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffMonth {
    pub month: u32,
    pub debts: Vec<DebtMonthEntry>,
    pub total_balance: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtBalanceHistory {
    pub id: u32,
    pub name: String,
    /// Opening balance followed by the balance after each month.
    pub balances: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayoffResult {
    pub months: u32,
    pub debt_free: bool,
    pub total_debt: f64,
    pub total_interest: f64,
    pub total_payments: f64,
    pub extra_payment: f64,
    pub budget_below_minimums: bool,
    pub payoff_order: Vec<u32>,
    pub schedule: Vec<PayoffMonth>,
    pub balance_history: Vec<DebtBalanceHistory>,
}

/// Works on a private copy of `inputs.debts`; `None` when there is nothing
/// to pay off.
pub fn simulate_payoff(inputs: &DebtPlanInputs) -> Option<DebtPayoffResult> {
    if inputs.debts.is_empty() {
        return None;
    }

    let mut debts = inputs.debts.clone();
    match inputs.strategy {
        PayoffStrategy::Avalanche => {
            debts.sort_by(|a, b| b.interest_rate.total_cmp(&a.interest_rate))
        }
        PayoffStrategy::Snowball => debts.sort_by(|a, b| a.balance.total_cmp(&b.balance)),
    }

    let total_minimum: f64 = debts.iter().map(|d| d.minimum_payment).sum();
    let extra_payment = (inputs.monthly_budget - total_minimum).max(0.0);
    let total_debt: f64 = debts.iter().map(|d| d.balance.max(0.0)).sum();

    let mut balance_history: Vec<DebtBalanceHistory> = debts
        .iter()
        .map(|d| DebtBalanceHistory {
            id: d.id,
            name: d.name.clone(),
            balances: vec![d.balance],
        })
        .collect();

    let mut months = 0;
    let mut total_interest = 0.0;
    let mut total_payments = 0.0;
    let mut schedule = Vec::new();

    while debts.iter().any(|d| d.balance > 0.0) && months < MAX_MONTHS {
        months += 1;
        let mut entries = Vec::with_capacity(debts.len());
        let mut entry_of = vec![None; debts.len()];

        for (idx, debt) in debts.iter_mut().enumerate() {
            if debt.balance <= 0.0 {
                continue;
            }
            let interest = debt.balance * debt.interest_rate / 100.0 / 12.0;
            debt.balance += interest;
            total_interest += interest;

            let payment = debt.minimum_payment.max(0.0).min(debt.balance);
            debt.balance -= payment;
            total_payments += payment;

            entry_of[idx] = Some(entries.len());
            entries.push(DebtMonthEntry {
                id: debt.id,
                name: debt.name.clone(),
                interest,
                payment,
                principal_paid: payment - interest,
                balance: debt.balance,
            });
        }

        let mut remaining_extra = extra_payment;
        for (idx, debt) in debts.iter_mut().enumerate() {
            if remaining_extra <= 0.0 {
                break;
            }
            if debt.balance <= 0.0 {
                continue;
            }
            let applied = remaining_extra.min(debt.balance);
            debt.balance -= applied;
            remaining_extra -= applied;
            total_payments += applied;

            if let Some(entry) = entry_of[idx].map(|i| &mut entries[i]) {
                entry.payment += applied;
                entry.principal_paid += applied;
                entry.balance = debt.balance;
            }
        }

        for (history, debt) in balance_history.iter_mut().zip(debts.iter()) {
            history.balances.push(debt.balance.max(0.0));
        }

        schedule.push(PayoffMonth {
            month: months,
            debts: entries,
            total_balance: debts.iter().map(|d| d.balance.max(0.0)).sum(),
        });
    }

    let debt_free = debts.iter().all(|d| d.balance <= 0.0);
    if !debt_free {
        debug!(months, "debt payoff did not converge within the month cap");
    }

    Some(DebtPayoffResult {
        months,
        debt_free,
        total_debt,
        total_interest,
        total_payments,
        extra_payment,
        budget_below_minimums: inputs.monthly_budget < total_minimum,
        payoff_order: debts.iter().map(|d| d.id).collect(),
        schedule,
        balance_history,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn debt(id: u32, balance: f64, rate: f64, minimum: f64) -> Debt {
        Debt {
            id,
            name: format!("debt-{id}"),
            balance,
            interest_rate: rate,
            minimum_payment: minimum,
        }
    }

    fn two_debt_plan(strategy: PayoffStrategy) -> DebtPlanInputs {
        DebtPlanInputs {
            debts: vec![debt(1, 1_000.0, 5.0, 50.0), debt(2, 5_000.0, 20.0, 100.0)],
            monthly_budget: 300.0,
            strategy,
        }
    }

    #[test]
    fn oracle_avalanche_sends_extra_to_highest_rate_first() {
        let result = simulate_payoff(&two_debt_plan(PayoffStrategy::Avalanche)).expect("debts");
        assert_eq!(result.payoff_order, vec![2, 1]);
        assert_approx(result.extra_payment, 150.0);

        // Month 1: 5000 + 83.333 - 100 - 150; 1000 + 4.1667 - 50
        let first = &result.schedule[0];
        let high = first.debts.iter().find(|e| e.id == 2).expect("high-rate debt");
        let low = first.debts.iter().find(|e| e.id == 1).expect("low-rate debt");
        assert_approx(high.payment, 250.0);
        assert_approx(high.balance, 5_000.0 + 5_000.0 * 0.20 / 12.0 - 250.0);
        assert_approx(low.payment, 50.0);
        assert_approx(low.balance, 1_000.0 + 1_000.0 * 0.05 / 12.0 - 50.0);

        // While the 20% debt is open, the 5% debt only ever receives its minimum.
        let high_paid_month = result
            .schedule
            .iter()
            .position(|m| m.debts.iter().any(|e| e.id == 2 && e.balance <= 0.0))
            .expect("high-rate debt is cleared");
        for month in &result.schedule[..high_paid_month] {
            let low = month.debts.iter().find(|e| e.id == 1);
            if let Some(low) = low {
                assert!(low.payment <= 50.0 + EPS);
            }
        }
        assert!(result.debt_free);
    }

    #[test]
    fn snowball_orders_by_smallest_balance() {
        let result = simulate_payoff(&two_debt_plan(PayoffStrategy::Snowball)).expect("debts");
        assert_eq!(result.payoff_order, vec![1, 2]);
        let first = &result.schedule[0];
        let small = first.debts.iter().find(|e| e.id == 1).expect("small debt");
        assert_approx(small.payment, 200.0);
    }

    #[test]
    fn avalanche_pays_no_more_interest_than_snowball() {
        let avalanche = simulate_payoff(&two_debt_plan(PayoffStrategy::Avalanche)).expect("debts");
        let snowball = simulate_payoff(&two_debt_plan(PayoffStrategy::Snowball)).expect("debts");
        assert!(avalanche.total_interest <= snowball.total_interest + EPS);
    }

    #[test]
    fn caller_debts_are_not_mutated() {
        let inputs = two_debt_plan(PayoffStrategy::Avalanche);
        let before = inputs.debts.clone();
        let _ = simulate_payoff(&inputs);
        assert_eq!(inputs.debts, before);
    }

    #[test]
    fn non_converging_budget_stops_at_cap() {
        let inputs = DebtPlanInputs {
            debts: vec![debt(1, 10_000.0, 24.0, 50.0)],
            monthly_budget: 50.0,
            strategy: PayoffStrategy::Avalanche,
        };
        let result = simulate_payoff(&inputs).expect("debts");
        assert_eq!(result.months, MAX_MONTHS);
        assert!(!result.debt_free);
        assert_eq!(result.balance_history[0].balances.len(), MAX_MONTHS as usize + 1);
    }

    #[test]
    fn extra_spilling_over_lands_on_the_debt_it_paid() {
        // Same id on both rows; equal rates keep input order.
        let inputs = DebtPlanInputs {
            debts: vec![debt(1, 50.0, 0.0, 10.0), debt(1, 1_000.0, 0.0, 10.0)],
            monthly_budget: 120.0,
            strategy: PayoffStrategy::Avalanche,
        };
        let result = simulate_payoff(&inputs).expect("debts present");
        let first_month = &result.schedule[0].debts;
        // Minimums 10 + 10, then 40 of the 100 extra clears the first debt
        // and the remaining 60 goes to the second.
        assert_approx(first_month[0].payment, 50.0);
        assert_approx(first_month[0].balance, 0.0);
        assert_approx(first_month[1].payment, 70.0);
        assert_approx(first_month[1].balance, 930.0);
    }

    #[test]
    fn empty_debt_list_is_a_sentinel() {
        let inputs = DebtPlanInputs {
            debts: Vec::new(),
            monthly_budget: 500.0,
            strategy: PayoffStrategy::Snowball,
        };
        assert!(simulate_payoff(&inputs).is_none());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_total_balance_is_non_increasing_when_minimums_cover_interest(
            balances in proptest::collection::vec(100.0f64..20_000.0, 1..5),
            rates in proptest::collection::vec(0.0f64..30.0, 5),
            extra in 0.0f64..1_000.0,
        ) {
            let debts: Vec<Debt> = balances
                .iter()
                .enumerate()
                .map(|(i, &balance)| {
                    let rate = rates[i];
                    // Interest plus a 120-month straight-line share of principal.
                    let minimum = balance * rate / 100.0 / 12.0 + balance / 120.0;
                    debt(i as u32 + 1, balance, rate, minimum)
                })
                .collect();
            let total_minimum: f64 = debts.iter().map(|d| d.minimum_payment).sum();
            let inputs = DebtPlanInputs {
                debts,
                monthly_budget: total_minimum + extra,
                strategy: PayoffStrategy::Avalanche,
            };
            let result = simulate_payoff(&inputs).expect("debts");

            let mut previous = result.total_debt;
            for month in &result.schedule {
                prop_assert!(month.total_balance <= previous + 1e-6);
                previous = month.total_balance;
            }
            prop_assert!(result.debt_free);
            prop_assert!(result.months <= MAX_MONTHS);
        }
    }
}
