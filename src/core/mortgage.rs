use serde::Serialize;

/// Minimum down payment share (percent) for an insurable mortgage.
pub const MIN_DOWN_PAYMENT_PERCENT: f64 = 5.0;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PaymentFrequency {
    Monthly,
    Biweekly,
    Weekly,
}

impl PaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::Weekly => 52,
        }
    }
}

/// The one field the user last edited; the other is derived from it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum DownPayment {
    Amount(f64),
    Percent(f64),
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDownPayment {
    pub amount: f64,
    pub percent: f64,
}

impl DownPayment {
    /// Amounts are capped at the property value and their percentage is
    /// snapped to two decimals before it picks a premium tier; amounts derived
    /// from a percentage are snapped to whole dollars.
    pub fn resolve(self, property_value: f64) -> ResolvedDownPayment {
        match self {
            DownPayment::Amount(amount) => {
                let amount = amount.min(property_value).max(0.0);
                let percent = if property_value > 0.0 {
                    (amount / property_value * 10_000.0).round() / 100.0
                } else {
                    0.0
                };
                ResolvedDownPayment { amount, percent }
            }
            DownPayment::Percent(percent) => ResolvedDownPayment {
                amount: (property_value * percent / 100.0).round(),
                percent,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct MortgageInputs {
    pub property_value: f64,
    pub down_payment: DownPayment,
    pub interest_rate: f64,
    pub amortization_years: u32,
    pub payment_frequency: PaymentFrequency,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationPeriod {
    pub period: u32,
    pub year: u32,
    pub payment: f64,
    pub principal: f64,
    pub interest: f64,
    pub remaining_balance: f64,
    pub cumulative_interest: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationYear {
    pub year: u32,
    pub principal_paid: f64,
    pub interest_paid: f64,
    pub remaining_balance: f64,
    pub total_paid: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MortgageResult {
    pub down_payment: ResolvedDownPayment,
    pub loan_amount: f64,
    pub insurance_premium: f64,
    pub principal: f64,
    pub periods_per_year: u32,
    pub total_periods: u32,
    pub payment: f64,
    pub total_cost: f64,
    pub total_interest: f64,
    pub schedule: Vec<AmortizationPeriod>,
    pub yearly: Vec<AmortizationYear>,
}

/// CMHC premium as a share of the loan, by down payment percent. `None`
/// below the 5% floor where no insured mortgage exists.
pub fn insurance_premium_rate(down_payment_percent: f64) -> Option<f64> {
    if down_payment_percent >= 20.0 {
        Some(0.0)
    } else if down_payment_percent >= 15.0 {
        Some(0.028)
    } else if down_payment_percent >= 10.0 {
        Some(0.031)
    } else if down_payment_percent >= MIN_DOWN_PAYMENT_PERCENT {
        Some(0.04)
    } else {
        None
    }
}

/// Level payment for `periods` payments at `period_rate`; `principal / periods`
/// when the rate is zero.
pub fn annuity_payment(principal: f64, period_rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    let n = periods as f64;
    if period_rate == 0.0 {
        return principal / n;
    }
    principal * period_rate / (1.0 - (1.0 + period_rate).powf(-n))
}

/// Principal that a level `payment` can carry; inverse of [`annuity_payment`].
pub fn annuity_present_value(payment: f64, period_rate: f64, periods: u32) -> f64 {
    let n = periods as f64;
    if period_rate == 0.0 {
        return payment * n;
    }
    payment * (1.0 - (1.0 + period_rate).powf(-n)) / period_rate
}

pub fn calculate_mortgage(inputs: &MortgageInputs) -> Option<MortgageResult> {
    let down_payment = inputs.down_payment.resolve(inputs.property_value);
    let premium_rate = insurance_premium_rate(down_payment.percent)?;

    let periods_per_year = inputs.payment_frequency.periods_per_year();
    let total_periods = inputs.amortization_years * periods_per_year;
    if total_periods == 0 {
        return None;
    }

    let loan_amount = (inputs.property_value - down_payment.amount).max(0.0);
    let insurance_premium = loan_amount * premium_rate;
    let principal = loan_amount + insurance_premium;
    let period_rate = inputs.interest_rate / 100.0 / periods_per_year as f64;
    let payment = annuity_payment(principal, period_rate, total_periods);
    let total_cost = payment * total_periods as f64;

    let schedule = amortization_schedule(principal, period_rate, total_periods, periods_per_year);
    let yearly = summarize_years(principal, &schedule, periods_per_year);

    Some(MortgageResult {
        down_payment,
        loan_amount,
        insurance_premium,
        principal,
        periods_per_year,
        total_periods,
        payment,
        total_cost,
        total_interest: total_cost - principal,
        schedule,
        yearly,
    })
}

pub fn amortization_schedule(
    principal: f64,
    period_rate: f64,
    total_periods: u32,
    periods_per_year: u32,
) -> Vec<AmortizationPeriod> {
    let payment = annuity_payment(principal, period_rate, total_periods);
    let mut balance = principal;
    let mut cumulative_interest = 0.0;
    let mut rows = Vec::with_capacity(total_periods as usize);

    for period in 1..=total_periods {
        let interest = balance * period_rate;
        let mut principal_part = payment - interest;
        if period == total_periods || principal_part > balance {
            // Final payment absorbs the residue left by rounding.
            principal_part = balance;
        }
        balance = (balance - principal_part).max(0.0);
        cumulative_interest += interest;

        rows.push(AmortizationPeriod {
            period,
            year: period.div_ceil(periods_per_year.max(1)),
            payment: principal_part + interest,
            principal: principal_part,
            interest,
            remaining_balance: balance,
            cumulative_interest,
        });
    }

    rows
}

fn summarize_years(
    principal: f64,
    schedule: &[AmortizationPeriod],
    periods_per_year: u32,
) -> Vec<AmortizationYear> {
    schedule
        .iter()
        .filter(|row| row.period % periods_per_year == 0 || row.period as usize == schedule.len())
        .map(|row| {
            let principal_paid = principal - row.remaining_balance;
            AmortizationYear {
                year: row.year,
                principal_paid,
                interest_paid: row.cumulative_interest,
                remaining_balance: row.remaining_balance,
                total_paid: principal_paid + row.cumulative_interest,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_inputs() -> MortgageInputs {
        MortgageInputs {
            property_value: 500_000.0,
            down_payment: DownPayment::Amount(100_000.0),
            interest_rate: 5.0,
            amortization_years: 25,
            payment_frequency: PaymentFrequency::Monthly,
        }
    }

    #[test]
    fn oracle_twenty_percent_down_monthly_payment() {
        let result = calculate_mortgage(&sample_inputs()).expect("valid mortgage");
        assert_eq!(result.insurance_premium, 0.0);
        assert_eq!(result.total_periods, 300);
        // 400000 * r / (1 - (1 + r)^-300) with r = 0.05 / 12
        assert_approx_tol(result.payment, 2_338.36, 0.01);
        assert_eq!(result.yearly.len(), 25);
        assert_eq!(result.yearly[24].remaining_balance, 0.0);
        assert_eq!(result.schedule[299].remaining_balance, 0.0);
    }

    #[test]
    fn zero_rate_degenerates_to_straight_line() {
        assert_eq!(annuity_payment(120_000.0, 0.0, 240), 500.0);

        let mut inputs = sample_inputs();
        inputs.interest_rate = 0.0;
        let result = calculate_mortgage(&inputs).expect("valid mortgage");
        assert_eq!(result.payment, 400_000.0 / 300.0);
        assert_approx_tol(result.total_interest, 0.0, 1e-6);
    }

    #[test]
    fn insurance_premium_follows_down_payment_tiers() {
        assert_eq!(insurance_premium_rate(25.0), Some(0.0));
        assert_eq!(insurance_premium_rate(20.0), Some(0.0));
        assert_eq!(insurance_premium_rate(19.99), Some(0.028));
        assert_eq!(insurance_premium_rate(15.0), Some(0.028));
        assert_eq!(insurance_premium_rate(12.0), Some(0.031));
        assert_eq!(insurance_premium_rate(5.0), Some(0.04));
        assert_eq!(insurance_premium_rate(4.99), None);
    }

    #[test]
    fn insured_premium_is_added_to_principal() {
        let mut inputs = sample_inputs();
        inputs.down_payment = DownPayment::Percent(10.0);
        let result = calculate_mortgage(&inputs).expect("valid mortgage");
        assert_eq!(result.down_payment.amount, 50_000.0);
        assert_approx_tol(result.insurance_premium, 450_000.0 * 0.031, 1e-6);
        assert_approx_tol(result.principal, 463_950.0, 1e-6);
    }

    #[test]
    fn down_payment_below_floor_is_rejected() {
        let mut inputs = sample_inputs();
        inputs.down_payment = DownPayment::Percent(3.0);
        assert!(calculate_mortgage(&inputs).is_none());
    }

    #[test]
    fn down_payment_derivation_is_single_sourced() {
        let from_percent = DownPayment::Percent(12.345).resolve(333_333.0);
        assert_eq!(from_percent.amount, 41_150.0);
        assert_eq!(from_percent.percent, 12.345);

        let from_amount = DownPayment::Amount(900_000.0).resolve(500_000.0);
        assert_eq!(from_amount.amount, 500_000.0);
        assert_eq!(from_amount.percent, 100.0);
    }

    #[test]
    fn derived_percent_rounds_to_two_decimals_before_tier_lookup() {
        // 99,980 / 500,000 = 19.996%, shown and tiered as 20.00%.
        let resolved = DownPayment::Amount(99_980.0).resolve(500_000.0);
        assert_eq!(resolved.percent, 20.0);

        let mut inputs = sample_inputs();
        inputs.down_payment = DownPayment::Amount(99_980.0);
        let result = calculate_mortgage(&inputs).expect("valid mortgage");
        assert_eq!(result.insurance_premium, 0.0);

        // 99,970 / 500,000 = 19.994% stays in the 15-20% tier.
        inputs.down_payment = DownPayment::Amount(99_970.0);
        let result = calculate_mortgage(&inputs).expect("valid mortgage");
        assert!(result.insurance_premium > 0.0);
    }

    #[test]
    fn biweekly_schedule_has_twenty_six_periods_per_year() {
        let mut inputs = sample_inputs();
        inputs.payment_frequency = PaymentFrequency::Biweekly;
        let result = calculate_mortgage(&inputs).expect("valid mortgage");
        assert_eq!(result.schedule.len(), 25 * 26);
        assert_eq!(result.schedule[26].year, 2);
        assert!(result.payment < 2_338.36 / 2.0);
    }

    #[test]
    fn affordability_inverse_round_trips_payment() {
        let rate = 0.05 / 12.0;
        let principal = annuity_present_value(2_000.0, rate, 300);
        assert_approx_tol(annuity_payment(principal, rate, 300), 2_000.0, 1e-9);
        assert_eq!(annuity_present_value(100.0, 0.0, 12), 1_200.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_schedule_repays_principal_exactly(
            principal in 1_000.0f64..2_000_000.0,
            rate_percent in 0.1f64..15.0,
            years in 1u32..35,
        ) {
            let period_rate = rate_percent / 100.0 / 12.0;
            let schedule = amortization_schedule(principal, period_rate, years * 12, 12);
            let repaid: f64 = schedule.iter().map(|row| row.principal).sum();
            prop_assert!((repaid - principal).abs() <= principal * 1e-9);
            prop_assert!(schedule.last().map(|row| row.remaining_balance) == Some(0.0));
            prop_assert!(schedule.iter().all(|row| row.remaining_balance >= 0.0));
        }
    }
}
