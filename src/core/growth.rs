use serde::Serialize;

/// Hard ceiling on monthly projections (50 years).
pub const MAX_MONTHS: u32 = 600;
/// Hard ceiling on yearly projections.
pub const MAX_YEARS: u32 = 50;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Cadence {
    Monthly,
    Annual,
}

impl Cadence {
    pub fn max_periods(self) -> u32 {
        match self {
            Cadence::Monthly => MAX_MONTHS,
            Cadence::Annual => MAX_YEARS,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPeriod {
    pub period: u32,
    pub contribution: f64,
    pub grant: f64,
    pub growth: f64,
    pub drag: f64,
    pub balance: f64,
    pub total_contributions: f64,
    pub total_grants: f64,
}

#[derive(Debug, Clone)]
pub struct GrowthRun {
    pub periods: Vec<GrowthPeriod>,
    pub final_balance: f64,
    pub total_contributions: f64,
    pub total_grants: f64,
    pub total_growth: f64,
    pub total_drag: f64,
    /// The requested horizon was longer than the cadence allows.
    pub truncated: bool,
}

/// Running totals handed to the contribution and grant callbacks before the
/// period's own flows are applied.
#[derive(Debug, Clone, Copy)]
pub struct LedgerState {
    pub period: u32,
    pub balance: f64,
    pub total_contributions: f64,
    pub total_grants: f64,
}

/// Contribute, add grant, grow, then deduct drag, once per period.
#[derive(Debug, Clone, Copy)]
pub struct GrowthSchedule {
    pub cadence: Cadence,
    pub periods: u32,
    pub initial_balance: f64,
    pub growth_rate: f64,
    pub growth_interval: u32,
    pub drag_rate: f64,
}

impl GrowthSchedule {
    pub fn annual(initial_balance: f64, years: u32, growth_rate: f64) -> Self {
        Self {
            cadence: Cadence::Annual,
            periods: years,
            initial_balance,
            growth_rate,
            growth_interval: 1,
            drag_rate: 0.0,
        }
    }

    pub fn monthly(initial_balance: f64, months: u32, growth_rate: f64) -> Self {
        Self {
            cadence: Cadence::Monthly,
            periods: months,
            initial_balance,
            growth_rate,
            growth_interval: 1,
            drag_rate: 0.0,
        }
    }

    /// Growth lands only on every `interval`-th period.
    pub fn with_growth_interval(mut self, interval: u32) -> Self {
        self.growth_interval = interval.max(1);
        self
    }

    pub fn with_drag(mut self, drag_rate: f64) -> Self {
        self.drag_rate = drag_rate;
        self
    }

    pub fn run<C, G>(&self, mut contribution_for: C, mut grant_for: G) -> GrowthRun
    where
        C: FnMut(&LedgerState) -> f64,
        G: FnMut(&LedgerState, f64) -> f64,
    {
        let cap = self.cadence.max_periods();
        let periods = self.periods.min(cap);

        let mut state = LedgerState {
            period: 0,
            balance: self.initial_balance,
            total_contributions: self.initial_balance,
            total_grants: 0.0,
        };
        let mut total_growth = 0.0;
        let mut total_drag = 0.0;
        let mut rows = Vec::with_capacity(periods as usize);

        for period in 1..=periods {
            state.period = period;

            let contribution = contribution_for(&state);
            state.balance += contribution;
            state.total_contributions += contribution;

            let grant = grant_for(&state, contribution);
            state.balance += grant;
            state.total_grants += grant;

            let growth = if period % self.growth_interval == 0 {
                state.balance * self.growth_rate
            } else {
                0.0
            };
            state.balance += growth;
            total_growth += growth;

            let drag = state.balance * self.drag_rate;
            state.balance -= drag;
            total_drag += drag;

            rows.push(GrowthPeriod {
                period,
                contribution,
                grant,
                growth,
                drag,
                balance: state.balance,
                total_contributions: state.total_contributions,
                total_grants: state.total_grants,
            });
        }

        GrowthRun {
            periods: rows,
            final_balance: state.balance,
            total_contributions: state.total_contributions,
            total_grants: state.total_grants,
            total_growth,
            total_drag,
            truncated: self.periods > cap,
        }
    }
}

/// `(1 + rate)^years`, the factor that turns today's dollars into future ones.
pub fn inflation_factor(rate_percent: f64, years: f64) -> f64 {
    (1.0 + rate_percent / 100.0).powf(years)
}

/// Division that yields `fallback` instead of inf/NaN when `den` is zero.
pub fn ratio_or(num: f64, den: f64, fallback: f64) -> f64 {
    if den.abs() <= f64::EPSILON {
        fallback
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn oracle_growth_applies_after_contribution_and_grant() {
        // Year 1: (100 + 10 + 1) * 1.1 = 122.1
        // Year 2: (122.1 + 10 + 1) * 1.1 = 146.41
        let run = GrowthSchedule::annual(100.0, 2, 0.10).run(|_| 10.0, |_, _| 1.0);
        assert_eq!(run.periods.len(), 2);
        assert_approx(run.periods[0].balance, 122.1);
        assert_approx(run.final_balance, 146.41);
        assert_approx(run.total_contributions, 120.0);
        assert_approx(run.total_grants, 2.0);
        assert!(!run.truncated);
    }

    #[test]
    fn growth_interval_skips_off_periods() {
        let run = GrowthSchedule::monthly(0.0, 6, 0.05)
            .with_growth_interval(3)
            .run(|_| 100.0, |_, _| 0.0);
        assert_approx(run.periods[0].growth, 0.0);
        assert_approx(run.periods[1].growth, 0.0);
        assert_approx(run.periods[2].growth, 15.0);
        assert_approx(run.periods[2].balance, 315.0);
    }

    #[test]
    fn horizon_is_clamped_to_cadence_cap() {
        let run = GrowthSchedule::monthly(0.0, 10_000, 0.0).run(|_| 1.0, |_, _| 0.0);
        assert_eq!(run.periods.len(), MAX_MONTHS as usize);
        assert!(run.truncated);

        let run = GrowthSchedule::annual(0.0, 80, 0.0).run(|_| 1.0, |_, _| 0.0);
        assert_eq!(run.periods.len(), MAX_YEARS as usize);
    }

    #[test]
    fn drag_is_deducted_after_growth() {
        let run = GrowthSchedule::monthly(1_000.0, 1, 0.01)
            .with_drag(0.001)
            .run(|_| 0.0, |_, _| 0.0);
        assert_approx(run.periods[0].growth, 10.0);
        assert_approx(run.periods[0].drag, 1.01);
        assert_approx(run.final_balance, 1_008.99);
    }

    #[test]
    fn ratio_or_guards_zero_denominator() {
        assert_approx(ratio_or(5.0, 0.0, 0.0), 0.0);
        assert_approx(ratio_or(5.0, 2.0, 0.0), 2.5);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn final_balance_reconciles_with_flows(
            initial in 0.0f64..100_000.0,
            contribution in 0.0f64..5_000.0,
            grant in 0.0f64..500.0,
            rate in 0.0f64..0.02,
            drag in 0.0f64..0.002,
            months in 1u32..=MAX_MONTHS,
        ) {
            let run = GrowthSchedule::monthly(initial, months, rate)
                .with_drag(drag)
                .run(|_| contribution, |_, _| grant);
            let expected = run.total_contributions + run.total_grants + run.total_growth
                - run.total_drag;
            let tol = 1e-9 * expected.abs().max(1.0);
            prop_assert!((run.final_balance - expected).abs() <= tol);
            prop_assert_eq!(run.periods.len(), months as usize);
        }
    }
}
