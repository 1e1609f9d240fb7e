use serde::Serialize;

use super::growth::ratio_or;

/// Widest year range accepted in one projection.
pub const MAX_SPAN_YEARS: i32 = 200;

/// Canadian CPI annual change, percent.
pub const HISTORICAL_CPI: &[(i32, f64)] = &[
    (1980, 10.2),
    (1981, 12.5),
    (1982, 10.8),
    (1983, 5.8),
    (1984, 4.3),
    (1985, 4.0),
    (1986, 4.2),
    (1987, 4.4),
    (1988, 4.0),
    (1989, 5.0),
    (1990, 4.8),
    (1991, 5.6),
    (1992, 1.5),
    (1993, 1.8),
    (1994, 0.2),
    (1995, 2.1),
    (1996, 1.6),
    (1997, 1.6),
    (1998, 1.0),
    (1999, 1.7),
    (2000, 2.7),
    (2001, 2.5),
    (2002, 2.3),
    (2003, 2.8),
    (2004, 1.9),
    (2005, 2.2),
    (2006, 2.0),
    (2007, 2.1),
    (2008, 2.4),
    (2009, 0.3),
    (2010, 1.8),
    (2011, 2.9),
    (2012, 1.5),
    (2013, 0.9),
    (2014, 2.0),
    (2015, 1.1),
    (2016, 1.4),
    (2017, 1.6),
    (2018, 2.3),
    (2019, 1.9),
    (2020, 0.7),
    (2021, 3.4),
    (2022, 6.8),
    (2023, 3.9),
    (2024, 2.8),
    (2025, 2.0),
];

pub fn historical_rate(year: i32) -> Option<f64> {
    HISTORICAL_CPI
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, rate)| *rate)
}

#[derive(Debug, Clone)]
pub struct InflationInputs {
    pub amount: f64,
    pub start_year: i32,
    pub end_year: i32,
    pub custom_rate: f64,
    pub use_historical: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationYear {
    pub year: i32,
    pub value: f64,
    pub inflation_rate: f64,
    pub historical: bool,
    pub yearly_change: f64,
    pub cumulative_inflation: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationResult {
    pub start_value: f64,
    pub end_value: f64,
    pub cumulative_inflation: f64,
    pub purchasing_power_loss: f64,
    pub average_annual_inflation: f64,
    pub yearly: Vec<InflationYear>,
}

/// Compounds `amount` through every year of `start_year..=end_year`.
/// `None` when the range runs backwards or spans more than [`MAX_SPAN_YEARS`].
pub fn calculate_inflation(inputs: &InflationInputs) -> Option<InflationResult> {
    let span = i64::from(inputs.end_year) - i64::from(inputs.start_year);
    if !(0..i64::from(MAX_SPAN_YEARS)).contains(&span) {
        return None;
    }

    let mut value = inputs.amount;
    let mut yearly = Vec::with_capacity(span as usize + 1);
    for year in inputs.start_year..=inputs.end_year {
        let historical = inputs
            .use_historical
            .then(|| historical_rate(year))
            .flatten();
        let inflation_rate = historical.unwrap_or(inputs.custom_rate);

        let previous = value;
        value *= 1.0 + inflation_rate / 100.0;
        yearly.push(InflationYear {
            year,
            value,
            inflation_rate,
            historical: historical.is_some(),
            yearly_change: value - previous,
            cumulative_inflation: (ratio_or(value, inputs.amount, 1.0) - 1.0) * 100.0,
        });
    }

    let average_annual_inflation =
        yearly.iter().map(|y| y.inflation_rate).sum::<f64>() / yearly.len() as f64;

    Some(InflationResult {
        start_value: inputs.amount,
        end_value: value,
        cumulative_inflation: (ratio_or(value, inputs.amount, 1.0) - 1.0) * 100.0,
        purchasing_power_loss: (1.0 - ratio_or(inputs.amount, value, 1.0)) * 100.0,
        average_annual_inflation,
        yearly,
    })
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

    fn inputs(start: i32, end: i32, historical: bool) -> InflationInputs {
        InflationInputs {
            amount: 1_000.0,
            start_year: start,
            end_year: end,
            custom_rate: 2.0,
            use_historical: historical,
        }
    }

    #[test]
    fn oracle_recent_historical_years() {
        // 1000 * 1.068 * 1.039 = 1109.652
        let result = calculate_inflation(&inputs(2022, 2023, true)).expect("valid range");
        assert_eq!(result.yearly.len(), 2);
        assert_approx(result.end_value, 1_109.652);
        assert_approx(result.cumulative_inflation, 10.9652);
        assert_approx(result.purchasing_power_loss, (1.0 - 1_000.0 / 1_109.652) * 100.0);
        assert_approx(result.average_annual_inflation, (6.8 + 3.9) / 2.0);
        assert_approx(result.yearly[0].yearly_change, 68.0);
    }

    #[test]
    fn years_outside_table_fall_back_to_custom_rate() {
        let result = calculate_inflation(&inputs(2025, 2026, true)).expect("valid range");
        assert!(result.yearly[0].historical);
        assert!(!result.yearly[1].historical);
        assert_approx(result.yearly[1].inflation_rate, 2.0);
    }

    #[test]
    fn custom_rate_ignores_table() {
        let result = calculate_inflation(&inputs(2000, 2009, false)).expect("valid range");
        assert_approx(result.end_value, 1_000.0 * 1.02f64.powi(10));
        assert_approx(result.average_annual_inflation, 2.0);
    }

    #[test]
    fn single_year_range_runs_once() {
        let result = calculate_inflation(&inputs(1981, 1981, true)).expect("valid range");
        assert_eq!(result.yearly.len(), 1);
        assert_approx(result.end_value, 1_125.0);
    }

    #[test]
    fn backwards_or_huge_ranges_are_refused() {
        assert!(calculate_inflation(&inputs(2020, 2010, true)).is_none());
        assert!(calculate_inflation(&inputs(1000, 3000, true)).is_none());
    }

    #[test]
    fn full_i32_range_is_refused_without_overflow() {
        assert!(calculate_inflation(&inputs(i32::MIN, i32::MAX, true)).is_none());
        assert!(calculate_inflation(&inputs(i32::MAX, i32::MIN, false)).is_none());
        let last = calculate_inflation(&inputs(i32::MAX, i32::MAX, false)).expect("one year");
        assert_eq!(last.yearly.len(), 1);
    }

    #[test]
    fn table_is_contiguous() {
        for pair in HISTORICAL_CPI.windows(2) {
            assert_eq!(pair[0].0 + 1, pair[1].0);
        }
        assert_eq!(historical_rate(1980), Some(10.2));
        assert_eq!(historical_rate(1979), None);
    }
}
