use serde::Serialize;

/// Maximum annual retirement pension at 65 (2025).
pub const MAX_PENSION_65: f64 = 15_678.0;
/// Year's Maximum Pensionable Earnings (2025).
pub const YMPE: f64 = 68_500.0;
/// Year's Basic Exemption.
pub const YBE: f64 = 3_500.0;
pub const MAX_CONTRIBUTORY_YEARS: u32 = 39;
pub const DROPOUT_SHARE: f64 = 0.17;
pub const STANDARD_AGE: u32 = 65;
pub const EARLIEST_AGE: u32 = 60;
pub const LATEST_AGE: u32 = 70;
pub const EARLY_REDUCTION_PER_MONTH: f64 = 0.006;
pub const LATE_INCREASE_PER_MONTH: f64 = 0.007;
/// Horizon used for lifetime-benefit totals.
pub const LIFE_EXPECTANCY: u32 = 85;

#[derive(Debug, Clone)]
pub struct CppInputs {
    pub birth_year: i32,
    pub current_year: i32,
    pub retirement_age: u32,
    pub start_age: u32,
    pub average_income: f64,
    pub years_contributed: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CppAgeBenefit {
    pub age: u32,
    pub adjustment_factor: f64,
    pub monthly_benefit: f64,
    pub annual_benefit: f64,
    pub years_receiving: u32,
    pub lifetime_benefit: f64,
    pub break_even_age: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CppResult {
    pub current_age: i32,
    pub years_until_retirement: u32,
    pub contribution_ratio: f64,
    pub income_ratio: f64,
    pub base_annual_benefit: f64,
    pub start_age: u32,
    pub adjustment_factor: f64,
    pub annual_benefit: f64,
    pub monthly_benefit: f64,
    pub years_collecting: u32,
    pub lifetime_benefit: f64,
    pub break_even_age: Option<f64>,
    pub by_start_age: Vec<CppAgeBenefit>,
}

/// Start-age multiplier: -0.6%/month before 65, +0.7%/month after, with the
/// age clamped to 60..=70. Exactly 1.0 at 65.
pub fn adjustment_factor(start_age: f64) -> f64 {
    let age = start_age.clamp(EARLIEST_AGE as f64, LATEST_AGE as f64);
    let standard = STANDARD_AGE as f64;
    if age < standard {
        1.0 - EARLY_REDUCTION_PER_MONTH * (standard - age) * 12.0
    } else if age > standard {
        1.0 + LATE_INCREASE_PER_MONTH * (age - standard) * 12.0
    } else {
        1.0
    }
}

/// Share of the maximum contributory period credited, after the general
/// dropout provision removes the lowest-earning years.
pub fn contribution_ratio(years_contributed: u32) -> f64 {
    let dropout_years = (MAX_CONTRIBUTORY_YEARS as f64 * DROPOUT_SHARE).floor() as u32;
    let required = MAX_CONTRIBUTORY_YEARS - dropout_years;
    years_contributed.min(required) as f64 / required as f64
}

pub fn income_ratio(average_income: f64) -> f64 {
    ((average_income.min(YMPE) - YBE) / (YMPE - YBE)).max(0.0)
}

/// Age at which cumulative benefits started at `start_age` equal those
/// started at 65. Solves `f * (x - a) = x - 65` for `x`; ignores investment
/// growth on either stream.
pub fn break_even_age(start_age: u32, factor: f64) -> Option<f64> {
    if start_age == STANDARD_AGE || (factor - 1.0).abs() <= f64::EPSILON {
        return None;
    }
    Some((factor * start_age as f64 - STANDARD_AGE as f64) / (factor - 1.0))
}

fn benefit_at(base_annual_benefit: f64, age: u32) -> CppAgeBenefit {
    let factor = adjustment_factor(age as f64);
    let annual_benefit = base_annual_benefit * factor;
    let years_receiving = LIFE_EXPECTANCY.saturating_sub(age);
    CppAgeBenefit {
        age,
        adjustment_factor: factor,
        monthly_benefit: annual_benefit / 12.0,
        annual_benefit,
        years_receiving,
        lifetime_benefit: annual_benefit * years_receiving as f64,
        break_even_age: break_even_age(age, factor),
    }
}

pub fn calculate_cpp(inputs: &CppInputs) -> CppResult {
    let current_age = inputs.current_year.saturating_sub(inputs.birth_year);
    let years_until_retirement = (i64::from(inputs.retirement_age) - i64::from(current_age))
        .clamp(0, i64::from(u32::MAX)) as u32;

    let contribution_ratio = contribution_ratio(inputs.years_contributed);
    let income_ratio = income_ratio(inputs.average_income);
    let base_annual_benefit = MAX_PENSION_65 * contribution_ratio * income_ratio;

    let start_age = inputs.start_age.clamp(EARLIEST_AGE, LATEST_AGE);
    let chosen = benefit_at(base_annual_benefit, start_age);
    let by_start_age = (EARLIEST_AGE..=LATEST_AGE)
        .map(|age| benefit_at(base_annual_benefit, age))
        .collect();

    CppResult {
        current_age,
        years_until_retirement,
        contribution_ratio,
        income_ratio,
        base_annual_benefit,
        start_age,
        adjustment_factor: chosen.adjustment_factor,
        annual_benefit: chosen.annual_benefit,
        monthly_benefit: chosen.monthly_benefit,
        years_collecting: chosen.years_receiving,
        lifetime_benefit: chosen.lifetime_benefit,
        break_even_age: chosen.break_even_age,
        by_start_age,
    }
}
