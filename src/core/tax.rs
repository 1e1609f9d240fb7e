use serde::Serialize;

use super::growth::ratio_or;

pub const CAPITAL_GAINS_INCLUSION: f64 = 0.5;

/// One band of a progressive table. `max: None` is the open top band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    pub min: f64,
    pub max: Option<f64>,
    /// Percent.
    pub rate: f64,
}

const fn bracket(min: f64, max: f64, rate: f64) -> TaxBracket {
    TaxBracket {
        min,
        max: Some(max),
        rate,
    }
}

const fn top(min: f64, rate: f64) -> TaxBracket {
    TaxBracket {
        min,
        max: None,
        rate,
    }
}

pub const FEDERAL_BRACKETS: &[TaxBracket] = &[
    bracket(0.0, 55_867.0, 15.0),
    bracket(55_867.0, 111_733.0, 20.5),
    bracket(111_733.0, 173_205.0, 26.0),
    bracket(173_205.0, 246_752.0, 29.0),
    top(246_752.0, 33.0),
];

const ONTARIO_BRACKETS: &[TaxBracket] = &[
    bracket(0.0, 49_231.0, 5.05),
    bracket(49_231.0, 98_463.0, 9.15),
    bracket(98_463.0, 150_000.0, 11.16),
    bracket(150_000.0, 220_000.0, 12.16),
    top(220_000.0, 13.16),
];

const QUEBEC_BRACKETS: &[TaxBracket] = &[
    bracket(0.0, 49_275.0, 15.0),
    bracket(49_275.0, 98_540.0, 20.0),
    bracket(98_540.0, 119_910.0, 24.0),
    top(119_910.0, 25.75),
];

const BRITISH_COLUMBIA_BRACKETS: &[TaxBracket] = &[
    bracket(0.0, 45_654.0, 5.06),
    bracket(45_654.0, 91_310.0, 7.7),
    bracket(91_310.0, 104_835.0, 10.5),
    bracket(104_835.0, 127_299.0, 12.29),
    bracket(127_299.0, 172_602.0, 14.7),
    bracket(172_602.0, 240_716.0, 16.8),
    top(240_716.0, 20.5),
];

const ALBERTA_BRACKETS: &[TaxBracket] = &[
    bracket(0.0, 142_292.0, 10.0),
    bracket(142_292.0, 170_751.0, 12.0),
    bracket(170_751.0, 227_668.0, 13.0),
    bracket(227_668.0, 341_502.0, 14.0),
    top(341_502.0, 15.0),
];

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Province {
    Ontario,
    Quebec,
    BritishColumbia,
    Alberta,
}

impl Province {
    pub fn brackets(self) -> &'static [TaxBracket] {
        match self {
            Province::Ontario => ONTARIO_BRACKETS,
            Province::Quebec => QUEBEC_BRACKETS,
            Province::BritishColumbia => BRITISH_COLUMBIA_BRACKETS,
            Province::Alberta => ALBERTA_BRACKETS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaxInputs {
    pub province: Province,
    pub employment_income: f64,
    pub self_employment_income: f64,
    pub interest_income: f64,
    pub dividend_income: f64,
    pub capital_gains: f64,
    pub rrsp_contributions: f64,
    pub other_deductions: f64,
    pub tax_credits: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketTax {
    pub min: f64,
    pub max: Option<f64>,
    pub rate: f64,
    pub taxable_amount: f64,
    pub tax: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxResult {
    pub total_income: f64,
    pub taxable_income: f64,
    pub federal_tax: f64,
    pub provincial_tax: f64,
    pub total_tax_before_credits: f64,
    pub total_tax: f64,
    pub after_tax_income: f64,
    pub average_tax_rate: f64,
    pub marginal_tax_rate: f64,
    pub effective_tax_rate: f64,
    pub federal_breakdown: Vec<BracketTax>,
    pub provincial_breakdown: Vec<BracketTax>,
}

/// Tax owed under one table, with the portion falling in each band reached.
pub fn tax_by_bracket(taxable_income: f64, brackets: &[TaxBracket]) -> (f64, Vec<BracketTax>) {
    let mut total = 0.0;
    let mut rows = Vec::new();
    for band in brackets.iter().filter(|b| taxable_income > b.min) {
        let upper = band.max.map_or(taxable_income, |max| taxable_income.min(max));
        let taxable_amount = upper - band.min;
        let tax = taxable_amount * band.rate / 100.0;
        total += tax;
        rows.push(BracketTax {
            min: band.min,
            max: band.max,
            rate: band.rate,
            taxable_amount,
            tax,
        });
    }
    (total, rows)
}

/// Rate of the highest band the income reaches; 0 when it reaches none.
pub fn marginal_rate(taxable_income: f64, brackets: &[TaxBracket]) -> f64 {
    brackets
        .iter()
        .rev()
        .find(|b| taxable_income > b.min)
        .map_or(0.0, |b| b.rate)
}

pub fn calculate_tax(inputs: &TaxInputs) -> TaxResult {
    let total_income = inputs.employment_income
        + inputs.self_employment_income
        + inputs.interest_income
        + inputs.dividend_income
        + inputs.capital_gains * CAPITAL_GAINS_INCLUSION;
    let taxable_income =
        (total_income - inputs.rrsp_contributions - inputs.other_deductions).max(0.0);

    let provincial = inputs.province.brackets();
    let (federal_tax, federal_breakdown) = tax_by_bracket(taxable_income, FEDERAL_BRACKETS);
    let (provincial_tax, provincial_breakdown) = tax_by_bracket(taxable_income, provincial);

    let total_tax_before_credits = federal_tax + provincial_tax;
    let total_tax = (total_tax_before_credits - inputs.tax_credits).max(0.0);

    TaxResult {
        total_income,
        taxable_income,
        federal_tax,
        provincial_tax,
        total_tax_before_credits,
        total_tax,
        after_tax_income: total_income - total_tax,
        average_tax_rate: ratio_or(total_tax, taxable_income, 0.0) * 100.0,
        marginal_tax_rate: marginal_rate(taxable_income, FEDERAL_BRACKETS)
            + marginal_rate(taxable_income, provincial),
        effective_tax_rate: ratio_or(total_tax, total_income, 0.0) * 100.0,
        federal_breakdown,
        provincial_breakdown,
    }
}
