use serde::Deserialize;
use std::collections::HashSet;

use crate::core::{
    AccountBalances, AccountType, AffordabilityInputs, AnnualContributions, Child, Compounding,
    CppInputs, Debt, DebtPlanInputs, DownPayment, FhsaInputs, Goal, GoalPlanInputs,
    GovernmentBenefit, InflationInputs, InvestmentInputs, MortgageInputs, PaymentFrequency,
    PayoffStrategy, Priority, Province, RespInputs, RetirementInputs, RiskProfile, RrspInputs,
    SavingsInputs, TaxInputs,
};

/// Year the bracket tables, limits and CPI series describe.
pub const SNAPSHOT_YEAR: i32 = 2025;
/// Calendar years accepted from callers.
pub const MIN_YEAR: i32 = 1800;
pub const MAX_YEAR: i32 = 2200;
/// Oldest age accepted from callers.
pub const MAX_AGE: u32 = 120;

fn check_finite(field: &str, value: f64) -> Result<f64, String> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{field} must be a finite number"))
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<f64, String> {
    let value = check_finite(field, value)?;
    if value < 0.0 {
        return Err(format!("{field} must be >= 0"));
    }
    Ok(value)
}

fn check_percent(field: &str, value: f64) -> Result<f64, String> {
    let value = check_finite(field, value)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("{field} must be between 0 and 100"));
    }
    Ok(value)
}

fn check_year(field: &str, value: i32) -> Result<i32, String> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&value) {
        return Err(format!("{field} must be between {MIN_YEAR} and {MAX_YEAR}"));
    }
    Ok(value)
}

fn check_age(field: &str, value: u32) -> Result<u32, String> {
    if value > MAX_AGE {
        return Err(format!("{field} must be <= {MAX_AGE}"));
    }
    Ok(value)
}

/// Annual return or inflation rate; anything at or below -100% wipes out the balance.
fn check_rate(field: &str, value: f64) -> Result<f64, String> {
    let value = check_finite(field, value)?;
    if value <= -100.0 {
        return Err(format!("{field} must be > -100"));
    }
    Ok(value)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiPaymentFrequency {
    Monthly,
    #[serde(alias = "bi-weekly", alias = "biWeekly")]
    Biweekly,
    Weekly,
}

impl From<ApiPaymentFrequency> for PaymentFrequency {
    fn from(value: ApiPaymentFrequency) -> Self {
        match value {
            ApiPaymentFrequency::Monthly => PaymentFrequency::Monthly,
            ApiPaymentFrequency::Biweekly => PaymentFrequency::Biweekly,
            ApiPaymentFrequency::Weekly => PaymentFrequency::Weekly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiPayoffStrategy {
    Avalanche,
    Snowball,
}

impl From<ApiPayoffStrategy> for PayoffStrategy {
    fn from(value: ApiPayoffStrategy) -> Self {
        match value {
            ApiPayoffStrategy::Avalanche => PayoffStrategy::Avalanche,
            ApiPayoffStrategy::Snowball => PayoffStrategy::Snowball,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiCompounding {
    Monthly,
    Quarterly,
    #[serde(alias = "semiannually", alias = "semiAnnual", alias = "semi_annual")]
    SemiAnnual,
    #[serde(alias = "annually")]
    Annual,
}

impl From<ApiCompounding> for Compounding {
    fn from(value: ApiCompounding) -> Self {
        match value {
            ApiCompounding::Monthly => Compounding::Monthly,
            ApiCompounding::Quarterly => Compounding::Quarterly,
            ApiCompounding::SemiAnnual => Compounding::SemiAnnual,
            ApiCompounding::Annual => Compounding::Annual,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiAccountType {
    Tfsa,
    Rrsp,
    #[serde(alias = "nonRegistered", alias = "non_registered")]
    NonRegistered,
}

impl From<ApiAccountType> for AccountType {
    fn from(value: ApiAccountType) -> Self {
        match value {
            ApiAccountType::Tfsa => AccountType::Tfsa,
            ApiAccountType::Rrsp => AccountType::Rrsp,
            ApiAccountType::NonRegistered => AccountType::NonRegistered,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiProvince {
    #[serde(alias = "on")]
    Ontario,
    #[serde(alias = "qc")]
    Quebec,
    #[serde(alias = "britishColumbia", alias = "british_columbia", alias = "bc")]
    BritishColumbia,
    #[serde(alias = "ab")]
    Alberta,
}

impl From<ApiProvince> for Province {
    fn from(value: ApiProvince) -> Self {
        match value {
            ApiProvince::Ontario => Province::Ontario,
            ApiProvince::Quebec => Province::Quebec,
            ApiProvince::BritishColumbia => Province::BritishColumbia,
            ApiProvince::Alberta => Province::Alberta,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiRiskProfile {
    Conservative,
    Balanced,
    Growth,
    Aggressive,
}

impl From<ApiRiskProfile> for RiskProfile {
    fn from(value: ApiRiskProfile) -> Self {
        match value {
            ApiRiskProfile::Conservative => RiskProfile::Conservative,
            ApiRiskProfile::Balanced => RiskProfile::Balanced,
            ApiRiskProfile::Growth => RiskProfile::Growth,
            ApiRiskProfile::Aggressive => RiskProfile::Aggressive,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiPriority {
    High,
    Medium,
    Low,
}

impl From<ApiPriority> for Priority {
    fn from(value: ApiPriority) -> Self {
        match value {
            ApiPriority::High => Priority::High,
            ApiPriority::Medium => Priority::Medium,
            ApiPriority::Low => Priority::Low,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MortgagePayload {
    pub property_value: Option<f64>,
    pub down_payment: Option<f64>,
    pub down_payment_percent: Option<f64>,
    pub interest_rate: Option<f64>,
    pub amortization_years: Option<u32>,
    pub payment_frequency: Option<ApiPaymentFrequency>,
}

impl MortgagePayload {
    pub fn into_inputs(self) -> Result<MortgageInputs, String> {
        let down_payment = match (self.down_payment, self.down_payment_percent) {
            (Some(_), Some(_)) => {
                return Err("set only one of downPayment or downPaymentPercent".to_string());
            }
            (Some(amount), None) => {
                DownPayment::Amount(check_non_negative("downPayment", amount)?)
            }
            (None, Some(percent)) => {
                DownPayment::Percent(check_percent("downPaymentPercent", percent)?)
            }
            (None, None) => DownPayment::Amount(100_000.0),
        };

        let property_value =
            check_non_negative("propertyValue", self.property_value.unwrap_or(500_000.0))?;
        if property_value == 0.0 {
            return Err("propertyValue must be > 0".to_string());
        }

        let amortization_years = self.amortization_years.unwrap_or(25);
        if !(1..=50).contains(&amortization_years) {
            return Err("amortizationYears must be between 1 and 50".to_string());
        }

        Ok(MortgageInputs {
            property_value,
            down_payment,
            interest_rate: check_non_negative("interestRate", self.interest_rate.unwrap_or(5.0))?,
            amortization_years,
            payment_frequency: self
                .payment_frequency
                .unwrap_or(ApiPaymentFrequency::Monthly)
                .into(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AffordabilityPayload {
    pub annual_income: Option<f64>,
    pub additional_income: Option<f64>,
    pub monthly_debts: Option<f64>,
    pub down_payment: Option<f64>,
    pub interest_rate: Option<f64>,
    pub amortization_years: Option<u32>,
    pub property_tax_rate: Option<f64>,
    pub heating_costs: Option<f64>,
    pub condo_fees: Option<f64>,
}

impl AffordabilityPayload {
    pub fn into_inputs(self) -> Result<AffordabilityInputs, String> {
        let amortization_years = self.amortization_years.unwrap_or(25);
        if !(1..=50).contains(&amortization_years) {
            return Err("amortizationYears must be between 1 and 50".to_string());
        }
        Ok(AffordabilityInputs {
            annual_income: check_non_negative(
                "annualIncome",
                self.annual_income.unwrap_or(80_000.0),
            )?,
            additional_income: check_non_negative(
                "additionalIncome",
                self.additional_income.unwrap_or(0.0),
            )?,
            monthly_debts: check_non_negative("monthlyDebts", self.monthly_debts.unwrap_or(500.0))?,
            down_payment: check_non_negative("downPayment", self.down_payment.unwrap_or(50_000.0))?,
            interest_rate: check_non_negative("interestRate", self.interest_rate.unwrap_or(5.0))?,
            amortization_years,
            property_tax_rate: check_percent(
                "propertyTaxRate",
                self.property_tax_rate.unwrap_or(1.0),
            )?,
            monthly_heating: check_non_negative("heatingCosts", self.heating_costs.unwrap_or(150.0))?,
            monthly_condo_fees: check_non_negative("condoFees", self.condo_fees.unwrap_or(0.0))?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayload {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    pub balance: f64,
    pub interest_rate: f64,
    pub minimum_payment: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebtPlanPayload {
    pub debts: Option<Vec<DebtPayload>>,
    pub monthly_payment: Option<f64>,
    pub strategy: Option<ApiPayoffStrategy>,
}

fn default_debts() -> Vec<Debt> {
    vec![
        Debt {
            id: 1,
            name: "Credit Card".to_string(),
            balance: 5_000.0,
            interest_rate: 19.99,
            minimum_payment: 100.0,
        },
        Debt {
            id: 2,
            name: "Student Loan".to_string(),
            balance: 15_000.0,
            interest_rate: 4.5,
            minimum_payment: 150.0,
        },
        Debt {
            id: 3,
            name: "Car Loan".to_string(),
            balance: 12_000.0,
            interest_rate: 6.5,
            minimum_payment: 250.0,
        },
    ]
}

impl DebtPlanPayload {
    pub fn into_inputs(self) -> Result<DebtPlanInputs, String> {
        let debts = match self.debts {
            None => default_debts(),
            Some(items) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| {
                    let id = item.id.unwrap_or(idx as u32 + 1);
                    Ok(Debt {
                        id,
                        name: item.name.unwrap_or_else(|| format!("Debt {id}")),
                        balance: check_non_negative("debts[].balance", item.balance)?,
                        interest_rate: check_non_negative(
                            "debts[].interestRate",
                            item.interest_rate,
                        )?,
                        minimum_payment: check_non_negative(
                            "debts[].minimumPayment",
                            item.minimum_payment,
                        )?,
                    })
                })
                .collect::<Result<Vec<_>, String>>()?,
        };

        let mut seen = HashSet::new();
        if let Some(dup) = debts.iter().find(|d| !seen.insert(d.id)) {
            return Err(format!("duplicate debt id {}", dup.id));
        }

        Ok(DebtPlanInputs {
            debts,
            monthly_budget: check_non_negative(
                "monthlyPayment",
                self.monthly_payment.unwrap_or(600.0),
            )?,
            strategy: self.strategy.unwrap_or(ApiPayoffStrategy::Avalanche).into(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CppPayload {
    pub birth_year: Option<i32>,
    pub current_year: Option<i32>,
    pub retirement_age: Option<u32>,
    pub start_age: Option<u32>,
    pub average_income: Option<f64>,
    pub years_contributed: Option<u32>,
}

impl CppPayload {
    pub fn into_inputs(self) -> Result<CppInputs, String> {
        let birth_year = check_year("birthYear", self.birth_year.unwrap_or(1985))?;
        let current_year = check_year("currentYear", self.current_year.unwrap_or(SNAPSHOT_YEAR))?;
        if birth_year > current_year {
            return Err("birthYear must be <= currentYear".to_string());
        }
        let start_age = self.start_age.unwrap_or(65);
        if !(60..=70).contains(&start_age) {
            return Err("startAge must be between 60 and 70".to_string());
        }
        Ok(CppInputs {
            birth_year,
            current_year,
            retirement_age: check_age("retirementAge", self.retirement_age.unwrap_or(65))?,
            start_age,
            average_income: check_non_negative(
                "averageIncome",
                self.average_income.unwrap_or(60_000.0),
            )?,
            years_contributed: self.years_contributed.unwrap_or(35),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RrspPayload {
    pub current_age: Option<u32>,
    pub retirement_age: Option<u32>,
    pub current_income: Option<f64>,
    pub current_rrsp: Option<f64>,
    pub annual_contribution: Option<f64>,
    pub unused_room: Option<f64>,
    pub expected_return: Option<f64>,
    pub inflation_rate: Option<f64>,
    pub current_tax_rate: Option<f64>,
    pub retirement_tax_rate: Option<f64>,
}

impl RrspPayload {
    pub fn into_inputs(self) -> Result<RrspInputs, String> {
        Ok(RrspInputs {
            current_age: check_age("currentAge", self.current_age.unwrap_or(30))?,
            retirement_age: check_age("retirementAge", self.retirement_age.unwrap_or(65))?,
            current_income: check_non_negative(
                "currentIncome",
                self.current_income.unwrap_or(75_000.0),
            )?,
            current_balance: check_non_negative("currentRrsp", self.current_rrsp.unwrap_or(25_000.0))?,
            annual_contribution: check_non_negative(
                "annualContribution",
                self.annual_contribution.unwrap_or(6_000.0),
            )?,
            unused_room: check_non_negative("unusedRoom", self.unused_room.unwrap_or(0.0))?,
            expected_return: check_rate("expectedReturn", self.expected_return.unwrap_or(6.0))?,
            inflation_rate: check_rate("inflationRate", self.inflation_rate.unwrap_or(2.0))?,
            current_tax_rate: check_percent(
                "currentTaxRate",
                self.current_tax_rate.unwrap_or(30.0),
            )?,
            retirement_tax_rate: check_percent(
                "retirementTaxRate",
                self.retirement_tax_rate.unwrap_or(20.0),
            )?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SavingsPayload {
    pub initial_deposit: Option<f64>,
    pub monthly_contribution: Option<f64>,
    pub interest_rate: Option<f64>,
    pub years: Option<u32>,
    pub compounding_frequency: Option<ApiCompounding>,
    pub account_type: Option<ApiAccountType>,
    pub tax_rate: Option<f64>,
    pub inflation_rate: Option<f64>,
}

impl SavingsPayload {
    pub fn into_inputs(self) -> Result<SavingsInputs, String> {
        Ok(SavingsInputs {
            initial_deposit: check_non_negative(
                "initialDeposit",
                self.initial_deposit.unwrap_or(1_000.0),
            )?,
            monthly_contribution: check_non_negative(
                "monthlyContribution",
                self.monthly_contribution.unwrap_or(200.0),
            )?,
            interest_rate: check_rate("interestRate", self.interest_rate.unwrap_or(5.0))?,
            years: self.years.unwrap_or(10),
            compounding: self
                .compounding_frequency
                .unwrap_or(ApiCompounding::Annual)
                .into(),
            account_type: self.account_type.unwrap_or(ApiAccountType::Tfsa).into(),
            tax_rate: check_percent("taxRate", self.tax_rate.unwrap_or(30.0))?,
            inflation_rate: check_rate("inflationRate", self.inflation_rate.unwrap_or(2.0))?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FhsaPayload {
    pub current_age: Option<u32>,
    pub annual_income: Option<f64>,
    pub marginal_tax_rate: Option<f64>,
    pub current_fhsa: Option<f64>,
    pub annual_contribution: Option<f64>,
    pub expected_return: Option<f64>,
    pub inflation_rate: Option<f64>,
    pub target_home_price: Option<f64>,
    pub down_payment_percent: Option<f64>,
}

impl FhsaPayload {
    pub fn into_inputs(self) -> Result<FhsaInputs, String> {
        Ok(FhsaInputs {
            current_age: check_age("currentAge", self.current_age.unwrap_or(30))?,
            annual_income: check_non_negative(
                "annualIncome",
                self.annual_income.unwrap_or(80_000.0),
            )?,
            marginal_tax_rate: check_percent(
                "marginalTaxRate",
                self.marginal_tax_rate.unwrap_or(30.0),
            )?,
            current_balance: check_non_negative("currentFhsa", self.current_fhsa.unwrap_or(0.0))?,
            annual_contribution: check_non_negative(
                "annualContribution",
                self.annual_contribution.unwrap_or(8_000.0),
            )?,
            expected_return: check_rate("expectedReturn", self.expected_return.unwrap_or(5.0))?,
            inflation_rate: check_rate("inflationRate", self.inflation_rate.unwrap_or(2.0))?,
            target_home_price: check_non_negative(
                "targetHomePrice",
                self.target_home_price.unwrap_or(500_000.0),
            )?,
            down_payment_percent: check_percent(
                "downPaymentPercent",
                self.down_payment_percent.unwrap_or(20.0),
            )?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildPayload {
    #[serde(default)]
    pub name: Option<String>,
    pub age: u32,
    pub target_amount: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RespPayload {
    pub children: Option<Vec<ChildPayload>>,
    pub current_resp: Option<f64>,
    pub annual_contribution: Option<f64>,
    pub expected_return: Option<f64>,
    pub inflation_rate: Option<f64>,
    pub include_grants: Option<bool>,
}

impl RespPayload {
    pub fn into_inputs(self) -> Result<RespInputs, String> {
        let children = match self.children {
            None => vec![Child {
                name: "Child 1".to_string(),
                age: 5,
                target_amount: 80_000.0,
            }],
            Some(items) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| {
                    Ok(Child {
                        name: item.name.unwrap_or_else(|| format!("Child {}", idx + 1)),
                        age: item.age,
                        target_amount: check_non_negative(
                            "children[].targetAmount",
                            item.target_amount,
                        )?,
                    })
                })
                .collect::<Result<Vec<_>, String>>()?,
        };

        Ok(RespInputs {
            children,
            current_balance: check_non_negative("currentResp", self.current_resp.unwrap_or(5_000.0))?,
            annual_contribution: check_non_negative(
                "annualContribution",
                self.annual_contribution.unwrap_or(2_500.0),
            )?,
            expected_return: check_rate("expectedReturn", self.expected_return.unwrap_or(5.0))?,
            inflation_rate: check_rate("inflationRate", self.inflation_rate.unwrap_or(2.0))?,
            include_grants: self.include_grants.unwrap_or(true),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetirementPayload {
    pub current_age: Option<u32>,
    pub retirement_age: Option<u32>,
    pub life_expectancy: Option<u32>,
    pub current_income: Option<f64>,
    pub desired_income_percent: Option<f64>,
    pub rrsp_savings: Option<f64>,
    pub tfsa_savings: Option<f64>,
    pub non_registered_savings: Option<f64>,
    pub pension_value: Option<f64>,
    pub rrsp_contribution: Option<f64>,
    pub tfsa_contribution: Option<f64>,
    pub non_registered_contribution: Option<f64>,
    pub pre_retirement_return: Option<f64>,
    pub post_retirement_return: Option<f64>,
    pub inflation_rate: Option<f64>,
    pub cpp_start_age: Option<u32>,
    pub cpp_benefit: Option<f64>,
    pub oas_start_age: Option<u32>,
    pub oas_benefit: Option<f64>,
}

impl RetirementPayload {
    pub fn into_inputs(self) -> Result<RetirementInputs, String> {
        Ok(RetirementInputs {
            current_age: check_age("currentAge", self.current_age.unwrap_or(35))?,
            retirement_age: check_age("retirementAge", self.retirement_age.unwrap_or(65))?,
            life_expectancy: check_age("lifeExpectancy", self.life_expectancy.unwrap_or(90))?,
            current_income: check_non_negative(
                "currentIncome",
                self.current_income.unwrap_or(80_000.0),
            )?,
            desired_income_percent: check_non_negative(
                "desiredIncomePercent",
                self.desired_income_percent.unwrap_or(70.0),
            )?,
            savings: AccountBalances {
                rrsp: check_non_negative("rrspSavings", self.rrsp_savings.unwrap_or(50_000.0))?,
                tfsa: check_non_negative("tfsaSavings", self.tfsa_savings.unwrap_or(25_000.0))?,
                non_registered: check_non_negative(
                    "nonRegisteredSavings",
                    self.non_registered_savings.unwrap_or(15_000.0),
                )?,
                pension: check_non_negative("pensionValue", self.pension_value.unwrap_or(100_000.0))?,
            },
            contributions: AnnualContributions {
                rrsp: check_non_negative(
                    "rrspContribution",
                    self.rrsp_contribution.unwrap_or(6_000.0),
                )?,
                tfsa: check_non_negative(
                    "tfsaContribution",
                    self.tfsa_contribution.unwrap_or(6_000.0),
                )?,
                non_registered: check_non_negative(
                    "nonRegisteredContribution",
                    self.non_registered_contribution.unwrap_or(2_000.0),
                )?,
            },
            pre_retirement_return: check_rate(
                "preRetirementReturn",
                self.pre_retirement_return.unwrap_or(6.0),
            )?,
            post_retirement_return: check_rate(
                "postRetirementReturn",
                self.post_retirement_return.unwrap_or(4.0),
            )?,
            inflation_rate: check_rate("inflationRate", self.inflation_rate.unwrap_or(2.0))?,
            cpp: GovernmentBenefit {
                start_age: self.cpp_start_age.unwrap_or(65),
                monthly_amount: check_non_negative("cppBenefit", self.cpp_benefit.unwrap_or(1_000.0))?,
            },
            oas: GovernmentBenefit {
                start_age: self.oas_start_age.unwrap_or(65),
                monthly_amount: check_non_negative("oasBenefit", self.oas_benefit.unwrap_or(700.0))?,
            },
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaxPayload {
    pub province: Option<ApiProvince>,
    pub employment_income: Option<f64>,
    pub self_employment_income: Option<f64>,
    pub interest_income: Option<f64>,
    pub dividend_income: Option<f64>,
    pub capital_gains: Option<f64>,
    pub rrsp_contributions: Option<f64>,
    pub other_deductions: Option<f64>,
    pub tax_credits: Option<f64>,
}

impl TaxPayload {
    pub fn into_inputs(self) -> Result<TaxInputs, String> {
        Ok(TaxInputs {
            province: self.province.unwrap_or(ApiProvince::Ontario).into(),
            employment_income: check_non_negative(
                "employmentIncome",
                self.employment_income.unwrap_or(75_000.0),
            )?,
            self_employment_income: check_non_negative(
                "selfEmploymentIncome",
                self.self_employment_income.unwrap_or(0.0),
            )?,
            interest_income: check_non_negative(
                "interestIncome",
                self.interest_income.unwrap_or(0.0),
            )?,
            dividend_income: check_non_negative(
                "dividendIncome",
                self.dividend_income.unwrap_or(0.0),
            )?,
            capital_gains: check_non_negative("capitalGains", self.capital_gains.unwrap_or(0.0))?,
            rrsp_contributions: check_non_negative(
                "rrspContributions",
                self.rrsp_contributions.unwrap_or(6_000.0),
            )?,
            other_deductions: check_non_negative(
                "otherDeductions",
                self.other_deductions.unwrap_or(0.0),
            )?,
            tax_credits: check_non_negative("taxCredits", self.tax_credits.unwrap_or(0.0))?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InflationPayload {
    pub amount: Option<f64>,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub custom_inflation_rate: Option<f64>,
    pub use_historical_rates: Option<bool>,
}

impl InflationPayload {
    pub fn into_inputs(self) -> Result<InflationInputs, String> {
        Ok(InflationInputs {
            amount: check_non_negative("amount", self.amount.unwrap_or(1_000.0))?,
            start_year: check_year("startYear", self.start_year.unwrap_or(2000))?,
            end_year: check_year("endYear", self.end_year.unwrap_or(SNAPSHOT_YEAR))?,
            custom_rate: check_rate(
                "customInflationRate",
                self.custom_inflation_rate.unwrap_or(2.0),
            )?,
            use_historical: self.use_historical_rates.unwrap_or(true),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvestmentPayload {
    pub initial_investment: Option<f64>,
    pub monthly_contribution: Option<f64>,
    pub investment_years: Option<u32>,
    pub risk_profile: Option<ApiRiskProfile>,
    pub expected_return: Option<f64>,
    pub fee_percentage: Option<f64>,
    pub inflation_rate: Option<f64>,
    pub tax_rate: Option<f64>,
    pub account_type: Option<ApiAccountType>,
}

impl InvestmentPayload {
    pub fn into_inputs(self) -> Result<InvestmentInputs, String> {
        Ok(InvestmentInputs {
            initial_investment: check_non_negative(
                "initialInvestment",
                self.initial_investment.unwrap_or(10_000.0),
            )?,
            monthly_contribution: check_non_negative(
                "monthlyContribution",
                self.monthly_contribution.unwrap_or(500.0),
            )?,
            years: self.investment_years.unwrap_or(20),
            risk_profile: self.risk_profile.unwrap_or(ApiRiskProfile::Balanced).into(),
            custom_return: self
                .expected_return
                .map(|v| check_rate("expectedReturn", v))
                .transpose()?,
            fee_percentage: check_percent("feePercentage", self.fee_percentage.unwrap_or(0.5))?,
            inflation_rate: check_rate("inflationRate", self.inflation_rate.unwrap_or(2.0))?,
            tax_rate: check_percent("taxRate", self.tax_rate.unwrap_or(30.0))?,
            account_type: self.account_type.unwrap_or(ApiAccountType::Tfsa).into(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPayload {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    pub monthly_contribution: f64,
    #[serde(default)]
    pub priority: Option<ApiPriority>,
    #[serde(default)]
    pub expected_return: Option<f64>,
    #[serde(default)]
    pub deadline_months: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoalPlanPayload {
    pub goals: Option<Vec<GoalPayload>>,
    pub monthly_income: Option<f64>,
    pub monthly_expenses: Option<f64>,
    pub inflation_rate: Option<f64>,
}

fn default_goals() -> Vec<Goal> {
    let goal = |id: u32, name: &str, target, current, monthly, priority, rate| Goal {
        id,
        name: name.to_string(),
        target_amount: target,
        current_amount: current,
        monthly_contribution: monthly,
        priority,
        expected_return: rate,
        deadline_months: None,
    };
    vec![
        goal(1, "Emergency Fund", 15_000.0, 5_000.0, 500.0, Priority::High, 2.0),
        goal(2, "Down Payment", 60_000.0, 10_000.0, 1_000.0, Priority::Medium, 4.0),
        goal(3, "Vacation", 5_000.0, 1_000.0, 200.0, Priority::Low, 1.0),
    ]
}

impl GoalPlanPayload {
    pub fn into_inputs(self) -> Result<GoalPlanInputs, String> {
        let goals = match self.goals {
            None => default_goals(),
            Some(items) => items
                .into_iter()
                .enumerate()
                .map(|(idx, item)| {
                    let id = item.id.unwrap_or(idx as u32 + 1);
                    Ok(Goal {
                        id,
                        name: item.name.unwrap_or_else(|| format!("Goal {id}")),
                        target_amount: check_non_negative(
                            "goals[].targetAmount",
                            item.target_amount,
                        )?,
                        current_amount: check_non_negative(
                            "goals[].currentAmount",
                            item.current_amount,
                        )?,
                        monthly_contribution: check_non_negative(
                            "goals[].monthlyContribution",
                            item.monthly_contribution,
                        )?,
                        priority: item.priority.unwrap_or(ApiPriority::Medium).into(),
                        expected_return: check_rate(
                            "goals[].expectedReturn",
                            item.expected_return.unwrap_or(3.0),
                        )?,
                        deadline_months: item.deadline_months,
                    })
                })
                .collect::<Result<Vec<_>, String>>()?,
        };

        Ok(GoalPlanInputs {
            goals,
            monthly_income: check_non_negative(
                "monthlyIncome",
                self.monthly_income.unwrap_or(5_000.0),
            )?,
            monthly_expenses: check_non_negative(
                "monthlyExpenses",
                self.monthly_expenses.unwrap_or(3_500.0),
            )?,
            inflation_rate: check_rate("inflationRate", self.inflation_rate.unwrap_or(2.0))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: serde::de::DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).expect("valid JSON payload")
    }

    #[test]
    fn empty_mortgage_payload_uses_form_defaults() {
        let inputs = parse::<MortgagePayload>("{}").into_inputs().expect("valid inputs");
        assert_eq!(inputs.property_value, 500_000.0);
        assert_eq!(inputs.down_payment, DownPayment::Amount(100_000.0));
        assert_eq!(inputs.amortization_years, 25);
        assert_eq!(inputs.payment_frequency, PaymentFrequency::Monthly);
    }

    #[test]
    fn mortgage_payload_parses_camel_case_and_aliases() {
        let inputs = parse::<MortgagePayload>(
            r#"{"propertyValue": 750000, "downPaymentPercent": 10, "paymentFrequency": "bi-weekly"}"#,
        )
        .into_inputs()
        .expect("valid inputs");
        assert_eq!(inputs.property_value, 750_000.0);
        assert_eq!(inputs.down_payment, DownPayment::Percent(10.0));
        assert_eq!(inputs.payment_frequency, PaymentFrequency::Biweekly);
    }

    #[test]
    fn mortgage_payload_rejects_both_down_payment_fields() {
        let err = parse::<MortgagePayload>(r#"{"downPayment": 1, "downPaymentPercent": 10}"#)
            .into_inputs()
            .expect_err("must reject ambiguous down payment");
        assert!(err.contains("downPayment"));
    }

    #[test]
    fn negative_amounts_name_the_field() {
        let err = parse::<AffordabilityPayload>(r#"{"monthlyDebts": -5}"#)
            .into_inputs()
            .expect_err("must reject negative debts");
        assert!(err.contains("monthlyDebts"));

        let err = parse::<SavingsPayload>(r#"{"taxRate": 140}"#)
            .into_inputs()
            .expect_err("must reject tax rate above 100");
        assert!(err.contains("taxRate"));
    }

    #[test]
    fn debt_payload_fills_ids_and_names() {
        let inputs = parse::<DebtPlanPayload>(
            r#"{"debts": [{"balance": 100, "interestRate": 10, "minimumPayment": 20}],
                "strategy": "snowball", "monthlyPayment": 50}"#,
        )
        .into_inputs()
        .expect("valid inputs");
        assert_eq!(inputs.debts[0].id, 1);
        assert_eq!(inputs.debts[0].name, "Debt 1");
        assert_eq!(inputs.strategy, PayoffStrategy::Snowball);
        assert_eq!(inputs.monthly_budget, 50.0);
    }

    #[test]
    fn default_debt_list_matches_form() {
        let inputs = parse::<DebtPlanPayload>("{}").into_inputs().expect("valid inputs");
        assert_eq!(inputs.debts.len(), 3);
        assert_eq!(inputs.monthly_budget, 600.0);
    }

    #[test]
    fn cpp_payload_bounds_start_age() {
        let err = parse::<CppPayload>(r#"{"startAge": 72}"#)
            .into_inputs()
            .expect_err("must reject start age after 70");
        assert!(err.contains("startAge"));

        let inputs = parse::<CppPayload>("{}").into_inputs().expect("valid inputs");
        assert_eq!(inputs.current_year, SNAPSHOT_YEAR);
    }

    #[test]
    fn enum_aliases_are_accepted() {
        let tax = parse::<TaxPayload>(r#"{"province": "bc"}"#)
            .into_inputs()
            .expect("valid inputs");
        assert_eq!(tax.province, Province::BritishColumbia);

        let savings = parse::<SavingsPayload>(
            r#"{"compoundingFrequency": "semiannually", "accountType": "nonRegistered"}"#,
        )
        .into_inputs()
        .expect("valid inputs");
        assert_eq!(savings.compounding, Compounding::SemiAnnual);
        assert_eq!(savings.account_type, AccountType::NonRegistered);
    }

    #[test]
    fn investment_return_override_is_optional() {
        let inputs = parse::<InvestmentPayload>("{}").into_inputs().expect("valid inputs");
        assert_eq!(inputs.custom_return, None);

        let inputs = parse::<InvestmentPayload>(r#"{"expectedReturn": 7.5, "riskProfile": "growth"}"#)
            .into_inputs()
            .expect("valid inputs");
        assert_eq!(inputs.custom_return, Some(7.5));
        assert_eq!(inputs.risk_profile, RiskProfile::Growth);
    }

    #[test]
    fn goal_payload_defaults_priority_and_return() {
        let inputs = parse::<GoalPlanPayload>(
            r#"{"goals": [{"targetAmount": 1000, "monthlyContribution": 50, "deadlineMonths": 12}]}"#,
        )
        .into_inputs()
        .expect("valid inputs");
        assert_eq!(inputs.goals[0].priority, Priority::Medium);
        assert_eq!(inputs.goals[0].expected_return, 3.0);
        assert_eq!(inputs.goals[0].deadline_months, Some(12));
    }

    #[test]
    fn resp_and_retirement_defaults_are_valid() {
        let resp = parse::<RespPayload>("{}").into_inputs().expect("valid inputs");
        assert_eq!(resp.children.len(), 1);
        assert!(resp.include_grants);

        let retirement = parse::<RetirementPayload>("{}").into_inputs().expect("valid inputs");
        assert_eq!(retirement.savings.pension, 100_000.0);
        assert_eq!(retirement.oas.monthly_amount, 700.0);
    }

    #[test]
    fn years_outside_the_calendar_window_are_rejected() {
        let err = parse::<InflationPayload>(r#"{"startYear": -2147483648, "endYear": 2147483647}"#)
            .into_inputs()
            .expect_err("must reject extreme years");
        assert!(err.contains("startYear"));

        let err = parse::<CppPayload>(r#"{"birthYear": 1985, "currentYear": 2147483647}"#)
            .into_inputs()
            .expect_err("must reject extreme current year");
        assert!(err.contains("currentYear"));

        let inputs = parse::<InflationPayload>(r#"{"startYear": 1800, "endYear": 1999}"#)
            .into_inputs()
            .expect("bounds are inclusive");
        assert_eq!(inputs.start_year, MIN_YEAR);
    }

    #[test]
    fn ages_beyond_the_limit_are_rejected() {
        let err = parse::<FhsaPayload>(r#"{"currentAge": 4294967295}"#)
            .into_inputs()
            .expect_err("must reject impossible age");
        assert!(err.contains("currentAge"));

        let err = parse::<RetirementPayload>(r#"{"lifeExpectancy": 121}"#)
            .into_inputs()
            .expect_err("must reject impossible age");
        assert!(err.contains("lifeExpectancy"));

        let inputs = parse::<RrspPayload>(r#"{"currentAge": 120, "unusedRoom": 2500}"#)
            .into_inputs()
            .expect("age limit is inclusive");
        assert_eq!(inputs.current_age, MAX_AGE);
        assert_eq!(inputs.unused_room, 2_500.0);
    }

    #[test]
    fn rates_at_or_below_minus_hundred_are_rejected() {
        let err = parse::<RrspPayload>(r#"{"expectedReturn": -100}"#)
            .into_inputs()
            .expect_err("must reject total loss rate");
        assert!(err.contains("expectedReturn"));
    }
}
