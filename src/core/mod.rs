mod affordability;
mod cpp;
mod debt;
mod fhsa;
mod goals;
mod growth;
mod inflation;
mod investment;
mod mortgage;
mod resp;
mod retirement;
mod rrsp;
mod savings;
mod solver;
mod tax;

pub use affordability::{AffordabilityInputs, AffordabilityResult, calculate_affordability};
pub use cpp::{CppInputs, CppResult, adjustment_factor, calculate_cpp};
pub use debt::{Debt, DebtPayoffResult, DebtPlanInputs, PayoffStrategy, simulate_payoff};
pub use fhsa::{FhsaInputs, FhsaResult, calculate_fhsa};
pub use goals::{Goal, GoalPlanInputs, GoalPlanResult, Priority, plan_goals};
pub use growth::{MAX_MONTHS, MAX_YEARS};
pub use inflation::{InflationInputs, InflationResult, calculate_inflation};
pub use investment::{InvestmentInputs, InvestmentResult, RiskProfile, calculate_investment};
pub use mortgage::{
    DownPayment, MortgageInputs, MortgageResult, PaymentFrequency, calculate_mortgage,
};
pub use resp::{Child, RespInputs, RespResult, calculate_resp};
pub use retirement::{
    AccountBalances, AnnualContributions, GovernmentBenefit, RetirementInputs, RetirementResult,
    calculate_retirement,
};
pub use rrsp::{RrspInputs, RrspResult, calculate_rrsp};
pub use savings::{AccountType, Compounding, SavingsInputs, SavingsResult, calculate_savings};
pub use tax::{Province, TaxInputs, TaxResult, calculate_tax};
