use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::ValueEnum;
use serde::{Serialize, de::DeserializeOwned};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::core::{
    AffordabilityResult, CppResult, DebtPayoffResult, FhsaResult, GoalPlanResult,
    InflationResult, InvestmentResult, MortgageResult, RespResult, RetirementResult, RrspResult,
    SavingsResult, TaxResult, calculate_affordability, calculate_cpp, calculate_fhsa,
    calculate_inflation, calculate_investment, calculate_mortgage, calculate_resp,
    calculate_retirement, calculate_rrsp, calculate_savings, calculate_tax, plan_goals,
    simulate_payoff,
};

mod error;
mod payloads;

pub use error::ApiError;
pub use payloads::SNAPSHOT_YEAR;
use payloads::{
    AffordabilityPayload, CppPayload, DebtPlanPayload, FhsaPayload, GoalPlanPayload,
    InflationPayload, InvestmentPayload, MortgagePayload, RespPayload, RetirementPayload,
    RrspPayload, SavingsPayload, TaxPayload,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Calculator {
    Mortgage,
    Affordability,
    Debt,
    Cpp,
    Rrsp,
    Savings,
    Fhsa,
    Resp,
    Retirement,
    Tax,
    Inflation,
    Investment,
    Goals,
}

impl Calculator {
    pub fn name(self) -> &'static str {
        match self {
            Calculator::Mortgage => "mortgage",
            Calculator::Affordability => "affordability",
            Calculator::Debt => "debt",
            Calculator::Cpp => "cpp",
            Calculator::Rrsp => "rrsp",
            Calculator::Savings => "savings",
            Calculator::Fhsa => "fhsa",
            Calculator::Resp => "resp",
            Calculator::Retirement => "retirement",
            Calculator::Tax => "tax",
            Calculator::Inflation => "inflation",
            Calculator::Investment => "investment",
            Calculator::Goals => "goals",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Calculator::Mortgage => "Mortgage payment, CMHC premium and amortization schedule",
            Calculator::Affordability => "Maximum affordable home price under GDS/TDS limits",
            Calculator::Debt => "Debt payoff by avalanche or snowball",
            Calculator::Cpp => "CPP pension estimate and start-age comparison",
            Calculator::Rrsp => "RRSP growth, contribution room and retirement income",
            Calculator::Savings => "Savings or TFSA growth with compounding frequency",
            Calculator::Fhsa => "FHSA growth towards a down payment",
            Calculator::Resp => "RESP growth with CESG grants per child",
            Calculator::Retirement => "Retirement accumulation and drawdown shortfall",
            Calculator::Tax => "Federal and provincial income tax",
            Calculator::Inflation => "Purchasing power across years with historical CPI",
            Calculator::Investment => "Investment growth by risk profile with fee drag",
            Calculator::Goals => "Savings goals by priority with months to target",
        }
    }

    /// List-valued payloads cannot be expressed as a query string.
    pub fn accepts_query(self) -> bool {
        !matches!(
            self,
            Calculator::Debt | Calculator::Resp | Calculator::Goals
        )
    }

    pub fn path(self) -> String {
        format!("/api/{}", self.name())
    }
}

/// A request payload that can be turned into a calculator result.
pub trait Calculation: DeserializeOwned + Default + Send + 'static {
    type Output: Serialize;
    const CALCULATOR: Calculator;

    fn compute(self) -> Result<Self::Output, ApiError>;
}

impl Calculation for MortgagePayload {
    type Output = MortgageResult;
    const CALCULATOR: Calculator = Calculator::Mortgage;

    fn compute(self) -> Result<Self::Output, ApiError> {
        let inputs = self.into_inputs()?;
        calculate_mortgage(&inputs).ok_or_else(|| {
            ApiError::Unprocessable(
                "down payment must be at least 5% of the property value".to_string(),
            )
        })
    }
}

impl Calculation for AffordabilityPayload {
    type Output = AffordabilityResult;
    const CALCULATOR: Calculator = Calculator::Affordability;

    fn compute(self) -> Result<Self::Output, ApiError> {
        Ok(calculate_affordability(&self.into_inputs()?))
    }
}

impl Calculation for DebtPlanPayload {
    type Output = DebtPayoffResult;
    const CALCULATOR: Calculator = Calculator::Debt;

    fn compute(self) -> Result<Self::Output, ApiError> {
        let inputs = self.into_inputs()?;
        simulate_payoff(&inputs)
            .ok_or_else(|| ApiError::Unprocessable("no debts to pay off".to_string()))
    }
}

impl Calculation for CppPayload {
    type Output = CppResult;
    const CALCULATOR: Calculator = Calculator::Cpp;

    fn compute(self) -> Result<Self::Output, ApiError> {
        Ok(calculate_cpp(&self.into_inputs()?))
    }
}

impl Calculation for RrspPayload {
    type Output = RrspResult;
    const CALCULATOR: Calculator = Calculator::Rrsp;

    fn compute(self) -> Result<Self::Output, ApiError> {
        let inputs = self.into_inputs()?;
        calculate_rrsp(&inputs).ok_or_else(|| {
            ApiError::Unprocessable("retirementAge must be after currentAge".to_string())
        })
    }
}

impl Calculation for SavingsPayload {
    type Output = SavingsResult;
    const CALCULATOR: Calculator = Calculator::Savings;

    fn compute(self) -> Result<Self::Output, ApiError> {
        Ok(calculate_savings(&self.into_inputs()?))
    }
}

impl Calculation for FhsaPayload {
    type Output = FhsaResult;
    const CALCULATOR: Calculator = Calculator::Fhsa;

    fn compute(self) -> Result<Self::Output, ApiError> {
        Ok(calculate_fhsa(&self.into_inputs()?))
    }
}

impl Calculation for RespPayload {
    type Output = RespResult;
    const CALCULATOR: Calculator = Calculator::Resp;

    fn compute(self) -> Result<Self::Output, ApiError> {
        let inputs = self.into_inputs()?;
        calculate_resp(&inputs)
            .ok_or_else(|| ApiError::Unprocessable("at least one child is required".to_string()))
    }
}

impl Calculation for RetirementPayload {
    type Output = RetirementResult;
    const CALCULATOR: Calculator = Calculator::Retirement;

    fn compute(self) -> Result<Self::Output, ApiError> {
        let inputs = self.into_inputs()?;
        calculate_retirement(&inputs).ok_or_else(|| {
            ApiError::Unprocessable(
                "ages must satisfy currentAge < retirementAge < lifeExpectancy".to_string(),
            )
        })
    }
}

impl Calculation for TaxPayload {
    type Output = TaxResult;
    const CALCULATOR: Calculator = Calculator::Tax;

    fn compute(self) -> Result<Self::Output, ApiError> {
        Ok(calculate_tax(&self.into_inputs()?))
    }
}

impl Calculation for InflationPayload {
    type Output = InflationResult;
    const CALCULATOR: Calculator = Calculator::Inflation;

    fn compute(self) -> Result<Self::Output, ApiError> {
        let inputs = self.into_inputs()?;
        calculate_inflation(&inputs).ok_or_else(|| {
            ApiError::Unprocessable(
                "endYear must not precede startYear and the span must stay under 200 years"
                    .to_string(),
            )
        })
    }
}

impl Calculation for InvestmentPayload {
    type Output = InvestmentResult;
    const CALCULATOR: Calculator = Calculator::Investment;

    fn compute(self) -> Result<Self::Output, ApiError> {
        Ok(calculate_investment(&self.into_inputs()?))
    }
}

impl Calculation for GoalPlanPayload {
    type Output = GoalPlanResult;
    const CALCULATOR: Calculator = Calculator::Goals;

    fn compute(self) -> Result<Self::Output, ApiError> {
        Ok(plan_goals(&self.into_inputs()?))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculatorInfo {
    name: &'static str,
    description: &'static str,
    path: String,
    methods: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
struct IndexResponse {
    calculators: Vec<CalculatorInfo>,
}

fn calculator_index() -> IndexResponse {
    let calculators = Calculator::value_variants()
        .iter()
        .map(|&calculator| CalculatorInfo {
            name: calculator.name(),
            description: calculator.description(),
            path: calculator.path(),
            methods: if calculator.accepts_query() {
                vec!["POST", "GET"]
            } else {
                vec!["POST"]
            },
        })
        .collect();
    IndexResponse { calculators }
}

/// Parses `json` as the payload for `calculator` and runs it.
pub fn compute_json(calculator: Calculator, json: &str) -> Result<serde_json::Value, ApiError> {
    match calculator {
        Calculator::Mortgage => compute_from_str::<MortgagePayload>(json),
        Calculator::Affordability => compute_from_str::<AffordabilityPayload>(json),
        Calculator::Debt => compute_from_str::<DebtPlanPayload>(json),
        Calculator::Cpp => compute_from_str::<CppPayload>(json),
        Calculator::Rrsp => compute_from_str::<RrspPayload>(json),
        Calculator::Savings => compute_from_str::<SavingsPayload>(json),
        Calculator::Fhsa => compute_from_str::<FhsaPayload>(json),
        Calculator::Resp => compute_from_str::<RespPayload>(json),
        Calculator::Retirement => compute_from_str::<RetirementPayload>(json),
        Calculator::Tax => compute_from_str::<TaxPayload>(json),
        Calculator::Inflation => compute_from_str::<InflationPayload>(json),
        Calculator::Investment => compute_from_str::<InvestmentPayload>(json),
        Calculator::Goals => compute_from_str::<GoalPlanPayload>(json),
    }
}

fn compute_from_str<P: Calculation>(json: &str) -> Result<serde_json::Value, ApiError> {
    let payload = serde_json::from_str::<P>(json)
        .map_err(|e| ApiError::InvalidPayload(e.to_string()))?;
    let output = payload.compute()?;
    serde_json::to_value(output).map_err(|e| ApiError::Unprocessable(e.to_string()))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route(
            "/api/mortgage",
            get(get_handler::<MortgagePayload>).post(post_handler::<MortgagePayload>),
        )
        .route(
            "/api/affordability",
            get(get_handler::<AffordabilityPayload>).post(post_handler::<AffordabilityPayload>),
        )
        .route("/api/debt", post(post_handler::<DebtPlanPayload>))
        .route(
            "/api/cpp",
            get(get_handler::<CppPayload>).post(post_handler::<CppPayload>),
        )
        .route(
            "/api/rrsp",
            get(get_handler::<RrspPayload>).post(post_handler::<RrspPayload>),
        )
        .route(
            "/api/savings",
            get(get_handler::<SavingsPayload>).post(post_handler::<SavingsPayload>),
        )
        .route(
            "/api/fhsa",
            get(get_handler::<FhsaPayload>).post(post_handler::<FhsaPayload>),
        )
        .route("/api/resp", post(post_handler::<RespPayload>))
        .route(
            "/api/retirement",
            get(get_handler::<RetirementPayload>).post(post_handler::<RetirementPayload>),
        )
        .route(
            "/api/tax",
            get(get_handler::<TaxPayload>).post(post_handler::<TaxPayload>),
        )
        .route(
            "/api/inflation",
            get(get_handler::<InflationPayload>).post(post_handler::<InflationPayload>),
        )
        .route(
            "/api/investment",
            get(get_handler::<InvestmentPayload>).post(post_handler::<InvestmentPayload>),
        )
        .route("/api/goals", post(post_handler::<GoalPlanPayload>))
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "fincalc HTTP API listening");
    axum::serve(listener, router()).await
}

async fn index_handler() -> Response {
    json_response(StatusCode::OK, calculator_index())
}

async fn not_found_handler() -> Response {
    ApiError::NotFound.into_response()
}

async fn get_handler<P: Calculation>(payload: Result<Query<P>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => respond(payload),
        Err(rejection) => reject::<P>(rejection.body_text()),
    }
}

async fn post_handler<P: Calculation>(payload: Result<Json<P>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => respond(payload),
        Err(rejection) => reject::<P>(rejection.body_text()),
    }
}

fn reject<P: Calculation>(reason: String) -> Response {
    warn!(calculator = P::CALCULATOR.name(), %reason, "rejected payload");
    ApiError::InvalidPayload(reason).into_response()
}

fn respond<P: Calculation>(payload: P) -> Response {
    debug!(calculator = P::CALCULATOR.name(), "computing");
    match payload.compute() {
        Ok(output) => json_response(StatusCode::OK, output),
        Err(err) => {
            warn!(calculator = P::CALCULATOR.name(), error = %err, "calculation refused");
            err.into_response()
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}
