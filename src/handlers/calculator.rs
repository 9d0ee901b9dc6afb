// src/handlers/calculator.rs

use axum::{
    Json,
    extract::{Query, rejection::QueryRejection},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{error::AppError, finance};

/// Query for `GET /api/calc/emi`.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EmiParams {
    #[validate(custom(function = positive_amount))]
    pub principal: f64,
    #[validate(custom(function = rate))]
    pub annual_rate: f64,
    #[validate(range(min = 1, max = 600))]
    pub tenure_months: u32,
}

/// Query for `GET /api/calc/sip`.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SipParams {
    #[validate(custom(function = positive_amount))]
    pub monthly_investment: f64,
    #[validate(custom(function = rate))]
    pub annual_return: f64,
    #[validate(range(min = 1, max = 50))]
    pub tenure_years: u32,
}

/// Query for `GET /api/calc/swp`.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SwpParams {
    #[validate(custom(function = positive_amount))]
    pub initial_investment: f64,
    #[validate(custom(function = positive_amount))]
    pub monthly_withdrawal: f64,
    #[validate(custom(function = rate))]
    pub annual_return: f64,
    #[validate(range(min = 1, max = 50))]
    pub tenure_years: u32,
}

fn positive_amount(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new("must_be_positive"));
    }
    Ok(())
}

/// Annual rate in percent. Zero is allowed and takes the no-interest branch.
fn rate(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::new("rate_out_of_range"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct CalcResponse<T> {
    success: bool,
    #[serde(flatten)]
    result: T,
}

fn respond<T: Serialize>(result: T) -> Json<CalcResponse<T>> {
    Json(CalcResponse {
        success: true,
        result,
    })
}

pub async fn emi(
    params: Result<Query<EmiParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(p) = params?;
    p.validate()?;

    Ok(respond(finance::emi(p.principal, p.annual_rate, p.tenure_months)))
}

pub async fn sip(
    params: Result<Query<SipParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(p) = params?;
    p.validate()?;

    Ok(respond(finance::sip(
        p.monthly_investment,
        p.annual_return,
        p.tenure_years,
    )))
}

pub async fn swp(
    params: Result<Query<SwpParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(p) = params?;
    p.validate()?;

    Ok(respond(finance::swp(
        p.initial_investment,
        p.monthly_withdrawal,
        p.annual_return,
        p.tenure_years,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_amounts() {
        let params = EmiParams {
            principal: 0.0,
            annual_rate: 10.0,
            tenure_months: 12,
        };
        assert!(params.validate().is_err());

        let params = EmiParams {
            principal: f64::NAN,
            annual_rate: 10.0,
            tenure_months: 12,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn zero_rate_is_allowed() {
        let params = SipParams {
            monthly_investment: 1000.0,
            annual_return: 0.0,
            tenure_years: 1,
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn rejects_rates_outside_percent_range() {
        let params = EmiParams {
            principal: 100_000.0,
            annual_rate: 100.5,
            tenure_months: 12,
        };
        assert!(params.validate().is_err());

        let params = EmiParams {
            principal: 100_000.0,
            annual_rate: -1.0,
            tenure_months: 12,
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn rejects_zero_tenure() {
        let params = SwpParams {
            initial_investment: 100_000.0,
            monthly_withdrawal: 1_000.0,
            annual_return: 8.0,
            tenure_years: 0,
        };
        assert!(params.validate().is_err());
    }
}
