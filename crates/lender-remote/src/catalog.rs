//! Credit request catalog records.

use serde::{Deserialize, Deserializer};
use std::fmt;

// =============================================================================
// Listing
// =============================================================================

/// Review status of a credit request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum CreditStatus {
    Pending,
    UnderReview,
    Approved,
    Rejected,
    /// Any status this client does not know about, kept verbatim.
    Other(String),
}

impl From<String> for CreditStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => CreditStatus::Pending,
            "under_review" => CreditStatus::UnderReview,
            "approved" => CreditStatus::Approved,
            "rejected" => CreditStatus::Rejected,
            _ => CreditStatus::Other(raw),
        }
    }
}

impl fmt::Display for CreditStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreditStatus::Pending => f.write_str("pending"),
            CreditStatus::UnderReview => f.write_str("under review"),
            CreditStatus::Approved => f.write_str("approved"),
            CreditStatus::Rejected => f.write_str("rejected"),
            CreditStatus::Other(s) => f.write_str(s),
        }
    }
}

/// One entry of `GET /credit-requests`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreditRequest {
    pub request_id: String,
    pub borrower_name: String,
    /// Requested amount in cents.
    #[serde(rename = "loan_amount", deserialize_with = "minor_units")]
    pub loan_amount_minor_units: i64,
    pub status: CreditStatus,
}

impl CreditRequest {
    /// Selector label, e.g. `US-100200-3000 - John Smith ($250,000)`.
    pub fn label(&self) -> String {
        format!(
            "{} - {} ({})",
            self.request_id,
            self.borrower_name,
            format_usd(self.loan_amount_minor_units)
        )
    }
}

/// Whole-dollar USD rendering with thousands separators.
pub fn format_usd(minor_units: i64) -> String {
    let dollars = (minor_units as f64 / 100.0).round() as i64;
    let digits = dollars.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if dollars < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

fn minor_units<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    let amount = f64::deserialize(d)?;
    if !amount.is_finite() {
        return Err(serde::de::Error::custom("loan amount is not a finite number"));
    }
    Ok((amount * 100.0).round() as i64)
}

// =============================================================================
// Details
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BorrowerInfo {
    pub name: String,
    pub credit_score: u32,
    pub annual_income: f64,
    pub debt_to_income_ratio: f64,
    pub employment_history: String,
    pub assets: f64,
    pub liabilities: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CollateralInfo {
    pub property_type: String,
    pub property_value: f64,
    pub ltv_ratio: f64,
    pub appraisal_date: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PricingInfo {
    pub interest_rate: f64,
    pub loan_term_months: u32,
    pub monthly_payment: f64,
    pub origination_fee: f64,
    pub processing_fee: f64,
    pub total_fees: f64,
}

/// Full record behind `GET /credit-requests/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreditRequestDetails {
    pub request_id: String,
    pub borrower: BorrowerInfo,
    pub collateral: CollateralInfo,
    pub pricing: PricingInfo,
    pub loan_amount: f64,
    pub loan_purpose: String,
    pub status: CreditStatus,
    pub risk_rating: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub covenants: Vec<String>,
    #[serde(default)]
    pub guarantors: Vec<String>,
    #[serde(default)]
    pub regulatory_notes: String,
    #[serde(default)]
    pub created_date: String,
    #[serde(default)]
    pub updated_date: String,
}

impl CreditRequestDetails {
    /// Collateral with no stated value still needs an appraisal.
    pub fn collateral_missing(&self) -> bool {
        self.collateral.property_value <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_decodes() {
        let list: Vec<CreditRequest> = serde_json::from_str(
            r#"[
                {"request_id":"US-100200-3000","borrower_name":"John Smith","loan_amount":250000.0,"status":"pending"},
                {"request_id":"US-100200-3001","borrower_name":"Sarah Johnson","loan_amount":450000.5,"status":"under_review"},
                {"request_id":"US-100200-3002","borrower_name":"Eve","loan_amount":1,"status":"escalated"}
            ]"#,
        )
        .unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].loan_amount_minor_units, 25_000_000);
        assert_eq!(list[0].status, CreditStatus::Pending);
        assert_eq!(list[1].loan_amount_minor_units, 45_000_050);
        assert_eq!(list[1].status, CreditStatus::UnderReview);
        assert_eq!(list[2].status, CreditStatus::Other("escalated".into()));
    }

    #[test]
    fn label_formats_amount() {
        let req = CreditRequest {
            request_id: "US-100200-3000".into(),
            borrower_name: "John Smith".into(),
            loan_amount_minor_units: 25_000_000,
            status: CreditStatus::Pending,
        };
        assert_eq!(req.label(), "US-100200-3000 - John Smith ($250,000)");
    }

    #[test]
    fn usd_formatting() {
        assert_eq!(format_usd(0), "$0");
        assert_eq!(format_usd(99_900), "$999");
        assert_eq!(format_usd(100_000), "$1,000");
        assert_eq!(format_usd(123_456_789_00), "$123,456,789");
        assert_eq!(format_usd(-150_000), "-$1,500");
        // Rounded to whole dollars.
        assert_eq!(format_usd(18_000_050), "$180,001");
    }

    #[test]
    fn status_display() {
        assert_eq!(CreditStatus::UnderReview.to_string(), "under review");
        assert_eq!(CreditStatus::Other("on_hold".into()).to_string(), "on_hold");
    }

    #[test]
    fn details_decode() {
        let details: CreditRequestDetails = serde_json::from_str(
            r#"{
                "request_id": "US-100200-3000",
                "borrower": {
                    "name": "Robert Wilson", "credit_score": 690, "annual_income": 85000.0,
                    "debt_to_income_ratio": 0.38, "employment_history": "5 years",
                    "assets": 120000.0, "liabilities": 40000.0
                },
                "collateral": {
                    "property_type": "Property Type Not Provided", "property_value": 0.0,
                    "ltv_ratio": 0.0, "appraisal_date": "", "address": "Address Not Provided"
                },
                "pricing": {
                    "interest_rate": 6.75, "loan_term_months": 360, "monthly_payment": 1783.6,
                    "origination_fee": 2750.0, "processing_fee": 500.0, "total_fees": 3250.0
                },
                "loan_amount": 275000.0,
                "loan_purpose": "Home Purchase",
                "status": "pending",
                "risk_rating": "Medium",
                "conditions": ["Appraisal required"],
                "covenants": [],
                "guarantors": [],
                "regulatory_notes": "",
                "created_date": "2024-01-15",
                "updated_date": "2024-01-20"
            }"#,
        )
        .unwrap();
        assert_eq!(details.borrower.credit_score, 690);
        assert_eq!(details.pricing.loan_term_months, 360);
        assert!(details.collateral_missing());
        assert_eq!(details.conditions, vec!["Appraisal required".to_string()]);
    }
}
