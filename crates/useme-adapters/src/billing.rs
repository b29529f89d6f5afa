//! Billing quote pass-through: request payload and response decoding for the
//! marketplace's internal pricing endpoint.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use useme_core::{
    BillingCalculation, BillingComponent, BillingContractor, BillingEmployer, BillingParty,
    BillingRequest, BillingResult,
};

use crate::error::Result;

const SUBCATEGORY: u32 = 2;
const CALCULATOR: &str = "N2G";
const USER_CLASS: &str = "default";

pub fn billing_payload(request: &BillingRequest) -> JsonValue {
    json!({
        "amount": request.amount.to_string(),
        "copyright_transfer": request.copyright_transfer.as_str(),
        "currency": request.currency,
        "subcategory": SUBCATEGORY,
        "billing_calculator": CALCULATOR,
        "contractor": {
            "email": null,
            "country": request.contractor.country,
            "residence": null,
            "is_business": request.contractor.is_business,
            "is_vat_payer": request.contractor.is_vat_payer,
            "user_class": USER_CLASS,
        },
        "employer": {
            "email": null,
            "country": request.employer.country,
            "is_business": request.employer.is_business,
            "is_vat_payer": request.employer.is_vat_payer,
            "user_class": USER_CLASS,
        },
        "discount": null,
        "max_income_cost": null,
    })
}

#[derive(Debug, Deserialize)]
struct RawBillingResponse {
    #[serde(default)]
    data: RawBillingData,
}

#[derive(Debug, Default, Deserialize)]
struct RawBillingData {
    currency: Option<String>,
    #[serde(default)]
    payin: Vec<RawComponent>,
    #[serde(default)]
    payout: Vec<RawComponent>,
    #[serde(default, rename = "priceComponents")]
    price_components: Vec<RawComponent>,
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    label: String,
    value: Decimal,
}

impl From<RawComponent> for BillingComponent {
    fn from(raw: RawComponent) -> Self {
        BillingComponent {
            label: raw.label,
            value: raw.value,
        }
    }
}

fn contractor(party: &BillingParty) -> BillingContractor {
    BillingContractor {
        email: None,
        country: party.country.clone(),
        residence: None,
        is_business: party.is_business,
        is_vat_payer: party.is_vat_payer,
        user_class: USER_CLASS.to_string(),
    }
}

fn employer(party: &BillingParty) -> BillingEmployer {
    BillingEmployer {
        email: None,
        country: party.country.clone(),
        is_business: party.is_business,
        is_vat_payer: party.is_vat_payer,
        user_class: USER_CLASS.to_string(),
    }
}

/// Decodes the endpoint's `data` envelope. A component without a label or
/// with a non-numeric value fails the whole quote.
pub fn parse_billing_response(request: &BillingRequest, body: JsonValue) -> Result<BillingResult> {
    let raw: RawBillingResponse = serde_json::from_value(body)?;
    let data = raw.data;
    Ok(BillingResult {
        amount: request.amount,
        currency: request.currency.clone(),
        copyright_transfer: request.copyright_transfer,
        contractor: contractor(&request.contractor),
        employer: employer(&request.employer),
        calculation: BillingCalculation {
            currency: data.currency.unwrap_or_else(|| request.currency.clone()),
            payin: data.payin.into_iter().map(Into::into).collect(),
            payout: data.payout.into_iter().map(Into::into).collect(),
            price_components: data.price_components.into_iter().map(Into::into).collect(),
        },
    })
}
