//! Core record types for the Useme extraction engine.
//!
//! Every record here is an immutable snapshot produced by a single parse call.
//! Nested lists are owned by their parent record; nothing is lazily resolved.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CRATE_NAME: &str = "useme-core";

/// Canonical budget token stored for negotiable jobs, whatever the page language.
pub const NEGOTIABLE: &str = "Negotiable";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseEnumError {
    #[error("unsupported language `{0}` (expected `en` or `pl`)")]
    Language(String),
    #[error("unsupported order_by `{0}`")]
    OrderBy(String),
    #[error("unsupported copyright transfer `{0}` (expected `license` or `full`)")]
    CopyrightTransfer(String),
}

/// Site language version. Every page and API call is scoped to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Pl,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Pl];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Pl => "pl",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "pl" => Ok(Language::Pl),
            other => Err(ParseEnumError::Language(other.to_string())),
        }
    }
}

/// Sort orders accepted by the job listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderBy {
    #[serde(rename = "-published_on")]
    NewestFirst,
    #[serde(rename = "expires")]
    ExpiringSoonest,
    #[serde(rename = "offer_count")]
    FewestOffers,
    #[serde(rename = "-offer_count")]
    MostOffers,
    #[serde(rename = "payment_normalized")]
    LowestBudget,
    #[serde(rename = "-payment_normalized")]
    HighestBudget,
}

impl OrderBy {
    pub const ALL: [OrderBy; 6] = [
        OrderBy::NewestFirst,
        OrderBy::ExpiringSoonest,
        OrderBy::FewestOffers,
        OrderBy::MostOffers,
        OrderBy::LowestBudget,
        OrderBy::HighestBudget,
    ];

    /// Query-string value used by the site.
    pub fn as_query_value(self) -> &'static str {
        match self {
            OrderBy::NewestFirst => "-published_on",
            OrderBy::ExpiringSoonest => "expires",
            OrderBy::FewestOffers => "offer_count",
            OrderBy::MostOffers => "-offer_count",
            OrderBy::LowestBudget => "payment_normalized",
            OrderBy::HighestBudget => "-payment_normalized",
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

impl FromStr for OrderBy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        OrderBy::ALL
            .into_iter()
            .find(|o| o.as_query_value() == value)
            .ok_or_else(|| ParseEnumError::OrderBy(value.to_string()))
    }
}

/// Entry of the static category catalog. `(category_id, lang)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub slug: String,
    pub category_id: u32,
    pub lang: Language,
}

/// One job card from a listing page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOffer {
    pub client: String,
    pub offers_count: u32,
    pub days_left: u32,
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub budget: String,
    pub negotiable: bool,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub deals_count: Option<u32>,
    pub url: String,
}

/// Full view of a single job page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDetail {
    pub title: String,
    pub client: String,
    pub description: String,
    pub published_ago: String,
    pub category: String,
    pub copyright: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub budget: String,
    pub negotiable: bool,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub valid_for: String,
    pub offers_count: u32,
    pub url: String,
    /// Labeled fields not mapped to a named attribute, keyed by the page's own label.
    #[serde(default)]
    pub custom_fields: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCompetitor {
    pub username: String,
    pub profile_url: String,
    pub contracts_completed: Option<u32>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub submitted_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCompetition {
    pub job_url: String,
    pub job_id: String,
    /// Competitors actually parsed across all fetched pages.
    pub total_offers: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub competitors: Vec<JobCompetitor>,
}

impl JobCompetition {
    /// Result shape for a job URL that carries no recognizable job id.
    pub fn empty(job_url: impl Into<String>) -> Self {
        Self {
            job_url: job_url.into(),
            job_id: String::new(),
            total_offers: 0,
            total_pages: 0,
            competitors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyrightTransfer {
    #[default]
    License,
    Full,
}

impl CopyrightTransfer {
    pub fn as_str(self) -> &'static str {
        match self {
            CopyrightTransfer::License => "license",
            CopyrightTransfer::Full => "full",
        }
    }
}

impl FromStr for CopyrightTransfer {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "license" => Ok(CopyrightTransfer::License),
            "full" => Ok(CopyrightTransfer::Full),
            other => Err(ParseEnumError::CopyrightTransfer(other.to_string())),
        }
    }
}

/// Per-party flags forwarded verbatim to the pricing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingParty {
    pub country: String,
    pub is_business: bool,
    pub is_vat_payer: bool,
}

impl BillingParty {
    pub fn default_contractor() -> Self {
        Self {
            country: "PL".to_string(),
            is_business: false,
            is_vat_payer: false,
        }
    }

    pub fn default_employer() -> Self {
        Self {
            country: "PL".to_string(),
            is_business: true,
            is_vat_payer: true,
        }
    }
}

/// Input of a billing quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingRequest {
    /// Amount the contractor should receive after every deduction.
    pub amount: Decimal,
    pub currency: String,
    pub copyright_transfer: CopyrightTransfer,
    pub contractor: BillingParty,
    pub employer: BillingParty,
}

impl BillingRequest {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            currency: "PLN".to_string(),
            copyright_transfer: CopyrightTransfer::default(),
            contractor: BillingParty::default_contractor(),
            employer: BillingParty::default_employer(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingContractor {
    pub email: Option<String>,
    pub country: String,
    pub residence: Option<String>,
    pub is_business: bool,
    pub is_vat_payer: bool,
    pub user_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingEmployer {
    pub email: Option<String>,
    pub country: String,
    pub is_business: bool,
    pub is_vat_payer: bool,
    pub user_class: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingComponent {
    pub label: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingCalculation {
    pub currency: String,
    #[serde(default)]
    pub payin: Vec<BillingComponent>,
    #[serde(default)]
    pub payout: Vec<BillingComponent>,
    #[serde(default)]
    pub price_components: Vec<BillingComponent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingResult {
    pub amount: Decimal,
    pub currency: String,
    pub copyright_transfer: CopyrightTransfer,
    pub contractor: BillingContractor,
    pub employer: BillingEmployer,
    pub calculation: BillingCalculation,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfileStats {
    pub country: String,
    pub location: Option<String>,
    pub useme_since: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserDeals {
    pub total: u32,
    pub successful: u32,
    pub disputed: u32,
    pub failed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserOpinions {
    pub total: u32,
    pub positive: u32,
    pub neutral: u32,
    pub negative: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCategory {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPortfolioItem {
    pub title: String,
    pub url: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpinionType {
    Positive,
    Negative,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreelancerReply {
    pub content: String,
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOpinion {
    pub author_name: String,
    pub date: String,
    pub opinion_type: OpinionType,
    pub content: String,
    pub freelancer_reply: Option<FreelancerReply>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCompletedJob {
    pub title: String,
    pub url: String,
    pub description: String,
    pub category_name: String,
}

/// Aggregate of a freelancer's public profile page.
///
/// Deal and opinion sub-totals are parsed independently of their grand totals
/// and are never reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub profile_url: String,
    pub username: String,
    pub stats: UserProfileStats,
    pub deals: UserDeals,
    pub opinions: UserOpinions,
    pub about_me: Option<String>,
    #[serde(default)]
    pub categories: Vec<UserCategory>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub portfolio: Vec<UserPortfolioItem>,
    #[serde(default)]
    pub user_opinions: Vec<UserOpinion>,
    #[serde(default)]
    pub completed_jobs: Vec<UserCompletedJob>,
}
