//! Tool surface exposed to LLM clients: catalogue, argument decoding and
//! dispatch onto [`UsemeSource`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;
use tracing::{info, info_span, Instrument};
use useme_adapters::{Site, UsemeSource, DEFAULT_BASE_URL};
use useme_core::{
    BillingParty, BillingRequest, BillingResult, Category, CopyrightTransfer, JobCompetition,
    JobDetail, JobOffer, Language, OrderBy, UserProfile,
};
use useme_storage::{CategoryCatalog, HttpClientConfig, HttpFetcher, Transport, DEFAULT_USER_AGENT};

pub const CRATE_NAME: &str = "useme-tools";
pub const SERVER_NAME: &str = "useme-job-assistant";

#[derive(Debug, Clone)]
pub struct ToolsConfig {
    pub base_url: String,
    pub user_agent: String,
    pub http_timeout_secs: u64,
    pub categories_path: PathBuf,
    pub web_port: u16,
}

impl ToolsConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("USEME_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            user_agent: std::env::var("USEME_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            http_timeout_secs: std::env::var("USEME_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            categories_path: std::env::var("USEME_CATEGORIES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data/categories.json")),
            web_port: std::env::var("USEME_WEB_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
        }
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("unknown tool `{0}`")]
    UnknownTool(String),
    #[error("invalid arguments for `{tool}`: {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode `{tool}` result: {source}")]
    Encode {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToolParam {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub required: bool,
    pub default: Option<&'static str>,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub params: &'static [ToolParam],
}

const fn required(name: &'static str, kind: &'static str, description: &'static str) -> ToolParam {
    ToolParam {
        name,
        kind,
        required: true,
        default: None,
        description,
    }
}

const fn optional(
    name: &'static str,
    kind: &'static str,
    default: Option<&'static str>,
    description: &'static str,
) -> ToolParam {
    ToolParam {
        name,
        kind,
        required: false,
        default,
        description,
    }
}

const PAGE: ToolParam = optional("page", "integer", Some("1"), "Starting page number");
const LANGUAGE: ToolParam = optional("language", "string", Some("en"), "`en` for English, `pl` for Polish");
const NUM_PAGES: ToolParam = optional("num_pages", "integer", Some("1"), "Number of pages to fetch");
const ORDER_BY: ToolParam = optional(
    "order_by",
    "string",
    None,
    "One of -published_on (newest), expires (expiring soonest), offer_count (fewest offers), \
     -offer_count (most offers), payment_normalized (lowest budget), -payment_normalized \
     (highest budget); empty for the site default",
);
const CATEGORY_ID: ToolParam = required("category_id", "integer", "Category id, e.g. 35 for IT / Programming");
const JOB_URL: ToolParam = required("job_url", "string", "Full URL of the job offer");
const LANGUAGE_FILTER: ToolParam = optional("language", "string", None, "Optional `en` or `pl` filter");

pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "browse_jobs",
        description: "Browse available job offers: title, budget, client and competition level.",
        params: &[PAGE, LANGUAGE, NUM_PAGES],
    },
    ToolSpec {
        name: "filter_jobs",
        description: "Browse job offers in a chosen sort order.",
        params: &[PAGE, LANGUAGE, NUM_PAGES, ORDER_BY],
    },
    ToolSpec {
        name: "browse_category_jobs",
        description: "Browse job offers from one category.",
        params: &[CATEGORY_ID, PAGE, LANGUAGE, NUM_PAGES],
    },
    ToolSpec {
        name: "filter_category_jobs",
        description: "Browse job offers from one category in a chosen sort order.",
        params: &[CATEGORY_ID, PAGE, LANGUAGE, NUM_PAGES, ORDER_BY],
    },
    ToolSpec {
        name: "get_job_details",
        description: "Full job page: skills, budget, client, validity and custom fields.",
        params: &[JOB_URL],
    },
    ToolSpec {
        name: "get_job_competition",
        description: "Freelancers who already bid on a job, with experience, skills and submission time.",
        params: &[JOB_URL],
    },
    ToolSpec {
        name: "calculate_useme_billing",
        description: "What the client pays (VAT, commission, income tax) for a desired freelancer payout.",
        params: &[
            required("payout_amount", "number", "Amount the freelancer should receive after all deductions"),
            optional("currency", "string", Some("PLN"), "PLN, EUR, GBP or USD"),
            optional("copyright_transfer", "string", Some("license"), "`license` or `full`"),
            optional("contractor_country", "string", Some("PL"), "Freelancer country code"),
            optional("contractor_is_business", "boolean", Some("false"), "Freelancer runs a registered business"),
            optional("contractor_is_vat_payer", "boolean", Some("false"), "Freelancer pays VAT"),
            optional("employer_country", "string", Some("PL"), "Client country code"),
            optional("employer_is_business", "boolean", Some("true"), "Client is a business"),
            optional("employer_is_vat_payer", "boolean", Some("true"), "Client pays VAT"),
        ],
    },
    ToolSpec {
        name: "get_user_profile",
        description: "Freelancer public profile: stats, deals, opinions, skills, portfolio, reviews and work history.",
        params: &[required(
            "profile_url",
            "string",
            "Full profile URL, e.g. https://useme.com/pl/roles/contractor/username,123456/",
        )],
    },
    ToolSpec {
        name: "list_categories",
        description: "Job categories with their ids and slugs.",
        params: &[LANGUAGE_FILTER],
    },
    ToolSpec {
        name: "search_categories",
        description: "Categories whose name or slug contains a search term.",
        params: &[required("search_term", "string", "Case-insensitive term"), LANGUAGE_FILTER],
    },
    ToolSpec {
        name: "get_category_info",
        description: "One category by id.",
        params: &[CATEGORY_ID, LANGUAGE],
    },
];

pub fn tool_spec(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|t| t.name == name)
}

pub const SYSTEM_INSTRUCTION: &str = "\
This server provides data fetching tools for the Useme freelance platform to help freelancers \
find opportunities and write strong proposals.

Available tools:
- Browse job offers from the main listing or from a specific category, optionally sorted
- Get detailed job information: skills, budget, client details, custom requirements
- Inspect the competition on a job and the public profiles of other freelancers
- Estimate what a client pays for a given payout with the billing calculator
- Search and list job categories

Use them to help freelancers:

1. Find suitable jobs. Compare requirements, competition, budgets and deadlines.
2. Write proposals. Fetch the job details first, look at the client's history and the \
competition, then draft a message covering the client's needs, approach, timeline, relevant \
experience, budget (when negotiable) and next steps.
3. Analyse the market. Compare similar jobs and pricing.
4. Advise on which jobs to pursue given the freelancer's skills and goals.

Gather the job data first, then give concrete, actionable recommendations.
";

fn default_page() -> u32 {
    1
}

fn default_currency() -> String {
    "PLN".to_string()
}

fn default_country() -> String {
    "PL".to_string()
}

fn yes() -> bool {
    true
}

/// `""` and `null` both mean "site default ordering".
fn optional_order<'de, D>(deserializer: D) -> std::result::Result<Option<OrderBy>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageArgs {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default)]
    pub language: Language,
    #[serde(default = "default_page")]
    pub num_pages: u32,
}

impl Default for PageArgs {
    fn default() -> Self {
        Self {
            page: 1,
            language: Language::default(),
            num_pages: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct FilterArgs {
    #[serde(flatten)]
    pub pages: PageArgs,
    #[serde(default, deserialize_with = "optional_order")]
    pub order_by: Option<OrderBy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryFilterArgs {
    pub category_id: u32,
    #[serde(flatten)]
    pub pages: PageArgs,
    #[serde(default, deserialize_with = "optional_order")]
    pub order_by: Option<OrderBy>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobUrlArgs {
    pub job_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileArgs {
    pub profile_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BillingArgs {
    pub payout_amount: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub copyright_transfer: CopyrightTransfer,
    #[serde(default = "default_country")]
    pub contractor_country: String,
    #[serde(default)]
    pub contractor_is_business: bool,
    #[serde(default)]
    pub contractor_is_vat_payer: bool,
    #[serde(default = "default_country")]
    pub employer_country: String,
    #[serde(default = "yes")]
    pub employer_is_business: bool,
    #[serde(default = "yes")]
    pub employer_is_vat_payer: bool,
}

impl BillingArgs {
    pub fn new(payout_amount: Decimal) -> Self {
        let contractor = BillingParty::default_contractor();
        let employer = BillingParty::default_employer();
        Self {
            payout_amount,
            currency: default_currency(),
            copyright_transfer: CopyrightTransfer::default(),
            contractor_country: contractor.country,
            contractor_is_business: contractor.is_business,
            contractor_is_vat_payer: contractor.is_vat_payer,
            employer_country: employer.country,
            employer_is_business: employer.is_business,
            employer_is_vat_payer: employer.is_vat_payer,
        }
    }
}

impl From<BillingArgs> for BillingRequest {
    fn from(args: BillingArgs) -> Self {
        BillingRequest {
            amount: args.payout_amount,
            currency: args.currency,
            copyright_transfer: args.copyright_transfer,
            contractor: BillingParty {
                country: args.contractor_country,
                is_business: args.contractor_is_business,
                is_vat_payer: args.contractor_is_vat_payer,
            },
            employer: BillingParty {
                country: args.employer_country,
                is_business: args.employer_is_business,
                is_vat_payer: args.employer_is_vat_payer,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct LanguageFilterArgs {
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchCategoriesArgs {
    pub search_term: String,
    #[serde(default)]
    pub language: Option<Language>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryInfoArgs {
    pub category_id: u32,
    #[serde(default)]
    pub language: Language,
}

/// Builds the live HTTP-backed source from configuration.
pub fn build_source(config: &ToolsConfig) -> Result<UsemeSource> {
    let http = HttpFetcher::new(HttpClientConfig {
        timeout: Duration::from_secs(config.http_timeout_secs),
        user_agent: Some(config.user_agent.clone()),
    })?;
    let transport: Arc<dyn Transport> = Arc::new(http);
    Ok(UsemeSource::new(
        transport,
        Site::new(config.base_url.clone()),
        CategoryCatalog::new(config.categories_path.clone()),
    ))
}

#[derive(Clone)]
pub struct ToolRegistry {
    source: UsemeSource,
}

impl ToolRegistry {
    pub fn new(source: UsemeSource) -> Self {
        Self { source }
    }

    pub fn from_config(config: &ToolsConfig) -> Result<Self> {
        Ok(Self::new(build_source(config)?))
    }

    pub async fn browse_jobs(&self, args: PageArgs) -> Vec<JobOffer> {
        self.filter_jobs(FilterArgs {
            pages: args,
            order_by: None,
        })
        .await
    }

    pub async fn filter_jobs(&self, args: FilterArgs) -> Vec<JobOffer> {
        let PageArgs {
            page,
            language,
            num_pages,
        } = args.pages;
        if num_pages == 1 {
            self.source.fetch_jobs_page(page, language, args.order_by).await
        } else {
            self.source.fetch_jobs(page, num_pages, language, args.order_by).await
        }
    }

    pub async fn filter_category_jobs(&self, args: CategoryFilterArgs) -> Vec<JobOffer> {
        let PageArgs {
            page,
            language,
            num_pages,
        } = args.pages;
        if num_pages == 1 {
            self.source
                .fetch_category_jobs_page(args.category_id, page, language, args.order_by)
                .await
        } else {
            self.source
                .fetch_category_jobs(args.category_id, page, num_pages, language, args.order_by)
                .await
        }
    }

    pub async fn get_job_details(&self, args: JobUrlArgs) -> Option<JobDetail> {
        self.source.fetch_job_detail(&args.job_url).await
    }

    pub async fn get_job_competition(&self, args: JobUrlArgs) -> Option<JobCompetition> {
        self.source.fetch_job_competition(&args.job_url).await
    }

    pub async fn calculate_billing(&self, args: BillingArgs) -> Option<BillingResult> {
        self.source.calculate_billing(&BillingRequest::from(args)).await
    }

    pub async fn get_user_profile(&self, args: ProfileArgs) -> Option<UserProfile> {
        self.source.fetch_user_profile(&args.profile_url).await
    }

    pub async fn list_categories(&self, args: LanguageFilterArgs) -> Vec<Category> {
        self.source.categories(args.language).await
    }

    pub async fn search_categories(&self, args: SearchCategoriesArgs) -> Vec<Category> {
        self.source.search_categories(&args.search_term, args.language).await
    }

    pub async fn get_category_info(&self, args: CategoryInfoArgs) -> Option<Category> {
        self.source.category(args.category_id, args.language).await
    }

    /// Runs a decoded call and encodes its result; absent results encode as `null`.
    pub async fn call(&self, call: ToolCall) -> Result<JsonValue, ToolError> {
        let name = call.name();
        match call {
            ToolCall::BrowseJobs(args) => encode(name, self.browse_jobs(args).await),
            ToolCall::FilterJobs(args) => encode(name, self.filter_jobs(args).await),
            ToolCall::BrowseCategoryJobs(mut args) => {
                args.order_by = None;
                encode(name, self.filter_category_jobs(args).await)
            }
            ToolCall::FilterCategoryJobs(args) => encode(name, self.filter_category_jobs(args).await),
            ToolCall::GetJobDetails(args) => encode(name, self.get_job_details(args).await),
            ToolCall::GetJobCompetition(args) => encode(name, self.get_job_competition(args).await),
            ToolCall::CalculateBilling(args) => encode(name, self.calculate_billing(args).await),
            ToolCall::GetUserProfile(args) => encode(name, self.get_user_profile(args).await),
            ToolCall::ListCategories(args) => encode(name, self.list_categories(args).await),
            ToolCall::SearchCategories(args) => encode(name, self.search_categories(args).await),
            ToolCall::GetCategoryInfo(args) => encode(name, self.get_category_info(args).await),
        }
    }

    /// Decodes `arguments` for tool `name`, runs it and encodes the result.
    pub async fn dispatch(&self, name: &str, arguments: JsonValue) -> Result<JsonValue, ToolError> {
        let call = ToolCall::decode(name, arguments)?;
        let output = self.call(call).instrument(info_span!("tool", name)).await?;
        info!(target: "useme::tools", tool = name, empty = output.is_null(), "tool finished");
        Ok(output)
    }
}

/// One tool invocation with its decoded arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    BrowseJobs(PageArgs),
    FilterJobs(FilterArgs),
    BrowseCategoryJobs(CategoryFilterArgs),
    FilterCategoryJobs(CategoryFilterArgs),
    GetJobDetails(JobUrlArgs),
    GetJobCompetition(JobUrlArgs),
    CalculateBilling(BillingArgs),
    GetUserProfile(ProfileArgs),
    ListCategories(LanguageFilterArgs),
    SearchCategories(SearchCategoriesArgs),
    GetCategoryInfo(CategoryInfoArgs),
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::BrowseJobs(_) => "browse_jobs",
            ToolCall::FilterJobs(_) => "filter_jobs",
            ToolCall::BrowseCategoryJobs(_) => "browse_category_jobs",
            ToolCall::FilterCategoryJobs(_) => "filter_category_jobs",
            ToolCall::GetJobDetails(_) => "get_job_details",
            ToolCall::GetJobCompetition(_) => "get_job_competition",
            ToolCall::CalculateBilling(_) => "calculate_useme_billing",
            ToolCall::GetUserProfile(_) => "get_user_profile",
            ToolCall::ListCategories(_) => "list_categories",
            ToolCall::SearchCategories(_) => "search_categories",
            ToolCall::GetCategoryInfo(_) => "get_category_info",
        }
    }

    /// `null` arguments are treated as an empty object so every default applies.
    pub fn decode(name: &str, arguments: JsonValue) -> Result<Self, ToolError> {
        let arguments = match arguments {
            JsonValue::Null => JsonValue::Object(Map::new()),
            other => other,
        };
        let call = match name {
            "browse_jobs" => ToolCall::BrowseJobs(decode(name, arguments)?),
            "filter_jobs" => ToolCall::FilterJobs(decode(name, arguments)?),
            "browse_category_jobs" => ToolCall::BrowseCategoryJobs(decode(name, arguments)?),
            "filter_category_jobs" => ToolCall::FilterCategoryJobs(decode(name, arguments)?),
            "get_job_details" => ToolCall::GetJobDetails(decode(name, arguments)?),
            "get_job_competition" => ToolCall::GetJobCompetition(decode(name, arguments)?),
            "calculate_useme_billing" => ToolCall::CalculateBilling(decode(name, arguments)?),
            "get_user_profile" => ToolCall::GetUserProfile(decode(name, arguments)?),
            "list_categories" => ToolCall::ListCategories(decode(name, arguments)?),
            "search_categories" => ToolCall::SearchCategories(decode(name, arguments)?),
            "get_category_info" => ToolCall::GetCategoryInfo(decode(name, arguments)?),
            other => return Err(ToolError::UnknownTool(other.to_string())),
        };
        Ok(call)
    }
}

fn decode<T: serde::de::DeserializeOwned>(tool: &str, arguments: JsonValue) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|source| ToolError::InvalidArguments {
        tool: tool.to_string(),
        source,
    })
}

fn encode<T: Serialize>(tool: &str, value: T) -> Result<JsonValue, ToolError> {
    serde_json::to_value(value).map_err(|source| ToolError::Encode {
        tool: tool.to_string(),
        source,
    })
}
