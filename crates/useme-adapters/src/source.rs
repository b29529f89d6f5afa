//! Fetch + parse orchestration for every top-level marketplace operation.
//!
//! Fetching goes through the injected [`Transport`]; parsing happens in the
//! synchronous extractors after the body is in hand, so no parsed document
//! is ever held across an await point.

use std::sync::Arc;

use tracing::{debug, error, info, info_span, warn, Instrument};
use useme_core::{
    BillingRequest, BillingResult, Category, JobCompetition, JobDetail, JobOffer, Language,
    OrderBy, UserProfile,
};
use useme_storage::{is_not_found, CategoryCatalog, FetchError, Transport};

use crate::billing::{billing_payload, parse_billing_response};
use crate::competition::aggregate_competition;
use crate::detail::parse_job_detail;
use crate::listing::parse_job_listing;
use crate::pagination::collect_pages;
use crate::profile::parse_user_profile;
use crate::site::Site;

#[derive(Clone)]
pub struct UsemeSource {
    transport: Arc<dyn Transport>,
    site: Site,
    catalog: CategoryCatalog,
}

impl UsemeSource {
    pub fn new(transport: Arc<dyn Transport>, site: Site, catalog: CategoryCatalog) -> Self {
        Self {
            transport,
            site,
            catalog,
        }
    }

    /// One listing page. A failed fetch reads as an empty page.
    pub async fn fetch_jobs_page(
        &self,
        page: u32,
        lang: Language,
        order_by: Option<OrderBy>,
    ) -> Vec<JobOffer> {
        let url = self.site.jobs_page_url(lang, page, order_by);
        self.fetch_listing(&url).await
    }

    pub async fn fetch_jobs(
        &self,
        start_page: u32,
        num_pages: u32,
        lang: Language,
        order_by: Option<OrderBy>,
    ) -> Vec<JobOffer> {
        collect_pages(start_page, num_pages, |page| self.fetch_jobs_page(page, lang, order_by))
            .instrument(info_span!("fetch_jobs", start_page, num_pages, %lang))
            .await
    }

    /// One page of a category-scoped listing. Unknown categories yield nothing.
    pub async fn fetch_category_jobs_page(
        &self,
        category_id: u32,
        page: u32,
        lang: Language,
        order_by: Option<OrderBy>,
    ) -> Vec<JobOffer> {
        match self.catalog.get(category_id, lang).await {
            Some(category) => self.fetch_category_page(&category, page, lang, order_by).await,
            None => {
                warn!(target: "useme::source", category_id, %lang, "unknown category");
                Vec::new()
            }
        }
    }

    pub async fn fetch_category_jobs(
        &self,
        category_id: u32,
        start_page: u32,
        num_pages: u32,
        lang: Language,
        order_by: Option<OrderBy>,
    ) -> Vec<JobOffer> {
        let Some(category) = self.catalog.get(category_id, lang).await else {
            warn!(target: "useme::source", category_id, %lang, "unknown category");
            return Vec::new();
        };
        collect_pages(start_page, num_pages, |page| {
            self.fetch_category_page(&category, page, lang, order_by)
        })
        .instrument(info_span!("fetch_category_jobs", category_id, start_page, num_pages, %lang))
        .await
    }

    async fn fetch_category_page(
        &self,
        category: &Category,
        page: u32,
        lang: Language,
        order_by: Option<OrderBy>,
    ) -> Vec<JobOffer> {
        let url = self.site.category_jobs_page_url(lang, category, page, order_by);
        self.fetch_listing(&url).await
    }

    async fn fetch_listing(&self, url: &str) -> Vec<JobOffer> {
        match self.transport.get_text(url).await {
            Ok(html) => {
                let offers = parse_job_listing(&html, &self.site);
                info!(target: "useme::source", url, found = offers.len(), "listing page parsed");
                offers
            }
            Err(err) => {
                log_listing_fetch_failure(url, &err);
                Vec::new()
            }
        }
    }

    pub async fn fetch_job_detail(&self, job_url: &str) -> Option<JobDetail> {
        match self.transport.get_text(job_url).await {
            Ok(html) => parse_job_detail(&html, job_url, &self.site),
            Err(err) => {
                error!(target: "useme::source", url = job_url, error = %err, "job detail fetch failed");
                None
            }
        }
    }

    pub async fn fetch_job_competition(&self, job_url: &str) -> Option<JobCompetition> {
        aggregate_competition(self.transport.as_ref(), &self.site, job_url).await
    }

    pub async fn fetch_user_profile(&self, profile_url: &str) -> Option<UserProfile> {
        match self.transport.get_text(profile_url).await {
            Ok(html) => parse_user_profile(&html, profile_url, &self.site),
            Err(err) => {
                error!(target: "useme::source", url = profile_url, error = %err, "profile fetch failed");
                None
            }
        }
    }

    pub async fn calculate_billing(&self, request: &BillingRequest) -> Option<BillingResult> {
        let url = self.site.billing_url();
        let payload = billing_payload(request);
        debug!(target: "useme::billing", amount = %request.amount, currency = %request.currency, "requesting quote");
        let body = match self.transport.post_json(&url, &payload).await {
            Ok(body) => body,
            Err(err) => {
                error!(target: "useme::billing", error = %err, "billing request failed");
                return None;
            }
        };
        match parse_billing_response(request, body) {
            Ok(result) => Some(result),
            Err(err) => {
                error!(target: "useme::billing", error = %err, "billing response rejected");
                None
            }
        }
    }

    pub async fn categories(&self, lang: Option<Language>) -> Vec<Category> {
        self.catalog.load(lang).await
    }

    pub async fn category(&self, category_id: u32, lang: Language) -> Option<Category> {
        self.catalog.get(category_id, lang).await
    }

    pub async fn search_categories(&self, term: &str, lang: Option<Language>) -> Vec<Category> {
        self.catalog.search(term, lang).await
    }
}

fn log_listing_fetch_failure(url: &str, err: &FetchError) {
    if is_not_found(err) {
        debug!(target: "useme::source", url, "listing page not found, treating as empty");
    } else {
        warn!(target: "useme::source", url, error = %err, "listing page fetch failed, treating as empty");
    }
}
