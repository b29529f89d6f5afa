//! URL layout of the marketplace site.

use url::Url;
use useme_core::{Category, Language, OrderBy};

use crate::error::{ExtractError, Result};

pub const DEFAULT_BASE_URL: &str = "https://useme.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    origin: String,
}

impl Default for Site {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Site {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Rewrites a relative href against the site origin. Absolute hrefs pass
    /// through unchanged.
    pub fn absolutize(&self, href: &str) -> Result<String> {
        let href = href.trim();
        if href.starts_with("http://") || href.starts_with("https://") {
            return Ok(href.to_string());
        }
        let invalid = |source| ExtractError::InvalidUrl {
            href: href.to_string(),
            source,
        };
        let base = Url::parse(&format!("{}/", self.origin)).map_err(invalid)?;
        Ok(base.join(href).map_err(invalid)?.to_string())
    }

    pub fn jobs_page_url(&self, lang: Language, page: u32, order_by: Option<OrderBy>) -> String {
        let mut url = format!("{}/{}/jobs/?page={}", self.origin, lang, page);
        push_order(&mut url, order_by);
        url
    }

    pub fn category_jobs_page_url(
        &self,
        lang: Language,
        category: &Category,
        page: u32,
        order_by: Option<OrderBy>,
    ) -> String {
        let mut url = format!(
            "{}/{}/jobs/category/{},{}/?page={}",
            self.origin, lang, category.slug, category.category_id, page
        );
        push_order(&mut url, order_by);
        url
    }

    pub fn competition_page_url(&self, lang: Language, job_id: &str, page: u32) -> String {
        format!(
            "{}/{}/internal-api/jobs/{}/offers/?page={}",
            self.origin, lang, job_id, page
        )
    }

    pub fn billing_url(&self) -> String {
        format!("{}/internal-api/billing/", self.origin)
    }
}

fn push_order(url: &mut String, order_by: Option<OrderBy>) {
    if let Some(order) = order_by {
        url.push_str("&order_by=");
        url.push_str(order.as_query_value());
    }
}
