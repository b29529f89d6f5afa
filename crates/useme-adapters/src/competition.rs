//! Bidder list for one job, assembled from the paginated offers API.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, error, info_span, warn, Instrument};
use useme_core::{JobCompetition, JobCompetitor, Language};
use useme_storage::Transport;

use crate::error::Result;
use crate::site::Site;

static COMMA_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\d+)/?$").expect("valid comma id regex"));
static SLASH_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d+)/?$").expect("valid slash id regex"));

/// Opaque job id: trailing `,<digits>` wins over trailing `/<digits>`.
pub fn extract_job_id(job_url: &str) -> Option<String> {
    let url = job_url.trim();
    COMMA_ID_RE
        .captures(url)
        .or_else(|| SLASH_ID_RE.captures(url))
        .map(|caps| caps[1].to_string())
}

/// `pl` when the URL carries a `/pl/` segment, `en` otherwise.
pub fn language_for_job_url(job_url: &str) -> Language {
    if job_url.contains("/pl/") {
        Language::Pl
    } else {
        Language::En
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitionPage {
    pub total_pages: u32,
    pub competitors: Vec<JobCompetitor>,
}

#[derive(Debug, Deserialize)]
struct RawOffersPage {
    #[serde(default = "one")]
    total_pages: u32,
    #[serde(default)]
    results: Vec<JsonValue>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct RawCompetitor {
    username: String,
    #[serde(default)]
    profile_url: String,
    #[serde(default)]
    contracts_completed: Option<u32>,
    #[serde(default)]
    tags: Vec<RawTag>,
    #[serde(default)]
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct RawTag {
    name: String,
}

/// Decodes one API page. Malformed competitor entries are logged and skipped.
pub fn parse_competition_page(body: JsonValue, site: &Site) -> Result<CompetitionPage> {
    let raw: RawOffersPage = serde_json::from_value(body)?;
    let competitors = raw
        .results
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match competitor_from_json(entry, site) {
            Ok(competitor) => Some(competitor),
            Err(err) => {
                warn!(target: "useme::competition", entry = index, error = %err, "skipping competitor");
                None
            }
        })
        .collect();
    Ok(CompetitionPage {
        total_pages: raw.total_pages,
        competitors,
    })
}

fn competitor_from_json(entry: JsonValue, site: &Site) -> Result<JobCompetitor> {
    let raw: RawCompetitor = serde_json::from_value(entry)?;
    let profile_url = if raw.profile_url.trim().is_empty() {
        String::new()
    } else {
        site.absolutize(&raw.profile_url)?
    };
    Ok(JobCompetitor {
        username: raw.username,
        profile_url,
        contracts_completed: raw.contracts_completed,
        skills: raw.tags.into_iter().map(|t| t.name).collect(),
        submitted_time: raw.created_at,
    })
}

async fn fetch_page(
    transport: &dyn Transport,
    site: &Site,
    lang: Language,
    job_id: &str,
    page: u32,
) -> Result<CompetitionPage> {
    let url = site.competition_page_url(lang, job_id, page);
    let body = transport.get_json(&url).await?;
    parse_competition_page(body, site)
}

/// Walks every page of the offers API for `job_url`.
///
/// Returns `None` only when the first page cannot be fetched. Later page
/// failures are skipped, and `total_offers` counts what was actually parsed.
pub async fn aggregate_competition(
    transport: &dyn Transport,
    site: &Site,
    job_url: &str,
) -> Option<JobCompetition> {
    let Some(job_id) = extract_job_id(job_url) else {
        debug!(target: "useme::competition", url = job_url, "no job id in url");
        return Some(JobCompetition::empty(job_url));
    };
    let lang = language_for_job_url(job_url);

    async {
        let first = match fetch_page(transport, site, lang, &job_id, 1).await {
            Ok(page) => page,
            Err(err) => {
                error!(target: "useme::competition", page = 1, error = %err, "first offers page unavailable");
                return None;
            }
        };

        let total_pages = first.total_pages;
        let mut competitors = first.competitors;
        for page in 2..=total_pages {
            match fetch_page(transport, site, lang, &job_id, page).await {
                Ok(next) => competitors.extend(next.competitors),
                Err(err) => {
                    warn!(target: "useme::competition", page, error = %err, "skipping offers page");
                }
            }
        }

        Some(JobCompetition {
            job_url: job_url.to_string(),
            total_offers: u32::try_from(competitors.len()).unwrap_or(u32::MAX),
            total_pages,
            competitors,
            job_id: job_id.clone(),
        })
    }
    .instrument(info_span!("job_competition", job_id = %job_id, %lang))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_id_prefers_comma_form_then_slash_form() {
        assert_eq!(
            extract_job_id("https://useme.com/pl/jobs/name,123456/").as_deref(),
            Some("123456")
        );
        assert_eq!(extract_job_id("https://useme.com/en/jobs/999/").as_deref(), Some("999"));
        assert_eq!(extract_job_id("https://useme.com/en/jobs/a/77,88/").as_deref(), Some("88"));
        assert_eq!(extract_job_id("https://useme.com/en/jobs/name/"), None);
    }

    #[test]
    fn language_follows_pl_segment() {
        assert_eq!(language_for_job_url("https://useme.com/pl/jobs/x,1/"), Language::Pl);
        assert_eq!(language_for_job_url("https://useme.com/en/jobs/x,1/"), Language::En);
        assert_eq!(language_for_job_url("https://useme.com/jobs/pl-lang,1/"), Language::En);
    }

    #[test]
    fn page_flattens_tags_and_skips_malformed_entries() {
        let body = json!({
            "total_pages": 2,
            "count": 3,
            "results": [
                {"username": "anna", "profile_url": "/pl/roles/contractor/anna,5/",
                 "contracts_completed": 14, "tags": [{"name": "Rust"}, {"name": "SQL"}],
                 "created_at": "2 hours ago"},
                {"profile_url": "/broken/"},
                {"username": "bob", "contracts_completed": null}
            ]
        });
        let page = parse_competition_page(body, &Site::default()).unwrap();
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.competitors.len(), 2);
        assert_eq!(page.competitors[0].skills, vec!["Rust", "SQL"]);
        assert_eq!(
            page.competitors[0].profile_url,
            "https://useme.com/pl/roles/contractor/anna,5/"
        );
        assert_eq!(page.competitors[1].contracts_completed, None);
        assert_eq!(page.competitors[1].profile_url, "");
    }
}
