//! Single job detail page.
//!
//! All-or-nothing: any failure collapses the whole page to `None`.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::error;
use useme_core::{JobDetail, NEGOTIABLE};

use crate::error::{ExtractError, Result};
use crate::labels::{DetailField, LabelKind, SUBMITTED_OFFERS_PHRASES};
use crate::normalize::{canonical_budget, parse_budget};
use crate::selectors::{all_texts, first, first_text, text_of, DETAIL};
use crate::site::Site;

static PAREN_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\)").expect("valid offers count regex"));

pub fn parse_job_detail(html: &str, job_url: &str, site: &Site) -> Option<JobDetail> {
    let document = Html::parse_document(html);
    let Some(content) = first(document.root_element(), &DETAIL.content) else {
        error!(target: "useme::detail", url = job_url, reason = "content container not found", "no job detail");
        return None;
    };
    match extract_detail(content, job_url, site) {
        Ok(detail) => Some(detail),
        Err(err) => {
            error!(target: "useme::detail", url = job_url, error = %err, "job detail extraction failed");
            None
        }
    }
}

fn extract_detail(content: ElementRef<'_>, job_url: &str, site: &Site) -> Result<JobDetail> {
    let title = first_text(content, &DETAIL.title).unwrap_or_default();

    let description = first(content, &DETAIL.description)
        .map(|d| all_texts(d, &DETAIL.paragraph).join(" "))
        .unwrap_or_default();

    let mut client = String::new();
    let mut published_ago = String::new();
    let mut category = String::new();
    let mut copyright = String::new();
    let mut budget = NEGOTIABLE.to_string();
    let mut valid_for = String::new();
    let mut skills = Vec::new();
    let mut custom_fields = IndexMap::new();

    for item in content.select(&DETAIL.item) {
        let Some(label) = first_text(item, &DETAIL.label) else {
            continue;
        };
        let Some(value_elem) = first(item, &DETAIL.value).or_else(|| first(item, &DETAIL.value_text))
        else {
            continue;
        };

        let value = match first(value_elem, &DETAIL.file_link).and_then(|a| a.value().attr("href")) {
            Some(href) => site.absolutize(href)?,
            None => text_of(value_elem),
        };

        match DetailField::from_label(&label) {
            Some(DetailField::Employer) => client = text_of(value_elem),
            Some(DetailField::Published) => published_ago = value,
            Some(DetailField::Category) => {
                category = first_text(value_elem, &DETAIL.link).unwrap_or_else(|| text_of(value_elem));
            }
            Some(DetailField::Copyright) => copyright = value,
            Some(DetailField::Budget) => budget = canonical_budget(&value),
            Some(DetailField::ValidFor) => valid_for = value,
            Some(DetailField::Skills) => skills = all_texts(value_elem, &DETAIL.link),
            None => {
                custom_fields.insert(label, value);
            }
        }
    }

    let offers_count = submitted_offers(content)?;
    let derived = parse_budget(&budget);

    Ok(JobDetail {
        title,
        client,
        description,
        published_ago,
        category,
        copyright,
        skills,
        budget,
        negotiable: derived.negotiable,
        amount: derived.amount,
        currency: derived.currency,
        valid_for,
        offers_count,
        url: job_url.to_string(),
        custom_fields,
    })
}

fn submitted_offers(content: ElementRef<'_>) -> Result<u32> {
    let Some(heading) = content
        .select(&DETAIL.offers_heading)
        .map(text_of)
        .find(|text| SUBMITTED_OFFERS_PHRASES.found_in(text))
    else {
        return Ok(0);
    };
    let Some(caps) = PAREN_COUNT_RE.captures(&heading) else {
        return Ok(0);
    };
    caps[1].parse().map_err(|_| ExtractError::InvalidNumber {
        field: "submitted offers",
        text: caps[1].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(inner: &str) -> String {
        format!(r#"<div class="jobs-page__content row">{inner}</div>"#)
    }

    #[test]
    fn unknown_labels_become_custom_fields_in_page_order() {
        let html = page(
            r#"<h1 class="jobs__page-title">Logo</h1>
               <div class="jobs-summary__item">
                 <div class="jobs-summary__item-label">Deadline</div>
                 <div class="jobs-summary__item-value">2 weeks</div>
               </div>
               <div class="jobs-summary__item">
                 <div class="jobs-summary__item-label">Format</div>
                 <div class="jobs-summary__item-value">SVG</div>
               </div>"#,
        );
        let detail = parse_job_detail(&html, "https://useme.com/en/jobs/logo,1/", &Site::default()).unwrap();
        let keys: Vec<_> = detail.custom_fields.keys().cloned().collect();
        assert_eq!(keys, vec!["Deadline", "Format"]);
        assert_eq!(detail.custom_fields["Format"], "SVG");
        assert_eq!(detail.budget, "Negotiable");
        assert!(detail.negotiable);
        assert_eq!(detail.offers_count, 0);
    }

    #[test]
    fn file_links_are_used_as_absolute_values() {
        let html = page(
            r#"<div class="jobs-summary__item">
                 <div class="jobs-summary__item-label">Attachments</div>
                 <div class="jobs-summary__item-value"><a class="filename" href="/files/brief.pdf">brief.pdf</a></div>
               </div>"#,
        );
        let detail = parse_job_detail(&html, "u", &Site::default()).unwrap();
        assert_eq!(detail.custom_fields["Attachments"], "https://useme.com/files/brief.pdf");
    }

    #[test]
    fn missing_content_container_is_absence() {
        assert!(parse_job_detail("<h1 class=\"jobs__page-title\">x</h1>", "u", &Site::default()).is_none());
    }

    #[test]
    fn failure_mid_parse_yields_absence_not_a_partial_record() {
        let html = page(
            r#"<h1 class="jobs__page-title">Big</h1>
               <div class="jobs-summary__item">
                 <div class="jobs-summary__item-label">Budget</div>
                 <div class="jobs-summary__item-value">500 EUR</div>
               </div>
               <h3>Submitted offers (99999999999999999999)</h3>"#,
        );
        assert!(parse_job_detail(&html, "u", &Site::default()).is_none());
    }
}
