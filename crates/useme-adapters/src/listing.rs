//! Job listing pages: one [`JobOffer`] per job card.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::{error, warn};
use useme_core::{JobOffer, NEGOTIABLE};

use crate::error::{ExtractError, Result};
use crate::normalize::{canonical_budget, first_integer, parse_budget};
use crate::selectors::{all_texts, first, first_attr, first_text, text_of, LISTING};
use crate::site::Site;

static DEALS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+\s+(deals?|umów|umowa|umowę|umowy)").expect("valid deals regex")
});
static DAYS_LEFT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+\s+days?\s+left|Znika za \d+ dni|\d+ dni)").expect("valid days regex")
});
static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid digits regex"));

/// Parses every job card of a listing page.
///
/// Cards that fail are logged and skipped; a page without the listing
/// container yields an empty list.
pub fn parse_job_listing(html: &str, site: &Site) -> Vec<JobOffer> {
    let document = Html::parse_document(html);
    let Some(container) = first(document.root_element(), &LISTING.container) else {
        error!(target: "useme::listing", reason = "listing container not found", "no jobs extracted");
        return Vec::new();
    };

    container
        .select(&LISTING.card)
        .enumerate()
        .filter_map(|(index, card)| match parse_card(card, site) {
            Ok(offer) => Some(offer),
            Err(err) => {
                warn!(target: "useme::listing", card = index, error = %err, "skipping job card");
                None
            }
        })
        .collect()
}

fn parse_card(card: ElementRef<'_>, site: &Site) -> Result<JobOffer> {
    let client = first_attr(card, &LISTING.client, "aria-label").unwrap_or_default();

    let deals_count = card
        .select(&LISTING.span)
        .map(text_of)
        .find(|text| DEALS_RE.is_match(text))
        .and_then(|text| first_integer(&text));

    let offers_box = first(card, &LISTING.offers_box)
        .ok_or(ExtractError::MissingElement("job__header-details--offers"))?;
    let offers_count = offers_box
        .select(&LISTING.span)
        .map(text_of)
        .find(|text| DIGITS_RE.is_match(text))
        .and_then(|text| first_integer(&text))
        .unwrap_or(0);

    let date_box = first(card, &LISTING.date_box)
        .ok_or(ExtractError::MissingElement("job__header-details--date"))?;
    let days_left = date_box
        .select(&LISTING.span)
        .map(text_of)
        .find(|text| DAYS_LEFT_RE.is_match(text))
        .and_then(|text| first_integer(&text))
        .unwrap_or(0);

    let title_link = first(card, &LISTING.title_link);
    let title = title_link.map(text_of).unwrap_or_default();
    let url = match title_link.and_then(|link| link.value().attr("href")) {
        Some(href) if !href.trim().is_empty() => site.absolutize(href)?,
        _ => String::new(),
    };

    let description = first_text(card, &LISTING.description).unwrap_or_default();

    let category_box = first(card, &LISTING.category_box)
        .ok_or(ExtractError::MissingElement("job__category"))?;
    let category = first_text(category_box, &LISTING.paragraph).unwrap_or_default();

    let tags = all_texts(card, &LISTING.tag);

    let budget = first_text(card, &LISTING.budget)
        .map(|raw| canonical_budget(&raw))
        .unwrap_or_else(|| NEGOTIABLE.to_string());
    let derived = parse_budget(&budget);

    Ok(JobOffer {
        client,
        offers_count,
        days_left,
        title,
        description,
        category,
        tags,
        budget,
        negotiable: derived.negotiable,
        amount: derived.amount,
        currency: derived.currency,
        deals_count,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn card(inner: &str) -> String {
        format!(r#"<div class="jobs"><article class="job">{inner}</article></div>"#)
    }

    const WELL_FORMED: &str = r#"
        <strong aria-label="Acme Sp. z o.o.">A</strong>
        <span>3 deals</span>
        <div class="job__header-details--offers"><span>7</span></div>
        <div class="job__header-details--date"><span>5 days left</span></div>
        <a class="job__title-link" href="/en/jobs/landing-page,123/">Landing page</a>
        <p class="mb-0 pb-0">Need a landing page.</p>
        <div class="job__category"><p>Web development</p></div>
        <a class="tag--jobs">HTML</a><a class="tag--jobs">CSS</a>
        <span class="job__budget-value">1,200 PLN</span>
    "#;

    #[test]
    fn parses_a_complete_card() {
        let offers = parse_job_listing(&card(WELL_FORMED), &Site::default());
        assert_eq!(offers.len(), 1);
        let offer = &offers[0];
        assert_eq!(offer.client, "Acme Sp. z o.o.");
        assert_eq!(offer.deals_count, Some(3));
        assert_eq!(offer.offers_count, 7);
        assert_eq!(offer.days_left, 5);
        assert_eq!(offer.title, "Landing page");
        assert_eq!(offer.url, "https://useme.com/en/jobs/landing-page,123/");
        assert_eq!(offer.category, "Web development");
        assert_eq!(offer.tags, vec!["HTML", "CSS"]);
        assert_eq!(offer.amount, Some(Decimal::from(1200)));
        assert_eq!(offer.currency.as_deref(), Some("PLN"));
        assert!(!offer.negotiable);
    }

    #[test]
    fn missing_budget_defaults_to_negotiable() {
        let html = card(
            r#"<div class="job__header-details--offers"></div>
               <div class="job__header-details--date"><span>Znika za 2 dni</span></div>
               <div class="job__category"></div>"#,
        );
        let offers = parse_job_listing(&html, &Site::default());
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].budget, "Negotiable");
        assert!(offers[0].negotiable);
        assert_eq!(offers[0].offers_count, 0);
        assert_eq!(offers[0].days_left, 2);
        assert_eq!(offers[0].deals_count, None);
        assert_eq!(offers[0].url, "");
    }

    #[test]
    fn polish_budget_phrase_is_stored_canonically() {
        let html = card(
            r#"<div class="job__header-details--offers"><span>1</span></div>
               <div class="job__header-details--date"><span>4 dni</span></div>
               <div class="job__category"><p>Grafika</p></div>
               <span>12 umów</span>
               <span class="job__budget-value">Do negocjacji</span>"#,
        );
        let offers = parse_job_listing(&html, &Site::default());
        assert_eq!(offers[0].budget, "Negotiable");
        assert!(offers[0].negotiable);
        assert_eq!(offers[0].days_left, 4);
        assert_eq!(offers[0].deals_count, Some(12));
    }

    #[test]
    fn missing_container_or_empty_input_yields_no_offers() {
        assert!(parse_job_listing("", &Site::default()).is_empty());
        assert!(parse_job_listing("<div class=\"job-list\"></div>", &Site::default()).is_empty());
        assert!(parse_job_listing("<div class=\"jobs\"></div>", &Site::default()).is_empty());
    }

    #[test]
    fn malformed_card_is_dropped_and_the_rest_survive() {
        let html = format!(
            r#"<div class="jobs">
                <article class="job">{WELL_FORMED}</article>
                <article class="job"><a class="job__title-link" href="/x,1/">Broken</a></article>
                <article class="job">{WELL_FORMED}</article>
            </div>"#
        );
        let offers = parse_job_listing(&html, &Site::default());
        assert_eq!(offers.len(), 2);
        assert!(offers.iter().all(|o| o.title == "Landing page"));
    }
}
