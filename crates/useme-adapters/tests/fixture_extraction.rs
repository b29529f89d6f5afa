use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use useme_adapters::{parse_job_detail, parse_job_listing, parse_user_profile, Site};
use useme_core::{OpinionType, UserDeals, UserOpinions, NEGOTIABLE};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../fixtures/useme")
}

fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

#[test]
fn english_listing_keeps_good_cards_and_drops_the_malformed_one() {
    let offers = parse_job_listing(&fixture("listing_en.html"), &Site::default());
    assert_eq!(offers.len(), 2);

    let first = &offers[0];
    assert_eq!(first.client, "Northwind Studio");
    assert_eq!(first.deals_count, Some(12));
    assert_eq!(first.offers_count, 4);
    assert_eq!(first.days_left, 6);
    assert_eq!(first.title, "Rust CLI for invoice export");
    assert_eq!(
        first.url,
        "https://useme.com/en/jobs/rust-cli-for-invoice-export,118204/"
    );
    assert_eq!(first.category, "IT / Programming");
    assert_eq!(first.tags, vec!["Rust", "CSV"]);
    assert_eq!(first.budget, "2,500 PLN");
    assert!(!first.negotiable);
    assert_eq!(first.amount, Some(Decimal::from(2500)));
    assert_eq!(first.currency.as_deref(), Some("PLN"));

    let second = &offers[1];
    assert_eq!(second.url, "https://useme.com/en/jobs/logo-for-bakery,118190/");
    assert_eq!(second.deals_count, Some(1));
    assert_eq!(second.days_left, 1);
    assert_eq!(second.budget, NEGOTIABLE);
    assert!(second.negotiable);
    assert_eq!(second.amount, None);
}

#[test]
fn polish_listing_normalizes_the_negotiable_phrase() {
    let offers = parse_job_listing(&fixture("listing_pl.html"), &Site::default());
    assert_eq!(offers.len(), 1);
    let offer = &offers[0];
    assert_eq!(offer.client, "Kwiaciarnia Róża");
    assert_eq!(offer.deals_count, Some(3));
    assert_eq!(offer.offers_count, 9);
    assert_eq!(offer.days_left, 14);
    assert_eq!(offer.budget, "Negotiable");
    assert!(offer.negotiable);
    assert_eq!(offer.currency, None);
}

#[test]
fn empty_listing_container_yields_no_offers() {
    assert!(parse_job_listing(&fixture("listing_empty.html"), &Site::default()).is_empty());
}

#[test]
fn english_detail_maps_known_labels_and_keeps_the_rest() {
    let url = "https://useme.com/en/jobs/rust-cli-for-invoice-export,118204/";
    let detail = parse_job_detail(&fixture("detail_en.html"), url, &Site::default()).expect("detail");

    assert_eq!(detail.title, "Rust CLI for invoice export");
    assert_eq!(
        detail.description,
        "We need a small command line tool that exports invoices to CSV. Source data lives in PostgreSQL."
    );
    assert_eq!(detail.client, "Northwind Studio");
    assert_eq!(detail.published_ago, "2 days ago");
    assert_eq!(detail.category, "IT / Programming");
    assert_eq!(detail.copyright, "Full transfer of copyright");
    assert_eq!(detail.budget, "2,500 PLN");
    assert_eq!(detail.amount, Some(Decimal::from(2500)));
    assert_eq!(detail.valid_for, "6 days");
    assert_eq!(detail.skills, vec!["Rust", "PostgreSQL"]);
    assert_eq!(detail.offers_count, 4);
    assert_eq!(detail.url, url);

    let keys: Vec<_> = detail.custom_fields.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Deadline", "Attachments"]);
    assert_eq!(
        detail.custom_fields["Attachments"],
        "https://useme.com/media/jobs/118204/spec.pdf"
    );
}

#[test]
fn polish_detail_uses_polish_labels() {
    let url = "https://useme.com/pl/jobs/sklep-internetowy,118300/";
    let detail = parse_job_detail(&fixture("detail_pl.html"), url, &Site::default()).expect("detail");

    assert_eq!(detail.client, "Kwiaciarnia Róża");
    assert_eq!(detail.published_ago, "wczoraj");
    assert_eq!(detail.category, "Programowanie i IT");
    assert_eq!(detail.budget, "Negotiable");
    assert!(detail.negotiable);
    assert_eq!(detail.valid_for, "14 dni");
    assert_eq!(detail.offers_count, 9);
    assert_eq!(detail.custom_fields.get("Termin realizacji").map(String::as_str), Some("1 miesiąc"));
    assert_eq!(detail.custom_fields.len(), 1);
}

#[test]
fn full_profile_populates_every_section() {
    let url = "https://useme.com/en/roles/contractor/ferris-dev,90001/";
    let profile = parse_user_profile(&fixture("profile_en.html"), url, &Site::default()).expect("profile");

    assert_eq!(profile.username, "ferris-dev");
    assert_eq!(profile.stats.country, "Poland");
    assert_eq!(profile.stats.location.as_deref(), Some("Wrocław"));
    assert_eq!(profile.stats.useme_since, "03.2019");
    assert_eq!(
        profile.deals,
        UserDeals {
            total: 27,
            successful: 25,
            disputed: 1,
            failed: 1
        }
    );
    assert_eq!(
        profile.opinions,
        UserOpinions {
            total: 3,
            positive: 2,
            neutral: 0,
            negative: 1
        }
    );
    assert_eq!(
        profile.about_me.as_deref(),
        Some("Backend developer focused on Rust and PostgreSQL.")
    );

    let categories: Vec<_> = profile.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(categories, vec!["IT / Programming > Web applications", "Databases"]);
    assert_eq!(profile.skills, vec!["Rust", "PostgreSQL", "Docker"]);

    assert_eq!(profile.portfolio.len(), 2);
    assert_eq!(
        profile.portfolio[0].url.as_deref(),
        Some("https://github.com/ferris-dev/invoicer")
    );
    assert_eq!(profile.portfolio[1].title, "Internal billing dashboard");
    assert_eq!(profile.portfolio[1].description, "");

    assert_eq!(profile.user_opinions.len(), 2);
    let praise = &profile.user_opinions[0];
    assert_eq!(praise.author_name, "Northwind Studio");
    assert_eq!(praise.date, "12.05.2024");
    assert_eq!(praise.opinion_type, OpinionType::Positive);
    assert_eq!(praise.content, "Fast and precise, would hire again.");
    let reply = praise.freelancer_reply.as_ref().expect("reply");
    assert_eq!(reply.content, "Thanks, it was a pleasure!");
    assert_eq!(reply.date.as_deref(), Some("13.05.2024"));
    assert_eq!(profile.user_opinions[1].opinion_type, OpinionType::Negative);
    assert!(profile.user_opinions[1].freelancer_reply.is_none());

    assert_eq!(profile.completed_jobs.len(), 1);
    let job = &profile.completed_jobs[0];
    assert_eq!(job.url, "https://useme.com/en/jobs/api-migration,110001/");
    assert_eq!(job.description, "Moved a REST API from Python to Rust.");
    assert_eq!(job.category_name, "IT / Programming");
}

#[test]
fn profile_without_portfolio_keeps_every_other_section() {
    let url = "https://useme.com/en/roles/contractor/ferris-dev,90001/";
    let html = fixture("profile_en.html");
    let start = html.find(r#"<div class="profile-main__portfolio">"#).expect("portfolio block");
    let end = html.find(r#"<div class="profile-main__opinions">"#).expect("opinions block");
    let mut stripped = html.clone();
    stripped.replace_range(start..end, "");

    let without = parse_user_profile(&stripped, url, &Site::default()).expect("profile");
    let mut full = parse_user_profile(&html, url, &Site::default()).expect("profile");

    assert!(without.portfolio.is_empty());
    assert_eq!(without.deals.total, 27);
    assert_eq!(without.opinions.total, 3);
    assert_eq!(without.categories.len(), 2);
    assert_eq!(without.skills, vec!["Rust", "PostgreSQL", "Docker"]);
    assert_eq!(without.user_opinions.len(), 2);
    assert_eq!(without.completed_jobs.len(), 1);

    full.portfolio.clear();
    assert_eq!(without, full);
}

#[test]
fn minimal_polish_profile_has_empty_optional_sections() {
    let profile = parse_user_profile(&fixture("profile_pl_minimal.html"), "u", &Site::default())
        .expect("profile");
    assert_eq!(profile.stats.country, "Polska");
    assert_eq!(profile.stats.location, None);
    assert_eq!(profile.stats.useme_since, "09.2025");
    assert_eq!(profile.deals, UserDeals::default());
    assert_eq!(profile.opinions, UserOpinions::default());
    assert_eq!(profile.about_me, None);
    assert_eq!(profile.skills, vec!["Tłumaczenia"]);
    assert!(profile.portfolio.is_empty());
    assert!(profile.user_opinions.is_empty());
    assert!(profile.completed_jobs.is_empty());
}

#[test]
fn budget_amounts_are_exact_decimals() {
    let html = fixture("listing_en.html").replace("2,500 PLN", "1,234,567.89 EUR");
    let offers = parse_job_listing(&html, &Site::default());
    assert_eq!(offers[0].amount, Some(Decimal::from_str("1234567.89").unwrap()));
    assert_eq!(offers[0].currency.as_deref(), Some("EUR"));
}
