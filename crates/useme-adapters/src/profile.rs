//! Freelancer public profile page.
//!
//! Optional sections (bio, portfolio, reviews, completed jobs) parse to empty
//! values when absent. A failure anywhere else drops the whole profile.

use scraper::{ElementRef, Html, Selector};
use tracing::{error, warn};
use useme_core::{
    FreelancerReply, OpinionType, UserCategory, UserCompletedJob, UserDeals, UserOpinion,
    UserOpinions, UserPortfolioItem, UserProfile, UserProfileStats,
};

use crate::error::{ExtractError, Result};
use crate::labels::{DealOutcome, LabelKind, OpinionOutcome, ProfileStat};
use crate::normalize::{embedded_count, parse_count, strip_date_connector};
use crate::selectors::{all_texts, first, first_text, text_of, text_or_none, PROFILE};
use crate::site::Site;

pub fn parse_user_profile(html: &str, profile_url: &str, site: &Site) -> Option<UserProfile> {
    let document = Html::parse_document(html);
    let Some(root) = first(document.root_element(), &PROFILE.root) else {
        error!(target: "useme::profile", url = profile_url, reason = "profile container not found", "no profile");
        return None;
    };
    match extract_profile(root, profile_url, site) {
        Ok(profile) => Some(profile),
        Err(err) => {
            error!(target: "useme::profile", url = profile_url, error = %err, "profile extraction failed");
            None
        }
    }
}

fn extract_profile(root: ElementRef<'_>, profile_url: &str, site: &Site) -> Result<UserProfile> {
    Ok(UserProfile {
        profile_url: profile_url.to_string(),
        username: first_text(root, &PROFILE.username).unwrap_or_default(),
        stats: parse_stats(root),
        deals: parse_deals(root)?,
        opinions: parse_opinion_counts(root)?,
        about_me: first(root, &PROFILE.about)
            .and_then(|about| first_text(about, &PROFILE.paragraph))
            .and_then(text_or_none),
        categories: parse_categories(root),
        skills: first(root, &PROFILE.tags)
            .map(|tags| all_texts(tags, &PROFILE.tag))
            .unwrap_or_default(),
        portfolio: parse_portfolio(root, site)?,
        user_opinions: parse_reviews(root),
        completed_jobs: parse_completed_jobs(root, site),
    })
}

fn parse_stats(root: ElementRef<'_>) -> UserProfileStats {
    let mut stats = UserProfileStats::default();
    let Some(block) = first(root, &PROFILE.stats) else {
        return stats;
    };
    for p in block.select(&PROFILE.paragraph) {
        let text = p.text().collect::<String>();
        let Some(phrase) = ProfileStat::matching_phrase(&text) else {
            continue;
        };
        match phrase.kind {
            ProfileStat::Country => {
                if let Some(country) = first_text(p, &PROFILE.black_accent) {
                    stats.country = country;
                }
            }
            ProfileStat::Location => {
                if let Some(location) = first_text(p, &PROFILE.black_accent) {
                    stats.location = Some(location);
                }
            }
            ProfileStat::MemberSince => {
                stats.useme_since = text.replace(phrase.text, "").trim().to_string();
            }
        }
    }
    stats
}

fn parse_deals(root: ElementRef<'_>) -> Result<UserDeals> {
    let mut deals = UserDeals::default();
    let Some(block) = first(root, &PROFILE.deals) else {
        return Ok(deals);
    };

    if let Some(total) = first(block, &PROFILE.section_title)
        .and_then(|title| first_text(title, &PROFILE.grey_accent))
    {
        deals.total = parse_count("deals total", &total)?;
    }

    let Some(stats) = first(block, &PROFILE.stats) else {
        return Ok(deals);
    };
    for p in stats.select(&PROFILE.paragraph) {
        let Some(outcome) = DealOutcome::find_in(&text_of(p)) else {
            continue;
        };
        let Some(count) = first_text(p, PROFILE.deal_count(outcome)) else {
            continue;
        };
        let count = parse_count("deal outcome", &count)?;
        match outcome {
            DealOutcome::Successful => deals.successful = count,
            DealOutcome::Disputed => deals.disputed = count,
            DealOutcome::Failed => deals.failed = count,
        }
    }
    Ok(deals)
}

fn parse_opinion_counts(root: ElementRef<'_>) -> Result<UserOpinions> {
    let mut opinions = UserOpinions::default();
    let Some(block) = first(root, &PROFILE.opinions) else {
        return Ok(opinions);
    };

    if let Some(title) = first_text(block, &PROFILE.section_title) {
        opinions.total = embedded_count("opinions total", &title)?;
    }

    let Some(stats) = first(block, &PROFILE.stats) else {
        return Ok(opinions);
    };
    for p in stats.select(&PROFILE.paragraph) {
        let text = text_of(p);
        let Some(outcome) = OpinionOutcome::find_in(&text) else {
            continue;
        };
        let count = embedded_count("opinion outcome", &text)?;
        match outcome {
            OpinionOutcome::Positive => opinions.positive = count,
            OpinionOutcome::Neutral => opinions.neutral = count,
            OpinionOutcome::Negative => opinions.negative = count,
        }
    }
    Ok(opinions)
}

fn parse_categories(root: ElementRef<'_>) -> Vec<UserCategory> {
    root.select(&PROFILE.category_tree)
        .filter_map(|tree| {
            let mut links = tree.select(&PROFILE.link).map(text_of);
            let parent = links.next()?;
            let name = match links.next() {
                Some(child) => format!("{parent} > {child}"),
                None => parent,
            };
            Some(UserCategory { name })
        })
        .collect()
}

fn parse_portfolio(root: ElementRef<'_>, site: &Site) -> Result<Vec<UserPortfolioItem>> {
    let Some(section) = first(root, &PROFILE.portfolio) else {
        return Ok(Vec::new());
    };

    let mut items = Vec::new();
    for item in section.select(&PROFILE.portfolio_item) {
        let (title, url) = match first(item, &PROFILE.external_link) {
            Some(link) => {
                let url = match link.value().attr("href").map(str::trim) {
                    Some(href) if !href.is_empty() => Some(site.absolutize(href)?),
                    _ => None,
                };
                (text_of(link), url)
            }
            None => (
                first_text(item, &PROFILE.portfolio_heading).unwrap_or_default(),
                None,
            ),
        };
        if title.is_empty() {
            continue;
        }
        items.push(UserPortfolioItem {
            title,
            url,
            description: first_text(item, &PROFILE.paragraph).unwrap_or_default(),
        });
    }
    Ok(items)
}

/// First match of `selector` under `scope` that does not sit inside `excluded`.
fn first_outside<'a>(
    scope: ElementRef<'a>,
    selector: &Selector,
    excluded: Option<ElementRef<'a>>,
) -> Option<ElementRef<'a>> {
    scope.select(selector).find(|el| match excluded {
        Some(ex) => !el.ancestors().any(|a| a.id() == ex.id()),
        None => true,
    })
}

fn parse_reviews(root: ElementRef<'_>) -> Vec<UserOpinion> {
    let Some(section) = first(root, &PROFILE.reviews) else {
        return Vec::new();
    };
    section.select(&PROFILE.review).map(parse_review).collect()
}

fn parse_review(row: ElementRef<'_>) -> UserOpinion {
    let answer = first(row, &PROFILE.review_answer);

    let portrait = first_outside(row, &PROFILE.portrait, answer);
    let author_name = portrait
        .and_then(|p| first_text(p, &PROFILE.portrait_name))
        .unwrap_or_default();
    let date = portrait
        .and_then(|p| first_text(p, &PROFILE.portrait_date))
        .map(|d| strip_date_connector(&d))
        .unwrap_or_default();

    let opinion_type = if first_outside(row, &PROFILE.positive_marker, answer).is_some() {
        OpinionType::Positive
    } else if first_outside(row, &PROFILE.negative_marker, answer).is_some() {
        OpinionType::Negative
    } else {
        OpinionType::Neutral
    };

    let content = first_outside(row, &PROFILE.review_text, answer)
        .map(text_of)
        .unwrap_or_default();

    let freelancer_reply = answer.and_then(|answer| {
        let content = first_text(answer, &PROFILE.review_text)?;
        let date = first(answer, &PROFILE.portrait)
            .and_then(|p| first_text(p, &PROFILE.portrait_date))
            .map(|d| strip_date_connector(&d));
        Some(FreelancerReply { content, date })
    });

    UserOpinion {
        author_name,
        date,
        opinion_type,
        content,
        freelancer_reply,
    }
}

fn parse_completed_jobs(root: ElementRef<'_>, site: &Site) -> Vec<UserCompletedJob> {
    let Some(list) = first(root, &PROFILE.completed_list) else {
        return Vec::new();
    };
    list.select(&PROFILE.completed_item)
        .enumerate()
        .filter_map(|(index, item)| match parse_completed_job(item, site) {
            Ok(job) => Some(job),
            Err(err) => {
                warn!(target: "useme::profile", item = index, error = %err, "skipping completed job");
                None
            }
        })
        .collect()
}

fn parse_completed_job(item: ElementRef<'_>, site: &Site) -> Result<UserCompletedJob> {
    let title_link = first(item, &PROFILE.completed_title)
        .ok_or(ExtractError::MissingElement("recent-job__title"))?;
    let category_link = first(item, &PROFILE.completed_category)
        .ok_or(ExtractError::MissingElement("recent-job__category"))?;

    let url = match title_link.value().attr("href").map(str::trim) {
        Some(href) if !href.is_empty() => site.absolutize(href)?,
        _ => String::new(),
    };

    Ok(UserCompletedJob {
        title: text_of(title_link),
        url,
        description: first_text(item, &PROFILE.completed_description).unwrap_or_default(),
        category_name: first_text(category_link, &PROFILE.completed_category_name).unwrap_or_default(),
    })
}
