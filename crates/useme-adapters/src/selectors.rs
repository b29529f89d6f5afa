//! Markup-shape assumptions, one selector set per page type.
//!
//! A site redesign should only touch this file.

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::labels::DealOutcome;

fn css(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid selector `{selector}`: {e}"))
}

pub(crate) struct ListingSelectors {
    pub container: Selector,
    pub card: Selector,
    pub client: Selector,
    pub span: Selector,
    pub offers_box: Selector,
    pub date_box: Selector,
    pub title_link: Selector,
    pub description: Selector,
    pub category_box: Selector,
    pub paragraph: Selector,
    pub tag: Selector,
    pub budget: Selector,
}

pub(crate) static LISTING: LazyLock<ListingSelectors> = LazyLock::new(|| ListingSelectors {
    container: css("div.jobs"),
    card: css("article.job"),
    client: css("strong"),
    span: css("span"),
    offers_box: css("div.job__header-details--offers"),
    date_box: css("div.job__header-details--date"),
    title_link: css("a.job__title-link"),
    description: css("p.mb-0.pb-0"),
    category_box: css("div.job__category"),
    paragraph: css("p"),
    tag: css("a.tag--jobs"),
    budget: css("span.job__budget-value"),
});

pub(crate) struct DetailSelectors {
    pub content: Selector,
    pub title: Selector,
    pub description: Selector,
    pub paragraph: Selector,
    pub item: Selector,
    pub label: Selector,
    pub value: Selector,
    pub value_text: Selector,
    pub file_link: Selector,
    pub link: Selector,
    pub offers_heading: Selector,
}

pub(crate) static DETAIL: LazyLock<DetailSelectors> = LazyLock::new(|| DetailSelectors {
    content: css("div.jobs-page__content.row"),
    title: css("h1.jobs__page-title"),
    description: css("div.jobs-summary__item-text"),
    paragraph: css("p"),
    item: css("div.jobs-summary__item"),
    label: css("div.jobs-summary__item-label"),
    value: css("div.jobs-summary__item-value"),
    value_text: css("div.jobs-summary__item-text"),
    file_link: css("a.filename"),
    link: css("a"),
    offers_heading: css("h3"),
});

pub(crate) struct ProfileSelectors {
    pub root: Selector,
    pub username: Selector,
    pub stats: Selector,
    pub paragraph: Selector,
    pub black_accent: Selector,
    pub deals: Selector,
    pub section_title: Selector,
    pub grey_accent: Selector,
    pub opinions: Selector,
    pub about: Selector,
    pub category_tree: Selector,
    pub link: Selector,
    pub tags: Selector,
    pub tag: Selector,
    pub portfolio: Selector,
    pub portfolio_item: Selector,
    pub external_link: Selector,
    pub portfolio_heading: Selector,
    pub reviews: Selector,
    pub review: Selector,
    pub portrait: Selector,
    pub portrait_name: Selector,
    pub portrait_date: Selector,
    pub positive_marker: Selector,
    pub negative_marker: Selector,
    pub review_text: Selector,
    pub review_answer: Selector,
    pub completed_list: Selector,
    pub completed_item: Selector,
    pub completed_title: Selector,
    pub completed_description: Selector,
    pub completed_category: Selector,
    pub completed_category_name: Selector,
    successful: Selector,
    disputed: Selector,
    failed: Selector,
}

impl ProfileSelectors {
    /// Color-coded span carrying the count for a deal outcome.
    pub fn deal_count(&self, outcome: DealOutcome) -> &Selector {
        match outcome {
            DealOutcome::Successful => &self.successful,
            DealOutcome::Disputed => &self.disputed,
            DealOutcome::Failed => &self.failed,
        }
    }
}

pub(crate) static PROFILE: LazyLock<ProfileSelectors> = LazyLock::new(|| ProfileSelectors {
    root: css("div#public_user_profile"),
    username: css("h1.profile-main__user-data-name"),
    stats: css("div.profile-stats"),
    paragraph: css("p"),
    black_accent: css("span.accent.accent--black"),
    deals: css("div.profile-main__user-data__deals"),
    section_title: css("h2.profile-main__title-secondary"),
    grey_accent: css("span.accent.accent--grey"),
    opinions: css("div.profile-main__user-data__opinions"),
    about: css("div.profile-main__about_me"),
    category_tree: css("div.profile-main__cat-tree"),
    link: css("a"),
    tags: css("div.profile-main__tags"),
    tag: css("a.tag"),
    portfolio: css("div.profile-main__portfolio"),
    portfolio_item: css("div.profile-main__portfolio__item"),
    external_link: css(r#"a[target="_blank"]"#),
    portfolio_heading: css("h6"),
    reviews: css("div.profile-main__opinions"),
    review: css("div.row.opinion"),
    portrait: css("div.portrait"),
    portrait_name: css("span.portrait__name"),
    portrait_date: css("div.portrait__date"),
    positive_marker: css("div.opinion-type-positive"),
    negative_marker: css("div.opinion-type-negative"),
    review_text: css("div.opinion-content-text"),
    review_answer: css("div.opinion-content-answer"),
    completed_list: css("ul.recent-jobs__list"),
    completed_item: css("li.recent-jobs__list-item"),
    completed_title: css("a.recent-job__title"),
    completed_description: css("div.recent-job__description"),
    completed_category: css("a.recent-job__category"),
    completed_category_name: css("span.recent-job__category-name"),
    successful: css("span.accent.accent--green"),
    disputed: css("span.accent.accent--yellow"),
    failed: css("span.accent.accent--red"),
});

pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub(crate) fn text_or_none(value: String) -> Option<String> {
    let trimmed = value.trim().to_string();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

pub(crate) fn first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// Trimmed text of the first match; empty text counts as a match.
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    first(scope, selector).map(text_of)
}

pub(crate) fn all_texts(scope: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    scope.select(selector).map(text_of).collect()
}

pub(crate) fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    first(scope, selector)
        .and_then(|n| n.value().attr(attr))
        .and_then(|s| text_or_none(s.to_string()))
}
