//! Useme page extractors and the source that drives them.
//!
//! Every `parse_*` function is a pure function of already fetched text.
//! [`UsemeSource`] pairs them with a [`useme_storage::Transport`].

pub mod billing;
pub mod competition;
pub mod detail;
pub mod error;
pub mod labels;
pub mod listing;
pub mod normalize;
pub mod pagination;
pub mod profile;
mod selectors;
pub mod site;
pub mod source;

pub use billing::{billing_payload, parse_billing_response};
pub use competition::{aggregate_competition, extract_job_id, parse_competition_page, CompetitionPage};
pub use detail::parse_job_detail;
pub use error::{ExtractError, Result};
pub use listing::parse_job_listing;
pub use pagination::collect_pages;
pub use profile::parse_user_profile;
pub use site::{Site, DEFAULT_BASE_URL};
pub use source::UsemeSource;

pub const CRATE_NAME: &str = "useme-adapters";
