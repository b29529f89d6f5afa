use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use useme_core::{CopyrightTransfer, Language, OrderBy};
use useme_tools::{
    BillingArgs, CategoryFilterArgs, CategoryInfoArgs, FilterArgs, JobUrlArgs, LanguageFilterArgs,
    PageArgs, ProfileArgs, SearchCategoriesArgs, ToolCall, ToolRegistry, ToolsConfig, SYSTEM_INSTRUCTION,
    TOOLS,
};

#[derive(Debug, Parser)]
#[command(name = "useme-cli")]
#[command(about = "Useme job assistant command-line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct PageOpts {
    #[arg(long, default_value_t = 1)]
    page: u32,
    #[arg(long, default_value_t = Language::En)]
    language: Language,
    #[arg(long, default_value_t = 1)]
    num_pages: u32,
}

impl From<PageOpts> for PageArgs {
    fn from(opts: PageOpts) -> Self {
        PageArgs {
            page: opts.page,
            language: opts.language,
            num_pages: opts.num_pages,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the tools over HTTP.
    Serve,
    /// Print the tool catalogue and client instructions.
    Tools,
    BrowseJobs {
        #[command(flatten)]
        pages: PageOpts,
        /// Site sort order, e.g. -published_on or -payment_normalized.
        #[arg(long, allow_hyphen_values = true)]
        order_by: Option<OrderBy>,
    },
    CategoryJobs {
        #[arg(long)]
        category_id: u32,
        #[command(flatten)]
        pages: PageOpts,
        #[arg(long, allow_hyphen_values = true)]
        order_by: Option<OrderBy>,
    },
    JobDetails {
        job_url: String,
    },
    JobCompetition {
        job_url: String,
    },
    Billing {
        payout_amount: Decimal,
        #[arg(long, default_value = "PLN")]
        currency: String,
        #[arg(long, default_value = "license")]
        copyright_transfer: CopyrightTransfer,
        #[arg(long, default_value = "PL")]
        contractor_country: String,
        #[arg(long)]
        contractor_is_business: bool,
        #[arg(long)]
        contractor_is_vat_payer: bool,
        #[arg(long, default_value = "PL")]
        employer_country: String,
        /// Treat the client as a private person.
        #[arg(long)]
        employer_private: bool,
        /// Client is not registered for VAT.
        #[arg(long)]
        employer_no_vat: bool,
    },
    Profile {
        profile_url: String,
    },
    Categories {
        #[arg(long)]
        language: Option<Language>,
        /// Case-insensitive name or slug search.
        #[arg(long)]
        search: Option<String>,
    },
    Category {
        category_id: u32,
        #[arg(long, default_value_t = Language::En)]
        language: Language,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,useme=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("encoding output")?);
    Ok(())
}

impl Commands {
    /// Maps a data command onto its tool call; `None` for serve and tools.
    fn into_call(self) -> Option<ToolCall> {
        let call = match self {
            Commands::Serve | Commands::Tools => return None,
            Commands::BrowseJobs { pages, order_by } => ToolCall::FilterJobs(FilterArgs {
                pages: pages.into(),
                order_by,
            }),
            Commands::CategoryJobs {
                category_id,
                pages,
                order_by,
            } => ToolCall::FilterCategoryJobs(CategoryFilterArgs {
                category_id,
                pages: pages.into(),
                order_by,
            }),
            Commands::JobDetails { job_url } => ToolCall::GetJobDetails(JobUrlArgs { job_url }),
            Commands::JobCompetition { job_url } => ToolCall::GetJobCompetition(JobUrlArgs { job_url }),
            Commands::Billing {
                payout_amount,
                currency,
                copyright_transfer,
                contractor_country,
                contractor_is_business,
                contractor_is_vat_payer,
                employer_country,
                employer_private,
                employer_no_vat,
            } => ToolCall::CalculateBilling(BillingArgs {
                currency,
                copyright_transfer,
                contractor_country,
                contractor_is_business,
                contractor_is_vat_payer,
                employer_country,
                employer_is_business: !employer_private,
                employer_is_vat_payer: !employer_no_vat,
                ..BillingArgs::new(payout_amount)
            }),
            Commands::Profile { profile_url } => ToolCall::GetUserProfile(ProfileArgs { profile_url }),
            Commands::Categories {
                language,
                search: Some(search_term),
            } => ToolCall::SearchCategories(SearchCategoriesArgs { search_term, language }),
            Commands::Categories { language, search: None } => {
                ToolCall::ListCategories(LanguageFilterArgs { language })
            }
            Commands::Category {
                category_id,
                language,
            } => ToolCall::GetCategoryInfo(CategoryInfoArgs { category_id, language }),
        };
        Some(call)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => useme_web::serve_from_env().await?,
        Commands::Tools => {
            println!("{SYSTEM_INSTRUCTION}");
            print_json(&TOOLS)?;
        }
        command => {
            if let Some(call) = command.into_call() {
                let tool = call.name();
                let registry = ToolRegistry::from_config(&ToolsConfig::from_env())?;
                let output = registry
                    .call(call)
                    .await
                    .with_context(|| format!("running {tool}"))?;
                print_json(&output)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(std::iter::once("useme-cli").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn browse_accepts_a_descending_sort_order() {
        let call = parse(&["browse-jobs", "--order-by", "-published_on", "--num-pages", "2"])
            .into_call()
            .unwrap();
        match call {
            ToolCall::FilterJobs(args) => {
                assert_eq!(args.order_by, Some(OrderBy::NewestFirst));
                assert_eq!(args.pages.num_pages, 2);
                assert_eq!(args.pages.page, 1);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn billing_flags_invert_into_employer_defaults() {
        let call = parse(&["billing", "1500", "--employer-private", "--copyright-transfer", "full"])
            .into_call()
            .unwrap();
        match call {
            ToolCall::CalculateBilling(args) => {
                assert_eq!(args.payout_amount, Decimal::from(1500));
                assert!(!args.employer_is_business);
                assert!(args.employer_is_vat_payer);
                assert_eq!(args.copyright_transfer, CopyrightTransfer::Full);
                assert_eq!(args.currency, "PLN");
            }
            other => panic!("unexpected call {other:?}"),
        }
    }

    #[test]
    fn categories_with_search_becomes_a_search_call() {
        let call = parse(&["categories", "--search", "prog", "--language", "pl"])
            .into_call()
            .unwrap();
        assert_eq!(
            call,
            ToolCall::SearchCategories(SearchCategoriesArgs {
                search_term: "prog".to_string(),
                language: Some(Language::Pl),
            })
        );
        assert!(parse(&["serve"]).into_call().is_none());
    }
}
