use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use country_refresh::api::{ExchangeRateClient, RestCountriesClient};
use country_refresh::countries::CountryStore;
use country_refresh::error::RefreshError;
use country_refresh::gdp::GdpEstimator;
use country_refresh::models::{CountryFilter, CountryRecord, SortOrder};
use country_refresh::refresh::RefreshPipeline;
use country_refresh::{bar_chart, config, db, export};

#[derive(Parser, Debug)]
#[command(name = "country-refresh")]
#[command(author, version, about = "Refresh country data and exchange rates into a local store")]
struct Cli {
    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch countries and exchange rates and reconcile them into the store
    Refresh {
        /// Skip the summary image
        #[arg(long)]
        no_image: bool,
    },
    /// Show the number of stored countries and the last refresh time
    Status,
    /// List stored countries
    List {
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        currency: Option<String>,
        /// One of gdp_desc, gdp_asc, population_desc, population_asc, name_asc, name_desc
        #[arg(long)]
        sort: Option<String>,
    },
    /// Show a single country
    Show { name: String },
    /// Delete a country
    Delete { name: String },
    /// Countries with the highest estimated GDP
    Top {
        #[arg(short, long, default_value_t = 5)]
        limit: i64,
    },
    /// Export all countries to CSV
    Export,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let config = config::load_config(&config_path)?;

    let pool = db::create_db_pool(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    let store = CountryStore::new(pool);

    match cli.command {
        Command::Refresh { no_image } => {
            let countries =
                RestCountriesClient::new(&config.countries_api_url, config.countries_timeout())?;
            let rates = ExchangeRateClient::new(&config.exchange_api_url, config.rates_timeout())?;
            let mut pipeline = RefreshPipeline::new(countries, rates, store, GdpEstimator::random())
                .with_progress(true);

            let summary = match pipeline.run().await {
                Ok(summary) => summary,
                Err(e) if e.is_upstream() => {
                    let source = e.source_name().unwrap_or("external API");
                    return Err(anyhow::anyhow!(
                        "External data source unavailable: could not fetch data from {} ({})",
                        source,
                        e
                    ));
                }
                Err(e) => return Err(e.into()),
            };

            println!("✅ Countries data refreshed successfully");
            println!("{}", serde_json::to_string_pretty(&summary)?);
            if !summary.failures.is_empty() {
                println!("\nSkipped {} countries:", summary.failures.len());
                for failure in &summary.failures {
                    println!("  {} - {}", failure.name, failure.reason);
                }
            }

            if !no_image {
                match bar_chart::generate_summary_image(
                    pipeline.store(),
                    &config.output_dir,
                    config.summary_top_n,
                )
                .await
                {
                    Ok(path) => println!("📊 Summary image created: {}", path.display()),
                    Err(e) => warn!(error = %e, "failed to generate summary image"),
                }
            }
        }
        Command::Status => {
            let status = store.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::List {
            region,
            currency,
            sort,
        } => {
            if let Some(sort) = sort.as_deref() {
                validate_sort(sort)?;
            }
            let filter = CountryFilter {
                region,
                currency,
                sort,
            };
            let countries = store.find_all(&filter).await?;
            println!("{}", serde_json::to_string_pretty(&countries)?);
        }
        Command::Show { name } => {
            let country: CountryRecord = store
                .find_by_name(&name)
                .await?
                .ok_or_else(|| RefreshError::NotFound("Country".to_string()))?;
            println!("{}", serde_json::to_string_pretty(&country)?);
        }
        Command::Delete { name } => {
            if !store.delete(&name).await? {
                return Err(RefreshError::NotFound("Country".to_string()).into());
            }
            println!("✅ Country deleted successfully: {}", name);
        }
        Command::Top { limit } => {
            for (i, (name, gdp)) in store.top_by_estimated_gdp(limit).await?.iter().enumerate() {
                println!("{:>3}. {:<40} {:>24.2}", i + 1, name, gdp);
            }
        }
        Command::Export => {
            let path = export::export_countries(&store, &config.output_dir).await?;
            println!("📁 CSV file created: {}", path.display());
        }
    }

    Ok(())
}

fn validate_sort(sort: &str) -> std::result::Result<(), RefreshError> {
    match SortOrder::parse(sort) {
        Some(_) => Ok(()),
        None => Err(RefreshError::Validation(format!(
            "sort must be one of: {}",
            SortOrder::VALID.join(", ")
        ))),
    }
}
