use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jobgrid::api::ApiClient;
use jobgrid::grid::DEFAULT_PAGE_SIZE;
use jobgrid::models::{QueryRequest, SortColumn, SortDirection};

#[derive(Parser)]
#[command(name = "jobgrid")]
#[command(about = "Browse, filter, and refresh job listings from the aggregation API")]
struct Cli {
    /// Base URL of the job listings API
    #[arg(long, global = true, default_value = "http://127.0.0.1:5000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive table with facet filters and a detail overlay
    Browse,

    /// Print one page of jobs
    Jobs {
        /// Filter by job title (repeatable)
        #[arg(short, long)]
        title: Vec<String>,

        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Rows per page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: u32,

        /// Sort column (title, company, location, salary, source)
        #[arg(short, long, default_value = "title")]
        sort: String,

        /// Sort descending instead of ascending
        #[arg(long)]
        desc: bool,
    },

    /// Print the distinct job-title vocabulary
    Titles,

    /// Trigger a bulk refresh from all providers and print the summary
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if !matches!(cli.command, Commands::Browse) {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    }

    let client = ApiClient::new(cli.url);

    match cli.command {
        Commands::Browse => {
            jobgrid::tui::run_browse(client).await?;
        }

        Commands::Jobs {
            title,
            page,
            page_size,
            sort,
            desc,
        } => {
            let request = QueryRequest {
                titles: title,
                page,
                page_size,
                sort: parse_sort(&sort)?,
                direction: if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            };
            let result = client.jobs(&request).await?;
            if result.data.is_empty() {
                println!("No jobs found.");
            } else {
                println!(
                    "{:<32} {:<22} {:<20} {:<20} {:<10}",
                    "TITLE", "COMPANY", "LOCATION", "SALARY", "SOURCE"
                );
                println!("{}", "-".repeat(106));
                for job in &result.data {
                    println!(
                        "{:<32} {:<22} {:<20} {:<20} {:<10}",
                        truncate(&job.job_title, 30),
                        truncate(&job.company_name, 20),
                        truncate(&job.job_location, 18),
                        truncate(&job.salary_range, 18),
                        truncate(&job.source, 10)
                    );
                }
                println!(
                    "\nShowing {} of {} (page {})",
                    result.data.len(),
                    result.total,
                    page
                );
            }
        }

        Commands::Titles => {
            let titles = client.job_titles().await?;
            if titles.is_empty() {
                println!("No job titles available.");
            } else {
                for title in titles {
                    println!("{title}");
                }
            }
        }

        Commands::Refresh => {
            println!("Fetching from all providers...");
            let summary = client.fetch_all_jobs().await?;
            println!("\nResults:");
            for (source, payload) in &summary.per_source {
                match payload.as_array() {
                    Some(jobs) => println!("  {:<12} {} jobs", source, jobs.len()),
                    None => println!("  {:<12} {}", source, payload),
                }
            }
            println!("  {:<12} {}", "total", summary.job_count);
        }
    }

    Ok(())
}

fn parse_sort(name: &str) -> Result<SortColumn> {
    match name.to_lowercase().as_str() {
        "title" => Ok(SortColumn::Title),
        "company" => Ok(SortColumn::Company),
        "location" => Ok(SortColumn::Location),
        "salary" => Ok(SortColumn::Salary),
        "source" => Ok(SortColumn::Source),
        _ => Err(anyhow!(
            "Unknown sort column '{}'. Available: title, company, location, salary, source",
            name
        )),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        // Cut on a character boundary; provider titles are not ASCII-only.
        let prefix: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{prefix}...")
    }
}
