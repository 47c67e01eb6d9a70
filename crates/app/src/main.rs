mod interactive;

use anyhow::Context;
use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use resume_match_core::{
    render_analysis, render_candidates, ConsoleConfig, HttpRankingService, MatchConsole, Query,
    RankingService, ServiceConfig, DEFAULT_EXPORT_FILE_NAME, DEFAULT_PRODUCT_NAME,
    DEFAULT_SERVICE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_TOP_N,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "resume-match", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Ranking service base URL
    #[arg(long, env = "RESUME_MATCH_URL", default_value = DEFAULT_SERVICE_URL)]
    service_url: String,

    /// Seconds to wait for the ranking service
    #[arg(long, env = "RESUME_MATCH_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Name shown in console banners
    #[arg(long, default_value = DEFAULT_PRODUCT_NAME)]
    product_name: String,
}

#[derive(Subcommand)]
enum Command {
    /// Rank resumes against a job description once and print the matches.
    Match {
        /// Job description text.
        #[arg(
            long,
            conflicts_with = "description_file",
            required_unless_present = "description_file"
        )]
        description: Option<String>,
        /// Read the job description from a file.
        #[arg(long)]
        description_file: Option<PathBuf>,
        /// Number of matches to show.
        #[arg(
            long,
            default_value_t = DEFAULT_TOP_N as u64,
            value_parser = clap::value_parser!(u64).range(1..=20)
        )]
        top_n: u64,
        /// Skip the detailed per-candidate analysis.
        #[arg(long, default_value_t = false)]
        no_analysis: bool,
        /// Write the results as text; defaults to resume_match_results.txt.
        #[arg(long, num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
    },
    /// Interactive console: paste a description, analyze, adjust and export.
    Console,
    /// Check that the ranking service is reachable.
    Health,
    /// Download a matched resume.
    Fetch {
        /// File name as reported in the ranking.
        #[arg(long)]
        file_name: String,
        /// Destination path.
        #[arg(long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let service_config =
        ServiceConfig::new(&cli.service_url, Duration::from_secs(cli.timeout_secs))?;
    let config = ConsoleConfig {
        service: service_config.clone(),
        product_name: cli.product_name,
    };
    let service = HttpRankingService::new(service_config)?;

    info!(
        version = app_version,
        service = %config.service.base_url,
        started_at = %Utc::now().to_rfc3339(),
        "resume-match boot"
    );

    match cli.command {
        Command::Match {
            description,
            description_file,
            top_n,
            no_analysis,
            export,
        } => {
            let description = match (description, description_file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("unable to read {}", path.display()))?,
                (None, None) => String::new(),
            };

            let query = Query::new(description)
                .with_top_n(top_n as usize)
                .with_analysis(!no_analysis);

            let mut console = MatchConsole::new(service, config);
            if let Err(error) = console.submit(query).await.map(|_| ()) {
                anyhow::bail!(error.display_message());
            }
            print_results(&console);

            if let Some(path) = export {
                let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE_NAME));
                console.export_to(&path).await?;
                println!("results written to {}", path.display());
            }
        }
        Command::Console => {
            let mut console = MatchConsole::new(service, config);
            interactive::run(&mut console).await?;
        }
        Command::Health => {
            let banner = service.health().await?;
            println!("{} is up: {banner}", service.config().base_url);
        }
        Command::Fetch { file_name, output } => {
            let bytes = service.fetch_resume(&file_name).await?;
            tokio::fs::write(&output, &bytes)
                .await
                .with_context(|| format!("unable to write {}", output.display()))?;
            println!("{} bytes written to {}", bytes.len(), output.display());
        }
    }

    Ok(())
}

pub(crate) fn print_results<S>(console: &MatchConsole<S>)
where
    S: RankingService + Send + Sync,
{
    let Some(result_set) = console.result_set() else {
        println!("Results will appear here after analysis...");
        return;
    };

    println!(
        "Top {} Matches (ranked at {})",
        console.query().top_n,
        result_set.received_at().with_timezone(&Local).format("%H:%M:%S")
    );
    if result_set.visible().is_empty() {
        println!("no resumes were ranked");
    } else {
        println!("{}", render_candidates(result_set, console.service()));
    }

    if let Some(analysis) = result_set.analysis() {
        println!("\nCandidate Summary");
        println!("{}", render_analysis(analysis));
    }
}
