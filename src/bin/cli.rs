//! Booksy Tracker CLI
//!
//! Local execution entry point, meant to be run from a scheduler.

use std::path::PathBuf;

use booksy_tracker::{
    error::Result,
    models::{ArchiveBackend, Config},
    pipeline::{
        self, Discovery, MailCredentials, PdfReportRenderer, ReportSteps, RunOutcome, SmtpNotifier,
    },
    services::{HttpCategorySource, HttpProber},
    storage::{JsonSeenStore, SeenStore, drive::DriveCredentials},
    utils::http,
};
use clap::{Parser, Subcommand};

/// Booksy Tracker - reports newly opened city/category listings
#[derive(Parser, Debug)]
#[command(
    name = "booksy-tracker",
    version,
    about = "Tracks new Booksy city/category listings"
)]
struct Cli {
    /// Path to storage directory holding config, seen-set and reports
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan, persist, then render, mail and archive a report of new listings
    Run,

    /// Scan and print new listings without saving or reporting anything
    Scan,

    /// Validate configuration and required credentials
    Validate,

    /// Show storage paths and seen-set size
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = Config::load_or_default(&config_path)?;
    log::info!("Loaded configuration from {}", cli.storage_dir.display());

    let store = JsonSeenStore::new(config.paths.seen_path(&cli.storage_dir));

    match cli.command {
        Command::Run => {
            config.validate()?;
            let client = http::create_async_client(&config.tracker)?;

            let categories = HttpCategorySource::new(client.clone(), &config.tracker.categories_url);
            let prober = HttpProber::new(
                client.clone(),
                &config.tracker.listing_base_url,
                &config.tracker.brand_token,
            );
            let discovery = Discovery {
                cities: &config.cities,
                categories: &categories,
                prober: &prober,
                store: &store,
            };

            let renderer = PdfReportRenderer::new(
                config.paths.report_path(&cli.storage_dir),
                &config.report.title,
            );
            let notifier = SmtpNotifier::new(config.mail.clone());
            let archiver = pipeline::archiver_from_config(&config.archive, &client).await?;
            let steps = ReportSteps {
                renderer: &renderer,
                notifier: &notifier,
                archiver: archiver.as_ref(),
            };

            match pipeline::run_pipeline(&discovery, &steps).await? {
                RunOutcome::NoChanges => log::info!("No new listings."),
                RunOutcome::Reported { entries, report } => log::info!(
                    "Reported {} new listings in {}",
                    entries.len(),
                    report.display()
                ),
            }
        }

        Command::Scan => {
            config.validate()?;
            let client = http::create_async_client(&config.tracker)?;

            let categories = HttpCategorySource::new(client.clone(), &config.tracker.categories_url);
            let prober = HttpProber::new(
                client,
                &config.tracker.listing_base_url,
                &config.tracker.brand_token,
            );
            let discovery = Discovery {
                cities: &config.cities,
                categories: &categories,
                prober: &prober,
                store: &store,
            };

            let run = discovery.discover().await?;
            for entry in &run.entries {
                println!("{}\t{}", entry.heading(), entry.url);
            }
            log::info!(
                "Dry run: {} new of {} live ({} probed); seen-set not saved",
                run.stats.novel,
                run.stats.live,
                run.stats.probed
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} cities)", config.cities.len());

            MailCredentials::from_env(&config.mail)?;
            log::info!("✓ Mail credentials present");

            match config.archive.backend {
                ArchiveBackend::Drive => {
                    DriveCredentials::from_env(&config.archive.drive)?;
                    log::info!("✓ Drive credentials present");
                }
                ArchiveBackend::S3 => {
                    log::info!("S3 backend uses the AWS credential chain; not checked");
                }
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            log::info!(
                "Config: {}",
                if config_path.exists() {
                    "exists"
                } else {
                    "not found (defaults)"
                }
            );
            log::info!(
                "Reports directory: {}",
                config.paths.report_path(&cli.storage_dir).display()
            );

            let seen = store.load().await?;
            log::info!(
                "Seen-set: {} combinations in {}",
                seen.len(),
                store.path().display()
            );
        }
    }

    log::info!("Done!");

    Ok(())
}
