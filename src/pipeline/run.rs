// src/pipeline/run.rs

//! End-to-end run: scan, persist, then render → notify → archive.
//!
//! The seen-set is persisted right after the scan. A later failure in the
//! report steps does not roll it back, so those entries are not reported
//! again on the next run.

use std::path::PathBuf;

use crate::error::Result;
use crate::models::{DiscoveryEntry, SeenSet};
use crate::pipeline::scan::{ScanStats, scan};
use crate::pipeline::{Archiver, Notifier, ReportRenderer};
use crate::services::{CategorySource, Prober};
use crate::storage::SeenStore;

/// Collaborators needed to find new combinations.
pub struct Discovery<'a> {
    pub cities: &'a [String],
    pub categories: &'a dyn CategorySource,
    pub prober: &'a dyn Prober,
    pub store: &'a dyn SeenStore,
}

/// Result of a scan that has not been persisted yet.
#[derive(Debug, Clone)]
pub struct DiscoveryRun {
    pub entries: Vec<DiscoveryEntry>,
    /// Seen-set grown by every new entry
    pub seen: SeenSet,
    pub stats: ScanStats,
}

impl Discovery<'_> {
    /// Load the seen-set, fetch categories and scan. Nothing is saved.
    ///
    /// A category fetch failure aborts before any probe is issued.
    pub async fn discover(&self) -> Result<DiscoveryRun> {
        let mut seen = self.store.load().await?;
        log::info!("{} combinations already seen", seen.len());

        let categories = self.categories.fetch_categories().await?;
        log::info!(
            "Probing {} cities x {} categories",
            self.cities.len(),
            categories.len()
        );

        let (entries, stats) = scan(self.cities, &categories, self.prober, &mut seen).await;

        Ok(DiscoveryRun {
            entries,
            seen,
            stats,
        })
    }
}

/// Output steps of the report path, run in order.
pub struct ReportSteps<'a> {
    pub renderer: &'a dyn ReportRenderer,
    pub notifier: &'a dyn Notifier,
    pub archiver: &'a dyn Archiver,
}

/// Terminal state of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing new; no report produced
    NoChanges,
    /// A report was rendered, mailed and archived
    Reported {
        entries: Vec<DiscoveryEntry>,
        report: PathBuf,
    },
}

/// Run the full pipeline once.
pub async fn run_pipeline(
    discovery: &Discovery<'_>,
    steps: &ReportSteps<'_>,
) -> Result<RunOutcome> {
    log::info!("[1/4] Scanning for new combinations");
    let run = discovery.discover().await?;
    discovery.store.save(&run.seen).await?;

    if run.entries.is_empty() {
        log::info!("No new combinations; nothing to report");
        return Ok(RunOutcome::NoChanges);
    }

    log::info!("[2/4] Rendering report ({} entries)", run.entries.len());
    let report = steps.renderer.render(&run.entries)?;

    log::info!("[3/4] Mailing report");
    steps.notifier.notify(&report).await?;

    log::info!("[4/4] Archiving report");
    steps.archiver.archive(&report).await?;

    log::info!("Run complete: {} new combinations reported", run.entries.len());
    Ok(RunOutcome::Reported {
        entries: run.entries,
        report,
    })
}
