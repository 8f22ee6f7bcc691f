//! Pipeline entry points.
//!
//! - `scan`: probe every city × category combination for new listings
//! - `report`: render new listings into a PDF
//! - `notify`: mail the report
//! - `archive`: upload the report to remote storage
//! - `run_pipeline`: all of the above, in order

pub mod archive;
pub mod notify;
pub mod report;
pub mod run;
pub mod scan;

pub use archive::{Archiver, archiver_from_config};
pub use notify::{MailCredentials, Notifier, SmtpNotifier};
pub use report::{PdfReportRenderer, ReportRenderer};
pub use run::{Discovery, DiscoveryRun, ReportSteps, RunOutcome, run_pipeline};
pub use scan::{ScanStats, scan};
