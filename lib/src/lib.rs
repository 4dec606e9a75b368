//! Crash report symbolication.
//!
//! Resolves the raw stack frames of parsed crash reports (instruction
//! offsets, image indices, register snapshots) into symbolized frames with
//! demangled names and inline call chains, using prebuilt per-image symbol
//! caches keyed by debug id.

pub use config::Config;
pub use error::{DirectoryBuildError, FrameError};
pub use report::{CrashReport, Frame, SymbolicatedReport, SymbolicatedThread};
pub use status::Status;
pub use symbolicator::{CacheDirectory, Symbolicator};

use futures_util::future::{try_join_all, FutureExt};
use providers::{archive::JsonArchive, DebugArchive};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime;
use tokio::task::JoinHandle;

pub mod arch;
pub mod config;
pub mod error;
pub mod instruction;
pub mod providers;
pub mod report;
pub mod status;
pub mod symbolicator;

pub struct CrashSymbolicate {
    pub status: Arc<Status>,
    config: Config,
}

/// The symbolicated form of one input report file.
#[derive(Debug, serde::Serialize)]
pub struct ReportOutput {
    /// The path the report was read from.
    pub source: String,
    #[serde(flatten)]
    pub report: SymbolicatedReport,
}

impl CrashSymbolicate {
    pub fn new(config: Config) -> Self {
        CrashSymbolicate {
            status: Arc::new(Status::new()),
            config,
        }
    }

    /// Symbolicates every configured report, invoking `output` once per
    /// report in input order.
    ///
    /// The cache directory is built up front; a directory build failure
    /// aborts the run before any report is touched. Individual reports that
    /// cannot be read or parsed are logged and skipped.
    pub fn run(
        self,
        mut output: impl FnMut(ReportOutput) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let CrashSymbolicate { status, config } = self;

        log::info!("configuration: {config:#?}");

        let mut builder = runtime::Builder::new_multi_thread();
        builder.enable_all().thread_name("crash-symbolicate");

        if let config::WorkerThreads::Exact(n) = config.worker_threads {
            builder.worker_threads(n);
        }

        builder.build()?.block_on(async move {
            let mut archives = Vec::with_capacity(config.symbols.archives.len());
            for path in &config.symbols.archives {
                archives.push(JsonArchive::open(path).map_err(DirectoryBuildError)?);
            }
            let directory = Arc::new(CacheDirectory::from_archives(
                archives.iter().map(|a| a as &dyn DebugArchive),
            )?);
            log::info!("{} symbol caches loaded", directory.len());

            status.reports.set_total(config.reports.len());

            // One task per report. Results are joined positionally below, so
            // output order matches input order no matter which task finishes
            // first.
            let mut results: Vec<JoinHandle<Option<ReportOutput>>> = Vec::new();
            for path in config.reports {
                let directory = directory.clone();
                let status = status.clone();
                results.push(tokio::spawn(async move {
                    status.reports.inc_symbolicating();
                    let outcome = symbolicate_file(&path, &directory, &status);
                    status.reports.dec_symbolicating();
                    status.reports.inc_complete();
                    match outcome {
                        Ok(v) => Some(v),
                        Err(e) => {
                            log::warn!("failed to symbolicate {}: {e:#}", path.display());
                            None
                        }
                    }
                }));
            }

            {
                let aborts = results.iter().map(|j| j.abort_handle()).collect::<Vec<_>>();
                status.cancel.on_cancel(move || {
                    aborts.into_iter().for_each(|a| a.abort());
                });
            }

            log::info!("processing {} reports", status.reports.total_count());

            // Ignore cancelled tasks
            let results = try_join_all(results.into_iter().map(|join_handle| {
                join_handle.map(|result| match result {
                    Err(e) if e.is_cancelled() => Ok(None),
                    Err(e) => Err(e),
                    Ok(v) => Ok(v),
                })
            }))
            .await?;

            for report in results.into_iter().flatten() {
                output(report)?;
            }

            Ok(())
        })
    }
}

fn symbolicate_file(
    path: &Path,
    directory: &CacheDirectory,
    status: &Status,
) -> anyhow::Result<ReportOutput> {
    use anyhow::Context;

    let data = std::fs::read(path).context("failed to read report")?;
    let report: CrashReport = serde_json::from_slice(&data).context("failed to parse report")?;

    let input_frames: usize = report.threads.iter().map(|t| t.frames.len()).sum();
    let walked = Symbolicator::new(&report, directory).symbolicate_report();
    let output_frames: usize = walked.threads.iter().map(|t| t.frames.len()).sum();
    status.frames.add(input_frames, output_frames);

    Ok(ReportOutput {
        source: path.display().to_string(),
        report: walked,
    })
}
