//! End-to-end harness operations shared by the CLI and integration tests.
//!
//! Every layer keeps its own error type; this module folds them into the
//! unified [`occ_common::Error`] so callers get stable codes and remediation.

use crate::engine::{evaluate, EngineError, EngineParams, Evaluation, RunSummary};
use crate::ledger::{load_ledger, Ledger, LedgerError, LoadOptions};
use crate::logging::{event_names, LogContext, Stage};
use crate::output::{
    render_timeseries, write_outputs, Diagnostics, OutputError, RunContext, WrittenOutputs,
};
use occ_bundle::{SubmissionManifest, SubmissionReader, VerificationReport};
use occ_common::{Error, Result, RunId};
use occ_config::ResolvedConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info_span;

impl From<LedgerError> for Error {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Io { source, .. } => Error::Io(source),
            LedgerError::Csv { row, message } => Error::MalformedLedger { row, message },
            LedgerError::MissingColumn(column) => Error::MissingColumn(column),
            LedgerError::EmptyField { row, field } => Error::MalformedLedger {
                row,
                message: format!("required field '{}' is empty", field),
            },
            LedgerError::BadTimestamp { row, value } => Error::MalformedLedger {
                row,
                message: format!("cannot parse timestamp {:?}", value),
            },
            LedgerError::UnknownEventType { row, value } => Error::MalformedLedger {
                row,
                message: format!("unknown event type {:?}", value),
            },
        }
    }
}

impl From<EngineError> for Error {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidParameter { name, message } => Error::InvalidParameter {
                name: name.to_string(),
                message,
            },
            EngineError::UnsortedInput { index, current, .. } => Error::UnsortedInput {
                index,
                timestamp: current.to_rfc3339(),
            },
        }
    }
}

impl From<OutputError> for Error {
    fn from(err: OutputError) -> Self {
        match err {
            OutputError::Io { source, .. } => Error::Io(source),
            OutputError::Csv(e) => Error::Io(e.into()),
            OutputError::Json(e) => Error::Json(e),
            OutputError::Bundle(e) => e.into(),
        }
    }
}

/// Inputs for a full run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub ledger_path: PathBuf,
    pub output_dir: PathBuf,
    pub config: ResolvedConfig,
    /// Create `submission.zip` in addition to the loose files.
    pub archive: bool,
}

/// What a full run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub n_events: usize,
    pub unrecognized_events: usize,
    pub summary: RunSummary,
    pub outputs: WrittenOutputs,
}

impl RunReport {
    pub fn has_violations(&self) -> bool {
        self.summary.violation_count > 0
    }
}

/// Engine parameters from the effective configuration.
pub fn engine_params(config: &ResolvedConfig) -> EngineParams {
    EngineParams::new(config.config.horizon_days, config.config.window_days)
}

/// Load the ledger named by `path` using the configured event-type policy.
pub fn load(path: &Path, config: &ResolvedConfig) -> Result<Ledger> {
    let options = LoadOptions {
        unknown_event_types: config.config.unknown_event_types,
    };
    Ok(load_ledger(path, &options)?)
}

/// Load a ledger and run the engine over it, writing nothing.
pub fn load_and_evaluate(path: &Path, config: &ResolvedConfig) -> Result<(Ledger, Evaluation)> {
    let params = engine_params(config);
    params.validate()?;
    let ledger = load(path, config)?;
    let evaluation = evaluate(&ledger.events, &params)?;
    Ok((ledger, evaluation))
}

/// Run the whole harness: load, evaluate, write, and package.
pub fn run(request: &RunRequest) -> Result<RunReport> {
    let run_id = RunId::new();
    let harness = &request.config.config;
    let ctx = LogContext::new(run_id.as_str(), harness.boundary.as_str());
    let span = info_span!("run", run_id = %run_id);
    let _guard = span.enter();

    crate::log_event!(
        ctx,
        INFO,
        event_names::RUN_STARTED,
        Stage::Init,
        "Starting harness run",
        ledger = request.ledger_path.display().to_string()
    );
    crate::log_event!(
        ctx,
        INFO,
        event_names::CONFIG_LOADED,
        Stage::Init,
        "Configuration resolved",
        source = request.config.source.as_str(),
        horizon_days = harness.horizon_days,
        window_days = harness.window_days,
        file_hash = request.config.file_hash.as_deref().unwrap_or("")
    );

    let (ledger, evaluation) = load_and_evaluate(&request.ledger_path, &request.config)?;
    crate::log_event!(
        ctx,
        INFO,
        event_names::LEDGER_LOADED,
        Stage::Load,
        "Ledger loaded",
        events = ledger.len() as u64,
        items = ledger.item_count() as u64,
        unrecognized = ledger.unrecognized as u64
    );

    let summary = &evaluation.summary;
    crate::log_event!(
        ctx,
        INFO,
        event_names::ENGINE_FINISHED,
        Stage::Aggregate,
        "Engine finished",
        days = summary.n_days as u64,
        max_backlog = summary.max_backlog,
        unobservable_days = summary.unobservable_days as u64
    );
    for violation in &evaluation.violations {
        crate::log_event!(
            ctx,
            WARN,
            event_names::INVARIANT_VIOLATION,
            Stage::Check,
            "Closure identity violated",
            date = violation.date.to_string(),
            attempts = violation.attempts,
            stuck = violation.stuck,
            bounced = violation.bounced
        );
    }

    let timeseries = render_timeseries(
        &evaluation.records,
        harness.horizon_days,
        harness.window_days,
    )
    .map_err(OutputError::from)?;
    let diagnostics = Diagnostics::build(
        &evaluation,
        RunContext {
            run_id: run_id.as_str(),
            ledger_path: &request.ledger_path,
            n_events: ledger.len(),
            unrecognized_events: ledger.unrecognized,
            config: request.config.snapshot(),
        },
    );
    let manifest = SubmissionManifest::new(
        run_id.as_str(),
        harness.boundary.as_str(),
        harness.standard.as_str(),
        harness.horizon_days,
        harness.window_days,
    )
    .with_tool_version(env!("CARGO_PKG_VERSION"));

    let outputs = write_outputs(
        &request.output_dir,
        manifest,
        timeseries,
        &diagnostics,
        request.archive,
    )?;
    crate::log_event!(
        ctx,
        INFO,
        event_names::OUTPUT_WRITTEN,
        Stage::Write,
        "Outputs written",
        output_dir = outputs.output_dir.display().to_string()
    );
    if let Some(archive) = &outputs.archive {
        crate::log_event!(
            ctx,
            INFO,
            event_names::PACKAGE_WRITTEN,
            Stage::Bundle,
            "Submission package written",
            path = archive.display().to_string(),
            files = outputs.submission.file_count() as u64
        );
    }

    let report = RunReport {
        run_id: run_id.to_string(),
        n_events: ledger.len(),
        unrecognized_events: ledger.unrecognized,
        summary: evaluation.summary,
        outputs,
    };
    crate::log_event!(
        ctx,
        INFO,
        event_names::RUN_FINISHED,
        Stage::Init,
        "Harness run finished",
        violations = report.summary.violation_count as u64
    );

    Ok(report)
}

/// Verify every file a submission package lists.
pub fn verify_submission(path: &Path) -> Result<(SubmissionManifest, VerificationReport)> {
    let mut reader = SubmissionReader::open(path)?;
    let report = reader.verify_all();
    let manifest = reader.manifest().clone();

    let ctx = LogContext::new(manifest.run_id.as_str(), manifest.boundary.as_str());
    crate::log_event!(
        ctx,
        INFO,
        event_names::VERIFY_RESULT,
        Stage::Verify,
        "Submission verified",
        clean = report.is_clean(),
        verified = report.verified.len() as u64,
        failures = report.failures.len() as u64
    );

    Ok((manifest, report))
}
