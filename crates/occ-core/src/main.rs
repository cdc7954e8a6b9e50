//! OCC harness - closure metrics from an item lifecycle ledger
//!
//! The main entry point for `occ`, handling:
//! - Full runs: ledger → engine → timeseries, diagnostics, submission package
//! - Ledger and configuration checks without writing outputs
//! - Submission package verification
//! - Configuration and schema inspection

use clap::{Args, Parser, Subcommand};
use occ_common::{format_error_human, Error, OutputFormat, RunId, StructuredError, SCHEMA_VERSION};
use occ_config::{load_config, ConfigOptions, ConfigOverrides, ResolvedConfig, UnknownEventPolicy};
use occ_core::exit_codes::ExitCode;
use occ_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use occ_core::pipeline::{self, RunRequest};
use occ_core::schema::{available_schemas, generate_all_schemas, generate_schema};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// OCC harness - daily closure metrics and submission packages
#[derive(Parser)]
#[command(name = "occ")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to harness.json (otherwise OCC_CONFIG, OCC_CONFIG_DIR, XDG, /etc)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "json")]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Log format on stderr
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a ledger, compute daily metrics, write outputs and the submission package
    Run(RunArgs),

    /// Load and validate a ledger and the configuration without writing anything
    Check(CheckArgs),

    /// Verify the checksums of a submission package
    Verify(VerifyArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Print JSON Schema for output types
    Schema(SchemaArgs),

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

/// Overrides shared by commands that evaluate a ledger.
#[derive(Args, Debug, Default)]
struct ParamArgs {
    /// Horizon T in days
    #[arg(long)]
    horizon_days: Option<i64>,

    /// Trailing window W in days
    #[arg(long)]
    window_days: Option<i64>,

    /// Declared accounting boundary
    #[arg(long)]
    boundary: Option<String>,

    /// Policy for unrecognized event types (retain, reject)
    #[arg(long)]
    unknown_event_types: Option<UnknownEventPolicy>,
}

impl ParamArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            horizon_days: self.horizon_days,
            window_days: self.window_days,
            boundary: self.boundary.clone(),
            unknown_event_types: self.unknown_event_types,
        }
    }
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Ledger CSV (item_id, event_type, timestamp)
    #[arg(long)]
    ledger: PathBuf,

    /// Directory for timeseries.csv, diagnostics.json and the package
    #[arg(long)]
    output_dir: PathBuf,

    /// Write loose files and the manifest only, no submission.zip
    #[arg(long)]
    no_archive: bool,

    #[command(flatten)]
    params: ParamArgs,
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Ledger CSV to validate
    #[arg(long)]
    ledger: PathBuf,

    #[command(flatten)]
    params: ParamArgs,
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// Path to submission.zip
    path: PathBuf,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration and where it came from
    Show,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Type name (see --list)
    name: Option<String>,

    /// List available schema types
    #[arg(long, conflicts_with = "name")]
    list: bool,

    /// Emit every schema keyed by type name
    #[arg(long, conflicts_with_all = ["name", "list"])]
    all: bool,
}

fn main() {
    let cli = Cli::parse();

    let cli_level = LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet);
    init_logging(&LogConfig::from_env(cli_level, cli.global.log_format));

    let exit_code = match cli.command {
        None | Some(Commands::Version) => {
            print_version(&cli.global);
            ExitCode::Clean
        }
        Some(Commands::Run(args)) => run_run(&cli.global, &args),
        Some(Commands::Check(args)) => run_check(&cli.global, &args),
        Some(Commands::Verify(args)) => run_verify(&cli.global, &args),
        Some(Commands::Config(args)) => match args.command {
            ConfigCommands::Show => run_config_show(&cli.global),
        },
        Some(Commands::Schema(args)) => run_schema(&cli.global, &args),
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn resolve(global: &GlobalOpts, params: &ParamArgs) -> Result<ResolvedConfig, Error> {
    let options = ConfigOptions {
        config_path: global.config.clone(),
        overrides: params.overrides(),
    };
    Ok(load_config(&options)?)
}

fn run_run(global: &GlobalOpts, args: &RunArgs) -> ExitCode {
    let config = match resolve(global, &args.params) {
        Ok(c) => c,
        Err(e) => return output_error(global, &e),
    };

    let request = RunRequest {
        ledger_path: args.ledger.clone(),
        output_dir: args.output_dir.clone(),
        config,
        archive: !args.no_archive,
    };
    let report = match pipeline::run(&request) {
        Ok(r) => r,
        Err(e) => return output_error(global, &e),
    };

    let exit_code = if report.has_violations() {
        ExitCode::ViolationsRecorded
    } else {
        ExitCode::Clean
    };
    let summary = &report.summary;

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": report.run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": exit_code.code_name(),
                "events": report.n_events,
                "unrecognized_events": report.unrecognized_events,
                "summary": summary,
                "regime_classification": summary.regime_label(),
                "outputs": &report.outputs,
            });
            print_json(&response);
        }
        OutputFormat::Summary => {
            println!(
                "[{}] run: {} days, {} arrivals, {} attempts, max backlog {}, {} violations, regime={}",
                report.run_id,
                summary.n_days,
                summary.total_arrivals,
                summary.total_attempts,
                summary.max_backlog,
                summary.violation_count,
                display_regime(summary.regime_label()),
            );
        }
        OutputFormat::Md => {
            println!("# occ run");
            println!();
            println!("Run: {}", report.run_id);
            println!("Output directory: {}", report.outputs.output_dir.display());
            println!();
            println!("| metric | value |");
            println!("|---|---|");
            println!("| days | {} |", summary.n_days);
            println!("| events | {} |", report.n_events);
            println!("| arrivals | {} |", summary.total_arrivals);
            println!("| attempts | {} |", summary.total_attempts);
            println!("| stuck | {} |", summary.total_stuck);
            println!("| bounced | {} |", summary.total_bounced);
            println!("| max backlog | {} |", summary.max_backlog);
            println!("| unobservable days | {} |", summary.unobservable_days);
            println!("| invariant violations | {} |", summary.violation_count);
            println!("| regime | {} |", display_regime(summary.regime_label()));
        }
    }

    exit_code
}

fn run_check(global: &GlobalOpts, args: &CheckArgs) -> ExitCode {
    let run_id = RunId::new();
    let config = match resolve(global, &args.params) {
        Ok(c) => c,
        Err(e) => return output_error(global, &e),
    };
    let (ledger, evaluation) = match pipeline::load_and_evaluate(&args.ledger, &config) {
        Ok(result) => result,
        Err(e) => return output_error(global, &e),
    };

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": run_id.as_str(),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": "valid",
                "ledger": {
                    "path": args.ledger.display().to_string(),
                    "events": ledger.len(),
                    "items": ledger.item_count(),
                    "unrecognized_events": ledger.unrecognized,
                },
                "days": evaluation.summary.n_days,
                "config_source": config.source.as_str(),
            });
            print_json(&response);
        }
        OutputFormat::Summary => {
            println!(
                "[{}] check: OK ({} events, {} items, {} days)",
                run_id,
                ledger.len(),
                ledger.item_count(),
                evaluation.summary.n_days
            );
        }
        OutputFormat::Md => {
            println!("# Ledger Check");
            println!();
            println!("Status: valid");
            println!("Ledger: {}", args.ledger.display());
            println!("Events: {}", ledger.len());
            println!("Items: {}", ledger.item_count());
            println!("Unrecognized events: {}", ledger.unrecognized);
            println!("Days: {}", evaluation.summary.n_days);
        }
    }

    ExitCode::Clean
}

fn run_verify(global: &GlobalOpts, args: &VerifyArgs) -> ExitCode {
    let (manifest, report) = match pipeline::verify_submission(&args.path) {
        Ok(result) => result,
        Err(e) => return output_error(global, &e),
    };
    let exit_code = if report.is_clean() {
        ExitCode::Clean
    } else {
        ExitCode::VerificationFailed
    };

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": manifest.run_id,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": if report.is_clean() { "verified" } else { "failed" },
                "path": args.path.display().to_string(),
                "boundary": manifest.boundary,
                "standard": manifest.standard,
                "report": &report,
            });
            print_json(&response);
        }
        OutputFormat::Summary => {
            println!(
                "[{}] verify: {} ({} verified, {} failed, {} unlisted)",
                manifest.run_id,
                if report.is_clean() { "OK" } else { "FAILED" },
                report.verified.len(),
                report.failures.len(),
                report.unlisted.len()
            );
        }
        OutputFormat::Md => {
            println!("# Submission Verification");
            println!();
            println!("Package: {}", args.path.display());
            println!("Run: {}", manifest.run_id);
            println!();
            for path in &report.verified {
                println!("- ok: {}", path);
            }
            for failure in &report.failures {
                println!("- FAILED: {} ({})", failure.path, failure.reason);
            }
            for path in &report.unlisted {
                println!("- unlisted: {}", path);
            }
        }
    }

    exit_code
}

fn run_config_show(global: &GlobalOpts) -> ExitCode {
    let run_id = RunId::new();
    let config = match resolve(global, &ParamArgs::default()) {
        Ok(c) => c,
        Err(e) => return output_error(global, &e),
    };
    let snapshot = config.snapshot();

    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "run_id": run_id.as_str(),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "source": {
                    "kind": config.source.as_str(),
                    "path": config.path.as_ref().map(|p| p.display().to_string()),
                    "hash": &config.file_hash,
                    "using_defaults": config.path.is_none(),
                },
                "effective_hash": &snapshot.effective_hash,
                "values": &config.config,
            });
            print_json(&response);
        }
        OutputFormat::Summary => {
            let source = display_source(config.path.as_deref());
            println!(
                "[{}] config: source={} horizon_days={} window_days={} boundary={}",
                run_id,
                source,
                config.config.horizon_days,
                config.config.window_days,
                config.config.boundary
            );
        }
        OutputFormat::Md => {
            println!("# occ config show");
            println!();
            match config.path {
                Some(ref path) => {
                    println!("Source: {} ({})", path.display(), config.source);
                    println!("Hash: {}", config.file_hash.as_deref().unwrap_or("n/a"));
                }
                None => println!("Source: **built-in defaults** (no harness.json found)"),
            }
            println!();
            println!("| key | value |");
            println!("|---|---|");
            println!("| horizon_days | {} |", config.config.horizon_days);
            println!("| window_days | {} |", config.config.window_days);
            println!("| boundary | {} |", config.config.boundary);
            println!("| standard | {} |", config.config.standard);
            println!(
                "| unknown_event_types | {} |",
                config.config.unknown_event_types
            );
        }
    }

    ExitCode::Clean
}

fn run_schema(global: &GlobalOpts, args: &SchemaArgs) -> ExitCode {
    if args.all {
        print_json(&generate_all_schemas());
        return ExitCode::Clean;
    }

    match args.name.as_deref() {
        Some(name) if !args.list => match generate_schema(name) {
            Some(schema) => {
                print_json(&schema);
                ExitCode::Clean
            }
            None => {
                let err = Error::InvalidParameter {
                    name: "schema".to_string(),
                    message: format!("unknown type '{}' (see `occ schema --list`)", name),
                };
                report_error(global, &err, ExitCode::ArgsError)
            }
        },
        _ => {
            let schemas = available_schemas();
            match global.format {
                OutputFormat::Json => {
                    let list: Vec<_> = schemas
                        .iter()
                        .map(|(name, description)| {
                            serde_json::json!({ "name": name, "description": description })
                        })
                        .collect();
                    print_json(&serde_json::json!({
                        "schema_version": SCHEMA_VERSION,
                        "schemas": list,
                    }));
                }
                _ => {
                    for (name, description) in schemas {
                        println!("{:<20} {}", name, description);
                    }
                }
            }
            ExitCode::Clean
        }
    }
}

// ============================================================================
// Output helpers
// ============================================================================

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize output: {}", e),
    }
}

fn display_regime(label: &str) -> &str {
    if label.is_empty() {
        "n/a"
    } else {
        label
    }
}

fn display_source(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string())
}

/// Report an error on stderr in the selected format and map it to an exit code.
fn output_error(global: &GlobalOpts, error: &Error) -> ExitCode {
    report_error(global, error, ExitCode::for_error(error))
}

fn report_error(global: &GlobalOpts, error: &Error, exit_code: ExitCode) -> ExitCode {
    match global.format {
        OutputFormat::Json => {
            let response = serde_json::json!({
                "schema_version": SCHEMA_VERSION,
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "status": "error",
                "exit_code": exit_code.code_name(),
                "error": StructuredError::from(error),
            });
            match serde_json::to_string_pretty(&response) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("{}", StructuredError::from(error).to_json()),
            }
        }
        OutputFormat::Summary => {
            eprintln!("[{}] error {}: {}", exit_code.code_name(), error.code(), error);
        }
        OutputFormat::Md => {
            eprintln!("{}", format_error_human(error, std::io::stderr().is_terminal()));
        }
    }

    exit_code
}

fn print_version(global: &GlobalOpts) {
    let version_info = serde_json::json!({
        "schema_version": SCHEMA_VERSION,
        "occ_version": env!("CARGO_PKG_VERSION"),
        "rust_version": env!("CARGO_PKG_RUST_VERSION"),
    });

    match global.format {
        OutputFormat::Json => print_json(&version_info),
        _ => {
            println!("occ {}", env!("CARGO_PKG_VERSION"));
            println!("schema version: {}", SCHEMA_VERSION);
        }
    }
}
