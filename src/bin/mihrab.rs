//! Mihrab CLI - Command-line interface for the Mihrab compute core
//!
//! Commands:
//! - qibla: Resolve the Qibla bearing for an origin
//! - watch: Stream orientation events from stdin into compass frames
//! - cards: Extract navigation cards from assistant text
//! - validate: Validate orientation event schema
//! - doctor: Diagnose configuration and environment
//! - schema: Print schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use mihrab::bearing::{BearingResolver, GreatCircle, HttpBearingService, DEFAULT_SERVICE_URL};
use mihrab::config::{ConfigStore, FileStore};
use mihrab::navcard;
use mihrab::reconciler::DEFAULT_ALIGNMENT_THRESHOLD;
use mihrab::schema::{OrientationEventAdapter, SCHEMA_VERSION};
use mihrab::{CompassProcessor, MihrabError, MIHRAB_VERSION, PRODUCER_NAME};

/// Mihrab - on-device compute core for Qibla heading and prayer tooling
#[derive(Parser)]
#[command(name = "mihrab")]
#[command(version = MIHRAB_VERSION)]
#[command(about = "Qibla bearing, compass frames, and navigation cards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the Qibla bearing for an origin
    Qibla {
        /// Origin region as "<lat>,<lng>" (highest precedence)
        #[arg(long)]
        region: Option<String>,

        /// Bearing service base URL
        #[arg(long, default_value = DEFAULT_SERVICE_URL)]
        service: String,

        /// Compute the great-circle bearing locally instead of calling
        /// the service
        #[arg(long)]
        offline: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stream orientation events from stdin into compass frames (NDJSON)
    Watch {
        /// Origin region as "<lat>,<lng>"
        #[arg(long)]
        region: Option<String>,

        /// Fixed bearing in degrees; skips bearing resolution entirely
        #[arg(long)]
        bearing: Option<f64>,

        /// Bearing service base URL
        #[arg(long, default_value = DEFAULT_SERVICE_URL)]
        service: String,

        /// Compute the bearing locally instead of calling the service
        #[arg(long)]
        offline: bool,

        /// Aligned-indicator threshold in degrees
        #[arg(long, default_value_t = DEFAULT_ALIGNMENT_THRESHOLD)]
        threshold: f64,

        /// Flush output after each frame
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Extract navigation cards from assistant text
    Cards {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate orientation event schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Check a configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (compass.orientation.v1)
    Input,
    /// Output schema (compass frames)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), MihrabCliError> {
    match cli.command {
        Commands::Qibla {
            region,
            service,
            offline,
            json,
        } => cmd_qibla(region.as_deref(), &service, offline, json),

        Commands::Watch {
            region,
            bearing,
            service,
            offline,
            threshold,
            flush,
        } => cmd_watch(region.as_deref(), bearing, &service, offline, threshold, flush),

        Commands::Cards { input, json } => cmd_cards(&input, json),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),
    }
}

fn make_resolver(service: &str, offline: bool) -> BearingResolver {
    if offline {
        BearingResolver::new(Box::new(GreatCircle))
    } else {
        BearingResolver::new(Box::new(HttpBearingService::new(service)))
    }
}

fn cmd_qibla(
    region: Option<&str>,
    service: &str,
    offline: bool,
    json: bool,
) -> Result<(), MihrabCliError> {
    let resolver = make_resolver(service, offline);
    let origin = resolver.resolve_origin(region, None);
    let bearing = resolver.resolve(region, None);

    if json {
        let report = serde_json::json!({
            "producer": PRODUCER_NAME,
            "origin": { "latitude": origin.latitude, "longitude": origin.longitude },
            "bearing": bearing,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Origin:  {}", origin);
        println!("Qibla:   {}°", bearing);
    }

    Ok(())
}

fn cmd_watch(
    region: Option<&str>,
    bearing: Option<f64>,
    service: &str,
    offline: bool,
    threshold: f64,
    flush: bool,
) -> Result<(), MihrabCliError> {
    let bearing = match bearing {
        Some(b) => b,
        None => make_resolver(service, offline).resolve(region, None) as f64,
    };

    let mut processor = CompassProcessor::new().with_threshold(threshold);
    // A CLI stream is a live listener; the permission prompt is implicit
    processor.open_view();
    processor.grant_permission();
    processor.set_bearing(bearing);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let event: mihrab::OrientationEvent = serde_json::from_str(trimmed)
            .map_err(|e| MihrabCliError::ParseError(format!("Failed to parse event: {}", e)))?;

        event.validate()?;
        processor.apply(&event.sample()?);

        let frame = processor.frame();
        writeln!(stdout, "{}", serde_json::to_string(&frame)?)?;
        if flush {
            stdout.flush()?;
        }
    }

    Ok(())
}

fn cmd_cards(input: &PathBuf, json: bool) -> Result<(), MihrabCliError> {
    let text = read_input(input)?;
    let extraction = navcard::extract_cards(&text);

    if json {
        let report = serde_json::json!({
            "grammar": navcard::GRAMMAR_VERSION,
            "cards": extraction.cards,
            "malformed": extraction.malformed,
            "text": extraction.text,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Cards found: {}", extraction.cards.len());
        for card in &extraction.cards {
            println!("  - {}", serde_json::to_string(card)?);
        }
        if !extraction.malformed.is_empty() {
            println!("\nMalformed tokens (left in text):");
            for token in &extraction.malformed {
                println!("  - {}", token);
            }
        }
    }

    Ok(())
}

fn cmd_validate(
    input: &PathBuf,
    input_format: InputFormat,
    json: bool,
) -> Result<(), MihrabCliError> {
    let input_data = read_input(input)?;

    let events = match input_format {
        InputFormat::Ndjson => OrientationEventAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => OrientationEventAdapter::parse_array(&input_data)?,
    };

    let results = OrientationEventAdapter::validate_events(&events);

    let report = ValidationReport {
        total_events: events.len(),
        valid_events: events.len() - results.len(),
        invalid_events: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                event_id: r.event_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total events:   {}", report.total_events);
        println!("Valid events:   {}", report.valid_events);
        println!("Invalid events: {}", report.invalid_events);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Event {} (index {}): {}",
                    err.event_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_events > 0 {
        Err(MihrabCliError::ValidationFailed(report.invalid_events))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&std::path::Path>, json: bool) -> Result<(), MihrabCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "mihrab_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Mihrab version {}", MIHRAB_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    checks.push(DoctorCheck {
        name: "card_grammar".to_string(),
        status: CheckStatus::Ok,
        message: format!("Navigation card grammar: {}", navcard::GRAMMAR_VERSION),
    });

    if let Some(config_path) = config {
        if config_path.exists() {
            match FileStore::new(config_path).load() {
                Ok(Some(config)) => {
                    let check = match config.observances.validate() {
                        Ok(()) => DoctorCheck {
                            name: "config".to_string(),
                            status: CheckStatus::Ok,
                            message: format!(
                                "Configuration valid ({} observances, threshold {}°)",
                                config.observances.entries().len(),
                                config.alignment_threshold
                            ),
                        },
                        Err(e) => DoctorCheck {
                            name: "config".to_string(),
                            status: CheckStatus::Error,
                            message: format!("Invalid observance table: {}", e),
                        },
                    };
                    checks.push(check);
                }
                Ok(None) => {
                    checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Warning,
                        message: "Configuration file is empty".to_string(),
                    });
                }
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Cannot load configuration: {}", e),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Configuration file does not exist".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (streaming mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: MIHRAB_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Mihrab Doctor Report");
        println!("====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(MihrabCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), MihrabCliError> {
    match schema_type {
        SchemaType::Input => {
            println!("Input Schema: {}", SCHEMA_VERSION);
            println!();
            println!("One JSON object per orientation event:");
            println!();
            println!("- schema_version: \"{}\"", SCHEMA_VERSION);
            println!("- event_id: optional caller-assigned identifier");
            println!("- timestamp: RFC 3339 (UTC)");
            println!("- compass_heading: vendor absolute compass field, optional");
            println!("- alpha: generic z-axis rotation, optional");
            println!("- screen_angle: 0, 90, 180, or 270 (default 0)");
            println!();
            println!("An event with neither compass_heading nor alpha is valid and");
            println!("models a device without compass capability.");
        }
        SchemaType::Output => {
            println!("Output Schema: compass frames");
            println!();
            println!("One JSON object per frame:");
            println!();
            println!("- heading: normalized device heading, [0, 360)");
            println!("- bearing: resolved Qibla bearing, [0, 360)");
            println!("- relative: marker rotation, normalize(bearing - heading)");
            println!("- angle_diff: shortest separation, [0, 180]");
            println!("- aligned: within threshold AND permission granted");
            println!("- permission: not_requested | requesting | granted | denied");
            println!("- live_heading: whether a live sample has been applied");
            println!("- computed_at, session_id: provenance");
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &PathBuf) -> Result<String, MihrabCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

// Error types

#[derive(Debug)]
enum MihrabCliError {
    Io(io::Error),
    Core(MihrabError),
    Json(serde_json::Error),
    Validation(mihrab::schema::ValidationError),
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for MihrabCliError {
    fn from(e: io::Error) -> Self {
        MihrabCliError::Io(e)
    }
}

impl From<MihrabError> for MihrabCliError {
    fn from(e: MihrabError) -> Self {
        MihrabCliError::Core(e)
    }
}

impl From<serde_json::Error> for MihrabCliError {
    fn from(e: serde_json::Error) -> Self {
        MihrabCliError::Json(e)
    }
}

impl From<mihrab::schema::ValidationError> for MihrabCliError {
    fn from(e: mihrab::schema::ValidationError) -> Self {
        MihrabCliError::Validation(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<MihrabCliError> for CliError {
    fn from(e: MihrabCliError) -> Self {
        match e {
            MihrabCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            MihrabCliError::Core(e) => CliError {
                code: "CORE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            MihrabCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            MihrabCliError::Validation(e) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'mihrab validate' for details".to_string()),
            },
            MihrabCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} events failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            MihrabCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            MihrabCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Ensure input matches compass.orientation.v1".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_events: usize,
    valid_events: usize,
    invalid_events: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    event_id: Option<String>,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
