//! Cortisol CLI - Command-line host for the simulated cortisol sensor
//!
//! Commands:
//! - read: Take one reading
//! - stream: Emit readings at a fixed interval (NDJSON)
//! - recommend: Print guidance for a cortisol level
//! - run: Serve NDJSON requests from stdin against one monitor
//! - config: Print the effective sensor configuration
//! - doctor: Diagnose configuration and simulation health

use chrono::Timelike;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use synheart_cortisol::{
    CalibrationParameters, CortisolMonitor, FixedClock, RecommendationEngine, Sensor, SensorConfig,
    SensorError, SilentNoise, CORTISOL_VERSION, PRODUCER_NAME,
};

/// Cortisol - Simulated wearable cortisol sensor
#[derive(Parser)]
#[command(name = "cortisol")]
#[command(author = "Synheart AI Inc")]
#[command(version = CORTISOL_VERSION)]
#[command(about = "Simulate cortisol readings and tiered guidance", long_about = None)]
struct Cli {
    /// Sensor config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed the noise generator for reproducible readings
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Disable circadian variation and measurement noise
    #[arg(long, global = true)]
    silent: bool,

    /// Pretty-print JSON output (default when stdout is a terminal)
    #[arg(long, global = true)]
    pretty: bool,

    /// Log at debug level to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take one reading
    Read {
        /// Local time of day to read at (HH:MM); defaults to now
        #[arg(long)]
        at: Option<String>,
    },

    /// Emit readings at a fixed interval as NDJSON
    Stream {
        /// Number of readings
        #[arg(short = 'n', long, default_value = "60")]
        count: usize,

        /// Delay between readings in milliseconds
        #[arg(long, default_value = "1000")]
        interval_ms: u64,
    },

    /// Print guidance for a cortisol level (ng/mL)
    Recommend {
        level: f64,
    },

    /// Serve NDJSON requests from stdin (read, override, reset, mode)
    Run {
        /// Buffer responses instead of flushing after each one
        #[arg(long)]
        no_flush: bool,
    },

    /// Print the effective sensor configuration
    Config,

    /// Diagnose configuration and simulation health
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

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

fn init_logging(verbose: bool, json: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: Cli) -> Result<(), CortisolCliError> {
    let config = load_config(cli.config.as_deref(), cli.seed, cli.silent)?;
    let pretty = cli.pretty || atty::is(atty::Stream::Stdout);

    match cli.command {
        Commands::Read { at } => cmd_read(&config, at.as_deref(), pretty),
        Commands::Stream { count, interval_ms } => cmd_stream(&config, count, interval_ms),
        Commands::Recommend { level } => cmd_recommend(level, pretty),
        Commands::Run { no_flush } => cmd_run(&config, !no_flush),
        Commands::Config => print_json(&config, true),
        Commands::Doctor { json } => cmd_doctor(cli.config.as_deref(), &config, json),
    }
}

fn load_config(
    path: Option<&Path>,
    seed: Option<u64>,
    silent: bool,
) -> Result<SensorConfig, CortisolCliError> {
    let mut config = match path {
        Some(path) => SensorConfig::from_json(&fs::read_to_string(path)?)?,
        None => SensorConfig::default(),
    };
    if seed.is_some() {
        config.noise_seed = seed;
    }
    if silent {
        config.disable_noise = true;
    }
    Ok(config)
}

fn cmd_read(config: &SensorConfig, at: Option<&str>, pretty: bool) -> Result<(), CortisolCliError> {
    let monitor = CortisolMonitor::from_config(config)?;
    let reading = match at {
        Some(at) => {
            let time = chrono::NaiveTime::parse_from_str(at, "%H:%M")
                .map_err(|_| CortisolCliError::InvalidTime(at.to_string()))?;
            let now: chrono::DateTime<chrono::FixedOffset> = chrono::Local::now().into();
            let instant = now
                .with_hour(time.hour())
                .and_then(|t| t.with_minute(time.minute()))
                .and_then(|t| t.with_second(0))
                .ok_or_else(|| CortisolCliError::InvalidTime(at.to_string()))?;
            monitor.current_reading_at(instant)
        }
        None => monitor.current_reading(),
    };
    print_json(&reading, pretty)
}

fn cmd_stream(
    config: &SensorConfig,
    count: usize,
    interval_ms: u64,
) -> Result<(), CortisolCliError> {
    let monitor = CortisolMonitor::from_config(config)?;
    let mut stdout = io::stdout();

    for i in 0..count {
        if i > 0 {
            thread::sleep(Duration::from_millis(interval_ms));
        }
        let reading = monitor.current_reading();
        writeln!(stdout, "{}", serde_json::to_string(&reading)?)?;
        stdout.flush()?;
    }

    Ok(())
}

fn cmd_recommend(level: f64, pretty: bool) -> Result<(), CortisolCliError> {
    if !RecommendationEngine::is_valid_level(level) {
        return Err(CortisolCliError::InvalidLevel(level));
    }
    print_json(&RecommendationEngine::recommend(level), pretty)
}

/// Operation selector for `run` requests
#[derive(serde::Deserialize)]
struct RunRequest {
    op: String,
}

fn cmd_run(config: &SensorConfig, flush: bool) -> Result<(), CortisolCliError> {
    let monitor = CortisolMonitor::from_config(config)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let response = handle_request(&monitor, trimmed);
        writeln!(stdout, "{}", response)?;
        if flush {
            stdout.flush()?;
        }
    }

    stdout.flush()?;
    Ok(())
}

/// Answer one request line; failures become an `error` object on that line
fn handle_request(monitor: &CortisolMonitor, line: &str) -> String {
    let request: RunRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => return error_line("BAD_REQUEST", &format!("Failed to parse request: {}", e)),
    };

    let result = match request.op.as_str() {
        "read" => serde_json::to_string(&monitor.current_reading()).map_err(SensorError::from),
        "override" => monitor.submit_override_to_json(line),
        "reset" => serde_json::to_string(&monitor.reset_to_automatic()).map_err(SensorError::from),
        "mode" => serde_json::to_string(&serde_json::json!({ "mode": monitor.mode() }))
            .map_err(SensorError::from),
        other => return error_line("UNKNOWN_OP", &format!("Unknown op: {}", other)),
    };

    match result {
        Ok(json) => json,
        Err(e) if e.is_validation() => error_line("VALIDATION_ERROR", &e.public_message()),
        Err(e) => {
            tracing::error!(error = %e, "request failed");
            error_line("UNEXPECTED_ERROR", &e.public_message())
        }
    }
}

fn error_line(code: &str, message: &str) -> String {
    serde_json::json!({ "error": { "code": code, "message": message } }).to_string()
}

fn cmd_doctor(
    config_path: Option<&Path>,
    config: &SensorConfig,
    json: bool,
) -> Result<(), CortisolCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{} {}", PRODUCER_NAME, CORTISOL_VERSION),
    });

    let config_check = match config_path {
        Some(path) => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!("Config {} valid", path.display()),
        },
        None => DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "No config file given, using defaults".to_string(),
        },
    };
    checks.push(config_check);

    if config.calibration != CalibrationParameters::default() {
        checks.push(DoctorCheck {
            name: "calibration".to_string(),
            status: CheckStatus::Warning,
            message: format!(
                "Custom calibration: gain {}, factor {}, offset {}",
                config.calibration.gain,
                config.calibration.calibration_factor,
                config.calibration.calibration_offset
            ),
        });
    }

    checks.push(simulation_check());

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: CORTISOL_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Cortisol Doctor Report");
        println!("======================");
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

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(CortisolCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// Noise-free readings at 07:00 and 19:00 must hit the curve extremes
fn simulation_check() -> DoctorCheck {
    let probe = |hour: u32| -> Option<f64> {
        let clock = FixedClock::at_hms(hour, 0, 0)?;
        let sensor = Sensor::new(CalibrationParameters::default(), Box::new(SilentNoise));
        let monitor = CortisolMonitor::with_components(sensor, Box::new(clock));
        Some(monitor.current_reading().value)
    };

    match (probe(7), probe(19)) {
        (Some(peak), Some(trough)) if peak == 18.0 && trough == 2.0 => DoctorCheck {
            name: "simulation".to_string(),
            status: CheckStatus::Ok,
            message: "Circadian peak 18.00 and trough 2.00 ng/mL".to_string(),
        },
        (peak, trough) => DoctorCheck {
            name: "simulation".to_string(),
            status: CheckStatus::Error,
            message: format!("Unexpected extremes: peak {:?}, trough {:?}", peak, trough),
        },
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), CortisolCliError> {
    let output = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", output);
    Ok(())
}

#[derive(Debug)]
enum CortisolCliError {
    Io(io::Error),
    Sensor(SensorError),
    Json(serde_json::Error),
    InvalidTime(String),
    InvalidLevel(f64),
    DoctorFailed,
}

impl From<io::Error> for CortisolCliError {
    fn from(e: io::Error) -> Self {
        CortisolCliError::Io(e)
    }
}

impl From<SensorError> for CortisolCliError {
    fn from(e: SensorError) -> Self {
        CortisolCliError::Sensor(e)
    }
}

impl From<serde_json::Error> for CortisolCliError {
    fn from(e: serde_json::Error) -> Self {
        CortisolCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CortisolCliError> for CliError {
    fn from(e: CortisolCliError) -> Self {
        match e {
            CortisolCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CortisolCliError::Sensor(e) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'cortisol config' to see the expected shape".to_string()),
            },
            CortisolCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            CortisolCliError::InvalidTime(at) => CliError {
                code: "INVALID_TIME".to_string(),
                message: format!("Invalid time of day: {}", at),
                hint: Some("Use 24-hour HH:MM, e.g. 07:30".to_string()),
            },
            CortisolCliError::InvalidLevel(level) => CliError {
                code: "INVALID_LEVEL".to_string(),
                message: format!("Invalid cortisol level: {}", level),
                hint: Some("Pass a non-negative number in ng/mL".to_string()),
            },
            CortisolCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

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
