//! `msgcheck check | run | validate`: load inputs, run the engine, write reports.

use std::path::{Path, PathBuf};

use tracing::debug;

use msgcheck_engine::load::{parse_expectations, parse_messages};
use msgcheck_engine::{CheckConfig, CheckOptions, CheckResult, Expectation, ObservedMessage, RankingMode};

use crate::exit_codes::{EXIT_CHECK_FAILED, EXIT_INPUT, EXIT_INVALID_CONFIG, EXIT_IO};
use crate::report::{render_table, render_xml, summary_line};
use crate::CliError;

/// Where a run's results go.
#[derive(Debug, Default)]
pub struct ReportTargets {
    pub xml: Option<PathBuf>,
    pub json_file: Option<PathBuf>,
    pub json_stdout: bool,
    pub tables: bool,
}

fn check_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn read(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path)
        .map_err(|e| check_err(EXIT_IO, format!("cannot read {}: {e}", path.display())))
}

fn write(path: &Path, contents: &str) -> Result<(), CliError> {
    std::fs::write(path, contents)
        .map_err(|e| check_err(EXIT_IO, format!("cannot write {}: {e}", path.display())))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn load_inputs(expected: &Path, record: &Path) -> Result<(Vec<Expectation>, Vec<ObservedMessage>), CliError> {
    let expectations = parse_expectations(&read(expected)?)
        .map_err(|e| check_err(EXIT_INPUT, format!("{}: {e}", expected.display())))?;
    let messages = parse_messages(&read(record)?)
        .map_err(|e| check_err(EXIT_INPUT, format!("{}: {e}", record.display())))?;
    debug!(expectations = expectations.len(), messages = messages.len(), "inputs loaded");
    Ok((expectations, messages))
}

fn load_config(config_path: &Path) -> Result<CheckConfig, CliError> {
    let config_str = read(config_path)?;
    CheckConfig::from_toml(&config_str).map_err(|e| CliError {
        code: EXIT_INVALID_CONFIG,
        message: format!("{}: {e}", config_path.display()),
        hint: Some("a config needs at least name, expected and record".into()),
    })
}

/// Resolve a config-relative path against the config file's directory.
fn resolve(config_path: &Path, file: &str) -> PathBuf {
    config_path.parent().unwrap_or_else(|| Path::new(".")).join(file)
}

fn execute(
    expectations: Vec<Expectation>,
    messages: Vec<ObservedMessage>,
    options: &CheckOptions,
    targets: &ReportTargets,
) -> Result<CheckResult, CliError> {
    let result = msgcheck_engine::run(expectations, messages, options);

    if targets.tables {
        for pairing in &result.pairings {
            // stdout is reserved for the JSON document when --json is set
            if targets.json_stdout {
                eprintln!("{}", render_table(pairing));
            } else {
                println!("{}", render_table(pairing));
            }
        }
    }

    if let Some(ref path) = targets.xml {
        let xml = render_xml(&result.pairings)
            .map_err(|e| check_err(EXIT_IO, format!("XML serialization error: {e}")))?;
        write(path, &xml)?;
    }

    if targets.json_stdout || targets.json_file.is_some() {
        let json_str = serde_json::to_string_pretty(&result)
            .map_err(|e| check_err(EXIT_IO, format!("JSON serialization error: {e}")))?;
        if let Some(ref path) = targets.json_file {
            write(path, &json_str)?;
        }
        if targets.json_stdout {
            println!("{json_str}");
        }
    }

    eprintln!("{}", summary_line(&result));
    Ok(result)
}

fn verdict_exit(result: &CheckResult) -> Result<(), CliError> {
    if result.verdict.is_pass() {
        return Ok(());
    }
    let s = &result.summary;
    Err(check_err(
        EXIT_CHECK_FAILED,
        format!(
            "expectations not met ({} mismatched, {} without message)",
            s.match_error, s.match_not_found
        ),
    ))
}

pub fn cmd_check(
    expected: PathBuf,
    record: PathBuf,
    lexicographic: bool,
    targets: ReportTargets,
) -> Result<(), CliError> {
    let (expectations, messages) = load_inputs(&expected, &record)?;
    let options = CheckOptions {
        ranking: if lexicographic { RankingMode::Lexicographic } else { RankingMode::Weighted },
    };
    let result = execute(expectations, messages, &options, &targets)?;
    verdict_exit(&result)
}

pub fn cmd_run(config_path: PathBuf, json: bool, tables: bool) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let (expectations, messages) = load_inputs(
        &resolve(&config_path, &config.expected),
        &resolve(&config_path, &config.record),
    )?;

    let targets = ReportTargets {
        xml: config.output.xml.as_deref().map(|f| resolve(&config_path, f)),
        json_file: config.output.json.as_deref().map(|f| resolve(&config_path, f)),
        json_stdout: json,
        tables,
    };

    eprintln!("running '{}'", config.name);
    let result = execute(expectations, messages, &config.options(), &targets)?;
    verdict_exit(&result)
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    let (expectations, messages) = load_inputs(
        &resolve(&config_path, &config.expected),
        &resolve(&config_path, &config.record),
    )?;
    eprintln!(
        "valid: check '{}' with {} expectation(s), {} message(s), {} ranking",
        config.name,
        expectations.len(),
        messages.len(),
        config.ranking.mode,
    );
    Ok(())
}
