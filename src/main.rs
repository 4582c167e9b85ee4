//! `crosscheck`: evaluate a DCC payload against every rule set and show,
//! per region and per rule, what passes, what fails and what errors.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use clap::{Parser, ValueEnum};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crosscheck::{
    json, report, Crosscheck, CrosscheckError, EvaluationResults, ExternalParameters, Rule,
    RuleSet, RuleSets, ValueSets,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Coloured, human-readable
    Text,
    /// Machine-readable JSON
    Json,
}

#[derive(Parser)]
#[command(name = "crosscheck", version)]
#[command(about = "Evaluate a DCC payload against DCC business rule sets")]
struct Cli {
    /// DCC payload as JSON; read from stdin when omitted or `-`
    payload: Option<PathBuf>,

    /// Rule sets: a JSON object of rule-set id to rule id to rule
    #[arg(long, env = "CROSSCHECK_RULE_SETS")]
    rule_sets: PathBuf,

    /// Value sets: a JSON object of value-set name to allowed values
    #[arg(long, env = "CROSSCHECK_VALUE_SETS")]
    value_sets: Option<PathBuf>,

    /// An extra rule set evaluated under the id `custom`
    #[arg(long)]
    custom: Option<PathBuf>,

    /// Validation clock as RFC 3339; defaults to now
    #[arg(long)]
    validation_clock: Option<String>,

    /// Additional external parameter; VALUE is JSON or a plain string
    #[arg(long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,

    /// Show the details of this rule
    #[arg(long)]
    rule: Option<String>,

    /// Rule set to look the rule up in
    #[arg(long, requires = "rule")]
    rule_set: Option<String>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Disable coloured output
    #[arg(long)]
    no_color: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CrosscheckError> {
    let mut rule_sets = RuleSets::from_file(&cli.rule_sets)?;
    if let Some(path) = &cli.custom {
        let custom = RuleSet::from_file(path)?;
        info!(rules = custom.len(), "loaded custom rule set");
        rule_sets = rule_sets.with_custom(custom);
    }
    let value_sets = match &cli.value_sets {
        Some(path) => ValueSets::from_file(path)?,
        None => ValueSets::new(),
    };
    let params = external_parameters(cli)?;
    debug!(%params, "external parameters");

    let payload = json::parse(&read_payload(cli.payload.as_deref())?)?;

    let engine = Crosscheck::new(rule_sets, value_sets);
    info!(%engine, "evaluating");
    let results = engine.evaluate(&payload, &params);

    let selected = match &cli.rule {
        Some(rule_id) => Some(select_rule(
            engine.rule_sets(),
            rule_id,
            cli.rule_set.as_deref(),
        )?),
        None => None,
    };

    print!("{}", render(cli.format, &params, &results, selected.as_ref())?);
    Ok(())
}

/// A rule picked for the detail view, with the keys its outcome is stored under.
struct Selected<'a> {
    rule_set: &'a str,
    rule_id: &'a str,
    rule: &'a Rule,
}

/// Look a rule up by its key, in `rule_set` or else in the first set holding it.
fn select_rule<'a>(
    rule_sets: &'a RuleSets,
    rule_id: &'a str,
    rule_set: Option<&'a str>,
) -> Result<Selected<'a>, CrosscheckError> {
    let found = match rule_set {
        Some(set) => rule_sets.rule(set, rule_id).map(|rule| (set, rule)),
        None => rule_sets.find_rule(rule_id),
    };
    let (rule_set, rule) = found.ok_or_else(|| CrosscheckError::UnknownRule {
        rule: rule_id.to_owned(),
    })?;
    Ok(Selected {
        rule_set,
        rule_id,
        rule,
    })
}

fn render(
    format: Format,
    params: &ExternalParameters,
    results: &EvaluationResults,
    selected: Option<&Selected<'_>>,
) -> Result<String, CrosscheckError> {
    let out = match format {
        Format::Text => {
            let mut out = format!(
                "External parameters\n{}\nEvaluation results, per set of rules of region\n{}",
                report::parameters_text(params),
                report::results_text(results)
            );
            if let Some(s) = selected {
                out.push('\n');
                out.push_str(&report::rule_detail(s.rule, results.outcome(s.rule_set, s.rule_id)));
            }
            out
        }
        Format::Json => match selected {
            Some(s) => {
                let detail = json!({
                    "ruleSet": s.rule_set,
                    "rule": s.rule,
                    "result": results.outcome(s.rule_set, s.rule_id),
                });
                format!("{}\n", json::pretty(&detail))
            }
            None => format!("{}\n", report::results_json(results)?),
        },
    };
    Ok(out)
}

fn external_parameters(cli: &Cli) -> Result<ExternalParameters, CrosscheckError> {
    let mut params = match &cli.validation_clock {
        Some(clock) => ExternalParameters::new().with_validation_clock_str(clock)?,
        None => ExternalParameters::new().with_validation_clock(Utc::now()),
    };
    for assignment in &cli.params {
        let (name, value) = ExternalParameters::parse_assignment(assignment)?;
        params.insert(name, value);
    }
    Ok(params)
}

fn read_payload(path: Option<&Path>) -> Result<String, CrosscheckError> {
    match path {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).map_err(|source| CrosscheckError::read(path, source))
        }
        _ => Ok(io::read_to_string(io::stdin())?),
    }
}
