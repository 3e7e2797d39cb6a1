use log::{debug, info, warn};

use rank_fairness::builder::ProfileBuilder;
use rank_fairness::*;
use snafu::{prelude::*, Snafu};

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

mod config_reader;
mod io_blt;
mod io_common;
mod io_csv;
mod io_json;

pub use config_reader::*;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RunError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    WritingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Input file {path} could not be found"))]
    MissingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Expected a column or row index, found {value}"))]
    ParsingJsonNumber { value: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("CSV line {lineno} is too short"))]
    CsvLineTooShort { lineno: usize },
    #[snafu(display("Line {lineno}: expected a number of voters, found {value:?}"))]
    ParsingCount { lineno: usize, value: String },
    #[snafu(display("File {path} does not start with a '<candidates>,<seats>' line"))]
    BltHeader { path: String },
    #[snafu(display("Line {lineno}: no candidate with index {index}"))]
    BltCandidateIndex { lineno: usize, index: usize },
    #[snafu(display("Provider {provider:?} is not supported (expected json, csv or blt_csv)"))]
    UnknownProvider { provider: String },
    #[snafu(display("The configuration does not list any profile source"))]
    NoProfileSources {},
    #[snafu(display("Either a configuration file or an input file is required"))]
    MissingInput {},
    #[snafu(display("Cannot find the directory of {path}"))]
    MissingParentDir { path: String },
    #[snafu(display("Ballot {id} is invalid: {source}"))]
    InvalidBallot { source: FairnessError, id: String },
    #[snafu(display("{source}"))]
    Fairness { source: FairnessError },
    #[snafu(display("Difference detected between the summary and the reference summary {path}"))]
    ReferenceMismatch { path: String },
}

pub type RunResult<T> = Result<T, RunError>;

/// A ballot as read from a file, before validation against the candidates.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ParsedBallot {
    pub id: Option<String>,
    pub count: Option<u64>,
    pub choices: Vec<Vec<String>>,
}

/// The content of one profile file.
///
/// Only some formats declare the candidates or the number of seats.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ParsedProfile {
    pub title: Option<String>,
    pub candidates: Option<Vec<String>>,
    pub seats: Option<u32>,
    pub ballots: Vec<ParsedBallot>,
}

fn read_profile(root: &Path, source: &ProfileSource) -> RunResult<ParsedProfile> {
    let p: PathBuf = root.join(&source.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read profile file {:?}", p2);
    let parsed = match source.provider.as_str() {
        "json" => io_json::read_json_profile(&p2)?,
        "csv" => io_csv::read_csv_ranking(&p2, source)?,
        "blt_csv" => io_blt::read_blt_csv(&p2)?,
        x => {
            return UnknownProviderSnafu {
                provider: x.to_string(),
            }
            .fail();
        }
    };
    debug!("read_profile: {} ballots in {}", parsed.ballots.len(), p2);
    Ok(parsed)
}

/// Validates the parsed ballots against the candidates.
///
/// The candidates of the configuration take precedence over the ones declared
/// in the file. When neither declares them, they are the names found on the
/// ballots. Excluded candidates are removed after validation.
fn build_profile(
    parsed: &ParsedProfile,
    config_candidates: &Option<Vec<ConfigCandidate>>,
) -> RunResult<Profile> {
    let declared: Option<Vec<String>> = match config_candidates {
        Some(cs) => Some(cs.iter().map(|c| c.name.clone()).collect()),
        None => parsed.candidates.clone(),
    };
    let mut builder = ProfileBuilder::new().seats(parsed.seats.unwrap_or(1));
    if let Some(names) = &declared {
        builder = builder.candidates(names.as_slice());
    }

    for (idx, pb) in parsed.ballots.iter().enumerate() {
        let id = pb
            .id
            .clone()
            .unwrap_or_else(|| format!("ballot-{:08}", idx + 1));
        let count = pb.count.unwrap_or(1);
        if count == 0 {
            warn!("build_profile: ballot {} has no voters, skipping", id);
            continue;
        }
        builder
            .add_ballot(pb.choices.as_slice(), count)
            .context(InvalidBallotSnafu { id })?;
    }
    let profile = builder.build().context(FairnessSnafu {})?;

    let excluded: BTreeSet<Candidate> = config_candidates
        .iter()
        .flatten()
        .filter(|c| c.excluded.unwrap_or(false))
        .map(|c| Candidate::new(c.name.as_str()))
        .collect();
    if excluded.is_empty() {
        Ok(profile)
    } else {
        info!("build_profile: excluding candidates {:?}", excluded);
        Ok(profile.remove(&excluded))
    }
}

fn names(candidates: &[Candidate]) -> Vec<String> {
    candidates.iter().map(|c| c.name().to_string()).collect()
}

fn round_stats_to_json(outcome: &ElectionOutcome) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in outcome.round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (c, count) in round_stat.tally.iter() {
            tally.insert(c.name().to_string(), json!(count));
        }
        let mut tally_results: Vec<JSValue> = round_stat
            .elected
            .iter()
            .map(|c| json!({ "elected": c.name() }))
            .collect();
        if let Some(c) = &round_stat.eliminated {
            tally_results.push(json!({ "eliminated": c.name() }));
        }
        l.push(json!({"round": round_stat.round, "tally": tally, "tallyResults": tally_results}));
    }
    l
}

fn evaluate_source(
    config: &FairnessConfig,
    root: &Path,
    source: &ProfileSource,
) -> RunResult<JSValue> {
    let parsed = read_profile(root, source)?;
    let profile = build_profile(&parsed, &config.candidates)?;
    let seats = config
        .rules
        .number_of_seats
        .unwrap_or_else(|| profile.seats());

    let rule = config.rules.voting_rule()?;
    let tiebreak = config.rules.tiebreak_mode()?;
    let metrics = config.rules.metrics()?;
    let engine =
        build_voting_rule(profile.num_candidates(), &rule, tiebreak).context(FairnessSnafu {})?;
    let outcome = engine.run(&profile, seats).context(FairnessSnafu {})?;
    info!(
        "evaluate_source: {}: winners {:?}",
        engine.name(),
        outcome.winners
    );

    let mut scores: JSMap<String, JSValue> = JSMap::new();
    for metric in metrics {
        let value = metric
            .compute(&profile, engine.as_ref(), seats)
            .context(FairnessSnafu {})?;
        info!("evaluate_source: {}: {}", metric, value);
        scores.insert(metric.to_string(), json!(value));
    }

    let mut res: JSMap<String, JSValue> = JSMap::new();
    res.insert("source".to_string(), json!(source.file_path));
    res.insert("candidates".to_string(), json!(profile.num_candidates()));
    res.insert("voters".to_string(), json!(profile.total_weight().0));
    res.insert("seats".to_string(), json!(seats));
    res.insert("ranking".to_string(), json!(names(&outcome.ranking)));
    res.insert("winners".to_string(), json!(names(&outcome.winners)));
    res.insert("scores".to_string(), JSValue::Object(scores));
    if let Some(title) = parsed.title {
        res.insert("title".to_string(), json!(title));
    }
    if !outcome.scores.is_empty() {
        let mut rule_scores: JSMap<String, JSValue> = JSMap::new();
        for (c, score) in outcome.scores.iter() {
            rule_scores.insert(c.name().to_string(), json!(score));
        }
        res.insert("ruleScores".to_string(), JSValue::Object(rule_scores));
    }
    if let Some(quota) = outcome.quota {
        res.insert("quota".to_string(), json!(quota));
    }
    if !outcome.round_stats.is_empty() {
        res.insert("rounds".to_string(), json!(round_stats_to_json(&outcome)));
    }
    Ok(JSValue::Object(res))
}

/// Scores every profile source of the configuration.
pub fn evaluate_config(config: &FairnessConfig, root: &Path) -> RunResult<JSValue> {
    ensure!(!config.profile_sources.is_empty(), NoProfileSourcesSnafu {});
    let mut results: Vec<JSValue> = Vec::new();
    for source in config.profile_sources.iter() {
        results.push(evaluate_source(config, root, source)?);
    }
    Ok(json!({ "config": config.output_config(), "results": results }))
}

/// Writes the summary of a configuration, and compares it with a reference
/// summary if one is provided.
pub fn run_config(
    config: &FairnessConfig,
    root: &Path,
    out_path: Option<String>,
    check_summary_path: Option<String>,
) -> RunResult<()> {
    let result_js = evaluate_config(config, root)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(WritingJsonSnafu {})?;

    match out_path.as_deref() {
        None | Some("stdout") => {
            println!("{}", pretty_js_stats);
        }
        Some(path) => {
            info!("Writing summary to {}", path);
            fs::write(path, &pretty_js_stats).context(WritingOutputSnafu { path })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(&summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(WritingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu { path: summary_p }.fail();
        }
    }
    Ok(())
}

fn config_root(config_path: &str) -> RunResult<&Path> {
    Path::new(config_path)
        .parent()
        .context(MissingParentDirSnafu { path: config_path })
}

// An explicit output path wins. Otherwise the summary goes to the output
// directory of the configuration, or to stdout.
fn output_path(
    config: &FairnessConfig,
    root: &Path,
    out_path: Option<String>,
) -> RunResult<Option<String>> {
    if out_path.is_some() {
        return Ok(out_path);
    }
    match &config.output_settings.output_directory {
        None => Ok(None),
        Some(dir) => {
            let dir_p = root.join(dir);
            fs::create_dir_all(&dir_p).context(WritingOutputSnafu {
                path: dir_p.display().to_string(),
            })?;
            let file_name = format!("{}_summary.json", config.output_settings.contest_name);
            Ok(Some(dir_p.join(file_name).display().to_string()))
        }
    }
}

pub fn run_election(
    config_path: &str,
    check_summary_path: Option<String>,
    out_path: Option<String>,
) -> RunResult<()> {
    let config = read_config(config_path)?;
    info!("config: {:?}", config);
    let root = config_root(config_path)?;
    let out = output_path(&config, root, out_path)?;
    run_config(&config, root, out, check_summary_path)
}

fn cli_config(input: &str) -> FairnessConfig {
    FairnessConfig {
        output_settings: OutputSettings {
            contest_name: io_common::simplify_file_name(input),
            output_directory: None,
        },
        profile_sources: Vec::new(),
        candidates: None,
        rules: FairnessRules {
            voting_rule: "borda".to_string(),
            number_of_seats: None,
            tiebreak_mode: None,
            metrics: None,
        },
    }
}

// The command line options take precedence over the configuration file.
fn apply_overrides(config: &mut FairnessConfig, args: &Args) -> RunResult<()> {
    if let Some(input) = &args.input {
        let path = fs::canonicalize(input).context(MissingFileSnafu { path: input })?;
        let provider = args.input_type.clone().unwrap_or_else(|| "csv".to_string());
        config.profile_sources = vec![ProfileSource::new(
            provider.as_str(),
            path.display().to_string().as_str(),
        )];
    }
    if let Some(rule) = &args.rule {
        config.rules.voting_rule = rule.clone();
    }
    if let Some(seats) = args.seats {
        config.rules.number_of_seats = Some(seats);
    }
    if let Some(tiebreak) = &args.tiebreak {
        config.rules.tiebreak_mode = Some(tiebreak.clone());
    }
    if let Some(metrics) = &args.metric {
        config.rules.metrics = Some(metrics.clone());
    }
    Ok(())
}

/// Entry point of the program.
pub fn run(args: &Args) -> RunResult<()> {
    match (&args.config, &args.input) {
        (Some(config_path), _) => {
            let mut config = read_config(config_path)?;
            apply_overrides(&mut config, args)?;
            let root = config_root(config_path)?;
            let out = output_path(&config, root, args.out.clone())?;
            run_config(&config, root, out, args.reference.clone())
        }
        (None, Some(input)) => {
            let mut config = cli_config(input);
            apply_overrides(&mut config, args)?;
            run_config(&config, Path::new(""), args.out.clone(), args.reference.clone())
        }
        (None, None) => MissingInputSnafu {}.fail(),
    }
}

#[cfg(test)]
fn test_dir() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/testdata")
}

#[cfg(test)]
fn run_election_test(test_name: &str, config_lpath: &str, summary_lpath: &str) {
    let test_dir = test_dir();
    info!("Running test {}", test_name);
    let res = run_election(
        format!("{}/{}/{}", test_dir, test_name, config_lpath).as_str(),
        Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
        Some("stdout".to_string()),
    );
    if let Err(e) = res {
        panic!("Test {} failed: {}", test_name, e);
    }
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    run_election_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    )
}
