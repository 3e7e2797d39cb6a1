use crate::evaluate::*;

use rank_fairness::{Metric, RuleName, TieBreakMode};
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "contestName")]
    pub contest_name: String,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: String,
    pub rule: String,
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: String,
    pub seats: Option<u32>,
}

/// A file that contains one profile.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "firstVoteColumnIndex")]
    pub _first_vote_column_index: Option<JSValue>,
    #[serde(rename = "firstVoteRowIndex")]
    pub _first_vote_row_index: Option<JSValue>,
    #[serde(rename = "countColumnIndex")]
    pub count_column_index: Option<JSValue>,
    #[serde(rename = "tieDelimiter")]
    pub tie_delimiter: Option<String>,
}

impl ProfileSource {
    pub fn new(provider: &str, file_path: &str) -> ProfileSource {
        ProfileSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            _first_vote_column_index: None,
            _first_vote_row_index: None,
            count_column_index: None,
            tie_delimiter: None,
        }
    }

    /// 0-based index of the first choice column. Defaults to the first column.
    pub fn first_vote_column_index(&self) -> RunResult<usize> {
        match &self._first_vote_column_index {
            None => Ok(0),
            x => Ok(read_js_int(x)? - 1),
        }
    }

    /// 0-based index of the first ballot row. Defaults to the first row.
    pub fn first_vote_row_index(&self) -> RunResult<usize> {
        match &self._first_vote_row_index {
            None => Ok(0),
            x => Ok(read_js_int(x)? - 1),
        }
    }

    /// 0-based index of the column with the number of voters, if any.
    pub fn count_column_index_int(&self) -> RunResult<Option<usize>> {
        match &self.count_column_index {
            None => Ok(None),
            x => Ok(Some(read_js_int(x)? - 1)),
        }
    }

    pub fn tie_delimiter(&self) -> String {
        self.tie_delimiter.clone().unwrap_or_else(|| "=".to_string())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ConfigCandidate {
    pub name: String,
    /// Excluded candidates are removed from the profile before scoring.
    pub excluded: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FairnessRules {
    #[serde(rename = "votingRule")]
    pub voting_rule: String,
    #[serde(rename = "numberOfSeats")]
    pub number_of_seats: Option<u32>,
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<String>,
    pub metrics: Option<Vec<String>>,
}

impl FairnessRules {
    pub fn voting_rule(&self) -> RunResult<RuleName> {
        self.voting_rule.parse::<RuleName>().context(FairnessSnafu {})
    }

    pub fn tiebreak_mode(&self) -> RunResult<TieBreakMode> {
        match &self.tiebreak_mode {
            None => Ok(TieBreakMode::default()),
            Some(s) => s.parse::<TieBreakMode>().context(FairnessSnafu {}),
        }
    }

    /// The requested metrics, in the order of the configuration.
    ///
    /// Without a list, every metric but the all-subsets variant is computed.
    pub fn metrics(&self) -> RunResult<Vec<Metric>> {
        match &self.metrics {
            None => Ok(vec![
                Metric::SigmaIia,
                Metric::SigmaIiaWinnerSet,
                Metric::SigmaUm,
                Metric::SigmaUmWinnerSet,
            ]),
            Some(names) => names
                .iter()
                .map(|s| s.parse::<Metric>().context(FairnessSnafu {}))
                .collect(),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct FairnessConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "profileSources")]
    pub profile_sources: Vec<ProfileSource>,
    pub candidates: Option<Vec<ConfigCandidate>>,
    pub rules: FairnessRules,
}

impl FairnessConfig {
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig {
            contest: self.output_settings.contest_name.clone(),
            rule: self.rules.voting_rule.clone(),
            tiebreak_mode: self
                .rules
                .tiebreak_mode
                .clone()
                .unwrap_or_else(|| TieBreakMode::default().to_string()),
            seats: self.rules.number_of_seats,
        }
    }
}

pub fn read_config(path: &str) -> RunResult<FairnessConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: FairnessConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn read_summary(path: &str) -> RunResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

// Column indices are 1-based numbers, or spreadsheet-style letters.
fn read_js_int(x: &Option<JSValue>) -> RunResult<usize> {
    let res = match x {
        Some(JSValue::Number(n)) => n.as_u64().map(|x| x as usize),
        Some(JSValue::String(s)) if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic()) => {
            Some(
                s.to_ascii_lowercase()
                    .chars()
                    .fold(0, |acc, c| acc * 26 + (c as usize - 'a' as usize + 1)),
            )
        }
        Some(JSValue::String(s)) => s.parse::<usize>().ok(),
        _ => None,
    };
    match res {
        Some(idx) if idx >= 1 => Ok(idx),
        _ => ParsingJsonNumberSnafu {
            value: format!("{:?}", x),
        }
        .fail(),
    }
}
