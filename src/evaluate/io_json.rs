use crate::evaluate::*;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct JsonBallot {
    ranking: Vec<Vec<String>>,
    #[serde(alias = "count")]
    weight: Option<u64>,
    id: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
struct JsonProfile {
    title: Option<String>,
    candidates: Option<Vec<String>>,
    seats: Option<u32>,
    ballots: Vec<JsonBallot>,
}

/// Reads a profile written as JSON:
///
/// ```text
/// {"candidates": ["A", "B", "C"], "seats": 1,
///  "ballots": [{"ranking": [["A"], ["B", "C"]], "weight": 3}]}
/// ```
pub fn read_json_profile(path: &str) -> RunResult<ParsedProfile> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let jp: JsonProfile =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!(
        "read_json_profile: {} ballots, candidates: {:?}",
        jp.ballots.len(),
        jp.candidates
    );
    let ballots = jp
        .ballots
        .into_iter()
        .map(|b| ParsedBallot {
            id: b.id,
            count: b.weight,
            choices: b.ranking,
        })
        .collect();
    Ok(ParsedProfile {
        title: jp.title,
        candidates: jp.candidates,
        seats: jp.seats,
        ballots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_cyclic_profile() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/json_cyclic/cyclic.json");
        let parsed = read_json_profile(path).unwrap();
        assert_eq!(parsed.ballots.len(), 3);
        assert_eq!(parsed.seats, Some(1));
        assert_eq!(parsed.ballots[1].count, None);
        assert_eq!(parsed.ballots[0].choices[0], vec!["A".to_string()]);
    }

    #[test]
    fn missing_file() {
        let err = read_json_profile("/nonexistent/profile.json").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/profile.json"));
    }
}
