//! Positional scoring rules: Borda, k-approval, custom score vectors and
//! plurality.

use log::{debug, info};
use snafu::ensure;
use std::collections::BTreeMap;

use crate::config::*;
use crate::engine::{check_seats, outcome_from_ranking, VotingRuleEngine};
use crate::profile::Profile;
use crate::tiebreak::TieBreaker;

/// The points given to each position of a ballot.
#[derive(PartialEq, Debug, Clone)]
pub enum ScoringRule {
    /// `[M-1, ..., 1, 0]` for a profile with M candidates.
    Borda,
    /// One point for each of the first k positions.
    Approval(usize),
    /// A fixed vector, which must cover every ranked position of every ballot.
    Custom(Vec<f64>),
    /// One full point for every candidate of the first group.
    Plurality,
}

/// Runs a [ScoringRule] on profiles.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoringEngine {
    rule: ScoringRule,
    tiebreak: TieBreakMode,
}

impl ScoringEngine {
    pub fn new(rule: ScoringRule, tiebreak: TieBreakMode) -> Result<ScoringEngine, FairnessError> {
        match &rule {
            ScoringRule::Approval(k) => {
                ensure!(*k > 0, InvalidApprovalCountSnafu {});
            }
            ScoringRule::Custom(v) => {
                ensure!(!v.is_empty(), EmptyScoreVectorSnafu {});
            }
            ScoringRule::Borda | ScoringRule::Plurality => {}
        }
        Ok(ScoringEngine { rule, tiebreak })
    }

    pub fn borda(tiebreak: TieBreakMode) -> ScoringEngine {
        ScoringEngine {
            rule: ScoringRule::Borda,
            tiebreak,
        }
    }

    pub fn plurality(tiebreak: TieBreakMode) -> ScoringEngine {
        ScoringEngine {
            rule: ScoringRule::Plurality,
            tiebreak,
        }
    }

    pub fn rule(&self) -> &ScoringRule {
        &self.rule
    }

    /// The score vector used for this profile.
    ///
    /// Plurality does not use a vector and returns `[1]`.
    pub fn score_vector(&self, profile: &Profile) -> Result<Vec<f64>, FairnessError> {
        let m = profile.num_candidates();
        match &self.rule {
            ScoringRule::Borda => Ok(borda_vector(m)),
            ScoringRule::Approval(k) => {
                Ok((0..m).map(|i| if i < *k { 1.0 } else { 0.0 }).collect())
            }
            ScoringRule::Plurality => Ok(vec![1.0]),
            ScoringRule::Custom(v) => {
                let required = profile
                    .ballots()
                    .iter()
                    .map(|b| b.num_ranked())
                    .max()
                    .unwrap_or(0);
                ensure!(
                    v.len() >= required,
                    ScoreVectorTooShortSnafu {
                        len: v.len(),
                        required
                    }
                );
                Ok(v.clone())
            }
        }
    }

    /// The weighted score of every candidate of the profile.
    pub fn scores(&self, profile: &Profile) -> Result<BTreeMap<Candidate, f64>, FairnessError> {
        match &self.rule {
            ScoringRule::Plurality => Ok(first_place_scores(profile)),
            _ => {
                let v = self.score_vector(profile)?;
                Ok(positional_scores(profile, &v))
            }
        }
    }
}

impl VotingRuleEngine for ScoringEngine {
    fn name(&self) -> String {
        match &self.rule {
            ScoringRule::Borda => "borda".to_string(),
            ScoringRule::Approval(k) => format!("{}-approval", k),
            ScoringRule::Custom(_) => "scoring".to_string(),
            ScoringRule::Plurality => "plurality".to_string(),
        }
    }

    fn tiebreak_mode(&self) -> TieBreakMode {
        self.tiebreak
    }

    fn run(&self, profile: &Profile, seats: u32) -> Result<ElectionOutcome, FairnessError> {
        check_seats(seats, profile.num_candidates())?;
        let scores = self.scores(profile)?;
        let tiebreak = TieBreaker::new(profile, self.tiebreak);
        let ranking = tiebreak.rank_by(&scores);
        debug!("run: {}: scores {:?}", self.name(), scores);
        info!("run: {}: ranking {:?}", self.name(), ranking);
        let ordered_scores: Vec<(Candidate, f64)> = ranking
            .iter()
            .map(|c| (c.clone(), scores.get(c).copied().unwrap_or(0.0)))
            .collect();
        let mut outcome = outcome_from_ranking(ranking, seats);
        outcome.scores = ordered_scores;
        Ok(outcome)
    }
}

pub(crate) fn borda_vector(m: usize) -> Vec<f64> {
    (0..m).rev().map(|x| x as f64).collect()
}

/// Sums the points of the score vector over the ballots.
///
/// Tied candidates share the positions of their group: each one receives the
/// mean of the points of these positions. Positions past the end of the vector
/// are worth nothing.
pub(crate) fn positional_scores(profile: &Profile, vector: &[f64]) -> BTreeMap<Candidate, f64> {
    let mut scores: BTreeMap<Candidate, f64> =
        profile.candidates().iter().map(|c| (c.clone(), 0.0)).collect();
    for ballot in profile.ballots() {
        let w = ballot.weight().as_f64();
        let mut pos = 0;
        for group in ballot.groups() {
            let size = group.len();
            let points: f64 = (pos..pos + size)
                .map(|i| vector.get(i).copied().unwrap_or(0.0))
                .sum();
            let share = points / size as f64;
            for c in group {
                if let Some(s) = scores.get_mut(c) {
                    *s += share * w;
                }
            }
            pos += size;
        }
    }
    scores
}

/// The number of voters that put each candidate in their first group.
pub(crate) fn first_place_scores(profile: &Profile) -> BTreeMap<Candidate, f64> {
    let mut scores: BTreeMap<Candidate, f64> =
        profile.candidates().iter().map(|c| (c.clone(), 0.0)).collect();
    for ballot in profile.ballots() {
        if let Some(first) = ballot.groups().first() {
            for c in first {
                if let Some(s) = scores.get_mut(c) {
                    *s += ballot.weight().as_f64();
                }
            }
        }
    }
    scores
}
