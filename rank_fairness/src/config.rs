// ********* Input data structures ***********

use snafu::Snafu;
use std::collections::BTreeSet;
use std::fmt::Display;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// An opaque candidate identifier.
///
/// Candidates compare lexicographically on their name. This is also the order
/// used by the default tie-break policy.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd)]
pub struct Candidate(String);

impl Candidate {
    pub fn new(name: impl Into<String>) -> Candidate {
        Candidate(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Candidate {
    fn from(name: &str) -> Candidate {
        Candidate(name.to_string())
    }
}

impl From<String> for Candidate {
    fn from(name: String) -> Candidate {
        Candidate(name)
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The number of identical voters that cast a ballot.
#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash, Default)]
pub struct VoteCount(pub u64);

impl VoteCount {
    pub const EMPTY: VoteCount = VoteCount(0);

    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

impl std::iter::Sum for VoteCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        VoteCount(iter.map(|vc| vc.0).sum())
    }
}

impl AddAssign for VoteCount {
    fn add_assign(&mut self, rhs: VoteCount) {
        self.0 += rhs.0;
    }
}

impl Add for VoteCount {
    type Output = VoteCount;
    fn add(self: VoteCount, rhs: VoteCount) -> VoteCount {
        VoteCount(self.0 + rhs.0)
    }
}

// ******** Output data structures *********

/// Statistics for one round of STV.
#[derive(PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// First-choice support of every active candidate at the start of the round.
    pub tally: Vec<(Candidate, f64)>,
    /// Candidates that reached the quota in this round, in election order.
    pub elected: Vec<Candidate>,
    pub eliminated: Option<Candidate>,
}

/// The result of running a voting rule on a profile.
#[derive(PartialEq, Debug, Clone)]
pub struct ElectionOutcome {
    /// All the candidates of the profile, from winner to loser.
    pub ranking: Vec<Candidate>,
    /// The first `seats` candidates of the ranking.
    pub winners: Vec<Candidate>,
    /// The aggregated score of each candidate, in ranking order.
    /// Only filled by the scoring rules.
    pub scores: Vec<(Candidate, f64)>,
    /// Droop quota, for STV.
    pub quota: Option<u64>,
    pub round_stats: Vec<RoundStats>,
}

impl ElectionOutcome {
    pub fn winner_set(&self) -> BTreeSet<Candidate> {
        self.winners.iter().cloned().collect()
    }
}

/// The broad category of an error.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ErrorKind {
    /// The rule or the scorer was called with parameters that cannot work.
    /// Detected before any computation starts.
    Configuration,
    /// The input data breaks one of the invariants of the profile model.
    InvariantViolation,
}

/// Errors that prevent a voting rule or a fairness score from completing.
#[derive(Debug, Snafu, PartialEq, Clone)]
#[snafu(visibility(pub(crate)))]
pub enum FairnessError {
    #[snafu(display("Invalid number of seats {seats} for {num_candidates} candidates"))]
    InvalidSeats { seats: u32, num_candidates: usize },

    #[snafu(display(
        "Score vector of length {len} is shorter than the {required} positions of the longest ballot"
    ))]
    ScoreVectorTooShort { len: usize, required: usize },

    #[snafu(display("Score vector is empty"))]
    EmptyScoreVector {},

    #[snafu(display("Approval rules need to approve at least one candidate"))]
    InvalidApprovalCount {},

    #[snafu(display("{k}-approval requires at least {k} candidates, got {num_candidates}"))]
    TooFewCandidates { k: usize, num_candidates: usize },

    #[snafu(display("Unknown voting rule {name:?}"))]
    UnknownRule { name: String },

    #[snafu(display("Unknown tiebreak mode {name:?}"))]
    UnknownTieBreak { name: String },

    #[snafu(display("Unknown metric {name:?}"))]
    UnknownMetric { name: String },

    #[snafu(display(
        "Removing all the candidate subsets is limited to {max} candidates, got {num_candidates}"
    ))]
    TooManyCandidates { num_candidates: usize, max: usize },

    #[snafu(display("Candidate {candidate} is not registered in the profile"))]
    UnknownCandidate { candidate: Candidate },

    #[snafu(display("Candidate {candidate} appears more than once"))]
    DuplicateCandidate { candidate: Candidate },

    #[snafu(display("A ballot contains an empty preference group"))]
    EmptyPreferenceGroup {},

    #[snafu(display("A ballot has a zero weight"))]
    ZeroWeight {},

    #[snafu(display("The profile has no voters"))]
    EmptyProfile {},

    #[snafu(display("Rankings are not over the same candidates: {left:?} and {right:?}"))]
    RankingMismatch {
        left: Vec<Candidate>,
        right: Vec<Candidate>,
    },

    #[snafu(display("STV ran out of active candidates with {elected} of {seats} seats filled"))]
    StvExhausted { elected: usize, seats: u32 },
}

impl FairnessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FairnessError::InvalidSeats { .. }
            | FairnessError::ScoreVectorTooShort { .. }
            | FairnessError::EmptyScoreVector { .. }
            | FairnessError::InvalidApprovalCount { .. }
            | FairnessError::TooFewCandidates { .. }
            | FairnessError::UnknownRule { .. }
            | FairnessError::UnknownTieBreak { .. }
            | FairnessError::UnknownMetric { .. }
            | FairnessError::TooManyCandidates { .. } => ErrorKind::Configuration,
            FairnessError::UnknownCandidate { .. }
            | FairnessError::DuplicateCandidate { .. }
            | FairnessError::EmptyPreferenceGroup { .. }
            | FairnessError::ZeroWeight { .. }
            | FairnessError::EmptyProfile { .. }
            | FairnessError::RankingMismatch { .. }
            | FairnessError::StvExhausted { .. } => ErrorKind::InvariantViolation,
        }
    }
}

// ********* Configuration **********

/// How candidates with equal scores are ordered.
///
/// The policy is fixed when an engine is built and applies to every profile
/// that engine runs on, including the reduced profiles of the fairness scores.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub enum TieBreakMode {
    /// Candidate identifier ascending.
    #[default]
    Lexicographic,
    /// Most first-place votes first, then identifier ascending.
    FirstPlace,
    /// Highest classic Borda score first, then identifier ascending.
    Borda,
}

impl FromStr for TieBreakMode {
    type Err = FairnessError;

    fn from_str(s: &str) -> Result<TieBreakMode, FairnessError> {
        match s {
            "lexicographic" => Ok(TieBreakMode::Lexicographic),
            "firstPlace" | "first_place" => Ok(TieBreakMode::FirstPlace),
            "borda" => Ok(TieBreakMode::Borda),
            x => UnknownTieBreakSnafu { name: x }.fail(),
        }
    }
}

impl Display for TieBreakMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TieBreakMode::Lexicographic => write!(f, "lexicographic"),
            TieBreakMode::FirstPlace => write!(f, "firstPlace"),
            TieBreakMode::Borda => write!(f, "borda"),
        }
    }
}

/// The voting rules that can be built with [crate::build_voting_rule].
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum RuleName {
    Borda,
    /// k-approval: each voter approves their top k candidates.
    Approval(usize),
    Plurality,
    Stv,
}

impl FromStr for RuleName {
    type Err = FairnessError;

    fn from_str(s: &str) -> Result<RuleName, FairnessError> {
        match s {
            "borda" => Ok(RuleName::Borda),
            "plurality" => Ok(RuleName::Plurality),
            "stv" => Ok(RuleName::Stv),
            x => match x.strip_suffix("-approval").map(|k| k.parse::<usize>()) {
                Some(Ok(k)) => Ok(RuleName::Approval(k)),
                _ => UnknownRuleSnafu { name: x }.fail(),
            },
        }
    }
}

impl Display for RuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleName::Borda => write!(f, "borda"),
            RuleName::Approval(k) => write!(f, "{}-approval", k),
            RuleName::Plurality => write!(f, "plurality"),
            RuleName::Stv => write!(f, "stv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rule_names() {
        assert_eq!("borda".parse::<RuleName>(), Ok(RuleName::Borda));
        assert_eq!("3-approval".parse::<RuleName>(), Ok(RuleName::Approval(3)));
        assert_eq!("stv".parse::<RuleName>(), Ok(RuleName::Stv));
        let err = "x-approval".parse::<RuleName>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(RuleName::Approval(2).to_string(), "2-approval");
    }

    #[test]
    fn parse_tiebreak_modes() {
        assert_eq!(
            "first_place".parse::<TieBreakMode>(),
            Ok(TieBreakMode::FirstPlace)
        );
        assert_eq!(TieBreakMode::default(), TieBreakMode::Lexicographic);
        assert!("random".parse::<TieBreakMode>().is_err());
    }

    #[test]
    fn error_kinds() {
        let e = FairnessError::StvExhausted {
            elected: 0,
            seats: 2,
        };
        assert_eq!(e.kind(), ErrorKind::InvariantViolation);
        assert_eq!(
            e.to_string(),
            "STV ran out of active candidates with 0 of 2 seats filled"
        );
    }
}
